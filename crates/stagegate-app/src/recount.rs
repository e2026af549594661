// Rust guideline compliant 2026-10-15

//! Expected WIP occupancy computed from the item set.

use crate::list::PARALLEL_THRESHOLD;
use rayon::prelude::*;
use stagegate_core::{expected_counts, occupied_scopes, Item, Scope};
use std::collections::BTreeMap;

/// Counts how many items occupy each scope.
///
/// Large item sets are counted on the rayon pool; the result is identical to
/// [`expected_counts`].
pub fn count_occupancy(items: &[Item]) -> BTreeMap<Scope, u32> {
    if items.len() < PARALLEL_THRESHOLD {
        return expected_counts(items);
    }

    items
        .par_iter()
        .fold(BTreeMap::new, |mut counts, item| {
            for scope in occupied_scopes(item.pod, item.gate) {
                *counts.entry(scope).or_insert(0) += 1;
            }
            counts
        })
        .reduce(BTreeMap::new, |mut left, right| {
            for (scope, count) in right {
                *left.entry(scope).or_insert(0) += count;
            }
            left
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagegate_core::{Gate, Pod};

    fn items(count: usize) -> Vec<Item> {
        (0..count)
            .map(|i| {
                let mut item = Item::new(format!("Idea {}", i), "ines".to_string());
                item.pod = if i % 3 == 0 { None } else { Some(Pod::ALL[i % Pod::ALL.len()]) };
                item.gate = Gate::ALL[i % Gate::ALL.len()];
                item
            })
            .collect()
    }

    #[test]
    fn test_parallel_count_matches_sequential() {
        let items = items(PARALLEL_THRESHOLD * 3);
        assert_eq!(count_occupancy(&items), expected_counts(&items));
    }

    #[test]
    fn test_terminal_items_occupy_nothing() {
        let mut killed = Item::new("Dead".to_string(), "ines".to_string());
        killed.gate = Gate::Killed;
        killed.pod = Some(Pod::Ratio);
        let mut live = Item::new("Live".to_string(), "ines".to_string());
        live.gate = Gate::Seed;

        let counts = count_occupancy(&[killed, live]);
        assert_eq!(counts.get(&Scope::Portfolio), Some(&1));
        assert_eq!(counts.get(&Scope::CrossPod { gate: Gate::Seed }), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}
