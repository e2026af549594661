// Rust guideline compliant 2026-10-13

//! Storage module for JSONL file operations.
//!
//! Items are rewritten in place (upsert by ID); transition records are
//! append-only. Both use one JSON document per line and atomic
//! temp-file-and-rename rewrites.

use crate::{Error, Item, Result, TransitionRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A value that can be stored one-per-line.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Key used for lookups and upserts.
    fn record_id(&self) -> &str;

    /// Checks the value before it is written or after it is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is malformed.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Record for Item {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        Item::validate(self)
    }
}

impl Record for TransitionRecord {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// JSONL-backed storage for one record type.
pub struct Storage<T> {
    /// Path to the JSONL file.
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Record> Storage<T> {
    /// Creates a new Storage instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty.
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path cannot be empty",
            )));
        }
        Ok(Self {
            path,
            _marker: PhantomData,
        })
    }

    /// Returns a reference to the JSONL file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every record, skipping malformed lines with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened
    /// - A well-formed record fails validation
    pub fn load_all(&self) -> Result<Vec<T>> {
        self.read_records(false)
    }

    /// Loads every record, failing on the first malformed line.
    ///
    /// Used before rewriting the file, so that a corrupt line is reported
    /// instead of silently dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a line is not valid JSON,
    /// or a record fails validation.
    pub fn load_all_strict(&self) -> Result<Vec<T>> {
        self.read_records(true)
    }

    fn read_records(&self, strict: bool) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(&line) {
                Ok(record) => {
                    record.validate()?;
                    records.push(record);
                }
                Err(e) if strict => {
                    tracing::error!(path = %self.path.display(), line = index + 1, error = %e, "malformed JSON line");
                    return Err(Error::Json(e));
                }
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), line = index + 1, error = %e, "skipping malformed JSON line");
                }
            }
        }

        Ok(records)
    }

    /// Loads a single record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the record is not found.
    pub fn load_by_id(&self, id: &str) -> Result<T> {
        self.load_all()?
            .into_iter()
            .find(|record| record.record_id() == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Inserts or replaces a record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the record fails validation or the file cannot be written.
    pub fn save(&self, record: &T) -> Result<()> {
        record.validate()?;

        let mut records = self.load_all_strict()?;
        match records
            .iter()
            .position(|existing| existing.record_id() == record.record_id())
        {
            Some(pos) => records[pos] = record.clone(),
            None => records.push(record.clone()),
        }

        self.save_all(&records)
    }

    /// Replaces the whole file with `records`.
    ///
    /// # Errors
    ///
    /// Returns an error if any record fails validation or the write fails.
    pub fn save_all(&self, records: &[T]) -> Result<()> {
        for record in records {
            record.validate()?;
        }
        write_jsonl_atomic(&self.path, records)
    }

    /// Appends a record without rewriting the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the record fails validation or the write fails.
    pub fn append(&self, record: &T) -> Result<()> {
        record.validate()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let json = serde_json::to_string(record)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        Ok(())
    }

    /// Executes a closure with an exclusive lock on the storage file.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired or the closure fails.
    pub fn with_lock<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce() -> Result<R>,
    {
        with_file_lock(&self.path, f)
    }
}

/// Reads every line of a JSONL file, failing on the first malformed line.
pub(crate) fn read_jsonl_strict<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    serde_json::Deserializer::from_reader(reader)
        .into_iter::<R>()
        .map(|result| result.map_err(Error::from))
        .collect()
}

/// Rewrites a JSONL file through a temp file and rename.
pub(crate) fn write_jsonl_atomic<R: Serialize>(path: &Path, records: &[R]) -> Result<()> {
    let temp_path = path.with_extension("jsonl.tmp");

    {
        let mut file = File::create(&temp_path)?;
        for record in records {
            let json = serde_json::to_string(record)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
        }
        file.sync_all()?;
    }

    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Runs `f` while holding an exclusive advisory lock next to `path`.
///
/// Blocks until the lock is free; the lock is released even if `f` fails.
pub(crate) fn with_file_lock<F, R>(path: &Path, f: F) -> Result<R>
where
    F: FnOnce() -> Result<R>,
{
    use fs2::FileExt;

    let lock_path = path.with_extension("lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| Error::StoreUnavailable(format!("{}: {}", lock_path.display(), e)))?;

    lock_file
        .lock_exclusive()
        .map_err(|e| Error::StoreUnavailable(format!("Failed to acquire lock: {}", e)))?;

    let result = f();

    let _ = lock_file.unlock();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage: Storage<Item> = Storage::new(temp_dir.path().join("ideas.jsonl")).unwrap();
        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(Storage::<Item>::new(PathBuf::new()).is_err());
    }

    #[test]
    fn test_malformed_middle_line_keeps_later_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ideas.jsonl");
        let first = Item::new("First".to_string(), "ines".to_string());
        let second = Item::new("Second".to_string(), "ines".to_string());
        let contents = format!(
            "{}\n{{broken\n{}\n",
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        std::fs::write(&path, &contents).unwrap();
        let storage: Storage<Item> = Storage::new(path.clone()).unwrap();

        let loaded = storage.load_all().unwrap();
        assert_eq!(loaded, vec![first.clone(), second.clone()]);

        let mut renamed = first;
        renamed.title = "First, renamed".to_string();
        assert!(matches!(storage.save(&renamed), Err(Error::Json(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
        assert!(storage.load_by_id(&second.id).is_ok());
    }

    #[test]
    fn test_strict_reader_fails_on_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("limits.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();
        assert!(read_jsonl_strict::<serde_json::Value>(&path).is_err());
    }
}
