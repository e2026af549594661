// Rust guideline compliant 2026-10-15

//! Stagegate CLI library.
//!
//! This library exposes the CLI modules for use in tests and the `sgate`
//! binary.

pub mod commands;
pub mod logging;
pub mod output;
pub mod output_mode;
pub mod terminal;

pub use output::{create_formatter, OutputFormatter};
pub use terminal::{get_terminal_width, should_use_color, wrap_text};
