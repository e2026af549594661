// Rust guideline compliant 2026-10-15

//! Terminal helpers: color detection, width, wrapping and status lines.

use stagegate_core::Gate;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Returns true if colored output should be used.
///
/// Respects `NO_COLOR` and only colors when stdout is a TTY.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    atty::is(atty::Stream::Stdout)
}

/// Gets the terminal width in columns, or 80 if it cannot be determined.
pub fn get_terminal_width() -> usize {
    term_size::dimensions().map_or(80, |(width, _)| width)
}

/// Greedily wraps `text` to the terminal width, indenting continuation
/// lines by `indent` spaces.
pub fn wrap_text(text: &str, indent: usize) -> String {
    wrap_to(text, indent, get_terminal_width())
}

fn wrap_to(text: &str, indent: usize, width: usize) -> String {
    let available = width.saturating_sub(indent);
    if available < 10 {
        return text.to_string();
    }

    let pad = " ".repeat(indent);
    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() { 0 } else { 1 } + word.chars().count();
            if !line.is_empty() && line.chars().count() + needed > available {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines.join(&format!("\n{}", pad))
}

/// Color used for a gate name.
pub fn gate_color(gate: Gate) -> Color {
    match gate {
        Gate::Spark => Color::Yellow,
        Gate::Seed => Color::Green,
        Gate::Scaffold => Color::Cyan,
        Gate::Ship => Color::Blue,
        Gate::Scale => Color::Magenta,
        Gate::Killed => Color::Red,
        Gate::Parked => Color::White,
    }
}

/// Renders `text` with ANSI color codes when `use_color` is set.
pub fn paint(text: &str, color: Color, bold: bool, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let mut buffer = termcolor::Buffer::ansi();
    let _ = buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold));
    let _ = write!(buffer, "{}", text);
    let _ = buffer.reset();
    String::from_utf8_lossy(buffer.as_slice()).into_owned()
}

/// Prints a status line with a colored prefix to stderr.
pub fn print_status(prefix: &str, prefix_color: Color, message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(prefix_color)).set_bold(true));
    let _ = write!(stderr, "{} ", prefix);
    let _ = stderr.reset();
    let _ = writeln!(stderr, "{}", message);
}

/// Prints a warning line to stderr.
pub fn print_warning(message: &str) {
    print_status("⚠", Color::Yellow, message);
}
