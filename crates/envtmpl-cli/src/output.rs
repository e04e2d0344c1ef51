//! Terminal output formatting for the envtmpl CLI.
//!
//! Status lines go to stderr so they never mix with rendered output on
//! stdout. Colors come from the [`console`] crate.

use console::style;

/// Print a success message prefixed with green `[OK]`.
pub fn print_success(text: &str) {
    eprintln!("{} {}", style("[OK]").green().bold(), text);
}

/// Print a key-value pair with dimmed key formatting.
pub fn print_key_value(key: &str, value: &str) {
    eprintln!("  {}: {}", style(key).dim(), value);
}
