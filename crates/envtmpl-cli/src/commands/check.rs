use std::path::Path;

use anyhow::{Context, Result};

use crate::output;

/// Parse a template and report syntax errors without executing it.
///
/// No helper runs, so the environment is never read.
pub fn run(config_path: Option<&Path>, input: &Path) -> Result<()> {
    let renderer = super::load_renderer(config_path, input)?;
    let source = super::read_input(input)?;
    let template = renderer
        .parse(&source)
        .with_context(|| format!("invalid template {}", input.display()))?;

    output::print_success(&format!("{} is a valid template", input.display()));
    output::print_key_value("Actions", &template.action_count().to_string());
    Ok(())
}
