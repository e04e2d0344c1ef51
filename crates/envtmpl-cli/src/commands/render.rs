use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::output;

/// Render a template with values from the environment.
///
/// The rendered bytes go to `output_path` when given, otherwise to stdout.
/// Nothing is written unless rendering succeeds in full.
pub fn run(
    config_path: Option<&Path>,
    input: &Path,
    output_path: Option<&Path>,
    strict_required: bool,
) -> Result<()> {
    let mut renderer = super::load_renderer(config_path, input)?;
    if strict_required {
        let config = envtmpl_core::RenderConfig {
            strict_required: true,
            ..renderer.config().clone()
        };
        renderer = renderer.with_config(config)?;
    }

    let source = super::read_input(input)?;
    let rendered = renderer
        .generate_template(&source)
        .with_context(|| format!("failed to render {}", input.display()))?;

    match output_path {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            output::print_success("Template rendered");
            output::print_key_value("Input", &input.display().to_string());
            output::print_key_value("Output", &path.display().to_string());
            output::print_key_value("Size", &format!("{} bytes", rendered.len()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
