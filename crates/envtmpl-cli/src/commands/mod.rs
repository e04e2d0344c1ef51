//! CLI command implementations for envtmpl.
//!
//! Each module corresponds to a subcommand (`envtmpl <command>`).

pub mod check;
pub mod render;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use envtmpl_core::{RenderConfig, TemplateRenderer};

/// Build a renderer from an explicit config file, or defaults.
///
/// Without a config file the template is named after the input file so
/// diagnostics point at it.
pub fn load_renderer(config_path: Option<&Path>, input: &Path) -> Result<TemplateRenderer> {
    let config = match config_path {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig {
            name: display_name(input),
            ..RenderConfig::default()
        },
    };
    tracing::debug!(?config, "render config");
    Ok(TemplateRenderer::new().with_config(config)?)
}

/// Read the template source; `-` means stdin.
pub fn read_input(input: &Path) -> Result<Vec<u8>> {
    if is_stdin(input) {
        let mut source = Vec::new();
        std::io::stdin()
            .read_to_end(&mut source)
            .context("failed to read template from stdin")?;
        return Ok(source);
    }
    std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))
}

pub fn display_name(input: &Path) -> String {
    if is_stdin(input) {
        return "stdin".into();
    }
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

fn is_stdin(input: &Path) -> bool {
    input == Path::new("-")
}
