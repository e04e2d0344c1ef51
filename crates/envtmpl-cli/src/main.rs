//! envtmpl CLI: render configuration and static files from environment variables.
//!
//! Provides two commands: `render`, which expands a template and writes the
//! result, and `check`, which only validates template syntax.
//!
//! Both delegate to [`envtmpl_core::TemplateRenderer`].

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "envtmpl",
    about = "Render configuration and static files from environment variables",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a render config file (JSON). Never searched for.
    #[arg(long, global = true, env = "ENVTMPL_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template with values from the environment
    Render {
        /// Template file, or `-` for stdin
        input: PathBuf,

        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Fail when `required` is given an unset variable
        #[arg(long)]
        strict_required: bool,
    },

    /// Validate template syntax without rendering
    Check {
        /// Template file, or `-` for stdin
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries rendered output
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            input,
            output,
            strict_required,
        } => {
            commands::render::run(
                cli.config.as_deref(),
                &input,
                output.as_deref(),
                strict_required,
            )?;
        }
        Commands::Check { input } => {
            commands::check::run(cli.config.as_deref(), &input)?;
        }
    }

    Ok(())
}
