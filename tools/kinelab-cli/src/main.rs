//! kinelab - skeletal pose and skinning tool
//!
//! # Commands
//!
//! - `kinelab pose` - local and world transform of every joint
//! - `kinelab skin` - skinning matrices of `[pose]` against the bind pose
//! - `kinelab assign` - dominant joint of every vertex in an OBJ file
//! - `kinelab animate` - skinning matrices per frame, one JSON object per line
//! - `kinelab check` - validate a manifest without printing matrices
//!
//! Reports go to stdout as JSON; logs go to stderr. `RUST_LOG`, when set,
//! replaces the default `info` (or `debug` with `--verbose`) filter.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use kinelab_cli::manifest::{Manifest, ModelName};
use kinelab_cli::{commands, obj};

#[derive(Parser)]
#[command(name = "kinelab")]
#[command(about = "Skeletal pose and skinning tool")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print local and world joint transforms for [pose]
    Pose {
        /// Path to kinelab.toml manifest
        #[arg(default_value = "kinelab.toml")]
        manifest: PathBuf,
    },

    /// Print skinning matrices for [pose] against the bind pose
    Skin {
        /// Path to kinelab.toml manifest
        #[arg(default_value = "kinelab.toml")]
        manifest: PathBuf,
    },

    /// Assign every vertex of an OBJ file to a joint
    Assign {
        /// Input OBJ file (only `v` lines are read)
        input: PathBuf,

        /// Model whose region rules apply
        #[arg(short, long, value_enum, default_value = "lower-limb")]
        model: ModelName,
    },

    /// Sample [animation] and print skinning matrices per frame
    Animate {
        /// Path to kinelab.toml manifest
        #[arg(default_value = "kinelab.toml")]
        manifest: PathBuf,

        /// Stop after this many frames
        #[arg(short, long)]
        frames: Option<usize>,
    },

    /// Validate manifest, skeleton and bind pose
    Check {
        /// Path to kinelab.toml manifest
        #[arg(default_value = "kinelab.toml")]
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pose { manifest } => {
            tracing::info!("Evaluating pose from {:?}", manifest);
            let manifest = Manifest::load(&manifest)?;
            print_pretty(&commands::pose(&manifest)?)?;
        }

        Commands::Skin { manifest } => {
            tracing::info!("Computing skinning matrices from {:?}", manifest);
            let manifest = Manifest::load(&manifest)?;
            print_pretty(&commands::skin(&manifest)?)?;
        }

        Commands::Assign { input, model } => {
            let vertices = obj::read_vertices(&input)?;
            print_pretty(&commands::assign(model, &vertices))?;
        }

        Commands::Animate { manifest, frames } => {
            tracing::info!("Sampling animation from {:?}", manifest);
            let manifest = Manifest::load(&manifest)?;
            for frame in commands::animate(&manifest, frames)? {
                println!("{}", serde_json::to_string(&frame)?);
            }
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let manifest = Manifest::load(&manifest)?;
            print_pretty(&commands::check(&manifest)?)?;
            tracing::info!("Manifest is valid!");
        }
    }

    Ok(())
}

fn print_pretty<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// `RUST_LOG` when it parses, otherwise `info` (`debug` with `--verbose`)
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn verbosity_sets_default_level() {
        assert_eq!(log_filter(false, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(true, None).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn rust_log_replaces_default_level() {
        assert_eq!(
            log_filter(false, Some("trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
        assert_eq!(
            log_filter(true, Some("warn")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
