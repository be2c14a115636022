//! Command handlers for the rendoc CLI.
//!
//! Each subcommand has its own module with a public handler function
//! that `main()` dispatches to.

pub mod css;
pub mod render;
pub mod schema;
pub mod toc;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use rendoc_lib::RenderOptions;

use crate::ConfigArgs;

/// Display name used for standard input
pub const STDIN_NAME: &str = "<stdin>";

/// Resolve render options from `--config`, discovery, or defaults
pub fn load_options(args: &ConfigArgs) -> Result<RenderOptions> {
    if args.no_config {
        return Ok(RenderOptions::default());
    }
    if let Some(path) = &args.config {
        return RenderOptions::load(path).with_context(|| format!("Failed to load config {}", path.display()));
    }

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    match RenderOptions::discover(&cwd)? {
        Some((path, options)) => {
            log::debug!("Loaded config from {}", path.display());
            Ok(options)
        }
        None => Ok(RenderOptions::default()),
    }
}

/// Read one input (`-` is stdin) and return its display name and body with
/// front matter removed
pub fn read_input(path: &str) -> Result<(String, String)> {
    let content = if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read standard input")?;
        buf
    } else {
        fs::read_to_string(Path::new(path)).with_context(|| format!("Failed to read {path}"))?
    };

    let name = if path == "-" { STDIN_NAME } else { path };
    let body = rendoc_lib::utils::strip_front_matter(&content).to_string();
    Ok((name.to_string(), body))
}
