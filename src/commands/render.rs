//! Handler for the `render` command.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use rendoc_lib::{RenderedDocument, render_batch};

use super::{STDIN_NAME, load_options, read_input};
use crate::{ConfigArgs, OutputFormat};

#[derive(Serialize)]
struct NamedDocument<'a> {
    path: &'a str,
    #[serde(flatten)]
    document: &'a RenderedDocument,
}

/// Render every input and write to stdout or `output_dir`
pub fn handle_render(
    paths: &[String],
    config: &ConfigArgs,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> Result<()> {
    let options = load_options(config)?;
    let inputs = paths.iter().map(|p| read_input(p)).collect::<Result<Vec<_>>>()?;
    let results = render_batch(&inputs, &options);

    if let Some(dir) = output_dir {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        for (name, document) in &results {
            let target = output_path(dir, name, format);
            fs::write(&target, format_document(document, format)?)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            log::info!("{name} -> {}", target.display());
        }
        return Ok(());
    }

    match (format, results.as_slice()) {
        (OutputFormat::Json, [(_, document)]) => println!("{}", serde_json::to_string_pretty(document)?),
        (OutputFormat::Json, many) => {
            let named: Vec<NamedDocument> = many
                .iter()
                .map(|(path, document)| NamedDocument { path, document })
                .collect();
            println!("{}", serde_json::to_string_pretty(&named)?);
        }
        (OutputFormat::Html, docs) => {
            for (_, document) in docs {
                print!("{}", document.html);
            }
        }
    }
    Ok(())
}

fn format_document(document: &RenderedDocument, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Html => document.html.clone(),
        OutputFormat::Json => serde_json::to_string_pretty(document)? + "\n",
    })
}

fn output_path(dir: &Path, name: &str, format: OutputFormat) -> PathBuf {
    let stem = if name == STDIN_NAME {
        "stdin".to_string()
    } else {
        Path::new(name)
            .file_stem()
            .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned())
    };
    let extension = match format {
        OutputFormat::Html => "html",
        OutputFormat::Json => "json",
    };
    dir.join(format!("{stem}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let dir = Path::new("out");
        assert_eq!(output_path(dir, "docs/guide.md", OutputFormat::Html), dir.join("guide.html"));
        assert_eq!(output_path(dir, STDIN_NAME, OutputFormat::Json), dir.join("stdin.json"));
    }
}
