//! Handler for the `schema` command.

use anyhow::{Context, Result};
use schemars::schema_for;

use rendoc_lib::RenderOptions;

/// Print the JSON schema for `.rendoc.toml`
pub fn handle_schema() -> Result<()> {
    let schema = schema_for!(RenderOptions);
    let schema_json = serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?;
    println!("{schema_json}");
    Ok(())
}
