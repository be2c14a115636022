//! Handler for the `css` command.

use anyhow::Result;

use rendoc_lib::Highlighter;
use rendoc_lib::highlight::available_themes;

use super::load_options;
use crate::ConfigArgs;

/// Print the stylesheet for `theme`, or the theme list
pub fn handle_css(theme: &str, list: bool, config: &ConfigArgs) -> Result<()> {
    if list {
        for name in available_themes() {
            println!("{name}");
        }
        return Ok(());
    }

    let options = load_options(config)?;
    let highlighter = Highlighter::new(options.code.class_style, &options.code.inline_language);
    let css = highlighter
        .css_for_theme(theme)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    print!("{css}");
    Ok(())
}
