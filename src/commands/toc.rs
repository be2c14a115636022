//! Handler for the `toc` command.

use anyhow::Result;

use rendoc_lib::{Heading, Renderer};

use super::{load_options, read_input};
use crate::ConfigArgs;

/// Print the ToC of one document as an indented list
pub fn handle_toc(path: &str, config: &ConfigArgs) -> Result<()> {
    let options = load_options(config)?;
    let (_, body) = read_input(path)?;
    let document = Renderer::new(options).render(&body);
    print!("{}", format_toc(&document.headings));
    Ok(())
}

fn format_toc(headings: &[Heading]) -> String {
    let Some(top) = headings.iter().map(|h| h.level).min() else {
        return String::new();
    };
    headings
        .iter()
        .map(|h| {
            let indent = "  ".repeat(usize::from(h.level - top));
            format!("{indent}- {} (#{})\n", h.title, h.id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(id: &str, level: u8) -> Heading {
        Heading {
            id: id.to_string(),
            title: id.to_uppercase(),
            level,
        }
    }

    #[test]
    fn test_format_toc_indents_relative_to_top_level() {
        let toc = format_toc(&[heading("a", 2), heading("b", 3), heading("c", 2)]);
        assert_eq!(toc, "- A (#a)\n  - B (#b)\n- C (#c)\n");
    }

    #[test]
    fn test_format_empty_toc() {
        assert_eq!(format_toc(&[]), "");
    }
}
