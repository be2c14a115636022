use proptest::prelude::*;
use rendoc_lib::{RenderOptions, render};
use std::collections::HashSet;

fn block() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 !?-]{0,12}".prop_map(|t| format!("# {t}\n")),
        "[a-zA-Z0-9 ]{0,12}".prop_map(|t| format!("## {t}\n")),
        "[a-z]{1,6}".prop_map(|t| format!("##### {t}\n")),
        Just("### Title\n".to_string()),
        Just("### Title 1\n".to_string()),
        "[a-z *_`]{1,20}".prop_map(|t| format!("{t}\n")),
        Just("::: tip\nhello\n:::\n".to_string()),
        Just("::: warn Careful\n".to_string()),
        Just(":::\n".to_string()),
        Just("```rust\nfn main() {}\n```\n".to_string()),
        Just("```mermaid\ngraph TD; A-->B;\n```\n".to_string()),
        Just("```\n".to_string()),
        Just("- item\n".to_string()),
        Just("> quote\n".to_string()),
        Just("\n".to_string()),
    ]
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(block(), 0..24).prop_map(|blocks| blocks.concat())
}

proptest! {
    #[test]
    fn render_is_deterministic(source in document()) {
        let options = RenderOptions::default();
        prop_assert_eq!(render(&source, &options), render(&source, &options));
    }

    #[test]
    fn heading_ids_are_unique(source in document()) {
        let doc = render(&source, &RenderOptions::default());
        let mut seen = HashSet::new();
        for heading in &doc.headings {
            prop_assert!(seen.insert(heading.id.clone()), "duplicate id {}", heading.id);
        }
    }

    #[test]
    fn toc_matches_document_order(source in document()) {
        let doc = render(&source, &RenderOptions::default());
        let mut last = None;
        for heading in &doc.headings {
            let needle = format!("id=\"{}\"", heading.id);
            let position = doc.html.find(&needle);
            prop_assert!(position.is_some(), "id {} missing from html", heading.id);
            prop_assert!(last < position);
            last = position;
        }
    }

    #[test]
    fn arbitrary_text_never_panics(source in "\\PC{0,300}") {
        let doc = render(&source, &RenderOptions::default());
        prop_assert!(doc.headings.iter().all(|h| (1..=4).contains(&h.level)));
    }
}
