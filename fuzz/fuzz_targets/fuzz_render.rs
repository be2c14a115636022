#![no_main]

//! Fuzz target that renders arbitrary text and checks the output contract:
//! rendering never panics, is deterministic, and heading ids are unique.

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use rendoc_lib::{RenderOptions, Renderer};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    if content.len() > 50_000 {
        return;
    }

    let renderer = Renderer::new(RenderOptions::default());
    let first = renderer.render(content);
    let second = renderer.render(content);
    assert_eq!(first, second, "render is not deterministic");

    let mut seen = HashSet::new();
    for heading in &first.headings {
        assert!(seen.insert(heading.id.as_str()), "duplicate heading id {}", heading.id);
    }
});
