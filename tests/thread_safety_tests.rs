use rendoc_lib::{RenderOptions, Renderer};
use std::sync::Arc;
use std::thread;

fn document(i: usize) -> String {
    format!("# Doc {i}\n\n## Doc {i}\n\n::: tip T{i}\nbody `{i}`\n:::\n\n```rust\nlet x = {i};\n```\n")
}

#[test]
fn test_shared_renderer_across_threads() {
    let renderer = Arc::new(Renderer::new(RenderOptions::default()));
    let expected: Vec<_> = (0..8).map(|i| renderer.render(&document(i))).collect();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let renderer = Arc::clone(&renderer);
            thread::spawn(move || (i, renderer.render(&document(i))))
        })
        .collect();

    for handle in handles {
        let (i, doc) = handle.join().unwrap();
        assert_eq!(doc, expected[i]);
        assert_eq!(doc.headings[1].id, format!("toc-doc-{i}-1"));
    }
}

#[test]
fn test_concurrent_renderers_with_different_options() {
    thread::scope(|scope| {
        for prefix in ["a-", "b-", "c-"] {
            scope.spawn(move || {
                let mut options = RenderOptions::default();
                options.headings.id_prefix = prefix.to_string();
                let doc = Renderer::new(options).render("# Same\n");
                assert_eq!(doc.headings[0].id, format!("{prefix}same"));
            });
        }
    });
}
