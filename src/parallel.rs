/// Batch rendering for multiple documents
///
/// Documents are independent, so a batch is rendered across the rayon pool
/// when the `parallel` feature is enabled. Output order always matches input
/// order.
use crate::{RenderOptions, RenderedDocument, Renderer};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::time::Instant;

/// Configuration for batch execution
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Enable/disable parallel execution
    pub enabled: bool,
    /// Minimum number of documents before the thread pool is used
    pub min_file_count: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_file_count: 2,
        }
    }
}

/// Renders `(name, source)` pairs with one shared [`Renderer`]
pub struct BatchRenderer {
    config: ParallelConfig,
    renderer: Renderer,
}

impl BatchRenderer {
    pub fn new(config: ParallelConfig, options: RenderOptions) -> Self {
        Self {
            config,
            renderer: Renderer::new(options),
        }
    }

    pub fn with_default_config(options: RenderOptions) -> Self {
        Self::new(ParallelConfig::default(), options)
    }

    /// Render every document, preserving input order
    pub fn render_all(&self, files: &[(String, String)]) -> Vec<(String, RenderedDocument)> {
        let start = Instant::now();
        let results = if self.should_use_parallel(files) {
            self.render_parallel(files)
        } else {
            files.iter().map(|(name, source)| self.render_one(name, source)).collect()
        };
        log::debug!("Rendered {} documents in {:?}", files.len(), start.elapsed());
        results
    }

    #[cfg(feature = "parallel")]
    fn render_parallel(&self, files: &[(String, String)]) -> Vec<(String, RenderedDocument)> {
        files.par_iter().map(|(name, source)| self.render_one(name, source)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn render_parallel(&self, files: &[(String, String)]) -> Vec<(String, RenderedDocument)> {
        files.iter().map(|(name, source)| self.render_one(name, source)).collect()
    }

    fn render_one(&self, name: &str, source: &str) -> (String, RenderedDocument) {
        let start = Instant::now();
        let doc = self.renderer.render(source);
        let duration = start.elapsed();
        if duration.as_millis() > 1000 {
            log::debug!("Document {name} took {duration:?}");
        }
        (name.to_string(), doc)
    }

    /// Determine if the thread pool should be used
    pub fn should_use_parallel(&self, files: &[(String, String)]) -> bool {
        if !cfg!(feature = "parallel") || !self.config.enabled {
            return false;
        }

        if files.len() < self.config.min_file_count {
            return false;
        }

        #[cfg(feature = "parallel")]
        if rayon::current_num_threads() < 2 {
            return false;
        }

        true
    }
}

/// Render a batch of `(name, source)` pairs; results are in input order
pub fn render_batch(files: &[(String, String)], options: &RenderOptions) -> Vec<(String, RenderedDocument)> {
    BatchRenderer::with_default_config(options.clone()).render_all(files)
}
