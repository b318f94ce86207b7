//! The composition entry point.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use folio_core::{
    ComposeError, RenderRequest, ScanOptions, Segment, collect_definitions, scan_with,
};
use rayon::prelude::*;

use crate::assemble::{ComposedDocument, assemble};
use crate::renderer::{MarkdownRenderer, MdastRenderer, RenderSession};
use crate::transform::transform_in;

/// Turns render requests into HTML documents.
///
/// A composer holds no per-render state, so one instance can serve any
/// number of threads.
#[derive(Clone)]
pub struct Composer {
    renderer: Arc<dyn MarkdownRenderer>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(MdastRenderer::default())
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer").finish_non_exhaustive()
    }
}

impl Composer {
    /// Creates a composer around a base Markdown renderer.
    pub fn new(renderer: impl MarkdownRenderer + 'static) -> Self {
        Self {
            renderer: Arc::new(renderer),
        }
    }

    /// Creates a composer sharing an existing renderer.
    pub fn with_shared_renderer(renderer: Arc<dyn MarkdownRenderer>) -> Self {
        Self { renderer }
    }

    /// Render one request.
    pub fn compose(&self, request: &RenderRequest) -> Result<ComposedDocument, ComposeError> {
        let start = Instant::now();
        let config = &request.config;
        let options = ScanOptions {
            break_phrases: config.break_phrases().to_vec(),
        };
        let scanned = scan_with(&request.markdown_text, &options)?;

        let renderer = self.renderer.as_ref();
        let mut session = RenderSession::new(collect_definitions(&scanned.segments)?);
        let mut fragments = scanned
            .segments
            .iter()
            .map(|segment| transform_in(segment, config, renderer, &mut session))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(closing) = renderer.finish(&session) {
            fragments.push(closing);
        }

        let page_breaks = scanned
            .segments
            .iter()
            .filter(|segment| matches!(segment, Segment::PageBreak))
            .count();
        let directives = scanned
            .segments
            .iter()
            .filter(|segment| segment.is_directive())
            .count();
        let document = assemble(&fragments, config, scanned.diagnostics.warnings);

        log::debug!(
            "composed {} segments ({} directives, {} page breaks) into {} bytes, layout={}, {:?}",
            scanned.segments.len(),
            directives,
            page_breaks,
            document.html.len(),
            if config.is_paged() { "paged" } else { "continuous" },
            start.elapsed()
        );
        Ok(document)
    }

    /// Render independent requests in parallel. Results come back in input
    /// order. `max_threads` caps the worker pool; `None` uses rayon's global
    /// pool.
    pub fn compose_batch(
        &self,
        requests: Vec<RenderRequest>,
        max_threads: Option<usize>,
    ) -> Vec<Result<ComposedDocument, ComposeError>> {
        let start = Instant::now();
        let total = requests.len();
        let failed = AtomicUsize::new(0);

        let pool = max_threads.and_then(|threads| {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => Some(pool),
                Err(err) => {
                    log::warn!(
                        "failed to build a {threads}-thread pool, using the global pool: {err}"
                    );
                    None
                }
            }
        });

        let process = |request: RenderRequest| {
            let result = self.compose(&request);
            if result.is_err() {
                failed.fetch_add(1, Ordering::Relaxed);
            }
            result
        };

        let results: Vec<_> = match pool {
            Some(pool) => pool.install(|| requests.into_par_iter().map(process).collect()),
            None => requests.into_par_iter().map(process).collect(),
        };

        log::debug!(
            "batch composed {} documents ({} failed) in {:?}",
            total,
            failed.load(Ordering::Relaxed),
            start.elapsed()
        );
        results
    }
}
