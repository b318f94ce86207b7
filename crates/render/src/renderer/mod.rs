//! Base Markdown renderer.
//!
//! The composer only depends on the [`MarkdownRenderer`] trait, so tests and
//! embedders can swap the implementation. [`MdastRenderer`] is the default:
//! it parses with markdown-rs (GFM plus raw HTML) and walks the mdast tree.
//!
//! # Module Structure
//!
//! - `context` - Per-fragment rendering state (output buffer, scopes)
//! - `render` - Node rendering functions
//! - `session` - Document-wide state (definitions, slugs, footnotes)

mod context;
mod render;
mod session;

use std::borrow::Cow;

use folio_core::{ComposeError, ParseOptions, parse_mdast};
use markdown::mdast::Node;

pub use render::extract_text_from_nodes;
pub use session::RenderSession;

/// Ends the definitions prelude so no container opened there can absorb the
/// fragment's first lines.
const PRELUDE_END: &str = "<!-- -->";

/// Converts a plain Markdown fragment into HTML.
///
/// Implementations must be stateless across calls; the composer renders
/// segments independently and possibly on several threads.
pub trait MarkdownRenderer: Send + Sync {
    /// Render one standalone Markdown document.
    fn render(&self, markdown: &str) -> Result<String, ComposeError>;

    /// Render one fragment of a composed document. Link and footnote
    /// definitions, heading slugs and footnotes are shared through
    /// `session`.
    fn render_fragment(
        &self,
        markdown: &str,
        session: &mut RenderSession,
    ) -> Result<String, ComposeError> {
        let _ = session;
        self.render(markdown)
    }

    /// Markup closing the document, emitted once after the last fragment.
    fn finish(&self, session: &RenderSession) -> Option<String> {
        let _ = session;
        None
    }
}

impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> Result<String, ComposeError> + Send + Sync,
{
    fn render(&self, markdown: &str) -> Result<String, ComposeError> {
        (self)(markdown)
    }
}

/// Rendering options for the mdast renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Pass raw HTML through instead of escaping it.
    pub raw_html: bool,
    /// Append a `#` permalink to every heading.
    pub heading_anchors: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            raw_html: true,
            heading_anchors: true,
        }
    }
}

/// markdown-rs backed renderer.
#[derive(Debug, Clone, Default)]
pub struct MdastRenderer {
    options: Options,
}

impl MdastRenderer {
    /// Creates a renderer with the given options.
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Returns the renderer options.
    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl MarkdownRenderer for MdastRenderer {
    fn render(&self, markdown: &str) -> Result<String, ComposeError> {
        let mut session = RenderSession::default();
        let mut html = self.render_fragment(markdown, &mut session)?;
        if let Some(footnotes) = self.finish(&session) {
            html.push_str(&footnotes);
        }
        Ok(html)
    }

    /// The document's definitions are parsed ahead of the fragment so
    /// references resolve whichever segment holds them. Only footnote
    /// bodies are taken from that prelude.
    fn render_fragment(
        &self,
        markdown: &str,
        session: &mut RenderSession,
    ) -> Result<String, ComposeError> {
        let parse_options = ParseOptions {
            gfm: true,
            raw_html: self.options.raw_html,
        };
        let (source, prelude_len) = if session.definitions().is_empty() {
            (Cow::Borrowed(markdown), 0)
        } else {
            let prelude = format!("{}\n\n{PRELUDE_END}\n\n", session.definitions());
            let prelude_len = prelude.len();
            (Cow::Owned(prelude + markdown), prelude_len)
        };

        let root = parse_mdast(&source, &parse_options)?;
        let mut ctx = context::Context::new(&self.options, &root, session);
        for node in root.children().into_iter().flatten() {
            let in_prelude = node
                .position()
                .is_some_and(|position| position.start.offset < prelude_len);
            if in_prelude && !matches!(node, Node::FootnoteDefinition(_)) {
                continue;
            }
            render::render_node(node, &mut ctx);
        }
        Ok(ctx.finish())
    }

    fn finish(&self, session: &RenderSession) -> Option<String> {
        session.footnotes_html()
    }
}
