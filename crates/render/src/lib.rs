#![deny(missing_docs)]
//! Folio rendering: Markdown to HTML, directive transformation and document
//! assembly.
//!
//! ```
//! use folio_core::{RenderConfig, RenderMode, RenderRequest};
//! use folio_render::Composer;
//!
//! let config = RenderConfig::builder()
//!     .mode(RenderMode::Production)
//!     .build()
//!     .unwrap();
//! let request = RenderRequest::new("# Report\n\n[[PAGEBREAK]]\n\nPage two", config);
//! let document = Composer::default().compose(&request).unwrap();
//! assert!(document.html.contains("@page{size:A4 portrait;margin:20mm;}"));
//! ```

/// HTML document assembly and stylesheet generation.
pub mod assemble;
/// Composition entry point.
pub mod engine;
/// Raw `<img>` width normalization.
pub mod images;
/// Base Markdown renderer.
pub mod renderer;
/// Segment to HTML transformation.
pub mod transform;

pub use assemble::{ComposedDocument, assemble};
pub use engine::Composer;
pub use renderer::{MarkdownRenderer, MdastRenderer, Options as MdastOptions, RenderSession};
pub use transform::{PAGE_BREAK_HTML, transform, transform_in};
