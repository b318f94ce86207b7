#![deny(missing_docs)]
//! Folio core: configuration, directive scanning and Markdown parsing.
//!
//! The scanner splits raw Markdown into [`Segment`]s. Rendering the segments
//! into HTML lives in `folio-render`.

/// Callout kinds and `:::` / `> [!KIND]` line parsing.
pub mod callout;
/// Code fence detection utilities.
pub mod code_fence;
/// Rendering configuration and its builder.
pub mod config;
/// Document-wide link and footnote definitions.
pub mod definitions;
/// Core error and diagnostic types.
pub mod error;
/// Width-annotated image tokens.
pub mod image;
/// markdown-rs parse options.
pub mod parse;
/// Render requests and the form boundary.
pub mod request;
/// Directive scanner.
pub mod scanner;
/// Heading slugs.
pub mod slug;
/// Soft newline collapsing.
pub mod soft_breaks;

pub use callout::{CalloutKind, CalloutOpening, DirectiveLine, parse_directive_line};
pub use code_fence::{FencePhase, FenceState, LineOutcome, advance_fence_state};
pub use config::{
    CssLength, LengthUnit, Orientation, PageMargin, PageSize, RenderConfig, RenderConfigBuilder,
    RenderMode, TitlePage, mm_to_px,
};
pub use definitions::collect_definitions;
pub use error::{ComposeError, ParseDiagnostics, ParseWarning, SourceLocation};
pub use parse::{ParseOptions, parse_mdast};
pub use request::{FormFields, RenderRequest};
pub use scanner::{PAGE_BREAK_MARKER, ScanOptions, ScanOutput, Segment, scan, scan_with};
pub use slug::{Slugger, slugify};
pub use soft_breaks::collapse_soft_newlines;
