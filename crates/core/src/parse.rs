//! markdown-rs parse options and the mdast adapter.

use markdown::mdast::Node;
use markdown::message::{Message, Place};

use crate::error::{ComposeError, SourceLocation};

/// Which Markdown constructs the parser accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// GitHub Flavored Markdown: tables, task lists, strikethrough,
    /// footnotes and autolink literals.
    pub gfm: bool,
    /// Pass raw HTML through as `Html` nodes.
    pub raw_html: bool,
}

impl ParseOptions {
    /// GFM plus raw HTML passthrough.
    pub const fn document() -> Self {
        Self {
            gfm: true,
            raw_html: true,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..markdown::Constructs::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::document()
    }
}

/// Parse Markdown into an mdast tree.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, ComposeError> {
    markdown::to_mdast(input, &options.to_markdown()).map_err(|err| {
        ComposeError::MarkdownAdapter {
            message: err.reason.clone(),
            location: message_location(&err),
        }
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match message.place.as_deref() {
        Some(Place::Point(point)) => SourceLocation::new(point.line, point.column),
        Some(Place::Position(position)) => {
            SourceLocation::new(position.start.line, position.start.column)
        }
        None => SourceLocation::line_start(1),
    }
}
