//! Link reference and footnote definitions shared across segments.
//!
//! The scanner splits a document into independently rendered segments, but
//! `[label]: url` and `[^id]: text` definitions are document-wide: authors
//! usually collect them at the very end, after page breaks and callouts.
//! [`collect_definitions`] gathers their source text so every segment can be
//! parsed with them in scope.

use markdown::mdast::Node;

use crate::error::ComposeError;
use crate::parse::{ParseOptions, parse_mdast};
use crate::scanner::Segment;

/// Source text of every top-level definition in `segments`, in document
/// order, separated by blank lines. Empty when there are none.
pub fn collect_definitions(segments: &[Segment]) -> Result<String, ComposeError> {
    let options = ParseOptions::document();
    let mut collected: Vec<&str> = Vec::new();

    for segment in segments {
        let source = match segment {
            Segment::Text(markdown) => markdown.as_str(),
            Segment::Callout { body, .. } => body.as_str(),
            Segment::PageBreak | Segment::Image { .. } => continue,
        };
        if !source.contains("]:") {
            continue;
        }

        let root = parse_mdast(source, &options)?;
        for child in root.children().into_iter().flatten() {
            if !matches!(child, Node::Definition(_) | Node::FootnoteDefinition(_)) {
                continue;
            }
            if let Some(text) = child
                .position()
                .and_then(|position| source.get(position.start.offset..position.end.offset))
            {
                collected.push(text.trim_end());
            }
        }
    }

    Ok(collected.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    fn definitions(input: &str) -> String {
        collect_definitions(&scan(input).unwrap().segments).unwrap()
    }

    #[test]
    fn no_definitions() {
        assert_eq!(definitions("# Title\n\n[[PAGEBREAK]]\n\n[link](https://a.b)"), "");
    }

    #[test]
    fn gathers_across_segments() {
        let input = "See [docs][d].\n\n[[PAGEBREAK]]\n\n:::note\n[n]: /note \"Note\"\n:::\n\n[d]: https://example.com\n[^1]: The footnote body.\n    Continued.";
        assert_eq!(
            definitions(input),
            "[n]: /note \"Note\"\n\n[d]: https://example.com\n\n[^1]: The footnote body.\n    Continued."
        );
    }

    #[test]
    fn definitions_in_code_are_ignored() {
        assert_eq!(definitions("```\n[d]: https://example.com\n```"), "");
    }
}
