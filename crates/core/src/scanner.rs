//! Directive scanner.
//!
//! Splits raw Markdown into an ordered list of [`Segment`]s: maximal runs of
//! plain Markdown plus the directives layered on top of it (page breaks,
//! callouts, width-annotated images). Recognition works on line boundaries
//! through a small state machine:
//!
//! ```text
//!            fence opener                 ::: closer / end of alert
//!   Normal ───────────────▶ InCodeFence   InCallout ─────────────────▶ Normal
//!      ▲   ◀─────────────── (fence closer)    ▲
//!      └──────────────── :::kind / > [!KIND] ─┘
//! ```
//!
//! Directives are never recognized inside fenced code.

use std::mem;

use crate::callout::{
    CalloutKind, DirectiveLine, is_callout_closer, parse_alert_marker, parse_directive_line,
    strip_quote_prefix,
};
use crate::code_fence::{FenceState, advance_fence_state, is_indented_code_line};
use crate::error::{ComposeError, ParseDiagnostics, ParseWarning, SourceLocation};
use crate::image::{InlinePiece, has_width_image, split_width_images};

/// Reserved page-break marker. Must be the only content of its line.
pub const PAGE_BREAK_MARKER: &str = "[[PAGEBREAK]]";

/// One unit of scanned input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain Markdown source.
    Text(String),
    /// Forced page break.
    PageBreak,
    /// Callout block.
    Callout {
        /// Callout kind.
        kind: CalloutKind,
        /// Title from the opener line, if any.
        title: Option<String>,
        /// Markdown body between the opener and the closer. Page breaks
        /// inside it are normalized to a bare [`PAGE_BREAK_MARKER`] line.
        body: String,
        /// 1-based source line of the first body line.
        body_line: usize,
    },
    /// Image with an explicit width.
    Image {
        /// Alternative text.
        alt: String,
        /// Image URL.
        url: String,
        /// Width as a percentage of the content column.
        width_percent: Option<u8>,
    },
}

impl Segment {
    /// Returns true for every variant other than [`Segment::Text`].
    pub fn is_directive(&self) -> bool {
        !matches!(self, Segment::Text(_))
    }
}

/// Scanner options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Extra whole-line page-break phrases, compared case-insensitively
    /// against the trimmed line. Expected lowercase.
    pub break_phrases: Vec<String>,
}

impl ScanOptions {
    fn is_break_phrase(&self, trimmed: &str) -> bool {
        !trimmed.is_empty()
            && self
                .break_phrases
                .iter()
                .any(|phrase| phrase.eq_ignore_ascii_case(trimmed))
    }
}

/// Result of scanning a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    /// Segments in source order.
    pub segments: Vec<Segment>,
    /// Non-fatal findings.
    pub diagnostics: ParseDiagnostics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalloutSyntax {
    /// `:::kind` ... `:::`
    Colons,
    /// `> [!KIND]` followed by quoted lines.
    Alert,
}

#[derive(Debug)]
struct OpenCallout<'a> {
    kind: CalloutKind,
    title: Option<String>,
    syntax: CalloutSyntax,
    opened_at: usize,
    body: Vec<&'a str>,
    body_fence: FenceState,
}

#[derive(Debug)]
enum ScanState<'a> {
    Normal,
    InCodeFence { fence: FenceState, opened_at: usize },
    InCallout(OpenCallout<'a>),
}

/// Scan Markdown with default options.
pub fn scan(input: &str) -> Result<ScanOutput, ComposeError> {
    scan_with(input, &ScanOptions::default())
}

/// Scan Markdown into segments.
pub fn scan_with(input: &str, options: &ScanOptions) -> Result<ScanOutput, ComposeError> {
    Scanner::new(options).run(input)
}

struct Scanner<'o> {
    options: &'o ScanOptions,
    segments: Vec<Segment>,
    text: String,
    diagnostics: ParseDiagnostics,
}

impl<'o> Scanner<'o> {
    fn new(options: &'o ScanOptions) -> Self {
        Self {
            options,
            segments: Vec::new(),
            text: String::new(),
            diagnostics: ParseDiagnostics::new(),
        }
    }

    fn run(mut self, input: &str) -> Result<ScanOutput, ComposeError> {
        let lines: Vec<&str> = input.lines().collect();
        let mut state = ScanState::Normal;
        let mut idx = 0;

        while idx < lines.len() {
            let line = lines[idx];
            let line_no = idx + 1;

            state = match state {
                ScanState::Normal => self.normal_line(line, line_no)?,
                ScanState::InCodeFence { fence, opened_at } => {
                    self.push_text_line(line);
                    let outcome = advance_fence_state(line, fence);
                    if outcome.next_state.is_open() {
                        ScanState::InCodeFence {
                            fence: outcome.next_state,
                            opened_at,
                        }
                    } else {
                        ScanState::Normal
                    }
                }
                ScanState::InCallout(open) => match self.callout_line(open, line, line_no)? {
                    Some(next) => next,
                    None => {
                        // The alert ended on the previous line; rescan this one.
                        state = ScanState::Normal;
                        continue;
                    }
                },
            };
            idx += 1;
        }

        match state {
            ScanState::Normal => {}
            ScanState::InCodeFence { fence, opened_at } => {
                let warning = ParseWarning::UnclosedCodeFence {
                    location: SourceLocation::line_start(opened_at),
                    marker: fence.marker.unwrap_or('`'),
                };
                log::warn!("{warning}");
                self.diagnostics.add_warning(warning);
            }
            ScanState::InCallout(open) => match open.syntax {
                CalloutSyntax::Alert => self.close_callout(open),
                CalloutSyntax::Colons => {
                    return Err(ComposeError::directive_syntax(
                        format!(
                            "unterminated `:::{}` callout: missing closing `:::` line",
                            open.kind
                        ),
                        open.opened_at,
                        1,
                    ));
                }
            },
        }

        self.flush_text();
        Ok(ScanOutput {
            segments: self.segments,
            diagnostics: self.diagnostics,
        })
    }

    fn normal_line<'a>(
        &mut self,
        line: &'a str,
        line_no: usize,
    ) -> Result<ScanState<'a>, ComposeError> {
        let fence = advance_fence_state(line, FenceState::default());
        if fence.is_code {
            self.push_text_line(line);
            return Ok(ScanState::InCodeFence {
                fence: fence.next_state,
                opened_at: line_no,
            });
        }

        if is_indented_code_line(line) {
            self.push_text_line(line);
            return Ok(ScanState::Normal);
        }

        if self.is_break_line(line) {
            self.push_segment(Segment::PageBreak);
            return Ok(ScanState::Normal);
        }

        match parse_directive_line(line) {
            Some(DirectiveLine::Callout(opening)) => {
                return Ok(ScanState::InCallout(OpenCallout {
                    kind: opening.kind,
                    title: opening.title,
                    syntax: CalloutSyntax::Colons,
                    opened_at: line_no,
                    body: Vec::new(),
                    body_fence: FenceState::default(),
                }));
            }
            Some(DirectiveLine::UnknownKind(kind)) => {
                let column = line.len() - line.trim_start().len() + 1;
                return Err(ComposeError::unknown_callout_kind(kind, line_no, column));
            }
            Some(DirectiveLine::PageBreak) | None => {}
        }

        if let Some(kind) = parse_alert_marker(line) {
            return Ok(ScanState::InCallout(OpenCallout {
                kind,
                title: None,
                syntax: CalloutSyntax::Alert,
                opened_at: line_no,
                body: Vec::new(),
                body_fence: FenceState::default(),
            }));
        }

        if !has_width_image(line) {
            self.push_text_line(line);
            return Ok(ScanState::Normal);
        }

        for piece in split_width_images(line, line_no)? {
            match piece {
                InlinePiece::Text(text) => self.text.push_str(text),
                InlinePiece::Image {
                    alt,
                    url,
                    width_percent,
                } => self.push_segment(Segment::Image {
                    alt: alt.to_string(),
                    url: url.to_string(),
                    width_percent: Some(width_percent),
                }),
            }
        }
        self.text.push('\n');
        Ok(ScanState::Normal)
    }

    /// Feed one line to an open callout. `None` means an alert ended before
    /// this line, which must then be scanned again in the normal state.
    fn callout_line<'a>(
        &mut self,
        mut open: OpenCallout<'a>,
        line: &'a str,
        line_no: usize,
    ) -> Result<Option<ScanState<'a>>, ComposeError> {
        match open.syntax {
            CalloutSyntax::Colons if is_callout_closer(line) => {
                self.close_callout(open);
                return Ok(Some(ScanState::Normal));
            }
            CalloutSyntax::Colons => self.push_body_line(&mut open, line, line_no)?,
            CalloutSyntax::Alert => {
                let Some(body_line) = strip_quote_prefix(line) else {
                    self.close_callout(open);
                    return Ok(None);
                };
                self.push_body_line(&mut open, body_line, line_no)?;
            }
        }
        Ok(Some(ScanState::InCallout(open)))
    }

    /// Appends one body line, honouring the body's own code fences: outside
    /// them, page breaks are normalized and width annotations validated.
    fn push_body_line<'a>(
        &self,
        open: &mut OpenCallout<'a>,
        line: &'a str,
        line_no: usize,
    ) -> Result<(), ComposeError> {
        let outcome = advance_fence_state(line, open.body_fence);
        open.body_fence = outcome.next_state;
        if outcome.is_code {
            open.body.push(line);
            return Ok(());
        }
        if self.is_break_line(line) {
            open.body.push(PAGE_BREAK_MARKER);
            return Ok(());
        }
        if has_width_image(line) {
            split_width_images(line, line_no)?;
        }
        open.body.push(line);
        Ok(())
    }

    /// Reserved marker, legacy `:::pagebreak` or a configured phrase.
    fn is_break_line(&self, line: &str) -> bool {
        if is_indented_code_line(line) {
            return false;
        }
        let trimmed = line.trim();
        trimmed == PAGE_BREAK_MARKER
            || self.options.is_break_phrase(trimmed)
            || matches!(parse_directive_line(line), Some(DirectiveLine::PageBreak))
    }

    fn close_callout(&mut self, open: OpenCallout<'_>) {
        self.push_segment(Segment::Callout {
            kind: open.kind,
            title: open.title,
            body: open.body.join("\n"),
            body_line: open.opened_at + 1,
        });
    }

    fn push_text_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
    }

    fn push_segment(&mut self, segment: Segment) {
        self.flush_text();
        self.segments.push(segment);
    }

    fn flush_text(&mut self) {
        if self.text.trim().is_empty() {
            self.text.clear();
        } else {
            self.segments.push(Segment::Text(mem::take(&mut self.text)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(input: &str) -> Vec<Segment> {
        scan(input).expect("scan should succeed").segments
    }

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    #[test]
    fn plain_markdown_is_one_segment() {
        let input = "# Title\n\n- a\n- b\n\n| x | y |\n|---|---|\n| 1 | 2 |";
        assert_eq!(segments(input), vec![text(&format!("{input}\n"))]);
    }

    #[test]
    fn page_break_splits_text() {
        assert_eq!(
            segments("A\n\n[[PAGEBREAK]]\n\nB"),
            vec![text("A\n\n"), Segment::PageBreak, text("\nB\n")]
        );
    }

    #[test]
    fn page_break_tolerates_surrounding_whitespace_only() {
        assert_eq!(segments("  [[PAGEBREAK]]  "), vec![Segment::PageBreak]);
        assert_eq!(
            segments("x [[PAGEBREAK]]"),
            vec![text("x [[PAGEBREAK]]\n")]
        );
        assert_eq!(segments("[[pagebreak]]"), vec![text("[[pagebreak]]\n")]);
    }

    #[test]
    fn consecutive_page_breaks_are_kept() {
        assert_eq!(
            segments("[[PAGEBREAK]]\n[[PAGEBREAK]]"),
            vec![Segment::PageBreak, Segment::PageBreak]
        );
    }

    #[test]
    fn legacy_and_custom_break_phrases() {
        let options = ScanOptions {
            break_phrases: vec!["<!-- newpage -->".to_string()],
        };
        let out = scan_with("a\n:::pagebreak\nb\n<!-- NEWPAGE -->\nc", &options).unwrap();
        assert_eq!(
            out.segments,
            vec![
                text("a\n"),
                Segment::PageBreak,
                text("b\n"),
                Segment::PageBreak,
                text("c\n"),
            ]
        );
    }

    #[test]
    fn callout_with_title() {
        assert_eq!(
            segments("intro\n:::warning Hot\nbody **bold**\n\nmore\n:::\noutro"),
            vec![
                text("intro\n"),
                Segment::Callout {
                    kind: CalloutKind::Warning,
                    title: Some("Hot".to_string()),
                    body: "body **bold**\n\nmore".to_string(),
                    body_line: 3,
                },
                text("outro\n"),
            ]
        );
    }

    #[test]
    fn terminated_callout_succeeds() {
        assert_eq!(
            segments(":::note\nhello\n:::"),
            vec![Segment::Callout {
                kind: CalloutKind::Note,
                title: None,
                body: "hello".to_string(),
                body_line: 2,
            }]
        );
    }

    #[test]
    fn unterminated_callout_is_an_error() {
        let err = scan(":::note\nhello").unwrap_err();
        assert!(err.is_directive_syntax());
        assert_eq!(err.location(), Some(SourceLocation::new(1, 1)));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = scan("text\n\n  :::danger\nboom\n:::").unwrap_err();
        assert_eq!(
            err,
            ComposeError::unknown_callout_kind("danger", 3, 3)
        );
    }

    #[test]
    fn opener_inside_callout_closes_nothing_and_is_body() {
        let out = segments(":::note\n:::tip inner\n:::\nafter");
        assert_eq!(
            out,
            vec![
                Segment::Callout {
                    kind: CalloutKind::Note,
                    title: None,
                    body: ":::tip inner".to_string(),
                    body_line: 2,
                },
                text("after\n"),
            ]
        );
    }

    #[test]
    fn closer_inside_callout_code_fence_still_closes() {
        let out = segments(":::note\n```\n:::\n```");
        assert_eq!(
            out[0],
            Segment::Callout {
                kind: CalloutKind::Note,
                title: None,
                body: "```".to_string(),
                body_line: 2,
            }
        );
    }

    #[test]
    fn stray_closer_is_text() {
        assert_eq!(segments(":::"), vec![text(":::\n")]);
    }

    #[test]
    fn directives_in_code_fence_are_text() {
        let input = "```md\n[[PAGEBREAK]]\n:::note\n![a](u){width=500%}\n```";
        assert_eq!(segments(input), vec![text(&format!("{input}\n"))]);
    }

    #[test]
    fn directives_after_fence_are_recognized() {
        let out = segments("~~~\n:::note\n~~~\n[[PAGEBREAK]]");
        assert_eq!(out, vec![text("~~~\n:::note\n~~~\n"), Segment::PageBreak]);
    }

    #[test]
    fn unclosed_fence_is_a_warning() {
        let out = scan("text\n```\n[[PAGEBREAK]]").unwrap();
        assert_eq!(out.segments.len(), 1);
        assert_eq!(
            out.diagnostics.warnings,
            vec![ParseWarning::UnclosedCodeFence {
                location: SourceLocation::line_start(2),
                marker: '`',
            }]
        );
    }

    #[test]
    fn indented_code_is_not_a_directive() {
        let input = "    [[PAGEBREAK]]\n    :::danger";
        assert_eq!(segments(input), vec![text(&format!("{input}\n"))]);
    }

    #[test]
    fn width_image_becomes_segment() {
        assert_eq!(
            segments("See ![chart](c.png){width=50%} below\nnext"),
            vec![
                text("See "),
                Segment::Image {
                    alt: "chart".to_string(),
                    url: "c.png".to_string(),
                    width_percent: Some(50),
                },
                text(" below\nnext\n"),
            ]
        );
    }

    #[test]
    fn width_out_of_range_is_an_error() {
        let err = scan("a\n![a](u){width=150%}").unwrap_err();
        assert!(err.is_directive_syntax());
        assert_eq!(err.location(), Some(SourceLocation::new(2, 1)));
    }

    #[test]
    fn width_out_of_range_inside_callout_is_an_error() {
        let err = scan(":::tip\n![a](u){width=101%}\n:::").unwrap_err();
        assert_eq!(err.location(), Some(SourceLocation::new(2, 1)));
    }

    #[test]
    fn github_alert_becomes_callout() {
        assert_eq!(
            segments("> [!NOTE]\n> Useful information\n> second line\n\nafter"),
            vec![
                Segment::Callout {
                    kind: CalloutKind::Note,
                    title: None,
                    body: "Useful information\nsecond line".to_string(),
                    body_line: 2,
                },
                text("\nafter\n"),
            ]
        );
    }

    #[test]
    fn unsupported_alert_is_a_plain_blockquote() {
        let input = "> [!IMPORTANT]\n> text";
        assert_eq!(segments(input), vec![text(&format!("{input}\n"))]);
    }

    #[test]
    fn alert_at_end_of_input_closes() {
        assert_eq!(
            segments("> [!TIP]\n> short"),
            vec![Segment::Callout {
                kind: CalloutKind::Tip,
                title: None,
                body: "short".to_string(),
                body_line: 2,
            }]
        );
    }

    #[test]
    fn page_break_inside_callout_is_normalized() {
        let options = ScanOptions {
            break_phrases: vec!["<!-- newpage -->".to_string()],
        };
        let out = scan_with(
            ":::note\nbefore\n  [[PAGEBREAK]]\nmiddle\n<!-- NewPage -->\nafter\n:::",
            &options,
        )
        .unwrap();
        assert_eq!(
            out.segments,
            vec![Segment::Callout {
                kind: CalloutKind::Note,
                title: None,
                body: "before\n[[PAGEBREAK]]\nmiddle\n[[PAGEBREAK]]\nafter".to_string(),
                body_line: 2,
            }]
        );
    }

    #[test]
    fn page_break_in_callout_code_stays_literal() {
        let out = segments(":::tip\n```\n:::pagebreak\n```\n:::");
        assert_eq!(
            out,
            vec![Segment::Callout {
                kind: CalloutKind::Tip,
                title: None,
                body: "```\n:::pagebreak\n```".to_string(),
                body_line: 2,
            }]
        );
    }

    #[test]
    fn alert_body_breaks_and_fences() {
        assert_eq!(
            segments("> [!WARNING]\n> one\n> [[PAGEBREAK]]\n> two"),
            vec![Segment::Callout {
                kind: CalloutKind::Warning,
                title: None,
                body: "one\n[[PAGEBREAK]]\ntwo".to_string(),
                body_line: 2,
            }]
        );

        let out = segments("> [!NOTE]\n> ```md\n> ![a](u){width=150%}\n> ```");
        assert_eq!(
            out,
            vec![Segment::Callout {
                kind: CalloutKind::Note,
                title: None,
                body: "```md\n![a](u){width=150%}\n```".to_string(),
                body_line: 2,
            }]
        );
    }

    #[test]
    fn width_out_of_range_inside_alert_is_an_error() {
        let err = scan("> [!TIP]\n> text\n> ![a](u){width=0%}").unwrap_err();
        assert_eq!(err.location(), Some(SourceLocation::new(3, 1)));
    }

    #[test]
    fn order_is_preserved() {
        let input = "one\n[[PAGEBREAK]]\ntwo\n:::info\nbody\n:::\nthree ![i](u){width=10%}";
        let kinds: Vec<&str> = segments(input)
            .iter()
            .map(|s| match s {
                Segment::Text(_) => "text",
                Segment::PageBreak => "break",
                Segment::Callout { .. } => "callout",
                Segment::Image { .. } => "image",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["text", "break", "text", "callout", "text", "image"]
        );
    }

    #[test]
    fn crlf_input() {
        assert_eq!(
            segments("a\r\n[[PAGEBREAK]]\r\nb"),
            vec![text("a\n"), Segment::PageBreak, text("b\n")]
        );
    }
}
