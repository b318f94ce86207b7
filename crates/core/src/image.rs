//! Width-annotated image tokens: `![alt](url){width=N%}`.
//!
//! Lines are split into text runs and annotated images. Plain `![alt](url)`
//! tokens without an annotation stay in the text and are left to the
//! Markdown renderer. Inline code spans are skipped.

use crate::error::ComposeError;

const WIDTH_PREFIX: &str = "{width=";

/// A piece of a scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlinePiece<'a> {
    /// Text to hand to the Markdown renderer.
    Text(&'a str),
    /// Image carrying a validated width annotation.
    Image {
        /// Alternative text.
        alt: &'a str,
        /// Image URL.
        url: &'a str,
        /// Width as a percentage of the content column (1..=100).
        width_percent: u8,
    },
}

/// Split one line into text and width-annotated images.
///
/// `line_no` is the 1-based line number used for error locations.
pub fn split_width_images(line: &str, line_no: usize) -> Result<Vec<InlinePiece<'_>>, ComposeError> {
    let bytes = line.as_bytes();
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'`' => i = skip_code_span(line, i),
            b'!' if line[i..].starts_with("![") => match parse_annotated_image(&line[i..], line_no, i + 1)? {
                Some((piece, consumed)) => {
                    if text_start < i {
                        pieces.push(InlinePiece::Text(&line[text_start..i]));
                    }
                    pieces.push(piece);
                    i += consumed;
                    text_start = i;
                }
                None => i += 2,
            },
            _ => i += 1,
        }
    }

    if text_start < line.len() || pieces.is_empty() {
        pieces.push(InlinePiece::Text(&line[text_start..]));
    }
    Ok(pieces)
}

/// Returns true when the line contains at least one annotated image.
pub fn has_width_image(line: &str) -> bool {
    line.contains(WIDTH_PREFIX) && line.contains("![")
}

/// Skip a backtick code span starting at `start`; returns the index after it.
/// An unmatched run is treated as literal backticks.
fn skip_code_span(line: &str, start: usize) -> usize {
    let run = line[start..].bytes().take_while(|b| *b == b'`').count();
    let mut cursor = start + run;
    while let Some(offset) = line[cursor..].find('`') {
        let candidate = cursor + offset;
        let len = line[candidate..].bytes().take_while(|b| *b == b'`').count();
        if len == run {
            return candidate + len;
        }
        cursor = candidate + len;
    }
    start + run
}

/// Parse `![alt](url){width=N%}` at the start of `s`.
///
/// Returns `Ok(None)` when the token has no percentage annotation, and an
/// error when the annotation is a percentage outside 1..=100.
fn parse_annotated_image(
    s: &str,
    line_no: usize,
    column: usize,
) -> Result<Option<(InlinePiece<'_>, usize)>, ComposeError> {
    let Some(alt_end) = s[2..].find(']').map(|p| p + 2) else {
        return Ok(None);
    };
    let after_alt = &s[alt_end + 1..];
    if !after_alt.starts_with('(') {
        return Ok(None);
    }
    let Some(dest_len) = after_alt.find(')') else {
        return Ok(None);
    };
    let destination = after_alt[1..dest_len].trim();
    let url = destination
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_start_matches('<')
        .trim_end_matches('>');

    let annotation_start = alt_end + 1 + dest_len + 1;
    let Some(annotation) = s[annotation_start..].strip_prefix(WIDTH_PREFIX) else {
        return Ok(None);
    };
    let Some(close) = annotation.find('}') else {
        return Ok(None);
    };
    let value = annotation[..close].trim();
    let Some(number) = value.strip_suffix('%') else {
        return Ok(None);
    };

    let width_percent = number
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=100).contains(n))
        .ok_or_else(|| {
            ComposeError::directive_syntax(
                format!("image width must be between 1% and 100%, got `{value}`"),
                line_no,
                column,
            )
        })?;

    let consumed = annotation_start + WIDTH_PREFIX.len() + close + 1;
    Ok(Some((
        InlinePiece::Image {
            alt: &s[2..alt_end],
            url,
            width_percent: width_percent as u8,
        },
        consumed,
    )))
}
