//! Soft newline collapsing.
//!
//! Joins soft-wrapped paragraph lines into a single line so the renderer
//! does not keep editor wrapping. Hard breaks, blank lines, list items and
//! block constructs keep their own lines; fenced code is passed through.

use crate::code_fence::{FenceState, advance_fence_state, is_indented_code_line};

/// Join soft-wrapped lines inside paragraphs with single spaces.
pub fn collapse_soft_newlines(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut fence = FenceState::default();

    for line in text.lines() {
        let outcome = advance_fence_state(line, fence);
        fence = outcome.next_state;
        if outcome.is_code {
            flush(&mut paragraph, &mut out);
            out.push(line.to_string());
            continue;
        }

        if is_block_line(line) || (paragraph.is_empty() && is_indented_code_line(line)) {
            flush(&mut paragraph, &mut out);
            out.push(line.to_string());
            continue;
        }

        if is_list_item(line) {
            flush(&mut paragraph, &mut out);
        }
        paragraph.push(line);
        if has_hard_break(line) {
            flush(&mut paragraph, &mut out);
        }
    }
    flush(&mut paragraph, &mut out);

    let mut joined = out.join("\n");
    if text.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

fn flush(paragraph: &mut Vec<&str>, out: &mut Vec<String>) {
    match paragraph.as_slice() {
        [] => {}
        [only] => out.push((*only).to_string()),
        [first, middle @ .., last] => {
            let mut line = first.trim_end().to_string();
            for part in middle {
                line.push(' ');
                line.push_str(part.trim());
            }
            line.push(' ');
            line.push_str(last.trim_start());
            out.push(line);
        }
    }
    paragraph.clear();
}

fn has_hard_break(line: &str) -> bool {
    line.ends_with("  ") || line.ends_with('\\')
}

fn is_block_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return true;
    }
    let first = trimmed.as_bytes()[0];
    match first {
        b'#' => {
            let hashes = trimmed.bytes().take_while(|b| *b == b'#').count();
            hashes <= 6 && trimmed[hashes..].chars().next().is_none_or(char::is_whitespace)
        }
        b'>' | b'|' | b'<' => true,
        b'-' | b'*' | b'_' | b'=' => is_rule_line(trimmed),
        _ => trimmed.starts_with(":::") || trimmed == "[[PAGEBREAK]]",
    }
}

/// Thematic breaks and setext underlines.
fn is_rule_line(trimmed: &str) -> bool {
    let Some(marker) = trimmed.chars().next() else {
        return false;
    };
    let count = trimmed.chars().filter(|c| *c == marker).count();
    let only_marker = trimmed.chars().all(|c| c == marker || c == ' ' || c == '\t');
    only_marker && (count >= 3 || (marker == '=' || marker == '-') && count >= 1 && !trimmed.contains(' '))
}

fn is_list_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    let bytes = trimmed.as_bytes();
    match bytes.first() {
        Some(b'-' | b'*' | b'+') => bytes.get(1).is_none_or(|b| *b == b' ' || *b == b'\t'),
        Some(b) if b.is_ascii_digit() => {
            let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
            digits <= 9
                && matches!(bytes.get(digits), Some(b'.' | b')'))
                && bytes.get(digits + 1).is_none_or(|b| *b == b' ' || *b == b'\t')
        }
        _ => false,
    }
}
