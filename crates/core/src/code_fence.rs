//! Code fence tracking for the directive scanner.
//!
//! Directive recognition is suspended while a fenced code block is open, so
//! the scanner feeds every line through [`advance_fence_state`] first.

/// Fence parsing phases tracked across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FencePhase {
    /// Not currently inside a fence.
    #[default]
    Outside,
    /// Within fence contents.
    InsideFence,
}

/// Current fence state (phase, marker and opener length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceState {
    /// Current fence phase.
    pub phase: FencePhase,
    /// Fence marker character (``` or ~~~).
    pub marker: Option<char>,
    /// Length of the opening fence (number of ` or ~ characters).
    pub length: usize,
}

impl FenceState {
    /// Returns true while a fence is open.
    pub fn is_open(&self) -> bool {
        matches!(self.phase, FencePhase::InsideFence)
    }
}

/// Outcome of processing a single line for fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOutcome {
    /// State to carry into the next line.
    pub next_state: FenceState,
    /// The line belongs to a code fence (opener, content or closer).
    pub is_code: bool,
}

/// Advance fence state based on a single line of text.
pub fn advance_fence_state(line: &str, state: FenceState) -> LineOutcome {
    let (visual_indent, byte_offset) = leading_whitespace_info(line);
    let after_indent = &line[byte_offset..];

    // CommonMark: openers and closers take at most 3 columns of indentation.
    if visual_indent > 3 {
        return LineOutcome {
            next_state: state,
            is_code: state.is_open(),
        };
    }

    match state.phase {
        FencePhase::Outside => match detect_fence_marker(after_indent) {
            Some((marker, length)) if marker == '~' || !after_indent[length..].contains('`') => {
                LineOutcome {
                    next_state: FenceState {
                        phase: FencePhase::InsideFence,
                        marker: Some(marker),
                        length,
                    },
                    is_code: true,
                }
            }
            _ => LineOutcome {
                next_state: state,
                is_code: false,
            },
        },
        FencePhase::InsideFence => {
            let closes = detect_fence_marker(after_indent).is_some_and(|(marker, len)| {
                Some(marker) == state.marker
                    && len >= state.length
                    && after_indent[len..].trim().is_empty()
            });
            LineOutcome {
                next_state: if closes { FenceState::default() } else { state },
                is_code: true,
            }
        }
    }
}

/// True when a line is indented far enough to be an indented code block
/// (4+ columns, tabs expanded to 4-column stops).
pub fn is_indented_code_line(line: &str) -> bool {
    let (visual_indent, byte_offset) = leading_whitespace_info(line);
    visual_indent >= 4 && byte_offset < line.len()
}

/// Returns (visual_columns, byte_offset) for leading whitespace.
fn leading_whitespace_info(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => {
                col += 1;
                bytes += 1;
            }
            b'\t' => {
                col += 4 - (col % 4);
                bytes += 1;
            }
            _ => break,
        }
    }
    (col, bytes)
}

fn detect_fence_marker(after_indent: &str) -> Option<(char, usize)> {
    let first = after_indent.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run_len = after_indent.chars().take_while(|c| *c == first).count();
    (run_len >= 3).then_some((first, run_len))
}
