//! Directive transformer: one [`Segment`] in, one HTML fragment out.

use std::borrow::Cow;

use folio_core::image::{InlinePiece, has_width_image, split_width_images};
use folio_core::{
    CalloutKind, ComposeError, FenceState, PAGE_BREAK_MARKER, RenderConfig, Segment,
    advance_fence_state, collapse_soft_newlines,
};

use crate::images::normalize_image_widths;
use crate::renderer::{MarkdownRenderer, RenderSession};

/// Markup emitted for every page break, in both modes. Only the stylesheet
/// decides whether it breaks the page or draws a divider.
pub const PAGE_BREAK_HTML: &str = "<div class=\"gw-page-break\"></div>";

/// Render one segment as a standalone fragment, footnotes included.
pub fn transform(
    segment: &Segment,
    config: &RenderConfig,
    renderer: &dyn MarkdownRenderer,
) -> Result<String, ComposeError> {
    let mut session = RenderSession::default();
    let mut html = transform_in(segment, config, renderer, &mut session)?;
    if let Some(closing) = renderer.finish(&session) {
        html.push_str(&closing);
    }
    Ok(html)
}

/// Render one segment of a document whose fragments share `session`.
pub fn transform_in(
    segment: &Segment,
    config: &RenderConfig,
    renderer: &dyn MarkdownRenderer,
    session: &mut RenderSession,
) -> Result<String, ComposeError> {
    match segment {
        Segment::Text(markdown) => render_markdown(markdown, config, renderer, session),
        Segment::PageBreak => Ok(PAGE_BREAK_HTML.to_string()),
        Segment::Callout {
            kind,
            title,
            body,
            body_line,
        } => render_callout(
            *kind,
            title.as_deref(),
            split_body(body, *body_line)?,
            config,
            renderer,
            session,
        ),
        Segment::Image {
            alt,
            url,
            width_percent,
        } => Ok(figure_html(alt, url, *width_percent)),
    }
}

fn render_markdown(
    markdown: &str,
    config: &RenderConfig,
    renderer: &dyn MarkdownRenderer,
    session: &mut RenderSession,
) -> Result<String, ComposeError> {
    let source = if config.collapse_soft_newlines() {
        Cow::Owned(collapse_soft_newlines(markdown))
    } else {
        Cow::Borrowed(markdown)
    };
    let html = renderer.render_fragment(&source, session)?;
    normalize_image_widths(&html)
}

fn render_callout(
    kind: CalloutKind,
    title: Option<&str>,
    parts: Vec<BodyPart<'_>>,
    config: &RenderConfig,
    renderer: &dyn MarkdownRenderer,
    session: &mut RenderSession,
) -> Result<String, ComposeError> {
    let mut html = format!(
        "<aside class=\"gw-callout gw-callout-{kind}\"><div class=\"gw-callout-title\"><span class=\"gw-callout-icon\" aria-hidden=\"true\"></span><span class=\"gw-callout-label\">{}</span></div><div class=\"gw-callout-body\">",
        html_escape::encode_text(title.unwrap_or(kind.default_label()))
    );
    for part in parts {
        match part {
            BodyPart::Markdown(markdown) => {
                html.push_str(&render_markdown(&markdown, config, renderer, session)?);
            }
            BodyPart::PageBreak => html.push_str(PAGE_BREAK_HTML),
            BodyPart::Image {
                alt,
                url,
                width_percent,
            } => html.push_str(&figure_html(alt, url, Some(width_percent))),
        }
    }
    html.push_str("</div></aside>");
    Ok(html)
}

fn figure_html(alt: &str, url: &str, width_percent: Option<u8>) -> String {
    let style = width_percent
        .map(|width| format!(" style=\"width:{width}%;\""))
        .unwrap_or_default();
    format!(
        "<figure class=\"gw-figure\"><img src=\"{}\" alt=\"{}\"{style} /></figure>",
        html_escape::encode_double_quoted_attribute(url),
        html_escape::encode_double_quoted_attribute(alt),
    )
}

#[derive(Debug, PartialEq)]
enum BodyPart<'a> {
    Markdown(String),
    PageBreak,
    Image {
        alt: &'a str,
        url: &'a str,
        width_percent: u8,
    },
}

/// Split a callout body around page breaks and width-annotated images the
/// same way the scanner splits the document. Fenced code is left alone.
/// `first_line` is the source line of the body's first line.
fn split_body(body: &str, first_line: usize) -> Result<Vec<BodyPart<'_>>, ComposeError> {
    let mut parts = Vec::new();
    let mut markdown = String::new();
    let mut fence = FenceState::default();

    for (index, line) in body.lines().enumerate() {
        let outcome = advance_fence_state(line, fence);
        fence = outcome.next_state;
        if !outcome.is_code && line == PAGE_BREAK_MARKER {
            flush_markdown(&mut markdown, &mut parts);
            parts.push(BodyPart::PageBreak);
            continue;
        }
        if outcome.is_code || !has_width_image(line) {
            markdown.push_str(line);
            markdown.push('\n');
            continue;
        }
        for piece in split_width_images(line, first_line + index)? {
            match piece {
                InlinePiece::Text(text) => markdown.push_str(text),
                InlinePiece::Image {
                    alt,
                    url,
                    width_percent,
                } => {
                    flush_markdown(&mut markdown, &mut parts);
                    parts.push(BodyPart::Image {
                        alt,
                        url,
                        width_percent,
                    });
                }
            }
        }
        markdown.push('\n');
    }
    flush_markdown(&mut markdown, &mut parts);
    Ok(parts)
}

fn flush_markdown(markdown: &mut String, parts: &mut Vec<BodyPart<'_>>) {
    if !markdown.trim().is_empty() {
        parts.push(BodyPart::Markdown(std::mem::take(markdown)));
    }
    markdown.clear();
}
