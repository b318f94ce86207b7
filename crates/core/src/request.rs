//! Render requests and the form-field boundary adapter.

use serde::Deserialize;

use crate::config::{
    DEFAULT_FONT_SIZE_PX, Orientation, PageSize, RenderConfig, RenderMode, TitlePage,
};
use crate::error::ComposeError;

/// One render call: Markdown text plus validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Raw Markdown.
    pub markdown_text: String,
    /// Settings for this render.
    pub config: RenderConfig,
}

impl RenderRequest {
    /// Create a request.
    pub fn new(markdown_text: impl Into<String>, config: RenderConfig) -> Self {
        Self {
            markdown_text: markdown_text.into(),
            config,
        }
    }
}

/// Form payload as submitted by the upload form or preview endpoint.
///
/// Every field except `markdown_content` is optional; absent fields take
/// the caller defaults (14px, A4, portrait).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormFields {
    /// Markdown source.
    pub markdown_content: String,
    /// Base font size in pixels.
    pub font_size: Option<i64>,
    /// `A3`, `A4`, `A5`, `Letter`, `Legal` or `preview`.
    pub page_size: Option<String>,
    /// `portrait` or `landscape`.
    pub orientation: Option<String>,
    /// Extra CSS.
    pub css_styles: Option<String>,
    /// Title page toggle.
    pub title_page: bool,
    /// Title page heading.
    pub title_text: Option<String>,
    /// Title page date line.
    pub title_date: Option<String>,
    /// Title page author line.
    pub title_name: Option<String>,
    /// `@page` margin shorthand.
    pub margin: Option<String>,
    /// Join soft-wrapped lines.
    pub newline_to_space: bool,
    /// Break before headings and after rules.
    pub slide_mode: bool,
    /// Comma-separated extra page-break phrases.
    pub break_phrases: Option<String>,
}

impl FormFields {
    /// Validate the fields and build a request for `mode`.
    pub fn into_request(self, mode: RenderMode) -> Result<RenderRequest, ComposeError> {
        let page_size = match non_blank(self.page_size.as_deref()) {
            Some(value) => value.parse()?,
            None => PageSize::A4,
        };
        let orientation = match non_blank(self.orientation.as_deref()) {
            Some(value) => value.parse()?,
            None => Orientation::Portrait,
        };
        let title_page = self.title_page.then(|| TitlePage {
            title: self.title_text.unwrap_or_default(),
            date: self.title_date.unwrap_or_default(),
            name: self.title_name.unwrap_or_default(),
        });

        let mut builder = RenderConfig::builder()
            .font_size_px(self.font_size.unwrap_or(i64::from(DEFAULT_FONT_SIZE_PX)))
            .page_size(page_size)
            .orientation(orientation)
            .title_page(title_page)
            .mode(mode)
            .slide_mode(self.slide_mode)
            .collapse_soft_newlines(self.newline_to_space)
            .break_phrases(
                self.break_phrases
                    .as_deref()
                    .unwrap_or_default()
                    .split(','),
            );
        if let Some(css) = self.css_styles {
            builder = builder.custom_css(css);
        }
        if let Some(margin) = self.margin {
            builder = builder.margin(margin);
        }

        Ok(RenderRequest::new(self.markdown_content, builder.build()?))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
