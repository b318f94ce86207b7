//! Stylesheet generation.
//!
//! The stylesheet is assembled in a fixed order: typography, shared theme,
//! callout palette, layout rules, slide rules, then the caller's custom CSS
//! so it can override anything above it.

use std::fmt::Write as _;

use folio_core::{RenderConfig, mm_to_px};

use super::theme;

/// Page box geometry in CSS pixels (96 dpi).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    /// Oriented page width.
    pub width_px: u32,
    /// Oriented page height.
    pub height_px: u32,
    /// Top margin.
    pub margin_top_px: u32,
    /// Right margin.
    pub margin_right_px: u32,
    /// Bottom margin.
    pub margin_bottom_px: u32,
    /// Left margin.
    pub margin_left_px: u32,
}

impl PageGeometry {
    /// Geometry for a paged configuration; `None` for continuous layout.
    pub fn from_config(config: &RenderConfig) -> Option<Self> {
        if !config.is_paged() {
            return None;
        }
        let (width_mm, height_mm) = config.page_dimensions_mm()?;
        let margin = config.margin();
        Some(Self {
            width_px: mm_to_px(width_mm),
            height_px: mm_to_px(height_mm),
            margin_top_px: margin.top_px(),
            margin_right_px: margin.right_px(),
            margin_bottom_px: margin.bottom_px(),
            margin_left_px: margin.left_px(),
        })
    }

    /// Height left for content once the vertical margins are removed.
    pub fn content_height_px(&self) -> u32 {
        self.height_px
            .saturating_sub(self.margin_top_px.saturating_add(self.margin_bottom_px))
    }
}

/// `@page` rule for paged layout.
pub fn page_rule(config: &RenderConfig) -> Option<String> {
    if !config.is_paged() {
        return None;
    }
    let size = config.page_size().css_name()?;
    Some(format!(
        "@page{{size:{size} {};margin:{};}}",
        config.orientation(),
        config.margin().as_css()
    ))
}

fn root_variables(geometry: &PageGeometry) -> String {
    format!(
        ":root{{--page-width-px:{}px;--page-height-px:{}px;--page-margin-top-px:{}px;--page-margin-right-px:{}px;--page-margin-bottom-px:{}px;--page-margin-left-px:{}px;}}",
        geometry.width_px,
        geometry.height_px,
        geometry.margin_top_px,
        geometry.margin_right_px,
        geometry.margin_bottom_px,
        geometry.margin_left_px,
    )
}

fn paged_css(geometry: &PageGeometry) -> String {
    format!(
        "html,body{{background:#ffffff;}}\n\
         .gw-container{{margin:0;padding:0;max-width:none;}}\n\
         .gw-page-break{{break-before:page;page-break-before:always;height:0;margin:0;border:0;}}\n\
         .gw-title-page{{break-after:page;page-break-after:always;min-height:{}px;}}\n\
         pre,table,figure,blockquote,.gw-callout{{break-inside:avoid;}}\n\
         h1,h2,h3,h4,h5,h6{{break-after:avoid;}}\n",
        geometry.content_height_px()
    )
}

const CONTINUOUS_CSS: &str = "html{background:#f3f4f6;}\n\
body{padding:1.5rem 0;}\n\
.gw-container{max-width:52rem;margin:0 auto;padding:2.5rem 3rem;background:#ffffff;box-shadow:0 1px 3px rgba(31,35,40,0.12);}\n\
.gw-page-break{height:0;margin:2rem 0;border:0;border-top:1px dashed #afb8c1;}\n\
.gw-title-page{max-width:52rem;margin:0 auto 1.5rem;padding:5rem 3rem;background:#ffffff;box-shadow:0 1px 3px rgba(31,35,40,0.12);}\n";

/// First `h1`/`h2` of the document stays on its page; later ones start a
/// new page, and every rule ends one.
const SLIDE_CSS: &str = ".gw-container>h1,.gw-container>h2{break-before:page;page-break-before:always;}\n\
.gw-container>h1:first-of-type,.gw-container>h2:first-of-type{break-before:auto;page-break-before:auto;}\n\
.gw-container>hr{break-after:page;page-break-after:always;visibility:hidden;margin:0;}\n";

/// Full stylesheet for `config`.
pub fn stylesheet(config: &RenderConfig) -> String {
    let mut css = String::with_capacity(8 * 1024);
    let geometry = PageGeometry::from_config(config);

    if let Some(rule) = page_rule(config) {
        css.push_str(&rule);
        css.push('\n');
    }
    if let Some(geometry) = &geometry {
        css.push_str(&root_variables(geometry));
        css.push('\n');
    }
    let _ = writeln!(css, "html{{font-size:{}px;}}", config.font_size_px());
    css.push_str(theme::BASE_CSS);
    css.push_str(&theme::callout_css());

    match &geometry {
        Some(geometry) => {
            css.push_str(&paged_css(geometry));
            if config.slide_mode() {
                css.push_str(SLIDE_CSS);
            }
        }
        None => css.push_str(CONTINUOUS_CSS),
    }

    if let Some(custom) = config.custom_css() {
        css.push_str(custom);
        css.push('\n');
    }
    css
}
