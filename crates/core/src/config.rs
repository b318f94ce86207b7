//! Rendering configuration.
//!
//! [`RenderConfig`] is immutable once built. All validation happens in
//! [`RenderConfigBuilder::build`], before any Markdown is scanned.

use std::fmt;
use std::str::FromStr;

use crate::error::ComposeError;

/// Smallest accepted base font size in CSS pixels.
pub const MIN_FONT_SIZE_PX: u8 = 8;
/// Largest accepted base font size in CSS pixels.
pub const MAX_FONT_SIZE_PX: u8 = 18;
/// Font size used when the caller supplies none.
pub const DEFAULT_FONT_SIZE_PX: u8 = 14;
/// `@page` margin used when the caller supplies none.
pub const DEFAULT_MARGIN: &str = "20mm";

/// Convert millimetres to CSS pixels at 96 dpi.
pub fn mm_to_px(mm: f64) -> u32 {
    (mm / 25.4 * 96.0).round() as u32
}

/// Physical page size, or `Preview` for an unbounded screen layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageSize {
    /// ISO A3.
    A3,
    /// ISO A4.
    #[default]
    A4,
    /// ISO A5.
    A5,
    /// US Letter.
    Letter,
    /// US Legal.
    Legal,
    /// No page geometry; continuous layout.
    Preview,
}

impl PageSize {
    /// Keyword used in the CSS `@page { size }` descriptor.
    pub fn css_name(self) -> Option<&'static str> {
        match self {
            PageSize::A3 => Some("A3"),
            PageSize::A4 => Some("A4"),
            PageSize::A5 => Some("A5"),
            PageSize::Letter => Some("letter"),
            PageSize::Legal => Some("legal"),
            PageSize::Preview => None,
        }
    }

    /// Portrait (width, height) in millimetres.
    pub fn dimensions_mm(self) -> Option<(f64, f64)> {
        match self {
            PageSize::A3 => Some((297.0, 420.0)),
            PageSize::A4 => Some((210.0, 297.0)),
            PageSize::A5 => Some((148.0, 210.0)),
            PageSize::Letter => Some((215.9, 279.4)),
            PageSize::Legal => Some((215.9, 355.6)),
            PageSize::Preview => None,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name().unwrap_or("preview"))
    }
}

impl FromStr for PageSize {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            "preview" => Ok(PageSize::Preview),
            _ => Err(ComposeError::configuration(
                "page_size",
                format!("expected one of A3, A4, A5, Letter, Legal, preview; got `{s}`"),
            )),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Taller than wide.
    #[default]
    Portrait,
    /// Wider than tall.
    Landscape,
}

impl Orientation {
    /// CSS keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(ComposeError::configuration(
                "orientation",
                format!("expected `portrait` or `landscape`; got `{s}`"),
            )),
        }
    }
}

/// Rendering target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    /// On-screen preview.
    #[default]
    Preview,
    /// Document handed to the PDF engine.
    Production,
}

impl FromStr for RenderMode {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preview" => Ok(RenderMode::Preview),
            "production" => Ok(RenderMode::Production),
            _ => Err(ComposeError::configuration(
                "mode",
                format!("expected `preview` or `production`; got `{s}`"),
            )),
        }
    }
}

/// Title page contents. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePage {
    /// Document title.
    pub title: String,
    /// Date line.
    pub date: String,
    /// Author line.
    pub name: String,
}

/// Absolute CSS length unit accepted in margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// Millimetres.
    Mm,
    /// Centimetres.
    Cm,
    /// Inches.
    In,
    /// CSS pixels.
    Px,
    /// Points.
    Pt,
    /// Picas.
    Pc,
}

impl LengthUnit {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "mm" => Some(LengthUnit::Mm),
            "cm" => Some(LengthUnit::Cm),
            "in" => Some(LengthUnit::In),
            "px" => Some(LengthUnit::Px),
            "pt" => Some(LengthUnit::Pt),
            "pc" => Some(LengthUnit::Pc),
            _ => None,
        }
    }
}

/// A single absolute CSS length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssLength {
    /// Numeric value.
    pub value: f64,
    /// Unit.
    pub unit: LengthUnit,
}

impl CssLength {
    /// Length in CSS pixels, rounded.
    pub fn to_px(self) -> u32 {
        let px = match self.unit {
            LengthUnit::Px => self.value,
            LengthUnit::Mm => return mm_to_px(self.value),
            LengthUnit::Cm => return mm_to_px(self.value * 10.0),
            LengthUnit::In => self.value * 96.0,
            LengthUnit::Pt => self.value * 96.0 / 72.0,
            LengthUnit::Pc => self.value * 12.0 * 96.0 / 72.0,
        };
        px.round() as u32
    }

    fn parse(token: &str) -> Option<Self> {
        if token == "0" {
            return Some(CssLength {
                value: 0.0,
                unit: LengthUnit::Px,
            });
        }
        let split = token.find(|c: char| c.is_ascii_alphabetic())?;
        let (number, unit) = token.split_at(split);
        let unit = LengthUnit::parse(&unit.to_ascii_lowercase())?;
        let value: f64 = number.parse().ok()?;
        (value.is_finite() && value >= 0.0).then_some(CssLength { value, unit })
    }
}

/// `@page` margin in CSS shorthand form, expanded to four sides.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMargin {
    css: String,
    top: CssLength,
    right: CssLength,
    bottom: CssLength,
    left: CssLength,
}

impl PageMargin {
    /// Normalized shorthand, suitable for the `margin` descriptor.
    pub fn as_css(&self) -> &str {
        &self.css
    }

    /// Top margin in pixels.
    pub fn top_px(&self) -> u32 {
        self.top.to_px()
    }

    /// Right margin in pixels.
    pub fn right_px(&self) -> u32 {
        self.right.to_px()
    }

    /// Bottom margin in pixels.
    pub fn bottom_px(&self) -> u32 {
        self.bottom.to_px()
    }

    /// Left margin in pixels.
    pub fn left_px(&self) -> u32 {
        self.left.to_px()
    }
}

impl Default for PageMargin {
    fn default() -> Self {
        let side = CssLength {
            value: 20.0,
            unit: LengthUnit::Mm,
        };
        Self {
            css: DEFAULT_MARGIN.to_string(),
            top: side,
            right: side,
            bottom: side,
            left: side,
        }
    }
}

impl FromStr for PageMargin {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let invalid = || {
            ComposeError::configuration(
                "margin",
                format!("expected 1 to 4 lengths in mm, cm, in, px, pt or pc; got `{s}`"),
            )
        };
        let lengths = tokens
            .iter()
            .map(|token| CssLength::parse(token))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        let (top, right, bottom, left) = match lengths.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => return Err(invalid()),
        };
        Ok(Self {
            css: tokens.join(" "),
            top,
            right,
            bottom,
            left,
        })
    }
}

/// Validated rendering settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    font_size_px: u8,
    page_size: PageSize,
    orientation: Orientation,
    custom_css: Option<String>,
    title_page: Option<TitlePage>,
    mode: RenderMode,
    margin: PageMargin,
    slide_mode: bool,
    break_phrases: Vec<String>,
    collapse_soft_newlines: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_size_px: DEFAULT_FONT_SIZE_PX,
            page_size: PageSize::default(),
            orientation: Orientation::default(),
            custom_css: None,
            title_page: None,
            mode: RenderMode::default(),
            margin: PageMargin::default(),
            slide_mode: false,
            break_phrases: Vec::new(),
            collapse_soft_newlines: false,
        }
    }
}

impl RenderConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }

    /// Base font size in CSS pixels.
    pub fn font_size_px(&self) -> u8 {
        self.font_size_px
    }

    /// Page size.
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Orientation as configured.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Extra CSS appended after the generated stylesheet.
    pub fn custom_css(&self) -> Option<&str> {
        self.custom_css.as_deref()
    }

    /// Title page, if enabled.
    pub fn title_page(&self) -> Option<&TitlePage> {
        self.title_page.as_ref()
    }

    /// Rendering target.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// `@page` margin.
    pub fn margin(&self) -> &PageMargin {
        &self.margin
    }

    /// Whether headings and rules start new pages.
    pub fn slide_mode(&self) -> bool {
        self.slide_mode
    }

    /// Extra page-break phrases, lowercase.
    pub fn break_phrases(&self) -> &[String] {
        &self.break_phrases
    }

    /// Whether soft-wrapped paragraph lines are joined.
    pub fn collapse_soft_newlines(&self) -> bool {
        self.collapse_soft_newlines
    }

    /// True when the output is laid out on fixed page boxes.
    pub fn is_paged(&self) -> bool {
        self.mode == RenderMode::Production && self.page_size != PageSize::Preview
    }

    /// Orientation that affects layout; `None` when there is no page box.
    pub fn effective_orientation(&self) -> Option<Orientation> {
        (self.page_size != PageSize::Preview).then_some(self.orientation)
    }

    /// Oriented page (width, height) in millimetres.
    pub fn page_dimensions_mm(&self) -> Option<(f64, f64)> {
        let (width, height) = self.page_size.dimensions_mm()?;
        Some(match self.orientation {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        })
    }

    /// Copy of this configuration with another rendering target.
    pub fn with_mode(&self, mode: RenderMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug, Clone)]
pub struct RenderConfigBuilder {
    font_size_px: i64,
    page_size: PageSize,
    orientation: Orientation,
    custom_css: Option<String>,
    title_page: Option<TitlePage>,
    mode: RenderMode,
    margin: Option<String>,
    slide_mode: bool,
    break_phrases: Vec<String>,
    collapse_soft_newlines: bool,
}

impl Default for RenderConfigBuilder {
    fn default() -> Self {
        Self {
            font_size_px: i64::from(DEFAULT_FONT_SIZE_PX),
            page_size: PageSize::default(),
            orientation: Orientation::default(),
            custom_css: None,
            title_page: None,
            mode: RenderMode::default(),
            margin: None,
            slide_mode: false,
            break_phrases: Vec::new(),
            collapse_soft_newlines: false,
        }
    }
}

impl RenderConfigBuilder {
    /// Base font size in CSS pixels; validated in [`build`](Self::build).
    pub fn font_size_px(mut self, px: i64) -> Self {
        self.font_size_px = px;
        self
    }

    /// Page size.
    pub fn page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Orientation.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Extra CSS. Blank strings count as none.
    pub fn custom_css(mut self, css: impl Into<String>) -> Self {
        let css = css.into();
        self.custom_css = (!css.trim().is_empty()).then_some(css);
        self
    }

    /// Title page.
    pub fn title_page(mut self, title_page: Option<TitlePage>) -> Self {
        self.title_page = title_page;
        self
    }

    /// Rendering target.
    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Margin shorthand; validated in [`build`](Self::build).
    pub fn margin(mut self, margin: impl Into<String>) -> Self {
        self.margin = Some(margin.into());
        self
    }

    /// Slide mode.
    pub fn slide_mode(mut self, enabled: bool) -> Self {
        self.slide_mode = enabled;
        self
    }

    /// Extra page-break phrases. Blank entries are ignored.
    pub fn break_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.break_phrases = phrases
            .into_iter()
            .map(|phrase| phrase.as_ref().trim().to_lowercase())
            .filter(|phrase| !phrase.is_empty())
            .collect();
        self
    }

    /// Join soft-wrapped paragraph lines.
    pub fn collapse_soft_newlines(mut self, enabled: bool) -> Self {
        self.collapse_soft_newlines = enabled;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<RenderConfig, ComposeError> {
        let range = i64::from(MIN_FONT_SIZE_PX)..=i64::from(MAX_FONT_SIZE_PX);
        let font_size_px = u8::try_from(self.font_size_px)
            .ok()
            .filter(|px| range.contains(&i64::from(*px)))
            .ok_or_else(|| {
                ComposeError::configuration(
                    "font_size",
                    format!(
                        "must be between {MIN_FONT_SIZE_PX} and {MAX_FONT_SIZE_PX} pixels; got {}",
                        self.font_size_px
                    ),
                )
            })?;

        let margin = match self.margin.as_deref().map(str::trim) {
            None | Some("") => PageMargin::default(),
            Some(css) => css.parse()?,
        };
        if let Some((width_mm, height_mm)) = self.page_size.dimensions_mm() {
            let (width_mm, height_mm) = match self.orientation {
                Orientation::Portrait => (width_mm, height_mm),
                Orientation::Landscape => (height_mm, width_mm),
            };
            let vertical = margin.top_px().saturating_add(margin.bottom_px());
            let horizontal = margin.left_px().saturating_add(margin.right_px());
            if vertical >= mm_to_px(height_mm) || horizontal >= mm_to_px(width_mm) {
                return Err(ComposeError::configuration(
                    "margin",
                    format!(
                        "`{}` leaves no room for content on a {} {} page",
                        margin.as_css(),
                        self.page_size,
                        self.orientation
                    ),
                ));
            }
        }

        Ok(RenderConfig {
            font_size_px,
            page_size: self.page_size,
            orientation: self.orientation,
            custom_css: self.custom_css,
            title_page: self.title_page,
            mode: self.mode,
            margin,
            slide_mode: self.slide_mode,
            break_phrases: self.break_phrases,
            collapse_soft_newlines: self.collapse_soft_newlines,
        })
    }
}
