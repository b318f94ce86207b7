//! Raw `<img width=…>` normalization.
//!
//! Authors paste HTML images with `width="200"`. The PDF engine and the
//! preview frame both honour CSS more reliably than the presentational
//! attribute, so the width is moved into the `style` attribute: a bare
//! number becomes pixels, a value with a unit is kept as written.

use std::borrow::Cow;

use folio_core::ComposeError;
use lol_html::{ElementContentHandlers, RewriteStrSettings, Selector, element, rewrite_str};

/// Rewrite every `<img width>` in `html`. Returns the input unchanged
/// when there is nothing to rewrite.
pub fn normalize_image_widths(html: &str) -> Result<String, ComposeError> {
    if !html.contains("<img") && !html.contains("<IMG") {
        return Ok(html.to_string());
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![img_width_handler()],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| ComposeError::Rewrite(err.to_string()))
}

fn img_width_handler() -> (Cow<'static, Selector>, ElementContentHandlers<'static>) {
    element!("img[width]", |el| {
        let Some(width) = el.get_attribute("width").as_deref().and_then(css_width) else {
            return Ok(());
        };
        let style = merge_style(el.get_attribute("style").as_deref(), &width);
        el.set_attribute("style", &style)?;
        el.remove_attribute("width");
        Ok(())
    })
}

/// `200` → `200px`, `50%` / `12em` → unchanged. Anything else is not a
/// width we understand.
fn css_width(raw: &str) -> Option<String> {
    let value = raw.trim();
    let number_end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(number_end);
    number.parse::<f64>().ok().filter(|n| n.is_finite())?;

    match unit.to_ascii_lowercase().as_str() {
        "" => Some(format!("{number}px")),
        "%" | "px" | "em" | "rem" | "vw" | "mm" | "cm" | "in" | "pt" | "pc" | "ch" => {
            Some(value.to_string())
        }
        _ => None,
    }
}

/// Appends `width:<width>;` to an existing inline style, replacing any
/// earlier `width` declaration.
fn merge_style(existing: Option<&str>, width: &str) -> String {
    let mut style = String::new();
    for declaration in existing.unwrap_or_default().split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let property = declaration.split(':').next().unwrap_or_default().trim();
        if property.eq_ignore_ascii_case("width") {
            continue;
        }
        style.push_str(declaration);
        style.push(';');
    }
    style.push_str("width:");
    style.push_str(width);
    style.push(';');
    style
}
