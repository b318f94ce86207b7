//! Document assembler.
//!
//! Wraps rendered fragments in a self-contained HTML document. The body
//! markup is the same for preview and production; only the generated
//! `<style>` differs.

mod css;
mod theme;
mod title_page;

use folio_core::{ParseWarning, RenderConfig};

pub use css::{PageGeometry, page_rule, stylesheet};
pub use theme::{BASE_CSS, callout_css, palette};
pub use title_page::render_title_page;

/// A rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedDocument {
    /// Complete HTML document with inline styles.
    pub html: String,
    /// Non-fatal scan findings.
    pub warnings: Vec<ParseWarning>,
}

/// Concatenate `fragments` in order and wrap them in the HTML shell.
pub fn assemble(
    fragments: &[String],
    config: &RenderConfig,
    warnings: Vec<ParseWarning>,
) -> ComposedDocument {
    let css = stylesheet(config);
    let body_len: usize = fragments.iter().map(String::len).sum();
    let mut html = String::with_capacity(css.len() + body_len + 512);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>");
    let title = config
        .title_page()
        .map(|page| page.title.trim())
        .filter(|title| !title.is_empty())
        .unwrap_or("Document");
    html.push_str(&html_escape::encode_text(title));
    html.push_str("</title>\n<style>\n");
    // A literal `</style` in custom CSS would end the element early.
    html.push_str(&css.replace("</style", "<\\/style"));
    html.push_str("</style>\n</head>\n<body>\n");

    if let Some(page) = config.title_page() {
        html.push_str(&render_title_page(page));
        html.push('\n');
    }
    html.push_str("<main class=\"gw-container\">\n");
    for fragment in fragments {
        html.push_str(fragment);
        html.push('\n');
    }
    html.push_str("</main>\n</body>\n</html>\n");

    ComposedDocument { html, warnings }
}

#[cfg(test)]
mod tests {
    use folio_core::{RenderMode, TitlePage};

    use super::*;

    fn body(html: &str) -> &str {
        let start = html.find("<body>").unwrap_or(0);
        &html[start..]
    }

    #[test]
    fn fragments_keep_order() {
        let doc = assemble(
            &["<p>one</p>".to_string(), "<p>two</p>".to_string()],
            &RenderConfig::default(),
            Vec::new(),
        );
        let one = doc.html.find("<p>one</p>").unwrap();
        let two = doc.html.find("<p>two</p>").unwrap();
        assert!(one < two);
        assert!(doc.html.starts_with("<!DOCTYPE html>"));
        assert!(doc.html.contains("<main class=\"gw-container\">"));
    }

    #[test]
    fn body_is_identical_across_modes() {
        let preview = RenderConfig::builder()
            .title_page(Some(TitlePage {
                title: "T".to_string(),
                ..TitlePage::default()
            }))
            .build()
            .unwrap();
        let production = preview.with_mode(RenderMode::Production);
        let fragments = ["<p>x</p>".to_string()];

        let a = assemble(&fragments, &preview, Vec::new());
        let b = assemble(&fragments, &production, Vec::new());
        assert_eq!(body(&a.html), body(&b.html));
        assert_ne!(a.html, b.html);
        assert!(a.html.contains("<title>T</title>"));
    }

    #[test]
    fn title_page_precedes_content() {
        let config = RenderConfig::builder()
            .title_page(Some(TitlePage::default()))
            .build()
            .unwrap();
        let doc = assemble(&["<p>x</p>".to_string()], &config, Vec::new());
        let title = doc.html.find("<section class=\"gw-title-page\">").unwrap();
        let main = doc.html.find("<main").unwrap();
        assert!(title < main);
        assert!(doc.html.contains("<title>Document</title>"));
    }

    #[test]
    fn custom_css_cannot_close_the_style_element() {
        let config = RenderConfig::builder()
            .custom_css("p{color:red}</style><script>")
            .build()
            .unwrap();
        let doc = assemble(&[], &config, Vec::new());
        assert_eq!(doc.html.matches("</style>").count(), 1);
    }
}
