//! State shared by every fragment of one composed document.

use std::collections::HashMap;

use folio_core::Slugger;

/// Document-wide rendering state.
///
/// One session spans every segment of a document: definitions collected up
/// front, heading slugs (unique across the whole document), and the
/// footnotes referenced so far, which are emitted once at the end.
#[derive(Debug, Default)]
pub struct RenderSession {
    definitions: String,
    slugger: Slugger,
    footnote_order: Vec<String>,
    footnote_refs: HashMap<String, usize>,
    footnote_bodies: HashMap<String, String>,
}

impl RenderSession {
    /// Creates a session around the document's definition source (see
    /// [`folio_core::collect_definitions`]).
    pub fn new(definitions: impl Into<String>) -> Self {
        Self {
            definitions: definitions.into(),
            ..Self::default()
        }
    }

    /// Link reference and footnote definitions of the whole document.
    pub fn definitions(&self) -> &str {
        &self.definitions
    }

    pub(crate) fn slug(&mut self, text: &str) -> String {
        self.slugger.slug(text)
    }

    /// Records a footnote reference. Returns the 1-based ordinal of the
    /// footnote and how many times it has been referenced so far.
    pub(crate) fn reference_footnote(&mut self, identifier: &str) -> (usize, usize) {
        let ordinal = match self.footnote_order.iter().position(|id| id == identifier) {
            Some(index) => index + 1,
            None => {
                self.footnote_order.push(identifier.to_string());
                self.footnote_order.len()
            }
        };
        let count = self.footnote_refs.entry(identifier.to_string()).or_insert(0);
        *count += 1;
        (ordinal, *count)
    }

    pub(crate) fn has_footnote_body(&self, identifier: &str) -> bool {
        self.footnote_bodies.contains_key(identifier)
    }

    pub(crate) fn insert_footnote_body(&mut self, identifier: &str, html: String) {
        self.footnote_bodies
            .entry(identifier.to_string())
            .or_insert(html);
    }

    /// The footnotes section, when any referenced footnote has a definition.
    pub fn footnotes_html(&self) -> Option<String> {
        let referenced: Vec<(usize, &String)> = self
            .footnote_order
            .iter()
            .enumerate()
            .filter(|(_, id)| self.footnote_bodies.contains_key(*id))
            .map(|(index, id)| (index + 1, id))
            .collect();
        if referenced.is_empty() {
            return None;
        }

        let mut section = String::from(
            "<section class=\"footnotes\" data-footnotes><h2 class=\"sr-only\" id=\"footnote-label\">Footnotes</h2><ol>",
        );
        for (ordinal, id) in referenced {
            let safe_id = footnote_id(id);
            let body = self.footnote_bodies.get(id).map(String::as_str).unwrap_or("");
            section.push_str(&format!("<li id=\"user-content-fn-{safe_id}\">{body}"));
            let refs = self.footnote_refs.get(id).copied().unwrap_or(1);
            for n in 1..=refs {
                let suffix = if n == 1 { String::new() } else { format!("-{n}") };
                section.push_str(&format!(
                    " <a href=\"#user-content-fnref-{safe_id}{suffix}\" data-footnote-backref aria-label=\"Back to reference {ordinal}\" class=\"data-footnote-backref\">\u{21A9}</a>"
                ));
            }
            section.push_str("</li>");
        }
        section.push_str("</ol></section>");
        Some(section)
    }
}

/// Footnote identifiers as safe id fragments.
pub fn footnote_id(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
