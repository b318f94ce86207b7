//! Rendering context for the mdast renderer.

use std::collections::HashMap;

use markdown::mdast::Node;

use super::Options;
use super::session::RenderSession;

/// Structural scope tracked during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Document root.
    Root,
    /// Inside a list; `spread` is false for tight lists.
    List {
        /// Loose list.
        spread: bool,
    },
    /// Inside a paragraph.
    Paragraph,
    /// Inside a table.
    Table,
}

/// Link/image reference target collected from `[label]: url "title"`.
#[derive(Debug, Clone)]
pub struct LinkTarget {
    pub url: String,
    pub title: Option<String>,
}

/// Mutable state threaded through one fragment render. Slugs and footnotes
/// live in the document's [`RenderSession`].
pub struct Context<'a> {
    html: String,
    stack: Vec<Scope>,
    options: &'a Options,
    definitions: HashMap<String, LinkTarget>,
    session: &'a mut RenderSession,
}

impl<'a> Context<'a> {
    /// Creates a context; definitions are collected from `root` up front so
    /// references can precede them.
    pub fn new(options: &'a Options, root: &Node, session: &'a mut RenderSession) -> Self {
        let mut definitions = HashMap::new();
        collect_definitions(root, &mut definitions);
        Self {
            html: String::with_capacity(4096),
            stack: vec![Scope::Root],
            options,
            definitions,
            session,
        }
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    /// Writes a raw string without escaping.
    pub fn push_raw(&mut self, s: &str) {
        self.html.push_str(s);
    }

    /// Writes escaped text content.
    pub fn push_text(&mut self, s: &str) {
        html_escape::encode_text_to_string(s, &mut self.html);
    }

    /// Writes an escaped double-quoted attribute value.
    pub fn push_attr_value(&mut self, s: &str) {
        html_escape::encode_double_quoted_attribute_to_string(s, &mut self.html);
    }

    pub fn enter(&mut self, scope: Scope) {
        self.stack.push(scope);
    }

    pub fn exit(&mut self) -> Option<Scope> {
        self.stack.pop()
    }

    /// True inside a tight list, where paragraphs lose their `<p>` wrapper.
    pub fn is_in_tight_list(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .find(|scope| matches!(scope, Scope::List { .. } | Scope::Table))
            .is_some_and(|scope| matches!(scope, Scope::List { spread: false }))
    }

    pub fn generate_slug(&mut self, text: &str) -> String {
        self.session.slug(text)
    }

    pub fn definition(&self, identifier: &str) -> Option<&LinkTarget> {
        self.definitions.get(identifier)
    }

    pub fn reference_footnote(&mut self, identifier: &str) -> (usize, usize) {
        self.session.reference_footnote(identifier)
    }

    pub fn has_footnote_body(&self, identifier: &str) -> bool {
        self.session.has_footnote_body(identifier)
    }

    /// Renders `children` into a standalone HTML string using the same
    /// options and definitions. Headings and footnotes inside get their own
    /// scratch session.
    pub fn render_children_to_html(&self, children: &[Node]) -> String {
        let mut scratch = RenderSession::default();
        let mut child = Context {
            html: String::new(),
            stack: vec![Scope::Root],
            options: self.options,
            definitions: self.definitions.clone(),
            session: &mut scratch,
        };
        for node in children {
            super::render::render_node(node, &mut child);
        }
        child.html
    }

    pub fn push_footnote_body(&mut self, identifier: &str, html: String) {
        self.session.insert_footnote_body(identifier, html);
    }

    /// Consumes the context and returns the fragment HTML.
    pub fn finish(self) -> String {
        self.html
    }
}

fn collect_definitions(node: &Node, definitions: &mut HashMap<String, LinkTarget>) {
    if let Node::Definition(definition) = node {
        // First definition wins.
        definitions
            .entry(definition.identifier.clone())
            .or_insert_with(|| LinkTarget {
                url: definition.url.clone(),
                title: definition.title.clone(),
            });
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, definitions);
        }
    }
}
