//! Rendering functions for the mdast renderer.

use markdown::mdast::{self, AlignKind, Node, ReferenceKind};

use super::context::{Context, Scope};
use super::session::footnote_id;

/// Collects the plain text of `nodes` (used for heading slugs).
pub fn extract_text_from_nodes(nodes: &[Node]) -> String {
    let mut text = String::new();
    for node in nodes {
        extract_text_from_node(node, &mut text);
    }
    text.trim().to_string()
}

fn extract_text_from_node(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(t) => buffer.push_str(&t.value),
        Node::InlineCode(code) => buffer.push_str(&code.value),
        Node::Strong(_) | Node::Emphasis(_) | Node::Link(_) | Node::Delete(_) | Node::LinkReference(_) => {
            for child in node.children().into_iter().flatten() {
                extract_text_from_node(child, buffer);
            }
        }
        _ => {}
    }
}

fn render_children(children: &[Node], ctx: &mut Context) {
    for child in children {
        render_node(child, ctx);
    }
}

fn render_wrapped(tag: &str, children: &[Node], ctx: &mut Context) {
    ctx.push_raw("<");
    ctx.push_raw(tag);
    ctx.push_raw(">");
    render_children(children, ctx);
    ctx.push_raw("</");
    ctx.push_raw(tag);
    ctx.push_raw(">");
}

fn render_list(list: &mdast::List, ctx: &mut Context) {
    match list.start {
        Some(start) if list.ordered && start != 1 => {
            ctx.push_raw(&format!("<ol start=\"{start}\">"));
        }
        _ if list.ordered => ctx.push_raw("<ol>"),
        _ if list.children.iter().any(is_task_item) => ctx.push_raw("<ul class=\"contains-task-list\">"),
        _ => ctx.push_raw("<ul>"),
    }
    ctx.enter(Scope::List {
        spread: list.spread,
    });
    render_children(&list.children, ctx);
    ctx.exit();
    ctx.push_raw(if list.ordered { "</ol>" } else { "</ul>" });
}

fn is_task_item(node: &Node) -> bool {
    matches!(node, Node::ListItem(item) if item.checked.is_some())
}

/// Task list items put their leading paragraph inside a
/// `<label><input type="checkbox" disabled/>` wrapper; nested blocks follow
/// the label.
fn render_list_item(item: &mdast::ListItem, ctx: &mut Context) {
    let Some(checked) = item.checked else {
        ctx.push_raw("<li>");
        render_children(&item.children, ctx);
        ctx.push_raw("</li>");
        return;
    };

    ctx.push_raw("<li class=\"task-list-item\"><label><input type=\"checkbox\" disabled");
    if checked {
        ctx.push_raw(" checked");
    }
    ctx.push_raw("/><span>");

    let split = item
        .children
        .iter()
        .position(|child| matches!(child, Node::Paragraph(_)))
        .map_or(0, |index| index + 1);
    let (label, rest) = item.children.split_at(split);
    render_children(label, ctx);
    ctx.push_raw("</span></label>");
    render_children(rest, ctx);
    ctx.push_raw("</li>");
}

fn render_paragraph(para: &mdast::Paragraph, ctx: &mut Context) {
    let in_tight_list = ctx.is_in_tight_list();
    if in_tight_list {
        render_children(&para.children, ctx);
        return;
    }
    ctx.push_raw("<p>");
    ctx.enter(Scope::Paragraph);
    render_children(&para.children, ctx);
    ctx.exit();
    ctx.push_raw("</p>");
}

fn render_heading(heading: &mdast::Heading, ctx: &mut Context) {
    let text = extract_text_from_nodes(&heading.children);
    let slug = ctx.generate_slug(&text);

    ctx.push_raw(&format!("<h{} id=\"", heading.depth));
    ctx.push_attr_value(&slug);
    ctx.push_raw("\">");
    render_children(&heading.children, ctx);
    if ctx.options().heading_anchors {
        ctx.push_raw("<a class=\"gw-heading-anchor\" href=\"#");
        ctx.push_attr_value(&slug);
        ctx.push_raw("\" aria-hidden=\"true\">#</a>");
    }
    ctx.push_raw(&format!("</h{}>", heading.depth));
}

fn push_link_open(url: &str, title: Option<&str>, ctx: &mut Context) {
    ctx.push_raw("<a href=\"");
    ctx.push_attr_value(url);
    ctx.push_raw("\"");
    if let Some(title) = title {
        ctx.push_raw(" title=\"");
        ctx.push_attr_value(title);
        ctx.push_raw("\"");
    }
    ctx.push_raw(">");
}

fn push_image(url: &str, alt: &str, title: Option<&str>, ctx: &mut Context) {
    ctx.push_raw("<img src=\"");
    ctx.push_attr_value(url);
    ctx.push_raw("\" alt=\"");
    ctx.push_attr_value(alt);
    ctx.push_raw("\"");
    if let Some(title) = title {
        ctx.push_raw(" title=\"");
        ctx.push_attr_value(title);
        ctx.push_raw("\"");
    }
    ctx.push_raw(" />");
}

/// Unresolved references fall back to their source text.
fn render_link_reference(reference: &mdast::LinkReference, ctx: &mut Context) {
    if let Some(target) = ctx.definition(&reference.identifier).cloned() {
        push_link_open(&target.url, target.title.as_deref(), ctx);
        render_children(&reference.children, ctx);
        ctx.push_raw("</a>");
        return;
    }

    ctx.push_text("[");
    render_children(&reference.children, ctx);
    ctx.push_text("]");
    match reference.reference_kind {
        ReferenceKind::Full => {
            ctx.push_text("[");
            ctx.push_text(reference.label.as_deref().unwrap_or(&reference.identifier));
            ctx.push_text("]");
        }
        ReferenceKind::Collapsed => ctx.push_text("[]"),
        ReferenceKind::Shortcut => {}
    }
}

fn render_image_reference(reference: &mdast::ImageReference, ctx: &mut Context) {
    match ctx.definition(&reference.identifier).cloned() {
        Some(target) => push_image(&target.url, &reference.alt, target.title.as_deref(), ctx),
        None => {
            ctx.push_text("![");
            ctx.push_text(&reference.alt);
            ctx.push_text("]");
        }
    }
}

fn render_code(code: &mdast::Code, ctx: &mut Context) {
    ctx.push_raw("<pre><code");
    if let Some(lang) = code.lang.as_deref().filter(|lang| !lang.is_empty()) {
        ctx.push_raw(" class=\"language-");
        ctx.push_attr_value(lang);
        ctx.push_raw("\"");
    }
    ctx.push_raw(">");
    ctx.push_text(&code.value);
    if !code.value.is_empty() {
        ctx.push_raw("\n");
    }
    ctx.push_raw("</code></pre>");
}

fn render_table(table: &mdast::Table, ctx: &mut Context) {
    ctx.enter(Scope::Table);
    ctx.push_raw("<table>");
    let mut rows = table.children.iter().filter_map(|row| match row {
        Node::TableRow(row) => Some(row),
        _ => None,
    });

    if let Some(head) = rows.next() {
        ctx.push_raw("<thead>");
        render_table_row(head, "th", &table.align, ctx);
        ctx.push_raw("</thead>");
    }
    let body: Vec<&mdast::TableRow> = rows.collect();
    if !body.is_empty() {
        ctx.push_raw("<tbody>");
        for row in body {
            render_table_row(row, "td", &table.align, ctx);
        }
        ctx.push_raw("</tbody>");
    }
    ctx.push_raw("</table>");
    ctx.exit();
}

fn render_table_row(row: &mdast::TableRow, tag: &str, aligns: &[AlignKind], ctx: &mut Context) {
    ctx.push_raw("<tr>");
    for (i, cell) in row.children.iter().enumerate() {
        let Node::TableCell(cell) = cell else {
            continue;
        };
        let align = match aligns.get(i) {
            Some(AlignKind::Left) => " style=\"text-align:left\"",
            Some(AlignKind::Right) => " style=\"text-align:right\"",
            Some(AlignKind::Center) => " style=\"text-align:center\"",
            Some(AlignKind::None) | None => "",
        };
        ctx.push_raw(&format!("<{tag}{align}>"));
        render_children(&cell.children, ctx);
        ctx.push_raw(&format!("</{tag}>"));
    }
    ctx.push_raw("</tr>");
}

fn render_html(html: &mdast::Html, ctx: &mut Context) {
    if ctx.options().raw_html {
        ctx.push_raw(&html.value);
    } else {
        log::debug!("escaping raw HTML: {}", html.value);
        ctx.push_text(&html.value);
    }
}

fn render_footnote_reference(reference: &mdast::FootnoteReference, ctx: &mut Context) {
    let safe_id = footnote_id(&reference.identifier);
    let (ordinal, count) = ctx.reference_footnote(&reference.identifier);
    let suffix = if count == 1 {
        String::new()
    } else {
        format!("-{count}")
    };
    ctx.push_raw(&format!(
        "<sup><a href=\"#user-content-fn-{safe_id}\" id=\"user-content-fnref-{safe_id}{suffix}\" data-footnote-ref aria-describedby=\"footnote-label\">{ordinal}</a></sup>"
    ));
}

fn render_footnote_definition(definition: &mdast::FootnoteDefinition, ctx: &mut Context) {
    if ctx.has_footnote_body(&definition.identifier) {
        return;
    }
    let body = ctx.render_children_to_html(&definition.children);
    ctx.push_footnote_body(&definition.identifier, body);
}

/// Recursively renders an mdast node into the context buffer.
pub fn render_node(node: &Node, ctx: &mut Context) {
    match node {
        Node::Root(root) => render_children(&root.children, ctx),
        Node::Text(text) => ctx.push_text(&text.value),
        Node::Paragraph(para) => render_paragraph(para, ctx),
        Node::Heading(heading) => render_heading(heading, ctx),
        Node::Strong(strong) => render_wrapped("strong", &strong.children, ctx),
        Node::Emphasis(emphasis) => render_wrapped("em", &emphasis.children, ctx),
        Node::Delete(delete) => render_wrapped("del", &delete.children, ctx),
        Node::InlineCode(code) => {
            ctx.push_raw("<code>");
            ctx.push_text(&code.value);
            ctx.push_raw("</code>");
        }
        Node::Break(_) => ctx.push_raw("<br />"),
        Node::Link(link) => {
            push_link_open(&link.url, link.title.as_deref(), ctx);
            render_children(&link.children, ctx);
            ctx.push_raw("</a>");
        }
        Node::LinkReference(reference) => render_link_reference(reference, ctx),
        Node::Image(image) => push_image(&image.url, &image.alt, image.title.as_deref(), ctx),
        Node::ImageReference(reference) => render_image_reference(reference, ctx),
        Node::List(list) => render_list(list, ctx),
        Node::ListItem(item) => render_list_item(item, ctx),
        Node::Blockquote(quote) => render_wrapped("blockquote", &quote.children, ctx),
        Node::Code(code) => render_code(code, ctx),
        Node::ThematicBreak(_) => ctx.push_raw("<hr />"),
        Node::Html(html) => render_html(html, ctx),
        Node::Table(table) => render_table(table, ctx),
        Node::TableRow(_) | Node::TableCell(_) | Node::Definition(_) => {}
        Node::FootnoteReference(reference) => render_footnote_reference(reference, ctx),
        Node::FootnoteDefinition(definition) => render_footnote_definition(definition, ctx),
        _ => {
            log::warn!("Unhandled markdown node type: {:?}", node);
        }
    }
}
