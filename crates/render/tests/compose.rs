use folio_core::{
    ComposeError, FormFields, ParseWarning, RenderConfig, RenderMode, RenderRequest, TitlePage,
};
use folio_render::{Composer, PAGE_BREAK_HTML};
use once_cell::sync::Lazy;

static COMPOSER: Lazy<Composer> = Lazy::new(Composer::default);

fn compose(markdown: &str, config: RenderConfig) -> Result<String, ComposeError> {
    COMPOSER
        .compose(&RenderRequest::new(markdown, config))
        .map(|doc| doc.html)
}

fn preview(markdown: &str) -> String {
    compose(markdown, RenderConfig::default()).unwrap()
}

fn production(markdown: &str) -> String {
    let config = RenderConfig::builder()
        .mode(RenderMode::Production)
        .build()
        .unwrap();
    compose(markdown, config).unwrap()
}

fn body(html: &str) -> &str {
    let start = html.find("<body>").unwrap();
    let end = html.rfind("</body>").unwrap();
    &html[start..end]
}

fn style(html: &str) -> &str {
    let start = html.find("<style>").unwrap();
    let end = html.find("</style>").unwrap();
    &html[start..end]
}

#[test]
fn rendering_is_deterministic() {
    let source = "# Title\n\n:::tip Heads up\nBody\n:::\n\n[[PAGEBREAK]]\n\n![c](c.png){width=40%}\n";
    assert_eq!(production(source), production(source));
    assert_eq!(preview(source), preview(source));
}

#[test]
fn segments_keep_source_order() {
    let html = preview("first\n\n:::note\nsecond\n:::\n\nthird\n\n![fourth](4.png){width=20%}\n\nfifth");
    let positions: Vec<usize> = [
        "<p>first</p>",
        "<p>second</p>",
        "<p>third</p>",
        "alt=\"fourth\"",
        "<p>fifth</p>",
    ]
    .iter()
    .map(|needle| html.find(needle).unwrap())
    .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn page_breaks_in_both_modes() {
    let source = "a\n\n[[PAGEBREAK]]\n\nb\n\n[[PAGEBREAK]]\n\nc\n\n[[PAGEBREAK]]\n\nd";

    let paged = production(source);
    assert_eq!(body(&paged).matches(PAGE_BREAK_HTML).count(), 3);
    assert!(style(&paged).contains(".gw-page-break{break-before:page;"));
    assert!(style(&paged).contains("@page{size:A4 portrait;margin:20mm;}"));

    let continuous = preview(source);
    assert_eq!(body(&continuous).matches(PAGE_BREAK_HTML).count(), 3);
    let css = style(&continuous);
    assert!(css.contains("border-top:1px dashed"));
    assert!(!css.contains("break-before:page"));
    assert!(!css.contains("@page"));
}

#[test]
fn directives_inside_code_fences_are_literal() {
    let source = "```\n[[PAGEBREAK]]\n:::note\n![x](x.png){width=50%}\n```\n";
    let html = production(source);
    let body = body(&html);
    assert!(!body.contains(PAGE_BREAK_HTML));
    assert!(!body.contains("gw-callout"));
    assert!(!body.contains("gw-figure"));
    assert!(body.contains("[[PAGEBREAK]]\n:::note\n![x](x.png){width=50%}\n</code></pre>"));
}

#[test]
fn width_annotations() {
    let html = preview("![chart](chart.png){width=50%}");
    assert!(html.contains("<img src=\"chart.png\" alt=\"chart\" style=\"width:50%;\" />"));

    let err = compose("![chart](chart.png){width=150%}", RenderConfig::default()).unwrap_err();
    assert!(err.is_directive_syntax());
    assert_eq!(err.location().map(|loc| loc.line), Some(1));
}

#[test]
fn title_page_toggle() {
    let with_title = RenderConfig::builder()
        .mode(RenderMode::Production)
        .title_page(Some(TitlePage {
            title: "Quarterly <Report>".to_string(),
            date: "2024-04-01".to_string(),
            name: "Ada".to_string(),
        }))
        .build()
        .unwrap();
    let html = compose("body", with_title).unwrap();
    assert!(html.contains("<title>Quarterly &lt;Report&gt;</title>"));
    assert!(html.contains("<h1 class=\"gw-title\">Quarterly &lt;Report&gt;</h1>"));
    assert!(html.contains("<div class=\"gw-date\">2024-04-01</div>"));
    assert!(style(&html).contains(".gw-title-page{break-after:page;"));
    assert!(html.find("gw-title-page\"").unwrap() < html.find("<p>body</p>").unwrap());

    let html = production("body");
    assert!(!body(&html).contains("gw-title-page"));
    assert!(html.contains("<title>Document</title>"));
}

#[test]
fn modes_differ_only_in_css() {
    let source = "# Doc\n\n:::warning\nCareful\n:::\n\n[[PAGEBREAK]]\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
    let paged = production(source);
    let continuous = preview(source);
    assert_ne!(style(&paged), style(&continuous));
    assert_eq!(body(&paged), body(&continuous));
}

#[test]
fn unterminated_callout_is_an_error() {
    let err = compose("intro\n\n:::note\nnever closed", RenderConfig::default()).unwrap_err();
    assert!(err.is_directive_syntax());
    assert_eq!(err.location().map(|loc| loc.line), Some(3));
}

#[test]
fn terminated_callout_uses_default_label() {
    let html = preview(":::note\nremember this\n:::");
    assert!(html.contains("<aside class=\"gw-callout gw-callout-note\">"));
    assert!(html.contains("<span class=\"gw-callout-label\">Note</span>"));
    assert!(html.contains("<p>remember this</p>"));
}

#[test]
fn unknown_callout_kind_is_rejected() {
    let err = compose(":::danger\nx\n:::", RenderConfig::default()).unwrap_err();
    assert!(matches!(err, ComposeError::UnknownCalloutKind { ref kind, .. } if kind == "danger"));
}

#[test]
fn github_alerts_become_callouts() {
    let html = preview("> [!WARNING]\n> Hot *surface*\n\nafter");
    assert!(html.contains("gw-callout-warning"));
    assert!(html.contains("<em>surface</em>"));
    assert!(html.contains("<p>after</p>"));

    let html = preview("> [!IMPORTANT]\n> stays quoted");
    assert!(html.contains("<blockquote>"));
    assert!(!body(&html).contains("gw-callout"));
}

#[test]
fn custom_break_phrases() {
    let config = RenderConfig::builder()
        .mode(RenderMode::Production)
        .break_phrases(["<!-- NewPage -->"])
        .build()
        .unwrap();
    let html = compose("one\n\n<!-- newpage -->\n\ntwo\n\n:::pagebreak\n\nthree", config).unwrap();
    assert_eq!(body(&html).matches(PAGE_BREAK_HTML).count(), 2);
}

#[test]
fn soft_newlines_collapse_when_enabled() {
    let config = RenderConfig::builder()
        .collapse_soft_newlines(true)
        .build()
        .unwrap();
    let html = compose("one\ntwo\n\n- item\n- next", config).unwrap();
    assert!(html.contains("<p>one two</p>"));
    assert!(html.contains("<li>item</li>"));

    assert!(preview("one\ntwo").contains("<p>one\ntwo</p>"));
}

#[test]
fn raw_image_width_moves_into_style() {
    let html = preview("<img src=\"logo.png\" width=\"200\">");
    assert!(html.contains("<img src=\"logo.png\" style=\"width:200px;\">"));
}

#[test]
fn headings_get_unique_anchors() {
    let html = preview("## Setup\n\n## Setup");
    assert!(html.contains("<h2 id=\"setup\">"));
    assert!(html.contains("<h2 id=\"setup-1\">"));
    assert!(html.contains("<a class=\"gw-heading-anchor\" href=\"#setup\" aria-hidden=\"true\">#</a>"));
}

#[test]
fn injected_renderer_sees_only_plain_markdown() {
    let composer = Composer::new(|markdown: &str| {
        Ok::<_, ComposeError>(format!("<pre data-stub>{}</pre>", markdown.trim()))
    });
    let request = RenderRequest::new(
        "alpha\n\n[[PAGEBREAK]]\n\n:::info Context\nbeta\n:::",
        RenderConfig::default(),
    );
    let html = composer.compose(&request).unwrap().html;
    assert!(html.contains("<pre data-stub>alpha</pre>"));
    assert!(html.contains(PAGE_BREAK_HTML));
    assert!(html.contains("<span class=\"gw-callout-label\">Context</span>"));
    assert!(html.contains("<pre data-stub>beta</pre>"));
    assert!(!html.contains("data-stub>[[PAGEBREAK]]"));
}

#[test]
fn form_payload_to_document() {
    let fields: FormFields = serde_json::from_value(serde_json::json!({
        "markdown_content": "# Hello\n\n[[PAGEBREAK]]\n\nWorld",
        "font_size": 12,
        "page_size": "A5",
        "orientation": "landscape",
        "css_styles": "h1 { color: teal; }",
        "margin": "10mm 15mm"
    }))
    .unwrap();
    let request = fields.into_request(RenderMode::Production).unwrap();
    let html = COMPOSER.compose(&request).unwrap().html;

    insta::assert_snapshot!(
        style(&html).lines().nth(1).unwrap_or_default(),
        @"@page{size:A5 landscape;margin:10mm 15mm;}"
    );
    assert!(html.contains("html{font-size:12px;}"));
    assert!(style(&html).trim_end().ends_with("h1 { color: teal; }"));
}

#[test]
fn unclosed_fence_is_a_warning() {
    let doc = COMPOSER
        .compose(&RenderRequest::new(
            "text\n\n```rust\nfn main() {}\n[[PAGEBREAK]]",
            RenderConfig::default(),
        ))
        .unwrap();
    assert_eq!(doc.warnings.len(), 1);
    assert!(matches!(
        doc.warnings[0],
        ParseWarning::UnclosedCodeFence { marker: '`', .. }
    ));
    assert_eq!(doc.warnings[0].location().line, 3);
    assert!(!body(&doc.html).contains(PAGE_BREAK_HTML));
}

#[test]
fn custom_css_cannot_close_style_element() {
    let config = RenderConfig::builder()
        .custom_css("p{color:red}</style><script>alert(1)</script>")
        .build()
        .unwrap();
    let html = compose("text", config).unwrap();
    assert_eq!(html.matches("</style>").count(), 1);
    assert!(html.contains("p{color:red}<\\/style><script>"));
}

#[test]
fn batch_results_follow_input_order() {
    let requests = ["# one", "# two", ":::note\nbroken", "# four"]
        .into_iter()
        .map(|source| RenderRequest::new(source, RenderConfig::default()))
        .collect();
    let results = COMPOSER.compose_batch(requests, Some(2));
    assert_eq!(results.len(), 4);
    assert!(results[0].as_ref().unwrap().html.contains(">one<"));
    assert!(results[1].as_ref().unwrap().html.contains(">two<"));
    assert!(results[2].is_err());
    assert!(results[3].as_ref().unwrap().html.contains(">four<"));
}

#[test]
fn definitions_after_a_page_break_resolve() {
    let html = production(
        "See [docs][d] and note[^1].\n\n[[PAGEBREAK]]\n\n[d]: https://example.com\n[^1]: The footnote body.",
    );
    let body = body(&html);
    assert!(body.contains("<a href=\"https://example.com\">docs</a>"));
    assert!(body.contains("<sup><a href=\"#user-content-fn-1\""));
    assert!(!body.contains("[docs][d]"));
    assert_eq!(body.matches("The footnote body.").count(), 1);

    let footnotes = body.find("<section class=\"footnotes\"").unwrap();
    assert!(body.find(PAGE_BREAK_HTML).unwrap() < footnotes);
    assert!(footnotes < body.find("</main>").unwrap());
}

#[test]
fn footnotes_referenced_from_callouts_are_listed_once() {
    let html = preview(":::note\nAside[^a].\n:::\n\nMain text[^a].\n\n[^a]: Shared.");
    assert_eq!(html.matches("<section class=\"footnotes\"").count(), 1);
    assert_eq!(html.matches("Shared.").count(), 1);
    assert!(html.contains("href=\"#user-content-fnref-a-2\""));
}

#[test]
fn page_breaks_inside_callouts() {
    let html = production(":::note\nbefore\n[[PAGEBREAK]]\nafter\n:::");
    let callout = body(&html);
    assert!(!callout.contains("[[PAGEBREAK]]"));
    let opened = callout.find("<div class=\"gw-callout-body\">").unwrap();
    let page_break = callout.find(PAGE_BREAK_HTML).unwrap();
    assert!(opened < page_break);
    assert!(page_break < callout.find("</aside>").unwrap());

    let alert = production("> [!TIP]\n> before\n> [[PAGEBREAK]]\n> after");
    assert!(!body(&alert).contains("[[PAGEBREAK]]"));
    assert_eq!(body(&alert).matches(PAGE_BREAK_HTML).count(), 1);
}

#[test]
fn alert_code_fences_shield_width_annotations() {
    let html = preview("> [!NOTE]\n> ```md\n> ![x](x.png){width=150%}\n> ```");
    assert!(body(&html).contains("{width=150%}"));
    assert!(!body(&html).contains("gw-figure"));

    let err = compose("> [!NOTE]\n> ![x](x.png){width=150%}", RenderConfig::default()).unwrap_err();
    assert!(err.is_directive_syntax());
}
