use folio_core::TitlePage;

/// Title page markup. All three lines are always present so the layout does
/// not shift when a field is empty.
pub fn render_title_page(page: &TitlePage) -> String {
    format!(
        "<section class=\"gw-title-page\"><h1 class=\"gw-title\">{}</h1><div class=\"gw-date\">{}</div><div class=\"gw-name\">{}</div></section>",
        html_escape::encode_text(&page.title),
        html_escape::encode_text(&page.date),
        html_escape::encode_text(&page.name),
    )
}
