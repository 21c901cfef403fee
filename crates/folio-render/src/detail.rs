//! Standalone pages for resume entries. Each resume tile links to one.

use folio_core::resume::ResumeEntry;
use folio_core::theme::ThemeMode;

use crate::element::escape_attr;
use crate::element::escape_text;
use crate::element::Element;
use crate::element::Node;
use crate::page::STYLESHEET_FILE;

/// Renders the page written at `entry.page_path()` under the output
/// directory. Links climb back to the site root from there.
pub fn render_detail_page(entry: &ResumeEntry, site_title: &str, theme: ThemeMode) -> String {
    let root = "../".repeat(entry.page_path().matches('/').count());
    let home = format!("{root}index.html");

    let mut meta = Element::new("div").class("detail-meta");
    if !entry.role.trim().is_empty() {
        meta.push(
            Element::new("p")
                .class("detail-role")
                .child(Element::new("strong").text(entry.role.clone())),
        );
    }
    for value in [&entry.location, &entry.dates, &entry.gpa] {
        if !value.trim().is_empty() {
            meta.push(Element::new("p").class("detail-meta-item").text(value.clone()));
        }
    }

    let main = Element::new("main")
        .class("detail")
        .child(
            Element::new("a")
                .class("back-link")
                .attr("href", home.clone())
                .text("Back to home"),
        )
        .child(
            Element::new("h1")
                .class("detail-title")
                .text(entry.organization.clone()),
        )
        .child(meta)
        .child(
            Element::new("div")
                .class(&format!("{}-content", entry.section.label()))
                .child(Node::Trusted(entry.description_html.clone())),
        );
    let body = Element::new("body")
        .child(
            Element::new("header").class("site-header").child(
                Element::new("a")
                    .class("site-title")
                    .attr("href", home)
                    .text(site_title.to_string()),
            ),
        )
        .child(main);

    let mut page = String::from("<!DOCTYPE html>\n");
    page.push_str(&format!(
        "<html lang=\"en\" data-theme=\"{}\">\n<head>\n",
        theme.label()
    ));
    page.push_str("<meta charset=\"utf-8\">\n");
    page.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    page.push_str(&format!(
        "<title>{} - {}</title>\n",
        escape_text(&entry.organization),
        escape_text(site_title)
    ));
    page.push_str(&format!(
        "<meta name=\"description\" content=\"{}\">\n",
        escape_attr(&entry.role)
    ));
    page.push_str(&format!(
        "<link rel=\"stylesheet\" href=\"{}\">\n</head>\n",
        escape_attr(&format!("{root}{STYLESHEET_FILE}"))
    ));
    body.write_html(&mut page);
    page.push_str("\n</html>\n");
    page
}
