use chrono::DateTime;
use chrono::NaiveDate;

use folio_core::tile::Tile;
use folio_core::tile::TileKind;

use crate::element::Element;
use crate::element::Node;
use crate::markdown::is_safe_url;
use crate::markdown::markdown_to_html;

/// Meta keys shown on resume cards, in display order.
pub const RESUME_META_KEYS: [&str; 3] = ["dates", "location", "gpa"];

/// Renders one tile: the type-specific body first, then the shared finishing
/// pass that every kind goes through.
pub fn render_tile(tile: &Tile) -> Element {
    let body = match tile.kind {
        TileKind::Project => render_project(tile),
        TileKind::Link => render_link(tile),
        TileKind::Content => render_content(tile),
        TileKind::Widget => render_widget(tile),
        TileKind::Profile => render_profile(tile),
        TileKind::Experience | TileKind::Education => render_resume(tile),
    };
    finish(body, tile)
}

/// Attributes every tile carries regardless of kind. Filtering, sorting and
/// layout only ever read these.
pub fn finish(mut element: Element, tile: &Tile) -> Element {
    element.set_attr("id", tile.id.clone());
    element.add_class("tile");
    element.add_class(&format!("tile-{}", tile.kind.label()));
    if tile.featured {
        element.add_class("featured");
    }
    element.set_attr("data-type", tile.kind.label());
    element.set_attr("data-priority", tile.priority.to_string());
    element.set_attr("data-tags", tile.merged_tags().join(" "));
    element.set_attr("data-source", tile.source.label());

    let overrides = [
        ("background", tile.style.background.as_deref()),
        ("color", tile.style.color.as_deref()),
        ("border-color", tile.style.border_color.as_deref()),
    ];
    for (property, value) in overrides {
        if let Some(value) = value.map(str::trim).filter(|value| is_safe_css_value(value)) {
            element.set_style(property, value);
        }
    }
    element
}

fn render_project(tile: &Tile) -> Element {
    let mut article = Element::new("article");
    if let Some(image) = tile_image(tile) {
        article.push(
            Element::new("img")
                .class("tile-image")
                .attr("src", image)
                .attr("alt", tile.title.clone())
                .attr("loading", "lazy"),
        );
    }

    let mut body = Element::new("div").class("tile-body");
    body.push(title_heading("h3", tile, safe_target(tile.url.as_deref()), true));
    if let Some(description) = description(tile) {
        body.push(description);
    }
    let badges = project_badges(tile);
    if !badges.is_empty() {
        let mut row = Element::new("div").class("tile-badges");
        for badge in badges {
            row.push(badge);
        }
        body.push(row);
    }
    if let Some(homepage) = safe_target(tile.homepage.as_deref()) {
        body.push(
            external_anchor(homepage)
                .class("tile-homepage")
                .text("Website"),
        );
    }
    if let Some(tags) = tag_list(tile) {
        body.push(tags);
    }
    article.push(body);
    article
}

/// Stars, language, visits and creation date, each only when the tile has it.
pub fn project_badges(tile: &Tile) -> Vec<Element> {
    let mut badges = Vec::new();
    if let Some(stars) = tile.stars {
        badges.push(badge("stars", format!("★ {stars}")));
    }
    if let Some(language) = tile.language.as_deref() {
        badges.push(badge("language", language.to_string()));
    }
    if let Some(visits) = tile.visit_count() {
        badges.push(badge("visits", format!("{visits} views")));
    }
    if let Some(created) = tile.created_at.as_deref().and_then(format_created) {
        badges.push(badge("created", format!("Since {created}")));
    }
    badges
}

fn badge(kind: &str, text: String) -> Element {
    Element::new("span")
        .class("badge")
        .class(&format!("badge-{kind}"))
        .text(text)
}

/// `2023-04-18T09:00:00Z` and `2023-04-18` both become `Apr 2023`.
pub fn format_created(value: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.format("%b %Y").to_string());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%b %Y").to_string())
}

fn render_link(tile: &Tile) -> Element {
    let target = safe_target(tile.url.as_deref());
    let mut root = match target {
        Some(url) => {
            let anchor = Element::new("a").attr("href", url);
            if tile.open_new_tab {
                anchor
                    .attr("target", "_blank")
                    .attr("rel", "noopener noreferrer")
            } else {
                anchor
            }
        }
        None => Element::new("div"),
    };
    if let Some(image) = tile_image(tile) {
        root.push(
            Element::new("img")
                .class("tile-icon")
                .attr("src", image)
                .attr("alt", ""),
        );
    }
    root.push(title_heading("h3", tile, None, false));
    if let Some(description) = description(tile) {
        root.push(description);
    }
    root
}

fn render_content(tile: &Tile) -> Element {
    let mut article = Element::new("article");
    if !tile.title.trim().is_empty() {
        article.push(title_heading("h3", tile, None, false));
    }
    let markdown = tile
        .content_markdown
        .as_deref()
        .unwrap_or(tile.description.as_str());
    article.push(
        Element::new("div")
            .class("tile-content")
            .child(Node::Trusted(markdown_to_html(markdown))),
    );
    article
}

fn render_widget(tile: &Tile) -> Element {
    let mut section = Element::new("section");
    if !tile.title.trim().is_empty() {
        section.push(title_heading("h3", tile, None, false));
    }
    let mut mount = Element::new("div").class("tile-widget");
    if let Some(widget_id) = tile.widget_id.as_deref() {
        mount.set_attr("data-widget", widget_id);
    }
    if let Some(description) = description(tile) {
        mount.push(description);
    }
    section.push(mount);
    section
}

fn render_profile(tile: &Tile) -> Element {
    let mut article = Element::new("article");
    if let Some(image) = tile_image(tile) {
        article.push(
            Element::new("img")
                .class("tile-avatar")
                .attr("src", image)
                .attr("alt", tile.title.clone()),
        );
    }
    article.push(title_heading("h2", tile, None, false));
    if let Some(description) = description(tile) {
        article.push(description);
    }
    if let Some(markdown) = tile.content_markdown.as_deref() {
        article.push(
            Element::new("div")
                .class("tile-content")
                .child(Node::Trusted(markdown_to_html(markdown))),
        );
    }
    if let Some(url) = safe_target(tile.url.as_deref()) {
        article.push(external_anchor(url).class("tile-cta").text("Get in touch"));
    }
    article
}

fn render_resume(tile: &Tile) -> Element {
    let mut root = match safe_target(tile.url.as_deref()) {
        Some(url) => Element::new("a").attr("href", url),
        None => Element::new("div"),
    };
    root.push(title_heading("h3", tile, None, false));
    if let Some(description) = description(tile) {
        root.push(description);
    }
    let lines: Vec<&str> = RESUME_META_KEYS
        .iter()
        .filter_map(|key| tile.meta.get(*key))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();
    if !lines.is_empty() {
        root.push(
            Element::new("p")
                .class("tile-meta")
                .text(lines.join(" · ")),
        );
    }
    if let Some(tags) = tag_list(tile) {
        root.push(tags);
    }
    root
}

fn title_heading(tag: &str, tile: &Tile, link: Option<&str>, new_tab: bool) -> Element {
    let heading = Element::new(tag).class("tile-title");
    match link {
        Some(url) => {
            let anchor = Element::new("a").attr("href", url);
            let anchor = if new_tab {
                anchor
                    .attr("target", "_blank")
                    .attr("rel", "noopener noreferrer")
            } else {
                anchor
            };
            heading.child(anchor.text(tile.title.clone()))
        }
        None => heading.text(tile.title.clone()),
    }
}

fn description(tile: &Tile) -> Option<Element> {
    let text = tile.description.trim();
    (!text.is_empty()).then(|| {
        Element::new("p")
            .class("tile-description")
            .text(text.to_string())
    })
}

fn tag_list(tile: &Tile) -> Option<Element> {
    if tile.tags.is_empty() {
        return None;
    }
    let mut list = Element::new("ul").class("tile-tags");
    for tag in &tile.tags {
        list.push(Element::new("li").text(tag.clone()));
    }
    Some(list)
}

fn external_anchor(url: &str) -> Element {
    Element::new("a")
        .attr("href", url)
        .attr("target", "_blank")
        .attr("rel", "noopener noreferrer")
}

/// The image the card actually shows. Blank and scripted targets are dropped.
pub fn tile_image(tile: &Tile) -> Option<&str> {
    safe_target(tile.image.as_deref())
}

fn safe_target(url: Option<&str>) -> Option<&str> {
    url.map(str::trim)
        .filter(|url| !url.is_empty() && is_safe_url(url))
}

pub(crate) fn is_safe_css_value(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|ch| matches!(ch, ';' | '{' | '}' | '<' | '>' | '"' | '\\') || ch.is_control())
        && !value.to_ascii_lowercase().contains("url(")
        && !value.to_ascii_lowercase().contains("expression(")
}
