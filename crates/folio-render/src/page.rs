use serde::Serialize;

use folio_core::filter::SortKey;
use folio_core::masonry::MeasuredChild;
use folio_core::state::PortfolioState;
use folio_core::tags::TagOption;

use crate::element::escape_attr;
use crate::element::escape_text;
use crate::element::Element;
use crate::element::Node;
use crate::markdown::highlight_css;
use crate::renderer::is_safe_css_value;
use crate::renderer::render_tile;

pub const STYLESHEET_FILE: &str = "folio.css";

/// Client-side settings embedded in the page as JSON.
#[derive(Debug, Serialize)]
struct PageSettings<'a> {
    sort: SortKey,
    search: &'a str,
    active_tags: Vec<&'a str>,
    search_debounce_ms: u64,
    resize_debounce_ms: u64,
    row_quantum_px: f64,
    gap_px: f64,
    theme: &'a str,
    tags: &'a [TagOption],
}

/// Renders the whole `index.html` for the current session state. `spans`
/// comes from a layout pass over the same state and is matched by id.
pub fn render_page(state: &PortfolioState, spans: &[MeasuredChild]) -> String {
    let title = state.config.title.as_str();
    let layout = &state.config.layout;

    let mut body = Element::new("body");
    body.push(header(state));
    body.push(controls(state));
    if let Some(message) = state.load.error_banner() {
        body.push(
            Element::new("div")
                .class("error-banner")
                .attr("role", "alert")
                .text(message.to_string()),
        );
    }

    let mut grid = Element::new("main").class("grid");
    grid.set_style("--columns", layout.columns.max(1).to_string());
    grid.set_style("--row-quantum", format!("{}px", layout.row_quantum_px));
    grid.set_style("--gap", format!("{}px", layout.gap_px));
    for (id, hidden) in state.view.dom_order() {
        let Some(tile) = state.tiles.get(id) else {
            continue;
        };
        let span = spans
            .iter()
            .find(|child| child.id == id)
            .map(|child| child.span)
            .unwrap_or(if hidden { 0 } else { 1 });
        let mut element = render_tile(tile);
        if hidden {
            element.set_style("display", "none");
            element.set_attr("data-hidden", "true");
        } else {
            element.set_style("grid-row-end", format!("span {span}"));
        }
        element.set_attr("data-span", span.to_string());
        grid.push(element);
    }
    body.push(grid);
    body.push(settings_island(state));

    let mut page = String::from("<!DOCTYPE html>\n");
    page.push_str(&format!(
        "<html lang=\"en\" data-theme=\"{}\">\n<head>\n",
        state.theme.label()
    ));
    page.push_str("<meta charset=\"utf-8\">\n");
    page.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    page.push_str(&format!("<title>{}</title>\n", escape_text(title)));
    page.push_str(&format!(
        "<link rel=\"stylesheet\" href=\"{}\">\n",
        escape_attr(STYLESHEET_FILE)
    ));
    page.push_str("<style>\n");
    page.push_str(highlight_css());
    page.push_str("</style>\n</head>\n");
    body.write_html(&mut page);
    page.push_str("\n</html>\n");
    page
}

fn header(state: &PortfolioState) -> Element {
    Element::new("header")
        .class("site-header")
        .child(Element::new("h1").text(state.config.title.clone()))
        .child(
            Element::new("button")
                .class("theme-toggle")
                .attr("type", "button")
                .attr("data-theme", state.theme.label())
                .text(format!("Theme: {}", state.theme.label())),
        )
}

fn controls(state: &PortfolioState) -> Element {
    let mut tags = Element::new("div").class("tag-filters");
    for option in &state.tag_options {
        let mut button = Element::new("button")
            .class("tag-filter")
            .attr("type", "button")
            .attr("data-tag", option.value.clone())
            .text(option.label.clone())
            .child(
                Element::new("span")
                    .class("tag-count")
                    .text(option.count.to_string()),
            );
        if option.pinned {
            button.add_class("pinned");
        }
        if state.filters.is_tag_active(&option.value) {
            button.add_class("active");
            button.set_attr("aria-pressed", "true");
        }
        if let Some(color) = option
            .color
            .as_deref()
            .map(str::trim)
            .filter(|color| is_safe_css_value(color))
        {
            button.set_style("--tag-color", color);
        }
        tags.push(button);
    }

    let search = Element::new("input")
        .class("search")
        .attr("type", "search")
        .attr("placeholder", "Search")
        .attr("value", state.search_draft.clone());

    let mut sort = Element::new("select").class("sort");
    for key in SortKey::ALL {
        let mut option = Element::new("option")
            .attr("value", key.label())
            .text(key.title());
        if key == state.filters.sort {
            option.set_attr("selected", "selected");
        }
        sort.push(option);
    }

    Element::new("nav")
        .class("filters")
        .child(tags)
        .child(search)
        .child(sort)
}

fn settings_island(state: &PortfolioState) -> Element {
    let settings = PageSettings {
        sort: state.filters.sort,
        search: &state.filters.search,
        active_tags: state.filters.tags.iter().map(String::as_str).collect(),
        search_debounce_ms: state.config.filters.search_debounce_ms,
        resize_debounce_ms: state.config.layout.resize_debounce_ms,
        row_quantum_px: state.config.layout.row_quantum_px,
        gap_px: state.config.layout.gap_px,
        theme: state.theme.label(),
        tags: &state.tag_options,
    };
    let json = serde_json::to_string(&settings)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");
    Element::new("script")
        .attr("type", "application/json")
        .attr("id", "folio-settings")
        .child(Node::Trusted(json))
}

/// Default stylesheet written next to `index.html`.
pub const DEFAULT_STYLESHEET: &str = r#":root {
  --bg: #fafafa;
  --fg: #1d1d1f;
  --card: #ffffff;
  --muted: #6e6e73;
  --accent: #0a84ff;
}
[data-theme="dark"] {
  --bg: #121214;
  --fg: #f5f5f7;
  --card: #1c1c1e;
  --muted: #a1a1a6;
}
@media (prefers-color-scheme: dark) {
  [data-theme="auto"] {
    --bg: #121214;
    --fg: #f5f5f7;
    --card: #1c1c1e;
    --muted: #a1a1a6;
  }
}
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--fg); }
.site-header, .filters { display: flex; flex-wrap: wrap; gap: 8px; align-items: center; padding: 16px 24px; }
.tag-filter { border: 1px solid var(--tag-color, var(--muted)); border-radius: 999px; background: none; color: inherit; padding: 4px 10px; }
.tag-filter.active { background: var(--tag-color, var(--accent)); color: #fff; }
.tag-count { margin-left: 6px; opacity: 0.6; }
.error-banner { margin: 0 24px; padding: 12px 16px; border-radius: 8px; background: #ff453a; color: #fff; }
.grid { display: grid; grid-template-columns: repeat(var(--columns), minmax(0, 1fr)); grid-auto-rows: var(--row-quantum); column-gap: var(--gap); row-gap: 0; padding: 24px; }
.tile { display: block; margin-bottom: var(--gap); padding: 16px; border-radius: 12px; background: var(--card); color: inherit; text-decoration: none; overflow: hidden; border: 1px solid transparent; }
.tile.featured { border-color: var(--accent); }
.tile-image { width: 100%; border-radius: 8px; }
.badge { display: inline-block; margin-right: 6px; font-size: 0.85em; color: var(--muted); }
.tile-tags { list-style: none; padding: 0; display: flex; flex-wrap: wrap; gap: 6px; font-size: 0.8em; color: var(--muted); }
.code { overflow-x: auto; padding: 8px; border-radius: 6px; }
"#;
