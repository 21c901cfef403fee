use std::collections::HashMap;

use serde::Serialize;

use crate::config::PriorityTag;
use crate::filter::normalize_tag;
use crate::tile::Tile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOption {
    pub value: String,
    pub label: String,
    pub color: Option<String>,
    pub count: usize,
    pub pinned: bool,
}

/// Builds the filter bar: configured tags first, in configured order, then
/// every other tag found in the corpus by descending frequency. Frequency
/// ties keep the order in which the tags were first seen.
pub fn discover_tag_options(pinned: &[PriorityTag], tiles: &[Tile]) -> Vec<TagOption> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    for tile in tiles {
        for tag in tile.merged_tags() {
            let count = counts.entry(tag.clone()).or_insert(0);
            if *count == 0 {
                first_seen.push(tag);
            }
            *count += 1;
        }
    }

    let mut options: Vec<TagOption> = Vec::new();
    for tag in pinned {
        let value = normalize_tag(&tag.value);
        if value.is_empty() || options.iter().any(|option| option.value == value) {
            continue;
        }
        options.push(TagOption {
            label: tag.label.clone().unwrap_or_else(|| tag.value.trim().to_string()),
            color: tag.color.clone(),
            count: counts.get(&value).copied().unwrap_or(0),
            pinned: true,
            value,
        });
    }

    let mut discovered: Vec<(usize, String)> = first_seen
        .into_iter()
        .filter(|tag| !options.iter().any(|option| &option.value == tag))
        .map(|tag| (counts.get(&tag).copied().unwrap_or(0), tag))
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    discovered.sort_by(|a, b| b.0.cmp(&a.0));

    options.extend(discovered.into_iter().map(|(count, value)| TagOption {
        label: value.clone(),
        color: None,
        count,
        pinned: false,
        value,
    }));
    options
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tile::TileKind;

    fn tile(id: &str, tags: &[&str], topics: &[&str], language: Option<&str>) -> Tile {
        let mut tile = Tile::new(id, TileKind::Project, id);
        tile.tags = tags.iter().map(|tag| tag.to_string()).collect();
        tile.topics = topics.iter().map(|tag| tag.to_string()).collect();
        tile.language = language.map(str::to_string);
        tile
    }

    fn values(options: &[TagOption]) -> Vec<&str> {
        options.iter().map(|option| option.value.as_str()).collect()
    }

    #[test]
    fn pinned_tags_lead_then_frequency_order() {
        let tiles = vec![
            tile("a", &["cli"], &["web"], Some("Rust")),
            tile("b", &["web"], &[], Some("Go")),
            tile("c", &["web", "ml"], &[], Some("Rust")),
        ];
        let pinned = vec![PriorityTag {
            value: "ML".to_string(),
            label: Some("Machine Learning".to_string()),
            color: Some("#f80".to_string()),
        }];
        let options = discover_tag_options(&pinned, &tiles);
        assert_eq!(values(&options), vec!["ml", "web", "rust", "cli", "go"]);
        assert_eq!(options[0].label, "Machine Learning");
        assert_eq!(options[0].count, 1);
        assert!(options[0].pinned);
        assert_eq!(options[1].count, 3);
    }

    #[test]
    fn duplicates_within_one_tile_count_once() {
        let tiles = vec![tile("a", &["rust"], &["Rust"], Some("rust"))];
        let options = discover_tag_options(&[], &tiles);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].count, 1);
    }

    #[test]
    fn pinned_tag_absent_from_corpus_is_still_offered() {
        let options = discover_tag_options(&[PriorityTag::new("Embedded")], &[]);
        assert_eq!(values(&options), vec!["embedded"]);
        assert_eq!(options[0].label, "Embedded");
        assert_eq!(options[0].count, 0);
    }
}
