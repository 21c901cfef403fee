use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Priority,
    Stars,
    Recent,
    Alphabetical,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        Self::Priority,
        Self::Stars,
        Self::Recent,
        Self::Alphabetical,
    ];

    /// Unrecognized keys fall back to [`SortKey::Priority`].
    pub fn parse(value: &str) -> Self {
        Self::try_parse(value).unwrap_or_default()
    }

    pub fn try_parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.label().eq_ignore_ascii_case(value))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Stars => "stars",
            Self::Recent => "recent",
            Self::Alphabetical => "alphabetical",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Priority => "Priority",
            Self::Stars => "Most stars",
            Self::Recent => "Recent",
            Self::Alphabetical => "A-Z",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Priority => Self::Stars,
            Self::Stars => Self::Recent,
            Self::Recent => Self::Alphabetical,
            Self::Alphabetical => Self::Priority,
        }
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().map(SortKey::parse).unwrap_or_default())
    }
}

/// Active predicates and sort key for one page session.
///
/// Nothing here can fail: unknown tags never match anything and the search
/// text is always treated as a literal substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub tags: BTreeSet<String>,
    pub search: String,
    pub sort: SortKey,
}

impl FilterState {
    pub fn new(sort: SortKey) -> Self {
        Self {
            tags: BTreeSet::new(),
            search: String::new(),
            sort,
        }
    }

    /// Flips membership of `tag`. Returns whether the tag is active afterwards.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let tag = normalize_tag(tag);
        if tag.is_empty() {
            return false;
        }
        if self.tags.remove(&tag) {
            false
        } else {
            self.tags.insert(tag);
            true
        }
    }

    pub fn is_tag_active(&self, tag: &str) -> bool {
        self.tags.contains(&normalize_tag(tag))
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.trim().to_lowercase();
    }

    pub fn set_sort(&mut self, key: &str) -> SortKey {
        self.sort = SortKey::parse(key);
        self.sort
    }

    pub fn clear(&mut self) {
        self.tags.clear();
        self.search.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.tags.is_empty() || !self.search.is_empty()
    }

    pub fn matches_tags(&self, tile: &Tile) -> bool {
        self.tags.is_empty()
            || tile
                .merged_tags()
                .iter()
                .any(|tag| self.tags.contains(tag))
    }

    pub fn matches_search(&self, tile: &Tile) -> bool {
        self.search.is_empty() || tile.search_haystack().contains(&self.search)
    }

    pub fn evaluate(&self, tile: &Tile) -> bool {
        self.matches_tags(tile) && self.matches_search(tile)
    }

    /// Filters `tiles` and orders the survivors by the active sort key.
    /// The input slice is left untouched so hidden tiles can come back later.
    pub fn apply<'a>(&self, tiles: &'a [Tile]) -> Vec<&'a Tile> {
        let mut visible: Vec<&Tile> = tiles.iter().filter(|tile| self.evaluate(tile)).collect();
        sort_tiles(&mut visible, self.sort);
        visible
    }
}

pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Stable sort. Negative priorities always trail, whatever the key.
pub fn sort_tiles(tiles: &mut [&Tile], key: SortKey) {
    if key == SortKey::Alphabetical {
        tiles.sort_by_cached_key(|tile| (tile.is_forced_bottom(), collation_key(&tile.title)));
        return;
    }
    tiles.sort_by(|a, b| compare_tiles(a, b, key));
}

pub fn compare_tiles(a: &Tile, b: &Tile, key: SortKey) -> Ordering {
    a.is_forced_bottom()
        .cmp(&b.is_forced_bottom())
        .then_with(|| match key {
            SortKey::Stars => b.stars.unwrap_or(0).cmp(&a.stars.unwrap_or(0)),
            SortKey::Alphabetical => collation_key(&a.title).cmp(&collation_key(&b.title)),
            // `recent` has no timestamp of its own; priority already folds in push recency.
            SortKey::Priority | SortKey::Recent => b.priority.cmp(&a.priority),
        })
}

/// Accents and case only break ties: `Émile` files under `e`, next to
/// `Emile`, and `apple` and `Apple` keep their input order.
fn collation_key(title: &str) -> (String, String) {
    let lowered = title.trim().to_lowercase();
    let folded = lowered
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect();
    (folded, lowered)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tile::TileKind;

    fn tile(title: &str, priority: i64, tags: &[&str]) -> Tile {
        let mut tile = Tile::new(title.to_lowercase(), TileKind::Project, title);
        tile.priority = priority;
        tile.tags = tags.iter().map(|tag| tag.to_string()).collect();
        tile
    }

    fn titles(tiles: &[&Tile]) -> Vec<String> {
        tiles.iter().map(|tile| tile.title.clone()).collect()
    }

    #[test]
    fn unknown_sort_key_falls_back_to_priority() {
        let mut filters = FilterState::default();
        assert_eq!(filters.set_sort("newest"), SortKey::Priority);
        assert_eq!(filters.set_sort("STARS"), SortKey::Stars);
    }

    #[test]
    fn toggle_tag_normalizes_case() {
        let mut filters = FilterState::default();
        assert!(filters.toggle_tag("Rust"));
        assert!(filters.is_tag_active("rust"));
        assert!(!filters.toggle_tag("RUST"));
        assert!(filters.tags.is_empty());
    }

    #[test]
    fn blank_tag_is_ignored() {
        let mut filters = FilterState::default();
        assert!(!filters.toggle_tag("   "));
        assert!(filters.tags.is_empty());
    }

    #[test]
    fn tag_filter_uses_or_semantics() {
        let tiles = vec![
            tile("Alpha", 0, &["go"]),
            tile("Beta", 0, &["rust"]),
            tile("Gamma", 0, &["python"]),
        ];
        let mut filters = FilterState::default();
        filters.toggle_tag("go");
        filters.toggle_tag("rust");
        assert_eq!(titles(&filters.apply(&tiles)), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn language_counts_as_a_tag() {
        let mut gamma = tile("Gamma", 0, &[]);
        gamma.language = Some("TypeScript".to_string());
        let tiles = vec![gamma];
        let mut filters = FilterState::default();
        filters.toggle_tag("typescript");
        assert_eq!(titles(&filters.apply(&tiles)), vec!["Gamma"]);
    }

    #[test]
    fn search_is_literal_and_case_insensitive() {
        let tiles = vec![tile("Alpha (beta)", 0, &[]), tile("Gamma", 0, &[])];
        let mut filters = FilterState::default();
        filters.set_search("A (BE");
        assert_eq!(titles(&filters.apply(&tiles)), vec!["Alpha (beta)"]);
        filters.set_search(".*");
        assert!(filters.apply(&tiles).is_empty());
    }

    #[test]
    fn tag_and_search_must_both_pass() {
        let tiles = vec![tile("Alpha", 0, &["go"]), tile("Algol", 0, &["rust"])];
        let mut filters = FilterState::default();
        filters.toggle_tag("go");
        filters.set_search("al");
        assert_eq!(titles(&filters.apply(&tiles)), vec!["Alpha"]);
    }

    #[test]
    fn stars_sort_is_stable() {
        let mut a = tile("A", 0, &[]);
        a.stars = Some(3);
        let mut b = tile("B", 0, &[]);
        b.stars = Some(7);
        let mut c = tile("C", 0, &[]);
        c.stars = Some(3);
        let d = tile("D", 0, &[]);
        let tiles = vec![a, b, c, d];
        let filters = FilterState::new(SortKey::Stars);
        assert_eq!(titles(&filters.apply(&tiles)), vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn alphabetical_ignores_case() {
        let tiles = vec![
            tile("banana", 0, &[]),
            tile("Apple", 0, &[]),
            tile("apple", 0, &[]),
        ];
        let filters = FilterState::new(SortKey::Alphabetical);
        assert_eq!(titles(&filters.apply(&tiles)), vec!["Apple", "apple", "banana"]);
    }

    #[test]
    fn alphabetical_files_accented_titles_under_their_base_letter() {
        let tiles = vec![
            tile("Zebra", 0, &[]),
            tile("Émile", 0, &[]),
            tile("apple", 0, &[]),
            tile("Ölfass", 0, &[]),
            tile("banana", 0, &[]),
            tile("Emile", 0, &[]),
        ];
        let filters = FilterState::new(SortKey::Alphabetical);
        assert_eq!(
            titles(&filters.apply(&tiles)),
            vec!["apple", "banana", "Emile", "Émile", "Ölfass", "Zebra"]
        );
    }

    #[test]
    fn negative_priority_trails_under_every_key() {
        let mut sunk = tile("Aardvark", -5, &[]);
        sunk.stars = Some(1_000);
        let tiles = vec![sunk, tile("Zebra", 0, &[]), tile("Moose", 3, &[])];
        for key in SortKey::ALL {
            let ordered = FilterState::new(key).apply(&tiles);
            assert_eq!(ordered.last().map(|tile| tile.title.as_str()), Some("Aardvark"));
        }
    }

    #[test]
    fn recent_orders_like_priority() {
        let tiles = vec![tile("Low", 1, &[]), tile("High", 9, &[])];
        assert_eq!(
            titles(&FilterState::new(SortKey::Recent).apply(&tiles)),
            titles(&FilterState::new(SortKey::Priority).apply(&tiles))
        );
    }

    #[test]
    fn sort_key_deserializes_with_fallback() {
        let key: SortKey = serde_yaml::from_str("alphabetical").unwrap();
        assert_eq!(key, SortKey::Alphabetical);
        let key: SortKey = serde_yaml::from_str("trending").unwrap();
        assert_eq!(key, SortKey::Priority);
    }
}
