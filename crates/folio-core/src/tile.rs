use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_yaml::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Project,
    Link,
    Content,
    Widget,
    Profile,
    Experience,
    Education,
}

impl TileKind {
    pub const ALL: [TileKind; 7] = [
        Self::Project,
        Self::Link,
        Self::Content,
        Self::Widget,
        Self::Profile,
        Self::Experience,
        Self::Education,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Link => "link",
            Self::Content => "content",
            Self::Widget => "widget",
            Self::Profile => "profile",
            Self::Experience => "experience",
            Self::Education => "education",
        }
    }
}

/// Where a tile came from. Carried through to the rendered element so the
/// page can tell generated cards from hand-written ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSource {
    Github,
    #[default]
    Manual,
    Resume,
}

impl TileSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Manual => "manual",
            Self::Resume => "resume",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileStyle {
    pub background: Option<String>,
    pub color: Option<String>,
    pub border_color: Option<String>,
}

impl TileStyle {
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.color.is_none() && self.border_color.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Traffic {
    pub views_14d: u64,
    pub unique_visitors_14d: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: String,
    pub kind: TileKind,
    pub title: String,
    pub description: String,
    pub priority: i64,
    pub tags: Vec<String>,
    pub topics: Vec<String>,
    pub language: Option<String>,
    pub stars: Option<u64>,
    pub forks: Option<u64>,
    pub url: Option<String>,
    pub homepage: Option<String>,
    pub open_new_tab: bool,
    pub content_markdown: Option<String>,
    pub widget_id: Option<String>,
    pub image: Option<String>,
    pub style: TileStyle,
    pub created_at: Option<String>,
    pub traffic: Option<Traffic>,
    pub featured: bool,
    pub meta: BTreeMap<String, String>,
    pub source: TileSource,
}

impl Tile {
    pub fn new(id: impl Into<String>, kind: TileKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            description: String::new(),
            priority: 0,
            tags: Vec::new(),
            topics: Vec::new(),
            language: None,
            stars: None,
            forks: None,
            url: None,
            homepage: None,
            open_new_tab: false,
            content_markdown: None,
            widget_id: None,
            image: None,
            style: TileStyle::default(),
            created_at: None,
            traffic: None,
            featured: false,
            meta: BTreeMap::new(),
            source: TileSource::Manual,
        }
    }

    /// Lowercased union of tags, topics and language, first occurrence wins.
    pub fn merged_tags(&self) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();
        let candidates = self
            .tags
            .iter()
            .chain(self.topics.iter())
            .chain(self.language.iter());
        for value in candidates {
            let normalized = value.trim().to_lowercase();
            if normalized.is_empty() || merged.contains(&normalized) {
                continue;
            }
            merged.push(normalized);
        }
        merged
    }

    pub fn search_haystack(&self) -> String {
        let mut parts: Vec<&str> = vec![self.title.as_str(), self.description.as_str()];
        parts.extend(self.tags.iter().map(String::as_str));
        parts.extend(self.topics.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    pub fn is_forced_bottom(&self) -> bool {
        self.priority < 0
    }

    pub fn visit_count(&self) -> Option<u64> {
        self.traffic.map(|traffic| traffic.views_14d)
    }

    pub fn target_url(&self) -> Option<&str> {
        self.url.as_deref().or(self.homepage.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTileKind(pub String);

/// Wire shape of a tile as it appears in the YAML data files. Every field is
/// optional and parsed leniently; [`RawTile::into_tile`] substitutes defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTile {
    #[serde(deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    #[serde(rename = "type", deserialize_with = "de_opt_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "de_opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "de_opt_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "de_opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "de_priority")]
    pub priority: i64,
    #[serde(deserialize_with = "de_string_list")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "de_string_list")]
    pub topics: Vec<String>,
    #[serde(deserialize_with = "de_opt_string")]
    pub language: Option<String>,
    #[serde(deserialize_with = "de_opt_count")]
    pub stars: Option<u64>,
    #[serde(deserialize_with = "de_opt_count")]
    pub forks: Option<u64>,
    #[serde(deserialize_with = "de_opt_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "de_opt_string")]
    pub homepage: Option<String>,
    #[serde(deserialize_with = "de_flag")]
    pub open_new_tab: bool,
    #[serde(alias = "content", deserialize_with = "de_opt_string")]
    pub content_markdown: Option<String>,
    #[serde(deserialize_with = "de_opt_string")]
    pub widget_id: Option<String>,
    #[serde(deserialize_with = "de_opt_string")]
    pub image: Option<String>,
    pub style: Option<TileStyle>,
    #[serde(deserialize_with = "de_opt_string")]
    pub created_at: Option<String>,
    pub traffic: Option<Traffic>,
    #[serde(deserialize_with = "de_flag")]
    pub featured: bool,
    pub meta: BTreeMap<String, Value>,
}

impl RawTile {
    pub fn into_tile(self, source: TileSource) -> Result<Tile, UnknownTileKind> {
        let kind_label = self.kind.unwrap_or_else(|| default_kind(source).to_string());
        let kind = TileKind::parse(&kind_label).ok_or(UnknownTileKind(kind_label))?;
        let title = self.title.or(self.name).unwrap_or_default();
        let id = self.id.filter(|id| !id.trim().is_empty()).unwrap_or_default();
        Ok(Tile {
            id,
            kind,
            title,
            description: self.description.unwrap_or_default(),
            priority: self.priority,
            tags: self.tags,
            topics: self.topics,
            language: self.language.filter(|language| !language.trim().is_empty()),
            stars: self.stars,
            forks: self.forks,
            url: self.url,
            homepage: self.homepage.filter(|homepage| !homepage.trim().is_empty()),
            open_new_tab: self.open_new_tab,
            content_markdown: self.content_markdown,
            widget_id: self.widget_id,
            image: self.image.filter(|image| !image.trim().is_empty()),
            style: self.style.unwrap_or_default(),
            created_at: self.created_at,
            traffic: self.traffic,
            featured: self.featured,
            meta: self
                .meta
                .iter()
                .filter_map(|(key, value)| scalar_string(value).map(|text| (key.clone(), text)))
                .collect(),
            source,
        })
    }
}

fn default_kind(source: TileSource) -> &'static str {
    match source {
        TileSource::Github => "project",
        TileSource::Manual => "link",
        TileSource::Resume => "experience",
    }
}

pub fn slugify(text: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let pattern =
        NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));
    let lowered = text.to_lowercase();
    pattern
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn priority_from_value(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite())
                    .map(|float| float as i64)
            })
            .unwrap_or(0),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|float| float.is_finite())
                        .map(|float| float as i64)
                })
                .unwrap_or(0)
        }
        Value::Tagged(tagged) => priority_from_value(&tagged.value),
        _ => 0,
    }
}

fn de_priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(priority_from_value).unwrap_or(0))
}

fn de_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_string))
}

fn de_opt_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|value| match value {
        Value::Null => None,
        other => u64::try_from(priority_from_value(other)).ok(),
    }))
}

fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(text)) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        ),
        Some(Value::Number(number)) => number.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}

fn de_string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
        Some(Value::String(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}
