use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::filter::SortKey;
use crate::theme::ThemeMode;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub filters: FilterConfig,
    pub layout: LayoutConfig,
    pub theme: ThemeConfig,
    pub curated_repos: Vec<String>,
    pub resume_source_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            filters: FilterConfig::default(),
            layout: LayoutConfig::default(),
            theme: ThemeConfig::default(),
            curated_repos: Vec::new(),
            resume_source_url: None,
        }
    }
}

impl SiteConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.filters.search_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.layout.resize_debounce_ms)
    }

    /// `resume_source_url: DISABLED` switches the resume source off.
    pub fn resume_enabled(&self) -> bool {
        !self
            .resume_source_url
            .as_deref()
            .is_some_and(|url| url.trim().eq_ignore_ascii_case("disabled"))
    }

    pub fn is_curated(&self, repo: &str) -> bool {
        self.curated_repos.is_empty() || self.curated_repos.iter().any(|name| name == repo)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FilterConfig {
    pub default_sort: SortKey,
    pub priority_tags: Vec<PriorityTag>,
    pub search_debounce_ms: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_sort: SortKey::Priority,
            priority_tags: Vec::new(),
            search_debounce_ms: 300,
        }
    }
}

/// A tag pinned to the front of the filter bar. Accepts either a bare string
/// or a `{ value, label, color }` mapping.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "PriorityTagRepr")]
pub struct PriorityTag {
    pub value: String,
    pub label: Option<String>,
    pub color: Option<String>,
}

impl PriorityTag {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
            color: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorityTagRepr {
    Plain(String),
    Full {
        value: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
}

impl From<PriorityTagRepr> for PriorityTag {
    fn from(repr: PriorityTagRepr) -> Self {
        match repr {
            PriorityTagRepr::Plain(value) => Self::new(value),
            PriorityTagRepr::Full {
                value,
                label,
                color,
            } => Self {
                value,
                label,
                color,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub row_quantum_px: f64,
    pub gap_px: f64,
    pub resize_debounce_ms: u64,
    pub columns: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_quantum_px: 10.0,
            gap_px: 16.0,
            resize_debounce_ms: 150,
            columns: 3,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub default: ThemeMode,
}
