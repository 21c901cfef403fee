use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::filter::FilterState;
use crate::masonry::MeasuredChild;
use crate::tags::TagOption;
use crate::theme::ThemeMode;
use crate::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Loader,
    Filter,
    Layout,
    Render,
    Shell,
}

impl LogSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Loader => "loader",
            Self::Filter => "filter",
            Self::Layout => "layout",
            Self::Render => "render",
            Self::Shell => "shell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub source: LogSource,
    pub context: Option<String>,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, source: LogSource, message: impl Into<String>) -> Self {
        Self {
            seq: 0,
            level,
            source,
            context: None,
            message: message.into(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    /// A zero `cap` still keeps the newest entry.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;

        while self.buf.len() >= self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.buf.back()
    }

    /// Entries newer than `seq`, at or above `level`.
    pub fn since(&self, seq: u64, level: LogLevel) -> impl Iterator<Item = &LogEntry> {
        self.buf
            .iter()
            .filter(move |entry| entry.seq > seq && entry.level >= level)
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(500)
    }
}

/// Insertion-ordered tiles addressed by id. A repeated id replaces the
/// earlier record in place.
#[derive(Debug, Clone, Default)]
pub struct TileStore {
    tiles: Vec<Tile>,
    index: HashMap<String, usize>,
}

impl TileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record that was replaced, if the id was already present.
    pub fn insert(&mut self, tile: Tile) -> Option<Tile> {
        if let Some(&position) = self.index.get(&tile.id) {
            return Some(std::mem::replace(&mut self.tiles[position], tile));
        }
        self.index.insert(tile.id.clone(), self.tiles.len());
        self.tiles.push(tile);
        None
    }

    pub fn get(&self, id: &str) -> Option<&Tile> {
        self.index.get(id).map(|&position| &self.tiles[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn as_slice(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
        self.index.clear();
    }
}

/// Derived visibility and order. Recomputed on every filter or sort change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub order: Vec<String>,
    pub hidden: Vec<String>,
}

impl ViewState {
    pub fn is_visible(&self, id: &str) -> bool {
        self.order.iter().any(|visible| visible == id)
    }

    /// Render order of the container: visible tiles in sorted order, then the
    /// hidden ones in store order.
    pub fn dom_order(&self) -> impl Iterator<Item = (&str, bool)> {
        self.order
            .iter()
            .map(|id| (id.as_str(), false))
            .chain(self.hidden.iter().map(|id| (id.as_str(), true)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(Arc<str>),
}

impl LoadStatus {
    pub fn error_banner(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loading | Self::Ready => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioState {
    pub config: SiteConfig,
    pub tiles: TileStore,
    pub filters: FilterState,
    pub tag_options: Vec<TagOption>,
    pub view: ViewState,
    pub selection: Option<String>,
    pub search_draft: String,
    pub theme: ThemeMode,
    pub load: LoadStatus,
    pub logs: LogBuffer,
}

impl PortfolioState {
    pub fn new(config: SiteConfig, theme: ThemeMode) -> Self {
        Self {
            filters: FilterState::new(config.filters.default_sort),
            config,
            tiles: TileStore::new(),
            tag_options: Vec::new(),
            view: ViewState::default(),
            selection: None,
            search_draft: String::new(),
            theme,
            load: LoadStatus::Loading,
            logs: LogBuffer::default(),
        }
    }

    pub fn visible_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.view.order.iter().filter_map(|id| self.tiles.get(id))
    }

    pub fn selected_tile(&self) -> Option<&Tile> {
        self.selection.as_deref().and_then(|id| self.tiles.get(id))
    }

    /// Children for a layout pass, in container order, measured by `measure`.
    pub fn layout_children<F>(&self, mut measure: F) -> Vec<MeasuredChild>
    where
        F: FnMut(&Tile) -> f64,
    {
        self.view
            .dom_order()
            .filter_map(|(id, hidden)| {
                self.tiles.get(id).map(|tile| {
                    let height = if hidden { 0.0 } else { measure(tile) };
                    MeasuredChild::new(id, hidden, height)
                })
            })
            .collect()
    }
}
