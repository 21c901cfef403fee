use std::collections::HashSet;
use std::time::Duration;

use super::actions::PortfolioAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::filter::normalize_tag;
use super::filter::FilterState;
use super::filter::SortKey;
use super::sources::LoadedSite;
use super::state::LoadStatus;
use super::state::LogEntry;
use super::state::LogLevel;
use super::state::LogSource;
use super::state::PortfolioState;
use super::state::ViewState;
use super::tags::discover_tag_options;
use super::theme::ThemeMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolioEffect {
    RequestFrame,
    /// Spans are stale; the host should run a layout pass.
    RequestLayout,
    ScheduleSearch {
        text: String,
        delay: Duration,
    },
    PersistTheme(ThemeMode),
    CopyToClipboard(String),
}

pub fn reduce(state: &mut PortfolioState, action: PortfolioAction) -> Vec<FolioEffect> {
    match action {
        PortfolioAction::User(user) => reduce_user(state, user),
        PortfolioAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut PortfolioState, action: UserAction) -> Vec<FolioEffect> {
    match action {
        UserAction::ToggleTag(tag) => {
            let normalized = normalize_tag(&tag);
            if normalized.is_empty() {
                return Vec::new();
            }
            let known = state
                .tag_options
                .iter()
                .any(|option| normalize_tag(&option.value) == normalized);
            if !known && !state.filters.is_tag_active(&normalized) {
                log(
                    state,
                    LogLevel::Debug,
                    LogSource::Filter,
                    format!("tag {normalized} is not offered; ignored"),
                );
                return Vec::new();
            }
            let active = state.filters.toggle_tag(&tag);
            log(
                state,
                LogLevel::Debug,
                LogSource::Filter,
                format!("tag {normalized} {}", if active { "on" } else { "off" }),
            );
            refresh_view(state)
        }
        UserAction::ClearTags => {
            if state.filters.tags.is_empty() {
                return Vec::new();
            }
            state.filters.tags.clear();
            refresh_view(state)
        }
        UserAction::SearchInput(text) => {
            state.search_draft.clone_from(&text);
            vec![
                FolioEffect::RequestFrame,
                FolioEffect::ScheduleSearch {
                    text,
                    delay: state.config.search_debounce(),
                },
            ]
        }
        UserAction::SetSort(key) => {
            let sort = state.filters.set_sort(&key);
            if SortKey::try_parse(&key).is_none() {
                log(
                    state,
                    LogLevel::Debug,
                    LogSource::Filter,
                    format!("unknown sort key `{key}`; using {}", sort.label()),
                );
            }
            refresh_view(state)
        }
        UserAction::CycleSort => {
            state.filters.sort = state.filters.sort.next();
            refresh_view(state)
        }
        UserAction::SelectNext => move_selection(state, 1),
        UserAction::SelectPrev => move_selection(state, -1),
        UserAction::CycleTheme => {
            state.theme = state.theme.next();
            vec![
                FolioEffect::PersistTheme(state.theme),
                FolioEffect::RequestFrame,
            ]
        }
        UserAction::SetTheme(theme) => {
            state.theme = theme;
            vec![FolioEffect::PersistTheme(theme), FolioEffect::RequestFrame]
        }
        UserAction::CopySelectedUrl => {
            let url = state
                .selected_tile()
                .and_then(|tile| tile.target_url())
                .map(str::to_string);
            match url {
                Some(url) => vec![FolioEffect::CopyToClipboard(url)],
                None => {
                    log(
                        state,
                        LogLevel::Info,
                        LogSource::Shell,
                        "selected tile has no link to copy",
                    );
                    vec![FolioEffect::RequestFrame]
                }
            }
        }
        UserAction::ClearFilters => {
            state.search_draft.clear();
            if !state.filters.is_active() {
                return vec![FolioEffect::RequestFrame];
            }
            state.filters.clear();
            refresh_view(state)
        }
    }
}

fn reduce_runtime(state: &mut PortfolioState, action: RuntimeAction) -> Vec<FolioEffect> {
    match action {
        RuntimeAction::TilesLoaded(site) => {
            apply_loaded_site(state, site);
            vec![FolioEffect::RequestLayout, FolioEffect::RequestFrame]
        }
        RuntimeAction::LoadFailed(message) => {
            state.tiles.clear();
            state.tag_options.clear();
            state.view = ViewState::default();
            state.selection = None;
            log(state, LogLevel::Error, LogSource::Loader, message.clone());
            state.load = LoadStatus::Failed(message.into());
            vec![FolioEffect::RequestFrame]
        }
        RuntimeAction::CommitSearch(text) => {
            let before = state.filters.search.clone();
            state.filters.set_search(&text);
            if state.filters.search == before {
                return Vec::new();
            }
            refresh_view(state)
        }
        RuntimeAction::AppendLog(entry) => {
            state.logs.append(entry);
            Vec::new()
        }
        RuntimeAction::ClearLogs => {
            state.logs.clear();
            Vec::new()
        }
    }
}

fn apply_loaded_site(state: &mut PortfolioState, site: LoadedSite) {
    let LoadedSite {
        config,
        tiles,
        notices,
    } = site;

    for notice in notices {
        state.logs.append(notice);
    }

    state.filters = FilterState::new(config.filters.default_sort);
    state.search_draft.clear();
    state.config = config;
    state.tiles.clear();
    for tile in tiles {
        let id = tile.id.clone();
        if state.tiles.insert(tile).is_some() {
            log(
                state,
                LogLevel::Warn,
                LogSource::Loader,
                format!("duplicate tile id `{id}`; the later record wins"),
            );
        }
    }

    state.tag_options =
        discover_tag_options(&state.config.filters.priority_tags, state.tiles.as_slice());
    state.load = LoadStatus::Ready;
    state.selection = None;
    recompute_view(state);
    let count = state.tiles.len();
    log(
        state,
        LogLevel::Info,
        LogSource::Loader,
        format!("loaded {count} tiles"),
    );
}

fn refresh_view(state: &mut PortfolioState) -> Vec<FolioEffect> {
    recompute_view(state);
    vec![FolioEffect::RequestLayout, FolioEffect::RequestFrame]
}

/// Rebuilds visible order and hidden set from the store. The store itself is
/// never filtered, so hidden tiles can reappear on the next change.
pub fn recompute_view(state: &mut PortfolioState) {
    let order: Vec<String> = state
        .filters
        .apply(state.tiles.as_slice())
        .into_iter()
        .map(|tile| tile.id.clone())
        .collect();
    let visible: HashSet<&str> = order.iter().map(String::as_str).collect();
    let hidden: Vec<String> = state
        .tiles
        .iter()
        .filter(|tile| !visible.contains(tile.id.as_str()))
        .map(|tile| tile.id.clone())
        .collect();
    state.view = ViewState { order, hidden };
    reconcile_selection(state);
}

fn reconcile_selection(state: &mut PortfolioState) {
    let still_visible = state
        .selection
        .as_deref()
        .is_some_and(|id| state.view.is_visible(id));
    if !still_visible {
        state.selection = state.view.order.first().cloned();
    }
}

fn move_selection(state: &mut PortfolioState, delta: isize) -> Vec<FolioEffect> {
    let order = &state.view.order;
    if order.is_empty() {
        return Vec::new();
    }
    let current = state
        .selection
        .as_deref()
        .and_then(|id| order.iter().position(|visible| visible == id));
    let next = match current {
        Some(index) => index
            .saturating_add_signed(delta)
            .min(order.len() - 1),
        None => 0,
    };
    let next_id = order[next].clone();
    if state.selection.as_deref() == Some(next_id.as_str()) {
        return Vec::new();
    }
    state.selection = Some(next_id);
    vec![FolioEffect::RequestFrame]
}

fn log(state: &mut PortfolioState, level: LogLevel, source: LogSource, message: impl Into<String>) {
    state.logs.append(LogEntry::new(level, source, message));
}

#[cfg(test)]
mod tests;
