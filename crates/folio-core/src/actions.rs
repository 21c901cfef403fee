use super::sources::LoadedSite;
use super::state::LogEntry;
use super::theme::ThemeMode;

#[derive(Debug, Clone)]
pub enum PortfolioAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    ToggleTag(String),
    ClearTags,
    /// Raw text of the search box. Applied once the debounce window closes.
    SearchInput(String),
    SetSort(String),
    CycleSort,
    SelectNext,
    SelectPrev,
    CycleTheme,
    SetTheme(ThemeMode),
    CopySelectedUrl,
    ClearFilters,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    TilesLoaded(LoadedSite),
    LoadFailed(String),
    CommitSearch(String),
    AppendLog(LogEntry),
    ClearLogs,
}
