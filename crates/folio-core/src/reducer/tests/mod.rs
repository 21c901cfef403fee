use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use crate::actions::PortfolioAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::config::LayoutConfig;
pub(super) use crate::config::PriorityTag;
pub(super) use crate::config::SiteConfig;
pub(super) use crate::filter::SortKey;
pub(super) use crate::masonry::layout;
pub(super) use crate::reducer::FolioEffect;
pub(super) use crate::sources::LoadedSite;
pub(super) use crate::state::LoadStatus;
pub(super) use crate::state::LogBuffer;
pub(super) use crate::state::LogEntry;
pub(super) use crate::state::LogLevel;
pub(super) use crate::state::LogSource;
pub(super) use crate::state::PortfolioState;
pub(super) use crate::theme::ThemeMode;
pub(super) use crate::tile::Tile;
pub(super) use crate::tile::TileKind;

mod filter_semantics;
mod selection_reconcile;

fn state() -> PortfolioState {
    PortfolioState::new(SiteConfig::default(), ThemeMode::Auto)
}

fn tile(id: &str, title: &str, priority: i64, tags: &[&str]) -> Tile {
    let mut tile = Tile::new(id, TileKind::Project, title);
    tile.priority = priority;
    tile.tags = tags.iter().map(|tag| tag.to_string()).collect();
    tile
}

/// Alpha (priority 5, go) and Beta (priority 10, rust).
fn alpha_beta() -> Vec<Tile> {
    vec![
        tile("alpha", "Alpha", 5, &["go"]),
        tile("beta", "Beta", 10, &["rust"]),
    ]
}

fn site(tiles: Vec<Tile>) -> LoadedSite {
    LoadedSite {
        config: SiteConfig::default(),
        tiles,
        notices: Vec::new(),
    }
}

fn loaded(tiles: Vec<Tile>) -> PortfolioState {
    let mut state = state();
    run_runtime(&mut state, RuntimeAction::TilesLoaded(site(tiles)));
    state
}

fn run_user(state: &mut PortfolioState, action: UserAction) -> Vec<FolioEffect> {
    reduce(state, PortfolioAction::User(action))
}

fn run_runtime(state: &mut PortfolioState, action: RuntimeAction) -> Vec<FolioEffect> {
    reduce(state, PortfolioAction::Runtime(action))
}

fn visible_titles(state: &PortfolioState) -> Vec<String> {
    state
        .visible_tiles()
        .map(|tile| tile.title.clone())
        .collect()
}

fn assert_view_partitions_store(state: &PortfolioState) {
    let mut seen: Vec<&str> = state
        .view
        .dom_order()
        .map(|(id, _)| id)
        .collect();
    seen.sort_unstable();
    let mut stored: Vec<&str> = state.tiles.iter().map(|tile| tile.id.as_str()).collect();
    stored.sort_unstable();
    assert_eq!(seen, stored);
}
