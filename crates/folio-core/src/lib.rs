pub mod actions;
pub mod config;
pub mod debounce;
pub mod filter;
pub mod github;
pub mod masonry;
pub mod reducer;
pub mod resume;
pub mod sources;
pub mod state;
pub mod tags;
pub mod theme;
pub mod tile;

pub use actions::*;
pub use reducer::*;
pub use state::*;
