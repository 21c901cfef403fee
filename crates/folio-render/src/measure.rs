//! Height estimates for the static build, where there is no browser to
//! measure rendered cards. The estimates feed the same span computation the
//! interactive views use.

use std::path::Path;

use folio_core::config::LayoutConfig;
use folio_core::masonry::layout;
use folio_core::masonry::ImageGate;
use folio_core::masonry::ImageOutcome;
use folio_core::masonry::MeasuredChild;
use folio_core::state::PortfolioState;
use folio_core::tile::Tile;
use folio_core::tile::TileKind;

use crate::renderer::project_badges;
use crate::renderer::tile_image;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightModel {
    pub column_width_px: f64,
    pub char_width_px: f64,
    pub line_height_px: f64,
    pub title_line_height_px: f64,
    pub padding_px: f64,
    pub image_height_px: f64,
    pub row_height_px: f64,
}

impl Default for HeightModel {
    fn default() -> Self {
        Self {
            column_width_px: 320.0,
            char_width_px: 8.0,
            line_height_px: 22.0,
            title_line_height_px: 28.0,
            padding_px: 32.0,
            image_height_px: 180.0,
            row_height_px: 30.0,
        }
    }
}

impl HeightModel {
    fn chars_per_line(&self) -> usize {
        let usable = (self.column_width_px - self.padding_px).max(self.char_width_px);
        ((usable / self.char_width_px) as usize).max(1)
    }

    fn wrapped_lines(&self, text: &str) -> usize {
        let width = self.chars_per_line();
        text.lines()
            .map(|line| line.chars().count().div_ceil(width).max(1))
            .sum()
    }

    /// Approximate rendered height of one card. `image_loaded` is false when
    /// the image failed, which collapses it to nothing.
    pub fn estimate(&self, tile: &Tile, image_loaded: bool) -> f64 {
        let mut height = self.padding_px;
        if tile_image(tile).is_some() && image_loaded {
            height += match tile.kind {
                TileKind::Profile => self.image_height_px / 2.0,
                TileKind::Link => self.line_height_px * 2.0,
                _ => self.image_height_px,
            };
        }
        if !tile.title.trim().is_empty() {
            height += self.title_line_height_px * self.wrapped_lines(&tile.title) as f64;
        }
        if !tile.description.trim().is_empty() {
            height += self.line_height_px * self.wrapped_lines(&tile.description) as f64;
        }
        if let Some(markdown) = tile.content_markdown.as_deref() {
            height += self.line_height_px * self.wrapped_lines(markdown) as f64;
        }
        if tile.kind == TileKind::Project && !project_badges(tile).is_empty() {
            height += self.row_height_px;
        }
        if !tile.tags.is_empty() {
            height += self.row_height_px;
        }
        if matches!(tile.kind, TileKind::Experience | TileKind::Education) && !tile.meta.is_empty()
        {
            height += self.line_height_px;
        }
        height
    }
}

/// Settles every tile image before the first layout pass. Local paths are
/// checked under `site_root`; remote images are assumed to load.
pub fn probe_images(tiles: &[Tile], site_root: &Path) -> ImageGate {
    let with_images: Vec<(&Tile, &str)> = tiles
        .iter()
        .filter_map(|tile| tile_image(tile).map(|image| (tile, image)))
        .collect();
    let mut gate = ImageGate::new(with_images.iter().map(|(tile, _)| tile.id.clone()));
    for (tile, image) in with_images {
        let outcome = if is_remote(image) || site_root.join(image).is_file() {
            ImageOutcome::Loaded
        } else {
            ImageOutcome::Failed
        };
        gate.resolve(&tile.id, outcome);
    }
    gate
}

fn is_remote(path: &str) -> bool {
    let lowered = path.trim().to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://") || lowered.starts_with("//")
}

/// Measures every child in container order and assigns spans.
pub fn static_layout(
    state: &PortfolioState,
    gate: &ImageGate,
    model: &HeightModel,
    config: &LayoutConfig,
) -> Vec<MeasuredChild> {
    let mut children = state.layout_children(|tile| {
        let failed = gate.failed().iter().any(|id| *id == tile.id);
        model.estimate(tile, !failed)
    });
    layout(children.as_mut_slice(), config);
    children
}
