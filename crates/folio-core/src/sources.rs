use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::thread;
use std::thread::ScopedJoinHandle;

use serde_yaml::Value;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::state::LogEntry;
use crate::state::LogLevel;
use crate::state::LogSource;
use crate::tile::slugify;
use crate::tile::RawTile;
use crate::tile::Tile;
use crate::tile::TileSource;
use crate::tile::UnknownTileKind;

pub const SITE_CONFIG_FILE: &str = "site-config.yml";
pub const GITHUB_PROJECTS_FILE: &str = "github-projects.yml";
pub const MANUAL_TILES_FILE: &str = "tiles.yml";
pub const RESUME_TILES_FILE: &str = "resume-tiles.yml";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("{}: {detail}", path.display())]
    Shape { path: PathBuf, detail: String },
    #[error("loader for {name} panicked")]
    Worker { name: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    SiteConfig,
    GithubProjects,
    ManualTiles,
    ResumeTiles,
}

impl DataSource {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::SiteConfig => SITE_CONFIG_FILE,
            Self::GithubProjects => GITHUB_PROJECTS_FILE,
            Self::ManualTiles => MANUAL_TILES_FILE,
            Self::ResumeTiles => RESUME_TILES_FILE,
        }
    }

    /// A failed required source aborts the load. Optional ones degrade to
    /// an empty tile list.
    pub fn is_required(self) -> bool {
        matches!(self, Self::SiteConfig | Self::GithubProjects)
    }

    pub fn tile_source(self) -> Option<TileSource> {
        match self {
            Self::SiteConfig => None,
            Self::GithubProjects => Some(TileSource::Github),
            Self::ManualTiles => Some(TileSource::Manual),
            Self::ResumeTiles => Some(TileSource::Resume),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedSite {
    pub config: SiteConfig,
    pub tiles: Vec<Tile>,
    pub notices: Vec<LogEntry>,
}

/// Raw text of every source, as returned by the fetch workers. `Ok(None)`
/// marks an optional file that does not exist.
#[derive(Debug)]
pub struct FetchedSources {
    pub site_config: Result<Option<String>, SourceError>,
    pub github: Result<Option<String>, SourceError>,
    pub manual: Result<Option<String>, SourceError>,
    pub resume: Result<Option<String>, SourceError>,
}

/// Reads every source on its own thread and joins them before any tile is
/// built.
pub fn load_site(data_dir: &Path) -> Result<LoadedSite, SourceError> {
    let fetched = thread::scope(|scope| {
        let site_config = scope.spawn(|| fetch(data_dir, DataSource::SiteConfig));
        let github = scope.spawn(|| fetch(data_dir, DataSource::GithubProjects));
        let manual = scope.spawn(|| fetch(data_dir, DataSource::ManualTiles));
        let resume = scope.spawn(|| fetch(data_dir, DataSource::ResumeTiles));
        FetchedSources {
            site_config: join(site_config, DataSource::SiteConfig),
            github: join(github, DataSource::GithubProjects),
            manual: join(manual, DataSource::ManualTiles),
            resume: join(resume, DataSource::ResumeTiles),
        }
    });
    assemble(data_dir, fetched)
}

fn join(
    handle: ScopedJoinHandle<'_, Result<Option<String>, SourceError>>,
    source: DataSource,
) -> Result<Option<String>, SourceError> {
    handle.join().unwrap_or_else(|_| {
        Err(SourceError::Worker {
            name: source.file_name(),
        })
    })
}

fn fetch(data_dir: &Path, source: DataSource) -> Result<Option<String>, SourceError> {
    let path = data_dir.join(source.file_name());
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound && !source.is_required() => Ok(None),
        Err(err) => Err(SourceError::Read { path, source: err }),
    }
}

/// Builds the tile list from fetched text. Merge order is GitHub, manual,
/// then resume tiles.
pub fn assemble(data_dir: &Path, fetched: FetchedSources) -> Result<LoadedSite, SourceError> {
    let mut notices = Vec::new();

    let config_path = data_dir.join(SITE_CONFIG_FILE);
    let config_text = fetched.site_config?.unwrap_or_default();
    let config = SiteConfig::from_yaml_str(&config_text).map_err(|source| SourceError::Parse {
        path: config_path,
        source,
    })?;

    let github_text = fetched.github?.unwrap_or_default();
    let mut tiles = parse_tile_document(
        &data_dir.join(GITHUB_PROJECTS_FILE),
        &github_text,
        TileSource::Github,
        &mut notices,
    )?;
    let before = tiles.len();
    tiles.retain(|tile| config.is_curated(&tile.id));
    if tiles.len() != before {
        notices.push(
            LogEntry::new(
                LogLevel::Info,
                LogSource::Loader,
                format!(
                    "kept {} of {before} repositories listed in curated_repos",
                    tiles.len()
                ),
            )
            .with_context(GITHUB_PROJECTS_FILE),
        );
    }

    tiles.extend(optional_tiles(
        data_dir,
        DataSource::ManualTiles,
        fetched.manual,
        &mut notices,
    ));

    if config.resume_enabled() {
        tiles.extend(optional_tiles(
            data_dir,
            DataSource::ResumeTiles,
            fetched.resume,
            &mut notices,
        ));
    } else {
        notices.push(
            LogEntry::new(LogLevel::Info, LogSource::Loader, "resume tiles disabled")
                .with_context(RESUME_TILES_FILE),
        );
    }

    Ok(LoadedSite {
        config,
        tiles,
        notices,
    })
}

fn optional_tiles(
    data_dir: &Path,
    source: DataSource,
    fetched: Result<Option<String>, SourceError>,
    notices: &mut Vec<LogEntry>,
) -> Vec<Tile> {
    let Some(tile_source) = source.tile_source() else {
        return Vec::new();
    };
    let parsed = fetched.and_then(|text| match text {
        Some(text) => parse_tile_document(
            &data_dir.join(source.file_name()),
            &text,
            tile_source,
            notices,
        ),
        None => Ok(Vec::new()),
    });
    match parsed {
        Ok(tiles) => tiles,
        Err(err) => {
            notices.push(
                LogEntry::new(
                    LogLevel::Warn,
                    LogSource::Loader,
                    format!("{err}; continuing without it"),
                )
                .with_context(source.file_name()),
            );
            Vec::new()
        }
    }
}

/// Parses one tile document. The list may be the document itself or sit
/// under a `projects` or `tiles` key. Entries that cannot be turned into a
/// tile are skipped with a warning.
pub fn parse_tile_document(
    path: &Path,
    text: &str,
    source: TileSource,
    notices: &mut Vec<LogEntry>,
) -> Result<Vec<Tile>, SourceError> {
    let context = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let document: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(text).map_err(|err| SourceError::Parse {
            path: path.to_path_buf(),
            source: err,
        })?
    };

    let entries = match document {
        Value::Null => Vec::new(),
        Value::Sequence(entries) => entries,
        Value::Mapping(mut map) => {
            let list = map.remove("projects").or_else(|| map.remove("tiles"));
            match list {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Sequence(entries)) => entries,
                Some(_) => {
                    return Err(SourceError::Shape {
                        path: path.to_path_buf(),
                        detail: "tile list must be a sequence".to_string(),
                    })
                }
            }
        }
        _ => {
            return Err(SourceError::Shape {
                path: path.to_path_buf(),
                detail: "expected a mapping or a list of tiles".to_string(),
            })
        }
    };

    let mut tiles = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let raw = match serde_yaml::from_value::<RawTile>(entry) {
            Ok(raw) => raw,
            Err(err) => {
                notices.push(
                    LogEntry::new(
                        LogLevel::Warn,
                        LogSource::Loader,
                        format!("entry {} skipped: {err}", index + 1),
                    )
                    .with_context(context.clone()),
                );
                continue;
            }
        };
        let label = raw.id.clone().unwrap_or_else(|| format!("#{}", index + 1));
        match raw.into_tile(source) {
            Ok(mut tile) => {
                if tile.id.is_empty() {
                    tile.id = fallback_id(&tile, index);
                }
                tiles.push(tile);
            }
            Err(UnknownTileKind(kind)) => notices.push(
                LogEntry::new(
                    LogLevel::Warn,
                    LogSource::Loader,
                    format!("unknown tile type `{kind}` on {label}; tile omitted"),
                )
                .with_context(context.clone()),
            ),
        }
    }
    Ok(tiles)
}

fn fallback_id(tile: &Tile, index: usize) -> String {
    let slug = slugify(&tile.title);
    if slug.is_empty() {
        format!("{}-{}", tile.source.label(), index + 1)
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tile::TileKind;

    fn write(dir: &Path, name: &str, text: &str) {
        std::fs::write(dir.join(name), text).unwrap();
    }

    fn ids(site: &LoadedSite) -> Vec<&str> {
        site.tiles.iter().map(|tile| tile.id.as_str()).collect()
    }

    fn warnings(site: &LoadedSite) -> Vec<&str> {
        site.notices
            .iter()
            .filter(|entry| entry.level == LogLevel::Warn)
            .map(|entry| entry.message.as_str())
            .collect()
    }

    fn seed(dir: &Path) {
        write(dir, SITE_CONFIG_FILE, "title: Avery\n");
        write(
            dir,
            GITHUB_PROJECTS_FILE,
            "metadata:\n  total_repos: 2\nprojects:\n  - id: folio\n    title: Folio\n  - id: scratch\n    title: Scratch\n",
        );
    }

    #[test]
    fn merges_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        write(
            dir.path(),
            MANUAL_TILES_FILE,
            "tiles:\n  - id: blog\n    type: link\n    title: Blog\n",
        );
        write(
            dir.path(),
            RESUME_TILES_FILE,
            "tiles:\n  - id: experience-acme\n    type: experience\n    title: Acme\n",
        );

        let site = load_site(dir.path()).unwrap();
        assert_eq!(site.config.title, "Avery");
        assert_eq!(ids(&site), vec!["folio", "scratch", "blog", "experience-acme"]);
        assert_eq!(site.tiles[0].source, TileSource::Github);
        assert_eq!(site.tiles[0].kind, TileKind::Project);
        assert_eq!(site.tiles[3].source, TileSource::Resume);
        assert!(warnings(&site).is_empty());
    }

    #[test]
    fn missing_required_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), SITE_CONFIG_FILE, "title: Avery\n");
        let err = load_site(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
        assert!(err.to_string().contains(GITHUB_PROJECTS_FILE));
    }

    #[test]
    fn broken_optional_source_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        write(dir.path(), RESUME_TILES_FILE, "tiles: [unclosed\n");

        let site = load_site(dir.path()).unwrap();
        assert_eq!(ids(&site), vec!["folio", "scratch"]);
        let warnings = warnings(&site);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(RESUME_TILES_FILE));
    }

    #[test]
    fn unknown_tile_type_is_omitted_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        write(
            dir.path(),
            MANUAL_TILES_FILE,
            "- id: spin\n  type: carousel\n- id: note\n  type: content\n  content: hi\n",
        );

        let site = load_site(dir.path()).unwrap();
        assert_eq!(ids(&site), vec!["folio", "scratch", "note"]);
        assert_eq!(
            warnings(&site),
            vec!["unknown tile type `carousel` on spin; tile omitted"]
        );
    }

    #[test]
    fn curated_list_restricts_github_tiles_only() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        write(
            dir.path(),
            SITE_CONFIG_FILE,
            "curated_repos:\n  - folio\n",
        );
        write(
            dir.path(),
            MANUAL_TILES_FILE,
            "tiles:\n  - id: scratch-notes\n    type: content\n",
        );

        let site = load_site(dir.path()).unwrap();
        assert_eq!(ids(&site), vec!["folio", "scratch-notes"]);
    }

    #[test]
    fn disabled_resume_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path());
        write(
            dir.path(),
            SITE_CONFIG_FILE,
            "resume_source_url: DISABLED\n",
        );
        write(
            dir.path(),
            RESUME_TILES_FILE,
            "tiles:\n  - id: experience-acme\n    title: Acme\n",
        );

        let site = load_site(dir.path()).unwrap();
        assert_eq!(ids(&site), vec!["folio", "scratch"]);
    }

    #[test]
    fn missing_ids_are_derived_from_titles() {
        let mut notices = Vec::new();
        let tiles = parse_tile_document(
            Path::new(MANUAL_TILES_FILE),
            "- title: My Blog!\n  type: link\n- type: link\n",
            TileSource::Manual,
            &mut notices,
        )
        .unwrap();
        let ids: Vec<&str> = tiles.iter().map(|tile| tile.id.as_str()).collect();
        assert_eq!(ids, vec!["my-blog", "manual-2"]);
        assert!(notices.is_empty());
    }

    #[test]
    fn scalar_document_is_a_shape_error() {
        let mut notices = Vec::new();
        let err = parse_tile_document(
            Path::new(MANUAL_TILES_FILE),
            "just text",
            TileSource::Manual,
            &mut notices,
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Shape { .. }));
    }
}
