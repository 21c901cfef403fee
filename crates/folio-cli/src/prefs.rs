use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use folio_core::theme::ThemeStore;

pub const PREFERENCES_FILE: &str = "folio.toml";
pub const THEME_FILE: &str = "theme.json";

/// Per-user defaults read from `~/.config/folio/folio.toml`. Command line
/// flags always win over these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub data_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub prefers_dark: Option<bool>,
}

impl Preferences {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// A missing file is the same as an empty one.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|err| {
            std::io::Error::other(format!("parse {}: {err}", path.display()))
        })
    }

    pub fn load_default() -> std::io::Result<Self> {
        match config_home() {
            Some(home) => Self::load(&home.join(PREFERENCES_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("_data"))
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir.clone().unwrap_or_else(|| PathBuf::from("_site"))
    }

    /// The color scheme preference that `auto` resolves against.
    pub fn prefers_dark(&self) -> bool {
        self.prefers_dark.unwrap_or_else(|| {
            std::env::var("COLORFGBG")
                .ok()
                .and_then(|value| colorfgbg_prefers_dark(&value))
                .unwrap_or(true)
        })
    }
}

pub fn config_home() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio"))
}

pub fn open_theme_store() -> std::io::Result<ThemeStore> {
    let home = config_home()
        .ok_or_else(|| std::io::Error::other("no configuration directory for this user"))?;
    ThemeStore::open(home.join(THEME_FILE))
}

/// Terminals export `COLORFGBG` as `fg;bg` (sometimes `fg;default;bg`). The
/// low ANSI colors other than 7 are dark backgrounds.
pub fn colorfgbg_prefers_dark(value: &str) -> Option<bool> {
    let background = value.rsplit(';').next()?.trim().parse::<u8>().ok()?;
    Some(matches!(background, 0..=6 | 8))
}
