use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ThemeMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "auto" | "system" => Some(Self::Auto),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Auto,
            Self::Auto => Self::Light,
        }
    }

    pub fn resolve(self, prefers_dark: bool) -> ResolvedTheme {
        match self {
            Self::Light => ResolvedTheme::Light,
            Self::Dark => ResolvedTheme::Dark,
            Self::Auto if prefers_dark => ResolvedTheme::Dark,
            Self::Auto => ResolvedTheme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl ResolvedTheme {
    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTheme {
    pub theme: ThemeMode,
    pub ts_ms: i64,
}

/// File-backed stand-in for the browser's local storage slot.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable state falls back to `default`.
    pub fn load_or(&self, default: ThemeMode) -> ThemeMode {
        self.load().ok().flatten().unwrap_or(default)
    }

    pub fn load(&self) -> std::io::Result<Option<ThemeMode>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)?;
        let persisted = serde_json::from_slice::<PersistedTheme>(&bytes)
            .map_err(|err| std::io::Error::other(format!("parse theme: {err}")))?;
        Ok(Some(persisted.theme))
    }

    pub fn save(&self, theme: ThemeMode) -> std::io::Result<()> {
        let persisted = PersistedTheme {
            theme,
            ts_ms: chrono::Utc::now().timestamp_millis(),
        };
        let encoded = serde_json::to_vec(&persisted)
            .map_err(|err| std::io::Error::other(format!("serialize theme: {err}")))?;
        std::fs::write(&self.path, encoded)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cycle_visits_every_mode() {
        let start = ThemeMode::Light;
        let cycle = [start, start.next(), start.next().next(), start.next().next().next()];
        assert_eq!(
            cycle,
            [
                ThemeMode::Light,
                ThemeMode::Dark,
                ThemeMode::Auto,
                ThemeMode::Light
            ]
        );
    }

    #[test]
    fn auto_follows_system_preference() {
        assert_eq!(ThemeMode::Auto.resolve(true), ResolvedTheme::Dark);
        assert_eq!(ThemeMode::Auto.resolve(false), ResolvedTheme::Light);
        assert_eq!(ThemeMode::Light.resolve(true), ResolvedTheme::Light);
    }

    #[test]
    fn store_round_trips_choice() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThemeStore::open(dir.path().join("nested/theme.json")).unwrap();
        assert_eq!(store.load_or(ThemeMode::Light), ThemeMode::Light);
        store.save(ThemeMode::Dark).unwrap();
        assert_eq!(store.load_or(ThemeMode::Light), ThemeMode::Dark);
    }

    #[test]
    fn corrupt_store_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = ThemeStore::open(&path).unwrap();
        assert!(store.load().is_err());
        assert_eq!(store.load_or(ThemeMode::Auto), ThemeMode::Auto);
    }
}
