//! Light/dark theme state and the preference store it persists to.
//!
//! The theme is an explicit application-state slice: it is loaded once at
//! startup from an injected [`PreferenceStore`] and written back on toggle.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Persisted identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "evo-theme",
            Theme::Dark => "evo-theme-dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Theme> {
        match raw.trim() {
            "evo-theme" => Some(Theme::Light),
            "evo-theme-dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Key/value persistence port for UI preferences.
pub trait PreferenceStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store, for tests and `--no-persist` style runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// TOML file of string preferences.
///
/// Reads from `~/.config/evo-admin/preferences.toml` by default.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse preferences: {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("evo-admin").join("preferences.toml"))
    }
}

impl PreferenceStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(&self.values).context("Failed to serialize preferences")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))
    }
}

/// Current theme plus the store it is persisted to.
#[derive(Debug)]
pub struct ThemeState<S: PreferenceStore> {
    theme: Theme,
    store: S,
}

impl<S: PreferenceStore> ThemeState<S> {
    /// Initialize from the store; unknown or missing values mean light.
    pub fn load(store: S) -> Self {
        let theme = store
            .read(THEME_KEY)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or_default();
        tracing::debug!(theme = theme.as_str(), "theme loaded");
        Self { theme, store }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip the theme and persist it. The in-memory value changes even if
    /// persisting fails.
    pub fn toggle(&mut self) -> Result<Theme> {
        self.theme = self.theme.toggled();
        self.store.write(THEME_KEY, self.theme.as_str())?;
        Ok(self.theme)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_to_light() {
        let state = ThemeState::load(MemoryStore::default());
        assert_eq!(state.theme(), Theme::Light);
    }

    #[test]
    fn ignores_unknown_value() {
        let mut store = MemoryStore::default();
        store.write("theme", "solarized").unwrap();
        assert_eq!(ThemeState::load(store).theme(), Theme::Light);
    }

    #[test]
    fn toggle_persists() {
        let mut state = ThemeState::load(MemoryStore::default());
        assert_eq!(state.toggle().unwrap(), Theme::Dark);
        assert_eq!(state.store().read("theme").as_deref(), Some("evo-theme-dark"));
        assert_eq!(state.toggle().unwrap(), Theme::Light);
    }

    #[test]
    fn file_store_round_trips_across_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let mut state = ThemeState::load(FileStore::open(&path).unwrap());
        state.toggle().unwrap();

        let reloaded = ThemeState::load(FileStore::open(&path).unwrap());
        assert_eq!(reloaded.theme(), Theme::Dark);
    }
}
