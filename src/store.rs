use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::history::History;
use crate::settings::Settings;

const HOME_ENV: &str = "CALCVAULT_HOME";
const SETTINGS_FILE: &str = "settings.json";
const HISTORY_FILE: &str = "history.json";

/// JSON files for settings and history inside one data directory.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Store { dir: dir.into() }
    }

    /// `$CALCVAULT_HOME`, else `$HOME/.calcvault`, else the working directory.
    pub fn from_env() -> Self {
        let dir = std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".calcvault")))
            .unwrap_or_else(|| PathBuf::from("."));
        Store::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_settings(&self) -> Result<Settings> {
        self.load(SETTINGS_FILE)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.save(SETTINGS_FILE, settings)
    }

    pub fn load_history(&self) -> Result<History> {
        let history: History = self.load(HISTORY_FILE)?;
        // re-apply the cap in case the file was edited by hand
        Ok(History::from_entries(history.iter().map(str::to_string)))
    }

    pub fn save_history(&self, history: &History) -> Result<()> {
        self.save(HISTORY_FILE, history)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{} not found, using defaults", path.display());
                return Ok(T::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        serde_json::from_str(&text).with_context(|| format!("Malformed {}", path.display()))
    }

    fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.dir.join(name);
        let text = serde_json::to_string_pretty(value)?;
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("saved {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("calcvault-{}-{}-{}", tag, std::process::id(), nanos))
    }

    #[test]
    fn missing_files_load_defaults() {
        let store = Store::new(scratch_dir("missing"));
        assert_eq!(store.load_settings().unwrap(), Settings::default());
        assert!(store.load_history().unwrap().is_empty());
    }

    #[test]
    fn settings_and_history_survive_a_reload() {
        let dir = scratch_dir("reload");
        let store = Store::new(&dir);

        let mut settings = Settings::default();
        settings.change_secret("1234", "777").unwrap();
        store.save_settings(&settings).unwrap();

        let mut history = History::new();
        history.push("1+1 = 2".to_string());
        history.push("2*3 = 6".to_string());
        store.save_history(&history).unwrap();

        let reopened = Store::new(&dir);
        assert_eq!(reopened.load_settings().unwrap().secret, "777");
        let loaded = reopened.load_history().unwrap();
        assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["2*3 = 6", "1+1 = 2"]);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = scratch_dir("malformed");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SETTINGS_FILE), "{not json").unwrap();

        let err = Store::new(&dir).load_settings().unwrap_err();
        assert!(err.to_string().contains("Malformed"));

        fs::remove_dir_all(dir).unwrap();
    }
}
