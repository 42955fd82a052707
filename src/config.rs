//! Environment-supplied settings, read once at startup.

use crate::model::SortBy;
use std::path::PathBuf;

pub const DEFAULT_STORAGE_KEY: &str = "notes_app_storage_v1";

pub const STORAGE_KEY_VAR: &str = "NOTEKEEPER_STORAGE_KEY";
pub const DEFAULT_SORT_VAR: &str = "NOTEKEEPER_DEFAULT_SORT";
pub const DATA_DIR_VAR: &str = "NOTEKEEPER_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Key the whole snapshot is stored under.
    pub storage_key: String,

    /// Sort mode used before anything is loaded, and whenever the stored
    /// value is unrecognised.
    pub default_sort: SortBy,

    /// Directory for the file-backed store. Platform data dir when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_sort: SortBy::default(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let storage_key = get(STORAGE_KEY_VAR).unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        let default_sort = match get(DEFAULT_SORT_VAR) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|err| {
                log::warn!("{DEFAULT_SORT_VAR}: {err}; using `{}`", SortBy::default());
                SortBy::default()
            }),
            None => SortBy::default(),
        };
        let data_dir = get(DATA_DIR_VAR).map(PathBuf::from);

        Config {
            storage_key,
            default_sort,
            data_dir,
        }
    }

    /// CLI argument takes precedence over the environment.
    pub fn with_data_dir(mut self, cli_dir: Option<PathBuf>) -> Self {
        if cli_dir.is_some() {
            self.data_dir = cli_dir;
        }
        self
    }
}
