use crate::model::{Note, Snapshot, SortBy};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Durable string-keyed storage the note store snapshots into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded: {attempted} bytes requested, limit is {limit}")]
    QuotaExceeded { limit: usize, attempted: usize },
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("storage i/o error: {0}")]
    Io(#[from] io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("malformed snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot is null")]
    Null,
}

pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Parses a stored snapshot leniently. A `notes` field that is not an array
/// becomes empty, an unrecognised `sortBy` becomes `default_sort`, and array
/// entries that do not decode as a note are dropped with a warning. A top
/// level that is a scalar or an array carries neither field, so it decodes
/// to an empty snapshot. Only unparseable text and `null` are errors.
pub fn decode_snapshot(raw: &str, default_sort: SortBy) -> Result<Snapshot, DecodeError> {
    let mut fields = match serde_json::from_str::<Value>(raw)? {
        Value::Object(fields) => fields,
        Value::Null => return Err(DecodeError::Null),
        _ => Default::default(),
    };

    let notes = match fields.remove("notes") {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<Note>(entry) {
                Ok(note) => Some(note),
                Err(err) => {
                    log::warn!("dropping unreadable note at index {index}: {err}");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let sort_by = match fields.get("sortBy").and_then(Value::as_str) {
        Some(raw) => raw.parse().unwrap_or(default_sort),
        None => default_sort,
    };

    Ok(Snapshot { notes, sort_by })
}

/// In-process store. Can simulate a byte quota or a vanished backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        MemoryStore {
            quota: Some(limit),
            ..Self::default()
        }
    }

    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Number of successful `set` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        if let Some(limit) = self.quota {
            let attempted = self.used_without(key) + key.len() + value.len();
            if attempted > limit {
                return Err(StorageError::QuotaExceeded { limit, attempted });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// Store rooted at the platform data directory, e.g.
    /// `~/.local/share/notekeeper` on Linux.
    pub fn in_default_location() -> Result<Self> {
        Ok(FileStore::new(default_data_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || key.contains(['/', '\\'])
            || key.contains("..")
            || key.contains('\0')
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, value)?;
        Ok(())
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "notekeeper").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn note(id: &str, updated_at: i64) -> Note {
        let mut n = Note::new(id.into(), 1);
        n.updated_at = updated_at;
        n
    }

    #[test]
    fn snapshot_uses_documented_wire_shape() {
        let snapshot = Snapshot {
            notes: vec![note("a", 2)],
            sort_by: SortBy::Title,
        };
        let value: Value = serde_json::from_str(&encode_snapshot(&snapshot).unwrap()).unwrap();
        assert_eq!(value["sortBy"], "title");
        assert_eq!(value["notes"][0]["id"], "a");
        assert_eq!(value["notes"][0]["updatedAt"], 2);
        assert_eq!(value["notes"][0]["tags"], Value::Array(vec![]));
    }

    #[test]
    fn decode_restores_encoded_snapshot() {
        let snapshot = Snapshot {
            notes: vec![note("b", 5), note("a", 9)],
            sort_by: SortBy::Title,
        };
        let decoded = decode_snapshot(&encode_snapshot(&snapshot).unwrap(), SortBy::Updated).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn decode_resets_non_array_notes() {
        let decoded = decode_snapshot(r#"{"notes":"nope","sortBy":"title"}"#, SortBy::Updated)
            .unwrap();
        assert!(decoded.notes.is_empty());
        assert_eq!(decoded.sort_by, SortBy::Title);
    }

    #[test]
    fn decode_falls_back_to_default_sort() {
        let decoded = decode_snapshot(r#"{"notes":[],"sortBy":"created"}"#, SortBy::Title).unwrap();
        assert_eq!(decoded.sort_by, SortBy::Title);
        let decoded = decode_snapshot(r#"{"notes":[]}"#, SortBy::Updated).unwrap();
        assert_eq!(decoded.sort_by, SortBy::Updated);
        let decoded = decode_snapshot(r#"{"sortBy":7}"#, SortBy::Title).unwrap();
        assert_eq!(decoded.sort_by, SortBy::Title);
    }

    #[test]
    fn decode_rejects_unparseable_input() {
        assert!(matches!(
            decode_snapshot(r#"{"notes":[{"id":"a""#, SortBy::Updated),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_snapshot("null", SortBy::Updated),
            Err(DecodeError::Null)
        ));
    }

    #[test]
    fn non_object_top_level_decodes_to_defaults() {
        for raw in ["[1,2]", "\"x\"", "42", "true"] {
            let decoded = decode_snapshot(raw, SortBy::Title).unwrap();
            assert_eq!(
                decoded,
                Snapshot {
                    notes: Vec::new(),
                    sort_by: SortBy::Title
                }
            );
        }
    }

    #[test]
    fn unreadable_entries_are_dropped_individually() {
        let raw = r#"{"notes":[
            {"id":"a","title":"keep me","content":"","tags":[],"createdAt":1,"updatedAt":2},
            {"id":"b","createdAt":"yesterday"},
            "not a note"
        ],"sortBy":"title"}"#;
        let decoded = decode_snapshot(raw, SortBy::Updated).unwrap();
        assert_eq!(decoded.notes.len(), 1);
        assert_eq!(decoded.notes[0].title, "keep me");
        assert_eq!(decoded.sort_by, SortBy::Title);
    }

    #[test]
    fn older_entries_without_optional_fields_still_load() {
        let raw = r#"{"notes":[{"id":"b","createdAt":1,"updatedAt":3}]}"#;
        let decoded = decode_snapshot(raw, SortBy::Updated).unwrap();
        let note = &decoded.notes[0];
        assert_eq!(note.id, "b");
        assert_eq!(note.title, "Untitled");
        assert_eq!(note.content, "");
        assert!(note.tags.is_empty());
        assert_eq!(note.updated_at, 3);
    }

    #[test]
    fn memory_store_enforces_quota() {
        let mut store = MemoryStore::with_quota(10);
        store.set("k", "12345").unwrap();
        let err = store.set("k", "123456789012").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 10, .. }));
        assert_eq!(store.raw("k"), Some("12345"));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn memory_store_can_be_unavailable() {
        let mut store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.get("k"), Err(StorageError::Unavailable)));
        assert!(matches!(store.set("k", "v"), Err(StorageError::Unavailable)));
    }

    #[test]
    fn file_store_round_trips_and_creates_dir() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path().join("nested"));
        assert_eq!(store.get("notes").unwrap(), None);
        store.set("notes", "{\"notes\":[]}").unwrap();
        assert_eq!(store.get("notes").unwrap().as_deref(), Some("{\"notes\":[]}"));
        assert!(temp.path().join("nested/notes.json").exists());
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let store = FileStore::new("/tmp/unused");
        for key in ["", "../escape", "a/b", "a\\b"] {
            assert!(matches!(store.path_for(key), Err(StorageError::InvalidKey(_))));
        }
    }
}
