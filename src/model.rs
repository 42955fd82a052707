use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type NoteId = String;

/// Epoch milliseconds.
pub type Timestamp = i64;

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn untitled() -> String {
    UNTITLED.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Updated,
    Title,
}

/// Partial update payload. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// The persisted unit: every note plus the sort preference.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub notes: Vec<Note>,
    pub sort_by: SortBy,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown sort mode: {0} (expected `updated` or `title`)")]
pub struct ParseSortByError(String);

impl Note {
    pub fn new(id: NoteId, now: Timestamp) -> Self {
        Note {
            id,
            title: untitled(),
            content: String::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the fields present in `patch` and stamps `updated_at`,
    /// even when the patch is empty.
    pub fn apply(&mut self, patch: NotePatch, now: Timestamp) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        self.updated_at = now;
    }
}

impl NotePatch {
    pub fn title(title: impl Into<String>) -> Self {
        NotePatch {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        NotePatch {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn tags<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        NotePatch {
            tags: Some(tags.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Updated => "updated",
            SortBy::Title => "title",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = ParseSortByError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "updated" => Ok(SortBy::Updated),
            "title" => Ok(SortBy::Title),
            other => Err(ParseSortByError(other.to_string())),
        }
    }
}
