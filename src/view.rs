//! Derived views over the note collection. Everything here is a pure
//! function of the current state; nothing is cached.

use crate::model::{Note, SortBy};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub search: String,
    pub active_tag: Option<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.active_tag.as_deref().map_or(true, str::is_empty)
    }

    /// Tag equality is case-insensitive; an empty active tag is ignored.
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(tag) = self.active_tag.as_deref().filter(|t| !t.is_empty()) {
            let tag = tag.to_lowercase();
            if !note.tags.iter().any(|t| t.to_lowercase() == tag) {
                return false;
            }
        }

        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        note.title.to_lowercase().contains(&query)
            || note.content.to_lowercase().contains(&query)
            || note.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

/// Distinct tags as stored (case preserved), in display order.
pub fn all_tags(notes: &[Note]) -> Vec<String> {
    let distinct: BTreeSet<&str> = notes
        .iter()
        .flat_map(|n| n.tags.iter().map(String::as_str))
        .collect();
    let mut tags: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    tags.sort_by(|a, b| display_cmp(a, b));
    tags
}

pub fn filter_and_sort(notes: &[Note], filters: &Filters, sort_by: SortBy) -> Vec<Note> {
    let mut result: Vec<Note> = notes
        .iter()
        .filter(|n| filters.matches(n))
        .cloned()
        .collect();
    // Stable: ties keep collection order, which is newest-created first.
    match sort_by {
        SortBy::Title => result.sort_by(|a, b| display_cmp(&a.title, &b.title)),
        SortBy::Updated => result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }
    result
}

/// Human ordering for display strings: case folded first, so "apple" sorts
/// next to "Apple" rather than after "Zebra". Raw order breaks the tie.
pub fn display_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
