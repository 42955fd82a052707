//! The note store: canonical note list, filter state and sort preference,
//! kept in sync with a [`KeyValueStore`].
//!
//! Storage failures never reach callers. Reads fall back to defaults and
//! writes are dropped with a warning; in-memory state stays authoritative
//! for the session.

use crate::config::Config;
use crate::model::{Note, NoteId, NotePatch, Snapshot, SortBy, Timestamp};
use crate::storage::{decode_snapshot, encode_snapshot, KeyValueStore};
use crate::view::{self, Filters};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

/// 22 alphanumeric characters carry a little over 130 bits.
const ID_LEN: usize = 22;

pub trait Clock {
    fn now_millis(&self) -> Timestamp;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Timestamp {
        Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Loaded,
    NoteCreated(NoteId),
    NoteUpdated(NoteId),
    NoteDeleted(NoteId),
    FiltersChanged,
    SortChanged(SortBy),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

pub struct NoteStore<S: KeyValueStore> {
    backend: S,
    config: Config,
    clock: Box<dyn Clock>,
    notes: Vec<Note>,
    filters: Filters,
    sort_by: SortBy,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> NoteStore<S> {
    pub fn new(backend: S, config: Config) -> Self {
        Self::with_clock(backend, config, SystemClock)
    }

    pub fn with_clock(backend: S, config: Config, clock: impl Clock + 'static) -> Self {
        NoteStore {
            backend,
            sort_by: config.default_sort,
            config,
            clock: Box::new(clock),
            notes: Vec::new(),
            filters: Filters::default(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Reads the configured key and replaces notes and sort preference.
    /// A missing key, unparseable text or `null` leaves the state as it was.
    pub fn load_from_storage(&mut self) {
        let key = &self.config.storage_key;
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                log::debug!("no stored notes under {key:?}");
                return;
            }
            Err(err) => {
                log::warn!("reading {key:?} failed: {err}");
                return;
            }
        };
        match decode_snapshot(&raw, self.config.default_sort) {
            Ok(snapshot) => {
                log::debug!(
                    "loaded {} notes from {key:?}, sort by {}",
                    snapshot.notes.len(),
                    snapshot.sort_by
                );
                self.notes = snapshot.notes;
                self.sort_by = snapshot.sort_by;
                self.notify(StoreEvent::Loaded);
            }
            Err(err) => log::warn!("ignoring malformed data under {key:?}: {err}"),
        }
    }

    pub fn create_note(&mut self) -> Note {
        let note = Note::new(generate_id(), self.clock.now_millis());
        self.notes.insert(0, note.clone());
        self.persist();
        self.notify(StoreEvent::NoteCreated(note.id.clone()));
        note
    }

    /// Applies `patch` to the note with `id`. Unknown ids are ignored and
    /// nothing is written.
    pub fn update_note(&mut self, id: &str, patch: NotePatch) {
        let now = self.clock.now_millis();
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            log::debug!("update of unknown note {id}");
            return;
        };
        note.apply(patch, now);
        self.persist();
        self.notify(StoreEvent::NoteUpdated(id.to_string()));
    }

    /// Removes the note with `id`. Persists whether or not anything matched.
    pub fn delete_note(&mut self, id: &str) {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.persist();
        if self.notes.len() != before {
            self.notify(StoreEvent::NoteDeleted(id.to_string()));
        }
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.filters.search = text.into();
        self.notify(StoreEvent::FiltersChanged);
    }

    pub fn set_active_tag(&mut self, tag: Option<String>) {
        self.filters.active_tag = tag;
        self.notify(StoreEvent::FiltersChanged);
    }

    pub fn clear_filters(&mut self) {
        self.filters = Filters::default();
        self.notify(StoreEvent::FiltersChanged);
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.sort_by = sort_by;
        self.persist();
        self.notify(StoreEvent::SortChanged(sort_by));
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn search(&self) -> &str {
        &self.filters.search
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.filters.active_tag.as_deref()
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn sort_by(&self) -> SortBy {
        self.sort_by
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn all_tags(&self) -> Vec<String> {
        view::all_tags(&self.notes)
    }

    pub fn filtered_and_sorted_notes(&self) -> Vec<Note> {
        view::filter_and_sort(&self.notes, &self.filters, self.sort_by)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            notes: self.notes.clone(),
            sort_by: self.sort_by,
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn persist(&mut self) {
        let key = &self.config.storage_key;
        let blob = match encode_snapshot(&self.snapshot()) {
            Ok(blob) => blob,
            Err(err) => {
                log::warn!("serializing notes failed, skipping write to {key:?}: {err}");
                return;
            }
        };
        match self.backend.set(key, &blob) {
            Ok(()) => log::debug!("persisted {} notes to {key:?}", self.notes.len()),
            Err(err) => log::warn!("persisting to {key:?} failed, keeping in-memory state: {err}"),
        }
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

fn generate_id() -> NoteId {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}
