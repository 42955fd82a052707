//! notekeeper - a local note store with filtered, sorted views

pub mod config;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;

pub use config::Config;
pub use model::{Note, NoteId, NotePatch, Snapshot, SortBy};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{Clock, NoteStore, StoreEvent, SubscriptionId, SystemClock};
pub use view::Filters;
