use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};
use notekeeper::storage::default_data_dir;
use notekeeper::{Config, FileStore, Note, NotePatch, NoteStore, SortBy};
use std::path::PathBuf;

pub fn new(
    data_dir: Option<PathBuf>,
    title: Option<String>,
    content: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let mut store = open_store(data_dir)?;
    // Fields given on the command line land as a second write, so
    // `updatedAt` can sit a millisecond past `createdAt`.
    let note = store.create_note();
    let patch = NotePatch {
        title,
        content,
        tags: (!tags.is_empty()).then_some(tags),
    };
    if !patch.is_empty() {
        store.update_note(&note.id, patch);
    }
    println!("Created note {}", note.id);
    Ok(())
}

pub fn list(
    data_dir: Option<PathBuf>,
    search: Option<String>,
    tag: Option<String>,
    sort: Option<SortBy>,
) -> Result<()> {
    let mut store = open_store(data_dir)?;
    if let Some(mode) = sort {
        store.set_sort_by(mode);
    }
    if let Some(query) = search {
        store.set_search(query);
    }
    store.set_active_tag(tag);

    let notes = store.filtered_and_sorted_notes();
    println!("Notes ({} of {}, sorted by {})", notes.len(), store.notes().len(), store.sort_by());
    if notes.is_empty() {
        println!("  (none)");
    }
    for note in &notes {
        print_note(note);
    }
    Ok(())
}

pub fn show(data_dir: Option<PathBuf>, note_id: String) -> Result<()> {
    let store = open_store(data_dir)?;
    let Some(note) = store.get(&note_id) else {
        bail!("note {} not found", note_id);
    };
    print_note(note);
    println!("    created: {}", format_timestamp(note.created_at));
    Ok(())
}

pub fn edit(
    data_dir: Option<PathBuf>,
    note_id: String,
    title: Option<String>,
    content: Option<String>,
    tags: Vec<String>,
    clear_tags: bool,
) -> Result<()> {
    let mut store = open_store(data_dir)?;
    if store.get(&note_id).is_none() {
        bail!("note {} not found", note_id);
    }
    let tags = if clear_tags {
        Some(Vec::new())
    } else {
        (!tags.is_empty()).then_some(tags)
    };
    store.update_note(
        &note_id,
        NotePatch {
            title,
            content,
            tags,
        },
    );
    println!("Updated note {}", note_id);
    Ok(())
}

pub fn delete(data_dir: Option<PathBuf>, note_id: String) -> Result<()> {
    let mut store = open_store(data_dir)?;
    if store.get(&note_id).is_none() {
        bail!("note {} not found", note_id);
    }
    store.delete_note(&note_id);
    println!("Deleted note {}", note_id);
    Ok(())
}

pub fn tags(data_dir: Option<PathBuf>) -> Result<()> {
    let store = open_store(data_dir)?;
    let tags = store.all_tags();
    if tags.is_empty() {
        println!("(no tags)");
    }
    for tag in tags {
        println!("{}", tag);
    }
    Ok(())
}

pub fn sort(data_dir: Option<PathBuf>, mode: SortBy) -> Result<()> {
    let mut store = open_store(data_dir)?;
    store.set_sort_by(mode);
    println!("Sorting by {}", mode);
    Ok(())
}

fn open_store(cli_dir: Option<PathBuf>) -> Result<NoteStore<FileStore>> {
    let config = Config::from_env().with_data_dir(cli_dir);
    let dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };
    log::debug!("using data directory {}", dir.display());
    let mut store = NoteStore::new(FileStore::new(dir), config);
    store.load_from_storage();
    Ok(store)
}

fn format_timestamp(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y.%m.%d@%H:%M").to_string(),
        None => millis.to_string(),
    }
}

fn print_note(note: &Note) {
    println!("  - {}: {}", note.id, note.title);
    for line in note.content.lines() {
        println!("    {}", line);
    }
    if !note.tags.is_empty() {
        println!("    tags: {}", note.tags.join(", "));
    }
    println!("    updated: {}", format_timestamp(note.updated_at));
}
