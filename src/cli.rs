use clap::{Parser, Subcommand};
use notekeeper::SortBy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notekeeper", version, about = "Local notes with tags, search and sorting")]
pub struct Cli {
    /// Directory holding the notes file (overrides NOTEKEEPER_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new note
    New {
        /// Title of the note (defaults to "Untitled")
        #[arg(long)]
        title: Option<String>,
        /// Note content
        #[arg(long)]
        content: Option<String>,
        /// Tags for the note (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
    },
    /// List notes, filtered and sorted
    List {
        /// Case-insensitive text matched against title, content and tags
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Only notes carrying this tag (case-insensitive)
        #[arg(long, short = 't')]
        tag: Option<String>,
        /// Change the saved sort order before listing (updated|title)
        #[arg(long)]
        sort: Option<SortBy>,
    },
    /// Print a single note
    Show {
        /// Note id
        note_id: String,
    },
    /// Edit an existing note
    Edit {
        /// Note id to edit
        note_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New content
        #[arg(long)]
        content: Option<String>,
        /// Replace tags (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Delete a note
    Delete {
        /// Note id to delete
        note_id: String,
    },
    /// List every tag in use
    Tags,
    /// Set the saved sort order (updated|title)
    Sort {
        mode: SortBy,
    },
}
