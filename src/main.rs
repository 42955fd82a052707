mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = cli::Cli::parse();
    let data_dir = args.data_dir;
    let command = args.command.unwrap_or(cli::Command::List {
        search: None,
        tag: None,
        sort: None,
    });
    match command {
        cli::Command::New {
            title,
            content,
            tags,
        } => commands::new(data_dir, title, content, tags),
        cli::Command::List { search, tag, sort } => commands::list(data_dir, search, tag, sort),
        cli::Command::Show { note_id } => commands::show(data_dir, note_id),
        cli::Command::Edit {
            note_id,
            title,
            content,
            tags,
            clear_tags,
        } => commands::edit(data_dir, note_id, title, content, tags, clear_tags),
        cli::Command::Delete { note_id } => commands::delete(data_dir, note_id),
        cli::Command::Tags => commands::tags(data_dir),
        cli::Command::Sort { mode } => commands::sort(data_dir, mode),
    }
}
