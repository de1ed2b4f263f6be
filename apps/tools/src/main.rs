use anyhow::{bail, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use shared::domain::{Entry, EntryForm};
use storage::{journal, DataStore, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/journal.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateDb,
    AddEntry {
        #[arg(long)]
        title: String,
        /// Defaults to today.
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        content: String,
    },
    ListEntries,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateDb => {
            println!("database ready at {}", cli.database_url);
        }
        Command::AddEntry {
            title,
            date,
            content,
        } => {
            let entry = Entry::from_form(&EntryForm {
                title,
                date: date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
                content,
            });
            if entry.slug.is_empty() {
                bail!("title must contain at least one letter or digit");
            }
            let Some(entry_id) = journal::insert_entry(&storage, &entry).await? else {
                bail!("an entry with slug '{}' already exists", entry.slug);
            };
            println!("created entry_id={} slug={}", entry_id.0, entry.slug);
        }
        Command::ListEntries => {
            for entry in journal::list_entries(&storage).await? {
                println!("{}\t{}\t{}\t{}", entry.id.0, entry.date, entry.slug, entry.title);
            }
        }
    }

    storage.close().await;
    Ok(())
}
