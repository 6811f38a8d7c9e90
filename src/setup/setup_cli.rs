use clap::{Parser, Subcommand};
use rusqlite::Connection;
use society_backend::config::Config;
use society_backend::helper::upload_helpers::relative_path_for_url;
use society_backend::models::db_operations::records_db_operations;
use society_backend::setup::db_setup;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "Setup and maintenance tasks for the society backend.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Media {
        #[command(subcommand)]
        action: MediaAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// Creates the database and every table. Safe to re-run.
    Setup,
}

#[derive(Subcommand, Debug)]
enum MediaAction {
    /// Lists stored files that no record references.
    Orphans {
        /// Delete the files instead of only listing them.
        #[arg(long)]
        delete: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup => setup_society_database(&config),
        },
        Commands::Media { action } => match action {
            MediaAction::Orphans { delete } => sweep_orphans(&config, *delete),
        },
    }
}

fn setup_society_database(config: &Config) {
    let db_path = config.society_db_path();
    println!("\nSetting up society database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let mut conn = Connection::open(&db_path).expect("Could not open society database file.");
    match db_setup::setup_society_db(&mut conn) {
        Ok(_) => println!("✅ Society database ready ({} tables).", db_setup::table_names().count()),
        Err(e) => eprintln!("❌ Error setting up society database: {}", e),
    }
}

/// Stored files below `root` whose relative path is not in `referenced`.
fn find_orphans(root: &Path, referenced: &HashSet<PathBuf>) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable media entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?.to_path_buf();
            if referenced.contains(&relative) {
                None
            } else {
                Some(relative)
            }
        })
        .collect()
}

fn sweep_orphans(config: &Config, delete: bool) {
    let db_path = config.society_db_path();
    if !db_path.exists() {
        eprintln!("❌ Error: Society database not found at '{}'. Please run `setup_cli db setup` first.", db_path.display());
        return;
    }
    let conn = Connection::open(&db_path).expect("Could not open society database.");

    let urls = match records_db_operations::referenced_object_urls(&conn) {
        Ok(urls) => urls,
        Err(e) => {
            eprintln!("❌ Error reading stored object references: {}", e);
            return;
        }
    };
    let referenced: HashSet<PathBuf> = urls
        .iter()
        .filter_map(|url| relative_path_for_url(&config.public_base_url, url))
        .collect();

    let media_root = config.media_root();
    let orphans = find_orphans(&media_root, &referenced);
    if orphans.is_empty() {
        println!("✅ No orphaned files under '{}'.", media_root.display());
        return;
    }

    println!("Found {} orphaned file(s):", orphans.len());
    for relative in &orphans {
        if delete {
            match fs::remove_file(media_root.join(relative)) {
                Ok(_) => println!("- deleted {}", relative.display()),
                Err(e) => eprintln!("- ❌ could not delete {}: {}", relative.display(), e),
            }
        } else {
            println!("- {}", relative.display());
        }
    }
    if !delete {
        println!("Re-run with --delete to remove them.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_files_are_not_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = dir.path().join("gallery");
        fs::create_dir_all(&gallery).unwrap();
        fs::write(gallery.join("1-aa.png"), b"kept").unwrap();
        fs::write(gallery.join("2-bb.png"), b"stray").unwrap();

        let referenced: HashSet<PathBuf> = [PathBuf::from("gallery/1-aa.png")].into_iter().collect();
        let orphans = find_orphans(dir.path(), &referenced);
        assert_eq!(orphans, vec![PathBuf::from("gallery/2-bb.png")]);
    }
}
