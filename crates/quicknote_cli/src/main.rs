//! Command-line driver for QuickNote core.
//!
//! # Responsibility
//! - Provide a minimal executable to exercise `quicknote_core` end to end.
//! - Keep output line-oriented and deterministic for scripting.
//!
//! Usage: `quicknote <ping|version|list|add|edit|rm|search|export> [args]`.
//! The database path comes from `QUICKNOTE_DB_PATH`; setting
//! `QUICKNOTE_LOG_DIR` (absolute) enables rolling file logs.

use quicknote_core::db::open_db;
use quicknote_core::{CoreConfig, LogLevel, Note, NoteCollectionService, NoteStore, SqliteKvStore};
use std::collections::HashSet;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "QUICKNOTE_LOG_DIR";

const USAGE: &str = "usage: quicknote <command> [args]
  ping
  version
  list
  add <title> [content]
  edit <id> <title> [content]
  rm <id>...
  search <text>
  export <id>...";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = quicknote_core::init_logging(LogLevel::build_default().as_str(), &log_dir)
        {
            eprintln!("logging disabled: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let Some((command, rest)) = args.split_first() else {
        return Err(USAGE.to_string());
    };

    match command.as_str() {
        "ping" => {
            println!("quicknote_core ping={}", quicknote_core::ping());
            Ok(())
        }
        "version" => {
            println!("quicknote_core version={}", quicknote_core::core_version());
            Ok(())
        }
        "list" => with_service(|service| {
            service.list().map(|notes| notes.iter().for_each(print_note))
        }),
        "search" => {
            let text = rest.join(" ");
            with_service(|service| {
                service
                    .query(&text)
                    .map(|notes| notes.iter().for_each(print_note))
            })
        }
        "add" => {
            let (title, content) = match rest {
                [title] => (title.as_str(), ""),
                [title, content] => (title.as_str(), content.as_str()),
                _ => return Err(USAGE.to_string()),
            };
            with_service(|service| service.create(title, content).map(|note| print_note(&note)))
        }
        "edit" => {
            let (id, title, content) = match rest {
                [id, title] => (id.as_str(), title.as_str(), ""),
                [id, title, content] => (id.as_str(), title.as_str(), content.as_str()),
                _ => return Err(USAGE.to_string()),
            };
            with_service(|service| {
                service
                    .update(id, title, content)
                    .map(|note| print_note(&note))
            })
        }
        "rm" if !rest.is_empty() => {
            let ids: HashSet<String> = rest.iter().cloned().collect();
            with_service(|service| {
                service
                    .delete_many(&ids)
                    .map(|removed| println!("removed={removed}"))
            })
        }
        "export" if !rest.is_empty() => {
            let ids: HashSet<String> = rest.iter().cloned().collect();
            with_service(|service| service.export_json(&ids).map(|json| println!("{json}")))
        }
        _ => Err(USAGE.to_string()),
    }
}

fn with_service(
    f: impl FnOnce(
        &mut NoteCollectionService<SqliteKvStore<'_>>,
    ) -> quicknote_core::ServiceResult<()>,
) -> Result<(), String> {
    let config = CoreConfig::from_env();
    let conn = open_db(&config.db_path)
        .map_err(|err| format!("failed to open `{}`: {err}", config.db_path.display()))?;
    let kv = SqliteKvStore::try_new(&conn).map_err(|err| err.to_string())?;
    let mut service =
        NoteCollectionService::new(NoteStore::new(kv)).with_corrupt_policy(config.corrupt_policy);
    f(&mut service).map_err(|err| err.to_string())
}

fn print_note(note: &Note) {
    println!(
        "{}\t{}\t{}\t{}",
        note.id,
        note.display_date(),
        note.title,
        note.content.replace('\n', " ")
    );
}
