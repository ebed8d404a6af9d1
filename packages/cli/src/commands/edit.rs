use crate::commands::describe_save;
use crate::commands::show::print_overview;
use crate::config::Workspace;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use vitae_editor::{
    EditorError, Focus, KeyChord, MoveDirection, MoveOutcome, PatchTarget, Platform, SaveReport,
    SaveSkipped, Section, SessionHandle, SuggestionPatch,
};

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Document id
    pub id: String,
}

/// One line of input in the editing loop
#[derive(Debug, Clone, PartialEq)]
enum EditCommand {
    Title(String),
    Template(String),
    Locale(String),
    Rename(String, String),
    Summary(String),
    Interests(Vec<String>),
    Move(String, MoveDirection),
    Order(Vec<String>),
    Suggest(String, serde_json::Value),
    Key(KeyChord),
    Undo,
    Redo,
    Save,
    Show,
    Help,
    Quit,
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse chords like `ctrl+z`, `cmd+shift+z` or `ctrl+y`
fn parse_chord(text: &str) -> Result<KeyChord, String> {
    let mut chord = KeyChord::default();

    for part in text.split('+').map(str::trim) {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => chord.ctrl = true,
            "cmd" | "meta" | "super" => chord.meta = true,
            "shift" => chord.shift = true,
            "alt" | "option" => chord.alt = true,
            key if key.chars().count() == 1 => chord.key = key.to_string(),
            other => return Err(format!("Unknown key: {}", other)),
        }
    }

    if chord.key.is_empty() {
        return Err(format!("No key in chord: {}", text));
    }
    Ok(chord)
}

fn parse_line(line: &str) -> Result<Option<EditCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let needs_arg = |name: &str| {
        if rest.is_empty() {
            Err(format!("`{}` needs an argument", name))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word {
        "title" => EditCommand::Title(rest.to_string()),
        "template" => EditCommand::Template(needs_arg("template")?),
        "locale" => EditCommand::Locale(needs_arg("locale")?),
        "rename" => {
            let (section, name) = needs_arg("rename")?
                .split_once(' ')
                .map(|(section, name)| (section.to_string(), name.trim().to_string()))
                .unwrap_or_else(|| (rest.to_string(), String::new()));
            EditCommand::Rename(section, name)
        }
        "summary" => EditCommand::Summary(rest.to_string()),
        "interests" => EditCommand::Interests(split_list(rest)),
        "up" => EditCommand::Move(needs_arg("up")?, MoveDirection::Up),
        "down" => EditCommand::Move(needs_arg("down")?, MoveDirection::Down),
        "order" => EditCommand::Order(split_list(&needs_arg("order")?)),
        "suggest" => {
            let (section, value) = rest
                .split_once(' ')
                .ok_or_else(|| "usage: suggest <section> <json>".to_string())?;
            let value = serde_json::from_str(value.trim()).map_err(|e| e.to_string())?;
            EditCommand::Suggest(section.to_string(), value)
        }
        "key" => EditCommand::Key(parse_chord(&needs_arg("key")?)?),
        "undo" => EditCommand::Undo,
        "redo" => EditCommand::Redo,
        "save" => EditCommand::Save,
        "show" => EditCommand::Show,
        "help" | "?" => EditCommand::Help,
        "quit" | "exit" | "q" => EditCommand::Quit,
        other => return Err(format!("Unknown command `{}` (try `help`)", other)),
    };

    Ok(Some(command))
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  title <text>            set the document title");
    println!("  template <name>         switch template");
    println!("  locale <tag>            set the locale, e.g. de-CH");
    println!("  rename <section> [name] rename a section, no name resets it");
    println!("  summary <text>          replace the summary");
    println!("  interests a, b, c       replace the interests list");
    println!("  up|down <section>       move a section");
    println!("  order a,b,c             replace the section order");
    println!("  suggest <section> <json>  replace a section with a suggestion");
    println!("  key <chord>             press a chord, e.g. ctrl+z");
    println!("  undo | redo             step the section order history");
    println!("  save | show | quit");
}

fn platform() -> Platform {
    if cfg!(target_os = "macos") {
        Platform::Mac
    } else {
        Platform::Other
    }
}

async fn apply(handle: &SessionHandle, command: EditCommand) -> Result<()> {
    match command {
        EditCommand::Title(title) => handle.set_title(title).await?,
        EditCommand::Template(template) => handle.set_template(template).await?,
        EditCommand::Locale(locale) => handle.set_locale(locale).await?,
        EditCommand::Rename(section, name) => handle.rename_section(section, name).await?,
        EditCommand::Summary(text) => handle.update_section(Section::Summary(text)).await?,
        EditCommand::Interests(items) => {
            handle.update_section(Section::Interests(items)).await?
        }
        EditCommand::Move(section, direction) => {
            match handle.move_section(section.clone(), direction).await? {
                MoveOutcome::Moved { .. } => {}
                MoveOutcome::NotFound => println!("{} No section {}", "⚠️".yellow(), section),
                MoveOutcome::OutOfBounds => {
                    println!("{} {} is already at the edge", "⚠️".yellow(), section)
                }
            }
        }
        EditCommand::Order(order) => handle.reorder_sections(order).await?,
        EditCommand::Suggest(section, value) => {
            let patch = SuggestionPatch::new(section, PatchTarget::Whole, value);
            if let Err(e) = handle.apply_suggestion(patch).await {
                println!("{} {}", "⚠️".yellow(), e);
            }
        }
        EditCommand::Key(chord) => {
            match handle.key_down(&chord, platform(), Focus::Other).await? {
                Some(command) => println!("{:?}", command),
                None => println!("{}", "(no shortcut)".dimmed()),
            }
        }
        EditCommand::Undo => {
            if !handle.undo().await? {
                println!("{}", "Nothing to undo".dimmed());
            }
        }
        EditCommand::Redo => {
            if !handle.redo().await? {
                println!("{}", "Nothing to redo".dimmed());
            }
        }
        EditCommand::Save => {
            // The report is printed by the subscriber.
            if let Err(e) = handle.save_explicit().await {
                println!("{} {}", "⚠️".yellow(), e);
            }
        }
        EditCommand::Show => {
            let view = handle.view().await?;
            print_overview(&view.document, &view.visible_sections);
            let state = if view.saving {
                "saving".yellow()
            } else if view.dirty {
                "unsaved changes".yellow()
            } else {
                "saved".green()
            };
            println!();
            println!("   {}", state);
        }
        EditCommand::Help => print_help(),
        EditCommand::Quit => {}
    }

    Ok(())
}

/// Save pending edits before the session is closed
///
/// An autosave may still be writing an older snapshot. Wait for every write
/// to be reconciled and save again while the document is dirty.
async fn flush(handle: &SessionHandle) -> Result<Option<SaveReport>, EditorError> {
    let mut reports = handle.subscribe();

    loop {
        let view = handle.view().await?;
        if !view.saving && !view.dirty {
            return Ok(None);
        }

        if !view.saving {
            match handle.save_explicit().await {
                Ok(report) => return Ok(Some(report)),
                Err(EditorError::Skipped(SaveSkipped::InFlight)) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::debug!("Waiting for in-flight save before exit");
        match reports.recv().await {
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => return Err(EditorError::SessionClosed),
        }
    }
}

pub async fn edit(args: EditArgs, workspace: &Workspace) -> Result<()> {
    let session = workspace.open_session(&args.id).await?;
    let handle = SessionHandle::spawn(session);

    let mut reports = handle.subscribe();
    let reporter = tokio::spawn(async move {
        loop {
            match reports.recv().await {
                Ok(report) => println!("{}", describe_save(&report)),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{} {}", "✏️".bright_blue(), "Editing with autosave".bold());
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(Some(EditCommand::Quit)) => break,
            Ok(Some(command)) => apply(&handle, command).await?,
            Ok(None) => {}
            Err(message) => println!("{} {}", "⚠️".yellow(), message),
        }
    }

    if let Some(report) = flush(&handle).await? {
        println!("{}", describe_save(&report));
    }
    handle.close().await?;
    reporter.abort();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use vitae_editor::{Document, EditSession, MemoryStore, SessionConfig};

    #[tokio::test(start_paused = true)]
    async fn test_flush_waits_for_in_flight_autosave() {
        let store = MemoryStore::new().with_latency(Duration::from_secs(3));
        let id = store.insert(Document::new());
        let mut session = EditSession::new(Arc::new(store.clone()), SessionConfig::default());
        session.load_document(store.get(&id).unwrap());
        let handle = SessionHandle::spawn(session);

        handle
            .update_section(Section::Summary("v1".to_string()))
            .await
            .unwrap();
        // Debounced write of v1 is now pending in the store.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(handle.view().await.unwrap().saving);
        handle
            .update_section(Section::Summary("v2".to_string()))
            .await
            .unwrap();

        let report = flush(&handle).await.unwrap();
        assert!(report.is_some_and(|report| report.is_success()));
        assert_eq!(store.get(&id).unwrap().summary, "v2");
        assert!(!handle.view().await.unwrap().dirty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_clean_session_is_noop() {
        let store = MemoryStore::new();
        let id = store.insert(Document::new());
        let mut session = EditSession::new(Arc::new(store.clone()), SessionConfig::default());
        session.load_document(store.get(&id).unwrap());
        let handle = SessionHandle::spawn(session);

        assert_eq!(flush(&handle).await.unwrap(), None);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_line("up skills"),
            Ok(Some(EditCommand::Move("skills".to_string(), MoveDirection::Up)))
        );
        assert_eq!(
            parse_line("order summary, skills ,experience"),
            Ok(Some(EditCommand::Order(vec![
                "summary".to_string(),
                "skills".to_string(),
                "experience".to_string()
            ])))
        );
        assert_eq!(
            parse_line("suggest summary \"Sharper\""),
            Ok(Some(EditCommand::Suggest(
                "summary".to_string(),
                json!("Sharper")
            )))
        );
        assert_eq!(
            parse_line("rename experience Work History"),
            Ok(Some(EditCommand::Rename(
                "experience".to_string(),
                "Work History".to_string()
            )))
        );
        assert_eq!(
            parse_line("rename experience"),
            Ok(Some(EditCommand::Rename(
                "experience".to_string(),
                String::new()
            )))
        );
        assert_eq!(
            parse_line("locale de-CH"),
            Ok(Some(EditCommand::Locale("de-CH".to_string())))
        );
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("q"), Ok(Some(EditCommand::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("down").is_err());
        assert!(parse_line("rename").is_err());
        assert!(parse_line("dance").is_err());
        assert!(parse_line("suggest summary {not json").is_err());
    }

    #[test]
    fn test_parse_chord() {
        let chord = parse_chord("cmd+shift+z").unwrap();
        assert!(chord.meta && chord.shift && !chord.ctrl);
        assert_eq!(chord.key, "z");

        assert!(parse_chord("ctrl+shift").is_err());
        assert!(parse_chord("ctrl+banana").is_err());
    }
}
