use crate::config::Workspace;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use vitae_editor::{Document, Fingerprint, SectionId};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Document id
    pub id: String,

    /// Print the stored record as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn show(args: ShowArgs, workspace: &Workspace) -> Result<()> {
    let session = workspace.open_session(&args.id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(session.document())?);
        return Ok(());
    }

    print_overview(session.document(), &session.visible_sections());
    Ok(())
}

pub(crate) fn print_overview(doc: &Document, visible: &[SectionId]) {
    let id = doc
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "(unsaved)".to_string());
    println!("{} {}", "📄".bright_blue(), doc.title.bold());
    println!("   id:          {}", id.cyan());
    println!("   template:    {}", doc.template);
    println!("   fingerprint: {}", short(&Fingerprint::compute(doc)).dimmed());
    println!();

    for key in &doc.section_order {
        let shown = doc
            .resolve_section(key)
            .filter(|section| visible.contains(section));

        match shown {
            Some(section) => println!("   {} {}", "●".green(), doc.display_name(&section)),
            None => println!("   {} {}", "○".dimmed(), key.dimmed()),
        }
    }
}

fn short(fingerprint: &Fingerprint) -> String {
    let text = fingerprint.as_str();
    if text.chars().count() > 48 {
        format!("{}…", text.chars().take(48).collect::<String>())
    } else {
        text.to_string()
    }
}
