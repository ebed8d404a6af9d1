use crate::commands::describe_save;
use crate::commands::show::print_overview;
use crate::config::Workspace;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use vitae_editor::{MoveDirection, MoveOutcome};

#[derive(Debug, Args)]
pub struct ArrangeArgs {
    /// Document id
    pub id: String,

    #[command(subcommand)]
    pub action: ArrangeAction,
}

#[derive(Debug, Subcommand)]
pub enum ArrangeAction {
    /// Move a section one place up
    Up { section: String },

    /// Move a section one place down
    Down { section: String },

    /// Replace the whole order (comma separated keys)
    Order {
        #[arg(value_delimiter = ',', required = true)]
        sections: Vec<String>,
    },
}

pub async fn arrange(args: ArrangeArgs, workspace: &Workspace) -> Result<()> {
    let mut session = workspace.open_session(&args.id).await?;

    let (section, direction) = match args.action {
        ArrangeAction::Up { section } => (section, MoveDirection::Up),
        ArrangeAction::Down { section } => (section, MoveDirection::Down),
        ArrangeAction::Order { sections } => {
            session.reorder_sections(sections);
            return finish(&mut session).await;
        }
    };

    match session.move_section(&section, direction) {
        MoveOutcome::Moved { .. } => finish(&mut session).await,
        MoveOutcome::NotFound => {
            println!("{} No section {} in the order list", "⚠️".yellow(), section.bold());
            Ok(())
        }
        MoveOutcome::OutOfBounds => {
            println!("{} {} is already at the edge", "⚠️".yellow(), section.bold());
            Ok(())
        }
    }
}

async fn finish(session: &mut vitae_editor::EditSession) -> Result<()> {
    let report = session.save_explicit().await?;
    println!("{}", describe_save(&report));
    println!();
    print_overview(session.document(), &session.visible_sections());
    Ok(())
}
