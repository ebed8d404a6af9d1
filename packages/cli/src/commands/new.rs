use crate::commands::describe_save;
use crate::config::Workspace;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use vitae_editor::{SaveReport, Section};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Document title
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Template to render with
    #[arg(long)]
    pub template: Option<String>,

    /// Initial summary text
    #[arg(long)]
    pub summary: Option<String>,
}

pub async fn new(args: NewArgs, workspace: &Workspace) -> Result<()> {
    let mut session = workspace.new_session();

    session.set_title(args.title);
    if let Some(template) = args.template {
        session.set_template(template);
    }
    if let Some(summary) = args.summary {
        session.update_section(Section::Summary(summary));
    }

    let report = session.save_explicit().await?;
    println!("{}", describe_save(&report));

    match report {
        SaveReport::Created { id, .. } => {
            println!("Edit it with: {}", format!("vitae edit {}", id).cyan());
            Ok(())
        }
        SaveReport::Failed { error, .. } => bail!("Could not create document: {}", error),
        _ => Ok(()),
    }
}
