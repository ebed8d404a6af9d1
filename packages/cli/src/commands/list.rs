use crate::config::Workspace;
use anyhow::Result;
use colored::Colorize;

pub async fn list(workspace: &Workspace) -> Result<()> {
    let documents = workspace.store.list().await?;

    if documents.is_empty() {
        println!(
            "{} No documents in {}",
            "⚠️".yellow(),
            workspace.store_dir().display()
        );
        return Ok(());
    }

    for doc in documents {
        let updated = doc
            .updated_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        let title = if doc.title.is_empty() {
            "(untitled)".dimmed().to_string()
        } else {
            doc.title
        };

        println!("{}  {}  {}", doc.id.to_string().cyan(), updated.dimmed(), title);
    }

    Ok(())
}
