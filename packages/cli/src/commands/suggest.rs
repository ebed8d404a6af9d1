use crate::commands::describe_save;
use crate::config::Workspace;
use anyhow::Result;
use clap::Args;
use vitae_editor::{PatchTarget, SuggestionPatch};

#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Document id
    pub id: String,

    /// Section name (e.g. summary, experience, personalInfo, or a custom key)
    pub section: String,

    /// JSON value to apply (plain text is taken as a string)
    pub value: String,

    /// Replace (or append past the end) the entry at this index
    #[arg(long, conflicts_with_all = ["field", "append"])]
    pub index: Option<usize>,

    /// Set one field of an object section
    #[arg(long, conflicts_with = "append")]
    pub field: Option<String>,

    /// Append a new entry
    #[arg(long)]
    pub append: bool,
}

impl SuggestArgs {
    fn target(&self) -> PatchTarget {
        match (&self.index, &self.field) {
            (Some(index), _) => PatchTarget::Index(*index),
            (_, Some(field)) => PatchTarget::Field(field.clone()),
            _ if self.append => PatchTarget::Append,
            _ => PatchTarget::Whole,
        }
    }
}

pub async fn suggest(args: SuggestArgs, workspace: &Workspace) -> Result<()> {
    // Plain text that is not JSON is taken as a string value.
    let value = serde_json::from_str(&args.value)
        .unwrap_or_else(|_| serde_json::Value::String(args.value.clone()));
    let patch = SuggestionPatch::new(args.section.clone(), args.target(), value);

    let mut session = workspace.open_session(&args.id).await?;
    session.apply_suggestion(&patch)?;

    let report = session.save_explicit().await?;
    println!("{}", describe_save(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(index: Option<usize>, field: Option<&str>, append: bool) -> SuggestArgs {
        SuggestArgs {
            id: "doc".to_string(),
            section: "experience".to_string(),
            value: "{}".to_string(),
            index,
            field: field.map(str::to_string),
            append,
        }
    }

    #[test]
    fn test_target_selection() {
        assert_eq!(args(Some(2), None, false).target(), PatchTarget::Index(2));
        assert_eq!(
            args(None, Some("headline"), false).target(),
            PatchTarget::Field("headline".to_string())
        );
        assert_eq!(args(None, None, true).target(), PatchTarget::Append);
        assert_eq!(args(None, None, false).target(), PatchTarget::Whole);
    }
}
