pub mod arrange;
pub mod edit;
pub mod init;
pub mod list;
pub mod new;
pub mod show;
pub mod suggest;

pub use arrange::{arrange, ArrangeArgs};
pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use list::list;
pub use new::{new, NewArgs};
pub use show::{show, ShowArgs};
pub use suggest::{suggest, SuggestArgs};

use colored::Colorize;
use vitae_editor::SaveReport;

/// One-line, colored description of a reconciled save
pub(crate) fn describe_save(report: &SaveReport) -> String {
    match report {
        SaveReport::Saved { trigger } => format!("{} saved ({})", "✓".green(), trigger),
        SaveReport::Created { trigger, id } => {
            format!("{} created {} ({})", "✓".green(), id.to_string().cyan(), trigger)
        }
        SaveReport::Failed { trigger, error } => {
            format!("{} {} save failed: {}", "✗".red(), trigger, error)
        }
        SaveReport::Discarded { trigger } => {
            format!("{} {} save discarded", "•".dimmed(), trigger)
        }
    }
}
