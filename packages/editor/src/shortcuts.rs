//! Undo/redo keyboard chords.
//!
//! Section order history is driven by the platform's usual undo/redo chords.
//! While focus is inside a text-entry control the chord belongs to the
//! control's own text undo, so no history command is produced.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    /// Command key is the primary modifier
    Mac,
    Other,
}

/// Where keyboard focus currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Focus {
    /// Input, textarea, contenteditable
    TextEntry,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyChord {
    /// Key as reported by the UI, case-insensitive
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryCommand {
    Undo,
    Redo,
}

/// Map a key chord to a history command
///
/// - Mac: Cmd+Z undo, Cmd+Shift+Z redo
/// - Other: Ctrl+Z undo, Ctrl+Shift+Z or Ctrl+Y redo
pub fn resolve_shortcut(chord: &KeyChord, platform: Platform, focus: Focus) -> Option<HistoryCommand> {
    if focus == Focus::TextEntry || chord.alt {
        return None;
    }

    let primary = match platform {
        Platform::Mac => chord.meta && !chord.ctrl,
        Platform::Other => chord.ctrl && !chord.meta,
    };
    if !primary {
        return None;
    }

    match chord.key.to_ascii_lowercase().as_str() {
        "z" if chord.shift => Some(HistoryCommand::Redo),
        "z" => Some(HistoryCommand::Undo),
        "y" if platform == Platform::Other && !chord.shift => Some(HistoryCommand::Redo),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_chords() {
        let other = Platform::Other;
        let mac = Platform::Mac;

        assert_eq!(
            resolve_shortcut(&KeyChord::new("z").ctrl(), other, Focus::Other),
            Some(HistoryCommand::Undo)
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("Z").ctrl().shift(), other, Focus::Other),
            Some(HistoryCommand::Redo)
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("y").ctrl(), other, Focus::Other),
            Some(HistoryCommand::Redo)
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("z").meta(), mac, Focus::Other),
            Some(HistoryCommand::Undo)
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("z").meta().shift(), mac, Focus::Other),
            Some(HistoryCommand::Redo)
        );
    }

    #[test]
    fn test_wrong_modifier_ignored() {
        assert_eq!(
            resolve_shortcut(&KeyChord::new("z").ctrl(), Platform::Mac, Focus::Other),
            None
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("y").meta(), Platform::Mac, Focus::Other),
            None
        );
        assert_eq!(
            resolve_shortcut(&KeyChord::new("z"), Platform::Other, Focus::Other),
            None
        );
    }

    #[test]
    fn test_suppressed_in_text_entry() {
        assert_eq!(
            resolve_shortcut(&KeyChord::new("z").ctrl(), Platform::Other, Focus::TextEntry),
            None
        );
    }
}
