//! # Vitae Editor
//!
//! Edit session state engine for the Vitae résumé editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI: forms, drag & drop, key chords          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - Section updates and order moves          │
//! │  - Undo/redo over the section order         │
//! │  - Dirty tracking via change fingerprint    │
//! │  - Debounced + periodic autosave            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Persistence: create / update                │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The session owns the document**: all changes go through its entry
//!    points, renderers only see a read-only [`DocumentView`]
//! 2. **Never lose the dirty signal**: a failed save re-dirties the document
//! 3. **At most one write in flight**
//! 4. **History is one-directional**: undo/redo writes are never pushed back
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitae_editor::{EditSession, JsonFileStore, Section, SessionConfig, SessionHandle};
//!
//! let store = JsonFileStore::new("./resumes");
//! let document = store.load(&id).await?;
//!
//! let mut session = EditSession::new(Arc::new(store), SessionConfig::default());
//! session.load_document(document);
//!
//! // Run timers and writes on a background task
//! let handle = SessionHandle::spawn(session);
//! handle.update_section(Section::Summary("Rust engineer".into())).await?;
//! handle.move_section("skills", MoveDirection::Up).await?;
//! handle.save_explicit().await?;
//! handle.close().await?;
//! ```

mod clock;
mod config;
mod document;
mod errors;
mod fingerprint;
mod persistence;
mod runtime;
mod scheduler;
mod sections;
mod session;
mod shortcuts;
mod suggestions;
mod undo_stack;
mod visibility;

pub use clock::{Clock, ManualClock, TokioClock};
pub use config::{SessionConfig, DEFAULT_CONFIG_NAME};
pub use document::{Document, DocumentId};
pub use errors::{ConfigError, EditorError, PersistenceError, SuggestionError};
pub use fingerprint::Fingerprint;
pub use persistence::{DocumentSummary, JsonFileStore, MemoryStore, Persistence, StoreCall};
pub use runtime::SessionHandle;
pub use scheduler::{SaveGate, SaveScheduler, SaveTrigger};
pub use sections::{
    CertificationEntry, CustomItem, CustomSection, EducationEntry, ExperienceEntry,
    LanguageEntry, PersonalInfo, ProjectEntry, Section, SectionId, SkillEntry,
};
pub use session::{
    DocumentView, EditSession, MoveDirection, MoveOutcome, PendingSave, SaveOutcome, SaveReport,
    SaveSkipped,
};
pub use shortcuts::{resolve_shortcut, Focus, HistoryCommand, KeyChord, Platform};
pub use suggestions::{PatchTarget, SuggestionPatch};
pub use undo_stack::HistoryStack;
pub use visibility::{visible_sections, LayoutRules};
