//! # Edit Session Management
//!
//! An EditSession owns the authoritative document for one editor view and
//! decides when it must be persisted.
//!
//! ## Save protocol
//!
//! ```text
//! begin_save:    guard (one in flight) → snapshot → dirty = false,
//!                baseline = fingerprint(snapshot)
//! execute:       Persistence create/update (the only suspension point)
//! complete_save: ok    → record save time, assign identity on first create
//!                error → dirty = true, baseline restored, debounce re-armed
//! ```
//!
//! Dirty is cleared optimistically so that an edit made while the write is
//! pending is not masked by the write's completion. A failed write never
//! loses the dirty signal; the next scheduled attempt saves the live
//! document, not the failed snapshot.
//!
//! ## Section order history
//!
//! Only the order list has undo/redo. Order changes from edits, external
//! reorders and loads are pushed into the history; changes coming *from*
//! undo/redo are mirrored into the document and tagged with `mirroring` so
//! the push side skips its own write.

use crate::clock::{Clock, TokioClock};
use crate::errors::{PersistenceError, SuggestionError};
use crate::fingerprint::Fingerprint;
use crate::persistence::Persistence;
use crate::scheduler::{SaveGate, SaveScheduler, SaveTrigger};
use crate::sections::{Section, SectionId};
use crate::suggestions::SuggestionPatch;
use crate::undo_stack::HistoryStack;
use crate::visibility::visible_sections;
use crate::{Document, DocumentId, SessionConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Result of [`EditSession::move_section`]. The two no-op variants are
/// diagnostics, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: usize, to: usize },
    NotFound,
    OutOfBounds,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveSkipped {
    #[error("A save is already in flight")]
    InFlight,

    #[error("Nothing to save")]
    NotDirty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveReport {
    Saved { trigger: SaveTrigger },
    /// First save of a new document
    Created { trigger: SaveTrigger, id: DocumentId },
    Failed { trigger: SaveTrigger, error: String },
    /// The session loaded another document while the write was pending
    Discarded { trigger: SaveTrigger },
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveReport::Saved { .. } | SaveReport::Created { .. })
    }
}

/// A write that has been started but not reconciled
#[derive(Debug)]
pub struct PendingSave {
    ticket: u64,
    generation: u64,
    trigger: SaveTrigger,
    snapshot: Document,
    previous_baseline: Fingerprint,
}

impl PendingSave {
    pub fn trigger(&self) -> SaveTrigger {
        self.trigger
    }

    pub fn snapshot(&self) -> &Document {
        &self.snapshot
    }

    /// Issue the write. Owns everything it touches so it can be spawned.
    pub async fn execute(self, persistence: Arc<dyn Persistence>) -> SaveOutcome {
        let result = match &self.snapshot.id {
            Some(id) => persistence.update(id, &self.snapshot).await.map(|()| None),
            None => persistence.create(&self.snapshot).await.map(Some),
        };

        SaveOutcome {
            pending: self,
            result,
        }
    }
}

/// Finished write, to be handed back to [`EditSession::complete_save`]
#[derive(Debug)]
pub struct SaveOutcome {
    pending: PendingSave,
    result: Result<Option<DocumentId>, PersistenceError>,
}

impl SaveOutcome {
    pub fn trigger(&self) -> SaveTrigger {
        self.pending.trigger
    }
}

/// Read-only projection handed to rendering and export collaborators
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView {
    pub document: Document,
    pub visible_sections: Vec<SectionId>,
    pub dirty: bool,
    pub saving: bool,
}

pub struct EditSession {
    document: Document,
    config: SessionConfig,
    persistence: Arc<dyn Persistence>,
    clock: Arc<dyn Clock>,

    dirty: bool,
    saved_fingerprint: Fingerprint,
    scheduler: SaveScheduler,

    /// Ticket of the write currently in flight
    in_flight: Option<u64>,
    next_ticket: u64,

    /// Bumped on every load; outcomes from an older generation are dropped
    generation: u64,

    history: HistoryStack<Vec<String>>,
    last_mirrored: Vec<String>,
    mirroring: bool,
    loaded: bool,
}

impl EditSession {
    /// Session over an empty, never persisted document
    pub fn new(persistence: Arc<dyn Persistence>, config: SessionConfig) -> Self {
        let document = Document::new();
        let order = document.section_order.clone();

        Self {
            saved_fingerprint: Fingerprint::compute(&document),
            scheduler: SaveScheduler::from_config(&config),
            history: HistoryStack::with_max_levels(order.clone(), config.history_limit),
            last_mirrored: order,
            document,
            config,
            persistence,
            clock: Arc::new(TokioClock),
            dirty: false,
            in_flight: None,
            next_ticket: 0,
            generation: 0,
            mirroring: false,
            loaded: false,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the session's document
    ///
    /// Establishes a clean fingerprint baseline and arms the save timers
    /// only if the document already has a persisted identity. The first
    /// load starts the order history; later loads push onto it.
    pub fn load_document(&mut self, document: Document) {
        self.generation += 1;
        self.document = document;
        self.dirty = false;
        self.saved_fingerprint = Fingerprint::compute(&self.document);

        if self.loaded {
            self.sync_order_to_history();
        } else {
            self.history.reset(self.document.section_order.clone());
            self.last_mirrored = self.document.section_order.clone();
            self.loaded = true;
        }

        if self.document.id.is_some() {
            self.scheduler.arm(self.clock.now());
        } else {
            self.scheduler.disarm();
        }

        tracing::debug!(
            "Loaded document {:?} ({} sections in order)",
            self.document.id,
            self.document.section_order.len()
        );
    }

    /// Hydrate a persisted (possibly partial) record and load it
    pub fn load_record(&mut self, record: &serde_json::Value) {
        self.load_document(Document::hydrate(record));
    }

    /// Replace one section wholesale. Marks dirty without consulting the
    /// fingerprint, which cannot see in-place entry edits.
    pub fn update_section(&mut self, section: Section) {
        tracing::debug!("Updating section {}", section.name());
        self.document.apply_section(section);
        self.mark_dirty();
    }

    /// Apply an externally produced suggestion through the section update
    /// path
    pub fn apply_suggestion(&mut self, patch: &SuggestionPatch) -> Result<(), SuggestionError> {
        let section = patch.resolve(&self.document)?;
        self.update_section(section);
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        self.document.title = title.into();
        self.refresh_dirty()
    }

    pub fn set_template(&mut self, template: impl Into<String>) -> bool {
        self.document.template = template.into();
        self.refresh_dirty()
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) -> bool {
        self.document.locale = locale.into();
        self.refresh_dirty()
    }

    /// Set (or clear with an empty name) a section's custom display name
    pub fn rename_section(&mut self, key: &str, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.trim().is_empty() {
            self.document.section_names.remove(key);
        } else {
            self.document.section_names.insert(key.to_string(), name);
        }
        self.refresh_dirty()
    }

    /// Swap a section with its neighbour in the order list
    pub fn move_section(&mut self, key: &str, direction: MoveDirection) -> MoveOutcome {
        let order = &self.document.section_order;

        let Some(from) = order.iter().position(|k| k == key) else {
            tracing::debug!("Ignoring move of unknown section {}", key);
            return MoveOutcome::NotFound;
        };

        let to = match direction {
            MoveDirection::Up => from.checked_sub(1),
            MoveDirection::Down => Some(from + 1).filter(|to| *to < order.len()),
        };
        let Some(to) = to else {
            tracing::debug!("Ignoring out of bounds move of {} {:?}", key, direction);
            return MoveOutcome::OutOfBounds;
        };

        let mut new_order = order.clone();
        new_order.swap(from, to);
        self.replace_order(new_order);

        MoveOutcome::Moved { from, to }
    }

    /// Install an externally computed order. Not validated: unknown keys
    /// are kept and skipped by renderers.
    pub fn reorder_sections(&mut self, new_order: Vec<String>) {
        self.replace_order(new_order);
    }

    /// Step the order history back. Returns `false` if nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        if self.sync_history_to_document() {
            self.sync_order_to_history();
        }
        true
    }

    /// Step the order history forward. Returns `false` if nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        if self.sync_history_to_document() {
            self.sync_order_to_history();
        }
        true
    }

    /// Start a write
    ///
    /// Scheduled triggers are skipped when the document is clean; explicit
    /// saves always go through unless another write is in flight.
    pub fn begin_save(&mut self, trigger: SaveTrigger) -> Result<PendingSave, SaveSkipped> {
        if self.in_flight.is_some() {
            return Err(SaveSkipped::InFlight);
        }
        if trigger != SaveTrigger::Explicit && !self.dirty {
            return Err(SaveSkipped::NotDirty);
        }

        let snapshot = self.document.clone();
        let previous_baseline =
            std::mem::replace(&mut self.saved_fingerprint, Fingerprint::compute(&snapshot));
        self.dirty = false;

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(ticket);

        tracing::debug!("Starting {} save #{}", trigger, ticket);

        Ok(PendingSave {
            ticket,
            generation: self.generation,
            trigger,
            snapshot,
            previous_baseline,
        })
    }

    /// Reconcile a finished write with the live session state
    pub fn complete_save(&mut self, outcome: SaveOutcome) -> SaveReport {
        let SaveOutcome { pending, result } = outcome;
        let trigger = pending.trigger;

        if self.in_flight == Some(pending.ticket) {
            self.in_flight = None;
        }

        if pending.generation != self.generation {
            tracing::debug!("Discarding {} save for a previous document", trigger);
            return SaveReport::Discarded { trigger };
        }

        let now = self.clock.now();

        match result {
            Ok(created) => {
                self.scheduler.note_saved(now);

                let report = match created {
                    Some(id) if self.document.id.is_none() => {
                        let mut snapshot = pending.snapshot;
                        snapshot.id = Some(id.clone());
                        self.saved_fingerprint = Fingerprint::compute(&snapshot);
                        self.document.id = Some(id.clone());
                        self.scheduler.arm(now);

                        tracing::info!("Created document {}", id);
                        SaveReport::Created { trigger, id }
                    }
                    _ => {
                        tracing::info!("Saved document ({})", trigger);
                        SaveReport::Saved { trigger }
                    }
                };

                // Edits made during the write may have had their debounce
                // deadline consumed while the gate was closed.
                if self.dirty && self.scheduler.debounce_deadline().is_none() {
                    self.scheduler.note_dirty(now);
                }
                report
            }
            Err(e) => {
                tracing::warn!("{} save failed, will retry: {}", trigger, e);
                self.saved_fingerprint = pending.previous_baseline;
                self.dirty = true;
                self.scheduler.note_dirty(now);
                SaveReport::Failed {
                    trigger,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Run one write to completion against the session's persistence
    pub async fn save(&mut self, trigger: SaveTrigger) -> Result<SaveReport, SaveSkipped> {
        let pending = self.begin_save(trigger)?;
        let outcome = pending.execute(self.persistence.clone()).await;
        Ok(self.complete_save(outcome))
    }

    /// User initiated save, bypassing scheduling
    pub async fn save_explicit(&mut self) -> Result<SaveReport, SaveSkipped> {
        self.save(SaveTrigger::Explicit).await
    }

    /// Fire due timers; returns the save the scheduler wants
    pub fn poll_timers(&mut self) -> Option<SaveTrigger> {
        let gate = SaveGate {
            dirty: self.dirty,
            saving: self.is_saving(),
        };
        self.scheduler.poll(self.clock.now(), gate)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Tear down timers. An in-flight write may still complete.
    pub fn close(&mut self) {
        self.scheduler.disarm();
        tracing::debug!("Session closed for document {:?}", self.document.id);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn persistence(&self) -> Arc<dyn Persistence> {
        self.persistence.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn timers_armed(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryStack<Vec<String>> {
        &self.history
    }

    /// Baseline the dirty check compares against
    pub fn saved_fingerprint(&self) -> &Fingerprint {
        &self.saved_fingerprint
    }

    pub fn visible_sections(&self) -> Vec<SectionId> {
        visible_sections(&self.document, &self.config.layout)
    }

    pub fn view(&self) -> DocumentView {
        DocumentView {
            document: self.document.clone(),
            visible_sections: self.visible_sections(),
            dirty: self.dirty,
            saving: self.is_saving(),
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.scheduler.note_dirty(self.clock.now());
    }

    /// Fingerprint-based dirty detection for metadata edits
    fn refresh_dirty(&mut self) -> bool {
        let changed = Fingerprint::compute(&self.document) != self.saved_fingerprint;
        if changed {
            self.mark_dirty();
        }
        changed
    }

    fn replace_order(&mut self, new_order: Vec<String>) {
        self.document.section_order = new_order;
        self.sync_order_to_history();
        self.mark_dirty();
    }

    /// Document → history: push order changes that did not come from
    /// undo/redo
    fn sync_order_to_history(&mut self) {
        if self.mirroring {
            self.mirroring = false;
            return;
        }
        if self.document.section_order == self.last_mirrored {
            return;
        }

        self.history.push(self.document.section_order.clone());
        self.last_mirrored = self.document.section_order.clone();
    }

    /// History → document: copy the present entry after undo/redo without
    /// pushing it back
    fn sync_history_to_document(&mut self) -> bool {
        let present = self.history.present();
        if *present == self.last_mirrored {
            return false;
        }

        self.document.section_order = present.clone();
        self.last_mirrored = present.clone();
        self.mirroring = true;
        self.mark_dirty();
        true
    }
}
