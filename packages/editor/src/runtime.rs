//! # Session Runtime
//!
//! Runs an [`EditSession`] on its own tokio task so that timers, UI commands
//! and finished writes are processed one at a time. The task is the only
//! owner of the session; everything else talks to it through a cloneable
//! [`SessionHandle`].
//!
//! ```text
//! SessionHandle ──commands──▶ ┌──────────────┐ ──spawn──▶ PendingSave::execute
//!                             │ session task │
//!   subscribe() ◀──reports─── └──────────────┘ ◀─outcome─┘
//!                                    ▲
//!                          sleep_until(next_deadline)
//! ```
//!
//! Writes run on spawned tasks, so edits keep flowing while a save is
//! pending. Closing the handle disarms both timers; writes still in flight
//! finish but their outcomes are ignored.

use crate::errors::EditorError;
use crate::scheduler::SaveTrigger;
use crate::sections::Section;
use crate::session::{
    DocumentView, EditSession, MoveDirection, MoveOutcome, SaveOutcome, SaveReport, SaveSkipped,
};
use crate::shortcuts::{resolve_shortcut, Focus, HistoryCommand, KeyChord, Platform};
use crate::suggestions::SuggestionPatch;
use crate::Document;
use std::ops::ControlFlow;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;

const COMMAND_BUFFER: usize = 100;
const REPORT_BUFFER: usize = 16;

type Reply<T> = oneshot::Sender<T>;

enum SessionCommand {
    Load(Document),
    UpdateSection(Section),
    ApplySuggestion(SuggestionPatch, Reply<Result<(), EditorError>>),
    SetTitle(String),
    SetTemplate(String),
    SetLocale(String),
    RenameSection(String, String),
    MoveSection(String, MoveDirection, Reply<MoveOutcome>),
    Reorder(Vec<String>),
    History(HistoryCommand, Reply<bool>),
    SaveExplicit(Reply<Result<SaveReport, SaveSkipped>>),
    View(Reply<DocumentView>),
    Close(Reply<()>),
}

#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    reports: broadcast::Sender<SaveReport>,
}

impl SessionHandle {
    /// Move the session onto a new task
    pub fn spawn(session: EditSession) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (reports, _) = broadcast::channel(REPORT_BUFFER);
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let task = SessionTask {
            session,
            reports: reports.clone(),
            outcome_tx,
            explicit_waiter: None,
        };
        tokio::spawn(task.run(command_rx, outcome_rx));

        Self { commands, reports }
    }

    /// Every save the session reconciles from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SaveReport> {
        self.reports.subscribe()
    }

    pub async fn load_document(&self, document: Document) -> Result<(), EditorError> {
        self.send(SessionCommand::Load(document)).await
    }

    pub async fn update_section(&self, section: Section) -> Result<(), EditorError> {
        self.send(SessionCommand::UpdateSection(section)).await
    }

    pub async fn apply_suggestion(&self, patch: SuggestionPatch) -> Result<(), EditorError> {
        self.request(|reply| SessionCommand::ApplySuggestion(patch, reply))
            .await?
    }

    pub async fn set_title(&self, title: impl Into<String>) -> Result<(), EditorError> {
        self.send(SessionCommand::SetTitle(title.into())).await
    }

    pub async fn set_template(&self, template: impl Into<String>) -> Result<(), EditorError> {
        self.send(SessionCommand::SetTemplate(template.into())).await
    }

    pub async fn set_locale(&self, locale: impl Into<String>) -> Result<(), EditorError> {
        self.send(SessionCommand::SetLocale(locale.into())).await
    }

    /// Set a section's display name; a blank name restores the default
    pub async fn rename_section(
        &self,
        key: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<(), EditorError> {
        self.send(SessionCommand::RenameSection(key.into(), name.into()))
            .await
    }

    pub async fn move_section(
        &self,
        key: impl Into<String>,
        direction: MoveDirection,
    ) -> Result<MoveOutcome, EditorError> {
        let key = key.into();
        self.request(|reply| SessionCommand::MoveSection(key, direction, reply))
            .await
    }

    pub async fn reorder_sections(&self, order: Vec<String>) -> Result<(), EditorError> {
        self.send(SessionCommand::Reorder(order)).await
    }

    pub async fn undo(&self) -> Result<bool, EditorError> {
        self.request(|reply| SessionCommand::History(HistoryCommand::Undo, reply))
            .await
    }

    pub async fn redo(&self) -> Result<bool, EditorError> {
        self.request(|reply| SessionCommand::History(HistoryCommand::Redo, reply))
            .await
    }

    /// Route a key chord to undo/redo. Returns the command it mapped to, if
    /// any.
    pub async fn key_down(
        &self,
        chord: &KeyChord,
        platform: Platform,
        focus: Focus,
    ) -> Result<Option<HistoryCommand>, EditorError> {
        let Some(command) = resolve_shortcut(chord, platform, focus) else {
            return Ok(None);
        };
        self.request(|reply| SessionCommand::History(command, reply))
            .await?;
        Ok(Some(command))
    }

    /// Save now and wait for the write to be reconciled
    pub async fn save_explicit(&self) -> Result<SaveReport, EditorError> {
        let report = self.request(SessionCommand::SaveExplicit).await??;
        Ok(report)
    }

    pub async fn view(&self) -> Result<DocumentView, EditorError> {
        self.request(SessionCommand::View).await
    }

    pub async fn close(&self) -> Result<(), EditorError> {
        self.request(SessionCommand::Close).await
    }

    async fn send(&self, command: SessionCommand) -> Result<(), EditorError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| EditorError::SessionClosed)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> Result<T, EditorError> {
        let (reply, response) = oneshot::channel();
        self.send(command(reply)).await?;
        response.await.map_err(|_| EditorError::SessionClosed)
    }
}

struct SessionTask {
    session: EditSession,
    reports: broadcast::Sender<SaveReport>,
    outcome_tx: mpsc::UnboundedSender<SaveOutcome>,
    explicit_waiter: Option<Reply<Result<SaveReport, SaveSkipped>>>,
}

impl SessionTask {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut outcomes: mpsc::UnboundedReceiver<SaveOutcome>,
    ) {
        loop {
            let deadline = self.session.next_deadline();

            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        self.session.close();
                        break;
                    };
                    if self.handle(command).is_break() {
                        break;
                    }
                }
                Some(outcome) = outcomes.recv() => self.finish(outcome),
                _ = sleep_until(deadline) => {
                    if let Some(trigger) = self.session.poll_timers() {
                        self.start(trigger);
                    }
                }
            }
        }

        tracing::debug!("Session task stopped");
    }

    fn handle(&mut self, command: SessionCommand) -> ControlFlow<()> {
        match command {
            SessionCommand::Load(document) => self.session.load_document(document),
            SessionCommand::UpdateSection(section) => self.session.update_section(section),
            SessionCommand::ApplySuggestion(patch, reply) => {
                let result = self.session.apply_suggestion(&patch).map_err(EditorError::from);
                let _ = reply.send(result);
            }
            SessionCommand::SetTitle(title) => {
                self.session.set_title(title);
            }
            SessionCommand::SetTemplate(template) => {
                self.session.set_template(template);
            }
            SessionCommand::SetLocale(locale) => {
                self.session.set_locale(locale);
            }
            SessionCommand::RenameSection(key, name) => {
                self.session.rename_section(&key, name);
            }
            SessionCommand::MoveSection(key, direction, reply) => {
                let _ = reply.send(self.session.move_section(&key, direction));
            }
            SessionCommand::Reorder(order) => self.session.reorder_sections(order),
            SessionCommand::History(command, reply) => {
                let applied = match command {
                    HistoryCommand::Undo => self.session.undo(),
                    HistoryCommand::Redo => self.session.redo(),
                };
                let _ = reply.send(applied);
            }
            SessionCommand::SaveExplicit(reply) => {
                if self.session.is_saving() {
                    let _ = reply.send(Err(SaveSkipped::InFlight));
                } else {
                    self.explicit_waiter = Some(reply);
                    self.start(SaveTrigger::Explicit);
                }
            }
            SessionCommand::View(reply) => {
                let _ = reply.send(self.session.view());
            }
            SessionCommand::Close(reply) => {
                self.session.close();
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    fn start(&mut self, trigger: SaveTrigger) {
        let pending = match self.session.begin_save(trigger) {
            Ok(pending) => pending,
            Err(skipped) => {
                tracing::debug!("{} save skipped: {}", trigger, skipped);
                if trigger == SaveTrigger::Explicit {
                    if let Some(waiter) = self.explicit_waiter.take() {
                        let _ = waiter.send(Err(skipped));
                    }
                }
                return;
            }
        };

        let persistence = self.session.persistence();
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = pending.execute(persistence).await;
            // The session task may already be gone; the result is dropped then.
            let _ = outcome_tx.send(outcome);
        });
    }

    fn finish(&mut self, outcome: SaveOutcome) {
        let trigger = outcome.trigger();
        let report = self.session.complete_save(outcome);

        if trigger == SaveTrigger::Explicit {
            if let Some(waiter) = self.explicit_waiter.take() {
                let _ = waiter.send(Ok(report.clone()));
            }
        }

        // No subscribers is fine.
        let _ = self.reports.send(report);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
