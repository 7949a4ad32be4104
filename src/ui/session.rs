use crate::models::{AuthorizationState, CardRecord, LifecycleState};
use crate::services::{gate::AuthorizationGate, repository::CardRepository};

use super::{form::CardForm, screen::Screen};

/// View-model for the card screen.
///
/// Owns the gate, the repository and the form for as long as the screen
/// lives. Card data and mutations are only reachable while the gate reports
/// `Granted`.
pub struct CardSession {
    gate: AuthorizationGate,
    repository: CardRepository,
    form: CardForm,
}

impl CardSession {
    pub fn new(gate: AuthorizationGate, repository: CardRepository) -> Self {
        Self {
            gate,
            repository,
            form: CardForm::default(),
        }
    }

    pub fn authorization(&self) -> AuthorizationState {
        self.gate.state()
    }

    /// Runs the gate. Safe to call on every render pass: the challenge and
    /// the follow-up load happen at most once per arming period.
    pub async fn activate(&mut self) -> AuthorizationState {
        let armed = self.gate.is_armed();
        let state = self.gate.request_authorization().await;

        if armed && state.is_granted() {
            self.repository.load().await;
        }
        state
    }

    /// Forwards a foreground-state change to the gate. Returns true when a
    /// fresh challenge is now required.
    pub fn on_lifecycle_change(&mut self, next: LifecycleState) -> bool {
        let rearmed = self.gate.on_lifecycle_change(next);
        if rearmed {
            self.form.close();
        }
        rearmed
    }

    pub fn screen(&self) -> Screen {
        Screen::render(self.gate.state(), self.repository.cards())
    }

    pub fn form(&self) -> &CardForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CardForm {
        &mut self.form
    }

    pub fn open_form(&mut self) {
        self.form.open();
    }

    /// Opens the form pre-filled with the first card carrying `id`.
    pub fn begin_edit(&mut self, id: u64) -> bool {
        if !self.unlocked("edit") {
            return false;
        }

        match self.repository.cards().iter().find(|c| c.id == id) {
            Some(card) => {
                self.form.open_for(card);
                true
            }
            None => false,
        }
    }

    /// Submits the form as an add, or as an update when editing.
    ///
    /// Returns the stored record, or `None` when locked or when the edited
    /// record no longer exists.
    pub fn submit(&mut self) -> Option<CardRecord> {
        if !self.unlocked("submit") {
            self.form.close();
            return None;
        }

        match self.form.submit() {
            (None, input) => Some(self.repository.add(input)),
            (Some(id), input) => {
                if self.repository.update(id, input) {
                    self.repository.cards().iter().find(|c| c.id == id).cloned()
                } else {
                    None
                }
            }
        }
    }

    pub fn remove(&mut self, id: u64) -> usize {
        if !self.unlocked("remove") {
            return 0;
        }
        self.repository.remove(id)
    }

    /// Waits for queued writes; call before shutting down.
    pub async fn flush(&self) {
        self.repository.flush().await;
    }

    fn unlocked(&self, action: &'static str) -> bool {
        let state = self.gate.state();
        if !state.is_granted() {
            tracing::warn!(action, state = %state, "Refusing card mutation while locked");
        }
        state.is_granted()
    }
}
