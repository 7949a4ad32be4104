use std::sync::Arc;

use crate::models::authorization::{AuthorizationState, LifecycleState};
use crate::services::challenge::Challenger;

/// Prompt shown when the configuration does not override it
pub const DEFAULT_PROMPT: &str = "Confirm fingerprint";

/// Gates access to card data behind a single device-credential challenge.
///
/// The gate starts armed. The first call to [`request_authorization`]
/// disarms it and issues the challenge; later calls return the stored
/// result without prompting again. Only a return to the foreground from
/// `inactive` or `background` re-arms it.
///
/// [`request_authorization`]: AuthorizationGate::request_authorization
pub struct AuthorizationGate {
    challenger: Arc<dyn Challenger>,
    prompt: String,
    state: AuthorizationState,
    armed: bool,
    lifecycle: LifecycleState,
}

impl AuthorizationGate {
    pub fn new(challenger: Arc<dyn Challenger>, prompt: impl Into<String>) -> Self {
        Self {
            challenger,
            prompt: prompt.into(),
            state: AuthorizationState::Unknown,
            armed: true,
            lifecycle: LifecycleState::Active,
        }
    }

    pub fn state(&self) -> AuthorizationState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }

    /// Runs the challenge if the gate is armed, otherwise returns the
    /// current state untouched.
    ///
    /// Every failure (mismatch, cancellation, nothing enrolled, platform
    /// error) resolves to `Denied`.
    #[tracing::instrument(skip(self), fields(prompt = %self.prompt))]
    pub async fn request_authorization(&mut self) -> AuthorizationState {
        if !self.armed {
            return self.state;
        }
        self.armed = false;

        let state = match self.challenger.challenge(&self.prompt).await {
            Ok(result) if result.success => AuthorizationState::Granted,
            Ok(_) => {
                tracing::info!("Challenge did not match enrolled credential");
                AuthorizationState::Denied
            }
            Err(e) => {
                tracing::warn!(error = %e, "Challenge failed");
                AuthorizationState::Denied
            }
        };

        tracing::info!(state = %state, "Authorization resolved");
        self.state = state;
        state
    }

    /// Records a foreground-state change. Returns true when the gate was
    /// re-armed.
    pub fn on_lifecycle_change(&mut self, next: LifecycleState) -> bool {
        let resumed = self.lifecycle.is_away() && next == LifecycleState::Active;

        if resumed {
            self.armed = true;
            self.state = AuthorizationState::Unknown;
            tracing::info!(from = %self.lifecycle, "Returned to foreground, authorization reset");
        } else {
            tracing::debug!(from = %self.lifecycle, to = %next, "Lifecycle change");
        }

        self.lifecycle = next;
        resumed
    }
}
