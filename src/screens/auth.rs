use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use super::Destination;
use crate::backend::IdentityAccount;
use crate::viewmodel::{AuthState, AuthViewModel};

/// What the auth screen shows for the current auth state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthView {
    /// Spinner shown while signing in
    pub progress_visible: bool,
    /// Sign-in button enabled
    pub sign_in_enabled: bool,
    /// Toast text, if any
    pub message: Option<String>,
    /// Set once sign-in succeeds
    pub navigate_to: Option<Destination>,
}

/// Sign-in entry point
pub struct AuthScreen {
    auth: Arc<AuthViewModel>,
}

impl AuthScreen {
    /// Screen over the shared auth holder
    pub const fn new(auth: Arc<AuthViewModel>) -> Self {
        Self { auth }
    }

    /// Forward the identity provider's result. `Err` carries the provider's
    /// failure reason and never reaches the holder.
    pub fn on_identity_result(
        &self,
        result: std::result::Result<IdentityAccount, String>,
    ) -> std::result::Result<JoinHandle<()>, AuthView> {
        match result {
            Ok(account) => Ok(self.auth.sign_in(account)),
            Err(reason) => {
                warn!(%reason, "Identity provider sign-in failed");
                Err(AuthView {
                    progress_visible: false,
                    sign_in_enabled: true,
                    message: Some(format!("Sign-in failed: {reason}")),
                    navigate_to: None,
                })
            },
        }
    }

    /// Map the current auth state to the view
    pub fn render(&self) -> AuthView {
        match self.auth.auth_state().get() {
            Some(AuthState::Loading) => AuthView {
                progress_visible: true,
                sign_in_enabled: false,
                message: None,
                navigate_to: None,
            },
            Some(AuthState::Success) => AuthView {
                progress_visible: false,
                sign_in_enabled: true,
                message: Some("Authentication successful!".to_string()),
                navigate_to: Some(Destination::Home),
            },
            Some(AuthState::Error(message)) => AuthView {
                progress_visible: false,
                sign_in_enabled: true,
                message: Some(message),
                navigate_to: None,
            },
            Some(AuthState::SignedOut) | None => AuthView {
                progress_visible: false,
                sign_in_enabled: true,
                message: None,
                navigate_to: None,
            },
        }
    }
}
