use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{IdentityAccount, IdentityProvider};
use crate::models::User;
use crate::repository::ItemRepository;
use crate::state::{Observable, ViewModelScope};
use crate::validation::InputValidator;

/// Where the sign-in flow stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// A sign-in is in flight
    Loading,
    /// Signed in with a loaded or freshly created profile
    Success,
    /// Signed out explicitly
    SignedOut,
    /// Sign-in or sign-out failed
    Error(String),
}

struct AuthSessionState {
    repository: Arc<dyn ItemRepository>,
    identity: Arc<dyn IdentityProvider>,
    allowed_domain: String,
    auth_state: Observable<Option<AuthState>>,
    current_user: Observable<Option<User>>,
}

impl AuthSessionState {
    async fn check_current_user(&self) {
        let Some(user_id) = self.repository.current_user_id().await else {
            debug!("No backend session");
            return;
        };

        match self.repository.get_user(&user_id).await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "Restored session");
                self.current_user.set(Some(user));
                self.auth_state.set(Some(AuthState::Success));
            },
            Ok(None) => debug!(user_id = %user_id, "Session without a profile"),
            Err(e) => {
                warn!(error = %e, "Failed to check current user");
                self.auth_state
                    .set(Some(AuthState::Error(format!("Failed to check current user: {e}"))));
            },
        }
    }

    async fn sign_in(&self, account: IdentityAccount) {
        let email = account.email.clone().unwrap_or_default();

        // The allow-list is enforced before anything reaches the backend
        if let Err(e) = InputValidator::validate_institution_email(&email, &self.allowed_domain) {
            warn!(%email, "Rejected sign-in outside the allowed domain");
            if let Err(sign_out_error) = self.identity.sign_out().await {
                warn!(error = %sign_out_error, "Identity provider sign-out failed");
            }
            self.auth_state.set(Some(AuthState::Error(e.to_string())));
            return;
        }

        let Some(id_token) = account.id_token.as_deref() else {
            self.auth_state
                .set(Some(AuthState::Error("Sign-in failed: no identity token".to_string())));
            return;
        };

        self.auth_state.set(Some(AuthState::Loading));

        let user_id = match self.repository.sign_in_with_token(id_token).await {
            Ok(user_id) => user_id,
            Err(e) => {
                self.auth_state.set(Some(AuthState::Error(format!("Sign in failed: {e}"))));
                return;
            },
        };

        match self.repository.get_user(&user_id).await {
            Ok(Some(user)) => {
                info!(user_id = %user_id, "Signed in existing user");
                self.current_user.set(Some(user));
                self.auth_state.set(Some(AuthState::Success));
                return;
            },
            Ok(None) => debug!(user_id = %user_id, "First sign-in, creating profile"),
            Err(e) => warn!(error = %e, "Profile lookup failed, creating profile"),
        }

        let user = User {
            id: user_id,
            name: account.display_name.unwrap_or_else(|| email.clone()),
            email,
            ..User::default()
        };
        match self.repository.create_user(user.clone()).await {
            Ok(_) => {
                info!(user_id = %user.id, "Created user profile");
                self.current_user.set(Some(user));
                self.auth_state.set(Some(AuthState::Success));
            },
            Err(e) => {
                warn!(error = %e, "Failed to create user profile");
                self.auth_state
                    .set(Some(AuthState::Error("Failed to create user profile".to_string())));
            },
        }
    }

    async fn sign_out(&self) {
        match self.repository.sign_out().await {
            Ok(()) => {
                if let Err(e) = self.identity.sign_out().await {
                    warn!(error = %e, "Identity provider sign-out failed");
                }
                self.current_user.set(None);
                self.auth_state.set(Some(AuthState::SignedOut));
                info!("Signed out");
            },
            Err(e) => self.auth_state.set(Some(AuthState::Error(format!("Sign out error: {e}")))),
        }
    }
}

/// Sign-in state restricted to one institutional email domain
///
/// `auth_state` stays `None` until something happens: a restored session, a
/// sign-in attempt or a sign-out.
pub struct AuthViewModel {
    state: Arc<AuthSessionState>,
    scope: ViewModelScope,
}

impl AuthViewModel {
    /// Build the holder and check for an existing backend session.
    /// Must be called inside a tokio runtime.
    pub fn new(
        repository: Arc<dyn ItemRepository>,
        identity: Arc<dyn IdentityProvider>,
        allowed_domain: &str,
    ) -> Self {
        let view_model = Self {
            state: Arc::new(AuthSessionState {
                repository,
                identity,
                allowed_domain: allowed_domain.to_string(),
                auth_state: Observable::default(),
                current_user: Observable::default(),
            }),
            scope: ViewModelScope::new(),
        };
        // Detached; observers pick up the outcome
        drop(view_model.check_current_user());
        view_model
    }

    /// Sign-in progress and outcome
    pub fn auth_state(&self) -> &Observable<Option<AuthState>> {
        &self.state.auth_state
    }

    /// Signed-in profile
    pub fn current_user(&self) -> &Observable<Option<User>> {
        &self.state.current_user
    }

    /// Email domain allowed to sign in
    pub fn allowed_domain(&self) -> &str {
        &self.state.allowed_domain
    }

    /// Restore a profile for an existing backend session
    pub fn check_current_user(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.check_current_user().await })
    }

    /// Sign in with an account chosen in the identity provider
    pub fn sign_in(&self, account: IdentityAccount) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.sign_in(account).await })
    }

    /// End the backend and identity sessions
    pub fn sign_out(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        self.scope.launch(async move { state.sign_out().await })
    }
}
