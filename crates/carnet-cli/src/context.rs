//! Per-invocation session and API wiring.
//!
//! Every command runs against a screen path such as `/notes/create`. The
//! restored session is checked against that path with the same redirect
//! policy the interactive clients use before the command touches the API.

use carnet_core::api::ApiClient;
use carnet_core::session::{
    MemoryRouter, RedirectCoordinator, RedirectDecision, ScreenRouter, SecurePersistence,
    SessionGate,
};
use carnet_core::{Error, User};

use crate::error::CliError;

/// What a command may do at the requested screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenAccess {
    /// Screen is open; carries the bearer token when signed in.
    Allowed(Option<String>),
    /// Signed-in user asked for an auth screen.
    AlreadySignedIn(User),
}

pub struct AppContext<P: SecurePersistence> {
    profile_name: String,
    gate: SessionGate<P>,
    api: Result<ApiClient, String>,
}

impl<P: SecurePersistence> AppContext<P> {
    /// Build the gate over `store` and restore the persisted session.
    pub async fn open(
        profile_name: impl Into<String>,
        store: P,
        api: carnet_core::Result<ApiClient>,
    ) -> Self {
        let gate = SessionGate::new(store);
        let state = gate.restore().await;
        let profile_name = profile_name.into();
        tracing::debug!(profile = %profile_name, ?state, "Session restored");

        Self {
            profile_name,
            gate,
            api: api.map_err(|error| error.to_string()),
        }
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub const fn gate(&self) -> &SessionGate<P> {
        &self.gate
    }

    pub fn api(&self) -> Result<&ApiClient, CliError> {
        self.api
            .as_ref()
            .map_err(|message| CliError::Config(message.clone()))
    }

    /// Run the redirect policy for `path`.
    pub fn enter(&self, path: &str) -> Result<ScreenAccess, CliError> {
        let mut coordinator = RedirectCoordinator::new(self.gate.subscribe(), MemoryRouter::at(path));
        let decision = coordinator.apply();
        tracing::debug!(
            path,
            landed = %coordinator.router().location(),
            ?decision,
            "Screen guard evaluated"
        );

        match decision {
            RedirectDecision::RedirectToLogin => {
                Err(CliError::NotSignedIn(self.profile_name.clone()))
            }
            RedirectDecision::RedirectToHome => self
                .gate
                .user()
                .map(ScreenAccess::AlreadySignedIn)
                .ok_or_else(|| CliError::NotSignedIn(self.profile_name.clone())),
            RedirectDecision::NoRedirect => Ok(ScreenAccess::Allowed(self.gate.token())),
        }
    }

    /// Enter a protected screen and return the bearer token.
    pub fn require_token(&self, path: &str) -> Result<String, CliError> {
        match self.enter(path)? {
            ScreenAccess::Allowed(Some(token)) => Ok(token),
            _ => Err(CliError::NotSignedIn(self.profile_name.clone())),
        }
    }

    /// Convert an API result, signing out when the server rejects the token.
    pub async fn settle<T>(&self, result: carnet_core::Result<T>) -> Result<T, CliError> {
        match result {
            Err(Error::Unauthorized) => {
                tracing::warn!(profile = %self.profile_name, "Server rejected session token");
                self.gate.sign_out().await;
                Err(CliError::SessionExpired(self.profile_name.clone()))
            }
            other => Ok(other?),
        }
    }
}
