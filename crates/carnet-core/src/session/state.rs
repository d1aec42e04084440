//! In-memory session record.

use std::fmt;

use crate::models::User;

/// Observable phase of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Persisted credentials are still being read at startup
    Restoring,
    Authenticated,
    Unauthenticated,
}

/// Current authentication state.
///
/// While `is_loading` is true the token and user are not authoritative.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_loading: bool,
}

impl Session {
    /// State at process start, before restore has run
    pub const fn restoring() -> Self {
        Self {
            token: None,
            user: None,
            is_loading: true,
        }
    }

    pub const fn signed_out() -> Self {
        Self {
            token: None,
            user: None,
            is_loading: false,
        }
    }

    pub const fn authenticated(token: String, user: User) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
            is_loading: false,
        }
    }

    pub const fn state(&self) -> SessionState {
        if self.is_loading {
            SessionState::Restoring
        } else if self.token.is_some() && self.user.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state(), SessionState::Authenticated)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::restoring()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .field("is_loading", &self.is_loading)
            .finish()
    }
}
