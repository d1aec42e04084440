//! Single owner of the authentication session.

use tokio::sync::{watch, Mutex};

use super::persistence::{SecurePersistence, TOKEN_KEY, USER_KEY};
use super::redirect::{evaluate_redirect, RedirectDecision};
use super::state::{Session, SessionState};
use crate::error::{Error, Result, StorageError};
use crate::models::User;

/// Owns the [`Session`] and is the only writer of persisted credentials.
///
/// `restore`, `sign_in` and `sign_out` are serialized by an internal writer
/// lock, so overlapping calls apply in the order they acquire it. Every
/// change is published to [`SessionGate::subscribe`] receivers.
pub struct SessionGate<P: SecurePersistence> {
    store: P,
    writer: Mutex<()>,
    session: watch::Sender<Session>,
}

impl<P: SecurePersistence> SessionGate<P> {
    /// Create a gate in the `Restoring` state.
    pub fn new(store: P) -> Self {
        let (session, _) = watch::channel(Session::restoring());
        Self {
            store,
            writer: Mutex::new(()),
            session,
        }
    }

    /// Receive every session change, starting from the current value.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.session.borrow().state()
    }

    pub fn token(&self) -> Option<String> {
        self.session.borrow().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.session.borrow().user.clone()
    }

    /// Redirect decision for `segments` given the current session.
    pub fn evaluate_redirect<S: AsRef<str>>(&self, segments: &[S]) -> RedirectDecision {
        evaluate_redirect(&self.session.borrow(), segments)
    }

    /// Load persisted credentials once at startup.
    ///
    /// Read failures and malformed profiles leave the session signed out.
    /// The loading flag is cleared on every path. Later calls are no-ops.
    pub async fn restore(&self) -> SessionState {
        let _writer = self.writer.lock().await;
        if !self.session.borrow().is_loading {
            tracing::debug!("Session already restored; ignoring restore request");
            return self.state();
        }

        let restored = match self.read_stored().await {
            Ok(Some((token, user))) => {
                tracing::info!(user_id = user.id, "Restored persisted session");
                Session::authenticated(token, user)
            }
            Ok(None) => {
                tracing::debug!("No persisted session");
                Session::signed_out()
            }
            Err(Error::MalformedProfile(reason)) => {
                tracing::error!("Discarding persisted session with invalid user data: {reason}");
                self.delete_stored().await;
                Session::signed_out()
            }
            Err(error) => {
                tracing::error!("Failed to read persisted session: {error}");
                Session::signed_out()
            }
        };

        let state = restored.state();
        self.session.send_replace(restored);
        state
    }

    /// Persist credentials, then mark the session authenticated.
    ///
    /// When either write fails the stored token is put back to what it was
    /// before the call, the in-memory session is left unchanged and the
    /// storage error is returned. A successful call also ends a pending
    /// restore, which then has nothing left to load.
    pub async fn sign_in(&self, token: impl Into<String>, user: User) -> Result<()> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Validation("token must not be empty".to_string()));
        }
        user.validate()?;
        let serialized_user = user.to_stored_json()?;

        let _writer = self.writer.lock().await;
        let stored_token = match self.store.get_item(TOKEN_KEY).await {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!("Failed to read stored token before sign-in: {error}");
                self.token()
            }
        };

        if let Err(error) = self.store.set_item(TOKEN_KEY, &token).await {
            tracing::error!("Failed to persist session token: {error}");
            return Err(error.into());
        }
        if let Err(error) = self.store.set_item(USER_KEY, &serialized_user).await {
            tracing::error!("Failed to persist user profile: {error}");
            self.rollback_token(stored_token.as_deref()).await;
            return Err(error.into());
        }

        tracing::info!(user_id = user.id, "Signed in");
        self.session.send_modify(|session| {
            session.token = Some(token);
            session.user = Some(user);
            session.is_loading = false;
        });
        Ok(())
    }

    /// Forget credentials. Storage failures are logged and the in-memory
    /// session is cleared regardless.
    pub async fn sign_out(&self) {
        let _writer = self.writer.lock().await;
        self.delete_stored().await;
        self.session.send_modify(|session| {
            session.token = None;
            session.user = None;
        });
        tracing::info!("Signed out");
    }

    async fn read_stored(&self) -> Result<Option<(String, User)>> {
        let token = self.store.get_item(TOKEN_KEY).await?;
        let raw_user = self.store.get_item(USER_KEY).await?;

        match (token, raw_user) {
            (Some(token), Some(raw_user)) if !token.trim().is_empty() => {
                let user = User::from_stored_json(&raw_user)?;
                Ok(Some((token, user)))
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(Error::MalformedProfile(
                "token stored without a user profile".to_string(),
            )),
            (_, Some(_)) => Err(Error::MalformedProfile(
                "user profile stored without a token".to_string(),
            )),
        }
    }

    async fn delete_stored(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(error) = self.store.delete_item(key).await {
                tracing::warn!("Failed to delete persisted credential: {error}");
            }
        }
    }

    /// Put the token key back to `previous`, deleting it when there was none.
    async fn rollback_token(&self, previous: Option<&str>) {
        let outcome: std::result::Result<(), StorageError> = match previous {
            Some(token) => self.store.set_item(TOKEN_KEY, token).await,
            None => self.store.delete_item(TOKEN_KEY).await,
        };
        if let Err(error) = outcome {
            tracing::warn!("Failed to roll back session token: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::session::persistence::MemoryPersistence;

    fn user() -> User {
        User::new(1, "A", "a@b.com")
    }

    fn seeded_store(token: &str, user_json: &str) -> MemoryPersistence {
        let store = MemoryPersistence::new();
        store.insert(TOKEN_KEY, token);
        store.insert(USER_KEY, user_json);
        store
    }

    #[tokio::test]
    async fn starts_restoring() {
        let gate = SessionGate::new(MemoryPersistence::new());
        assert_eq!(gate.state(), SessionState::Restoring);
        assert!(gate.snapshot().is_loading);
    }

    #[tokio::test]
    async fn restore_with_valid_credentials_authenticates() {
        let store = seeded_store("tok123", r#"{"id":1,"name":"A","email":"a@b.com"}"#);
        let gate = SessionGate::new(store);

        assert_eq!(gate.restore().await, SessionState::Authenticated);
        let session = gate.snapshot();
        assert_eq!(session.token.as_deref(), Some("tok123"));
        assert_eq!(session.user, Some(user()));
        assert!(!session.is_loading);
    }

    #[tokio::test]
    async fn restore_with_empty_store_is_signed_out() {
        let gate = SessionGate::new(MemoryPersistence::new());
        assert_eq!(gate.restore().await, SessionState::Unauthenticated);
        assert_eq!(gate.snapshot(), Session::signed_out());
    }

    #[tokio::test]
    async fn restore_with_profile_missing_id_forces_sign_out() {
        let store = seeded_store("tok123", r#"{"name":"A","email":"a@b.com"}"#);
        let gate = SessionGate::new(store.clone());

        assert_eq!(gate.restore().await, SessionState::Unauthenticated);
        assert_eq!(gate.snapshot(), Session::signed_out());
        assert_eq!(store.peek(TOKEN_KEY), None);
        assert_eq!(store.peek(USER_KEY), None);
    }

    #[tokio::test]
    async fn restore_with_unparseable_profile_forces_sign_out() {
        let store = seeded_store("tok123", "{not json");
        let gate = SessionGate::new(store);
        assert_eq!(gate.restore().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn restore_with_token_but_no_profile_forces_sign_out() {
        let store = MemoryPersistence::new();
        store.insert(TOKEN_KEY, "tok123");
        let gate = SessionGate::new(store.clone());

        assert_eq!(gate.restore().await, SessionState::Unauthenticated);
        assert_eq!(store.peek(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn restore_read_failure_clears_loading_and_signs_out() {
        let store = seeded_store("tok123", r#"{"id":1,"name":"A","email":"a@b.com"}"#);
        store.fail_reads(TOKEN_KEY, true);
        let gate = SessionGate::new(store.clone());

        assert_eq!(gate.restore().await, SessionState::Unauthenticated);
        assert!(!gate.snapshot().is_loading);
        assert_eq!(store.peek(TOKEN_KEY).as_deref(), Some("tok123"));
    }

    #[tokio::test]
    async fn restore_runs_only_once() {
        let store = MemoryPersistence::new();
        let gate = SessionGate::new(store.clone());
        gate.restore().await;

        store.insert(TOKEN_KEY, "late");
        store.insert(USER_KEY, r#"{"id":1,"name":"A","email":"a@b.com"}"#);
        assert_eq!(gate.restore().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn sign_in_then_fresh_restore_roundtrips() {
        let store = MemoryPersistence::new();
        let gate = SessionGate::new(store.clone());
        gate.restore().await;
        gate.sign_in("tok123", user()).await.unwrap();
        assert_eq!(gate.state(), SessionState::Authenticated);

        let restarted = SessionGate::new(store);
        assert_eq!(restarted.restore().await, SessionState::Authenticated);
        assert_eq!(restarted.token().as_deref(), Some("tok123"));
        assert_eq!(restarted.user(), Some(user()));
    }

    #[tokio::test]
    async fn sign_in_while_authenticated_overwrites_credentials() {
        let store = MemoryPersistence::new();
        let gate = SessionGate::new(store.clone());
        gate.restore().await;
        gate.sign_in("first", user()).await.unwrap();
        gate.sign_in("second", User::new(2, "B", "b@c.com"))
            .await
            .unwrap();

        assert_eq!(gate.token().as_deref(), Some("second"));
        assert_eq!(gate.user().map(|user| user.id), Some(2));
        assert_eq!(store.peek(TOKEN_KEY).as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn sign_in_rejects_invalid_input_without_touching_state() {
        let store = MemoryPersistence::new();
        let gate = SessionGate::new(store.clone());
        gate.restore().await;

        let error = gate.sign_in("  ", user()).await.unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
        let error = gate
            .sign_in("tok", User::new(0, "A", "a@b.com"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Validation(_)));

        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert_eq!(store.peek(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn sign_in_profile_write_failure_rolls_back() {
        let store = MemoryPersistence::new();
        store.fail_writes(USER_KEY, true);
        let gate = SessionGate::new(store.clone());
        gate.restore().await;

        let error = gate.sign_in("tok123", user()).await.unwrap_err();
        assert!(matches!(error, Error::Storage(_)));
        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert_eq!(store.peek(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn sign_in_before_restore_rolls_back_to_stored_token() {
        let store = seeded_store("tokA", r#"{"id":1,"name":"A","email":"a@b.com"}"#);
        store.fail_writes(USER_KEY, true);
        let gate = SessionGate::new(store.clone());

        assert!(gate.sign_in("tokB", user()).await.is_err());
        assert_eq!(store.peek(TOKEN_KEY).as_deref(), Some("tokA"));
        assert_eq!(gate.state(), SessionState::Restoring);

        store.fail_writes(USER_KEY, false);
        let fresh = SessionGate::new(store);
        assert_eq!(fresh.restore().await, SessionState::Authenticated);
        assert_eq!(fresh.token().as_deref(), Some("tokA"));
    }

    #[tokio::test]
    async fn sign_in_before_restore_ends_loading() {
        let store = seeded_store("old", r#"{"id":9,"name":"Z","email":"z@b.com"}"#);
        let gate = SessionGate::new(store.clone());

        gate.sign_in("tok123", user()).await.unwrap();
        let session = gate.snapshot();
        assert!(!session.is_loading);
        assert_eq!(gate.state(), SessionState::Authenticated);
        assert_eq!(
            gate.evaluate_redirect(&["auth", "login"]),
            RedirectDecision::RedirectToHome
        );

        assert_eq!(gate.restore().await, SessionState::Authenticated);
        assert_eq!(gate.token().as_deref(), Some("tok123"));
        assert_eq!(gate.user(), Some(user()));
    }

    #[tokio::test]
    async fn failed_reauthentication_keeps_previous_credentials() {
        let store = MemoryPersistence::new();
        let gate = SessionGate::new(store.clone());
        gate.restore().await;
        gate.sign_in("first", user()).await.unwrap();

        store.fail_writes(USER_KEY, true);
        assert!(gate
            .sign_in("second", User::new(2, "B", "b@c.com"))
            .await
            .is_err());

        assert_eq!(gate.token().as_deref(), Some("first"));
        assert_eq!(store.peek(TOKEN_KEY).as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn sign_out_twice_is_idempotent() {
        let store = MemoryPersistence::new();
        let gate = SessionGate::new(store.clone());
        gate.restore().await;
        gate.sign_in("tok123", user()).await.unwrap();

        gate.sign_out().await;
        let first = gate.snapshot();
        gate.sign_out().await;

        assert_eq!(first, Session::signed_out());
        assert_eq!(gate.snapshot(), first);
        assert_eq!(store.peek(TOKEN_KEY), None);
        assert_eq!(store.peek(USER_KEY), None);
    }

    #[tokio::test]
    async fn sign_out_clears_memory_even_when_delete_fails() {
        let store = MemoryPersistence::new();
        let gate = SessionGate::new(store.clone());
        gate.restore().await;
        gate.sign_in("tok123", user()).await.unwrap();

        store.fail_deletes(TOKEN_KEY, true);
        gate.sign_out().await;

        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert_eq!(store.peek(USER_KEY), None);
    }

    #[tokio::test]
    async fn sign_out_then_restore_is_signed_out() {
        let store = MemoryPersistence::new();
        let gate = SessionGate::new(store.clone());
        gate.restore().await;
        gate.sign_in("tok123", user()).await.unwrap();
        gate.sign_out().await;

        let restarted = SessionGate::new(store);
        assert_eq!(restarted.restore().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn subscribers_observe_each_transition() {
        let gate = SessionGate::new(MemoryPersistence::new());
        let mut receiver = gate.subscribe();
        assert_eq!(receiver.borrow_and_update().state(), SessionState::Restoring);

        gate.restore().await;
        assert!(receiver.has_changed().unwrap());
        assert_eq!(
            receiver.borrow_and_update().state(),
            SessionState::Unauthenticated
        );

        gate.sign_in("tok123", user()).await.unwrap();
        assert!(receiver.has_changed().unwrap());
        assert_eq!(
            receiver.borrow_and_update().state(),
            SessionState::Authenticated
        );
    }
}
