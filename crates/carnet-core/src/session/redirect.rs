//! Route guarding driven by session state.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use super::state::Session;

/// First path segment of the unauthenticated screens
pub const AUTH_GROUP: &str = "auth";
/// Target of [`RedirectDecision::RedirectToLogin`]
pub const LOGIN_PATH: &str = "/auth/login";
/// Target of [`RedirectDecision::RedirectToHome`]
pub const HOME_PATH: &str = "/";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectDecision {
    NoRedirect,
    RedirectToLogin,
    RedirectToHome,
}

impl RedirectDecision {
    /// Path the router should be replaced with, if any.
    pub const fn target(self) -> Option<&'static str> {
        match self {
            Self::NoRedirect => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToHome => Some(HOME_PATH),
        }
    }
}

/// Decide whether the screen at `segments` is allowed for `session`.
///
/// Nothing is decided while the session is still restoring.
pub fn evaluate_redirect<S: AsRef<str>>(session: &Session, segments: &[S]) -> RedirectDecision {
    if session.is_loading {
        return RedirectDecision::NoRedirect;
    }

    let in_auth_group = segments
        .first()
        .is_some_and(|segment| segment.as_ref() == AUTH_GROUP);

    match (session.token.is_some(), in_auth_group) {
        (false, false) => RedirectDecision::RedirectToLogin,
        (true, true) => RedirectDecision::RedirectToHome,
        _ => RedirectDecision::NoRedirect,
    }
}

/// Navigation location as path segments, e.g. `["auth", "login"]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Location {
    segments: Vec<String>,
}

impl Location {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `/auth/login`-style paths. Empty segments are ignored.
    pub fn from_path(path: &str) -> Self {
        Self::new(
            path.split('/')
                .map(str::trim)
                .filter(|segment| !segment.is_empty()),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_auth_group(&self) -> bool {
        self.segments
            .first()
            .is_some_and(|segment| segment == AUTH_GROUP)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Navigation subsystem the redirect policy drives.
pub trait ScreenRouter: Send + Sync {
    fn location(&self) -> Location;
    /// Receive every location change, starting from the current one.
    fn subscribe(&self) -> watch::Receiver<Location>;
    /// Swap the current screen without growing history.
    fn replace(&self, path: &str);
    fn push(&self, path: &str);
    fn back(&self);
}

/// History-stack router kept in memory.
#[derive(Clone)]
pub struct MemoryRouter {
    history: Arc<Mutex<Vec<Location>>>,
    current: Arc<watch::Sender<Location>>,
}

impl MemoryRouter {
    pub fn new(initial: Location) -> Self {
        let (current, _) = watch::channel(initial.clone());
        Self {
            history: Arc::new(Mutex::new(vec![initial])),
            current: Arc::new(current),
        }
    }

    pub fn at(path: &str) -> Self {
        Self::new(Location::from_path(path))
    }

    /// Number of entries in the back stack, including the current one.
    pub fn depth(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Location>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, history: &[Location]) {
        if let Some(location) = history.last() {
            self.current.send_replace(location.clone());
        }
    }
}

impl fmt::Debug for MemoryRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRouter")
            .field("history", &*self.lock())
            .finish()
    }
}

impl ScreenRouter for MemoryRouter {
    fn location(&self) -> Location {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Location> {
        self.current.subscribe()
    }

    fn replace(&self, path: &str) {
        let mut history = self.lock();
        history.pop();
        history.push(Location::from_path(path));
        self.publish(&history);
    }

    fn push(&self, path: &str) {
        let mut history = self.lock();
        history.push(Location::from_path(path));
        self.publish(&history);
    }

    fn back(&self) {
        let mut history = self.lock();
        if history.len() > 1 {
            history.pop();
            self.publish(&history);
        }
    }
}

/// Recomputes the redirect decision whenever the session or the location
/// changes and applies it to the router.
pub struct RedirectCoordinator<R: ScreenRouter> {
    router: R,
    session: watch::Receiver<Session>,
    location: watch::Receiver<Location>,
}

impl<R: ScreenRouter> RedirectCoordinator<R> {
    pub fn new(session: watch::Receiver<Session>, router: R) -> Self {
        let location = router.subscribe();
        Self {
            router,
            session,
            location,
        }
    }

    pub const fn router(&self) -> &R {
        &self.router
    }

    /// Evaluate against the latest session and location and navigate if needed.
    pub fn apply(&mut self) -> RedirectDecision {
        let session = self.session.borrow_and_update().clone();
        let location = self.location.borrow_and_update().clone();
        let decision = evaluate_redirect(&session, location.segments());

        if let Some(target) = decision.target() {
            tracing::debug!(from = %location, to = target, "Redirecting");
            self.router.replace(target);
        }
        decision
    }

    /// Apply once, then again on every change until either source closes.
    pub async fn run(mut self) {
        self.apply();
        loop {
            tokio::select! {
                changed = self.session.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = self.location.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            self.apply();
        }
        tracing::debug!("Redirect coordinator stopped");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::User;

    fn authenticated() -> Session {
        Session::authenticated("tok".to_string(), User::new(1, "A", "a@b.com"))
    }

    #[test]
    fn loading_never_redirects() {
        let session = Session::restoring();
        for segments in [vec![], vec!["notes"], vec!["auth", "login"]] {
            assert_eq!(
                evaluate_redirect(&session, &segments),
                RedirectDecision::NoRedirect
            );
        }
    }

    #[test]
    fn guard_rules() {
        let signed_out = Session::signed_out();
        assert_eq!(
            evaluate_redirect(&signed_out, &["notes"]),
            RedirectDecision::RedirectToLogin
        );
        assert_eq!(
            evaluate_redirect(&signed_out, &["auth", "login"]),
            RedirectDecision::NoRedirect
        );
        assert_eq!(
            evaluate_redirect::<&str>(&signed_out, &[]),
            RedirectDecision::RedirectToLogin
        );

        let signed_in = authenticated();
        assert_eq!(
            evaluate_redirect(&signed_in, &["auth", "login"]),
            RedirectDecision::RedirectToHome
        );
        assert_eq!(
            evaluate_redirect(&signed_in, &["notes"]),
            RedirectDecision::NoRedirect
        );
    }

    #[test]
    fn location_parses_paths() {
        let location = Location::from_path("/auth//login/");
        assert_eq!(location.segments(), ["auth", "login"]);
        assert!(location.is_auth_group());
        assert_eq!(location.to_string(), "/auth/login");
        assert_eq!(Location::from_path("/").to_string(), "/");
    }

    #[test]
    fn memory_router_tracks_history() {
        let router = MemoryRouter::at("/notes");
        router.push("/notes/edit");
        assert_eq!(router.depth(), 2);

        router.replace("/tasks");
        assert_eq!(router.depth(), 2);
        assert_eq!(router.location(), Location::from_path("/tasks"));

        router.back();
        router.back();
        assert_eq!(router.depth(), 1);
        assert_eq!(router.location(), Location::from_path("/notes"));
    }

    #[test]
    fn coordinator_redirects_signed_out_user_to_login() {
        let (session_tx, session_rx) = watch::channel(Session::signed_out());
        let router = MemoryRouter::at("/notes");
        let mut coordinator = RedirectCoordinator::new(session_rx, router.clone());

        assert_eq!(coordinator.apply(), RedirectDecision::RedirectToLogin);
        assert_eq!(router.location(), Location::from_path(LOGIN_PATH));
        assert_eq!(coordinator.apply(), RedirectDecision::NoRedirect);

        session_tx.send_replace(authenticated());
        assert_eq!(coordinator.apply(), RedirectDecision::RedirectToHome);
        assert_eq!(router.location(), Location::from_path(HOME_PATH));
        assert_eq!(router.depth(), 1);
    }

    #[tokio::test]
    async fn run_reacts_to_session_and_location_changes() {
        let (session_tx, session_rx) = watch::channel(Session::restoring());
        let router = MemoryRouter::at("/notes");
        let mut observed = router.subscribe();
        let handle = tokio::spawn(RedirectCoordinator::new(session_rx, router.clone()).run());

        session_tx.send_replace(Session::signed_out());
        wait_for(&mut observed, |location| location.is_auth_group()).await;

        session_tx.send_replace(authenticated());
        wait_for(&mut observed, |location| location.segments().is_empty()).await;

        router.push("/auth/qr-scan");
        wait_for(&mut observed, |location| location.segments().is_empty()).await;

        drop(session_tx);
        handle.await.unwrap();
    }

    async fn wait_for(
        receiver: &mut watch::Receiver<Location>,
        predicate: impl Fn(&Location) -> bool,
    ) {
        tokio::time::timeout(std::time::Duration::from_secs(2), async {
            loop {
                if predicate(&receiver.borrow_and_update()) {
                    return;
                }
                receiver.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
    }
}
