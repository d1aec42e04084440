//! Authentication session: persistence, state transitions and route guarding.
//!
//! [`SessionGate`] owns the session and is the only component allowed to
//! mutate it. Frontends subscribe to changes and feed them, together with
//! location changes from a [`ScreenRouter`], into a [`RedirectCoordinator`].

mod gate;
mod persistence;
mod redirect;
mod state;

pub use gate::SessionGate;
pub use persistence::{MemoryPersistence, SecurePersistence, StorageResult, TOKEN_KEY, USER_KEY};
pub use redirect::{
    evaluate_redirect, Location, MemoryRouter, RedirectCoordinator, RedirectDecision,
    ScreenRouter, AUTH_GROUP, HOME_PATH, LOGIN_PATH,
};
pub use state::{Session, SessionState};
