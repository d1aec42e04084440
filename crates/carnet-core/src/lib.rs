//! carnet-core - Core library for Carnet
//!
//! This crate contains the session gate, the data models, and the backend
//! REST client shared by every Carnet frontend.

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod session;
pub mod util;
pub mod validation;

pub use error::{Error, Result, StorageError};
pub use models::{Note, NoteId, Task, TaskId, User};
pub use session::{SessionGate, SessionState};
