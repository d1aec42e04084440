//! Data models for Carnet

mod category;
mod note;
mod task;
mod user;

pub use category::{Category, CategoryDraft, CategoryId, PREDEFINED_COLORS};
pub use note::{Note, NoteDraft, NoteId};
pub use task::{LinkedNote, Subtask, Task, TaskDraft, TaskId};
pub use user::User;
