//! Task model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use super::note::NoteId;
use crate::error::{Error, Result};

/// Backend identifier of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TaskId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A checklist item belonging to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl Subtask {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: None,
            description: description.into(),
            is_completed: false,
        }
    }
}

/// Title reference to the note a task is linked to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedNote {
    pub id: NoteId,
    pub title: String,
}

/// A task as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub note_id: Option<NoteId>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub note: Option<LinkedNote>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Task {
    /// Number of completed subtasks and total subtasks
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self
            .subtasks
            .iter()
            .filter(|subtask| subtask.is_completed)
            .count();
        (done, self.subtasks.len())
    }
}

/// Payload for creating or updating a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub description: String,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<NoteId>,
    pub subtasks: Vec<Subtask>,
}

impl TaskDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            description: task.description.clone(),
            is_completed: task.is_completed,
            note_id: task.note_id,
            subtasks: task.subtasks.clone(),
        }
    }

    #[must_use]
    pub fn with_note(mut self, note_id: Option<NoteId>) -> Self {
        self.note_id = note_id;
        self
    }

    #[must_use]
    pub fn with_subtasks<I, S>(mut self, descriptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtasks = descriptions.into_iter().map(Subtask::new).collect();
        self
    }

    /// Remove the subtask at `index`, returning it when the index exists
    pub fn remove_subtask(&mut self, index: usize) -> Option<Subtask> {
        (index < self.subtasks.len()).then(|| self.subtasks.remove(index))
    }

    /// Validate and drop blank subtasks before submission.
    pub fn normalized(mut self) -> Result<Self> {
        if self.description.trim().is_empty() {
            return Err(Error::Validation(
                "task description is required".to_string(),
            ));
        }
        self.subtasks
            .retain(|subtask| !subtask.description.trim().is_empty());
        Ok(self)
    }
}
