//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use super::category::{Category, CategoryId};
use crate::error::{Error, Result};

/// Backend identifier of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A note as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Categories attached to the note
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Note {
    /// Check whether the note carries the given category
    #[must_use]
    pub fn has_category(&self, id: CategoryId) -> bool {
        self.categories.iter().any(|category| category.id == id)
    }

    /// First line of the content, truncated to `max_len` characters
    #[must_use]
    pub fn content_preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}

/// Payload for creating or updating a note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    /// Selected category ids
    pub categories: Vec<CategoryId>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            categories: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = CategoryId>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    /// Start an edit from an existing note, keeping its categories selected
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            categories: note.categories.iter().map(|category| category.id).collect(),
        }
    }

    /// Add the category when absent, remove it when present
    pub fn toggle_category(&mut self, id: CategoryId) {
        if let Some(position) = self.categories.iter().position(|current| *current == id) {
            self.categories.remove(position);
        } else {
            self.categories.push(id);
        }
    }

    /// Title and content are both required
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("note title is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(Error::Validation("note content is required".to_string()));
        }
        Ok(())
    }
}
