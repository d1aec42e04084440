//! Note and task list filtering helpers (search + category/completion filters).

use std::collections::BTreeSet;

use crate::models::{CategoryId, Note, Task};
use crate::util::normalize_query;

/// Filter notes by case-insensitive text query and selected categories.
///
/// A note passes the category filter only when it carries every selected id.
#[must_use]
pub fn filter_notes(notes: &[Note], search_query: &str, categories: &[CategoryId]) -> Vec<Note> {
    let normalized_query = normalize_query(search_query);
    let selected: BTreeSet<CategoryId> = categories.iter().copied().collect();

    notes
        .iter()
        .filter(|note| note_matches_query(note, normalized_query.as_deref()))
        .filter(|note| selected.iter().all(|id| note.has_category(*id)))
        .cloned()
        .collect()
}

/// Filter tasks by case-insensitive description query and completion state.
#[must_use]
pub fn filter_tasks(tasks: &[Task], search_query: &str, show_completed: bool) -> Vec<Task> {
    let normalized_query = normalize_query(search_query);

    tasks
        .iter()
        .filter(|task| task.is_completed == show_completed)
        .filter(|task| match normalized_query.as_deref() {
            Some(query) => task.description.to_lowercase().contains(query),
            None => true,
        })
        .cloned()
        .collect()
}

fn note_matches_query(note: &Note, query: Option<&str>) -> bool {
    let Some(query) = query else {
        return true;
    };
    note.title.to_lowercase().contains(query) || note.content.to_lowercase().contains(query)
}
