use carnet_core::api::ApiClient;
use carnet_core::config::{resolve_api_base_url, API_URL_ENV};
use carnet_core::models::{Category, Note, Task};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::config_profiles::CliProfilesConfig;
use crate::context::AppContext;
use crate::error::CliError;
use crate::secure_store::KeyringPersistence;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: i64,
    pub title: String,
    pub preview: String,
    pub categories: Vec<String>,
    pub updated_at: Option<String>,
    pub relative_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskListItem {
    pub id: i64,
    pub description: String,
    pub is_completed: bool,
    pub subtasks_done: usize,
    pub subtasks_total: usize,
    pub note_title: Option<String>,
    pub relative_time: Option<String>,
}

/// Resolve the profile and API URL, then restore the profile's session.
pub async fn open_context(
    profile: Option<&str>,
    api_url: Option<&str>,
) -> Result<AppContext<KeyringPersistence>, CliError> {
    let config = CliProfilesConfig::load()?;
    let profile_name = config.resolve_profile_name(profile);
    let api = resolve_api_base_url(
        api_url.map(str::to_string),
        std::env::var(API_URL_ENV).ok(),
        &config.profile(&profile_name),
    )
    .and_then(|base_url| ApiClient::new(&base_url));

    let store = KeyringPersistence::new(&profile_name);
    Ok(AppContext::open(profile_name, store, api).await)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let title = truncate(&note.title, 30);
            let preview = note_preview(note, 40);
            let relative_time = note_relative_time(note.updated_at.as_deref(), now_ms);
            let categories = render_categories(&note.categories);

            if categories.is_empty() {
                format!("{:>5}  {title:<30}  {preview:<40}  {relative_time}", note.id)
            } else {
                format!(
                    "{:>5}  {title:<30}  {preview:<40}  {relative_time:<10}  {categories}",
                    note.id
                )
            }
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    NoteListItem {
        id: note.id.0,
        title: note.title.clone(),
        preview: note_preview(note, 80),
        categories: note
            .categories
            .iter()
            .map(|category| category.name.clone())
            .collect(),
        updated_at: note.updated_at.clone(),
        relative_time: note
            .updated_at
            .as_deref()
            .and_then(parse_timestamp_ms)
            .map(|timestamp_ms| format_relative_time(timestamp_ms, now_ms)),
    }
}

pub fn format_task_lines(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .map(|task| {
            let marker = if task.is_completed { "[x]" } else { "[ ]" };
            let description = truncate(&task.description, 50);
            let (done, total) = task.subtask_progress();
            let mut line = format!("{:>5}  {marker} {description:<50}", task.id);
            if total > 0 {
                line.push_str(&format!("  {done}/{total}"));
            }
            if let Some(note) = &task.note {
                line.push_str(&format!("  -> {}", note.title));
            }
            line.trim_end().to_string()
        })
        .collect()
}

pub fn task_to_list_item(task: &Task) -> TaskListItem {
    let now_ms = Utc::now().timestamp_millis();
    let (subtasks_done, subtasks_total) = task.subtask_progress();
    TaskListItem {
        id: task.id.0,
        description: task.description.clone(),
        is_completed: task.is_completed,
        subtasks_done,
        subtasks_total,
        note_title: task.note.as_ref().map(|note| note.title.clone()),
        relative_time: task
            .updated_at
            .as_deref()
            .and_then(parse_timestamp_ms)
            .map(|timestamp_ms| format_relative_time(timestamp_ms, now_ms)),
    }
}

pub fn format_category_lines(categories: &[Category]) -> Vec<String> {
    categories
        .iter()
        .map(|category| {
            let color = category.color.as_deref().unwrap_or("-");
            format!("{:>5}  {color:<8}  {}", category.id, category.name)
        })
        .collect()
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content_preview(usize::MAX);
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, max_chars)
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = value.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn render_categories(categories: &[Category]) -> String {
    let mut names = categories
        .iter()
        .map(|category| format!("#{}", category.name))
        .collect::<Vec<_>>();
    names.sort();
    names.join(" ")
}

fn note_relative_time(updated_at: Option<&str>, now_ms: i64) -> String {
    updated_at
        .and_then(parse_timestamp_ms)
        .map_or_else(String::new, |timestamp_ms| {
            format_relative_time(timestamp_ms, now_ms)
        })
}

/// Parse backend timestamps, either RFC 3339 or `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn parse_timestamp_ms(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|date_time| date_time.timestamp_millis())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|date_time| date_time.and_utc().timestamp_millis())
        })
        .ok()
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
