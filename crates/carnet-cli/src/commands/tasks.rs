use carnet_core::filters::filter_tasks;
use carnet_core::models::{NoteId, Subtask, Task, TaskDraft, TaskId};
use carnet_core::session::SecurePersistence;

use crate::cli::TaskCommands;
use crate::commands::common::{format_task_lines, open_context, print_json, task_to_list_item};
use crate::context::AppContext;
use crate::error::CliError;

/// Edits applied to an existing task before it is saved.
#[derive(Debug, Default)]
pub struct TaskEdit {
    pub description: Option<String>,
    pub note: Option<i64>,
    pub unlink_note: bool,
    pub add_subtasks: Vec<String>,
    pub remove_subtasks: Vec<usize>,
    pub toggle_subtasks: Vec<usize>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.note.is_none()
            && !self.unlink_note
            && self.add_subtasks.is_empty()
            && self.remove_subtasks.is_empty()
            && self.toggle_subtasks.is_empty()
    }

    /// Positions are 1-based and refer to the task as it was fetched.
    /// Toggles apply before removals so both use the same numbering.
    pub fn apply(self, mut draft: TaskDraft) -> Result<TaskDraft, CliError> {
        if let Some(description) = self.description {
            draft.description = description;
        }
        if self.unlink_note {
            draft.note_id = None;
        } else if let Some(note) = self.note {
            draft.note_id = Some(NoteId(note));
        }

        for position in self.toggle_subtasks {
            let subtask = position
                .checked_sub(1)
                .and_then(|index| draft.subtasks.get_mut(index))
                .ok_or(CliError::SubtaskOutOfRange(position))?;
            subtask.is_completed = !subtask.is_completed;
        }

        let mut removals = self.remove_subtasks;
        removals.sort_unstable();
        removals.dedup();
        for position in removals.into_iter().rev() {
            position
                .checked_sub(1)
                .and_then(|index| draft.remove_subtask(index))
                .ok_or(CliError::SubtaskOutOfRange(position))?;
        }

        draft
            .subtasks
            .extend(self.add_subtasks.into_iter().map(Subtask::new));
        Ok(draft)
    }
}

pub async fn run_tasks(
    command: TaskCommands,
    global_profile: Option<&str>,
    api_url: Option<&str>,
) -> Result<(), CliError> {
    let context = open_context(global_profile, api_url).await?;
    run_tasks_with(&context, command).await
}

pub async fn run_tasks_with<P: SecurePersistence>(
    context: &AppContext<P>,
    command: TaskCommands,
) -> Result<(), CliError> {
    match command {
        TaskCommands::List {
            search,
            completed,
            json,
        } => {
            let tasks = list_tasks(context, search.as_deref().unwrap_or_default(), completed).await?;
            if json {
                let items = tasks.iter().map(task_to_list_item).collect::<Vec<_>>();
                print_json(&items)?;
            } else if tasks.is_empty() {
                println!("No tasks found.");
            } else {
                for line in format_task_lines(&tasks) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        TaskCommands::Show { id, json } => {
            let token = context.require_token("/tasks/detail")?;
            let task = context
                .settle(context.api()?.get_task(&token, TaskId(id)).await)
                .await?;
            if json {
                print_json(&task)?;
            } else {
                print_task(&task);
            }
            Ok(())
        }
        TaskCommands::Add {
            description,
            note,
            subtasks,
        } => {
            let token = context.require_token("/tasks/create")?;
            let draft = TaskDraft::new(description)
                .with_note(note.map(NoteId))
                .with_subtasks(subtasks);
            let created = context
                .settle(context.api()?.create_task(&token, draft).await)
                .await?;
            match created.data {
                Some(task) => println!("Created task {}", task.id),
                None => println!("{}", created.message.as_deref().unwrap_or("Task created")),
            }
            Ok(())
        }
        TaskCommands::Edit {
            id,
            description,
            note,
            unlink_note,
            add_subtasks,
            remove_subtasks,
            toggle_subtasks,
        } => {
            let edit = TaskEdit {
                description,
                note,
                unlink_note,
                add_subtasks,
                remove_subtasks,
                toggle_subtasks,
            };
            if edit.is_empty() {
                return Err(CliError::NothingToEdit);
            }

            let token = context.require_token("/tasks/edit")?;
            let api = context.api()?;
            let id = TaskId(id);
            let task = context.settle(api.get_task(&token, id).await).await?;
            let draft = edit.apply(TaskDraft::from_task(&task))?;
            context
                .settle(api.update_task(&token, id, draft).await)
                .await?;
            println!("Updated task {id}");
            Ok(())
        }
        TaskCommands::Toggle { id } => {
            let token = context.require_token("/tasks")?;
            let id = TaskId(id);
            let toggled = context
                .settle(context.api()?.toggle_task(&token, id).await)
                .await?;
            match toggled.data {
                Some(task) if task.is_completed => println!("Completed task {id}"),
                Some(_) => println!("Reopened task {id}"),
                None => println!("Toggled task {id}"),
            }
            Ok(())
        }
        TaskCommands::Delete { id } => {
            let token = context.require_token("/tasks")?;
            let id = TaskId(id);
            context
                .settle(context.api()?.delete_task(&token, id).await)
                .await?;
            println!("Deleted task {id}");
            Ok(())
        }
    }
}

/// Fetch every task and filter locally by query and completion.
pub async fn list_tasks<P: SecurePersistence>(
    context: &AppContext<P>,
    search: &str,
    show_completed: bool,
) -> Result<Vec<Task>, CliError> {
    let token = context.require_token("/tasks")?;
    let tasks = context
        .settle(context.api()?.list_tasks(&token).await)
        .await?;
    Ok(filter_tasks(&tasks, search, show_completed))
}

fn print_task(task: &Task) {
    let status = if task.is_completed { "done" } else { "open" };
    println!("#{} {} ({status})", task.id, task.description);
    if let Some(note) = &task.note {
        println!("Note: #{} {}", note.id, note.title);
    }
    for (position, subtask) in task.subtasks.iter().enumerate() {
        let marker = if subtask.is_completed { "[x]" } else { "[ ]" };
        println!("  {}. {marker} {}", position + 1, subtask.description);
    }
}
