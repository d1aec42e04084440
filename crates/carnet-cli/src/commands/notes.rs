use carnet_core::filters::filter_notes;
use carnet_core::models::{CategoryId, Note, NoteDraft, NoteId};
use carnet_core::session::SecurePersistence;

use crate::cli::NoteCommands;
use crate::commands::common::{
    format_note_lines, note_to_list_item, open_context, print_json, render_categories,
};
use crate::context::AppContext;
use crate::error::CliError;

pub async fn run_notes(
    command: NoteCommands,
    global_profile: Option<&str>,
    api_url: Option<&str>,
) -> Result<(), CliError> {
    let context = open_context(global_profile, api_url).await?;
    run_notes_with(&context, command).await
}

pub async fn run_notes_with<P: SecurePersistence>(
    context: &AppContext<P>,
    command: NoteCommands,
) -> Result<(), CliError> {
    match command {
        NoteCommands::List {
            search,
            categories,
            json,
        } => {
            let categories = categories.into_iter().map(CategoryId).collect::<Vec<_>>();
            let notes =
                list_notes(context, search.as_deref().unwrap_or_default(), &categories).await?;
            if json {
                let items = notes.iter().map(note_to_list_item).collect::<Vec<_>>();
                print_json(&items)?;
            } else if notes.is_empty() {
                println!("No notes found.");
            } else {
                for line in format_note_lines(&notes) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        NoteCommands::Show { id, json } => {
            let token = context.require_token("/notes/detail")?;
            let note = context
                .settle(context.api()?.get_note(&token, NoteId(id)).await)
                .await?;
            if json {
                print_json(&note)?;
            } else {
                print_note(&note);
            }
            Ok(())
        }
        NoteCommands::Add {
            title,
            content,
            categories,
        } => {
            let token = context.require_token("/notes/create")?;
            let draft = NoteDraft::new(title, content)
                .with_categories(categories.into_iter().map(CategoryId));
            let created = context
                .settle(context.api()?.create_note(&token, &draft).await)
                .await?;
            match created.data {
                Some(note) => println!("Created note {}", note.id),
                None => println!("{}", created.message.as_deref().unwrap_or("Note created")),
            }
            Ok(())
        }
        NoteCommands::Edit {
            id,
            title,
            content,
            toggle_categories,
        } => {
            if title.is_none() && content.is_none() && toggle_categories.is_empty() {
                return Err(CliError::NothingToEdit);
            }
            let token = context.require_token("/notes/edit")?;
            let api = context.api()?;
            let id = NoteId(id);
            let note = context.settle(api.get_note(&token, id).await).await?;

            let mut draft = NoteDraft::from_note(&note);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(content) = content {
                draft.content = content;
            }
            for category in toggle_categories {
                draft.toggle_category(CategoryId(category));
            }

            context
                .settle(api.update_note(&token, id, &draft).await)
                .await?;
            println!("Updated note {id}");
            Ok(())
        }
        NoteCommands::Delete { id } => {
            let token = context.require_token("/notes")?;
            let id = NoteId(id);
            context
                .settle(context.api()?.delete_note(&token, id).await)
                .await?;
            println!("Deleted note {id}");
            Ok(())
        }
    }
}

/// Fetch every note and filter locally by query and categories.
pub async fn list_notes<P: SecurePersistence>(
    context: &AppContext<P>,
    search: &str,
    categories: &[CategoryId],
) -> Result<Vec<Note>, CliError> {
    let token = context.require_token("/notes")?;
    let notes = context
        .settle(context.api()?.list_notes(&token).await)
        .await?;
    Ok(filter_notes(&notes, search, categories))
}

fn print_note(note: &Note) {
    println!("#{} {}", note.id, note.title);
    let categories = render_categories(&note.categories);
    if !categories.is_empty() {
        println!("{categories}");
    }
    if let Some(updated_at) = &note.updated_at {
        println!("Updated {updated_at}");
    }
    println!();
    println!("{}", note.content);
}
