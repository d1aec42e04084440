use carnet_core::models::CategoryDraft;
use carnet_core::session::SecurePersistence;

use crate::cli::CategoryCommands;
use crate::commands::common::{format_category_lines, open_context, print_json};
use crate::context::AppContext;
use crate::error::CliError;

pub async fn run_categories(
    command: CategoryCommands,
    global_profile: Option<&str>,
    api_url: Option<&str>,
) -> Result<(), CliError> {
    let context = open_context(global_profile, api_url).await?;
    run_categories_with(&context, command).await
}

pub async fn run_categories_with<P: SecurePersistence>(
    context: &AppContext<P>,
    command: CategoryCommands,
) -> Result<(), CliError> {
    match command {
        CategoryCommands::List { json } => {
            let token = context.require_token("/notes")?;
            let categories = context
                .settle(context.api()?.list_categories(&token).await)
                .await?;
            if json {
                print_json(&categories)?;
            } else if categories.is_empty() {
                println!("No categories yet.");
            } else {
                for line in format_category_lines(&categories) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        CategoryCommands::Add { name, color } => {
            let token = context.require_token("/notes/create")?;
            let draft = CategoryDraft::new(name, color);
            let created = context
                .settle(context.api()?.create_category(&token, &draft).await)
                .await?;
            match created.data {
                Some(category) => {
                    println!("Created category {} ({})", category.name, category.id);
                }
                None => println!("Created category {}", draft.name),
            }
            Ok(())
        }
    }
}
