use carnet_core::api::Credentials;
use carnet_core::session::SecurePersistence;

use crate::cli::AuthCommands;
use crate::commands::common::open_context;
use crate::context::{AppContext, ScreenAccess};
use crate::error::CliError;

pub async fn run_auth(
    command: AuthCommands,
    global_profile: Option<&str>,
    api_url: Option<&str>,
) -> Result<(), CliError> {
    let context = open_context(global_profile, api_url).await?;
    run_auth_with(&context, command).await
}

pub async fn run_auth_with<P: SecurePersistence>(
    context: &AppContext<P>,
    command: AuthCommands,
) -> Result<(), CliError> {
    let profile_name = context.profile_name();
    match command {
        AuthCommands::Login {
            email,
            password,
            force,
        } => {
            if !should_sign_in(context, "/auth/login", force)? {
                return Ok(());
            }
            let credentials = context.api()?.login(&email, &password).await?;
            complete_sign_in(context, credentials).await
        }
        AuthCommands::Qr { url, force } => {
            if !should_sign_in(context, "/auth/qr-scan", force)? {
                return Ok(());
            }
            let credentials = context.api()?.qr_login(&url).await?;
            complete_sign_in(context, credentials).await
        }
        AuthCommands::Status => {
            if let Some(user) = context.gate().user() {
                println!(
                    "Profile '{profile_name}' is signed in as {} <{}>",
                    user.label(),
                    user.email
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            context.gate().sign_out().await;
            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}

/// Auth screens bounce signed-in users home unless `force` is set.
fn should_sign_in<P: SecurePersistence>(
    context: &AppContext<P>,
    path: &str,
    force: bool,
) -> Result<bool, CliError> {
    match context.enter(path)? {
        ScreenAccess::AlreadySignedIn(user) if !force => {
            println!(
                "Profile '{}' is already signed in as {}. Pass --force to sign in again.",
                context.profile_name(),
                user.email
            );
            Ok(false)
        }
        _ => Ok(true),
    }
}

async fn complete_sign_in<P: SecurePersistence>(
    context: &AppContext<P>,
    credentials: Credentials,
) -> Result<(), CliError> {
    let Credentials {
        access_token,
        user,
    } = credentials;
    let email = user.email.clone();
    context.gate().sign_in(access_token, user).await?;
    println!("Signed in profile '{}' as {email}", context.profile_name());
    Ok(())
}
