use std::env;

use carnet_core::config::{normalize_api_base_url, resolve_api_base_url, API_URL_ENV};

use crate::cli::ConfigCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(
    command: ConfigCommands,
    global_profile: Option<&str>,
    api_url: Option<&str>,
) -> Result<(), CliError> {
    match command {
        ConfigCommands::SetUrl { url, no_activate } => {
            let mut config = CliProfilesConfig::load()?;
            let profile_name = set_profile_url(&mut config, global_profile, &url, no_activate)?;
            let path = config.save()?;
            println!(
                "Profile '{}' now uses {} ({})",
                profile_name,
                config.profile(&profile_name).api_base_url.unwrap_or_default(),
                path.display()
            );
            Ok(())
        }
        ConfigCommands::Show => {
            let config = CliProfilesConfig::load()?;
            let profile_name = config.resolve_profile_name(global_profile);
            println!("Profile: {profile_name}");
            match resolve_api_base_url(
                api_url.map(str::to_string),
                env::var(API_URL_ENV).ok(),
                &config.profile(&profile_name),
            ) {
                Ok(url) => println!("API URL: {url}"),
                Err(error) => println!("API URL: not configured ({error})"),
            }
            Ok(())
        }
    }
}

/// Store a normalized URL on the resolved profile and return its name.
pub fn set_profile_url(
    config: &mut CliProfilesConfig,
    profile: Option<&str>,
    url: &str,
    no_activate: bool,
) -> Result<String, CliError> {
    let profile_name = config.resolve_profile_name(profile);
    let url = normalize_api_base_url(url)?;
    config.profile_mut_or_default(&profile_name).api_base_url = Some(url);
    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }
    Ok(profile_name)
}
