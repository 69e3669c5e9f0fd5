//! WiFi credential handler.

use dialoguer::Password;
use secrecy::SecretString;

use streelet_core::{DashboardConfig, DeviceSync};

use crate::cli::{GlobalOpts, WifiArgs, WifiCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

/// Password from `--password-env`, then the profile chain, then a prompt.
fn resolve_password(
    password_env: Option<&str>,
    profile: Option<(&str, &config::Profile)>,
    yes: bool,
) -> Result<SecretString, CliError> {
    if let Some(var) = password_env {
        return std::env::var(var)
            .map(SecretString::from)
            .map_err(|_| CliError::Validation {
                field: "password-env".into(),
                reason: format!("environment variable {var} is not set"),
            });
    }

    if let Some((name, profile)) = profile {
        if let Ok(secret) = config::resolve_wifi_password(profile, name) {
            return Ok(secret);
        }
    }

    util::ensure_interactive("wifi set", yes)?;
    Password::new()
        .with_prompt("WiFi password")
        .interact()
        .map(SecretString::from)
        .map_err(util::prompt_err)
}

pub async fn handle(
    dashboard: &DashboardConfig,
    args: WifiArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        WifiCommand::Set { ssid, password_env } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.get(&profile_name);

            let ssid = ssid
                .or_else(|| profile.and_then(|p| p.wifi_ssid.clone()))
                .ok_or_else(|| CliError::Validation {
                    field: "ssid".into(),
                    reason: "pass --ssid or set wifi_ssid in the profile".into(),
                })?;
            let password = resolve_password(
                password_env.as_deref(),
                profile.map(|p| (profile_name.as_str(), p)),
                global.yes,
            )?;

            let sync = DeviceSync::new(dashboard)?;
            sync.set_wifi_credentials(&ssid, &password).await?;
            output::print_output(&format!("WiFi credentials sent for '{ssid}'"), global.quiet);
            Ok(())
        }
    }
}
