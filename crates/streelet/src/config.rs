//! CLI configuration: thin wrapper around `streelet_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --insecure, --timeout).

use streelet_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use streelet_config::{
    Config, Profile, config_path, load_config_or_default, resolve_wifi_password, save_config,
    store_wifi_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Apply flag overrides on top of a profile.
fn with_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}

/// Build the `DashboardConfig` for a command: the active profile with
/// flag overrides, or the flags alone when no profile exists.
pub fn build_dashboard_config(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None if global.server.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    Ok(streelet_config::profile_to_dashboard_config(
        &with_overrides(profile, global),
        &cfg.defaults,
    )?)
}
