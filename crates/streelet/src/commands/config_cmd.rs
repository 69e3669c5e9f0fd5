//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Confirm, Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the WiFi password.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "poll_interval_ms = {}", cfg.defaults.poll_interval_ms);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ms) = p.poll_interval_ms {
            let _ = writeln!(out, "poll_interval_ms = {ms}");
        }
        if let Some(secs) = p.redirect_delay_secs {
            let _ = writeln!(out, "redirect_delay_secs = {secs}");
        }
        if let Some(ref target) = p.redirect_target {
            let _ = writeln!(out, "redirect_target = \"{target}\"");
        }
        if let Some(ref ssid) = p.wifi_ssid {
            let _ = writeln!(out, "wifi_ssid = \"{ssid}\"");
        }
        if p.wifi_password.is_some() {
            let _ = writeln!(out, "wifi_password = \"****\"");
        }
        if let Some(ref env) = p.wifi_password_env {
            let _ = writeln!(out, "wifi_password_env = \"{env}\"");
        }
    }

    out
}

/// Ask for the WiFi password and where to keep it. Returns the plaintext
/// only when the user chose the config file.
fn prompt_wifi_password(profile_name: &str) -> Result<Option<String>, CliError> {
    let password = Password::new()
        .with_prompt("WiFi password")
        .interact()
        .map_err(util::prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "wifi_password".into(),
            reason: "password cannot be empty".into(),
        });
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the WiFi password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;

    if selection == 0 {
        config::store_wifi_password(profile_name, &password)?;
        eprintln!("   ✓ WiFi password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password))
    }
}

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("✨ streelet configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(util::prompt_err)?;

    let server: String = Input::new()
        .with_prompt("Dashboard URL")
        .default("http://192.168.4.1:5000".into())
        .validate_with(|s: &String| {
            url::Url::parse(s)
                .map(|_| ())
                .map_err(|e| format!("invalid URL: {e}"))
        })
        .interact_text()
        .map_err(util::prompt_err)?;

    let insecure = server.starts_with("https")
        && Confirm::new()
            .with_prompt("Accept self-signed certificates?")
            .default(false)
            .interact()
            .map_err(util::prompt_err)?;

    let ssid: String = Input::new()
        .with_prompt("WiFi SSID for the dashboard host (empty to skip)")
        .allow_empty(true)
        .interact_text()
        .map_err(util::prompt_err)?;
    let (wifi_ssid, wifi_password) = if ssid.trim().is_empty() {
        (None, None)
    } else {
        (Some(ssid), prompt_wifi_password(&profile_name)?)
    };

    let profile = Profile {
        server,
        insecure: insecure.then_some(true),
        wifi_ssid,
        wifi_password,
        ..Profile::default()
    };

    let mut cfg = config::load_config_or_default();
    if cfg.profiles.is_empty() {
        cfg.default_profile = Some(profile_name.clone());
    }
    cfg.profiles.insert(profile_name.clone(), profile);
    let path = config::save_config(&cfg)?;

    eprintln!("\n   ✓ Profile '{profile_name}' saved to {}", path.display());
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            util::ensure_interactive("config init", false)?;
            init()
        }
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            output::print_output(format_config_redacted(&cfg).trim_end(), global.quiet);
            Ok(())
        }
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
