//! Interactive provisioning: group, name, submit, then back to the list.

use std::io::IsTerminal;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

use streelet_core::{DashboardConfig, DeviceSync, ProvisioningWizard, WizardOutcome};

use crate::cli::{GlobalOpts, ProvisionArgs};
use crate::error::CliError;
use crate::output;

use super::{devices, util};

const SPINNER_TICK: Duration = Duration::from_millis(80);
const SPINNER_TEMPLATE: &str = "{spinner:.cyan.bold} {msg}";

fn spinner(message: &str, quiet: bool) -> ProgressBar {
    let pb = if quiet || !std::io::stderr().is_terminal() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(SPINNER_TICK);
    pb
}

/// Take the flag value, or ask for it.
fn value_or_prompt(value: Option<String>, prompt: &str, yes: bool) -> Result<String, CliError> {
    if let Some(value) = value {
        return Ok(value);
    }
    util::ensure_interactive("provision", yes)?;
    Input::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(util::prompt_err)
}

pub async fn handle(
    dashboard: &DashboardConfig,
    args: ProvisionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let visited: Arc<Mutex<Option<String>>> = Arc::default();
    let recorder = Arc::clone(&visited);
    let mut wizard = ProvisioningWizard::from_config(dashboard, move |target: &str| {
        if let Ok(mut slot) = recorder.lock() {
            *slot = Some(target.to_owned());
        }
    })?;
    let delay = args
        .redirect_delay
        .map_or(dashboard.redirect_delay, Duration::from_secs);
    wizard = wizard.with_redirect_delay(delay);

    // ── Step 1: group ──
    let group = value_or_prompt(args.group, "Device group", global.yes)?;
    wizard.set_group(group)?;
    wizard.advance()?;

    // ── Step 2: name ──
    let name = value_or_prompt(args.name, "Device name", global.yes)?;
    wizard.set_name(name)?;

    // ── Step 3: submit ──
    let pb = spinner("Sending configuration...", global.quiet);
    let outcome = wizard.submit_configuration().await;
    pb.finish_and_clear();
    let outcome = outcome?;
    let message = wizard.message().unwrap_or_default().to_owned();

    match outcome {
        WizardOutcome::Succeeded => {
            if !global.quiet {
                eprintln!("✓ {message}");
            }
            let pb = spinner(
                &format!("Returning to the device list in {}s...", delay.as_secs()),
                global.quiet,
            );
            let redirected = wizard.wait_for_redirect().await;
            pb.finish_and_clear();
            if !redirected {
                return Ok(());
            }

            let target = visited.lock().ok().and_then(|slot| slot.clone());
            tracing::debug!(?target, "provisioning redirect fired");

            let sync = DeviceSync::new(dashboard)?;
            let snap = sync.try_refresh().await?;
            output::print_output(&devices::render_devices(snap.devices(), global), global.quiet);
            Ok(())
        }
        WizardOutcome::Failed { status } => Err(CliError::ApiError { status, message }),
    }
}
