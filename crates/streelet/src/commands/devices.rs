//! Device command handlers.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;

use streelet_core::{
    DashboardConfig, DeleteOutcome, Device, DeviceId, DeviceSync, NewDevice, Snapshot, SyncEvent,
};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{stats, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Topic")]
    topic: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

fn device_row(d: &Arc<Device>, color: bool) -> DeviceRow {
    DeviceRow {
        id: d.id.to_string(),
        name: d.name.clone(),
        status: output::status_label(d.is_online(), color),
        ip: util::or_dash(d.ip.as_deref()),
        topic: util::or_dash(d.topic.as_deref()),
        last_seen: last_seen_label(d.last_seen.as_ref()),
    }
}

fn last_seen_label(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => "-".into(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn render_devices(devices: &[Arc<Device>], global: &GlobalOpts) -> String {
    let color = output::should_color(&global.color);
    output::render_list(
        &global.output,
        devices,
        |d| device_row(d, color),
        |d| d.id.to_string(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &DashboardConfig,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let sync = DeviceSync::new(dashboard)?;

    match args.command {
        DevicesCommand::List => {
            let snap = sync.try_refresh().await?;
            output::print_output(&render_devices(snap.devices(), global), global.quiet);
            Ok(())
        }

        DevicesCommand::Watch { interval } => {
            let interval = interval.map_or(dashboard.poll_interval, Duration::from_millis);
            watch(&sync, interval, global).await
        }

        DevicesCommand::Power { device } => {
            sync.try_refresh().await?;
            let change = sync.toggle_power_by_id(&DeviceId::from(device)).await?;
            let result = PowerResult {
                id: change.id.to_string(),
                action: change.action.to_string(),
                message: change.message,
                device_status: change.device.as_ref().map(|d| d.device_status()),
            };
            let out = output::render_single(
                &global.output,
                &result,
                |r| format!("Device {} switched {}: {}", r.id, r.action, r.message),
                |r| r.message.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Delete { device } => {
            util::ensure_interactive("delete device", global.yes)?;
            let id = DeviceId::from(device);
            let gate = util::PromptGate::new(|prompt: &str| util::confirm(prompt, global.yes));
            match sync.delete_device(&id, &gate).await? {
                DeleteOutcome::Deleted { message } => {
                    output::print_output(&message, global.quiet);
                    Ok(())
                }
                DeleteOutcome::Cancelled => Err(gate.take_failure().unwrap_or_else(|| {
                    CliError::Cancelled {
                        action: format!("Deleting device {id}"),
                    }
                })),
            }
        }

        DevicesCommand::Add {
            device_id,
            topic,
            name,
            ip,
        } => {
            let message = sync
                .add_device(NewDevice {
                    device_id,
                    name,
                    topic,
                    ip,
                })
                .await?;
            output::print_output(&message, global.quiet);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct PowerResult {
    id: String,
    action: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_status: Option<u8>,
}

// ── Watch ───────────────────────────────────────────────────────────

/// Poll until Ctrl-C, redrawing on every snapshot change.
async fn watch(sync: &DeviceSync, interval: Duration, global: &GlobalOpts) -> Result<(), CliError> {
    let mut snapshots = sync.subscribe();
    let mut events = sync.events();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    sync.start_polling(interval).await?;

    loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break,
            snap = snapshots.changed() => {
                let Some(snap) = snap else { break };
                output::print_output(&render_frame(&snap, global), global.quiet);
            }
            event = events.recv() => {
                if let Ok(SyncEvent::RefreshFailed { message }) = event {
                    eprintln!("refresh failed: {message}");
                }
            }
        }
    }

    sync.stop_polling().await;
    Ok(())
}

fn render_frame(snap: &Snapshot, global: &GlobalOpts) -> String {
    match global.output {
        OutputFormat::Table => {
            let clear = if std::io::stdout().is_terminal() {
                "\x1b[2J\x1b[H"
            } else {
                ""
            };
            let updated = snap.refreshed_at().map_or_else(
                || "never".into(),
                |t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string(),
            );
            format!(
                "{clear}{}\n{}\nUpdated {updated}  (Ctrl-C to stop)",
                stats::render_tiles(snap.tiles()),
                render_devices(snap.devices(), global),
            )
        }
        OutputFormat::Plain => render_devices(snap.devices(), global),
        // One document per snapshot, newline-delimited
        _ => output::render_single(
            &OutputFormat::JsonCompact,
            snap,
            |_| String::new(),
            |_| String::new(),
        ),
    }
}
