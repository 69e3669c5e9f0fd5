//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod provision;
pub mod stats;
pub mod util;
pub mod wifi;

use streelet_core::DashboardConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a dashboard-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &DashboardConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(dashboard, args, global).await,
        Command::Stats => stats::handle(dashboard, global).await,
        Command::Provision(args) => provision::handle(dashboard, args, global).await,
        Command::Wifi(args) => wifi::handle(dashboard, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
