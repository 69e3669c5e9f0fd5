//! Dashboard summary: metric tiles and the online/offline split.

use serde::Serialize;
use tabled::Tabled;

use streelet_core::{ChartSeries, DashboardConfig, DeviceSync, MetricTile};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

const BAR_WIDTH: u64 = 30;

#[derive(Tabled)]
struct TileRow {
    #[tabled(rename = "Metric")]
    title: String,
    #[tabled(rename = "Value")]
    value: u64,
    #[tabled(rename = "")]
    subtitle: String,
}

impl From<&MetricTile> for TileRow {
    fn from(t: &MetricTile) -> Self {
        Self {
            title: t.title.clone(),
            value: t.value,
            subtitle: t.subtitle.clone(),
        }
    }
}

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "Status")]
    label: String,
    #[tabled(rename = "Devices")]
    value: u64,
    #[tabled(rename = "Share")]
    bar: String,
}

#[derive(Serialize)]
struct Stats {
    tiles: Vec<MetricTile>,
    status_distribution: ChartSeries,
}

pub(crate) fn render_tiles(tiles: &[MetricTile]) -> String {
    let rows: Vec<TileRow> = tiles.iter().map(TileRow::from).collect();
    output::render_table(&rows)
}

fn bar(value: u64, total: u64) -> String {
    let filled = (value * BAR_WIDTH).checked_div(total).unwrap_or(0);
    "█".repeat(usize::try_from(filled).unwrap_or(0))
}

fn render_distribution(series: &ChartSeries) -> String {
    let total = series.total();
    let rows: Vec<ShareRow> = series
        .iter()
        .map(|(label, value)| ShareRow {
            label: label.to_owned(),
            value,
            bar: bar(value, total),
        })
        .collect();
    output::render_table(&rows)
}

pub async fn handle(dashboard: &DashboardConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let sync = DeviceSync::new(dashboard)?;
    let snap = sync.try_refresh().await?;

    let stats = Stats {
        tiles: snap.tiles().to_vec(),
        status_distribution: snap.status_chart(),
    };
    let out = output::render_single(
        &global.output,
        &stats,
        |s| {
            format!(
                "{}\n{}",
                render_tiles(&s.tiles),
                render_distribution(&s.status_distribution)
            )
        },
        |s| {
            s.tiles
                .iter()
                .map(|t| format!("{}\t{}", t.title, t.value))
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
