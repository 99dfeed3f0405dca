//! # Command Line Interface
//!
//! CLI for inspecting the stored snapshot history and derived metrics.

use crate::config::MetricsConfig;
use crate::export::{export_file_name, ExportDocument};
use crate::query::{Metric, MetricsEngine};
use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use snapshot_store::{create_local_store, DailySnapshot, LocalSnapshotStore, SnapshotBackend};
use std::path::PathBuf;

/// Query CLI for the Surely analytics snapshot history
#[derive(Parser)]
#[command(name = "metrics-cli")]
#[command(about = "Query CLI for the Surely analytics snapshot history")]
pub struct Cli {
    /// Path to the dashboard data directory
    #[arg(short, long, default_value = "./data")]
    pub data_path: PathBuf,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the dashboard summary cards
    Summary,
    /// Show user launch metrics
    Launches,
    /// Show advertising metrics
    Ads,
    /// Show the per-day history
    History {
        /// Days to look back
        #[arg(long, default_value = "30")]
        days: u32,
    },
    /// Export the snapshot history to a JSON document
    Export {
        /// Output path (defaults to the dated download file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a previously exported JSON document
    Import {
        /// Path of the document to import
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Wipe the stored history (irreversible)
    ClearHistory {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
    /// Show store status
    Status,
}

/// CLI handler
pub struct CliHandler {
    store: LocalSnapshotStore,
    engine: MetricsEngine,
}

impl CliHandler {
    /// Create new CLI handler
    pub async fn new(data_path: &PathBuf) -> Result<Self> {
        let mut store = create_local_store(data_path)?;
        store.initialize().await?;

        let engine = MetricsEngine::new(MetricsConfig::default().query);

        Ok(Self { store, engine })
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Summary => {
                self.show_summary().await?;
            }
            Commands::Launches => {
                self.show_metric_block("🚀 User Launches", Metric::UserLaunch).await?;
            }
            Commands::Ads => {
                self.show_metric_block("📣 Ad Requests", Metric::AdTotal).await?;
            }
            Commands::History { days } => {
                self.show_history(days).await?;
            }
            Commands::Export { output } => {
                self.export(output).await?;
            }
            Commands::Import { input } => {
                self.import(&input).await?;
            }
            Commands::ClearHistory { yes } => {
                self.clear_history(yes).await?;
            }
            Commands::Status => {
                self.show_status().await?;
            }
        }
        Ok(())
    }

    async fn sorted_history(&self) -> Result<Vec<DailySnapshot>> {
        let mut snapshots = self.store.get_all().await?;
        snapshots.sort_by_key(|s| s.date);
        Ok(snapshots)
    }

    /// Show the dashboard summary cards
    async fn show_summary(&self) -> Result<()> {
        println!("📊 Dashboard Summary");
        println!("{}", "=".repeat(50));

        let snapshots = self.sorted_history().await?;
        let Some(latest) = self.engine.latest(&snapshots) else {
            println!("No data found");
            return Ok(());
        };

        println!("Latest day ({}): {} requests", latest.date, latest.total);
        println!("  Backend: {}, Client: {}", latest.backend, latest.client);

        if let Some(range) = self.engine.date_range(&snapshots) {
            println!("Tracked: {} days ({} to {})", range.days, range.first, range.last);
        }

        let average: u64 = {
            let sum: u64 = snapshots.iter().map(|s| s.total).sum();
            (sum as f64 / snapshots.len() as f64).round() as u64
        };
        println!("Average daily requests: {average}");

        if let Some(peak) = self.engine.all_time_peak(&snapshots) {
            println!("Peak day: {} ({} requests)", peak.date, peak.total);
        }

        println!("Trend: {:?}", self.engine.trend(&snapshots, Metric::Total));

        if let Some(label) = self.engine.growth_for(&snapshots, Metric::Total).label() {
            println!("Day-over-day growth: {label}");
        }

        Ok(())
    }

    /// Show a feature counter card block
    async fn show_metric_block(&self, title: &str, metric: Metric) -> Result<()> {
        println!("{title}");
        println!("{}", "=".repeat(50));

        let snapshots = self.sorted_history().await?;
        let today = Utc::now().date_naive();
        let block = self.engine.metric_block(&snapshots, today, metric);

        println!("All-time: {}", block.all_time);
        println!("Today: {}", block.today);
        println!("7-day average: {}", block.week_average);
        println!("30-day total: {}", block.month_total);

        if metric == Metric::AdTotal {
            if let Some(latest) = self.engine.latest(&snapshots) {
                for (name, count) in self.engine.top_entries(&latest.ad_metrics, 10) {
                    println!("  {name}: {count}");
                }
            }
        }

        Ok(())
    }

    /// Show the per-day history
    async fn show_history(&self, days: u32) -> Result<()> {
        println!("📅 History (last {days} days)");
        println!("{}", "=".repeat(50));

        let snapshots = self.sorted_history().await?;
        let today = Utc::now().date_naive();
        let start = today - chrono::Duration::days(i64::from(days.max(1)) - 1);

        let mut shown = 0;
        for snapshot in snapshots.iter().filter(|s| s.date >= start && s.date <= today) {
            println!(
                "{}  total={:<8} backend={:<8} client={:<8} launches={}",
                snapshot.date, snapshot.total, snapshot.backend, snapshot.client,
                snapshot.user_launch
            );
            shown += 1;
        }

        if shown == 0 {
            println!("No data found");
        }

        Ok(())
    }

    /// Export the history to a JSON document
    async fn export(&self, output: Option<PathBuf>) -> Result<()> {
        let document = ExportDocument::from_store(&self.store).await?;
        let path = output
            .unwrap_or_else(|| PathBuf::from(export_file_name(Utc::now().date_naive())));

        document.write_to(&path).await?;

        println!("✅ Exported {} days to {}", document.total_days, path.display());

        Ok(())
    }

    /// Import a previously exported document
    async fn import(&self, input: &PathBuf) -> Result<()> {
        let document = ExportDocument::read_from(input).await?;
        let imported = document.import_into(&self.store).await?;

        println!("✅ Imported {imported} days from {}", input.display());

        Ok(())
    }

    /// Wipe the stored history behind an explicit confirmation
    async fn clear_history(&self, yes: bool) -> Result<()> {
        if !yes {
            println!("Refusing to clear history: this is irreversible. Re-run with --yes.");
            return Ok(());
        }

        self.store.clear().await?;

        println!("🗑️  History cleared");

        Ok(())
    }

    /// Show store status
    async fn show_status(&self) -> Result<()> {
        println!("📈 Snapshot Store Status");
        println!("{}", "=".repeat(50));

        let count = self.store.count().await?;
        println!("Data directory: {}", self.store.data_dir().display());
        println!("Stored days: {count}");

        let snapshots = self.sorted_history().await?;
        if let Some(range) = self.engine.date_range(&snapshots) {
            println!("Range: {} to {}", range.first, range.last);
        }

        Ok(())
    }
}
