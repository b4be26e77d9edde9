//! Automobile Sales Statistics Dashboard
//!
//! Interactive dashboard over the historical automobile sales dataset, with
//! headless `report` and `export` commands for scripting.

use anyhow::{Context, Result};
use autosales_dashboard::charts::{ChartSpec, StaticChartRenderer};
use autosales_dashboard::gui::{DashboardApp, WINDOW_TITLE};
use autosales_dashboard::{compute_report, DashboardConfig, DataLoader, DataSource, ReportMode, Selection};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use eframe::egui;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "autosales_dashboard", version, about = "Automobile Sales Statistics Dashboard")]
struct Cli {
    /// JSON settings file (defaults to ./autosales_dashboard.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset CSV path or http(s) URL, overrides the config
    #[arg(long, global = true)]
    data: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive dashboard window
    Gui,
    /// Print one report as JSON on stdout
    Report {
        #[arg(long, value_enum, default_value_t = ModeArg::Yearly)]
        mode: ModeArg,
        #[arg(long, default_value_t = 1980)]
        year: i32,
        #[arg(long)]
        pretty: bool,
    },
    /// Render one report's charts as PNG files
    Export {
        #[arg(long, value_enum, default_value_t = ModeArg::Yearly)]
        mode: ModeArg,
        #[arg(long, default_value_t = 1980)]
        year: i32,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Yearly,
    Recession,
}

impl From<ModeArg> for ReportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Yearly => ReportMode::Yearly,
            ModeArg::Recession => ReportMode::Recession,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = DashboardConfig::resolve(cli.config.as_deref())?;
    if let Some(data) = cli.data {
        config.data_source = data;
    }

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(config),
        Command::Report { mode, year, pretty } => {
            let selection = Selection::from_inputs(mode.into(), year);
            let table = load_table(&config)?;
            let report = compute_report(&table, selection);
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);
            Ok(())
        }
        Command::Export {
            mode,
            year,
            out,
            width,
            height,
        } => {
            let selection = Selection::from_inputs(mode.into(), year);
            let table = load_table(&config)?;
            let report = compute_report(&table, selection);
            let specs = ChartSpec::for_report(&report);
            let paths = StaticChartRenderer::export_report(
                &specs,
                &out,
                width.unwrap_or(config.chart_width),
                height.unwrap_or(config.chart_height),
            )
            .with_context(|| format!("Failed to export charts to {}", out.display()))?;
            for path in &paths {
                println!("{}", path.display());
            }
            info!(%selection, files = paths.len(), "export finished");
            Ok(())
        }
    }
}

fn load_table(config: &DashboardConfig) -> Result<autosales_dashboard::SalesTable> {
    let loader = DataLoader::new(DataSource::parse(&config.data_source));
    loader
        .load()
        .with_context(|| format!("Failed to load dataset from {}", loader.source()))
}

fn run_gui(config: DashboardConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([1000.0, 650.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}
