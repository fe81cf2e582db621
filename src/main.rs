mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use eframe::egui;

use app::CensusDashboardApp;
use census_dashboard::data::filter::FilterSelection;
use census_dashboard::data::loader;
use census_dashboard::report::DashboardReport;
use census_dashboard::{DashboardConfig, DashboardSession};
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "census-dashboard")]
#[command(about = "Filter the adult census income extract and chart income by group")]
#[command(version)]
struct Args {
    /// Dataset file (.csv, .json, .parquet); overrides `data_path` from the config
    data: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the views for the given filters as JSON instead of opening a window
    #[arg(long)]
    report: bool,

    /// Filter as COLUMN=VALUE, e.g. `--filter sex=Male` (repeatable)
    #[arg(short, long = "filter", value_name = "COLUMN=VALUE")]
    filters: Vec<String>,
}

fn parse_filter_arg(arg: &str) -> Result<(String, String)> {
    let (column, value) = arg
        .split_once('=')
        .with_context(|| format!("filter '{arg}' is not of the form COLUMN=VALUE"))?;
    Ok((column.trim().to_string(), value.trim().to_string()))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    let explicit_data = args.data.is_some();
    if let Some(path) = args.data {
        config.data_path = path;
    }

    let filters = args
        .filters
        .iter()
        .map(|f| parse_filter_arg(f))
        .collect::<Result<Vec<_>>>()?;

    if args.report {
        run_report(&config, &filters)
    } else {
        run_window(config, &filters, explicit_data)
    }
}

fn load_session(config: &DashboardConfig) -> Result<DashboardSession> {
    let dataset = loader::load_file(&config.data_path, &config.load_options())
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    DashboardSession::new(Arc::new(dataset), config).context("setting up filters")
}

fn run_report(config: &DashboardConfig, filters: &[(String, String)]) -> Result<()> {
    let mut session = load_session(config)?;
    let selection: FilterSelection = session.registry().parse_selection(filters.iter().cloned())?;
    session.apply_selection(&selection)?;

    let report = DashboardReport::from_session(&config.title, &session);
    println!("{}", report.to_json()?);
    Ok(())
}

fn run_window(config: DashboardConfig, filters: &[(String, String)], explicit_data: bool) -> Result<()> {
    let title = config.title.clone();
    let mut state = AppState::new(config);

    // Without an explicit path a missing default file just means "open one".
    if explicit_data || state.config.data_path.exists() {
        let dataset = loader::load_file(&state.config.data_path, &state.config.load_options())
            .with_context(|| format!("loading {}", state.config.data_path.display()))?;
        state.set_dataset(dataset).context("setting up filters")?;
        if let Some(session) = &state.session {
            let selection = session.registry().parse_selection(filters.iter().cloned())?;
            state.apply_selection(&selection)?;
        }
    } else {
        log::info!(
            "{} not found, starting without a dataset",
            state.config.data_path.display()
        );
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(CensusDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("window error: {e}"))
}
