//! CLI entry point for the train dashboard.
//!
//! Renders live-board indicators and the next trains for a station, and
//! manages the persisted widget layout.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use train_dashboard::{
    config::Settings,
    fetch::{BasicClient, Identified},
    kpi::KpiAggregator,
    layout::{Column, DashboardLayout, DropTarget, JsonFileStore, LayoutStore, MemoryStore},
    liveboard::Liveboard,
    model::KpiSnapshot,
    output::{DashboardView, render_train_list, to_json},
    trains::{DirectionFilter, TrainList, TrainListState, TrainListView},
};

#[derive(Parser)]
#[command(name = "train_dashboard")]
#[command(about = "Live train indicators for a Belgian railway station", long_about = None)]
struct Cli {
    /// JSON settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the delay and cancellation indicators once
    Kpis {
        /// Station to query (overrides settings)
        #[arg(short, long)]
        station: Option<String>,

        /// Print the snapshot as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List trains to and from the relevant routes over the next two hours
    Trains {
        #[arg(short, long)]
        station: Option<String>,

        /// Include rail-replacement buses
        #[arg(long, default_value_t = false)]
        bus: bool,

        #[arg(short, long, value_enum, default_value_t = DirectionFilter::All)]
        filter: DirectionFilter,
    },
    /// Render the full dashboard, refreshing on the configured interval
    Dashboard {
        #[arg(short, long)]
        station: Option<String>,

        #[arg(long, default_value_t = false)]
        bus: bool,

        #[arg(short, long, value_enum, default_value_t = DirectionFilter::All)]
        filter: DirectionFilter,

        /// Render a single frame and exit
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Inspect or rearrange the widget layout
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },
}

#[derive(Subcommand)]
enum LayoutAction {
    /// Print the current layout
    Show,
    /// Move a widget onto another widget or into a column
    Move {
        id: String,

        /// Widget to drop onto
        #[arg(long, conflicts_with = "column", required_unless_present = "column")]
        onto: Option<String>,

        /// Column to drop into
        #[arg(long, value_enum)]
        column: Option<Column>,
    },
    /// Reorder the KPI cards
    KpiMove {
        id: String,

        #[arg(long)]
        onto: String,
    },
    /// Restore the default layout
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/train_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("train_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Kpis { station, json } => {
            override_station(&mut settings, station)?;
            let board = Arc::new(build_board(&settings)?);
            let aggregator =
                KpiAggregator::new(board, settings.station.clone(), settings.route_matcher()?);

            let cancel = shutdown_token();
            let snapshot = aggregator.refresh(&cancel).await;

            if cancel.is_cancelled() {
                return Ok(());
            }
            if json {
                println!("{}", to_json(&snapshot)?);
            } else {
                println!("Average delay (next hour): {} min", snapshot.average_delay_minutes);
                println!("Cancelled (last 3h): {} %", snapshot.cancel_percent);
            }
        }
        Commands::Trains {
            station,
            bus,
            filter,
        } => {
            override_station(&mut settings, station)?;
            let board = Arc::new(build_board(&settings)?);
            let list = TrainList::new(board, settings.station.clone(), settings.route_matcher()?);

            let cancel = shutdown_token();
            let state = list.refresh(&cancel).await;

            if !cancel.is_cancelled() {
                let view = TrainListView {
                    include_bus: bus,
                    filter,
                };
                println!("{}", render_train_list(&state, &view));
            }
        }
        Commands::Dashboard {
            station,
            bus,
            filter,
            once,
        } => {
            override_station(&mut settings, station)?;
            let view = TrainListView {
                include_bus: bus,
                filter,
            };
            let store = open_store(&settings);
            run_dashboard(&settings, &*store, view, once).await?;
        }
        Commands::Layout { action } => {
            let store = open_store(&settings);
            let mut layout = DashboardLayout::load(&*store);
            run_layout_action(&mut layout, action)?;
        }
    }

    Ok(())
}

fn override_station(settings: &mut Settings, station: Option<String>) -> Result<()> {
    if let Some(station) = station {
        settings.station = station;
    }
    settings.validate()
}

fn build_board(settings: &Settings) -> Result<Liveboard<Identified<BasicClient>>> {
    let client = Identified::new(BasicClient::new()?, &settings.user_agent)
        .context("Invalid user agent")?;
    Ok(Liveboard::new(client, &settings.endpoint, settings.lang.clone())?)
}

fn open_store(settings: &Settings) -> Box<dyn LayoutStore> {
    match &settings.layout_path {
        Some(path) => {
            info!(path = %path.display(), "Using persisted layout");
            Box::new(JsonFileStore::new(path))
        }
        None => Box::new(MemoryStore::default()),
    }
}

/// Cancelled on Ctrl-C. Every fetch cycle runs under a child of this token.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling in-flight requests");
            trigger.cancel();
        }
    });
    token
}

#[tracing::instrument(skip_all, fields(station = %settings.station))]
async fn run_dashboard(
    settings: &Settings,
    store: &dyn LayoutStore,
    view: TrainListView,
    once: bool,
) -> Result<()> {
    let layout = DashboardLayout::load(store);
    let board = Arc::new(build_board(settings)?);
    let matcher = settings.route_matcher()?;
    let aggregator = KpiAggregator::new(board.clone(), settings.station.clone(), matcher.clone());
    let trains = TrainList::new(board, settings.station.clone(), matcher);

    let shutdown = shutdown_token();
    let mut ticker = tokio::time::interval(settings.refresh_interval());
    let mut kpi_updates = aggregator.subscribe();
    let mut train_updates = trains.subscribe();

    let print_frame = |kpis: &watch::Receiver<KpiSnapshot>, list: &watch::Receiver<TrainListState>| {
        let kpis = *kpis.borrow();
        let list = list.borrow().clone();
        let frame = DashboardView {
            now: Utc::now(),
            station: &settings.station,
            columns: layout.columns(),
            kpi_order: layout.kpi_order(),
            kpis,
            trains: &list,
            view,
        };
        println!("{}", frame.render());
    };

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let cycle = shutdown.child_token();
        let now = Utc::now();
        let mut refresh = std::pin::pin!(async {
            tokio::join!(
                aggregator.refresh_at(now, &cycle),
                trains.refresh_at(now, &cycle),
            )
        });

        // Intermediate frames show the loading placeholders.
        loop {
            tokio::select! {
                _ = &mut refresh => break,
                Ok(()) = kpi_updates.changed() => {}
                Ok(()) = train_updates.changed() => {}
            }
            if !cycle.is_cancelled() {
                print_frame(&kpi_updates, &train_updates);
            }
        }
        if cycle.is_cancelled() {
            break;
        }

        kpi_updates.mark_unchanged();
        train_updates.mark_unchanged();
        print_frame(&kpi_updates, &train_updates);

        if once {
            break;
        }
        info!(
            interval_secs = settings.refresh_interval_secs,
            "Waiting before next refresh"
        );
    }

    Ok(())
}

fn run_layout_action<S: LayoutStore>(
    layout: &mut DashboardLayout<S>,
    action: LayoutAction,
) -> Result<()> {
    match action {
        LayoutAction::Show => {}
        LayoutAction::Move { id, onto, column } => {
            let target = match (onto, column) {
                (Some(over), _) => DropTarget::Widget(over),
                (None, Some(column)) => DropTarget::Column(column),
                (None, None) => anyhow::bail!("either --onto or --column is required"),
            };
            if !layout.move_widget(&id, &target)? {
                warn!(id = %id, ?target, "Move had no effect");
            }
        }
        LayoutAction::KpiMove { id, onto } => {
            if !layout.move_kpi_card(&id, &onto)? {
                warn!(id = %id, onto = %onto, "Move had no effect");
            }
        }
        LayoutAction::Reset => layout.reset()?,
    }

    let columns = layout.columns();
    println!("left:  {}", columns.left.join(", "));
    println!("right: {}", columns.right.join(", "));
    println!("kpis:  {}", layout.kpi_order().join(", "));
    Ok(())
}
