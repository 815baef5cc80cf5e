use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use market_data_ingestor::{
    models::{period::QuickPeriod, profile::ProfileField},
    providers::build_provider,
};
use stock_dashboard::{
    Dashboard, DashboardError, Session,
    config::{DashboardConfig, LogFormat, LoggingSettings},
    export::{export_forecast, export_historical},
    pipeline::{AnalysisRequest, PredictionRequest},
    validation::{ChartType, DateRange, IndicatorKind},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Stock analysis and ARIMA forecasting")]
struct Cli {
    /// Configuration file (defaults to ./stock_dashboard.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Company profile and key financials.
    Info { ticker: String },
    /// Price history, indicators and recent data.
    Analyze(AnalyzeArgs),
    /// ARIMA forecast of the closing price.
    Predict(PredictArgs),
    /// Print the default configuration.
    Config,
}

#[derive(Args)]
struct RangeArgs {
    ticker: String,
    /// First day (YYYY-MM-DD); one year before --end by default.
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day, inclusive (YYYY-MM-DD); today by default.
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Write the CSV export to the configured directory.
    #[arg(long)]
    export: bool,
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    range: RangeArgs,
    /// candle or line.
    #[arg(long, default_value = "candle")]
    chart: ChartType,
    /// none, rsi, ma or macd.
    #[arg(long, default_value = "none")]
    indicator: IndicatorKind,
    /// Quick period for the history chart: 5d, 1mo, 6mo, ytd, 1y, 5y or max.
    #[arg(long)]
    period: Option<QuickPeriod>,
    #[arg(long)]
    ma_window: Option<NonZeroUsize>,
    #[arg(long)]
    lookback_days: Option<u32>,
}

#[derive(Args)]
struct PredictArgs {
    #[command(flatten)]
    range: RangeArgs,
    /// Business days to forecast.
    #[arg(long)]
    days: Option<NonZeroUsize>,
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::new(&logging.level);
    match logging.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn resolve_range(args: &RangeArgs, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), DashboardError> {
    let end = args.end.unwrap_or(today);
    let start = match args.start {
        Some(start) => start,
        None => DateRange::last_year(end)?.start(),
    };
    Ok((start, end))
}

async fn run(cli: Cli, config: DashboardConfig) -> Result<()> {
    let today = Local::now().date_naive();
    let mut settings = config.analysis;

    match cli.cmd {
        Cmd::Config => {
            print!("{}", DashboardConfig::default_toml()?);
        }
        Cmd::Info { ticker } => {
            let dashboard = Dashboard::new(build_provider(&config.provider).map_err(DashboardError::from)?, settings);
            let profile = dashboard.profile(&ticker).await?;
            println!("== {} ==", profile.symbol);
            for (field, value) in profile.iter() {
                if field != ProfileField::LongBusinessSummary {
                    println!("{:<18} {value}", field.label());
                }
            }
            println!();
            println!("{}", profile.get(ProfileField::LongBusinessSummary));
        }
        Cmd::Analyze(args) => {
            if let Some(window) = args.ma_window {
                settings.ma_window = window;
            }
            if let Some(days) = args.lookback_days {
                settings.lookback_days = days;
            }
            settings
                .validate()
                .map_err(|e| DashboardError::InvalidInput(e.to_string()))?;

            let (start, end) = resolve_range(&args.range, today)?;
            let session = args.period.map_or_else(Session::new, Session::with_period);
            let dashboard = Dashboard::new(build_provider(&config.provider).map_err(DashboardError::from)?, settings);
            let request = AnalysisRequest {
                ticker: args.range.ticker,
                start,
                end,
                chart: args.chart,
                indicator: args.indicator,
                today,
            };
            let report = dashboard.analyze(&session, &request).await?;
            print!("{report}");

            if args.range.export {
                let path = export_historical(&config.export.dir, &report)
                    .await
                    .context("historical CSV export failed")?;
                println!("\nwrote {}", path.display());
            }
        }
        Cmd::Predict(args) => {
            let (start, end) = resolve_range(&args.range, today)?;
            let dashboard = Dashboard::new(build_provider(&config.provider).map_err(DashboardError::from)?, settings);
            let request = PredictionRequest {
                ticker: args.range.ticker,
                start,
                end,
                horizon: args.days,
                today,
            };
            let report = dashboard.predict(&request).await?;
            print!("{report}");

            if args.range.export {
                if let Ok(forecast) = &report.forecast {
                    let path = export_forecast(&config.export.dir, &report.symbol, &forecast.points)
                        .await
                        .context("forecast CSV export failed")?;
                    println!("\nwrote {}", path.display());
                }
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match DashboardConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let err = DashboardError::from(e);
            eprintln!("error: {err}");
            return ExitCode::from(err.exit_code());
        }
    };
    init_tracing(&config.logging);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err.downcast_ref::<DashboardError>().map_or(1, DashboardError::exit_code);
            ExitCode::from(code)
        }
    }
}
