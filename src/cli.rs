//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::notes_file_adapter::NotesFileAdapter;
use crate::adapters::run_log_csv_adapter::RunLogCsvAdapter;
use crate::domain::backtest::{summarize, BacktestConfig, BacktestResult, Backtester};
use crate::domain::config::{duration_from_minutes, AppConfig};
use crate::domain::config_validation::{validate_app_config, validate_overrides};
use crate::domain::error::EarnsightError;
use crate::domain::notes::NotesStore;
use crate::domain::run_log::format_pct;
use crate::domain::scheduler::{run_backtests, RunOutcome, SystemClock};
use crate::domain::strategy::build_strategy;
use crate::domain::universe::parse_tickers;
use crate::ports::export_port::ResultExportPort;

#[derive(Parser, Debug)]
#[command(name = "earnsight", about = "Earnings-reaction prediction backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Overrides shared by commands that touch market data.
#[derive(Args, Debug, Default, Clone)]
pub struct DataArgs {
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Comma-separated tickers, bypassing universe selection
    #[arg(long)]
    pub tickers: Option<String>,
    /// Directory holding the offline sample data
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Years of earnings history to score
    #[arg(long)]
    pub lookback_years: Option<u32>,
}

/// Scheduler overrides for `backtest`.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Maximum minutes to keep cycling (iterative mode only)
    #[arg(long)]
    pub duration_minutes: Option<f64>,
    /// Repeat cycles until the duration elapses (`false` for one pass)
    #[arg(long)]
    pub iterative: Option<bool>,
    /// Minimum market capitalisation
    #[arg(long)]
    pub market_cap: Option<f64>,
    /// Limit the listing before market-cap filtering
    #[arg(long)]
    pub max_tickers: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run backtest cycles over the ticker universe
    Backtest {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Backtest tickers once and dump every scored event to CSV
    Export {
        #[command(flatten)]
        data: DataArgs,
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,
    },
    /// Append a learning note for future predictions
    AddNote {
        note: String,
        #[arg(long)]
        notes_path: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the most recent notes
    Notes {
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
        #[arg(long)]
        notes_path: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest { data, run } => {
            load_app_config(data.config.as_deref()).and_then(|mut config| {
                apply_data_args(&mut config, &data)?;
                apply_run_args(&mut config, &run)?;
                run_backtest(&config).map(|_| ())
            })
        }
        Command::Export { data, output } => load_app_config(data.config.as_deref())
            .and_then(|mut config| {
                apply_data_args(&mut config, &data)?;
                run_export(&config, &output)
            }),
        Command::AddNote {
            note,
            notes_path,
            config,
        } => load_app_config(config.as_deref())
            .and_then(|config| run_add_note(&note, notes_path.unwrap_or(config.run.notes_path))),
        Command::Notes {
            count,
            notes_path,
            config,
        } => load_app_config(config.as_deref())
            .and_then(|config| run_show_notes(count, notes_path.unwrap_or(config.run.notes_path))),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Defaults, or the validated contents of `path`.
pub fn load_app_config(path: Option<&Path>) -> Result<AppConfig, EarnsightError> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_app_config(&adapter)?;
    AppConfig::from_port(&adapter)
}

/// Layer command-line overrides over the loaded config.
pub fn apply_data_args(config: &mut AppConfig, args: &DataArgs) -> Result<(), EarnsightError> {
    if let Some(dir) = &args.data_dir {
        config.data.sample_data_dir = dir.clone();
    }
    if let Some(years) = args.lookback_years {
        config.data.lookback_years = years;
    }
    if let Some(raw) = args.tickers.as_deref() {
        config.data.tickers = Some(parse_tickers(raw)?);
    }
    validate_overrides(config)
}

/// Layer scheduler overrides, held to the same bounds as the INI file.
pub fn apply_run_args(config: &mut AppConfig, args: &RunArgs) -> Result<(), EarnsightError> {
    if let Some(minutes) = args.duration_minutes {
        config.run.duration = duration_from_minutes(minutes)?;
    }
    if let Some(flag) = args.iterative {
        config.run.iterative = flag;
    }
    if let Some(cap) = args.market_cap {
        config.data.market_cap_threshold = cap;
    }
    if args.max_tickers.is_some() {
        config.data.max_tickers = args.max_tickers;
    }
    validate_overrides(config)
}

fn open_notes(path: PathBuf) -> NotesStore {
    NotesStore::new(Box::new(NotesFileAdapter::new(path)))
}

/// Full scheduler run against the on-disk sample store.
pub fn run_backtest(config: &AppConfig) -> Result<RunOutcome, EarnsightError> {
    let source = CsvAdapter::new(config.data.sample_data_dir.clone());
    let mut notes = open_notes(config.run.notes_path.clone());
    let mut run_log = RunLogCsvAdapter::new(config.run.log_path.clone());
    let clock = SystemClock::new();

    eprintln!(
        "Running {} backtest ({} strategy, data from {})",
        if config.run.iterative { "iterative" } else { "single-pass" },
        config.strategy.kind,
        config.data.sample_data_dir.display()
    );

    let outcome = run_backtests(config, &source, &mut notes, &mut run_log, &clock, None)?;

    match &outcome {
        RunOutcome::EmptyUniverse => {
            eprintln!("No tickers to backtest; wrote a note to {}", config.run.notes_path.display());
        }
        RunOutcome::Completed { cycles, last_cycle } => {
            eprintln!("\n=== Run Summary ===");
            eprintln!("Cycles:           {}", cycles);
            if let Some(report) = last_cycle {
                eprintln!("Tickers:          {}", report.entries.len());
                eprintln!("Avg accuracy:     {}", format_pct(report.average_accuracy));
                for entry in &report.entries {
                    eprintln!("  {}:  {}", entry.symbol, entry.notes);
                }
            }
            eprintln!("\nRun log: {}", config.run.log_path.display());
            eprintln!("Notes:   {}", config.run.notes_path.display());
        }
    }
    Ok(outcome)
}

fn run_export(config: &AppConfig, output: &Path) -> Result<(), EarnsightError> {
    let tickers = match config.data.tickers.clone() {
        Some(t) if !t.is_empty() => t,
        _ => {
            return Err(EarnsightError::ConfigMissing {
                section: "data".into(),
                key: "tickers".into(),
            })
        }
    };
    let results = export_results(config, &tickers, output)?;
    eprintln!("Exported {} results to {}", results.len(), output.display());
    Ok(())
}

/// Single pass over `tickers`, every scored event written to `output`.
pub fn export_results(
    config: &AppConfig,
    tickers: &[String],
    output: &Path,
) -> Result<Vec<BacktestResult>, EarnsightError> {
    let source = CsvAdapter::new(config.data.sample_data_dir.clone());
    let notes = open_notes(config.run.notes_path.clone());
    let bt_config = BacktestConfig {
        lookback_years: config.data.lookback_years,
        as_of: chrono::Utc::now(),
    };
    let mut backtester = Backtester::new(&source, build_strategy(&config.strategy), bt_config);
    backtester.refresh_notes(&notes, config.strategy.notes_window)?;

    let mut all = Vec::new();
    for symbol in tickers {
        let results = backtester.backtest_symbol(symbol)?;
        let summary = summarize(&results);
        eprintln!(
            "  {}:  {} predictions, {} correct, {}",
            symbol,
            summary.total_predictions,
            summary.correct,
            format_pct(summary.accuracy)
        );
        all.extend(results);
    }

    CsvExportAdapter.export(&all, output)?;
    Ok(all)
}

fn run_add_note(note: &str, notes_path: PathBuf) -> Result<(), EarnsightError> {
    let mut notes = open_notes(notes_path.clone());
    notes.append([note])?;
    println!("Saved note to {}", notes_path.display());
    Ok(())
}

fn run_show_notes(count: usize, notes_path: PathBuf) -> Result<(), EarnsightError> {
    let notes = open_notes(notes_path.clone());
    let recent = notes.recent(count)?;
    if recent.is_empty() {
        eprintln!("No notes in {}", notes_path.display());
    }
    for line in &recent {
        println!("{}", line);
    }
    Ok(())
}
