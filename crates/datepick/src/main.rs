//! datepick - date picker engine command-line front end
//!
//! Prints calendar grids, parses dates the way a picker reads its invoker,
//! and runs scripted picker sessions.

mod simulate;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use datepick::DatePicker;
use datepick_core::calendar::{calendar_grid, format_iso};
use datepick_core::date_format::parse_loose;
use datepick_core::{Config, LocaleInfo, logging};

use crate::simulate::{ControlKind, Session, Step};

/// datepick - headless date picker engine
#[derive(Parser, Debug)]
#[command(name = "datepick", version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (uses XDG lookup if not specified)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print example configuration and exit
    #[arg(long)]
    print_example_config: bool,

    /// Validate configuration and exit (returns non-zero on errors)
    #[arg(long)]
    check_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the 6x7 calendar grid for a month
    Grid {
        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
        /// Month 1-12 (defaults to the current month)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Emit JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
    /// Parse a date the way a picker reads its invoker
    Parse {
        /// Text to parse
        text: String,
        /// Only accept the locale display pattern (free-text input rules)
        #[arg(long)]
        strict: bool,
    },
    /// Show the resolved locale, week start and display pattern
    Pattern,
    /// Open a picker on a simulated invoker and replay interactions
    Simulate {
        /// Invoker value before opening
        #[arg(long, default_value = "")]
        value: String,
        /// Invoker kind
        #[arg(long, value_enum, default_value_t = ControlKind::Date)]
        kind: ControlKind,
        /// Minimum date (YYYY-MM-DD)
        #[arg(long)]
        min: Option<String>,
        /// Maximum date (YYYY-MM-DD)
        #[arg(long)]
        max: Option<String>,
        /// Dialog return value on close (empty = cancel)
        #[arg(long, default_value = "ok")]
        close: String,
        /// Emit JSON instead of a summary
        #[arg(long)]
        json: bool,
        /// Steps, e.g. day:2025-04-02 next-month key:shift+PageUp month:3 settle
        steps: Vec<String>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose);

    if args.print_example_config {
        print!("{}", datepick_core::config::DEFAULT_CONFIG_TOML);
        return ExitCode::SUCCESS;
    }

    // If --config is specified, it must exist and be valid (no fallback)
    let load_result = match Config::find_and_load(args.config.as_deref()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref source) = load_result.source {
        info!("Loaded configuration from {:?}", source);
    } else if load_result.used_defaults {
        warn!("Using default configuration (no config file found)");
    }

    let config = load_result.config;

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    debug!("Configuration validated successfully");

    if args.check_config {
        if let Some(ref source) = load_result.source {
            println!("Configuration valid: {}", source.display());
        } else {
            println!("Configuration valid (using defaults)");
        }
        return ExitCode::SUCCESS;
    }

    let locale = match LocaleInfo::from_config(&config.locale) {
        Ok(locale) => locale,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    LocaleInfo::init_global(locale);

    let Some(command) = args.command else {
        print!("{}", config.summary());
        return ExitCode::SUCCESS;
    };

    match handle_command(command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn handle_command(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Grid { year, month, json } => handle_grid(year, month, json),
        Command::Parse { text, strict } => handle_parse(&text, strict),
        Command::Pattern => {
            handle_pattern();
            Ok(())
        }
        Command::Simulate {
            value,
            kind,
            min,
            max,
            close,
            json,
            steps,
        } => {
            let session = Session {
                kind,
                value,
                min,
                max,
            };
            handle_simulate(config, &session, &steps, &close, json)
        }
    }
}

/// Print a month grid, outside-month days in parentheses.
fn handle_grid(year: Option<i32>, month: Option<u32>, json: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());
    let locale = LocaleInfo::global();

    let grid = calendar_grid(year, month, locale.first_day_of_week());
    if grid.is_empty() {
        anyhow::bail!("{}-{:02} is not a valid month", year, month);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
        return Ok(());
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1).context("invalid month")?;
    println!("{}", locale.year_label(first, false));

    let header: Vec<String> = grid[..7]
        .iter()
        .map(|day| format!("{:>4}", locale.weekday_narrow(day.date)))
        .collect();
    println!("{}", header.concat());

    for week in grid.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|day| {
                if day.is_current_month {
                    format!("{:>4}", day.date.day())
                } else {
                    format!("{:>4}", format!("({})", day.date.day()))
                }
            })
            .collect();
        println!("{}", row.concat());
    }
    Ok(())
}

fn handle_parse(text: &str, strict: bool) -> Result<()> {
    let locale = LocaleInfo::global();
    let date = if strict {
        locale.display_format().parse(text)
    } else {
        parse_loose(text, locale.display_format())
    }
    .with_context(|| format!("could not parse '{}'", text))?;

    println!("{}", format_iso(date));
    Ok(())
}

fn handle_pattern() {
    let locale = LocaleInfo::global();
    println!("locale: {}", locale.tag());
    println!("first day of week: {}", locale.first_day_of_week());
    println!("display pattern: {}", locale.display_format().pattern());
}

fn handle_simulate(
    config: Config,
    session: &Session,
    raw_steps: &[String],
    close: &str,
    json: bool,
) -> Result<()> {
    let steps = raw_steps
        .iter()
        .map(|raw| raw.parse::<Step>().map(|step| (raw.clone(), step)))
        .collect::<Result<Vec<_>>>()?;

    let mut picker = DatePicker::new(config, LocaleInfo::global().clone());
    let report = simulate::run(&mut picker, session, &steps, close)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for step in &report.steps {
        match step.outcome {
            Some(outcome) => println!("{:<24} {:?}", step.step, outcome),
            None => println!("{}", step.step),
        }
    }

    if let Some(view) = &report.view {
        println!();
        println!("{}", view.headers.headline);
        println!("{} / {}", view.headers.month_label, view.headers.year_label);
        println!("mode: {:?}", view.mode);
        let selected = view
            .layers
            .iter()
            .flat_map(|layer| &layer.cells)
            .find(|cell| cell.selected);
        if let Some(cell) = selected {
            println!("selected cell: {}", cell.iso);
        }
    }

    println!();
    if report.committed {
        println!("committed: {}", report.invoker_value);
    } else {
        println!("cancelled: invoker keeps {:?}", report.invoker_value);
    }
    Ok(())
}
