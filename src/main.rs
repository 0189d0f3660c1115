use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

use coachrs::logging::init_logging;
use coachrs::normalize::read_json_file;
use coachrs::{
    AdvicePayload, AppConfig, AthleteStateAnalyzer, CoachError, ReadinessLevel, WeatherSnapshot,
};

/// CoachRS - Athlete readiness analysis CLI
///
/// Reads wellness and power-curve exports from a training log, classifies
/// today's readiness and prints the payload for the advice generator.
#[derive(Parser)]
#[command(name = "coachrs")]
#[command(version)]
#[command(about = "Athlete readiness analysis CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a wellness window and power curves
    Analyze {
        /// Wellness export (JSON array of days)
        #[arg(short, long)]
        wellness: PathBuf,

        /// Power-curve export (JSON)
        #[arg(short, long)]
        power_curves: Option<PathBuf>,

        /// Weather snapshot (JSON)
        #[arg(long)]
        weather: Option<PathBuf>,

        /// Analysis date (YYYY-MM-DD), defaults to the latest sample
        #[arg(long)]
        as_of: Option<String>,

        /// Output format (text, json)
        #[arg(short = 'f', long, default_value = "text")]
        format: String,
    },

    /// Manage the configuration file
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Tabled)]
struct MarkerRow {
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Power")]
    watts: String,
    #[tabled(rename = "W/kg")]
    relative: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let config = if config_path.exists() {
        AppConfig::load_from_file(&config_path)?
    } else if cli.config.is_some() {
        return Err(anyhow!("Config file not found: {}", config_path.display()));
    } else {
        AppConfig::default()
    };

    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;

    match cli.command {
        Commands::Analyze {
            wellness,
            power_curves,
            weather,
            as_of,
            format,
        } => run_analyze(&config, &wellness, power_curves.as_deref(), weather.as_deref(), as_of, &format),

        Commands::Config { init, show } => {
            if init {
                if config_path.exists() {
                    println!(
                        "{}",
                        format!("Config already exists: {}", config_path.display()).yellow()
                    );
                } else {
                    AppConfig::default().save_to_file(&config_path)?;
                    println!(
                        "{}",
                        format!("✓ Wrote default config to {}", config_path.display()).green()
                    );
                }
            }
            if show || !init {
                print!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(())
        }
    }
}

fn run_analyze(
    config: &AppConfig,
    wellness: &Path,
    power_curves: Option<&Path>,
    weather: Option<&Path>,
    as_of: Option<String>,
    format: &str,
) -> Result<()> {
    let wellness = read_json_file(wellness).map_err(failure)?;
    let power_curves = match power_curves {
        Some(path) => read_json_file(path).map_err(failure)?,
        None => Value::Array(Vec::new()),
    };
    let weather: Option<WeatherSnapshot> = weather
        .map(|path| -> Result<WeatherSnapshot> {
            let value = read_json_file(path).map_err(failure)?;
            Ok(serde_json::from_value(value)?)
        })
        .transpose()
        .context("Failed to parse weather snapshot")?;
    let as_of = as_of
        .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
        .transpose()
        .context("--as-of must be YYYY-MM-DD")?;

    let analyzer = AthleteStateAnalyzer::from_config(config).map_err(failure)?;
    let report = analyzer
        .analyze_raw(&wellness, &power_curves, as_of)
        .map_err(failure)?;
    let payload = AdvicePayload::assemble(report, weather);

    match format {
        "json" => println!("{}", payload.to_json()?),
        "text" => print_text(&payload),
        other => return Err(anyhow!("Unsupported output format: {}", other)),
    }

    Ok(())
}

/// Log a library error at its severity and turn it into a user-facing message
fn failure(err: CoachError) -> anyhow::Error {
    if err.severity().to_tracing_level() == tracing::Level::ERROR {
        tracing::error!(error = %err, "analysis failed");
    } else {
        tracing::warn!(error = %err, "analysis input rejected");
    }
    anyhow!(err.user_message())
}

fn print_text(payload: &AdvicePayload) {
    let report = &payload.report;
    let verdict = match report.verdict {
        ReadinessLevel::Ok => report.verdict.to_string().green().bold(),
        ReadinessLevel::Caution => report.verdict.to_string().yellow().bold(),
        ReadinessLevel::Alert => report.verdict.to_string().red().bold(),
    };
    println!("{} {} ({})", "Readiness:".bold(), verdict, report.as_of);
    println!("{}", payload.headline.dimmed());

    for alert in &payload.alerts {
        println!("  {} {}", alert.code.to_string().red(), alert.description);
    }

    let rows: Vec<MarkerRow> = report
        .power
        .markers()
        .iter()
        .zip(report.relative_power().iter())
        .map(|((seconds, watts), (_, relative))| MarkerRow {
            duration: format!("{}s", seconds),
            watts: watts
                .map(|w| format!("{:.0} W", w))
                .unwrap_or_else(|| "unknown".to_string()),
            relative: relative
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    println!();
    match &report.power.source {
        Some(source) => println!("{} {}", "Power profile from".bold(), source),
        None => println!("{}", "Power profile unknown".bold()),
    }
    println!("{}", Table::new(rows));
    println!();

    // First line repeats the verdict printed above
    for line in payload.summary_lines().iter().skip(1 + payload.alerts.len()) {
        if !line.starts_with("Power:") {
            println!("{}", line);
        }
    }
}
