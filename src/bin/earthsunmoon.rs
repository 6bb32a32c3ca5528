//! EarthSunMoon command line tool
//!
//! Computes sub-point time series and manages the installed ephemerides.
//!
//! Usage:
//!   earthsunmoon position --body moon --increment 0:0:10 --duration 1
//!   earthsunmoon ephem list
//!   earthsunmoon ephem select de421.bsp
//!   earthsunmoon ephem info
//!   earthsunmoon ephem install ~/Downloads/de440.bsp

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use earthsunmoon::algorithm::{default_start, PositionAlgorithm};
use earthsunmoon::jplephem::{calendar, SPK};
use earthsunmoon::{CelestialBody, Config, EphemerisSettings, OutputFormat, PositionSampler, TimeSeries};
use tracing_subscriber::EnvFilter;

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Sub-points of the Sun, Moon and planets from JPL ephemerides
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the .bsp files
    #[arg(long, global = true)]
    ephem_dir: Option<PathBuf>,

    /// Settings file persisting the selected ephemeris
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a body's sub-point over time and write it as a point layer
    Position {
        /// Body to track (sun, moon, mercury, ..., pluto)
        #[arg(short, long)]
        body: CelestialBody,

        /// First timestamp, RFC 3339 or "YYYY-MM-DD HH:MM:SS" in UTC
        #[arg(short, long, value_parser = parse_start)]
        start: Option<DateTime<Utc>>,

        /// Spacing as DD:HH:MM:SS
        #[arg(short, long, default_value = "0:0:6")]
        increment: String,

        /// Length as DD:HH:MM:SS
        #[arg(short, long, default_value = "0:2")]
        duration: String,

        /// Output driver: fgb or geojson
        #[arg(short, long, default_value = "fgb")]
        format: OutputFormat,

        /// Directory for the output file
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output file stem, defaults to "<body>position"
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Manage installed ephemerides
    Ephem {
        #[command(subcommand)]
        action: EphemAction,
    },
}

#[derive(Subcommand, Debug)]
enum EphemAction {
    /// List installed .bsp files, marking the active one
    List,

    /// Make an installed file the active ephemeris
    Select { file: String },

    /// Describe an installed file, the active one by default
    Info {
        file: Option<String>,

        /// Also print the file's comment area
        #[arg(short, long, action = ArgAction::SetTrue)]
        comments: bool,
    },

    /// Copy a .bsp file into the ephemeris directory
    Install { path: PathBuf },
}

fn parse_start(text: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid start time {text:?}: {e}"))
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

#[allow(clippy::too_many_arguments)]
fn run_position(
    settings: &mut EphemerisSettings,
    body: CelestialBody,
    start: Option<DateTime<Utc>>,
    increment: &str,
    duration: &str,
    format: OutputFormat,
    output_dir: PathBuf,
    name: Option<String>,
) -> Result<()> {
    let series = TimeSeries::parse(increment, duration)?;
    let sampler = PositionSampler::from_timeseries(start.unwrap_or_else(default_start), &series);
    let algorithm = PositionAlgorithm::new(body, sampler);

    let table = algorithm.process(settings)?;
    let stem = name.unwrap_or_else(|| algorithm.name());
    let path = earthsunmoon::export::write(&table, &stem, format, &output_dir)?;
    println!("{} positions of {} -> {}", table.len(), body, path.display());
    Ok(())
}

fn run_ephem(settings: &mut EphemerisSettings, action: EphemAction) -> Result<()> {
    match action {
        EphemAction::List => {
            let files = settings.list_available();
            if files.is_empty() {
                println!("No ephemerides in {}", settings.ephem_dir().display());
            }
            for file in files {
                let marker = if file == settings.ephem_file() { '*' } else { ' ' };
                println!("{marker} {file}");
            }
        }
        EphemAction::Select { file } => {
            if settings.select_file(&file)? {
                println!("Selected {}", settings.ephem_file());
            } else {
                return Err(format!(
                    "{} is not installed in {}; using {}",
                    file,
                    settings.ephem_dir().display(),
                    settings.ephem_file()
                )
                .into());
            }
        }
        EphemAction::Info { file, comments } => {
            let file = file.unwrap_or_else(|| settings.ephem_file().to_string());
            let text = settings.describe_file(&file);
            if text.is_empty() {
                return Err(format!("Cannot read {}", settings.ephem_dir().join(&file).display()).into());
            }
            println!("{text}");

            let spk = SPK::open(settings.ephem_dir().join(&file))?;
            if let Some((start, end)) = spk.coverage() {
                print_section_header("Overall Time Coverage");
                println!(
                    "{} to {} ({:.1} years)",
                    calendar::format_date(start),
                    calendar::format_date(end),
                    (end - start) / 365.25
                );
            }
            if comments {
                print_section_header("File Comments");
                println!("{}", spk.comments()?);
            }
        }
        EphemAction::Install { path } => {
            let name = settings.install_file(&path)?;
            println!("Installed {} into {}", name, settings.ephem_dir().display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()
        .ephem_dir_override(args.ephem_dir)
        .settings_override(args.settings);
    let mut settings = config.open_settings()?;

    match args.command {
        Command::Position {
            body,
            start,
            increment,
            duration,
            format,
            output_dir,
            name,
        } => run_position(
            &mut settings,
            body,
            start,
            &increment,
            &duration,
            format,
            output_dir,
            name,
        ),
        Command::Ephem { action } => run_ephem(&mut settings, action),
    }
}
