mod request;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use astrologer_core::{
    AnalyticEphemeris, BirthData, ChartEngine, ChartOptions, ChartRequest, EngineSettings, HouseSystem,
    SiderealMode, SubjectSpec,
};

/// Environment variable naming the engine settings file
const CONFIG_ENV: &str = "ASTROLOGER_CONFIG";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Engine settings (TOML). Falls back to $ASTROLOGER_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the chart here instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Print compact JSON.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the chart described by a request file (.json or .toml).
    Chart {
        #[arg(long)]
        request: PathBuf,
    },
    /// Natal chart of a moment (now unless `--at` is given) at a place.
    Now {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, default_value = "Now")]
        name: String,

        /// RFC 3339 timestamp, e.g. 2024-05-01T12:00:00Z
        #[arg(long)]
        at: Option<String>,

        /// House system name or letter (placidus, koch, W, ...)
        #[arg(long)]
        houses: Option<String>,

        /// Sidereal mode; selects the sidereal zodiac
        #[arg(long)]
        sidereal: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?;
    let engine = ChartEngine::new(Arc::new(AnalyticEphemeris::new()), settings);
    info!("Using {} ephemeris", engine.provider_name());

    let request = match args.command {
        Command::Chart { request: path } => request::load_request(&path)?,
        Command::Now {
            lat,
            lon,
            name,
            at,
            houses,
            sidereal,
        } => now_request(name, lat, lon, at.as_deref(), houses.as_deref(), sidereal.as_deref())?,
    };

    let chart = engine
        .compute_chart_async(request)
        .await
        .map_err(|err| {
            if err.is_retryable() {
                warn!("Chart failed with a transient error; the request may be retried");
            }
            err
        })
        .context("Chart computation failed")?;

    let text = if args.compact {
        serde_json::to_string(&chart)?
    } else {
        serde_json::to_string_pretty(&chart)?
    };
    match args.out {
        Some(path) => {
            std::fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Chart written to {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn load_settings(flag: Option<&Path>) -> anyhow::Result<EngineSettings> {
    let path = flag
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => {
            let settings = EngineSettings::load(&path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?;
            info!("Loaded settings from {}", path.display());
            Ok(settings)
        }
        None => Ok(EngineSettings::default()),
    }
}

fn now_request(
    name: String,
    lat: f64,
    lon: f64,
    at: Option<&str>,
    houses: Option<&str>,
    sidereal: Option<&str>,
) -> anyhow::Result<ChartRequest> {
    let subject = match at {
        Some(at) => {
            let utc: DateTime<Utc> = DateTime::parse_from_rfc3339(at)
                .with_context(|| format!("`--at {at}` is not an RFC 3339 timestamp"))?
                .with_timezone(&Utc);
            SubjectSpec::new(name, BirthData::from_utc(utc, lat, lon))
        }
        None => SubjectSpec::now(name, lat, lon),
    };

    let mut options = match sidereal {
        Some(mode) => ChartOptions::sidereal(mode.parse::<SiderealMode>()?),
        None => ChartOptions::default(),
    };
    if let Some(system) = houses {
        options = options.with_house_system(system.parse::<HouseSystem>()?);
    }
    Ok(ChartRequest::natal(subject, options))
}
