use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use transcribe_core::EstimatorSettings;

use super::logging::LogDestination;

const MIN_TICK_MS: u64 = 50;

/// Simulated audio transcription. Pick a file, start a job and watch it finish.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Audio file to select at startup
    pub file: Option<PathBuf>,

    /// Simulated processing time per megabyte of audio
    #[arg(long, default_value_t = 5)]
    pub seconds_per_mb: u64,

    /// Interval between progress updates, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Log more detail (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory that `save` writes transcripts to
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Print state changes as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl AppConfig {
    pub fn estimator_settings(&self) -> EstimatorSettings {
        EstimatorSettings {
            seconds_per_megabyte: self.seconds_per_mb,
            ..EstimatorSettings::default()
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(MIN_TICK_MS))
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
