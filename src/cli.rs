use crate::types::{Activity, ExtractConfig};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

const DEFAULT_EXPORT: &str = "data/export.xml";

#[derive(Parser, Debug)]
#[command(
    name = "hkexport",
    about = "Extract cycling or running workouts from an Apple Health export into CSV"
)]
pub struct Cli {
    /// Path to `export.xml`, the Health app's `export.zip`, or an extracted export directory.
    #[arg(value_name = "EXPORT", default_value = DEFAULT_EXPORT)]
    pub export: PathBuf,

    /// Workout activity to extract.
    #[arg(short, long, value_enum, default_value_t = Activity::Running)]
    pub activity: Activity,

    /// Output CSV path.
    ///
    /// Default: data/cycling_workout_data.csv or data/apple_health_workout_running_data.csv
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

impl Cli {
    pub fn into_config(self) -> ExtractConfig {
        let output = self
            .output
            .unwrap_or_else(|| PathBuf::from(self.activity.default_output()));
        ExtractConfig {
            export: self.export,
            output,
            activity: self.activity,
        }
    }
}
