use chrono::{DateTime, FixedOffset};
use tracing_subscriber::{EnvFilter, fmt};

use crate::types::WorkoutRecord;

/// Date-time layout used by every `*Date` attribute of the export.
const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Set up the stderr subscriber for an extraction run.
///
/// `hkexport` logs at INFO; every `-v` raises and every `-q` lowers it by
/// one step (DEBUG and TRACE add file/line). Dependencies stay at WARN.
/// A `RUST_LOG` filter replaces all of this.
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,hkexport={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

pub fn parse_export_date(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s.trim(), EXPORT_DATE_FORMAT).ok()
}

/// Earliest and latest parseable `start_date` among `records`.
pub fn start_date_span(
    records: &[WorkoutRecord],
) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let mut dates = records
        .iter()
        .filter_map(|r| r.start_date.as_deref().and_then(parse_export_date));
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}
