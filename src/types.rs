use clap::ValueEnum;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

pub const INDOOR_WORKOUT_KEY: &str = "HKIndoorWorkout";
pub const ELEVATION_ASCENDED_KEY: &str = "HKElevationAscended";
pub const TIME_ZONE_KEY: &str = "HKTimeZone";
pub const WEATHER_HUMIDITY_KEY: &str = "HKWeatherHumidity";
pub const WEATHER_TEMPERATURE_KEY: &str = "HKWeatherTemperature";
pub const AVERAGE_METS_KEY: &str = "HKAverageMETs";

/// Value of `HKIndoorWorkout` that marks an indoor session.
pub const INDOOR_TRUE: &str = "1";

const QUANTITY_TYPE_PREFIX: &str = "HKQuantityTypeIdentifier";

pub const COMMON_COLUMNS: [&str; 15] = [
    "workout_type",
    "duration",
    "duration_unit",
    "source_name",
    "source_version",
    "device",
    "creation_date",
    "start_date",
    "end_date",
    "indoor",
    "elevation_ascended",
    "timezone",
    "weather_humidity",
    "weather_temperature",
    "average_mets",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Activity {
    Cycling,
    Running,
}

impl Activity {
    /// `workoutActivityType` value of matching `<Workout>` elements.
    pub const fn type_tag(self) -> &'static str {
        match self {
            Self::Cycling => "HKWorkoutActivityTypeCycling",
            Self::Running => "HKWorkoutActivityTypeRunning",
        }
    }

    /// Statistics recorded for this activity, in column order.
    pub const fn metrics(self) -> &'static [MetricKind] {
        match self {
            Self::Cycling => &[
                MetricKind::CyclingCadence,
                MetricKind::CyclingPower,
                MetricKind::CyclingSpeed,
                MetricKind::ActiveEnergyBurned,
                MetricKind::BasalEnergyBurned,
                MetricKind::DistanceCycling,
                MetricKind::HeartRate,
            ],
            Self::Running => &[
                MetricKind::StepCount,
                MetricKind::RunningGroundContactTime,
                MetricKind::RunningPower,
                MetricKind::ActiveEnergyBurned,
                MetricKind::BasalEnergyBurned,
                MetricKind::RunningVerticalOscillation,
                MetricKind::RunningSpeed,
                MetricKind::RunningStrideLength,
                MetricKind::DistanceWalkingRunning,
                MetricKind::HeartRate,
            ],
        }
    }

    /// Full CSV header for this activity.
    pub fn columns(self) -> Vec<&'static str> {
        let mut cols = COMMON_COLUMNS.to_vec();
        for kind in self.metrics() {
            cols.extend_from_slice(kind.aggregate().columns());
        }
        cols
    }

    pub const fn default_output(self) -> &'static str {
        match self {
            Self::Cycling => "data/cycling_workout_data.csv",
            Self::Running => "data/apple_health_workout_running_data.csv",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cycling => "cycling",
            Self::Running => "running",
        })
    }
}

/// How a `<WorkoutStatistics>` element maps onto record columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// `average`, `minimum`, `maximum` into three columns.
    Range([&'static str; 3]),
    /// `sum` copied as-is.
    Sum(&'static str),
    /// `sum` formatted as `X.XXkm`.
    Distance(&'static str),
}

impl Aggregate {
    pub const fn columns(&self) -> &[&'static str] {
        match self {
            Self::Range(cols) => cols,
            Self::Sum(col) | Self::Distance(col) => std::slice::from_ref(col),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    HeartRate,
    ActiveEnergyBurned,
    BasalEnergyBurned,
    DistanceCycling,
    CyclingCadence,
    CyclingPower,
    CyclingSpeed,
    DistanceWalkingRunning,
    StepCount,
    RunningGroundContactTime,
    RunningPower,
    RunningVerticalOscillation,
    RunningSpeed,
    RunningStrideLength,
}

impl MetricKind {
    /// Map a statistics `type` attribute (e.g. `HKQuantityTypeIdentifierHeartRate`).
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        let kind = match tag.strip_prefix(QUANTITY_TYPE_PREFIX)? {
            "HeartRate" => Self::HeartRate,
            "ActiveEnergyBurned" => Self::ActiveEnergyBurned,
            "BasalEnergyBurned" => Self::BasalEnergyBurned,
            "DistanceCycling" => Self::DistanceCycling,
            "CyclingCadence" => Self::CyclingCadence,
            "CyclingPower" => Self::CyclingPower,
            "CyclingSpeed" => Self::CyclingSpeed,
            "DistanceWalkingRunning" => Self::DistanceWalkingRunning,
            "StepCount" => Self::StepCount,
            "RunningGroundContactTime" => Self::RunningGroundContactTime,
            "RunningPower" => Self::RunningPower,
            "RunningVerticalOscillation" => Self::RunningVerticalOscillation,
            "RunningSpeed" => Self::RunningSpeed,
            "RunningStrideLength" => Self::RunningStrideLength,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn aggregate(self) -> Aggregate {
        match self {
            Self::HeartRate => {
                Aggregate::Range(["heart_rate_avg", "heart_rate_min", "heart_rate_max"])
            }
            Self::ActiveEnergyBurned => Aggregate::Sum("active_energy_burned"),
            Self::BasalEnergyBurned => Aggregate::Sum("basal_energy_burned"),
            Self::DistanceCycling | Self::DistanceWalkingRunning => Aggregate::Distance("distance"),
            Self::CyclingCadence => Aggregate::Range(["cadence_avg", "cadence_min", "cadence_max"]),
            Self::CyclingPower => Aggregate::Range([
                "cycling_power_avg",
                "cycling_power_min",
                "cycling_power_max",
            ]),
            Self::CyclingSpeed => Aggregate::Range([
                "cycling_speed_avg",
                "cycling_speed_min",
                "cycling_speed_max",
            ]),
            Self::StepCount => Aggregate::Sum("steps"),
            Self::RunningGroundContactTime => Aggregate::Range([
                "ground_contact_time_avg",
                "ground_contact_time_min",
                "ground_contact_time_max",
            ]),
            Self::RunningPower => Aggregate::Range([
                "running_power_avg",
                "running_power_min",
                "running_power_max",
            ]),
            Self::RunningVerticalOscillation => Aggregate::Range([
                "vertical_oscillation_avg",
                "vertical_oscillation_min",
                "vertical_oscillation_max",
            ]),
            Self::RunningSpeed => Aggregate::Range([
                "running_speed_avg",
                "running_speed_min",
                "running_speed_max",
            ]),
            Self::RunningStrideLength => Aggregate::Range([
                "stride_length_avg",
                "stride_length_min",
                "stride_length_max",
            ]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutType {
    Indoor,
    Outdoor,
}

impl WorkoutType {
    pub fn from_indoor_flag(flag: Option<&str>) -> Self {
        if flag == Some(INDOOR_TRUE) {
            Self::Indoor
        } else {
            Self::Outdoor
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indoor => "Indoor",
            Self::Outdoor => "Outdoor",
        }
    }
}

/// A `<MetadataEntry>` directly under a `<Workout>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: Option<String>,
}

/// A `<WorkoutStatistics>` directly under a `<Workout>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistic {
    pub type_tag: Option<String>,
    pub average: Option<String>,
    pub minimum: Option<String>,
    pub maximum: Option<String>,
    pub sum: Option<String>,
}

/// One `<Workout>` element as read from the export, before filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutEntry {
    pub activity_type: Option<String>,
    pub duration: Option<String>,
    pub duration_unit: Option<String>,
    pub source_name: Option<String>,
    pub source_version: Option<String>,
    pub device: Option<String>,
    pub creation_date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,

    pub metadata: Vec<MetadataEntry>,
    pub statistics: Vec<Statistic>,
}

impl WorkoutEntry {
    /// Value of the first metadata entry with `key`.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|m| m.key == key)
            .and_then(|m| m.value.as_deref())
    }
}

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutRecord {
    pub workout_type: WorkoutType,
    pub duration: Option<String>,
    pub duration_unit: Option<String>,
    pub source_name: Option<String>,
    pub source_version: Option<String>,
    pub device: Option<String>,
    pub creation_date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,

    pub indoor: Option<String>,
    pub elevation_ascended: Option<String>,
    pub timezone: Option<String>,
    pub weather_humidity: Option<String>,
    pub weather_temperature: Option<String>,
    pub average_mets: Option<String>,

    /// Activity-specific aggregates keyed by column name.
    pub metrics: HashMap<&'static str, String>,
}

impl WorkoutRecord {
    pub fn field(&self, column: &str) -> Option<&str> {
        match column {
            "workout_type" => Some(self.workout_type.as_str()),
            "duration" => self.duration.as_deref(),
            "duration_unit" => self.duration_unit.as_deref(),
            "source_name" => self.source_name.as_deref(),
            "source_version" => self.source_version.as_deref(),
            "device" => self.device.as_deref(),
            "creation_date" => self.creation_date.as_deref(),
            "start_date" => self.start_date.as_deref(),
            "end_date" => self.end_date.as_deref(),
            "indoor" => self.indoor.as_deref(),
            "elevation_ascended" => self.elevation_ascended.as_deref(),
            "timezone" => self.timezone.as_deref(),
            "weather_humidity" => self.weather_humidity.as_deref(),
            "weather_temperature" => self.weather_temperature.as_deref(),
            "average_mets" => self.average_mets.as_deref(),
            _ => self.metrics.get(column).map(String::as_str),
        }
    }

    /// Overwrite a metric column; `None` clears it.
    pub fn set_metric(&mut self, column: &'static str, value: Option<String>) {
        match value {
            Some(v) => {
                self.metrics.insert(column, v);
            }
            None => {
                self.metrics.remove(column);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// `export.xml`, `export.zip`, or an extracted export directory.
    pub export: PathBuf,
    pub output: PathBuf,
    pub activity: Activity,
}
