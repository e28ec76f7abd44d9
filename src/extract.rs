use crate::dlog;
use crate::normalize::{clean_device, clean_text, format_distance};
use crate::types::{
    AVERAGE_METS_KEY, Activity, Aggregate, ELEVATION_ASCENDED_KEY, INDOOR_WORKOUT_KEY,
    MetricKind, Statistic, TIME_ZONE_KEY, WEATHER_HUMIDITY_KEY, WEATHER_TEMPERATURE_KEY,
    WorkoutEntry, WorkoutRecord, WorkoutType,
};
use crate::xml::parse_workouts;
use anyhow::{Context, Result};
use std::collections::HashMap;

pub fn extract_from_xml(xml: &[u8], activity: Activity) -> Result<Vec<WorkoutRecord>> {
    let entries = parse_workouts(xml)?;
    extract_workouts(&entries, activity)
}

/// Flatten every entry of `activity` into a record, keeping document order.
pub fn extract_workouts(entries: &[WorkoutEntry], activity: Activity) -> Result<Vec<WorkoutRecord>> {
    let mut out = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        if entry.activity_type.as_deref() != Some(activity.type_tag()) {
            continue;
        }
        let record = extract_record(entry, activity).with_context(|| {
            format!(
                "workout #{idx} starting {}",
                entry.start_date.as_deref().unwrap_or("<unknown>")
            )
        })?;
        out.push(record);
    }

    dlog!(
        "extracted activity={} matched={} skipped={}",
        activity,
        out.len(),
        entries.len() - out.len()
    );
    Ok(out)
}

pub fn extract_record(entry: &WorkoutEntry, activity: Activity) -> Result<WorkoutRecord> {
    let indoor = entry.metadata_value(INDOOR_WORKOUT_KEY);
    let meta = |key: &str| entry.metadata_value(key).map(str::to_owned);

    let mut record = WorkoutRecord {
        workout_type: WorkoutType::from_indoor_flag(indoor),
        duration: entry.duration.clone(),
        duration_unit: entry.duration_unit.clone(),
        source_name: clean_text(entry.source_name.as_deref()),
        source_version: entry.source_version.clone(),
        device: clean_device(entry.device.as_deref()),
        creation_date: entry.creation_date.clone(),
        start_date: entry.start_date.clone(),
        end_date: entry.end_date.clone(),

        indoor: indoor.map(str::to_owned),
        elevation_ascended: meta(ELEVATION_ASCENDED_KEY),
        timezone: meta(TIME_ZONE_KEY),
        weather_humidity: meta(WEATHER_HUMIDITY_KEY),
        weather_temperature: meta(WEATHER_TEMPERATURE_KEY),
        average_mets: meta(AVERAGE_METS_KEY),

        metrics: HashMap::new(),
    };

    for stat in &entry.statistics {
        let Some(tag) = stat.type_tag.as_deref() else {
            continue;
        };
        let Some(kind) =
            MetricKind::from_type_tag(tag).filter(|k| activity.metrics().contains(k))
        else {
            tracing::trace!(tag, %activity, "ignoring statistics type");
            continue;
        };
        apply_statistic(&mut record, kind, stat)?;
    }

    Ok(record)
}

/// Later statistics of the same kind overwrite earlier ones.
fn apply_statistic(record: &mut WorkoutRecord, kind: MetricKind, stat: &Statistic) -> Result<()> {
    match kind.aggregate() {
        Aggregate::Range([avg, min, max]) => {
            record.set_metric(avg, stat.average.clone());
            record.set_metric(min, stat.minimum.clone());
            record.set_metric(max, stat.maximum.clone());
        }
        Aggregate::Sum(col) => record.set_metric(col, stat.sum.clone()),
        Aggregate::Distance(col) => {
            record.set_metric(col, format_distance(stat.sum.as_deref())?);
        }
    }
    Ok(())
}
