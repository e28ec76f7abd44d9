use hkexport::run;
use hkexport::types::{Activity, ExtractConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE HealthData [
<!ELEMENT HealthData (ExportDate,Me,(Record|Workout)*)>
<!ATTLIST Workout workoutActivityType CDATA #REQUIRED>
]>
<HealthData locale="en_GB">
 <ExportDate value="2024-03-01 09:00:00 +0000"/>
 <Me HKCharacteristicTypeIdentifierBiologicalSex="HKBiologicalSexNotSet"/>
 <Record type="HKQuantityTypeIdentifierHeartRate" sourceName="Watch" value="71"/>
 <Workout workoutActivityType="HKWorkoutActivityTypeCycling" duration="62.5" durationUnit="min" sourceName="Joe’s Apple Watch" sourceVersion="10.1" device="&lt;&lt;HKDevice: 0x283e1c6e0&gt;, name:Apple Watch, manufacturer:Apple Inc., model:Watch, hardware:Watch6,2, software:10.1&gt;" creationDate="2023-06-01 19:05:00 +0200" startDate="2023-06-01 18:00:00 +0200" endDate="2023-06-01 19:02:30 +0200">
  <MetadataEntry key="HKIndoorWorkout" value="0"/>
  <MetadataEntry key="HKElevationAscended" value="31200 cm"/>
  <MetadataEntry key="HKTimeZone" value="Europe/Paris"/>
  <MetadataEntry key="HKWeatherTemperature" value="71.6 degF"/>
  <WorkoutEvent type="HKWorkoutEventTypePause" date="2023-06-01 18:30:00 +0200"/>
  <WorkoutStatistics type="HKQuantityTypeIdentifierActiveEnergyBurned" startDate="2023-06-01 18:00:00 +0200" endDate="2023-06-01 19:02:30 +0200" sum="612.4" unit="kcal"/>
  <WorkoutStatistics type="HKQuantityTypeIdentifierDistanceCycling" startDate="2023-06-01 18:00:00 +0200" endDate="2023-06-01 19:02:30 +0200" sum="24.8731" unit="km"/>
  <WorkoutStatistics type="HKQuantityTypeIdentifierHeartRate" startDate="2023-06-01 18:00:00 +0200" endDate="2023-06-01 19:02:30 +0200" average="138" minimum="92" maximum="171" unit="count/min"/>
  <WorkoutRoute sourceName="Joe’s Apple Watch">
   <MetadataEntry key="HKIndoorWorkout" value="1"/>
   <FileReference path="/workout-routes/route_2023-06-01_7.00pm.gpx"/>
  </WorkoutRoute>
 </Workout>
 <Workout workoutActivityType="HKWorkoutActivityTypeRunning" duration="31.2" durationUnit="min" sourceName="Joe’s Apple Watch" startDate="2023-06-02 07:00:00 +0200">
  <WorkoutStatistics type="HKQuantityTypeIdentifierDistanceWalkingRunning" sum="5.1" unit="km"/>
  <WorkoutStatistics type="HKQuantityTypeIdentifierStepCount" sum="5310" unit="count"/>
 </Workout>
 <Workout workoutActivityType="HKWorkoutActivityTypeCycling" duration="45" durationUnit="min" sourceName="Zwift" startDate="2023-06-03 20:00:00 +0200">
  <MetadataEntry key="HKIndoorWorkout" value="1"/>
  <WorkoutStatistics type="HKQuantityTypeIdentifierDistanceCycling" sum="15.5" unit="km"/>
  <WorkoutStatistics type="HKQuantityTypeIdentifierHeartRate" average="140" unit="count/min"/>
 </Workout>
 <Workout workoutActivityType="HKWorkoutActivityTypeWalking" duration="12" durationUnit="min"/>
</HealthData>
"#;

fn config(export: &Path, output: &Path, activity: Activity) -> ExtractConfig {
    ExtractConfig {
        export: export.to_path_buf(),
        output: output.to_path_buf(),
        activity,
    }
}

fn read_rows(path: &Path) -> (csv::StringRecord, Vec<csv::StringRecord>) {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    let rows = rdr.records().map(Result::unwrap).collect();
    (headers, rows)
}

fn cell<'a>(headers: &csv::StringRecord, row: &'a csv::StringRecord, col: &str) -> &'a str {
    let idx = headers.iter().position(|h| h == col).unwrap();
    &row[idx]
}

#[test]
fn cycling_export_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("export.xml");
    let output = dir.path().join("cycling.csv");
    fs::write(&export, EXPORT).unwrap();

    let rows = run(&config(&export, &output, Activity::Cycling)).unwrap();
    assert_eq!(rows, 2);

    let (headers, rows) = read_rows(&output);
    assert_eq!(headers.iter().collect::<Vec<_>>(), Activity::Cycling.columns());
    assert_eq!(rows.len(), 2);

    let outdoor = &rows[0];
    assert_eq!(cell(&headers, outdoor, "workout_type"), "Outdoor");
    assert_eq!(cell(&headers, outdoor, "indoor"), "0");
    assert_eq!(cell(&headers, outdoor, "duration"), "62.5");
    assert_eq!(cell(&headers, outdoor, "source_name"), "Joes Apple Watch");
    assert_eq!(
        cell(&headers, outdoor, "device"),
        "name:Apple Watch, manufacturer:Apple Inc., model:Watch, hardware:Watch6,2, software:10.1"
    );
    assert_eq!(cell(&headers, outdoor, "start_date"), "2023-06-01 18:00:00 +0200");
    assert_eq!(cell(&headers, outdoor, "elevation_ascended"), "31200 cm");
    assert_eq!(cell(&headers, outdoor, "weather_humidity"), "");
    assert_eq!(cell(&headers, outdoor, "active_energy_burned"), "612.4");
    assert_eq!(cell(&headers, outdoor, "distance"), "24.87km");
    assert_eq!(cell(&headers, outdoor, "heart_rate_max"), "171");
    assert_eq!(cell(&headers, outdoor, "cadence_avg"), "");

    let indoor = &rows[1];
    assert_eq!(cell(&headers, indoor, "workout_type"), "Indoor");
    assert_eq!(cell(&headers, indoor, "distance"), "15.50km");
    assert_eq!(cell(&headers, indoor, "heart_rate_avg"), "140");
    assert_eq!(cell(&headers, indoor, "heart_rate_min"), "");
}

#[test]
fn running_export_from_zip() {
    let dir = tempfile::tempdir().unwrap();
    let zip_path = dir.path().join("export.zip");
    let output = dir.path().join("running.csv");

    let mut zw = ZipWriter::new(File::create(&zip_path).unwrap());
    zw.start_file("apple_health_export/export.xml", SimpleFileOptions::default())
        .unwrap();
    zw.write_all(EXPORT.as_bytes()).unwrap();
    zw.finish().unwrap();

    let rows = run(&config(&zip_path, &output, Activity::Running)).unwrap();
    assert_eq!(rows, 1);

    let (headers, rows) = read_rows(&output);
    assert_eq!(headers.len(), 37);
    assert_eq!(cell(&headers, &rows[0], "workout_type"), "Outdoor");
    assert_eq!(cell(&headers, &rows[0], "distance"), "5.10km");
    assert_eq!(cell(&headers, &rows[0], "steps"), "5310");
}

#[test]
fn no_matches_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("export.xml");
    let output = dir.path().join("running.csv");
    fs::write(
        &export,
        r#"<HealthData><Workout workoutActivityType="HKWorkoutActivityTypeSwimming"/></HealthData>"#,
    )
    .unwrap();

    assert_eq!(run(&config(&export, &output, Activity::Running)).unwrap(), 0);
    let text = fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn malformed_export_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("export.xml");
    let output = dir.path().join("cycling.csv");
    fs::write(&export, "<HealthData><Workout></HealthData>").unwrap();

    assert!(run(&config(&export, &output, Activity::Cycling)).is_err());
    assert!(!output.exists());
}

#[test]
fn bad_distance_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("export.xml");
    let output = dir.path().join("cycling.csv");
    fs::write(
        &export,
        r#"<HealthData>
 <Workout workoutActivityType="HKWorkoutActivityTypeCycling">
  <WorkoutStatistics type="HKQuantityTypeIdentifierDistanceCycling" sum="n/a"/>
 </Workout>
</HealthData>"#,
    )
    .unwrap();

    let err = run(&config(&export, &output, Activity::Cycling)).unwrap_err();
    assert!(format!("{err:#}").contains("n/a"));
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn unwritable_output_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("export.xml");
    fs::write(&export, EXPORT).unwrap();
    let output = dir.path().join("missing").join("cycling.csv");

    assert!(run(&config(&export, &output, Activity::Cycling)).is_err());
    assert!(!output.exists());
}

#[test]
fn missing_export_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cycling.csv");
    let err = run(&config(
        &dir.path().join("nope.xml"),
        &output,
        Activity::Cycling,
    ))
    .unwrap_err();
    assert!(err.to_string().contains("nope.xml"));
}

#[test]
fn undecodable_workout_attribute_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("export.xml");
    let output = dir.path().join("cycling.csv");
    fs::write(
        &export,
        r#"<HealthData>
 <Workout workoutActivityType="HKWorkoutActivityType&bogus;Cycling" duration="30"/>
 <Workout workoutActivityType="HKWorkoutActivityTypeCycling" duration="45"/>
</HealthData>"#,
    )
    .unwrap();

    assert!(run(&config(&export, &output, Activity::Cycling)).is_err());
    assert!(!output.exists());
}
