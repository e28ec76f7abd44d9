use crate::dlog;
use crate::types::{MetadataEntry, Statistic, WorkoutEntry};
use anyhow::{Context, Result, bail};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Read every `<Workout>` that is a direct child of the document root.
///
/// Only `<MetadataEntry>` and `<WorkoutStatistics>` directly under a workout
/// are kept; the ones nested deeper (e.g. inside `<WorkoutRoute>`) are not.
pub fn parse_workouts(xml: &[u8]) -> Result<Vec<WorkoutEntry>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    let mut st = ParseState::default();
    let mut out: Vec<WorkoutEntry> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                handle_open(&mut st, &e)?;
                st.depth += 1;
            }
            Ok(Event::Empty(e)) => {
                handle_open(&mut st, &e)?;
                handle_close(&mut st, &mut out);
            }
            Ok(Event::End(_)) => {
                st.depth = st.depth.saturating_sub(1);
                handle_close(&mut st, &mut out);
            }
            Err(e) => bail!(
                "export XML parse error at byte {}: {e}",
                reader.error_position()
            ),
            _ => {}
        }
        buf.clear();
    }

    if !st.saw_root {
        bail!("export XML has no root element");
    }
    if st.depth != 0 {
        bail!("export XML ended with {} unclosed element(s)", st.depth);
    }

    dlog!("parsed workouts={}", out.len());
    Ok(out)
}

#[derive(Default)]
struct ParseState {
    /// Number of currently open elements.
    depth: usize,
    saw_root: bool,
    current: Option<WorkoutEntry>,
}

fn handle_open(st: &mut ParseState, e: &BytesStart<'_>) -> Result<()> {
    let name = e.name();
    match (st.depth, name.as_ref()) {
        (0, _) if st.saw_root => bail!(
            "export XML has content after the root element: <{}>",
            String::from_utf8_lossy(name.as_ref())
        ),
        (1, b"Workout") => st.current = Some(parse_workout_attrs(e)?),
        (2, b"MetadataEntry") if st.current.is_some() => {
            if let Some(m) = parse_metadata_attrs(e)?
                && let Some(w) = st.current.as_mut()
            {
                w.metadata.push(m);
            }
        }
        (2, b"WorkoutStatistics") if st.current.is_some() => {
            let s = parse_statistic_attrs(e)?;
            if let Some(w) = st.current.as_mut() {
                w.statistics.push(s);
            }
        }
        (depth, _) => {
            if depth == 0 {
                st.saw_root = true;
            }
            // Attributes we do not keep must still be well-formed.
            for_each_attr(e, |_, _| {})?;
        }
    }
    Ok(())
}

fn handle_close(st: &mut ParseState, out: &mut Vec<WorkoutEntry>) {
    // Only a <Workout> opens an entry at depth 1, so this closes it.
    if st.depth == 1
        && let Some(w) = st.current.take()
    {
        out.push(w);
    }
}

fn for_each_attr(e: &BytesStart<'_>, mut set: impl FnMut(&[u8], String)) -> Result<()> {
    let element = || String::from_utf8_lossy(e.name().as_ref()).into_owned();
    for a in e.attributes() {
        let a = a.with_context(|| format!("malformed attribute on <{}>", element()))?;
        let v = a.unescape_value().with_context(|| {
            format!(
                "undecodable attribute {} on <{}>",
                String::from_utf8_lossy(a.key.as_ref()),
                element()
            )
        })?;
        set(a.key.as_ref(), v.into_owned());
    }
    Ok(())
}

fn parse_workout_attrs(e: &BytesStart<'_>) -> Result<WorkoutEntry> {
    let mut w = WorkoutEntry::default();
    for_each_attr(e, |key, v| {
        let slot = match key {
            b"workoutActivityType" => &mut w.activity_type,
            b"duration" => &mut w.duration,
            b"durationUnit" => &mut w.duration_unit,
            b"sourceName" => &mut w.source_name,
            b"sourceVersion" => &mut w.source_version,
            b"device" => &mut w.device,
            b"creationDate" => &mut w.creation_date,
            b"startDate" => &mut w.start_date,
            b"endDate" => &mut w.end_date,
            _ => return,
        };
        *slot = Some(v);
    })?;
    Ok(w)
}

fn parse_metadata_attrs(e: &BytesStart<'_>) -> Result<Option<MetadataEntry>> {
    let mut key = None;
    let mut value = None;
    for_each_attr(e, |k, v| match k {
        b"key" => key = Some(v),
        b"value" => value = Some(v),
        _ => {}
    })?;
    Ok(key.map(|key| MetadataEntry { key, value }))
}

fn parse_statistic_attrs(e: &BytesStart<'_>) -> Result<Statistic> {
    let mut s = Statistic::default();
    for_each_attr(e, |key, v| {
        let slot = match key {
            b"type" => &mut s.type_tag,
            b"average" => &mut s.average,
            b"minimum" => &mut s.minimum,
            b"maximum" => &mut s.maximum,
            b"sum" => &mut s.sum,
            _ => return,
        };
        *slot = Some(v);
    })?;
    Ok(s)
}
