use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// `U+00A0` whose UTF-8 bytes were decoded as Latin-1 and re-encoded.
const MANGLED_NBSP: &str = "\u{c2}\u{a0}";
const NBSP: char = '\u{a0}';

const DEVICE_MARKER: &str = "<<HKDevice";
const DEVICE_DELIMITER: &str = ">, ";

static NON_ASCII: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x00-\x7F]+").expect("non-ASCII pattern is valid"));

/// Reduce a free-text attribute to trimmed ASCII.
///
/// Non-breaking spaces (mangled or not) become plain spaces, every other
/// non-ASCII code point is dropped.
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let spaced = raw.replace(MANGLED_NBSP, " ").replace(NBSP, " ");
    let ascii = NON_ASCII.replace_all(&spaced, "");
    Some(ascii.trim().to_string())
}

/// Strip the `<<HKDevice: 0x...>, ` prefix from a device description.
///
/// `<<HKDevice: 0x2830>, name:Apple Watch, model:Watch>` becomes
/// `name:Apple Watch, model:Watch`. Values without the marker, or with the
/// marker but no `>, ` delimiter, are returned unchanged.
pub fn clean_device(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if !raw.starts_with(DEVICE_MARKER) {
        return Some(raw.to_string());
    }
    let Some((_, rest)) = raw.split_once(DEVICE_DELIMITER) else {
        return Some(raw.to_string());
    };
    Some(rest.trim().trim_end_matches('>').trim_end().to_string())
}

/// Format a distance sum as `X.XXkm`. Empty input has no distance.
pub fn format_distance(raw: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let km: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid distance value {raw:?}"))?;
    Ok(Some(format!("{km:.2}km")))
}
