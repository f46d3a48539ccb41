//! Line-oriented parser for the upstream weather text.
//!
//! The upstream body looks like:
//!
//! ```text
//! 01. 城市名：北京
//! 02. 实时天气：晴
//! `#img=https://...`
//! ```
//!
//! Each recognised line becomes one key/value pair. Anything else is skipped.

use tracing::debug;

use crate::model::WeatherFields;

/// Full-width colon separating label from value.
pub const SEPARATOR: char = '：';

/// Marks an embedded image reference; such lines carry no field.
pub const IMAGE_MARKER: &str = "`#img=";

/// Returns `None` if no line yielded a key/value pair.
///
/// Later duplicates of a key replace earlier ones.
pub fn parse(raw: &str) -> Option<WeatherFields> {
    let mut fields = WeatherFields::default();

    for line in raw.lines() {
        if line.trim().is_empty() || line.contains(IMAGE_MARKER) {
            continue;
        }
        if !line.contains(SEPARATOR) {
            continue;
        }

        let line = strip_ordinal(line.trim_start());
        if let Some((key, value)) = line.split_once(SEPARATOR) {
            fields.insert(key.trim(), value.trim());
        }
    }

    debug!(fields = fields.len(), "parsed weather text");

    if fields.is_empty() { None } else { Some(fields) }
}

/// Drops a leading `"<digits>. "` enumeration label.
fn strip_ordinal(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }

    rest.strip_prefix(". ").unwrap_or(line)
}
