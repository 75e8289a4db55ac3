//! Display formatting for raw bill values.
//!
//! These are pure functions used by the list pipeline. They are lossy and
//! display-only: nothing here is expected to round-trip back into the stored
//! representation.

use crate::Result;
use anyhow::Context;
use chrono::{Datelike, NaiveDate};

/// Three-letter French month labels, capitalized. `juin` and `juillet` both
/// truncate to "Jui".
const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// Renders a stored `YYYY-MM-DD` date as a short display string such as
/// `4 Avr. 04`. Returns an error when the raw value is not a parseable date;
/// callers formatting a batch must catch this per item rather than letting
/// one malformed record abort the whole batch.
pub fn format_date(raw: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("'{raw}' is not a valid YYYY-MM-DD date"))?;
    let month = MONTH_ABBREV[date.month0() as usize];
    Ok(format!("{} {}. {:02}", date.day(), month, date.year() % 100))
}

/// Maps a stored status to its display label. Unknown values pass through
/// unchanged, which also makes the function idempotent: applying it to an
/// already-formatted label returns that label.
pub fn format_status(raw: &str) -> String {
    match raw {
        "pending" => "En attente".to_string(),
        "accepted" => "Accepté".to_string(),
        "refused" => "Refusé".to_string(),
        other => other.to_string(),
    }
}
