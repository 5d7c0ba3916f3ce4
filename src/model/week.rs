use chrono::{Datelike, Local, NaiveDate};

/// Identifier of the ISO week containing `date`, e.g. `week_2025_23`.
///
/// The ISO week-numbering year is used, so the last days of December that
/// belong to week 1 are attributed to the following year.
pub fn week_identifier(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("week_{}_{}", iso.year(), iso.week())
}

pub fn current_week() -> String {
    week_identifier(Local::now().date_naive())
}
