use chrono::{NaiveDate, SecondsFormat};

const INPUT_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];
const CANONICAL_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

pub fn canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

pub fn normalize_date_str(raw: &str) -> String {
    parse_date(raw).map(canonical).unwrap_or_else(|| raw.to_string())
}

// Midnight UTC in the `2025-11-01T00:00:00.000Z` shape browsers emit.
pub fn to_iso_timestamp(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| canonical(date))
}
