//! Lenient date parsing and pt-BR display formatting.
//!
//! Backends send ISO timestamps, sometimes with an offset and sometimes
//! without; already-formatted cells arrive as `dd/mm/yyyy[ hh:mm[:ss]]` or the
//! dashed `dd-mm-yyyy` variant. Everything is normalized to a naive UTC time.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a timestamp in any of the accepted shapes.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    parse_date_only(raw).and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_date_only(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Parse a calendar date, dropping any time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    parse_date_only(raw).or_else(|| parse_datetime(raw).map(|dt| dt.date()))
}

/// The instant empty or unparseable values collapse to when sorting.
pub fn epoch() -> NaiveDateTime {
    DateTime::UNIX_EPOCH.naive_utc()
}

/// `dd/mm/yyyy hh:mm`, 24h.
pub fn format_br(dt: &NaiveDateTime) -> String {
    dt.format("%d/%m/%Y %H:%M").to_string()
}

/// `dd/mm/yyyy`.
pub fn format_br_date(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Display form of an optional raw timestamp; `N/A` when missing or invalid.
pub fn display_or_na(raw: Option<&str>) -> String {
    raw.and_then(parse_datetime)
        .map(|dt| format_br(&dt))
        .unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_iso_with_and_without_offset() {
        assert_eq!(parse_datetime("2023-01-15T14:30"), Some(dt(2023, 1, 15, 14, 30)));
        assert_eq!(parse_datetime("2023-01-15T14:30:00Z"), Some(dt(2023, 1, 15, 14, 30)));
        assert_eq!(
            parse_datetime("2023-01-15T14:30:00-03:00"),
            Some(dt(2023, 1, 15, 17, 30))
        );
        assert_eq!(parse_datetime("2023-01-15"), Some(dt(2023, 1, 15, 0, 0)));
    }

    #[test]
    fn parses_brazilian_and_dashed_forms() {
        assert_eq!(parse_datetime("15/01/2023"), Some(dt(2023, 1, 15, 0, 0)));
        assert_eq!(parse_datetime("15/01/2023 09:05"), Some(dt(2023, 1, 15, 9, 5)));
        assert_eq!(parse_datetime("15-01-2023 09:05:00"), Some(dt(2023, 1, 15, 9, 5)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("N/A"), None);
        assert_eq!(parse_date("amanhã"), None);
    }

    #[test]
    fn formats_in_pt_br() {
        let value = dt(2023, 1, 5, 7, 3);
        assert_eq!(format_br(&value), "05/01/2023 07:03");
        assert_eq!(display_or_na(Some("2023-01-05T07:03:00")), "05/01/2023 07:03");
        assert_eq!(display_or_na(None), "N/A");
    }
}
