use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Display format for every timestamp written to a sheet.
pub const SHEET_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Combine the date and time fields of a log line into one naive datetime.
///
/// Returns `None` when either part is not a real calendar value
/// (`2024-02-30`, `25:00:00`).
pub fn combine_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let t = NaiveTime::parse_from_str(time, "%H:%M:%S").ok()?;
    Some(d.and_time(t))
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Renders UTC instants in the operator's timezone.
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler with the given IANA timezone name as the default.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    pub fn to_local(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.default_tz)
    }

    /// Format `dt` in the handler's timezone using [`SHEET_DATETIME_FORMAT`].
    pub fn format_local(&self, dt: DateTime<Utc>) -> String {
        self.to_local(dt).format(SHEET_DATETIME_FORMAT).to_string()
    }

    /// Today's calendar date in the handler's timezone.
    pub fn today(&self) -> NaiveDate {
        self.to_local(Utc::now()).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_combine_date_time_valid() {
        let dt = combine_date_time("2024-01-05", "10:15:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-05 10:15:00");
    }

    #[test]
    fn test_combine_date_time_impossible_date() {
        assert!(combine_date_time("2024-02-30", "10:00:00").is_none());
        assert!(combine_date_time("2024-13-01", "10:00:00").is_none());
    }

    #[test]
    fn test_combine_date_time_impossible_time() {
        assert!(combine_date_time("2024-01-05", "25:00:00").is_none());
    }

    #[test]
    fn test_handler_invalid_name_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Not/AZone");
        let dt = Utc.with_ymd_and_hms(2024, 10, 17, 17, 58, 12).unwrap();
        assert_eq!(handler.format_local(dt), "2024-10-17 17:58:12");
    }

    #[test]
    fn test_validate_timezone() {
        assert!(TimezoneHandler::validate_timezone("America/Lima"));
        assert!(TimezoneHandler::validate_timezone("UTC"));
        assert!(!TimezoneHandler::validate_timezone("Mars/Olympus"));
    }

    #[test]
    fn test_format_local_converts_zone() {
        let handler = TimezoneHandler::new("America/Lima");
        let utc = Utc.with_ymd_and_hms(2024, 10, 17, 17, 58, 12).unwrap();
        // Lima is UTC-5 with no DST.
        assert_eq!(handler.format_local(utc), "2024-10-17 12:58:12");
    }

    #[test]
    fn test_format_local_utc() {
        let handler = TimezoneHandler::new("UTC");
        let utc = Utc.with_ymd_and_hms(2024, 1, 5, 10, 15, 0).unwrap();
        assert_eq!(handler.format_local(utc), "2024-01-05 10:15:00");
    }

    #[test]
    fn test_get_system_timezone_not_empty() {
        assert!(!get_system_timezone().is_empty());
    }
}
