use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a timestamp string from the Podio API.
/// Podio emits `YYYY-MM-DD HH:MM:SS` for item and revision timestamps, but
/// date fields may carry RFC 3339 or a bare date depending on how they were
/// entered, so all three forms are accepted.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    bail!("Unrecognized timestamp format: {:?}", s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_podio_timestamp() {
        let dt = parse_timestamp("2022-09-14 18:30:05").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2022, 9, 14, 18, 30, 5).unwrap());
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_timestamp("2022-09-14T18:30:05Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2022, 9, 14, 18, 30, 5).unwrap());

        // Offset forms normalize to UTC
        let dt = parse_timestamp("2022-09-14T20:30:05+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2022, 9, 14, 18, 30, 5).unwrap());
    }

    #[test]
    fn test_parse_bare_date() {
        let dt = parse_timestamp("2022-09-14").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2022, 9, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("14.09.2022").is_err());
        assert!(parse_timestamp("not a date").is_err());
    }
}
