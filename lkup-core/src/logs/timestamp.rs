use chrono::{DateTime, NaiveDateTime, Utc};

/// Apache access log time, e.g. `22/Nov/2017:18:47:58 +0000`.
const ACCESS_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Apache error log time, e.g. `Wed Nov 22 18:47:58.123456 2017`. Carries no zone.
const ERROR_FORMAT: &str = "%a %b %d %H:%M:%S%.f %Y";

/// Normalize a raw log timestamp to UTC.
///
/// Zone-less timestamps are taken to already be in UTC. Returns `None` when the
/// input matches none of the known layouts.
pub fn normalize_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if raw.contains('/') {
        return DateTime::parse_from_str(raw, ACCESS_FORMAT)
            .ok()
            .map(|t| t.with_timezone(&Utc));
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, ERROR_FORMAT)
        .ok()
        .map(|t| t.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn access_time_is_converted_to_utc() {
        let t = normalize_timestamp("22/Nov/2017:18:47:58 +0000").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2017, 11, 22, 18, 47, 58).unwrap());

        let shifted = normalize_timestamp("22/Nov/2017:18:47:58 -0500").unwrap();
        assert_eq!(shifted, Utc.with_ymd_and_hms(2017, 11, 22, 23, 47, 58).unwrap());
    }

    #[test]
    fn error_time_with_fraction_is_read_as_utc() {
        let t = normalize_timestamp("Wed Nov 22 18:47:58.123456 2017").unwrap();
        assert_eq!(
            t.timestamp(),
            Utc.with_ymd_and_hms(2017, 11, 22, 18, 47, 58).unwrap().timestamp()
        );
        assert_eq!(t.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn rfc3339_is_accepted() {
        let t = normalize_timestamp("2017-11-22T18:47:58Z").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2017, 11, 22, 18, 47, 58).unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(normalize_timestamp("yesterday-ish").is_none());
        assert!(normalize_timestamp("99/Foo/2017:18:47:58 +0000").is_none());
    }
}
