use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

/// Formats elapsed time the way the timer shows it: zero padded `HH:MM:SS`. Hours are not capped
/// at 24 and negative values are shown as zero.
pub fn format_hms(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

/// This is the standard way of naming an export file in quicknotes.
pub fn export_file_name(moment: DateTime<Utc>) -> String {
    format!("quicknotes-{}.json", moment.format("%Y-%m-%dT%H:%M:%S"))
}

/// Returns start of the next day.
pub fn next_day_start<Tz: TimeZone>(date: DateTime<Tz>) -> Option<DateTime<Tz>> {
    (date + Duration::days(1)).with_time(NaiveTime::MIN).single()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{export_file_name, format_hms};

    #[test]
    fn format_hms_pads_and_does_not_wrap_hours() {
        assert_eq!(format_hms(Duration::zero()), "00:00:00");
        assert_eq!(format_hms(Duration::milliseconds(1999)), "00:00:01");
        assert_eq!(format_hms(Duration::seconds(3 * 3600 + 2 * 60 + 5)), "03:02:05");
        assert_eq!(format_hms(Duration::hours(123)), "123:00:00");
        assert_eq!(format_hms(Duration::seconds(-5)), "00:00:00");
    }

    #[test]
    fn export_name_has_no_millis_or_zone() {
        let moment = Utc.with_ymd_and_hms(2025, 3, 16, 9, 5, 1).unwrap()
            + Duration::milliseconds(250);
        assert_eq!(export_file_name(moment), "quicknotes-2025-03-16T09:05:01.json");
    }
}
