use chrono::Duration;

use crate::utils::{
    percentage::{duration_percentage, Percentage},
    time::format_hms,
};

use super::{categories::CategoryRegistry, timer::CategoryTotals};

#[derive(Debug, Clone, PartialEq)]
pub struct GraphRow {
    pub key: String,
    pub label: String,
    pub color: String,
    pub duration: Duration,
    /// Share of the largest total, used as the bar width.
    pub share: Percentage,
    pub formatted: String,
}

/// One row per timer-category, in registry order. Bars are relative to the largest total.
pub fn project(categories: &CategoryRegistry, totals: &CategoryTotals) -> Vec<GraphRow> {
    let rows = categories
        .timers()
        .map(|v| (v, totals.get(&v.key)))
        .collect::<Vec<_>>();

    let max = rows
        .iter()
        .map(|(_, duration)| *duration)
        .max()
        .unwrap_or_else(Duration::zero)
        .max(Duration::milliseconds(1));

    rows.into_iter()
        .map(|(category, duration)| GraphRow {
            key: category.key.clone(),
            label: category.display_label().to_string(),
            color: category.color.clone(),
            duration,
            share: duration_percentage(duration, max),
            formatted: format_hms(duration),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::app::{
        categories::CategoryRegistry,
        timer::{CategoryTotals, TimerEngine},
    };

    use super::project;

    #[test]
    fn empty_totals_give_zero_bars() {
        let rows = project(&CategoryRegistry::default(), &CategoryTotals::default());
        assert_eq!(
            rows.iter().map(|v| v.key.as_str()).collect::<Vec<_>>(),
            vec!["test", "setup", "bug"]
        );
        assert!(rows.iter().all(|v| *v.share == 0. && v.formatted == "00:00:00"));
    }

    #[test]
    fn bars_are_relative_to_largest_total() {
        let start = Utc.with_ymd_and_hms(2018, 7, 4, 0, 0, 0).unwrap();
        let mut timer = TimerEngine::default();
        timer.attribute_and_restart("bug", start);
        timer.attribute_and_restart("test", start + Duration::seconds(40));
        timer.pause(start + Duration::seconds(50));

        let rows = project(&CategoryRegistry::default(), timer.totals());
        let bug = rows.iter().find(|v| v.key == "bug").unwrap();
        let test = rows.iter().find(|v| v.key == "test").unwrap();

        assert_eq!(bug.share.rounded(), 100);
        assert_eq!(test.share.rounded(), 25);
        assert_eq!(bug.formatted, "00:00:40");
        assert_eq!(bug.color, "#fecaca");
    }
}
