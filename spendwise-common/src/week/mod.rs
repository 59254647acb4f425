use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

const DAYS_PER_WEEK: i64 = 7;
const SECONDS_PER_DAY: i64 = 86400;

/// A calendar week running from Sunday through the following Saturday, both inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    pub fn containing(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_sunday());
        let start = date - Duration::days(offset);

        Self {
            start,
            end: start + Duration::days(DAYS_PER_WEEK - 1),
        }
    }

    /// The week containing today's date in the server's local time zone.
    pub fn current() -> Self {
        Self::containing(today())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Sunday at 00:00:00.
    pub fn start_of_week(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Saturday at 23:59:59.
    pub fn end_of_week(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN) + Duration::seconds(SECONDS_PER_DAY - 1)
    }

    /// Year and Sunday-based week number of the week's start, e.g. `2026-W41`.
    pub fn label(&self) -> String {
        self.start.format("%Y-W%U").to_string()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The `days` calendar days ending on `date`, as an inclusive `(start, end)` pair.
pub fn trailing_days(date: NaiveDate, days: i64) -> (NaiveDate, NaiveDate) {
    (date - Duration::days(days - 1), date)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_containing_midweek_date() {
        let week = WeekRange::containing(date(2026, 10, 14));

        assert_eq!(week.start, date(2026, 10, 11));
        assert_eq!(week.end, date(2026, 10, 17));
        assert_eq!(week.start.weekday(), Weekday::Sun);
        assert_eq!(week.end.weekday(), Weekday::Sat);
    }

    #[test]
    fn test_sunday_and_saturday_map_to_their_own_week() {
        let sunday = date(2026, 10, 11);
        let saturday = date(2026, 10, 17);

        assert_eq!(WeekRange::containing(sunday).start, sunday);
        assert_eq!(WeekRange::containing(saturday).end, saturday);
        assert_eq!(
            WeekRange::containing(sunday),
            WeekRange::containing(saturday)
        );

        let next_sunday = date(2026, 10, 18);
        assert_eq!(WeekRange::containing(next_sunday).start, next_sunday);
    }

    #[test]
    fn test_week_spanning_month_and_year_boundaries() {
        let week = WeekRange::containing(date(2026, 1, 1));
        assert_eq!(week.start, date(2025, 12, 28));
        assert_eq!(week.end, date(2026, 1, 3));

        let week = WeekRange::containing(date(2026, 3, 2));
        assert_eq!(week.start, date(2026, 3, 1));
        assert_eq!(week.end, date(2026, 3, 7));

        let week = WeekRange::containing(date(2024, 2, 29));
        assert_eq!(week.start, date(2024, 2, 25));
        assert_eq!(week.end, date(2024, 3, 2));
    }

    #[test]
    fn test_every_day_of_a_year_falls_in_a_seven_day_sunday_week() {
        let mut day = date(2025, 11, 1);
        let last = date(2027, 2, 1);

        while day <= last {
            let week = WeekRange::containing(day);

            assert_eq!(week.start.weekday(), Weekday::Sun);
            assert_eq!(week.end - week.start, Duration::days(6));
            assert!(week.contains(day));

            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_day_boundaries() {
        let week = WeekRange::containing(date(2026, 10, 14));

        assert_eq!(
            week.start_of_week(),
            date(2026, 10, 11).and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(
            week.end_of_week(),
            date(2026, 10, 17).and_hms_opt(23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_label_is_stable_across_the_week() {
        let week = WeekRange::containing(date(2026, 10, 11));
        assert_eq!(week.label(), "2026-W41");

        for offset in 0..7 {
            let day = date(2026, 10, 11) + Duration::days(offset);
            assert_eq!(WeekRange::containing(day).label(), "2026-W41");
        }

        // The week starting in December keeps the previous year's label
        assert_eq!(WeekRange::containing(date(2026, 1, 2)).label(), "2025-W52");
    }

    #[test]
    fn test_trailing_days() {
        let (start, end) = trailing_days(date(2026, 10, 17), 7);

        assert_eq!(start, date(2026, 10, 11));
        assert_eq!(end, date(2026, 10, 17));
        assert_eq!((end - start).num_days() + 1, 7);

        let (start, end) = trailing_days(date(2026, 10, 17), 30);
        assert_eq!(start, date(2026, 9, 18));
        assert_eq!((end - start).num_days() + 1, 30);

        assert_eq!(
            trailing_days(date(2026, 10, 17), 1),
            (date(2026, 10, 17), date(2026, 10, 17))
        );
    }
}
