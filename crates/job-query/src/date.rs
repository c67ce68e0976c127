//! Relative date shortcuts.
//!
//! `N_days_ago` (and the week/month/year variants, `today`, `yesterday`)
//! resolve to the calendar day they name, expressed as the window between
//! that day's local midnight and the next one.

use chrono::{DateTime, Days, Months, NaiveDate, TimeZone, Utc};

use crate::clause::DateWindow;

/// Resolve a shortcut relative to `now`, in `now`'s time zone.
///
/// Returns `None` for anything that is not a recognized shortcut.
pub fn resolve_shortcut<Tz: TimeZone>(value: &str, now: &DateTime<Tz>) -> Option<DateWindow> {
    let today = now.date_naive();
    let day = match value.to_ascii_lowercase().as_str() {
        "today" => today,
        "yesterday" => today.pred_opt()?,
        other => days_back(other, today)?,
    };
    day_window(&now.timezone(), day)
}

/// The window covering `day` in `tz`.
pub fn day_window<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<DateWindow> {
    let start = local_midnight(tz, day)?;
    let end = local_midnight(tz, day.succ_opt()?)?;
    Some(DateWindow::new(start, end))
}

fn days_back(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut parts = value.split('_');
    let (amount, unit, suffix) = (parts.next()?, parts.next()?, parts.next()?);
    if suffix != "ago" || parts.next().is_some() {
        return None;
    }

    let amount: u32 = amount.parse().ok()?;
    match unit {
        "day" | "days" => today.checked_sub_days(Days::new(amount.into())),
        "week" | "weeks" => today.checked_sub_days(Days::new(u64::from(amount) * 7)),
        "month" | "months" => today.checked_sub_months(Months::new(amount)),
        "year" | "years" => today.checked_sub_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    // Zones that skip midnight on a DST change start the day at 01:00.
    let local = tz
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&day.and_hms_opt(1, 0, 0)?).earliest())?;
    Some(local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 10).unwrap()
    }

    fn utc_day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[rstest]
    #[case("2_days_ago", utc_day(2024, 3, 13))]
    #[case("1_day_ago", utc_day(2024, 3, 14))]
    #[case("0_days_ago", utc_day(2024, 3, 15))]
    #[case("today", utc_day(2024, 3, 15))]
    #[case("yesterday", utc_day(2024, 3, 14))]
    #[case("2_weeks_ago", utc_day(2024, 3, 1))]
    #[case("1_month_ago", utc_day(2024, 2, 15))]
    #[case("1_year_ago", utc_day(2023, 3, 15))]
    fn test_resolves_to_day_window(#[case] value: &str, #[case] start: DateTime<Utc>) {
        let window = resolve_shortcut(value, &now()).unwrap();
        assert_eq!(window.start, start);
        assert_eq!(window.end, start + chrono::Duration::days(1));
    }

    #[rstest]
    #[case("foo_bar_baz")]
    #[case("two_days_ago")]
    #[case("2_days")]
    #[case("2_days_hence")]
    #[case("2_fortnights_ago")]
    #[case("2_days_ago_now")]
    #[case("")]
    fn test_unparseable_shortcuts(#[case] value: &str) {
        assert_eq!(resolve_shortcut(value, &now()), None);
    }

    #[test]
    fn test_window_follows_local_zone() {
        let tz = chrono_tz::Europe::Berlin;
        let now = tz.with_ymd_and_hms(2024, 3, 15, 0, 30, 0).unwrap();
        let window = resolve_shortcut("today", &now).unwrap();
        // Berlin is UTC+1 in March before the DST switch.
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 14, 23, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 15, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_dst_day_is_shorter() {
        let tz = chrono_tz::Europe::Berlin;
        let window = day_window(&tz, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()).unwrap();
        assert_eq!(window.end - window.start, chrono::Duration::hours(23));
    }
}
