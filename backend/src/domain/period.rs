//! Month-safe date arithmetic for billing periods.
//!
//! A billing period runs from one renewal date to the same day-of-month in the
//! next month. When that day does not exist in the target month (Jan 31 → Feb),
//! the date is clamped to the last day of the target month.

use chrono::{Datelike, Days, Months, NaiveDate};

/// Dates are persisted as `YYYY-MM-DD` text and compared as strings, which
/// only orders correctly for four-digit, non-negative years.
pub const MIN_STORABLE_YEAR: i32 = 0;
pub const MAX_STORABLE_YEAR: i32 = 9999;

/// Whether `date` sorts correctly in its stored text form.
pub fn is_storable(date: NaiveDate) -> bool {
    (MIN_STORABLE_YEAR..=MAX_STORABLE_YEAR).contains(&date.year())
}

/// Pull `date` into the storable years, for comparison bounds only.
pub fn clamp_to_storable(date: NaiveDate) -> NaiveDate {
    match (
        NaiveDate::from_ymd_opt(MIN_STORABLE_YEAR, 1, 1),
        NaiveDate::from_ymd_opt(MAX_STORABLE_YEAR, 12, 31),
    ) {
        (Some(first), Some(last)) => date.clamp(first, last),
        _ => date,
    }
}

/// Shift `date` by `delta` calendar months, keeping the day-of-month where
/// possible and clamping to the end of the target month otherwise.
///
/// Returns `None` only when the result falls outside chrono's representable
/// date range.
pub fn shift_month(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let months = Months::new(delta.unsigned_abs());
    if delta >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

/// Start of the billing period that ends on `period_end`, `None` when it
/// falls outside the storable years.
pub fn period_start_for(period_end: NaiveDate) -> Option<NaiveDate> {
    shift_month(period_end, -1).filter(|start| is_storable(*start))
}

/// End of the billing period following the one that ended on `period_end`,
/// `None` when it falls outside the storable years.
pub fn next_period_end(period_end: NaiveDate) -> Option<NaiveDate> {
    shift_month(period_end, 1).filter(|end| is_storable(*end))
}

/// Reminders go out the day before a renewal.
pub fn reminder_send_date(renewal_date: NaiveDate) -> Option<NaiveDate> {
    renewal_date.checked_sub_days(Days::new(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use quickcheck_macros::quickcheck;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_shift_month_keeps_day_of_month() {
        assert_eq!(shift_month(date(2024, 3, 15), 1), Some(date(2024, 4, 15)));
        assert_eq!(shift_month(date(2024, 3, 15), -1), Some(date(2024, 2, 15)));
    }

    #[test]
    fn test_shift_month_clamps_to_month_end() {
        // Leap year
        assert_eq!(shift_month(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(shift_month(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        assert_eq!(shift_month(date(2024, 3, 31), -1), Some(date(2024, 2, 29)));
        assert_eq!(shift_month(date(2024, 5, 31), 1), Some(date(2024, 6, 30)));
    }

    #[test]
    fn test_shift_month_rolls_year() {
        assert_eq!(shift_month(date(2024, 12, 15), 1), Some(date(2025, 1, 15)));
        assert_eq!(shift_month(date(2024, 1, 15), -1), Some(date(2023, 12, 15)));
        assert_eq!(shift_month(date(2024, 12, 31), 1), Some(date(2025, 1, 31)));
    }

    #[test]
    fn test_shift_month_zero_is_identity() {
        assert_eq!(shift_month(date(2025, 7, 4), 0), Some(date(2025, 7, 4)));
    }

    #[test]
    fn test_shift_month_out_of_range() {
        assert_eq!(shift_month(NaiveDate::MAX, 1), None);
        assert_eq!(shift_month(NaiveDate::MIN, -1), None);
    }

    #[test]
    fn test_period_helpers() {
        let renewal = date(2025, 3, 31);
        assert_eq!(period_start_for(renewal), Some(date(2025, 2, 28)));
        assert_eq!(next_period_end(renewal), Some(date(2025, 4, 30)));
        assert_eq!(reminder_send_date(renewal), Some(date(2025, 3, 30)));
        assert_eq!(reminder_send_date(date(2025, 1, 1)), Some(date(2024, 12, 31)));
    }

    #[test]
    fn test_periods_stay_within_storable_years() {
        assert!(is_storable(date(0, 1, 1)));
        assert!(is_storable(date(9999, 12, 31)));
        assert!(!is_storable(date(10000, 1, 1)));
        assert!(!is_storable(date(-1, 12, 31)));

        assert_eq!(next_period_end(date(9999, 11, 15)), Some(date(9999, 12, 15)));
        assert_eq!(next_period_end(date(9999, 12, 15)), None);
        assert_eq!(period_start_for(date(0, 2, 10)), Some(date(0, 1, 10)));
        assert_eq!(period_start_for(date(0, 1, 10)), None);

        assert_eq!(clamp_to_storable(date(12000, 3, 1)), date(9999, 12, 31));
        assert_eq!(clamp_to_storable(date(-5, 3, 1)), date(0, 1, 1));
        assert_eq!(clamp_to_storable(date(2025, 6, 15)), date(2025, 6, 15));
    }

    #[quickcheck]
    fn prop_round_trip_for_days_present_in_every_month(
        year_offset: u16,
        month: u8,
        day: u8,
    ) -> bool {
        let year = 1900 + i32::from(year_offset % 400);
        let month = u32::from(month % 12) + 1;
        let day = u32::from(day % 28) + 1;
        let original = date(year, month, day);

        shift_month(original, 1).and_then(|d| shift_month(d, -1)) == Some(original)
    }

    #[quickcheck]
    fn prop_forward_shift_lands_in_next_month(year_offset: u16, ordinal: u16) -> bool {
        let year = 1900 + i32::from(year_offset % 400);
        let Some(start) = NaiveDate::from_yo_opt(year, u32::from(ordinal % 365) + 1) else {
            return true;
        };
        let Some(shifted) = shift_month(start, 1) else {
            return false;
        };

        let expected_month = start.month() % 12 + 1;
        shifted.month() == expected_month && shifted.day() <= start.day() && shifted > start
    }
}
