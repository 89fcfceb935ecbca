use chrono::{Datelike, Months, NaiveDate};

use crate::types::DueClassification;

/// signed whole days from `today` until `due`
///
/// both operands are calendar dates, so the result is already normalized to
/// midnight; absent dates yield `None` (unknown)
pub fn days_left(due: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    due.map(|d| (d - today).num_days())
}

/// classify a signed days-left count into a display band
///
/// pure function of the count plus the paid flag; `is_paid` overrides every
/// band with `Paid`
pub fn classify(days_left: Option<i64>, is_paid: bool) -> DueClassification {
    if is_paid {
        return DueClassification::Paid;
    }

    match days_left {
        None => DueClassification::Unknown,
        Some(d) if d < 0 => DueClassification::Overdue { days: -d },
        Some(0) => DueClassification::DueToday,
        Some(1) => DueClassification::DueTomorrow,
        Some(d) => DueClassification::DueIn { days: d },
    }
}

/// dynamic remaining installment count: whole months between `today` and the
/// loan end date, floored at zero
///
/// day-of-month is ignored on purpose: a loan ending on the 1st and one
/// ending on the 28th of the same month report the same count, treating
/// "this month" as a single unit; callers must not "fix" this to day
/// granularity
pub fn remaining_installments(
    loan_end: Option<NaiveDate>,
    stored_fallback: u32,
    today: NaiveDate,
) -> u32 {
    let end = match loan_end {
        Some(d) => d,
        None => return stored_fallback,
    };

    let months = (end.year() - today.year()) * 12 + (end.month() as i32 - today.month() as i32);
    months.max(0) as u32
}

/// next occurrence of a day-of-month: this month if the day has not passed
/// yet, otherwise the same day next month (clamped to month length)
pub fn next_due_from_day(due_day: u8, today: NaiveDate) -> Option<NaiveDate> {
    if !(1..=31).contains(&due_day) {
        return None;
    }

    let base = if today.day() > due_day as u32 {
        today.checked_add_months(Months::new(1))?
    } else {
        today
    };

    Some(date_with_clamped_day(base.year(), base.month(), due_day as u32))
}

/// shift a date forward by whole months, clamping the day to month length
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// shift a date backward by whole months, clamping the day to month length
pub fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

/// same year and month, day replaced (clamped to month length)
pub fn with_day_of_month(date: NaiveDate, day: u8) -> NaiveDate {
    date_with_clamped_day(date.year(), date.month(), day as u32)
}

fn date_with_clamped_day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)))
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap())
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(28)
}

/// month-name lookup for the legacy localized date format ("12 Aralık 2025")
const LEGACY_MONTHS: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

/// parse a persisted date field
///
/// strict `YYYY-MM-DD` is accepted as-is; the legacy localized free-text form
/// is converted through the fixed month-name table; anything else that is
/// non-empty falls back to `today`; empty and "-" mean "no date"
pub fn parse_flexible_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }

    if let Some(date) = parse_legacy_date(text) {
        return Some(date);
    }

    Some(today)
}

fn parse_legacy_date(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }

    let day: u32 = parts[0].parse().ok()?;
    let month = LEGACY_MONTHS.iter().position(|m| *m == parts[1])? as u32 + 1;
    let year: i32 = parts[2].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Urgency;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_left_tomorrow() {
        let today = date(2024, 1, 15);
        let left = days_left(Some(date(2024, 1, 16)), today);
        assert_eq!(left, Some(1));
        assert_eq!(classify(left, false), DueClassification::DueTomorrow);
        assert_eq!(classify(left, false).urgency(), Urgency::Warning);
    }

    #[test]
    fn test_days_left_bands() {
        let today = date(2024, 1, 15);

        assert_eq!(
            classify(days_left(Some(date(2024, 1, 15)), today), false),
            DueClassification::DueToday
        );
        assert_eq!(
            classify(days_left(Some(date(2024, 1, 10)), today), false),
            DueClassification::Overdue { days: 5 }
        );
        assert_eq!(
            classify(days_left(Some(date(2024, 1, 25)), today), false),
            DueClassification::DueIn { days: 10 }
        );
        assert_eq!(classify(days_left(None, today), false), DueClassification::Unknown);
    }

    #[test]
    fn test_paid_overrides_every_band() {
        let today = date(2024, 1, 15);
        for due in [None, Some(date(2024, 1, 1)), Some(date(2024, 3, 1))] {
            let c = classify(days_left(due, today), true);
            assert_eq!(c, DueClassification::Paid);
            assert_eq!(c.urgency(), Urgency::Paid);
        }
    }

    #[test]
    fn test_remaining_installments_ignores_day_of_month() {
        let today = date(2024, 1, 15);
        assert_eq!(remaining_installments(Some(date(2024, 4, 1)), 99, today), 3);
        assert_eq!(remaining_installments(Some(date(2024, 4, 28)), 99, today), 3);
    }

    #[test]
    fn test_remaining_installments_floors_at_zero() {
        let today = date(2024, 6, 15);
        assert_eq!(remaining_installments(Some(date(2024, 1, 1)), 99, today), 0);
    }

    #[test]
    fn test_remaining_installments_fallback_without_end_date() {
        let today = date(2024, 1, 15);
        assert_eq!(remaining_installments(None, 7, today), 7);
    }

    #[test]
    fn test_next_due_from_day() {
        // day not yet passed this month
        assert_eq!(next_due_from_day(20, date(2024, 1, 15)), Some(date(2024, 1, 20)));
        // day already passed: roll to next month
        assert_eq!(next_due_from_day(10, date(2024, 1, 15)), Some(date(2024, 2, 10)));
        // clamp to month length
        assert_eq!(next_due_from_day(31, date(2024, 2, 1)), Some(date(2024, 2, 29)));
        assert_eq!(next_due_from_day(0, date(2024, 1, 15)), None);
    }

    #[test]
    fn test_month_shifts_clamp() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(sub_months(date(2024, 3, 31), 1), date(2024, 2, 29));
    }

    #[test]
    fn test_parse_flexible_date() {
        let today = date(2024, 1, 15);

        assert_eq!(parse_flexible_date("2025-12-12", today), Some(date(2025, 12, 12)));
        assert_eq!(parse_flexible_date("12 Aralık 2025", today), Some(date(2025, 12, 12)));
        assert_eq!(parse_flexible_date("3 Şubat 2024", today), Some(date(2024, 2, 3)));
        // unparsable non-empty text falls back to today
        assert_eq!(parse_flexible_date("garbage", today), Some(today));
        // empty and dash mean "no date"
        assert_eq!(parse_flexible_date("", today), None);
        assert_eq!(parse_flexible_date("-", today), None);
    }
}
