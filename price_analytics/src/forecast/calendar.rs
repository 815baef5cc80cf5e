//! Business-day (Monday to Friday) date arithmetic. Holidays are not modeled.

use chrono::{Datelike, Days, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First business day strictly after `date`.
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut d = date;
    loop {
        // NaiveDate::MAX has no successor; the loop then stops there
        d = match d.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => return d,
        };
        if is_business_day(d) {
            return d;
        }
    }
}

/// `count` contiguous business days following `last`.
pub fn business_days_after(last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(count);
    let mut d = last;
    for _ in 0..count {
        d = next_business_day(d);
        out.push(d);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn friday_rolls_to_monday() {
        assert_eq!(next_business_day(ymd(2024, 6, 7)), ymd(2024, 6, 10));
        assert_eq!(next_business_day(ymd(2024, 6, 8)), ymd(2024, 6, 10));
        assert_eq!(next_business_day(ymd(2024, 6, 10)), ymd(2024, 6, 11));
    }

    #[test]
    fn contiguous_run_skips_weekends() {
        let days = business_days_after(ymd(2024, 6, 6), 5);
        assert_eq!(
            days,
            vec![ymd(2024, 6, 7), ymd(2024, 6, 10), ymd(2024, 6, 11), ymd(2024, 6, 12), ymd(2024, 6, 13)]
        );
        assert!(days.iter().all(|d| is_business_day(*d)));
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(business_days_after(ymd(2024, 1, 1), 0).is_empty());
    }
}
