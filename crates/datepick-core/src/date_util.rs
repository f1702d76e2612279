//! Date arithmetic and comparison primitives.
//!
//! Everything here is pure. Functions that compare two dates take
//! `Option<NaiveDate>` and answer `false` when either side is absent, so call
//! sites can pass `selection.first()` and friends straight through.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Weekday};

/// Horizon used when a window bound is left open.
pub const YEAR_HORIZON: i32 = 100;

/// Today's date in the local timezone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Drops the time of day.
#[must_use]
pub fn normalize(dt: NaiveDateTime) -> NaiveDate {
    dt.date()
}

#[must_use]
pub fn same_day(a: Option<NaiveDate>, b: Option<NaiveDate>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

#[must_use]
pub fn same_month(a: Option<NaiveDate>, b: Option<NaiveDate>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if month_key(a) == month_key(b))
}

#[must_use]
pub fn is_before(a: Option<NaiveDate>, b: Option<NaiveDate>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}

#[must_use]
pub fn is_after(a: Option<NaiveDate>, b: Option<NaiveDate>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

/// `(year, month)` pair, ordered chronologically.
#[must_use]
pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[must_use]
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let next = add_months(date, 1);
    next.pred_opt().unwrap_or(date)
}

/// Number of days in the month containing `date` (28 to 31).
#[must_use]
pub fn days_in_month(date: NaiveDate) -> u32 {
    last_of_month(date).day()
}

/// Moves by `months` and lands on the first day of the resulting month.
///
/// The day of `date` is discarded, so `2024-01-31 + 1` is `2024-02-01`.
#[must_use]
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12);

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1))
        .unwrap_or_else(|| first_of_month(date))
}

/// Moves by whole years, keeping month and day. Feb 29 becomes Feb 28 in a
/// non-leap target year.
#[must_use]
pub fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year().saturating_add(years);
    let month = date.month();
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return date;
    };
    let day = date.day().min(days_in_month(first));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

/// Same month and day in another year, clamping the day like [`shift_years`].
#[must_use]
pub fn with_year(date: NaiveDate, year: i32) -> NaiveDate {
    shift_years(date, year.saturating_sub(date.year()))
}

/// Weekday column with Sunday = 0.
#[must_use]
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Maps a 0 = Sunday index onto a chrono weekday. Values above 6 wrap.
#[must_use]
pub fn weekday_from_index(index: u8) -> Weekday {
    match index % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Column order of the weekday header for a given first day of week.
#[must_use]
pub fn weekday_order(first_day_of_week: u8) -> [Weekday; 7] {
    let mut order = [Weekday::Sun; 7];
    for (offset, slot) in order.iter_mut().enumerate() {
        *slot = weekday_from_index(first_day_of_week.wrapping_add(offset as u8) % 7);
    }
    order
}

/// Every day from the earlier of `a`/`b` to the later, both ends included.
pub fn days_inclusive(a: NaiveDate, b: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let (from, to) = if a <= b { (a, b) } else { (b, a) };
    from.iter_days().take_while(move |day| *day <= to)
}

#[must_use]
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}

/// Clamps `date` into `[lower, upper]`.
#[must_use]
pub fn clamp(date: NaiveDate, lower: NaiveDate, upper: NaiveDate) -> NaiveDate {
    if date < lower {
        lower
    } else if date > upper {
        upper
    } else {
        date
    }
}
