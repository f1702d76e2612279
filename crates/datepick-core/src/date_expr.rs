use std::sync::OnceLock;

use anyhow::{Context, anyhow};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use regex::Regex;

use crate::date_util::{add_days, add_months, first_of_month, shift_years};

fn relative_re() -> anyhow::Result<&'static Regex> {
    static RELATIVE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RELATIVE
        .get_or_init(|| Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dwmy])$"))
        .as_ref()
        .map_err(|e| anyhow!("internal regex compile failure: {e}"))
}

/// Parses a day expression relative to `today`.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_date_expr(input: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let token = input.trim();
    let lower = token.to_ascii_lowercase();

    match lower.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(add_days(today, 1)),
        "yesterday" => return Ok(add_days(today, -1)),
        _ => {}
    }

    if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = token.parse().context("invalid 4-digit year")?;
        return NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| anyhow!("invalid year value: {year}"));
    }

    if let Some(target) = parse_weekday_name(&lower) {
        return Ok(next_weekday_date(today, target));
    }

    if let Some(caps) = relative_re()?.captures(token) {
        let sign = caps
            .name("sign")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative sign"))?;
        let num: i32 = caps
            .name("num")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative amount"))?
            .parse()
            .context("invalid relative number")?;
        let unit = caps
            .name("unit")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative unit"))?;
        let num = if sign == "-" { -num } else { num };

        return match unit {
            "d" => Ok(add_days(today, i64::from(num))),
            "w" => Ok(add_days(today, i64::from(num) * 7)),
            "m" => Ok(add_months(today, num)),
            "y" => Ok(shift_years(today, num)),
            _ => Err(anyhow!("unknown relative unit: {unit}")),
        };
    }

    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Ok(date);
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(token, fmt) {
            return Ok(crate::date_util::normalize(ndt));
        }
    }

    if let Ok(month) = parse_month(token) {
        return Ok(month);
    }

    Err(anyhow!("unrecognized date expression: {input}")).with_context(|| {
        "supported formats: today/tomorrow/yesterday, 4-digit year, weekday names \
         (e.g. monday), +Nd/+Nw/+Nm/+Ny, YYYY-MM-DD, YYYY-MM, YYYY-MM-DDTHH:MM"
    })
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(input: &str) -> anyhow::Result<NaiveDate> {
    let (year, month) = input
        .trim()
        .split_once('-')
        .ok_or_else(|| anyhow!("expected YYYY-MM, got: {input}"))?;
    let year: i32 = year.parse().with_context(|| format!("invalid year in {input}"))?;
    let month: u32 = month.parse().with_context(|| format!("invalid month in {input}"))?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(first_of_month)
        .ok_or_else(|| anyhow!("month out of range: {input}"))
}

fn parse_weekday_name(token: &str) -> Option<Weekday> {
    match token.trim() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Next occurrence of `target` strictly after `from`.
fn next_weekday_date(from: NaiveDate, target: Weekday) -> NaiveDate {
    let from_idx = i64::from(from.weekday().num_days_from_monday());
    let target_idx = i64::from(target.num_days_from_monday());
    let mut delta = (7 + target_idx - from_idx) % 7;
    if delta == 0 {
        delta = 7;
    }
    add_days(from, delta)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{parse_date_expr, parse_month};

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn parses_keywords_and_iso_dates() {
        let today = ymd(2024, 6, 15);
        assert_eq!(parse_date_expr("today", today).expect("today"), today);
        assert_eq!(parse_date_expr("Tomorrow", today).expect("tomorrow"), ymd(2024, 6, 16));
        assert_eq!(parse_date_expr("2024-02-29", today).expect("iso"), ymd(2024, 2, 29));
        assert_eq!(parse_date_expr("2024-02-29T18:30", today).expect("datetime"), ymd(2024, 2, 29));
        assert_eq!(parse_date_expr("2028", today).expect("year"), ymd(2028, 1, 1));
    }

    #[test]
    fn parses_weekday_name() {
        // 2024-06-15 is a Saturday
        let today = ymd(2024, 6, 15);
        assert_eq!(parse_date_expr("monday", today).expect("weekday"), ymd(2024, 6, 17));
        assert_eq!(parse_date_expr("sat", today).expect("weekday"), ymd(2024, 6, 22));
    }

    #[test]
    fn parses_relative_offsets() {
        let today = ymd(2024, 1, 31);
        assert_eq!(parse_date_expr("+3d", today).expect("days"), ymd(2024, 2, 3));
        assert_eq!(parse_date_expr("-1w", today).expect("weeks"), ymd(2024, 1, 24));
        assert_eq!(parse_date_expr("+1m", today).expect("months"), ymd(2024, 2, 1));
        assert_eq!(parse_date_expr("-1y", today).expect("years"), ymd(2023, 1, 31));
    }

    #[test]
    fn parses_year_month() {
        assert_eq!(parse_month("2024-06").expect("month"), ymd(2024, 6, 1));
        assert_eq!(parse_date_expr("2024-6", ymd(2020, 1, 1)).expect("month"), ymd(2024, 6, 1));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_date_expr("someday", ymd(2024, 1, 1)).is_err());
    }
}
