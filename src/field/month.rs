use chrono::{DateTime, Datelike, NaiveDate, TimeZone};

use super::FieldExpression;
use crate::calendar;
use crate::errors::CronError;
use crate::Direction;

pub(super) fn is_satisfied_by<Tz: TimeZone>(expression: &FieldExpression, date: &DateTime<Tz>) -> bool {
    expression.matches_value(date.month())
}

/// First day of the next month at 00:00, or last day of the previous month at 23:59.
pub(super) fn step<Tz: TimeZone>(date: &DateTime<Tz>, direction: Direction) -> Result<DateTime<Tz>, CronError> {
    let day = calendar::adjacent_month(date.date_naive(), direction)?;
    calendar::day_boundary(&date.timezone(), day, direction)
}

pub(super) fn increment<Tz: TimeZone>(
    expression: &FieldExpression,
    date: &DateTime<Tz>,
    direction: Direction,
) -> Result<DateTime<Tz>, CronError> {
    let months = match expression.values() {
        Some(months) if !months.is_empty() => months,
        _ => return step(date, direction),
    };
    let (year, current) = (date.year(), date.month());

    let (year, month) = if direction.is_backward() {
        match months.iter().rev().find(|&&m| m < current) {
            Some(&month) => (year, month),
            None => (year - 1, months[months.len() - 1]),
        }
    } else {
        match months.iter().find(|&&m| m > current) {
            Some(&month) => (year, month),
            None => (year + 1, months[0]),
        }
    };

    let day = if direction.is_backward() {
        calendar::days_in_month(year, month)
    } else {
        1
    };
    let target = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CronError::InvalidDate(format!("{year}-{month:02}-{day:02}")))?;
    calendar::day_boundary(&date.timezone(), target, direction)
}
