use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Weekday};

use super::{FieldExpression, Term};
use crate::calendar;
use crate::errors::CronError;
use crate::Direction;

/// The weekday closest to `target` without leaving the month: Saturdays fall
/// back to Friday and Sundays move on to Monday, unless that crosses a month
/// boundary. `None` when the month has no such day.
pub(crate) fn nearest_weekday(year: i32, month: u32, target: u32) -> Option<u32> {
    let last = calendar::days_in_month(year, month);
    if target > last {
        return None;
    }
    let is_weekday = |day: u32| {
        NaiveDate::from_ymd_opt(year, month, day)
            .is_some_and(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
    };
    if is_weekday(target) {
        return Some(target);
    }
    [-1i64, 1, -2, 2]
        .into_iter()
        .map(|offset| i64::from(target) + offset)
        .filter(|&day| day >= 1 && day <= i64::from(last))
        .map(|day| day as u32)
        .find(|&day| is_weekday(day))
}

pub(super) fn is_satisfied_by<Tz: TimeZone>(expression: &FieldExpression, date: &DateTime<Tz>) -> bool {
    let (year, month, day) = (date.year(), date.month(), date.day());
    expression.terms().iter().any(|term| match *term {
        Term::LastDayOfMonth => day == calendar::days_in_month(year, month),
        Term::NearestWeekday(target) => nearest_weekday(year, month, target) == Some(day),
        term => term.contains(expression.kind(), day),
    })
}

/// One day forward to 00:00, or back to 23:59.
pub(super) fn step<Tz: TimeZone>(date: &DateTime<Tz>, direction: Direction) -> Result<DateTime<Tz>, CronError> {
    let today = date.date_naive();
    let day = if direction.is_backward() {
        today.pred_opt()
    } else {
        today.succ_opt()
    }
    .ok_or_else(|| CronError::InvalidDate(today.to_string()))?;
    calendar::day_boundary(&date.timezone(), day, direction)
}

pub(super) fn increment<Tz: TimeZone>(
    expression: &FieldExpression,
    date: &DateTime<Tz>,
    direction: Direction,
) -> Result<DateTime<Tz>, CronError> {
    let days = match expression.values() {
        Some(days) if !days.is_empty() => days,
        _ => return step(date, direction),
    };
    let today = date.date_naive();
    let current = today.day();
    let length = calendar::days_in_month(today.year(), today.month());

    let in_month = if direction.is_backward() {
        days.iter().rev().find(|&&d| d < current)
    } else {
        days.iter().find(|&&d| d > current && d <= length)
    };
    let target = match in_month {
        Some(&day) => today.with_day(day),
        None => {
            // Roll into the adjacent month; when none of the candidates exist
            // there, land on its edge and let the search move on.
            let edge = calendar::adjacent_month(today, direction)?;
            let length = calendar::days_in_month(edge.year(), edge.month());
            let candidate = if direction.is_backward() {
                days.iter().rev().find(|&&d| d <= length)
            } else {
                days.first().filter(|&&d| d <= length)
            };
            match candidate {
                Some(&day) => edge.with_day(day),
                None => Some(edge),
            }
        }
    }
    .ok_or_else(|| CronError::InvalidDate(today.to_string()))?;

    calendar::day_boundary(&date.timezone(), target, direction)
}
