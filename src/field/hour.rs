use chrono::{DateTime, TimeZone, Timelike};

use super::FieldExpression;
use crate::calendar;
use crate::errors::CronError;
use crate::Direction;

pub(super) fn is_satisfied_by<Tz: TimeZone>(expression: &FieldExpression, date: &DateTime<Tz>) -> bool {
    let hour = date.hour();
    if expression.matches_value(hour) {
        return true;
    }
    // Right after clocks jump forward, the skipped hour is served by the one
    // that replaced it.
    match calendar::offset_jump(date) {
        Ok(jump) if jump >= 3600 => expression.matches_value((hour + 23) % 24),
        _ => false,
    }
}

pub(super) fn step<Tz: TimeZone>(date: &DateTime<Tz>, direction: Direction) -> Result<DateTime<Tz>, CronError> {
    calendar::hour_step(date, direction)
}

pub(super) fn increment<Tz: TimeZone>(
    expression: &FieldExpression,
    date: &DateTime<Tz>,
    direction: Direction,
) -> Result<DateTime<Tz>, CronError> {
    let hours = match expression.values() {
        Some(hours) if !hours.is_empty() => hours,
        _ => return step(date, direction),
    };
    let current = date.hour();
    let today = date.date_naive();

    let (day, hour) = if direction.is_backward() {
        match hours.iter().rev().find(|&&h| h < current) {
            Some(&hour) => (today, hour),
            None => (
                today.pred_opt().ok_or_else(|| CronError::InvalidDate(today.to_string()))?,
                hours[hours.len() - 1],
            ),
        }
    } else {
        match hours.iter().find(|&&h| h > current) {
            Some(&hour) => (today, hour),
            None => (
                today.succ_opt().ok_or_else(|| CronError::InvalidDate(today.to_string()))?,
                hours[0],
            ),
        }
    };

    let minute = if direction.is_backward() { 59 } else { 0 };
    let naive = day
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| CronError::InvalidDate(format!("{day} {hour}:{minute}")))?;
    let candidate = calendar::from_local(&date.timezone(), naive, direction)?;

    // Wall-clock targets can fold back over a repeated hour; the fixed-offset
    // step always makes progress.
    let progressed = if direction.is_backward() {
        candidate < *date
    } else {
        candidate > *date
    };
    if progressed {
        Ok(candidate)
    } else {
        step(date, direction)
    }
}
