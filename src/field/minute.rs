use chrono::{DateTime, Duration, TimeZone, Timelike};

use super::FieldExpression;
use crate::calendar;
use crate::errors::CronError;
use crate::Direction;

pub(super) fn is_satisfied_by<Tz: TimeZone>(expression: &FieldExpression, date: &DateTime<Tz>) -> bool {
    expression.matches_value(date.minute())
}

pub(super) fn step<Tz: TimeZone>(date: &DateTime<Tz>, direction: Direction) -> Result<DateTime<Tz>, CronError> {
    let date = calendar::truncate_to_minute(date)?;
    calendar::shift(&date, Duration::minutes(if direction.is_backward() { -1 } else { 1 }))
}

// Moves by whole minutes on the absolute clock so DST changes can't skip or
// repeat a candidate.
pub(super) fn increment<Tz: TimeZone>(
    expression: &FieldExpression,
    date: &DateTime<Tz>,
    direction: Direction,
) -> Result<DateTime<Tz>, CronError> {
    let minutes = match expression.values() {
        Some(minutes) if !minutes.is_empty() => minutes,
        _ => return step(date, direction),
    };
    let current = i64::from(date.minute());
    let first = i64::from(minutes[0]);
    let last = i64::from(minutes[minutes.len() - 1]);

    let delta = if direction.is_backward() {
        match minutes.iter().rev().map(|&m| i64::from(m)).find(|&m| m < current) {
            Some(target) => target - current,
            None => last - current - 60,
        }
    } else {
        match minutes.iter().map(|&m| i64::from(m)).find(|&m| m > current) {
            Some(target) => target - current,
            None => 60 - current + first,
        }
    };

    let date = calendar::truncate_to_minute(date)?;
    calendar::shift(&date, Duration::minutes(delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use chrono::Utc;
    use rstest::rstest;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, hour, minute, 0).unwrap()
    }

    #[rstest]
    #[case("*/15", at(10, 7), Direction::Forward, at(10, 15))]
    #[case("*/15", at(10, 45), Direction::Forward, at(11, 0))]
    #[case("5,20", at(10, 20), Direction::Forward, at(11, 5))]
    #[case("*/15", at(10, 7), Direction::Backward, at(10, 0))]
    #[case("*/15", at(10, 0), Direction::Backward, at(9, 45))]
    #[case("30", at(10, 10), Direction::Backward, at(9, 30))]
    #[case("*", at(10, 10), Direction::Backward, at(10, 9))]
    fn test_increment(
        #[case] expression: &str,
        #[case] from: DateTime<Utc>,
        #[case] direction: Direction,
        #[case] expected: DateTime<Utc>,
    ) {
        assert_eq!(
            FieldKind::Minute
                .increment(&from, direction, Some(expression))
                .unwrap(),
            expected
        );
    }

    #[test]
    fn test_is_satisfied_by() {
        assert!(FieldKind::Minute.is_satisfied_by(&at(3, 45), "*/15").unwrap());
        assert!(FieldKind::Minute.is_satisfied_by(&at(3, 46), "0-10,46").unwrap());
        assert!(!FieldKind::Minute.is_satisfied_by(&at(3, 46), "7/20").unwrap());
        assert!(FieldKind::Minute.is_satisfied_by(&at(3, 47), "7/20").unwrap());
    }

    #[test]
    fn test_increment_drops_seconds() {
        let from = Utc.with_ymd_and_hms(2024, 5, 10, 10, 7, 42).unwrap();
        assert_eq!(
            FieldKind::Minute.increment(&from, Direction::Forward, Some("10")).unwrap(),
            at(10, 10)
        );
    }
}
