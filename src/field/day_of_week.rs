use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};

use super::{FieldExpression, Term};
use crate::calendar;
use crate::errors::CronError;
use crate::Direction;

fn weekday_of(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Day of the month of the last `weekday` (0-6) in the month.
fn last_weekday(year: i32, month: u32, weekday: u32) -> Option<u32> {
    let last = NaiveDate::from_ymd_opt(year, month, calendar::days_in_month(year, month))?;
    let back = (weekday_of(last) + 7 - weekday) % 7;
    Some(last.day() - back)
}

/// Day of the month of the `nth` `weekday` (0-6), if the month has that many.
fn nth_weekday(year: i32, month: u32, weekday: u32, nth: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let ahead = (weekday + 7 - weekday_of(first)) % 7;
    let day = 1 + ahead + (nth - 1) * 7;
    (day <= calendar::days_in_month(year, month)).then_some(day)
}

pub(super) fn is_satisfied_by<Tz: TimeZone>(expression: &FieldExpression, date: &DateTime<Tz>) -> bool {
    let kind = expression.kind();
    let (year, month, day) = (date.year(), date.month(), date.day());
    let weekday = weekday_of(date.date_naive());
    expression.terms().iter().any(|term| match *term {
        Term::LastWeekday(target) => last_weekday(year, month, target % 7) == Some(day),
        Term::NthWeekday { weekday: target, nth } => {
            target % 7 == weekday && nth_weekday(year, month, weekday, nth) == Some(day)
        }
        term => term.contains(kind, weekday) || (weekday == 0 && term.contains(kind, 7)),
    })
}

pub(super) fn increment<Tz: TimeZone>(
    expression: &FieldExpression,
    date: &DateTime<Tz>,
    direction: Direction,
) -> Result<DateTime<Tz>, CronError> {
    let weekdays: Vec<u32> = match expression.values() {
        Some(values) => values.into_iter().map(|value| value % 7).collect(),
        None => Vec::new(),
    };
    if weekdays.is_empty() {
        return super::day_of_month::step(date, direction);
    }

    let today = date.date_naive();
    let sign = if direction.is_backward() { -1 } else { 1 };
    let target = (1..=7)
        .filter_map(|offset| today.checked_add_signed(Duration::days(sign * offset)))
        .find(|day| weekdays.contains(&weekday_of(*day)))
        .ok_or_else(|| CronError::InvalidDate(today.to_string()))?;
    calendar::day_boundary(&date.timezone(), target, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use chrono::Utc;
    use rstest::rstest;

    fn day(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2011, month, day, 0, 0, 0).unwrap()
    }

    #[rstest]
    // July 2011 starts on a Friday.
    #[case("5#1", day(7, 1), true)]
    #[case("5#2", day(7, 8), true)]
    #[case("5#2", day(7, 1), false)]
    #[case("FRI#5", day(7, 29), true)]
    #[case("1#5", day(7, 25), false)]
    #[case("5L", day(7, 29), true)]
    #[case("5L", day(7, 22), false)]
    #[case("0L", day(7, 31), true)]
    #[case("7L", day(7, 31), true)]
    #[case("0", day(7, 3), true)]
    #[case("7", day(7, 3), true)]
    #[case("5-7", day(7, 3), true)]
    #[case("7-7", day(7, 3), true)]
    #[case("SUN-SUN", day(7, 4), false)]
    #[case("0-0", day(7, 5), false)]
    #[case("MON-FRI", day(7, 2), false)]
    #[case("?", day(7, 2), true)]
    fn test_is_satisfied_by(#[case] expression: &str, #[case] date: DateTime<Utc>, #[case] expected: bool) {
        assert_eq!(
            FieldKind::DayOfWeek.is_satisfied_by(&date, expression).unwrap(),
            expected,
            "{expression} on {date}"
        );
    }

    #[rstest]
    #[case("1", day(7, 1), Direction::Forward, day(7, 4))]
    #[case("1", day(7, 4), Direction::Forward, day(7, 11))]
    #[case("7", day(7, 1), Direction::Forward, day(7, 3))]
    #[case("1,5", day(7, 1), Direction::Backward, Utc.with_ymd_and_hms(2011, 6, 27, 23, 59, 0).unwrap())]
    #[case("5L", day(7, 1), Direction::Forward, day(7, 2))]
    fn test_increment(
        #[case] expression: &str,
        #[case] from: DateTime<Utc>,
        #[case] direction: Direction,
        #[case] expected: DateTime<Utc>,
    ) {
        assert_eq!(
            FieldKind::DayOfWeek
                .increment(&from, direction, Some(expression))
                .unwrap(),
            expected
        );
    }

    #[test]
    fn test_nth_weekday_helpers() {
        assert_eq!(nth_weekday(2011, 7, 5, 1), Some(1));
        assert_eq!(nth_weekday(2011, 7, 1, 1), Some(4));
        assert_eq!(nth_weekday(2011, 2, 1, 5), None);
        assert_eq!(last_weekday(2011, 7, 5), Some(29));
        assert_eq!(last_weekday(2011, 7, 0), Some(31));
    }
}
