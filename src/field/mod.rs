//! Per-field validation, matching and stepping.
//!
//! Every [`FieldKind`] knows three things about its part of a CRON expression:
//! whether a field expression is well formed, whether a date satisfies it, and
//! how to move a date to the next (or previous) candidate for it. The
//! validators are stateless; all of them are plain functions behind the
//! `FieldKind` enum.

mod day_of_month;
mod day_of_week;
mod hour;
mod minute;
mod month;
pub mod term;

use chrono::{DateTime, TimeZone};
use strum::{Display, EnumIs, EnumString, IntoStaticStr};

use crate::errors::CronError;
use crate::Direction;
pub use term::{FieldExpression, Term};

const MONTH_NAMES: [(&str, u32); 12] = [
    ("JAN", 1),
    ("FEB", 2),
    ("MAR", 3),
    ("APR", 4),
    ("MAY", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AUG", 8),
    ("SEP", 9),
    ("OCT", 10),
    ("NOV", 11),
    ("DEC", 12),
];

const WEEKDAY_NAMES: [(&str, u32); 7] = [
    ("SUN", 0),
    ("MON", 1),
    ("TUE", 2),
    ("WED", 3),
    ("THU", 4),
    ("FRI", 5),
    ("SAT", 6),
];

/// The five fields of a CRON expression, declared in expression order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIs,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl FieldKind {
    /// All fields in the order they appear in an expression string.
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::DayOfWeek,
    ];

    /// Coarsest to finest, the order in which a run search tightens a date.
    pub const SEARCH_ORDER: [FieldKind; 5] = [
        FieldKind::Month,
        FieldKind::DayOfMonth,
        FieldKind::DayOfWeek,
        FieldKind::Hour,
        FieldKind::Minute,
    ];

    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn range_start(self) -> u32 {
        match self {
            FieldKind::Minute | FieldKind::Hour | FieldKind::DayOfWeek => 0,
            FieldKind::DayOfMonth | FieldKind::Month => 1,
        }
    }

    pub fn range_end(self) -> u32 {
        match self {
            FieldKind::Minute => 59,
            FieldKind::Hour => 23,
            FieldKind::DayOfMonth => 31,
            FieldKind::Month => 12,
            FieldKind::DayOfWeek => 7,
        }
    }

    /// Number of values between `range_start` and `range_end`, inclusive.
    pub fn size(self) -> u32 {
        self.range_end() - self.range_start() + 1
    }

    /// Symbolic names accepted in place of numbers.
    pub fn literal_names(self) -> &'static [(&'static str, u32)] {
        match self {
            FieldKind::Month => &MONTH_NAMES,
            FieldKind::DayOfWeek => &WEEKDAY_NAMES,
            _ => &[],
        }
    }

    pub(crate) fn allows_dont_care(self) -> bool {
        matches!(self, FieldKind::DayOfMonth | FieldKind::DayOfWeek)
    }

    /// Parses a field expression into its terms.
    pub fn parse(self, expression: &str) -> Result<FieldExpression, CronError> {
        FieldExpression::parse(self, expression)
    }

    /// Returns `true` when `expression` is a well formed expression for this field.
    pub fn is_valid(self, expression: &str) -> bool {
        self.parse(expression).is_ok()
    }

    /// Evaluates whether the date's component for this field matches `expression`.
    ///
    /// # Errors
    ///
    /// The expression is validated first; malformed text is reported as a
    /// syntax error, impossible ranges and steps as a range error.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use cron_expression::FieldKind;
    ///
    /// let friday = Utc.with_ymd_and_hms(2011, 7, 8, 0, 0, 0).unwrap();
    /// assert!(FieldKind::DayOfWeek.is_satisfied_by(&friday, "5#2").unwrap());
    /// assert!(!FieldKind::DayOfWeek.is_satisfied_by(&friday, "5L").unwrap());
    /// ```
    pub fn is_satisfied_by<Tz: TimeZone>(
        self,
        date: &DateTime<Tz>,
        expression: &str,
    ) -> Result<bool, CronError> {
        Ok(self.parse(expression)?.is_satisfied_by(date))
    }

    /// Moves `date` to the earliest (or going backward, latest) date-time
    /// strictly after (before) it that can satisfy `expression` for this field.
    ///
    /// Finer fields are reset: to zero going forward, to their maximum going
    /// backward. `None` or `*` performs a plain one-unit step.
    pub fn increment<Tz: TimeZone>(
        self,
        date: &DateTime<Tz>,
        direction: Direction,
        expression: Option<&str>,
    ) -> Result<DateTime<Tz>, CronError> {
        match expression {
            Some(expression) => self.parse(expression)?.increment(date, direction),
            None => self.step(date, direction),
        }
    }

    /// Expands `expression` into its ascending, deduplicated set of values.
    ///
    /// # Errors
    ///
    /// Calendar-dependent terms (`L`, `W`, `#`, `?`) have no fixed expansion
    /// and are rejected, as is any invalid expression.
    ///
    /// ```
    /// use cron_expression::FieldKind;
    ///
    /// assert_eq!(
    ///     FieldKind::Minute.range_for_expression("10-30/10,45").unwrap(),
    ///     vec![10, 20, 30, 45]
    /// );
    /// ```
    pub fn range_for_expression(self, expression: &str) -> Result<Vec<u32>, CronError> {
        let parsed = self.parse(expression)?;
        parsed.values().ok_or_else(|| {
            CronError::syntax(self, expression, "expression depends on the calendar")
        })
    }

    pub(crate) fn step<Tz: TimeZone>(
        self,
        date: &DateTime<Tz>,
        direction: Direction,
    ) -> Result<DateTime<Tz>, CronError> {
        match self {
            FieldKind::Minute => minute::step(date, direction),
            FieldKind::Hour => hour::step(date, direction),
            FieldKind::DayOfMonth | FieldKind::DayOfWeek => day_of_month::step(date, direction),
            FieldKind::Month => month::step(date, direction),
        }
    }
}

impl FieldExpression {
    pub fn is_satisfied_by<Tz: TimeZone>(&self, date: &DateTime<Tz>) -> bool {
        match self.kind() {
            FieldKind::Minute => minute::is_satisfied_by(self, date),
            FieldKind::Hour => hour::is_satisfied_by(self, date),
            FieldKind::DayOfMonth => day_of_month::is_satisfied_by(self, date),
            FieldKind::Month => month::is_satisfied_by(self, date),
            FieldKind::DayOfWeek => day_of_week::is_satisfied_by(self, date),
        }
    }

    pub fn increment<Tz: TimeZone>(
        &self,
        date: &DateTime<Tz>,
        direction: Direction,
    ) -> Result<DateTime<Tz>, CronError> {
        if self.is_wildcard() {
            return self.kind().step(date, direction);
        }
        match self.kind() {
            FieldKind::Minute => minute::increment(self, date, direction),
            FieldKind::Hour => hour::increment(self, date, direction),
            FieldKind::DayOfMonth => day_of_month::increment(self, date, direction),
            FieldKind::Month => month::increment(self, date, direction),
            FieldKind::DayOfWeek => day_of_week::increment(self, date, direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    #[test]
    fn test_names_round_trip() {
        for kind in FieldKind::ALL {
            assert_eq!(FieldKind::from_str(kind.name()).unwrap(), kind);
        }
        assert_eq!(FieldKind::DayOfMonth.to_string(), "dayOfMonth");
        assert_eq!(FieldKind::from_str("DAYOFWEEK").unwrap(), FieldKind::DayOfWeek);
        assert!(FieldKind::from_str("second").is_err());
    }

    #[test]
    fn test_bounds() {
        assert_eq!(
            FieldKind::ALL.map(|kind| (kind.range_start(), kind.range_end())),
            [(0, 59), (0, 23), (1, 31), (1, 12), (0, 7)]
        );
        assert_eq!(FieldKind::DayOfWeek.size(), 8);
    }

    #[test]
    fn test_is_valid() {
        assert!(FieldKind::Minute.is_valid("*/15"));
        assert!(FieldKind::Month.is_valid("JAN-JUN"));
        assert!(!FieldKind::Month.is_valid("JAN-FOO"));
        assert!(FieldKind::DayOfWeek.is_valid("MON#3"));
        assert!(!FieldKind::Hour.is_valid("L"));
    }

    #[test]
    fn test_unvalidated_expression_raises() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let error = FieldKind::Minute.is_satisfied_by(&date, "50-70").unwrap_err();
        assert!(error.kind().is_range());
        let error = FieldKind::Hour.increment(&date, Direction::Forward, Some("*/0")).unwrap_err();
        assert!(error.kind().is_range());
        let error = FieldKind::DayOfWeek.is_satisfied_by(&date, "1#a").unwrap_err();
        assert!(error.kind().is_syntax());
    }

    #[test]
    fn test_range_for_expression() {
        assert_eq!(
            FieldKind::Hour.range_for_expression("*/6").unwrap(),
            vec![0, 6, 12, 18]
        );
        assert_eq!(
            FieldKind::Month.range_for_expression("NOV,FEB-MAR").unwrap(),
            vec![2, 3, 11]
        );
        assert!(FieldKind::DayOfMonth.range_for_expression("L").is_err());
    }

    #[test]
    fn test_range_for_expression_stays_within_bounds() {
        for kind in FieldKind::ALL {
            for expression in ["*", "*/2", "*/5", "*/7", "1-5", "2/3"] {
                let values = kind.range_for_expression(expression).unwrap();
                assert!(!values.is_empty());
                assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
                assert!(values
                    .iter()
                    .all(|value| (kind.range_start()..=kind.range_end()).contains(value)));
            }
        }
    }

    #[test]
    fn test_plain_increment_steps_one_unit() {
        let date = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 0).unwrap();
        assert_eq!(
            FieldKind::Minute.increment(&date, Direction::Forward, None).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            FieldKind::Hour.increment(&date, Direction::Backward, Some("*")).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 22, 59, 0).unwrap()
        );
        assert_eq!(
            FieldKind::Month.increment(&date, Direction::Forward, None).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
    }
}
