//! # cron-expression
//!
//! Parses CRON expressions and computes their run dates: the next, the
//! previous, the nth, a lazy sequence of them, or whether a given moment is due.
//!
//! ## Features
//! - Validates all five fields, reporting every invalid field at once.
//! - Supports `L`, `W` and `#` as well as month and weekday names.
//! - Follows the POSIX rule that a restricted day of month and day of week are OR-ed.
//! - Evaluates in any `chrono` timezone and keeps wall-clock hours across DST changes.
//! - Bounds every search, so impossible schedules such as `0 0 30 2 *` fail cleanly.
//!
//! ## Example
//!
//! ```rust
//! use std::str::FromStr;
//!
//! use chrono::{TimeZone, Utc};
//! use cron_expression::{Expression, Scheduler, SchedulerOptions};
//!
//! // Every Friday at midnight
//! let expression = Expression::from_str("0 0 * * FRI").expect("valid expression");
//! let scheduler = Scheduler::with_options(expression, Utc, SchedulerOptions::default());
//!
//! let from = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();
//! let next = scheduler.run(0, &from).unwrap();
//! assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap());
//!
//! let previous = scheduler.run(-1, &from).unwrap();
//! assert_eq!(previous, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
//! ```
//!
//! ## Expression
//!
//! ```text
//! ┌────────────── minute (0 - 59)
//! │ ┌──────────── hour (0 - 23)
//! │ │ ┌────────── day of month (1 - 31)
//! │ │ │ ┌──────── month (1 - 12, JAN-DEC)
//! │ │ │ │ ┌────── day of week (0 - 7, SUN-SAT)
//! │ │ │ │ │       (0 to 6 are Sunday to Saturday; 7 is Sunday, the same as 0)
//! │ │ │ │ │
//! * * * * *
//! ```
//!
//! | Field        | Allowed values  | Allowed special characters | Remarks                                                                  |
//! | ------------ | --------------- | -------------------------- | ------------------------------------------------------------------------ |
//! | Minutes      | 0-59            | * , - /                    |                                                                          |
//! | Hours        | 0-23            | * , - /                    |                                                                          |
//! | Day of Month | 1-31            | * , - / ? L W              | `L` and `W` cannot be part of a list, neither can ranges                 |
//! | Month        | 1-12 or JAN-DEC | * , - /                    |                                                                          |
//! | Day of Week  | 0-7 or SUN-SAT  | * , - / ? # L              | `5L` is the last Friday of the month, `5#2` the second Friday             |
//!
//! The shortcuts `@yearly`, `@annually`, `@monthly`, `@weekly`, `@daily`,
//! `@midnight` and `@hourly` are accepted in place of an expression.

use strum::EnumIs;

mod calendar;
mod errors;
mod expression;
pub mod field;
mod iterator;
pub mod parser;
mod scheduler;

pub use errors::{CronError, ErrorKind, InvalidField};
pub use expression::Expression;
pub use field::{FieldExpression, FieldKind, Term};
pub use iterator::Runs;
pub use parser::{ExpressionParser, FieldMap};
pub use scheduler::{
    Scheduler, SchedulerOptions, SchedulerOptionsBuilder, StartDatePresence,
    DEFAULT_MAX_ITERATION_COUNT,
};

/// Which way in time a search walks from its reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum Direction {
    Forward,
    Backward,
}
