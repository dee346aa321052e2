use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use derive_builder::Builder;
use strum::{Display, EnumIs, EnumString};

use crate::{
    calendar,
    errors::CronError,
    expression::Expression,
    field::{FieldExpression, FieldKind},
    iterator::Runs,
    Direction,
};

/// Default bound on search iterations for a single run date.
pub const DEFAULT_MAX_ITERATION_COUNT: usize = 1000;

/// Whether a reference date that matches the expression counts as a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIs)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StartDatePresence {
    #[default]
    Excluded,
    Included,
}

impl StartDatePresence {
    /// Reads the `excluded` / `included` flag, ignoring case.
    ///
    /// # Errors
    ///
    /// [`CronError::UnsupportedStartDatePresence`] for any other flag.
    pub fn parse(flag: &str) -> Result<Self, CronError> {
        flag.trim()
            .parse()
            .map_err(|_| CronError::UnsupportedStartDatePresence(flag.to_string()))
    }
}

/// Scheduler settings besides the expression and the timezone.
///
/// In order to build custom options use [`SchedulerOptions::builder`].
///
/// ```
/// use cron_expression::{SchedulerOptions, StartDatePresence};
///
/// let options = SchedulerOptions::builder()
///     .start_date_presence(StartDatePresence::Included)
///     .max_iteration_count(5000)
///     .build();
/// assert_eq!(options.max_iteration_count(), 5000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Builder)]
#[builder(default, build_fn(skip), pattern = "owned")]
pub struct SchedulerOptions {
    /// Whether a matching reference date is itself a run.
    start_date_presence: StartDatePresence,
    /// Upper bound on search iterations per computed run date.
    max_iteration_count: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            start_date_presence: StartDatePresence::default(),
            max_iteration_count: DEFAULT_MAX_ITERATION_COUNT,
        }
    }
}

impl SchedulerOptions {
    /// Equivalent to [`SchedulerOptionsBuilder::default`].
    pub fn builder() -> SchedulerOptionsBuilder {
        SchedulerOptionsBuilder::default()
    }

    pub fn start_date_presence(&self) -> StartDatePresence {
        self.start_date_presence
    }

    pub fn max_iteration_count(&self) -> usize {
        self.max_iteration_count
    }
}

impl SchedulerOptionsBuilder {
    pub fn build(self) -> SchedulerOptions {
        let SchedulerOptionsBuilder {
            start_date_presence,
            max_iteration_count,
        } = self;
        let defaults = SchedulerOptions::default();
        SchedulerOptions {
            start_date_presence: start_date_presence.unwrap_or(defaults.start_date_presence),
            max_iteration_count: max_iteration_count.unwrap_or(defaults.max_iteration_count),
        }
    }
}

/// Computes run dates of an [`Expression`] in a timezone.
///
/// Every call is independent: a scheduler holds configuration only, so one
/// instance can be shared freely. Reference dates may be in any timezone;
/// they are evaluated in the scheduler's timezone and results are returned in
/// the timezone of the reference date.
///
/// The search works at minute resolution. Seconds of the reference date are
/// dropped before evaluation.
#[derive(Debug, Clone)]
pub struct Scheduler<Tz: TimeZone = Local> {
    expression: Expression,
    timezone: Tz,
    options: SchedulerOptions,
}

impl Scheduler<Local> {
    /// A scheduler in the system timezone with default options.
    pub fn new(expression: Expression) -> Self {
        Self::with_options(expression, Local, SchedulerOptions::default())
    }
}

impl<Tz: TimeZone> Scheduler<Tz> {
    pub fn with_options(expression: Expression, timezone: Tz, options: SchedulerOptions) -> Self {
        Self {
            expression,
            timezone,
            options,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    pub fn options(&self) -> SchedulerOptions {
        self.options
    }

    pub fn start_date_presence(&self) -> StartDatePresence {
        self.options.start_date_presence
    }

    pub fn max_iteration_count(&self) -> usize {
        self.options.max_iteration_count
    }

    pub fn with_expression(&self, expression: Expression) -> Self {
        Self {
            expression,
            ..self.clone()
        }
    }

    pub fn with_timezone<T: TimeZone>(&self, timezone: T) -> Scheduler<T> {
        Scheduler::with_options(self.expression.clone(), timezone, self.options)
    }

    pub fn include_start_date(&self) -> Self {
        self.with_start_date_presence(StartDatePresence::Included)
    }

    pub fn exclude_start_date(&self) -> Self {
        self.with_start_date_presence(StartDatePresence::Excluded)
    }

    pub fn with_start_date_presence(&self, start_date_presence: StartDatePresence) -> Self {
        let mut scheduler = self.clone();
        scheduler.options.start_date_presence = start_date_presence;
        scheduler
    }

    pub fn with_max_iteration_count(&self, max_iteration_count: usize) -> Self {
        let mut scheduler = self.clone();
        scheduler.options.max_iteration_count = max_iteration_count;
        scheduler
    }

    /// Returns the `nth` run date relative to `from`.
    ///
    /// `0` is the next run, `1` the one after it. Negative values walk
    /// backward: `-1` is the previous run, `-2` the one before it.
    ///
    /// # Errors
    ///
    /// [`CronError::UnableToProcessRun`] when no run is found within the
    /// configured iteration bound, e.g. for `0 0 30 2 *`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// use chrono::{TimeZone, Utc};
    /// use cron_expression::{Expression, Scheduler, SchedulerOptions};
    ///
    /// let expression = Expression::from_str("*/2 */2 * * *").unwrap();
    /// let scheduler = Scheduler::with_options(expression, Utc, SchedulerOptions::default());
    ///
    /// let from = Utc.with_ymd_and_hms(2015, 8, 10, 21, 47, 27).unwrap();
    /// assert_eq!(
    ///     scheduler.run(0, &from).unwrap(),
    ///     Utc.with_ymd_and_hms(2015, 8, 10, 22, 0, 0).unwrap()
    /// );
    /// assert_eq!(
    ///     scheduler.run(-1, &from).unwrap(),
    ///     Utc.with_ymd_and_hms(2015, 8, 10, 20, 58, 0).unwrap()
    /// );
    /// ```
    pub fn run<Z: TimeZone>(&self, nth: i64, from: &DateTime<Z>) -> Result<DateTime<Z>, CronError> {
        let (direction, skip) = if nth < 0 {
            (Direction::Backward, -(nth + 1))
        } else {
            (Direction::Forward, nth)
        };
        self.calculate_run(
            skip.unsigned_abs() as usize,
            from,
            direction,
            self.start_date_presence().is_included(),
        )
    }

    /// The next run date after `from`.
    pub fn next_run<Z: TimeZone>(&self, from: &DateTime<Z>) -> Result<DateTime<Z>, CronError> {
        self.run(0, from)
    }

    /// The most recent run date before `from`.
    pub fn previous_run<Z: TimeZone>(&self, from: &DateTime<Z>) -> Result<DateTime<Z>, CronError> {
        self.run(-1, from)
    }

    /// [`run`](Self::run) relative to the current time.
    pub fn run_now(&self, nth: i64) -> Result<DateTime<Tz>, CronError> {
        self.run(nth, &self.now())
    }

    /// Whether the expression matches `date`, to the minute.
    ///
    /// The start date policy does not apply: `date` itself is always a
    /// candidate. A schedule that never runs is never due.
    pub fn is_due<Z: TimeZone>(&self, date: &DateTime<Z>) -> Result<bool, CronError> {
        let date = calendar::truncate_to_minute(date)?;
        match self.calculate_run(0, &date, Direction::Forward, true) {
            Ok(run) => Ok(run == date),
            Err(CronError::UnableToProcessRun { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    pub fn is_due_now(&self) -> Result<bool, CronError> {
        self.is_due(&self.now())
    }

    /// Lazily yields up to `count` run dates after `from`, stopping early when
    /// no further run can be found.
    ///
    /// ```
    /// use std::str::FromStr;
    /// use chrono::{TimeZone, Utc};
    /// use cron_expression::{Expression, Scheduler, SchedulerOptions};
    ///
    /// let expression = Expression::from_str("0 9 * * MON").unwrap();
    /// let scheduler = Scheduler::with_options(expression, Utc, SchedulerOptions::default());
    ///
    /// let from = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    /// let runs: Vec<_> = scheduler.yield_runs_forward(3, &from).collect();
    /// assert_eq!(runs.len(), 3);
    /// assert_eq!(runs[0], Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap());
    /// ```
    pub fn yield_runs_forward<Z: TimeZone>(&self, count: usize, from: &DateTime<Z>) -> Runs<Tz, Z> {
        Runs::new(self.clone(), from.clone(), Direction::Forward, Some(count), None)
    }

    /// Lazily yields up to `count` run dates before `from`, most recent first.
    pub fn yield_runs_backward<Z: TimeZone>(&self, count: usize, from: &DateTime<Z>) -> Runs<Tz, Z> {
        Runs::new(self.clone(), from.clone(), Direction::Backward, Some(count), None)
    }

    /// Lazily yields every run date from `start` up to and including `end`.
    ///
    /// Walks backward in time when `end` is before `start`. Whether `start`
    /// itself can be yielded follows the start date policy.
    pub fn yield_runs_between<Z: TimeZone>(&self, start: &DateTime<Z>, end: &DateTime<Z>) -> Runs<Tz, Z> {
        let direction = if end < start {
            Direction::Backward
        } else {
            Direction::Forward
        };
        Runs::new(self.clone(), start.clone(), direction, None, Some(end.clone()))
    }

    /// Reads a date in RFC 3339 form, or as `YYYY-MM-DD HH:MM[:SS]` in the
    /// scheduler's timezone.
    ///
    /// # Errors
    ///
    /// [`CronError::InvalidDate`] when the input matches neither form.
    pub fn parse_date(&self, input: &str) -> Result<DateTime<Tz>, CronError> {
        let input = input.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(input) {
            return Ok(date.with_timezone(&self.timezone));
        }
        let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .ok_or_else(|| CronError::InvalidDate(input.to_string()))?;
        calendar::from_local(&self.timezone, naive, Direction::Forward)
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    /// Searches the `nth` match from `from`, honouring the day-of-month /
    /// day-of-week OR rule.
    pub(crate) fn calculate_run<Z: TimeZone>(
        &self,
        nth: usize,
        from: &DateTime<Z>,
        direction: Direction,
        allow_current: bool,
    ) -> Result<DateTime<Z>, CronError> {
        let day_of_month = self.expression.field(FieldKind::DayOfMonth);
        let day_of_week = self.expression.field(FieldKind::DayOfWeek);
        if !day_of_month.is_wildcard() && !day_of_week.is_wildcard() {
            return self.calculate_split_run(nth, from, direction, allow_current);
        }

        let start = calendar::truncate_to_minute(&from.with_timezone(&self.timezone))?;
        let constrained: Vec<&FieldExpression> = FieldKind::SEARCH_ORDER
            .iter()
            .map(|&kind| self.expression.field(kind))
            .filter(|field| !field.is_wildcard())
            .collect();
        let minute = self.expression.field(FieldKind::Minute);

        let mut candidate = start.clone();
        let mut skip = nth;
        for _ in 0..self.options.max_iteration_count {
            if let Some(field) = constrained
                .iter()
                .find(|field| !field.is_satisfied_by(&candidate))
            {
                log::trace!(
                    "{} `{}` not satisfied by {}",
                    field.kind(),
                    field,
                    candidate.naive_local()
                );
                candidate = field.increment(&candidate, direction)?;
                continue;
            }

            let is_excluded_start = !allow_current && candidate == start;
            if is_excluded_start || skip > 0 {
                if !is_excluded_start {
                    skip -= 1;
                }
                log::trace!("skipping match {}", candidate.naive_local());
                candidate = minute.increment(&candidate, direction)?;
                continue;
            }

            return Ok(candidate.with_timezone(&from.timezone()));
        }

        Err(CronError::UnableToProcessRun {
            max_iteration_count: self.options.max_iteration_count,
        })
    }

    // With both day fields set, a date matches when either one does: search
    // each on its own and merge the two candidate lists.
    fn calculate_split_run<Z: TimeZone>(
        &self,
        nth: usize,
        from: &DateTime<Z>,
        direction: Direction,
        allow_current: bool,
    ) -> Result<DateTime<Z>, CronError> {
        log::debug!(
            "splitting `{}` on day of month and day of week",
            self.expression
        );
        // Every skipped match costs at least one iteration of a plain search.
        let wanted = nth
            .checked_add(1)
            .filter(|&wanted| wanted <= self.options.max_iteration_count)
            .ok_or(CronError::UnableToProcessRun {
                max_iteration_count: self.options.max_iteration_count,
            })?;
        let mut candidates = Vec::new();
        for kind in [FieldKind::DayOfWeek, FieldKind::DayOfMonth] {
            let scheduler = self.with_expression(self.expression.with_wildcard(kind));
            let mut cursor = from.clone();
            let mut allow_current = allow_current;
            for _ in 0..wanted {
                match scheduler.calculate_run(0, &cursor, direction, allow_current) {
                    Ok(run) => {
                        cursor = run.clone();
                        allow_current = false;
                        candidates.push(run);
                    }
                    Err(CronError::UnableToProcessRun { .. }) => break,
                    Err(error) => return Err(error),
                }
            }
        }

        candidates.sort();
        if direction.is_backward() {
            candidates.reverse();
        }
        candidates.dedup();
        candidates
            .into_iter()
            .nth(nth)
            .ok_or(CronError::UnableToProcessRun {
                max_iteration_count: self.options.max_iteration_count,
            })
    }
}
