use std::iter::FusedIterator;

use chrono::{DateTime, TimeZone};

use crate::{errors::CronError, scheduler::Scheduler, Direction};

/// Lazy sequence of run dates produced by the `yield_runs_*` methods of
/// [`Scheduler`].
///
/// Each run is computed on demand from the previous one, so stopping early
/// costs nothing. The sequence ends quietly when no further run can be found.
#[derive(Debug, Clone)]
pub struct Runs<Tz, Z>
where
    Tz: TimeZone,
    Z: TimeZone,
{
    scheduler: Scheduler<Tz>,
    cursor: DateTime<Z>,
    is_first: bool,
    direction: Direction,
    remaining: Option<usize>,
    until: Option<DateTime<Z>>,
    is_done: bool,
}

impl<Tz, Z> Runs<Tz, Z>
where
    Tz: TimeZone,
    Z: TimeZone,
{
    /// Creates a new `Runs` sequence.
    ///
    /// # Arguments
    ///
    /// * `scheduler` - The scheduler computing each run.
    /// * `from` - The reference date of the first run.
    /// * `direction` - Whether to walk forward or backward in time.
    /// * `remaining` - Maximum number of runs, unbounded when `None`.
    /// * `until` - Last date (inclusive) a run may fall on.
    pub(crate) fn new(
        scheduler: Scheduler<Tz>,
        from: DateTime<Z>,
        direction: Direction,
        remaining: Option<usize>,
        until: Option<DateTime<Z>>,
    ) -> Self {
        Runs {
            scheduler,
            cursor: from,
            is_first: true,
            direction,
            remaining,
            until,
            is_done: false,
        }
    }

    fn is_past_until(&self, run: &DateTime<Z>) -> bool {
        match &self.until {
            Some(until) if self.direction.is_backward() => run < until,
            Some(until) => run > until,
            None => false,
        }
    }
}

impl<Tz, Z> Iterator for Runs<Tz, Z>
where
    Tz: TimeZone,
    Z: TimeZone,
{
    type Item = DateTime<Z>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_done || self.remaining == Some(0) {
            return None;
        }

        // Only the reference date may be a run itself; later searches always
        // start strictly after the previous run.
        let allow_current = if self.is_first {
            self.is_first = false;
            self.scheduler.start_date_presence().is_included()
        } else {
            false
        };

        match self
            .scheduler
            .calculate_run(0, &self.cursor, self.direction, allow_current)
        {
            Ok(run) if self.is_past_until(&run) => {
                self.is_done = true;
                None
            }
            Ok(run) => {
                self.cursor = run.clone();
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                Some(run)
            }
            Err(CronError::UnableToProcessRun { max_iteration_count }) => {
                log::debug!(
                    "no run of `{}` within {max_iteration_count} iterations, ending sequence",
                    self.scheduler.expression()
                );
                self.is_done = true;
                None
            }
            Err(error) => {
                log::warn!(
                    "run sequence of `{}` stopped: {error}",
                    self.scheduler.expression()
                );
                self.is_done = true;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_done {
            (0, Some(0))
        } else {
            (0, self.remaining)
        }
    }
}

impl<Tz, Z> FusedIterator for Runs<Tz, Z>
where
    Tz: TimeZone,
    Z: TimeZone,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Expression, SchedulerOptions};
    use chrono::Utc;
    use std::str::FromStr;

    fn scheduler(expression: &str) -> Scheduler<Utc> {
        Scheduler::with_options(
            Expression::from_str(expression).unwrap(),
            Utc,
            SchedulerOptions::default(),
        )
    }

    #[test]
    fn test_runs_are_lazy_and_fused() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut runs = scheduler("0 0 * * *").yield_runs_forward(2, &from);
        assert_eq!(runs.size_hint(), (0, Some(2)));
        assert_eq!(runs.next(), Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()));
        assert_eq!(runs.next(), Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()));
        assert_eq!(runs.next(), None);
        assert_eq!(runs.next(), None);
    }

    #[test]
    fn test_unbounded_runs_can_be_taken() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let runs: Vec<_> = scheduler("0 0 1 */6 *")
            .yield_runs_between(&from, &end)
            .take(3)
            .collect();
        assert_eq!(
            runs,
            [
                Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn test_runs_stop_at_until() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 50, 30).unwrap();
        let runs = scheduler("*/15 * * * *").yield_runs_between(&from, &end);
        assert_eq!(runs.count(), 3);
    }
}
