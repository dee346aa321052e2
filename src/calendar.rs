//! Calendar arithmetic shared by the field validators.
//!
//! Every helper takes and returns values; nothing is adjusted in place.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone,
    Timelike, Utc,
};

use crate::{errors::CronError, Direction};

fn overflow(naive: impl std::fmt::Display) -> CronError {
    CronError::InvalidDate(format!("{naive} is outside the supported calendar"))
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the given month, 28 to 31.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Shifts a date-time by an absolute duration.
pub(crate) fn shift<Tz: TimeZone>(
    date: &DateTime<Tz>,
    delta: Duration,
) -> Result<DateTime<Tz>, CronError> {
    date.clone()
        .checked_add_signed(delta)
        .ok_or_else(|| overflow(date.naive_local()))
}

/// Drops seconds and sub-seconds, keeping the wall-clock minute.
pub(crate) fn truncate_to_minute<Tz: TimeZone>(
    date: &DateTime<Tz>,
) -> Result<DateTime<Tz>, CronError> {
    shift(
        date,
        -(Duration::seconds(i64::from(date.second()))
            + Duration::nanoseconds(i64::from(date.nanosecond()))),
    )
}

/// Offset change, in seconds, between one hour ago and `date`. Positive right
/// after clocks moved forward.
pub(crate) fn offset_jump<Tz: TimeZone>(date: &DateTime<Tz>) -> Result<i32, CronError> {
    let hour_ago = shift(date, -Duration::hours(1))?;
    Ok(date.offset().fix().local_minus_utc() - hour_ago.offset().fix().local_minus_utc())
}

/// Attaches `timezone` to a wall-clock time.
///
/// A time skipped by a DST jump is read with the offset in force before the
/// jump, which moves it forward by the length of the gap. A repeated time
/// resolves to its earliest instant going forward and its latest going
/// backward.
pub(crate) fn from_local<Tz: TimeZone>(
    timezone: &Tz,
    naive: NaiveDateTime,
    direction: Direction,
) -> Result<DateTime<Tz>, CronError> {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(date) => Ok(date),
        LocalResult::Ambiguous(earliest, latest) => Ok(match direction {
            Direction::Forward => earliest,
            Direction::Backward => latest,
        }),
        LocalResult::None => {
            let before = naive
                .checked_sub_signed(Duration::days(1))
                .ok_or_else(|| overflow(naive))?;
            let offset = timezone
                .offset_from_local_datetime(&before)
                .earliest()
                .ok_or_else(|| overflow(naive))?
                .fix();
            let utc = naive
                .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
                .ok_or_else(|| overflow(naive))?;
            Ok(timezone.from_utc_datetime(&utc))
        }
    }
}

/// Start (00:00) of `day` going forward, its last minute (23:59) going backward.
pub(crate) fn day_boundary<Tz: TimeZone>(
    timezone: &Tz,
    day: NaiveDate,
    direction: Direction,
) -> Result<DateTime<Tz>, CronError> {
    let naive = if direction.is_backward() {
        day.and_hms_opt(23, 59, 0)
    } else {
        day.and_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| overflow(day))?;
    from_local(timezone, naive, direction)
}

/// First day of the month after (going backward: last day of the month before) the
/// month of `day`.
pub(crate) fn adjacent_month(day: NaiveDate, direction: Direction) -> Result<NaiveDate, CronError> {
    let first = day.with_day(1).ok_or_else(|| overflow(day))?;
    if direction.is_backward() {
        first.pred_opt().ok_or_else(|| overflow(day))
    } else {
        let (year, month) = match first.month() {
            12 => (first.year() + 1, 1),
            month => (first.year(), month + 1),
        };
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| overflow(day))
    }
}

/// Adds or removes one hour on a fixed-offset (UTC) clock, then returns to the
/// original timezone. Minutes are reset to 0 going forward and 59 going
/// backward.
pub(crate) fn hour_step<Tz: TimeZone>(
    date: &DateTime<Tz>,
    direction: Direction,
) -> Result<DateTime<Tz>, CronError> {
    let utc = date.with_timezone(&Utc);
    let moved = utc
        .checked_add_signed(Duration::hours(if direction.is_backward() { -1 } else { 1 }))
        .ok_or_else(|| overflow(date.naive_local()))?;
    let local = truncate_to_minute(&moved.with_timezone(&date.timezone()))?;
    let minute = i64::from(local.minute());
    if direction.is_backward() {
        shift(&local, Duration::minutes(59 - minute))
    } else {
        shift(&local, Duration::minutes(-minute))
    }
}
