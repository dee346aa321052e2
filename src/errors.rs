use std::fmt;

use strum::EnumIs;

use crate::field::FieldKind;

/// Broad classification of a [`CronError`].
///
/// Syntax and range errors are recoverable by fixing the input. A failed run
/// search means the schedule is practically impossible (e.g. February 30th).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum ErrorKind {
    Syntax,
    Range,
    UnableToProcessRun,
}

/// A single field that failed validation while parsing a full expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidField {
    pub kind: FieldKind,
    pub value: String,
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.value)
    }
}

/// Represents errors that can occur while parsing and evaluating CRON expressions.
///
/// Construction and mutation of an [`Expression`](crate::Expression) fail fast,
/// so an expression held by a caller is always valid. Evaluation only fails
/// when handed raw field text that never went through validation, or when a
/// run search exhausts its iteration budget.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CronError {
    /// The expression did not split into exactly five fields.
    #[error("`{expression}` is not a valid CRON expression: expected 5 fields, found {count}")]
    InvalidFieldCount { expression: String, count: usize },

    /// One or more fields of a full expression are invalid. Every failing
    /// field is reported, not only the first one.
    #[error("invalid CRON field(s): {}", join_fields(.0))]
    InvalidFields(Vec<InvalidField>),

    /// A single field expression is malformed.
    #[error("invalid {kind} expression `{value}`: {reason}")]
    InvalidFieldExpression {
        kind: FieldKind,
        value: String,
        reason: String,
    },

    /// The start date presence flag is neither `excluded` nor `included`.
    #[error("unsupported start date presence `{0}`, expected `excluded` or `included`")]
    UnsupportedStartDatePresence(String),

    /// A reference date string could not be understood.
    #[error("unable to parse date `{0}`")]
    InvalidDate(String),

    /// A range or step inside a field expression leaves the field's domain.
    #[error("{kind} expression `{value}` is out of range: {reason}")]
    OutOfRange {
        kind: FieldKind,
        value: String,
        reason: String,
    },

    /// The run search hit its iteration bound without settling on a date.
    #[error("unable to compute a run date within {max_iteration_count} iterations")]
    UnableToProcessRun { max_iteration_count: usize },
}

impl CronError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CronError::InvalidFieldCount { .. }
            | CronError::InvalidFields(_)
            | CronError::InvalidFieldExpression { .. }
            | CronError::UnsupportedStartDatePresence(_)
            | CronError::InvalidDate(_) => ErrorKind::Syntax,
            CronError::OutOfRange { .. } => ErrorKind::Range,
            CronError::UnableToProcessRun { .. } => ErrorKind::UnableToProcessRun,
        }
    }

    pub(crate) fn syntax(kind: FieldKind, value: &str, reason: impl Into<String>) -> Self {
        CronError::InvalidFieldExpression {
            kind,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn range(kind: FieldKind, value: &str, reason: impl Into<String>) -> Self {
        CronError::OutOfRange {
            kind,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

fn join_fields(fields: &[InvalidField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_message_names_every_field() {
        let error = CronError::InvalidFields(vec![
            InvalidField {
                kind: FieldKind::Minute,
                value: "60".into(),
            },
            InvalidField {
                kind: FieldKind::DayOfWeek,
                value: "8".into(),
            },
        ]);
        assert_eq!(
            error.to_string(),
            "invalid CRON field(s): minute `60`, dayOfWeek `8`"
        );
        assert!(error.kind().is_syntax());
    }

    #[test]
    fn test_error_kinds() {
        assert!(CronError::range(FieldKind::Hour, "5-2", "inverted")
            .kind()
            .is_range());
        assert!(CronError::UnableToProcessRun {
            max_iteration_count: 1000
        }
        .kind()
        .is_unable_to_process_run());
        assert!(CronError::InvalidDate("tomorrow".into()).kind().is_syntax());
    }
}
