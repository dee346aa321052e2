use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{
    de::{self, Visitor},
    Deserialize, Serialize, Serializer,
};

use crate::{
    errors::{CronError, InvalidField},
    field::{FieldExpression, FieldKind},
    parser::{ExpressionParser, FieldMap},
};

/// A validated five-field CRON expression.
///
/// An `Expression` is immutable: the `with_*` methods validate the new field
/// and return a new value, leaving `self` untouched. Two expressions are equal
/// when their five field strings are equal.
///
/// ```
/// use std::str::FromStr;
/// use cron_expression::Expression;
///
/// let expression = Expression::from_str("0 12 * * MON-FRI").unwrap();
/// assert_eq!(expression.hour(), "12");
///
/// let weekends = expression.with_day_of_week("SAT,SUN").unwrap();
/// assert_eq!(weekends.to_string(), "0 12 * * SAT,SUN");
/// assert_eq!(expression.day_of_week(), "MON-FRI");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression {
    minute: FieldExpression,
    hour: FieldExpression,
    day_of_month: FieldExpression,
    month: FieldExpression,
    day_of_week: FieldExpression,
}

impl Expression {
    /// Parses a five-field expression or one of the `@` shortcuts.
    pub fn new(expression: &str) -> Result<Self, CronError> {
        Self::from_str(expression)
    }

    /// Builds an expression from individual fields. Fields left out are `*`.
    ///
    /// # Errors
    ///
    /// [`CronError::InvalidFields`] naming every field that failed validation.
    ///
    /// ```
    /// use cron_expression::{Expression, FieldKind};
    ///
    /// let expression = Expression::from_fields([
    ///     (FieldKind::Minute, "30"),
    ///     (FieldKind::Hour, "6"),
    /// ])
    /// .unwrap();
    /// assert_eq!(expression.to_string(), "30 6 * * *");
    /// ```
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, CronError>
    where
        I: IntoIterator<Item = (FieldKind, &'a str)>,
    {
        let mut parsed = FieldMap::new();
        let mut invalid = Vec::new();
        for (kind, value) in fields {
            match kind.parse(value) {
                Ok(field) => {
                    parsed.insert(kind, field);
                }
                Err(_) => invalid.push(InvalidField {
                    kind,
                    value: value.to_string(),
                }),
            }
        }
        if invalid.is_empty() {
            Ok(Self::from(parsed))
        } else {
            Err(CronError::InvalidFields(invalid))
        }
    }

    /// `0 0 1 1 *`
    pub fn yearly() -> Self {
        Self::at(0, Some(0), Some(1), Some(1), None)
    }

    /// `0 0 1 * *`
    pub fn monthly() -> Self {
        Self::at(0, Some(0), Some(1), None, None)
    }

    /// `0 0 * * 0`
    pub fn weekly() -> Self {
        Self::at(0, Some(0), None, None, Some(0))
    }

    /// `0 0 * * *`
    pub fn daily() -> Self {
        Self::at(0, Some(0), None, None, None)
    }

    /// `0 * * * *`
    pub fn hourly() -> Self {
        Self::at(0, None, None, None, None)
    }

    fn at(
        minute: u32,
        hour: Option<u32>,
        day_of_month: Option<u32>,
        month: Option<u32>,
        day_of_week: Option<u32>,
    ) -> Self {
        let field = |kind: FieldKind, value: Option<u32>| match value {
            Some(value) => FieldExpression::literal(kind, value),
            None => FieldExpression::wildcard(kind),
        };
        Self {
            minute: FieldExpression::literal(FieldKind::Minute, minute),
            hour: field(FieldKind::Hour, hour),
            day_of_month: field(FieldKind::DayOfMonth, day_of_month),
            month: field(FieldKind::Month, month),
            day_of_week: field(FieldKind::DayOfWeek, day_of_week),
        }
    }

    pub fn minute(&self) -> &str {
        self.minute.as_str()
    }

    pub fn hour(&self) -> &str {
        self.hour.as_str()
    }

    pub fn day_of_month(&self) -> &str {
        self.day_of_month.as_str()
    }

    pub fn month(&self) -> &str {
        self.month.as_str()
    }

    pub fn day_of_week(&self) -> &str {
        self.day_of_week.as_str()
    }

    /// The parsed field for `kind`.
    pub fn field(&self, kind: FieldKind) -> &FieldExpression {
        match kind {
            FieldKind::Minute => &self.minute,
            FieldKind::Hour => &self.hour,
            FieldKind::DayOfMonth => &self.day_of_month,
            FieldKind::Month => &self.month,
            FieldKind::DayOfWeek => &self.day_of_week,
        }
    }

    /// All five fields keyed by kind, in expression order.
    pub fn fields(&self) -> FieldMap {
        FieldKind::ALL
            .into_iter()
            .map(|kind| (kind, self.field(kind).clone()))
            .collect()
    }

    pub fn with_minute(&self, value: &str) -> Result<Self, CronError> {
        self.with_field(FieldKind::Minute, value)
    }

    pub fn with_hour(&self, value: &str) -> Result<Self, CronError> {
        self.with_field(FieldKind::Hour, value)
    }

    pub fn with_day_of_month(&self, value: &str) -> Result<Self, CronError> {
        self.with_field(FieldKind::DayOfMonth, value)
    }

    pub fn with_month(&self, value: &str) -> Result<Self, CronError> {
        self.with_field(FieldKind::Month, value)
    }

    pub fn with_day_of_week(&self, value: &str) -> Result<Self, CronError> {
        self.with_field(FieldKind::DayOfWeek, value)
    }

    /// Returns a copy with the `kind` field replaced by `value`.
    ///
    /// # Errors
    ///
    /// The error of [`FieldKind::parse`] when `value` is not valid for `kind`.
    pub fn with_field(&self, kind: FieldKind, value: &str) -> Result<Self, CronError> {
        if self.field(kind).as_str() == value {
            return Ok(self.clone());
        }
        Ok(self.replace(kind.parse(value)?))
    }

    pub(crate) fn with_wildcard(&self, kind: FieldKind) -> Self {
        self.replace(FieldExpression::wildcard(kind))
    }

    fn replace(&self, field: FieldExpression) -> Self {
        let mut expression = self.clone();
        match field.kind() {
            FieldKind::Minute => expression.minute = field,
            FieldKind::Hour => expression.hour = field,
            FieldKind::DayOfMonth => expression.day_of_month = field,
            FieldKind::Month => expression.month = field,
            FieldKind::DayOfWeek => expression.day_of_week = field,
        }
        expression
    }
}

impl Default for Expression {
    /// `* * * * *`, every minute.
    fn default() -> Self {
        Self::from(FieldMap::new())
    }
}

// Missing fields are `*`.
impl From<FieldMap> for Expression {
    fn from(mut fields: FieldMap) -> Self {
        let mut take = |kind: FieldKind| {
            fields
                .remove(&kind)
                .unwrap_or_else(|| FieldExpression::wildcard(kind))
        };
        Self {
            minute: take(FieldKind::Minute),
            hour: take(FieldKind::Hour),
            day_of_month: take(FieldKind::DayOfMonth),
            month: take(FieldKind::Month),
            day_of_week: take(FieldKind::DayOfWeek),
        }
    }
}

impl FromStr for Expression {
    type Err = CronError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        ExpressionParser::new().parse(expression).map(Self::from)
    }
}

impl TryFrom<&str> for Expression {
    type Error = CronError;

    fn try_from(expression: &str) -> Result<Self, Self::Error> {
        Self::from_str(expression)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}

#[cfg(feature = "serde")]
struct ExpressionVisitor;

#[cfg(feature = "serde")]
impl Visitor<'_> for ExpressionVisitor {
    type Value = Expression;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a valid CRON expression")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Expression::from_str(v).map_err(de::Error::custom)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Expression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(ExpressionVisitor)
    }
}
