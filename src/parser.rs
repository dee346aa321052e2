//! Parser for CRON expressions.
//!
//! [`Expression`](crate::Expression) uses [`ExpressionParser`] to split and
//! validate the expression. Invoking
//!
//! ```rust
//! # use std::str::FromStr as _;
//! #
//! # use cron_expression::Expression;
//! #
//! Expression::from_str("0 0 * * MON");
//! ```
//!
//! is equivalent to
//!
//! ```rust
//! # use cron_expression::{parser::ExpressionParser, Expression};
//! #
//! ExpressionParser::new()
//!     .parse("0 0 * * MON")
//!     .map(Expression::from);
//! ```
//!
//! The parser also understands the usual shortcuts:
//!
//! | Shortcut                  | Expression  |
//! | ------------------------- | ----------- |
//! | `@yearly`, `@annually`    | `0 0 1 1 *` |
//! | `@monthly`                | `0 0 1 * *` |
//! | `@weekly`                 | `0 0 * * 0` |
//! | `@daily`, `@midnight`     | `0 0 * * *` |
//! | `@hourly`                 | `0 * * * *` |

use std::collections::BTreeMap;

use crate::{
    errors::{CronError, InvalidField},
    field::{FieldExpression, FieldKind},
};

/// The five validated fields of an expression, in expression order.
pub type FieldMap = BTreeMap<FieldKind, FieldExpression>;

const SHORTCUTS: [(&str, &str); 7] = [
    ("@yearly", "0 0 1 1 *"),
    ("@annually", "0 0 1 1 *"),
    ("@monthly", "0 0 1 * *"),
    ("@weekly", "0 0 * * 0"),
    ("@daily", "0 0 * * *"),
    ("@midnight", "0 0 * * *"),
    ("@hourly", "0 * * * *"),
];

/// Parser for CRON expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpressionParser;

impl ExpressionParser {
    /// Create a new parser.
    ///
    /// You should probably be using [`Expression`](crate::Expression)'s
    /// implementation of [`FromStr`][std::str::FromStr] instead of invoking this.
    pub fn new() -> Self {
        Self
    }

    /// Parses the expression string into its five fields.
    ///
    /// # Errors
    ///
    /// - [`CronError::InvalidFieldCount`] when the string does not have exactly
    ///   five whitespace separated fields.
    /// - [`CronError::InvalidFields`] naming every field that failed validation.
    pub fn parse(&self, expression: &str) -> Result<FieldMap, CronError> {
        let expression = Self::handle_shortcuts(expression);
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != FieldKind::ALL.len() {
            return Err(CronError::InvalidFieldCount {
                expression: expression.to_string(),
                count: parts.len(),
            });
        }

        let mut fields = FieldMap::new();
        let mut invalid = Vec::new();
        for (kind, part) in FieldKind::ALL.into_iter().zip(parts) {
            match kind.parse(part) {
                Ok(field) => {
                    fields.insert(kind, field);
                }
                Err(error) => {
                    log::debug!("rejected {kind} field `{part}`: {error}");
                    invalid.push(InvalidField {
                        kind,
                        value: part.to_string(),
                    });
                }
            }
        }

        if invalid.is_empty() {
            Ok(fields)
        } else {
            Err(CronError::InvalidFields(invalid))
        }
    }

    /// Returns `true` when [`parse`](Self::parse) would succeed.
    pub fn is_valid(&self, expression: &str) -> bool {
        self.parse(expression).is_ok()
    }

    // Converts named shortcuts into their equivalent expression.
    fn handle_shortcuts(expression: &str) -> &str {
        let trimmed = expression.trim();
        SHORTCUTS
            .iter()
            .find(|(name, _)| trimmed.eq_ignore_ascii_case(name))
            .map_or(expression, |&(_, expanded)| expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn raw(fields: &FieldMap) -> Vec<&str> {
        fields.values().map(FieldExpression::as_str).collect()
    }

    #[test]
    fn test_parse_fields_in_order() {
        let fields = ExpressionParser::new().parse("*/15 1 1,15 JAN 1-5").unwrap();
        assert_eq!(
            fields.keys().copied().collect::<Vec<_>>(),
            FieldKind::ALL.to_vec()
        );
        assert_eq!(raw(&fields), ["*/15", "1", "1,15", "JAN", "1-5"]);
    }

    #[test]
    fn test_parse_extra_whitespace() {
        let fields = ExpressionParser::new()
            .parse("  */15  1 1,15 1\t   1-5    ")
            .unwrap();
        assert_eq!(raw(&fields), ["*/15", "1", "1,15", "1", "1-5"]);
    }

    #[rstest]
    #[case("@yearly", "0 0 1 1 *")]
    #[case("@ANNUALLY", "0 0 1 1 *")]
    #[case("@monthly", "0 0 1 * *")]
    #[case("@weekly", "0 0 * * 0")]
    #[case("@Daily", "0 0 * * *")]
    #[case("@midnight", "0 0 * * *")]
    #[case(" @hourly ", "0 * * * *")]
    fn test_handle_shortcuts(#[case] shortcut: &str, #[case] expected: &str) {
        assert_eq!(ExpressionParser::handle_shortcuts(shortcut), expected);
        assert!(ExpressionParser::new().is_valid(shortcut));
    }

    #[rstest]
    #[case("", 0)]
    #[case("* * * *", 4)]
    #[case("* * * * * *", 6)]
    #[case("@reboot", 1)]
    fn test_invalid_field_count(#[case] expression: &str, #[case] count: usize) {
        match ExpressionParser::new().parse(expression) {
            Err(CronError::InvalidFieldCount { count: found, .. }) => assert_eq!(found, count),
            other => panic!("unexpected result for `{expression}`: {other:?}"),
        }
    }

    #[test]
    fn test_reports_every_invalid_field() {
        let error = ExpressionParser::new().parse("60 * 1,L * 8").unwrap_err();
        assert_eq!(
            error,
            CronError::InvalidFields(vec![
                InvalidField {
                    kind: FieldKind::Minute,
                    value: "60".into()
                },
                InvalidField {
                    kind: FieldKind::DayOfMonth,
                    value: "1,L".into()
                },
                InvalidField {
                    kind: FieldKind::DayOfWeek,
                    value: "8".into()
                },
            ])
        );
        assert!(error.kind().is_syntax());
    }

    #[test]
    fn test_is_valid() {
        let parser = ExpressionParser::new();
        assert!(parser.is_valid("0 0 L * ?"));
        assert!(parser.is_valid("0 12 ? JAN-MAR MON#2"));
        assert!(!parser.is_valid("0 12 ? JAN-MAR MON#6"));
        assert!(!parser.is_valid("0 24 * * *"));
    }
}
