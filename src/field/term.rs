use std::fmt;

use super::FieldKind;
use crate::errors::CronError;

/// One comma-separated item of a field expression.
///
/// Field text is parsed into terms once; matching and stepping then work on
/// these values instead of re-scanning the string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    /// `*`
    Wildcard,
    /// `?`, day-of-month and day-of-week only.
    DontCare,
    /// A literal value, numeric or named (`5`, `MAY`, `FRI`).
    Number(u32),
    /// `a-b`, both ends inclusive.
    Range { start: u32, end: u32 },
    /// `a-b/s`, `a/s` and `*/s`.
    SteppedRange { start: u32, end: u32, step: u32 },
    /// `L` in the day-of-month field.
    LastDayOfMonth,
    /// `NW` in the day-of-month field.
    NearestWeekday(u32),
    /// `<weekday>L` in the day-of-week field.
    LastWeekday(u32),
    /// `<weekday>#n` in the day-of-week field.
    NthWeekday { weekday: u32, nth: u32 },
}

impl Term {
    /// Whether the term resolves to a plain set of integers.
    pub fn is_enumerable(&self) -> bool {
        matches!(
            self,
            Term::Wildcard | Term::Number(_) | Term::Range { .. } | Term::SteppedRange { .. }
        )
    }

    /// Tests a raw field value against the term. Calendar-dependent terms
    /// (`L`, `W`, `#`) never match here, the field validators resolve them.
    pub fn contains(&self, kind: FieldKind, value: u32) -> bool {
        match *self {
            Term::Wildcard | Term::DontCare => true,
            Term::Number(number) => number == value,
            Term::Range { start, end } => (start..=end).contains(&value),
            Term::SteppedRange { start, end, step } => match wrapped_step(kind, step) {
                Some(single) => single == value,
                None => (start..=end).contains(&value) && (value - start) % step == 0,
            },
            _ => false,
        }
    }

    fn expand(&self, kind: FieldKind, values: &mut Vec<u32>) {
        match *self {
            Term::Wildcard => values.extend(kind.range_start()..=kind.range_end()),
            Term::Number(number) => values.push(number),
            Term::Range { start, end } => values.extend(start..=end),
            Term::SteppedRange { start, end, step } => match wrapped_step(kind, step) {
                Some(single) => values.push(single),
                None => values.extend((start..=end).step_by(step as usize)),
            },
            _ => {}
        }
    }
}

// A step reaching the end of the field collapses to a single value instead of
// an empty expansion.
fn wrapped_step(kind: FieldKind, step: u32) -> Option<u32> {
    (step >= kind.range_end()).then(|| kind.range_start() + step % kind.size())
}

/// A validated field expression: the original text plus its parsed terms.
#[derive(Debug, Clone)]
pub struct FieldExpression {
    kind: FieldKind,
    raw: String,
    terms: Vec<Term>,
}

impl FieldExpression {
    pub fn parse(kind: FieldKind, expression: &str) -> Result<Self, CronError> {
        let raw = expression.trim();
        if raw.is_empty() {
            return Err(CronError::syntax(kind, raw, "expression is empty"));
        }

        let upper = raw.to_ascii_uppercase();
        let terms = match upper.as_str() {
            "*" => vec![Term::Wildcard],
            "?" if kind.allows_dont_care() => vec![Term::DontCare],
            "?" => return Err(CronError::syntax(kind, raw, "`?` is not allowed here")),
            _ => {
                let items: Vec<&str> = upper.split(',').collect();
                if items.len() > 1 && kind == FieldKind::DayOfMonth {
                    if let Some(item) = items
                        .iter()
                        .find(|item| item.contains(['-', 'W', 'L']))
                    {
                        return Err(CronError::syntax(
                            kind,
                            raw,
                            format!("`{item}` cannot be combined with a list"),
                        ));
                    }
                }
                items
                    .into_iter()
                    .map(|item| parse_term(kind, raw, item))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(Self {
            kind,
            raw: raw.to_string(),
            terms,
        })
    }

    pub(crate) fn wildcard(kind: FieldKind) -> Self {
        Self {
            kind,
            raw: "*".to_string(),
            terms: vec![Term::Wildcard],
        }
    }

    // Caller guarantees `value` is within the field's bounds.
    pub(crate) fn literal(kind: FieldKind, value: u32) -> Self {
        Self {
            kind,
            raw: value.to_string(),
            terms: vec![Term::Number(value)],
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// `*` and `?` impose no constraint and are skipped by the run search.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.terms.as_slice(), [Term::Wildcard] | [Term::DontCare])
    }

    /// True if any term contains `value` (list items are OR-ed).
    pub fn matches_value(&self, value: u32) -> bool {
        self.terms.iter().any(|term| term.contains(self.kind, value))
    }

    /// Expands the expression into its ascending, deduplicated candidates,
    /// or `None` when a term depends on the calendar (`L`, `W`, `#`, `?`).
    pub fn values(&self) -> Option<Vec<u32>> {
        if !self.terms.iter().all(Term::is_enumerable) {
            return None;
        }
        let mut values = Vec::new();
        for term in &self.terms {
            term.expand(self.kind, &mut values);
        }
        values.sort_unstable();
        values.dedup();
        Some(values)
    }
}

impl PartialEq for FieldExpression {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.raw == other.raw
    }
}

impl Eq for FieldExpression {}

impl std::hash::Hash for FieldExpression {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.raw.hash(state);
    }
}

impl fmt::Display for FieldExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_term(kind: FieldKind, raw: &str, item: &str) -> Result<Term, CronError> {
    if item.is_empty() {
        return Err(CronError::syntax(kind, raw, "empty list item"));
    }
    if item == "*" {
        return Ok(Term::Wildcard);
    }

    if kind == FieldKind::DayOfWeek {
        if let Some((weekday, nth)) = item.split_once('#') {
            let weekday = parse_value(kind, raw, weekday)?;
            let nth = parse_number(nth).filter(|nth| (1..=5).contains(nth)).ok_or_else(|| {
                CronError::syntax(kind, raw, "weekday count must be a number between 1 and 5")
            })?;
            return Ok(Term::NthWeekday { weekday, nth });
        }
        if let Some(weekday) = item.strip_suffix('L') {
            return Ok(Term::LastWeekday(parse_value(kind, raw, weekday)?));
        }
    }

    if kind == FieldKind::DayOfMonth {
        if item == "L" {
            return Ok(Term::LastDayOfMonth);
        }
        if let Some(day) = item.strip_suffix('W') {
            return Ok(Term::NearestWeekday(parse_value(kind, raw, day)?));
        }
    }

    if let Some((range, step)) = item.split_once('/') {
        let step = parse_number(step)
            .ok_or_else(|| CronError::syntax(kind, raw, format!("step `{step}` is not a number")))?;
        if step == 0 {
            return Err(CronError::range(kind, raw, "step must be a positive integer"));
        }
        if step > kind.size() {
            return Err(CronError::range(
                kind,
                raw,
                format!("step {step} exceeds the field size of {}", kind.size()),
            ));
        }
        let (start, end) = match range {
            "*" => (kind.range_start(), kind.range_end()),
            _ => match range.split_once('-') {
                Some((start, end)) => parse_bounds(kind, raw, start, end)?,
                None => (parse_value(kind, raw, range)?, kind.range_end()),
            },
        };
        return Ok(Term::SteppedRange { start, end, step });
    }

    if let Some((start, end)) = item.split_once('-') {
        let (start, end) = parse_bounds(kind, raw, start, end)?;
        return Ok(Term::Range { start, end });
    }

    parse_value(kind, raw, item).map(Term::Number)
}

fn parse_bounds(kind: FieldKind, raw: &str, start: &str, end: &str) -> Result<(u32, u32), CronError> {
    let mut start = parse_value(kind, raw, start)?;
    let mut end = parse_value(kind, raw, end)?;
    // Sunday is both 0 and 7: `7-2` starts on Sunday, `5-0` ends on it.
    // `0-0`, `7-7` and `7-0` stay Sunday only.
    if kind == FieldKind::DayOfWeek {
        if start == 7 && end < 7 {
            start = 0;
        }
        if end == 0 && start > 0 {
            end = 7;
        }
    }
    if start > end {
        return Err(CronError::range(
            kind,
            raw,
            format!("range start {start} is greater than range end {end}"),
        ));
    }
    Ok((start, end))
}

fn parse_value(kind: FieldKind, raw: &str, token: &str) -> Result<u32, CronError> {
    let value = match parse_number(token) {
        Some(value) => value,
        None => kind
            .literal_names()
            .iter()
            .find(|(name, _)| *name == token)
            .map(|&(_, value)| value)
            .ok_or_else(|| CronError::syntax(kind, raw, format!("unexpected token `{token}`")))?,
    };
    if value < kind.range_start() || value > kind.range_end() {
        return Err(CronError::range(
            kind,
            raw,
            format!(
                "{value} is outside {}-{}",
                kind.range_start(),
                kind.range_end()
            ),
        ));
    }
    Ok(value)
}

fn parse_number(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FieldKind::Minute, "*", vec![Term::Wildcard])]
    #[case(FieldKind::Minute, "5", vec![Term::Number(5)])]
    #[case(FieldKind::Minute, "0-4,8-12", vec![Term::Range { start: 0, end: 4 }, Term::Range { start: 8, end: 12 }])]
    #[case(FieldKind::Minute, "*/15", vec![Term::SteppedRange { start: 0, end: 59, step: 15 }])]
    #[case(FieldKind::Minute, "7/29", vec![Term::SteppedRange { start: 7, end: 59, step: 29 }])]
    #[case(FieldKind::Month, "jan-mar", vec![Term::Range { start: 1, end: 3 }])]
    #[case(FieldKind::DayOfMonth, "?", vec![Term::DontCare])]
    #[case(FieldKind::DayOfMonth, "L", vec![Term::LastDayOfMonth])]
    #[case(FieldKind::DayOfMonth, "15w", vec![Term::NearestWeekday(15)])]
    #[case(FieldKind::DayOfWeek, "5L", vec![Term::LastWeekday(5)])]
    #[case(FieldKind::DayOfWeek, "FRI#2", vec![Term::NthWeekday { weekday: 5, nth: 2 }])]
    #[case(FieldKind::DayOfWeek, "7-2", vec![Term::Range { start: 0, end: 2 }])]
    #[case(FieldKind::DayOfWeek, "5-0", vec![Term::Range { start: 5, end: 7 }])]
    #[case(FieldKind::DayOfWeek, "0-0", vec![Term::Range { start: 0, end: 0 }])]
    #[case(FieldKind::DayOfWeek, "7-0", vec![Term::Range { start: 0, end: 0 }])]
    #[case(FieldKind::DayOfWeek, "7-7", vec![Term::Range { start: 7, end: 7 }])]
    fn test_parse_terms(#[case] kind: FieldKind, #[case] input: &str, #[case] expected: Vec<Term>) {
        let expression = FieldExpression::parse(kind, input).unwrap();
        assert_eq!(expression.terms(), expected.as_slice());
        assert_eq!(expression.as_str(), input);
    }

    #[rstest]
    #[case(FieldKind::Minute, "")]
    #[case(FieldKind::Minute, "60")]
    #[case(FieldKind::Minute, "-1")]
    #[case(FieldKind::Minute, "1-")]
    #[case(FieldKind::Minute, "+5")]
    #[case(FieldKind::Minute, "5-2")]
    #[case(FieldKind::Minute, "*/0")]
    #[case(FieldKind::Minute, "*/61")]
    #[case(FieldKind::Minute, "*/x")]
    #[case(FieldKind::Minute, "1,,2")]
    #[case(FieldKind::Minute, "*-5")]
    #[case(FieldKind::Hour, "?")]
    #[case(FieldKind::Hour, "24")]
    #[case(FieldKind::Month, "0")]
    #[case(FieldKind::Month, "FOO")]
    #[case(FieldKind::DayOfMonth, "0")]
    #[case(FieldKind::DayOfMonth, "1-5,10")]
    #[case(FieldKind::DayOfMonth, "1,15W")]
    #[case(FieldKind::DayOfMonth, "1,L")]
    #[case(FieldKind::DayOfMonth, "32W")]
    #[case(FieldKind::DayOfWeek, "8")]
    #[case(FieldKind::DayOfWeek, "5#6")]
    #[case(FieldKind::DayOfWeek, "5#0")]
    #[case(FieldKind::DayOfWeek, "5#L")]
    #[case(FieldKind::DayOfWeek, "L")]
    fn test_rejects_invalid(#[case] kind: FieldKind, #[case] input: &str) {
        assert!(FieldExpression::parse(kind, input).is_err(), "{kind} `{input}`");
    }

    #[test]
    fn test_error_kinds_for_bad_input() {
        let error = FieldExpression::parse(FieldKind::Hour, "5-2").unwrap_err();
        assert!(error.kind().is_range());
        let error = FieldExpression::parse(FieldKind::Hour, "*/0").unwrap_err();
        assert!(error.kind().is_range());
        let error = FieldExpression::parse(FieldKind::DayOfWeek, "1#x").unwrap_err();
        assert!(error.kind().is_syntax());
    }

    #[test]
    fn test_values_are_sorted_and_deduplicated() {
        let expression = FieldExpression::parse(FieldKind::Minute, "30,5,0-10/5,5").unwrap();
        assert_eq!(expression.values(), Some(vec![0, 5, 10, 30]));
    }

    #[test]
    fn test_step_wraps_at_field_end() {
        let minutes = FieldExpression::parse(FieldKind::Minute, "*/60").unwrap();
        assert_eq!(minutes.values(), Some(vec![0]));
        let hours = FieldExpression::parse(FieldKind::Hour, "*/23").unwrap();
        assert_eq!(hours.values(), Some(vec![23]));
        assert!(hours.matches_value(23));
        assert!(!hours.matches_value(0));
    }

    #[test]
    fn test_calendar_terms_do_not_expand() {
        let expression = FieldExpression::parse(FieldKind::DayOfWeek, "1,5L").unwrap();
        assert_eq!(expression.values(), None);
        assert!(expression.matches_value(1));
        assert!(!expression.matches_value(5));
    }

    #[test]
    fn test_equality_is_textual() {
        let a = FieldExpression::parse(FieldKind::Minute, "1-5").unwrap();
        let b = FieldExpression::parse(FieldKind::Minute, " 1-5 ").unwrap();
        let c = FieldExpression::parse(FieldKind::Minute, "1,2,3,4,5").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
