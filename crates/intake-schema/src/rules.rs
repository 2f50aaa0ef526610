//! Per-field validation rules
//!
//! A [`FieldRule`] is derived once from a [`FieldDefinition`]. All messages
//! are rendered at derivation time so repeated validations on the same rule
//! report identical text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::field::{FieldDefinition, FieldType, FieldValue};

/// Minimum length applied to `tel` fields that do not set one
pub const DEFAULT_TEL_MIN_LENGTH: usize = 10;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Category of a failed check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    InvalidEmail,
    NotANumber,
    BelowMinimum,
    AboveMaximum,
    InvalidDate,
    TooShort,
    TooLong,
    PatternMismatch,
}

impl ViolationKind {
    /// Range violations, as opposed to type or format mismatches
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            Self::BelowMinimum | Self::AboveMaximum | Self::TooShort | Self::TooLong
        )
    }
}

#[derive(Clone, Debug)]
enum Test {
    Email,
    Numeric,
    AtLeast(f64),
    AtMost(f64),
    Calendar,
    MinChars(usize),
    MaxChars(usize),
    /// `None` when the configured pattern does not compile
    Pattern(Option<Regex>),
}

impl Test {
    fn passes(&self, value: &FieldValue) -> bool {
        match self {
            Self::Numeric => value.as_number().is_some(),
            Self::AtLeast(bound) => value.as_number().is_some_and(|n| n >= *bound),
            Self::AtMost(bound) => value.as_number().is_some_and(|n| n <= *bound),
            Self::MinChars(min) => char_count(value) >= *min,
            Self::MaxChars(max) => char_count(value) <= *max,
            text_test => value
                .as_text()
                .is_some_and(|text| text_test.passes_text(text)),
        }
    }

    fn passes_text(&self, text: &str) -> bool {
        match self {
            Self::Email => EMAIL_PATTERN.is_match(text),
            Self::Calendar => parses_as_calendar(text),
            Self::Pattern(Some(regex)) => regex.is_match(text),
            Self::Pattern(None) => false,
            Self::Numeric
            | Self::AtLeast(_)
            | Self::AtMost(_)
            | Self::MinChars(_)
            | Self::MaxChars(_) => false,
        }
    }
}

/// A single predicate with its pre-rendered message
#[derive(Clone, Debug)]
pub(crate) struct Check {
    test: Test,
    kind: ViolationKind,
    message: String,
}

impl Check {
    fn new(test: Test, kind: ViolationKind, message: String) -> Self {
        Self { test, kind, message }
    }

    pub(crate) fn kind(&self) -> ViolationKind {
        self.kind
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

/// Compiled rule for one field name.
#[derive(Clone, Debug)]
pub(crate) struct FieldRule {
    required: bool,
    required_message: String,
    checks: Vec<Check>,
}

impl FieldRule {
    pub(crate) fn derive(field: &FieldDefinition) -> Self {
        let label = &field.label;
        let mut checks = Vec::new();

        match &field.field_type {
            FieldType::Email => checks.push(Check::new(
                Test::Email,
                ViolationKind::InvalidEmail,
                format!("{label} must be a valid email address"),
            )),
            FieldType::Number => {
                checks.push(Check::new(
                    Test::Numeric,
                    ViolationKind::NotANumber,
                    format!("{label} must be a number"),
                ));
                if let Some(min) = field.min {
                    checks.push(Check::new(
                        Test::AtLeast(min),
                        ViolationKind::BelowMinimum,
                        format!("{label} must be at least {min}"),
                    ));
                }
                if let Some(max) = field.max {
                    checks.push(Check::new(
                        Test::AtMost(max),
                        ViolationKind::AboveMaximum,
                        format!("{label} must be at most {max}"),
                    ));
                }
            }
            FieldType::Date => checks.push(Check::new(
                Test::Calendar,
                ViolationKind::InvalidDate,
                format!("{label} must be a valid date"),
            )),
            FieldType::DateTime => checks.push(Check::new(
                Test::Calendar,
                ViolationKind::InvalidDate,
                format!("{label} must be a valid date and time"),
            )),
            FieldType::Tel => {
                let min = field.min_length.unwrap_or(DEFAULT_TEL_MIN_LENGTH);
                checks.push(min_chars(label, min));
                push_text_constraints(&mut checks, field);
            }
            FieldType::Text | FieldType::Other(_) => {
                if let Some(min) = field.min_length {
                    checks.push(min_chars(label, min));
                }
                push_text_constraints(&mut checks, field);
            }
        }

        Self {
            required: field.required,
            required_message: format!("{label} is required"),
            checks,
        }
    }

    /// First failing check for `value`, or `None` when the value is accepted
    pub(crate) fn first_violation(&self, value: Option<&FieldValue>) -> Option<Violation<'_>> {
        let value = match value.filter(|v| !v.is_empty()) {
            Some(value) => value,
            None if self.required => {
                return Some(Violation {
                    kind: ViolationKind::Required,
                    message: &self.required_message,
                })
            }
            None => return None,
        };

        self.checks
            .iter()
            .find(|check| !check.test.passes(value))
            .map(|check| Violation {
                kind: check.kind(),
                message: check.message(),
            })
    }
}

pub(crate) struct Violation<'a> {
    pub(crate) kind: ViolationKind,
    pub(crate) message: &'a str,
}

fn min_chars(label: &str, min: usize) -> Check {
    Check::new(
        Test::MinChars(min),
        ViolationKind::TooShort,
        format!("{label} must be at least {min} characters"),
    )
}

fn push_text_constraints(checks: &mut Vec<Check>, field: &FieldDefinition) {
    let label = &field.label;
    if let Some(max) = field.max_length {
        checks.push(Check::new(
            Test::MaxChars(max),
            ViolationKind::TooLong,
            format!("{label} must be at most {max} characters"),
        ));
    }
    if let Some(pattern) = &field.pattern {
        // Anchored so the whole value has to match
        let regex = Regex::new(&format!("^(?:{pattern})$")).ok();
        checks.push(Check::new(
            Test::Pattern(regex),
            ViolationKind::PatternMismatch,
            format!("{label} has an invalid format"),
        ));
    }
}

/// Length of the value as entered; numbers count their rendered digits
fn char_count(value: &FieldValue) -> usize {
    match value {
        FieldValue::Text(text) => text.chars().count(),
        FieldValue::Number(number) => number.to_string().chars().count(),
    }
}

/// Accepts plain dates, local date-times, and RFC 3339 timestamps
fn parses_as_calendar(text: &str) -> bool {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok()
        || DateTime::parse_from_rfc3339(text).is_ok()
        || DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
}
