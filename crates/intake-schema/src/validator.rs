//! Compiled validators
//!
//! [`compile`] never fails. Configurations that cannot be satisfied, such as
//! `min > max` or a pattern that does not parse, are kept as configured and
//! simply reject every non-empty value.
//!
//! When several definitions share a `name`, the last one wins: its rule
//! replaces the earlier ones and the name is reported by
//! [`CompiledValidator::shadowed_names`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::field::{FieldDefinition, FieldValue, Record};
use crate::rules::{FieldRule, ViolationKind};

/// Compile a field list into a validator
pub fn compile(fields: &[FieldDefinition]) -> CompiledValidator {
    CompiledValidator::compile(fields)
}

/// Rule set derived from one version of a field list.
#[derive(Clone, Debug, Default)]
pub struct CompiledValidator {
    rules: BTreeMap<String, FieldRule>,
    shadowed: Vec<String>,
}

impl CompiledValidator {
    pub fn compile(fields: &[FieldDefinition]) -> Self {
        let mut rules = BTreeMap::new();
        let mut shadowed = Vec::new();

        for field in fields {
            let replaced = rules.insert(field.name.clone(), FieldRule::derive(field));
            if replaced.is_some() && !shadowed.contains(&field.name) {
                shadowed.push(field.name.clone());
            }
        }

        Self { rules, shadowed }
    }

    /// Validate a full record.
    ///
    /// Keys without a rule are ignored. On failure every invalid field is
    /// reported with its first violated message.
    pub fn validate(&self, record: &Record) -> Result<(), ValidationErrors> {
        let errors: BTreeMap<String, FieldViolation> = self
            .rules
            .iter()
            .filter_map(|(name, rule)| {
                rule.first_violation(record.get(name))
                    .map(|violation| (name.clone(), FieldViolation::new(violation.kind, violation.message)))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Validate one field in isolation. Unknown names are accepted.
    pub fn validate_field(&self, name: &str, value: Option<&FieldValue>) -> Result<(), FieldViolation> {
        match self.rules.get(name).and_then(|rule| rule.first_violation(value)) {
            Some(violation) => Err(FieldViolation::new(violation.kind, violation.message)),
            None => Ok(()),
        }
    }

    /// Names with a rule, in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Names that appeared more than once in the compiled list
    pub fn shadowed_names(&self) -> &[String] {
        &self.shadowed
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Violations
// =============================================================================

/// Why one field was rejected
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::error::Error for FieldViolation {}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Per-field violations of a rejected record, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, FieldViolation>);

impl ValidationErrors {
    pub fn get(&self, name: &str) -> Option<&FieldViolation> {
        self.0.get(name)
    }

    pub fn message(&self, name: &str) -> Option<&str> {
        self.get(name).map(|violation| violation.message.as_str())
    }

    /// Field name to message, the shape a form renders next to each input
    pub fn messages(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(name, violation)| (name.clone(), violation.message.clone()))
            .collect()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldViolation)> {
        self.0.iter().map(|(name, violation)| (name.as_str(), violation))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s)", self.0.len())?;
        for (i, (name, violation)) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}: {}", sep, name, violation.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn booking_fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("1", "name", "Full Name", FieldType::Text)
                .required()
                .with_min_length(2),
            FieldDefinition::new("2", "email", "Email", FieldType::Email).required(),
            FieldDefinition::new("3", "guests", "Guests", FieldType::Number)
                .with_min(5.0)
                .with_max(10.0),
            FieldDefinition::new("4", "phone", "Phone", FieldType::Tel),
            FieldDefinition::new("5", "when", "Date & Time", FieldType::DateTime).required(),
        ]
    }

    fn valid_record() -> Record {
        Record::new()
            .with("name", "Ada Lovelace")
            .with("email", "ada@example.com")
            .with("when", "2025-03-14T19:30")
    }

    #[test]
    fn test_empty_field_list_accepts_anything() {
        let validator = compile(&[]);
        assert!(validator.is_empty());
        assert!(validator.validate(&Record::new()).is_ok());
        assert!(validator.validate(&Record::new().with("anything", "goes")).is_ok());
    }

    #[test]
    fn test_valid_record() {
        let validator = compile(&booking_fields());
        assert!(validator.validate(&valid_record()).is_ok());
    }

    #[test]
    fn test_required_fields_reported() {
        let validator = compile(&booking_fields());
        let errors = validator.validate(&Record::new()).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.message("name"), Some("Full Name is required"));
        assert_eq!(errors.message("email"), Some("Email is required"));
        assert_eq!(errors.message("when"), Some("Date & Time is required"));
        assert_eq!(errors.get("name").unwrap().kind, ViolationKind::Required);
    }

    #[test]
    fn test_number_messages_distinguish_type_from_range() {
        let validator = compile(&booking_fields());

        let not_a_number = validator
            .validate_field("guests", Some(&"lots".into()))
            .unwrap_err();
        let too_few = validator.validate_field("guests", Some(&3.into())).unwrap_err();
        let too_many = validator.validate_field("guests", Some(&12.into())).unwrap_err();

        assert_eq!(not_a_number.message, "Guests must be a number");
        assert_eq!(too_few.message, "Guests must be at least 5");
        assert_eq!(too_many.message, "Guests must be at most 10");
        assert_ne!(not_a_number.message, too_few.message);
        assert!(!not_a_number.kind.is_range());
        assert!(too_few.kind.is_range() && too_many.kind.is_range());
        assert!(validator.validate_field("guests", Some(&7.into())).is_ok());
    }

    #[test]
    fn test_tel_defaults_to_ten_characters() {
        let validator = compile(&booking_fields());
        let short = validator.validate_field("phone", Some(&"12345".into())).unwrap_err();
        assert_eq!(short.kind, ViolationKind::TooShort);
        assert_eq!(short.message, "Phone must be at least 10 characters");
        assert!(validator.validate_field("phone", Some(&"5551234567".into())).is_ok());
    }

    #[test]
    fn test_optional_empty_skips_base_rule() {
        let validator = compile(&booking_fields());
        assert!(validator.validate_field("phone", Some(&"".into())).is_ok());
        assert!(validator.validate_field("guests", None).is_ok());
    }

    #[test]
    fn test_unknown_field_is_accepted() {
        let validator = compile(&booking_fields());
        assert!(validator.validate_field("coupon", Some(&"x".into())).is_ok());
    }

    #[test]
    fn test_min_greater_than_max_is_unsatisfiable() {
        let fields = vec![FieldDefinition::new("1", "n", "N", FieldType::Number)
            .with_min(10.0)
            .with_max(5.0)];
        let validator = compile(&fields);
        for value in [0, 5, 7, 10, 15] {
            assert!(validator.validate_field("n", Some(&value.into())).is_err());
        }
        // Optional and empty is still fine
        assert!(validator.validate_field("n", None).is_ok());
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let fields = vec![
            FieldDefinition::new("1", "contact", "Contact", FieldType::Email).required(),
            FieldDefinition::new("2", "contact", "Contact", FieldType::Tel).required(),
        ];
        let validator = compile(&fields);

        assert_eq!(validator.len(), 1);
        assert_eq!(validator.shadowed_names(), ["contact".to_string()]);
        assert!(validator.validate_field("contact", Some(&"5551234567".into())).is_ok());
        let err = validator
            .validate_field("contact", Some(&"a@b.co".into()))
            .unwrap_err();
        assert_eq!(err.kind, ViolationKind::TooShort);
    }

    #[test]
    fn test_unrecognized_type_behaves_as_text() {
        let fields = vec![FieldDefinition::new("1", "notes", "Notes", FieldType::Other("textarea".into()))
            .with_min_length(3)];
        let validator = compile(&fields);
        assert!(validator.validate_field("notes", Some(&"ok!".into())).is_ok());
        assert!(validator.validate_field("notes", Some(&"no".into())).is_err());
    }

    #[test]
    fn test_errors_display_and_messages() {
        let validator = compile(&booking_fields());
        let errors = validator
            .validate(&valid_record().with("email", "nope"))
            .unwrap_err();
        assert_eq!(
            errors.messages().get("email").map(String::as_str),
            Some("Email must be a valid email address")
        );
        assert_eq!(errors.to_string(), "1 invalid field(s): email: Email must be a valid email address");
    }

    fn arb_field_type() -> impl Strategy<Value = FieldType> {
        prop_oneof![
            Just(FieldType::Text),
            Just(FieldType::Email),
            Just(FieldType::Number),
            Just(FieldType::Date),
            Just(FieldType::DateTime),
            Just(FieldType::Tel),
            "[a-z]{3,8}".prop_map(|raw| raw.parse::<FieldType>().unwrap()),
        ]
    }

    fn arb_field(index: usize) -> impl Strategy<Value = FieldDefinition> {
        (
            arb_field_type(),
            any::<bool>(),
            proptest::option::of(-100.0f64..100.0),
            proptest::option::of(-100.0f64..100.0),
            proptest::option::of(0usize..20),
        )
            .prop_map(move |(field_type, required, min, max, min_length)| FieldDefinition {
                min,
                max,
                min_length,
                required,
                ..FieldDefinition::new(index.to_string(), format!("f{index}"), format!("Field {index}"), field_type)
            })
    }

    fn arb_fields() -> impl Strategy<Value = Vec<FieldDefinition>> {
        (0usize..6).prop_flat_map(|n| (0..n).map(arb_field).collect::<Vec<_>>())
    }

    fn arb_value() -> impl Strategy<Value = Option<FieldValue>> {
        prop_oneof![
            Just(None),
            Just(Some(FieldValue::Text(String::new()))),
            ".{0,16}".prop_map(|s| Some(FieldValue::Text(s))),
            (-200.0f64..200.0).prop_map(|n| Some(FieldValue::Number(n))),
        ]
    }

    proptest! {
        #[test]
        fn prop_key_set_equals_field_names(fields in arb_fields()) {
            let validator = compile(&fields);
            let expected: BTreeSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
            let actual: BTreeSet<&str> = validator.field_names().collect();
            prop_assert_eq!(expected, actual);
            prop_assert!(validator.shadowed_names().is_empty());
        }

        #[test]
        fn prop_empty_input_depends_only_on_required(fields in arb_fields(), empty_text in any::<bool>()) {
            let validator = compile(&fields);
            let empty = FieldValue::Text(String::new());
            for field in &fields {
                let value = if empty_text { Some(&empty) } else { None };
                let result = validator.validate_field(&field.name, value);
                if field.required {
                    let violation = result.unwrap_err();
                    prop_assert_eq!(violation.kind, ViolationKind::Required);
                    prop_assert_eq!(violation.message, format!("{} is required", field.label));
                } else {
                    prop_assert!(result.is_ok());
                }
            }
        }

        #[test]
        fn prop_compile_is_deterministic(
            fields in arb_fields(),
            values in proptest::collection::vec(arb_value(), 6),
        ) {
            let first = compile(&fields);
            let second = compile(&fields);
            let record: Record = fields
                .iter()
                .zip(values)
                .filter_map(|(field, value)| value.map(|v| (field.name.clone(), v)))
                .collect();
            prop_assert_eq!(first.validate(&record), second.validate(&record));
            // Repeated validation on one validator is stable too
            prop_assert_eq!(first.validate(&record), first.validate(&record));
        }
    }
}
