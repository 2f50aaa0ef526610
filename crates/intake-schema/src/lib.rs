//! Reservation Intake - Form Schema Compiler
//!
//! Turns an admin-authored list of field definitions into a validator that
//! enforces the configured constraints on submitted records.
//!
//! ## Features
//! - Closed set of field types (`text`, `email`, `number`, `date`,
//!   `datetime`, `tel`) with unrecognized types validated as free text
//! - Required/optional wrapping with label-specific messages
//! - Numeric bounds, character length bounds, and regex patterns
//! - Violation kinds that separate type mismatches from range errors
//!
//! ## Example
//!
//! ```
//! use intake_schema::{compile, FieldDefinition, FieldType, Record};
//!
//! let fields = vec![
//!     FieldDefinition::new("1", "guests", "Guests", FieldType::Number)
//!         .required()
//!         .with_min(1.0)
//!         .with_max(8.0),
//! ];
//! let validator = compile(&fields);
//!
//! assert!(validator.validate(&Record::new().with("guests", 2)).is_ok());
//! assert!(validator.validate(&Record::new().with("guests", 12)).is_err());
//! ```

pub mod field;
pub mod rules;
pub mod validator;

pub use field::{FieldDefinition, FieldType, FieldValue, Record};
pub use rules::ViolationKind;
pub use validator::{compile, CompiledValidator, FieldViolation, ValidationErrors};
