//! Built-in field list used when no configuration exists

use intake_schema::{FieldDefinition, FieldType};

/// Static description of one default field
#[derive(Debug, Clone)]
pub struct DefaultField {
    pub id: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub min_length: Option<usize>,
}

impl DefaultField {
    pub fn to_definition(&self) -> FieldDefinition {
        FieldDefinition {
            required: self.required,
            min_length: self.min_length,
            ..FieldDefinition::new(self.id, self.name, self.label, self.field_type.clone())
        }
    }
}

pub const DEFAULT_FIELDS: [DefaultField; 3] = [
    DefaultField {
        id: "1",
        name: "name",
        label: "Full Name",
        field_type: FieldType::Text,
        required: true,
        min_length: Some(2),
    },
    DefaultField {
        id: "2",
        name: "email",
        label: "Email",
        field_type: FieldType::Email,
        required: true,
        min_length: None,
    },
    DefaultField {
        id: "3",
        name: "datetime",
        label: "Date & Time",
        field_type: FieldType::DateTime,
        required: true,
        min_length: None,
    },
];

/// Owned copy of [`DEFAULT_FIELDS`]
pub fn default_fields() -> Vec<FieldDefinition> {
    DEFAULT_FIELDS.iter().map(DefaultField::to_definition).collect()
}
