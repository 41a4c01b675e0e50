//! Configuration validation utilities.
//!
//! A small framework for validating TOML configuration sections before an
//! implementation is constructed from them. Each pluggable implementation
//! exposes its expectations through a [`ConfigSchema`].

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// A required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// A field is present but holds an unacceptable value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// A field has the wrong TOML type.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Expected TOML type of a configuration field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
	/// A string value.
	Str,
	/// An integer value with optional inclusive bounds.
	Int {
		min: Option<i64>,
		max: Option<i64>,
	},
	/// A boolean value.
	Bool,
}

impl FieldType {
	fn name(&self) -> &'static str {
		match self {
			FieldType::Str => "string",
			FieldType::Int { .. } => "integer",
			FieldType::Bool => "boolean",
		}
	}
}

/// One field in a configuration schema.
#[derive(Debug, Clone)]
pub struct Field {
	pub name: &'static str,
	pub field_type: FieldType,
	pub required: bool,
}

impl Field {
	/// A field that must be present.
	pub fn required(name: &'static str, field_type: FieldType) -> Self {
		Self {
			name,
			field_type,
			required: true,
		}
	}

	/// A field that may be absent.
	pub fn optional(name: &'static str, field_type: FieldType) -> Self {
		Self {
			name,
			field_type,
			required: false,
		}
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		let mismatch = || ValidationError::TypeMismatch {
			field: self.name.to_string(),
			expected: self.field_type.name().to_string(),
			actual: value.type_str().to_string(),
		};

		match self.field_type {
			FieldType::Str => {
				value.as_str().ok_or_else(mismatch)?;
			},
			FieldType::Int { min, max } => {
				let n = value.as_integer().ok_or_else(mismatch)?;
				if min.is_some_and(|m| n < m) || max.is_some_and(|m| n > m) {
					return Err(ValidationError::InvalidValue {
						field: self.name.to_string(),
						message: format!("value {} is out of bounds", n),
					});
				}
			},
			FieldType::Bool => {
				value.as_bool().ok_or_else(mismatch)?;
			},
		}
		Ok(())
	}
}

/// A flat validation schema for one TOML configuration section.
#[derive(Debug, Clone, Default)]
pub struct Schema {
	pub fields: Vec<Field>,
}

impl Schema {
	pub fn new(fields: Vec<Field>) -> Self {
		Self { fields }
	}

	/// Validates a TOML value against this schema.
	///
	/// Checks that the value is a table, that every required field is
	/// present, and that each present field has the declared type and is
	/// within bounds.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.fields {
			match table.get(field.name) {
				Some(value) => field.check(value)?,
				None if field.required => {
					return Err(ValidationError::MissingField(field.name.to_string()));
				},
				None => {},
			}
		}

		Ok(())
	}
}

/// Trait defining a configuration schema that can validate TOML values.
///
/// Implemented by each pluggable backend so configuration problems are
/// reported before the implementation is built.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}
