//! Schema validation for TOML configuration sections.
//!
//! Pluggable implementations (accounts, for now) describe the table they
//! accept as a [`Schema`]; the config loader validates raw `toml::Value`s
//! against it before any implementation is constructed.

use alloy_primitives::Address;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
	#[error("Missing required field: {0}")]
	MissingField(String),
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Expected type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
	/// A string holding a 20-byte hex address.
	Address,
	/// A string holding a 32-byte hex value, e.g. a private key.
	Bytes32,
}

#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
		}
	}
}

/// Required and optional fields of one TOML table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML table against this schema.
	///
	/// Required fields must be present; optional fields are checked only when
	/// present. Unknown keys are ignored.
	///
	/// # Errors
	///
	/// Returns the first [`ValidationError`] encountered.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			validate_field_type(&field.name, value, field.field_type)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				validate_field_type(&field.name, value, field.field_type)?;
			}
		}

		Ok(())
	}
}

fn type_mismatch(field_name: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field_name.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::Address => {
			let s = value
				.as_str()
				.ok_or_else(|| type_mismatch(field_name, "address string", value))?;
			s.parse::<Address>()
				.map_err(|e| ValidationError::InvalidValue {
					field: field_name.to_string(),
					message: format!("Invalid address '{}': {}", s, e),
				})?;
		},
		FieldType::Bytes32 => {
			let s = value
				.as_str()
				.ok_or_else(|| type_mismatch(field_name, "hex string", value))?;
			let hex = crate::utils::without_0x_prefix(s);
			if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
				return Err(ValidationError::InvalidValue {
					field: field_name.to_string(),
					message: "Expected 32 bytes of hex".to_string(),
				});
			}
		},
	}

	Ok(())
}

/// A configuration schema that pluggable implementations expose.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}
