//! Values bound to the fields of a detail shape.

use crate::{
	schema::{FieldDef, FieldKind, TransferShape},
	SigningError,
};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{hex, keccak256, Address, Bytes, B256, U256};
use permit3_types::utils::Eip712AbiEncoder;
use serde_json::Value;
use std::collections::BTreeMap;

/// A field value. Which variant is acceptable is decided by the field's [`FieldKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eip712Value {
	Address(Address),
	Bool(bool),
	Uint(U256),
	/// Raw bytes for `bytesN` (length must equal N) or `bytes`.
	Bytes(Bytes),
	String(String),
}

/// Values keyed by field name. Must name exactly the fields of the shape.
pub type ShapeValues = BTreeMap<String, Eip712Value>;

impl Eip712Value {
	fn describe(&self) -> &'static str {
		match self {
			Self::Address(_) => "address",
			Self::Bool(_) => "bool",
			Self::Uint(_) => "uint",
			Self::Bytes(_) => "bytes",
			Self::String(_) => "string",
		}
	}

	/// Checks kind and range against a field definition.
	pub fn check(&self, field: &FieldDef) -> Result<(), SigningError> {
		match (field.kind, self) {
			(FieldKind::Address, Self::Address(_))
			| (FieldKind::Bool, Self::Bool(_))
			| (FieldKind::Bytes, Self::Bytes(_))
			| (FieldKind::String, Self::String(_)) => Ok(()),
			(FieldKind::Uint(bits), Self::Uint(v)) => {
				if v.bit_len() > bits as usize {
					Err(SigningError::Encoding(format!(
						"Field '{}' value {} does not fit in uint{}",
						field.name, v, bits
					)))
				} else {
					Ok(())
				}
			},
			(FieldKind::FixedBytes(size), Self::Bytes(b)) => {
				if b.len() != size as usize {
					Err(SigningError::Encoding(format!(
						"Field '{}' expects {} bytes, got {}",
						field.name,
						size,
						b.len()
					)))
				} else {
					Ok(())
				}
			},
			(kind, value) => Err(SigningError::MalformedShape(format!(
				"Field '{}' is {} but the value is {}",
				field.name,
				kind,
				value.describe()
			))),
		}
	}

	/// Appends the EIP-712 `encodeData` word. Assumes [`check`](Self::check) passed.
	fn push_word(&self, enc: &mut Eip712AbiEncoder, kind: FieldKind) {
		match self {
			Self::Address(a) => enc.push_address(a),
			Self::Bool(b) => enc.push_bool(*b),
			Self::Uint(v) => enc.push_u256(*v),
			Self::Bytes(b) if kind.is_dynamic() => enc.push_dynamic(b),
			Self::Bytes(b) => enc.push_b256(&B256::right_padding_from(b)),
			Self::String(s) => enc.push_dynamic(s.as_bytes()),
		}
	}

	fn to_dyn(&self, kind: FieldKind) -> DynSolValue {
		match (self, kind) {
			(Self::Address(a), _) => DynSolValue::Address(*a),
			(Self::Bool(b), _) => DynSolValue::Bool(*b),
			(Self::Uint(v), FieldKind::Uint(bits)) => DynSolValue::Uint(*v, bits as usize),
			(Self::Uint(v), _) => DynSolValue::Uint(*v, 256),
			(Self::Bytes(b), FieldKind::FixedBytes(size)) => {
				DynSolValue::FixedBytes(B256::right_padding_from(b), size as usize)
			},
			(Self::Bytes(b), _) => DynSolValue::Bytes(b.to_vec()),
			(Self::String(s), _) => DynSolValue::String(s.clone()),
		}
	}

	/// JSON form used in typed-data messages: checksum addresses, decimal
	/// integers, `0x` hex bytes.
	pub fn to_json(&self) -> Value {
		match self {
			Self::Address(a) => Value::String(a.to_checksum(None)),
			Self::Bool(b) => Value::Bool(*b),
			Self::Uint(v) => Value::String(v.to_string()),
			Self::Bytes(b) => Value::String(hex::encode_prefixed(b)),
			Self::String(s) => Value::String(s.clone()),
		}
	}
}

/// Values in shape order, each checked against its field.
pub(crate) fn bind<'a>(
	shape: &'a TransferShape,
	values: &'a ShapeValues,
) -> Result<Vec<(&'a FieldDef, &'a Eip712Value)>, SigningError> {
	if let Some(extra) = values
		.keys()
		.find(|name| !shape.fields().iter().any(|f| &f.name == *name))
	{
		return Err(SigningError::MalformedShape(format!(
			"Unknown field '{}'",
			extra
		)));
	}

	shape
		.fields()
		.iter()
		.map(|field| {
			let value = values.get(&field.name).ok_or_else(|| {
				SigningError::MalformedShape(format!("Missing field '{}'", field.name))
			})?;
			value.check(field)?;
			Ok((field, value))
		})
		.collect()
}

/// `hashStruct(TransferDetails)` for a caller-declared shape.
pub fn shape_struct_hash(shape: &TransferShape, values: &ShapeValues) -> Result<B256, SigningError> {
	let bound = bind(shape, values)?;
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&shape.type_hash());
	for (field, value) in bound {
		value.push_word(&mut enc, field.kind);
	}
	Ok(keccak256(enc.finish()))
}

/// ABI encoding of the values as a parameter list, the byte payload an ILRTA
/// contract decodes as its transfer details.
pub fn encode_shape_values(
	shape: &TransferShape,
	values: &ShapeValues,
) -> Result<Bytes, SigningError> {
	let bound = bind(shape, values)?;
	let tuple = DynSolValue::Tuple(
		bound
			.into_iter()
			.map(|(field, value)| value.to_dyn(field.kind))
			.collect(),
	);
	Ok(tuple.abi_encode_params().into())
}

/// Message object of the values for a typed-data payload.
pub fn shape_values_json(
	shape: &TransferShape,
	values: &ShapeValues,
) -> Result<Value, SigningError> {
	let bound = bind(shape, values)?;
	Ok(Value::Object(
		bound
			.into_iter()
			.map(|(field, value)| (field.name.clone(), value.to_json()))
			.collect(),
	))
}
