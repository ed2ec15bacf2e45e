//! Typed-data schemas for transfer intents.
//!
//! A schema is a transfer-detail *shape* (the fields of the `TransferDetails`
//! struct) combined with one of four *variants* of the enclosing `Transfer`
//! struct. Permit3 uses exactly two shapes, chosen by the asset kind tag:
//!
//! - plain assets: `TransferDetails(address token,uint256 amount)`
//! - generic assets: `TransferDetails(address token,uint8 tokenType,uint32 functionSelector,bytes transferDetails)`
//!
//! Both are built once into a static registry. ILRTA-native transfers declare
//! their own shape with [`TransferShape::new`] or [`TransferShape::parse`].

use crate::SigningError;
use alloy_primitives::{keccak256, B256};
use once_cell::sync::Lazy;
use permit3_types::AssetKind;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Name of the primary type of every transfer schema.
pub const TRANSFER_TYPE_NAME: &str = "Transfer";

/// Name of the nested transfer-details struct.
pub const DETAILS_TYPE_NAME: &str = "TransferDetails";

/// `Verify(bytes32[] dataHash,uint256 nonce,uint256 deadline)`.
pub const VERIFY_TYPE: &str = "Verify(bytes32[] dataHash,uint256 nonce,uint256 deadline)";

static VERIFY_TYPE_HASH: Lazy<B256> = Lazy::new(|| keccak256(VERIFY_TYPE.as_bytes()));

/// Type hash of the `Verify` struct.
pub fn verify_type_hash() -> B256 {
	*VERIFY_TYPE_HASH
}

/// Solidity type of a single field in a detail shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
	Address,
	Bool,
	/// `uintN`, N in 8..=256 and a multiple of 8.
	Uint(u16),
	/// `bytesN`, N in 1..=32.
	FixedBytes(u8),
	Bytes,
	String,
}

impl FieldKind {
	/// Whether EIP-712 encodes this field by hashing its contents.
	pub fn is_dynamic(self) -> bool {
		matches!(self, Self::Bytes | Self::String)
	}
}

impl fmt::Display for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Address => write!(f, "address"),
			Self::Bool => write!(f, "bool"),
			Self::Uint(bits) => write!(f, "uint{}", bits),
			Self::FixedBytes(size) => write!(f, "bytes{}", size),
			Self::Bytes => write!(f, "bytes"),
			Self::String => write!(f, "string"),
		}
	}
}

impl FromStr for FieldKind {
	type Err = SigningError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let malformed = || SigningError::MalformedShape(format!("Unsupported field type '{}'", s));
		match s {
			"address" => Ok(Self::Address),
			"bool" => Ok(Self::Bool),
			"bytes" => Ok(Self::Bytes),
			"string" => Ok(Self::String),
			"uint" => Ok(Self::Uint(256)),
			_ => {
				if let Some(bits) = s.strip_prefix("uint") {
					let bits: u16 = bits.parse().map_err(|_| malformed())?;
					if bits == 0 || bits > 256 || bits % 8 != 0 {
						return Err(malformed());
					}
					Ok(Self::Uint(bits))
				} else if let Some(size) = s.strip_prefix("bytes") {
					let size: u8 = size.parse().map_err(|_| malformed())?;
					if size == 0 || size > 32 {
						return Err(malformed());
					}
					Ok(Self::FixedBytes(size))
				} else {
					Err(malformed())
				}
			},
		}
	}
}

/// A named, typed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDef {
	pub name: String,
	pub kind: FieldKind,
}

impl FieldDef {
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
		}
	}
}

fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Ordered fields of the `TransferDetails` struct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferShape {
	fields: Vec<FieldDef>,
}

impl TransferShape {
	/// Builds a shape, rejecting empty shapes, invalid identifiers and
	/// duplicate field names.
	pub fn new(fields: Vec<FieldDef>) -> Result<Self, SigningError> {
		if fields.is_empty() {
			return Err(SigningError::MalformedShape(
				"Shape must declare at least one field".to_string(),
			));
		}

		let mut seen = HashSet::new();
		for field in &fields {
			if !is_identifier(&field.name) {
				return Err(SigningError::MalformedShape(format!(
					"Invalid field name '{}'",
					field.name
				)));
			}
			if !seen.insert(field.name.as_str()) {
				return Err(SigningError::MalformedShape(format!(
					"Duplicate field '{}'",
					field.name
				)));
			}
		}

		Ok(Self { fields })
	}

	/// Parses a Solidity-style parameter list such as `"uint256 amount"` or
	/// `"address to, bytes data"`.
	pub fn parse(declaration: &str) -> Result<Self, SigningError> {
		let fields = declaration
			.split(',')
			.map(|part| {
				let mut tokens = part.split_whitespace();
				match (tokens.next(), tokens.next(), tokens.next()) {
					(Some(kind), Some(name), None) => Ok(FieldDef::new(name, kind.parse()?)),
					_ => Err(SigningError::MalformedShape(format!(
						"Expected '<type> <name>', got '{}'",
						part.trim()
					))),
				}
			})
			.collect::<Result<Vec<_>, _>>()?;
		Self::new(fields)
	}

	/// `TransferDetails(address token,uint256 amount)`.
	pub fn plain() -> Self {
		Self {
			fields: vec![
				FieldDef::new("token", FieldKind::Address),
				FieldDef::new("amount", FieldKind::Uint(256)),
			],
		}
	}

	/// `TransferDetails(address token,uint8 tokenType,uint32 functionSelector,bytes transferDetails)`.
	pub fn tagged() -> Self {
		Self {
			fields: vec![
				FieldDef::new("token", FieldKind::Address),
				FieldDef::new("tokenType", FieldKind::Uint(8)),
				FieldDef::new("functionSelector", FieldKind::Uint(32)),
				FieldDef::new("transferDetails", FieldKind::Bytes),
			],
		}
	}

	pub fn fields(&self) -> &[FieldDef] {
		&self.fields
	}

	pub fn encode_type(&self) -> String {
		let params = self
			.fields
			.iter()
			.map(|f| format!("{} {}", f.kind, f.name))
			.collect::<Vec<_>>()
			.join(",");
		format!("{}({})", DETAILS_TYPE_NAME, params)
	}

	pub fn type_hash(&self) -> B256 {
		keccak256(self.encode_type().as_bytes())
	}

	/// Field list as it appears under `types` in a typed-data payload.
	pub fn types_json(&self) -> Value {
		Value::Array(
			self.fields
				.iter()
				.map(|f| json!({ "name": f.name, "type": f.kind.to_string() }))
				.collect(),
		)
	}
}

/// Which `Transfer` struct encloses the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferVariant {
	/// `Transfer(TransferDetails transferDetails,address spender,uint256 nonce,uint256 deadline)`
	Single,
	/// `Transfer(TransferDetails[] transferDetails,address spender,uint256 nonce,uint256 deadline)`
	Batch,
	/// `Transfer(TransferDetails transferDetails,address spender)`; nonce and
	/// deadline live in the enclosing `Verify`.
	SuperSingle,
	/// `Transfer(TransferDetails[] transferDetails,address spender)`
	SuperBatch,
}

impl TransferVariant {
	pub const ALL: [TransferVariant; 4] = [
		TransferVariant::Single,
		TransferVariant::Batch,
		TransferVariant::SuperSingle,
		TransferVariant::SuperBatch,
	];

	pub fn is_batch(self) -> bool {
		matches!(self, Self::Batch | Self::SuperBatch)
	}

	pub fn has_nonce(self) -> bool {
		matches!(self, Self::Single | Self::Batch)
	}

	fn index(self) -> usize {
		match self {
			Self::Single => 0,
			Self::Batch => 1,
			Self::SuperSingle => 2,
			Self::SuperBatch => 3,
		}
	}
}

/// A complete `Transfer` type tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSchema {
	shape: TransferShape,
	variant: TransferVariant,
	type_hash: B256,
	details_type_hash: B256,
}

impl TransferSchema {
	pub fn new(shape: TransferShape, variant: TransferVariant) -> Self {
		let type_hash = keccak256(encode_type(&shape, variant).as_bytes());
		let details_type_hash = shape.type_hash();
		Self {
			shape,
			variant,
			type_hash,
			details_type_hash,
		}
	}

	pub fn shape(&self) -> &TransferShape {
		&self.shape
	}

	pub fn variant(&self) -> TransferVariant {
		self.variant
	}

	/// Fields of the primary `Transfer` struct.
	pub fn primary_fields(&self) -> Vec<(&'static str, String)> {
		primary_fields(self.variant)
	}

	/// Full EIP-712 `encodeType`: the primary type followed by `TransferDetails`.
	pub fn encode_type(&self) -> String {
		encode_type(&self.shape, self.variant)
	}

	pub fn type_hash(&self) -> B256 {
		self.type_hash
	}

	pub fn details_type_hash(&self) -> B256 {
		self.details_type_hash
	}

	/// The `types` object of a typed-data payload, including `EIP712Domain`.
	pub fn types_json(&self) -> Value {
		let primary: Vec<Value> = self
			.primary_fields()
			.into_iter()
			.map(|(name, ty)| json!({ "name": name, "type": ty }))
			.collect();
		json!({
			"EIP712Domain": domain_types_json(),
			"Transfer": primary,
			"TransferDetails": self.shape.types_json(),
		})
	}
}

fn primary_fields(variant: TransferVariant) -> Vec<(&'static str, String)> {
	let details_type = if variant.is_batch() {
		format!("{}[]", DETAILS_TYPE_NAME)
	} else {
		DETAILS_TYPE_NAME.to_string()
	};
	let mut fields = vec![
		("transferDetails", details_type),
		("spender", "address".to_string()),
	];
	if variant.has_nonce() {
		fields.push(("nonce", "uint256".to_string()));
		fields.push(("deadline", "uint256".to_string()));
	}
	fields
}

fn encode_type(shape: &TransferShape, variant: TransferVariant) -> String {
	let params = primary_fields(variant)
		.into_iter()
		.map(|(name, ty)| format!("{} {}", ty, name))
		.collect::<Vec<_>>()
		.join(",");
	format!("{}({}){}", TRANSFER_TYPE_NAME, params, shape.encode_type())
}

/// `EIP712Domain` field list for typed-data payloads.
pub fn domain_types_json() -> Value {
	json!([
		{ "name": "name", "type": "string" },
		{ "name": "version", "type": "string" },
		{ "name": "chainId", "type": "uint256" },
		{ "name": "verifyingContract", "type": "address" },
	])
}

struct SchemaRegistry {
	plain: [TransferSchema; 4],
	tagged: [TransferSchema; 4],
}

static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| SchemaRegistry {
	plain: TransferVariant::ALL.map(|v| TransferSchema::new(TransferShape::plain(), v)),
	tagged: TransferVariant::ALL.map(|v| TransferSchema::new(TransferShape::tagged(), v)),
});

/// The Permit3 schema for an asset kind and transfer variant.
pub fn schema_for(kind: AssetKind, variant: TransferVariant) -> &'static TransferSchema {
	let row = match kind {
		AssetKind::Plain => &REGISTRY.plain,
		AssetKind::Generic => &REGISTRY.tagged,
	};
	&row[variant.index()]
}
