//! Asset descriptors.
//!
//! An asset is either a plain fungible token (ERC-20, fixed amount semantics)
//! or a generic ILRTA-style token whose transfer payload is an opaque,
//! application-defined byte string. The variant of [`Asset`] is the kind tag
//! that selects the encoding path; nothing downstream inspects payload
//! contents to make that choice.

use alloy_primitives::{
	utils::{parse_units, ParseUnits},
	Address, B256, U256,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Selector of ERC-20 `transferFrom(address,address,uint256)`.
pub const ERC20_TRANSFER_FROM_SELECTOR: u32 = 0x23b8_72dd;

/// Selector Permit3 invokes on ILRTA tokens.
pub const ILRTA_TRANSFER_FROM_SELECTOR: u32 = 0x811c_34d3;

/// Token type tag carried in the tagged transfer-details tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TokenType {
	Erc20 = 0,
	Ilrta = 1,
}

impl TokenType {
	/// Wire value of the tag (`uint8`).
	pub const fn as_u8(self) -> u8 {
		self as u8
	}

	/// The function selector Permit3 calls on a token of this type.
	pub const fn function_selector(self) -> u32 {
		match self {
			Self::Erc20 => ERC20_TRANSFER_FROM_SELECTOR,
			Self::Ilrta => ILRTA_TRANSFER_FROM_SELECTOR,
		}
	}
}

/// Kind tag of an asset, selecting the transfer-details encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
	/// Encoded as `(address token, uint256 amount)`.
	Plain,
	/// Encoded as `(address token, uint8 tokenType, uint32 functionSelector, bytes transferDetails)`.
	Generic,
}

impl std::fmt::Display for AssetKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Plain => write!(f, "plain"),
			Self::Generic => write!(f, "generic"),
		}
	}
}

/// Errors raised while turning a decimal string into a token amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
	/// Amounts are unsigned.
	#[error("Negative amount: {0}")]
	Negative(String),
	/// The string is not a decimal number that fits in 256 bits at the asset's precision.
	#[error("Invalid amount '{input}': {message}")]
	Invalid { input: String, message: String },
}

/// A plain fungible token.
///
/// Fields are private: the address and chain are fixed once the value exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlainAsset {
	chain_id: u64,
	address: Address,
	name: String,
	symbol: String,
	decimals: u8,
}

impl PlainAsset {
	pub fn new(
		chain_id: u64,
		address: Address,
		name: impl Into<String>,
		symbol: impl Into<String>,
		decimals: u8,
	) -> Self {
		Self {
			chain_id,
			address,
			name: name.into(),
			symbol: symbol.into(),
			decimals,
		}
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn symbol(&self) -> &str {
		&self.symbol
	}

	pub fn decimals(&self) -> u8 {
		self.decimals
	}

	/// Scales a decimal string ("0.5", "1", "1000.25") by the asset's decimals.
	///
	/// # Errors
	///
	/// Returns [`AmountError::Negative`] for negative input and
	/// [`AmountError::Invalid`] for malformed input, more fractional digits than
	/// the asset supports, or values that overflow `uint256`.
	pub fn parse_amount(&self, amount: &str) -> Result<U256, AmountError> {
		let trimmed = amount.trim();
		let invalid = |message: String| AmountError::Invalid {
			input: trimmed.to_string(),
			message,
		};
		if trimmed.is_empty() {
			return Err(invalid("Empty amount".to_string()));
		}
		if trimmed.starts_with('-') {
			return Err(AmountError::Negative(trimmed.to_string()));
		}

		// parse_units truncates extra fractional digits instead of failing.
		if let Some((_, fraction)) = trimmed.split_once('.') {
			let significant = fraction.trim_end_matches('0').len();
			if significant > self.decimals as usize {
				return Err(invalid(format!(
					"{} fractional digits exceed the asset's {} decimals",
					significant, self.decimals
				)));
			}
		}

		match parse_units(trimmed, self.decimals) {
			Ok(ParseUnits::U256(value)) => Ok(value),
			Ok(ParseUnits::I256(_)) => Err(AmountError::Negative(trimmed.to_string())),
			Err(e) => Err(invalid(e.to_string())),
		}
	}
}

/// A generic (ILRTA-style) token whose transfers carry opaque application data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericAsset {
	chain_id: u64,
	address: Address,
	name: String,
	symbol: String,
	/// Application-defined sub-identifier within the token contract.
	id: B256,
	token_type: TokenType,
}

impl GenericAsset {
	pub fn new(
		chain_id: u64,
		address: Address,
		name: impl Into<String>,
		symbol: impl Into<String>,
		id: B256,
		token_type: TokenType,
	) -> Self {
		Self {
			chain_id,
			address,
			name: name.into(),
			symbol: symbol.into(),
			id,
			token_type,
		}
	}

	/// Shorthand for an ILRTA token with a zero sub-identifier.
	pub fn ilrta(
		chain_id: u64,
		address: Address,
		name: impl Into<String>,
		symbol: impl Into<String>,
	) -> Self {
		Self::new(chain_id, address, name, symbol, B256::ZERO, TokenType::Ilrta)
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn symbol(&self) -> &str {
		&self.symbol
	}

	pub fn id(&self) -> B256 {
		self.id
	}

	pub fn token_type(&self) -> TokenType {
		self.token_type
	}
}

/// Closed set of asset kinds. The variant is the kind tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Asset {
	Plain(PlainAsset),
	Generic(GenericAsset),
}

impl Asset {
	pub fn kind(&self) -> AssetKind {
		match self {
			Self::Plain(_) => AssetKind::Plain,
			Self::Generic(_) => AssetKind::Generic,
		}
	}

	pub fn address(&self) -> Address {
		match self {
			Self::Plain(asset) => asset.address(),
			Self::Generic(asset) => asset.address(),
		}
	}

	pub fn chain_id(&self) -> u64 {
		match self {
			Self::Plain(asset) => asset.chain_id(),
			Self::Generic(asset) => asset.chain_id(),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Plain(asset) => asset.name(),
			Self::Generic(asset) => asset.name(),
		}
	}
}

impl From<PlainAsset> for Asset {
	fn from(asset: PlainAsset) -> Self {
		Self::Plain(asset)
	}
}

impl From<GenericAsset> for Asset {
	fn from(asset: GenericAsset) -> Self {
		Self::Generic(asset)
	}
}
