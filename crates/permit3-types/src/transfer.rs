//! Transfer intents.
//!
//! A [`SignatureTransfer`] (or [`SignatureTransferBatch`]) is what the owner
//! signs; a [`RequestedTransfer`] is what the spender asks the contract to
//! execute against that signature. Both are short-lived values built per call.

use crate::asset::{AssetKind, GenericAsset, PlainAsset, TokenType};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// ABI encoding of a single `uint256`, the payload format for amounts sent
/// through the tagged transfer-details tuple.
pub fn encode_amount(amount: U256) -> Bytes {
	Bytes::copy_from_slice(&amount.to_be_bytes::<32>())
}

/// The content of a transfer: which asset and how much (or what).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferDetails {
	/// Plain token with a fixed amount.
	Plain { token: PlainAsset, amount: U256 },
	/// Generic token with an opaque payload interpreted only by the token contract.
	Generic { token: GenericAsset, data: Bytes },
}

impl TransferDetails {
	pub fn plain(token: PlainAsset, amount: U256) -> Self {
		Self::Plain { token, amount }
	}

	pub fn generic(token: GenericAsset, data: impl Into<Bytes>) -> Self {
		Self::Generic {
			token,
			data: data.into(),
		}
	}

	/// Amount-style transfer of a generic asset; the payload is `abi.encode(amount)`.
	pub fn generic_amount(token: GenericAsset, amount: U256) -> Self {
		Self::Generic {
			token,
			data: encode_amount(amount),
		}
	}

	pub fn kind(&self) -> AssetKind {
		match self {
			Self::Plain { .. } => AssetKind::Plain,
			Self::Generic { .. } => AssetKind::Generic,
		}
	}

	pub fn token_address(&self) -> Address {
		match self {
			Self::Plain { token, .. } => token.address(),
			Self::Generic { token, .. } => token.address(),
		}
	}

	/// Token type of a generic transfer; `None` for plain transfers.
	pub fn token_type(&self) -> Option<TokenType> {
		match self {
			Self::Plain { .. } => None,
			Self::Generic { token, .. } => Some(token.token_type()),
		}
	}
}

/// A signed, nonce-scoped single transfer intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureTransfer {
	pub transfer_details: TransferDetails,
	/// Account allowed to execute the transfer.
	pub spender: Address,
	/// Caller-chosen; uniqueness is enforced by the contract's nonce bitmap.
	pub nonce: U256,
	/// Unix timestamp after which the contract rejects the intent.
	pub deadline: U256,
}

/// A signed intent over an ordered sequence of transfer details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureTransferBatch {
	/// Order is significant: requested transfers are matched by position.
	pub transfer_details: Vec<TransferDetails>,
	pub spender: Address,
	pub nonce: U256,
	pub deadline: U256,
}

impl SignatureTransferBatch {
	pub fn len(&self) -> usize {
		self.transfer_details.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transfer_details.is_empty()
	}
}

/// Recipient-side payload of a requested transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedDetails {
	/// A concrete amount, at most the signed amount.
	Amount(U256),
	/// Opaque bytes for a generic asset.
	Data(Bytes),
}

/// The instruction a spender submits against a signed intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedTransfer {
	pub to: Address,
	pub details: RequestedDetails,
}

impl RequestedTransfer {
	pub fn amount(to: Address, amount: U256) -> Self {
		Self {
			to,
			details: RequestedDetails::Amount(amount),
		}
	}

	pub fn data(to: Address, data: impl Into<Bytes>) -> Self {
		Self {
			to,
			details: RequestedDetails::Data(data.into()),
		}
	}
}

/// A single transfer intent with the owner's signature over its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransfer {
	pub transfer: SignatureTransfer,
	pub signer: Address,
	pub digest: B256,
	/// 65-byte `r ‖ s ‖ v` signature.
	pub signature: Bytes,
}

/// A batch transfer intent with the owner's signature over its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransferBatch {
	pub transfer: SignatureTransferBatch,
	pub signer: Address,
	pub digest: B256,
	pub signature: Bytes,
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use alloy_sol_types::SolValue;

	#[test]
	fn test_encode_amount_matches_abi_encoding() {
		let amount = U256::from(1_000_000_000_000_000_000u128);

		assert_eq!(encode_amount(amount).to_vec(), amount.abi_encode());
		assert_eq!(encode_amount(amount).len(), 32);
	}

	#[test]
	fn test_generic_amount_is_generic_kind() {
		let token = GenericAsset::new(
			1,
			address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
			"Wrapped",
			"WRP",
			B256::ZERO,
			TokenType::Erc20,
		);

		let details = TransferDetails::generic_amount(token, U256::from(5));

		assert_eq!(details.kind(), AssetKind::Generic);
		assert_eq!(details.token_type(), Some(TokenType::Erc20));
		match details {
			TransferDetails::Generic { data, .. } => {
				assert_eq!(U256::from_be_slice(&data), U256::from(5));
			},
			TransferDetails::Plain { .. } => panic!("expected generic details"),
		}
	}
}
