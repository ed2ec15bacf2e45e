//! Transfers signed directly against an ILRTA asset contract.
//!
//! These are bound to the asset's own domain (`name` = asset name,
//! `verifyingContract` = asset address) and carry an application-defined
//! detail shape, e.g. `TransferDetails(uint256 amount)` for a fungible token.
//! The contract receives the details ABI-encoded as `bytes`.

use crate::{
	encoder::{hash_typed_data, typed_data_payload},
	schema::{TransferSchema, TransferShape, TransferVariant, TRANSFER_TYPE_NAME},
	value::{encode_shape_values, shape_struct_hash, shape_values_json, ShapeValues},
	SigningError,
};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use permit3_types::{utils::Eip712AbiEncoder, GenericAsset, SigningDomain, TypedData};
use serde_json::json;

/// A nonce-scoped transfer intent for an ILRTA asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSignatureTransfer {
	pub asset: GenericAsset,
	pub details: ShapeValues,
	pub spender: Address,
	pub nonce: U256,
	pub deadline: U256,
}

/// Recipient-side instruction against an [`AssetSignatureTransfer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequestedTransfer {
	pub to: Address,
	pub details: ShapeValues,
}

/// An asset transfer with the owner's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAssetTransfer {
	pub transfer: AssetSignatureTransfer,
	pub shape: TransferShape,
	pub signer: Address,
	pub digest: B256,
	pub signature: Bytes,
}

fn hash_asset_transfer(
	shape: &TransferShape,
	variant: TransferVariant,
	details: &ShapeValues,
	spender: &Address,
	nonce_and_deadline: Option<(U256, U256)>,
) -> Result<B256, SigningError> {
	let schema = TransferSchema::new(shape.clone(), variant);
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&schema.type_hash());
	enc.push_b256(&shape_struct_hash(shape, details)?);
	enc.push_address(spender);
	if let Some((nonce, deadline)) = nonce_and_deadline {
		enc.push_u256(nonce);
		enc.push_u256(deadline);
	}
	Ok(keccak256(enc.finish()))
}

/// Digest of a nonce-scoped asset transfer.
pub fn asset_transfer_digest(
	domain: &SigningDomain,
	shape: &TransferShape,
	transfer: &AssetSignatureTransfer,
) -> Result<B256, SigningError> {
	let struct_hash = hash_asset_transfer(
		shape,
		TransferVariant::Single,
		&transfer.details,
		&transfer.spender,
		Some((transfer.nonce, transfer.deadline)),
	)?;
	Ok(hash_typed_data(domain, &struct_hash))
}

/// Digest of an asset transfer authorized through a super signature.
pub fn asset_super_transfer_digest(
	domain: &SigningDomain,
	shape: &TransferShape,
	details: &ShapeValues,
	spender: &Address,
) -> Result<B256, SigningError> {
	let struct_hash =
		hash_asset_transfer(shape, TransferVariant::SuperSingle, details, spender, None)?;
	Ok(hash_typed_data(domain, &struct_hash))
}

pub fn asset_transfer_typed_data(
	domain: &SigningDomain,
	shape: &TransferShape,
	transfer: &AssetSignatureTransfer,
) -> Result<TypedData, SigningError> {
	let digest = asset_transfer_digest(domain, shape, transfer)?;
	let schema = TransferSchema::new(shape.clone(), TransferVariant::Single);
	let message = json!({
		"transferDetails": shape_values_json(shape, &transfer.details)?,
		"spender": transfer.spender.to_checksum(None),
		"nonce": transfer.nonce.to_string(),
		"deadline": transfer.deadline.to_string(),
	});
	tracing::debug!(%digest, asset = %transfer.asset.address(), "Computed asset transfer digest");

	Ok(TypedData {
		digest,
		payload: typed_data_payload(domain, schema.types_json(), TRANSFER_TYPE_NAME, message),
	})
}

/// ABI-encoded details for the asset contract's `bytes transferDetails` argument.
pub fn encode_asset_details(
	shape: &TransferShape,
	details: &ShapeValues,
) -> Result<Bytes, SigningError> {
	encode_shape_values(shape, details)
}
