//! Transfer encoder.
//!
//! Turns transfer intents into EIP-712 struct hashes and domain-scoped
//! digests. The encoding branch is chosen by the asset kind tag alone:
//! plain details hash as `(token, amount)`, generic details as
//! `(token, tokenType, functionSelector, keccak(transferDetails))` with the
//! payload bytes passed through untouched.

use crate::{
	schema::{schema_for, TransferSchema, TransferVariant, TRANSFER_TYPE_NAME},
	SigningError,
};
use alloy_primitives::{hex, keccak256, Address, B256, U256};
use permit3_types::{
	utils::{compute_final_digest, hash_b256_array, Eip712AbiEncoder},
	AssetKind, SignatureTransfer, SignatureTransferBatch, SigningDomain, TransferDetails,
	TypedData,
};
use serde_json::{json, Value};

/// `hashStruct(TransferDetails)`.
pub fn details_struct_hash(details: &TransferDetails) -> B256 {
	let schema = schema_for(details.kind(), TransferVariant::Single);
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&schema.details_type_hash());
	match details {
		TransferDetails::Plain { token, amount } => {
			enc.push_address(&token.address());
			enc.push_u256(*amount);
		},
		TransferDetails::Generic { token, data } => {
			let token_type = token.token_type();
			enc.push_address(&token.address());
			enc.push_u8(token_type.as_u8());
			enc.push_u32(token_type.function_selector());
			enc.push_dynamic(data);
		},
	}
	keccak256(enc.finish())
}

/// Message object of one `TransferDetails` value.
pub fn details_json(details: &TransferDetails) -> Value {
	match details {
		TransferDetails::Plain { token, amount } => json!({
			"token": token.address().to_checksum(None),
			"amount": amount.to_string(),
		}),
		TransferDetails::Generic { token, data } => {
			let token_type = token.token_type();
			json!({
				"token": token.address().to_checksum(None),
				"tokenType": token_type.as_u8(),
				"functionSelector": token_type.function_selector(),
				"transferDetails": hex::encode_prefixed(data),
			})
		},
	}
}

/// The single kind shared by every element of a batch.
///
/// # Errors
///
/// [`SigningError::EmptyBatch`] for no elements, [`SigningError::MixedBatch`]
/// when plain and generic details are combined.
pub fn batch_kind(details: &[TransferDetails]) -> Result<AssetKind, SigningError> {
	let first = details.first().ok_or(SigningError::EmptyBatch)?.kind();
	if details.iter().any(|d| d.kind() != first) {
		return Err(SigningError::MixedBatch);
	}
	Ok(first)
}

fn hash_transfer(
	schema: &TransferSchema,
	details_hash: &B256,
	spender: &Address,
	nonce_and_deadline: Option<(U256, U256)>,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&schema.type_hash());
	enc.push_b256(details_hash);
	enc.push_address(spender);
	if let Some((nonce, deadline)) = nonce_and_deadline {
		enc.push_u256(nonce);
		enc.push_u256(deadline);
	}
	keccak256(enc.finish())
}

fn batch_details_hash(details: &[TransferDetails]) -> B256 {
	let hashes: Vec<B256> = details.iter().map(details_struct_hash).collect();
	hash_b256_array(&hashes)
}

pub fn transfer_struct_hash(transfer: &SignatureTransfer) -> B256 {
	let details = &transfer.transfer_details;
	hash_transfer(
		schema_for(details.kind(), TransferVariant::Single),
		&details_struct_hash(details),
		&transfer.spender,
		Some((transfer.nonce, transfer.deadline)),
	)
}

pub fn batch_struct_hash(batch: &SignatureTransferBatch) -> Result<B256, SigningError> {
	let kind = batch_kind(&batch.transfer_details)?;
	Ok(hash_transfer(
		schema_for(kind, TransferVariant::Batch),
		&batch_details_hash(&batch.transfer_details),
		&batch.spender,
		Some((batch.nonce, batch.deadline)),
	))
}

/// Struct hash of the no-nonce `Transfer` that a super signature authorizes.
pub fn super_transfer_struct_hash(details: &TransferDetails, spender: &Address) -> B256 {
	hash_transfer(
		schema_for(details.kind(), TransferVariant::SuperSingle),
		&details_struct_hash(details),
		spender,
		None,
	)
}

pub fn super_batch_struct_hash(
	details: &[TransferDetails],
	spender: &Address,
) -> Result<B256, SigningError> {
	let kind = batch_kind(details)?;
	Ok(hash_transfer(
		schema_for(kind, TransferVariant::SuperBatch),
		&batch_details_hash(details),
		spender,
		None,
	))
}

/// `keccak256(0x1901 ‖ domainSeparator ‖ structHash)`.
pub fn hash_typed_data(domain: &SigningDomain, struct_hash: &B256) -> B256 {
	compute_final_digest(&domain.separator(), struct_hash)
}

pub fn transfer_digest(domain: &SigningDomain, transfer: &SignatureTransfer) -> B256 {
	hash_typed_data(domain, &transfer_struct_hash(transfer))
}

pub fn batch_digest(
	domain: &SigningDomain,
	batch: &SignatureTransferBatch,
) -> Result<B256, SigningError> {
	Ok(hash_typed_data(domain, &batch_struct_hash(batch)?))
}

/// Digest of a super-signature transfer; one entry of `Verify.dataHash`.
pub fn super_transfer_digest(
	domain: &SigningDomain,
	details: &TransferDetails,
	spender: &Address,
) -> B256 {
	hash_typed_data(domain, &super_transfer_struct_hash(details, spender))
}

pub fn super_batch_digest(
	domain: &SigningDomain,
	details: &[TransferDetails],
	spender: &Address,
) -> Result<B256, SigningError> {
	Ok(hash_typed_data(
		domain,
		&super_batch_struct_hash(details, spender)?,
	))
}

/// Assembles an `eth_signTypedData_v4` document.
pub(crate) fn typed_data_payload(
	domain: &SigningDomain,
	types: Value,
	primary_type: &str,
	message: Value,
) -> Value {
	json!({
		"types": types,
		"primaryType": primary_type,
		"domain": domain.to_json(),
		"message": message,
	})
}

/// Digest and wallet payload of a single signature transfer.
pub fn transfer_typed_data(domain: &SigningDomain, transfer: &SignatureTransfer) -> TypedData {
	let schema = schema_for(transfer.transfer_details.kind(), TransferVariant::Single);
	let digest = transfer_digest(domain, transfer);
	tracing::debug!(%digest, domain = %domain.name, chain_id = domain.chain_id, "Computed transfer digest");

	let message = json!({
		"transferDetails": details_json(&transfer.transfer_details),
		"spender": transfer.spender.to_checksum(None),
		"nonce": transfer.nonce.to_string(),
		"deadline": transfer.deadline.to_string(),
	});
	TypedData {
		digest,
		payload: typed_data_payload(domain, schema.types_json(), TRANSFER_TYPE_NAME, message),
	}
}

/// Digest and wallet payload of a batch signature transfer.
pub fn batch_typed_data(
	domain: &SigningDomain,
	batch: &SignatureTransferBatch,
) -> Result<TypedData, SigningError> {
	let kind = batch_kind(&batch.transfer_details)?;
	let schema = schema_for(kind, TransferVariant::Batch);
	let digest = batch_digest(domain, batch)?;
	tracing::debug!(
		%digest,
		domain = %domain.name,
		chain_id = domain.chain_id,
		len = batch.len(),
		"Computed batch transfer digest"
	);

	let message = json!({
		"transferDetails": batch.transfer_details.iter().map(details_json).collect::<Vec<_>>(),
		"spender": batch.spender.to_checksum(None),
		"nonce": batch.nonce.to_string(),
		"deadline": batch.deadline.to_string(),
	});
	Ok(TypedData {
		digest,
		payload: typed_data_payload(domain, schema.types_json(), TRANSFER_TYPE_NAME, message),
	})
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use alloy_primitives::{address, Bytes};
	use alloy_sol_types::{eip712_domain, Eip712Domain, SolStruct};
	use permit3_types::{
		encode_amount, GenericAsset, Permit3Deployment, PlainAsset, TokenType,
	};

	pub(crate) const PERMIT3: Address = address!("Cf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9");
	pub(crate) const TOKEN: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
	pub(crate) const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
	pub(crate) const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
	pub(crate) const DEADLINE: u64 = 1_700_000_100;
	pub(crate) const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

	mod plain_ref {
		alloy_sol_types::sol! {
			struct TransferDetails { address token; uint256 amount; }
			struct Transfer { TransferDetails transferDetails; address spender; uint256 nonce; uint256 deadline; }
		}
	}

	mod plain_batch_ref {
		alloy_sol_types::sol! {
			struct TransferDetails { address token; uint256 amount; }
			struct Transfer { TransferDetails[] transferDetails; address spender; uint256 nonce; uint256 deadline; }
		}
	}

	mod tagged_ref {
		alloy_sol_types::sol! {
			struct TransferDetails { address token; uint8 tokenType; uint32 functionSelector; bytes transferDetails; }
			struct Transfer { TransferDetails transferDetails; address spender; uint256 nonce; uint256 deadline; }
		}
	}

	mod super_ref {
		alloy_sol_types::sol! {
			struct TransferDetails { address token; uint256 amount; }
			struct Transfer { TransferDetails transferDetails; address spender; }
		}
	}

	pub(crate) fn mock_erc20() -> PlainAsset {
		PlainAsset::new(31337, TOKEN, "Mock ERC20", "MOCK", 18)
	}

	pub(crate) fn mock_ilrta() -> GenericAsset {
		GenericAsset::ilrta(
			31337,
			address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
			"Test FT",
			"TEST",
		)
	}

	pub(crate) fn permit3_domain(chain_id: u64) -> SigningDomain {
		SigningDomain::permit3(chain_id, &Permit3Deployment::new(PERMIT3))
	}

	fn alloy_domain(chain_id: u64) -> Eip712Domain {
		eip712_domain! {
			name: "Permit3",
			version: "1",
			chain_id: chain_id,
			verifying_contract: PERMIT3,
		}
	}

	pub(crate) fn single_transfer(amount: U256) -> SignatureTransfer {
		SignatureTransfer {
			transfer_details: TransferDetails::plain(mock_erc20(), amount),
			spender: BOB,
			nonce: U256::ZERO,
			deadline: U256::from(DEADLINE),
		}
	}

	#[test]
	fn test_plain_transfer_digest_matches_alloy() {
		let transfer = single_transfer(U256::from(ONE_ETHER));
		let expected = plain_ref::Transfer {
			transferDetails: plain_ref::TransferDetails {
				token: TOKEN,
				amount: U256::from(ONE_ETHER),
			},
			spender: BOB,
			nonce: U256::ZERO,
			deadline: U256::from(DEADLINE),
		}
		.eip712_signing_hash(&alloy_domain(31337));

		assert_eq!(transfer_digest(&permit3_domain(31337), &transfer), expected);
	}

	#[test]
	fn test_digest_is_deterministic() {
		let transfer = single_transfer(U256::from(ONE_ETHER));
		let domain = permit3_domain(31337);

		assert_eq!(
			transfer_digest(&domain, &transfer),
			transfer_digest(&domain, &transfer.clone())
		);
		assert_eq!(
			transfer_typed_data(&domain, &transfer),
			transfer_typed_data(&domain, &transfer)
		);
	}

	#[test]
	fn test_batch_digest_matches_alloy() {
		let half = U256::from(ONE_ETHER / 2);
		let batch = SignatureTransferBatch {
			transfer_details: vec![
				TransferDetails::plain(mock_erc20(), half),
				TransferDetails::plain(mock_erc20(), half),
			],
			spender: BOB,
			nonce: U256::ZERO,
			deadline: U256::from(DEADLINE),
		};
		let reference_details = plain_batch_ref::TransferDetails {
			token: TOKEN,
			amount: half,
		};
		let expected = plain_batch_ref::Transfer {
			transferDetails: vec![reference_details.clone(), reference_details],
			spender: BOB,
			nonce: U256::ZERO,
			deadline: U256::from(DEADLINE),
		}
		.eip712_signing_hash(&alloy_domain(31337));

		let domain = permit3_domain(31337);
		let digest = batch_digest(&domain, &batch).unwrap();
		assert_eq!(digest, expected);
		assert_ne!(
			digest,
			transfer_digest(&domain, &single_transfer(U256::from(ONE_ETHER)))
		);
	}

	#[test]
	fn test_tagged_transfer_digest_matches_alloy() {
		let payload = Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]);
		let transfer = SignatureTransfer {
			transfer_details: TransferDetails::generic(mock_ilrta(), payload.clone()),
			spender: BOB,
			nonce: U256::from(3),
			deadline: U256::from(DEADLINE),
		};
		let expected = tagged_ref::Transfer {
			transferDetails: tagged_ref::TransferDetails {
				token: mock_ilrta().address(),
				tokenType: 1,
				functionSelector: 0x811c34d3,
				transferDetails: payload,
			},
			spender: BOB,
			nonce: U256::from(3),
			deadline: U256::from(DEADLINE),
		}
		.eip712_signing_hash(&alloy_domain(31337));

		assert_eq!(transfer_digest(&permit3_domain(31337), &transfer), expected);
	}

	#[test]
	fn test_erc20_through_tagged_path() {
		let token = GenericAsset::new(
			31337,
			TOKEN,
			"Mock ERC20",
			"MOCK",
			B256::ZERO,
			TokenType::Erc20,
		);
		let transfer = SignatureTransfer {
			transfer_details: TransferDetails::generic_amount(token, U256::from(ONE_ETHER)),
			spender: BOB,
			nonce: U256::ZERO,
			deadline: U256::from(DEADLINE),
		};
		let expected = tagged_ref::Transfer {
			transferDetails: tagged_ref::TransferDetails {
				token: TOKEN,
				tokenType: 0,
				functionSelector: 0x23b872dd,
				transferDetails: encode_amount(U256::from(ONE_ETHER)),
			},
			spender: BOB,
			nonce: U256::ZERO,
			deadline: U256::from(DEADLINE),
		}
		.eip712_signing_hash(&alloy_domain(31337));

		let digest = transfer_digest(&permit3_domain(31337), &transfer);
		assert_eq!(digest, expected);
		assert_ne!(
			digest,
			transfer_digest(&permit3_domain(31337), &single_transfer(U256::from(ONE_ETHER)))
		);
	}

	#[test]
	fn test_super_transfer_digest_matches_alloy() {
		let details = TransferDetails::plain(mock_erc20(), U256::from(ONE_ETHER));
		let expected = super_ref::Transfer {
			transferDetails: super_ref::TransferDetails {
				token: TOKEN,
				amount: U256::from(ONE_ETHER),
			},
			spender: BOB,
		}
		.eip712_signing_hash(&alloy_domain(31337));

		assert_eq!(
			super_transfer_digest(&permit3_domain(31337), &details, &BOB),
			expected
		);
	}

	#[test]
	fn test_domain_separation() {
		let transfer = single_transfer(U256::from(ONE_ETHER));
		let other_contract = SigningDomain::permit3(
			1,
			&Permit3Deployment::new(address!("0000000000000000000000000000000000000001")),
		);

		let base = transfer_digest(&permit3_domain(1), &transfer);
		assert_ne!(base, transfer_digest(&permit3_domain(2), &transfer));
		assert_ne!(base, transfer_digest(&other_contract, &transfer));
	}

	#[test]
	fn test_mixed_batch_rejected() {
		let batch = SignatureTransferBatch {
			transfer_details: vec![
				TransferDetails::plain(mock_erc20(), U256::from(1)),
				TransferDetails::generic(mock_ilrta(), Bytes::new()),
			],
			spender: BOB,
			nonce: U256::ZERO,
			deadline: U256::from(DEADLINE),
		};

		assert!(matches!(
			batch_digest(&permit3_domain(1), &batch),
			Err(SigningError::MixedBatch)
		));
		assert!(matches!(
			super_batch_digest(&permit3_domain(1), &batch.transfer_details, &BOB),
			Err(SigningError::MixedBatch)
		));
	}

	#[test]
	fn test_empty_batch_rejected() {
		assert!(matches!(
			super_batch_digest(&permit3_domain(1), &[], &BOB),
			Err(SigningError::EmptyBatch)
		));
	}

	#[test]
	fn test_generic_payload_content_does_not_change_branch() {
		let amount_like = TransferDetails::generic(mock_ilrta(), encode_amount(U256::from(5)));
		let arbitrary = TransferDetails::generic(mock_ilrta(), Bytes::from_static(b"anything"));

		let json_a = details_json(&amount_like);
		let json_b = details_json(&arbitrary);
		assert_eq!(json_a["tokenType"], 1);
		assert_eq!(json_b["tokenType"], 1);
		assert!(json_a.get("amount").is_none());
	}

	#[test]
	fn test_typed_data_payload_shape() {
		let typed = transfer_typed_data(
			&permit3_domain(31337),
			&single_transfer(U256::from(ONE_ETHER)),
		);
		let payload = &typed.payload;

		assert_eq!(payload["primaryType"], "Transfer");
		assert_eq!(payload["domain"]["name"], "Permit3");
		assert_eq!(
			payload["domain"]["verifyingContract"],
			"0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9"
		);
		assert_eq!(
			payload["message"]["transferDetails"]["amount"],
			"1000000000000000000"
		);
		assert_eq!(
			payload["message"]["spender"],
			"0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
		);
		assert_eq!(payload["message"]["deadline"], DEADLINE.to_string());
	}
}
