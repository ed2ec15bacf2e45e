//! Super-signature aggregation.
//!
//! Many transfer digests are folded into one `Verify` envelope that the owner
//! signs once. The contract stores a root derived from the signer and the
//! digest list (`verifyAndStoreRoot`) and later executes any transfer whose
//! digest is a member (`transferBySuperSignature`). Contract-side state is
//! never tracked here.

use crate::{
	encoder::{hash_typed_data, typed_data_payload},
	schema::{domain_types_json, verify_type_hash},
};
use alloy_primitives::{keccak256, Address, B256, U256};
use permit3_types::{
	utils::{hash_b256_array, Eip712AbiEncoder},
	Root, SigningDomain, TypedData, Verify,
};
use serde_json::json;

/// Builds a `Verify` envelope. Digests keep the caller's order and duplicates.
pub fn build_verify(digests: Vec<B256>, nonce: U256, deadline: U256) -> Verify {
	Verify {
		data_hash: digests,
		nonce,
		deadline,
	}
}

pub fn verify_struct_hash(verify: &Verify) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&verify_type_hash());
	enc.push_b256(&hash_b256_array(&verify.data_hash));
	enc.push_u256(verify.nonce);
	enc.push_u256(verify.deadline);
	keccak256(enc.finish())
}

pub fn verify_digest(domain: &SigningDomain, verify: &Verify) -> B256 {
	hash_typed_data(domain, &verify_struct_hash(verify))
}

/// Digest and wallet payload of a `Verify` envelope.
pub fn verify_typed_data(domain: &SigningDomain, verify: &Verify) -> TypedData {
	let digest = verify_digest(domain, verify);
	tracing::debug!(%digest, members = verify.data_hash.len(), "Computed verify digest");

	let types = json!({
		"EIP712Domain": domain_types_json(),
		"Verify": [
			{ "name": "dataHash", "type": "bytes32[]" },
			{ "name": "nonce", "type": "uint256" },
			{ "name": "deadline", "type": "uint256" },
		],
	});
	let message = json!({
		"dataHash": verify.data_hash.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
		"nonce": verify.nonce.to_string(),
		"deadline": verify.deadline.to_string(),
	});
	TypedData {
		digest,
		payload: typed_data_payload(domain, types, "Verify", message),
	}
}

/// `keccak256(abi.encodePacked(address signer, bytes32[] dataHash))`.
///
/// Packed encoding of `bytes32[]` is the bare concatenation of elements with
/// no length prefix, so the preimage is `20 + 32 * n` bytes.
pub fn calculate_root(signer: Address, digests: &[B256]) -> Root {
	let mut preimage = Vec::with_capacity(20 + 32 * digests.len());
	preimage.extend_from_slice(signer.as_slice());
	for digest in digests {
		preimage.extend_from_slice(digest.as_slice());
	}
	Root(keccak256(preimage))
}
