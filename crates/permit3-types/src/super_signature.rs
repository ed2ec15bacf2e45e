//! Super-signature envelope types.
//!
//! One `Verify` signature authorizes every transfer whose digest appears in
//! `data_hash`. The contract stores a [`Root`] derived from the signer and the
//! digest list; member transfers are later executed against that root.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregated authorization over many transfer digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verify {
	/// Kept in caller order; never sorted or deduplicated.
	pub data_hash: Vec<B256>,
	pub nonce: U256,
	pub deadline: U256,
}

impl Verify {
	/// Set membership, which is what authorizes an individual transfer.
	pub fn contains(&self, digest: &B256) -> bool {
		self.data_hash.contains(digest)
	}
}

/// Content-addressed commitment `keccak256(signer ‖ dataHash[0] ‖ … ‖ dataHash[n-1])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Root(pub B256);

impl Root {
	pub fn as_b256(&self) -> &B256 {
		&self.0
	}
}

impl fmt::Display for Root {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<Root> for B256 {
	fn from(root: Root) -> Self {
		root.0
	}
}

/// A `Verify` envelope together with its signature and signer, ready for
/// `verifyAndStoreRoot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedVerify {
	pub verify: Verify,
	pub signer: Address,
	/// EIP-712 digest of the `Verify` struct under the super-signature domain.
	pub digest: B256,
	/// 65-byte `r ‖ s ‖ v` signature.
	pub signature: alloy_primitives::Bytes,
	/// Root the contract will store once the signature is verified.
	pub root: Root,
}
