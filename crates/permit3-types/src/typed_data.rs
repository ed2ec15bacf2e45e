//! A ready-to-sign EIP-712 message.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// The digest a signature must cover, with the `eth_signTypedData_v4`
/// payload that produces the same digest.
///
/// Local signers sign `digest` directly; wallet-backed signers forward
/// `payload` and must end up with a signature over the same digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedData {
	pub digest: B256,
	/// `{ "types", "primaryType", "domain", "message" }`.
	pub payload: serde_json::Value,
}
