//! Contract-call and transaction types exchanged with the chain client.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully encoded contract call, used for both simulation and submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
	pub chain_id: u64,
	/// Sender; `None` lets the chain client fill in its own account.
	pub from: Option<Address>,
	pub to: Address,
	pub data: Bytes,
	pub value: U256,
}

impl ContractCall {
	pub fn new(chain_id: u64, to: Address, data: impl Into<Bytes>) -> Self {
		Self {
			chain_id,
			from: None,
			to,
			data: data.into(),
			value: U256::ZERO,
		}
	}

	pub fn with_from(mut self, from: Address) -> Self {
		self.from = Some(from);
		self
	}
}

/// Hash of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub B256);

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Result of a simulate-then-send submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
	pub hash: TransactionHash,
	/// Return data of the successful simulation.
	pub simulated_output: Bytes,
}
