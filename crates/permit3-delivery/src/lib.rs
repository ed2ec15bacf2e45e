//! Submission of signed Permit3 intents.
//!
//! This crate turns signed transfers, registered roots and root-gated
//! transfers into contract calls and relays them through a [`ChainClient`].
//! Every call is simulated first; a failed simulation is reported and the
//! transaction is never sent. Caller errors (length or kind mismatches,
//! non-member digests, unknown chain) are raised before the client is touched.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use permit3_signing::SigningError;
use permit3_types::{ContractCall, TransactionHash, TypedData};
use thiserror::Error;

pub mod abi;
pub mod account;
pub mod submission;

pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub use account::ClientAccount;
pub use implementations::evm::alloy::AlloyChainClient;
pub use submission::{SubmissionService, SuperSignatureProof};

/// Errors that can occur while submitting to a Permit3 deployment.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Batch submissions pair signed details and requested transfers by position.
	#[error("Length mismatch: {signed} signed transfer details, {requested} requested transfers")]
	LengthMismatch { signed: usize, requested: usize },
	/// A requested transfer does not fit the kind of the signed details.
	#[error("Kind mismatch: {0}")]
	KindMismatch(String),
	/// The transfer digest is not part of the super-signature digest list.
	#[error("Digest {0} is not a member of the signed digest list")]
	NotAMember(B256),
	#[error("Chain client has no chain id")]
	MissingChainId,
	/// The simulated call reverted. The transaction was not sent.
	#[error("Simulation failed: {0}")]
	Simulation(String),
	#[error("Network error: {0}")]
	Network(String),
	#[error("Signing error: {0}")]
	Signing(#[from] SigningError),
}

/// The chain access this library needs, supplied by the caller.
///
/// Implementations are expected to surface contract reverts from
/// [`simulate_call`](Self::simulate_call) as [`DeliveryError::Simulation`]
/// and transport failures as [`DeliveryError::Network`], without retrying.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Chain the client is connected to, if known.
	fn chain_id(&self) -> Option<u64>;

	/// Executes `call` without committing it and returns its output.
	async fn simulate_call(&self, call: &ContractCall) -> Result<Bytes, DeliveryError>;

	/// Signs and broadcasts `call` from the client's account.
	async fn send_transaction(&self, call: &ContractCall) -> Result<TransactionHash, DeliveryError>;

	/// Read-only call against current state.
	async fn read_state(&self, call: &ContractCall) -> Result<Bytes, DeliveryError>;

	/// Asks the wallet behind `signer` to sign an `eth_signTypedData_v4` payload.
	async fn sign_typed_data(
		&self,
		signer: Address,
		typed_data: &TypedData,
	) -> Result<Bytes, DeliveryError>;
}
