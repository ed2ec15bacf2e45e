//! EIP-712 encoding, signing and super-signature aggregation for Permit3.
//!
//! The crate is layered the way a transfer flows through it:
//!
//! 1. [`schema`] fixes the typed-data type tree for each transfer variant.
//! 2. [`encoder`] hashes transfer intents into domain-scoped digests and
//!    builds the matching `eth_signTypedData_v4` payloads.
//! 3. [`native`] does the same for transfers signed directly against an
//!    ILRTA asset with an application-defined detail shape.
//! 4. [`signer`] signs digests through an account and recovers signers.
//! 5. [`aggregator`] folds many digests into one `Verify` authorization and
//!    derives the root the contract stores.
//!
//! Everything except the signing calls themselves is pure.

use permit3_account::AccountError;
use permit3_types::DomainError;
use thiserror::Error;

pub mod aggregator;
pub mod encoder;
pub mod native;
pub mod schema;
pub mod signer;
pub mod value;

pub use aggregator::{build_verify, calculate_root, verify_digest, verify_typed_data};
pub use encoder::{
	batch_digest, batch_typed_data, super_batch_digest, super_transfer_digest, transfer_digest,
	transfer_typed_data,
};
pub use native::{AssetRequestedTransfer, AssetSignatureTransfer, SignedAssetTransfer};
pub use schema::{FieldDef, FieldKind, TransferSchema, TransferShape, TransferVariant};
pub use signer::{recover_signer, sign_typed_data, Permit3Signer};
pub use value::{Eip712Value, ShapeValues};

/// Errors raised while encoding or signing.
#[derive(Debug, Error)]
pub enum SigningError {
	/// A detail shape or its values do not line up.
	#[error("Malformed shape: {0}")]
	MalformedShape(String),
	/// A batch mixes plain and generic transfer details.
	#[error("Batch mixes plain and generic transfer details")]
	MixedBatch,
	#[error("Batch contains no transfer details")]
	EmptyBatch,
	#[error("Missing chain id: {0}")]
	MissingChainId(String),
	/// A value does not fit the declared field type.
	#[error("Encoding error: {0}")]
	Encoding(String),
	/// Signature bytes are malformed or recover to the wrong signer.
	#[error("Invalid signature: {0}")]
	InvalidSignature(String),
	#[error("Account error: {0}")]
	Account(#[from] AccountError),
}

impl From<DomainError> for SigningError {
	fn from(err: DomainError) -> Self {
		match err {
			DomainError::MissingChainId(name) => SigningError::MissingChainId(name),
		}
	}
}
