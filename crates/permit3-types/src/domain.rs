//! EIP-712 signing domains.
//!
//! Every digest in this library is bound to exactly one [`SigningDomain`].
//! Which domain applies is decided here and nowhere else:
//!
//! - Permit3 transfers are bound to `("Permit3", "1", chainId, permit3)`.
//! - `Verify` envelopes use the deployment's super-signature domain name with
//!   the Permit3 contract as verifying contract.
//! - Transfers signed directly against an ILRTA asset use the asset's own
//!   name and address.

use crate::{asset::GenericAsset, utils::compute_domain_hash};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Version string of every domain this library signs under.
pub const DOMAIN_VERSION: &str = "1";

/// Domain name of the Permit3 contract.
pub const PERMIT3_DOMAIN_NAME: &str = "Permit3";

/// Errors raised while constructing a signing domain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
	/// A domain without a chain id would make signatures replayable across chains.
	#[error("Missing chain id for domain '{0}'")]
	MissingChainId(String),
}

/// A Permit3 contract deployment on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit3Deployment {
	pub address: Address,
	/// Domain name the deployment verifies `Verify` signatures under.
	#[serde(default = "default_super_signature_domain")]
	pub super_signature_domain: String,
}

pub(crate) fn default_super_signature_domain() -> String {
	PERMIT3_DOMAIN_NAME.to_string()
}

impl Permit3Deployment {
	pub fn new(address: Address) -> Self {
		Self {
			address,
			super_signature_domain: default_super_signature_domain(),
		}
	}

	pub fn with_super_signature_domain(mut self, name: impl Into<String>) -> Self {
		self.super_signature_domain = name.into();
		self
	}
}

/// The `EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningDomain {
	pub name: String,
	pub version: String,
	pub chain_id: u64,
	pub verifying_contract: Address,
}

impl SigningDomain {
	/// Builds a domain, failing when the chain id is unknown.
	///
	/// # Errors
	///
	/// Returns [`DomainError::MissingChainId`] when `chain_id` is `None`.
	pub fn new(
		name: impl Into<String>,
		chain_id: Option<u64>,
		verifying_contract: Address,
	) -> Result<Self, DomainError> {
		let name = name.into();
		let chain_id = chain_id.ok_or_else(|| DomainError::MissingChainId(name.clone()))?;
		Ok(Self {
			name,
			version: DOMAIN_VERSION.to_string(),
			chain_id,
			verifying_contract,
		})
	}

	/// Domain of Permit3 transfer signatures.
	pub fn permit3(chain_id: u64, deployment: &Permit3Deployment) -> Self {
		Self {
			name: PERMIT3_DOMAIN_NAME.to_string(),
			version: DOMAIN_VERSION.to_string(),
			chain_id,
			verifying_contract: deployment.address,
		}
	}

	/// Domain of `Verify` envelopes.
	pub fn super_signature(chain_id: u64, deployment: &Permit3Deployment) -> Self {
		Self {
			name: deployment.super_signature_domain.clone(),
			version: DOMAIN_VERSION.to_string(),
			chain_id,
			verifying_contract: deployment.address,
		}
	}

	/// Domain of signatures verified by an ILRTA asset contract itself.
	pub fn for_asset(chain_id: u64, asset: &GenericAsset) -> Self {
		Self {
			name: asset.name().to_string(),
			version: DOMAIN_VERSION.to_string(),
			chain_id,
			verifying_contract: asset.address(),
		}
	}

	pub fn separator(&self) -> B256 {
		compute_domain_hash(
			&self.name,
			&self.version,
			self.chain_id,
			&self.verifying_contract,
		)
	}

	/// The domain as it appears in an `eth_signTypedData_v4` payload.
	pub fn to_json(&self) -> serde_json::Value {
		json!({
			"name": self.name,
			"version": self.version,
			"chainId": self.chain_id,
			"verifyingContract": self.verifying_contract.to_checksum(None),
		})
	}
}
