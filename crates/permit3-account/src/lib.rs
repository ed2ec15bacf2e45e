//! Accounts that produce EIP-712 signatures.
//!
//! An account knows its address and can sign a [`TypedData`] message. The
//! only built-in implementation holds a local private key; wallet-backed
//! accounts (which sign through a chain client) live next to the client in
//! `permit3-delivery`.

use alloy_primitives::{Address, Signature, B256};
use async_trait::async_trait;
use permit3_types::{ConfigSchema, ImplementationRegistry, SecretString, TypedData};
use std::sync::Arc;
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// Interface every account implementation provides.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Schema of this implementation's `[account.implementations.<name>]` table.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Address whose signatures this account produces.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Signs a raw 32-byte digest without any prefix.
	async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError>;

	/// Signs an EIP-712 message.
	///
	/// The returned signature must recover to [`address`](Self::address)
	/// over `typed_data.digest`.
	async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature, AccountError>;

	/// The private key, for building transaction-signing wallets.
	///
	/// Returns `None` for accounts that never expose key material.
	fn private_key(&self) -> Option<SecretString> {
		None
	}
}

/// Factory that builds an account from its TOML settings.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>;

/// Registry trait for account implementations.
pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// All built-in account implementations as `(name, factory)` pairs.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// High-level wrapper around the configured account implementation.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Builds the account named `primary` from its settings.
	///
	/// # Errors
	///
	/// Returns [`AccountError::Implementation`] for an unknown name and
	/// whatever the implementation's factory reports for bad settings.
	pub fn from_config(primary: &str, config: &toml::Value) -> Result<Self, AccountError> {
		let factory = get_all_implementations()
			.into_iter()
			.find(|(name, _)| *name == primary)
			.map(|(_, factory)| factory)
			.ok_or_else(|| {
				AccountError::Implementation(format!("Unknown account implementation '{}'", primary))
			})?;

		let implementation = factory(config)?;
		tracing::debug!(implementation = %primary, "Account initialized");
		Ok(Self::new(implementation))
	}

	pub async fn get_address(&self) -> Result<Address, AccountError> {
		self.implementation.address().await
	}

	pub async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature, AccountError> {
		self.implementation.sign_typed_data(typed_data).await
	}

	pub async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError> {
		self.implementation.sign_hash(hash).await
	}

	pub fn private_key(&self) -> Option<SecretString> {
		self.implementation.private_key()
	}

	/// The underlying implementation, for callers that take a trait object.
	pub fn implementation(&self) -> &dyn AccountInterface {
		self.implementation.as_ref()
	}

	/// Hands the implementation over to components that share it.
	pub fn into_shared(self) -> Arc<dyn AccountInterface> {
		Arc::from(self.implementation)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn local_config() -> toml::Value {
		toml::from_str(&format!("private_key = \"{}\"", ANVIL_KEY)).unwrap()
	}

	#[tokio::test]
	async fn test_from_config_builds_local() {
		let service = AccountService::from_config("local", &local_config()).unwrap();

		assert_eq!(
			service.get_address().await.unwrap(),
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
				.parse::<Address>()
				.unwrap()
		);
		assert!(service.private_key().is_some());
	}

	#[test]
	fn test_unknown_implementation() {
		let result = AccountService::from_config("kms", &local_config());

		assert!(matches!(result, Err(AccountError::Implementation(_))));
	}

	#[tokio::test]
	async fn test_typed_data_signature_recovers() {
		let service = AccountService::from_config("local", &local_config()).unwrap();
		let typed_data = TypedData {
			digest: B256::repeat_byte(0x42),
			payload: serde_json::json!({}),
		};

		let signature = service.sign_typed_data(&typed_data).await.unwrap();
		let recovered = signature
			.recover_address_from_prehash(&typed_data.digest)
			.unwrap();

		assert_eq!(recovered, service.get_address().await.unwrap());
	}
}
