//! Account backed by a private key held in process memory.

use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry};
use alloy_primitives::{Address, Signature, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use permit3_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, TypedData,
	ValidationError,
};

/// Local account holding a [`PrivateKeySigner`].
#[derive(Debug)]
pub struct LocalAccount {
	signer: PrivateKeySigner,
}

impl LocalAccount {
	/// Parses a hex private key, with or without `0x`.
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		let signer = private_key
			.with_exposed(|key| key.parse::<PrivateKeySigner>())
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;
		Ok(Self { signer })
	}
}

/// Schema of `[account.implementations.local]`.
pub struct LocalAccountSchema;

impl ConfigSchema for LocalAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![Field::new("private_key", FieldType::Bytes32)], vec![]).validate(config)
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalAccountSchema)
	}

	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError> {
		self.signer
			.sign_hash(hash)
			.await
			.map_err(|e| AccountError::SigningFailed(e.to_string()))
	}

	async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature, AccountError> {
		self.sign_hash(&typed_data.digest).await
	}

	fn private_key(&self) -> Option<SecretString> {
		let bytes = self.signer.to_bytes();
		Some(SecretString::new(alloy_primitives::hex::encode_prefixed(
			bytes.as_slice(),
		)))
	}
}

/// Builds a [`LocalAccount`] from `private_key = "0x..."`.
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	LocalAccountSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidKey(format!("Invalid configuration: {}", e)))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| AccountError::InvalidKey("private_key must be a string".to_string()))?;

	Ok(Box::new(LocalAccount::new(&private_key)?))
}

/// Registry for the local account implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}
