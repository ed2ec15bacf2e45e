//! Account whose key lives behind a chain client (a node or wallet).

use crate::ChainClient;
use alloy_primitives::{Address, Signature, B256};
use async_trait::async_trait;
use permit3_account::{AccountError, AccountInterface};
use permit3_signing::recover_signer;
use permit3_types::{ConfigSchema, Field, FieldType, Schema, TypedData, ValidationError};
use std::sync::Arc;

/// Signs typed data by forwarding the payload to the client's wallet.
///
/// The wallet sees the full `eth_signTypedData_v4` document, so whatever it
/// signs is checked against the locally computed digest before it is
/// accepted.
pub struct ClientAccount {
	client: Arc<dyn ChainClient>,
	address: Address,
}

impl ClientAccount {
	pub fn new(client: Arc<dyn ChainClient>, address: Address) -> Self {
		Self { client, address }
	}
}

/// Schema of a client-backed account table: just the wallet address.
pub struct ClientAccountSchema;

impl ConfigSchema for ClientAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![Field::new("address", FieldType::Address)], vec![]).validate(config)
	}
}

#[async_trait]
impl AccountInterface for ClientAccount {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(ClientAccountSchema)
	}

	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.address)
	}

	async fn sign_hash(&self, _hash: &B256) -> Result<Signature, AccountError> {
		Err(AccountError::Implementation(
			"Client-backed accounts only sign typed data".to_string(),
		))
	}

	async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature, AccountError> {
		let bytes = self
			.client
			.sign_typed_data(self.address, typed_data)
			.await
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;

		let recovered = recover_signer(&typed_data.digest, &bytes)
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		if recovered != self.address {
			tracing::warn!(
				expected = %self.address,
				%recovered,
				"Wallet signature recovered to a different address"
			);
			return Err(AccountError::SigningFailed(format!(
				"Wallet signed as {} instead of {}",
				recovered, self.address
			)));
		}

		Signature::try_from(bytes.as_ref()).map_err(|e| AccountError::SigningFailed(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{DeliveryError, MockChainClient};
	use alloy_primitives::{address, Bytes};
	use permit3_account::implementations::local::LocalAccount;
	use permit3_types::SecretString;

	const ALICE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const BOB_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
	const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

	fn typed_data() -> TypedData {
		TypedData {
			digest: B256::repeat_byte(0x11),
			payload: serde_json::json!({ "primaryType": "Transfer" }),
		}
	}

	async fn signature_from(key: &str, digest: &B256) -> Bytes {
		let account = LocalAccount::new(&SecretString::from(key)).unwrap();
		let signature = account.sign_hash(digest).await.unwrap();
		Bytes::copy_from_slice(&signature.as_bytes())
	}

	#[tokio::test]
	async fn test_accepts_matching_wallet_signature() {
		let typed = typed_data();
		let signature = signature_from(ALICE_KEY, &typed.digest).await;

		let mut client = MockChainClient::new();
		client
			.expect_sign_typed_data()
			.withf(|signer, typed| *signer == ALICE && typed.payload["primaryType"] == "Transfer")
			.times(1)
			.returning(move |_, _| Ok(signature.clone()));

		let account = ClientAccount::new(Arc::new(client), ALICE);
		let signed = account.sign_typed_data(&typed).await.unwrap();

		assert_eq!(
			signed.recover_address_from_prehash(&typed.digest).unwrap(),
			ALICE
		);
	}

	#[tokio::test]
	async fn test_rejects_signature_from_other_key() {
		let typed = typed_data();
		let signature = signature_from(BOB_KEY, &typed.digest).await;

		let mut client = MockChainClient::new();
		client
			.expect_sign_typed_data()
			.returning(move |_, _| Ok(signature.clone()));

		let account = ClientAccount::new(Arc::new(client), ALICE);

		assert!(matches!(
			account.sign_typed_data(&typed).await,
			Err(AccountError::SigningFailed(_))
		));
	}

	#[tokio::test]
	async fn test_wallet_refusal_is_signing_failure() {
		let mut client = MockChainClient::new();
		client
			.expect_sign_typed_data()
			.returning(|_, _| Err(DeliveryError::Network("user rejected".to_string())));

		let account = ClientAccount::new(Arc::new(client), ALICE);

		assert!(matches!(
			account.sign_typed_data(&typed_data()).await,
			Err(AccountError::SigningFailed(_))
		));
	}

	#[tokio::test]
	async fn test_raw_hash_signing_unsupported() {
		let account = ClientAccount::new(Arc::new(MockChainClient::new()), ALICE);

		assert!(matches!(
			account.sign_hash(&B256::ZERO).await,
			Err(AccountError::Implementation(_))
		));
	}
}
