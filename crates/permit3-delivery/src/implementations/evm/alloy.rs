//! Chain client backed by an alloy HTTP provider.

use crate::{ChainClient, DeliveryError};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, Bytes};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use permit3_types::{ContractCall, NetworkConfig, SecretString, TransactionHash, TypedData};

/// [`ChainClient`] for one EVM chain.
///
/// Without a transaction signer the client can still simulate, read and ask
/// the node to sign typed data, but sending fails at the node.
pub struct AlloyChainClient {
	provider: DynProvider,
	chain_id: u64,
}

impl AlloyChainClient {
	/// Connects to `network.rpc_url`. When `private_key` is given, transactions
	/// are signed locally with it.
	pub fn new(
		chain_id: u64,
		network: &NetworkConfig,
		private_key: Option<&SecretString>,
	) -> Result<Self, DeliveryError> {
		let url = network.rpc_url.parse().map_err(|e| {
			DeliveryError::Network(format!("Invalid RPC URL for network {}: {}", chain_id, e))
		})?;

		let provider = match private_key {
			Some(key) => {
				let signer = key
					.with_exposed(|k| k.parse::<PrivateKeySigner>())
					.map_err(|e| DeliveryError::Network(format!("Invalid private key: {}", e)))?
					.with_chain_id(Some(chain_id));
				ProviderBuilder::new()
					.wallet(EthereumWallet::from(signer))
					.connect_http(url)
					.erased()
			},
			None => ProviderBuilder::new().connect_http(url).erased(),
		};

		Ok(Self { provider, chain_id })
	}

	fn request(call: &ContractCall) -> TransactionRequest {
		let request = TransactionRequest::default()
			.to(call.to)
			.input(call.data.clone().into())
			.value(call.value);
		match call.from {
			Some(from) => request.from(from),
			None => request,
		}
	}
}

#[async_trait]
impl ChainClient for AlloyChainClient {
	fn chain_id(&self) -> Option<u64> {
		Some(self.chain_id)
	}

	async fn simulate_call(&self, call: &ContractCall) -> Result<Bytes, DeliveryError> {
		self.provider
			.call(Self::request(call))
			.await
			.map_err(|e| match e.as_error_resp() {
				Some(payload) => DeliveryError::Simulation(payload.to_string()),
				None => DeliveryError::Network(e.to_string()),
			})
	}

	async fn send_transaction(&self, call: &ContractCall) -> Result<TransactionHash, DeliveryError> {
		let pending = self
			.provider
			.send_transaction(Self::request(call))
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to send transaction: {}", e)))?;

		let tx_hash = *pending.tx_hash();
		tracing::info!(tx_hash = %tx_hash, chain_id = self.chain_id, to = %call.to, "Submitted transaction");

		Ok(TransactionHash(tx_hash))
	}

	async fn read_state(&self, call: &ContractCall) -> Result<Bytes, DeliveryError> {
		self.provider
			.call(Self::request(call))
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))
	}

	async fn sign_typed_data(
		&self,
		signer: Address,
		typed_data: &TypedData,
	) -> Result<Bytes, DeliveryError> {
		self.provider
			.raw_request::<_, Bytes>(
				"eth_signTypedData_v4".into(),
				(signer, typed_data.payload.clone()),
			)
			.await
			.map_err(|e| DeliveryError::Network(format!("eth_signTypedData_v4 failed: {}", e)))
	}
}
