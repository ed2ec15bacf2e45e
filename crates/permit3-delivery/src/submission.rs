//! Encoding of signed intents into Permit3 and ILRTA contract calls.

use crate::{
	abi::{ilrta, plain, super_signature, tagged},
	ChainClient, DeliveryError,
};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use permit3_signing::{
	encoder::{batch_kind, super_batch_digest, super_transfer_digest},
	native::{asset_super_transfer_digest, encode_asset_details},
	AssetRequestedTransfer, ShapeValues, SignedAssetTransfer, TransferShape,
};
use permit3_types::{
	encode_amount, AssetKind, ContractCall, GenericAsset, Permit3Deployment, PlainAsset,
	RequestedDetails, RequestedTransfer, SignedTransfer, SignedTransferBatch, SignedVerify,
	SigningDomain, Submission, TokenType, TransferDetails,
};
use std::sync::Arc;

/// Authorization for a root-gated transfer: the digest list the signer
/// registered and the spender the member digests were computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperSignatureProof {
	pub signer: Address,
	pub spender: Address,
	/// Must be the exact list the root was registered with.
	pub data_hash: Vec<B256>,
}

impl SuperSignatureProof {
	fn ensure_member(&self, digest: B256) -> Result<(), DeliveryError> {
		if self.data_hash.contains(&digest) {
			Ok(())
		} else {
			Err(DeliveryError::NotAMember(digest))
		}
	}
}

fn plain_pair(
	token: &PlainAsset,
	amount: U256,
	requested: &RequestedTransfer,
) -> Result<(plain::IPermit3::TransferDetails, plain::IPermit3::RequestedTransfer), DeliveryError> {
	let requested_amount = match &requested.details {
		RequestedDetails::Amount(value) => *value,
		RequestedDetails::Data(_) => {
			return Err(DeliveryError::KindMismatch(format!(
				"Plain transfer of {} needs a requested amount, got data",
				token.address()
			)))
		},
	};

	Ok((
		plain::IPermit3::TransferDetails {
			token: token.address(),
			amount,
		},
		plain::IPermit3::RequestedTransfer {
			to: requested.to,
			amount: requested_amount,
		},
	))
}

fn tagged_pair(
	token: &GenericAsset,
	data: &Bytes,
	requested: &RequestedTransfer,
) -> Result<(tagged::IPermit3::TransferDetails, tagged::IPermit3::RequestedTransfer), DeliveryError>
{
	let requested_data = match (&requested.details, token.token_type()) {
		(RequestedDetails::Data(data), _) => data.clone(),
		(RequestedDetails::Amount(amount), TokenType::Erc20) => encode_amount(*amount),
		(RequestedDetails::Amount(_), TokenType::Ilrta) => {
			return Err(DeliveryError::KindMismatch(format!(
				"ILRTA transfer of {} needs requested data, got an amount",
				token.address()
			)))
		},
	};

	Ok((
		tagged::IPermit3::TransferDetails {
			token: token.address(),
			tokenType: token.token_type().as_u8(),
			functionSelector: token.token_type().function_selector(),
			transferDetails: data.clone(),
		},
		tagged::IPermit3::RequestedTransfer {
			to: requested.to,
			transferDetails: requested_data,
		},
	))
}

fn unexpected_kind(details: &TransferDetails) -> DeliveryError {
	DeliveryError::KindMismatch(format!(
		"Batch of mixed kinds at token {}",
		details.token_address()
	))
}

type PlainPairs = (
	Vec<plain::IPermit3::TransferDetails>,
	Vec<plain::IPermit3::RequestedTransfer>,
);
type TaggedPairs = (
	Vec<tagged::IPermit3::TransferDetails>,
	Vec<tagged::IPermit3::RequestedTransfer>,
);

fn plain_pairs(
	details: &[TransferDetails],
	requested: &[RequestedTransfer],
) -> Result<PlainPairs, DeliveryError> {
	let pairs = details
		.iter()
		.zip(requested)
		.map(|(details, requested)| match details {
			TransferDetails::Plain { token, amount } => plain_pair(token, *amount, requested),
			TransferDetails::Generic { .. } => Err(unexpected_kind(details)),
		})
		.collect::<Result<Vec<_>, _>>()?;
	Ok(pairs.into_iter().unzip())
}

fn tagged_pairs(
	details: &[TransferDetails],
	requested: &[RequestedTransfer],
) -> Result<TaggedPairs, DeliveryError> {
	let pairs = details
		.iter()
		.zip(requested)
		.map(|(details, requested)| match details {
			TransferDetails::Generic { token, data } => tagged_pair(token, data, requested),
			TransferDetails::Plain { .. } => Err(unexpected_kind(details)),
		})
		.collect::<Result<Vec<_>, _>>()?;
	Ok(pairs.into_iter().unzip())
}

fn ensure_same_length(signed: usize, requested: usize) -> Result<(), DeliveryError> {
	if signed != requested {
		return Err(DeliveryError::LengthMismatch { signed, requested });
	}
	Ok(())
}

/// Relays signed intents to one Permit3 deployment through a [`ChainClient`].
///
/// Each submission is simulated, then sent. There is no retry and no local
/// nonce tracking; replay protection is the contract's nonce bitmap.
pub struct SubmissionService {
	client: Arc<dyn ChainClient>,
	deployment: Permit3Deployment,
}

impl SubmissionService {
	pub fn new(client: Arc<dyn ChainClient>, deployment: Permit3Deployment) -> Self {
		Self { client, deployment }
	}

	pub fn deployment(&self) -> &Permit3Deployment {
		&self.deployment
	}

	fn chain_id(&self) -> Result<u64, DeliveryError> {
		self.client.chain_id().ok_or(DeliveryError::MissingChainId)
	}

	async fn execute(
		&self,
		call: ContractCall,
		operation: &'static str,
	) -> Result<Submission, DeliveryError> {
		let simulated_output = match self.client.simulate_call(&call).await {
			Ok(output) => output,
			Err(e) => {
				tracing::warn!(
					operation,
					chain_id = call.chain_id,
					to = %call.to,
					error = %e,
					"Simulation failed, transaction not sent"
				);
				return Err(e);
			},
		};

		let hash = self.client.send_transaction(&call).await?;
		tracing::info!(operation, tx_hash = %hash, chain_id = call.chain_id, "Submitted transaction");

		Ok(Submission {
			hash,
			simulated_output,
		})
	}

	fn permit3_call(&self, chain_id: u64, data: Vec<u8>) -> ContractCall {
		ContractCall::new(chain_id, self.deployment.address, data)
	}

	/// Executes a single signed transfer via `transferBySignature`.
	pub async fn transfer_by_signature(
		&self,
		signed: &SignedTransfer,
		requested: &RequestedTransfer,
	) -> Result<Submission, DeliveryError> {
		let transfer = &signed.transfer;
		let data = match &transfer.transfer_details {
			TransferDetails::Plain { token, amount } => {
				let (details, requested) = plain_pair(token, *amount, requested)?;
				plain::IPermit3::transferBySignature_0Call {
					signer: signed.signer,
					signatureTransfer: plain::IPermit3::SignatureTransfer {
						transferDetails: details,
						nonce: transfer.nonce,
						deadline: transfer.deadline,
					},
					requestedTransfer: requested,
					signature: signed.signature.clone(),
				}
				.abi_encode()
			},
			TransferDetails::Generic { token, data } => {
				let (details, requested) = tagged_pair(token, data, requested)?;
				tagged::IPermit3::transferBySignature_0Call {
					signer: signed.signer,
					signatureTransfer: tagged::IPermit3::SignatureTransfer {
						transferDetails: details,
						nonce: transfer.nonce,
						deadline: transfer.deadline,
					},
					requestedTransfer: requested,
					signature: signed.signature.clone(),
				}
				.abi_encode()
			},
		};

		let chain_id = self.chain_id()?;
		self.execute(self.permit3_call(chain_id, data), "transfer_by_signature")
			.await
	}

	/// Executes a signed batch. `requested[i]` draws against the `i`-th signed
	/// transfer details.
	pub async fn transfer_batch_by_signature(
		&self,
		signed: &SignedTransferBatch,
		requested: &[RequestedTransfer],
	) -> Result<Submission, DeliveryError> {
		let batch = &signed.transfer;
		ensure_same_length(batch.len(), requested.len())?;

		let data = match batch_kind(&batch.transfer_details)? {
			AssetKind::Plain => {
				let (details, requested) = plain_pairs(&batch.transfer_details, requested)?;
				plain::IPermit3::transferBySignature_1Call {
					signer: signed.signer,
					signatureTransfer: plain::IPermit3::SignatureTransferBatch {
						transferDetails: details,
						nonce: batch.nonce,
						deadline: batch.deadline,
					},
					requestedTransfer: requested,
					signature: signed.signature.clone(),
				}
				.abi_encode()
			},
			AssetKind::Generic => {
				let (details, requested) = tagged_pairs(&batch.transfer_details, requested)?;
				tagged::IPermit3::transferBySignature_1Call {
					signer: signed.signer,
					signatureTransfer: tagged::IPermit3::SignatureTransferBatch {
						transferDetails: details,
						nonce: batch.nonce,
						deadline: batch.deadline,
					},
					requestedTransfer: requested,
					signature: signed.signature.clone(),
				}
				.abi_encode()
			},
		};

		let chain_id = self.chain_id()?;
		self.execute(
			self.permit3_call(chain_id, data),
			"transfer_batch_by_signature",
		)
		.await
	}

	/// Registers the root of a signed `Verify` envelope via `verifyAndStoreRoot`.
	pub async fn register_root(&self, signed: &SignedVerify) -> Result<Submission, DeliveryError> {
		let chain_id = self.chain_id()?;
		tracing::debug!(root = %signed.root, signer = %signed.signer, "Registering root");

		let data = super_signature::IPermit3::verifyAndStoreRootCall {
			signer: signed.signer,
			verify: super_signature::IPermit3::Verify {
				dataHash: signed.verify.data_hash.clone(),
				nonce: signed.verify.nonce,
				deadline: signed.verify.deadline,
			},
			signature: signed.signature.clone(),
		}
		.abi_encode();

		self.execute(self.permit3_call(chain_id, data), "register_root")
			.await
	}

	/// Executes one member of a registered root via `transferBySuperSignature`.
	///
	/// The transfer's digest must be in `proof.data_hash`; otherwise nothing
	/// is sent.
	pub async fn transfer_by_super_signature(
		&self,
		details: &TransferDetails,
		requested: &RequestedTransfer,
		proof: &SuperSignatureProof,
	) -> Result<Submission, DeliveryError> {
		let chain_id = self.chain_id()?;
		let domain = SigningDomain::permit3(chain_id, &self.deployment);
		proof.ensure_member(super_transfer_digest(&domain, details, &proof.spender))?;

		let data = match details {
			TransferDetails::Plain { token, amount } => {
				let (details, requested) = plain_pair(token, *amount, requested)?;
				plain::IPermit3::transferBySuperSignature_0Call {
					signer: proof.signer,
					transferDetails: details,
					requestedTransfer: requested,
					dataHash: proof.data_hash.clone(),
				}
				.abi_encode()
			},
			TransferDetails::Generic { token, data } => {
				let (details, requested) = tagged_pair(token, data, requested)?;
				tagged::IPermit3::transferBySuperSignature_0Call {
					signer: proof.signer,
					transferDetails: details,
					requestedTransfer: requested,
					dataHash: proof.data_hash.clone(),
				}
				.abi_encode()
			},
		};

		self.execute(
			self.permit3_call(chain_id, data),
			"transfer_by_super_signature",
		)
		.await
	}

	/// Batch form of [`transfer_by_super_signature`](Self::transfer_by_super_signature).
	pub async fn transfer_batch_by_super_signature(
		&self,
		details: &[TransferDetails],
		requested: &[RequestedTransfer],
		proof: &SuperSignatureProof,
	) -> Result<Submission, DeliveryError> {
		ensure_same_length(details.len(), requested.len())?;
		let chain_id = self.chain_id()?;
		let domain = SigningDomain::permit3(chain_id, &self.deployment);
		proof.ensure_member(super_batch_digest(&domain, details, &proof.spender)?)?;

		let data = match batch_kind(details)? {
			AssetKind::Plain => {
				let (details, requested) = plain_pairs(details, requested)?;
				plain::IPermit3::transferBySuperSignature_1Call {
					signer: proof.signer,
					transferDetails: details,
					requestedTransfer: requested,
					dataHash: proof.data_hash.clone(),
				}
				.abi_encode()
			},
			AssetKind::Generic => {
				let (details, requested) = tagged_pairs(details, requested)?;
				tagged::IPermit3::transferBySuperSignature_1Call {
					signer: proof.signer,
					transferDetails: details,
					requestedTransfer: requested,
					dataHash: proof.data_hash.clone(),
				}
				.abi_encode()
			},
		};

		self.execute(
			self.permit3_call(chain_id, data),
			"transfer_batch_by_super_signature",
		)
		.await
	}

	/// Executes a transfer signed against an ILRTA asset's own domain, on the
	/// asset contract.
	pub async fn asset_transfer_by_signature(
		&self,
		signed: &SignedAssetTransfer,
		requested: &AssetRequestedTransfer,
	) -> Result<Submission, DeliveryError> {
		let transfer = &signed.transfer;
		let data = ilrta::IILRTA::transferBySignatureCall {
			signer: signed.signer,
			signatureTransfer: ilrta::IILRTA::SignatureTransfer {
				transferDetails: encode_asset_details(&signed.shape, &transfer.details)?,
				nonce: transfer.nonce,
				deadline: transfer.deadline,
			},
			requestedTransfer: ilrta::IILRTA::RequestedTransfer {
				to: requested.to,
				transferDetails: encode_asset_details(&signed.shape, &requested.details)?,
			},
			signature: signed.signature.clone(),
		}
		.abi_encode();

		let chain_id = self.chain_id()?;
		self.execute(
			ContractCall::new(chain_id, transfer.asset.address(), data),
			"asset_transfer_by_signature",
		)
		.await
	}

	/// Executes a root-gated transfer on an ILRTA asset contract.
	pub async fn asset_transfer_by_super_signature(
		&self,
		asset: &GenericAsset,
		shape: &TransferShape,
		details: &ShapeValues,
		requested: &AssetRequestedTransfer,
		proof: &SuperSignatureProof,
	) -> Result<Submission, DeliveryError> {
		let chain_id = self.chain_id()?;
		let domain = SigningDomain::for_asset(chain_id, asset);
		proof.ensure_member(asset_super_transfer_digest(
			&domain,
			shape,
			details,
			&proof.spender,
		)?)?;

		let data = ilrta::IILRTA::transferBySuperSignatureCall {
			signer: proof.signer,
			transferDetails: encode_asset_details(shape, details)?,
			requestedTransfer: ilrta::IILRTA::RequestedTransfer {
				to: requested.to,
				transferDetails: encode_asset_details(shape, &requested.details)?,
			},
			dataHash: proof.data_hash.clone(),
		}
		.abi_encode();

		self.execute(
			ContractCall::new(chain_id, asset.address(), data),
			"asset_transfer_by_super_signature",
		)
		.await
	}

	/// Whether `nonce` has been consumed for `owner`, read from the
	/// contract's nonce bitmap. Nothing is cached.
	pub async fn is_nonce_used(&self, owner: Address, nonce: U256) -> Result<bool, DeliveryError> {
		let chain_id = self.chain_id()?;
		let data = super_signature::IPermit3::nonceBitmapCall {
			owner,
			word: nonce >> 8,
		}
		.abi_encode();

		let output = self
			.client
			.read_state(&self.permit3_call(chain_id, data))
			.await?;
		if output.len() < 32 {
			return Err(DeliveryError::Network(format!(
				"nonceBitmap returned {} bytes",
				output.len()
			)));
		}

		let bitmap = U256::from_be_slice(&output[..32]);
		Ok(bitmap.bit(usize::from(nonce.byte(0))))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::MockChainClient;
	use alloy_primitives::address;
	use permit3_signing::{
		build_verify, calculate_root, native::AssetSignatureTransfer, Eip712Value, SigningError,
	};
	use permit3_types::{SignatureTransfer, SignatureTransferBatch, TransactionHash};

	const CHAIN_ID: u64 = 31337;
	const PERMIT3: Address = address!("Cf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9");
	const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
	const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
	const ILRTA_TOKEN: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");

	fn mock_erc20() -> PlainAsset {
		PlainAsset::new(
			CHAIN_ID,
			address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
			"Mock ERC20",
			"MOCK",
			18,
		)
	}

	fn mock_ilrta() -> GenericAsset {
		GenericAsset::ilrta(CHAIN_ID, ILRTA_TOKEN, "Test FT", "TEST")
	}

	fn wrapped_erc20() -> GenericAsset {
		GenericAsset::new(
			CHAIN_ID,
			address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
			"Mock ERC20",
			"MOCK",
			B256::ZERO,
			TokenType::Erc20,
		)
	}

	fn tx_hash() -> TransactionHash {
		TransactionHash(B256::repeat_byte(0xaa))
	}

	fn service(client: MockChainClient) -> SubmissionService {
		SubmissionService::new(Arc::new(client), Permit3Deployment::new(PERMIT3))
	}

	fn deployment_domain() -> SigningDomain {
		SigningDomain::permit3(CHAIN_ID, &Permit3Deployment::new(PERMIT3))
	}

	/// A client that expects exactly one simulate and one send of a call
	/// satisfying `check`.
	fn accepting_client(check: fn(&ContractCall) -> bool) -> MockChainClient {
		let mut client = MockChainClient::new();
		client.expect_chain_id().return_const(Some(CHAIN_ID));
		client
			.expect_simulate_call()
			.withf(move |call| check(call))
			.times(1)
			.returning(|_| Ok(Bytes::new()));
		client
			.expect_send_transaction()
			.withf(move |call| check(call))
			.times(1)
			.returning(|_| Ok(tx_hash()));
		client
	}

	fn chain_only_client() -> MockChainClient {
		let mut client = MockChainClient::new();
		client.expect_chain_id().return_const(Some(CHAIN_ID));
		client.expect_simulate_call().never();
		client.expect_send_transaction().never();
		client
	}

	fn signed(details: TransferDetails) -> SignedTransfer {
		SignedTransfer {
			transfer: SignatureTransfer {
				transfer_details: details,
				spender: BOB,
				nonce: U256::from(7),
				deadline: U256::from(1_900_000_000u64),
			},
			signer: ALICE,
			digest: B256::ZERO,
			signature: Bytes::from(vec![0x1b; 65]),
		}
	}

	fn signed_batch(details: Vec<TransferDetails>) -> SignedTransferBatch {
		SignedTransferBatch {
			transfer: SignatureTransferBatch {
				transfer_details: details,
				spender: BOB,
				nonce: U256::from(8),
				deadline: U256::from(1_900_000_000u64),
			},
			signer: ALICE,
			digest: B256::ZERO,
			signature: Bytes::from(vec![0x1c; 65]),
		}
	}

	fn amount_values(value: u64) -> ShapeValues {
		ShapeValues::from([("amount".to_string(), Eip712Value::Uint(U256::from(value)))])
	}

	#[tokio::test]
	async fn test_plain_transfer_is_simulated_then_sent() {
		let client = accepting_client(|call| {
			let Ok(decoded) = plain::IPermit3::transferBySignature_0Call::abi_decode(&call.data)
			else {
				return false;
			};
			call.to == PERMIT3
				&& call.chain_id == CHAIN_ID
				&& decoded.signer == ALICE
				&& decoded.signatureTransfer.nonce == U256::from(7)
				&& decoded.signatureTransfer.transferDetails.amount == U256::from(10)
				&& decoded.requestedTransfer.to == BOB
				&& decoded.requestedTransfer.amount == U256::from(4)
		});

		let submission = service(client)
			.transfer_by_signature(
				&signed(TransferDetails::plain(mock_erc20(), U256::from(10))),
				&RequestedTransfer::amount(BOB, U256::from(4)),
			)
			.await
			.unwrap();

		assert_eq!(submission.hash, tx_hash());
	}

	#[tokio::test]
	async fn test_failed_simulation_is_never_sent() {
		let mut client = MockChainClient::new();
		client.expect_chain_id().return_const(Some(CHAIN_ID));
		client.expect_simulate_call().times(1).returning(|_| {
			Err(DeliveryError::Simulation(
				"execution reverted: InvalidSignature()".to_string(),
			))
		});
		client.expect_send_transaction().never();

		let result = service(client)
			.transfer_by_signature(
				&signed(TransferDetails::plain(mock_erc20(), U256::from(10))),
				&RequestedTransfer::amount(BOB, U256::from(4)),
			)
			.await;

		match result {
			Err(DeliveryError::Simulation(reason)) => assert!(reason.contains("InvalidSignature")),
			other => panic!("expected simulation error, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_batch_length_mismatch_touches_nothing() {
		let batch = signed_batch(vec![
			TransferDetails::plain(mock_erc20(), U256::from(1)),
			TransferDetails::plain(mock_erc20(), U256::from(2)),
		]);

		let result = service(MockChainClient::new())
			.transfer_batch_by_signature(&batch, &[RequestedTransfer::amount(BOB, U256::from(1))])
			.await;

		assert!(matches!(
			result,
			Err(DeliveryError::LengthMismatch {
				signed: 2,
				requested: 1
			})
		));
	}

	#[tokio::test]
	async fn test_plain_transfer_rejects_requested_data() {
		let result = service(MockChainClient::new())
			.transfer_by_signature(
				&signed(TransferDetails::plain(mock_erc20(), U256::from(10))),
				&RequestedTransfer::data(BOB, vec![1u8, 2, 3]),
			)
			.await;

		assert!(matches!(result, Err(DeliveryError::KindMismatch(_))));
	}

	#[tokio::test]
	async fn test_tagged_erc20_amount_is_abi_encoded() {
		let client = accepting_client(|call| {
			let Ok(decoded) = tagged::IPermit3::transferBySignature_0Call::abi_decode(&call.data)
			else {
				return false;
			};
			let details = &decoded.signatureTransfer.transferDetails;
			details.tokenType == 0
				&& details.functionSelector == 0x23b8_72dd
				&& decoded.requestedTransfer.transferDetails == encode_amount(U256::from(3))
		});

		service(client)
			.transfer_by_signature(
				&signed(TransferDetails::generic_amount(wrapped_erc20(), U256::from(9))),
				&RequestedTransfer::amount(BOB, U256::from(3)),
			)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_ilrta_transfer_rejects_requested_amount() {
		let result = service(MockChainClient::new())
			.transfer_by_signature(
				&signed(TransferDetails::generic(mock_ilrta(), vec![0xabu8; 32])),
				&RequestedTransfer::amount(BOB, U256::from(3)),
			)
			.await;

		assert!(matches!(result, Err(DeliveryError::KindMismatch(_))));
	}

	#[tokio::test]
	async fn test_tagged_batch_keeps_positions() {
		let client = accepting_client(|call| {
			let Ok(decoded) = tagged::IPermit3::transferBySignature_1Call::abi_decode(&call.data)
			else {
				return false;
			};
			let details = &decoded.signatureTransfer.transferDetails;
			let requested = &decoded.requestedTransfer;
			details.len() == 2
				&& details[0].tokenType == 1
				&& details[1].tokenType == 0
				&& requested[0].transferDetails.to_vec() == vec![0x01u8, 0x02]
				&& requested[1].transferDetails == encode_amount(U256::from(6))
		});

		let batch = signed_batch(vec![
			TransferDetails::generic(mock_ilrta(), vec![0x01u8, 0x02, 0x03]),
			TransferDetails::generic_amount(wrapped_erc20(), U256::from(6)),
		]);

		service(client)
			.transfer_batch_by_signature(
				&batch,
				&[
					RequestedTransfer::data(BOB, vec![0x01u8, 0x02]),
					RequestedTransfer::amount(BOB, U256::from(6)),
				],
			)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_mixed_batch_rejected() {
		let batch = signed_batch(vec![
			TransferDetails::plain(mock_erc20(), U256::from(1)),
			TransferDetails::generic(mock_ilrta(), vec![0x01u8]),
		]);

		let result = service(MockChainClient::new())
			.transfer_batch_by_signature(
				&batch,
				&[
					RequestedTransfer::amount(BOB, U256::from(1)),
					RequestedTransfer::data(BOB, vec![0x01u8]),
				],
			)
			.await;

		assert!(matches!(
			result,
			Err(DeliveryError::Signing(SigningError::MixedBatch))
		));
	}

	#[tokio::test]
	async fn test_missing_chain_id_fails_before_simulation() {
		let mut client = MockChainClient::new();
		client.expect_chain_id().return_const(None::<u64>);
		client.expect_simulate_call().never();

		let result = service(client)
			.transfer_by_signature(
				&signed(TransferDetails::plain(mock_erc20(), U256::from(10))),
				&RequestedTransfer::amount(BOB, U256::from(4)),
			)
			.await;

		assert!(matches!(result, Err(DeliveryError::MissingChainId)));
	}

	#[tokio::test]
	async fn test_register_root_encodes_verify() {
		let digests = vec![B256::repeat_byte(1), B256::repeat_byte(2)];
		let verify = build_verify(digests.clone(), U256::from(3), U256::from(1_900_000_000u64));
		let signed = SignedVerify {
			root: calculate_root(ALICE, &digests),
			verify,
			signer: ALICE,
			digest: B256::ZERO,
			signature: Bytes::from(vec![0x1b; 65]),
		};

		let client = accepting_client(|call| {
			let Ok(decoded) =
				super_signature::IPermit3::verifyAndStoreRootCall::abi_decode(&call.data)
			else {
				return false;
			};
			decoded.signer == ALICE
				&& decoded.verify.dataHash
					== vec![B256::repeat_byte(1), B256::repeat_byte(2)]
				&& decoded.verify.nonce == U256::from(3)
		});

		service(client).register_root(&signed).await.unwrap();
	}

	#[tokio::test]
	async fn test_member_super_transfer_is_sent() {
		let details = TransferDetails::plain(mock_erc20(), U256::from(5));
		let member = super_transfer_digest(&deployment_domain(), &details, &BOB);
		let proof = SuperSignatureProof {
			signer: ALICE,
			spender: BOB,
			data_hash: vec![B256::repeat_byte(9), member],
		};

		let client = accepting_client(|call| {
			let Ok(decoded) =
				plain::IPermit3::transferBySuperSignature_0Call::abi_decode(&call.data)
			else {
				return false;
			};
			decoded.signer == ALICE
				&& decoded.dataHash.len() == 2
				&& decoded.dataHash[0] == B256::repeat_byte(9)
				&& decoded.requestedTransfer.amount == U256::from(5)
		});

		service(client)
			.transfer_by_super_signature(
				&details,
				&RequestedTransfer::amount(BOB, U256::from(5)),
				&proof,
			)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_non_member_super_transfer_rejected_locally() {
		let details = TransferDetails::plain(mock_erc20(), U256::from(5));
		// Digest computed for a different spender than the proof claims.
		let other = super_transfer_digest(&deployment_domain(), &details, &ALICE);
		let proof = SuperSignatureProof {
			signer: ALICE,
			spender: BOB,
			data_hash: vec![other],
		};

		let result = service(chain_only_client())
			.transfer_by_super_signature(
				&details,
				&RequestedTransfer::amount(BOB, U256::from(5)),
				&proof,
			)
			.await;

		assert!(matches!(result, Err(DeliveryError::NotAMember(_))));
	}

	#[tokio::test]
	async fn test_batch_super_transfer_checks_batch_digest() {
		let details = vec![
			TransferDetails::plain(mock_erc20(), U256::from(1)),
			TransferDetails::plain(mock_erc20(), U256::from(2)),
		];
		let member = super_batch_digest(&deployment_domain(), &details, &BOB).unwrap();
		let proof = SuperSignatureProof {
			signer: ALICE,
			spender: BOB,
			data_hash: vec![member],
		};

		let client = accepting_client(|call| {
			plain::IPermit3::transferBySuperSignature_1Call::abi_decode(&call.data)
				.map(|decoded| decoded.transferDetails.len() == 2)
				.unwrap_or(false)
		});

		service(client)
			.transfer_batch_by_super_signature(
				&details,
				&[
					RequestedTransfer::amount(BOB, U256::from(1)),
					RequestedTransfer::amount(BOB, U256::from(2)),
				],
				&proof,
			)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_super_batch_length_mismatch_touches_nothing() {
		let details = vec![
			TransferDetails::plain(mock_erc20(), U256::from(1)),
			TransferDetails::plain(mock_erc20(), U256::from(2)),
		];
		let proof = SuperSignatureProof {
			signer: ALICE,
			spender: BOB,
			data_hash: vec![super_batch_digest(&deployment_domain(), &details, &BOB).unwrap()],
		};

		let result = service(MockChainClient::new())
			.transfer_batch_by_super_signature(
				&details,
				&[RequestedTransfer::amount(BOB, U256::from(1))],
				&proof,
			)
			.await;

		assert!(matches!(
			result,
			Err(DeliveryError::LengthMismatch {
				signed: 2,
				requested: 1
			})
		));
	}

	#[tokio::test]
	async fn test_asset_transfer_goes_to_asset_contract() {
		let signed = SignedAssetTransfer {
			transfer: AssetSignatureTransfer {
				asset: mock_ilrta(),
				details: amount_values(100),
				spender: BOB,
				nonce: U256::ZERO,
				deadline: U256::from(1_900_000_000u64),
			},
			shape: TransferShape::parse("uint256 amount").unwrap(),
			signer: ALICE,
			digest: B256::ZERO,
			signature: Bytes::from(vec![0x1b; 65]),
		};

		let client = accepting_client(|call| {
			let Ok(decoded) = ilrta::IILRTA::transferBySignatureCall::abi_decode(&call.data) else {
				return false;
			};
			call.to == ILRTA_TOKEN
				&& U256::from_be_slice(&decoded.signatureTransfer.transferDetails) == U256::from(100)
				&& U256::from_be_slice(&decoded.requestedTransfer.transferDetails)
					== U256::from(40)
		});

		service(client)
			.asset_transfer_by_signature(
				&signed,
				&AssetRequestedTransfer {
					to: BOB,
					details: amount_values(40),
				},
			)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_asset_super_transfer_requires_membership() {
		let shape = TransferShape::parse("uint256 amount").unwrap();
		let proof = SuperSignatureProof {
			signer: ALICE,
			spender: BOB,
			data_hash: vec![B256::repeat_byte(7)],
		};

		let result = service(chain_only_client())
			.asset_transfer_by_super_signature(
				&mock_ilrta(),
				&shape,
				&amount_values(5),
				&AssetRequestedTransfer {
					to: BOB,
					details: amount_values(5),
				},
				&proof,
			)
			.await;

		assert!(matches!(result, Err(DeliveryError::NotAMember(_))));
	}

	#[tokio::test]
	async fn test_nonce_bitmap_lookup() {
		let mut client = MockChainClient::new();
		client.expect_chain_id().return_const(Some(CHAIN_ID));
		client
			.expect_read_state()
			.withf(|call| {
				super_signature::IPermit3::nonceBitmapCall::abi_decode(&call.data)
					.map(|decoded| decoded.owner == ALICE && decoded.word == U256::from(1))
					.unwrap_or(false)
			})
			.times(2)
			.returning(|_| Ok(Bytes::from(U256::from(4).to_be_bytes::<32>().to_vec())));

		let service = service(client);

		// 258 = word 1, bit 2; 257 = word 1, bit 1.
		assert!(service.is_nonce_used(ALICE, U256::from(258)).await.unwrap());
		assert!(!service.is_nonce_used(ALICE, U256::from(257)).await.unwrap());
	}

	#[tokio::test]
	async fn test_short_bitmap_reply_is_error() {
		let mut client = MockChainClient::new();
		client.expect_chain_id().return_const(Some(CHAIN_ID));
		client
			.expect_read_state()
			.returning(|_| Ok(Bytes::from(vec![0u8; 4])));

		assert!(matches!(
			service(client).is_nonce_used(ALICE, U256::ZERO).await,
			Err(DeliveryError::Network(_))
		));
	}
}
