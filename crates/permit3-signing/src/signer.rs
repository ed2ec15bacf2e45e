//! Signing and signer recovery.
//!
//! Signatures are 65 bytes (`r ‖ s ‖ v`). Every signature this module hands
//! out has already been recovered and checked against the account's
//! address, so a misbehaving account or wallet cannot produce a signature
//! that the contract would attribute to someone else.

use crate::{
	aggregator::{calculate_root, verify_typed_data},
	encoder::{batch_typed_data, super_batch_digest, super_transfer_digest, transfer_typed_data},
	native::{
		asset_super_transfer_digest, asset_transfer_typed_data, AssetSignatureTransfer,
		SignedAssetTransfer,
	},
	schema::TransferShape,
	value::ShapeValues,
	SigningError,
};
use alloy_primitives::{Address, Bytes, Signature, B256};
use permit3_account::AccountInterface;
use permit3_types::{
	GenericAsset, Permit3Deployment, SignatureTransfer, SignatureTransferBatch, SignedTransfer,
	SignedTransferBatch, SignedVerify, SigningDomain, TransferDetails, TypedData, Verify,
	PERMIT3_DOMAIN_NAME,
};
use std::sync::Arc;

/// Recovers the address that produced `signature` over `digest`.
///
/// Pure; touches no network or state.
///
/// # Errors
///
/// Returns [`SigningError::InvalidSignature`] when the bytes are not a
/// 65-byte signature or do not recover to any address.
pub fn recover_signer(digest: &B256, signature: &[u8]) -> Result<Address, SigningError> {
	if signature.len() != 65 {
		return Err(SigningError::InvalidSignature(format!(
			"Expected 65 bytes, got {}",
			signature.len()
		)));
	}
	let signature = Signature::try_from(signature)
		.map_err(|e| SigningError::InvalidSignature(e.to_string()))?;
	signature
		.recover_address_from_prehash(digest)
		.map_err(|e| SigningError::InvalidSignature(e.to_string()))
}

/// Signs `typed_data` with `account` and checks the result recovers to the
/// account's address.
///
/// Returns the signer and the 65-byte signature.
pub async fn sign_typed_data(
	account: &dyn AccountInterface,
	typed_data: &TypedData,
) -> Result<(Address, Bytes), SigningError> {
	let signer = account.address().await?;
	let signature = account.sign_typed_data(typed_data).await?;
	let bytes = Bytes::copy_from_slice(&signature.as_bytes());

	let recovered = recover_signer(&typed_data.digest, &bytes)?;
	if recovered != signer {
		tracing::warn!(
			expected = %signer,
			%recovered,
			digest = %typed_data.digest,
			"Signature recovered to a different address"
		);
		return Err(SigningError::InvalidSignature(format!(
			"Recovered {} but account is {}",
			recovered, signer
		)));
	}

	Ok((signer, bytes))
}

/// Signs Permit3 intents for one account on one deployment.
///
/// The chain id comes from the active chain context; when it is unknown
/// every operation fails with [`SigningError::MissingChainId`] before the
/// account is asked to sign.
pub struct Permit3Signer {
	account: Arc<dyn AccountInterface>,
	deployment: Permit3Deployment,
	chain_id: Option<u64>,
}

impl Permit3Signer {
	pub fn new(
		account: Arc<dyn AccountInterface>,
		deployment: Permit3Deployment,
		chain_id: Option<u64>,
	) -> Self {
		Self {
			account,
			deployment,
			chain_id,
		}
	}

	pub fn deployment(&self) -> &Permit3Deployment {
		&self.deployment
	}

	pub fn chain_id(&self) -> Option<u64> {
		self.chain_id
	}

	pub fn permit3_domain(&self) -> Result<SigningDomain, SigningError> {
		Ok(SigningDomain::new(
			PERMIT3_DOMAIN_NAME,
			self.chain_id,
			self.deployment.address,
		)?)
	}

	pub fn super_signature_domain(&self) -> Result<SigningDomain, SigningError> {
		Ok(SigningDomain::new(
			self.deployment.super_signature_domain.clone(),
			self.chain_id,
			self.deployment.address,
		)?)
	}

	pub fn asset_domain(&self, asset: &GenericAsset) -> Result<SigningDomain, SigningError> {
		Ok(SigningDomain::new(
			asset.name(),
			self.chain_id,
			asset.address(),
		)?)
	}

	pub async fn sign_transfer(
		&self,
		transfer: SignatureTransfer,
	) -> Result<SignedTransfer, SigningError> {
		let typed_data = transfer_typed_data(&self.permit3_domain()?, &transfer);
		let (signer, signature) = sign_typed_data(self.account.as_ref(), &typed_data).await?;
		Ok(SignedTransfer {
			transfer,
			signer,
			digest: typed_data.digest,
			signature,
		})
	}

	pub async fn sign_transfer_batch(
		&self,
		batch: SignatureTransferBatch,
	) -> Result<SignedTransferBatch, SigningError> {
		let typed_data = batch_typed_data(&self.permit3_domain()?, &batch)?;
		let (signer, signature) = sign_typed_data(self.account.as_ref(), &typed_data).await?;
		Ok(SignedTransferBatch {
			transfer: batch,
			signer,
			digest: typed_data.digest,
			signature,
		})
	}

	/// Signs a `Verify` envelope and derives the root the contract will store.
	pub async fn sign_verify(&self, verify: Verify) -> Result<SignedVerify, SigningError> {
		let typed_data = verify_typed_data(&self.super_signature_domain()?, &verify);
		let (signer, signature) = sign_typed_data(self.account.as_ref(), &typed_data).await?;
		let root = calculate_root(signer, &verify.data_hash);
		tracing::debug!(%signer, %root, members = verify.data_hash.len(), "Signed verify envelope");
		Ok(SignedVerify {
			verify,
			signer,
			digest: typed_data.digest,
			signature,
			root,
		})
	}

	/// Signs a transfer for an ILRTA asset contract's own `transferBySignature`.
	pub async fn sign_asset_transfer(
		&self,
		shape: &TransferShape,
		transfer: AssetSignatureTransfer,
	) -> Result<SignedAssetTransfer, SigningError> {
		let domain = self.asset_domain(&transfer.asset)?;
		let typed_data = asset_transfer_typed_data(&domain, shape, &transfer)?;
		let (signer, signature) = sign_typed_data(self.account.as_ref(), &typed_data).await?;
		Ok(SignedAssetTransfer {
			transfer,
			shape: shape.clone(),
			signer,
			digest: typed_data.digest,
			signature,
		})
	}

	/// Member digest of a single super-signature transfer.
	pub fn super_transfer_digest(
		&self,
		details: &TransferDetails,
		spender: &Address,
	) -> Result<B256, SigningError> {
		Ok(super_transfer_digest(
			&self.permit3_domain()?,
			details,
			spender,
		))
	}

	/// Member digest of a batch super-signature transfer.
	pub fn super_batch_digest(
		&self,
		details: &[TransferDetails],
		spender: &Address,
	) -> Result<B256, SigningError> {
		super_batch_digest(&self.permit3_domain()?, details, spender)
	}

	/// Member digest of a super-signature transfer on an ILRTA asset.
	pub fn asset_super_transfer_digest(
		&self,
		asset: &GenericAsset,
		shape: &TransferShape,
		details: &ShapeValues,
		spender: &Address,
	) -> Result<B256, SigningError> {
		asset_super_transfer_digest(&self.asset_domain(asset)?, shape, details, spender)
	}
}
