//! Low-level EIP-712 building blocks.
//!
//! - Domain separator computation
//! - Final digest computation (0x1901 || domainSeparator || structHash)
//! - A word-aligned encoder for the `encodeData` step of struct hashing

use alloy_primitives::{keccak256, Address, B256, U256};

/// Type string of the EIP-712 domain used by every signature in this library.
pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Compute the domain separator:
/// `keccak256(abi.encode(typeHash, keccak(name), keccak(version), chainId, verifyingContract))`.
pub fn compute_domain_hash(
	name: &str,
	version: &str,
	chain_id: u64,
	verifying_contract: &Address,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(DOMAIN_TYPE.as_bytes()));
	enc.push_dynamic(name.as_bytes());
	enc.push_dynamic(version.as_bytes());
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: keccak256(0x1901 || domainHash || structHash).
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Hash of an array of 32-byte words as EIP-712 encodes arrays:
/// keccak256 of the tightly concatenated elements.
pub fn hash_b256_array(items: &[B256]) -> B256 {
	let mut buf = Vec::with_capacity(items.len() * 32);
	for item in items {
		buf.extend_from_slice(item.as_slice());
	}
	keccak256(buf)
}

/// Word-aligned encoder for EIP-712 `encodeData`.
///
/// Every push appends exactly one 32-byte word. Dynamic values (`bytes`,
/// `string`) are pushed as their keccak256 hash.
#[derive(Debug, Default)]
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		self.buf.extend_from_slice(&v.to_be_bytes::<32>());
	}

	pub fn push_u8(&mut self, v: u8) {
		let mut word = [0u8; 32];
		word[31] = v;
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u32(&mut self, v: u32) {
		let mut word = [0u8; 32];
		word[28..].copy_from_slice(&v.to_be_bytes());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_bool(&mut self, v: bool) {
		self.push_u8(v as u8);
	}

	pub fn push_dynamic(&mut self, data: &[u8]) {
		self.push_b256(&keccak256(data));
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}
