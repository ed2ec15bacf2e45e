//! Utility functions shared across the Permit3 crates.

pub mod eip712;
pub mod formatting;
pub mod helpers;

pub use eip712::{
	compute_domain_hash, compute_final_digest, hash_b256_array, Eip712AbiEncoder, DOMAIN_TYPE,
};
pub use formatting::without_0x_prefix;
pub use helpers::current_timestamp;
