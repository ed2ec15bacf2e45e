//! Common types for the Permit3 client library.
//!
//! This crate defines the value objects shared by every other crate in the
//! workspace: asset descriptors, transfer intents, the super-signature
//! envelope, EIP-712 signing domains and the contract-call shapes handed to
//! the chain client. Nothing here holds state beyond a single call.

/// Asset descriptors (plain ERC-20 and generic ILRTA assets).
pub mod asset;
/// Contract-call and transaction types exchanged with the chain client.
pub mod delivery;
/// EIP-712 signing domains and Permit3 deployment descriptors.
pub mod domain;
/// Network configuration types.
pub mod networks;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Secret string wrapper for private keys.
pub mod secret_string;
/// Super-signature envelope and root types.
pub mod super_signature;
/// Transfer intents and requested transfers.
pub mod transfer;
/// Ready-to-sign EIP-712 messages.
pub mod typed_data;
/// EIP-712 encoding helpers and small utilities.
pub mod utils;
/// Configuration validation types.
pub mod validation;

// Re-export all types for convenient access
pub use asset::*;
pub use delivery::*;
pub use domain::*;
pub use networks::{NetworkConfig, NetworksConfig};
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use super_signature::*;
pub use transfer::*;
pub use typed_data::TypedData;
pub use utils::{current_timestamp, without_0x_prefix};
pub use validation::*;
