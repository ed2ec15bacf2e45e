//! Per-chain network configuration.

use crate::domain::{default_super_signature_domain, Permit3Deployment};
use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Settings for one chain: where to reach it and where Permit3 lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub rpc_url: String,
	pub permit3_address: Address,
	/// Domain name the deployment uses for `Verify` envelopes.
	#[serde(default = "default_super_signature_domain")]
	pub super_signature_domain: String,
}

impl NetworkConfig {
	pub fn deployment(&self) -> Permit3Deployment {
		Permit3Deployment::new(self.permit3_address)
			.with_super_signature_domain(self.super_signature_domain.clone())
	}
}

/// Chain id to network settings.
pub type NetworksConfig = HashMap<u64, NetworkConfig>;

/// Deserializes `[networks.<chain_id>]` tables, whose keys TOML only allows
/// as strings, into a map keyed by numeric chain id.
///
/// # Errors
///
/// Fails when a key is not a valid `u64`.
pub fn deserialize_networks<'de, D>(deserializer: D) -> Result<NetworksConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: HashMap<String, NetworkConfig> = HashMap::deserialize(deserializer)?;
	string_map
		.into_iter()
		.map(|(key, value)| {
			key.parse::<u64>()
				.map(|chain_id| (chain_id, value))
				.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Deserialize)]
	struct Wrapper {
		#[serde(deserialize_with = "deserialize_networks")]
		networks: NetworksConfig,
	}

	#[test]
	fn test_string_keys_become_chain_ids() {
		let parsed: Wrapper = toml::from_str(
			r#"
[networks.31337]
rpc_url = "http://localhost:8545"
permit3_address = "0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9"
"#,
		)
		.unwrap();

		let network = &parsed.networks[&31337];
		assert_eq!(network.super_signature_domain, "Permit3");
		assert_eq!(network.deployment().address, network.permit3_address);
	}

	#[test]
	fn test_non_numeric_key_rejected() {
		let parsed: Result<Wrapper, _> = toml::from_str(
			r#"
[networks.mainnet]
rpc_url = "http://localhost:8545"
permit3_address = "0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9"
"#,
		);

		assert!(parsed.is_err());
	}
}
