//! Configuration for Permit3 clients.
//!
//! Configuration is a single TOML file. String values may reference
//! environment variables as `${NAME}` or `${NAME:-default}`; references are
//! substituted before parsing, so secrets such as private keys never have to
//! live in the file itself.
//!
//! ```toml
//! [client]
//! id = "permit3-client"
//!
//! [networks.31337]
//! rpc_url = "http://localhost:8545"
//! permit3_address = "0xCf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9"
//! super_signature_domain = "Permit3"
//!
//! [account]
//! primary = "local"
//!
//! [account.implementations.local]
//! private_key = "${PERMIT3_PRIVATE_KEY}"
//! ```

use once_cell::sync::Lazy;
use permit3_types::{networks::deserialize_networks, NetworkConfig, NetworksConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// The full error embeds the whole input, which may contain a private key.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	pub client: ClientConfig,
	/// Chains this client can sign for and submit to, keyed by chain id.
	#[serde(deserialize_with = "deserialize_networks")]
	pub networks: NetworksConfig,
	pub account: AccountConfig,
}

/// Identity of this client instance, used in log output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	pub id: String,
}

/// Account configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Which entry of `implementations` signs on behalf of this client.
	pub primary: String,
	/// Implementation name to raw TOML settings, validated by the
	/// implementation's own schema when the account is built.
	pub implementations: HashMap<String, toml::Value>,
}

impl AccountConfig {
	/// Settings of the primary implementation.
	pub fn primary_config(&self) -> Result<&toml::Value, ConfigError> {
		self.implementations.get(&self.primary).ok_or_else(|| {
			ConfigError::Validation(format!(
				"Primary account '{}' has no entry in account.implementations",
				self.primary
			))
		})
	}
}

const MAX_INPUT_SIZE: usize = 1024 * 1024;

static ENV_VAR_PATTERN: Lazy<Result<Regex, regex::Error>> =
	Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}"));

/// Substitutes `${NAME}` and `${NAME:-default}` references with environment values.
///
/// # Errors
///
/// Fails when the input exceeds 1 MiB or a referenced variable without a
/// default is unset.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = ENV_VAR_PATTERN
		.as_ref()
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;
	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};
		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await?;
		let config: Config = content.parse()?;
		tracing::debug!(
			path = %path.display(),
			client_id = %config.client.id,
			networks = config.networks.len(),
			"Loaded configuration"
		);
		Ok(config)
	}

	/// Settings of one chain.
	pub fn network(&self, chain_id: u64) -> Result<&NetworkConfig, ConfigError> {
		self.networks.get(&chain_id).ok_or_else(|| {
			ConfigError::Validation(format!("Network {} is not configured", chain_id))
		})
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.client.id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"client.id cannot be empty".to_string(),
			));
		}

		if self.networks.is_empty() {
			return Err(ConfigError::Validation(
				"At least one network must be configured".to_string(),
			));
		}

		for (chain_id, network) in &self.networks {
			if *chain_id == 0 {
				return Err(ConfigError::Validation(
					"Chain id 0 is not a valid network".to_string(),
				));
			}
			if network.rpc_url.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Network {} has an empty rpc_url",
					chain_id
				)));
			}
			if network.permit3_address.is_zero() {
				return Err(ConfigError::Validation(format!(
					"Network {} has a zero permit3_address",
					chain_id
				)));
			}
			if network.super_signature_domain.trim().is_empty() {
				return Err(ConfigError::Validation(format!(
					"Network {} has an empty super_signature_domain",
					chain_id
				)));
			}
		}

		self.account.primary_config()?;

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
