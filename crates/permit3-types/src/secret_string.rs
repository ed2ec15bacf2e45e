//! Zeroizing string wrapper for private keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// A string that is zeroed on drop and redacted in `Debug`, `Display` and
/// serialized output.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret.
	///
	/// The returned slice must not be logged or persisted.
	pub fn expose_secret(&self) -> &str {
		&self.0
	}

	/// Runs `f` with the secret in scope only for the duration of the call.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString(***REDACTED***)")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "***REDACTED***")
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("***REDACTED***")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(Self::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secret_is_redacted() {
		let secret = SecretString::from("0xdeadbeef");

		assert_eq!(format!("{:?}", secret), "SecretString(***REDACTED***)");
		assert_eq!(format!("{}", secret), "***REDACTED***");
		assert_eq!(
			serde_json::to_string(&secret).unwrap(),
			"\"***REDACTED***\""
		);
		assert_eq!(secret.expose_secret(), "0xdeadbeef");
	}

	#[test]
	fn test_with_exposed_scopes_access() {
		let secret = SecretString::from("abc");
		assert_eq!(secret.with_exposed(|s| s.len()), 3);
		assert!(!secret.is_empty());
	}
}
