//! Hex prefix helper.

/// Removes a "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}
