//! Registry trait for self-registering implementations.

/// Base trait for implementation registries.
///
/// Each pluggable module (for now only accounts) provides a `Registry` struct
/// implementing this trait, tying the name used in configuration to a factory.
pub trait ImplementationRegistry {
	/// The key used in TOML configuration, e.g. "local" for
	/// `account.implementations.local`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
