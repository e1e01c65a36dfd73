//! Session secret value and its synchronized storage slot.

use std::fmt;

use parking_lot::RwLock;

/// Opaque authentication token obtained from a login response.
///
/// `Debug` output is redacted; use [`Secret::expose`] to read the raw value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for Secret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Secret(***)")
	}
}

impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

/// Nullable secret slot shared between concurrent requests.
///
/// Reads (`get`) and writes (`store`, `clear`) are mutually exclusive, so a request
/// stamped while a login completes sees either the old or the new secret, never a
/// torn value.
#[derive(Debug, Default)]
pub struct SecretCell {
	inner: RwLock<Option<Secret>>,
}

impl SecretCell {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_secret(secret: impl Into<Secret>) -> Self {
		Self {
			inner: RwLock::new(Some(secret.into())),
		}
	}

	pub fn get(&self) -> Option<Secret> {
		self.inner.read().clone()
	}

	pub fn is_set(&self) -> bool {
		self.inner.read().is_some()
	}

	/// Stores a new secret, returning the one it replaced.
	pub fn store(&self, secret: impl Into<Secret>) -> Option<Secret> {
		self.inner.write().replace(secret.into())
	}

	pub fn clear(&self) -> Option<Secret> {
		self.inner.write().take()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_output_hides_value() {
		let secret = Secret::new("Token-1");
		assert_eq!(format!("{secret:?}"), "Secret(***)");
		assert_eq!(secret.expose(), "Token-1");

		let cell = SecretCell::with_secret("Token-1");
		assert!(!format!("{cell:?}").contains("Token-1"));
	}

	#[test]
	fn store_replaces_and_clear_empties() {
		let cell = SecretCell::new();
		assert!(!cell.is_set());
		assert_eq!(cell.store("Token-1"), None);
		assert_eq!(cell.store("Token-2"), Some(Secret::new("Token-1")));
		assert_eq!(cell.get(), Some(Secret::new("Token-2")));
		assert_eq!(cell.clear(), Some(Secret::new("Token-2")));
		assert!(cell.get().is_none());
	}
}
