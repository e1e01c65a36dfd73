//! Ordered, case-insensitive header list.

use serde::{Deserialize, Serialize};

/// HTTP header list preserving insertion order and duplicate names.
///
/// Name comparisons are ASCII case-insensitive. Serialized as an array of
/// `[name, value]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the first value stored under `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}

	/// Iterates every value stored under `name`, in insertion order.
	pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.0.iter().filter(move |(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Replaces all values of `name` with a single value.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		self.remove(&name);
		self.0.push((name, value.into()));
	}

	/// Adds a value without touching existing entries of the same name.
	pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.0.push((name.into(), value.into()));
	}

	/// Removes every value of `name`, returning whether anything was removed.
	pub fn remove(&mut self, name: &str) -> bool {
		let before = self.0.len();
		self.0.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
		self.0.len() != before
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<K, V> FromIterator<(K, V)> for Headers
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_ignores_case() {
		let headers: Headers = [("X-API-Token", "Token-1")].into_iter().collect();
		assert_eq!(headers.get("x-api-token"), Some("Token-1"));
		assert!(headers.contains("X-Api-Token"));
		assert_eq!(headers.get("Cookie"), None);
	}

	#[test]
	fn looked_up_value_outlives_the_name() {
		let headers: Headers = [("Content-Type", "text/plain")].into_iter().collect();
		let value = {
			let name = String::from("content-type");
			headers.get(&name)
		};
		assert_eq!(value, Some("text/plain"));
	}

	#[test]
	fn set_replaces_every_duplicate() {
		let mut headers = Headers::new();
		headers.append("Cookie", "a=1");
		headers.append("cookie", "b=2");
		headers.append("Accept", "*/*");
		assert_eq!(headers.get_all("COOKIE").count(), 2);

		headers.set("Cookie", "c=3");
		assert_eq!(headers.get_all("cookie").collect::<Vec<_>>(), vec!["c=3"]);
		assert_eq!(headers.len(), 2);
	}

	#[test]
	fn remove_reports_whether_anything_changed() {
		let mut headers: Headers = [("Accept", "*/*")].into_iter().collect();
		assert!(!headers.remove("Cookie"));
		assert!(headers.remove("accept"));
		assert!(headers.is_empty());
	}

	#[test]
	fn serializes_as_pairs() {
		let headers: Headers = [("Accept", "text/plain")].into_iter().collect();
		let json = serde_json::to_value(&headers).unwrap();
		assert_eq!(json, serde_json::json!([["Accept", "text/plain"]]));
	}
}
