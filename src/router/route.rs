//! Route entries and the path→handler table.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// A single route definition: a literal path and its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry<H> {
	path: String,
	handler: H,
}

impl<H> RouteEntry<H> {
	/// Creates a new route entry.
	pub fn new(path: impl Into<String>, handler: H) -> Self {
		Self {
			path: path.into(),
			handler,
		}
	}

	/// Returns the path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Returns the handler.
	pub fn handler(&self) -> &H {
		&self.handler
	}
}

/// Exact-match mapping from path to handler.
///
/// Built once from a list of [`RouteEntry`]; later entries win when paths
/// collide. There is no pattern or wildcard matching.
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
	routes: HashMap<String, H>,
}

impl<H> Default for RouteTable<H> {
	fn default() -> Self {
		Self {
			routes: HashMap::new(),
		}
	}
}

impl<H> RouteTable<H> {
	/// Builds a table from route entries.
	pub fn from_entries<I>(entries: I) -> Self
	where
		I: IntoIterator<Item = RouteEntry<H>>,
	{
		let mut routes = HashMap::new();
		for RouteEntry { path, handler } in entries {
			match routes.entry(path) {
				Entry::Occupied(mut slot) => {
					tracing::debug!(path = %slot.key(), "duplicate route path, last entry wins");
					slot.insert(handler);
				}
				Entry::Vacant(slot) => {
					slot.insert(handler);
				}
			}
		}
		Self { routes }
	}

	/// Returns the handler registered for `path`.
	pub fn get(&self, path: &str) -> Option<&H> {
		self.routes.get(path)
	}

	/// Returns whether `path` is registered.
	pub fn contains(&self, path: &str) -> bool {
		self.routes.contains_key(path)
	}

	/// Returns the number of registered paths.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Iterates over `(path, handler)` pairs in arbitrary order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &H)> {
		self.routes.iter().map(|(path, handler)| (path.as_str(), handler))
	}
}

impl<H> FromIterator<RouteEntry<H>> for RouteTable<H> {
	fn from_iter<I: IntoIterator<Item = RouteEntry<H>>>(iter: I) -> Self {
		Self::from_entries(iter)
	}
}
