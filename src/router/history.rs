//! Location history: the router's single source of truth for the current
//! location.

use crate::reactive::{Signal, SubscriptionId};

/// Observable holder of the current location.
///
/// `current` is `None` until the owning router's initialization sets it.
/// Clones share the same underlying value. Only the router writes to it;
/// consumers read it or subscribe to changes.
#[derive(Debug, Clone)]
pub struct LocationHistory {
	current: Signal<Option<String>>,
}

impl Default for LocationHistory {
	fn default() -> Self {
		Self::new()
	}
}

impl LocationHistory {
	/// Creates an empty history.
	pub fn new() -> Self {
		Self {
			current: Signal::new(None),
		}
	}

	/// Returns the current location.
	pub fn current(&self) -> Option<String> {
		self.current.get()
	}

	/// Returns whether the current location equals `path`.
	pub fn is_current(&self, path: &str) -> bool {
		self.current.with(|current| current.as_deref() == Some(path))
	}

	/// Returns the underlying signal.
	pub fn signal(&self) -> &Signal<Option<String>> {
		&self.current
	}

	/// Calls `f` with the new location after each change.
	pub fn subscribe<F>(&self, f: F) -> SubscriptionId
	where
		F: Fn(Option<&str>) + 'static,
	{
		self.current.subscribe(move |current| f(current.as_deref()))
	}

	/// Writes the current location. Observers are only notified when the
	/// value actually changes, so browser echoes of a navigation the router
	/// already applied are silent.
	pub(crate) fn set_current(&self, path: impl Into<String>) -> bool {
		let path = path.into();
		tracing::trace!(path = %path, "location update");
		self.current.set_if_changed(Some(path))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::RefCell;
	use std::rc::Rc;

	#[rstest]
	fn test_starts_empty() {
		let history = LocationHistory::new();
		assert_eq!(history.current(), None);
		assert!(!history.is_current("/"));
	}

	#[rstest]
	fn test_echo_does_not_notify() {
		let history = LocationHistory::new();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		history.subscribe(move |current| sink.borrow_mut().push(current.map(str::to_string)));

		assert!(history.set_current("/a"));
		assert!(!history.set_current("/a"));
		assert!(history.set_current("/b"));

		assert_eq!(
			*seen.borrow(),
			vec![Some("/a".to_string()), Some("/b".to_string())]
		);
	}

	#[rstest]
	fn test_clones_share_location() {
		let history = LocationHistory::new();
		let observer = history.clone();
		history.set_current("/x");
		assert!(observer.is_current("/x"));
	}
}
