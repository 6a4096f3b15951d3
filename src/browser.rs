//! Browser capability.
//!
//! The router never touches `window` directly. Everything it needs from the
//! host (reading and writing the fragment, reading the path, the
//! session-history API and event subscription) goes through the [`Browser`]
//! trait, so the routing logic runs unchanged against a real page
//! ([`WebBrowser`], wasm32 only) or an in-memory model ([`MemoryBrowser`]).

use crate::error::BrowserError;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

pub use memory::{HistoryEntry, MemoryBrowser};
#[cfg(target_arch = "wasm32")]
pub use web::{WebBrowser, bind_link};

/// State payload the router attaches to the history entries it creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
	/// The location the entry represents.
	pub path: String,
}

impl HistoryState {
	/// Creates a new history state.
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into() }
	}
}

/// Browser events the router subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	/// `hashchange`
	HashChange,
	/// `load`
	Load,
	/// `popstate`
	PopState,
}

impl EventKind {
	/// Returns the DOM event name.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::HashChange => "hashchange",
			Self::Load => "load",
			Self::PopState => "popstate",
		}
	}
}

/// A delivered browser event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
	/// The fragment changed.
	HashChange,
	/// The document finished loading.
	Load,
	/// Back/forward traversal. Carries the entry's state when the router
	/// created that entry.
	PopState(Option<HistoryState>),
}

impl BrowserEvent {
	/// Returns the kind of this event.
	pub fn kind(&self) -> EventKind {
		match self {
			Self::HashChange => EventKind::HashChange,
			Self::Load => EventKind::Load,
			Self::PopState(_) => EventKind::PopState,
		}
	}
}

/// Event callback registered with a [`Browser`].
pub type Listener = Rc<dyn Fn(&BrowserEvent)>;

/// Handle returned by [`Browser::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Host capability the router drives.
///
/// Fragment values are passed without the leading `#`.
pub trait Browser {
	/// Returns the current fragment, without `#`. Empty when there is none.
	fn fragment(&self) -> Result<String, BrowserError>;

	/// Assigns the fragment. Adds a history entry when the value changes.
	fn set_fragment(&self, fragment: &str) -> Result<(), BrowserError>;

	/// Replaces the current entry's fragment without adding an entry.
	fn replace_fragment(&self, fragment: &str) -> Result<(), BrowserError>;

	/// Returns the full URL as shown in the address bar.
	fn href(&self) -> Result<String, BrowserError>;

	/// Returns the path component of the URL.
	fn pathname(&self) -> Result<String, BrowserError>;

	/// Adds a session-history entry carrying `state` and showing `url`.
	fn push_state(&self, state: &HistoryState, url: &str) -> Result<(), BrowserError>;

	/// Replaces the current session-history entry.
	fn replace_state(&self, state: &HistoryState, url: &str) -> Result<(), BrowserError>;

	/// Subscribes `listener` to events of `kind`.
	fn add_listener(&self, kind: EventKind, listener: Listener) -> Result<ListenerId, BrowserError>;

	/// Removes a listener. Unknown ids are ignored.
	fn remove_listener(&self, id: ListenerId);
}

/// Normalizes a raw fragment into a location.
///
/// Strips a leading `#`, defaults to `/` when empty and guarantees a leading
/// `/`.
pub fn normalize_fragment(raw: &str) -> String {
	let value = raw.strip_prefix('#').unwrap_or(raw);
	if value.is_empty() {
		"/".to_string()
	} else if value.starts_with('/') {
		value.to_string()
	} else {
		format!("/{}", value)
	}
}

/// Returns the non-empty fragment of a full URL, if any.
pub fn split_fragment(href: &str) -> Option<&str> {
	href.split_once('#')
		.map(|(_, fragment)| fragment)
		.filter(|fragment| !fragment.is_empty())
}
