//! In-memory browser.
//!
//! Models the parts of a browser tab the router relies on: a session-history
//! stack with a cursor, the fragment/path of each entry, and an event queue.
//! Events are queued rather than dispatched inline, mirroring how a real
//! browser delivers `hashchange`/`popstate` on a later task. Call
//! [`MemoryBrowser::run_pending_events`] to deliver them.

use super::{Browser, BrowserEvent, EventKind, HistoryState, Listener, ListenerId};
use crate::error::BrowserError;
use std::cell::RefCell;
use std::collections::VecDeque;

const DEFAULT_ORIGIN: &str = "http://localhost";

/// One entry of the session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
	/// Path component.
	pub path: String,
	/// Fragment without `#`.
	pub fragment: String,
	/// State attached with `pushState`/`replaceState`.
	pub state: Option<HistoryState>,
}

impl HistoryEntry {
	fn parse(url: &str, base_path: &str) -> Self {
		let (path, fragment) = url.split_once('#').unwrap_or((url, ""));
		let path = if path.is_empty() { base_path } else { path };
		Self {
			path: path.to_string(),
			fragment: fragment.to_string(),
			state: None,
		}
	}
}

struct Inner {
	origin: String,
	entries: Vec<HistoryEntry>,
	index: usize,
	listeners: Vec<(ListenerId, EventKind, Listener)>,
	next_listener: u64,
	pending: VecDeque<BrowserEvent>,
	api_calls: usize,
}

impl Inner {
	fn current(&self) -> &HistoryEntry {
		&self.entries[self.index]
	}

	fn push(&mut self, entry: HistoryEntry) {
		self.entries.truncate(self.index + 1);
		self.entries.push(entry);
		self.index = self.entries.len() - 1;
	}
}

/// A browser tab kept entirely in memory.
///
/// ```
/// use reinhardt_spa_router::browser::{Browser, MemoryBrowser};
///
/// let browser = MemoryBrowser::new("/app#/users");
/// assert_eq!(browser.pathname().unwrap(), "/app");
/// assert_eq!(browser.fragment().unwrap(), "/users");
/// assert_eq!(browser.href().unwrap(), "http://localhost/app#/users");
/// ```
pub struct MemoryBrowser {
	inner: RefCell<Inner>,
}

impl std::fmt::Debug for MemoryBrowser {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.inner.borrow();
		f.debug_struct("MemoryBrowser")
			.field("origin", &inner.origin)
			.field("entries", &inner.entries)
			.field("index", &inner.index)
			.field("listeners", &inner.listeners.len())
			.field("pending", &inner.pending)
			.finish()
	}
}

impl Default for MemoryBrowser {
	fn default() -> Self {
		Self::new("/")
	}
}

impl MemoryBrowser {
	/// Opens a tab at `url` (a path with an optional `#fragment`).
	pub fn new(url: &str) -> Self {
		Self::with_origin(DEFAULT_ORIGIN, url)
	}

	/// Opens a tab at `url` under a custom origin.
	pub fn with_origin(origin: impl Into<String>, url: &str) -> Self {
		Self {
			inner: RefCell::new(Inner {
				origin: origin.into(),
				entries: vec![HistoryEntry::parse(url, "/")],
				index: 0,
				listeners: Vec::new(),
				next_listener: 0,
				pending: VecDeque::new(),
				api_calls: 0,
			}),
		}
	}

	/// Number of entries in the session history.
	pub fn history_len(&self) -> usize {
		self.inner.borrow().entries.len()
	}

	/// Position of the active entry.
	pub fn history_index(&self) -> usize {
		self.inner.borrow().index
	}

	/// Returns a copy of the active entry.
	pub fn current_entry(&self) -> HistoryEntry {
		self.inner.borrow().current().clone()
	}

	/// Number of fragment assignments and history API calls made so far.
	pub fn api_calls(&self) -> usize {
		self.inner.borrow().api_calls
	}

	/// Number of events waiting for delivery.
	pub fn pending_events(&self) -> usize {
		self.inner.borrow().pending.len()
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.borrow().listeners.len()
	}

	/// Queues a `load` event.
	pub fn fire_load(&self) {
		self.inner.borrow_mut().pending.push_back(BrowserEvent::Load);
	}

	/// Goes back one entry. Returns `false` at the start of the history.
	pub fn back(&self) -> bool {
		self.go(-1)
	}

	/// Goes forward one entry. Returns `false` at the end of the history.
	pub fn forward(&self) -> bool {
		self.go(1)
	}

	/// Traverses `delta` entries, queueing `popstate` and, when the fragment
	/// differs, `hashchange`.
	pub fn go(&self, delta: isize) -> bool {
		let mut inner = self.inner.borrow_mut();
		let Some(target) = inner.index.checked_add_signed(delta) else {
			return false;
		};
		if delta == 0 || target >= inner.entries.len() {
			return false;
		}
		let previous_fragment = inner.current().fragment.clone();
		inner.index = target;
		let state = inner.current().state.clone();
		let fragment_changed = inner.current().fragment != previous_fragment;
		inner.pending.push_back(BrowserEvent::PopState(state));
		if fragment_changed {
			inner.pending.push_back(BrowserEvent::HashChange);
		}
		true
	}

	/// Follows a link the way the browser would without script intervention.
	///
	/// `#fragment` hrefs navigate within the document. Anything else is a
	/// document navigation: a new entry is added and `load` is queued.
	pub fn follow_href(&self, href: &str) {
		if let Some(fragment) = href.strip_prefix('#') {
			// Native fragment navigation is not a script call.
			self.assign_fragment(fragment);
			return;
		}
		let mut inner = self.inner.borrow_mut();
		let base = inner.current().path.clone();
		inner.push(HistoryEntry::parse(href, &base));
		inner.pending.push_back(BrowserEvent::Load);
	}

	/// Rewrites the active entry to `url` without queueing any event, as a
	/// page restored from cache or a script outside the router would.
	pub fn overwrite_entry(&self, url: &str) {
		let mut inner = self.inner.borrow_mut();
		let entry = HistoryEntry::parse(url, &inner.current().path);
		let index = inner.index;
		inner.entries[index] = entry;
	}

	/// Delivers queued events, including events queued by the listeners
	/// themselves. Returns the number of events delivered.
	pub fn run_pending_events(&self) -> usize {
		let mut delivered = 0;
		loop {
			let (event, listeners) = {
				let mut inner = self.inner.borrow_mut();
				let Some(event) = inner.pending.pop_front() else {
					break;
				};
				let kind = event.kind();
				let listeners: Vec<Listener> = inner
					.listeners
					.iter()
					.filter(|(_, k, _)| *k == kind)
					.map(|(_, _, l)| Listener::clone(l))
					.collect();
				(event, listeners)
			};
			tracing::trace!(event = event.kind().as_str(), "dispatching browser event");
			for listener in listeners {
				listener(&event);
			}
			delivered += 1;
		}
		delivered
	}

	fn assign_fragment(&self, fragment: &str) {
		let mut inner = self.inner.borrow_mut();
		if inner.current().fragment == fragment {
			return;
		}
		let entry = HistoryEntry {
			path: inner.current().path.clone(),
			fragment: fragment.to_string(),
			state: None,
		};
		inner.push(entry);
		inner.pending.push_back(BrowserEvent::HashChange);
	}
}

impl Browser for MemoryBrowser {
	fn fragment(&self) -> Result<String, BrowserError> {
		Ok(self.inner.borrow().current().fragment.clone())
	}

	fn set_fragment(&self, fragment: &str) -> Result<(), BrowserError> {
		self.inner.borrow_mut().api_calls += 1;
		self.assign_fragment(fragment);
		Ok(())
	}

	fn replace_fragment(&self, fragment: &str) -> Result<(), BrowserError> {
		let mut inner = self.inner.borrow_mut();
		inner.api_calls += 1;
		let index = inner.index;
		let entry = &mut inner.entries[index];
		let changed = entry.fragment != fragment;
		entry.fragment = fragment.to_string();
		entry.state = None;
		if changed {
			inner.pending.push_back(BrowserEvent::HashChange);
		}
		Ok(())
	}

	fn href(&self) -> Result<String, BrowserError> {
		let inner = self.inner.borrow();
		let entry = inner.current();
		if entry.fragment.is_empty() {
			Ok(format!("{}{}", inner.origin, entry.path))
		} else {
			Ok(format!("{}{}#{}", inner.origin, entry.path, entry.fragment))
		}
	}

	fn pathname(&self) -> Result<String, BrowserError> {
		Ok(self.inner.borrow().current().path.clone())
	}

	fn push_state(&self, state: &HistoryState, url: &str) -> Result<(), BrowserError> {
		let mut inner = self.inner.borrow_mut();
		inner.api_calls += 1;
		let mut entry = HistoryEntry::parse(url, &inner.current().path);
		entry.state = Some(state.clone());
		inner.push(entry);
		Ok(())
	}

	fn replace_state(&self, state: &HistoryState, url: &str) -> Result<(), BrowserError> {
		let mut inner = self.inner.borrow_mut();
		inner.api_calls += 1;
		let mut entry = HistoryEntry::parse(url, &inner.current().path);
		entry.state = Some(state.clone());
		let index = inner.index;
		inner.entries[index] = entry;
		Ok(())
	}

	fn add_listener(&self, kind: EventKind, listener: Listener) -> Result<ListenerId, BrowserError> {
		let mut inner = self.inner.borrow_mut();
		let id = ListenerId(inner.next_listener);
		inner.next_listener += 1;
		inner.listeners.push((id, kind, listener));
		Ok(id)
	}

	fn remove_listener(&self, id: ListenerId) {
		self.inner
			.borrow_mut()
			.listeners
			.retain(|(listener_id, _, _)| *listener_id != id);
	}
}
