//! Core Router Implementation.
//!
//! This module provides the main Router struct, mode initialization and the
//! navigation methods.

use super::history::LocationHistory;
use super::route::{RouteEntry, RouteTable};
use crate::browser::{
	Browser, BrowserEvent, EventKind, HistoryState, ListenerId, normalize_fragment, split_fragment,
};
use crate::config::{Mode, PopStateFallback, RouterConfig};
use crate::error::{BrowserError, RouterError, RouterResult};
use crate::reactive::{Signal, SubscriptionId};
use serde_json::Value;
use std::rc::{Rc, Weak};

/// Parameters attached to the most recent `push`/`replace`.
pub type NavigationParams = serde_json::Map<String, Value>;

/// How a navigation touches the session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
	/// Add a new entry.
	Push,
	/// Overwrite the current entry.
	Replace,
}

/// Target of a programmatic navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
	/// Destination location.
	pub path: String,
	/// Parameters made available through [`Router::params`].
	pub params: NavigationParams,
}

impl NavigateOptions {
	/// Creates options for `path` without parameters.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			params: NavigationParams::new(),
		}
	}

	/// Adds a parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.params.insert(key.into(), value.into());
		self
	}

	/// Replaces all parameters.
	pub fn params(mut self, params: NavigationParams) -> Self {
		self.params = params;
		self
	}
}

impl From<&str> for NavigateOptions {
	fn from(path: &str) -> Self {
		Self::new(path)
	}
}

impl From<String> for NavigateOptions {
	fn from(path: String) -> Self {
		Self::new(path)
	}
}

/// Snapshot of the routing state a view reads: the current location merged
/// with the parameters of the last navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
	/// Current location.
	pub current: Option<String>,
	/// Parameters of the last `push`/`replace`.
	pub params: NavigationParams,
}

/// Construction input for a [`Router`].
#[derive(Debug, Clone)]
pub struct RouterOptions<H> {
	routes: Vec<RouteEntry<H>>,
	config: RouterConfig,
}

impl<H> Default for RouterOptions<H> {
	fn default() -> Self {
		Self {
			routes: Vec::new(),
			config: RouterConfig::default(),
		}
	}
}

impl<H> RouterOptions<H> {
	/// Creates empty options in hash mode.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a route.
	pub fn route(mut self, path: impl Into<String>, handler: H) -> Self {
		self.routes.push(RouteEntry::new(path, handler));
		self
	}

	/// Registers several routes.
	pub fn routes<I>(mut self, routes: I) -> Self
	where
		I: IntoIterator<Item = RouteEntry<H>>,
	{
		self.routes.extend(routes);
		self
	}

	/// Sets the addressing mode.
	pub fn mode(mut self, mode: Mode) -> Self {
		self.config.mode = mode;
		self
	}

	/// Sets the popstate fallback policy.
	pub fn popstate_fallback(mut self, fallback: PopStateFallback) -> Self {
		self.config.popstate_fallback = fallback;
		self
	}

	/// Replaces the whole configuration.
	pub fn config(mut self, config: RouterConfig) -> Self {
		self.config = config;
		self
	}
}

/// The client-side router.
///
/// Owns the route table and the [`LocationHistory`], keeps the current
/// location in sync with the browser and performs programmatic navigation.
///
/// # Example
///
/// ```
/// use reinhardt_spa_router::browser::MemoryBrowser;
/// use reinhardt_spa_router::router::{NavigateOptions, Router, RouterOptions};
/// use std::rc::Rc;
///
/// let browser = Rc::new(MemoryBrowser::new("/"));
/// let router = Router::new(
/// 	RouterOptions::new().route("/", "home").route("/a", "a"),
/// 	browser.clone(),
/// );
/// assert_eq!(router.current().as_deref(), Some("/"));
///
/// router.push(NavigateOptions::new("/a").param("x", 1));
/// assert_eq!(router.resolve_current(), Some(&"a"));
/// assert_eq!(router.params()["x"], 1);
/// ```
pub struct Router<H> {
	config: RouterConfig,
	routes: RouteTable<H>,
	history: LocationHistory,
	params: Signal<NavigationParams>,
	browser: Rc<dyn Browser>,
	listeners: Vec<ListenerId>,
}

impl<H> std::fmt::Debug for Router<H> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("mode", &self.config.mode)
			.field("routes_count", &self.routes.len())
			.field("current", &self.history.current())
			.finish()
	}
}

impl<H> Router<H> {
	/// Creates a router and runs the mode-specific initialization against
	/// `browser`.
	///
	/// Browser failures during initialization are logged and the router is
	/// returned anyway; use [`Router::try_new`] to treat them as errors.
	pub fn new(options: RouterOptions<H>, browser: Rc<dyn Browser>) -> Self {
		Self::build(options, browser).0
	}

	/// Creates a router, failing if the browser could not be read, written
	/// or subscribed to during initialization.
	///
	/// # Errors
	///
	/// Returns the first [`RouterError::Browser`] raised during
	/// initialization.
	pub fn try_new(options: RouterOptions<H>, browser: Rc<dyn Browser>) -> RouterResult<Self> {
		let (router, failures) = Self::build(options, browser);
		match failures.into_iter().next() {
			Some(err) => Err(err.into()),
			None => Ok(router),
		}
	}

	/// Creates a router from a configuration and a list of routes.
	pub fn from_config<I>(config: RouterConfig, routes: I, browser: Rc<dyn Browser>) -> Self
	where
		I: IntoIterator<Item = RouteEntry<H>>,
	{
		Self::new(RouterOptions::new().routes(routes).config(config), browser)
	}

	fn build(options: RouterOptions<H>, browser: Rc<dyn Browser>) -> (Self, Vec<BrowserError>) {
		let RouterOptions { routes, config } = options;
		let mut router = Self {
			config,
			routes: RouteTable::from_entries(routes),
			history: LocationHistory::new(),
			params: Signal::new(NavigationParams::new()),
			browser,
			listeners: Vec::new(),
		};
		let mut failures = Vec::new();
		match router.config.mode {
			Mode::Hash => router.init_hash(&mut failures),
			Mode::History => router.init_history(&mut failures),
		}
		tracing::debug!(
			mode = %router.config.mode,
			routes = router.routes.len(),
			current = ?router.history.current(),
			failures = failures.len(),
			"router initialized"
		);
		(router, failures)
	}

	fn init_hash(&mut self, failures: &mut Vec<BrowserError>) {
		match self.browser.fragment() {
			Ok(fragment) if fragment.is_empty() => {
				if let Err(err) = self.browser.replace_fragment("/") {
					report(failures, "failed to initialize fragment", err);
				}
			}
			Ok(_) => {}
			Err(err) => report(failures, "failed to read fragment", err),
		}
		if let Err(err) = sync_from_fragment(self.browser.as_ref(), &self.history) {
			report(failures, "failed to read fragment", err);
		}

		for kind in [EventKind::HashChange, EventKind::Load] {
			let history = self.history.clone();
			let browser = Rc::downgrade(&self.browser);
			self.listen(failures, kind, move |_| {
				if let Some(browser) = browser.upgrade()
					&& let Err(err) = sync_from_fragment(browser.as_ref(), &history)
				{
					tracing::warn!(error = %err, "failed to read fragment");
				}
			});
		}
	}

	fn init_history(&mut self, failures: &mut Vec<BrowserError>) {
		let stray = match self.browser.href() {
			Ok(href) => split_fragment(&href).map(normalize_fragment),
			Err(err) => {
				report(failures, "failed to read href", err);
				None
			}
		};
		match stray {
			Some(path) => {
				tracing::debug!(path = %path, "moving legacy fragment into the path");
				self.history.set_current(path.clone());
				if let Err(err) = self.browser.replace_state(&HistoryState::new(path.clone()), &path) {
					report(failures, "failed to rewrite legacy fragment", err);
				}
			}
			None => {
				if let Err(err) = sync_from_path(self.browser.as_ref(), &self.history) {
					report(failures, "failed to read path", err);
				}
			}
		}

		let history = self.history.clone();
		let browser = Rc::downgrade(&self.browser);
		self.listen(failures, EventKind::Load, move |_| {
			if let Some(browser) = browser.upgrade()
				&& let Err(err) = sync_from_path(browser.as_ref(), &history)
			{
				tracing::warn!(error = %err, "failed to read path");
			}
		});

		let history = self.history.clone();
		let browser = Rc::downgrade(&self.browser);
		let fallback = self.config.popstate_fallback;
		self.listen(failures, EventKind::PopState, move |event| {
			on_popstate(event, &browser, &history, fallback);
		});
	}

	fn listen<F>(&mut self, failures: &mut Vec<BrowserError>, kind: EventKind, f: F)
	where
		F: Fn(&BrowserEvent) + 'static,
	{
		match self.browser.add_listener(kind, Rc::new(f)) {
			Ok(id) => self.listeners.push(id),
			Err(err) => report(failures, "failed to subscribe", err),
		}
	}

	/// Navigates to a new location, adding a history entry.
	pub fn push(&self, options: impl Into<NavigateOptions>) {
		self.navigate(options.into(), NavigationType::Push);
	}

	/// Navigates to a new location, replacing the current history entry.
	pub fn replace(&self, options: impl Into<NavigateOptions>) {
		self.navigate(options.into(), NavigationType::Replace);
	}

	fn navigate(&self, options: NavigateOptions, nav_type: NavigationType) {
		let NavigateOptions { path, params } = options;
		tracing::debug!(path = %path, ?nav_type, "navigate");

		// Observers see the new location before the browser is touched.
		self.history.set_current(path.clone());
		if !self.history.is_current(&path) {
			// An observer navigated elsewhere while being notified.
			tracing::debug!(path = %path, "navigation superseded");
			return;
		}
		self.sync_browser(&path, nav_type);
		self.params.set(params);
	}

	/// Mirrors `path` into the browser for the configured mode.
	pub(crate) fn sync_browser(&self, path: &str, nav_type: NavigationType) {
		let result = match (self.config.mode, nav_type) {
			(Mode::History, NavigationType::Push) => {
				self.browser.push_state(&HistoryState::new(path), path)
			}
			(Mode::History, NavigationType::Replace) => {
				self.browser.replace_state(&HistoryState::new(path), path)
			}
			(Mode::Hash, NavigationType::Push) => self.browser.set_fragment(path),
			(Mode::Hash, NavigationType::Replace) => self.browser.replace_fragment(path),
		};
		if let Err(err) = result {
			tracing::warn!(path = %path, error = %err, "browser navigation failed");
		}
	}

	/// Returns the addressing mode.
	pub fn mode(&self) -> Mode {
		self.config.mode
	}

	/// Returns the configuration the router was built with.
	pub fn config(&self) -> &RouterConfig {
		&self.config
	}

	/// Returns the current location.
	pub fn current(&self) -> Option<String> {
		self.history.current()
	}

	/// Returns the location history.
	pub fn location(&self) -> &LocationHistory {
		&self.history
	}

	/// Returns the parameters of the last `push`/`replace`.
	pub fn params(&self) -> NavigationParams {
		self.params.get()
	}

	/// Returns the params signal.
	pub fn params_signal(&self) -> &Signal<NavigationParams> {
		&self.params
	}

	/// Returns the current location together with the navigation params.
	pub fn route(&self) -> Route {
		Route {
			current: self.current(),
			params: self.params(),
		}
	}

	/// Returns the path→handler table.
	pub fn routes(&self) -> &RouteTable<H> {
		&self.routes
	}

	/// Calls `f` with the new location after each change.
	pub fn on_change<F>(&self, f: F) -> SubscriptionId
	where
		F: Fn(Option<&str>) + 'static,
	{
		self.history.subscribe(f)
	}

	/// Returns the handler registered for `path`.
	pub fn resolve(&self, path: &str) -> Option<&H> {
		self.routes.get(path)
	}

	/// Returns the handler for `path` or [`RouterError::NotFound`].
	pub fn try_resolve(&self, path: &str) -> RouterResult<&H> {
		self.resolve(path)
			.ok_or_else(|| RouterError::NotFound(path.to_string()))
	}

	/// Returns the handler for the current location.
	pub fn resolve_current(&self) -> Option<&H> {
		self.history
			.signal()
			.with(|current| current.as_deref().and_then(|path| self.routes.get(path)))
	}
}

impl<H> Drop for Router<H> {
	fn drop(&mut self) {
		for id in self.listeners.drain(..) {
			self.browser.remove_listener(id);
		}
	}
}

fn report(failures: &mut Vec<BrowserError>, message: &'static str, err: BrowserError) {
	tracing::warn!(error = %err, "{}", message);
	failures.push(err);
}

fn sync_from_fragment(browser: &dyn Browser, history: &LocationHistory) -> Result<(), BrowserError> {
	let fragment = browser.fragment()?;
	history.set_current(normalize_fragment(&fragment));
	Ok(())
}

fn sync_from_path(browser: &dyn Browser, history: &LocationHistory) -> Result<(), BrowserError> {
	let path = browser.pathname()?;
	history.set_current(path);
	Ok(())
}

fn on_popstate(
	event: &BrowserEvent,
	browser: &Weak<dyn Browser>,
	history: &LocationHistory,
	fallback: PopStateFallback,
) {
	let BrowserEvent::PopState(state) = event else {
		return;
	};
	match (state, fallback) {
		(Some(state), _) => {
			history.set_current(state.path.clone());
		}
		(None, PopStateFallback::LivePath) => {
			if let Some(browser) = browser.upgrade()
				&& let Err(err) = sync_from_path(browser.as_ref(), history)
			{
				tracing::warn!(error = %err, "failed to read path");
			}
		}
		(None, PopStateFallback::KeepCurrent) => {
			tracing::debug!("popstate without router state, keeping current location");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::browser::MemoryBrowser;
	use rstest::rstest;

	fn hash_router(url: &str) -> (Rc<MemoryBrowser>, Router<&'static str>) {
		let browser = Rc::new(MemoryBrowser::new(url));
		let router = Router::new(
			RouterOptions::new().route("/", "home").route("/a", "a"),
			browser.clone(),
		);
		(browser, router)
	}

	fn history_router(url: &str) -> (Rc<MemoryBrowser>, Router<&'static str>) {
		let browser = Rc::new(MemoryBrowser::new(url));
		let router = Router::new(
			RouterOptions::new()
				.route("/", "home")
				.route("/a", "a")
				.mode(Mode::History),
			browser.clone(),
		);
		(browser, router)
	}

	#[rstest]
	fn test_hash_init_fixes_empty_fragment() {
		let (browser, router) = hash_router("/");

		assert_eq!(router.current().as_deref(), Some("/"));
		assert_eq!(browser.fragment().unwrap(), "/");
		assert_eq!(browser.history_len(), 1);
	}

	#[rstest]
	fn test_hash_init_reads_existing_fragment() {
		let (browser, router) = hash_router("/#/a");

		assert_eq!(router.current().as_deref(), Some("/a"));
		assert_eq!(browser.api_calls(), 0);
	}

	#[rstest]
	fn test_hash_push_and_replace() {
		let (browser, router) = hash_router("/");

		router.push("/a");
		assert_eq!(browser.history_len(), 2);
		assert_eq!(browser.fragment().unwrap(), "/a");

		router.replace("/b");
		assert_eq!(browser.history_len(), 2);
		assert_eq!(browser.fragment().unwrap(), "/b");
		assert_eq!(router.current().as_deref(), Some("/b"));
	}

	#[rstest]
	fn test_hashchange_updates_current() {
		let (browser, router) = hash_router("/");

		browser.follow_href("#/a");
		assert_eq!(router.current().as_deref(), Some("/"));
		browser.run_pending_events();
		assert_eq!(router.current().as_deref(), Some("/a"));

		browser.back();
		browser.run_pending_events();
		assert_eq!(router.current().as_deref(), Some("/"));
	}

	#[rstest]
	fn test_history_init_moves_legacy_fragment() {
		let (browser, router) = history_router("/#/foo");

		assert_eq!(router.current().as_deref(), Some("/foo"));
		assert_eq!(browser.href().unwrap(), "http://localhost/foo");
		assert_eq!(browser.history_len(), 1);
		assert_eq!(browser.current_entry().state, Some(HistoryState::new("/foo")));
	}

	#[rstest]
	fn test_history_init_seeds_from_path() {
		let (_browser, router) = history_router("/a");
		assert_eq!(router.current().as_deref(), Some("/a"));
	}

	#[rstest]
	fn test_history_push_and_replace() {
		let (browser, router) = history_router("/");

		router.push("/a");
		assert_eq!(browser.history_len(), 2);
		assert_eq!(browser.pathname().unwrap(), "/a");
		assert_eq!(browser.current_entry().state, Some(HistoryState::new("/a")));

		router.replace("/b");
		assert_eq!(browser.history_len(), 2);
		assert_eq!(browser.pathname().unwrap(), "/b");
	}

	#[rstest]
	fn test_popstate_restores_state_path() {
		let (browser, router) = history_router("/");
		router.push("/a");
		router.push("/b");

		browser.back();
		browser.run_pending_events();
		assert_eq!(router.current().as_deref(), Some("/a"));

		browser.forward();
		browser.run_pending_events();
		assert_eq!(router.current().as_deref(), Some("/b"));
	}

	#[rstest]
	#[case(PopStateFallback::LivePath, "/")]
	#[case(PopStateFallback::KeepCurrent, "/a")]
	fn test_popstate_without_state(#[case] fallback: PopStateFallback, #[case] expected: &str) {
		let browser = Rc::new(MemoryBrowser::new("/"));
		let router: Router<()> = Router::new(
			RouterOptions::new()
				.mode(Mode::History)
				.popstate_fallback(fallback),
			browser.clone(),
		);
		router.push("/a");

		// The initial entry was not created by the router.
		browser.back();
		browser.run_pending_events();
		assert_eq!(router.current().as_deref(), Some(expected));
	}

	#[rstest]
	fn test_load_event_syncs_path() {
		let (browser, router) = history_router("/");
		browser.follow_href("/a");
		browser.run_pending_events();
		assert_eq!(router.current().as_deref(), Some("/a"));
	}

	#[rstest]
	fn test_load_event_syncs_fragment() {
		let (browser, router) = hash_router("/");
		browser.run_pending_events();

		browser.overwrite_entry("/#a");
		assert_eq!(browser.pending_events(), 0);
		assert_eq!(router.current().as_deref(), Some("/"));

		browser.fire_load();
		browser.run_pending_events();
		assert_eq!(router.current().as_deref(), Some("/a"));
	}

	#[rstest]
	#[case(Mode::Hash)]
	#[case(Mode::History)]
	fn test_observer_may_redirect(#[case] mode: Mode) {
		let browser = Rc::new(MemoryBrowser::new("/"));
		let router: Rc<Router<&'static str>> = Rc::new(Router::new(
			RouterOptions::new().route("/", "home").mode(mode),
			browser.clone(),
		));
		browser.run_pending_events();
		let initial = browser.history_len();

		let weak = Rc::downgrade(&router);
		router.on_change(move |current| {
			if current == Some("/missing")
				&& let Some(router) = weak.upgrade()
			{
				router.replace(NavigateOptions::new("/").param("from", "/missing"));
			}
		});

		router.push(NavigateOptions::new("/missing").param("x", 1));
		browser.run_pending_events();

		assert_eq!(router.current().as_deref(), Some("/"));
		assert_eq!(router.resolve_current(), Some(&"home"));
		assert_eq!(router.params().get("from"), Some(&Value::from("/missing")));
		assert_eq!(browser.history_len(), initial);
		match mode {
			Mode::Hash => assert_eq!(browser.fragment().unwrap(), "/"),
			Mode::History => assert_eq!(browser.pathname().unwrap(), "/"),
		}
	}

	#[rstest]
	fn test_from_config() {
		let config = RouterConfig::from_toml_str("mode = \"history\"").unwrap();
		let browser = Rc::new(MemoryBrowser::new("/a"));
		let router = Router::from_config(
			config,
			[RouteEntry::new("/", "home"), RouteEntry::new("/a", "a")],
			browser.clone(),
		);

		assert_eq!(router.mode(), Mode::History);
		assert_eq!(router.routes().len(), 2);
		assert_eq!(router.resolve_current(), Some(&"a"));
	}

	/// A browser whose window is gone.
	struct DetachedBrowser;

	impl Browser for DetachedBrowser {
		fn fragment(&self) -> Result<String, BrowserError> {
			Err(BrowserError::Unavailable("window"))
		}

		fn set_fragment(&self, _fragment: &str) -> Result<(), BrowserError> {
			Err(BrowserError::Unavailable("window"))
		}

		fn replace_fragment(&self, _fragment: &str) -> Result<(), BrowserError> {
			Err(BrowserError::Unavailable("window"))
		}

		fn href(&self) -> Result<String, BrowserError> {
			Err(BrowserError::Unavailable("window"))
		}

		fn pathname(&self) -> Result<String, BrowserError> {
			Err(BrowserError::Unavailable("window"))
		}

		fn push_state(&self, _state: &HistoryState, _url: &str) -> Result<(), BrowserError> {
			Err(BrowserError::Unavailable("window"))
		}

		fn replace_state(&self, _state: &HistoryState, _url: &str) -> Result<(), BrowserError> {
			Err(BrowserError::Unavailable("window"))
		}

		fn add_listener(
			&self,
			_kind: EventKind,
			_listener: crate::browser::Listener,
		) -> Result<ListenerId, BrowserError> {
			Err(BrowserError::Unavailable("window"))
		}

		fn remove_listener(&self, _id: ListenerId) {}
	}

	#[rstest]
	#[case(Mode::Hash)]
	#[case(Mode::History)]
	fn test_try_new_surfaces_browser_errors(#[case] mode: Mode) {
		let result: RouterResult<Router<()>> =
			Router::try_new(RouterOptions::new().mode(mode), Rc::new(DetachedBrowser));

		assert!(matches!(
			result,
			Err(RouterError::Browser(BrowserError::Unavailable("window")))
		));
	}

	#[rstest]
	fn test_new_tolerates_browser_errors() {
		let router: Router<()> = Router::new(
			RouterOptions::new().mode(Mode::History),
			Rc::new(DetachedBrowser),
		);
		assert_eq!(router.current(), None);

		router.push("/a");
		assert_eq!(router.current().as_deref(), Some("/a"));
	}

	#[rstest]
	fn test_try_new_with_working_browser() {
		let browser = Rc::new(MemoryBrowser::new("/#/a"));
		let router = Router::try_new(
			RouterOptions::new().route("/a", "a"),
			browser.clone(),
		)
		.unwrap();

		assert_eq!(router.resolve_current(), Some(&"a"));
		assert_eq!(browser.listener_count(), 2);
	}

	#[rstest]
	fn test_params_overwritten_per_navigation() {
		let (_browser, router) = hash_router("/");

		router.push(NavigateOptions::new("/a").param("x", 1));
		assert_eq!(router.params().get("x"), Some(&Value::from(1)));

		router.replace("/");
		assert!(router.params().is_empty());
	}

	#[rstest]
	fn test_resolution() {
		let (_browser, router) = hash_router("/");

		assert_eq!(router.resolve_current(), Some(&"home"));
		router.push("/missing");
		assert_eq!(router.resolve_current(), None);
		assert!(matches!(
			router.try_resolve("/missing"),
			Err(RouterError::NotFound(ref p)) if p == "/missing"
		));
	}

	#[rstest]
	fn test_drop_removes_listeners() {
		let (browser, router) = history_router("/");
		assert_eq!(browser.listener_count(), 2);
		drop(router);
		assert_eq!(browser.listener_count(), 0);
	}

	#[rstest]
	fn test_route_snapshot() {
		let (_browser, router) = hash_router("/");
		router.push(NavigateOptions::new("/a").param("tab", "info"));

		let route = router.route();
		assert_eq!(route.current.as_deref(), Some("/a"));
		assert_eq!(route.params.get("tab"), Some(&Value::from("info")));
	}
}
