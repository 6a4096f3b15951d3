//! Router Components for navigation.
//!
//! This module provides the [`Link`] navigation-intercept element and the
//! [`RouterOutlet`] used by the rendering layer to resolve the current
//! location to a handler.

use super::core::{NavigationType, Router};
use crate::config::Mode;

/// Rendered element kind of a [`Link`].
///
/// The kind decides whether the browser can perform fragment navigation on
/// its own: anchors follow their `href` natively, other elements cannot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkElement {
	/// An `<a>` element.
	#[default]
	Anchor,
	/// Any other element, by tag name.
	Element(String),
}

impl LinkElement {
	/// Creates the element kind for a tag name.
	pub fn from_tag(tag: &str) -> Self {
		if tag.eq_ignore_ascii_case("a") {
			Self::Anchor
		} else {
			Self::Element(tag.to_ascii_lowercase())
		}
	}

	/// Returns the tag name.
	pub fn tag(&self) -> &str {
		match self {
			Self::Anchor => "a",
			Self::Element(tag) => tag,
		}
	}

	/// Returns whether this is an anchor.
	pub fn is_anchor(&self) -> bool {
		matches!(self, Self::Anchor)
	}

	/// Performs the browser side of a link navigation to `path`.
	///
	/// In hash mode an anchor leaves the fragment to the browser's native
	/// link following. Everything else is written explicitly.
	fn navigate<H>(&self, router: &Router<H>, path: &str) -> ClickOutcome {
		match (self, router.mode()) {
			(Self::Anchor, Mode::Hash) => ClickOutcome::Native,
			(Self::Element(_), Mode::Hash) | (_, Mode::History) => {
				router.sync_browser(path, NavigationType::Push);
				ClickOutcome::Navigated
			}
		}
	}
}

/// A click delivered to a [`Link`].
///
/// Mirrors the parts of a DOM `MouseEvent` the intercept protocol reads,
/// and records whether the default action was prevented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
	/// Mouse button, `0` for the primary button.
	pub button: i16,
	/// Ctrl key held.
	pub ctrl_key: bool,
	/// Meta (command) key held.
	pub meta_key: bool,
	/// Shift key held.
	pub shift_key: bool,
	/// Alt key held.
	pub alt_key: bool,
	default_prevented: bool,
}

impl ClickEvent {
	/// A plain primary-button click.
	pub fn new() -> Self {
		Self::default()
	}

	/// Suppresses the browser's default action.
	pub fn prevent_default(&mut self) {
		self.default_prevented = true;
	}

	/// Returns whether the default action was suppressed.
	pub fn default_prevented(&self) -> bool {
		self.default_prevented
	}

	/// Returns whether the user asked for something other than a plain
	/// in-place navigation (new tab, new window, download).
	pub fn is_modified(&self) -> bool {
		self.button != 0 || self.ctrl_key || self.meta_key || self.shift_key || self.alt_key
	}
}

/// What a click on a [`Link`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
	/// The link already points at the current location. Nothing changed.
	Unchanged,
	/// `current` was updated and the browser is left to follow the anchor.
	Native,
	/// `current` was updated and the router wrote the browser location.
	Navigated,
	/// A modified click on an anchor; left entirely to the browser.
	Ignored,
}

/// A link component that navigates without full page reload.
///
/// # Example
///
/// ```
/// use reinhardt_spa_router::config::Mode;
/// use reinhardt_spa_router::router::Link;
///
/// let link = Link::new("/users", "Users");
/// assert_eq!(link.href(Mode::Hash).as_deref(), Some("#/users"));
/// assert_eq!(link.href(Mode::History).as_deref(), Some("/users"));
///
/// let button = Link::new("/users", "Users").tag("button");
/// assert_eq!(button.href(Mode::Hash), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
	to: String,
	content: String,
	element: LinkElement,
}

impl Link {
	/// Creates a new anchor link.
	pub fn new(to: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			to: to.into(),
			content: content.into(),
			element: LinkElement::Anchor,
		}
	}

	/// Renders the link as a different element.
	pub fn tag(mut self, tag: &str) -> Self {
		self.element = LinkElement::from_tag(tag);
		self
	}

	/// Returns the destination path.
	pub fn to(&self) -> &str {
		&self.to
	}

	/// Returns the content.
	pub fn content(&self) -> &str {
		&self.content
	}

	/// Returns the rendered element kind.
	pub fn element(&self) -> &LinkElement {
		&self.element
	}

	/// The `href` attribute for `mode`. Only anchors carry one.
	pub fn href(&self, mode: Mode) -> Option<String> {
		if !self.element.is_anchor() {
			return None;
		}
		Some(match mode {
			Mode::Hash => format!("#{}", self.to),
			Mode::History => self.to.clone(),
		})
	}

	/// Attributes of the rendered element, in order.
	pub fn attributes(&self, mode: Mode) -> Vec<(&'static str, String)> {
		let mut attrs = Vec::with_capacity(2);
		if let Some(href) = self.href(mode) {
			attrs.push(("href", href));
		}
		attrs.push(("style", "cursor: pointer".to_string()));
		attrs
	}

	/// Renders the element markup.
	pub fn render_to_string(&self, mode: Mode) -> String {
		let tag = self.element.tag();
		let mut html = format!("<{}", tag);
		for (name, value) in self.attributes(mode) {
			html.push_str(&format!(" {}=\"{}\"", name, escape(&value)));
		}
		html.push('>');
		html.push_str(&escape(&self.content));
		html.push_str(&format!("</{}>", tag));
		html
	}

	/// Handles a click on the rendered element.
	///
	/// Re-clicking the active link is suppressed without side effects.
	/// Otherwise the current location is updated first and the browser is
	/// written according to the element kind; the default action is
	/// prevented unless the browser's own anchor navigation is relied upon.
	pub fn on_click<H>(&self, router: &Router<H>, event: &mut ClickEvent) -> ClickOutcome {
		if self.element.is_anchor() && event.is_modified() {
			return ClickOutcome::Ignored;
		}
		if router.location().is_current(&self.to) {
			event.prevent_default();
			return ClickOutcome::Unchanged;
		}

		tracing::debug!(to = %self.to, tag = self.element.tag(), "link navigation");
		router.location().set_current(self.to.clone());
		if !router.location().is_current(&self.to) {
			// An observer already navigated elsewhere; keep the browser off `to`.
			tracing::debug!(to = %self.to, "link navigation superseded");
			event.prevent_default();
			return ClickOutcome::Navigated;
		}

		let outcome = self.element.navigate(router, &self.to);
		if outcome == ClickOutcome::Navigated {
			event.prevent_default();
		}
		outcome
	}
}

fn escape(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			_ => out.push(c),
		}
	}
	out
}

/// A component that renders the handler matched by the current location.
///
/// Place this where route content should appear. An optional fallback is
/// used when no handler is registered for the current location.
#[derive(Debug, Clone, Default)]
pub struct RouterOutlet<H> {
	fallback: Option<H>,
}

impl<H> RouterOutlet<H> {
	/// Creates an outlet without fallback.
	pub fn new() -> Self {
		Self { fallback: None }
	}

	/// Sets the handler used when nothing matches.
	pub fn fallback(mut self, handler: H) -> Self {
		self.fallback = Some(handler);
		self
	}

	/// Resolves the handler to render for the router's current location.
	pub fn resolve<'a>(&'a self, router: &'a Router<H>) -> Option<&'a H> {
		router.resolve_current().or(self.fallback.as_ref())
	}

	/// Calls `render` with the resolved handler.
	pub fn render<R>(&self, router: &Router<H>, render: impl FnOnce(&H) -> R) -> Option<R> {
		self.resolve(router).map(render)
	}
}
