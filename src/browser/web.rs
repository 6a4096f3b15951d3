//! `web-sys` backed browser for wasm32 targets.

use super::{Browser, BrowserEvent, EventKind, HistoryState, Listener, ListenerId};
use crate::error::BrowserError;
use crate::router::{ClickEvent, Link, Router};
use js_sys::{Object, Reflect};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, History, Location, MouseEvent, PopStateEvent, Window};

type EventClosure = Closure<dyn FnMut(web_sys::Event)>;

fn js_error(value: JsValue) -> BrowserError {
	BrowserError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn state_to_js(state: &HistoryState) -> Result<JsValue, BrowserError> {
	let object = Object::new();
	Reflect::set(
		&object,
		&JsValue::from_str("path"),
		&JsValue::from_str(&state.path),
	)
	.map_err(js_error)?;
	Ok(object.into())
}

fn state_from_js(value: &JsValue) -> Option<HistoryState> {
	if value.is_null() || value.is_undefined() {
		return None;
	}
	Reflect::get(value, &JsValue::from_str("path"))
		.ok()?
		.as_string()
		.map(HistoryState::new)
}

/// The page's `window`, exposed as a [`Browser`].
pub struct WebBrowser {
	window: Window,
	listeners: RefCell<Vec<(ListenerId, EventKind, EventClosure)>>,
	next_id: Cell<u64>,
}

impl std::fmt::Debug for WebBrowser {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("WebBrowser")
			.field("listeners", &self.listeners.borrow().len())
			.finish()
	}
}

impl WebBrowser {
	/// Binds to the global `window`.
	///
	/// # Errors
	///
	/// Returns [`BrowserError::Unavailable`] outside a window context.
	pub fn new() -> Result<Self, BrowserError> {
		let window = web_sys::window().ok_or(BrowserError::Unavailable("window"))?;
		Ok(Self {
			window,
			listeners: RefCell::new(Vec::new()),
			next_id: Cell::new(0),
		})
	}

	fn location(&self) -> Location {
		self.window.location()
	}

	fn history(&self) -> Result<History, BrowserError> {
		self.window.history().map_err(js_error)
	}
}

impl Browser for WebBrowser {
	fn fragment(&self) -> Result<String, BrowserError> {
		let hash = self.location().hash().map_err(js_error)?;
		Ok(hash.strip_prefix('#').unwrap_or(&hash).to_string())
	}

	fn set_fragment(&self, fragment: &str) -> Result<(), BrowserError> {
		self.location().set_hash(fragment).map_err(js_error)
	}

	fn replace_fragment(&self, fragment: &str) -> Result<(), BrowserError> {
		self.location()
			.replace(&format!("#{}", fragment))
			.map_err(js_error)
	}

	fn href(&self) -> Result<String, BrowserError> {
		self.location().href().map_err(js_error)
	}

	fn pathname(&self) -> Result<String, BrowserError> {
		self.location().pathname().map_err(js_error)
	}

	fn push_state(&self, state: &HistoryState, url: &str) -> Result<(), BrowserError> {
		self.history()?
			.push_state_with_url(&state_to_js(state)?, "", Some(url))
			.map_err(js_error)
	}

	fn replace_state(&self, state: &HistoryState, url: &str) -> Result<(), BrowserError> {
		self.history()?
			.replace_state_with_url(&state_to_js(state)?, "", Some(url))
			.map_err(js_error)
	}

	fn add_listener(&self, kind: EventKind, listener: Listener) -> Result<ListenerId, BrowserError> {
		let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
			move |event: web_sys::Event| {
				let event = match kind {
					EventKind::HashChange => BrowserEvent::HashChange,
					EventKind::Load => BrowserEvent::Load,
					EventKind::PopState => BrowserEvent::PopState(
						event
							.dyn_ref::<PopStateEvent>()
							.and_then(|e| state_from_js(&e.state())),
					),
				};
				listener(&event);
			},
		));
		self.window
			.add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())
			.map_err(js_error)?;

		let id = ListenerId(self.next_id.get());
		self.next_id.set(id.0 + 1);
		self.listeners.borrow_mut().push((id, kind, callback));
		Ok(id)
	}

	fn remove_listener(&self, id: ListenerId) {
		let mut listeners = self.listeners.borrow_mut();
		let Some(position) = listeners.iter().position(|(listener_id, _, _)| *listener_id == id)
		else {
			return;
		};
		let (_, kind, callback) = listeners.remove(position);
		if let Err(err) = self
			.window
			.remove_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())
		{
			tracing::warn!(event = kind.as_str(), error = %js_error(err), "failed to remove listener");
		}
	}
}

impl Drop for WebBrowser {
	fn drop(&mut self) {
		for (_, kind, callback) in self.listeners.get_mut().drain(..) {
			if let Err(err) = self
				.window
				.remove_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())
			{
				tracing::warn!(event = kind.as_str(), error = %js_error(err), "failed to remove listener");
			}
		}
	}
}

/// Attaches `link`'s click handler to a rendered `element`.
///
/// Sets the `href` (anchors only) and cursor style, and returns the closure
/// backing the listener. Keep it alive for as long as the element is in the
/// document, or call `forget()` on it.
///
/// # Errors
///
/// Returns [`BrowserError::Js`] when the element rejects an attribute or the
/// listener.
pub fn bind_link<H: 'static>(
	element: &Element,
	link: Link,
	router: Rc<Router<H>>,
) -> Result<EventClosure, BrowserError> {
	let mode = router.mode();
	for (name, value) in link.attributes(mode) {
		element.set_attribute(name, &value).map_err(js_error)?;
	}

	let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(
		move |event: web_sys::Event| {
			let mut click = ClickEvent::new();
			if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
				click.button = mouse.button();
				click.ctrl_key = mouse.ctrl_key();
				click.meta_key = mouse.meta_key();
				click.shift_key = mouse.shift_key();
				click.alt_key = mouse.alt_key();
			}
			link.on_click(&router, &mut click);
			if click.default_prevented() {
				event.prevent_default();
			}
		},
	));
	element
		.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
		.map_err(js_error)?;
	Ok(callback)
}
