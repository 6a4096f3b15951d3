//! # Reinhardt SPA Router
//!
//! A minimal client-side router that keeps an application's current location
//! in sync with the browser's address bar.
//!
//! ## Features
//!
//! - **Two addressing modes**: fragment based (`hash`, `/index.html#/users`)
//!   and path based (`history`, driven by the session-history API)
//! - **Observable location**: the current location lives in a [`Signal`]
//!   that the rendering layer reads and subscribes to
//! - **Navigation intercept**: [`Link`] elements update the location on
//!   click without a page reload, while anchors keep their native
//!   open-in-new-tab behaviour
//! - **Injected browser**: all browser access goes through the
//!   [`Browser`](browser::Browser) trait, with an in-memory implementation
//!   for tests and native hosts and a `web-sys` implementation on wasm32
//!
//! ## Architecture
//!
//! - [`router`]: [`Router`], [`LocationHistory`], route table, components
//! - [`browser`]: browser capability and its implementations
//! - [`reactive`]: [`Signal`], the observable value
//! - [`config`]: [`Mode`] and [`RouterConfig`]
//! - [`error`]: error types
//!
//! ## Example
//!
//! ```
//! use reinhardt_spa_router::browser::MemoryBrowser;
//! use reinhardt_spa_router::{ClickEvent, Link, Mode, NavigateOptions, Router, RouterOptions};
//! use std::rc::Rc;
//!
//! let browser = Rc::new(MemoryBrowser::new("/"));
//! let router = Router::new(
//! 	RouterOptions::new()
//! 		.route("/", "home")
//! 		.route("/users", "users")
//! 		.mode(Mode::History),
//! 	browser.clone(),
//! );
//!
//! let link = Link::new("/users", "Users");
//! let mut click = ClickEvent::new();
//! link.on_click(&router, &mut click);
//!
//! assert!(click.default_prevented());
//! assert_eq!(router.resolve_current(), Some(&"users"));
//! assert_eq!(browser.history_len(), 2);
//!
//! router.replace(NavigateOptions::new("/").param("from", "users"));
//! assert_eq!(browser.history_len(), 2);
//! ```

#![warn(missing_docs)]

pub mod browser;
pub mod config;
pub mod error;
pub mod reactive;
pub mod router;

pub use config::{Mode, PopStateFallback, RouterConfig};
pub use error::{BrowserError, RouterError, RouterResult};
pub use reactive::Signal;
pub use router::{
	ClickEvent, ClickOutcome, Link, LinkElement, LocationHistory, NavigateOptions, NavigationParams,
	Route, RouteEntry, RouteTable, Router, RouterOptions, RouterOutlet,
};
