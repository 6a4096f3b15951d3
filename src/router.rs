//! Client-side routing.
//!
//! - [`Router`]: owns the route table and the [`LocationHistory`], keeps the
//!   current location in sync with the browser in hash or history mode.
//! - [`Link`]: navigation-intercept element.
//! - [`RouterOutlet`]: resolves the current location to a handler.

mod components;
mod core;
mod history;
mod route;

pub use self::components::{ClickEvent, ClickOutcome, Link, LinkElement, RouterOutlet};
pub use self::core::{NavigateOptions, NavigationParams, NavigationType, Route, Router, RouterOptions};
pub use self::history::LocationHistory;
pub use self::route::{RouteEntry, RouteTable};
