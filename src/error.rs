//! Error types for client-side routing.

/// Error raised by a [`Browser`](crate::browser::Browser) backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrowserError {
	/// A browser object (window, location, history) is not reachable.
	#[error("browser API unavailable: {0}")]
	Unavailable(&'static str),
	/// A browser call threw a JavaScript exception.
	#[error("browser call failed: {0}")]
	Js(String),
}

/// Error type for router operations.
///
/// Navigation itself (`push`, `replace`, link clicks) never returns an error.
/// These variants surface at configuration time and at explicit resolution.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
	/// The configured addressing mode is not `hash` or `history`.
	#[error("Unknown router mode: {0}")]
	UnknownMode(String),
	/// No handler is registered for the path.
	#[error("Route not found: {0}")]
	NotFound(String),
	/// The router configuration could not be parsed.
	#[error("Invalid router configuration: {0}")]
	Config(#[from] toml::de::Error),
	/// A browser backend call failed.
	#[error(transparent)]
	Browser(#[from] BrowserError),
}

/// Result alias for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_router_error_display() {
		assert_eq!(
			RouterError::NotFound("/missing".to_string()).to_string(),
			"Route not found: /missing"
		);
		assert_eq!(
			RouterError::UnknownMode("abstract".to_string()).to_string(),
			"Unknown router mode: abstract"
		);
	}

	#[rstest]
	fn test_browser_error_is_transparent() {
		let err: RouterError = BrowserError::Unavailable("window").into();
		assert_eq!(err.to_string(), "browser API unavailable: window");
	}
}
