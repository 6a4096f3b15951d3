//! Router configuration.
//!
//! The addressing [`Mode`] and the popstate fallback policy can be supplied
//! in code or loaded from TOML:
//!
//! ```
//! use reinhardt_spa_router::config::{Mode, PopStateFallback, RouterConfig};
//!
//! let config = RouterConfig::from_toml_str(r#"
//! mode = "history"
//! popstate_fallback = "keep_current"
//! "#).unwrap();
//!
//! assert_eq!(config.mode, Mode::History);
//! assert_eq!(config.popstate_fallback, PopStateFallback::KeepCurrent);
//! ```

use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which part of the URL is authoritative for the current location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	/// Location lives in the fragment (`/index.html#/users`).
	#[default]
	Hash,
	/// Location lives in the path, driven by the session-history API.
	History,
}

impl Mode {
	/// Returns the configuration name of the mode.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Hash => "hash",
			Self::History => "history",
		}
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Mode {
	type Err = RouterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"hash" => Ok(Self::Hash),
			"history" => Ok(Self::History),
			other => Err(RouterError::UnknownMode(other.to_string())),
		}
	}
}

/// What to do on a back/forward navigation whose history entry carries no
/// router state (an entry the router did not create).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopStateFallback {
	/// Read the live path from the address bar.
	#[default]
	LivePath,
	/// Leave the current location untouched.
	KeepCurrent,
}

/// Declarative router settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
	/// Addressing mode.
	pub mode: Mode,
	/// Popstate handling for entries without router state.
	pub popstate_fallback: PopStateFallback,
}

impl RouterConfig {
	/// Creates a configuration for the given mode with default settings.
	pub fn new(mode: Mode) -> Self {
		Self {
			mode,
			..Self::default()
		}
	}

	/// Sets the popstate fallback policy.
	pub fn with_popstate_fallback(mut self, fallback: PopStateFallback) -> Self {
		self.popstate_fallback = fallback;
		self
	}

	/// Parses a configuration from TOML.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Config`] for malformed input, including an
	/// unrecognized `mode` value.
	pub fn from_toml_str(input: &str) -> RouterResult<Self> {
		Ok(toml::from_str(input)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("hash", Mode::Hash)]
	#[case("history", Mode::History)]
	fn test_mode_from_str(#[case] input: &str, #[case] expected: Mode) {
		assert_eq!(input.parse::<Mode>().unwrap(), expected);
		assert_eq!(expected.to_string(), input);
	}

	#[rstest]
	fn test_unknown_mode_is_rejected() {
		let err = "abstract".parse::<Mode>().unwrap_err();
		assert!(matches!(err, RouterError::UnknownMode(ref m) if m == "abstract"));

		let err = RouterConfig::from_toml_str("mode = \"abstract\"").unwrap_err();
		assert!(matches!(err, RouterError::Config(_)));
	}

	#[rstest]
	fn test_defaults() {
		let config = RouterConfig::from_toml_str("").unwrap();
		assert_eq!(config.mode, Mode::Hash);
		assert_eq!(config.popstate_fallback, PopStateFallback::LivePath);
	}

	#[rstest]
	fn test_builder() {
		let config =
			RouterConfig::new(Mode::History).with_popstate_fallback(PopStateFallback::KeepCurrent);
		assert_eq!(config.mode, Mode::History);
		assert_eq!(config.popstate_fallback, PopStateFallback::KeepCurrent);
	}
}
