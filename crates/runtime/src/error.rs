//! Error types for the telenium runtime.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while launching or talking to an application.
#[derive(Debug, Error)]
pub enum Error {
	/// The remote endpoint never answered a liveness check before the
	/// configured deadline.
	#[error("timed out after {}s waiting for the endpoint at {url}", timeout.as_secs_f64())]
	StartupTimeout { url: String, timeout: Duration },

	/// The endpoint answered but carries a foreign correlation token, so it
	/// is not the instance this session launched.
	#[error("endpoint at {url} reported token {actual}, expected {expected}")]
	TokenMismatch {
		url: String,
		expected: String,
		actual: String,
	},

	/// Failed to launch the application process.
	#[error("failed to launch application: {0}")]
	Launch(String),

	/// Transport or protocol failure from the JSON-RPC client.
	#[error(transparent)]
	Rpc(#[from] jsonrpsee::core::ClientError),

	/// I/O error.
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if this is the startup deadline expiring.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::StartupTimeout { .. })
	}

	/// Returns true if the connected instance failed token verification.
	pub fn is_token_mismatch(&self) -> bool {
		matches!(self, Error::TokenMismatch { .. })
	}
}
