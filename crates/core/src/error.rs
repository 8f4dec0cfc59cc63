//! Error types surfaced to test bodies.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures a session or one of its assertions can report.
#[derive(Debug, Error)]
pub enum Error {
	/// The remote wait ended without the selector ever matching.
	#[error("selector {selector:?} did not match any element")]
	Exists { selector: String },

	/// The selector matched while the test required it to be absent.
	#[error("selector {selector:?} matched elements that must be absent")]
	NotExists { selector: String },

	/// The selector was still matching when the absence deadline expired.
	#[error("selector {selector:?} still matched after {timeout}s")]
	NotExistsTimeout { selector: String, timeout: f64 },

	/// Launch, startup, or transport failure from the runtime layer.
	#[error(transparent)]
	Runtime(#[from] telenium_runtime::Error),
}

impl Error {
	/// Returns true if this is an assertion outcome rather than a
	/// runtime/transport failure.
	pub fn is_assertion(&self) -> bool {
		!matches!(self, Error::Runtime(_))
	}
}
