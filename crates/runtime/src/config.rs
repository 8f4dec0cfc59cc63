//! Session configuration resolved from the process environment.
//!
//! All environment input is read in one place: [`Config::from_env`] snapshots
//! the variables and hands them to the pure [`Config::from_vars`]. Nothing
//! else in the workspace touches `std::env`, which keeps launch and session
//! logic testable without mutating the test runner's own environment.

use std::collections::HashMap;
use std::time::Duration;

/// Endpoint host used when `TELENIUM_HOST` is unset.
const DEFAULT_HOST: &str = "localhost";
/// Endpoint port used when `TELENIUM_PORT` is unset.
const DEFAULT_PORT: &str = "9901";
/// Activity class started when `TELENIUM_ANDROID_ENTRY` is unset.
const DEFAULT_ANDROID_ENTRY: &str = "org.kivy.android.PythonActivity";

/// Variable injected into the application environment carrying the
/// correlation token. Written by the session, never read back here.
pub const TOKEN_VAR: &str = "TELENIUM_TOKEN";

/// How the application under test is brought up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
	/// Spawn the launch command directly on this machine.
	Desktop,
	/// Start an activity on a connected device through adb.
	Android(AndroidTarget),
}

/// Android launch coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidTarget {
	/// Application package, e.g. `com.example.app`. Launching fails without it.
	pub package: Option<String>,
	/// Activity class handed to `am start`.
	pub entry: String,
}

/// Resolved configuration for one session.
#[derive(Debug, Clone)]
pub struct Config {
	/// JSON-RPC endpoint of the instrumented application.
	pub url: String,
	/// Deadline for the endpoint to come up after launch.
	pub process_start_timeout: Duration,
	/// Per-request timeout on the JSON-RPC client.
	pub request_timeout: Duration,
	/// Environment overrides handed to the application on top of the
	/// inherited environment.
	pub cmd_env: HashMap<String, String>,
	/// Entrypoint appended to `cmd_process`.
	pub cmd_entrypoint: Vec<String>,
	/// Interpreter invocation the entrypoint is appended to.
	pub cmd_process: Vec<String>,
	/// Desktop or Android bring-up, selected once at resolution.
	pub target: LaunchTarget,
	/// Bound on the teardown wait. `None` blocks until the process exits;
	/// `Some` adds a forced kill once the bound expires.
	pub shutdown_timeout: Option<Duration>,
}

impl Config {
	/// Resolves a configuration from the current process environment.
	pub fn from_env() -> Self {
		Self::from_vars(&std::env::vars().collect())
	}

	/// Resolves a configuration from a captured set of variables.
	pub fn from_vars(vars: &HashMap<String, String>) -> Self {
		let host = vars
			.get("TELENIUM_HOST")
			.map(String::as_str)
			.unwrap_or(DEFAULT_HOST);
		let port = vars
			.get("TELENIUM_PORT")
			.map(String::as_str)
			.unwrap_or(DEFAULT_PORT);

		let target = if vars.get("TELENIUM_TARGET").map(String::as_str) == Some("android") {
			LaunchTarget::Android(AndroidTarget {
				package: vars.get("TELENIUM_ANDROID_PACKAGE").cloned(),
				entry: vars
					.get("TELENIUM_ANDROID_ENTRY")
					.cloned()
					.unwrap_or_else(|| DEFAULT_ANDROID_ENTRY.to_string()),
			})
		} else {
			LaunchTarget::Desktop
		};

		Config {
			url: format!("http://{host}:{port}/jsonrpc"),
			process_start_timeout: Duration::from_secs(5),
			request_timeout: Duration::from_secs(5),
			cmd_env: HashMap::new(),
			cmd_entrypoint: vec!["main.py".to_string()],
			cmd_process: vec![
				"python".to_string(),
				"-m".to_string(),
				"telenium.execute".to_string(),
			],
			target,
			shutdown_timeout: None,
		}
	}

	/// Full launch command for the desktop path: process prefix plus entrypoint.
	pub fn command(&self) -> Vec<String> {
		let mut cmd = self.cmd_process.clone();
		cmd.extend(self.cmd_entrypoint.iter().cloned());
		cmd
	}
}
