//! Scripted doubles shared by the session integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use telenium::{AppProcess, Config, Launcher, RemoteControl, Session};
use telenium_runtime::{Error, Result};

/// Call log shared between a fake remote and a fake launcher, plus the
/// correlation token the launcher observed in its environment overlay.
#[derive(Default)]
pub struct Recorder {
	calls: Mutex<Vec<String>>,
	token: Mutex<Option<String>>,
}

impl Recorder {
	pub fn record(&self, call: impl Into<String>) {
		self.calls.lock().unwrap().push(call.into());
	}

	pub fn record_token(&self, token: Option<String>) {
		*self.token.lock().unwrap() = token;
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().clone()
	}

	pub fn call_count(&self, name: &str) -> usize {
		self.calls
			.lock()
			.unwrap()
			.iter()
			.filter(|call| call.as_str() == name || call.starts_with(&format!("{name} ")))
			.count()
	}

	pub fn launched_token(&self) -> Option<String> {
		self.token.lock().unwrap().clone()
	}
}

fn unreachable_error() -> Error {
	Error::Io(std::io::Error::new(
		std::io::ErrorKind::ConnectionRefused,
		"connection refused",
	))
}

/// Scripted [`RemoteControl`] endpoint.
///
/// By default it behaves like a freshly launched, healthy instance: no
/// previous instance answers the quit request, pings succeed, the reported
/// token echoes whatever the launcher was handed, waits succeed, and selects
/// match nothing.
pub struct FakeRemote {
	pub recorder: Arc<Recorder>,
	/// Leading pings that fail; `usize::MAX` keeps failing forever.
	pub failing_pings: AtomicUsize,
	/// Leading selects that fail with a transport error.
	pub failing_selects: AtomicUsize,
	/// Token to report instead of echoing the launched one.
	pub reported_token: Mutex<Option<String>>,
	/// Whether quit requests fail, as they do when nothing is running.
	pub quit_fails: bool,
	/// Result of every remote `wait` call.
	pub wait_result: bool,
	/// Scripted results for leading `select` calls, then `select_default`.
	pub select_script: Mutex<VecDeque<Vec<Value>>>,
	pub select_default: Vec<Value>,
}

impl FakeRemote {
	pub fn ready(recorder: Arc<Recorder>) -> Self {
		FakeRemote {
			recorder,
			failing_pings: AtomicUsize::new(0),
			failing_selects: AtomicUsize::new(0),
			reported_token: Mutex::new(None),
			quit_fails: true,
			wait_result: true,
			select_script: Mutex::new(VecDeque::new()),
			select_default: Vec::new(),
		}
	}

	fn take_failure(counter: &AtomicUsize) -> bool {
		let remaining = counter.load(Ordering::SeqCst);
		if remaining == 0 {
			return false;
		}
		if remaining != usize::MAX {
			counter.fetch_sub(1, Ordering::SeqCst);
		}
		true
	}
}

#[async_trait]
impl RemoteControl for FakeRemote {
	async fn ping(&self) -> Result<()> {
		self.recorder.record("ping");
		if Self::take_failure(&self.failing_pings) {
			return Err(unreachable_error());
		}
		Ok(())
	}

	async fn token(&self) -> Result<String> {
		self.recorder.record("get_token");
		if let Some(token) = self.reported_token.lock().unwrap().clone() {
			return Ok(token);
		}
		Ok(self.recorder.launched_token().unwrap_or_default())
	}

	async fn app_quit(&self) -> Result<()> {
		self.recorder.record("app_quit");
		if self.quit_fails {
			return Err(unreachable_error());
		}
		Ok(())
	}

	async fn wait(&self, selector: &str, timeout: f64) -> Result<bool> {
		self.recorder.record(format!("wait {selector} {timeout}"));
		Ok(self.wait_result)
	}

	async fn select(&self, selector: &str) -> Result<Vec<Value>> {
		self.recorder.record(format!("select {selector}"));
		if Self::take_failure(&self.failing_selects) {
			return Err(unreachable_error());
		}
		let scripted = self.select_script.lock().unwrap().pop_front();
		Ok(scripted.unwrap_or_else(|| self.select_default.clone()))
	}
}

/// Launcher double that records the overlay it was handed and spawns a
/// trivial real process so the session has something to reap.
pub struct FakeLauncher {
	pub recorder: Arc<Recorder>,
	pub command: Vec<String>,
}

impl FakeLauncher {
	pub fn exits_immediately(recorder: Arc<Recorder>) -> Self {
		FakeLauncher {
			recorder,
			command: shell(&["sh", "-c", "exit 0"]),
		}
	}

	pub fn hangs(recorder: Arc<Recorder>) -> Self {
		FakeLauncher {
			recorder,
			command: shell(&["sh", "-c", "sleep 600"]),
		}
	}
}

fn shell(parts: &[&str]) -> Vec<String> {
	parts.iter().map(|part| part.to_string()).collect()
}

#[async_trait]
impl Launcher for FakeLauncher {
	async fn launch(&self, overlay: &HashMap<String, String>) -> Result<AppProcess> {
		self.recorder.record("launch");
		self.recorder
			.record_token(overlay.get("TELENIUM_TOKEN").cloned());
		let (program, args) = self.command.split_first().expect("fake launch command");
		let child = tokio::process::Command::new(program).args(args).spawn()?;
		Ok(AppProcess::new(child))
	}
}

/// Configuration with defaults only, never read from the real environment.
pub fn test_config() -> Config {
	Config::from_vars(&HashMap::new())
}

/// Opens a session over the given fake endpoint and a trivially exiting
/// fake process.
pub async fn open_session(remote: FakeRemote, recorder: Arc<Recorder>) -> Session {
	let launcher = FakeLauncher::exits_immediately(recorder);
	Session::open_with(test_config(), Box::new(remote), &launcher)
		.await
		.expect("session opens against a ready fake endpoint")
}
