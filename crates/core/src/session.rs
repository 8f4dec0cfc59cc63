//! Session lifecycle around one launched application instance.

use std::collections::HashMap;
use std::time::Duration;

use telenium_runtime::client::{HttpRemote, RemoteControl};
use telenium_runtime::config::{Config, TOKEN_VAR};
use telenium_runtime::launcher::{AppProcess, Launcher, launcher_for};
use tokio::time::{Instant, sleep};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Grace period for a previously running instance to exit after a quit request.
const QUIT_GRACE: Duration = Duration::from_secs(2);
/// Poll interval while waiting for the endpoint to come up.
const STARTUP_POLL: Duration = Duration::from_secs(1);
/// Poll interval while waiting for a selector to disappear.
const ABSENCE_POLL: Duration = Duration::from_millis(100);

/// One launched, token-verified application instance under control.
///
/// Opening a session spawns the application, waits for its endpoint, and
/// verifies the correlation token; closing it requests a remote quit and
/// reaps the process. The assertion helpers poll the same endpoint and are
/// meant to be called from test bodies between the two.
pub struct Session {
	config: Config,
	remote: Box<dyn RemoteControl>,
	process: AppProcess,
	token: String,
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("config", &self.config)
			.field("process", &self.process)
			.field("token", &self.token)
			.finish_non_exhaustive()
	}
}

impl Session {
	/// Launches the configured application and blocks until its endpoint is
	/// reachable and carries this session's correlation token.
	pub async fn open(config: Config) -> Result<Self> {
		let remote = HttpRemote::connect(&config.url, config.request_timeout)?;
		let launcher = launcher_for(&config);
		Self::open_with(config, Box::new(remote), launcher.as_ref()).await
	}

	/// [`Session::open`] over a caller-supplied transport and launch strategy.
	pub async fn open_with(
		config: Config,
		remote: Box<dyn RemoteControl>,
		launcher: &dyn Launcher,
	) -> Result<Self> {
		let token = Uuid::new_v4().to_string();

		// A stale instance from an earlier run would answer the coming ping
		// poll with the wrong token; ask it to leave first. Nothing answering
		// means there is nothing to wait out.
		if remote.app_quit().await.is_ok() {
			debug!(target = "telenium", "previous instance asked to quit");
			sleep(QUIT_GRACE).await;
		}

		let mut overlay = HashMap::new();
		overlay.insert(TOKEN_VAR.to_string(), token.clone());
		overlay.extend(config.cmd_env.iter().map(|(k, v)| (k.clone(), v.clone())));

		let process = launcher.launch(&overlay).await?;
		info!(target = "telenium", url = %config.url, pid = ?process.id(), "application launched");

		let start = Instant::now();
		loop {
			match remote.ping().await {
				Ok(()) => break,
				Err(err) => {
					if start.elapsed() > config.process_start_timeout {
						return Err(telenium_runtime::Error::StartupTimeout {
							url: config.url.clone(),
							timeout: config.process_start_timeout,
						}
						.into());
					}
					debug!(target = "telenium", error = %err, "endpoint not reachable yet");
					sleep(STARTUP_POLL).await;
				}
			}
		}

		let reported = remote.token().await?;
		if reported != token {
			return Err(telenium_runtime::Error::TokenMismatch {
				url: config.url.clone(),
				expected: token,
				actual: reported,
			}
			.into());
		}

		info!(target = "telenium", url = %config.url, "session established");
		Ok(Session {
			config,
			remote,
			process,
			token,
		})
	}

	/// Requests a remote quit and waits for the application process to exit.
	///
	/// The quit request is best-effort: the application may already be gone,
	/// and its failure must not mask the test outcome. The process wait is
	/// unconditional, bounded only when the configuration asks for it.
	pub async fn close(mut self) -> Result<()> {
		if let Err(err) = self.remote.app_quit().await {
			debug!(target = "telenium", error = %err, "quit request failed; application may already have exited");
		}
		match self.config.shutdown_timeout {
			None => {
				self.process.wait().await?;
			}
			Some(limit) => {
				self.process.wait_with_deadline(limit).await?;
			}
		}
		Ok(())
	}

	/// Asserts that `selector` matches an element, delegating the wait to the
	/// remote endpoint. `timeout` is in seconds; `-1.0` passes through as the
	/// remote default wait policy.
	pub async fn assert_exists(&self, selector: &str, timeout: f64) -> Result<()> {
		if self.remote.wait(selector, timeout).await? {
			Ok(())
		} else {
			Err(Error::Exists {
				selector: selector.to_string(),
			})
		}
	}

	/// Asserts that `selector` matches nothing, polling every 100ms until it
	/// clears.
	///
	/// The `timeout` sentinels deliberately differ from
	/// [`Session::assert_exists`]: `-1.0` requires the selector to already be
	/// absent and fails without retrying, `0.0` polls with no deadline at
	/// all, and a positive value polls until the deadline expires.
	pub async fn assert_not_exists(&self, selector: &str, timeout: f64) -> Result<()> {
		let start = Instant::now();
		loop {
			match self.remote.select(selector).await {
				Ok(matches) if matches.is_empty() => return Ok(()),
				Ok(_) => {
					if timeout == -1.0 {
						return Err(Error::NotExists {
							selector: selector.to_string(),
						});
					}
				}
				Err(err) => {
					// With no deadline-governed retry budget a transport
					// error would poll forever; surface it instead.
					if timeout == -1.0 {
						return Err(err.into());
					}
					debug!(target = "telenium", error = %err, "select failed; retrying");
				}
			}
			if timeout > 0.0 && start.elapsed().as_secs_f64() > timeout {
				return Err(Error::NotExistsTimeout {
					selector: selector.to_string(),
					timeout,
				});
			}
			sleep(ABSENCE_POLL).await;
		}
	}

	/// Correlation token generated for this session.
	pub fn token(&self) -> &str {
		&self.token
	}

	/// Raw access to the remote endpoint for calls beyond the assertions.
	pub fn remote(&self) -> &dyn RemoteControl {
		self.remote.as_ref()
	}

	/// OS process id of the launched application, if it is still running.
	pub fn process_id(&self) -> Option<u32> {
		self.process.id()
	}

	/// Configuration this session was opened with.
	pub fn config(&self) -> &Config {
		&self.config
	}
}
