//! Launch strategies for bringing up the application under test.
//!
//! Both strategies receive the same input: an environment overlay holding the
//! correlation token and the caller's overrides. The desktop launcher layers
//! it on the inherited environment of a directly spawned process; the Android
//! launcher stages it as a JSON file on the device, since an activity started
//! through adb cannot inherit an environment.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::config::{AndroidTarget, Config, LaunchTarget};
use crate::error::{Error, Result};

/// Local staging path for the Android environment file.
const LOCAL_ENV_FILE: &str = "/tmp/telenium_env.json";
/// Device path the activity reads its environment from at startup.
const DEVICE_ENV_FILE: &str = "/sdcard/telenium_env.json";

/// Running application handle owned by one session.
#[derive(Debug)]
pub struct AppProcess {
	child: Child,
}

impl AppProcess {
	pub fn new(child: Child) -> Self {
		AppProcess { child }
	}

	/// OS process id, if the process has not been reaped yet.
	pub fn id(&self) -> Option<u32> {
		self.child.id()
	}

	/// Blocks until the process exits.
	pub async fn wait(&mut self) -> Result<ExitStatus> {
		Ok(self.child.wait().await?)
	}

	/// Waits up to `limit` for the process to exit, then kills it and reaps
	/// the forced exit status.
	pub async fn wait_with_deadline(&mut self, limit: Duration) -> Result<ExitStatus> {
		let waited = tokio::time::timeout(limit, self.child.wait()).await;
		match waited {
			Ok(status) => Ok(status?),
			Err(_) => {
				warn!(
					target = "telenium::launch",
					limit_secs = limit.as_secs_f64(),
					"process did not exit in time; killing it"
				);
				self.child.kill().await?;
				Ok(self.child.wait().await?)
			}
		}
	}
}

/// Strategy for bringing up the application with an environment overlay.
#[async_trait]
pub trait Launcher: Send + Sync {
	async fn launch(&self, overlay: &HashMap<String, String>) -> Result<AppProcess>;
}

/// Picks the launcher variant for a resolved configuration.
pub fn launcher_for(config: &Config) -> Box<dyn Launcher> {
	match &config.target {
		LaunchTarget::Desktop => Box::new(DesktopLauncher {
			command: config.command(),
		}),
		LaunchTarget::Android(target) => Box::new(AndroidLauncher::for_target(target)),
	}
}

/// Spawns the application directly on this machine.
#[derive(Debug, Clone)]
pub struct DesktopLauncher {
	/// Program and arguments, e.g. `python -m telenium.execute main.py`.
	pub command: Vec<String>,
}

#[async_trait]
impl Launcher for DesktopLauncher {
	async fn launch(&self, overlay: &HashMap<String, String>) -> Result<AppProcess> {
		let (program, args) = self
			.command
			.split_first()
			.ok_or_else(|| Error::Launch("launch command is empty".to_string()))?;

		info!(target = "telenium::launch", command = ?self.command, "starting application");
		let child = Command::new(program)
			.args(args)
			.envs(overlay)
			.spawn()
			.map_err(|err| Error::Launch(format!("failed to spawn {program}: {err}")))?;
		Ok(AppProcess::new(child))
	}
}

/// Starts the application on a connected device through adb.
#[derive(Debug, Clone)]
pub struct AndroidLauncher {
	/// Application package; launching fails when unset.
	pub package: Option<String>,
	/// Activity class handed to `am start`.
	pub entry: String,
	/// Device-bridge executable, `adb` unless overridden.
	pub adb_program: String,
	/// Where the environment file is staged locally before the push.
	pub local_env_file: PathBuf,
	/// Where the activity expects the environment file on the device.
	pub device_env_file: String,
}

impl AndroidLauncher {
	pub fn for_target(target: &AndroidTarget) -> Self {
		AndroidLauncher {
			package: target.package.clone(),
			entry: target.entry.clone(),
			adb_program: "adb".to_string(),
			local_env_file: PathBuf::from(LOCAL_ENV_FILE),
			device_env_file: DEVICE_ENV_FILE.to_string(),
		}
	}

	/// Component name handed to `am start`.
	fn component(&self) -> Result<String> {
		let package = self
			.package
			.as_deref()
			.ok_or_else(|| Error::Launch("TELENIUM_ANDROID_PACKAGE is not set".to_string()))?;
		Ok(format!("{package}/{}", self.entry))
	}

	/// Arguments of the `adb push` staging the environment file.
	fn push_args(&self) -> Vec<String> {
		vec![
			"push".to_string(),
			self.local_env_file.to_string_lossy().into_owned(),
			self.device_env_file.clone(),
		]
	}

	/// Arguments of the `adb shell am start` for the configured component.
	fn start_args(&self, component: &str) -> Vec<String> {
		vec![
			"shell".to_string(),
			"am".to_string(),
			"start".to_string(),
			"-n".to_string(),
			component.to_string(),
			"-a".to_string(),
			self.entry.clone(),
		]
	}
}

#[async_trait]
impl Launcher for AndroidLauncher {
	async fn launch(&self, overlay: &HashMap<String, String>) -> Result<AppProcess> {
		let component = self.component()?;

		tokio::fs::write(&self.local_env_file, serde_json::to_vec(overlay)?).await?;

		let push_args = self.push_args();
		info!(target = "telenium::launch", command = ?push_args, "pushing environment file");
		let push = Command::new(&self.adb_program)
			.args(&push_args)
			.output()
			.await
			.map_err(|err| Error::Launch(format!("failed to run {}: {err}", self.adb_program)))?;
		if !push.status.success() {
			// The activity start does not depend on the push having landed;
			// it reads the file on its own schedule.
			warn!(
				target = "telenium::launch",
				status = %push.status,
				stderr = %String::from_utf8_lossy(&push.stderr),
				"adb push failed"
			);
		}

		let start_args = self.start_args(&component);
		info!(target = "telenium::launch", command = ?start_args, "starting activity");
		let child = Command::new(&self.adb_program)
			.args(&start_args)
			.spawn()
			.map_err(|err| Error::Launch(format!("failed to run {}: {err}", self.adb_program)))?;
		Ok(AppProcess::new(child))
	}
}
