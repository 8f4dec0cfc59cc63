//! telenium: session harness for telenium-instrumented applications
//!
//! A [`Session`] launches an application that embeds a telenium
//! remote-control endpoint (a desktop process, or an Android activity
//! started through adb), waits for the endpoint to come up, verifies the
//! per-session correlation token so a stale instance from an earlier run
//! can never be mistaken for the one just launched, and exposes polling
//! assertions for test bodies.
//!
//! # Example
//!
//! ```ignore
//! use telenium::{Config, Session};
//!
//! #[tokio::main]
//! async fn main() -> telenium::Result<()> {
//!     let mut config = Config::from_env();
//!     config.cmd_entrypoint = vec!["demo/main.py".to_string()];
//!
//!     let session = Session::open(config).await?;
//!     session.assert_exists("//StartButton", 5.0).await?;
//!     session.assert_not_exists("//ErrorPopup", -1.0).await?;
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

mod error;
mod session;

pub use error::{Error, Result};
pub use session::Session;
pub use telenium_runtime::client::{HttpRemote, RemoteControl};
pub use telenium_runtime::config::{AndroidTarget, Config, LaunchTarget};
pub use telenium_runtime::launcher::{AndroidLauncher, AppProcess, DesktopLauncher, Launcher};
