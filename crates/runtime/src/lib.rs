//! Telenium runtime - application launch, transport, and configuration
//!
//! This crate provides the infrastructure the `telenium` session harness is
//! built from:
//!
//! - **Configuration**: one-shot resolution of `TELENIUM_*` environment input
//! - **Launchers**: desktop process spawn and adb-driven Android activity start
//! - **Client**: the JSON-RPC surface of the in-application endpoint
//!
//! Nothing here holds state across calls beyond the spawned process handle;
//! session sequencing lives in the `telenium` crate on top.

pub mod client;
pub mod config;
pub mod error;
pub mod launcher;

// Re-export key types at crate root
pub use client::{HttpRemote, RemoteControl};
pub use config::{AndroidTarget, Config, LaunchTarget};
pub use error::{Error, Result};
pub use launcher::{AndroidLauncher, AppProcess, DesktopLauncher, Launcher, launcher_for};
