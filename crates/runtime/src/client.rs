//! Remote-control client for the in-application telenium endpoint.
//!
//! The application exposes a small JSON-RPC 2.0 surface over HTTP. Session
//! logic talks to it through the [`RemoteControl`] trait so tests can swap in
//! scripted endpoints; [`HttpRemote`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::proc_macros::rpc;
use serde_json::Value;

use crate::error::Result;

/// Wire surface exposed by the instrumented application.
#[rpc(client)]
pub trait TeleniumRpc {
	/// Liveness check.
	#[method(name = "ping")]
	async fn ping(&self) -> RpcResult<bool>;

	/// Correlation token the application was started with.
	#[method(name = "get_token")]
	async fn get_token(&self) -> RpcResult<String>;

	/// Asks the application to exit.
	#[method(name = "app_quit")]
	async fn app_quit(&self) -> RpcResult<bool>;

	/// Blocks on the remote side until `selector` matches an element.
	/// A `timeout` of -1 selects the remote default wait policy.
	#[method(name = "wait")]
	async fn wait(&self, selector: String, timeout: f64) -> RpcResult<bool>;

	/// Current matches for `selector`.
	#[method(name = "select")]
	async fn select(&self, selector: String) -> RpcResult<Vec<Value>>;
}

/// The remote calls session logic needs, as a seam test doubles can implement.
#[async_trait]
pub trait RemoteControl: Send + Sync {
	/// Liveness check; any error means the endpoint is not reachable yet.
	async fn ping(&self) -> Result<()>;

	/// Correlation token reported by the running instance.
	async fn token(&self) -> Result<String>;

	/// Asks the application to exit.
	async fn app_quit(&self) -> Result<()>;

	/// Remote-side wait for `selector`; returns whether it matched.
	async fn wait(&self, selector: &str, timeout: f64) -> Result<bool>;

	/// Current matches for `selector`.
	async fn select(&self, selector: &str) -> Result<Vec<Value>>;
}

/// JSON-RPC implementation of [`RemoteControl`] over HTTP.
pub struct HttpRemote {
	inner: HttpClient,
}

impl HttpRemote {
	/// Builds a client bound to `url` with a per-request `timeout`.
	pub fn connect(url: &str, timeout: Duration) -> Result<Self> {
		let inner = HttpClientBuilder::default()
			.request_timeout(timeout)
			.build(url)?;
		Ok(HttpRemote { inner })
	}
}

#[async_trait]
impl RemoteControl for HttpRemote {
	async fn ping(&self) -> Result<()> {
		TeleniumRpcClient::ping(&self.inner).await?;
		Ok(())
	}

	async fn token(&self) -> Result<String> {
		Ok(TeleniumRpcClient::get_token(&self.inner).await?)
	}

	async fn app_quit(&self) -> Result<()> {
		TeleniumRpcClient::app_quit(&self.inner).await?;
		Ok(())
	}

	async fn wait(&self, selector: &str, timeout: f64) -> Result<bool> {
		Ok(TeleniumRpcClient::wait(&self.inner, selector.to_string(), timeout).await?)
	}

	async fn select(&self, selector: &str) -> Result<Vec<Value>> {
		Ok(TeleniumRpcClient::select(&self.inner, selector.to_string()).await?)
	}
}
