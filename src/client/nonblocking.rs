//! Async client facade.
//!
//! [`AsyncClient`] mirrors [`Client`](crate::Client) operation for
//! operation, suspending only at transport I/O: connection acquisition,
//! write, read. The digest computation and the retry decisions are the same
//! code both facades call, never suspend, and never hold the state lock
//! across an await point, so concurrent tasks on one client each get a
//! distinct nonce-count.
//!
//! # Examples
//!
//! ```no_run
//! use isapi_client::{AsyncClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AsyncClient::open(ClientConfig::new("192.168.1.64", "admin", "secret"))?;
//!     let response = client.get("/ISAPI/System/deviceInfo").await?;
//!     println!("{} {}", response.status(), response.text());
//!     client.close();
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use http::{header, Method};
use parking_lot::Mutex;
use tracing::debug;

use crate::client::{digest_uri, ClientConfig};
use crate::digest::{challenge_header, AuthState, Disposition, Handshake};
use crate::error::{IsapiError, Result};
use crate::types::{DeviceRequest, DeviceResponse};

/// Async ISAPI client.
///
/// The transport pool may carry multiple in-flight requests from
/// concurrent tasks; the authentication state serializes only the
/// nonce-count bookkeeping. Clones share both, so one authenticated
/// exchange benefits every task on the session.
#[derive(Debug, Clone)]
pub struct AsyncClient {
    config: Arc<ClientConfig>,
    state: Arc<AuthState>,
    transport: Arc<Mutex<Option<reqwest::Client>>>,
}

impl AsyncClient {
    /// Build the transport and return a ready client.
    ///
    /// Not async: constructing the pool performs no I/O. Connections are
    /// dialed lazily on first use.
    ///
    /// # Errors
    ///
    /// [`IsapiError::InvalidEndpoint`] when the host cannot form a URL;
    /// [`IsapiError::Transport`] when the transport cannot be constructed.
    pub fn open(config: ClientConfig) -> Result<Self> {
        config.base_url()?;
        let transport = build_transport(&config)?;
        Ok(AsyncClient {
            config: Arc::new(config),
            state: Arc::new(AuthState::new()),
            transport: Arc::new(Mutex::new(Some(transport))),
        })
    }

    /// Execute one request, driving the digest handshake as needed.
    ///
    /// Identical contract to [`Client::request`](crate::Client::request):
    /// any device status is delivered as a response; only transport and
    /// authentication failures are errors.
    pub async fn request(&self, request: DeviceRequest) -> Result<DeviceResponse> {
        // Clone the handle out so the lock is not held across awaits.
        let transport = self
            .transport
            .lock()
            .clone()
            .ok_or(IsapiError::ClientClosed)?;
        let url = self.config.endpoint(request.path())?;
        let uri = digest_uri(&url);
        let mut handshake = Handshake::new();

        loop {
            let authorization = self.state.authorization(
                self.config.credentials(),
                request.method().as_str(),
                &uri,
            )?;
            debug!(
                method = %request.method(),
                path = request.path(),
                credentialed = authorization.is_some(),
                "dispatching request"
            );

            let mut builder = transport
                .request(request.method().clone(), url.clone())
                .headers(request.headers().clone());
            if let Some(value) = &authorization {
                builder = builder.header(header::AUTHORIZATION, value.as_str());
            }
            if let Some(body) = request.body() {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();

            match handshake.evaluate(
                &self.state,
                authorization.is_some(),
                status,
                challenge_header(&headers)?,
            )? {
                Disposition::Retry => continue,
                Disposition::Deliver => {
                    let body = response.bytes().await?;
                    return Ok(DeviceResponse::new(status, headers, body));
                }
            }
        }
    }

    /// GET the given endpoint path.
    pub async fn get(&self, path: &str) -> Result<DeviceResponse> {
        self.request(DeviceRequest::new(Method::GET, path)).await
    }

    /// POST a raw body to the given endpoint path.
    pub async fn post(&self, path: &str, body: impl Into<Bytes>) -> Result<DeviceResponse> {
        self.request(DeviceRequest::new(Method::POST, path).with_body(body))
            .await
    }

    /// PUT a raw body to the given endpoint path.
    pub async fn put(&self, path: &str, body: impl Into<Bytes>) -> Result<DeviceResponse> {
        self.request(DeviceRequest::new(Method::PUT, path).with_body(body))
            .await
    }

    /// DELETE the given endpoint path.
    pub async fn delete(&self, path: &str) -> Result<DeviceResponse> {
        self.request(DeviceRequest::new(Method::DELETE, path)).await
    }

    /// Release the transport. Idempotent; affects all clones; releasing
    /// the pool performs no I/O, so this is not async. Subsequent
    /// [`request`](Self::request) calls fail with
    /// [`IsapiError::ClientClosed`] rather than re-opening.
    pub fn close(&self) {
        self.transport.lock().take();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.transport.lock().is_none()
    }

    /// Whether a challenge is cached and requests carry preemptive
    /// credentials.
    pub fn is_authenticated(&self) -> bool {
        self.state.has_challenge()
    }

    /// The configuration this client was opened with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn build_transport(config: &ClientConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.timeout())
        .danger_accept_invalid_certs(!config.verify_tls())
        .default_headers(config.default_headers().clone());
    if let Some(proxy) = config.proxy() {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}
