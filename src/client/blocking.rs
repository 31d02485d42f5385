//! Blocking client facade.
//!
//! [`Client`] wraps a `reqwest::blocking::Client` (the keep-alive pool) and
//! drives the digest handshake from [`crate::digest`]. Each call fully
//! completes before returning; for cooperative scheduling use
//! [`AsyncClient`](crate::AsyncClient), which shares every byte of the
//! protocol logic.
//!
//! # Examples
//!
//! ```no_run
//! use isapi_client::{Client, ClientConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::open(ClientConfig::new("192.168.1.64", "admin", "secret"))?;
//!     let response = client.get("/ISAPI/System/deviceInfo")?;
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

/// Blocking ISAPI client.
///
/// Clones share the connection pool and the one per-session
/// authentication state, so a challenge obtained through one clone is
/// reused preemptively by the others. Dropping the last clone releases the
/// transport; [`close`](Self::close) releases it eagerly.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    state: Arc<AuthState>,
    transport: Arc<Mutex<Option<reqwest::blocking::Client>>>,
}

impl Client {
    /// Build the transport and return a ready client.
    ///
    /// # Errors
    ///
    /// [`IsapiError::InvalidEndpoint`] when the host cannot form a URL;
    /// [`IsapiError::Transport`] when the transport cannot be constructed
    /// (e.g. a malformed proxy URL).
    pub fn open(config: ClientConfig) -> Result<Self> {
        config.base_url()?;
        let transport = build_transport(&config)?;
        Ok(Client {
            config: Arc::new(config),
            state: Arc::new(AuthState::new()),
            transport: Arc::new(Mutex::new(Some(transport))),
        })
    }

    /// Execute one request, driving the digest handshake as needed.
    ///
    /// Any HTTP status the device returns is a successful outcome; only
    /// transport and authentication failures are errors. See
    /// [`DeviceResponse::error_for_status`] for opt-in status checking.
    pub fn request(&self, request: DeviceRequest) -> Result<DeviceResponse> {
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
                builder = builder.body(body.to_vec());
            }

            let response = builder.send()?;
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
                    let body = response.bytes()?;
                    return Ok(DeviceResponse::new(status, headers, body));
                }
            }
        }
    }

    /// GET the given endpoint path.
    pub fn get(&self, path: &str) -> Result<DeviceResponse> {
        self.request(DeviceRequest::new(Method::GET, path))
    }

    /// POST a raw body to the given endpoint path.
    pub fn post(&self, path: &str, body: impl Into<Bytes>) -> Result<DeviceResponse> {
        self.request(DeviceRequest::new(Method::POST, path).with_body(body))
    }

    /// PUT a raw body to the given endpoint path.
    pub fn put(&self, path: &str, body: impl Into<Bytes>) -> Result<DeviceResponse> {
        self.request(DeviceRequest::new(Method::PUT, path).with_body(body))
    }

    /// DELETE the given endpoint path.
    pub fn delete(&self, path: &str) -> Result<DeviceResponse> {
        self.request(DeviceRequest::new(Method::DELETE, path))
    }

    /// Release the transport. Idempotent; affects all clones. Subsequent
    /// [`request`](Self::request) calls fail with
    /// [`IsapiError::ClientClosed`].
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

fn build_transport(config: &ClientConfig) -> Result<reqwest::blocking::Client> {
    let mut builder = reqwest::blocking::Client::builder()
        .timeout(config.timeout())
        .danger_accept_invalid_certs(!config.verify_tls())
        .default_headers(config.default_headers().clone());
    if let Some(proxy) = config.proxy() {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::open(ClientConfig::new("192.168.1.64", "admin", "secret")).unwrap()
    }

    #[test]
    fn test_open_starts_unauthenticated() {
        let client = client();
        assert!(!client.is_closed());
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_close_is_idempotent() {
        let client = client();
        client.close();
        client.close();
        assert!(client.is_closed());
    }

    #[test]
    fn test_request_after_close_fails() {
        let client = client();
        client.close();
        let err = client.get("/ISAPI/System/status").unwrap_err();
        assert!(matches!(err, IsapiError::ClientClosed));
    }

    #[test]
    fn test_clones_share_lifecycle() {
        let client = client();
        let clone = client.clone();
        client.close();
        assert!(clone.is_closed());
    }
}
