//! Client configuration.
//!
//! [`ClientConfig`] is an immutable value built once and handed to
//! [`Client::open`](crate::Client::open) or
//! [`AsyncClient::open`](crate::AsyncClient::open); there is no ambient or
//! process-wide configuration anywhere in the crate.
//!
//! Defaults mirror what camera fleets actually need: port 80/443 by scheme,
//! a 30 second timeout, and TLS verification **off**, because devices ship
//! with self-signed certificates. Opt back in with
//! [`with_tls_verification`](ClientConfig::with_tls_verification) when the
//! device carries a real certificate.

use std::fmt;
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::Result;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// URL scheme used to reach the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain HTTP (default; port 80 unless overridden).
    #[default]
    Http,
    /// HTTP over TLS (port 443 unless overridden).
    Https,
}

impl Scheme {
    /// The scheme as it appears in a URL.
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Username and password for the device account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials for a device account.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The account username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The account password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keeps the password out of logs; configs get traced at debug level.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"******")
            .finish()
    }
}

/// Connection parameters for one device.
///
/// Built with chainable `with_*` methods:
///
/// ```
/// use std::time::Duration;
/// use isapi_client::{ClientConfig, Scheme};
///
/// let config = ClientConfig::new("192.168.1.64", "admin", "secret")
///     .with_scheme(Scheme::Https)
///     .with_port(8443)
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.port(), 8443);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    host: String,
    scheme: Scheme,
    port: Option<u16>,
    credentials: Credentials,
    timeout: Duration,
    verify_tls: bool,
    proxy: Option<String>,
    default_headers: HeaderMap,
}

impl ClientConfig {
    /// Configuration for a device at `host` with the given account.
    ///
    /// Host is an IP address or hostname, without scheme or port.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        ClientConfig {
            host: host.into(),
            scheme: Scheme::default(),
            port: None,
            credentials: Credentials::new(username, password),
            timeout: DEFAULT_TIMEOUT,
            verify_tls: false,
            proxy: None,
            default_headers: HeaderMap::new(),
        }
    }

    /// Select `http` or `https`.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Override the port (defaults to 80 for http, 443 for https).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Per-attempt timeout, covering connect, write, and read. The bounded
    /// handshake retry means one logical request is limited to a small
    /// multiple of this.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable TLS certificate verification. Off by default.
    pub fn with_tls_verification(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Route all requests through an HTTP proxy.
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    /// Attach a header to every request on the session.
    pub fn with_default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// The device host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The configured scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The effective port after scheme defaulting.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    /// The account credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether TLS certificates are verified.
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// The proxy URL, if one was set.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Headers attached to every request.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// The base URL all request paths are joined onto.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}://{}:{}/",
            self.scheme,
            self.host,
            self.port()
        ))?)
    }

    /// Resolve a request path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url()?.join(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_by_scheme() {
        let config = ClientConfig::new("192.168.1.64", "admin", "secret");
        assert_eq!(config.port(), 80);

        let config = config.with_scheme(Scheme::Https);
        assert_eq!(config.port(), 443);

        let config = config.with_port(8443);
        assert_eq!(config.port(), 8443);
    }

    #[test]
    fn test_base_url() {
        // The url crate elides default ports when rendering.
        let config = ClientConfig::new("192.168.1.64", "admin", "secret");
        assert_eq!(config.base_url().unwrap().as_str(), "http://192.168.1.64/");

        let config = config.with_port(8080);
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "http://192.168.1.64:8080/"
        );
    }

    #[test]
    fn test_endpoint_joins_absolute_and_relative_paths() {
        let config = ClientConfig::new("192.168.1.64", "admin", "secret").with_port(8080);
        assert_eq!(
            config.endpoint("/ISAPI/System/deviceInfo").unwrap().as_str(),
            "http://192.168.1.64:8080/ISAPI/System/deviceInfo"
        );
        assert_eq!(
            config.endpoint("ISAPI/System/deviceInfo").unwrap().as_str(),
            "http://192.168.1.64:8080/ISAPI/System/deviceInfo"
        );
    }

    #[test]
    fn test_endpoint_keeps_query() {
        let config = ClientConfig::new("cam.local", "admin", "secret");
        assert_eq!(
            config
                .endpoint("/ISAPI/Streaming/channels/101?format=json")
                .unwrap()
                .as_str(),
            "http://cam.local/ISAPI/Streaming/channels/101?format=json"
        );
    }

    #[test]
    fn test_tls_verification_defaults_off() {
        let config = ClientConfig::new("cam.local", "admin", "secret");
        assert!(!config.verify_tls());
        assert!(config.with_tls_verification(true).verify_tls());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = ClientConfig::new("cam.local", "admin", "hunter2");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("admin"));
        assert!(rendered.contains("******"));
    }
}
