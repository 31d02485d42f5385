//! Client facades and configuration.
//!
//! Two front-ends with one contract: open a session, issue requests that
//! are transparently digest-authenticated, close. They share the protocol
//! core in [`crate::digest`]; the only difference is the I/O primitive
//! driving it.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── config       - ClientConfig, Credentials, Scheme
//! ├── blocking     - Client (reqwest::blocking)
//! └── nonblocking  - AsyncClient (reqwest + tokio)
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Blocking client facade |
//! | [`AsyncClient`] | Async client facade |
//! | [`ClientConfig`] | Immutable connection parameters |
//! | [`Credentials`] | Device account, password redacted in `Debug` |
//!
//! # Examples
//!
//! ```
//! use isapi_client::{ClientConfig, Scheme};
//!
//! let config = ClientConfig::new("192.168.1.64", "admin", "secret")
//!     .with_scheme(Scheme::Https);
//! assert_eq!(config.port(), 443);
//! ```

mod blocking;
mod config;
mod nonblocking;

pub use blocking::Client;
pub use config::{ClientConfig, Credentials, Scheme, DEFAULT_TIMEOUT};
pub use nonblocking::AsyncClient;

use url::Url;

/// The request-uri the digest response is computed over: the path plus the
/// query string, never the authority.
pub(crate) fn digest_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
