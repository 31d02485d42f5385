#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # isapi-client
//!
//! A blocking and async HTTP client for ISAPI-compatible cameras and NVRs.
//! The crate's core is the HTTP Digest Authentication session layer:
//! challenge parsing, response computation, nonce-count tracking, and a
//! bounded retry handshake shared byte-for-byte between both client
//! variants. Endpoint semantics stay with the caller: you supply a method,
//! a path, and an optional body, and get the raw device response back.
//!
//! ## Overview
//!
//! - **Digest authentication** per the RFC 2617/7616 MD5 subset, tolerant
//!   of the directive quirks real firmware produces
//! - **Session reuse**: after the first challenge, requests carry
//!   preemptive credentials with a strictly increasing nonce-count, so no
//!   extra round trip is paid per call
//! - **Bounded handshake**: one challenge adoption plus one stale-nonce
//!   refresh per logical request; credential rejection surfaces as an
//!   error instead of a retry loop
//! - **Two facades, one protocol core**: [`Client`] blocks,
//!   [`AsyncClient`] suspends at I/O; given identical challenges they emit
//!   identical bytes
//! - **Device errors are not library errors**: any HTTP status is
//!   delivered as a [`DeviceResponse`]; only transport and authentication
//!   failures are [`IsapiError`]s
//!
//! ## Client Usage
//!
//! ```no_run
//! use isapi_client::{AsyncClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("192.168.1.64", "admin", "secret");
//!     let client = AsyncClient::open(config)?;
//!
//!     let response = client.get("/ISAPI/System/deviceInfo").await?;
//!     println!("status: {}", response.status());
//!     println!("{}", response.text());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[client]** - Client facades and configuration
//! - **[digest]** - Challenge parsing, response computation, session state
//! - **[error]** - Error types and result handling
//! - **[types]** - Request and response types

pub mod client;
pub mod digest;
pub mod error;
pub mod types;

pub use client::{AsyncClient, Client, ClientConfig, Credentials, Scheme};
pub use digest::{compute_authorization, DigestChallenge};
pub use error::{IsapiError, Result};
pub use types::{DeviceRequest, DeviceResponse};

// Re-exported so callers can build requests without importing `http`.
pub use http::{Method, StatusCode};
