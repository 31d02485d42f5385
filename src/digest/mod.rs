//! HTTP Digest Authentication (RFC 2617/7616 subset).
//!
//! This module is the protocol core of the crate, split into three layers
//! that build on each other:
//!
//! ```text
//! digest/
//! ├── challenge      - WWW-Authenticate parsing (DigestChallenge)
//! ├── authorization  - pure response computation (compute_authorization)
//! └── session        - AuthState cache + Handshake retry driver
//! ```
//!
//! `challenge` and `authorization` are pure and public: given the same
//! inputs they produce the same bytes, which is how the blocking and async
//! facades stay byte-for-byte identical on the wire. `session` holds the
//! only mutable state (the cached challenge and its nonce-count) and the
//! bounded retry decisions, and is internal to the crate.
//!
//! # Examples
//!
//! ```
//! use isapi_client::{compute_authorization, Credentials, DigestChallenge};
//!
//! let challenge = DigestChallenge::parse(
//!     r#"Digest realm="IP Camera", nonce="dcd98b7102dd", qop="auth""#,
//! )?;
//! let credentials = Credentials::new("admin", "secret");
//! let header = compute_authorization(
//!     &credentials, &challenge, "GET", "/ISAPI/System/deviceInfo", 1, "f2wE4q74E6z",
//! )?;
//! assert!(header.starts_with("Digest "));
//! # Ok::<(), isapi_client::IsapiError>(())
//! ```

mod authorization;
mod challenge;
mod session;

pub use authorization::compute_authorization;
pub use challenge::DigestChallenge;

pub(crate) use session::{challenge_header, AuthState, Disposition, Handshake};
