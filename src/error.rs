//! Error types and result handling.
//!
//! Everything that can go wrong inside the crate surfaces as an [`IsapiError`]
//! returned to the caller of the request that triggered it; nothing is
//! swallowed or logged-and-ignored internally.
//!
//! # Error Classes
//!
//! | Class | Variants | Retried internally? |
//! |-------|----------|---------------------|
//! | Parse | [`ChallengeParse`](IsapiError::ChallengeParse) | never |
//! | Auth | [`InvalidCredentials`](IsapiError::InvalidCredentials), [`NonceRetryExhausted`](IsapiError::NonceRetryExhausted), [`MissingChallenge`](IsapiError::MissingChallenge), [`UnsupportedScheme`](IsapiError::UnsupportedScheme), [`UnsupportedAlgorithm`](IsapiError::UnsupportedAlgorithm), [`UnsupportedQop`](IsapiError::UnsupportedQop) | never |
//! | Transport | [`Transport`](IsapiError::Transport), [`InvalidEndpoint`](IsapiError::InvalidEndpoint), [`ClientClosed`](IsapiError::ClientClosed) | never |
//!
//! Non-2xx device statuses are **not** errors of this layer: `request()`
//! returns them as ordinary [`DeviceResponse`](crate::DeviceResponse) values.
//! [`DeviceStatus`](IsapiError::DeviceStatus) only appears when the caller
//! opts in via [`DeviceResponse::error_for_status`](crate::DeviceResponse::error_for_status).
//!
//! The retry policy for transport failures belongs to the caller; the only
//! internal retry is the bounded Digest handshake described in
//! [`crate::digest`].

use http::StatusCode;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IsapiError>;

/// The error type of this library.
#[derive(Debug, Error)]
pub enum IsapiError {
    /// The `WWW-Authenticate` challenge was malformed or missed a mandatory
    /// directive (`realm` or `nonce`).
    #[error("malformed digest challenge: {0}")]
    ChallengeParse(String),

    /// The device rejected the credentials after the bounded handshake
    /// (a credentialed request was answered with a non-stale challenge).
    #[error("device rejected the supplied credentials")]
    InvalidCredentials,

    /// The device kept issuing `stale=true` challenges after the one stale
    /// retry this client is willing to perform per logical request.
    #[error("nonce went stale again after a refresh; giving up")]
    NonceRetryExhausted,

    /// A 401 response carried no `WWW-Authenticate` header at all.
    #[error("device demanded authentication without offering a challenge")]
    MissingChallenge,

    /// The challenge used an authentication scheme other than `Digest`.
    #[error("unsupported authentication scheme: {0}")]
    UnsupportedScheme(String),

    /// The challenge demanded a digest algorithm other than MD5.
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The challenge offered a qop list that does not include `auth`.
    #[error("unsupported quality of protection: {0}")]
    UnsupportedQop(String),

    /// A network-level failure: connection refused, DNS, TLS, or timeout.
    /// Never retried by this crate.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured host or the request path cannot form a valid URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// `request()` was called on a client after `close()`.
    #[error("client has been closed")]
    ClientClosed,

    /// Raised by [`DeviceResponse::error_for_status`](crate::DeviceResponse::error_for_status)
    /// when the caller asks for non-2xx statuses to be promoted to errors.
    #[error("device returned error status {0}")]
    DeviceStatus(StatusCode),

    /// The response body could not be decoded by
    /// [`DeviceResponse::json`](crate::DeviceResponse::json).
    #[error("failed to decode response body: {0}")]
    Body(#[from] serde_json::Error),
}

impl IsapiError {
    /// True for challenge-parsing failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, IsapiError::ChallengeParse(_))
    }

    /// True for authentication failures: rejected credentials, exhausted
    /// stale retries, or challenge capabilities this crate does not speak.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            IsapiError::InvalidCredentials
                | IsapiError::NonceRetryExhausted
                | IsapiError::MissingChallenge
                | IsapiError::UnsupportedScheme(_)
                | IsapiError::UnsupportedAlgorithm(_)
                | IsapiError::UnsupportedQop(_)
        )
    }

    /// True for network-level failures (including timeouts).
    pub fn is_transport(&self) -> bool {
        matches!(self, IsapiError::Transport(_))
    }

    /// True when the underlying transport reported a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, IsapiError::Transport(e) if e.is_timeout())
    }
}
