//! Per-session authentication state and the handshake state machine.
//!
//! [`AuthState`] is the one piece of shared mutable state in the crate: the
//! cached challenge and its nonce-count, guarded by a mutex so that
//! concurrent callers on one client can never reuse an `nc` value. The
//! read-increment-compute sequence in [`AuthState::authorization`] is the
//! whole critical section; it is CPU-only and the lock is never held across
//! transport I/O.
//!
//! [`Handshake`] is the per-logical-request retry driver. Both facades run
//! the same loop: ask the state for a (possibly preemptive) `Authorization`
//! header, send, hand the outcome to [`Handshake::evaluate`], and either
//! deliver the response or go around once more. The handshake itself is
//! transport-agnostic and bounded:
//!
//! ```text
//! UNAUTHENTICATED --401--> CHALLENGED --sent--> AUTHENTICATED
//!       ^                                          |
//!       |                             stale=true (once per request)
//!       +---- hard failure clears cache <----------+
//! ```
//!
//! A credentialed attempt answered by a non-stale challenge is a credential
//! rejection; a second stale challenge after a refresh means the device is
//! churning nonces faster than we can follow, and both end the request with
//! an auth error rather than another round trip.

use http::header::{self, HeaderMap};
use http::StatusCode;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::Credentials;
use crate::digest::authorization::ensure_supported;
use crate::digest::{compute_authorization, DigestChallenge};
use crate::error::{IsapiError, Result};

/// The cached digest state of one client session.
///
/// At most one exists per client instance; clones of a facade share it.
#[derive(Debug, Default)]
pub(crate) struct AuthState {
    inner: Mutex<Option<NonceState>>,
}

#[derive(Debug)]
struct NonceState {
    challenge: DigestChallenge,
    nonce_count: u32,
}

impl AuthState {
    pub(crate) fn new() -> Self {
        AuthState::default()
    }

    /// Produce the `Authorization` header for the next attempt, or `None`
    /// when no challenge is cached and the attempt goes out unauthenticated.
    ///
    /// Increments the nonce-count and generates a fresh client-nonce under
    /// the lock, so concurrent requests each get a distinct `nc`. A cached
    /// challenge that cannot be answered is dropped as the error surfaces,
    /// and a counter that has exhausted its `nc` space is dropped silently;
    /// either way the next attempt starts over unauthenticated.
    pub(crate) fn authorization(
        &self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
    ) -> Result<Option<String>> {
        let mut guard = self.inner.lock();
        let Some(state) = guard.as_mut() else {
            return Ok(None);
        };
        if state.nonce_count == u32::MAX {
            // No counts left for this nonce; wrapping would replay one.
            *guard = None;
            return Ok(None);
        }
        state.nonce_count += 1;
        let cnonce = new_cnonce();
        match compute_authorization(
            credentials,
            &state.challenge,
            method,
            uri,
            state.nonce_count,
            &cnonce,
        ) {
            Ok(header) => Ok(Some(header)),
            Err(err) => {
                *guard = None;
                Err(err)
            }
        }
    }

    /// Replace the cached challenge. A challenge carrying the same nonce as
    /// the cached one keeps the counter, so an `nc` value is never issued
    /// twice for one nonce; a new nonce starts the counter over.
    pub(crate) fn adopt(&self, challenge: DigestChallenge) {
        let mut guard = self.inner.lock();
        match guard.as_mut() {
            Some(state) if state.challenge.nonce == challenge.nonce => {
                state.challenge = challenge;
            }
            _ => {
                *guard = Some(NonceState {
                    challenge,
                    nonce_count: 0,
                });
            }
        }
    }

    /// Drop the cached challenge; the next request starts unauthenticated.
    pub(crate) fn invalidate(&self) {
        *self.inner.lock() = None;
    }

    /// Whether a challenge is cached and requests go out with preemptive
    /// credentials.
    pub(crate) fn has_challenge(&self) -> bool {
        self.inner.lock().is_some()
    }

    #[cfg(test)]
    fn set_nonce_count(&self, count: u32) {
        if let Some(state) = self.inner.lock().as_mut() {
            state.nonce_count = count;
        }
    }
}

fn new_cnonce() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Extract the `WWW-Authenticate` value from a response.
pub(crate) fn challenge_header(headers: &HeaderMap) -> Result<Option<&str>> {
    match headers.get(header::WWW_AUTHENTICATE) {
        Some(value) => value.to_str().map(Some).map_err(|_| {
            IsapiError::ChallengeParse("WWW-Authenticate header is not valid ASCII".into())
        }),
        None => Ok(None),
    }
}

/// What the facade should do with the attempt it just completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    /// Terminal outcome; hand the response to the caller as-is.
    Deliver,
    /// The state was updated from a challenge; resend the same request.
    Retry,
}

/// Retry decisions for one logical request.
///
/// Created fresh per `request()` call; the budget it enforces (one
/// challenge adoption, one stale refresh) is what bounds the handshake at
/// three HTTP exchanges.
#[derive(Debug, Default)]
pub(crate) struct Handshake {
    adopted: bool,
    stale_refreshed: bool,
}

impl Handshake {
    pub(crate) fn new() -> Self {
        Handshake::default()
    }

    /// Classify one completed attempt.
    ///
    /// `credentialed` says whether the attempt carried an `Authorization`
    /// header; a 401 means different things depending on it.
    pub(crate) fn evaluate(
        &mut self,
        state: &AuthState,
        credentialed: bool,
        status: StatusCode,
        www_authenticate: Option<&str>,
    ) -> Result<Disposition> {
        if status != StatusCode::UNAUTHORIZED {
            return Ok(Disposition::Deliver);
        }

        let raw = www_authenticate.ok_or(IsapiError::MissingChallenge)?;
        let challenge = DigestChallenge::parse(raw)?;

        // Reject an unanswerable challenge before it reaches the cache;
        // caching it would fail every later request on the session.
        if let Err(err) = ensure_supported(&challenge) {
            state.invalidate();
            return Err(err);
        }

        if !credentialed {
            if self.adopted {
                // The device challenged an unauthenticated attempt after we
                // already adopted a challenge this request; the state was
                // invalidated underneath us by a concurrent failure. Give
                // up instead of chasing it.
                state.invalidate();
                return Err(IsapiError::InvalidCredentials);
            }
            info!(realm = %challenge.realm, "received challenge, authenticating");
            self.adopted = true;
            state.adopt(challenge);
            return Ok(Disposition::Retry);
        }

        if challenge.stale {
            if self.stale_refreshed {
                warn!("nonce went stale again after a refresh; giving up");
                state.invalidate();
                return Err(IsapiError::NonceRetryExhausted);
            }
            debug!("nonce expired, refreshing challenge");
            self.stale_refreshed = true;
            state.adopt(challenge);
            return Ok(Disposition::Retry);
        }

        warn!("authenticated request rejected; check username and password");
        state.invalidate();
        Err(IsapiError::InvalidCredentials)
    }
}
