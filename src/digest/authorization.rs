//! Digest response computation.
//!
//! [`compute_authorization`] turns credentials, a parsed challenge, and the
//! request line into the value of the `Authorization` header. It is pure:
//! no I/O, no clock, no randomness. The caller supplies the nonce-count and
//! client-nonce, which is what lets the blocking and async facades share it
//! verbatim and what makes the RFC known-answer vectors testable.
//!
//! Only MD5 is implemented. The devices this crate targets never negotiate
//! anything else, and guessing a mapping for `SHA-256` or `MD5-sess` would
//! be worse than refusing cleanly.

use crate::client::Credentials;
use crate::digest::DigestChallenge;
use crate::error::{IsapiError, Result};

/// Compute the `Authorization` header value for one request.
///
/// With `qop` offered, picks `auth` and produces the RFC 2617/7616 form
/// (`response = MD5(HA1:nonce:nc:cnonce:qop:HA2)` with `qop`, `algorithm`,
/// `nc`, and `cnonce` directives). Without `qop`, produces the legacy
/// RFC 2069 form (`response = MD5(HA1:nonce:HA2)`, no extra directives).
/// `opaque` is echoed verbatim when the challenge carried one.
///
/// # Errors
///
/// [`IsapiError::UnsupportedAlgorithm`] for any `algorithm` other than MD5;
/// [`IsapiError::UnsupportedQop`] when the challenge offers a qop list that
/// does not include `auth`.
///
/// # Examples
///
/// ```
/// use isapi_client::{compute_authorization, Credentials, DigestChallenge};
///
/// let challenge = DigestChallenge::parse(r#"Digest realm="cam", nonce="abc""#).unwrap();
/// let credentials = Credentials::new("admin", "secret");
/// let header = compute_authorization(&credentials, &challenge, "GET", "/ISAPI/System/status", 1, "ignored").unwrap();
/// assert!(header.starts_with(r#"Digest username="admin", realm="cam""#));
/// ```
pub fn compute_authorization(
    credentials: &Credentials,
    challenge: &DigestChallenge,
    method: &str,
    uri: &str,
    nonce_count: u32,
    cnonce: &str,
) -> Result<String> {
    ensure_supported(challenge)?;

    let ha1 = md5_hex(&format!(
        "{}:{}:{}",
        credentials.username(),
        challenge.realm,
        credentials.password()
    ));
    let ha2 = md5_hex(&format!("{}:{}", method, uri));

    let mut header = format!(
        r#"Digest username="{}", realm="{}", nonce="{}", uri="{}""#,
        credentials.username(),
        challenge.realm,
        challenge.nonce,
        uri
    );

    let response = match &challenge.qop {
        Some(_) => {
            header.push_str(&format!(
                r#", qop=auth, algorithm=MD5, nc={:08x}, cnonce="{}""#,
                nonce_count, cnonce
            ));
            md5_hex(&format!(
                "{}:{}:{:08x}:{}:auth:{}",
                ha1, challenge.nonce, nonce_count, cnonce, ha2
            ))
        }
        None => md5_hex(&format!("{}:{}:{}", ha1, challenge.nonce, ha2)),
    };

    header.push_str(&format!(r#", response="{}""#, response));
    if let Some(opaque) = &challenge.opaque {
        header.push_str(&format!(r#", opaque="{}""#, opaque));
    }

    Ok(header)
}

/// Check that a challenge only demands capabilities this crate speaks,
/// without computing anything. The session layer runs this before caching
/// a challenge, so an unanswerable one is rejected up front instead of
/// failing every later request.
pub(crate) fn ensure_supported(challenge: &DigestChallenge) -> Result<()> {
    if let Some(algorithm) = &challenge.algorithm {
        if !algorithm.eq_ignore_ascii_case("MD5") {
            return Err(IsapiError::UnsupportedAlgorithm(algorithm.clone()));
        }
    }
    if let Some(offer) = &challenge.qop {
        // The offer is a comma-separated list; only `auth` is spoken here.
        // `auth-int` needs the request body, which the computer never sees.
        if !offer
            .split(',')
            .any(|qop| qop.trim().eq_ignore_ascii_case("auth"))
        {
            return Err(IsapiError::UnsupportedQop(offer.clone()));
        }
    }
    Ok(())
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The RFC 2069 example: no qop, so the header carries no nc/cnonce and
    // is fully determined by the challenge.
    #[test]
    fn test_rfc2069_vector() {
        let challenge = DigestChallenge::parse(
            r#"Digest realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#,
        )
        .unwrap();
        let credentials = Credentials::new("Mufasa", "CircleOfLife");

        let header = compute_authorization(
            &credentials,
            &challenge,
            "GET",
            "/dir/index.html",
            1,
            "unused",
        )
        .unwrap();

        assert_eq!(
            header,
            r#"Digest username="Mufasa", realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", uri="/dir/index.html", response="1949323746fe6a43ef61f9606e7febea", opaque="5ccc069c403ebaf9f0171e9517f40e41""#
        );
    }

    // The RFC 2617 example with qop=auth and a fixed cnonce.
    #[test]
    fn test_rfc2617_vector() {
        let challenge = DigestChallenge::parse(
            r#"Digest realm="testrealm@host.com", qop="auth", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#,
        )
        .unwrap();
        let credentials = Credentials::new("Mufasa", "Circle Of Life");

        let header = compute_authorization(
            &credentials,
            &challenge,
            "GET",
            "/dir/index.html",
            1,
            "0a4f113b",
        )
        .unwrap();

        assert_eq!(
            header,
            r#"Digest username="Mufasa", realm="testrealm@host.com", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", uri="/dir/index.html", qop=auth, algorithm=MD5, nc=00000001, cnonce="0a4f113b", response="6629fae49393a05397450978507c4ef1", opaque="5ccc069c403ebaf9f0171e9517f40e41""#
        );
    }

    // The RFC 7616 MD5 example, which also exercises the qop offer list.
    #[test]
    fn test_rfc7616_md5_vector() {
        let challenge = DigestChallenge::parse(
            r#"Digest realm="http-auth@example.org", qop="auth, auth-int", algorithm=MD5, nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v", opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS""#,
        )
        .unwrap();
        let credentials = Credentials::new("Mufasa", "Circle of Life");

        let header = compute_authorization(
            &credentials,
            &challenge,
            "GET",
            "/dir/index.html",
            1,
            "f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ",
        )
        .unwrap();

        assert!(header.contains(r#"response="8ca523f5e9506fed4657c9700eebdbec""#));
        assert!(header.contains("nc=00000001"));
    }

    #[test]
    fn test_nonce_count_is_zero_padded_hex() {
        let challenge =
            DigestChallenge::parse(r#"Digest realm="cam", nonce="abc", qop="auth""#).unwrap();
        let credentials = Credentials::new("admin", "secret");

        let header =
            compute_authorization(&credentials, &challenge, "GET", "/", 0x1a2, "cn").unwrap();
        assert!(header.contains("nc=000001a2"));
    }

    #[test]
    fn test_sha256_algorithm_rejected() {
        let challenge =
            DigestChallenge::parse(r#"Digest realm="cam", nonce="abc", algorithm=SHA-256"#)
                .unwrap();
        let credentials = Credentials::new("admin", "secret");

        let err = compute_authorization(&credentials, &challenge, "GET", "/", 1, "cn").unwrap_err();
        match err {
            IsapiError::UnsupportedAlgorithm(algorithm) => assert_eq!(algorithm, "SHA-256"),
            other => panic!("expected UnsupportedAlgorithm, got {:?}", other),
        }
    }

    #[test]
    fn test_md5_sess_rejected() {
        let challenge =
            DigestChallenge::parse(r#"Digest realm="cam", nonce="abc", algorithm=MD5-sess"#)
                .unwrap();
        let credentials = Credentials::new("admin", "secret");

        assert!(compute_authorization(&credentials, &challenge, "GET", "/", 1, "cn")
            .unwrap_err()
            .is_auth());
    }

    #[test]
    fn test_qop_without_auth_rejected() {
        let challenge =
            DigestChallenge::parse(r#"Digest realm="cam", nonce="abc", qop="auth-int""#).unwrap();
        let credentials = Credentials::new("admin", "secret");

        let err = compute_authorization(&credentials, &challenge, "GET", "/", 1, "cn").unwrap_err();
        match err {
            IsapiError::UnsupportedQop(offer) => assert_eq!(offer, "auth-int"),
            other => panic!("expected UnsupportedQop, got {:?}", other),
        }
    }

    #[test]
    fn test_algorithm_case_insensitive() {
        let challenge =
            DigestChallenge::parse(r#"Digest realm="cam", nonce="abc", algorithm=md5"#).unwrap();
        let credentials = Credentials::new("admin", "secret");

        assert!(compute_authorization(&credentials, &challenge, "GET", "/", 1, "cn").is_ok());
    }

    #[test]
    fn test_uri_includes_query() {
        let challenge = DigestChallenge::parse(r#"Digest realm="cam", nonce="abc""#).unwrap();
        let credentials = Credentials::new("admin", "secret");

        let header = compute_authorization(
            &credentials,
            &challenge,
            "GET",
            "/ISAPI/Streaming/channels/101?format=json",
            1,
            "cn",
        )
        .unwrap();
        assert!(header.contains(r#"uri="/ISAPI/Streaming/channels/101?format=json""#));
    }
}
