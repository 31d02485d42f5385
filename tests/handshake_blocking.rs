//! Handshake behavior of the blocking client against a live HTTP server.
//!
//! Every test pins the exact number of HTTP exchanges with mockito
//! expectations, which is what the handshake bounds are about.

use isapi_client::{Client, ClientConfig, IsapiError};
use mockito::Matcher;

fn config_for(server: &mockito::ServerGuard) -> ClientConfig {
    let url = url::Url::parse(&server.url()).unwrap();
    ClientConfig::new(url.host_str().unwrap(), "admin", "secret")
        .with_port(url.port().unwrap())
}

const CHALLENGE: &str = r#"Digest realm="IP Camera", qop="auth", nonce="4e4f4e4345", stale=FALSE"#;

#[test]
fn test_first_request_is_exactly_two_exchanges() {
    let mut server = mockito::Server::new();

    let unauth = server
        .mock("GET", "/ISAPI/System/status")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", CHALLENGE)
        .expect(1)
        .create();
    let auth = server
        .mock("GET", "/ISAPI/System/status")
        .match_header("authorization", Matcher::Regex("nc=00000001".into()))
        .with_status(200)
        .with_body("<status>OK</status>")
        .expect(1)
        .create();

    let client = Client::open(config_for(&server)).unwrap();
    let response = client.get("/ISAPI/System/status").unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "<status>OK</status>");
    assert!(client.is_authenticated());
    unauth.assert();
    auth.assert();
}

#[test]
fn test_nonce_count_increases_across_session() {
    let mut server = mockito::Server::new();

    let unauth = server
        .mock("GET", "/ISAPI/System/status")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", CHALLENGE)
        .expect(1)
        .create();
    let counted: Vec<_> = ["nc=00000001", "nc=00000002", "nc=00000003"]
        .into_iter()
        .map(|nc| {
            server
                .mock("GET", "/ISAPI/System/status")
                .match_header("authorization", Matcher::Regex(nc.into()))
                .with_status(200)
                .expect(1)
                .create()
        })
        .collect();

    let client = Client::open(config_for(&server)).unwrap();
    for _ in 0..3 {
        // Only the first logical call pays the 401 round trip; the rest
        // carry preemptive credentials.
        assert_eq!(client.get("/ISAPI/System/status").unwrap().status(), 200);
    }

    unauth.assert();
    for mock in counted {
        mock.assert();
    }
}

#[test]
fn test_stale_nonce_refreshed_once() {
    let mut server = mockito::Server::new();

    let unauth = server
        .mock("GET", "/ISAPI/Event/notification")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header(
            "www-authenticate",
            r#"Digest realm="cam", qop="auth", nonce="n1""#,
        )
        .expect(1)
        .create();
    let expired = server
        .mock("GET", "/ISAPI/Event/notification")
        .match_header("authorization", Matcher::Regex(r#"nonce="n1""#.into()))
        .with_status(401)
        .with_header(
            "www-authenticate",
            r#"Digest realm="cam", qop="auth", nonce="n2", stale=true"#,
        )
        .expect(1)
        .create();
    let refreshed = server
        .mock("GET", "/ISAPI/Event/notification")
        .match_header(
            "authorization",
            Matcher::Regex(r#"nonce="n2".*nc=00000001"#.into()),
        )
        .with_status(200)
        .expect(1)
        .create();

    let client = Client::open(config_for(&server)).unwrap();
    let response = client.get("/ISAPI/Event/notification").unwrap();

    assert_eq!(response.status(), 200);
    unauth.assert();
    expired.assert();
    refreshed.assert();
}

#[test]
fn test_persistent_stale_gives_up_after_three_exchanges() {
    let mut server = mockito::Server::new();

    let churn = server
        .mock("GET", "/ISAPI/System/status")
        .with_status(401)
        .with_header(
            "www-authenticate",
            r#"Digest realm="cam", qop="auth", nonce="n1", stale=true"#,
        )
        .expect(3)
        .create();

    let client = Client::open(config_for(&server)).unwrap();
    let err = client.get("/ISAPI/System/status").unwrap_err();

    assert!(matches!(err, IsapiError::NonceRetryExhausted));
    churn.assert();
}

#[test]
fn test_rejected_credentials_fail_without_looping() {
    let mut server = mockito::Server::new();

    let unauth = server
        .mock("GET", "/ISAPI/System/status")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", CHALLENGE)
        .expect(1)
        .create();
    let rejected = server
        .mock("GET", "/ISAPI/System/status")
        .match_header("authorization", Matcher::Regex("^Digest ".into()))
        .with_status(401)
        .with_header("www-authenticate", CHALLENGE)
        .expect(1)
        .create();

    let client = Client::open(config_for(&server)).unwrap();
    let err = client.get("/ISAPI/System/status").unwrap_err();

    assert!(matches!(err, IsapiError::InvalidCredentials));
    assert!(!client.is_authenticated());
    unauth.assert();
    rejected.assert();
}

#[test]
fn test_malformed_challenge_fails_before_any_retry() {
    let mut server = mockito::Server::new();

    let broken = server
        .mock("GET", "/ISAPI/System/status")
        .with_status(401)
        .with_header("www-authenticate", r#"Digest realm="cam""#)
        .expect(1)
        .create();

    let client = Client::open(config_for(&server)).unwrap();
    let err = client.get("/ISAPI/System/status").unwrap_err();

    assert!(err.is_parse());
    broken.assert();
}

#[test]
fn test_401_without_challenge_header() {
    let mut server = mockito::Server::new();

    let bare = server
        .mock("GET", "/ISAPI/System/status")
        .with_status(401)
        .expect(1)
        .create();

    let client = Client::open(config_for(&server)).unwrap();
    let err = client.get("/ISAPI/System/status").unwrap_err();

    assert!(matches!(err, IsapiError::MissingChallenge));
    bare.assert();
}

#[test]
fn test_device_error_is_delivered_not_raised() {
    let mut server = mockito::Server::new();

    let missing = server
        .mock("GET", "/ISAPI/NoSuchThing")
        .with_status(404)
        .with_body("<ResponseStatus><statusCode>4</statusCode></ResponseStatus>")
        .expect(1)
        .create();

    let client = Client::open(config_for(&server)).unwrap();
    let response = client.get("/ISAPI/NoSuchThing").unwrap();

    assert_eq!(response.status(), 404);
    assert!(!response.is_success());
    assert!(response.error_for_status().is_err());
    missing.assert();
}

#[test]
fn test_unsupported_algorithm_does_not_wedge_session() {
    let mut server = mockito::Server::new();

    // A device demanding SHA-256 fails the request, but the challenge
    // must not be cached.
    let sha = server
        .mock("GET", "/ISAPI/System/status")
        .with_status(401)
        .with_header(
            "www-authenticate",
            r#"Digest realm="cam", qop="auth", nonce="n1", algorithm=SHA-256"#,
        )
        .expect(1)
        .create();

    let client = Client::open(config_for(&server)).unwrap();
    let err = client.get("/ISAPI/System/status").unwrap_err();
    assert!(matches!(err, IsapiError::UnsupportedAlgorithm(_)));
    assert!(!client.is_authenticated());
    sha.assert();

    // After firmware reconfiguration the next logical call goes back on
    // the wire from unauthenticated and completes the MD5 handshake.
    server.reset();
    let unauth = server
        .mock("GET", "/ISAPI/System/status")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", CHALLENGE)
        .expect(1)
        .create();
    let auth = server
        .mock("GET", "/ISAPI/System/status")
        .match_header("authorization", Matcher::Regex("nc=00000001".into()))
        .with_status(200)
        .expect(1)
        .create();

    assert_eq!(client.get("/ISAPI/System/status").unwrap().status(), 200);
    unauth.assert();
    auth.assert();
}

#[test]
fn test_failed_request_does_not_poison_session() {
    let mut server = mockito::Server::new();

    // First logical call: credentials rejected outright.
    let rejected = server
        .mock("GET", "/ISAPI/System/status")
        .with_status(401)
        .with_header("www-authenticate", CHALLENGE)
        .expect(2)
        .create();

    let client = Client::open(config_for(&server)).unwrap();
    assert!(client.get("/ISAPI/System/status").is_err());
    rejected.assert();

    // Second logical call starts over from unauthenticated and succeeds.
    server.reset();
    let unauth = server
        .mock("GET", "/ISAPI/System/status")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("www-authenticate", CHALLENGE)
        .expect(1)
        .create();
    let auth = server
        .mock("GET", "/ISAPI/System/status")
        .match_header("authorization", Matcher::Regex("nc=00000001".into()))
        .with_status(200)
        .expect(1)
        .create();

    assert_eq!(client.get("/ISAPI/System/status").unwrap().status(), 200);
    unauth.assert();
    auth.assert();
}
