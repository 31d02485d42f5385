//! `WWW-Authenticate` challenge parsing.
//!
//! Device firmware is loose with RFC 7616: directives arrive unquoted, in
//! mixed case, folded across lines, or with vendor extras. The parser is
//! therefore deliberately tolerant:
//!
//! | Quirk | Handling |
//! |-------|----------|
//! | Unquoted values (`realm=device`) | accepted as-is |
//! | Mixed-case directive names (`Realm=`, `NONCE=`) | matched case-insensitively |
//! | Missing `qop` / `opaque` / `algorithm` | recorded as absent, not an error |
//! | Commas inside quoted values (`qop="auth,auth-int"`) | kept together |
//! | Backslash escapes in quoted values | unescaped |
//! | Unknown directives (`domain`, `charset`, …) | ignored |
//!
//! Only two failures are hard ones: a missing `realm` or `nonce` (nothing
//! can be computed without them) and a scheme other than `Digest`.

use std::str::FromStr;

use crate::error::{IsapiError, Result};

/// A parsed Digest challenge from a device's `WWW-Authenticate` header.
///
/// Ephemeral: a new value is built every time the device issues a
/// challenge, and the session cache replaces its copy wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    /// Protection realm the credentials apply to.
    pub realm: String,
    /// Server-issued nonce for this challenge.
    pub nonce: String,
    /// Raw quality-of-protection offer list (e.g. `auth,auth-int`), if any.
    pub qop: Option<String>,
    /// Opaque blob to be echoed back verbatim, if any.
    pub opaque: Option<String>,
    /// Requested hash algorithm token, verbatim, if any. Validated at
    /// response-computation time, not here.
    pub algorithm: Option<String>,
    /// Whether the previous nonce merely expired (credentials were fine).
    pub stale: bool,
}

impl DigestChallenge {
    /// Parse the value of a `WWW-Authenticate` header.
    ///
    /// # Errors
    ///
    /// [`IsapiError::ChallengeParse`] when `realm` or `nonce` is missing or
    /// the header is empty; [`IsapiError::UnsupportedScheme`] when the
    /// challenge uses a scheme other than `Digest`.
    ///
    /// # Examples
    ///
    /// ```
    /// use isapi_client::DigestChallenge;
    ///
    /// let challenge = DigestChallenge::parse(
    ///     r#"Digest realm="IP Camera", qop="auth", nonce="4e4f4e4345", stale=FALSE"#,
    /// ).unwrap();
    /// assert_eq!(challenge.realm, "IP Camera");
    /// assert_eq!(challenge.qop.as_deref(), Some("auth"));
    /// assert!(!challenge.stale);
    /// ```
    pub fn parse(header: &str) -> Result<Self> {
        let header = header.trim();
        if header.is_empty() {
            return Err(IsapiError::ChallengeParse("empty challenge".into()));
        }

        // Scheme token, if present. Some firmware omits it entirely, in
        // which case the first token already looks like `key=value`.
        let directives = match header.find(char::is_whitespace) {
            Some(end) => {
                let scheme = &header[..end];
                if scheme.eq_ignore_ascii_case("digest") {
                    &header[end..]
                } else if scheme.contains('=') {
                    header
                } else {
                    return Err(IsapiError::UnsupportedScheme(scheme.to_string()));
                }
            }
            None if header.contains('=') => header,
            None => return Err(IsapiError::UnsupportedScheme(header.to_string())),
        };

        let mut realm = None;
        let mut nonce = None;
        let mut qop = None;
        let mut opaque = None;
        let mut algorithm = None;
        let mut stale = false;

        for directive in split_directives(directives) {
            let Some((key, raw_value)) = directive.split_once('=') else {
                // Stray token between commas; firmware noise, skip it.
                continue;
            };
            let value = unquote(raw_value);
            match key.trim().to_ascii_lowercase().as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "qop" => qop = Some(value),
                "opaque" => opaque = Some(value),
                "algorithm" => algorithm = Some(value),
                "stale" => stale = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        let realm =
            realm.ok_or_else(|| IsapiError::ChallengeParse("missing `realm` directive".into()))?;
        let nonce =
            nonce.ok_or_else(|| IsapiError::ChallengeParse("missing `nonce` directive".into()))?;

        Ok(DigestChallenge {
            realm,
            nonce,
            qop,
            opaque,
            algorithm,
            stale,
        })
    }
}

impl FromStr for DigestChallenge {
    type Err = IsapiError;

    fn from_str(s: &str) -> Result<Self> {
        DigestChallenge::parse(s)
    }
}

/// Split a directive list on commas, keeping quoted sections together.
fn split_directives(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (index, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&input[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Strip surrounding quotes and resolve backslash escapes; unquoted values
/// pass through trimmed.
fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        let inner = &raw[1..raw.len() - 1];
        if !inner.contains('\\') {
            return inner.to_string();
        }
        let mut out = String::with_capacity(inner.len());
        let mut escaped = false;
        for c in inner.chars() {
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else {
                out.push(c);
            }
        }
        out
    } else {
        raw.to_string()
    }
}
