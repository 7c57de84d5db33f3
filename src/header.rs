//! Encoding and parsing of the `Authorization` header.
//!
//! The wire format is `hmac <publicKey>:<base64>` where the base64 payload is
//! the lowercase hex rendering of the MAC, re-encoded as base64. The
//! hex-then-base64 double hop is a protocol constant; peers depend on it, so
//! it must not be "simplified" to base64 of the raw digest bytes.

use {
    crate::{
        constants::{MSG_BAD_AUTHORIZATION_HEADER, SCHEME_HMAC},
        SignatureError,
    },
    base64::{engine::general_purpose::STANDARD as BASE64, Engine},
    lazy_static::lazy_static,
    regex::Regex,
};

lazy_static! {
    /// Lowercase hex string, as produced by rendering a digest.
    static ref HEX_DIGEST: Regex = Regex::new("^[0-9a-f]+$").unwrap();
}

/// The parsed contents of an `Authorization` header.
///
/// The scheme token is captured but not constrained: historically some
/// deployments rewrote it in transit, and the signature does not cover it.
/// The encoder always emits `hmac`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthorizationHeader {
    /// The scheme token, e.g. `hmac`.
    scheme: String,

    /// The public key identifying the caller.
    public_key: String,

    /// The claimed digest as a lowercase hex string.
    digest_hex: String,
}

impl AuthorizationHeader {
    /// Encode an `Authorization` header value from a public key and a raw MAC
    /// digest.
    pub fn encode(public_key: &str, digest: &[u8]) -> String {
        let digest_hex = hex::encode(digest);
        format!("{} {}:{}", SCHEME_HMAC, public_key, BASE64.encode(digest_hex.as_bytes()))
    }

    /// Parse an `Authorization` header value of the form
    /// `<scheme> <publicKey>:<base64>`.
    ///
    /// The base64 payload must decode to a hex string (uppercase hex is
    /// accepted and lowercased). Anything else fails with
    /// [`SignatureError::MalformedHeader`].
    pub fn parse(value: &str) -> Result<Self, SignatureError> {
        let malformed = || SignatureError::MalformedHeader(MSG_BAD_AUTHORIZATION_HEADER.to_string());

        let value = value.trim_end_matches(' ');
        let (scheme, credentials) = value.split_once(' ').ok_or_else(malformed)?;
        if scheme.is_empty() {
            return Err(malformed());
        }

        // Repeated spaces between the scheme and the credentials are allowed.
        let credentials = credentials.trim_start_matches(' ');
        let (public_key, digest_b64) = credentials.split_once(':').ok_or_else(malformed)?;
        if public_key.is_empty() || public_key.contains(' ') || digest_b64.is_empty() || digest_b64.contains(' ') {
            return Err(malformed());
        }

        let decoded = BASE64.decode(digest_b64).map_err(|_| malformed())?;
        let digest_hex = String::from_utf8(decoded).map_err(|_| malformed())?.to_ascii_lowercase();
        if !HEX_DIGEST.is_match(&digest_hex) {
            return Err(malformed());
        }

        Ok(AuthorizationHeader {
            scheme: scheme.to_string(),
            public_key: public_key.to_string(),
            digest_hex,
        })
    }

    /// Retrieve the scheme token.
    #[inline(always)]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Retrieve the public key identifying the caller.
    #[inline(always)]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Retrieve the claimed digest as a lowercase hex string.
    #[inline(always)]
    pub fn digest_hex(&self) -> &str {
        &self.digest_hex
    }
}
