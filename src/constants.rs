//! Common constants used throughout the crate.
//!
//! Consolidated here so the entire crate agrees on these values; if one is
//! spelled incorrectly, at least it can be fixed in one spot.
//!
//! Tests that check the content of an error code or message should not use
//! these constants; they should use hard-coded strings so the tests are also
//! testing for misspellings.
//!
//! Please keep this file organized alphabetically.

/// Default allowed clock drift, in minutes, between the timestamp embedded in
/// a request and the server wall clock at verification time.
pub(crate) const ALLOWED_DRIFT_MINUTES: i64 = 1;

/// Content-Type string for JSON bodies.
pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Error code: ClockDrift
pub(crate) const ERR_CODE_CLOCK_DRIFT: &str = "ClockDrift";

/// Error code: DigestMismatch
pub(crate) const ERR_CODE_DIGEST_MISMATCH: &str = "DigestMismatch";

/// Error code: InternalFailure
pub(crate) const ERR_CODE_INTERNAL_FAILURE: &str = "InternalFailure";

/// Error code: MalformedHeader
pub(crate) const ERR_CODE_MALFORMED_HEADER: &str = "MalformedHeader";

/// Error code: UnknownCredential
pub(crate) const ERR_CODE_UNKNOWN_CREDENTIAL: &str = "UnknownCredential";

/// Error message: `"Secret key must not be empty"`
pub(crate) const ERR_MSG_EMPTY_SECRET_KEY: &str = "Secret key must not be empty";

/// Header for `authorization`
pub(crate) const HDR_AUTHORIZATION: &str = "authorization";

/// Header for `content-type`
pub(crate) const HDR_CONTENT_TYPE: &str = "content-type";

/// RFC 1123 HTTP-date format, rendered in GMT.
pub(crate) const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Error message: `"Bad authorization header."`
pub(crate) const MSG_BAD_AUTHORIZATION_HEADER: &str = "Bad authorization header.";

/// Error message: `"Bad credentials."`
pub(crate) const MSG_BAD_CREDENTIALS: &str = "Bad credentials.";

/// Query parameter carrying the signing timestamp in milliseconds since the
/// Unix epoch.
pub(crate) const QP_TIMESTAMP: &str = "timestamp";

/// Authorization scheme token emitted by the signer.
pub(crate) const SCHEME_HMAC: &str = "hmac";

/// The length of a SHA-1 digest in bytes.
pub(crate) const SHA1_OUTPUT_LEN: usize = 20;

/// The length of a SHA-256 digest in bytes.
pub(crate) const SHA256_OUTPUT_LEN: usize = 32;

/// The public key to use for testing.
#[cfg(test)]
pub(crate) const TEST_PUBLIC_KEY: &str = "7b95a0d1-73f7-4d13-b7c3-19ce40394354";

/// The shared secret to use for testing.
#[cfg(test)]
pub(crate) const TEST_SECRET_KEY: &str = "5b1b2c1c-812e-429d-916c-cee953b4a0e5";
