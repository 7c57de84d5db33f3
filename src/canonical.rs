//! Canonicalization of a request's signed attributes.
//!
//! Both the signer and the verifier reduce a request to the same canonical
//! byte string: five `\n`-joined fields (method, content type, body digest,
//! HTTP-date, signed URL). The two sides must agree bit-for-bit, so the
//! construction here is deliberately the only place in the crate that knows
//! the field order and separators.

use {
    crate::{
        chronoutil::{format_http_date, parse_epoch_millis, truncate_to_millis},
        constants::{HDR_CONTENT_TYPE, QP_TIMESTAMP},
        crypto::md5_hex,
        SignatureError,
    },
    bytes::Bytes,
    chrono::{DateTime, Utc},
    http::{method::Method, request::Parts},
    log::trace,
};

/// A request reduced to the attributes covered by its signature.
///
/// On the signing side this is built from the caller's inputs via
/// [`for_signing`][Self::for_signing], which appends the `timestamp` query
/// parameter to the URL. On the verifying side it is rebuilt from the received
/// request via [`from_request_parts`][Self::from_request_parts], which takes
/// the received path and query verbatim (the timestamp parameter is already
/// part of it).
#[derive(Clone, Debug)]
pub struct CanonicalRequest {
    /// The HTTP method for the request (e.g., "GET", "POST", etc.)
    method: String,

    /// The request path and query string, including the `timestamp` query
    /// parameter. This exact string is the final canonical field.
    signed_url: String,

    /// The signing timestamp, at millisecond precision.
    timestamp: DateTime<Utc>,

    /// The content type of the request body, if any was supplied.
    content_type: Option<String>,

    /// The raw request body. Empty for query-style requests.
    body: Bytes,
}

impl CanonicalRequest {
    /// Create a `CanonicalRequest` for an outgoing request.
    ///
    /// The timestamp is truncated to millisecond precision (the precision of
    /// the `timestamp` query parameter) so that the value a verifier
    /// reconstructs from the URL is identical to the value signed here.
    pub fn for_signing(
        method: &Method,
        url: &str,
        timestamp: DateTime<Utc>,
        content_type: Option<String>,
        body: Bytes,
    ) -> Self {
        let timestamp = truncate_to_millis(timestamp);
        let signed_url = append_timestamp(url, &timestamp);

        CanonicalRequest {
            method: method.as_str().to_uppercase(),
            signed_url,
            timestamp,
            content_type,
            body,
        }
    }

    /// Create a `CanonicalRequest` from an incoming HTTP request's [`Parts`]
    /// and a body of [`Bytes`].
    ///
    /// The signed URL is the received path and query, verbatim. The signing
    /// timestamp is read back from the `timestamp` query parameter; a missing
    /// or unparseable parameter can never satisfy the drift check, so it is
    /// rejected as [`SignatureError::ClockDrift`].
    pub fn from_request_parts(parts: Parts, body: Bytes) -> Result<(Self, Parts, Bytes), SignatureError> {
        let signed_url = match parts.uri.path_and_query() {
            Some(pq) => pq.as_str().to_string(),
            None => parts.uri.path().to_string(),
        };

        let timestamp = match embedded_timestamp(parts.uri.query().unwrap_or("")) {
            Some(ts) => ts,
            None => {
                trace!("from_request_parts: no usable timestamp parameter in '{}'", signed_url);
                return Err(SignatureError::ClockDrift);
            }
        };

        let content_type = match parts.headers.get(HDR_CONTENT_TYPE) {
            None => None,
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| SignatureError::MalformedHeader("Bad content-type header.".to_string()))?
                    .to_string(),
            ),
        };

        let canonical = CanonicalRequest {
            method: parts.method.as_str().to_uppercase(),
            signed_url,
            timestamp,
            content_type,
            body: body.clone(),
        };

        Ok((canonical, parts, body))
    }

    /// Retrieve the HTTP request method.
    #[inline(always)]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Retrieve the signed URL (path and query including the `timestamp`
    /// parameter).
    #[inline(always)]
    pub fn signed_url(&self) -> &str {
        &self.signed_url
    }

    /// Retrieve the signing timestamp.
    #[inline(always)]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Retrieve the content type of the request body, if any.
    #[inline(always)]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Retrieve the raw request body.
    #[inline(always)]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Build the canonical string the MAC is computed over.
    ///
    /// Five fields joined with `\n`: method, content type, body digest,
    /// HTTP-date, signed URL. The content type and body digest fields are
    /// empty strings when the body is empty; the separators are kept so the
    /// field count never changes.
    pub fn canonical_string(&self) -> Vec<u8> {
        let content_type = if self.body.is_empty() {
            ""
        } else {
            self.content_type.as_deref().unwrap_or("")
        };
        let content_md5 = if self.body.is_empty() {
            String::new()
        } else {
            md5_hex(self.body.as_ref())
        };
        let date = format_http_date(&self.timestamp);

        let mut result = Vec::with_capacity(
            self.method.len() + content_type.len() + content_md5.len() + date.len() + self.signed_url.len() + 4,
        );
        result.extend(self.method.as_bytes());
        result.push(b'\n');
        result.extend(content_type.as_bytes());
        result.push(b'\n');
        result.extend(content_md5.as_bytes());
        result.push(b'\n');
        result.extend(date.as_bytes());
        result.push(b'\n');
        result.extend(self.signed_url.as_bytes());

        trace!("Canonical string:\n{}", String::from_utf8_lossy(&result));

        result
    }
}

/// Append the `timestamp=<epoch-millis>` query parameter to a URL, using `?`
/// if the URL has no query string and `&` otherwise. The appended parameter
/// is part of the signed URL, not optional decoration.
pub fn append_timestamp(url: &str, timestamp: &DateTime<Utc>) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, QP_TIMESTAMP, timestamp.timestamp_millis())
}

/// Find the `timestamp` query parameter and parse it as epoch milliseconds.
/// The first occurrence wins.
fn embedded_timestamp(query: &str) -> Option<DateTime<Utc>> {
    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if key == QP_TIMESTAMP {
                return parse_epoch_millis(value).ok();
            }
        }
    }
    None
}
