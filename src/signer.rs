//! Client-side request signing.

use {
    crate::{
        constants::{HDR_AUTHORIZATION, HDR_CONTENT_TYPE},
        AuthorizationHeader, CanonicalRequest, SecretKey, SignatureAlgorithm, SignatureError,
    },
    bytes::Bytes,
    chrono::{DateTime, Utc},
    derive_builder::Builder,
    http::{method::Method, request::Request},
    log::trace,
};

/// Signs outgoing requests with a shared secret.
///
/// The signer holds a credential (public key + secret key) and a protocol
/// version; [`sign`][Self::sign] reduces a request to its canonical string,
/// computes the MAC, and returns a [`SignedRequest`] carrying the
/// timestamp-augmented URL and the `Authorization` header value. The signer
/// never performs network I/O itself; transmission belongs to a
/// [`Transport`][crate::Transport] supplied by the caller.
///
/// RequestSigner structs are immutable. Use [`RequestSignerBuilder`] (or
/// [`RequestSigner::new`]) to construct one.
#[derive(Builder, Clone, Debug)]
pub struct RequestSigner {
    /// The public key identifying the caller.
    #[builder(setter(into))]
    public_key: String,

    /// The shared secret keying the MAC.
    secret_key: SecretKey,

    /// The MAC algorithm (protocol version) to sign with.
    #[builder(default)]
    algorithm: SignatureAlgorithm,
}

impl RequestSigner {
    /// Create a [`RequestSignerBuilder`] to construct a [`RequestSigner`].
    #[inline]
    pub fn builder() -> RequestSignerBuilder {
        RequestSignerBuilder::default()
    }

    /// Create a `RequestSigner` using the default protocol version.
    pub fn new(public_key: impl Into<String>, secret_key: SecretKey) -> Self {
        RequestSigner {
            public_key: public_key.into(),
            secret_key,
            algorithm: SignatureAlgorithm::default(),
        }
    }

    /// Retrieve the public key identifying the caller.
    #[inline]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Retrieve the MAC algorithm the signer uses.
    #[inline]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Sign a request, capturing the timestamp from the wall clock.
    ///
    /// `url` is the path and query to request, without scheme or authority
    /// (e.g. `/things?page=1`); the signed URL gains a `timestamp` query
    /// parameter. `content_type` and `body` are empty for query-style
    /// requests (GET/DELETE).
    pub fn sign(&self, method: &Method, url: &str, content_type: Option<&str>, body: Bytes) -> SignedRequest {
        self.sign_at(method, url, content_type, body, Utc::now())
    }

    /// Sign a request at an explicit timestamp.
    ///
    /// This is the injectable-clock variant of [`sign`][Self::sign]; tests
    /// and retry layers use it to pin the signing time. The timestamp is
    /// truncated to millisecond precision, the precision embedded in the
    /// signed URL.
    pub fn sign_at(
        &self,
        method: &Method,
        url: &str,
        content_type: Option<&str>,
        body: Bytes,
        timestamp: DateTime<Utc>,
    ) -> SignedRequest {
        let canonical =
            CanonicalRequest::for_signing(method, url, timestamp, content_type.map(str::to_string), body);
        let canonical_string = canonical.canonical_string();
        trace!("Signing canonical string:\n{}", String::from_utf8_lossy(&canonical_string));

        let digest = self.algorithm.mac(self.secret_key.as_ref(), canonical_string.as_ref());
        let authorization = AuthorizationHeader::encode(&self.public_key, &digest);

        SignedRequest {
            method: method.clone(),
            url: canonical.signed_url().to_string(),
            authorization,
            content_type: canonical.content_type().map(str::to_string),
            body: canonical.body().clone(),
            timestamp: canonical.timestamp(),
        }
    }
}

/// A signed request, ready to hand to a transport.
///
/// Carries everything the transport needs (URL, headers, body) plus the
/// timestamp that was signed, so a caller can correlate requests to signing
/// time for diagnostics and retries.
#[derive(Clone, Debug)]
pub struct SignedRequest {
    /// The HTTP method.
    method: Method,

    /// The path and query to request, including the `timestamp` parameter.
    url: String,

    /// The `Authorization` header value.
    authorization: String,

    /// The content type of the body, if any.
    content_type: Option<String>,

    /// The request body. Empty for query-style requests.
    body: Bytes,

    /// The timestamp that was signed, at millisecond precision.
    timestamp: DateTime<Utc>,
}

impl SignedRequest {
    /// Retrieve the HTTP method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Retrieve the path and query to request, including the `timestamp`
    /// parameter.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Retrieve the `Authorization` header value.
    #[inline]
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// Retrieve the content type of the body, if any.
    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Retrieve the request body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Retrieve the timestamp that was signed.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Render this as an [`http::Request`], with the `Authorization` header
    /// (and `Content-Type`, when a content type was supplied) populated.
    pub fn into_http_request(self) -> Result<Request<Bytes>, SignatureError> {
        let mut builder = Request::builder()
            .method(self.method)
            .uri(self.url.as_str())
            .header(HDR_AUTHORIZATION, self.authorization.as_str());
        if let Some(content_type) = self.content_type.as_deref() {
            builder = builder.header(HDR_CONTENT_TYPE, content_type);
        }
        builder.body(self.body).map_err(|e| SignatureError::InternalServiceError(Box::new(e)))
    }
}
