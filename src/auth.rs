//! Server-side verification of HMAC-signed requests.
//!
//! [`HmacAuthenticator`] holds the pieces parsed from an incoming request and
//! drives the verification sequence: resolve the claimed public key to a
//! shared secret, recompute the MAC over the canonical string, compare it to
//! the claimed digest in constant time, and check the embedded timestamp
//! against the drift window. The credential resolver is an injected
//! [`Service`][tower::Service]; the authenticator performs exactly one
//! resolution per request.

use {
    crate::{
        constants::MSG_BAD_CREDENTIALS, CanonicalRequest, CredentialLookup, GetSecretKeyRequest, GetSecretKeyResponse,
        Principal, SessionData, SignatureAlgorithm, SignatureError,
    },
    chrono::{DateTime, Duration, Utc},
    derive_builder::Builder,
    log::{debug, trace},
    std::future::Future,
    subtle::ConstantTimeEq,
    tower::{BoxError, Service, ServiceExt},
};

/// Low-level structure for verifying a request once its canonical attributes
/// and `Authorization` header have been parsed.
///
/// HmacAuthenticator structs are immutable. Use [`HmacAuthenticatorBuilder`]
/// to construct one.
#[derive(Builder, Clone, Debug)]
#[builder(derive(Debug))]
pub struct HmacAuthenticator {
    /// The canonical form of the incoming request.
    canonical: CanonicalRequest,

    /// The public key claimed in the `Authorization` header.
    #[builder(setter(into))]
    public_key: String,

    /// The digest claimed in the `Authorization` header, as a lowercase hex
    /// string.
    #[builder(setter(into))]
    claimed_digest: String,

    /// The MAC algorithm to verify against.
    #[builder(default)]
    algorithm: SignatureAlgorithm,
}

impl HmacAuthenticator {
    /// Create a builder for `HmacAuthenticator`.
    #[inline(always)]
    pub fn builder() -> HmacAuthenticatorBuilder {
        HmacAuthenticatorBuilder::default()
    }

    /// Retrieve the canonical form of the incoming request.
    #[inline(always)]
    pub fn canonical(&self) -> &CanonicalRequest {
        &self.canonical
    }

    /// Retrieve the public key claimed in the `Authorization` header.
    #[inline(always)]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Retrieve the digest claimed in the `Authorization` header.
    #[inline(always)]
    pub fn claimed_digest(&self) -> &str {
        &self.claimed_digest
    }

    /// Retrieve the MAC algorithm to verify against.
    #[inline(always)]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Verify that the timestamp embedded in the request lies within
    /// `[server_timestamp - allowed_drift, server_timestamp + allowed_drift]`,
    /// inclusive at both bounds.
    pub fn prevalidate(
        &self,
        server_timestamp: DateTime<Utc>,
        allowed_drift: Duration,
    ) -> Result<(), SignatureError> {
        let req_ts = self.canonical.timestamp();
        let min_ts = server_timestamp.checked_sub_signed(allowed_drift).unwrap_or(server_timestamp);
        let max_ts = server_timestamp.checked_add_signed(allowed_drift).unwrap_or(server_timestamp);

        if req_ts < min_ts {
            trace!("prevalidate: request timestamp {} is before minimum timestamp {}", req_ts, min_ts);
            return Err(SignatureError::ClockDrift);
        }

        if req_ts > max_ts {
            trace!("prevalidate: request timestamp {} is after maximum timestamp {}", req_ts, max_ts);
            return Err(SignatureError::ClockDrift);
        }

        Ok(())
    }

    /// Resolve the claimed public key to a shared secret via the injected
    /// credential resolver.
    async fn get_secret_key<S, F>(&self, get_secret_key: &mut S) -> Result<GetSecretKeyResponse, SignatureError>
    where
        S: Service<GetSecretKeyRequest, Response = CredentialLookup, Error = BoxError, Future = F> + Send,
        F: Future<Output = Result<CredentialLookup, BoxError>> + Send,
    {
        let req = GetSecretKeyRequest::builder().public_key(self.public_key()).build().expect("All fields set");

        match get_secret_key.oneshot(req).await {
            Ok(CredentialLookup::Found(response)) => {
                trace!("get_secret_key: got secret key");
                Ok(response)
            }
            Ok(CredentialLookup::Unknown) => {
                debug!("get_secret_key: no credential for public key '{}'", self.public_key());
                Err(SignatureError::UnknownCredential(MSG_BAD_CREDENTIALS.to_string()))
            }
            Err(e) => {
                debug!("get_secret_key: error getting secret key: {}", e);
                match e.downcast::<SignatureError>() {
                    Ok(sig_err) => Err(*sig_err),
                    Err(e) => Err(SignatureError::InternalServiceError(e)),
                }
            }
        }
    }

    /// Validate the request signature.
    ///
    /// The sequence is: resolve the credential, recompute the digest over the
    /// canonical string, compare it to the claimed digest in constant time,
    /// then check the drift window. A digest computed against a stale or
    /// future timestamp is never accepted, even when it matches.
    pub async fn validate_signature<S, F>(
        &self,
        server_timestamp: DateTime<Utc>,
        allowed_drift: Duration,
        get_secret_key: &mut S,
    ) -> Result<HmacAuthenticatorResponse, SignatureError>
    where
        S: Service<GetSecretKeyRequest, Response = CredentialLookup, Error = BoxError, Future = F> + Send,
        F: Future<Output = Result<CredentialLookup, BoxError>> + Send,
    {
        let response = self.get_secret_key(get_secret_key).await?;
        let canonical_string = self.canonical.canonical_string();
        let expected_digest =
            hex::encode(self.algorithm.mac(response.secret_key().as_ref(), canonical_string.as_ref()));
        let is_equal: bool = expected_digest.as_bytes().ct_eq(self.claimed_digest().as_bytes()).into();
        if !is_equal {
            trace!("Digest mismatch: expected '{}', got '{}'", expected_digest, self.claimed_digest());
            return Err(SignatureError::DigestMismatch);
        }

        self.prevalidate(server_timestamp, allowed_drift)?;
        Ok(response.into())
    }
}

/// Upon successful authentication of a signature, this is returned to convey
/// the principal and any session data the credential resolver attached.
///
/// HmacAuthenticatorResponse structs are immutable. Use
/// [`HmacAuthenticatorResponseBuilder`] to construct a new response.
#[derive(Builder, Clone, Debug)]
pub struct HmacAuthenticatorResponse {
    /// The authenticated caller.
    #[builder(setter(into), default)]
    principal: Principal,

    /// The session data associated with the caller.
    #[builder(setter(into), default)]
    session_data: SessionData,
}

impl HmacAuthenticatorResponse {
    /// Create a [`HmacAuthenticatorResponseBuilder`] to construct a
    /// [`HmacAuthenticatorResponse`].
    #[inline]
    pub fn builder() -> HmacAuthenticatorResponseBuilder {
        HmacAuthenticatorResponseBuilder::default()
    }

    /// Retrieve the authenticated caller.
    #[inline]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Retrieve the session data associated with the caller.
    #[inline]
    pub fn session_data(&self) -> &SessionData {
        &self.session_data
    }
}

impl From<GetSecretKeyResponse> for HmacAuthenticatorResponse {
    fn from(response: GetSecretKeyResponse) -> Self {
        HmacAuthenticatorResponse {
            principal: response.principal,
            session_data: response.session_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{
            auth::{HmacAuthenticator, HmacAuthenticatorResponse},
            constants::{TEST_PUBLIC_KEY, TEST_SECRET_KEY},
            service_for_secret_key_fn, CanonicalRequest, CredentialLookup, GetSecretKeyRequest, GetSecretKeyResponse,
            Principal, SecretKey, SignatureAlgorithm, SignatureError,
        },
        bytes::Bytes,
        chrono::{DateTime, Duration, Utc},
        http::method::Method,
        log::LevelFilter,
        std::str::FromStr,
        tower::BoxError,
    };

    const GOOD_DIGEST: &str = "36b060029ae0f36751ee689cc06a0a1a13e5573c";

    fn init() {
        let _ = env_logger::builder().is_test(true).filter_level(LevelFilter::Trace).try_init();
    }

    fn test_timestamp() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1556719200, 0).unwrap()
    }

    fn test_authenticator(claimed_digest: &str) -> HmacAuthenticator {
        let canonical =
            CanonicalRequest::for_signing(&Method::GET, "/test/url?a=1", test_timestamp(), None, Bytes::new());
        HmacAuthenticator::builder()
            .canonical(canonical)
            .public_key(TEST_PUBLIC_KEY)
            .claimed_digest(claimed_digest)
            .build()
            .expect("failed to build HmacAuthenticator")
    }

    async fn get_secret_key(request: GetSecretKeyRequest) -> Result<CredentialLookup, BoxError> {
        match request.public_key() {
            "internal-service-error" => Err("internal service error".into()),
            "io-error" => {
                let e = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
                Err(Box::new(SignatureError::from(e)))
            }
            TEST_PUBLIC_KEY => {
                let response = GetSecretKeyResponse::builder()
                    .principal(Principal::new(TEST_PUBLIC_KEY))
                    .secret_key(SecretKey::from_str(TEST_SECRET_KEY)?)
                    .build()
                    .expect("failed to build GetSecretKeyResponse");
                Ok(CredentialLookup::Found(response))
            }
            _ => Ok(CredentialLookup::Unknown),
        }
    }

    #[test]
    fn test_derived() {
        init();
        let auth = test_authenticator(GOOD_DIGEST);
        assert_eq!(auth.public_key(), TEST_PUBLIC_KEY);
        assert_eq!(auth.claimed_digest(), GOOD_DIGEST);
        assert_eq!(auth.algorithm(), SignatureAlgorithm::HmacSha1);
        assert_eq!(auth.canonical().method(), "GET");
        assert_eq!(auth.clone().public_key(), auth.public_key());
        let _ = format!("{:?}", auth);
    }

    #[test]
    fn test_prevalidate_window() {
        init();
        let auth = test_authenticator(GOOD_DIGEST);
        let drift = Duration::minutes(1);

        // Inclusive at both bounds.
        assert!(auth.prevalidate(test_timestamp(), drift).is_ok());
        assert!(auth.prevalidate(test_timestamp() + drift, drift).is_ok());
        assert!(auth.prevalidate(test_timestamp() - drift, drift).is_ok());

        let e = auth.prevalidate(test_timestamp() + drift + Duration::milliseconds(1), drift).unwrap_err();
        assert!(matches!(e, SignatureError::ClockDrift));
        let e = auth.prevalidate(test_timestamp() - drift - Duration::milliseconds(1), drift).unwrap_err();
        assert!(matches!(e, SignatureError::ClockDrift));
        assert_eq!(e.to_string(), "Bad credentials.");
    }

    #[tokio::test]
    async fn test_validate_signature() {
        init();
        let drift = Duration::minutes(1);
        let mut service = service_for_secret_key_fn(get_secret_key);

        let auth = test_authenticator(GOOD_DIGEST);
        let response =
            auth.validate_signature(test_timestamp(), drift, &mut service.clone()).await.unwrap();
        assert_eq!(response.principal().public_key(), TEST_PUBLIC_KEY);
        assert!(response.session_data().is_empty());

        // An uppercase claimed digest is rejected: the comparison is against
        // the lowercase rendering, and the header parser has already
        // lowercased legitimate input.
        let auth = test_authenticator(GOOD_DIGEST.to_uppercase().as_str());
        let e = auth.validate_signature(test_timestamp(), drift, &mut service.clone()).await.unwrap_err();
        assert!(matches!(e, SignatureError::DigestMismatch));

        let auth = test_authenticator("ce1f7165f74a99ce48727e535852698623daaaad");
        let e = auth.validate_signature(test_timestamp(), drift, &mut service.clone()).await.unwrap_err();
        assert!(matches!(e, SignatureError::DigestMismatch));
        assert_eq!(e.error_code(), "DigestMismatch");
        assert_eq!(e.http_status(), 401);

        // A matching digest with a stale timestamp is never accepted.
        let auth = test_authenticator(GOOD_DIGEST);
        let e = auth
            .validate_signature(test_timestamp() + Duration::minutes(2), drift, &mut service)
            .await
            .unwrap_err();
        assert!(matches!(e, SignatureError::ClockDrift));
    }

    #[tokio::test]
    async fn test_resolver_outcomes() {
        init();
        let drift = Duration::minutes(1);
        let service = service_for_secret_key_fn(get_secret_key);

        let canonical =
            CanonicalRequest::for_signing(&Method::GET, "/test/url?a=1", test_timestamp(), None, Bytes::new());
        let unknown = HmacAuthenticator::builder()
            .canonical(canonical.clone())
            .public_key("01aaa33b-13d6-4eb4-8174-2e6d0d7b9da3")
            .claimed_digest(GOOD_DIGEST)
            .build()
            .unwrap();
        let e = unknown.validate_signature(test_timestamp(), drift, &mut service.clone()).await.unwrap_err();
        assert!(matches!(e, SignatureError::UnknownCredential(_)));
        assert_eq!(e.to_string(), "Bad credentials.");
        assert_eq!(e.error_code(), "UnknownCredential");

        let erroring = HmacAuthenticator::builder()
            .canonical(canonical.clone())
            .public_key("internal-service-error")
            .claimed_digest(GOOD_DIGEST)
            .build()
            .unwrap();
        let e = erroring.validate_signature(test_timestamp(), drift, &mut service.clone()).await.unwrap_err();
        assert!(matches!(e, SignatureError::InternalServiceError(_)));
        assert_eq!(e.to_string(), "internal service error");
        assert_eq!(e.error_code(), "InternalFailure");
        assert_eq!(e.http_status(), 500);
        assert!(!e.is_authentication_failure());

        let io = HmacAuthenticator::builder()
            .canonical(canonical)
            .public_key("io-error")
            .claimed_digest(GOOD_DIGEST)
            .build()
            .unwrap();
        let e = io.validate_signature(test_timestamp(), drift, &mut service.clone()).await.unwrap_err();
        assert!(matches!(e, SignatureError::IO(_)));
        assert_eq!(e.error_code(), "InternalFailure");
    }

    #[test_log::test]
    fn test_response_builder() {
        let response =
            HmacAuthenticatorResponse::builder().build().expect("failed to build HmacAuthenticatorResponse");
        assert!(response.principal().public_key().is_empty());
        assert!(response.session_data().is_empty());

        let response2 = response.clone();
        assert_eq!(format!("{:?}", response), format!("{:?}", response2));
    }
}
