use {
    crate::{EmptySecretKeyError, Principal, SessionData},
    derive_builder::Builder,
    std::{
        fmt::{Debug, Display, Formatter, Result as FmtResult},
        future::Future,
        str::FromStr,
    },
    tower::{service_fn, util::ServiceFn, BoxError},
};

/// The shared secret that keys a request MAC.
///
/// The key material is never printed: `Debug` and `Display` render as
/// `SecretKey`.
#[derive(Clone, Eq, PartialEq)]
pub struct SecretKey {
    /// The raw key bytes.
    key: Vec<u8>,
}

impl SecretKey {
    /// Create a new `SecretKey` from raw bytes. The key must not be empty.
    pub fn new(key: impl Into<Vec<u8>>) -> Result<Self, EmptySecretKeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(EmptySecretKeyError);
        }
        Ok(Self {
            key,
        })
    }
}

impl AsRef<[u8]> for SecretKey {
    fn as_ref(&self) -> &[u8] {
        &self.key
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("SecretKey")
    }
}

impl Display for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("SecretKey")
    }
}

impl FromStr for SecretKey {
    type Err = EmptySecretKeyError;

    /// Create a new `SecretKey` from a raw shared secret string.
    fn from_str(raw: &str) -> Result<Self, EmptySecretKeyError> {
        Self::new(raw.as_bytes().to_vec())
    }
}

/// A request for the shared secret associated with a public key.
///
/// GetSecretKeyRequest structs are immutable. Use [`GetSecretKeyRequestBuilder`]
/// to programmatically construct a request.
#[derive(Builder, Clone, Debug)]
#[non_exhaustive]
pub struct GetSecretKeyRequest {
    /// The public key claimed in the request's `Authorization` header.
    #[builder(setter(into))]
    public_key: String,
}

impl GetSecretKeyRequest {
    /// Create a [`GetSecretKeyRequestBuilder`] to construct a
    /// [`GetSecretKeyRequest`].
    #[inline]
    pub fn builder() -> GetSecretKeyRequestBuilder {
        GetSecretKeyRequestBuilder::default()
    }

    /// Retrieve the public key claimed in the request.
    #[inline]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

/// A successful response from the credential resolver.
///
/// GetSecretKeyResponse structs are immutable. Use
/// [`GetSecretKeyResponseBuilder`] to construct a response.
#[derive(Builder, Clone, Debug)]
pub struct GetSecretKeyResponse {
    /// The caller associated with the public key.
    #[builder(setter(into), default)]
    pub(crate) principal: Principal,

    /// Auxiliary data to carry through to the dispatch layer.
    #[builder(setter(into), default)]
    pub(crate) session_data: SessionData,

    /// The shared secret for the caller.
    pub(crate) secret_key: SecretKey,
}

impl GetSecretKeyResponse {
    /// Create a [`GetSecretKeyResponseBuilder`] to construct a
    /// [`GetSecretKeyResponse`].
    #[inline]
    pub fn builder() -> GetSecretKeyResponseBuilder {
        GetSecretKeyResponseBuilder::default()
    }

    /// Retrieve the caller associated with the public key.
    #[inline]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Retrieve the auxiliary data attached by the resolver.
    #[inline]
    pub fn session_data(&self) -> &SessionData {
        &self.session_data
    }

    /// Retrieve the shared secret for the caller.
    #[inline]
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

/// The outcome of a credential lookup.
///
/// A resolver distinguishes three cases: the key is known
/// (`Found`), the key is not in its records (`Unknown`), and the lookup
/// itself failed (the service's `Err`, an infrastructure failure). `Unknown`
/// is an authentication-level rejection and must not be reported as an error.
#[derive(Clone, Debug)]
pub enum CredentialLookup {
    /// The public key is known; the caller's secret and identity follow.
    Found(GetSecretKeyResponse),

    /// The resolver has no record of the public key.
    Unknown,
}

impl CredentialLookup {
    /// Whether this lookup found a credential.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Convert into the response, if the lookup found a credential.
    pub fn into_found(self) -> Option<GetSecretKeyResponse> {
        match self {
            Self::Found(response) => Some(response),
            Self::Unknown => None,
        }
    }
}

impl From<GetSecretKeyResponse> for CredentialLookup {
    fn from(response: GetSecretKeyResponse) -> Self {
        Self::Found(response)
    }
}

/// Create a [`Service`][tower::Service] that wraps a function that can
/// resolve a public key to its shared secret.
pub fn service_for_secret_key_fn<F, Fut>(f: F) -> ServiceFn<F>
where
    F: FnOnce(GetSecretKeyRequest) -> Fut + Send + 'static,
    Fut: Future<Output = Result<CredentialLookup, BoxError>> + Send + 'static,
{
    service_fn(f)
}

#[cfg(test)]
mod tests {
    use {
        crate::{
            constants::{TEST_PUBLIC_KEY, TEST_SECRET_KEY},
            service_for_secret_key_fn, CredentialLookup, GetSecretKeyRequest, GetSecretKeyResponse, Principal,
            SecretKey, SessionData,
        },
        std::str::FromStr,
        tower::{BoxError, Service, ServiceExt},
    };

    #[test_log::test]
    fn test_secret_key_derived() {
        let key1a = SecretKey::from_str(TEST_SECRET_KEY).unwrap();
        let key1b = SecretKey::from_str(TEST_SECRET_KEY).unwrap();
        let key2 = SecretKey::from_str("e3ce629e-fdc5-4b49-a186-59fbf3f56262").unwrap();

        assert_eq!(key1a, key1b);
        assert_eq!(key1a, key1a.clone());
        assert_ne!(key1a, key2);
        assert_eq!(key1a.as_ref(), TEST_SECRET_KEY.as_bytes());

        // The key material must never appear in diagnostics.
        assert_eq!(format!("{:?}", key1a).as_str(), "SecretKey");
        assert_eq!(format!("{}", key1a).as_str(), "SecretKey");

        assert!(SecretKey::from_str("").is_err());
        assert!(SecretKey::new(Vec::new()).is_err());
        assert!(SecretKey::new(b"raw-bytes".to_vec()).is_ok());
    }

    #[test_log::test]
    fn test_request_response_derived() {
        let request = GetSecretKeyRequest::builder().public_key(TEST_PUBLIC_KEY).build().unwrap();
        assert_eq!(request.public_key(), TEST_PUBLIC_KEY);
        let request2 = request.clone();
        assert_eq!(request.public_key(), request2.public_key());
        let _ = format!("{:?}", request);

        let mut session_data = SessionData::new();
        session_data.insert("role", "admin");
        let response = GetSecretKeyResponse::builder()
            .principal(Principal::new(TEST_PUBLIC_KEY))
            .session_data(session_data)
            .secret_key(SecretKey::from_str(TEST_SECRET_KEY).unwrap())
            .build()
            .expect("failed to build GetSecretKeyResponse");
        assert_eq!(response.principal().public_key(), TEST_PUBLIC_KEY);
        assert_eq!(response.session_data().get("role"), Some("admin"));
        assert_eq!(response.secret_key().as_ref(), TEST_SECRET_KEY.as_bytes());

        // Secret keys are required; the builder must refuse to omit one.
        assert!(GetSecretKeyResponse::builder().principal(Principal::new("pk")).build().is_err());
    }

    #[test_log::test]
    fn test_credential_lookup() {
        let response = GetSecretKeyResponse::builder()
            .secret_key(SecretKey::from_str(TEST_SECRET_KEY).unwrap())
            .build()
            .unwrap();
        let lookup = CredentialLookup::from(response);
        assert!(lookup.is_found());
        assert!(lookup.clone().into_found().is_some());

        let unknown = CredentialLookup::Unknown;
        assert!(!unknown.is_found());
        assert!(unknown.clone().into_found().is_none());
        let _ = format!("{:?}", unknown);
    }

    #[tokio::test]
    async fn test_service_for_secret_key_fn() {
        async fn get_secret_key(request: GetSecretKeyRequest) -> Result<CredentialLookup, BoxError> {
            if request.public_key() != TEST_PUBLIC_KEY {
                return Ok(CredentialLookup::Unknown);
            }
            let response =
                GetSecretKeyResponse::builder().secret_key(SecretKey::from_str(TEST_SECRET_KEY)?).build()?;
            Ok(response.into())
        }

        let mut service = service_for_secret_key_fn(get_secret_key);
        let request = GetSecretKeyRequest::builder().public_key(TEST_PUBLIC_KEY).build().unwrap();
        let lookup = service.ready().await.unwrap().call(request).await.unwrap();
        assert!(lookup.is_found());

        let mut service = service_for_secret_key_fn(get_secret_key);
        let request = GetSecretKeyRequest::builder().public_key("someone-else").build().unwrap();
        let lookup = service.ready().await.unwrap().call(request).await.unwrap();
        assert!(!lookup.is_found());
    }
}
