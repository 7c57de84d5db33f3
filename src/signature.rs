use {
    crate::{
        auth::HmacAuthenticatorResponse,
        constants::{ALLOWED_DRIFT_MINUTES, HDR_AUTHORIZATION, MSG_BAD_AUTHORIZATION_HEADER},
        AuthorizationHeader, CanonicalRequest, CredentialLookup, GetSecretKeyRequest, HmacAuthenticator,
        IntoRequestBytes, SignatureAlgorithm, SignatureError,
    },
    bytes::Bytes,
    chrono::{DateTime, Duration, Utc},
    http::request::{Parts, Request},
    log::trace,
    std::future::Future,
    tower::{BoxError, Service},
};

/// Options that can be used to configure signature verification.
#[derive(Clone, Copy, Debug)]
pub struct SignatureOptions {
    /// The MAC algorithm (protocol version) to verify against.
    pub algorithm: SignatureAlgorithm,

    /// The allowed clock drift between the timestamp embedded in a request
    /// and the server wall clock, applied symmetrically around "now".
    pub allowed_drift: Duration,
}

impl SignatureOptions {
    /// Create a `SignatureOptions` verifying against the given algorithm with
    /// the default drift window.
    pub fn for_algorithm(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            algorithm: SignatureAlgorithm::default(),
            allowed_drift: Duration::minutes(ALLOWED_DRIFT_MINUTES),
        }
    }
}

/// Validate an HMAC-signed request.
///
/// This takes in an HTTP [`Request`] along with the verification parameters.
/// If validation is successful (i.e. the request is properly signed with a
/// known public key and its timestamp is within the drift window), this
/// returns:
/// * The request headers (as HTTP [`Parts`]).
/// * The request body (as a [`Bytes`] object, which is empty if no body was
///   provided).
/// * The [response from the authenticator][HmacAuthenticatorResponse], which
///   contains the principal and any session data the credential resolver
///   attached.
///
/// # Parameters
/// * `request` - The HTTP [`Request`] to validate.
/// * `get_secret_key` - A service that resolves a public key to the caller's
///   shared secret.
/// * `server_timestamp` - The timestamp of the server when the request was
///   received. Usually this is the current time, `Utc::now()`.
/// * `options` - [`SignatureOptions`] selecting the protocol version and the
///   drift window. For most services, use `SignatureOptions::default()`.
///
/// # Errors
/// This function returns a [`SignatureError`] if the request is not properly
/// signed. Authentication-level rejections (bad header, unknown key, digest
/// mismatch, clock drift) report `401` via
/// [`http_status`][SignatureError::http_status]; resolver failures report
/// `500` so a dispatch layer can distinguish "bad request" from "dependency
/// unavailable".
pub async fn hmac_validate_request<B, G, F>(
    request: Request<B>,
    get_secret_key: &mut G,
    server_timestamp: DateTime<Utc>,
    options: SignatureOptions,
) -> Result<(Parts, Bytes, HmacAuthenticatorResponse), SignatureError>
where
    B: IntoRequestBytes,
    G: Service<GetSecretKeyRequest, Response = CredentialLookup, Error = BoxError, Future = F> + Send,
    F: Future<Output = Result<CredentialLookup, BoxError>> + Send,
{
    let (parts, body) = request.into_parts();
    let body = body.into_request_bytes().await.map_err(SignatureError::from)?;

    let auth_header = match parts.headers.get(HDR_AUTHORIZATION) {
        Some(value) => value
            .to_str()
            .map_err(|_| SignatureError::MalformedHeader(MSG_BAD_AUTHORIZATION_HEADER.to_string()))?,
        None => return Err(SignatureError::MalformedHeader(MSG_BAD_AUTHORIZATION_HEADER.to_string())),
    };
    let header = AuthorizationHeader::parse(auth_header)?;

    let (canonical, parts, body) = CanonicalRequest::from_request_parts(parts, body)?;
    trace!("Created canonical request: {:?}", canonical);

    let auth = HmacAuthenticator::builder()
        .canonical(canonical)
        .public_key(header.public_key())
        .claimed_digest(header.digest_hex())
        .algorithm(options.algorithm)
        .build()
        .expect("All fields set");
    trace!("Created authenticator: {:?}", auth);

    let response = auth.validate_signature(server_timestamp, options.allowed_drift, get_secret_key).await?;

    Ok((parts, body, response))
}
