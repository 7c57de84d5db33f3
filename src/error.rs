use {
    crate::constants::*,
    http::status::StatusCode,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
        io::Error as IOError,
    },
};

/// Error returned when signing or verifying an HMAC-authenticated request
/// fails.
#[derive(Debug)]
#[non_exhaustive]
pub enum SignatureError {
    /// The embedded request timestamp is outside the allowed drift window, or
    /// the `timestamp` query parameter is missing or unparseable. Displayed
    /// with the same generic message as [`DigestMismatch`][Self::DigestMismatch]
    /// so a caller probing the verifier cannot tell the two apart.
    ClockDrift,

    /// The recomputed digest does not equal the digest claimed in the
    /// `Authorization` header. The message never reveals which canonical
    /// field differed.
    DigestMismatch,

    /// Verification failed due to an underlying I/O error.
    IO(IOError),

    /// Credential resolution failed for an unexpected reason (the lookup
    /// itself errored or panicked), as opposed to reporting an unknown key.
    InternalServiceError(Box<dyn Error + Send + Sync>),

    /// The `Authorization` header is missing or does not match the expected
    /// `scheme publicKey:base64` shape.
    MalformedHeader(/* message */ String),

    /// The credential resolver has no record of the claimed public key.
    UnknownCredential(/* message */ String),
}

impl SignatureError {
    /// A stable, machine-readable code identifying the error variant.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ClockDrift => ERR_CODE_CLOCK_DRIFT,
            Self::DigestMismatch => ERR_CODE_DIGEST_MISMATCH,
            Self::IO(_) | Self::InternalServiceError(_) => ERR_CODE_INTERNAL_FAILURE,
            Self::MalformedHeader(_) => ERR_CODE_MALFORMED_HEADER,
            Self::UnknownCredential(_) => ERR_CODE_UNKNOWN_CREDENTIAL,
        }
    }

    /// The HTTP status a dispatch layer should return for this error:
    /// 401 for authentication-level rejections, 500 for infrastructure
    /// failures.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::IO(_) | Self::InternalServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Whether this error is an authentication-level rejection (the request
    /// was understood and refused) rather than an infrastructure failure.
    pub fn is_authentication_failure(&self) -> bool {
        !matches!(self, Self::IO(_) | Self::InternalServiceError(_))
    }
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::ClockDrift => f.write_str(MSG_BAD_CREDENTIALS),
            Self::DigestMismatch => f.write_str(MSG_BAD_CREDENTIALS),
            Self::IO(ref e) => Display::fmt(e, f),
            Self::InternalServiceError(ref e) => Display::fmt(e, f),
            Self::MalformedHeader(msg) => f.write_str(msg),
            Self::UnknownCredential(msg) => f.write_str(msg),
        }
    }
}

impl Error for SignatureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IO(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<IOError> for SignatureError {
    fn from(e: IOError) -> SignatureError {
        SignatureError::IO(e)
    }
}

impl From<Box<dyn Error + Send + Sync>> for SignatureError {
    fn from(e: Box<dyn Error + Send + Sync>) -> SignatureError {
        match e.downcast::<SignatureError>() {
            Ok(sig_err) => *sig_err,
            Err(e) => SignatureError::InternalServiceError(e),
        }
    }
}

/// Error returned by [`SecretKey`][crate::SecretKey] constructors when the
/// shared secret is empty.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EmptySecretKeyError;

impl Display for EmptySecretKeyError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(ERR_MSG_EMPTY_SECRET_KEY)
    }
}

impl Error for EmptySecretKeyError {}
