//! Shared-secret HMAC signing and verification for HTTP requests.
//!
//! A client holds a credential pair: a **public key** that identifies it (not
//! asymmetric-crypto material, just an identifier) and a **secret key**, the
//! shared symmetric secret that keys the MAC. The client reduces each request
//! to a canonical string, MACs it, and attaches the result as an
//! `Authorization` header; the server resolves the claimed public key to the
//! same secret, recomputes the MAC over the request it actually received, and
//! compares the two in constant time. A timestamp embedded in the signed URL
//! bounds replay exposure to a small drift window around the server clock.
//!
//! # Wire format
//! * Header: `Authorization: hmac <publicKey>:<base64(hex(mac))>`. The MAC is
//!   rendered as lowercase hex and *that string* is base64-encoded; peers
//!   depend on the double encoding.
//! * Query parameter: `timestamp=<milliseconds-since-epoch>`, appended to
//!   every signed URL (with `?` or `&` as needed) and covered by the
//!   signature.
//!
//! # Canonical string
//! Five fields joined with `\n`, identical on both sides:
//! 1. The HTTP method, uppercase.
//! 2. The content type, or an empty string when the body is empty.
//! 3. The lowercase hex MD5 of the body, or an empty string when the body is
//!    empty.
//! 4. The embedded timestamp as an RFC 1123 HTTP-date in GMT.
//! 5. The signed URL (path and query, including the timestamp parameter).
//!
//! The default MAC is HMAC-SHA1 (protocol version 1, the interoperable
//! baseline); [`SignatureAlgorithm::HmacSha256`] selects version 2. Both
//! sides must agree on the version out of band.
//!
//! # Replay exposure
//! The drift window (default ±1 minute) bounds how long a captured request
//! stays valid, but a request replayed *within* the window verifies again:
//! there is no nonce or timestamp cache. Deploy behind TLS and treat the
//! window as the replay budget.
//!
//! # Example
//! ```rust
//! use bytes::Bytes;
//! use chrono::Utc;
//! use hmac_simple::{
//!     hmac_validate_request, service_for_secret_key_fn, CredentialLookup, GetSecretKeyRequest,
//!     GetSecretKeyResponse, Principal, RequestSigner, SecretKey, SignatureOptions,
//! };
//! use http::method::Method;
//! use tower::BoxError;
//!
//! const PUBLIC_KEY: &str = "7b95a0d1-73f7-4d13-b7c3-19ce40394354";
//! const SECRET_KEY: &str = "5b1b2c1c-812e-429d-916c-cee953b4a0e5";
//!
//! // This is a mock resolver that recognizes a single credential. For actual
//! // use, you would call out to a database or other store.
//! async fn get_secret_key(request: GetSecretKeyRequest) -> Result<CredentialLookup, BoxError> {
//!     if request.public_key() != PUBLIC_KEY {
//!         return Ok(CredentialLookup::Unknown);
//!     }
//!     let response = GetSecretKeyResponse::builder()
//!         .principal(Principal::new(PUBLIC_KEY))
//!         .secret_key(SECRET_KEY.parse::<SecretKey>()?)
//!         .build()?;
//!     Ok(CredentialLookup::Found(response))
//! }
//!
//! # tokio_test::block_on(async {
//! // Client side: sign a request. Normally the transport would carry it.
//! let signer = RequestSigner::new(PUBLIC_KEY, SECRET_KEY.parse().unwrap());
//! let signed = signer.sign(&Method::GET, "/things?page=1", None, Bytes::new());
//! let request = signed.into_http_request().unwrap();
//!
//! // Server side: normally the request would come from your web framework.
//! let mut service = service_for_secret_key_fn(get_secret_key);
//! let (_parts, _body, response) =
//!     hmac_validate_request(request, &mut service, Utc::now(), SignatureOptions::default())
//!         .await
//!         .unwrap();
//! assert_eq!(response.principal().public_key(), PUBLIC_KEY);
//! # });
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

mod auth;
mod body;
mod canonical;
mod chronoutil;
mod client;
mod constants;
mod crypto;
mod error;
mod header;
mod principal;
mod signature;
mod signer;
mod signing_key;

pub use crate::{
    auth::{
        HmacAuthenticator, HmacAuthenticatorBuilder, HmacAuthenticatorResponse, HmacAuthenticatorResponseBuilder,
    },
    body::IntoRequestBytes,
    canonical::{append_timestamp, CanonicalRequest},
    client::{HmacClient, Transport},
    crypto::SignatureAlgorithm,
    error::{EmptySecretKeyError, SignatureError},
    header::AuthorizationHeader,
    principal::{Principal, PrincipalBuilder, SessionData},
    signature::{hmac_validate_request, SignatureOptions},
    signer::{RequestSigner, RequestSignerBuilder, SignedRequest},
    signing_key::{
        service_for_secret_key_fn, CredentialLookup, GetSecretKeyRequest, GetSecretKeyRequestBuilder,
        GetSecretKeyResponse, GetSecretKeyResponseBuilder, SecretKey,
    },
};
