//! Keyed-hash and digest primitives used by the signing protocol.

use {
    crate::constants::{SHA1_OUTPUT_LEN, SHA256_OUTPUT_LEN},
    hmac::{Hmac, Mac},
    md5::{Digest, Md5},
    sha1::Sha1,
    sha2::Sha256,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Wrapper function to form a HMAC-SHA1 operation.
#[inline(always)]
pub(crate) fn hmac_sha1(key: &[u8], value: &[u8]) -> [u8; SHA1_OUTPUT_LEN] {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(value);
    let mut result = [0; SHA1_OUTPUT_LEN];
    result.copy_from_slice(mac.finalize().into_bytes().as_ref());
    result
}

/// Wrapper function to form a HMAC-SHA256 operation.
#[inline(always)]
pub(crate) fn hmac_sha256(key: &[u8], value: &[u8]) -> [u8; SHA256_OUTPUT_LEN] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(value);
    let mut result = [0; SHA256_OUTPUT_LEN];
    result.copy_from_slice(mac.finalize().into_bytes().as_ref());
    result
}

/// Lowercase hex MD5 digest of the given bytes.
#[inline(always)]
pub(crate) fn md5_hex(value: &[u8]) -> String {
    hex::encode(Md5::digest(value))
}

/// The keyed-hash algorithm used to compute a request MAC.
///
/// Each variant is a distinct protocol version; a signer and verifier must
/// agree on the algorithm out of band.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum SignatureAlgorithm {
    /// Protocol version 1: HMAC-SHA1. The backward-compatible baseline.
    #[default]
    HmacSha1,

    /// Protocol version 2: HMAC-SHA256.
    HmacSha256,
}

impl SignatureAlgorithm {
    /// The wire name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            Self::HmacSha1 => "hmac-sha1",
            Self::HmacSha256 => "hmac-sha256",
        }
    }

    /// Compute the MAC of `value` keyed with `key`.
    pub(crate) fn mac(&self, key: &[u8], value: &[u8]) -> Vec<u8> {
        match self {
            Self::HmacSha1 => hmac_sha1(key, value).to_vec(),
            Self::HmacSha256 => hmac_sha256(key, value).to_vec(),
        }
    }
}

impl Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(self.name())
    }
}
