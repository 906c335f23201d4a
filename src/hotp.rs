//! Counter based codes ([RFC4226](https://www.rfc-editor.org/rfc/rfc4226)).

use hmac::{digest::KeyInit, Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::OtpHashAlgorithm;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Calculates the HMAC digest of the counter, serialized as 8 big-endian
/// bytes, keyed with the decoded secret.
///
/// A fresh HMAC instance is built on every call.
///
/// # Panics
/// Never in practice, HMAC accepts keys of any length
pub fn hmac_digest(key: &[u8], algorithm: OtpHashAlgorithm, counter: u64) -> Vec<u8> {
    let message = counter.to_be_bytes();

    match algorithm {
        OtpHashAlgorithm::SHA1 => sign::<HmacSha1>(key, &message),
        OtpHashAlgorithm::SHA256 => sign::<HmacSha256>(key, &message),
        OtpHashAlgorithm::SHA512 => sign::<HmacSha512>(key, &message),
    }
}

fn sign<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC can take a key of any size");
    mac.update(message);

    mac.finalize().into_bytes().to_vec()
}

/// Dynamic truncation of a digest into a 31-bit integer.
///
/// The low nibble of the last byte selects the offset of four big-endian
/// bytes, whose sign bit is then cleared.
///
/// # Panics
/// If the digest is shorter than 20 bytes
pub fn dynamic_truncate(digest: &[u8]) -> u32 {
    assert!(digest.len() >= 20, "digest is too short to truncate");

    let offset = (digest[digest.len() - 1] & 0xf) as usize;
    let code_bytes = [
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ];

    u32::from_be_bytes(code_bytes) & 0x7fff_ffff
}

/// Generates the untruncated HOTP value for the given counter
pub fn generate(key: &[u8], algorithm: OtpHashAlgorithm, counter: u64) -> u32 {
    let digest = hmac_digest(key, algorithm, counter);

    dynamic_truncate(&digest)
}
