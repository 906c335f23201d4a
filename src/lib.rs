pub mod base32;
pub mod hotp;
pub mod totp;

use std::{fmt::Display, str::FromStr};

/// Smallest code width accepted by [`truncate`]
pub const MIN_DIGITS: u32 = 1;
/// Largest code width accepted by [`truncate`]
pub const MAX_DIGITS: u32 = 8;
/// Width used when the caller does not ask for one
pub const DEFAULT_DIGITS: u32 = 6;

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("The secret is empty or only contains whitespace")]
    EmptySecret,
    #[error("Secret decode error")]
    SecretDecode(#[source] base32::Base32Error),
    #[error("Invalid digit count, found {0}. Expected a value between 1 and 8")]
    InvalidDigitCount(u32),
    #[error("Invalid hashing algorithm, found {0}. Expected one of: SHA1, SHA256 or SHA512")]
    InvalidHashingAlgorithm(String),
    #[error("The provided instant is before the UNIX epoch")]
    TimeBeforeEpoch,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtpHashAlgorithm {
    #[default]
    SHA1,
    SHA256,
    SHA512,
}

impl OtpHashAlgorithm {
    /// Length in bytes of the HMAC digest produced with this algorithm
    pub fn digest_len(&self) -> usize {
        match self {
            Self::SHA1 => 20,
            Self::SHA256 => 32,
            Self::SHA512 => 64,
        }
    }
}

impl Display for OtpHashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SHA1 => write!(f, "SHA1"),
            Self::SHA256 => write!(f, "SHA256"),
            Self::SHA512 => write!(f, "SHA512"),
        }
    }
}

impl FromStr for OtpHashAlgorithm {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_uppercase();

        match normalized.as_str() {
            "SHA1" => Ok(Self::SHA1),
            "SHA256" => Ok(Self::SHA256),
            "SHA512" => Ok(Self::SHA512),
            _ => Err(OtpError::InvalidHashingAlgorithm(s.to_string())),
        }
    }
}

/// Fits a raw code into exactly `digits` characters.
///
/// Longer codes keep their least significant (rightmost) digits, shorter
/// ones are left padded with `'0'`.
///
/// ```
/// assert_eq!(otpstep::truncate("5", 6).unwrap(), "000005");
/// assert_eq!(otpstep::truncate("1234567890", 6).unwrap(), "567890");
/// ```
pub fn truncate(code: &str, digits: u32) -> Result<String, OtpError> {
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        return Err(OtpError::InvalidDigitCount(digits));
    }

    let digits = digits as usize;
    let length = code.chars().count();

    if length > digits {
        return Ok(code.chars().skip(length - digits).collect());
    }

    Ok(format!("{code:0>digits$}"))
}
