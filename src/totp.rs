use std::time::{SystemTime, UNIX_EPOCH};

use crate::{base32, hotp, OtpError, OtpHashAlgorithm};

/// Length of a time step, in seconds
pub const TIME_STEP_SECONDS: u64 = 30;

/// Generator for the [Time-based One-time Password Algorithm](http://en.wikipedia.org/wiki/Time-based_One-time_Password_Algorithm)
/// (TOTP) with a fixed 30 seconds period.
///
/// Only the secret is stored; the hash algorithm and the code width are
/// chosen per call, so a single instance can be shared between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Totp {
    secret: String,
}

impl Totp {
    /// Creates a generator from an RFC4648 base32 encoded secret.
    ///
    /// The secret is only checked for emptiness here, invalid characters
    /// are reported by the generation methods.
    pub fn new(secret: impl Into<String>) -> Result<Self, OtpError> {
        let secret = secret.into();

        if secret.trim().is_empty() {
            return Err(OtpError::EmptySecret);
        }

        Ok(Self { secret })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Generates the untruncated code for the provided seconds since the
    /// UNIX epoch, as a decimal string without leading zeros.
    ///
    /// Use [`crate::truncate`] to fit it into a given number of digits.
    pub fn generate_code(
        &self,
        seconds_since_epoch: u64,
        algorithm: OtpHashAlgorithm,
    ) -> Result<String, OtpError> {
        let key = base32::decode(&self.secret).map_err(OtpError::SecretDecode)?;
        let code = hotp::generate(&key, algorithm, time_step(seconds_since_epoch));

        Ok(code.to_string())
    }

    /// Same as [`Totp::generate_code`] for an instant given as [`SystemTime`]
    pub fn generate_code_at(
        &self,
        instant: SystemTime,
        algorithm: OtpHashAlgorithm,
    ) -> Result<String, OtpError> {
        self.generate_code(seconds_since_epoch(instant)?, algorithm)
    }

    /// Same as [`Totp::generate_code`] for the current time
    pub fn generate_code_now(&self, algorithm: OtpHashAlgorithm) -> Result<String, OtpError> {
        self.generate_code_at(SystemTime::now(), algorithm)
    }
}

/// Time step counter the given instant falls in
pub fn time_step(seconds_since_epoch: u64) -> u64 {
    seconds_since_epoch / TIME_STEP_SECONDS
}

/// Seconds left until the next time step starts, between 1 and 30
pub fn remaining_window_seconds(seconds_since_epoch: u64) -> u64 {
    TIME_STEP_SECONDS - (seconds_since_epoch % TIME_STEP_SECONDS)
}

pub fn seconds_since_epoch(instant: SystemTime) -> Result<u64, OtpError> {
    instant
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|_| OtpError::TimeBeforeEpoch)
}
