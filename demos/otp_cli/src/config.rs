//! Command line configuration

use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use otpstep::{OtpHashAlgorithm, DEFAULT_DIGITS, MAX_DIGITS, MIN_DIGITS};

pub const USAGE: &str = "\
  --secretFile <file>            Absolute or relative file containing the secret text
  --secret <secret>              Secret text (--secretFile takes precedence if given)

  Arguments --secretFile and --secret are mutually exclusive, but one of them must be given

  --hmac <hmac>                  HMAC algorithm to use, available values are SHA1, SHA256 and SHA512 (defaults to SHA1)
  --time <offset> | <datetime>   Positive or negative offset in seconds from UTC now, or fixed UTC date and time
  --truncate <number>            Truncates the OTP to <number> digits (defaults to 6)
  --once                         Prints OTP only once and without line feed (defaults to unset)
  --no-inner-spaces              OTP is printed without any spaces (defaults to unset)

  -h | -? | --help               Prints this help usage
";

/// Where the instant used for generation comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeSource {
    /// Current UTC time shifted by a number of seconds
    Now { offset_seconds: i64 },
    Fixed(DateTime<Utc>),
}

impl Default for TimeSource {
    fn default() -> Self {
        Self::Now { offset_seconds: 0 }
    }
}

impl TimeSource {
    /// Seconds since the UNIX epoch for this source, at the time of the call
    pub fn seconds_since_epoch(&self) -> anyhow::Result<u64> {
        let timestamp = match self {
            Self::Now { offset_seconds } => Utc::now()
                .timestamp()
                .checked_add(*offset_seconds)
                .context("time offset is out of range")?,
            Self::Fixed(instant) => instant.timestamp(),
        };

        u64::try_from(timestamp).context("time is before the UNIX epoch")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub secret: String,
    pub algorithm: OtpHashAlgorithm,
    pub time: TimeSource,
    pub digits: u32,
    pub once: bool,
    pub inner_spaces: bool,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Run(Config),
    Help,
}

/// Parses the arguments, without the program name.
///
/// Malformed optional values fall back to their defaults with a warning.
pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    if args.len() < 2 || args.iter().any(|a| matches!(a.as_str(), "-h" | "-?" | "--help")) {
        return Ok(Command::Help);
    }

    let once = has_flag(args, &["--once"]);
    let inner_spaces = !has_flag(args, &["--no-inner-space", "--no-inner-spaces"]);

    let mut algorithm = OtpHashAlgorithm::default();
    if let Some(value) = flag_value(args, "--hmac") {
        match OtpHashAlgorithm::from_str(value) {
            Ok(parsed) => algorithm = parsed,
            Err(error) => {
                tracing::warn!(
                    %error,
                    "Invalid 'hmac' value, fallback to default value '{algorithm}'"
                )
            }
        }
    }

    let time = flag_value(args, "--time")
        .map(parse_time)
        .unwrap_or_default();

    let digits = flag_value(args, "--truncate")
        .map(parse_digits)
        .unwrap_or(DEFAULT_DIGITS);

    let secret = if let Some(file) = flag_value(args, "--secretFile") {
        read_secret_file(file)?
    } else if let Some(secret) = flag_value(args, "--secret") {
        secret.to_string()
    } else {
        bail!("Missing mandatory 'secretFile' or 'secret' argument");
    };

    Ok(Command::Run(Config {
        secret,
        algorithm,
        time,
        digits,
        once,
        inner_spaces,
    }))
}

fn has_flag(args: &[String], names: &[&str]) -> bool {
    args.iter().any(|a| names.contains(&a.as_str()))
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let index = args.iter().position(|a| a == name)?;

    match args.get(index + 1) {
        Some(value) => Some(value.as_str()),
        None => {
            tracing::warn!("Missing value of '{}' argument", name.trim_start_matches('-'));
            None
        }
    }
}

fn parse_time(value: &str) -> TimeSource {
    if !value.starts_with(['+', '-']) {
        if let Some(instant) = parse_datetime(value) {
            return TimeSource::Fixed(instant);
        }
    }

    match value.parse::<i64>() {
        Ok(offset_seconds) => TimeSource::Now { offset_seconds },
        Err(_) => {
            tracing::warn!(
                value,
                "Invalid 'time' value, fallback to default value '(current UTC time)'"
            );
            TimeSource::default()
        }
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    Some(Utc.from_utc_datetime(&naive))
}

fn parse_digits(value: &str) -> u32 {
    let Ok(requested) = value.parse::<i64>() else {
        tracing::warn!(
            value,
            "Invalid 'truncate' value, fallback to default value '{DEFAULT_DIGITS}'"
        );
        return DEFAULT_DIGITS;
    };

    if requested < i64::from(MIN_DIGITS) {
        tracing::warn!(
            value,
            "Invalid 'truncate' value, fallback to '{MIN_DIGITS}'"
        );
        return MIN_DIGITS;
    }

    if requested > i64::from(MAX_DIGITS) {
        tracing::warn!(
            value,
            "Invalid 'truncate' value, fallback to '{MAX_DIGITS}'"
        );
        return MAX_DIGITS;
    }

    requested as u32
}

fn read_secret_file(file: &str) -> anyhow::Result<String> {
    let mut path = PathBuf::from(file);
    if path.is_relative() {
        path = std::env::current_dir()
            .context("Could not resolve the current directory")?
            .join(path);
    }

    if !path.exists() {
        bail!("Could not find file '{}'", path.display());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Could not read file '{}'", path.display()))?;

    Ok(contents.trim().to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use otpstep::OtpHashAlgorithm;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{parse_args, Command, Config, TimeSource};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn run_config(values: &[&str]) -> Config {
        match parse_args(&args(values)).unwrap() {
            Command::Run(config) => config,
            Command::Help => panic!("expected a run configuration"),
        }
    }

    #[test]
    fn defaults() {
        let config = run_config(&["--secret", "JBSWY3DPEHPK3PXP"]);

        assert_eq!(
            Config {
                secret: "JBSWY3DPEHPK3PXP".to_string(),
                algorithm: OtpHashAlgorithm::SHA1,
                time: TimeSource::Now { offset_seconds: 0 },
                digits: 6,
                once: false,
                inner_spaces: true,
            },
            config
        );
    }

    #[rstest]
    #[case(&["--secret"])]
    #[case(&["--once"])]
    #[case(&["--secret", "abc", "--help"])]
    #[case(&["-?", "--secret"])]
    #[case(&["-h", "--secret", "abc"])]
    fn help(#[case] values: &[&str]) {
        assert_eq!(Command::Help, parse_args(&args(values)).unwrap());
    }

    #[test]
    fn missing_secret() {
        assert!(parse_args(&args(&["--once", "--hmac", "sha256"])).is_err());
    }

    #[rstest]
    #[case("sha256", OtpHashAlgorithm::SHA256)]
    #[case("SHA512", OtpHashAlgorithm::SHA512)]
    #[case("md5", OtpHashAlgorithm::SHA1)]
    fn hmac(#[case] value: &str, #[case] expected: OtpHashAlgorithm) {
        let config = run_config(&["--secret", "abc", "--hmac", value]);

        assert_eq!(expected, config.algorithm);
    }

    #[rstest]
    #[case("8", 8)]
    #[case("1", 1)]
    #[case("0", 1)]
    #[case("-3", 1)]
    #[case("12", 8)]
    #[case("six", 6)]
    fn truncate(#[case] value: &str, #[case] expected: u32) {
        let config = run_config(&["--secret", "abc", "--truncate", value]);

        assert_eq!(expected, config.digits);
    }

    #[rstest]
    #[case("+90", TimeSource::Now { offset_seconds: 90 })]
    #[case("-30", TimeSource::Now { offset_seconds: -30 })]
    #[case("45", TimeSource::Now { offset_seconds: 45 })]
    #[case("soon", TimeSource::Now { offset_seconds: 0 })]
    #[case("2009-02-13T23:31:30Z", fixed(1234567890))]
    #[case("2009-02-13 23:31:30", fixed(1234567890))]
    #[case("2009-02-14T00:31:30+01:00", fixed(1234567890))]
    #[case("1970-01-02", fixed(86400))]
    fn time(#[case] value: &str, #[case] expected: TimeSource) {
        let config = run_config(&["--secret", "abc", "--time", value]);

        assert_eq!(expected, config.time);
    }

    fn fixed(timestamp: i64) -> TimeSource {
        TimeSource::Fixed(Utc.timestamp_opt(timestamp, 0).unwrap())
    }

    #[test]
    fn offset_time_seconds() {
        let before = Utc::now().timestamp() + 30;
        let seconds = TimeSource::Now { offset_seconds: 30 }
            .seconds_since_epoch()
            .unwrap() as i64;
        let after = Utc::now().timestamp() + 30;

        assert!((before..=after).contains(&seconds));
        assert!(TimeSource::Now { offset_seconds: i64::MIN }
            .seconds_since_epoch()
            .is_err());
    }

    #[test]
    fn fixed_time_seconds() {
        let source = TimeSource::Fixed(Utc.timestamp_opt(59, 0).unwrap());

        assert_eq!(59, source.seconds_since_epoch().unwrap());
        assert!(TimeSource::Fixed(Utc.timestamp_opt(-1, 0).unwrap())
            .seconds_since_epoch()
            .is_err());
    }

    #[test]
    fn flags() {
        let config = run_config(&["--secret", "abc", "--once", "--no-inner-spaces"]);
        assert!(config.once);
        assert!(!config.inner_spaces);

        let config = run_config(&["--no-inner-space", "--secret", "abc"]);
        assert!(!config.once);
        assert!(!config.inner_spaces);
    }

    #[test]
    fn missing_flag_value_is_ignored() {
        let config = run_config(&["--secret", "abc", "--hmac"]);

        assert_eq!(OtpHashAlgorithm::SHA1, config.algorithm);
    }

    #[test]
    fn secret_file_takes_precedence() {
        let path = std::env::temp_dir().join(format!("otpstep-secret-{}", std::process::id()));
        std::fs::write(&path, "  GEZDGNBVGY3TQOJQ\n").unwrap();

        let config = run_config(&["--secret", "abc", "--secretFile", path.to_str().unwrap()]);
        std::fs::remove_file(&path).unwrap();

        assert_eq!("GEZDGNBVGY3TQOJQ", config.secret);
    }

    #[test]
    fn relative_secret_file() {
        let name = format!("otpstep-relative-secret-{}", std::process::id());
        let path = std::env::current_dir().unwrap().join(&name);
        std::fs::write(&path, "MZXW6YTB\n").unwrap();

        let config = run_config(&["--secretFile", name.as_str()]);
        std::fs::remove_file(&path).unwrap();

        assert_eq!("MZXW6YTB", config.secret);
    }

    #[test]
    fn missing_secret_file() {
        let result = parse_args(&args(&["--secretFile", "does/not/exist.txt"]));

        assert!(result.is_err());
    }
}
