//! otpstep - prints time-based one-time passwords
//!
//! Single-shot mode prints one code without a line feed, continuous mode
//! prints a new line every time the code changes until Ctrl+C.

mod config;
mod display;

use std::{io::Write, process::ExitCode, time::Duration};

use otpstep::totp::{self, Totp};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Command, Config};

const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "otpstep=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match config::parse_args(&args)? {
        Command::Run(config) => config,
        Command::Help => {
            println!(
                "{} v{}\n\n{}",
                env!("CARGO_BIN_NAME"),
                env!("CARGO_PKG_VERSION"),
                config::USAGE
            );
            return Ok(ExitCode::FAILURE);
        }
    };

    let totp = Totp::new(config.secret.as_str())?;

    if config.once {
        let code = current_code(&totp, &config)?;
        print!("{}", display::format_code(&code, config.inner_spaces));
        std::io::stdout().flush()?;

        return Ok(ExitCode::SUCCESS);
    }

    println!("Press Ctrl+C key to exit");
    println!();

    run(&totp, &config).await?;

    Ok(ExitCode::SUCCESS)
}

/// Prints the code each time it changes, until Ctrl+C
async fn run(totp: &Totp, config: &Config) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut previous: Option<String> = None;

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                tracing::debug!("Received Ctrl+C, stopping");
                break;
            }
            _ = ticker.tick() => {
                let code = current_code(totp, config)?;

                if previous.as_deref() != Some(code.as_str()) {
                    println!("{}", display::format_code(&code, config.inner_spaces));
                    previous = Some(code);
                }
            }
        }
    }

    Ok(())
}

fn current_code(totp: &Totp, config: &Config) -> anyhow::Result<String> {
    let seconds = config.time.seconds_since_epoch()?;

    let raw = totp.generate_code(seconds, config.algorithm)?;
    let code = otpstep::truncate(&raw, config.digits)?;

    tracing::debug!(
        time_step = totp::time_step(seconds),
        remaining_seconds = totp::remaining_window_seconds(seconds),
        algorithm = %config.algorithm,
        "Generated code"
    );

    Ok(code)
}
