//! Noughts server binary.
//!
//! Configuration comes from the environment:
//!
//! - `NOUGHTS_BIND` — listen address (default `127.0.0.1:4000`)
//! - `PORT` — if `NOUGHTS_BIND` is unset, listen on `0.0.0.0:$PORT`
//! - `NOUGHTS_IDLE_TIMEOUT_SECS` — drop silent connections after this long
//! - `NOUGHTS_MAX_BOARD_SIZE` — largest board side length accepted, between
//!   the room minimum and 32
//! - `RUST_LOG` — log filter (default `info` for the noughts crates)

use std::str::FromStr;
use std::time::Duration;

use noughts::prelude::*;

/// Largest board side the binary will accept from the environment.
const MAX_BOARD_SIZE_CEILING: usize = 32;

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("{var}={value:?} is not a valid value")]
    Invalid { var: &'static str, value: String },
}

fn parse<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

/// Builds the server config from `lookup`, which stands in for
/// `std::env::var` so tests don't touch the process environment.
fn config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<ServerConfig, ConfigError> {
    let mut config = ServerConfig::default();

    if let Some(bind) = lookup("NOUGHTS_BIND") {
        config.bind = bind;
    } else if let Some(port) = lookup("PORT") {
        let port: u16 = parse("PORT", port)?;
        config.bind = format!("0.0.0.0:{port}");
    }
    if let Some(secs) = lookup("NOUGHTS_IDLE_TIMEOUT_SECS") {
        config.idle_timeout = Duration::from_secs(parse("NOUGHTS_IDLE_TIMEOUT_SECS", secs)?);
    }
    if let Some(size) = lookup("NOUGHTS_MAX_BOARD_SIZE") {
        let max: usize = parse("NOUGHTS_MAX_BOARD_SIZE", size.clone())?;
        if max < config.room.min_board_size || max > MAX_BOARD_SIZE_CEILING {
            return Err(ConfigError::Invalid {
                var: "NOUGHTS_MAX_BOARD_SIZE",
                value: size,
            });
        }
        config.room.max_board_size = max;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(env!("CARGO_PKG_NAME"), "info");

    let config = config_from(|var| std::env::var(var).ok())?;
    tracing::info!(bind = %config.bind, idle_timeout = ?config.idle_timeout, "starting");

    let server = NoughtsServer::builder().config(config).build().await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}
