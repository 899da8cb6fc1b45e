//! Tracing subscriber setup for binaries built on this crate.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose spans and events the default filter lets through.
const CRATES: [&str; 5] = [
    "noughts",
    "noughts_room",
    "noughts_protocol",
    "noughts_transport",
    "noughts_rules",
];

/// Builds the filter used when `RUST_LOG` is unset, e.g.
/// `noughts=info,noughts_room=info,...,noughts_server=info`.
fn default_directives(binary_name: &str, level: &str) -> String {
    CRATES
        .iter()
        .copied()
        .chain(std::iter::once(binary_name))
        .map(|target| format!("{}={level}", target.replace('-', "_")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` overrides the default of `default_level` for the workspace
/// crates and `binary_name`. Calling this twice panics inside
/// `tracing-subscriber`, so call it once from `main`.
pub fn init_tracing(binary_name: &str, default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(binary_name, default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
