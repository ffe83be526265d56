//! `keygen` — one-shot KEK provisioning tool.
//!
//! Startup sequence:
//! 1. Initialise logging on stderr, so stdout carries nothing but the key.
//! 2. Generate a fresh 256-bit KEK from the OS CSPRNG.
//! 3. Print the hex-encoded key to stdout.
//!
//! Typical use: `keygen > kek.hex`, then wire the value into the secret
//! store that feeds `NOTE_ENCRYPTION_KEY`.

use anyhow::Result;
use envelope::{Kek, KEK_ENV_VAR};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Telemetry
    // -----------------------------------------------------------------------
    init_telemetry()?;

    // -----------------------------------------------------------------------
    // 2. Key generation
    // -----------------------------------------------------------------------
    let kek = Kek::generate();

    // -----------------------------------------------------------------------
    // 3. Output
    // -----------------------------------------------------------------------
    println!("{}", hex::encode(kek.as_bytes()));
    info!("generated a fresh KEK; supply it to services via {KEK_ENV_VAR}");
    Ok(())
}

/// Initialise the tracing subscriber for the keygen tool.
///
/// Logs go to stderr at `info` unless `RUST_LOG` overrides the filter.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
fn init_telemetry() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise keygen tracing subscriber: {e}"))
}
