//! Configuration loading and validation for services that store encrypted
//! notes.
//!
//! The only value this crate reads is the key encryption key, supplied as a
//! hex string in the `NOTE_ENCRYPTION_KEY` environment variable. Deployments
//! load it once at startup and hand the resulting [`Kek`] to
//! [`crate::envelope::Envelope::new`]; nothing here caches the variable, so a
//! process that calls [`Config::from_env`] twice reads the environment twice.

use serde::Deserialize;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::KEY_LEN;
use crate::keys::Kek;

/// Environment variable holding the hex-encoded 256-bit KEK.
pub const KEK_ENV_VAR: &str = "NOTE_ENCRYPTION_KEY";

/// Raw note-encryption configuration as read from the environment.
///
/// The key stays hex-encoded until [`Config::into_kek`] decodes and validates
/// it. The field is zeroed on drop and redacted from debug output.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Config {
    /// Hex-encoded 256-bit key encryption key (64 hex digits). **Required.**
    pub note_encryption_key: String,
}

/// Errors raised while loading or decoding the KEK configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The environment could not be read or `NOTE_ENCRYPTION_KEY` is absent.
    #[error("failed to load configuration from environment")]
    Environment(#[from] config::ConfigError),

    /// `NOTE_ENCRYPTION_KEY` is set but is not valid hex.
    #[error("NOTE_ENCRYPTION_KEY is not valid hex")]
    InvalidHex(#[from] hex::FromHexError),

    /// `NOTE_ENCRYPTION_KEY` decodes to the wrong number of bytes.
    #[error("NOTE_ENCRYPTION_KEY must decode to {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Environment`] if `NOTE_ENCRYPTION_KEY` is
    /// absent or the environment cannot be read.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Decode the hex key into a validated [`Kek`], consuming the config.
    ///
    /// Surrounding whitespace is tolerated so that keys piped in from files
    /// may carry a trailing newline. All intermediate copies of the key
    /// material are zeroed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHex`] if the value is not hex and
    /// [`ConfigError::InvalidKeyLength`] if it decodes to anything other
    /// than [`KEY_LEN`] bytes.
    pub fn into_kek(self) -> Result<Kek, ConfigError> {
        let mut raw = hex::decode(self.note_encryption_key.trim())?;
        if raw.len() != KEY_LEN {
            let got = raw.len();
            raw.zeroize();
            return Err(ConfigError::InvalidKeyLength(got));
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&raw);
        raw.zeroize();

        let kek = Kek::new(bytes);
        bytes.zeroize();
        Ok(kek)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("note_encryption_key", &"[REDACTED]")
            .finish()
    }
}

/// Load the KEK straight from the environment.
///
/// Convenience for binaries that have no other configuration to read.
///
/// # Errors
///
/// Propagates every [`ConfigError`] from [`Config::from_env`] and
/// [`Config::into_kek`].
pub fn kek_from_env() -> Result<Kek, ConfigError> {
    Config::from_env()?.into_kek()
}
