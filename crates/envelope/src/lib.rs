//! Envelope encryption for therapy-note contents at rest.
//!
//! A process-wide KEK wraps a fresh per-note DEK (AES-KW, RFC 3394); the DEK
//! seals the note body (AES-256-GCM). [`Envelope`] is the entry point;
//! [`crate::crypto`] holds the primitives underneath it, [`crate::record`]
//! the persisted form, and [`crate::config`] the KEK loading path.

pub mod config;
pub mod crypto;
pub mod envelope;
pub mod keys;
pub mod record;

pub use config::{kek_from_env, Config, ConfigError, KEK_ENV_VAR};
pub use envelope::{Envelope, EnvelopeError, EnvelopeFailure};
pub use keys::{Dek, Kek};
pub use record::{EncryptedNote, RecordError};
