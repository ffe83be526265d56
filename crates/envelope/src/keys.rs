//! Key material newtypes: the process-wide KEK and the per-note DEK.
//!
//! Both types hold exactly [`KEY_LEN`] bytes, are overwritten with zeroes
//! when dropped, and never print their contents, not even in debug builds.
//!
//! # Lifetime rules
//!
//! - A [`Kek`] is loaded once at process startup (see [`crate::config`]) and
//!   injected into the [`crate::envelope::Envelope`] façade. It is never
//!   persisted by this crate.
//! - A [`Dek`] is generated fresh for every note encryption, lives for the
//!   duration of a single encrypt or decrypt call, and is only ever persisted
//!   in wrapped form. No caller receives raw DEK bytes from the façade.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::KEY_LEN;

/// Process-wide Key Encryption Key: wraps and unwraps DEKs, never encrypts
/// note bodies directly.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Kek([u8; KEY_LEN]);

impl Kek {
    /// Build a KEK from raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Mint a fresh KEK from the OS CSPRNG.
    ///
    /// Used by the `keygen` provisioning binary; running services load their
    /// KEK from configuration instead.
    pub fn generate() -> Self {
        Self(random_key())
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for Kek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("Kek([REDACTED])")
    }
}

/// One-time-use Data Encryption Key: directly encrypts a single note's body.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Dek([u8; KEY_LEN]);

impl Dek {
    /// Build a DEK from raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh DEK from the OS CSPRNG.
    pub fn generate() -> Self {
        Self(random_key())
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for Dek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Dek([REDACTED])")
    }
}

fn random_key() -> [u8; KEY_LEN] {
    let mut bytes = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut bytes);
    bytes
}
