//! AES-KW (RFC 3394) wrapping of a per-note DEK under the process KEK.
//!
//! **Algorithm choice:** AES Key Wrap is deterministic: the same (KEK, DEK)
//! pair always produces the same 40-byte blob. The construction uses the
//! fixed RFC 3394 initial value rather than a random nonce, and that value
//! doubles as an integrity check on unwrap. Do not add per-wrap randomness;
//! the fixed IV is part of the algorithm definition.
//!
//! Wrapping keeps KEK rotation open: on rotation only the 40-byte blob needs
//! re-wrapping, never the note ciphertext itself.

use aes_kw::KekAes256;
use thiserror::Error;
use zeroize::Zeroize;

use crate::crypto::cipher::KEY_LEN;
use crate::keys::Dek;

/// Byte length of a wrapped DEK: 32-byte key plus the 8-byte RFC 3394
/// integrity check value.
pub const WRAPPED_DEK_LEN: usize = KEY_LEN + 8;

/// Errors produced by the key-wrap layer.
#[derive(Debug, Error)]
pub enum WrapError {
    /// The KEK is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid KEK length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKekLength(usize),

    /// The DEK is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid DEK length: expected {KEY_LEN} bytes, got {0}")]
    InvalidDekLength(usize),

    /// The wrapped blob is the wrong length (must be [`WRAPPED_DEK_LEN`] bytes).
    #[error("invalid wrapped DEK length: expected {WRAPPED_DEK_LEN} bytes, got {0}")]
    InvalidWrappedLength(usize),

    /// AES-KW failed structurally (unreachable once lengths are validated).
    #[error("aes-kw operation failed")]
    KeyWrap,

    /// The blob was not produced by [`wrap_dek`] under this KEK: the RFC 3394
    /// integrity check value did not verify on unwrap.
    #[error("wrapped DEK failed its integrity check")]
    Integrity,
}

/// Wrap a 32-byte DEK under a 32-byte KEK, producing a 40-byte blob.
///
/// Deterministic: identical inputs always yield an identical blob.
///
/// # Errors
///
/// Returns [`WrapError::InvalidKekLength`] or [`WrapError::InvalidDekLength`]
/// if either key is not [`KEY_LEN`] bytes.
pub fn wrap_dek(kek: &[u8], dek: &[u8]) -> Result<[u8; WRAPPED_DEK_LEN], WrapError> {
    if dek.len() != KEY_LEN {
        return Err(WrapError::InvalidDekLength(dek.len()));
    }
    let kek = build_kek(kek)?;

    let mut wrapped = [0u8; WRAPPED_DEK_LEN];
    kek.wrap(dek, &mut wrapped).map_err(|_| WrapError::KeyWrap)?;
    Ok(wrapped)
}

/// Unwrap a 40-byte blob back into the DEK it carries.
///
/// A corrupted blob, or one wrapped under a different KEK, is rejected with
/// [`WrapError::Integrity`]; it is never unwrapped into garbage key material.
///
/// # Errors
///
/// Returns [`WrapError::InvalidKekLength`] if the KEK is not [`KEY_LEN`]
/// bytes, [`WrapError::InvalidWrappedLength`] if the blob is not
/// [`WRAPPED_DEK_LEN`] bytes, and [`WrapError::Integrity`] if the integrity
/// check value does not verify.
pub fn unwrap_dek(kek: &[u8], wrapped: &[u8]) -> Result<Dek, WrapError> {
    if wrapped.len() != WRAPPED_DEK_LEN {
        return Err(WrapError::InvalidWrappedLength(wrapped.len()));
    }
    let kek = build_kek(kek)?;

    let mut dek_bytes = [0u8; KEY_LEN];
    let result = match kek.unwrap(wrapped, &mut dek_bytes) {
        Ok(()) => Ok(Dek::new(dek_bytes)),
        Err(aes_kw::Error::IntegrityCheckFailed) => Err(WrapError::Integrity),
        Err(_) => Err(WrapError::KeyWrap),
    };
    // The stack copy is dead either way; scrub it.
    dek_bytes.zeroize();
    result
}

fn build_kek(kek: &[u8]) -> Result<KekAes256, WrapError> {
    let kek_array: [u8; KEY_LEN] = kek
        .try_into()
        .map_err(|_| WrapError::InvalidKekLength(kek.len()))?;
    Ok(KekAes256::from(kek_array))
}
