//! AES-256-GCM sealing and opening of note bodies.
//!
//! **Algorithm choice:** AES-256-GCM (96-bit nonce, 128-bit tag) is the
//! standard AEAD construction, giving semantic security plus ciphertext
//! integrity as long as a (key, nonce) pair is never reused.
//!
//! Every [`seal`] call draws a fresh random nonce from the OS CSPRNG and the
//! key is a one-time-use DEK, so the unique-nonce discipline holds by
//! construction. Callers never supply a nonce.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Output of one [`seal`] call: the fresh nonce plus the sealed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    /// Raw nonce bytes, generated inside [`seal`].
    pub nonce: [u8; NONCE_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

/// Errors produced by the AEAD layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The sealed body is shorter than the [`TAG_LEN`]-byte authentication tag.
    #[error("sealed body too short: expected at least {TAG_LEN} bytes, got {0}")]
    SealedTooShort(usize),

    /// AEAD encryption failed (unreachable with a valid key and nonce).
    #[error("aead seal operation failed")]
    Seal,

    /// The authentication tag did not verify: wrong key, wrong nonce,
    /// tampered ciphertext, or mismatched associated data.
    #[error("authentication failed: sealed body rejected")]
    Authentication,
}

/// Seal a note body under `key` with a fresh random 96-bit nonce.
///
/// The returned ciphertext is the encrypted body with the 16-byte tag
/// appended. `aad` is authenticated but not encrypted and may be empty.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`]
/// bytes. Returns [`CipherError::Seal`] on an internal AEAD error (should be
/// unreachable with a valid key).
pub fn seal(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<SealedPayload, CipherError> {
    let cipher = build_cipher(key)?;

    // Use OsRng for a cryptographically secure random nonce.
    use aes_gcm::aead::rand_core::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CipherError::Seal)?;

    Ok(SealedPayload {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Open a sealed body, verifying its authentication tag before returning any
/// plaintext.
///
/// `sealed` must carry the 16-byte tag after the ciphertext; the tag is split
/// off and verified by the cipher. On verification failure no plaintext bytes
/// are returned, partial or otherwise.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`]
/// bytes, [`CipherError::SealedTooShort`] if `sealed` cannot contain a tag,
/// and [`CipherError::Authentication`] if the tag does not verify (wrong key,
/// wrong nonce, tampered ciphertext, or mismatched `aad`).
pub fn open(
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    sealed: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    if sealed.len() < TAG_LEN {
        return Err(CipherError::SealedTooShort(sealed.len()));
    }
    let nonce = Nonce::from_slice(nonce);
    cipher
        .decrypt(nonce, Payload { msg: sealed, aad })
        .map_err(|_| CipherError::Authentication)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))
}
