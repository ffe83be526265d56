//! Two-layer envelope encryption for therapy-note bodies.
//!
//! Every note is sealed under its own single-use DEK; the process-wide KEK
//! only ever wraps DEKs and never touches note plaintext. One encryption
//! runs through four steps:
//!
//! 1. generate a fresh DEK from the OS CSPRNG,
//! 2. wrap the DEK under the KEK (AES-KW, deterministic),
//! 3. seal the note body under the DEK (AES-256-GCM, fresh random nonce),
//! 4. discard the DEK; only the wrapped copy survives.
//!
//! Decryption reverses the path: unwrap, open, decode UTF-8. A compromised
//! store therefore yields nothing without the KEK, and rotating the KEK means
//! re-wrapping 40-byte blobs instead of re-encrypting every note body.
//!
//! [`Envelope`] is stateless apart from the KEK and all methods take `&self`,
//! so one instance may be shared freely across threads. Errors returned to
//! callers carry a fixed top-level message; the underlying cause stays on the
//! [`std::error::Error::source`] chain and in the log record.

use thiserror::Error;
use tracing::warn;
use zeroize::Zeroize;

use crate::config::{kek_from_env, ConfigError};
use crate::crypto::{open, seal, unwrap_dek, wrap_dek, CipherError, WrapError};
use crate::keys::{Dek, Kek};
use crate::record::EncryptedNote;

/// Envelope encryption façade bound to one KEK.
#[derive(Debug, Clone)]
pub struct Envelope {
    kek: Kek,
}

impl Envelope {
    /// Build a façade around an already-loaded KEK.
    ///
    /// The KEK is always injected by the caller; nothing here reads global
    /// state, so tests inject fixture keys directly.
    pub fn new(kek: Kek) -> Self {
        Self { kek }
    }

    /// Build a façade from the `NOTE_ENCRYPTION_KEY` environment variable.
    ///
    /// Startup convenience over [`Envelope::new`]. Call it once when the
    /// process boots; the environment is read at call time, never cached.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the variable is absent, not hex, or does
    /// not decode to a 256-bit key.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(kek_from_env()?))
    }

    /// Encrypt one note body, returning the triple to persist.
    ///
    /// A fresh DEK and a fresh nonce are drawn on every call, so encrypting
    /// the same plaintext twice yields entirely different artifacts. No
    /// associated data is bound at this layer. The DEK is zeroed before the
    /// call returns.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Encryption`]; the cause is preserved on the
    /// source chain.
    pub fn encrypt_note(&self, plaintext: &str) -> Result<EncryptedNote, EnvelopeError> {
        self.seal_note(plaintext).map_err(|e| {
            warn!(error = %e, "note encryption failed");
            EnvelopeError::Encryption(e)
        })
    }

    /// Decrypt a persisted triple back into the note body.
    ///
    /// Any corruption of the wrapped DEK, the nonce, the ciphertext or the
    /// tag fails the whole operation; no partial plaintext is ever returned.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Decryption`]; the cause is preserved on the
    /// source chain.
    pub fn decrypt_note(&self, note: &EncryptedNote) -> Result<String, EnvelopeError> {
        self.open_note(note).map_err(|e| {
            warn!(error = %e, "note decryption failed");
            EnvelopeError::Decryption(e)
        })
    }

    fn seal_note(&self, plaintext: &str) -> Result<EncryptedNote, EnvelopeFailure> {
        let dek = Dek::generate();
        let wrapped_dek = wrap_dek(self.kek.as_bytes(), dek.as_bytes())?;
        let sealed = seal(dek.as_bytes(), plaintext.as_bytes(), &[])?;
        // `dek` drops here; its bytes are zeroed.

        Ok(EncryptedNote {
            wrapped_dek,
            nonce: sealed.nonce,
            ciphertext: sealed.ciphertext,
        })
    }

    fn open_note(&self, note: &EncryptedNote) -> Result<String, EnvelopeFailure> {
        let dek = unwrap_dek(self.kek.as_bytes(), &note.wrapped_dek)?;
        let plaintext = open(dek.as_bytes(), &note.nonce, &note.ciphertext, &[])?;

        String::from_utf8(plaintext).map_err(|e| {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            EnvelopeFailure::NotUtf8
        })
    }
}

/// Errors returned by the envelope façade.
///
/// The display message names only the failed operation; the layer that
/// actually failed is on the source chain.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Encrypting a note failed.
    #[error("note encryption failed")]
    Encryption(#[source] EnvelopeFailure),

    /// Decrypting a note failed.
    #[error("note decryption failed")]
    Decryption(#[source] EnvelopeFailure),
}

/// Underlying cause of an envelope operation failure.
#[derive(Debug, Error)]
pub enum EnvelopeFailure {
    /// DEK wrapping or unwrapping failed.
    #[error(transparent)]
    Wrap(#[from] WrapError),

    /// Sealing or opening the note body failed.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// The note decrypted, but its body is not valid UTF-8.
    #[error("decrypted note body is not valid UTF-8")]
    NotUtf8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{NONCE_LEN, TAG_LEN, WRAPPED_DEK_LEN};
    use std::collections::HashSet;

    fn envelope() -> Envelope {
        Envelope::new(Kek::generate())
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let env = envelope();
        let note = env.encrypt_note("patient reports improved sleep").unwrap();
        let decrypted = env.decrypt_note(&note).unwrap();
        assert_eq!(decrypted, "patient reports improved sleep");
    }

    #[test]
    fn empty_note_round_trip() {
        let env = envelope();
        let note = env.encrypt_note("").unwrap();
        assert_eq!(note.ciphertext.len(), TAG_LEN);
        assert_eq!(env.decrypt_note(&note).unwrap(), "");
    }

    #[test]
    fn multibyte_utf8_round_trip() {
        let env = envelope();
        let text = "Sitzung über Träume: 夢の分析, 진전 있음 🌙";
        let note = env.encrypt_note(text).unwrap();
        assert_eq!(env.decrypt_note(&note).unwrap(), text);
    }

    #[test]
    fn zero_kek_round_trip_with_known_artifact_lengths() {
        let env = Envelope::new(Kek::new([0u8; 32]));
        let text = "session note: patient stable";
        let note = env.encrypt_note(text).unwrap();

        assert_eq!(note.wrapped_dek.len(), WRAPPED_DEK_LEN);
        assert_eq!(note.nonce.len(), NONCE_LEN);
        assert_eq!(note.ciphertext.len(), text.len() + TAG_LEN);
        assert_eq!(env.decrypt_note(&note).unwrap(), text);
    }

    #[test]
    fn nonce_unique_across_many_encryptions() {
        let env = envelope();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let note = env.encrypt_note("n").unwrap();
            assert!(seen.insert(note.nonce), "nonce repeated");
        }
    }

    #[test]
    fn same_plaintext_encrypts_differently_every_time() {
        let env = envelope();
        let a = env.encrypt_note("identical").unwrap();
        let b = env.encrypt_note("identical").unwrap();
        assert_ne!(a.wrapped_dek, b.wrapped_dek);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn tampered_wrapped_dek_rejected() {
        let env = envelope();
        let mut note = env.encrypt_note("tamper me").unwrap();
        note.wrapped_dek[0] ^= 0x01;
        let err = env.decrypt_note(&note).unwrap_err();
        assert!(matches!(err, EnvelopeError::Decryption(_)));
    }

    #[test]
    fn tampered_nonce_rejected() {
        let env = envelope();
        let mut note = env.encrypt_note("tamper me").unwrap();
        note.nonce[NONCE_LEN - 1] ^= 0x01;
        assert!(env.decrypt_note(&note).is_err());
    }

    #[test]
    fn tampered_ciphertext_rejected() {
        let env = envelope();
        let mut note = env.encrypt_note("tamper me").unwrap();
        note.ciphertext[0] ^= 0x01;
        assert!(env.decrypt_note(&note).is_err());
    }

    #[test]
    fn tampered_tag_rejected() {
        let env = envelope();
        let mut note = env.encrypt_note("tamper me").unwrap();
        let last = note.ciphertext.len() - 1;
        note.ciphertext[last] ^= 0x01;
        assert!(env.decrypt_note(&note).is_err());
    }

    #[test]
    fn wrong_kek_fails_decryption() {
        let note = envelope().encrypt_note("secret").unwrap();
        let other = envelope();
        let err = other.decrypt_note(&note).unwrap_err();
        assert!(matches!(err, EnvelopeError::Decryption(_)));
    }

    #[test]
    fn wrapped_dek_from_another_note_rejected() {
        let env = envelope();
        let donor = env.encrypt_note("note one").unwrap();
        let mut victim = env.encrypt_note("note two").unwrap();
        // Same KEK, so the foreign DEK unwraps cleanly; the body must still
        // refuse to open under it.
        victim.wrapped_dek = donor.wrapped_dek;
        assert!(env.decrypt_note(&victim).is_err());
    }

    #[test]
    fn nonce_from_another_note_rejected() {
        let env = envelope();
        let donor = env.encrypt_note("note one").unwrap();
        let mut victim = env.encrypt_note("note two").unwrap();
        victim.nonce = donor.nonce;
        assert!(env.decrypt_note(&victim).is_err());
    }

    #[test]
    fn non_utf8_body_rejected() {
        let kek = Kek::generate();
        let dek = Dek::generate();
        let wrapped_dek = wrap_dek(kek.as_bytes(), dek.as_bytes()).unwrap();
        let sealed = seal(dek.as_bytes(), &[0xFF, 0xFE, 0xFD], &[]).unwrap();
        let note = EncryptedNote {
            wrapped_dek,
            nonce: sealed.nonce,
            ciphertext: sealed.ciphertext,
        };

        let err = Envelope::new(kek).decrypt_note(&note).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::Decryption(EnvelopeFailure::NotUtf8)
        ));
    }

    #[test]
    fn error_display_names_only_the_operation() {
        let env = envelope();
        let mut note = env.encrypt_note("x").unwrap();
        note.ciphertext[0] ^= 0x01;
        let err = env.decrypt_note(&note).unwrap_err();
        assert_eq!(err.to_string(), "note decryption failed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn envelope_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Envelope>();
    }
}
