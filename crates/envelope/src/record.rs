//! The persisted form of an encrypted note.
//!
//! Every note encrypts to a triple: the wrapped DEK ([`WRAPPED_DEK_LEN`]
//! bytes), the AEAD nonce ([`NONCE_LEN`] bytes) and the sealed body
//! (ciphertext plus [`TAG_LEN`]-byte tag). Stores that take raw bytes can
//! persist the public fields directly; text columns and JSON use the
//! canonical string representation
//! `v1.<base64url(wrapped_dek)>.<base64url(nonce)>.<base64url(ciphertext)>`
//! (base64url without padding), which [`serde`] support here encodes and
//! decodes automatically.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::crypto::{NONCE_LEN, TAG_LEN, WRAPPED_DEK_LEN};

/// Prefix that appears at the start of every encoded note.
pub const VERSION_PREFIX: &str = "v1";

/// An encrypted note as written to storage.
///
/// Contains no key material in usable form: the DEK inside `wrapped_dek` can
/// only be recovered with the KEK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedNote {
    /// DEK wrapped under the KEK, integrity check value included.
    pub wrapped_dek: [u8; WRAPPED_DEK_LEN],
    /// Nonce the sealed body was produced with.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

impl EncryptedNote {
    /// Encode this note to its canonical string representation.
    pub fn to_string_repr(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            VERSION_PREFIX,
            URL_SAFE_NO_PAD.encode(self.wrapped_dek),
            URL_SAFE_NO_PAD.encode(self.nonce),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
        )
    }

    /// Parse an encoded note string back into an [`EncryptedNote`].
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidFormat`] if the string does not match
    /// the expected `v1.<wrapped_dek>.<nonce>.<ciphertext>` structure or any
    /// segment has the wrong decoded length.
    pub fn from_str(s: &str) -> Result<Self, RecordError> {
        let parts: Vec<&str> = s.splitn(4, '.').collect();
        if parts.len() != 4 || parts[0] != VERSION_PREFIX {
            return Err(RecordError::InvalidFormat);
        }

        let wrapped_bytes = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| RecordError::InvalidFormat)?;
        if wrapped_bytes.len() != WRAPPED_DEK_LEN {
            return Err(RecordError::InvalidFormat);
        }
        let mut wrapped_dek = [0u8; WRAPPED_DEK_LEN];
        wrapped_dek.copy_from_slice(&wrapped_bytes);

        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| RecordError::InvalidFormat)?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(RecordError::InvalidFormat);
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&nonce_bytes);

        let ciphertext = URL_SAFE_NO_PAD
            .decode(parts[3])
            .map_err(|_| RecordError::InvalidFormat)?;
        // A sealed body is never shorter than its authentication tag.
        if ciphertext.len() < TAG_LEN {
            return Err(RecordError::InvalidFormat);
        }

        Ok(Self {
            wrapped_dek,
            nonce,
            ciphertext,
        })
    }
}

impl Serialize for EncryptedNote {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string_repr())
    }
}

impl<'de> Deserialize<'de> for EncryptedNote {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(D::Error::custom)
    }
}

/// Errors produced while parsing an encoded note.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The encoded note string does not match the expected format.
    #[error("invalid encrypted note format")]
    InvalidFormat,
}
