//! Cryptographic primitives: AES-256-GCM sealing and AES-KW key wrapping.
//!
//! This module is intentionally free of configuration and storage concerns.
//! It provides the low-level operations composed by the [`crate::envelope`]
//! façade.
//!
//! # Construction summary
//!
//! | operation | algorithm | randomness |
//! |-----------|-----------|------------|
//! | [`seal`] / [`open`] | AES-256-GCM, 96-bit nonce, 128-bit tag | fresh nonce per call |
//! | [`wrap_dek`] / [`unwrap_dek`] | AES-KW (RFC 3394), fixed initial value | none (deterministic) |

pub mod cipher;
pub mod wrap;

pub use cipher::{open, seal, CipherError, SealedPayload, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use wrap::{unwrap_dek, wrap_dek, WrapError, WRAPPED_DEK_LEN};
