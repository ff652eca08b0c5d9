//! Confidential value encoding.
//!
//! Every numeric figure on a pool travels as a [`CipherToken`]. The
//! [`ValueCipher`] trait is the only thing the rest of the crate knows about
//! how tokens are produced, so a real commitment or FHE scheme can replace
//! [`TaggedBase64Cipher`] without touching the challenge, registry or sync
//! layers.

pub mod codec;

pub use codec::{CipherToken, CodecError, TaggedBase64Cipher, ValueCipher, TOKEN_TAG};
