//! BLS12-381 signatures as used by the beacon chain, backed by `blst`.
//!
//! Only the operations needed to verify single signatures are exposed.
//! Secret keys are included so that callers can produce signatures in tests and tooling.

pub use crate::{
    cached_public_key::CachedPublicKey,
    consts::DOMAIN_SEPARATION_TAG,
    error::Error,
    public_key::PublicKey,
    public_key_bytes::PublicKeyBytes,
    secret_key::{SecretKey, SecretKeyBytes},
    signature::Signature,
    signature_bytes::SignatureBytes,
};

mod cached_public_key;
mod consts;
mod error;
mod public_key;
mod public_key_bytes;
mod secret_key;
mod signature;
mod signature_bytes;
