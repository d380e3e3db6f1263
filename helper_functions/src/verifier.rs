use anyhow::{ensure, Result};
use bls::{CachedPublicKey, Signature, SignatureBytes};
use types::primitives::H256;

use crate::error::{Error, SignatureKind};

pub trait Verifier {
    fn verify_singular(
        &mut self,
        message: H256,
        signature_bytes: SignatureBytes,
        cached_public_key: &CachedPublicKey,
        signature_kind: SignatureKind,
    ) -> Result<()>;
}

impl<V: Verifier> Verifier for &mut V {
    #[inline]
    fn verify_singular(
        &mut self,
        message: H256,
        signature_bytes: SignatureBytes,
        cached_public_key: &CachedPublicKey,
        signature_kind: SignatureKind,
    ) -> Result<()> {
        (*self).verify_singular(message, signature_bytes, cached_public_key, signature_kind)
    }
}

/// Accepts every signature.
///
/// Used when replaying blocks that have already been verified.
pub struct NullVerifier;

impl Verifier for NullVerifier {
    #[inline]
    fn verify_singular(
        &mut self,
        _message: H256,
        _signature_bytes: SignatureBytes,
        _cached_public_key: &CachedPublicKey,
        _signature_kind: SignatureKind,
    ) -> Result<()> {
        Ok(())
    }
}

pub struct SingleVerifier;

impl Verifier for SingleVerifier {
    #[inline]
    fn verify_singular(
        &mut self,
        message: H256,
        signature_bytes: SignatureBytes,
        cached_public_key: &CachedPublicKey,
        signature_kind: SignatureKind,
    ) -> Result<()> {
        let public_key = cached_public_key.decompress()?;

        // Signatures that fail to decompress are reported the same way as ones that fail to verify.
        let valid = Signature::try_from(signature_bytes)
            .is_ok_and(|signature| signature.verify(message, public_key));

        ensure!(valid, Error::SignatureInvalid(signature_kind));

        Ok(())
    }
}
