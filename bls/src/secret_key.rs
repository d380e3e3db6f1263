use blst::min_pk::SecretKey as RawSecretKey;

use crate::{
    consts::DOMAIN_SEPARATION_TAG, error::Error, public_key::PublicKey, signature::Signature,
};

/// Input keying material for deterministic key generation.
///
/// Secret keys are derived with the `KeyGen` procedure from the BLS signature draft.
/// At least 32 bytes of keying material are required.
pub struct SecretKeyBytes {
    ikm: [u8; 32],
}

impl SecretKeyBytes {
    #[must_use]
    pub const fn from_seed(ikm: [u8; 32]) -> Self {
        Self { ikm }
    }
}

// `RawSecretKey` zeroizes itself on drop.
pub struct SecretKey(RawSecretKey);

impl TryFrom<SecretKeyBytes> for SecretKey {
    type Error = Error;

    #[inline]
    fn try_from(bytes: SecretKeyBytes) -> Result<Self, Self::Error> {
        RawSecretKey::key_gen(&bytes.ikm, &[])
            .map(Self)
            .map_err(|_| Error::InvalidSecretKey)
    }
}

impl SecretKey {
    #[inline]
    #[must_use]
    pub fn to_public_key(&self) -> PublicKey {
        self.0.sk_to_pk().into()
    }

    #[inline]
    #[must_use]
    pub fn sign(&self, message: impl AsRef<[u8]>) -> Signature {
        self.0
            .sign(message.as_ref(), DOMAIN_SEPARATION_TAG, &[])
            .into()
    }
}
