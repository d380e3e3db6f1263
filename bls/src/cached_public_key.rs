use core::fmt::{Debug, Formatter, Result as FmtResult};

use derivative::Derivative;
use once_cell::race::OnceBox;
use serde::{Deserialize, Serialize};

use crate::{error::Error, public_key::PublicKey, public_key_bytes::PublicKeyBytes};

/// Compressed public key that is decompressed at most once.
///
/// Validator records store keys in compressed form.
/// Decompression is expensive, so the result is kept alongside the bytes.
#[derive(Default, Derivative, Deserialize, Serialize)]
#[derivative(PartialEq, Eq)]
#[serde(transparent)]
pub struct CachedPublicKey {
    bytes: PublicKeyBytes,

    #[derivative(PartialEq = "ignore")]
    #[serde(skip)]
    decompressed: OnceBox<PublicKey>,
}

impl From<PublicKeyBytes> for CachedPublicKey {
    #[inline]
    fn from(bytes: PublicKeyBytes) -> Self {
        Self {
            bytes,
            decompressed: OnceBox::new(),
        }
    }
}

impl From<PublicKey> for CachedPublicKey {
    #[inline]
    fn from(public_key: PublicKey) -> Self {
        let decompressed = OnceBox::new();

        decompressed
            .set(Box::new(public_key))
            .expect("decompressed is empty because OnceBox::new returns an empty cell");

        Self {
            bytes: public_key.into(),
            decompressed,
        }
    }
}

impl Clone for CachedPublicKey {
    fn clone(&self) -> Self {
        match self.decompressed.get().copied() {
            Some(public_key) => public_key.into(),
            None => self.bytes.into(),
        }
    }
}

impl Debug for CachedPublicKey {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        formatter
            .debug_tuple("CachedPublicKey")
            .field(&self.bytes)
            .finish()
    }
}

impl CachedPublicKey {
    #[must_use]
    pub const fn as_bytes(&self) -> &PublicKeyBytes {
        &self.bytes
    }

    #[must_use]
    pub const fn to_bytes(&self) -> PublicKeyBytes {
        self.bytes
    }

    pub fn decompress(&self) -> Result<&PublicKey, Error> {
        self.decompressed
            .get_or_try_init(|| PublicKey::try_from(self.bytes).map(Box::new))
    }
}
