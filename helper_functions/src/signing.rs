use anyhow::Result;
use bls::{CachedPublicKey, SecretKey, Signature, SignatureBytes};
use derive_more::From;
use types::{
    beacon_state::BeaconState,
    config::Config,
    consts::DOMAIN_RANDAO,
    preset::Preset,
    primitives::{DomainType, Epoch, H256},
};

use crate::{
    accessors,
    error::SignatureKind,
    misc,
    verifier::{SingleVerifier, Verifier},
};

// This wrapper is needed to differentiate between `Epoch` and `Slot`.
// They are aliased to the same type and thus cannot have different trait implementations.
#[derive(Clone, Copy, PartialEq, Eq, Debug, From)]
pub struct RandaoEpoch(Epoch);

/// Objects signed with a domain that depends on the fork active in the object's epoch.
pub trait SignForSingleFork<P: Preset> {
    const DOMAIN_TYPE: DomainType;
    const SIGNATURE_KIND: SignatureKind;

    fn epoch(&self) -> Epoch;

    fn object_root(&self) -> H256;

    fn signing_root(&self, config: &Config, beacon_state: &BeaconState<P>) -> H256 {
        let epoch = Some(self.epoch());
        let domain = accessors::get_domain(config, beacon_state, Self::DOMAIN_TYPE, epoch);
        misc::compute_signing_root(self.object_root(), domain)
    }

    fn sign(
        &self,
        config: &Config,
        beacon_state: &BeaconState<P>,
        secret_key: &SecretKey,
    ) -> Signature {
        secret_key.sign(self.signing_root(config, beacon_state))
    }

    fn verify(
        &self,
        config: &Config,
        beacon_state: &BeaconState<P>,
        signature_bytes: SignatureBytes,
        cached_public_key: &CachedPublicKey,
    ) -> Result<()> {
        self.verify_with(
            config,
            beacon_state,
            signature_bytes,
            cached_public_key,
            SingleVerifier,
        )
    }

    fn verify_with(
        &self,
        config: &Config,
        beacon_state: &BeaconState<P>,
        signature_bytes: SignatureBytes,
        cached_public_key: &CachedPublicKey,
        mut verifier: impl Verifier,
    ) -> Result<()> {
        verifier.verify_singular(
            self.signing_root(config, beacon_state),
            signature_bytes,
            cached_public_key,
            Self::SIGNATURE_KIND,
        )
    }
}

impl<P: Preset> SignForSingleFork<P> for RandaoEpoch {
    const DOMAIN_TYPE: DomainType = DOMAIN_RANDAO;
    const SIGNATURE_KIND: SignatureKind = SignatureKind::Randao;

    fn epoch(&self) -> Epoch {
        self.0
    }

    // The root of a basic value is the value serialized and padded to 32 bytes.
    fn object_root(&self) -> H256 {
        let mut root = H256::zero();
        root[..size_of::<Epoch>()].copy_from_slice(&self.0.to_le_bytes());
        root
    }
}
