use bls::{CachedPublicKey, SecretKey, SecretKeyBytes};
use types::{
    beacon_state::BeaconState,
    consts::{FAR_FUTURE_EPOCH, GENESIS_EPOCH},
    containers::Validator,
    preset::Preset,
    primitives::Slot,
};

fn secret_key_from_seed(seed: u8) -> SecretKey {
    SecretKey::try_from(SecretKeyBytes::from_seed([seed; 32]))
        .expect("every 32-byte seed produces a valid secret key")
}

pub fn secret_key() -> SecretKey {
    secret_key_from_seed(1)
}

pub fn other_secret_key() -> SecretKey {
    secret_key_from_seed(2)
}

pub fn active_validator<P: Preset>(pubkey: CachedPublicKey) -> Validator {
    Validator {
        pubkey,
        effective_balance: P::MAX_EFFECTIVE_BALANCE,
        activation_eligibility_epoch: GENESIS_EPOCH,
        activation_epoch: GENESIS_EPOCH,
        exit_epoch: FAR_FUTURE_EPOCH,
        withdrawable_epoch: FAR_FUTURE_EPOCH,
        ..Validator::default()
    }
}

/// Constructs a state with `count` validators active since genesis.
///
/// All validators share the key returned by [`secret_key`].
pub fn state_with_validators<P: Preset>(count: u64, slot: Slot) -> BeaconState<P> {
    let pubkey = CachedPublicKey::from(secret_key().to_public_key());
    let mut state = BeaconState::default();

    for _ in 0..count {
        state
            .validators_mut()
            .push(active_validator::<P>(pubkey.clone()))
            .expect("tests use far fewer validators than ValidatorRegistryLimit");
    }

    state.set_slot(slot);
    state
}
