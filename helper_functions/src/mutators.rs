use anyhow::Result;
use typenum::Unsigned as _;
use types::{
    beacon_state::BeaconState,
    config::Config,
    containers::Validator,
    preset::Preset,
    primitives::{Epoch, ValidatorIndex},
};

use crate::{
    accessors::{get_current_epoch, get_exit_queue_end},
    error::Error,
    predicates::is_exiting,
};

pub fn initiate_validator_exit<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
    validator_index: ValidatorIndex,
) -> Result<()> {
    // > Return if validator already initiated exit
    if is_exiting(state.validators().get(validator_index)?) {
        return Ok(());
    }

    // > Compute exit queue epoch
    let exit_queue_epoch = get_exit_queue_end(config, state, get_current_epoch(state));

    // > Set validator exit epoch and withdrawable epoch
    let validator = state.validators_mut().get_mut(validator_index)?;

    validator.exit_epoch = exit_queue_epoch;

    validator.withdrawable_epoch = exit_queue_epoch
        .checked_add(config.min_validator_withdrawability_delay)
        .ok_or(Error::EpochOverflow)?;

    Ok(())
}

/// Appends `validator` to the registry and returns its permanent index.
pub fn add_validator_to_registry<P: Preset>(
    state: &mut BeaconState<P>,
    validator: Validator,
) -> Result<ValidatorIndex> {
    let validator_index = state.validators().len_u64();
    state.validators_mut().push(validator)?;
    Ok(validator_index)
}

#[inline]
pub fn increment_deposit_index<P: Preset>(state: &mut BeaconState<P>) {
    *state.eth1_deposit_index_mut() += 1;
}

/// Starts the mix of `epoch` from the mix of the epoch before it.
pub fn advance_randao_mix<P: Preset>(state: &mut BeaconState<P>, epoch: Epoch) {
    let mixes = state.randao_mixes_mut();
    let previous_mix = *mixes.mod_index(epoch + P::EpochsPerHistoricalVector::U64 - 1);
    *mixes.mod_index_mut(epoch) = previous_mix;
}
