use core::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{bail, ensure, Result};
use bls::{CachedPublicKey, PublicKeyBytes};
use itertools::Itertools as _;
use shuffling::ShufflingEpoch;
use tap::TryConv as _;
use typenum::Unsigned as _;
use types::{
    beacon_state::BeaconState,
    config::Config,
    consts::{DOMAIN_BEACON_ATTESTER, FAR_FUTURE_EPOCH, GENESIS_EPOCH},
    nonstandard::RelativeEpoch,
    preset::Preset,
    primitives::{DomainType, Epoch, Gwei, ParticipationFlags, Shard, Slot, ValidatorIndex, H256},
};

use crate::{error::Error, misc, predicates};

#[must_use]
pub fn get_previous_epoch<P: Preset>(state: &BeaconState<P>) -> Epoch {
    get_current_epoch(state)
        .saturating_sub(1)
        .max(GENESIS_EPOCH)
}

#[must_use]
pub fn get_current_epoch<P: Preset>(state: &BeaconState<P>) -> Epoch {
    misc::compute_epoch_at_slot::<P>(state.slot())
}

#[must_use]
pub fn get_next_epoch<P: Preset>(state: &BeaconState<P>) -> Epoch {
    get_current_epoch(state) + 1
}

#[must_use]
pub fn absolute_epoch<P: Preset>(state: &BeaconState<P>, relative_epoch: RelativeEpoch) -> Epoch {
    match relative_epoch {
        RelativeEpoch::Previous => get_previous_epoch(state),
        RelativeEpoch::Current => get_current_epoch(state),
        RelativeEpoch::Next => get_next_epoch(state),
    }
}

pub fn relative_epoch<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> Result<RelativeEpoch> {
    match get_next_epoch(state).checked_sub(epoch) {
        None => bail!(Error::EpochAfterNext),
        Some(0) => Ok(RelativeEpoch::Next),
        Some(1) => Ok(RelativeEpoch::Current),
        Some(2) => Ok(RelativeEpoch::Previous),
        _ => bail!(Error::EpochBeforePrevious),
    }
}

/// Returns the RANDAO mix of `epoch`.
///
/// Mixes are kept for `EPOCHS_PER_HISTORICAL_VECTOR` epochs. Callers must not look further back.
#[must_use]
pub fn get_randao_mix<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> H256 {
    *state.randao_mixes().mod_index(epoch)
}

pub fn public_key<P: Preset>(
    state: &BeaconState<P>,
    validator_index: ValidatorIndex,
) -> Result<&CachedPublicKey> {
    Ok(&state.validators().get(validator_index)?.pubkey)
}

#[must_use]
pub fn index_of_public_key<P: Preset>(
    state: &BeaconState<P>,
    public_key: PublicKeyBytes,
) -> Option<ValidatorIndex> {
    (0..)
        .zip(state.validators())
        .find(|(_, validator)| *validator.pubkey.as_bytes() == public_key)
        .map(|(validator_index, _)| validator_index)
}

pub fn get_active_validator_indices<P: Preset>(
    state: &BeaconState<P>,
    epoch: Epoch,
) -> impl Iterator<Item = ValidatorIndex> + '_ {
    (0..)
        .zip(state.validators())
        .filter(move |(_, validator)| predicates::is_active_validator(validator, epoch))
        .map(|(index, _)| index)
}

#[must_use]
pub fn get_active_validator_count<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> u64 {
    state
        .validators()
        .into_iter()
        .filter(|validator| predicates::is_active_validator(validator, epoch))
        .count()
        .try_conv::<u64>()
        .expect("the number of validators is bounded by ValidatorRegistryLimit, which fits in u64")
}

pub fn get_seed<P: Preset>(state: &BeaconState<P>, epoch: Epoch, domain_type: DomainType) -> H256 {
    let mix = get_randao_mix(
        state,
        epoch + P::EpochsPerHistoricalVector::U64 - P::MIN_SEED_LOOKAHEAD - 1,
    );

    hashing::hash_32_64_256(domain_type.to_fixed_bytes(), epoch, mix)
}

/// Returns the active validators of `relative_epoch` in shuffled order.
///
/// The result is computed once and kept in the state's cache until the active set changes.
pub fn active_validator_indices_shuffled<P: Preset>(
    state: &BeaconState<P>,
    relative_epoch: RelativeEpoch,
) -> Result<&Arc<[ValidatorIndex]>> {
    state.cache().active_validator_indices_shuffled[relative_epoch].get_or_try_init(|| {
        let epoch = absolute_epoch(state, relative_epoch);
        let seed = get_seed(state, epoch, DOMAIN_BEACON_ATTESTER);
        let mut indices = get_active_validator_indices(state, epoch).collect_vec();

        shuffling::shuffle_slice::<P, _>(&mut indices, seed)?;

        Ok(indices.into())
    })
}

#[must_use]
pub fn get_committee_count<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> NonZeroU64 {
    let active_validator_count = get_active_validator_count(state, epoch);
    misc::committee_count_from_active_validator_count::<P>(active_validator_count)
}

#[must_use]
pub fn get_shard_delta<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> u64 {
    let active_validator_count = get_active_validator_count(state, epoch);
    misc::shard_delta_from_active_validator_count::<P>(active_validator_count)
}

/// Returns the shard assigned to the first committee of `relative_epoch`.
#[must_use]
pub fn get_start_shard<P: Preset>(state: &BeaconState<P>, relative_epoch: RelativeEpoch) -> Shard {
    let shard_count = P::ShardCount::U64;
    let start_shard = state.start_shard();
    let current_epoch = get_current_epoch(state);

    match relative_epoch {
        RelativeEpoch::Current => start_shard,
        RelativeEpoch::Next => (start_shard + get_shard_delta(state, current_epoch)) % shard_count,
        RelativeEpoch::Previous => {
            let previous_epoch = get_previous_epoch(state);

            // At genesis the previous epoch is the current one.
            if previous_epoch == current_epoch {
                return start_shard;
            }

            (start_shard + shard_count - get_shard_delta(state, previous_epoch)) % shard_count
        }
    }
}

pub fn get_shuffling_epoch<P: Preset>(
    state: &BeaconState<P>,
    relative_epoch: RelativeEpoch,
) -> Result<ShufflingEpoch<P>> {
    let shuffled_indices = Arc::clone(active_validator_indices_shuffled(state, relative_epoch)?);
    let active_validator_count = shuffled_indices.len().try_conv::<u64>()?;
    let committee_count =
        misc::committee_count_from_active_validator_count::<P>(active_validator_count);
    let start_shard = get_start_shard(state, relative_epoch);

    ShufflingEpoch::new(shuffled_indices, committee_count, start_shard)
}

/// Returns the committee of `shard` in `epoch`.
///
/// The committee is empty if no committee is assigned to `shard` in `epoch`.
pub fn beacon_committee<P: Preset>(
    state: &BeaconState<P>,
    epoch: Epoch,
    shard: Shard,
) -> Result<&[ValidatorIndex]> {
    let shard_count = P::ShardCount::U64;

    ensure!(
        shard < shard_count,
        shuffling::Error::ShardOutOfBounds { shard, shard_count },
    );

    let relative_epoch = relative_epoch(state, epoch)?;
    let indices = active_validator_indices_shuffled(state, relative_epoch)?;
    let index_count = indices.len().try_conv::<u64>()?;
    let committee_count = misc::committee_count_from_active_validator_count::<P>(index_count);
    let start_shard = get_start_shard(state, relative_epoch);
    let committee_index = (shard + shard_count - start_shard) % shard_count;

    if committee_index >= committee_count.get() {
        return Ok(&[]);
    }

    let range = shuffling::compute_committee_range(index_count, committee_index, committee_count);

    Ok(&indices[range.start.try_conv::<usize>()?..range.end.try_conv::<usize>()?])
}

/// Returns the slot in which the committee of `shard` attests during `epoch`.
pub fn compute_attestation_slot<P: Preset>(
    state: &BeaconState<P>,
    epoch: Epoch,
    shard: Shard,
) -> Result<Slot> {
    let shard_count = P::ShardCount::U64;

    ensure!(
        shard < shard_count,
        shuffling::Error::ShardOutOfBounds { shard, shard_count },
    );

    let relative_epoch = relative_epoch(state, epoch)?;
    let committee_count = get_committee_count(state, epoch).get();
    let offset = (shard + shard_count - get_start_shard(state, relative_epoch)) % shard_count;

    ensure!(
        offset < committee_count,
        Error::NoCommitteeForShard { epoch, shard },
    );

    let committees_per_slot = committee_count / P::SlotsPerEpoch::U64;

    Ok(misc::compute_start_slot_at_epoch::<P>(epoch) + offset / committees_per_slot)
}

#[must_use]
pub fn get_validator_churn_limit<P: Preset>(
    config: &Config,
    state: &BeaconState<P>,
    epoch: Epoch,
) -> u64 {
    let active_validator_count = get_active_validator_count(state, epoch);
    misc::churn_limit_from_active_validator_count(config, active_validator_count)
}

/// Returns the earliest epoch a validator exiting in `epoch` can be scheduled to exit at.
#[must_use]
pub fn get_exit_queue_end<P: Preset>(
    config: &Config,
    state: &BeaconState<P>,
    epoch: Epoch,
) -> Epoch {
    let exit_epochs = state
        .validators()
        .into_iter()
        .map(|validator| validator.exit_epoch)
        .filter(|exit_epoch| *exit_epoch != FAR_FUTURE_EPOCH);

    let exit_queue_epoch = exit_epochs
        .clone()
        .fold(misc::compute_activation_exit_epoch::<P>(epoch), Epoch::max);

    let exit_queue_churn = exit_epochs
        .filter(|exit_epoch| *exit_epoch == exit_queue_epoch)
        .count()
        .try_conv::<u64>()
        .expect("the number of validators is bounded by ValidatorRegistryLimit, which fits in u64");

    if exit_queue_churn >= get_validator_churn_limit(config, state, epoch) {
        exit_queue_epoch + 1
    } else {
        exit_queue_epoch
    }
}

/// Keeps the indices of validators that have not been slashed, preserving their order.
pub fn filter_unslashed<P: Preset>(
    state: &BeaconState<P>,
    indices: impl IntoIterator<Item = ValidatorIndex>,
) -> Result<Vec<ValidatorIndex>> {
    let mut unslashed = vec![];

    for validator_index in indices {
        if !state.validators().get(validator_index)?.slashed {
            unslashed.push(validator_index);
        }
    }

    Ok(unslashed)
}

pub fn get_indices_to_slash<P: Preset>(
    state: &BeaconState<P>,
    withdrawable_epoch: Epoch,
) -> impl Iterator<Item = ValidatorIndex> + '_ {
    (0..)
        .zip(state.validators())
        .filter(move |(_, validator)| {
            validator.slashed && validator.withdrawable_epoch == withdrawable_epoch
        })
        .map(|(index, _)| index)
}

// The balance queries below are floored so that they can be used as divisors.

/// Returns the combined effective balance of validators active in `epoch`. At least 1 Gwei.
#[must_use]
pub fn get_total_staked_balance<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> Gwei {
    state
        .validators()
        .into_iter()
        .filter(|validator| predicates::is_active_validator(validator, epoch))
        .map(|validator| validator.effective_balance)
        .sum::<Gwei>()
        .max(1)
}

/// Returns the combined effective balance of validators whose participation flags include all
/// flags in `mask`. At least 1 Gwei.
///
/// `participation` is indexed by validator index. Validators without an entry are skipped.
#[must_use]
pub fn get_attesters_stake<P: Preset>(
    state: &BeaconState<P>,
    participation: &[ParticipationFlags],
    mask: ParticipationFlags,
) -> Gwei {
    state
        .validators()
        .into_iter()
        .zip(participation)
        .filter(|(_, flags)| *flags & mask == mask)
        .map(|(validator, _)| validator.effective_balance)
        .sum::<Gwei>()
        .max(1)
}

/// Returns the combined effective balance of validators in `indices`. At least 1 Gwei.
pub fn get_total_balance<P: Preset>(
    state: &BeaconState<P>,
    indices: impl IntoIterator<Item = ValidatorIndex>,
) -> Result<Gwei> {
    let mut total = 0;

    for validator_index in indices {
        total += state.validators().get(validator_index)?.effective_balance;
    }

    Ok(total.max(1))
}

/// Returns the combined effective balance of the whole registry.
/// At least `EFFECTIVE_BALANCE_INCREMENT`.
#[must_use]
pub fn get_total_stake<P: Preset>(state: &BeaconState<P>) -> Gwei {
    state
        .validators()
        .into_iter()
        .map(|validator| validator.effective_balance)
        .sum::<Gwei>()
        .max(P::EFFECTIVE_BALANCE_INCREMENT.get())
}

#[must_use]
pub fn get_domain<P: Preset>(
    config: &Config,
    state: &BeaconState<P>,
    domain_type: DomainType,
    epoch: Option<Epoch>,
) -> H256 {
    let epoch = epoch.unwrap_or_else(|| get_current_epoch(state));
    let fork = state.fork();

    let fork_version = if epoch < fork.epoch {
        fork.previous_version
    } else {
        fork.current_version
    };

    misc::compute_domain(
        config,
        domain_type,
        Some(fork_version),
        Some(state.genesis_validators_root()),
    )
}
