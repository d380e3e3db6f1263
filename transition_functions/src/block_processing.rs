use anyhow::{ensure, Result};
use helper_functions::{
    accessors::{self, get_current_epoch, get_randao_mix},
    signing::{RandaoEpoch, SignForSingleFork as _},
    verifier::Verifier,
};
use tap::TryConv as _;
use tracing::{debug, instrument};
use typenum::Unsigned as _;
use types::{
    beacon_state::BeaconState,
    config::Config,
    containers::{BeaconBlock, Eth1Data},
    preset::Preset,
};

use crate::error::Error;

/// Applies the RANDAO reveal and eth1 vote of `block` to `state`.
///
/// `state` must already be at the slot of `block`. `state` may be partially modified on failure.
#[instrument(level = "debug", skip_all, fields(slot = block.slot))]
pub fn process_block<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
    block: &BeaconBlock,
    verifier: impl Verifier,
) -> Result<()> {
    ensure!(
        block.slot == state.slot(),
        Error::SlotMismatch {
            state_slot: state.slot(),
            block_slot: block.slot,
        },
    );

    process_randao(config, state, block, verifier)?;
    process_eth1_data(state, block.body.eth1_data)?;

    Ok(())
}

pub fn process_randao<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
    block: &BeaconBlock,
    verifier: impl Verifier,
) -> Result<()> {
    let epoch = get_current_epoch(state);
    let randao_reveal = block.body.randao_reveal;

    // > Verify RANDAO reveal
    RandaoEpoch::from(epoch).verify_with(
        config,
        state,
        randao_reveal,
        accessors::public_key(state, block.proposer_index)?,
        verifier,
    )?;

    // > Mix in RANDAO reveal
    let mix = get_randao_mix(state, epoch) ^ hashing::hash_768(randao_reveal);
    *state.randao_mixes_mut().mod_index_mut(epoch) = mix;

    Ok(())
}

pub fn process_eth1_data<P: Preset>(
    state: &mut BeaconState<P>,
    eth1_data: Eth1Data,
) -> Result<()> {
    let voting_period = P::SlotsPerEth1VotingPeriod::U64;

    ensure!(
        state.eth1_data_votes().len_u64() < voting_period,
        Error::VotingWindowFull {
            maximum: voting_period,
        },
    );

    state.eth1_data_votes_mut().push(eth1_data)?;

    // No vote can have a majority until more than half of the period has been voted on.
    if state.eth1_data_votes().len_u64() * 2 <= voting_period {
        return Ok(());
    }

    let count_votes = |candidate: Eth1Data| {
        state
            .eth1_data_votes()
            .into_iter()
            .filter(|vote| **vote == candidate)
            .count()
            .try_conv::<u64>()
            .expect("number of votes is bounded by SlotsPerEth1VotingPeriod, which fits in u64")
    };

    let vote_count = count_votes(eth1_data);

    if vote_count * 2 > voting_period {
        let previous_eth1_data = state.eth1_data();

        assert!(
            previous_eth1_data == eth1_data || count_votes(previous_eth1_data) * 2 <= voting_period,
            "at most one candidate can receive a majority of votes in a voting period",
        );

        if previous_eth1_data != eth1_data {
            debug!(vote_count, ?eth1_data, "eth1 data accepted by majority");
        }

        *state.eth1_data_mut() = eth1_data;
    }

    Ok(())
}
