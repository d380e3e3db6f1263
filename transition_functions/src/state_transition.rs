use anyhow::Result;
use helper_functions::verifier::Verifier;
use types::{beacon_state::BeaconState, config::Config, containers::BeaconBlock, preset::Preset};

use crate::{block_processing, slot_processing};

/// Computes the state that results from applying `block` to `state`.
///
/// `state` is left untouched. Slots between `state` and `block` are processed first, including any
/// epoch transitions along the way. The returned state has the slot of `block`.
pub fn state_transition<P: Preset>(
    config: &Config,
    state: &BeaconState<P>,
    block: &BeaconBlock,
    verifier: impl Verifier,
) -> Result<BeaconState<P>> {
    let mut post_state = state.clone();

    // > Process slots (including those with no blocks) since block
    if post_state.slot() < block.slot {
        slot_processing::process_slots(config, &mut post_state, block.slot)?;
    }

    // > Process block
    block_processing::process_block(config, &mut post_state, block, verifier)?;

    Ok(post_state)
}

#[cfg(test)]
mod tests {
    use helper_functions::{
        accessors::{self, beacon_committee, compute_attestation_slot, get_randao_mix},
        signing::{RandaoEpoch, SignForSingleFork as _},
        verifier::SingleVerifier,
    };
    use itertools::Itertools as _;
    use types::{
        containers::{BeaconBlockBody, Eth1Data},
        nonstandard::RelativeEpoch,
        preset::{Mainnet, Minimal},
        primitives::{Epoch, Slot, H256},
    };

    use crate::{error::Error, fixtures};

    use super::*;

    fn block_with_reveal<P: Preset>(
        config: &Config,
        state: &BeaconState<P>,
        slot: Slot,
        epoch: Epoch,
    ) -> BeaconBlock {
        let randao_reveal = RandaoEpoch::from(epoch).sign(config, state, &fixtures::secret_key());

        BeaconBlock {
            slot,
            proposer_index: 0,
            body: BeaconBlockBody {
                randao_reveal: randao_reveal.into(),
                eth1_data: Eth1Data {
                    deposit_count: 8192,
                    ..Eth1Data::default()
                },
            },
        }
    }

    // 8192 validators on mainnet form 2 committees per slot and 64 committees per epoch.
    #[test]
    fn mainnet_transition_into_second_epoch() -> Result<()> {
        let config = Config::mainnet();
        let state = fixtures::state_with_validators::<Mainnet>(8192, 0);
        let block = block_with_reveal(&config, &state, 32, 1);

        let post_state = state_transition(&config, &state, &block, SingleVerifier)?;

        assert_eq!(state.slot(), 0);
        assert_eq!(post_state.slot(), 32);
        assert_eq!(post_state.start_shard(), 64);
        assert_eq!(post_state.eth1_data_votes().len_u64(), 1);

        assert_eq!(
            get_randao_mix(&post_state, 1),
            H256::zero() ^ hashing::hash_768(block.body.randao_reveal),
        );

        let committees = (64..128)
            .map(|shard| beacon_committee(&post_state, 1, shard))
            .collect::<Result<Vec<_>>>()?;

        assert!(committees.iter().all(|committee| committee.len() == 128));
        assert!(beacon_committee(&post_state, 1, 63)?.is_empty());
        assert!(beacon_committee(&post_state, 1, 128)?.is_empty());

        let shuffled = accessors::active_validator_indices_shuffled(
            &post_state,
            RelativeEpoch::Current,
        )?;

        assert_eq!(committees.concat(), shuffled.as_ref());

        assert_eq!(compute_attestation_slot(&post_state, 1, 64)?, 32);
        assert_eq!(compute_attestation_slot(&post_state, 1, 65)?, 32);
        assert_eq!(compute_attestation_slot(&post_state, 1, 66)?, 33);
        assert_eq!(compute_attestation_slot(&post_state, 1, 127)?, 63);

        Ok(())
    }

    #[test]
    fn committees_cover_every_active_validator_once() -> Result<()> {
        let config = Config::minimal();
        let state = fixtures::state_with_validators::<Minimal>(100, 0);
        let block = block_with_reveal(&config, &state, 9, 1);

        let post_state = state_transition(&config, &state, &block, SingleVerifier)?;

        let members = (0..32)
            .map(|shard| beacon_committee(&post_state, 1, shard))
            .flatten_ok()
            .map_ok(|validator_index| *validator_index)
            .collect::<Result<Vec<_>>>()?;

        assert_eq!(members.into_iter().sorted().collect_vec(), (0..100).collect_vec());

        Ok(())
    }

    #[test]
    fn block_in_same_slot_skips_slot_processing() -> Result<()> {
        let config = Config::minimal();
        let state = fixtures::state_with_validators::<Minimal>(16, 12);
        let block = block_with_reveal(&config, &state, 12, 1);

        let post_state = state_transition(&config, &state, &block, SingleVerifier)?;

        assert_eq!(post_state.slot(), 12);
        assert_eq!(post_state.start_shard(), state.start_shard());
        assert_ne!(get_randao_mix(&post_state, 1), get_randao_mix(&state, 1));

        Ok(())
    }

    #[test]
    fn block_from_the_past_is_rejected() {
        let config = Config::minimal();
        let state = fixtures::state_with_validators::<Minimal>(16, 12);
        let block = block_with_reveal(&config, &state, 11, 1);

        let error = state_transition(&config, &state, &block, SingleVerifier)
            .expect_err("state is already past the slot of the block");

        assert!(matches!(
            error.downcast_ref(),
            Some(Error::SlotMismatch {
                state_slot: 12,
                block_slot: 11,
            }),
        ));
    }

    #[test]
    fn invalid_reveal_leaves_original_state_usable() -> Result<()> {
        let config = Config::minimal();
        let state = fixtures::state_with_validators::<Minimal>(16, 0);

        // The reveal is for the wrong epoch.
        let invalid_block = block_with_reveal(&config, &state, 8, 0);

        let error = state_transition(&config, &state, &invalid_block, SingleVerifier)
            .expect_err("reveal signs epoch 0 but the block is in epoch 1");

        assert_eq!(error.to_string(), "RANDAO reveal is invalid");
        assert_eq!(state.slot(), 0);
        assert!(state.eth1_data_votes().is_empty());

        let valid_block = block_with_reveal(&config, &state, 8, 1);
        let post_state = state_transition(&config, &state, &valid_block, SingleVerifier)?;

        assert_eq!(post_state.slot(), 8);
        assert_eq!(post_state.eth1_data_votes().len_u64(), 1);

        Ok(())
    }
}
