use anyhow::Result;
use arithmetic::U64Ext as _;
use helper_functions::{
    accessors::{get_current_epoch, get_next_epoch, get_shard_delta, get_validator_churn_limit},
    misc::compute_activation_exit_epoch,
    mutators::{advance_randao_mix, initiate_validator_exit},
    predicates::{
        is_active_validator, is_eligible_for_activation, is_eligible_for_activation_queue,
    },
};
use itertools::Itertools as _;
use tap::TryConv as _;
use tracing::{debug, instrument};
use typenum::Unsigned as _;
use types::{
    beacon_state::BeaconState,
    config::Config,
    consts::FAR_FUTURE_EPOCH,
    preset::Preset,
    primitives::Epoch,
};

#[instrument(level = "debug", skip_all, fields(epoch = get_current_epoch(state)))]
pub fn process_epoch<P: Preset>(config: &Config, state: &mut BeaconState<P>) -> Result<()> {
    process_registry_updates(config, state)?;
    process_eth1_data_reset(state);
    process_randao_mixes_reset(state);
    process_start_shard_update(state);

    Ok(())
}

pub fn process_registry_updates<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
) -> Result<()> {
    let current_epoch = get_current_epoch(state);

    let mut eligible_for_activation_queue = vec![];
    let mut ejections = vec![];

    for (validator, validator_index) in state.validators().into_iter().zip(0..) {
        if is_eligible_for_activation_queue::<P>(validator) {
            eligible_for_activation_queue.push(validator_index);
        }

        if is_active_validator(validator, current_epoch)
            && validator.effective_balance <= config.ejection_balance
        {
            ejections.push(validator_index);
        }
    }

    // > Process activation eligibility and ejections
    for validator_index in eligible_for_activation_queue {
        state
            .validators_mut()
            .get_mut(validator_index)?
            .activation_eligibility_epoch = current_epoch;
    }

    if !ejections.is_empty() {
        debug!(count = ejections.len(), "ejecting validators");
    }

    for validator_index in ejections {
        initiate_validator_exit(config, state, validator_index)?;
    }

    let finalized_epoch = state.finalized_checkpoint().epoch;

    process_activation_queue(config, state, current_epoch, finalized_epoch)
}

/// Activates validators whose eligibility has been finalized, at most the churn limit per epoch.
///
/// Validators that became eligible earlier are activated first. Ties are broken by index.
pub fn process_activation_queue<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
    current_epoch: Epoch,
    finalized_epoch: Epoch,
) -> Result<()> {
    let activation_queue = (0..)
        .zip(state.validators())
        .filter(|(_, validator)| is_eligible_for_activation(validator, finalized_epoch))
        .map(|(validator_index, validator)| {
            (validator.activation_eligibility_epoch, validator_index)
        })
        .sorted_unstable()
        .map(|(_, validator_index)| validator_index)
        .collect_vec();

    // > Dequeued validators for activation up to churn limit
    let churn_limit =
        get_validator_churn_limit(config, state, current_epoch).try_conv::<usize>()?;
    let activation_exit_epoch = compute_activation_exit_epoch::<P>(current_epoch);
    let dequeued = activation_queue.len().min(churn_limit);

    for validator_index in activation_queue.into_iter().take(churn_limit) {
        state
            .validators_mut()
            .get_mut(validator_index)?
            .activation_epoch = activation_exit_epoch;
    }

    if dequeued > 0 {
        debug!(
            dequeued,
            churn_limit,
            activation_exit_epoch,
            "validators dequeued for activation"
        );
    }

    Ok(())
}

pub fn process_eth1_data_reset<P: Preset>(state: &mut BeaconState<P>) {
    let next_epoch = get_next_epoch(state);

    // > Reset eth1 data votes
    if next_epoch.mod_typenum::<P::EpochsPerEth1VotingPeriod>() == 0 {
        state.eth1_data_votes_mut().clear();
    }
}

pub fn process_randao_mixes_reset<P: Preset>(state: &mut BeaconState<P>) {
    let next_epoch = get_next_epoch(state);

    // > Set randao mix
    advance_randao_mix(state, next_epoch);
}

pub fn process_start_shard_update<P: Preset>(state: &mut BeaconState<P>) {
    let current_epoch = get_current_epoch(state);
    let shard_delta = get_shard_delta(state, current_epoch);

    // > Update start shard
    *state.start_shard_mut() = (state.start_shard() + shard_delta) % P::ShardCount::U64;
}

#[cfg(test)]
mod tests {
    use helper_functions::accessors::get_randao_mix;
    use tracing_test::traced_test;
    use types::{
        containers::{Checkpoint, Eth1Data, Validator},
        preset::Minimal,
        primitives::H256,
    };

    use crate::fixtures;

    use super::*;

    fn pending_validator(activation_eligibility_epoch: Epoch) -> Validator {
        Validator {
            activation_eligibility_epoch,
            activation_epoch: FAR_FUTURE_EPOCH,
            ..fixtures::active_validator::<Minimal>(Default::default())
        }
    }

    fn activation_epochs(state: &BeaconState<Minimal>) -> Vec<Epoch> {
        state
            .validators()
            .into_iter()
            .map(|validator| validator.activation_epoch)
            .collect()
    }

    // The churn limit is 2 for fewer than 64 active validators with the minimal configuration.
    #[test]
    fn activation_queue_is_ordered_by_eligibility_then_index() -> Result<()> {
        let config = Config::minimal();
        let mut state = fixtures::state_with_validators::<Minimal>(8, 39);

        for activation_eligibility_epoch in [3, 1, 2, 1, 0, 2] {
            state
                .validators_mut()
                .push(pending_validator(activation_eligibility_epoch))?;
        }

        process_activation_queue(&config, &mut state, 4, 2)?;

        let epochs = activation_epochs(&state);

        assert_eq!(epochs[..8], [0_u64; 8]);
        assert_eq!(
            epochs[8..],
            [
                FAR_FUTURE_EPOCH,
                9,
                FAR_FUTURE_EPOCH,
                FAR_FUTURE_EPOCH,
                9,
                FAR_FUTURE_EPOCH,
            ],
        );

        process_activation_queue(&config, &mut state, 5, 2)?;

        let epochs = activation_epochs(&state);

        assert_eq!(
            epochs[8..],
            [FAR_FUTURE_EPOCH, 9, 10, 10, 9, FAR_FUTURE_EPOCH],
        );

        Ok(())
    }

    #[test]
    fn activation_queue_drains_in_order_within_churn_limit() -> Result<()> {
        let config = Config::minimal();
        let mut state = fixtures::state_with_validators::<Minimal>(8, 39);
        let finalized_epoch = 4;

        for activation_eligibility_epoch in [4, 0, 3, 1, 1, 2, 0, 4, 2, 3, 0, 1, 2] {
            state
                .validators_mut()
                .push(pending_validator(activation_eligibility_epoch))?;
        }

        let mut dequeued = vec![];

        for current_epoch in 4..24 {
            let churn_limit = get_validator_churn_limit(&config, &state, current_epoch);
            let epochs_before = activation_epochs(&state);

            process_activation_queue(&config, &mut state, current_epoch, finalized_epoch)?;

            let newly_activated = activation_epochs(&state)
                .into_iter()
                .zip(epochs_before)
                .zip(0..)
                .filter(|((after, before), _)| after != before)
                .map(|(_, validator_index)| validator_index)
                .collect_vec();

            assert!(newly_activated.len().try_conv::<u64>()? <= churn_limit);

            let mut activated_in_epoch = vec![];

            for validator_index in newly_activated {
                let validator = state.validators().get(validator_index)?;

                assert_eq!(
                    validator.activation_epoch,
                    compute_activation_exit_epoch::<Minimal>(current_epoch),
                );

                activated_in_epoch.push((validator.activation_eligibility_epoch, validator_index));
            }

            dequeued.extend(activated_in_epoch.into_iter().sorted());
        }

        assert_eq!(dequeued.len(), 13);
        assert!(dequeued.iter().tuple_windows().all(|(earlier, later)| earlier < later));
        assert!(state
            .validators()
            .into_iter()
            .all(|validator| validator.activation_epoch != FAR_FUTURE_EPOCH));

        Ok(())
    }

    #[test]
    fn registry_updates_mark_eligibility_and_eject() -> Result<()> {
        let config = Config::minimal();
        let mut state = fixtures::state_with_validators::<Minimal>(8, 15);

        state.validators_mut().push(Validator {
            activation_eligibility_epoch: FAR_FUTURE_EPOCH,
            ..pending_validator(0)
        })?;

        state.validators_mut()[2].effective_balance = config.ejection_balance;

        process_registry_updates(&config, &mut state)?;

        let pending = state.validators().get(8)?;
        let ejected = state.validators().get(2)?;

        assert_eq!(pending.activation_eligibility_epoch, 1);
        assert_eq!(pending.activation_epoch, FAR_FUTURE_EPOCH);
        assert_eq!(ejected.exit_epoch, 6);
        assert_eq!(ejected.withdrawable_epoch, 6 + 256);
        assert_eq!(state.validators().get(3)?.exit_epoch, FAR_FUTURE_EPOCH);

        Ok(())
    }

    #[test]
    fn ejections_are_spread_by_churn_limit() -> Result<()> {
        let config = Config::minimal();
        let mut state = fixtures::state_with_validators::<Minimal>(12, 15);

        for validator in state.validators_mut().iter_mut().take(6) {
            validator.effective_balance = config.ejection_balance;
        }

        process_registry_updates(&config, &mut state)?;

        let exit_epochs = state
            .validators()
            .into_iter()
            .map(|validator| validator.exit_epoch)
            .collect_vec();

        assert_eq!(exit_epochs[..6], [6_u64, 6, 7, 7, 8, 8]);
        assert!(exit_epochs[6..].iter().all(|epoch| *epoch == FAR_FUTURE_EPOCH));

        Ok(())
    }

    #[test]
    fn eth1_data_votes_are_cleared_at_end_of_voting_period() -> Result<()> {
        let eth1_data = Eth1Data {
            deposit_count: 5,
            ..Eth1Data::default()
        };

        let mut state = BeaconState::<Minimal>::default();

        *state.eth1_data_mut() = eth1_data;
        state.eth1_data_votes_mut().push(eth1_data)?;
        state.set_slot(23);

        process_eth1_data_reset(&mut state);

        assert_eq!(state.eth1_data_votes().len(), 1);

        state.set_slot(31);

        process_eth1_data_reset(&mut state);

        assert!(state.eth1_data_votes().is_empty());
        assert_eq!(state.eth1_data(), eth1_data);

        Ok(())
    }

    #[test]
    fn randao_mix_of_next_epoch_starts_from_current_one() {
        let mut state = BeaconState::<Minimal>::default();

        state.set_slot(31);
        *state.randao_mixes_mut().mod_index_mut(3) = H256::repeat_byte(7);

        process_randao_mixes_reset(&mut state);

        assert_eq!(get_randao_mix(&state, 4), H256::repeat_byte(7));
    }

    // With 100 active validators the minimal preset has 24 committees per epoch.
    #[test]
    fn start_shard_advances_by_shard_delta() {
        let mut state = fixtures::state_with_validators::<Minimal>(100, 15);

        *state.start_shard_mut() = 5;

        process_start_shard_update(&mut state);

        assert_eq!(state.start_shard(), 29);

        process_start_shard_update(&mut state);

        assert_eq!(state.start_shard(), 21);
    }

    #[traced_test]
    #[test]
    fn process_epoch_logs_activations() {
        let config = Config::minimal();
        let mut state = fixtures::state_with_validators::<Minimal>(8, 15);

        *state.finalized_checkpoint_mut() = Checkpoint {
            epoch: 1,
            ..Checkpoint::default()
        };

        state
            .validators_mut()
            .push(pending_validator(1))
            .expect("registry is far from full");

        process_epoch(&config, &mut state).expect("epoch processing succeeds");

        assert_eq!(
            state.validators().get(8).map(|validator| validator.activation_epoch).ok(),
            Some(6),
        );
        assert!(logs_contain("validators dequeued for activation"));
    }
}
