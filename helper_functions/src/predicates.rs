use types::{
    beacon_state::BeaconState,
    consts::FAR_FUTURE_EPOCH,
    containers::Validator,
    preset::Preset,
    primitives::{Epoch, ValidatorIndex},
};

// > Check if ``validator`` is active.
#[inline]
#[must_use]
pub const fn is_active_validator(validator: &Validator, epoch: Epoch) -> bool {
    validator.activation_epoch <= epoch && epoch < validator.exit_epoch
}

// > Check if ``validator`` is eligible to be placed into the activation queue.
#[must_use]
pub const fn is_eligible_for_activation_queue<P: Preset>(validator: &Validator) -> bool {
    validator.activation_eligibility_epoch == FAR_FUTURE_EPOCH
        && validator.effective_balance == P::MAX_EFFECTIVE_BALANCE
}

// > Check if ``validator`` is eligible for activation.
#[inline]
#[must_use]
pub const fn is_eligible_for_activation(validator: &Validator, finalized_epoch: Epoch) -> bool {
    // > Placement in queue is finalized
    validator.activation_eligibility_epoch <= finalized_epoch
        // > Has not yet been activated
        && validator.activation_epoch == FAR_FUTURE_EPOCH
}

#[inline]
#[must_use]
pub const fn is_exiting(validator: &Validator) -> bool {
    validator.exit_epoch != FAR_FUTURE_EPOCH
}

#[inline]
#[must_use]
pub fn is_valid_index<P: Preset>(state: &BeaconState<P>, validator_index: ValidatorIndex) -> bool {
    validator_index < state.validators().len_u64()
}

#[cfg(test)]
mod tests {
    use types::preset::Minimal;

    use super::*;

    #[test]
    fn test_not_activated() {
        let validator = inactive_validator();
        let epoch = 10;

        assert!(!is_active_validator(&validator, epoch));
    }

    #[test]
    fn test_activated() {
        let validator = Validator {
            activation_epoch: 4,
            ..inactive_validator()
        };
        let epoch = 10;

        assert!(is_active_validator(&validator, epoch));
    }

    #[test]
    fn test_exited() {
        let validator = Validator {
            exit_epoch: 10,
            ..inactive_validator()
        };
        let epoch = 10;

        assert!(!is_active_validator(&validator, epoch));
    }

    #[test]
    fn test_eligible_for_activation_queue() {
        let validator = Validator {
            effective_balance: Minimal::MAX_EFFECTIVE_BALANCE,
            ..inactive_validator()
        };

        assert!(is_eligible_for_activation_queue::<Minimal>(&validator));
    }

    #[test]
    fn test_not_eligible_for_activation_queue_with_low_balance() {
        let validator = Validator {
            effective_balance: Minimal::MAX_EFFECTIVE_BALANCE - 1_000_000_000,
            ..inactive_validator()
        };

        assert!(!is_eligible_for_activation_queue::<Minimal>(&validator));
    }

    #[test]
    fn test_eligible_for_activation_only_once_finalized() {
        let finalized_epoch = 5;

        let finalized = Validator {
            activation_eligibility_epoch: 5,
            ..inactive_validator()
        };

        let not_finalized = Validator {
            activation_eligibility_epoch: 6,
            ..inactive_validator()
        };

        let activated = Validator {
            activation_eligibility_epoch: 5,
            activation_epoch: 10,
            ..inactive_validator()
        };

        assert!(is_eligible_for_activation(&finalized, finalized_epoch));
        assert!(!is_eligible_for_activation(&not_finalized, finalized_epoch));
        assert!(!is_eligible_for_activation(&activated, finalized_epoch));
    }

    #[test]
    fn test_valid_index() -> anyhow::Result<()> {
        let mut state = BeaconState::<Minimal>::default();

        assert!(!is_valid_index(&state, 0));

        state.validators_mut().push(inactive_validator())?;

        assert!(is_valid_index(&state, 0));
        assert!(!is_valid_index(&state, 1));

        Ok(())
    }

    fn inactive_validator() -> Validator {
        Validator {
            activation_eligibility_epoch: FAR_FUTURE_EPOCH,
            activation_epoch: FAR_FUTURE_EPOCH,
            exit_epoch: FAR_FUTURE_EPOCH,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
            ..Validator::default()
        }
    }
}
