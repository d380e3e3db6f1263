use anyhow::{ensure, Result};
use helper_functions::misc;
use tracing::instrument;
use types::{beacon_state::BeaconState, config::Config, preset::Preset, primitives::Slot};

use crate::{epoch_processing, error::Error};

#[instrument(level = "debug", skip_all, fields(target = slot))]
pub fn process_slots<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
    slot: Slot,
) -> Result<()> {
    ensure!(
        state.slot() < slot,
        Error::SlotNotLater {
            current: state.slot(),
            target: slot,
        },
    );

    while state.slot() < slot {
        // > Process epoch on the start slot of the next epoch
        if misc::is_epoch_start::<P>(state.slot() + 1) {
            epoch_processing::process_epoch(config, state)?;
        }

        state.advance_slot();
    }

    Ok(())
}
