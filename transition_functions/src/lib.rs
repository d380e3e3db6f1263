pub use block_processing::{process_block, process_eth1_data, process_randao};
pub use epoch_processing::{
    process_activation_queue, process_epoch, process_eth1_data_reset, process_randao_mixes_reset,
    process_registry_updates, process_start_shard_update,
};
pub use error::Error;
pub use slot_processing::process_slots;
pub use state_transition::state_transition;

mod block_processing;
mod epoch_processing;
mod error;
mod slot_processing;
mod state_transition;

#[cfg(test)]
mod fixtures;
