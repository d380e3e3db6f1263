use thiserror::Error;
use types::primitives::Slot;

#[derive(Debug, Error)]
pub enum Error {
    #[error("eth1 data votes are full (maximum: {maximum})")]
    VotingWindowFull { maximum: u64 },
    #[error("slot in block ({block_slot}) does not match state ({state_slot})")]
    SlotMismatch { state_slot: Slot, block_slot: Slot },
    #[error("target slot ({target}) is not later than current slot ({current})")]
    SlotNotLater { current: Slot, target: Slot },
}
