use std::sync::Arc;

use enum_map::EnumMap;
use once_cell::sync::OnceCell;

use crate::{nonstandard::RelativeEpoch, primitives::ValidatorIndex};

// Shuffling an epoch with hundreds of thousands of active validators takes longer than the rest
// of slot processing combined. The shuffled indices only depend on the active set and on RANDAO
// mixes that can no longer change, so they are computed once per epoch and rotated.
#[derive(Clone, Default, Debug)]
pub struct Cache {
    pub active_validator_indices_shuffled: EnumMap<RelativeEpoch, OnceCell<Arc<[ValidatorIndex]>>>,
}

impl Cache {
    pub fn advance_epoch(&mut self) {
        let shuffled = &mut self.active_validator_indices_shuffled;

        shuffled[RelativeEpoch::Previous] = core::mem::take(&mut shuffled[RelativeEpoch::Current]);
        shuffled[RelativeEpoch::Current] = core::mem::take(&mut shuffled[RelativeEpoch::Next]);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
