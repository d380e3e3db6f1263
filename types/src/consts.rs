use hex_literal::hex;

use crate::primitives::{DomainType, Epoch, ParticipationFlags, Slot, H32};

pub const DOMAIN_BEACON_ATTESTER: DomainType = H32(hex!("01000000"));
pub const DOMAIN_RANDAO: DomainType = H32(hex!("02000000"));
pub const FAR_FUTURE_EPOCH: Epoch = Epoch::MAX;
pub const GENESIS_EPOCH: Epoch = 0;
pub const GENESIS_SLOT: Slot = 0;

pub const TIMELY_SOURCE_FLAG: ParticipationFlags = 1 << 0;
pub const TIMELY_TARGET_FLAG: ParticipationFlags = 1 << 1;
pub const TIMELY_HEAD_FLAG: ParticipationFlags = 1 << 2;
