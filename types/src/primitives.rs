pub use ethereum_types::{H256, H32};

pub type DepositIndex = u64;
pub type Epoch = u64;
pub type Gwei = u64;
pub type Shard = u64;
pub type Slot = u64;
pub type ValidatorIndex = u64;

pub type Domain = H256;
pub type DomainType = H32;
pub type Eth1BlockHash = H256;
pub type Version = H32;

/// Bitfield of attestation duties a validator fulfilled during an epoch.
///
/// Produced by attestation processing, which lives outside this workspace.
/// Balance queries only test it against masks built from the `*_FLAG` constants.
pub type ParticipationFlags = u8;
