#![allow(clippy::module_name_repetitions)]

use core::{fmt::Debug, hash::Hash, num::NonZeroU64};

use nonzero_ext::nonzero;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use static_assertions::const_assert;
use strum::{Display, EnumString};
use typenum::{NonZero, Prod, Unsigned, U1099511627776, U2048, U32, U4, U64, U65536, U8};

use crate::{config::Config, primitives::Gwei};

/// Compile-time configuration variables.
///
/// Type-level variables size the collections in `BeaconState`.
/// The remaining ones are plain constants.
pub trait Preset: Copy + Eq + Ord + Hash + Default + Debug + Send + Sync + 'static {
    type EpochsPerEth1VotingPeriod: Unsigned + NonZero + Debug + Send + Sync;
    type EpochsPerHistoricalVector: Unsigned + NonZero + Debug + Send + Sync;
    type ShardCount: Unsigned + NonZero + Debug + Send + Sync;
    type SlotsPerEpoch: Unsigned + NonZero + Debug + Send + Sync;
    type ValidatorRegistryLimit: Unsigned + NonZero + Debug + Send + Sync;

    // Derived type-level variables
    type SlotsPerEth1VotingPeriod: Unsigned + NonZero + Debug + Send + Sync;

    // Meta
    const NAME: PresetName;

    const EFFECTIVE_BALANCE_INCREMENT: NonZeroU64 = nonzero!(1_000_000_000_u64);
    const MAX_COMMITTEES_PER_SLOT: NonZeroU64 = nonzero!(64_u64);
    const MAX_EFFECTIVE_BALANCE: Gwei = 32_000_000_000;
    const MAX_SEED_LOOKAHEAD: u64 = 4;
    const MIN_SEED_LOOKAHEAD: u64 = 1;
    const SHUFFLE_ROUND_COUNT: u8 = 90;
    const TARGET_COMMITTEE_SIZE: NonZeroU64 = nonzero!(128_u64);
}

/// Mainnet preset.
///
/// Shard and committee limits are sized so that every committee of an epoch gets its own shard
/// with up to 64 committees per slot.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Mainnet;

impl Preset for Mainnet {
    type EpochsPerEth1VotingPeriod = U64;
    type EpochsPerHistoricalVector = U65536;
    type ShardCount = U2048;
    type SlotsPerEpoch = U32;
    type ValidatorRegistryLimit = U1099511627776;

    type SlotsPerEth1VotingPeriod = Prod<Self::EpochsPerEth1VotingPeriod, Self::SlotsPerEpoch>;

    const NAME: PresetName = PresetName::Mainnet;
}

macro_rules! delegate_preset_items {
    (
        super $base_preset: ident;
        $(type $associated_type: ident;)*
    ) => {
        $(type $associated_type = <$base_preset as Preset>::$associated_type;)*
    };
}

/// Minimal preset for tests. Epochs, windows and committees are small enough to span several epochs
/// with a few dozen validators.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Minimal;

impl Preset for Minimal {
    delegate_preset_items! {
        super Mainnet;

        type ValidatorRegistryLimit;
    }

    type EpochsPerEth1VotingPeriod = U4;
    type EpochsPerHistoricalVector = U64;
    type ShardCount = U32;
    type SlotsPerEpoch = U8;

    type SlotsPerEth1VotingPeriod = Prod<Self::EpochsPerEth1VotingPeriod, Self::SlotsPerEpoch>;

    const NAME: PresetName = PresetName::Minimal;

    const MAX_COMMITTEES_PER_SLOT: NonZeroU64 = nonzero!(4_u64);
    const SHUFFLE_ROUND_COUNT: u8 = 10;
    const TARGET_COMMITTEE_SIZE: NonZeroU64 = nonzero!(4_u64);
}

// Every committee of an epoch must be assigned to a distinct shard.
const_assert!(
    Mainnet::MAX_COMMITTEES_PER_SLOT.get() * <<Mainnet as Preset>::SlotsPerEpoch as Unsigned>::U64
        <= <<Mainnet as Preset>::ShardCount as Unsigned>::U64
);
const_assert!(
    Minimal::MAX_COMMITTEES_PER_SLOT.get() * <<Minimal as Preset>::SlotsPerEpoch as Unsigned>::U64
        <= <<Minimal as Preset>::ShardCount as Unsigned>::U64
);

#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Display, EnumString, DeserializeFromStr, SerializeDisplay,
)]
#[strum(serialize_all = "lowercase")]
pub enum PresetName {
    Mainnet,
    Minimal,
}

impl PresetName {
    #[must_use]
    pub fn default_config(self) -> Config {
        match self {
            Self::Mainnet => Config::mainnet(),
            Self::Minimal => Config::minimal(),
        }
    }
}
