use derivative::Derivative;
use static_assertions::assert_impl_all;
use typenum::Unsigned as _;

use crate::{
    cache::Cache,
    collections::{ContiguousList, ContiguousVector},
    containers::{Checkpoint, Eth1Data, Fork, Validator},
    preset::{Mainnet, Preset},
    primitives::{DepositIndex, Shard, Slot, H256},
};

pub type Eth1DataVotes<P> = ContiguousList<Eth1Data, <P as Preset>::SlotsPerEth1VotingPeriod>;
pub type RandaoMixes<P> = ContiguousVector<H256, <P as Preset>::EpochsPerHistoricalVector>;
pub type Validators<P> = ContiguousList<Validator, <P as Preset>::ValidatorRegistryLimit>;

/// The part of the beacon state used by committee, registry, RANDAO and eth1 processing.
///
/// Fields are only reachable through methods so that changes to the active set
/// invalidate cached shufflings. Transitions are applied to a clone and published on success.
#[derive(Clone, Derivative)]
#[derivative(Default(bound = ""), Debug(bound = ""))]
pub struct BeaconState<P: Preset> {
    // > Versioning
    genesis_validators_root: H256,
    slot: Slot,
    fork: Fork,

    // > Eth1
    eth1_data: Eth1Data,
    eth1_data_votes: Eth1DataVotes<P>,
    eth1_deposit_index: DepositIndex,

    // > Registry
    validators: Validators<P>,

    // > Randomness
    #[derivative(Debug = "ignore")]
    randao_mixes: RandaoMixes<P>,

    // > Shuffling
    start_shard: Shard,

    // > Finality
    finalized_checkpoint: Checkpoint,

    // Cache
    #[derivative(Debug = "ignore")]
    cache: Cache,
}

assert_impl_all!(BeaconState<Mainnet>: Clone, Send, Sync);

impl<P: Preset> BeaconState<P> {
    #[must_use]
    pub const fn genesis_validators_root(&self) -> H256 {
        self.genesis_validators_root
    }

    pub fn genesis_validators_root_mut(&mut self) -> &mut H256 {
        &mut self.genesis_validators_root
    }

    #[must_use]
    pub const fn slot(&self) -> Slot {
        self.slot
    }

    /// Moves the state to `slot` without running any processing.
    ///
    /// Meant for constructing states. Cached shufflings are discarded.
    pub fn set_slot(&mut self, slot: Slot) {
        self.slot = slot;
        self.cache.clear();
    }

    /// Increments the slot, rotating cached shufflings if a new epoch starts.
    pub fn advance_slot(&mut self) {
        self.slot += 1;

        if self.slot % P::SlotsPerEpoch::U64 == 0 {
            self.cache.advance_epoch();
        }
    }

    #[must_use]
    pub const fn fork(&self) -> Fork {
        self.fork
    }

    pub fn fork_mut(&mut self) -> &mut Fork {
        &mut self.fork
    }

    #[must_use]
    pub const fn eth1_data(&self) -> Eth1Data {
        self.eth1_data
    }

    pub fn eth1_data_mut(&mut self) -> &mut Eth1Data {
        &mut self.eth1_data
    }

    #[must_use]
    pub const fn eth1_data_votes(&self) -> &Eth1DataVotes<P> {
        &self.eth1_data_votes
    }

    pub fn eth1_data_votes_mut(&mut self) -> &mut Eth1DataVotes<P> {
        &mut self.eth1_data_votes
    }

    #[must_use]
    pub const fn eth1_deposit_index(&self) -> DepositIndex {
        self.eth1_deposit_index
    }

    pub fn eth1_deposit_index_mut(&mut self) -> &mut DepositIndex {
        &mut self.eth1_deposit_index
    }

    #[must_use]
    pub const fn validators(&self) -> &Validators<P> {
        &self.validators
    }

    /// Cached shufflings are discarded because the active set may change.
    pub fn validators_mut(&mut self) -> &mut Validators<P> {
        self.cache.clear();
        &mut self.validators
    }

    #[must_use]
    pub const fn randao_mixes(&self) -> &RandaoMixes<P> {
        &self.randao_mixes
    }

    /// Cached shufflings are kept.
    ///
    /// Seeds for the previous, current and next epochs only use mixes of epochs
    /// before the current one, which block processing never modifies.
    pub fn randao_mixes_mut(&mut self) -> &mut RandaoMixes<P> {
        &mut self.randao_mixes
    }

    #[must_use]
    pub const fn start_shard(&self) -> Shard {
        self.start_shard
    }

    pub fn start_shard_mut(&mut self) -> &mut Shard {
        &mut self.start_shard
    }

    #[must_use]
    pub const fn finalized_checkpoint(&self) -> Checkpoint {
        self.finalized_checkpoint
    }

    pub fn finalized_checkpoint_mut(&mut self) -> &mut Checkpoint {
        &mut self.finalized_checkpoint
    }

    #[must_use]
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }
}
