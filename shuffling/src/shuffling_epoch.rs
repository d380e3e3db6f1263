use core::{marker::PhantomData, num::NonZeroU64, ops::Range};
use std::sync::Arc;

use anyhow::{ensure, Result};
use derivative::Derivative;
use tap::TryConv as _;
use typenum::Unsigned as _;
use types::{
    preset::Preset,
    primitives::{Shard, ValidatorIndex},
};

use crate::error::Error;

/// Shuffled active validators of one epoch partitioned into per-shard committees.
///
/// Every shard has an entry. Shards outside the rotated window starting at `start_shard`
/// have empty committees. The nonempty committees tile the shuffled indices exactly.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct ShufflingEpoch<P: Preset> {
    shuffled_indices: Arc<[ValidatorIndex]>,
    committee_count: NonZeroU64,
    start_shard: Shard,
    #[derivative(Debug = "ignore")]
    committees_by_shard: Box<[Range<usize>]>,
    #[derivative(Debug = "ignore")]
    phantom: PhantomData<P>,
}

impl<P: Preset> ShufflingEpoch<P> {
    pub fn new(
        shuffled_indices: Arc<[ValidatorIndex]>,
        committee_count: NonZeroU64,
        start_shard: Shard,
    ) -> Result<Self> {
        let shard_count = P::ShardCount::U64;

        ensure!(
            committee_count.get() <= shard_count,
            Error::TooManyCommittees {
                committee_count: committee_count.get(),
                shard_count,
            },
        );

        ensure!(
            start_shard < shard_count,
            Error::ShardOutOfBounds {
                shard: start_shard,
                shard_count,
            },
        );

        let index_count = shuffled_indices.len().try_conv::<u64>()?;

        let committees_by_shard = (0..shard_count)
            .map(|shard| {
                let committee_index = (shard + shard_count - start_shard) % shard_count;

                let range = if committee_index < committee_count.get() {
                    compute_committee_range(index_count, committee_index, committee_count)
                } else {
                    index_count..index_count
                };

                to_usize_range(range)
            })
            .collect();

        Ok(Self {
            shuffled_indices,
            committee_count,
            start_shard,
            committees_by_shard,
            phantom: PhantomData,
        })
    }

    #[must_use]
    pub const fn shuffled_indices(&self) -> &Arc<[ValidatorIndex]> {
        &self.shuffled_indices
    }

    #[must_use]
    pub const fn committee_count(&self) -> NonZeroU64 {
        self.committee_count
    }

    #[must_use]
    pub const fn start_shard(&self) -> Shard {
        self.start_shard
    }

    pub fn committee(&self, shard: Shard) -> Result<&[ValidatorIndex]> {
        let range = usize::try_from(shard)
            .ok()
            .and_then(|shard| self.committees_by_shard.get(shard))
            .ok_or(Error::ShardOutOfBounds {
                shard,
                shard_count: P::ShardCount::U64,
            })?;

        Ok(&self.shuffled_indices[range.clone()])
    }

    /// Iterates over the committees of the epoch in the order they are assigned to slots.
    pub fn committees(&self) -> impl Iterator<Item = (Shard, &[ValidatorIndex])> {
        let shard_count = P::ShardCount::U64;

        (0..self.committee_count.get()).map(move |committee_index| {
            let shard = (self.start_shard + committee_index) % shard_count;

            let committee = self
                .committee(shard)
                .expect("shard is reduced modulo the shard count");

            (shard, committee)
        })
    }
}

/// Computes the bounds of committee `index` out of `committee_count` in a list of `index_count`
/// validators.
///
/// Committee sizes differ by at most one and consecutive committees are adjacent.
#[must_use]
pub fn compute_committee_range(
    index_count: u64,
    index: u64,
    committee_count: NonZeroU64,
) -> Range<u64> {
    let bound = |index: u64| {
        (u128::from(index_count) * u128::from(index) / u128::from(committee_count.get()))
            .try_conv::<u64>()
            .expect("quotient is at most index_count when index is at most committee_count")
    };

    bound(index)..bound(index + 1)
}

fn to_usize_range(range: Range<u64>) -> Range<usize> {
    let convert = |bound: u64| {
        bound
            .try_conv::<usize>()
            .expect("bounds are at most the length of a slice, which fits in usize")
    };

    convert(range.start)..convert(range.end)
}
