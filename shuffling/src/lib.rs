use core::{
    fmt::Debug,
    num::NonZeroU64,
    ops::{Index as _, Rem as _},
};

use anyhow::Result;
use bit_field::BitArray as _;
use tap::TryConv as _;
use types::{preset::Preset, primitives::H256};

pub use crate::{
    error::Error,
    shuffling_epoch::{compute_committee_range, ShufflingEpoch},
};

mod error;
mod shuffling_epoch;

const BITS_PER_HASH: u64 = H256::len_bytes() as u64 * 8;

/// Permutes `slice` so that position `i` holds the element previously at `shuffle_single(i)`.
///
/// Each round of the swap-or-not network pairs up positions that add up to the pivot
/// (modulo the length) and swaps a pair if the bit for the higher position is set.
/// Rounds are applied in reverse so that the result matches [`shuffle_single`].
pub fn shuffle_slice<P: Preset, T>(slice: &mut [T], seed: H256) -> Result<()> {
    let Some(length) = slice.len().try_into().map(NonZeroU64::new)? else {
        return Ok(());
    };

    for round in (0..P::SHUFFLE_ROUND_COUNT).rev() {
        let pivot = compute_pivot(seed, round, length);
        let mut bits = SourceBits::new(seed, round);

        for low in 0..(pivot + 1) / 2 {
            let high = pivot - low;

            if bits.get(high) {
                swap(slice, low, high);
            }
        }

        for low in pivot + 1..(pivot + length.get() + 1) / 2 {
            let high = pivot + length.get() - low;

            if bits.get(high) {
                swap(slice, low, high);
            }
        }
    }

    Ok(())
}

/// Computes the position an element at `index` ends up in after shuffling `index_count` elements.
///
/// # Panics
///
/// Panics if `index` is not less than `index_count`.
#[must_use]
pub fn shuffle_single<P: Preset>(mut index: u64, index_count: NonZeroU64, seed: H256) -> u64 {
    assert!(index < index_count.get());

    for round in 0..P::SHUFFLE_ROUND_COUNT {
        let pivot = compute_pivot(seed, round, index_count);
        let flip = (pivot + index_count.get() - index) % index_count;
        let position = index.max(flip);
        let source = compute_source(seed, round, position / BITS_PER_HASH);
        let bit_index = position.to_le_bytes()[0].into();

        if source.as_bytes().get_bit(bit_index) {
            index = flip;
        }
    }

    index
}

// Consecutive positions share a source hash. Positions are visited in runs that stay within one
// window for up to 256 steps, so remembering the last hash avoids nearly all recomputation.
struct SourceBits {
    seed: H256,
    round: u8,
    cached: Option<(u64, H256)>,
}

impl SourceBits {
    const fn new(seed: H256, round: u8) -> Self {
        Self {
            seed,
            round,
            cached: None,
        }
    }

    fn get(&mut self, position: u64) -> bool {
        let window = position / BITS_PER_HASH;

        let source = match self.cached {
            Some((cached_window, source)) if cached_window == window => source,
            _ => {
                let source = compute_source(self.seed, self.round, window);
                self.cached = Some((window, source));
                source
            }
        };

        let bit_index = (position % BITS_PER_HASH)
            .try_conv::<usize>()
            .expect("remainder of division by 256 fits in usize");

        source.as_bytes().get_bit(bit_index)
    }
}

fn swap<T>(slice: &mut [T], low: u64, high: u64) {
    let low = low
        .try_conv::<usize>()
        .expect("positions are less than the length of the slice, which fits in usize");

    let high = high
        .try_conv::<usize>()
        .expect("positions are less than the length of the slice, which fits in usize");

    slice.swap(low, high);
}

fn compute_pivot(seed: H256, round: u8, index_count: NonZeroU64) -> u64 {
    hashing::hash_256_8(seed, round)
        .index(..size_of::<u64>())
        .try_into()
        .map(u64::from_le_bytes)
        .expect("slice has the same size as u64")
        .rem(index_count)
}

fn compute_source(seed: H256, round: u8, position_window: impl TryInto<u32, Error: Debug>) -> H256 {
    let position_window = position_window
        .try_into()
        .expect("registry limit is small enough for position windows to fit in u32");

    hashing::hash_256_8_32(seed, round, position_window)
}
