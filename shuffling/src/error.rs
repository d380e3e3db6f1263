use thiserror::Error;
use types::primitives::Shard;

#[derive(Debug, Error)]
pub enum Error {
    #[error("shard {shard} is out of bounds (shard count: {shard_count})")]
    ShardOutOfBounds { shard: Shard, shard_count: u64 },
    #[error("committee count {committee_count} exceeds shard count {shard_count}")]
    TooManyCommittees {
        committee_count: u64,
        shard_count: u64,
    },
}
