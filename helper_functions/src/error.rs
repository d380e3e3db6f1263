use parse_display::Display;
use thiserror::Error;
use types::primitives::{Epoch, Shard};

#[derive(Debug, Error)]
pub enum Error {
    #[error("epoch is after next one relative to state")]
    EpochAfterNext,
    #[error("epoch is before previous one relative to state")]
    EpochBeforePrevious,
    #[error("epoch number overflowed")]
    EpochOverflow,
    #[error("shard {shard} has no committee in epoch {epoch}")]
    NoCommitteeForShard { epoch: Epoch, shard: Shard },
    #[error("{0} is invalid")]
    SignatureInvalid(SignatureKind),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum SignatureKind {
    #[display("RANDAO reveal")]
    Randao,
}
