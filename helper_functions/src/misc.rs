use core::num::NonZeroU64;

use anyhow::{ensure, Result};
use arithmetic::{NonZeroExt as _, U64Ext as _};
use typenum::Unsigned as _;
use types::{
    config::Config,
    preset::Preset,
    primitives::{Domain, DomainType, Epoch, Slot, Version, H256},
};

#[must_use]
pub fn compute_epoch_at_slot<P: Preset>(slot: Slot) -> Epoch {
    slot.div_typenum::<P::SlotsPerEpoch>()
}

#[must_use]
pub fn compute_start_slot_at_epoch<P: Preset>(epoch: Epoch) -> Slot {
    epoch * P::SlotsPerEpoch::U64
}

#[must_use]
pub fn is_epoch_start<P: Preset>(slot: Slot) -> bool {
    slot.mod_typenum::<P::SlotsPerEpoch>() == 0
}

/// Returns the epoch at which validator activations and exits initiated in `epoch` take effect.
#[must_use]
pub const fn compute_activation_exit_epoch<P: Preset>(epoch: Epoch) -> Epoch {
    epoch + 1 + P::MAX_SEED_LOOKAHEAD
}

#[must_use]
pub fn committee_count_per_slot_from_active_validator_count<P: Preset>(
    active_validator_count: u64,
) -> NonZeroU64 {
    let committees_per_slot = active_validator_count
        .div_typenum::<P::SlotsPerEpoch>()
        .checked_div(P::TARGET_COMMITTEE_SIZE.get())
        .unwrap_or_default()
        .min(P::MAX_COMMITTEES_PER_SLOT.get());

    NonZeroU64::new(committees_per_slot).unwrap_or(NonZeroU64::MIN)
}

/// Returns the number of committees in an epoch with `active_validator_count` active validators.
#[must_use]
pub fn committee_count_from_active_validator_count<P: Preset>(
    active_validator_count: u64,
) -> NonZeroU64 {
    committee_count_per_slot_from_active_validator_count::<P>(active_validator_count)
        .saturating_mul(P::SlotsPerEpoch::non_zero())
}

/// Returns how far the start shard moves after an epoch with `active_validator_count` active
/// validators.
///
/// At least one slot's worth of shards is always skipped so that crosslinks for the same shard
/// are not attempted in consecutive epochs when every shard has a committee.
#[must_use]
pub fn shard_delta_from_active_validator_count<P: Preset>(active_validator_count: u64) -> u64 {
    let shard_count = P::ShardCount::U64;
    let committee_count = committee_count_from_active_validator_count::<P>(active_validator_count);

    committee_count
        .get()
        .min(shard_count - shard_count / P::SlotsPerEpoch::U64)
}

#[must_use]
pub fn churn_limit_from_active_validator_count(
    config: &Config,
    active_validator_count: u64,
) -> u64 {
    (active_validator_count / config.churn_limit_quotient).max(config.min_per_epoch_churn_limit)
}

/// Returns the position in the active validator list that fills slot `index` of the shuffling.
pub fn compute_shuffled_index<P: Preset>(
    index: u64,
    index_count: NonZeroU64,
    seed: H256,
) -> Result<u64> {
    ensure!(
        index < index_count.get(),
        "index {index} is out of bounds for a list of length {index_count}",
    );

    Ok(shuffling::shuffle_single::<P>(index, index_count, seed))
}

// The root of a container with a 4-byte version and a 32-byte root is the hash of the version
// padded to 32 bytes concatenated with the root.
fn compute_fork_data_root(current_version: Version, genesis_validators_root: H256) -> H256 {
    let mut version_chunk = H256::zero();
    version_chunk[..Version::len_bytes()].copy_from_slice(current_version.as_bytes());
    hashing::hash_256_256(version_chunk, genesis_validators_root)
}

#[must_use]
pub fn compute_domain(
    config: &Config,
    domain_type: DomainType,
    fork_version: Option<Version>,
    genesis_validators_root: Option<H256>,
) -> Domain {
    let fork_version = fork_version.unwrap_or(config.genesis_fork_version);
    let genesis_validators_root = genesis_validators_root.unwrap_or_else(H256::zero);
    let fork_data_root = compute_fork_data_root(fork_version, genesis_validators_root);

    let mut domain = Domain::zero();
    domain[..DomainType::len_bytes()].copy_from_slice(domain_type.as_bytes());
    domain[DomainType::len_bytes()..].copy_from_slice(&fork_data_root[..28]);
    domain
}

#[must_use]
pub fn compute_signing_root(object_root: H256, domain: Domain) -> H256 {
    hashing::hash_256_256(object_root, domain)
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use test_case::test_case;
    use types::{
        consts::DOMAIN_RANDAO,
        preset::{Mainnet, Minimal},
        primitives::H32,
    };

    use super::*;

    #[test_case(0, 1)]
    #[test_case(4095, 1)]
    #[test_case(8192, 2)]
    #[test_case(16_383, 3)]
    #[test_case(262_144, 64)]
    #[test_case(10_000_000, 64)]
    fn committees_per_slot_on_mainnet(active_validator_count: u64, expected: u64) {
        assert_eq!(
            committee_count_per_slot_from_active_validator_count::<Mainnet>(active_validator_count)
                .get(),
            expected,
        );
    }

    #[test]
    fn committees_per_epoch_for_8192_validators_on_mainnet() {
        assert_eq!(
            committee_count_from_active_validator_count::<Mainnet>(8192).get(),
            64,
        );
    }

    #[test_case(0, 8)]
    #[test_case(1_000_000, 28)]
    fn shard_delta_on_minimal(active_validator_count: u64, expected: u64) {
        assert_eq!(
            shard_delta_from_active_validator_count::<Minimal>(active_validator_count),
            expected,
        );
    }

    #[test_case(0, 4)]
    #[test_case(262_143, 4)]
    #[test_case(327_680, 5)]
    #[test_case(1_000_000, 15)]
    fn churn_limit_on_mainnet(active_validator_count: u64, expected: u64) {
        assert_eq!(
            churn_limit_from_active_validator_count(&Config::mainnet(), active_validator_count),
            expected,
        );
    }

    #[test]
    fn activation_exit_epoch_is_delayed_by_seed_lookahead() {
        assert_eq!(compute_activation_exit_epoch::<Mainnet>(10), 15);
    }

    #[test]
    fn compute_shuffled_index_rejects_index_out_of_bounds() {
        let count = NonZeroU64::new(10).expect("literal is nonzero");

        assert!(compute_shuffled_index::<Minimal>(10, count, H256::zero()).is_err());
        assert!(compute_shuffled_index::<Minimal>(9, count, H256::zero()).is_ok());
    }

    #[test]
    fn domain_starts_with_domain_type() {
        let domain = compute_domain(
            &Config::mainnet(),
            DOMAIN_RANDAO,
            Some(H32(hex!("00000001"))),
            Some(H256::repeat_byte(1)),
        );

        assert_eq!(domain[..4], hex!("02000000"));
    }

    #[test]
    fn domain_depends_on_fork_version_and_genesis_validators_root() {
        let config = Config::mainnet();
        let version = Some(H32(hex!("00000001")));
        let root = Some(H256::repeat_byte(1));

        let domain = compute_domain(&config, DOMAIN_RANDAO, version, root);

        assert_ne!(domain, compute_domain(&config, DOMAIN_RANDAO, None, root));
        assert_ne!(domain, compute_domain(&config, DOMAIN_RANDAO, version, None));
    }

    // The hash of 64 zero bytes.
    #[test]
    fn fork_data_root_of_zero_version_and_root_is_hash_of_zero_chunks() {
        assert_eq!(
            compute_fork_data_root(H32::zero(), H256::zero()),
            H256(hex!(
                "f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb4b"
            )),
        );
    }
}
