use enum_map::Enum;

/// Epoch relative to the current epoch of a state.
///
/// Committees can only be computed for these three epochs.
/// Earlier epochs may use a different active set and later ones may use an unknown seed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Enum)]
pub enum RelativeEpoch {
    Previous,
    Current,
    Next,
}
