#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identifier for an entity (agent or tracked target).
///
/// Ordering is stable so worlds can update agents in a deterministic order; the raw value seeds
/// per-agent RNG streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn stable_id(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
