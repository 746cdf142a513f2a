use crate::{rng, EntityId, SplitMix64};

/// Per-frame timing handed to every agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    /// Speed multiplier for continuous quantities such as movement.
    pub timescale: f64,
    /// Simulation ticks elapsed since the previous frame.
    pub ticks: f64,
    pub seed: u64,
}

impl Default for TickContext {
    fn default() -> Self {
        Self {
            tick: 0,
            timescale: 1.0,
            ticks: 1.0,
            seed: 0,
        }
    }
}

impl TickContext {
    pub fn new(tick: u64, timescale: f64, ticks: f64, seed: u64) -> Self {
        Self {
            tick,
            timescale,
            ticks,
            seed,
        }
    }

    /// Independent RNG stream for `agent`; the same `(seed, agent, stream)` always yields the same
    /// sequence.
    pub fn rng_for_agent(&self, agent: EntityId, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed, agent.stable_id(), stream);
        SplitMix64::new(seed)
    }
}
