//! Metropolis Monte Carlo dynamics with pinning control.
//!
//! The engine drives opinion evolution: each step draws one node and
//! evaluates flipping its spin under the local-field energy change. Flips
//! that lower the energy are always accepted; flips that raise it are
//! accepted with Boltzmann probability `exp(-dE / T)`. Pinned nodes model
//! "bought" accounts that never change their opinion.

mod history;
mod pinset;

pub use history::MagnetizationHistory;
pub use pinset::PinSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PolarityError, Result};
use crate::graph::NeighborIndex;
use crate::spin::SpinState;

/// Default social temperature.
pub const DEFAULT_TEMPERATURE: f64 = 2.0;

/// Default neighbor coupling strength.
pub const DEFAULT_COUPLING: f64 = 1.0;

/// Parameters for one Metropolis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    /// Number of update draws to perform.
    pub steps: usize,
    /// Social temperature `T`. Must be strictly positive.
    pub temperature: f64,
    /// External field `h` biasing every node toward one opinion.
    pub field: f64,
    /// Neighbor coupling `J`.
    pub coupling: f64,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            steps: 0,
            temperature: DEFAULT_TEMPERATURE,
            field: 0.0,
            coupling: DEFAULT_COUPLING,
        }
    }
}

impl RunParams {
    /// Parameters with the default temperature, zero field and unit
    /// coupling.
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Set the social temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the external field.
    pub fn with_field(mut self, field: f64) -> Self {
        self.field = field;
        self
    }

    /// Set the neighbor coupling.
    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }
}

/// Counters and observations from one Metropolis run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Magnetization after every evaluated flip decision.
    pub history: MagnetizationHistory,
    /// Accepted flips.
    pub accepted: u64,
    /// Rejected proposals.
    pub rejected: u64,
    /// Draws that hit a pinned node and were consumed without an
    /// observation.
    pub skipped: u64,
}

/// Energy change for flipping `node`:
/// `dE = 2 * s[node] * (J * Σ s[neighbor] + h)`.
///
/// Antisymmetric under a flip of `node` with neighbors held fixed:
/// flipping and recomputing yields the negated value.
pub fn energy_delta(
    spins: &SpinState,
    index: &NeighborIndex,
    node: usize,
    field: f64,
    coupling: f64,
) -> f64 {
    let neighbor_sum: i64 = index
        .neighbors(node)
        .iter()
        .map(|&nb| i64::from(spins.get(nb as usize)))
        .sum();
    2.0 * f64::from(spins.get(node)) * (coupling * neighbor_sum as f64 + field)
}

/// Run Metropolis dynamics over the spin state.
///
/// Each of `params.steps` iterations draws one node uniformly. A draw that
/// hits a pinned node is consumed without an observation (no flip, no
/// history entry), so the returned history holds `steps` minus the pinned
/// draws. Every other draw evaluates the flip and appends the current
/// magnetization.
///
/// Fails with [`PolarityError::InvalidTemperature`] when
/// `params.temperature <= 0`, and with [`PolarityError::Config`] when the
/// spin state or pin mask was built for a different network size.
pub fn run_metropolis(
    spins: &mut SpinState,
    index: &NeighborIndex,
    params: &RunParams,
    pinned: &PinSet,
    rng: &mut impl Rng,
) -> Result<RunOutcome> {
    if params.temperature <= 0.0 {
        return Err(PolarityError::InvalidTemperature(params.temperature));
    }

    let n = index.n_nodes();
    if spins.len() != n || pinned.n_users() != n {
        return Err(PolarityError::Config(format!(
            "metropolis run requires spins ({}) and pin mask ({}) sized to \
             the network ({n})",
            spins.len(),
            pinned.n_users()
        )));
    }

    let mut history = MagnetizationHistory::with_capacity(params.steps);
    let mut accepted = 0u64;
    let mut rejected = 0u64;
    let mut skipped = 0u64;

    for _ in 0..params.steps {
        let node = rng.gen_range(0..n);

        // Pinned nodes never reconsider their opinion. The draw is
        // consumed without recording an observation.
        if pinned.contains(node) {
            skipped += 1;
            continue;
        }

        let delta_e = energy_delta(spins, index, node, params.field, params.coupling);
        if delta_e <= 0.0 || rng.gen::<f64>() < (-delta_e / params.temperature).exp() {
            spins.flip(node);
            accepted += 1;
        } else {
            rejected += 1;
        }

        history.push(spins.mean());
    }

    tracing::debug!(
        "metropolis run: {} steps, {} accepted, {} rejected, {} pinned skips, final m={:.4}",
        params.steps,
        accepted,
        rejected,
        skipped,
        spins.mean()
    );

    Ok(RunOutcome {
        history,
        accepted,
        rejected,
        skipped,
    })
}
