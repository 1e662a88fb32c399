//! Per-node opinion state.
//!
//! Every node holds a two-valued spin (`+1` or `-1`) standing for its
//! current opinion. The store keeps a running integer sum of all spins so
//! the magnetization (`mean`) is O(1) and exact.

use rand::Rng;

use crate::error::{PolarityError, Result};

/// Initial opinion distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinDistribution {
    /// Fair coin per node.
    Uniform,
    /// `+1` with probability `p_up`, `-1` otherwise.
    Biased {
        /// Probability of assigning `+1`. Must lie in `[0, 1]`.
        p_up: f64,
    },
}

/// A saved copy of a [`SpinState`] for later restore.
#[derive(Debug, Clone)]
pub struct SpinSnapshot {
    spins: Vec<i8>,
}

impl SpinSnapshot {
    /// Number of spins captured.
    pub fn len(&self) -> usize {
        self.spins.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }
}

/// Spin values for every node in the network.
///
/// Owned exclusively by the session; only the Metropolis engine performs
/// single-node flips during a run.
#[derive(Debug, Clone)]
pub struct SpinState {
    spins: Vec<i8>,
    sum: i64,
}

impl SpinState {
    /// Assign every node an independent random spin drawn from `rng`.
    ///
    /// Fails when a biased distribution carries a probability outside
    /// `[0, 1]`.
    pub fn random(n: usize, distribution: SpinDistribution, rng: &mut impl Rng) -> Result<Self> {
        let p_up = match distribution {
            SpinDistribution::Uniform => 0.5,
            SpinDistribution::Biased { p_up } => {
                if !(0.0..=1.0).contains(&p_up) {
                    return Err(PolarityError::Config(format!(
                        "biased spin distribution requires p_up in [0, 1], got {p_up}"
                    )));
                }
                p_up
            },
        };

        let spins: Vec<i8> = (0..n)
            .map(|_| if rng.gen::<f64>() < p_up { 1 } else { -1 })
            .collect();
        let sum = total(&spins);
        Ok(Self { spins, sum })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.spins.len()
    }

    /// Whether the state holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    /// Spin of `node`. Panics if `node` is out of range.
    pub fn get(&self, node: usize) -> i8 {
        self.spins[node]
    }

    /// All spins in node-id order.
    pub fn as_slice(&self) -> &[i8] {
        &self.spins
    }

    /// Negate the spin of `node`, keeping the running sum in step.
    pub(crate) fn flip(&mut self, node: usize) {
        let s = self.spins[node];
        self.spins[node] = -s;
        self.sum -= 2 * i64::from(s);
    }

    /// Overwrite the listed nodes with `value` unconditionally.
    ///
    /// Validates every node id and the value before touching any state, so
    /// a failed call leaves the spins unchanged.
    pub fn force_set(&mut self, nodes: &[usize], value: i8) -> Result<()> {
        if value != 1 && value != -1 {
            return Err(PolarityError::Config(format!(
                "spins are restricted to -1 or +1, got {value}"
            )));
        }
        if let Some(&node) = nodes.iter().find(|&&node| node >= self.spins.len()) {
            return Err(PolarityError::NodeOutOfRange {
                node,
                n_users: self.spins.len(),
            });
        }

        for &node in nodes {
            if self.spins[node] != value {
                self.spins[node] = value;
                self.sum += 2 * i64::from(value);
            }
        }
        Ok(())
    }

    /// Deep copy of the current state for save/replay.
    pub fn snapshot(&self) -> SpinSnapshot {
        SpinSnapshot {
            spins: self.spins.clone(),
        }
    }

    /// Restore a previously saved state.
    pub fn restore(&mut self, snapshot: &SpinSnapshot) -> Result<()> {
        if snapshot.spins.len() != self.spins.len() {
            return Err(PolarityError::SnapshotMismatch {
                snapshot: snapshot.spins.len(),
                state: self.spins.len(),
            });
        }
        self.spins.copy_from_slice(&snapshot.spins);
        self.sum = total(&self.spins);
        Ok(())
    }

    /// Magnetization: arithmetic mean of all spins. `0.0` for an empty
    /// state.
    pub fn mean(&self) -> f64 {
        if self.spins.is_empty() {
            return 0.0;
        }
        self.sum as f64 / self.spins.len() as f64
    }
}

fn total(spins: &[i8]) -> i64 {
    spins.iter().map(|&s| i64::from(s)).sum()
}
