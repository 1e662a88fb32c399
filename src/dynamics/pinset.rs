//! Pinned-node bookkeeping for a single run.

use crate::error::{PolarityError, Result};

/// Nodes excluded from flips for the duration of one Metropolis run.
///
/// Backed by a boolean mask so the membership check on the hot path is a
/// single indexed load. Construction validates every id against the
/// network size and fails before the run touches any state.
#[derive(Debug, Clone)]
pub struct PinSet {
    mask: Vec<bool>,
    count: usize,
}

impl PinSet {
    /// An empty pin set for a network of `n_users` nodes.
    pub fn empty(n_users: usize) -> Self {
        Self {
            mask: vec![false; n_users],
            count: 0,
        }
    }

    /// Pin the listed nodes in a network of `n_users` nodes. Duplicate ids
    /// are pinned once.
    pub fn new(n_users: usize, nodes: &[usize]) -> Result<Self> {
        let mut pins = Self::empty(n_users);
        for &node in nodes {
            if node >= n_users {
                return Err(PolarityError::NodeOutOfRange { node, n_users });
            }
            if !pins.mask[node] {
                pins.mask[node] = true;
                pins.count += 1;
            }
        }
        Ok(pins)
    }

    /// Whether `node` is pinned.
    pub fn contains(&self, node: usize) -> bool {
        self.mask[node]
    }

    /// Number of pinned nodes.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no node is pinned.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of nodes the mask covers.
    pub fn n_users(&self) -> usize {
        self.mask.len()
    }

    /// Whether every node is pinned.
    pub fn covers_all(&self) -> bool {
        self.count == self.mask.len()
    }
}
