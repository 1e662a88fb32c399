//! Louvain-style modularity optimization.

use std::collections::{BTreeMap, HashMap};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::graph::NeighborIndex;

/// Sweep cap for one local-moving phase.
pub(super) const MAX_SWEEPS: usize = 50;

/// Gains at or below this are ties; ties never move a node.
const GAIN_EPSILON: f64 = 1e-12;

pub(super) enum LocalMoving {
    /// Per-node community labels after optimization settled.
    Stable(Vec<usize>),
    /// A local-moving phase was still relocating nodes at its sweep cap.
    Unstable { sweeps: usize },
}

/// Weighted adjacency for the aggregation levels. A self entry carries
/// twice the internal weight of the community it stands for, keeping every
/// node's weighted degree equal to the plain sum of its row.
type Adjacency = Vec<BTreeMap<usize, f64>>;

/// Two-phase Louvain: local moving until no node improves modularity, then
/// aggregation of communities into supernodes, repeated until a level
/// merges nothing.
///
/// Node visit order is reshuffled from `rng` before every sweep; candidate
/// communities are scanned in ascending id order and exact ties never move
/// a node, so the partition is reproducible for a given `rng` stream.
pub(super) fn louvain_partition(index: &NeighborIndex, rng: &mut impl Rng) -> LocalMoving {
    let n = index.n_nodes();
    let mut adj: Adjacency = (0..n)
        .map(|node| {
            index
                .neighbors(node)
                .iter()
                .map(|&nb| (nb as usize, 1.0))
                .collect()
        })
        .collect();
    // Original node id -> community in the current aggregation level.
    let mut membership: Vec<usize> = (0..n).collect();

    loop {
        let labels = match local_moving(&adj, rng) {
            LocalMoving::Stable(labels) => labels,
            unstable => return unstable,
        };

        let (labels, n_communities) = renumber(&labels);
        if n_communities == adj.len() {
            // The level merged nothing; the previous membership stands.
            return LocalMoving::Stable(membership);
        }
        for slot in membership.iter_mut() {
            *slot = labels[*slot];
        }
        adj = aggregate(&adj, &labels, n_communities);
    }
}

/// One local-moving phase: every node greedily joins the neighboring
/// community with the highest modularity gain until a full sweep moves
/// nothing.
fn local_moving(adj: &Adjacency, rng: &mut impl Rng) -> LocalMoving {
    let n = adj.len();
    let k: Vec<f64> = adj.iter().map(|row| row.values().sum()).collect();
    let m = k.iter().sum::<f64>() / 2.0;
    if m == 0.0 {
        // No edges: nothing to optimize, every node is its own community.
        return LocalMoving::Stable((0..n).collect());
    }

    let mut community: Vec<usize> = (0..n).collect();
    // Sum of member degrees per community label.
    let mut sigma = k.clone();
    let mut order: Vec<usize> = (0..n).collect();

    for _ in 0..MAX_SWEEPS {
        order.shuffle(rng);
        let mut moved = 0usize;

        for &node in &order {
            let current = community[node];

            let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
            for (&nb, &w) in &adj[node] {
                if nb != node {
                    *weights.entry(community[nb]).or_insert(0.0) += w;
                }
            }

            // Detach the node before comparing, so its own community is
            // judged by the same formula as the others.
            sigma[current] -= k[node];

            let w_current = weights.get(&current).copied().unwrap_or(0.0);
            let mut best_comm = current;
            let mut best_gain = gain(w_current, k[node], sigma[current], m);

            for (&c, &w) in &weights {
                if c == current {
                    continue;
                }
                let candidate = gain(w, k[node], sigma[c], m);
                if candidate > best_gain + GAIN_EPSILON {
                    best_gain = candidate;
                    best_comm = c;
                }
            }

            sigma[best_comm] += k[node];
            if best_comm != current {
                community[node] = best_comm;
                moved += 1;
            }
        }

        if moved == 0 {
            return LocalMoving::Stable(community);
        }
    }

    LocalMoving::Unstable { sweeps: MAX_SWEEPS }
}

/// Modularity gain for attaching a detached node to a community:
/// `w_ic / m - k_i * sigma_c / (2 m^2)`.
fn gain(w_ic: f64, k_i: f64, sigma_c: f64, m: f64) -> f64 {
    w_ic / m - k_i * sigma_c / (2.0 * m * m)
}

/// Relabels communities to `0..count` in order of first appearance.
fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut slot: HashMap<usize, usize> = HashMap::new();
    let mut count = 0usize;
    let mut out = Vec::with_capacity(labels.len());
    for &label in labels {
        let id = *slot.entry(label).or_insert_with(|| {
            count += 1;
            count - 1
        });
        out.push(id);
    }
    (out, count)
}

/// Collapses each community into one supernode, summing edge weights.
/// Intra-community weight lands on the supernode's self entry, twice.
fn aggregate(adj: &Adjacency, labels: &[usize], n_communities: usize) -> Adjacency {
    let mut next: Adjacency = vec![BTreeMap::new(); n_communities];
    for (node, row) in adj.iter().enumerate() {
        for (&nb, &w) in row {
            *next[labels[node]].entry(labels[nb]).or_insert(0.0) += w;
        }
    }
    next
}
