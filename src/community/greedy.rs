//! Greedy modularity agglomeration, used when local moving does not settle.

use std::collections::BTreeMap;

use crate::graph::NeighborIndex;

/// Gains below this are treated as ties; the lowest community pair wins.
const GAIN_EPSILON: f64 = 1e-12;

/// Agglomerative modularity clustering.
///
/// Starts from singleton communities and repeatedly merges the pair of
/// connected communities with the highest modularity gain, stopping when
/// no merge improves modularity. Pairs are scanned in ascending order, so
/// the result is fully deterministic. Quality over speed: this is the
/// fallback path, not the hot one.
pub(super) fn greedy_partition(index: &NeighborIndex) -> Vec<usize> {
    let n = index.n_nodes();
    let mut community: Vec<usize> = (0..n).collect();
    let degrees: Vec<f64> = (0..n).map(|v| index.degree(v) as f64).collect();
    let m = degrees.iter().sum::<f64>() / 2.0;
    if m == 0.0 {
        return community;
    }

    // Inter-community edge weights keyed by (low, high) community label.
    let mut between: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for node in 0..n {
        for &nb in index.neighbors(node) {
            let nb = nb as usize;
            if nb > node {
                *between.entry((node, nb)).or_insert(0.0) += 1.0;
            }
        }
    }
    let mut sigma = degrees;

    loop {
        let mut best: Option<((usize, usize), f64)> = None;
        for (&pair, &w) in &between {
            let gain = w / m - sigma[pair.0] * sigma[pair.1] / (2.0 * m * m);
            if best.is_none_or(|(_, g)| gain > g + GAIN_EPSILON) {
                best = Some((pair, gain));
            }
        }
        let Some(((keep, gone), gain)) = best else {
            break;
        };
        if gain <= GAIN_EPSILON {
            break;
        }

        for label in community.iter_mut() {
            if *label == gone {
                *label = keep;
            }
        }
        sigma[keep] += sigma[gone];

        // Re-key every pair that touched the merged community.
        let stale: Vec<((usize, usize), f64)> = between
            .iter()
            .filter(|(&(a, b), _)| a == gone || b == gone)
            .map(|(&pair, &w)| (pair, w))
            .collect();
        for ((a, b), w) in stale {
            between.remove(&(a, b));
            let other = if a == gone { b } else { a };
            if other == keep {
                continue; // now internal to the merged community
            }
            let key = (keep.min(other), keep.max(other));
            *between.entry(key).or_insert(0.0) += w;
        }
    }

    community
}
