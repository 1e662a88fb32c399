//! Community detection and classification.
//!
//! Detection runs Louvain-style local moving first and falls back to a
//! deterministic greedy modularity agglomeration when local moving fails
//! to settle within its sweep cap. The fallback is reported as data on
//! the returned structure, never as an error. Classification then splits
//! each community's alignment into the energy stored in internal bonds
//! and the energy exerted by the external field, and labels the community
//! by which of the two dominates.

mod classify;
mod greedy;
mod louvain;

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::graph::NeighborIndex;

pub use classify::{analyze_communities, CommunityLabel, CommunityReport};

use louvain::LocalMoving;

/// Member node ids of one community, in ascending order.
pub type Community = Vec<usize>;

/// Which detection algorithm produced a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Louvain-style local moving.
    Louvain,
    /// Greedy modularity agglomeration.
    GreedyModularity,
}

/// Why detection abandoned the primary algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum CommunityDetectionFallback {
    /// Local moving was still relocating nodes when the sweep cap ran out.
    NotStabilized {
        /// Number of sweeps performed before giving up.
        sweeps: usize,
    },
}

/// A partition of the graph into communities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityStructure {
    /// Communities ordered by their lowest member id; members ascending.
    pub communities: Vec<Community>,
    /// Algorithm that produced the partition.
    pub method: DetectionMethod,
    /// Present when the primary algorithm was abandoned.
    pub fallback: Option<CommunityDetectionFallback>,
    /// Newman modularity of the partition.
    pub modularity: f64,
}

impl CommunityStructure {
    /// Number of communities.
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    /// True when no communities were found (empty graph).
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }
}

/// Partitions the graph into communities.
///
/// Node visit order inside the optimizer is drawn from `rng`, so the
/// partition is reproducible for a given seed. A graph with no edges
/// yields one singleton community per node.
pub fn detect_communities(index: &NeighborIndex, rng: &mut impl Rng) -> CommunityStructure {
    let (labels, method, fallback) = match louvain::louvain_partition(index, rng) {
        LocalMoving::Stable(labels) => (labels, DetectionMethod::Louvain, None),
        LocalMoving::Unstable { sweeps } => {
            tracing::warn!(
                "community detection did not stabilize after {} sweeps, \
                 falling back to greedy modularity",
                sweeps
            );
            (
                greedy::greedy_partition(index),
                DetectionMethod::GreedyModularity,
                Some(CommunityDetectionFallback::NotStabilized { sweeps }),
            )
        }
    };

    let communities = group_labels(&labels);
    let modularity = modularity(&communities, index);
    tracing::debug!(
        "detected {} communities via {:?} (modularity {:.4})",
        communities.len(),
        method,
        modularity
    );

    CommunityStructure {
        communities,
        method,
        fallback,
        modularity,
    }
}

/// Groups per-node labels into communities ordered by first appearance.
///
/// Nodes are scanned in ascending id order, so each community's members
/// come out sorted and the community order is deterministic.
fn group_labels(labels: &[usize]) -> Vec<Community> {
    let mut slot: HashMap<usize, usize> = HashMap::new();
    let mut communities: Vec<Community> = Vec::new();
    for (node, &label) in labels.iter().enumerate() {
        let idx = *slot.entry(label).or_insert_with(|| {
            communities.push(Vec::new());
            communities.len() - 1
        });
        communities[idx].push(node);
    }
    communities
}

/// Newman modularity `Q = sum_c (e_c / m - (sigma_c / 2m)^2)`.
fn modularity(communities: &[Community], index: &NeighborIndex) -> f64 {
    let n = index.n_nodes();
    let two_m: f64 = (0..n).map(|v| index.degree(v) as f64).sum();
    if two_m == 0.0 {
        return 0.0;
    }

    let mut label = vec![0usize; n];
    for (ci, community) in communities.iter().enumerate() {
        for &node in community {
            label[node] = ci;
        }
    }

    let mut q = 0.0;
    for (ci, community) in communities.iter().enumerate() {
        let mut internal = 0.0; // twice the intra-community edge count
        let mut degree_sum = 0.0;
        for &node in community {
            degree_sum += index.degree(node) as f64;
            for &nb in index.neighbors(node) {
                if label[nb as usize] == ci {
                    internal += 1.0;
                }
            }
        }
        q += internal / two_m - (degree_sum / two_m).powi(2);
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SocialGraph;
    use petgraph::graph::UnGraph;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn index_from(edges: &[(usize, usize)], n: usize) -> NeighborIndex {
        let mut g = UnGraph::new_undirected();
        let nodes: Vec<_> = (0..n).map(|i| g.add_node(i)).collect();
        for &(a, b) in edges {
            g.add_edge(nodes[a], nodes[b], ());
        }
        NeighborIndex::from_graph(&g)
    }

    #[test]
    fn test_disjoint_triangles_partition_and_modularity() {
        let index = index_from(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)], 6);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let structure = detect_communities(&index, &mut rng);

        assert_eq!(structure.len(), 2);
        assert_eq!(structure.communities[0], vec![0, 1, 2]);
        assert_eq!(structure.communities[1], vec![3, 4, 5]);
        assert_eq!(structure.method, DetectionMethod::Louvain);
        assert!(structure.fallback.is_none());
        // Textbook value for two disjoint triangles.
        assert!((structure.modularity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_every_node_lands_in_exactly_one_community() {
        let graph = SocialGraph::generate(120, 3, &mut ChaCha8Rng::seed_from_u64(9))
            .expect("valid parameters");
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let structure = detect_communities(graph.index(), &mut rng);

        let mut seen = vec![0usize; graph.n_users()];
        for community in &structure.communities {
            for &node in community {
                seen[node] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_same_seed_reproduces_partition() {
        let graph = SocialGraph::generate(80, 2, &mut ChaCha8Rng::seed_from_u64(3))
            .expect("valid parameters");

        let mut rng_a = ChaCha8Rng::seed_from_u64(17);
        let mut rng_b = ChaCha8Rng::seed_from_u64(17);
        let a = detect_communities(graph.index(), &mut rng_a);
        let b = detect_communities(graph.index(), &mut rng_b);

        assert_eq!(a.communities, b.communities);
        assert_eq!(a.method, b.method);
    }

    #[test]
    fn test_members_are_sorted_ascending() {
        let graph = SocialGraph::generate(60, 2, &mut ChaCha8Rng::seed_from_u64(5))
            .expect("valid parameters");
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let structure = detect_communities(graph.index(), &mut rng);

        for community in &structure.communities {
            assert!(community.windows(2).all(|w| w[0] < w[1]));
            assert!(!community.is_empty());
        }
    }

    #[test]
    fn test_scale_free_graph_has_positive_modularity() {
        let graph = SocialGraph::generate(200, 3, &mut ChaCha8Rng::seed_from_u64(42))
            .expect("valid parameters");
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let structure = detect_communities(graph.index(), &mut rng);

        assert!(structure.len() > 1);
        assert!(structure.modularity > 0.0);
    }
}
