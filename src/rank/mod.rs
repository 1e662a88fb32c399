//! Influencer ranking by centrality.
//!
//! Degree centrality finds the visible hubs; eigenvector centrality finds
//! the strategic ones, weighting a connection by how connected the other
//! end is. Eigenvector scores come from a shifted power iteration and fall
//! back to degree centrality (with a typed reason) when the iteration does
//! not converge.

use ndarray::Array1;
use serde::Serialize;

use crate::graph::NeighborIndex;

/// Iteration cap for the eigenvector power method.
pub const EIGENVECTOR_MAX_ITER: usize = 1000;

/// Per-node L1 convergence tolerance for the power method.
const EIGENVECTOR_TOL: f64 = 1e-6;

/// Centrality measure used for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CentralityMethod {
    /// Normalized connection count.
    Degree,
    /// Principal eigenvector of the adjacency matrix.
    Eigenvector,
}

/// Why an eigenvector ranking fell back to degree centrality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankingFallback {
    /// The power iteration failed to converge within the cap.
    NotConverged {
        /// Iterations performed before giving up.
        iterations: usize,
    },
    /// The graph has no edges, so the adjacency spectrum carries no
    /// centrality signal.
    Degenerate,
}

/// One ranked node.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankedNode {
    /// Node id.
    pub node: usize,
    /// Centrality score.
    pub score: f64,
}

/// A ranked list of influencers and the measure that actually produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    /// Ranked entries, highest score first; equal scores order by node id.
    pub entries: Vec<RankedNode>,
    /// The measure the scores came from.
    pub method: CentralityMethod,
    /// Present when the requested method was substituted.
    pub fallback: Option<RankingFallback>,
}

impl Ranking {
    /// Ranked node ids, highest score first.
    pub fn nodes(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.node).collect()
    }
}

/// Top `k` nodes by normalized degree centrality (`degree / (n - 1)`).
pub fn rank_by_degree(index: &NeighborIndex, k: usize) -> Ranking {
    let n = index.n_nodes();
    let denom = if n > 1 { (n - 1) as f64 } else { 1.0 };
    let scores = (0..n).map(|node| index.degree(node) as f64 / denom);

    Ranking {
        entries: top_k(scores, k),
        method: CentralityMethod::Degree,
        fallback: None,
    }
}

/// Top `k` nodes by eigenvector centrality.
///
/// Runs a shifted power iteration (`x <- (I + A) x`, Euclidean
/// normalization) capped at [`EIGENVECTOR_MAX_ITER`] sweeps. On
/// non-convergence, or on an edgeless graph where the measure is
/// undefined, the ranking substitutes degree centrality and carries the
/// reason; no other failure routes into the fallback.
pub fn rank_by_eigenvector(index: &NeighborIndex, k: usize) -> Ranking {
    let n = index.n_nodes();
    if (0..n).all(|node| index.degree(node) == 0) {
        tracing::warn!("eigenvector centrality on an edgeless graph, falling back to degree");
        let mut ranking = rank_by_degree(index, k);
        ranking.fallback = Some(RankingFallback::Degenerate);
        return ranking;
    }

    match eigenvector_scores(index, EIGENVECTOR_MAX_ITER, EIGENVECTOR_TOL) {
        PowerIteration::Converged(scores) => Ranking {
            entries: top_k(scores.into_iter(), k),
            method: CentralityMethod::Eigenvector,
            fallback: None,
        },
        PowerIteration::Exhausted { iterations } => {
            tracing::warn!(
                "eigenvector centrality did not converge after {} iterations, \
                 falling back to degree centrality",
                iterations
            );
            let mut ranking = rank_by_degree(index, k);
            ranking.fallback = Some(RankingFallback::NotConverged { iterations });
            ranking
        },
    }
}

enum PowerIteration {
    Converged(Vec<f64>),
    Exhausted { iterations: usize },
}

/// Shifted power iteration for the principal eigenvector.
///
/// The `+I` shift keeps the dominant eigenvalue simple on bipartite
/// structures, where the plain iteration oscillates. Convergence is an L1
/// delta below `n * tol`, the conventional criterion for this method.
fn eigenvector_scores(index: &NeighborIndex, max_iter: usize, tol: f64) -> PowerIteration {
    let n = index.n_nodes();
    let threshold = n as f64 * tol;

    let mut x = Array1::<f64>::from_elem(n, 1.0 / n as f64);
    let mut next = Array1::<f64>::zeros(n);

    for _ in 0..max_iter {
        for node in 0..n {
            let mut acc = x[node];
            for &nb in index.neighbors(node) {
                acc += x[nb as usize];
            }
            next[node] = acc;
        }

        let norm = next.dot(&next).sqrt();
        next.mapv_inplace(|v| v / norm);

        let delta = (&next - &x).mapv(f64::abs).sum();
        std::mem::swap(&mut x, &mut next);
        if delta < threshold {
            return PowerIteration::Converged(x.to_vec());
        }
    }

    PowerIteration::Exhausted {
        iterations: max_iter,
    }
}

/// Keep the `k` best scores, descending, ties broken by ascending node id.
fn top_k(scores: impl Iterator<Item = f64>, k: usize) -> Vec<RankedNode> {
    let mut entries: Vec<RankedNode> = scores
        .enumerate()
        .map(|(node, score)| RankedNode { node, score })
        .collect();
    // Stable sort: equal scores keep their ascending-id order.
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    entries.truncate(k);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SocialGraph;
    use petgraph::graph::UnGraph;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn star(leaves: usize) -> NeighborIndex {
        let mut g = UnGraph::new_undirected();
        let nodes: Vec<_> = (0..=leaves).map(|i| g.add_node(i)).collect();
        for leaf in 1..=leaves {
            g.add_edge(nodes[0], nodes[leaf], ());
        }
        NeighborIndex::from_graph(&g)
    }

    #[test]
    fn test_degree_ranking_finds_the_hub() {
        let index = star(6);
        let ranking = rank_by_degree(&index, 3);
        assert_eq!(ranking.method, CentralityMethod::Degree);
        assert_eq!(ranking.entries[0].node, 0);
        assert!((ranking.entries[0].score - 1.0).abs() < 1e-12);
        assert_eq!(ranking.entries.len(), 3);
    }

    #[test]
    fn test_equal_scores_order_by_node_id() {
        let index = star(5);
        let ranking = rank_by_degree(&index, 6);
        // All leaves share degree 1; ids stay ascending.
        let leaves: Vec<usize> = ranking.entries[1..].iter().map(|e| e.node).collect();
        assert_eq!(leaves, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_eigenvector_ranking_converges_on_star() {
        let index = star(8);
        let ranking = rank_by_eigenvector(&index, 4);
        assert_eq!(ranking.method, CentralityMethod::Eigenvector);
        assert!(ranking.fallback.is_none());
        assert_eq!(ranking.entries[0].node, 0);
        assert!(ranking.entries[0].score > ranking.entries[1].score);
    }

    #[test]
    fn test_eigenvector_ranking_on_generated_graph() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let graph = SocialGraph::generate(100, 3, &mut rng).unwrap();
        let ranking = rank_by_eigenvector(graph.index(), 10);
        assert!(ranking.fallback.is_none());
        assert_eq!(ranking.entries.len(), 10);
        for pair in ranking.entries.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_edgeless_graph_falls_back_to_degree() {
        let mut g = UnGraph::<usize, ()>::new_undirected();
        for i in 0..4 {
            g.add_node(i);
        }
        let index = NeighborIndex::from_graph(&g);

        let ranking = rank_by_eigenvector(&index, 4);
        assert_eq!(ranking.method, CentralityMethod::Degree);
        assert_eq!(ranking.fallback, Some(RankingFallback::Degenerate));
        assert_eq!(ranking.nodes(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_exhausted_iteration_reports_itself() {
        let index = star(4);
        match eigenvector_scores(&index, 0, 1e-6) {
            PowerIteration::Exhausted { iterations } => assert_eq!(iterations, 0),
            PowerIteration::Converged(_) => panic!("cannot converge in zero iterations"),
        }
    }

    #[test]
    fn test_top_k_truncates_and_handles_oversized_k() {
        let index = star(3);
        assert_eq!(rank_by_degree(&index, 2).entries.len(), 2);
        assert_eq!(rank_by_degree(&index, 50).entries.len(), 4);
    }
}
