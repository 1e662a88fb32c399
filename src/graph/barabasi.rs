//! Barabasi-Albert preferential attachment.

use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;

/// Build a scale-free graph by preferential attachment.
///
/// Starts from `m` isolated seed nodes; every later node attaches to `m`
/// distinct existing nodes. The attachment pool holds one entry per edge
/// endpoint, so a uniform draw from it selects nodes proportionally to
/// their degree without maintaining explicit weights. Fully deterministic
/// for a given `rng` stream.
///
/// Caller guarantees `0 < m < n`.
pub(super) fn build_scale_free_network(
    n: usize,
    m: usize,
    rng: &mut impl Rng,
) -> UnGraph<usize, ()> {
    let mut graph = UnGraph::new_undirected();
    let nodes: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();

    // The first arriving node wires to every seed node.
    let mut targets: Vec<usize> = (0..m).collect();
    let mut pool: Vec<usize> = Vec::with_capacity(2 * (n - m) * m);

    for source in m..n {
        for &t in &targets {
            graph.add_edge(nodes[source], nodes[t], ());
        }
        pool.extend_from_slice(&targets);
        pool.extend(std::iter::repeat(source).take(m));
        if source + 1 < n {
            targets = distinct_sample(&pool, m, rng);
        }
    }

    graph
}

/// Draw `m` distinct node ids from the pool, weighted by multiplicity.
/// `m` is small, so a linear membership check beats a set here.
fn distinct_sample(pool: &[usize], m: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut picked: Vec<usize> = Vec::with_capacity(m);
    while picked.len() < m {
        let candidate = pool[rng.gen_range(0..pool.len())];
        if !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_every_arrival_adds_exactly_m_edges() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let g = build_scale_free_network(25, 4, &mut rng);
        assert_eq!(g.node_count(), 25);
        assert_eq!(g.edge_count(), (25 - 4) * 4);
    }

    #[test]
    fn test_distinct_sample_has_no_repeats() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let pool = vec![0, 0, 0, 1, 1, 2, 3, 4];
        for _ in 0..50 {
            let mut picked = distinct_sample(&pool, 3, &mut rng);
            picked.sort_unstable();
            picked.dedup();
            assert_eq!(picked.len(), 3);
        }
    }

    #[test]
    fn test_seed_nodes_are_reachable() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let g = build_scale_free_network(20, 3, &mut rng);
        for seed in 0..3 {
            assert!(g.neighbors(NodeIndex::new(seed)).count() >= 1);
        }
    }
}
