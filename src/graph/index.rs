//! Fixed adjacency index for the simulation hot path.

use petgraph::graph::{NodeIndex, UnGraph};

/// Compressed sparse row adjacency index.
///
/// Built once from the generated graph and never mutated afterwards.
/// Neighbor ids live in one flat array, sorted per node, with
/// `offsets[v]..offsets[v + 1]` delimiting node `v`'s slice, so a lookup is
/// a bounds check and a slice borrow.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    offsets: Vec<u32>,
    targets: Vec<u32>,
}

impl NeighborIndex {
    /// Build the index from an undirected graph whose nodes were added in
    /// id order `0..n`.
    pub(crate) fn from_graph(graph: &UnGraph<usize, ()>) -> Self {
        let n = graph.node_count();
        let mut offsets = Vec::with_capacity(n + 1);
        let mut targets = Vec::with_capacity(2 * graph.edge_count());

        offsets.push(0);
        for node in 0..n {
            let mut neighbors: Vec<u32> = graph
                .neighbors(NodeIndex::new(node))
                .map(|nb| nb.index() as u32)
                .collect();
            neighbors.sort_unstable();
            targets.extend_from_slice(&neighbors);
            offsets.push(targets.len() as u32);
        }

        Self { offsets, targets }
    }

    /// Number of indexed nodes.
    pub fn n_nodes(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Neighbor ids of `node`, ascending. Panics if `node` is out of range.
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.targets[start..end]
    }

    /// Degree of `node`.
    pub fn degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_plus_leaf() -> UnGraph<usize, ()> {
        let mut g = UnGraph::new_undirected();
        let n: Vec<_> = (0..4).map(|i| g.add_node(i)).collect();
        g.add_edge(n[0], n[1], ());
        g.add_edge(n[1], n[2], ());
        g.add_edge(n[2], n[0], ());
        g.add_edge(n[2], n[3], ());
        g
    }

    #[test]
    fn test_csr_layout_sorted_per_node() {
        let idx = NeighborIndex::from_graph(&triangle_plus_leaf());
        assert_eq!(idx.n_nodes(), 4);
        assert_eq!(idx.neighbors(0), &[1, 2]);
        assert_eq!(idx.neighbors(1), &[0, 2]);
        assert_eq!(idx.neighbors(2), &[0, 1, 3]);
        assert_eq!(idx.neighbors(3), &[2]);
    }

    #[test]
    fn test_degree_matches_neighbor_count() {
        let idx = NeighborIndex::from_graph(&triangle_plus_leaf());
        assert_eq!(idx.degree(2), 3);
        assert_eq!(idx.degree(3), 1);
    }
}
