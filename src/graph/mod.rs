//! Scale-free social graph construction.
//!
//! A [`SocialGraph`] is generated once per session by Barabasi-Albert
//! preferential attachment, emulating real social networks where a few
//! hub accounts hold most of the connections. The petgraph structure is
//! kept for graph algorithms and export; a [`NeighborIndex`] in CSR layout
//! serves the Metropolis hot path.

mod barabasi;
mod index;

pub use index::NeighborIndex;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::Rng;

use crate::error::{PolarityError, Result};

/// An immutable scale-free social network with dense node ids `0..n_users`.
#[derive(Debug, Clone)]
pub struct SocialGraph {
    n_users: usize,
    m_edges: usize,
    graph: UnGraph<usize, ()>,
    index: NeighborIndex,
}

impl SocialGraph {
    /// Generate a Barabasi-Albert graph with `m_edges` attachments per
    /// arriving node, drawing from `rng`.
    ///
    /// Identical parameters with an identically seeded `rng` reproduce the
    /// same edge set. Fails when `m_edges >= n_users` or either parameter
    /// is zero.
    pub fn generate(n_users: usize, m_edges: usize, rng: &mut impl Rng) -> Result<Self> {
        if n_users == 0 || m_edges == 0 || m_edges >= n_users {
            return Err(PolarityError::Config(format!(
                "preferential attachment requires 0 < m_edges < n_users, \
                 got n_users={n_users}, m_edges={m_edges}"
            )));
        }

        let graph = barabasi::build_scale_free_network(n_users, m_edges, rng);
        let index = NeighborIndex::from_graph(&graph);
        tracing::debug!(
            "generated scale-free graph: {} nodes, {} edges",
            n_users,
            graph.edge_count()
        );

        Ok(Self {
            n_users,
            m_edges,
            graph,
            index,
        })
    }

    /// Number of nodes.
    pub fn n_users(&self) -> usize {
        self.n_users
    }

    /// Attachments per arriving node used at generation time.
    pub fn m_edges(&self) -> usize {
        self.m_edges
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The precomputed adjacency index.
    pub fn index(&self) -> &NeighborIndex {
        &self.index
    }

    /// Neighbor ids of `node`, ascending.
    pub fn neighbors(&self, node: usize) -> &[u32] {
        self.index.neighbors(node)
    }

    /// Degree of `node`.
    pub fn degree(&self, node: usize) -> usize {
        self.index.degree(node)
    }

    /// Whether an edge connects `a` and `b`.
    pub fn contains_edge(&self, a: usize, b: usize) -> bool {
        self.graph
            .contains_edge(NodeIndex::new(a), NodeIndex::new(b))
    }

    /// Iterate all edges as `(source, target)` id pairs.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
    }

    /// Render the topology in DOT format for external visualization tools.
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        dot.push_str("graph polarity {\n");
        dot.push_str("  node [shape=circle];\n");
        for node in 0..self.n_users {
            dot.push_str(&format!("  {node};\n"));
        }
        for (a, b) in self.edges() {
            dot.push_str(&format!("  {a} -- {b};\n"));
        }
        dot.push_str("}\n");
        dot
    }
}
