//! Energy-based classification of detected communities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::NeighborIndex;
use crate::spin::SpinState;

use super::Community;

/// Below this absolute average state a community counts as unaligned.
const DISORDER_THRESHOLD: f64 = 0.2;
/// Dominance ratio above which alignment is attributed to internal bonds.
const STRONG_RATIO: f64 = 3.0;
/// Dominance ratio above which internal bonds at least outweigh the field.
const MIXED_RATIO: f64 = 1.0;
/// Keeps the dominance ratio finite when the external field is zero.
const RATIO_EPSILON: f64 = 1e-9;

/// Verdict on what holds a community's opinion together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunityLabel {
    /// No collective opinion to explain.
    #[serde(rename = "Disorganized")]
    Disorganized,
    /// Alignment driven overwhelmingly by peer bonds.
    #[serde(rename = "Strong Organic")]
    StrongOrganic,
    /// Peer bonds outweigh the field, but not decisively.
    #[serde(rename = "Mixed")]
    Mixed,
    /// Alignment held in place by the external field.
    #[serde(rename = "Induced/Artificial")]
    Induced,
}

impl fmt::Display for CommunityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommunityLabel::Disorganized => "Disorganized",
            CommunityLabel::StrongOrganic => "Strong Organic",
            CommunityLabel::Mixed => "Mixed",
            CommunityLabel::Induced => "Induced/Artificial",
        };
        write!(f, "{name}")
    }
}

/// Energy decomposition and verdict for one community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityReport {
    /// Position of the community in the detected structure.
    pub index: usize,
    /// Number of member nodes.
    pub size: usize,
    /// Mean spin over the members.
    pub avg_state: f64,
    /// Per-member magnitude of the internal bond energy.
    pub internal_energy_avg: f64,
    /// Per-member magnitude of the field energy.
    pub external_energy_avg: f64,
    /// `internal_energy_avg / (external_energy_avg + epsilon)`.
    pub dominance_ratio: f64,
    /// Classification derived from the fields above.
    pub label: CommunityLabel,
}

/// Classifies every non-empty community by comparing the bond energy its
/// members share against the energy the external field exerts on them.
///
/// Empty communities are skipped; `index` in each report refers back to
/// the position in `communities`, so the mapping stays unambiguous.
pub fn analyze_communities(
    communities: &[Community],
    spins: &SpinState,
    index: &NeighborIndex,
    field: f64,
    coupling: f64,
) -> Vec<CommunityReport> {
    let mut member = vec![false; spins.len()];
    let mut reports = Vec::with_capacity(communities.len());

    for (ci, community) in communities.iter().enumerate() {
        if community.is_empty() {
            continue;
        }
        for &node in community {
            member[node] = true;
        }

        let size = community.len() as f64;
        let mut spin_sum = 0.0;
        let mut internal = 0.0;
        for &node in community {
            let s = f64::from(spins.get(node));
            spin_sum += s;
            for &nb in index.neighbors(node) {
                let nb = nb as usize;
                if member[nb] {
                    internal += -coupling * s * f64::from(spins.get(nb));
                }
            }
        }
        // Each internal bond was visited from both ends.
        internal /= 2.0;

        let avg_state = spin_sum / size;
        let internal_energy_avg = (internal / size).abs();
        let external_energy_avg = (-field * spin_sum / size).abs();
        let dominance_ratio = internal_energy_avg / (external_energy_avg + RATIO_EPSILON);

        let label = if avg_state.abs() < DISORDER_THRESHOLD {
            CommunityLabel::Disorganized
        } else if dominance_ratio > STRONG_RATIO {
            CommunityLabel::StrongOrganic
        } else if dominance_ratio > MIXED_RATIO {
            CommunityLabel::Mixed
        } else {
            CommunityLabel::Induced
        };

        reports.push(CommunityReport {
            index: ci,
            size: community.len(),
            avg_state,
            internal_energy_avg,
            external_energy_avg,
            dominance_ratio,
            label,
        });

        for &node in community {
            member[node] = false;
        }
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spin::SpinDistribution;
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

    fn all_up(n: usize) -> SpinState {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        SpinState::random(n, SpinDistribution::Biased { p_up: 1.0 }, &mut rng)
            .expect("valid bias")
    }

    #[test]
    fn test_aligned_triangle_without_field_is_strong_organic() {
        let index = index_from(&[(0, 1), (1, 2), (2, 0)], 3);
        let spins = all_up(3);
        let reports = analyze_communities(&[vec![0, 1, 2]], &spins, &index, 0.0, 1.0);

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.size, 3);
        assert!((report.avg_state - 1.0).abs() < 1e-12);
        // Three bonds of energy -1 each, magnitude 3 over 3 members.
        assert!((report.internal_energy_avg - 1.0).abs() < 1e-12);
        assert!(report.external_energy_avg.abs() < 1e-12);
        assert_eq!(report.label, CommunityLabel::StrongOrganic);
    }

    #[test]
    fn test_balanced_community_is_disorganized() {
        let index = index_from(&[(0, 1), (1, 2), (2, 3), (3, 0)], 4);
        let mut spins = all_up(4);
        spins.force_set(&[2, 3], -1).expect("valid nodes");
        let reports = analyze_communities(&[vec![0, 1, 2, 3]], &spins, &index, 0.0, 1.0);

        assert!(reports[0].avg_state.abs() < 1e-12);
        assert_eq!(reports[0].label, CommunityLabel::Disorganized);
    }

    #[test]
    fn test_strong_field_makes_alignment_induced() {
        let index = index_from(&[(0, 1)], 2);
        let spins = all_up(2);
        let reports = analyze_communities(&[vec![0, 1]], &spins, &index, 10.0, 1.0);

        // One bond over two members against a field of magnitude 10.
        assert!((reports[0].internal_energy_avg - 0.5).abs() < 1e-12);
        assert!((reports[0].external_energy_avg - 10.0).abs() < 1e-12);
        assert_eq!(reports[0].label, CommunityLabel::Induced);
    }

    #[test]
    fn test_moderate_field_yields_mixed() {
        let index = index_from(&[(0, 1), (1, 2), (2, 0)], 3);
        let spins = all_up(3);
        // internal 1.0 vs external 0.5 per member: ratio 2, between 1 and 3.
        let reports = analyze_communities(&[vec![0, 1, 2]], &spins, &index, 0.5, 1.0);

        assert!((reports[0].dominance_ratio - 2.0).abs() < 1e-6);
        assert_eq!(reports[0].label, CommunityLabel::Mixed);
    }

    #[test]
    fn test_empty_community_is_skipped() {
        let index = index_from(&[(0, 1), (1, 2), (2, 0)], 3);
        let spins = all_up(3);
        let reports =
            analyze_communities(&[vec![], vec![0, 1, 2]], &spins, &index, 0.0, 1.0);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].index, 1);
    }

    #[test]
    fn test_disorder_takes_priority_over_dominance() {
        // Antiparallel pair: dominant internal energy but no net opinion.
        let index = index_from(&[(0, 1)], 2);
        let mut spins = all_up(2);
        spins.force_set(&[1], -1).expect("valid node");
        let reports = analyze_communities(&[vec![0, 1]], &spins, &index, 0.0, 1.0);

        assert!(reports[0].internal_energy_avg > 0.0);
        assert_eq!(reports[0].label, CommunityLabel::Disorganized);
    }

    #[test]
    fn test_label_serializes_to_display_name() {
        let json = serde_json::to_string(&CommunityLabel::Induced).expect("serializable");
        assert_eq!(json, "\"Induced/Artificial\"");
    }
}
