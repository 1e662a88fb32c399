//! # Polarity - Opinion Dynamics on Scale-Free Social Networks
//!
//! Ising-model simulation engine measuring how cheaply a small set of
//! "bought" influencers can flip a network's aggregate opinion.
//!
//! ## Features
//!
//! - **Scale-free topology**: Barabasi-Albert preferential attachment with
//!   a CSR adjacency index on the hot path
//! - **Metropolis dynamics**: two-state opinion variable driven by peer
//!   coupling, an external field, and social temperature
//! - **Pinning control**: "bought" nodes hold their opinion for a whole run
//! - **Influencer ranking**: degree and eigenvector centrality with a typed
//!   fallback instead of silent error swallowing
//! - **Attack simulation**: pin the top hubs to `-1` and watch the
//!   magnetization
//! - **Community forensics**: Louvain partitioning plus an energy-based
//!   organic-vs-induced classification per community
//!
//! ## Model Overview
//!
//! Every user holds a spin `s ∈ {-1, +1}` (their opinion). One Metropolis
//! step draws a node, computes the energy change of flipping it,
//!
//! ```text
//! dE = 2 * s[i] * (J * Σ s[neighbors] + h)
//! ```
//!
//! and accepts the flip when `dE <= 0`, else with probability
//! `exp(-dE / T)`. The mean spin (magnetization) is the aggregate opinion.
//!
//! ### Architecture
//!
//! ```text
//!  SocialGraph ──> NeighborIndex ──┬──> Metropolis engine ──> history
//!      │                           ├──> Influencer ranker
//!      │                           └──> Community detector
//!      v                                        │
//!  SpinState <── force_set / snapshot           v
//!      │                                  Classifier
//!      └────────────── Session owns all of the above + RNG
//! ```
//!
//! ### Community Labels
//!
//! | Label              | Condition                                  |
//! |--------------------|--------------------------------------------|
//! | Disorganized       | `\|avg_state\| < 0.2`                      |
//! | Strong Organic     | dominance ratio > 3 (bonds rule)           |
//! | Mixed              | dominance ratio > 1                        |
//! | Induced/Artificial | field energy rules the alignment           |
//!
//! ## Quick Start
//!
//! ### Attack Simulation
//!
//! ```rust,ignore
//! use polarity::{CentralityMethod, RunParams, Session, SpinDistribution};
//!
//! let mut session = Session::new(1000, 3, 42)?;
//! session.init_spins(SpinDistribution::Biased { p_up: 0.75 })?;
//!
//! // Establish consensus, then attack the top 20 eigenvector hubs.
//! session.run_free(&RunParams::new(20_000).with_field(0.1))?;
//! let hubs = session.rank_influencers(CentralityMethod::Eigenvector, 20);
//!
//! let history = session.simulate_attack(
//!     &hubs.nodes(),
//!     &RunParams::new(30_000).with_field(0.1),
//! )?;
//! println!("final magnetization: {:.4}", history.tail_mean(1000));
//! ```
//!
//! ### Budget Sweep
//!
//! ```rust,ignore
//! use polarity::{BudgetSweep, RunParams, Session};
//!
//! let mut session = Session::new(1000, 3, 42)?;
//! let sweep = BudgetSweep {
//!     budgets: vec![0, 5, 10, 20, 30, 40, 50, 60],
//!     attack: RunParams::new(30_000).with_field(0.1),
//!     window: 1000,
//! };
//! let report = sweep.execute(&mut session)?;
//! println!("critical budget: {:?}", report.critical_budget);
//! ```
//!
//! ## Modules
//!
//! - [`graph`]: Scale-free network generation and the CSR adjacency index
//! - [`spin`]: Per-node opinion state with O(1) magnetization
//! - [`dynamics`]: Metropolis Monte Carlo engine and pinning control
//! - [`rank`]: Degree/eigenvector influencer ranking
//! - [`analysis`]: Susceptibility estimation
//! - [`community`]: Community detection and organic-vs-induced labeling
//! - [`session`]: The root object owning graph, spins, RNG and stats
//! - [`experiment`]: Budget sweep orchestration
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod analysis;
pub mod community;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod experiment;
pub mod graph;
pub mod rank;
pub mod session;
pub mod spin;

// Re-exports for convenience
pub use community::{
    Community, CommunityDetectionFallback, CommunityLabel, CommunityReport, CommunityStructure,
    DetectionMethod,
};
pub use config::Config;
pub use dynamics::{MagnetizationHistory, PinSet, RunParams};
pub use error::{PolarityError, Result};
pub use experiment::{BudgetSweep, SweepPoint, SweepReport};
pub use graph::{NeighborIndex, SocialGraph};
pub use rank::{CentralityMethod, RankedNode, Ranking, RankingFallback};
pub use session::{Session, SessionStats};
pub use spin::{SpinDistribution, SpinSnapshot, SpinState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build a simulation session over a freshly generated network.
pub fn new_simulation(n_users: usize, m_edges: usize, seed: u64) -> Result<Session> {
    Session::new(n_users, m_edges, seed)
}
