//! Simulation session: the root object owning graph, spins and RNG.
//!
//! A [`Session`] wires the components together and is the only owner of
//! mutable state. Every stochastic operation (graph generation, spin
//! initialization, Metropolis draws, random target selection, community
//! detection ordering) draws from the one ChaCha8 stream seeded at
//! construction, so a session is reproducible from `(n_users, m_edges,
//! seed)` alone.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::analysis;
use crate::community::{self, Community, CommunityReport, CommunityStructure};
use crate::dynamics::{self, MagnetizationHistory, PinSet, RunParams};
use crate::error::{PolarityError, Result};
use crate::graph::SocialGraph;
use crate::rank::{self, CentralityMethod, Ranking};
use crate::spin::{SpinDistribution, SpinSnapshot, SpinState};

/// Counters aggregated across every Metropolis run of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Completed runs.
    pub runs: u64,
    /// Steps requested across all runs.
    pub steps_requested: u64,
    /// Observations recorded (requested steps minus pinned skips).
    pub steps_observed: u64,
    /// Accepted flips.
    pub flips_accepted: u64,
    /// Rejected proposals.
    pub flips_rejected: u64,
    /// Draws consumed by pinned nodes.
    pub pinned_skips: u64,
}

/// One opinion-dynamics simulation over a generated social network.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    graph: SocialGraph,
    spins: SpinState,
    rng: ChaCha8Rng,
    stats: SessionStats,
}

impl Session {
    /// Generate the network and a uniform initial opinion state.
    ///
    /// Fails when the graph parameters are invalid (`m_edges` must satisfy
    /// `0 < m_edges < n_users`).
    pub fn new(n_users: usize, m_edges: usize, seed: u64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph = SocialGraph::generate(n_users, m_edges, &mut rng)?;
        let spins = SpinState::random(n_users, SpinDistribution::Uniform, &mut rng)?;

        let id = Uuid::new_v4();
        tracing::info!(
            "session {} created: {} users, {} edges, seed {}",
            id,
            n_users,
            graph.edge_count(),
            seed
        );

        Ok(Self {
            id,
            graph,
            spins,
            rng,
            stats: SessionStats::default(),
        })
    }

    /// Session id used in logs and reports.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The generated network.
    pub fn graph(&self) -> &SocialGraph {
        &self.graph
    }

    /// The current opinion state.
    pub fn spins(&self) -> &SpinState {
        &self.spins
    }

    /// Number of nodes in the network.
    pub fn n_users(&self) -> usize {
        self.graph.n_users()
    }

    /// Counters aggregated over all runs so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Current magnetization (mean opinion).
    pub fn magnetization(&self) -> f64 {
        self.spins.mean()
    }

    /// Re-roll every spin from the session RNG.
    pub fn init_spins(&mut self, distribution: SpinDistribution) -> Result<()> {
        self.spins = SpinState::random(self.graph.n_users(), distribution, &mut self.rng)?;
        Ok(())
    }

    /// Run Metropolis dynamics, holding the pinned nodes fixed.
    pub fn run(&mut self, params: &RunParams, pinned: &PinSet) -> Result<MagnetizationHistory> {
        let outcome = dynamics::run_metropolis(
            &mut self.spins,
            self.graph.index(),
            params,
            pinned,
            &mut self.rng,
        )?;

        self.stats.runs += 1;
        self.stats.steps_requested += params.steps as u64;
        self.stats.steps_observed += outcome.history.len() as u64;
        self.stats.flips_accepted += outcome.accepted;
        self.stats.flips_rejected += outcome.rejected;
        self.stats.pinned_skips += outcome.skipped;

        Ok(outcome.history)
    }

    /// Run Metropolis dynamics with no pinned nodes.
    pub fn run_free(&mut self, params: &RunParams) -> Result<MagnetizationHistory> {
        let pinned = PinSet::empty(self.graph.n_users());
        self.run(params, &pinned)
    }

    /// Top `k` influencers by the requested centrality measure.
    pub fn rank_influencers(&self, method: CentralityMethod, k: usize) -> Ranking {
        match method {
            CentralityMethod::Degree => rank::rank_by_degree(self.graph.index(), k),
            CentralityMethod::Eigenvector => rank::rank_by_eigenvector(self.graph.index(), k),
        }
    }

    /// Force every target to `-1`, pin it there, and run the dynamics.
    ///
    /// Targets keep opinion `-1` for the entire run. Out-of-range target
    /// ids fail before any state changes.
    pub fn simulate_attack(
        &mut self,
        targets: &[usize],
        params: &RunParams,
    ) -> Result<MagnetizationHistory> {
        let pinned = PinSet::new(self.graph.n_users(), targets)?;
        self.spins.force_set(targets, -1)?;
        tracing::info!(
            "attack on session {}: {} targets pinned to -1 for {} steps",
            self.id,
            pinned.len(),
            params.steps
        );
        self.run(params, &pinned)
    }

    /// Susceptibility of a history at temperature `temperature`, scaled to
    /// this network's size.
    pub fn susceptibility(
        &self,
        history: &MagnetizationHistory,
        temperature: f64,
    ) -> Result<f64> {
        analysis::susceptibility(history, self.graph.n_users(), temperature)
    }

    /// Partition the network into communities.
    pub fn detect_communities(&mut self) -> CommunityStructure {
        community::detect_communities(self.graph.index(), &mut self.rng)
    }

    /// Classify communities against the current opinion state.
    pub fn analyze_communities(
        &self,
        communities: &[Community],
        field: f64,
        coupling: f64,
    ) -> Vec<CommunityReport> {
        community::analyze_communities(
            communities,
            &self.spins,
            self.graph.index(),
            field,
            coupling,
        )
    }

    /// Save the current opinion state.
    pub fn snapshot(&self) -> SpinSnapshot {
        self.spins.snapshot()
    }

    /// Restore a previously saved opinion state.
    pub fn restore(&mut self, snapshot: &SpinSnapshot) -> Result<()> {
        self.spins.restore(snapshot)
    }

    /// `k` distinct node ids drawn uniformly from the session RNG.
    pub fn random_targets(&mut self, k: usize) -> Result<Vec<usize>> {
        let n = self.graph.n_users();
        if k > n {
            return Err(PolarityError::Config(format!(
                "cannot pick {k} distinct targets from {n} users"
            )));
        }
        Ok(rand::seq::index::sample(&mut self.rng, n, k).into_vec())
    }
}
