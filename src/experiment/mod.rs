//! Budget sweep: how many bought influencers it takes to flip a network.
//!
//! The experiment attacks an established consensus repeatedly from the
//! same saved baseline, once per budget, pinning the top eigenvector hubs
//! to `-1`. A control arm attacks the same number of randomly chosen
//! nodes, separating the effect of targeting from the effect of budget
//! size. The sweep leaves the session in its pre-sweep state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dynamics::RunParams;
use crate::error::Result;
use crate::rank::{CentralityMethod, RankingFallback};
use crate::session::Session;

/// Parameters of a budget sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSweep {
    /// Influencer budgets to test, typically ascending.
    pub budgets: Vec<usize>,
    /// Metropolis parameters for every attack run.
    pub attack: RunParams,
    /// Tail window (in observations) for the final-magnetization estimate.
    pub window: usize,
}

/// Outcome of one budget: both arms' final magnetization.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SweepPoint {
    /// Number of pinned targets.
    pub budget: usize,
    /// Final magnetization when pinning the top hubs.
    pub hub_magnetization: f64,
    /// Final magnetization when pinning random nodes.
    pub random_magnetization: f64,
    /// Susceptibility of the hub arm's history.
    pub hub_susceptibility: f64,
}

/// Full sweep results.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// Session the sweep ran against.
    pub session: Uuid,
    /// When the sweep finished.
    pub timestamp: DateTime<Utc>,
    /// Magnetization of the shared baseline state.
    pub baseline_magnetization: f64,
    /// Centrality measure that actually selected the hubs.
    pub ranking_method: CentralityMethod,
    /// Present when hub selection fell back to another measure.
    pub ranking_fallback: Option<RankingFallback>,
    /// One point per budget, in input order.
    pub points: Vec<SweepPoint>,
    /// First budget whose hub arm drove the magnetization below zero;
    /// `None` when the network resists even the largest budget.
    pub critical_budget: Option<usize>,
}

impl BudgetSweep {
    /// Execute the sweep against an established session.
    ///
    /// Hubs are ranked once for the largest budget; each arm restores the
    /// baseline snapshot before attacking, and the baseline is restored
    /// again after the final arm. Fails fast when the largest budget
    /// exceeds the population.
    pub fn execute(&self, session: &mut Session) -> Result<SweepReport> {
        let max_budget = self.budgets.iter().copied().max().unwrap_or(0);
        let ranking = session.rank_influencers(CentralityMethod::Eigenvector, max_budget);
        let hubs = ranking.nodes();
        let random_targets = session.random_targets(max_budget)?;

        let baseline = session.snapshot();
        let baseline_magnetization = session.magnetization();
        tracing::info!(
            "budget sweep on session {}: budgets {:?}, baseline m={:.4}",
            session.id(),
            self.budgets,
            baseline_magnetization
        );

        let mut points = Vec::with_capacity(self.budgets.len());
        for &budget in &self.budgets {
            session.restore(&baseline)?;
            let hub_history = session.simulate_attack(&hubs[..budget], &self.attack)?;
            let hub_magnetization = hub_history.tail_mean(self.window);
            let hub_susceptibility =
                session.susceptibility(&hub_history, self.attack.temperature)?;

            session.restore(&baseline)?;
            let random_history =
                session.simulate_attack(&random_targets[..budget], &self.attack)?;
            let random_magnetization = random_history.tail_mean(self.window);

            tracing::info!(
                "budget {}: hub arm m={:.4}, random arm m={:.4}",
                budget,
                hub_magnetization,
                random_magnetization
            );

            points.push(SweepPoint {
                budget,
                hub_magnetization,
                random_magnetization,
                hub_susceptibility,
            });
        }
        session.restore(&baseline)?;

        Ok(SweepReport {
            session: session.id(),
            timestamp: Utc::now(),
            baseline_magnetization,
            ranking_method: ranking.method,
            ranking_fallback: ranking.fallback,
            critical_budget: critical_budget(&points),
            points,
        })
    }
}

/// First budget whose hub arm ended below zero.
fn critical_budget(points: &[SweepPoint]) -> Option<usize> {
    points
        .iter()
        .find(|p| p.hub_magnetization < 0.0)
        .map(|p| p.budget)
}
