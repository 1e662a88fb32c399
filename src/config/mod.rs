//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`POLARITY_*`)
//! - CLI arguments (applied by the binary on top of these)
//!
//! Defaults reproduce the reference experiment: a 1000-user scale-free
//! network seeded 3:1 toward `+1`, driven at `T = 2.0` under a `+0.1`
//! field, attacked across budgets of 0 to 60 pinned influencers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dynamics::RunParams;
use crate::error::{PolarityError, Result};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Network generation and initial state
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Metropolis dynamics parameters
    #[serde(default)]
    pub dynamics: DynamicsConfig,

    /// Budget sweep experiment parameters
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| PolarityError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| PolarityError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Simulation settings
        if let Ok(val) = std::env::var("POLARITY_N_USERS") {
            if let Ok(val) = val.parse() {
                config.simulation.n_users = val;
            }
        }
        if let Ok(val) = std::env::var("POLARITY_M_EDGES") {
            if let Ok(val) = val.parse() {
                config.simulation.m_edges = val;
            }
        }
        if let Ok(val) = std::env::var("POLARITY_SEED") {
            if let Ok(val) = val.parse() {
                config.simulation.seed = val;
            }
        }
        if let Ok(val) = std::env::var("POLARITY_BIAS") {
            if let Ok(val) = val.parse() {
                config.simulation.bias = val;
            }
        }

        // Dynamics settings
        if let Ok(val) = std::env::var("POLARITY_TEMPERATURE") {
            if let Ok(val) = val.parse() {
                config.dynamics.temperature = val;
            }
        }
        if let Ok(val) = std::env::var("POLARITY_FIELD") {
            if let Ok(val) = val.parse() {
                config.dynamics.field = val;
            }
        }
        if let Ok(val) = std::env::var("POLARITY_COUPLING") {
            if let Ok(val) = val.parse() {
                config.dynamics.coupling = val;
            }
        }

        // Sweep settings
        if let Ok(val) = std::env::var("POLARITY_BUDGETS") {
            let budgets: std::result::Result<Vec<usize>, _> =
                val.split(',').map(|b| b.trim().parse()).collect();
            if let Ok(budgets) = budgets {
                config.sweep.budgets = budgets;
            }
        }
        if let Ok(val) = std::env::var("POLARITY_CONSENSUS_STEPS") {
            if let Ok(val) = val.parse() {
                config.sweep.consensus_steps = val;
            }
        }
        if let Ok(val) = std::env::var("POLARITY_ATTACK_STEPS") {
            if let Ok(val) = val.parse() {
                config.sweep.attack_steps = val;
            }
        }
        if let Ok(val) = std::env::var("POLARITY_WINDOW") {
            if let Ok(val) = val.parse() {
                config.sweep.window = val;
            }
        }

        config
    }

    /// Merge with another config (other takes precedence)
    pub fn merge(self, other: Self) -> Self {
        let defaults = SimulationConfig::default();
        Self {
            simulation: SimulationConfig {
                n_users: if other.simulation.n_users != defaults.n_users {
                    other.simulation.n_users
                } else {
                    self.simulation.n_users
                },
                m_edges: if other.simulation.m_edges != defaults.m_edges {
                    other.simulation.m_edges
                } else {
                    self.simulation.m_edges
                },
                seed: if other.simulation.seed != defaults.seed {
                    other.simulation.seed
                } else {
                    self.simulation.seed
                },
                bias: if other.simulation.bias != defaults.bias {
                    other.simulation.bias
                } else {
                    self.simulation.bias
                },
            },
            dynamics: other.dynamics,
            sweep: other.sweep,
        }
    }
}

/// Network generation and initial opinion state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of users (nodes) in the network
    pub n_users: usize,

    /// Edges attached per arriving node
    pub m_edges: usize,

    /// Seed for the session RNG
    pub seed: u64,

    /// Probability of an initial `+1` opinion
    pub bias: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_users: 1000,
            m_edges: 3,
            seed: 42,
            bias: 0.75, // 3:1 toward +1
        }
    }
}

/// Metropolis dynamics parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicsConfig {
    /// Social temperature `T`
    pub temperature: f64,

    /// External field `h`
    pub field: f64,

    /// Neighbor coupling `J`
    pub coupling: f64,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            temperature: 2.0,
            field: 0.1,
            coupling: 1.0,
        }
    }
}

impl DynamicsConfig {
    /// Metropolis parameters for a run of `steps` under this configuration
    pub fn params(&self, steps: usize) -> RunParams {
        RunParams::new(steps)
            .with_temperature(self.temperature)
            .with_field(self.field)
            .with_coupling(self.coupling)
    }
}

/// Budget sweep experiment parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Influencer budgets to test
    pub budgets: Vec<usize>,

    /// Steps to establish the consensus baseline
    pub consensus_steps: usize,

    /// Steps per attack run
    pub attack_steps: usize,

    /// Tail window for final-magnetization estimates
    pub window: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            budgets: vec![0, 5, 10, 20, 30, 40, 50, 60],
            consensus_steps: 20_000,
            attack_steps: 30_000,
            window: 1000,
        }
    }
}
