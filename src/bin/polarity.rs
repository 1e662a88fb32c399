//! Polarity CLI binary.
//!
//! Opinion-dynamics simulation on scale-free social networks.
//!
//! # Commands
//!
//! - `simulate` - Run Metropolis dynamics and report the outcome
//! - `rank` - Top influencers by degree or eigenvector centrality
//! - `communities` - Detect and classify opinion communities
//! - `sweep` - Budget sweep: attack with growing influencer budgets

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use polarity::{BudgetSweep, CentralityMethod, Config, Session, SpinDistribution, VERSION};

#[derive(Parser)]
#[command(name = "polarity")]
#[command(version = VERSION)]
#[command(about = "Opinion dynamics on scale-free social networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run Metropolis dynamics and report the outcome
    Simulate {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of users
        #[arg(short = 'n', long)]
        users: Option<usize>,

        /// Edges per arriving node
        #[arg(short = 'm', long)]
        edges: Option<usize>,

        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Steps to run (default: consensus_steps from config)
        #[arg(long)]
        steps: Option<usize>,

        /// Write the JSON report to a file (default: stdout table)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Export the generated graph in DOT format
        #[arg(long)]
        dot: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Top influencers by degree or eigenvector centrality
    Rank {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of users
        #[arg(short = 'n', long)]
        users: Option<usize>,

        /// Edges per arriving node
        #[arg(short = 'm', long)]
        edges: Option<usize>,

        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Centrality measure (degree, eigenvector)
        #[arg(long, default_value = "eigenvector")]
        method: String,

        /// How many influencers to list
        #[arg(short = 'k', long, default_value = "10")]
        top: usize,

        /// Write the JSON ranking to a file (default: stdout table)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the ranking as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Detect and classify opinion communities
    Communities {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of users
        #[arg(short = 'n', long)]
        users: Option<usize>,

        /// Edges per arriving node
        #[arg(short = 'm', long)]
        edges: Option<usize>,

        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Consensus steps before classification
        #[arg(long)]
        steps: Option<usize>,

        /// Write the JSON report to a file (default: stdout table)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Budget sweep: attack with growing influencer budgets
    Sweep {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the JSON report to a file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export the generated graph in DOT format
        #[arg(long)]
        dot: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            users,
            edges,
            seed,
            steps,
            output,
            json,
            dot,
            verbose,
        } => cmd_simulate(config, users, edges, seed, steps, output, json, dot, verbose),

        Commands::Rank {
            config,
            users,
            edges,
            seed,
            method,
            top,
            output,
            json,
            verbose,
        } => cmd_rank(config, users, edges, seed, &method, top, output, json, verbose),

        Commands::Communities {
            config,
            users,
            edges,
            seed,
            steps,
            output,
            json,
            verbose,
        } => cmd_communities(config, users, edges, seed, steps, output, json, verbose),

        Commands::Sweep {
            config,
            output,
            dot,
            verbose,
        } => cmd_sweep(config, output, dot, verbose),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_simulate(
    config: Option<PathBuf>,
    users: Option<usize>,
    edges: Option<usize>,
    seed: Option<u64>,
    steps: Option<usize>,
    output: Option<PathBuf>,
    json: bool,
    dot: Option<PathBuf>,
    verbose: bool,
) -> anyhow::Result<()> {
    init_logging(verbose);
    let config = load_config(config, users, edges, seed)?;
    let steps = steps.unwrap_or(config.sweep.consensus_steps);

    let mut session = build_session(&config)?;
    if let Some(path) = dot {
        std::fs::write(path, session.graph().to_dot())?;
    }

    let history = session.run_free(&config.dynamics.params(steps))?;
    let chi = session.susceptibility(&history, config.dynamics.temperature)?;
    let stats = session.stats();

    let report = serde_json::json!({
        "session": session.id(),
        "n_users": session.n_users(),
        "m_edges": config.simulation.m_edges,
        "seed": config.simulation.seed,
        "steps": steps,
        "final_magnetization": session.magnetization(),
        "tail_magnetization": history.tail_mean(config.sweep.window),
        "susceptibility": chi,
        "stats": stats,
    });

    if json || output.is_some() {
        return write_output(output, &serde_json::to_string_pretty(&report)?);
    }

    println!("Simulation Results:");
    println!("  Session:        {}", session.id());
    println!(
        "  Network:        {} users, {} edges",
        session.n_users(),
        session.graph().edge_count()
    );
    println!("  Steps:          {} ({} observed)", steps, history.len());
    println!("  Final m:        {:.4}", session.magnetization());
    println!(
        "  Tail m:         {:.4}",
        history.tail_mean(config.sweep.window)
    );
    println!("  Susceptibility: {chi:.4}");
    println!(
        "  Flips:          {} accepted / {} rejected",
        stats.flips_accepted, stats.flips_rejected
    );

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_rank(
    config: Option<PathBuf>,
    users: Option<usize>,
    edges: Option<usize>,
    seed: Option<u64>,
    method: &str,
    top: usize,
    output: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    init_logging(verbose);
    let config = load_config(config, users, edges, seed)?;

    let method = match method.to_lowercase().as_str() {
        "degree" | "d" => CentralityMethod::Degree,
        "eigenvector" | "eigen" | "e" => CentralityMethod::Eigenvector,
        _ => {
            eprintln!("Unknown method: {method}. Use: degree, eigenvector");
            std::process::exit(1);
        }
    };

    let session = build_session(&config)?;
    let ranking = session.rank_influencers(method, top);

    if json || output.is_some() {
        return write_output(output, &serde_json::to_string_pretty(&ranking)?);
    }

    println!("Top {} influencers ({:?}):", ranking.entries.len(), ranking.method);
    if let Some(fallback) = &ranking.fallback {
        println!("  (fell back: {fallback:?})");
    }
    println!("  {:>4}  {:>6}  {:>10}", "rank", "node", "score");
    for (i, entry) in ranking.entries.iter().enumerate() {
        println!("  {:>4}  {:>6}  {:>10.6}", i + 1, entry.node, entry.score);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_communities(
    config: Option<PathBuf>,
    users: Option<usize>,
    edges: Option<usize>,
    seed: Option<u64>,
    steps: Option<usize>,
    output: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    init_logging(verbose);
    let config = load_config(config, users, edges, seed)?;
    let steps = steps.unwrap_or(config.sweep.consensus_steps);

    let mut session = build_session(&config)?;
    session.run_free(&config.dynamics.params(steps))?;

    let structure = session.detect_communities();
    let reports = session.analyze_communities(
        &structure.communities,
        config.dynamics.field,
        config.dynamics.coupling,
    );

    let report = serde_json::json!({
        "session": session.id(),
        "structure": structure,
        "reports": reports,
    });
    if json || output.is_some() {
        return write_output(output, &serde_json::to_string_pretty(&report)?);
    }

    println!(
        "Communities ({:?}, modularity {:.4}):",
        structure.method, structure.modularity
    );
    if let Some(fallback) = &structure.fallback {
        println!("  (fell back: {fallback:?})");
    }
    println!(
        "  {:>4}  {:>5}  {:>9}  {:>9}  {:>9}  {:>8}  label",
        "idx", "size", "avg_state", "internal", "external", "ratio"
    );
    for r in &reports {
        println!(
            "  {:>4}  {:>5}  {:>9.4}  {:>9.4}  {:>9.4}  {:>8.3}  {}",
            r.index, r.size, r.avg_state, r.internal_energy_avg, r.external_energy_avg,
            r.dominance_ratio, r.label
        );
    }

    Ok(())
}

fn cmd_sweep(
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    dot: Option<PathBuf>,
    verbose: bool,
) -> anyhow::Result<()> {
    init_logging(verbose);
    let config = load_config(config, None, None, None)?;

    let mut session = build_session(&config)?;
    if let Some(path) = dot {
        std::fs::write(path, session.graph().to_dot())?;
    }

    // Establish the consensus baseline before attacking it.
    session.run_free(&config.dynamics.params(config.sweep.consensus_steps))?;

    let sweep = BudgetSweep {
        budgets: config.sweep.budgets.clone(),
        attack: config.dynamics.params(config.sweep.attack_steps),
        window: config.sweep.window,
    };
    let report = sweep.execute(&mut session)?;

    write_output(output, &serde_json::to_string_pretty(&report)?)?;

    println!();
    println!("Budget Sweep Summary:");
    println!("  Baseline m:      {:.4}", report.baseline_magnetization);
    match report.critical_budget {
        Some(budget) => println!("  Critical budget: {budget}"),
        None => println!("  Critical budget: none (network resisted)"),
    }
    println!(
        "  {:>6}  {:>8}  {:>9}  {:>8}",
        "budget", "hub_m", "random_m", "hub_chi"
    );
    for p in &report.points {
        println!(
            "  {:>6}  {:>8.4}  {:>9.4}  {:>8.3}",
            p.budget, p.hub_magnetization, p.random_magnetization, p.hub_susceptibility
        );
    }

    Ok(())
}

// Helper functions

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}

/// Defaults, overridden by env, then config file, then explicit flags.
fn load_config(
    path: Option<PathBuf>,
    users: Option<usize>,
    edges: Option<usize>,
    seed: Option<u64>,
) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_env().merge(Config::from_file(path)?),
        None => Config::from_env(),
    };

    if let Some(users) = users {
        config.simulation.n_users = users;
    }
    if let Some(edges) = edges {
        config.simulation.m_edges = edges;
    }
    if let Some(seed) = seed {
        config.simulation.seed = seed;
    }
    Ok(config)
}

fn write_output(output: Option<PathBuf>, content: &str) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn build_session(config: &Config) -> anyhow::Result<Session> {
    let mut session = Session::new(
        config.simulation.n_users,
        config.simulation.m_edges,
        config.simulation.seed,
    )?;
    session.init_spins(SpinDistribution::Biased {
        p_up: config.simulation.bias,
    })?;
    Ok(session)
}
