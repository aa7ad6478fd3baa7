use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use fragrace::config::{self, SimConfig};
use fragrace::engine;
use fragrace::logging;
use fragrace::report::{self, MatchOutcome};
use fragrace::sweep::{self, SweepConfig};
use log::{error, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::process;

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about = "Pro vs pooled beginners frag race simulator", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Debug filter to specify log topics (e.g., "engine,respawn,sweep")
    #[arg(long, global = true)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a single match
    Run {
        /// Number of low-skill agents
        #[arg(short = 'n', long, default_value_t = config::DEFAULT_POPULATION)]
        population: u32,

        /// Random seed for a reproducible match
        #[arg(short, long)]
        seed: Option<u64>,

        /// Include the archetype breakdown of the pool (text or JSON)
        #[arg(long)]
        breakdown: bool,

        #[command(flatten)]
        model: ModelArgs,
    },
    /// Sweep a population range with repeated trials to find the tipping point
    Sweep {
        #[arg(long, default_value_t = 50)]
        from: u32,

        #[arg(long, default_value_t = 250)]
        to: u32,

        #[arg(long, default_value_t = 10)]
        step: u32,

        /// Matches per population
        #[arg(short, long, default_value_t = 20)]
        trials: u32,

        /// Base seed; trial k uses seed + k
        #[arg(short, long)]
        seed: Option<u64>,

        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FidelityArg {
    Continuous,
    Discrete,
    Full,
}

// Options shared by both subcommands that override the default config
#[derive(ClapArgs, Debug)]
struct ModelArgs {
    /// Match length in minutes
    #[arg(short, long, default_value_t = config::DEFAULT_MATCH_DURATION)]
    duration: f64,

    /// Map variant (open, tight)
    #[arg(short, long, default_value = config::DEFAULT_VARIANT)]
    map: String,

    #[arg(long, value_enum, default_value_t = FidelityArg::Full)]
    fidelity: FidelityArg,

    /// Per-tick probability of a burst event
    #[arg(long)]
    burst_prob: Option<f64>,

    /// Respawn delay in minutes
    #[arg(long)]
    respawn_delay: Option<f64>,

    /// Standard deviation of per-tick rate noise
    #[arg(long)]
    noise: Option<f64>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

impl ModelArgs {
    fn build_config(&self) -> SimConfig {
        let mut config = match self.fidelity {
            FidelityArg::Continuous => SimConfig::continuous(),
            FidelityArg::Discrete => SimConfig::discrete(),
            FidelityArg::Full => SimConfig::default(),
        };
        if let Some(p) = self.burst_prob {
            config.burst_event_probability = p;
        }
        if let Some(delay) = self.respawn_delay {
            config.respawn_delay = delay;
        }
        if let Some(std) = self.noise {
            config.rate_noise_std = std;
        }
        config
    }
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn execute(command: Command) -> Result<(), fragrace::SimError> {
    match command {
        Command::Run {
            population,
            seed,
            breakdown,
            model,
        } => {
            let config = model.build_config();
            let mut rng = seeded_rng(seed);
            let result = engine::run(population, model.duration, &model.map, &config, &mut rng)?;
            let mut outcome = MatchOutcome::from_result(&result);

            if model.json {
                if breakdown && !result.personalities.is_empty() {
                    outcome = outcome.with_breakdown(&result.personalities);
                }
                println!("{}", outcome.to_json());
            } else {
                println!("{}", outcome.to_text());
                println!("{}", report::detail_text(&result));
                if breakdown && !result.personalities.is_empty() {
                    println!("{}", report::breakdown_text(&result.personalities));
                }
            }
        }
        Command::Sweep {
            from,
            to,
            step,
            trials,
            seed,
            model,
        } => {
            let config = model.build_config();
            let sweep_config = SweepConfig {
                start: from,
                end: to,
                step,
                trials,
                seed,
                duration: model.duration,
                variant: model.map.clone(),
            };
            let sweep_report = sweep::run_sweep(&sweep_config, &config)?;
            if model.json {
                println!("{}", sweep_report.to_json());
            } else {
                println!("{}", sweep_report.to_text());
            }
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let log_level = logging::parse_level(&args.log_level);
    if let Err(e) = logging::init_logger(log_level, args.debug_filter) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    info!("Starting frag race simulator");

    if let Err(e) = execute(args.command) {
        error!("{}", e);
        process::exit(1);
    }
}
