//! FWORLD - CLI Entry Point
//!
//! Flat grid world with an embodied forager.

use clap::{Parser, Subcommand};
use fworld::snapshot::WorldSnapshot;
use fworld::{benchmark, Config, FWorld};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "fworld")]
#[command(version)]
#[command(about = "Flat grid world with an embodied forager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the agent with the reflex policy
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Output directory for statistics
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Print the world every stats interval
        #[arg(long)]
        show: bool,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Generate a world and save it as a snapshot
    Generate {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Output snapshot
        #[arg(short, long, default_value = "world.bin")]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Print a saved world
    Show {
        /// Snapshot file
        snapshot: PathBuf,

        /// Configuration file (YAML) supplying the material catalog
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Ticks per world
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Worlds run in parallel
        #[arg(short, long, default_value = "8")]
        worlds: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            output,
            seed,
            show,
            quiet,
        } => run_simulation(config, ticks, output, seed, show, quiet),

        Commands::Init { output } => generate_config(output),

        Commands::Generate {
            config,
            output,
            seed,
        } => generate_world(config, output, seed),

        Commands::Show { snapshot, config } => show_world(snapshot, config),

        Commands::Benchmark { ticks, worlds } => run_benchmark(ticks, worlds),
    }
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Ok(Config::from_file(path)?)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

fn run_simulation(
    config_path: PathBuf,
    ticks: u64,
    output: PathBuf,
    seed: Option<u64>,
    show: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    match config.logging.log_level.parse::<log::LevelFilter>() {
        Ok(level) => log::set_max_level(level),
        Err(_) => log::warn!("unknown log level {}", config.logging.log_level),
    }
    std::fs::create_dir_all(&output)?;

    let mut world = match seed {
        Some(s) => {
            println!("Using seed: {}", s);
            FWorld::new_with_seed(config.clone(), s)?
        }
        None => FWorld::new(config.clone())?,
    };

    println!("Starting simulation");
    println!("  Grid size: {}x{}", world.grid().width(), world.grid().height());
    println!("  Actions: {:?}", world.actions());
    println!("  Ticks: {}", ticks);
    println!();

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval;

    world.run_with_callback(ticks, |w| {
        if !quiet && w.stats.tick % stats_interval == 0 {
            println!("{}", w.stats.summary());
            if show {
                println!("{}", w.view());
            }
        }
    });

    let elapsed = start.elapsed();
    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Ticks: {}", world.stats.tick);
    println!("Speed: {:.1} ticks/s", world.stats.tick as f64 / elapsed.as_secs_f64());
    println!("Eats: {}  Drinks: {}", world.stats.eats, world.stats.drinks);
    println!("Episodes: {}", world.stats.episodes + 1);

    let stats_path = output.join("stats_history.json");
    world.stats_history.save(&stats_path.to_string_lossy())?;
    println!("Stats history: {:?}", stats_path);

    let final_path = output.join("stats_final.json");
    world.stats.save_json(&final_path.to_string_lossy())?;

    let world_path = output.join("world_final.bin");
    world.save_snapshot(&world_path)?;
    println!("Final world: {:?}", world_path);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn generate_world(
    config_path: PathBuf,
    output: PathBuf,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&config_path)?;
    // always generate, even if the config points at a saved world
    config.world.snapshot = None;
    let world = FWorld::new_with_seed(config, seed)?;
    world.save_snapshot(&output)?;
    println!("World saved to: {:?}", output);
    Ok(())
}

fn show_world(snapshot_path: PathBuf, config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let snapshot = WorldSnapshot::load(&snapshot_path)?;
    let materials = fworld::grid::Materials::new(&config.world.materials, config.world.barrier_idx);
    let grid = snapshot.to_grid(&materials)?;

    println!("=== World {:?} ===", snapshot_path);
    println!("Size: {}x{}", grid.width(), grid.height());
    for (code, name) in materials.names().iter().enumerate() {
        println!("  {:<10} {:6}", name, grid.count(code as u8));
    }
    println!();
    let view = fworld::grid::GridView {
        grid: &grid,
        materials: &materials,
        agent: None,
    };
    print!("{}", view);
    Ok(())
}

fn run_benchmark(ticks: u64, worlds: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== FWORLD Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Worlds: {}", worlds);
    println!();

    let result = benchmark(ticks, worlds, &Config::default())?;
    println!("{}", result);

    Ok(())
}
