//! # FWORLD
//!
//! Flat grid world with an embodied forager.
//!
//! ## Features
//!
//! - **Senses**: ray-cast peripheral depth, a foveal material view, proximal
//!   touch, vestibular and interoceptive channels, all population coded
//! - **Body**: energy and hydration drives with time and action costs
//! - **Resources**: food and water regrow a fixed number of ticks after use
//! - **Reflex policy**: a heuristic action proposal with an urgency
//! - **Reproducible**: seeded random number generation
//! - **Configurable**: YAML configuration files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fworld::{Config, FWorld};
//!
//! let mut world = FWorld::new_with_seed(Config::default(), 7).unwrap();
//!
//! // the outer loop picks an action, then promotes the rendered senses
//! let (idx, urgency) = world.act_gen();
//! world.act_index(idx);
//! world.step();
//!
//! let depth = world.observe("Depth").unwrap();
//! println!("depth {:?}, urgency {}", depth.shape(), urgency);
//! ```
//!
//! ## Saved worlds
//!
//! ```rust,no_run
//! use fworld::{Config, FWorld};
//!
//! let world = FWorld::new_with_seed(Config::default(), 7).unwrap();
//! world.save_snapshot("world.bin").unwrap();
//!
//! let mut config = Config::default();
//! config.world.snapshot = Some("world.bin".into());
//! let same_layout = FWorld::new_with_seed(config, 8).unwrap();
//! ```

pub mod body;
pub mod config;
pub mod counters;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod patterns;
pub mod policy;
pub mod senses;
pub mod snapshot;
pub mod stats;
pub mod world;

// Re-export main types
pub use body::{Action, Drive, Drives};
pub use config::{Config, ConfigError};
pub use counters::TimeScale;
pub use senses::Sense;
pub use world::FWorld;

use rayon::prelude::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run `worlds` independently seeded worlds in parallel, each for `ticks`
/// reflex-driven steps
pub fn benchmark(ticks: u64, worlds: usize, config: &Config) -> Result<BenchmarkResult, ConfigError> {
    use std::time::Instant;

    let start = Instant::now();
    let results: Vec<stats::Stats> = (0..worlds as u64)
        .into_par_iter()
        .map(|seed| -> Result<stats::Stats, ConfigError> {
            let mut world = FWorld::new_with_seed(config.clone(), seed)?;
            world.run(ticks);
            Ok(world.stats)
        })
        .collect::<Result<_, ConfigError>>()?;
    let elapsed = start.elapsed().as_secs_f64();

    let n = results.len().max(1) as f64;
    let total_ticks = ticks * worlds as u64;
    Ok(BenchmarkResult {
        ticks,
        worlds,
        elapsed_secs: elapsed,
        ticks_per_second: total_ticks as f64 / elapsed.max(f64::EPSILON),
        mean_intake: results.iter().map(|s| s.intake_rate() as f64).sum::<f64>() / n,
        mean_bumps: results.iter().map(|s| s.bumps as f64).sum::<f64>() / n,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub worlds: usize,
    pub elapsed_secs: f64,
    /// Summed over all worlds
    pub ticks_per_second: f64,
    /// Consumptions per 1000 ticks, averaged over worlds
    pub mean_intake: f64,
    pub mean_bumps: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {} x {} worlds", self.ticks, self.worlds)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        writeln!(f, "Intake: {:.2} per 1000 ticks", self.mean_intake)?;
        writeln!(f, "Bumps: {:.1}", self.mean_bumps)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.world.width = 30;
        config.world.height = 30;
        config.world.n_food = 20;
        config.world.n_water = 20;
        config.world.n_lines = 5;
        config
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let mut world = FWorld::new_with_seed(small_config(), 3).unwrap();
        world.run(100);
        assert_eq!(world.stats.tick, 100);
        assert_eq!(world.counter(TimeScale::Trial).0, 100 % world.config().schedule.trials_per_epoch);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(50, 3, &small_config()).unwrap();
        assert_eq!(result.ticks, 50);
        assert_eq!(result.worlds, 3);
        assert!(result.ticks_per_second > 0.0);
    }

    #[test]
    fn test_benchmark_rejects_bad_config() {
        let mut config = small_config();
        config.agent.pop_size = 1;
        assert!(benchmark(10, 2, &config).is_err());
    }
}
