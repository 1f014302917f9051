//! Statistics tracking for the forager.

use crate::body::{Drive, Drives};
use serde::{Deserialize, Serialize};

/// Running totals for one world
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Ticks elapsed since the world was built
    pub tick: u64,
    /// Episodes started after the first
    pub episodes: u64,
    /// Successful Eat actions
    pub eats: u64,
    /// Successful Drink actions
    pub drinks: u64,
    /// Moves blocked by a barrier
    pub bumps: u64,
    /// Moves that changed position
    pub moves: u64,
    pub turns: u64,
    /// Cells restored by the event scheduler
    pub refreshes: u64,
    /// Current energy
    pub energy: f32,
    /// Current hydration
    pub hydra: f32,
    /// Mean energy over all recorded ticks
    pub energy_mean: f32,
    /// Mean hydration over all recorded ticks
    pub hydra_mean: f32,
    /// Food cells currently on the grid
    pub food_count: usize,
    /// Water cells currently on the grid
    pub water_count: usize,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick's drive levels into the running means
    pub fn record_tick(&mut self, drives: &Drives) {
        self.tick += 1;
        self.energy = drives.get(Drive::Energy);
        self.hydra = drives.get(Drive::Hydra);
        let n = self.tick as f32;
        self.energy_mean += (self.energy - self.energy_mean) / n;
        self.hydra_mean += (self.hydra - self.hydra_mean) / n;
    }

    /// Consumptions per 1000 ticks
    pub fn intake_rate(&self) -> f32 {
        if self.tick == 0 {
            return 0.0;
        }
        (self.eats + self.drinks) as f32 * 1000.0 / self.tick as f32
    }

    /// Save stats to JSON file
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:7} | Ep:{:3} | E:{:.2} H:{:.2} | Eat:{:4} Drk:{:4} | Bump:{:5} Mv:{:6} Trn:{:6} | Food:{:4} Water:{:4}",
            self.tick,
            self.episodes,
            self.energy,
            self.hydra,
            self.eats,
            self.drinks,
            self.bumps,
            self.moves,
            self.turns,
            self.food_count,
            self.water_count
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval in ticks
    pub interval: u64,
}

impl StatsHistory {
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    /// Record a snapshot if `stats.tick` falls on the interval
    pub fn maybe_record(&mut self, stats: &Stats) -> bool {
        if self.interval > 0 && stats.tick % self.interval == 0 {
            self.snapshots.push(stats.clone());
            return true;
        }
        false
    }

    pub fn energy_series(&self) -> Vec<(u64, f32)> {
        self.snapshots.iter().map(|s| (s.tick, s.energy)).collect()
    }

    pub fn hydra_series(&self) -> Vec<(u64, f32)> {
        self.snapshots.iter().map(|s| (s.tick, s.hydra)).collect()
    }

    /// Total consumptions over time
    pub fn intake_series(&self) -> Vec<(u64, u64)> {
        self.snapshots
            .iter()
            .map(|s| (s.tick, s.eats + s.drinks))
            .collect()
    }

    /// Save history to file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
