//! Body state: interoceptive drives and the closed action set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every action the body can execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Stay,
    Left,
    Right,
    Forward,
    Backward,
    Eat,
    Drink,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Stay,
        Action::Left,
        Action::Right,
        Action::Forward,
        Action::Backward,
        Action::Eat,
        Action::Drink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Stay => "Stay",
            Action::Left => "Left",
            Action::Right => "Right",
            Action::Forward => "Forward",
            Action::Backward => "Backward",
            Action::Eat => "Eat",
            Action::Drink => "Drink",
        }
    }

    #[inline]
    pub fn is_turn(&self) -> bool {
        matches!(self, Action::Left | Action::Right)
    }

    #[inline]
    pub fn is_consume(&self) -> bool {
        matches!(self, Action::Eat | Action::Drink)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .find(|a| a.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown action: {}", s))
    }
}

/// Interoceptive drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Drive {
    Energy,
    Hydra,
    BumpPain,
    FoodRew,
    WaterRew,
}

impl Drive {
    pub const ALL: [Drive; 5] = [
        Drive::Energy,
        Drive::Hydra,
        Drive::BumpPain,
        Drive::FoodRew,
        Drive::WaterRew,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Drive::Energy => "Energy",
            Drive::Hydra => "Hydra",
            Drive::BumpPain => "BumpPain",
            Drive::FoodRew => "FoodRew",
            Drive::WaterRew => "WaterRew",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Drive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Drive::ALL
            .iter()
            .find(|d| d.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown drive: {}", s))
    }
}

/// Drive levels, each kept in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drives {
    levels: [f32; 5],
}

impl Drives {
    /// Fresh episode: energy and hydration set, step signals cleared
    pub fn new(energy: f32, hydra: f32) -> Self {
        let mut d = Self { levels: [0.0; 5] };
        d.set(Drive::Energy, energy);
        d.set(Drive::Hydra, hydra);
        d
    }

    #[inline]
    pub fn get(&self, drive: Drive) -> f32 {
        self.levels[drive.index()]
    }

    #[inline]
    pub fn set(&mut self, drive: Drive, value: f32) {
        self.levels[drive.index()] = value.clamp(0.0, 1.0);
    }

    /// Additive update clamped to `[0, 1]`
    #[inline]
    pub fn inc(&mut self, drive: Drive, delta: f32) {
        self.set(drive, self.get(drive) + delta);
    }

    /// Name-based [`Drives::inc`]; unknown names are reported and skipped
    pub fn inc_state(&mut self, name: &str, delta: f32) {
        match name.parse::<Drive>() {
            Ok(drive) => self.inc(drive, delta),
            Err(e) => log::warn!("inc_state: {}", e),
        }
    }

    /// Charge the per-tick cost and clear the step-local signals
    pub fn apply_time(&mut self, time_cost: f32) {
        self.inc(Drive::Energy, -time_cost);
        self.inc(Drive::Hydra, -time_cost);
        self.set(Drive::BumpPain, 0.0);
        self.set(Drive::FoodRew, 0.0);
        self.set(Drive::WaterRew, 0.0);
    }

    /// Charge the same cost to energy and hydration
    pub fn charge(&mut self, cost: f32) {
        self.inc(Drive::Energy, -cost);
        self.inc(Drive::Hydra, -cost);
    }

    /// Energy or hydration has run out
    pub fn depleted(&self) -> bool {
        self.get(Drive::Energy) <= 0.0 || self.get(Drive::Hydra) <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_action_names_roundtrip() {
        for a in Action::ALL {
            assert_eq!(a.name().parse::<Action>(), Ok(a));
        }
        assert!("Jump".parse::<Action>().is_err());
    }

    #[test]
    fn test_inc_clamps() {
        let mut d = Drives::new(0.5, 0.5);
        d.inc(Drive::Energy, 2.0);
        assert_eq!(d.get(Drive::Energy), 1.0);
        d.inc(Drive::Hydra, -3.0);
        assert_eq!(d.get(Drive::Hydra), 0.0);
        assert!(d.depleted());
    }

    #[test]
    fn test_random_increments_stay_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut d = Drives::new(0.3, 0.8);
        for _ in 0..10_000 {
            let drive = Drive::ALL[rng.gen_range(0..Drive::ALL.len())];
            d.inc(drive, rng.gen_range(-1.5..1.5));
            for dr in Drive::ALL {
                let v = d.get(dr);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_apply_time_resets_signals() {
        let mut d = Drives::new(1.0, 1.0);
        d.set(Drive::BumpPain, 1.0);
        d.set(Drive::FoodRew, 1.0);
        d.apply_time(0.01);
        assert_eq!(d.get(Drive::BumpPain), 0.0);
        assert_eq!(d.get(Drive::FoodRew), 0.0);
        assert!((d.get(Drive::Energy) - 0.99).abs() < 1e-6);
        assert!((d.get(Drive::Hydra) - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_inc_state_unknown_name_ignored() {
        let mut d = Drives::new(0.5, 0.5);
        let before = d;
        d.inc_state("Happiness", 0.3);
        assert_eq!(d, before);
        d.inc_state("Energy", 0.25);
        assert_eq!(d.get(Drive::Energy), 0.75);
    }
}
