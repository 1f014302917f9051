//! Nested tick counters: Run > Epoch > Trial, plus Tick, Event, Scene, Episode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time scales tracked by the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScale {
    Run,
    Epoch,
    Trial,
    Tick,
    Event,
    Scene,
    Episode,
}

impl TimeScale {
    pub const ALL: [TimeScale; 7] = [
        TimeScale::Run,
        TimeScale::Epoch,
        TimeScale::Trial,
        TimeScale::Tick,
        TimeScale::Event,
        TimeScale::Scene,
        TimeScale::Episode,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TimeScale::Run => "Run",
            TimeScale::Epoch => "Epoch",
            TimeScale::Trial => "Trial",
            TimeScale::Tick => "Tick",
            TimeScale::Event => "Event",
            TimeScale::Scene => "Scene",
            TimeScale::Episode => "Episode",
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeScale::ALL
            .iter()
            .find(|t| t.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown time scale: {}", s))
    }
}

/// A counter with previous value, change flag and optional wrap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub cur: u64,
    pub prv: u64,
    pub chg: bool,
    /// Wraps to 0 on reaching this value; 0 never wraps
    pub max: u64,
}

impl Counter {
    pub fn new(max: u64) -> Self {
        Self {
            max,
            ..Self::default()
        }
    }

    /// Increment; returns true if the counter wrapped to 0
    pub fn incr(&mut self) -> bool {
        self.prv = self.cur;
        self.cur += 1;
        self.chg = true;
        if self.max > 0 && self.cur >= self.max {
            self.cur = 0;
            return true;
        }
        false
    }

    /// Mark as unchanged this step
    #[inline]
    pub fn same(&mut self) {
        self.chg = false;
    }

    /// Back to zero, keeping the wrap limit
    pub fn init(&mut self) {
        self.prv = self.cur;
        self.cur = 0;
        self.chg = false;
    }

    pub fn query(&self) -> (u64, u64, bool) {
        (self.cur, self.prv, self.chg)
    }
}

/// All counters owned by a world
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub run: Counter,
    pub epoch: Counter,
    pub trial: Counter,
    pub tick: Counter,
    pub event: Counter,
    pub scene: Counter,
    pub episode: Counter,
}

impl Counters {
    pub fn new(trials_per_epoch: u64, epochs_per_run: u64) -> Self {
        Self {
            trial: Counter::new(trials_per_epoch),
            epoch: Counter::new(epochs_per_run),
            ..Self::default()
        }
    }

    pub fn get(&self, scale: TimeScale) -> &Counter {
        match scale {
            TimeScale::Run => &self.run,
            TimeScale::Epoch => &self.epoch,
            TimeScale::Trial => &self.trial,
            TimeScale::Tick => &self.tick,
            TimeScale::Event => &self.event,
            TimeScale::Scene => &self.scene,
            TimeScale::Episode => &self.episode,
        }
    }

    /// Clear the change flags of the per-tick counters
    pub fn begin_tick(&mut self) {
        self.tick.same();
        self.event.same();
        self.scene.same();
        self.episode.same();
    }

    /// Advance one trial, carrying into epoch and run on wrap
    pub fn advance_trial(&mut self) {
        self.epoch.same();
        self.run.same();
        if self.trial.incr() && self.epoch.incr() {
            self.run.incr();
        }
    }

    /// Zero everything except the run counter
    pub fn init(&mut self) {
        self.epoch.init();
        self.trial.init();
        self.tick.init();
        self.event.init();
        self.scene.init();
        self.episode.init();
    }
}
