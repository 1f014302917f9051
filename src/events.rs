//! Consumption events and resource regrowth.

use crate::body::Action;
use crate::geometry::{Vec2, Vec2i};
use crate::grid::{MatCode, MaterialGrid};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot taken when a consumable is used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Tick at which the event happened
    pub tick: u64,
    /// Agent grid cell
    pub pos: Vec2i,
    /// Agent float position
    pub pos_f: Vec2,
    /// Agent heading
    pub angle: i32,
    pub action: Action,
    /// Material consumed
    pub mat: MatCode,
    /// Where the consumed material was
    pub mat_pos: Vec2i,
}

/// Pending regrowth plus the permanent event log
#[derive(Debug, Clone, Default)]
pub struct EventScheduler {
    /// Events awaiting regrowth, keyed by creation tick
    pending: HashMap<u64, Event>,
    /// Every event ever recorded
    history: Vec<Event>,
    /// Regrowth delay per material
    delays: HashMap<MatCode, u64>,
}

impl EventScheduler {
    /// Scheduler with the given per-material delays. Materials without a
    /// delay never regrow.
    pub fn new(delays: HashMap<MatCode, u64>) -> Self {
        Self {
            pending: HashMap::new(),
            history: Vec::new(),
            delays,
        }
    }

    /// Record a consumption
    pub fn record(&mut self, event: Event) {
        log::debug!(
            "event at tick {}: {} mat {} at ({}, {})",
            event.tick,
            event.action,
            event.mat,
            event.mat_pos.x,
            event.mat_pos.y
        );
        self.pending.insert(event.tick, event);
        self.history.push(event);
    }

    /// Restore every pending event whose delay has elapsed.
    ///
    /// An event whose cell is `occupied` stays pending until the cell is
    /// free. Returns the number restored. Restoration order is unspecified.
    pub fn refresh(&mut self, tick: u64, grid: &mut MaterialGrid, occupied: Option<Vec2i>) -> usize {
        let delays = &self.delays;
        let before = self.pending.len();
        self.pending.retain(|&created, ev| {
            let Some(&delay) = delays.get(&ev.mat) else {
                return true;
            };
            if occupied == Some(ev.mat_pos) {
                return true;
            }
            if tick.saturating_sub(created) >= delay {
                grid.set(ev.mat_pos, ev.mat);
                log::debug!(
                    "refreshed mat {} at ({}, {}) after {} ticks",
                    ev.mat,
                    ev.mat_pos.x,
                    ev.mat_pos.y,
                    tick - created
                );
                false
            } else {
                true
            }
        });
        before - self.pending.len()
    }

    /// Restore every pending event now, regardless of delay. History is kept.
    pub fn restore_all(&mut self, grid: &mut MaterialGrid) -> usize {
        let n = self.pending.len();
        for (_, ev) in self.pending.drain() {
            grid.set(ev.mat_pos, ev.mat);
        }
        n
    }

    /// Drop all pending regrowth and history
    pub fn clear(&mut self) {
        self.pending.clear();
        self.history.clear();
    }

    pub fn pending(&self) -> &HashMap<u64, Event> {
        &self.pending
    }

    pub fn history(&self) -> &[Event] {
        &self.history
    }

    pub fn delay(&self, mat: MatCode) -> Option<u64> {
        self.delays.get(&mat).copied()
    }
}
