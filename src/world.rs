//! World simulation engine: one agent foraging on a material grid.

use crate::body::{Action, Drive, Drives};
use crate::config::{Config, ConfigError, WorldConfig};
use crate::counters::{Counters, TimeScale};
use crate::events::{Event, EventScheduler};
use crate::geometry::{angle_mod, heading_vector, next_grid_point, Vec2, Vec2i};
use crate::grid::{GridView, MatCode, MaterialGrid, Materials, EMPTY};
use crate::patterns::Patterns;
use crate::policy::{reflex_action, PolicyInput, Targets};
use crate::senses::{Perception, RenderInput, Sense, SenseBuffers};
use crate::snapshot::WorldSnapshot;
use crate::stats::{Stats, StatsHistory};
use ndarray::ArrayD;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::path::Path;

/// Codes of the consumables and their placeholders
#[derive(Debug, Clone, Copy)]
struct Resources {
    food: MatCode,
    water: MatCode,
    food_was: MatCode,
    water_was: MatCode,
}

impl Resources {
    fn resolve(materials: &Materials) -> Result<Self, ConfigError> {
        let code = |name: &str| {
            materials
                .code(name)
                .ok_or_else(|| ConfigError::Invalid(format!("missing material {}", name)))
        };
        Ok(Self {
            food: code("Food")?,
            water: code("Water")?,
            food_was: code("FoodWas")?,
            water_was: code("WaterWas")?,
        })
    }
}

/// The flat world
pub struct FWorld {
    // Configuration, fixed once the sense buffers are shaped
    config: Config,
    materials: Materials,
    patterns: Patterns,
    /// Active actions, in configured order
    actions: Vec<Action>,
    resources: Resources,

    // Environment
    grid: MaterialGrid,
    scheduler: EventScheduler,

    // Agent
    pos_f: Vec2,
    pos: Vec2i,
    angle: i32,
    rot_ang: i32,
    last_action: Action,
    drives: Drives,

    // Senses
    perception: Perception,
    buffers: SenseBuffers,

    // Time
    counters: Counters,

    // Statistics
    pub stats: Stats,
    pub stats_history: StatsHistory,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl FWorld {
    /// Create a new world with a random seed
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility.
    ///
    /// The grid comes from `world.snapshot` when set, otherwise it is
    /// generated from the seed.
    pub fn new_with_seed(mut config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let materials = Materials::new(&config.world.materials, config.world.barrier_idx);
        let patterns = build_patterns(&config, &materials, &mut rng)?;

        let grid = match config.world.snapshot.clone() {
            Some(path) => {
                let grid = WorldSnapshot::load(&path)?.to_grid(&materials)?;
                log::info!(
                    "Loaded {}x{} world from {:?}",
                    grid.width(),
                    grid.height(),
                    path
                );
                config.world.width = grid.width();
                config.world.height = grid.height();
                grid
            }
            None => generate_grid(&config.world, &materials, &mut rng),
        };

        Self::assemble(config, materials, patterns, grid, rng, seed)
    }

    /// Create a world around an existing grid; the configured size is replaced
    /// by the grid's.
    pub fn with_grid(mut config: Config, grid: MaterialGrid, seed: u64) -> Result<Self, ConfigError> {
        config.world.width = grid.width();
        config.world.height = grid.height();
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let materials = Materials::new(&config.world.materials, config.world.barrier_idx);
        let patterns = build_patterns(&config, &materials, &mut rng)?;
        Self::assemble(config, materials, patterns, grid, rng, seed)
    }

    fn assemble(
        config: Config,
        materials: Materials,
        patterns: Patterns,
        grid: MaterialGrid,
        rng: ChaCha8Rng,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let resources = Resources::resolve(&materials)?;
        let actions = config
            .agent
            .actions
            .iter()
            .map(|n| n.parse::<Action>().map_err(ConfigError::Invalid))
            .collect::<Result<Vec<_>, _>>()?;
        let delays = HashMap::from([
            (resources.food, config.refresh.food_refresh),
            (resources.water, config.refresh.water_refresh),
        ]);

        let mut world = Self {
            materials,
            patterns,
            actions,
            resources,
            grid,
            scheduler: EventScheduler::new(delays),
            pos_f: Vec2::default(),
            pos: Vec2i::default(),
            angle: 0,
            rot_ang: 0,
            last_action: Action::Stay,
            drives: Drives::new(config.agent.init_energy, config.agent.init_hydra),
            perception: Perception::default(),
            buffers: SenseBuffers::new(&config),
            counters: Counters::new(
                config.schedule.trials_per_epoch,
                config.schedule.epochs_per_run,
            ),
            stats: Stats::new(),
            stats_history: StatsHistory::new(config.logging.stats_interval),
            config,
            rng,
            seed,
        };
        world.init();

        log::info!(
            "World ready: {}x{}, {} food, {} water, seed {}",
            world.grid.width(),
            world.grid.height(),
            world.grid.count(world.resources.food),
            world.grid.count(world.resources.water),
            seed
        );
        Ok(world)
    }

    /// Start afresh: consumed resources restored, drives reset, agent placed at
    /// a random empty cell, counters below Run zeroed.
    pub fn init(&mut self) {
        self.scheduler.restore_all(&mut self.grid);
        self.drives = Drives::new(self.config.agent.init_energy, self.config.agent.init_hydra);
        self.counters.init();
        self.last_action = Action::Stay;
        self.rot_ang = 0;

        let empties = self.grid.positions_of(EMPTY);
        let pos = match empties.choose(&mut self.rng) {
            Some(&p) => p,
            None => {
                log::warn!("no empty cell to place the agent, using the grid center");
                Vec2i::new(self.grid.width() as i32 / 2, self.grid.height() as i32 / 2)
            }
        };
        let inc = self.config.agent.angle_inc;
        let angle = self.rng.gen_range(0..360 / inc) * inc;
        self.set_pose(pos, angle);
    }

    /// Move the agent to `pos` facing `angle`. Refuses barriers and cells
    /// outside the world.
    pub fn place_agent(&mut self, pos: Vec2i, angle: i32) -> bool {
        match self.grid.get(pos) {
            Some(mat) if !self.materials.is_barrier(mat) => {
                self.set_pose(pos, angle_mod(angle));
                true
            }
            _ => false,
        }
    }

    fn set_pose(&mut self, pos: Vec2i, angle: i32) {
        self.pos = pos;
        self.pos_f = pos.to_f32();
        self.angle = angle;
        self.refresh_senses();
    }

    /// Execute a named action for this tick.
    ///
    /// Any action name runs as given, active or not. Unknown names are
    /// reported and replaced by a random active action.
    pub fn act(&mut self, name: &str) {
        let action = match name.parse::<Action>() {
            Ok(a) => {
                if !self.actions.contains(&a) {
                    log::debug!("{} is not an active action, taking it anyway", a);
                }
                a
            }
            Err(_) => {
                let a = self.random_action();
                log::warn!("unknown action {}, taking {} instead", name, a);
                a
            }
        };
        self.take_action(action);
    }

    /// Execute an action index into [`FWorld::actions`]
    pub fn act_index(&mut self, idx: usize) {
        match self.actions.get(idx) {
            Some(&a) => self.take_action(a),
            None => {
                let a = self.random_action();
                log::warn!("action index {} out of range, taking {} instead", idx, a);
                self.take_action(a);
            }
        }
    }

    fn random_action(&mut self) -> Action {
        // validation guarantees at least one active action
        self.actions
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Action::Stay)
    }

    /// One tick: time cost, action, resource refresh, rescan, render next
    pub fn take_action(&mut self, action: Action) {
        self.counters.begin_tick();
        self.counters.tick.incr();
        self.counters.event.incr();
        self.drives.apply_time(self.config.body.time_cost);
        self.apply_action(action);

        let restored = self.scheduler.refresh(
            self.counters.tick.cur,
            &mut self.grid,
            Some(self.pos),
        );
        self.stats.refreshes += restored as u64;

        self.stats.record_tick(&self.drives);
        if self.stats.tick % self.stats_history.interval == 0 {
            self.stats.food_count = self.grid.count(self.resources.food);
            self.stats.water_count = self.grid.count(self.resources.water);
        }
        self.stats_history.maybe_record(&self.stats);

        if self.config.schedule.reset_on_depletion && self.drives.depleted() {
            self.new_episode();
        }

        self.refresh_senses();
    }

    fn apply_action(&mut self, action: Action) {
        let body = self.config.body.clone();
        self.rot_ang = 0;
        match action {
            Action::Stay => {}
            Action::Left | Action::Right => {
                let inc = self.config.agent.angle_inc;
                let delta = if action == Action::Left { inc } else { -inc };
                self.angle = angle_mod(self.angle + delta);
                self.rot_ang = delta;
                self.drives.charge(body.rot_cost);
                self.stats.turns += 1;
            }
            Action::Forward | Action::Backward => {
                self.drives.charge(body.move_cost);
                let mut step = heading_vector(self.angle);
                if action == Action::Backward {
                    step = step.neg();
                }
                let (next, cell) = next_grid_point(self.pos_f, step);
                let blocked = self
                    .grid
                    .get(cell)
                    .map_or(true, |m| self.materials.is_barrier(m));
                if blocked {
                    self.drives.set(Drive::BumpPain, 1.0);
                    self.drives.charge(body.bump_cost);
                    self.stats.bumps += 1;
                } else {
                    self.pos_f = next;
                    self.pos = cell;
                    self.stats.moves += 1;
                }
            }
            Action::Eat => {
                let r = self.resources;
                if self.consume(action, r.food, r.food_was) {
                    self.drives.set(Drive::FoodRew, 1.0);
                    self.drives.inc(Drive::Energy, body.eat_value);
                    self.drives.inc(Drive::Hydra, -body.eat_cost);
                    self.stats.eats += 1;
                }
            }
            Action::Drink => {
                let r = self.resources;
                if self.consume(action, r.water, r.water_was) {
                    self.drives.set(Drive::WaterRew, 1.0);
                    self.drives.inc(Drive::Hydra, body.drink_value);
                    self.drives.inc(Drive::Energy, -body.drink_cost);
                    self.stats.drinks += 1;
                }
            }
        }
        self.last_action = action;
    }

    /// Replace `mat` in the front cell with `was` and schedule its return
    fn consume(&mut self, action: Action, mat: MatCode, was: MatCode) -> bool {
        let (_, front) = next_grid_point(self.pos_f, heading_vector(self.angle));
        if self.grid.get(front) != Some(mat) {
            return false;
        }
        self.grid.set(front, was);
        self.scheduler.record(Event {
            tick: self.counters.tick.cur,
            pos: self.pos,
            pos_f: self.pos_f,
            angle: self.angle,
            action,
            mat,
            mat_pos: front,
        });
        self.counters.scene.incr();
        true
    }

    fn new_episode(&mut self) {
        log::info!(
            "Drives depleted at tick {}, starting episode {}",
            self.counters.tick.cur,
            self.counters.episode.cur + 1
        );
        self.drives = Drives::new(self.config.agent.init_energy, self.config.agent.init_hydra);
        self.counters.episode.incr();
        self.stats.episodes += 1;
    }

    /// Rescan from the current pose and render the next generation
    pub fn refresh_senses(&mut self) {
        self.perception.scan(
            &self.grid,
            &self.materials,
            self.pos_f,
            self.angle,
            &self.config.agent,
        );
        self.buffers.render(&RenderInput {
            config: &self.config,
            materials: &self.materials,
            patterns: &self.patterns,
            perception: &self.perception,
            drives: &self.drives,
            angle: self.angle,
            rot_ang: self.rot_ang,
            action: self.last_action,
        });
    }

    /// Reflex proposal: index into the active actions and its urgency
    pub fn act_gen(&mut self) -> (usize, f32) {
        let input = PolicyInput {
            perception: &self.perception,
            drives: &self.drives,
            materials: &self.materials,
            targets: Targets {
                food: self.resources.food,
                water: self.resources.water,
            },
            last_action: self.last_action,
        };
        let (action, urgency) = reflex_action(&input, &self.config.policy, &mut self.rng);
        match self.actions.iter().position(|&a| a == action) {
            Some(idx) => (idx, urgency),
            None => {
                log::debug!("reflex chose inactive action {}", action);
                (self.rng.gen_range(0..self.actions.len()), 0.0)
            }
        }
    }

    /// Promote the rendered generation and advance the trial counters
    pub fn step(&mut self) -> bool {
        self.buffers.promote();
        self.counters.advance_trial();
        true
    }

    /// Current-generation tensor for a sense name; `None` for unknown names
    /// and before the first [`FWorld::step`]
    pub fn observe(&self, name: &str) -> Option<&ArrayD<f32>> {
        name.parse::<Sense>()
            .ok()
            .and_then(|s| self.buffers.current(s))
    }

    pub fn observe_sense(&self, sense: Sense) -> Option<&ArrayD<f32>> {
        self.buffers.current(sense)
    }

    /// `(current, previous, changed)` for a time scale
    pub fn counter(&self, scale: TimeScale) -> (u64, u64, bool) {
        self.counters.get(scale).query()
    }

    /// Additive, clamped drive update by name
    pub fn inc_state(&mut self, name: &str, delta: f32) {
        self.drives.inc_state(name, delta);
    }

    /// Drive the agent with the reflex policy for `ticks` steps
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.policy_step();
        }
    }

    /// Run with a callback after each tick
    pub fn run_with_callback<F>(&mut self, ticks: u64, mut callback: F)
    where
        F: FnMut(&FWorld),
    {
        for _ in 0..ticks {
            self.policy_step();
            callback(self);
        }
    }

    fn policy_step(&mut self) {
        let (idx, _) = self.act_gen();
        self.act_index(idx);
        self.step();
    }

    /// Persist the grid
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        WorldSnapshot::capture(&self.grid, &self.materials).save(path)?;
        Ok(())
    }

    /// ASCII view with the agent drawn on top
    pub fn view(&self) -> GridView<'_> {
        GridView {
            grid: &self.grid,
            materials: &self.materials,
            agent: Some((self.pos, self.angle)),
        }
    }

    /// Configuration the world was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grid(&self) -> &MaterialGrid {
        &self.grid
    }

    /// Mutable grid; call [`FWorld::refresh_senses`] after editing near the agent
    pub fn grid_mut(&mut self) -> &mut MaterialGrid {
        &mut self.grid
    }

    pub fn materials(&self) -> &Materials {
        &self.materials
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn drives(&self) -> &Drives {
        &self.drives
    }

    pub fn perception(&self) -> &Perception {
        &self.perception
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn position(&self) -> Vec2i {
        self.pos
    }

    pub fn position_f(&self) -> Vec2 {
        self.pos_f
    }

    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn last_action(&self) -> Action {
        self.last_action
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Load the configured pattern dictionary or generate one from `rng`
fn build_patterns<R: Rng>(
    config: &Config,
    materials: &Materials,
    rng: &mut R,
) -> Result<Patterns, ConfigError> {
    let mut required = materials.names().to_vec();
    required.extend(config.agent.actions.iter().cloned());
    match &config.world.patterns {
        Some(path) => {
            let patterns = Patterns::load(path)?;
            patterns.validate(&required, config.world.pat_size)?;
            log::info!("Loaded {} patterns from {:?}", patterns.len(), path);
            Ok(patterns)
        }
        None => {
            let mut names = materials.names().to_vec();
            names.extend(Action::ALL.iter().map(|a| a.name().to_string()));
            Ok(Patterns::generate(
                &names,
                config.world.pat_size,
                config.world.pat_on,
                rng,
            ))
        }
    }
}

/// Walled room with random interior wall segments, food and water
pub fn generate_grid<R: Rng>(cfg: &WorldConfig, materials: &Materials, rng: &mut R) -> MaterialGrid {
    let mut grid = MaterialGrid::new(cfg.width, cfg.height);
    let wall = materials.barrier_idx;
    let (w, h) = (cfg.width as i32, cfg.height as i32);
    grid.rect(Vec2i::new(0, 0), Vec2i::new(w - 1, h - 1), wall);

    if w > 2 && h > 2 && cfg.max_line_len > 0 {
        for _ in 0..cfg.n_lines {
            let start = Vec2i::new(rng.gen_range(1..w - 1), rng.gen_range(1..h - 1));
            let dir = heading_vector(rng.gen_range(0..8) * 45);
            let len = rng.gen_range(1..=cfg.max_line_len) as f32;
            let end = Vec2i::new(
                (start.x as f32 + dir.x * len).round() as i32,
                (start.y as f32 + dir.y * len).round() as i32,
            );
            grid.line(start, end, wall);
        }
    }

    if let Some(food) = materials.code("Food") {
        grid.random_scatter(cfg.n_food, food, rng);
    }
    if let Some(water) = materials.code("Water") {
        grid.random_scatter(cfg.n_water, water, rng);
    }
    grid
}
