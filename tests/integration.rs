//! Integration tests for FWORLD

use fworld::geometry::Vec2i;
use fworld::grid::MaterialGrid;
use fworld::snapshot::WorldSnapshot;
use fworld::{Action, Config, Drive, FWorld, Sense, TimeScale};

const WALL: u8 = 1;
const FOOD: u8 = 2;
const WATER: u8 = 3;
const FOOD_WAS: u8 = 4;
const WATER_WAS: u8 = 5;

/// Walled room with the agent at (5, 5) facing east; Stay is an active action
fn room(mut config: Config, setup: impl FnOnce(&mut MaterialGrid)) -> FWorld {
    config.agent.actions.push("Stay".to_string());
    let mut grid = MaterialGrid::new(15, 15);
    grid.rect(Vec2i::new(0, 0), Vec2i::new(14, 14), WALL);
    setup(&mut grid);
    let mut world = FWorld::with_grid(config, grid, 1234).unwrap();
    assert!(world.place_agent(Vec2i::new(5, 5), 0));
    world
}

#[test]
fn test_full_simulation_cycle() {
    let mut config = Config::default();
    config.world.width = 40;
    config.world.height = 40;

    let mut world = FWorld::new_with_seed(config, 12345).unwrap();
    world.run(2000);

    assert_eq!(world.stats.tick, 2000);
    let pos = world.position();
    let cell = world.grid().get(pos).expect("agent inside the world");
    assert!(!world.materials().is_barrier(cell));
    for drive in Drive::ALL {
        let v = world.drives().get(drive);
        assert!((0.0..=1.0).contains(&v), "{:?} = {}", drive, v);
    }
}

#[test]
fn test_eat_then_refresh_after_delay() {
    let mut config = Config::default();
    config.refresh.food_refresh = 5;
    let mut world = room(config, |g| g.set(Vec2i::new(6, 5), FOOD));
    world.inc_state("Energy", -0.4);

    world.act("Eat");
    world.step();
    assert_eq!(world.drives().get(Drive::FoodRew), 1.0);
    assert_eq!(world.grid().get(Vec2i::new(6, 5)), Some(FOOD_WAS));
    assert_eq!(world.scheduler().pending().len(), 1);

    for _ in 0..4 {
        world.act("Stay");
        world.step();
        assert_eq!(world.last_action(), Action::Stay);
        assert_eq!(world.grid().get(Vec2i::new(6, 5)), Some(FOOD_WAS));
    }
    world.act("Stay");
    world.step();
    assert_eq!(world.grid().get(Vec2i::new(6, 5)), Some(FOOD));
    assert!(world.scheduler().pending().is_empty());
    assert_eq!(world.scheduler().history().len(), 1);
    assert_eq!(world.stats.refreshes, 1);
    assert_eq!(world.position(), Vec2i::new(5, 5));
    assert_eq!(world.counter(TimeScale::Scene), (1, 0, false));
}

#[test]
fn test_eaten_cell_refreshes_after_agent_leaves() {
    let mut config = Config::default();
    config.refresh.food_refresh = 3;
    let mut world = room(config, |g| g.set(Vec2i::new(6, 5), FOOD));

    world.act("Eat");
    world.act("Forward");
    for _ in 0..6 {
        world.act("Stay");
    }
    assert_eq!(world.position(), Vec2i::new(6, 5));
    assert_eq!(world.grid().get(Vec2i::new(6, 5)), Some(FOOD_WAS));

    world.act("Forward");
    assert_eq!(world.position(), Vec2i::new(7, 5));
    assert_eq!(world.grid().get(Vec2i::new(6, 5)), Some(FOOD));
}

#[test]
fn test_drink_uses_water_delay() {
    let mut config = Config::default();
    config.refresh.water_refresh = 3;
    let mut world = room(config, |g| g.set(Vec2i::new(6, 5), WATER));
    world.inc_state("Hydra", -0.5);

    let energy_before = world.drives().get(Drive::Energy);
    world.act("Drink");
    assert_eq!(world.drives().get(Drive::WaterRew), 1.0);
    assert!(world.drives().get(Drive::Energy) < energy_before);
    assert_eq!(world.grid().get(Vec2i::new(6, 5)), Some(WATER_WAS));

    for _ in 0..3 {
        world.act("Stay");
    }
    assert_eq!(world.grid().get(Vec2i::new(6, 5)), Some(WATER));
}

#[test]
fn test_observe_is_stable_between_steps() {
    let mut world = room(Config::default(), |_| {});
    world.act("Forward");
    world.step();

    let first: Vec<_> = Sense::ALL
        .iter()
        .map(|s| world.observe(s.name()).cloned())
        .collect();
    let second: Vec<_> = Sense::ALL
        .iter()
        .map(|s| world.observe(s.name()).cloned())
        .collect();
    assert_eq!(first, second);

    // acting renders "next" only; what the consumer sees is unchanged
    world.act("Left");
    let third: Vec<_> = Sense::ALL
        .iter()
        .map(|s| world.observe(s.name()).cloned())
        .collect();
    assert_eq!(first, third);

    world.step();
    assert_ne!(world.observe("Action").cloned(), first[6]);
}

#[test]
fn test_wall_in_front_repeats_turn() {
    let mut world = room(Config::default(), |g| {
        g.line(Vec2i::new(6, 0), Vec2i::new(6, 14), WALL);
    });
    world.act("Left");
    world.step();

    let left = world.actions().iter().position(|a| a.name() == "Left").unwrap();
    let first = world.act_gen();
    let second = world.act_gen();
    assert_eq!(first.0, left);
    assert_eq!(first, second);
    assert_eq!(first.1, world.config().policy.wall_urgency);
}

#[test]
fn test_proximal_sense_reports_wall() {
    let mut world = room(Config::default(), |g| g.set(Vec2i::new(6, 5), WALL));
    world.act("Stay");
    world.step();
    let prox = world.observe("ProxSoma").unwrap();
    assert_eq!(prox[[0, 0]], 1.0);
    assert_eq!(prox[[1, 0]], 0.0);
}

#[test]
fn test_agent_at_edge_sees_far() {
    // open grid, no border walls
    let grid = MaterialGrid::new(10, 10);
    let mut world = FWorld::with_grid(Config::default(), grid, 5).unwrap();
    assert!(world.place_agent(Vec2i::new(0, 5), 180));
    let p = world.perception();
    let center = p.depths.len() / 2;
    assert_eq!(p.depths[center], -1.0);
    assert_eq!(p.depth_logs[center], 1.0);
    // the world edge blocks like a wall
    assert!(world.materials().is_barrier(p.prox_mats[fworld::senses::FRONT]));
    world.act("Forward");
    assert_eq!(world.position(), Vec2i::new(0, 5));
    assert_eq!(world.drives().get(Drive::BumpPain), 1.0);
}

#[test]
fn test_drives_bounded_under_inc_state() {
    let mut world = room(Config::default(), |_| {});
    let deltas = [0.7, -2.0, 0.3, 5.0, -0.1, -0.9, 1.5];
    for (i, d) in deltas.iter().cycle().take(200).enumerate() {
        let drive = Drive::ALL[i % Drive::ALL.len()];
        world.inc_state(drive.name(), *d);
        for dr in Drive::ALL {
            assert!((0.0..=1.0).contains(&world.drives().get(dr)));
        }
    }
}

#[test]
fn test_counters_nest() {
    let mut config = Config::default();
    config.schedule.trials_per_epoch = 3;
    config.schedule.epochs_per_run = 2;
    let mut world = room(config, |_| {});
    for _ in 0..6 {
        world.act("Stay");
        world.step();
    }
    assert_eq!(world.counter(TimeScale::Tick).0, 6);
    assert_eq!(world.counter(TimeScale::Trial).0, 0);
    assert_eq!(world.counter(TimeScale::Epoch).0, 0);
    assert_eq!(world.counter(TimeScale::Run), (1, 0, true));
    assert_eq!(world.counter(TimeScale::Scene), (0, 0, false));
    assert_eq!(world.position(), Vec2i::new(5, 5));
}

#[test]
fn test_snapshot_roundtrip_through_config() {
    let mut config = Config::default();
    config.world.width = 25;
    config.world.height = 18;
    let world = FWorld::new_with_seed(config.clone(), 77).unwrap();

    let path = std::env::temp_dir().join(format!("fworld_it_{}.bin", std::process::id()));
    world.save_snapshot(&path).unwrap();

    let mut reload = Config::default();
    reload.world.snapshot = Some(path.clone());
    let restored = FWorld::new_with_seed(reload, 1).unwrap();
    let snap = WorldSnapshot::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(restored.grid().width(), 25);
    assert_eq!(restored.grid().height(), 18);
    assert_eq!(restored.grid().to_flat(), world.grid().to_flat());
    assert_eq!(snap.materials, world.materials().names().to_vec());
}

#[test]
fn test_missing_pattern_file_is_config_error() {
    let mut config = Config::default();
    config.world.patterns = Some("/nonexistent/fworld_patterns.json".into());
    assert!(FWorld::new_with_seed(config, 1).is_err());
}

#[test]
fn test_config_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("fworld_cfg_{}.yaml", std::process::id()));
    let mut config = Config::default();
    config.world.width = 33;
    config.save(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded.world.width, 33);
}
