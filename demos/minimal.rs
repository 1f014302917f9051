//! Minimal example of an FWORLD run

use fworld::{Config, Drive, FWorld, TimeScale};

fn main() {
    println!("FWORLD - Minimal Example");
    println!("========================\n");

    // Small world so the ASCII view fits a terminal
    let mut config = Config::default();
    config.world.width = 40;
    config.world.height = 20;
    config.world.n_food = 15;
    config.world.n_water = 15;
    config.world.n_lines = 6;

    // Create world with seeded RNG for reproducibility
    let mut world = match FWorld::new_with_seed(config, 42) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("cannot build world: {}", e);
            return;
        }
    };

    println!("Initial state:");
    print!("{}", world.view());
    println!();

    let ticks = 1000;
    println!("Running {} ticks...\n", ticks);

    for i in 0..ticks {
        let (idx, urgency) = world.act_gen();
        world.act_index(idx);
        world.step();

        // Print progress every 100 ticks
        if (i + 1) % 100 == 0 {
            println!(
                "Tick {:4} | {:8} (urgency {:.1}) | Energy: {:.2} | Hydra: {:.2} | Episode: {}",
                world.counter(TimeScale::Tick).0,
                world.last_action(),
                urgency,
                world.drives().get(Drive::Energy),
                world.drives().get(Drive::Hydra),
                world.counter(TimeScale::Episode).0,
            );
        }
    }

    println!("\nFinal state:");
    print!("{}", world.view());
    println!("{}", world.stats.summary());
}
