//! Reflex policy: a hand-tuned action proposal independent of any learned
//! network, with an urgency saying how strongly it should override one.

use crate::body::{Action, Drive, Drives};
use crate::config::PolicyConfig;
use crate::grid::{MatCode, Materials};
use crate::senses::{Perception, FRONT};
use rand::Rng;

/// Material codes the policy cares about
#[derive(Debug, Clone, Copy)]
pub struct Targets {
    pub food: MatCode,
    pub water: MatCode,
}

/// Everything the policy reads
pub struct PolicyInput<'a> {
    pub perception: &'a Perception,
    pub drives: &'a Drives,
    pub materials: &'a Materials,
    pub targets: Targets,
    pub last_action: Action,
}

/// Probability of choosing left given the two clearances
#[inline]
pub fn softmax_left(left: f32, right: f32, gain: f32) -> f32 {
    let d = (gain * (right - left)).clamp(-50.0, 50.0);
    1.0 / (1.0 + d.exp())
}

/// Mean normalized peripheral depth on each side (left = positive angles)
fn side_clearance(perception: &Perception) -> (f32, f32) {
    let logs = &perception.depth_logs;
    let n = logs.len();
    if n < 2 {
        return (1.0, 1.0);
    }
    let half = n / 2;
    let mean = |s: &[f32]| s.iter().sum::<f32>() / s.len() as f32;
    // the middle ray of an odd fan looks straight ahead and counts for neither side
    let right_start = if n % 2 == 1 { half + 1 } else { half };
    (mean(&logs[..half]), mean(&logs[right_start..]))
}

/// Continue a turn in progress, otherwise pick a side by clearance
fn choose_turn<R: Rng>(input: &PolicyInput<'_>, cfg: &PolicyConfig, rng: &mut R) -> Action {
    if input.last_action.is_turn() {
        return input.last_action;
    }
    let (left, right) = side_clearance(input.perception);
    if rng.gen::<f32>() < softmax_left(left, right, cfg.softmax_gain) {
        Action::Left
    } else {
        Action::Right
    }
}

fn random_turn<R: Rng>(rng: &mut R) -> Action {
    if rng.gen::<bool>() {
        Action::Left
    } else {
        Action::Right
    }
}

/// Propose an action and its urgency in `[0, 1]`
pub fn reflex_action<R: Rng>(
    input: &PolicyInput<'_>,
    cfg: &PolicyConfig,
    rng: &mut R,
) -> (Action, f32) {
    let p = input.perception;
    let front = p.prox_mats[FRONT];
    let energy = input.drives.get(Drive::Energy);
    let hydra = input.drives.get(Drive::Hydra);

    // 1. facing a barrier
    if input.materials.is_barrier(front) {
        return (choose_turn(input, cfg, rng), cfg.wall_urgency);
    }

    // 2. wanted resource right in front
    if front == input.targets.food && energy < cfg.satiety {
        return (Action::Eat, cfg.eat_urgency);
    }
    if front == input.targets.water && hydra < cfg.satiety {
        return (Action::Drink, cfg.eat_urgency);
    }

    // 3. resource in the fovea, weighted by need
    let mut food_w = 0.0;
    let mut water_w = 0.0;
    for (&mat, &depth) in p.fov_mats.iter().zip(&p.fov_depth_logs) {
        if mat == input.targets.food {
            food_w += 1.0 - depth;
        } else if mat == input.targets.water {
            water_w += 1.0 - depth;
        }
    }
    food_w *= 1.0 - energy;
    water_w *= 1.0 - hydra;

    if food_w > 0.0 || water_w > 0.0 {
        let target = if food_w >= water_w {
            input.targets.food
        } else {
            input.targets.water
        };
        // nearest ray showing the target
        let mut nearest = (usize::MAX, f32::MAX);
        for (i, (&mat, &depth)) in p.fov_mats.iter().zip(&p.fov_depth_logs).enumerate() {
            if mat == target && depth < nearest.1 {
                nearest = (i, depth);
            }
        }
        if nearest.1 > cfg.far_depth {
            let act = if rng.gen::<f32>() < cfg.explore_turn_prob {
                random_turn(rng)
            } else {
                Action::Forward
            };
            return (act, 0.0);
        }
        let center = p.fov_mats.len() / 2;
        let act = match nearest.0.cmp(&center) {
            std::cmp::Ordering::Equal => Action::Forward,
            // rays run from left (positive angles) to right
            std::cmp::Ordering::Less => Action::Left,
            std::cmp::Ordering::Greater => Action::Right,
        };
        return (act, cfg.close_urgency);
    }

    // 4. something other than a wall is about to be in the way
    let closest = p
        .fov_mats
        .iter()
        .zip(&p.fov_depth_logs)
        .filter(|(&m, _)| m != crate::grid::EMPTY && !input.materials.is_barrier(m))
        .map(|(_, &d)| d)
        .fold(f32::MAX, f32::min);
    if closest < cfg.near_depth {
        return (choose_turn(input, cfg, rng), cfg.obstacle_urgency);
    }

    // 5. nothing salient
    let r = rng.gen::<f32>();
    let act = if r < cfg.repeat_prob && !input.last_action.is_consume() {
        input.last_action
    } else if r < cfg.repeat_prob + cfg.turn_prob {
        random_turn(rng)
    } else {
        Action::Forward
    };
    (act, 0.0)
}
