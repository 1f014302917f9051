//! Egocentric scans of the grid: peripheral depth, fovea and proximal cells.

use crate::config::AgentConfig;
use crate::geometry::{angle_mod, heading_vector, next_grid_point, Vec2, Vec2i};
use crate::grid::{MatCode, MaterialGrid, Materials, EMPTY};

/// Proximal directions, relative to heading
pub const FRONT: usize = 0;
pub const LEFT: usize = 1;
pub const RIGHT: usize = 2;
pub const BACK: usize = 3;

const PROX_OFFSETS: [i32; 4] = [0, 90, -90, 180];

/// Result of a single ray walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Euclidean distance to the hit, -1 if the ray left the world
    pub depth: f32,
    /// Material hit, `EMPTY` if none
    pub mat: MatCode,
}

impl RayHit {
    pub const MISS: RayHit = RayHit {
        depth: -1.0,
        mat: EMPTY,
    };
}

/// Walk from `origin` along `angle` until `stop` accepts a material or the
/// ray leaves the grid.
pub fn cast_ray<F>(grid: &MaterialGrid, origin: Vec2, angle: i32, stop: F) -> RayHit
where
    F: Fn(MatCode) -> bool,
{
    let step = heading_vector(angle_mod(angle));
    // every step advances one row or column, so this bounds the walk
    let max_steps = grid.width().max(grid.height()) + 1;
    let mut cur = origin;
    for _ in 0..max_steps {
        let (next, cell) = next_grid_point(cur, step);
        cur = next;
        let Some(mat) = grid.get(cell) else {
            break;
        };
        if stop(mat) {
            return RayHit {
                depth: cur.dist_to(origin),
                mat,
            };
        }
    }
    RayHit::MISS
}

/// Log-compressed depth in `[0, 1]`; misses read as maximally far
#[inline]
pub fn normalize_depth(depth: f32, max_log: f32) -> f32 {
    if depth < 0.0 {
        1.0
    } else {
        ((1.0 + depth).ln() / max_log).min(1.0)
    }
}

/// Per-step perception buffers, fully recomputed by [`Perception::scan`]
#[derive(Debug, Clone, Default)]
pub struct Perception {
    /// Raw peripheral depths, left (+fov/2) to right (-fov/2)
    pub depths: Vec<f32>,
    /// Normalized peripheral depths
    pub depth_logs: Vec<f32>,
    /// Peripheral materials
    pub view_mats: Vec<MatCode>,
    pub fov_depths: Vec<f32>,
    pub fov_depth_logs: Vec<f32>,
    pub fov_mats: Vec<MatCode>,
    /// Materials in front, left, right, back
    pub prox_mats: [MatCode; 4],
    /// Absolute grid coordinates of the proximal cells
    pub prox_pos: [Vec2i; 4],
}

impl Perception {
    /// Relative angles of the peripheral rays
    pub fn ray_angles(cfg: &AgentConfig) -> Vec<i32> {
        let half = cfg.fov / 2;
        (0..=cfg.fov / cfg.angle_inc)
            .map(|i| half - i * cfg.angle_inc)
            .collect()
    }

    /// Relative angles of the foveal rays
    pub fn fovea_angles(cfg: &AgentConfig) -> Vec<i32> {
        (-cfg.fovea_size..=cfg.fovea_size)
            .rev()
            .map(|i| i * cfg.fovea_angle_inc)
            .collect()
    }

    /// Rescan everything from the agent's position and heading
    pub fn scan(
        &mut self,
        grid: &MaterialGrid,
        mats: &Materials,
        pos: Vec2,
        angle: i32,
        cfg: &AgentConfig,
    ) {
        let max_log = (1.0 + grid.diagonal()).ln();
        self.scan_peripheral(grid, mats, pos, angle, cfg, max_log);
        self.scan_fovea(grid, pos, angle, cfg, max_log);
        self.scan_proximal(grid, mats, pos, angle);
    }

    fn scan_peripheral(
        &mut self,
        grid: &MaterialGrid,
        mats: &Materials,
        pos: Vec2,
        angle: i32,
        cfg: &AgentConfig,
        max_log: f32,
    ) {
        self.depths.clear();
        self.depth_logs.clear();
        self.view_mats.clear();
        for rel in Self::ray_angles(cfg) {
            let hit = cast_ray(grid, pos, angle + rel, |m| mats.is_barrier(m));
            self.depths.push(hit.depth);
            self.depth_logs.push(normalize_depth(hit.depth, max_log));
            self.view_mats.push(hit.mat);
        }
    }

    fn scan_fovea(
        &mut self,
        grid: &MaterialGrid,
        pos: Vec2,
        angle: i32,
        cfg: &AgentConfig,
        max_log: f32,
    ) {
        self.fov_depths.clear();
        self.fov_depth_logs.clear();
        self.fov_mats.clear();
        for rel in Self::fovea_angles(cfg) {
            let hit = cast_ray(grid, pos, angle + rel, |m| m != EMPTY);
            self.fov_depths.push(hit.depth);
            self.fov_depth_logs.push(normalize_depth(hit.depth, max_log));
            self.fov_mats.push(hit.mat);
        }
    }

    fn scan_proximal(&mut self, grid: &MaterialGrid, mats: &Materials, pos: Vec2, angle: i32) {
        for (i, off) in PROX_OFFSETS.iter().enumerate() {
            let (_, cell) = next_grid_point(pos, heading_vector(angle_mod(angle + off)));
            self.prox_pos[i] = cell;
            // the world edge behaves as a wall
            self.prox_mats[i] = grid.get(cell).unwrap_or(mats.barrier_idx);
        }
    }

    /// True if the proximal cell in direction `dir` blocks movement
    #[inline]
    pub fn prox_blocked(&self, dir: usize, mats: &Materials) -> bool {
        mats.is_barrier(self.prox_mats[dir])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn setup(size: usize) -> (MaterialGrid, Materials, Config) {
        let config = Config::default();
        let mats = Materials::new(&config.world.materials, config.world.barrier_idx);
        (MaterialGrid::new(size, size), mats, config)
    }

    #[test]
    fn test_ray_angles_inclusive() {
        let config = Config::default();
        let angles = Perception::ray_angles(&config.agent);
        assert_eq!(angles.len(), config.n_rays());
        assert_eq!(angles[0], 90);
        assert_eq!(*angles.last().unwrap(), -90);
        assert_eq!(Perception::fovea_angles(&config.agent), vec![5, 0, -5]);
    }

    #[test]
    fn test_ray_hits_wall() {
        let (mut grid, mats, _) = setup(20);
        grid.line(Vec2i::new(15, 0), Vec2i::new(15, 19), 1);
        let hit = cast_ray(&grid, Vec2::new(5.0, 10.0), 0, |m| mats.is_barrier(m));
        assert_eq!(hit.mat, 1);
        assert!((hit.depth - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_crossing_thin_wall_never_tunnels() {
        let (mut grid, mats, _) = setup(40);
        grid.line(Vec2i::new(30, 0), Vec2i::new(30, 39), 1);
        for angle in (-60..=60).step_by(5) {
            let hit = cast_ray(&grid, Vec2::new(20.0, 20.0), angle, |m| mats.is_barrier(m));
            assert_eq!(hit.mat, 1, "angle {} passed through the wall", angle);
        }
    }

    #[test]
    fn test_ray_at_edge_reports_far() {
        let (grid, mats, _) = setup(10);
        // agent on the edge, looking straight out of the world
        let hit = cast_ray(&grid, Vec2::new(0.0, 5.0), 180, |m| mats.is_barrier(m));
        assert_eq!(hit, RayHit::MISS);
        let max_log = (1.0 + grid.diagonal()).ln();
        assert_eq!(normalize_depth(hit.depth, max_log), 1.0);
    }

    #[test]
    fn test_normalize_depth_monotonic() {
        let max_log = (1.0f32 + 100.0).ln();
        let a = normalize_depth(1.0, max_log);
        let b = normalize_depth(10.0, max_log);
        assert!(a > 0.0 && a < b && b < 1.0);
        assert_eq!(normalize_depth(0.0, max_log), 0.0);
    }

    #[test]
    fn test_fovea_sees_food_periphery_does_not() {
        let (mut grid, mats, config) = setup(20);
        grid.set(Vec2i::new(14, 10), 2);
        let mut p = Perception::default();
        p.scan(&grid, &mats, Vec2::new(10.0, 10.0), 0, &config.agent);

        let center = config.agent.fovea_size as usize;
        assert_eq!(p.fov_mats[center], 2);
        assert!((p.fov_depths[center] - 4.0).abs() < 1e-5);
        // peripheral rays only stop at barriers
        let mid = config.n_rays() / 2;
        assert_eq!(p.view_mats[mid], EMPTY);
        assert_eq!(p.depth_logs[mid], 1.0);
    }

    #[test]
    fn test_proximal_rotates_with_heading() {
        let (mut grid, mats, config) = setup(10);
        grid.set(Vec2i::new(5, 6), 1); // north of the agent
        let mut p = Perception::default();

        p.scan(&grid, &mats, Vec2::new(5.0, 5.0), 90, &config.agent);
        assert_eq!(p.prox_pos[FRONT], Vec2i::new(5, 6));
        assert_eq!(p.prox_mats[FRONT], 1);
        assert_eq!(p.prox_pos[LEFT], Vec2i::new(4, 5));
        assert_eq!(p.prox_pos[RIGHT], Vec2i::new(6, 5));
        assert_eq!(p.prox_pos[BACK], Vec2i::new(5, 4));

        p.scan(&grid, &mats, Vec2::new(5.0, 5.0), 0, &config.agent);
        assert_eq!(p.prox_mats[LEFT], 1);
        assert_eq!(p.prox_mats[FRONT], EMPTY);
    }

    #[test]
    fn test_proximal_outside_world_is_barrier() {
        let (grid, mats, config) = setup(10);
        let mut p = Perception::default();
        p.scan(&grid, &mats, Vec2::new(9.0, 5.0), 0, &config.agent);
        assert_eq!(p.prox_pos[FRONT], Vec2i::new(10, 5));
        assert!(p.prox_blocked(FRONT, &mats));
    }
}
