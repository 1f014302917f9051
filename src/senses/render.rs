//! Sensory tensors and the double buffer that exposes them.
//!
//! Renderers only ever write into the "next" generation. `promote` copies the
//! whole generation to "current" once all of them have run, so a consumer
//! reading between steps always sees one complete observation.

use super::perception::Perception;
use super::popcode::PopCode1D;
use crate::body::{Action, Drive, Drives};
use crate::config::Config;
use crate::grid::Materials;
use crate::patterns::Patterns;
use ndarray::{s, ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Sense channels exposed to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    Depth,
    FovDepth,
    Fovea,
    ProxSoma,
    Vestibular,
    Inters,
    Action,
}

impl Sense {
    pub const ALL: [Sense; 7] = [
        Sense::Depth,
        Sense::FovDepth,
        Sense::Fovea,
        Sense::ProxSoma,
        Sense::Vestibular,
        Sense::Inters,
        Sense::Action,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sense::Depth => "Depth",
            Sense::FovDepth => "FovDepth",
            Sense::Fovea => "Fovea",
            Sense::ProxSoma => "ProxSoma",
            Sense::Vestibular => "Vestibular",
            Sense::Inters => "Inters",
            Sense::Action => "Action",
        }
    }

    /// Tensor shape for this sense under `config`
    pub fn shape(&self, config: &Config) -> Vec<usize> {
        let pop = config.agent.pop_size;
        let [py, px] = config.world.pat_size;
        match self {
            Sense::Depth => vec![config.n_rays(), pop],
            Sense::FovDepth => vec![config.n_fovea(), pop],
            Sense::Fovea => vec![config.n_fovea(), py, px],
            Sense::ProxSoma => vec![4, 2],
            Sense::Vestibular => vec![2, pop],
            Sense::Inters => vec![config.agent.inters.len(), pop],
            Sense::Action => vec![py, px],
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sense {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sense::ALL
            .iter()
            .find(|t| t.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown sense: {}", s))
    }
}

/// One generation of rendered tensors
pub type TensorMap = HashMap<Sense, ArrayD<f32>>;

/// Next/current generations of sensory tensors
#[derive(Debug, Clone, Default)]
pub struct SenseBuffers {
    next: TensorMap,
    current: TensorMap,
}

impl SenseBuffers {
    /// Allocate zeroed "next" tensors; "current" stays empty until the first promote
    pub fn new(config: &Config) -> Self {
        let next = Sense::ALL
            .iter()
            .map(|&s| (s, ArrayD::zeros(IxDyn(&s.shape(config)))))
            .collect();
        Self {
            next,
            current: TensorMap::new(),
        }
    }

    /// Full copy of next into current
    pub fn promote(&mut self) {
        for (sense, next) in &self.next {
            match self.current.get_mut(sense) {
                Some(cur) => cur.assign(next),
                None => {
                    self.current.insert(*sense, next.clone());
                }
            }
        }
    }

    /// Current-generation tensor
    #[inline]
    pub fn current(&self, sense: Sense) -> Option<&ArrayD<f32>> {
        self.current.get(&sense)
    }

    /// Next-generation tensor (read-only)
    #[inline]
    pub fn next(&self, sense: Sense) -> Option<&ArrayD<f32>> {
        self.next.get(&sense)
    }

    /// Render every sense into the next generation
    pub fn render(&mut self, input: &RenderInput<'_>) {
        for sense in Sense::ALL {
            if let Some(t) = self.next.get_mut(&sense) {
                render_sense(sense, t, input);
            }
        }
    }
}

/// Everything the renderers read
pub struct RenderInput<'a> {
    pub config: &'a Config,
    pub materials: &'a Materials,
    pub patterns: &'a Patterns,
    pub perception: &'a Perception,
    pub drives: &'a Drives,
    /// Heading, degrees
    pub angle: i32,
    /// Last rotation, degrees
    pub rot_ang: i32,
    /// Last action taken
    pub action: Action,
}

fn render_sense(sense: Sense, t: &mut ArrayD<f32>, input: &RenderInput<'_>) {
    let agent = &input.config.agent;
    match sense {
        Sense::Depth => render_pop_rows(t, &agent.depth_code, &input.perception.depth_logs),
        Sense::FovDepth => render_pop_rows(t, &agent.depth_code, &input.perception.fov_depth_logs),
        Sense::Fovea => {
            for (i, &mat) in input.perception.fov_mats.iter().enumerate() {
                let name = input.materials.name(mat).unwrap_or("Empty");
                let mut slot = t.slice_mut(s![i, .., ..]);
                match input.patterns.get(name) {
                    Some(pat) => slot.assign(pat),
                    None => slot.fill(0.0),
                }
            }
        }
        Sense::ProxSoma => {
            for (i, &mat) in input.perception.prox_mats.iter().enumerate() {
                let blocked = input.materials.is_barrier(mat);
                t[[i, 0]] = if blocked { 1.0 } else { 0.0 };
                t[[i, 1]] = if blocked { 0.0 } else { 1.0 };
            }
        }
        Sense::Vestibular => {
            let rot = (input.rot_ang as f32 / agent.angle_inc as f32 + 1.0) * 0.5;
            let heading = input.angle as f32 / 360.0;
            render_pop_rows(t, &agent.inter_code, &[rot, heading]);
        }
        Sense::Inters => {
            let levels: Vec<f32> = agent
                .inters
                .iter()
                .map(|n| {
                    n.parse::<Drive>()
                        .map(|d| input.drives.get(d))
                        .unwrap_or(0.0)
                })
                .collect();
            render_pop_rows(t, &agent.inter_code, &levels);
        }
        Sense::Action => match input.patterns.get(input.action.name()) {
            Some(pat) => t.assign(pat),
            None => t.fill(0.0),
        },
    }
}

/// Encode `values[i]` into row `i` of a 2D tensor
fn render_pop_rows(t: &mut ArrayD<f32>, code: &PopCode1D, values: &[f32]) {
    let n = t.shape()[1];
    let mut buf = vec![0.0f32; n];
    for (i, &v) in values.iter().enumerate().take(t.shape()[0]) {
        code.encode_into(&mut buf, v);
        for (j, &a) in buf.iter().enumerate() {
            t[[i, j]] = a;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Vec2, Vec2i};
    use crate::grid::MaterialGrid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixture {
        config: Config,
        materials: Materials,
        patterns: Patterns,
        perception: Perception,
        drives: Drives,
    }

    fn fixture() -> Fixture {
        let config = Config::default();
        let materials = Materials::new(&config.world.materials, config.world.barrier_idx);
        let mut names = materials.names().to_vec();
        names.extend(Action::ALL.iter().map(|a| a.name().to_string()));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let patterns = Patterns::generate(&names, config.world.pat_size, config.world.pat_on, &mut rng);

        let mut grid = MaterialGrid::new(20, 20);
        grid.set(Vec2i::new(13, 10), 2);
        grid.set(Vec2i::new(11, 10), 1);
        let mut perception = Perception::default();
        perception.scan(&grid, &materials, Vec2::new(10.0, 10.0), 180, &config.agent);

        Fixture {
            config,
            materials,
            patterns,
            perception,
            drives: Drives::new(0.75, 0.25),
        }
    }

    fn input(f: &Fixture) -> RenderInput<'_> {
        RenderInput {
            config: &f.config,
            materials: &f.materials,
            patterns: &f.patterns,
            perception: &f.perception,
            drives: &f.drives,
            angle: 180,
            rot_ang: 15,
            action: Action::Left,
        }
    }

    #[test]
    fn test_shapes() {
        let f = fixture();
        let mut bufs = SenseBuffers::new(&f.config);
        bufs.render(&input(&f));
        assert_eq!(bufs.next(Sense::Depth).unwrap().shape(), &[13, 12]);
        assert_eq!(bufs.next(Sense::Fovea).unwrap().shape(), &[3, 5, 5]);
        assert_eq!(bufs.next(Sense::Inters).unwrap().shape(), &[5, 12]);
        assert_eq!(bufs.next(Sense::Action).unwrap().shape(), &[5, 5]);
    }

    #[test]
    fn test_current_empty_until_promote() {
        let f = fixture();
        let mut bufs = SenseBuffers::new(&f.config);
        bufs.render(&input(&f));
        assert!(bufs.current(Sense::Depth).is_none());
        bufs.promote();
        assert_eq!(bufs.current(Sense::Depth), bufs.next(Sense::Depth));
    }

    #[test]
    fn test_promote_copies_not_aliases() {
        let f = fixture();
        let mut bufs = SenseBuffers::new(&f.config);
        bufs.render(&input(&f));
        bufs.promote();
        let snapshot = bufs.current(Sense::Inters).unwrap().clone();

        let mut f2 = fixture();
        f2.drives = Drives::new(0.1, 0.9);
        bufs.render(&input(&f2));
        assert_eq!(bufs.current(Sense::Inters).unwrap(), &snapshot);
        assert_ne!(bufs.next(Sense::Inters).unwrap(), &snapshot);
    }

    #[test]
    fn test_prox_soma_marks_blocked_front() {
        let f = fixture();
        let mut bufs = SenseBuffers::new(&f.config);
        bufs.render(&input(&f));
        let t = bufs.next(Sense::ProxSoma).unwrap();
        // the agent faces west; nothing is west of it, the wall is behind
        assert_eq!(t[[0, 0]], 0.0);
        assert_eq!(t[[0, 1]], 1.0);
        assert_eq!(t[[3, 0]], 1.0);
    }

    #[test]
    fn test_action_efference_copy() {
        let f = fixture();
        let mut bufs = SenseBuffers::new(&f.config);
        bufs.render(&input(&f));
        let t = bufs.next(Sense::Action).unwrap();
        let pat = f.patterns.get("Left").unwrap();
        assert_eq!(t.view().into_dimensionality::<ndarray::Ix2>().unwrap(), pat.view());
    }

    #[test]
    fn test_inters_decode_to_drive_levels() {
        let f = fixture();
        let mut bufs = SenseBuffers::new(&f.config);
        bufs.render(&input(&f));
        let t = bufs.next(Sense::Inters).unwrap();
        let energy: Vec<f32> = t.slice(s![0, ..]).iter().copied().collect();
        let decoded = f.config.agent.inter_code.decode(&energy);
        assert!((decoded - 0.75).abs() < 0.05);
    }

    #[test]
    fn test_sense_names() {
        assert_eq!("FovDepth".parse::<Sense>(), Ok(Sense::FovDepth));
        assert!("Smell".parse::<Sense>().is_err());
    }
}
