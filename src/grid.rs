//! Material grid, material catalog and generation-time drawing helpers.

use crate::geometry::Vec2i;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Integer material code stored in each cell
pub type MatCode = u8;

/// Code 0 is always the empty material
pub const EMPTY: MatCode = 0;

/// Ordered material names with the inverse name -> code map
#[derive(Clone, Debug)]
pub struct Materials {
    names: Vec<String>,
    codes: HashMap<String, MatCode>,
    /// Highest code that blocks movement and peripheral vision
    pub barrier_idx: MatCode,
}

impl Materials {
    /// Build a catalog. The first name is forced to "Empty".
    pub fn new(names: &[String], barrier_idx: MatCode) -> Self {
        let mut all: Vec<String> = Vec::with_capacity(names.len() + 1);
        all.push("Empty".to_string());
        all.extend(names.iter().filter(|n| n.as_str() != "Empty").cloned());
        let codes = all
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i as MatCode))
            .collect();
        Self {
            names: all,
            codes,
            barrier_idx,
        }
    }

    #[inline]
    pub fn code(&self, name: &str) -> Option<MatCode> {
        self.codes.get(name).copied()
    }

    #[inline]
    pub fn name(&self, code: MatCode) -> Option<&str> {
        self.names.get(code as usize).map(|s| s.as_str())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True for codes in `1..=barrier_idx`
    #[inline]
    pub fn is_barrier(&self, code: MatCode) -> bool {
        code != EMPTY && code <= self.barrier_idx
    }

    /// Display character for ASCII views
    pub fn glyph(&self, code: MatCode) -> char {
        if code == EMPTY {
            return '.';
        }
        if self.is_barrier(code) {
            return '#';
        }
        match self.name(code) {
            Some("Food") => 'f',
            Some("Water") => 'w',
            Some("FoodWas") => ',',
            Some("WaterWas") => '~',
            Some(n) => n.chars().next().unwrap_or('?'),
            None => '?',
        }
    }
}

/// The world grid of material codes, `cells[y][x]`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialGrid {
    width: usize,
    height: usize,
    cells: Vec<Vec<MatCode>>,
}

impl MaterialGrid {
    /// Create an all-empty grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![EMPTY; width]; height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: Vec2i) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Material at position, `None` outside the world
    #[inline]
    pub fn get(&self, pos: Vec2i) -> Option<MatCode> {
        if self.in_bounds(pos) {
            Some(self.cells[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Set material at position; writes outside the world are ignored
    #[inline]
    pub fn set(&mut self, pos: Vec2i, mat: MatCode) {
        if self.in_bounds(pos) {
            self.cells[pos.y as usize][pos.x as usize] = mat;
        }
    }

    /// Clear every cell to empty
    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(EMPTY);
        }
    }

    /// Draw a straight line from `a` to `b` inclusive
    pub fn line(&mut self, a: Vec2i, b: Vec2i, mat: MatCode) {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let steps = dx.abs().max(dy.abs());
        if steps == 0 {
            self.set(a, mat);
            return;
        }
        let sx = dx as f32 / steps as f32;
        let sy = dy as f32 / steps as f32;
        for i in 0..=steps {
            let x = (a.x as f32 + sx * i as f32).round() as i32;
            let y = (a.y as f32 + sy * i as f32).round() as i32;
            self.set(Vec2i::new(x, y), mat);
        }
    }

    /// Rectangle outline with corners `min` and `max` inclusive
    pub fn rect(&mut self, min: Vec2i, max: Vec2i, mat: MatCode) {
        self.line(Vec2i::new(min.x, min.y), Vec2i::new(max.x, min.y), mat);
        self.line(Vec2i::new(max.x, min.y), Vec2i::new(max.x, max.y), mat);
        self.line(Vec2i::new(max.x, max.y), Vec2i::new(min.x, max.y), mat);
        self.line(Vec2i::new(min.x, max.y), Vec2i::new(min.x, min.y), mat);
    }

    /// Filled rectangle with corners `min` and `max` inclusive
    pub fn fill_rect(&mut self, min: Vec2i, max: Vec2i, mat: MatCode) {
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                self.set(Vec2i::new(x, y), mat);
            }
        }
    }

    /// Place `n` cells of `mat` at random empty positions.
    ///
    /// Occupied picks are rejected and retried. Asking for more cells than are
    /// empty is a caller error; the request is capped at the empty count.
    /// Returns the number placed.
    pub fn random_scatter<R: Rng>(&mut self, n: usize, mat: MatCode, rng: &mut R) -> usize {
        let available = self.count(EMPTY);
        let target = if n > available {
            log::warn!(
                "random_scatter: requested {} cells but only {} are empty",
                n,
                available
            );
            available
        } else {
            n
        };

        let mut placed = 0;
        while placed < target {
            let pos = Vec2i::new(
                rng.gen_range(0..self.width as i32),
                rng.gen_range(0..self.height as i32),
            );
            if self.get(pos) == Some(EMPTY) {
                self.set(pos, mat);
                placed += 1;
            }
        }
        placed
    }

    /// Number of cells holding `mat`
    pub fn count(&self, mat: MatCode) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == mat).count()
    }

    /// Positions of all cells holding `mat`
    pub fn positions_of(&self, mat: MatCode) -> Vec<Vec2i> {
        let mut out = Vec::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, &c) in row.iter().enumerate() {
                if c == mat {
                    out.push(Vec2i::new(x as i32, y as i32));
                }
            }
        }
        out
    }

    /// Row-major copy of all cells
    pub fn to_flat(&self) -> Vec<MatCode> {
        self.cells.iter().flatten().copied().collect()
    }

    /// Rebuild from a row-major cell vector
    pub fn from_flat(width: usize, height: usize, flat: &[MatCode]) -> Option<Self> {
        if width == 0 || flat.len() != width * height {
            return None;
        }
        let cells = flat.chunks(width).map(|row| row.to_vec()).collect();
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// Length of the world diagonal, the longest possible ray
    pub fn diagonal(&self) -> f32 {
        ((self.width * self.width + self.height * self.height) as f32).sqrt()
    }
}

/// ASCII rendering of a grid, optionally with the agent drawn on top
pub struct GridView<'a> {
    pub grid: &'a MaterialGrid,
    pub materials: &'a Materials,
    pub agent: Option<(Vec2i, i32)>,
}

impl fmt::Display for GridView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // y grows upward, so print the top row first
        for y in (0..self.grid.height()).rev() {
            for x in 0..self.grid.width() {
                let pos = Vec2i::new(x as i32, y as i32);
                let ch = match self.agent {
                    Some((apos, angle)) if apos == pos => agent_glyph(angle),
                    _ => self.materials.glyph(self.grid.get(pos).unwrap_or(EMPTY)),
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn agent_glyph(angle: i32) -> char {
    match ((angle + 45) / 90) % 4 {
        0 => '>',
        1 => '^',
        2 => '<',
        _ => 'v',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog() -> Materials {
        let names: Vec<String> = ["Empty", "Wall", "Food", "Water", "FoodWas", "WaterWas"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Materials::new(&names, 1)
    }

    #[test]
    fn test_catalog_codes() {
        let mats = catalog();
        assert_eq!(mats.code("Empty"), Some(0));
        assert_eq!(mats.code("Wall"), Some(1));
        assert_eq!(mats.code("Water"), Some(3));
        assert_eq!(mats.name(2), Some("Food"));
        assert_eq!(mats.code("Lava"), None);
        assert!(mats.is_barrier(1));
        assert!(!mats.is_barrier(0));
        assert!(!mats.is_barrier(2));
    }

    #[test]
    fn test_catalog_forces_empty_first() {
        let names = vec!["Wall".to_string(), "Food".to_string()];
        let mats = Materials::new(&names, 1);
        assert_eq!(mats.code("Empty"), Some(0));
        assert_eq!(mats.code("Wall"), Some(1));
        assert_eq!(mats.len(), 3);
    }

    #[test]
    fn test_get_set_bounds() {
        let mut grid = MaterialGrid::new(10, 8);
        grid.set(Vec2i::new(3, 4), 2);
        assert_eq!(grid.get(Vec2i::new(3, 4)), Some(2));
        assert_eq!(grid.get(Vec2i::new(10, 0)), None);
        assert_eq!(grid.get(Vec2i::new(0, -1)), None);
        // ignored, no panic
        grid.set(Vec2i::new(-1, 100), 1);
    }

    #[test]
    fn test_rect_outline() {
        let mut grid = MaterialGrid::new(10, 10);
        grid.rect(Vec2i::new(0, 0), Vec2i::new(9, 9), 1);
        assert_eq!(grid.count(1), 36);
        assert_eq!(grid.get(Vec2i::new(5, 5)), Some(EMPTY));
        assert_eq!(grid.get(Vec2i::new(9, 5)), Some(1));
    }

    #[test]
    fn test_line_diagonal() {
        let mut grid = MaterialGrid::new(10, 10);
        grid.line(Vec2i::new(1, 1), Vec2i::new(5, 5), 1);
        assert_eq!(grid.count(1), 5);
        assert_eq!(grid.get(Vec2i::new(3, 3)), Some(1));
    }

    #[test]
    fn test_random_scatter_rejects_occupied() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut grid = MaterialGrid::new(5, 5);
        grid.fill_rect(Vec2i::new(0, 0), Vec2i::new(4, 3), 1);
        // only 5 empty cells remain
        let placed = grid.random_scatter(5, 2, &mut rng);
        assert_eq!(placed, 5);
        assert_eq!(grid.count(2), 5);
        assert_eq!(grid.count(1), 20);
    }

    #[test]
    fn test_random_scatter_caps_at_capacity() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut grid = MaterialGrid::new(3, 3);
        let placed = grid.random_scatter(20, 2, &mut rng);
        assert_eq!(placed, 9);
    }

    #[test]
    fn test_flat_roundtrip() {
        let mut grid = MaterialGrid::new(4, 3);
        grid.set(Vec2i::new(1, 2), 3);
        let flat = grid.to_flat();
        let back = MaterialGrid::from_flat(4, 3, &flat).unwrap();
        assert_eq!(back.get(Vec2i::new(1, 2)), Some(3));
        assert!(MaterialGrid::from_flat(4, 4, &flat).is_none());
    }
}
