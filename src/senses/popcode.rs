//! One-dimensional population codes.
//!
//! A scalar is spread over `n` units with evenly spaced preferred values
//! between `min` and `max`; each unit responds with a Gaussian bump.

use serde::{Deserialize, Serialize};

/// Gaussian-bump population code over a fixed value range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopCode1D {
    /// Preferred value of the first unit
    pub min: f32,
    /// Preferred value of the last unit
    pub max: f32,
    /// Bump width as a fraction of `max - min`
    pub sigma: f32,
    /// Activations below this are zeroed
    pub thr: f32,
    /// Clamp the encoded value into `[min, max]`
    pub clip: bool,
    /// Minimum total activation for a meaningful decode
    pub min_sum: f32,
}

impl Default for PopCode1D {
    fn default() -> Self {
        Self {
            min: -0.5,
            max: 1.5,
            sigma: 0.2,
            thr: 0.1,
            clip: true,
            min_sum: 0.2,
        }
    }
}

impl PopCode1D {
    /// Default code over a custom range
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    /// Preferred value of unit `i` out of `n`
    #[inline]
    fn unit_value(&self, i: usize, n: usize) -> f32 {
        let incr = (self.max - self.min) / (n - 1) as f32;
        self.min + incr * i as f32
    }

    /// Write the code for `val` into `out` (length = number of units)
    pub fn encode_into(&self, out: &mut [f32], val: f32) {
        let n = out.len();
        if n < 2 {
            out.fill(0.0);
            return;
        }
        let val = if self.clip {
            val.clamp(self.min, self.max)
        } else {
            val
        };
        let width = self.sigma * (self.max - self.min);
        for (i, act) in out.iter_mut().enumerate() {
            let dist = (self.unit_value(i, n) - val) / width;
            let a = (-(dist * dist)).exp();
            *act = if a < self.thr { 0.0 } else { a };
        }
    }

    /// Encode `val` into a fresh vector of `n` units
    pub fn encode(&self, val: f32, n: usize) -> Vec<f32> {
        let mut out = vec![0.0; n];
        self.encode_into(&mut out, val);
        out
    }

    /// Activation-weighted mean of the preferred values; 0 if too little activity
    pub fn decode(&self, pat: &[f32]) -> f32 {
        let n = pat.len();
        if n < 2 {
            return 0.0;
        }
        let mut sum = 0.0;
        let mut weighted = 0.0;
        for (i, &act) in pat.iter().enumerate() {
            sum += act;
            weighted += act * self.unit_value(i, n);
        }
        if sum < self.min_sum {
            return 0.0;
        }
        weighted / sum
    }
}
