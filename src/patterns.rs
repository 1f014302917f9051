//! Canonical activation patterns for materials and actions.
//!
//! The fovea shows the pattern of whatever material it rests on, and the
//! efference copy shows the pattern of the last action. Patterns are read-only
//! once the world is built.

use crate::config::ConfigError;
use ndarray::Array2;
use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Name -> `[pat_y, pat_x]` pattern dictionary
#[derive(Debug, Clone)]
pub struct Patterns {
    pat_size: [usize; 2],
    pats: HashMap<String, Array2<f32>>,
}

/// On-disk form of the dictionary
#[derive(Serialize, Deserialize)]
struct PatternFile {
    pat_size: [usize; 2],
    patterns: BTreeMap<String, Vec<f32>>,
}

impl Patterns {
    /// Random sparse binary patterns, `n_on` active units each.
    ///
    /// "Empty" always maps to an all-zero pattern.
    pub fn generate<R: Rng>(names: &[String], pat_size: [usize; 2], n_on: usize, rng: &mut R) -> Self {
        let len = pat_size[0] * pat_size[1];
        let mut pats = HashMap::with_capacity(names.len());
        for name in names {
            let mut pat = Array2::<f32>::zeros((pat_size[0], pat_size[1]));
            if name != "Empty" {
                for idx in sample(rng, len, n_on.min(len)).iter() {
                    pat[[idx / pat_size[1], idx % pat_size[1]]] = 1.0;
                }
            }
            pats.insert(name.clone(), pat);
        }
        Self { pat_size, pats }
    }

    /// Load a dictionary saved with [`Patterns::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Invalid(format!("cannot read pattern file {:?}: {}", path, e))
        })?;
        let file: PatternFile = serde_json::from_str(&json)?;
        let [py, px] = file.pat_size;
        let mut pats = HashMap::with_capacity(file.patterns.len());
        for (name, values) in file.patterns {
            let pat = Array2::from_shape_vec((py, px), values).map_err(|_| {
                ConfigError::Invalid(format!("pattern {} does not match size {:?}", name, file.pat_size))
            })?;
            pats.insert(name, pat);
        }
        Ok(Self {
            pat_size: file.pat_size,
            pats,
        })
    }

    /// Save as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let patterns = self
            .pats
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().copied().collect()))
            .collect();
        let file = PatternFile {
            pat_size: self.pat_size,
            patterns,
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }

    /// Check that every required name has a pattern of the expected size
    pub fn validate(&self, required: &[String], pat_size: [usize; 2]) -> Result<(), ConfigError> {
        if self.pat_size != pat_size {
            return Err(ConfigError::Invalid(format!(
                "pattern size {:?} does not match configured {:?}",
                self.pat_size, pat_size
            )));
        }
        for name in required {
            if !self.pats.contains_key(name) {
                return Err(ConfigError::Invalid(format!("no pattern for {}", name)));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Array2<f32>> {
        self.pats.get(name)
    }

    pub fn pat_size(&self) -> [usize; 2] {
        self.pat_size
    }

    pub fn len(&self) -> usize {
        self.pats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pats.is_empty()
    }
}
