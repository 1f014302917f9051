//! Saved worlds: the material grid plus the names its codes refer to.

use crate::grid::{MatCode, MaterialGrid, Materials, EMPTY};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 4] = b"FWLD";

/// Persisted grid, independent of the catalog it is loaded into
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Format version
    pub version: u32,
    pub width: usize,
    pub height: usize,
    /// Material names indexed by the codes in `cells`
    pub materials: Vec<String>,
    /// Row-major cells
    pub cells: Vec<MatCode>,
}

impl WorldSnapshot {
    pub const VERSION: u32 = 1;

    /// Capture a grid together with its catalog
    pub fn capture(grid: &MaterialGrid, materials: &Materials) -> Self {
        Self {
            version: Self::VERSION,
            width: grid.width(),
            height: grid.height(),
            materials: materials.names().to_vec(),
            cells: grid.to_flat(),
        }
    }

    /// Rebuild the grid in terms of `materials`, remapping codes by name.
    ///
    /// Names the catalog does not know become Empty.
    pub fn to_grid(&self, materials: &Materials) -> Result<MaterialGrid, SnapshotError> {
        let remap: Vec<MatCode> = self
            .materials
            .iter()
            .map(|name| {
                materials.code(name).unwrap_or_else(|| {
                    log::warn!("snapshot material {} is not configured, using Empty", name);
                    EMPTY
                })
            })
            .collect();
        let cells: Vec<MatCode> = self
            .cells
            .iter()
            .map(|&c| remap.get(c as usize).copied().unwrap_or(EMPTY))
            .collect();
        MaterialGrid::from_flat(self.width, self.height, &cells).ok_or_else(|| {
            SnapshotError::InvalidFormat(format!(
                "{} cells do not fill a {}x{} grid",
                self.cells.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Save to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(MAGIC)?;
        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;
        writer.flush()?;
        Ok(())
    }

    /// Load from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(SnapshotError::InvalidFormat("Invalid magic bytes".to_string()));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let snapshot: WorldSnapshot = bincode::deserialize(&buffer)?;

        if snapshot.version != Self::VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: Self::VERSION,
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }
}

/// Errors that can occur while saving or loading a world
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Serialization(bincode::Error),
    InvalidFormat(String),
    VersionMismatch { expected: u32, found: u32 },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Self::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bincode::Error> for SnapshotError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e)
    }
}
