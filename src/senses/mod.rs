//! The agent's sensory system.
//!
//! This module contains:
//! - Perception: ray-cast depth, fovea and proximal scans
//! - Population codes for scalar values
//! - Renderers producing the double-buffered sense tensors

pub mod perception;
pub mod popcode;
pub mod render;

pub use perception::{Perception, RayHit, BACK, FRONT, LEFT, RIGHT};
pub use popcode::PopCode1D;
pub use render::{RenderInput, Sense, SenseBuffers, TensorMap};
