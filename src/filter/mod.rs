//! Coordinate particle filter mechanics.
//!
//! - [`blocks`] - sampling block partition (one block per object part)
//! - [`belief`] - weighted particle set
//! - [`coordinate`] - the RBC coordinate particle filter update loop
//! - [`errors`] - construction and runtime error taxonomy

pub mod belief;
pub mod blocks;
pub mod coordinate;
pub mod errors;

pub use belief::{Belief, Particle};
pub use blocks::{Block, SamplingBlocks};
pub use coordinate::{CoordinateParticleFilter, UpdateReport};
pub use errors::{BuildError, FilterError};
