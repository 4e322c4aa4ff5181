//! Tracker lifecycle and assembly.
//!
//! [`ParticleTracker`] owns the filter and belief and exposes the
//! `initialize`/`track` surface; [`TrackerBuilder`] assembles it from
//! sub-builders and [`Parameters`].

pub mod builder;
pub mod object_tracker;

pub use builder::{BlockStrategy, Parameters, TrackerBuilder};
pub use object_tracker::ParticleTracker;
