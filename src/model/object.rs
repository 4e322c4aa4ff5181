//! Tracked object description.

/// Description of the tracked object(s): how many rigid parts the state is
/// partitioned into and how many pose dimensions each part carries.
///
/// Constructed once per session and shared read-only between the builder,
/// filter and tracker. Mesh/geometry loading is external to this crate.
#[derive(Debug, Clone)]
pub struct ObjectModel {
    name: String,
    part_count: usize,
    part_dimension: usize,
}

impl ObjectModel {
    /// Create a new object model.
    ///
    /// `part_count` is the number of independently sampled parts (1 for a
    /// single rigid object); `part_dimension` is the pose dimension of each
    /// part (6 for a rigid pose).
    pub fn new(name: impl Into<String>, part_count: usize, part_dimension: usize) -> Self {
        Self {
            name: name.into(),
            part_count,
            part_dimension,
        }
    }

    /// Object name (for logging only).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tracked parts. One sampling block is created per part.
    #[inline]
    pub fn part_count(&self) -> usize {
        self.part_count
    }

    /// Pose dimension of a single part.
    #[inline]
    pub fn part_dimension(&self) -> usize {
        self.part_dimension
    }

    /// Total state dimension across all parts.
    #[inline]
    pub fn state_dimension(&self) -> usize {
        self.part_count * self.part_dimension
    }
}
