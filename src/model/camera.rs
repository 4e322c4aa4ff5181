//! Depth camera data and the observation image type.

use nalgebra::DMatrix;

/// A dense depth image: one range value (meters) per pixel, row-major as a
/// `height x width` matrix. Pixels with no return are NaN.
pub type DepthImage = DMatrix<f64>;

/// Calibration and resolution context of the depth camera.
///
/// The filter core does not interpret the camera matrix; it is carried as an
/// opaque handle for the observation model and for callers acquiring frames.
/// Constructed once per session and shared read-only.
#[derive(Debug, Clone)]
pub struct CameraData {
    width: usize,
    height: usize,
    camera_matrix: DMatrix<f64>,
}

impl CameraData {
    /// Create camera data from resolution and a 3x3 camera matrix.
    pub fn new(width: usize, height: usize, camera_matrix: DMatrix<f64>) -> Self {
        Self {
            width,
            height,
            camera_matrix,
        }
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels per frame.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Intrinsic camera matrix.
    pub fn camera_matrix(&self) -> &DMatrix<f64> {
        &self.camera_matrix
    }
}
