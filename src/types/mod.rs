pub mod linalg;

pub use linalg::*;

use nalgebra::Vector3;

/// Rates reported by one sensor source for a single log entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceSample {
    /// Linear velocity along the body x/y/z axes [m/s]
    pub linear: Vector3<f64>,

    /// Angular velocity about the body x/y/z axes [rad/s]
    pub angular: Vector3<f64>,
}

impl SourceSample {
    pub fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self { linear, angular }
    }
}

/// One complete entry of the motion log: a sample per source plus the
/// time elapsed since the previous entry.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEntry {
    pub samples: Vec<SourceSample>,

    /// Elapsed time [seconds]
    pub dt: f64,
}

impl MotionEntry {
    /// Mean linear velocity over all sources.
    pub fn mean_linear(&self) -> Vector3<f64> {
        self.mean_of(|s| s.linear)
    }

    /// Mean angular velocity over all sources.
    pub fn mean_angular(&self) -> Vector3<f64> {
        self.mean_of(|s| s.angular)
    }

    fn mean_of(&self, pick: impl Fn(&SourceSample) -> Vector3<f64>) -> Vector3<f64> {
        if self.samples.is_empty() {
            return Vector3::zeros();
        }
        let sum: Vector3<f64> = self.samples.iter().map(pick).sum();
        sum / self.samples.len() as f64
    }
}
