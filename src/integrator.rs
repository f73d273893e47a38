//! Motion integration: turns per-axis rates and elapsed time into the
//! increments consumed by `Pose` and by the process model.

use nalgebra::Vector3;

use crate::filters::ukf_support::KalmanControl;
use crate::rotation::EulerAngles;
use crate::types::MotionEntry;

/// Scale each rate by the elapsed time: `delta = rate * dt`.
///
/// Lazy and total; an empty input yields an empty output.
pub fn velocities_to_deltas<I>(rates: I, dt: f64) -> impl Iterator<Item = f64>
where
    I: IntoIterator<Item = f64>,
{
    rates.into_iter().map(move |rate| rate * dt)
}

/// Translation and rotation increments for one step, in the body frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionDelta {
    /// Local-frame displacement [meters]
    pub translation: Vector3<f64>,

    /// Yaw/pitch/roll increments [rad]
    pub rotation: EulerAngles,
}

impl MotionDelta {
    /// Integrate linear and angular rates over `dt`.
    ///
    /// Angular rates are about the body x/y/z axes, i.e. roll/pitch/yaw.
    pub fn from_rates(linear: &Vector3<f64>, angular: &Vector3<f64>, dt: f64) -> Self {
        let translation = Vector3::from_iterator(velocities_to_deltas(linear.iter().copied(), dt));
        let angle_deltas = Vector3::from_iterator(velocities_to_deltas(angular.iter().copied(), dt));
        Self {
            translation,
            rotation: EulerAngles::new(angle_deltas.z, angle_deltas.y, angle_deltas.x),
        }
    }

    /// Integrate a log entry, averaging the rates of all its sources.
    pub fn from_entry(entry: &MotionEntry) -> Self {
        Self::from_rates(&entry.mean_linear(), &entry.mean_angular(), entry.dt)
    }

    /// Express this step as the control input of the process model.
    pub fn to_control(&self) -> KalmanControl {
        KalmanControl::new(
            self.translation.x,
            self.translation.y,
            self.translation.z,
            self.rotation.roll,
            self.rotation.pitch,
            self.rotation.yaw,
        )
    }
}
