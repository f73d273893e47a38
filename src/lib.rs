//! Pose estimation by dead reckoning, plus the process and measurement
//! models an external Unscented Kalman Filter needs to fuse it with other
//! sensors.

pub mod config;
pub mod error;
pub mod filters;
pub mod integrator;
pub mod motion_log;
pub mod pose;
pub mod reckoner;
pub mod rotation;
pub mod types;

pub use config::{extract_initial_pose, InitialPoseConfig};
pub use error::{Error, Result, ValidationError};
pub use filters::{
    KalmanControl, KalmanState, Measurement, MeasurementModel, PoseModel, StateSpaceModel,
    SystemModel,
};
pub use integrator::{velocities_to_deltas, MotionDelta};
pub use motion_log::{open_log, MotionLogReader};
pub use pose::{Pose, PoseSnapshot};
pub use reckoner::{DeadReckoner, StepReport};
pub use rotation::EulerAngles;
pub use types::{MotionEntry, SourceSample};
