/// Filter-facing models
///
/// System and measurement models plus the state/control/measurement vectors
/// an external Unscented Kalman Filter operates on.
pub mod ukf_support;

pub use ukf_support::{
    KalmanControl, KalmanState, Measurement, MeasurementModel, PoseModel, StateSpaceModel,
    SystemModel,
};
