//! Models consumed by an external Unscented Kalman Filter.
//!
//! The filter itself (sigma points, covariance propagation, update) lives
//! outside this crate. It is handed a [`StateSpaceModel`] and calls
//! `transition` once per predict step and `observe` once per update step.

use std::fmt;

use crate::rotation::{self, EulerAngles};
use crate::types::{
    ControlVec, JacobianH, JacobianV, MeasurementVec, Position, StateVec,
};

/// Generates the fixed index constant plus getter/setter for each named
/// component of a 6-vector newtype.
macro_rules! components {
    ($($index:ident = $i:literal => $get:ident / $set:ident;)*) => {
        $(
            pub const $index: usize = $i;

            pub fn $get(&self) -> f64 {
                self.0[Self::$index]
            }

            pub fn $set(&mut self, value: f64) {
                self.0[Self::$index] = value;
            }
        )*
    };
}

/// Filter state: `[x, y, z, yaw, pitch, roll]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KalmanState(StateVec);

impl KalmanState {
    components! {
        X = 0 => x / set_x;
        Y = 1 => y / set_y;
        Z = 2 => z / set_z;
        YAW = 3 => yaw / set_yaw;
        PITCH = 4 => pitch / set_pitch;
        ROLL = 5 => roll / set_roll;
    }

    pub fn new(x: f64, y: f64, z: f64, yaw: f64, pitch: f64, roll: f64) -> Self {
        Self(StateVec::from([x, y, z, yaw, pitch, roll]))
    }

    pub fn zeros() -> Self {
        Self(StateVec::zeros())
    }

    pub fn position(&self) -> Position {
        Position::new(self.x(), self.y(), self.z())
    }

    pub fn angles(&self) -> EulerAngles {
        EulerAngles::new(self.yaw(), self.pitch(), self.roll())
    }

    pub fn as_vector(&self) -> &StateVec {
        &self.0
    }
}

impl Default for KalmanState {
    fn default() -> Self {
        Self::zeros()
    }
}

impl From<StateVec> for KalmanState {
    fn from(v: StateVec) -> Self {
        Self(v)
    }
}

impl fmt::Display for KalmanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x: {}, y: {}, z: {}, yaw: {}, pitch: {}, roll: {}",
            self.x(),
            self.y(),
            self.z(),
            self.yaw(),
            self.pitch(),
            self.roll()
        )
    }
}

/// Commanded motion between two steps:
/// `[delta_x, delta_y, delta_z, delta_roll, delta_pitch, delta_yaw]`
///
/// Note the angular part is ordered roll-first, the reverse of the state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KalmanControl(ControlVec);

impl KalmanControl {
    components! {
        DELTA_X = 0 => delta_x / set_delta_x;
        DELTA_Y = 1 => delta_y / set_delta_y;
        DELTA_Z = 2 => delta_z / set_delta_z;
        DELTA_ROLL = 3 => delta_roll / set_delta_roll;
        DELTA_PITCH = 4 => delta_pitch / set_delta_pitch;
        DELTA_YAW = 5 => delta_yaw / set_delta_yaw;
    }

    pub fn new(
        delta_x: f64,
        delta_y: f64,
        delta_z: f64,
        delta_roll: f64,
        delta_pitch: f64,
        delta_yaw: f64,
    ) -> Self {
        Self(ControlVec::from([
            delta_x,
            delta_y,
            delta_z,
            delta_roll,
            delta_pitch,
            delta_yaw,
        ]))
    }

    pub fn zeros() -> Self {
        Self(ControlVec::zeros())
    }

    pub fn as_vector(&self) -> &ControlVec {
        &self.0
    }
}

impl Default for KalmanControl {
    fn default() -> Self {
        Self::zeros()
    }
}

impl From<ControlVec> for KalmanControl {
    fn from(v: ControlVec) -> Self {
        Self(v)
    }
}

/// Sensor-observable state, same layout as [`KalmanState`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement(MeasurementVec);

impl Measurement {
    components! {
        X = 0 => x / set_x;
        Y = 1 => y / set_y;
        Z = 2 => z / set_z;
        YAW = 3 => yaw / set_yaw;
        PITCH = 4 => pitch / set_pitch;
        ROLL = 5 => roll / set_roll;
    }

    pub fn zeros() -> Self {
        Self(MeasurementVec::zeros())
    }

    pub fn as_vector(&self) -> &MeasurementVec {
        &self.0
    }
}

impl Default for Measurement {
    fn default() -> Self {
        Self::zeros()
    }
}

impl From<MeasurementVec> for Measurement {
    fn from(v: MeasurementVec) -> Self {
        Self(v)
    }
}

/// The two operations an external estimator needs from the system.
pub trait StateSpaceModel {
    /// Predict the next state from the current one and the commanded motion.
    fn transition(&self, state: &KalmanState, control: &KalmanControl) -> KalmanState;

    /// Predict the measurement expected in the given state.
    fn observe(&self, state: &KalmanState) -> Measurement;
}

/// Process model for a 6-DOF rigid body.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemModel;

impl SystemModel {
    pub fn new() -> Self {
        Self
    }

    /// Non-linear state transition.
    ///
    /// The control translation is rotated into the global frame by the
    /// current orientation; the control rotation is applied about the body
    /// axes (`current * delta`). Angles come back in the canonical ranges
    /// yaw, roll ∈ (-π, π] and pitch ∈ [-π/2, π/2].
    pub fn f(&self, state: &KalmanState, control: &KalmanControl) -> KalmanState {
        let current_orientation = state.angles().to_matrix();

        let local_delta = Position::new(control.delta_x(), control.delta_y(), control.delta_z());
        let new_position = state.position() + current_orientation * local_delta;

        let delta_orientation = rotation::compose(
            control.delta_yaw(),
            control.delta_pitch(),
            control.delta_roll(),
        );
        let new_orientation = current_orientation * delta_orientation;
        let angles = EulerAngles::from_matrix(&new_orientation);

        KalmanState::new(
            new_position.x,
            new_position.y,
            new_position.z,
            angles.yaw,
            angles.pitch,
            angles.roll,
        )
    }
}

/// Measurement model: the state is observed directly.
///
/// State and measurement spaces coincide dimension for dimension, so the
/// Jacobians are identity and are set once here.
#[derive(Clone, Debug)]
pub struct MeasurementModel {
    h: JacobianH,
    v: JacobianV,
}

impl Default for MeasurementModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementModel {
    pub fn new() -> Self {
        Self {
            h: JacobianH::identity(),
            v: JacobianV::identity(),
        }
    }

    /// Expected measurement for the given state.
    pub fn h(&self, state: &KalmanState) -> Measurement {
        Measurement(*state.as_vector())
    }

    /// Measurement Jacobian w.r.t. the state.
    pub fn jacobian_h(&self) -> &JacobianH {
        &self.h
    }

    /// Measurement Jacobian w.r.t. the measurement noise.
    pub fn jacobian_v(&self) -> &JacobianV {
        &self.v
    }
}

/// Process and measurement models bundled for injection into an estimator.
#[derive(Clone, Debug, Default)]
pub struct PoseModel {
    pub system: SystemModel,
    pub measurement: MeasurementModel,
}

impl PoseModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateSpaceModel for PoseModel {
    fn transition(&self, state: &KalmanState, control: &KalmanControl) -> KalmanState {
        self.system.f(state, control)
    }

    fn observe(&self, state: &KalmanState) -> Measurement {
        self.measurement.h(state)
    }
}
