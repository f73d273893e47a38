//! Rigid-body pose (position + orientation) and its incremental updates.

use std::fmt;

use nalgebra::{DMatrix, Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::integrator::MotionDelta;
use crate::rotation::{self, DEFAULT_MAX_DELTA_ANGLE};
use crate::types::{
    Orientation, Position, ORIENTATION_COLS, ORIENTATION_ROWS, POSITION_COLS, POSITION_ROWS,
};

/// Tolerance used when checking that a supplied matrix is a rotation.
const ROTATION_TOLERANCE: f64 = 1e-6;

/// Serializable view of a pose for reporting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSnapshot {
    /// Global position [meters]
    pub position: [f64; 3],

    /// Unit quaternion (w, x, y, z)
    pub orientation: [f64; 4],
}

/// Position and orientation of a rigid body in the global frame.
///
/// The orientation is stored as a rotation matrix so that updates are plain
/// matrix products; quaternions are only used at the boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    position: Position,
    orientation: Orientation,
    max_delta_angle: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Position::zeros(),
            orientation: Orientation::identity(),
            max_delta_angle: DEFAULT_MAX_DELTA_ANGLE,
        }
    }
}

impl Pose {
    /// Identity orientation at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pose from a position and a (not necessarily normalized)
    /// quaternion.
    pub fn from_quaternion(
        position: Position,
        orientation: Quaternion<f64>,
    ) -> Result<Self, ValidationError> {
        let norm = orientation.norm();
        if !norm.is_finite() || norm < f64::EPSILON {
            return Err(ValidationError::new(
                "from_quaternion",
                format!("Orientation quaternion cannot be normalized (norm {norm})"),
            ));
        }
        if !position.iter().all(|v| v.is_finite()) {
            return Err(ValidationError::new(
                "from_quaternion",
                format!("Position must be finite. Provided: {:?}", position.as_slice()),
            ));
        }
        let unit = UnitQuaternion::from_quaternion(orientation);
        Ok(Self {
            position,
            orientation: unit.to_rotation_matrix().into_inner(),
            ..Self::default()
        })
    }

    /// Build a pose from raw matrices: a 1×3 position row and a 3×3
    /// rotation matrix.
    pub fn from_matrices(
        position: &DMatrix<f64>,
        orientation: &DMatrix<f64>,
    ) -> Result<Self, ValidationError> {
        if position.shape() != (POSITION_ROWS, POSITION_COLS) {
            return Err(ValidationError::new(
                "from_matrices",
                format!(
                    "Translation matrix dimensions provided are invalid. Required: {}*{}. Provided: {}*{}",
                    POSITION_ROWS,
                    POSITION_COLS,
                    position.nrows(),
                    position.ncols()
                ),
            ));
        }
        if orientation.shape() != (ORIENTATION_ROWS, ORIENTATION_COLS) {
            return Err(ValidationError::new(
                "from_matrices",
                format!(
                    "Orientation (rotation) matrix dimensions provided are invalid. Required: {}*{}. Provided: {}*{}",
                    ORIENTATION_ROWS,
                    ORIENTATION_COLS,
                    orientation.nrows(),
                    orientation.ncols()
                ),
            ));
        }

        let position = Position::new(position[(0, 0)], position[(0, 1)], position[(0, 2)]);
        let orientation: Orientation = orientation.fixed_view::<3, 3>(0, 0).into_owned();

        let orthogonality_error = (orientation.transpose() * orientation - Orientation::identity()).norm();
        let determinant = orientation.determinant();
        if !(orthogonality_error < ROTATION_TOLERANCE && (determinant - 1.0).abs() < ROTATION_TOLERANCE) {
            return Err(ValidationError::new(
                "from_matrices",
                format!(
                    "Orientation matrix is not a proper rotation (|RᵀR - I| = {orthogonality_error:e}, det = {determinant})"
                ),
            ));
        }
        if !position.iter().all(|v| v.is_finite()) {
            return Err(ValidationError::new(
                "from_matrices",
                format!("Position must be finite. Provided: {:?}", position.as_slice()),
            ));
        }

        Ok(Self {
            position,
            orientation: rotation::renormalize(&orientation),
            ..Self::default()
        })
    }

    /// Replace the per-update angle bound (radians, applied symmetrically).
    ///
    /// The bound must be a finite, positive number of radians.
    pub fn with_max_delta_angle(mut self, max_delta_angle: f64) -> Result<Self, ValidationError> {
        if !(max_delta_angle.is_finite() && max_delta_angle > 0.0) {
            return Err(ValidationError::new(
                "with_max_delta_angle",
                format!(
                    "max_delta_angle must be a positive number of radians. Provided: {max_delta_angle}"
                ),
            ));
        }
        self.max_delta_angle = max_delta_angle;
        Ok(self)
    }

    pub fn max_delta_angle(&self) -> f64 {
        self.max_delta_angle
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Current orientation as a unit quaternion.
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        rotation::to_unit_quaternion(&self.orientation)
    }

    /// Current orientation in its stored matrix form.
    pub fn orientation_matrix(&self) -> &Orientation {
        &self.orientation
    }

    /// Move by a displacement expressed in the body's local frame.
    pub fn update_position(&mut self, delta_x: f64, delta_y: f64, delta_z: f64) {
        self.position +=
            Self::calculate_delta_position(delta_x, delta_y, delta_z, &self.orientation);
    }

    /// Rotate by yaw/pitch/roll deltas about the body's own axes.
    ///
    /// Fails without touching the pose if any delta lies outside the
    /// configured bound.
    pub fn update_orientation(
        &mut self,
        delta_yaw: f64,
        delta_pitch: f64,
        delta_roll: f64,
    ) -> Result<(), ValidationError> {
        let delta = Self::calculate_delta_orientation(
            delta_yaw,
            delta_pitch,
            delta_roll,
            self.max_delta_angle,
        )?;
        self.orientation = rotation::renormalize(&(self.orientation * delta));
        Ok(())
    }

    /// Apply a full motion step: translation first, then rotation.
    ///
    /// The rotation is validated before the translation is applied.
    pub fn apply_delta(&mut self, delta: &MotionDelta) -> Result<(), ValidationError> {
        let angles = delta.rotation;
        rotation::validate_deltas(
            "apply_delta",
            angles.yaw,
            angles.pitch,
            angles.roll,
            self.max_delta_angle,
        )?;
        let t = delta.translation;
        self.update_position(t.x, t.y, t.z);
        self.update_orientation(angles.yaw, angles.pitch, angles.roll)
    }

    /// Rotate a local-frame displacement into the global frame.
    pub fn calculate_delta_position(
        delta_x: f64,
        delta_y: f64,
        delta_z: f64,
        global_orientation: &Orientation,
    ) -> Position {
        global_orientation * Vector3::new(delta_x, delta_y, delta_z)
    }

    /// Validated delta rotation for the given yaw/pitch/roll increments.
    pub fn calculate_delta_orientation(
        delta_yaw: f64,
        delta_pitch: f64,
        delta_roll: f64,
        max_delta_angle: f64,
    ) -> Result<Orientation, ValidationError> {
        rotation::validate_deltas(
            "calculate_delta_orientation",
            delta_yaw,
            delta_pitch,
            delta_roll,
            max_delta_angle,
        )?;
        Ok(rotation::compose(delta_yaw, delta_pitch, delta_roll))
    }

    pub fn snapshot(&self) -> PoseSnapshot {
        let q = self.orientation();
        PoseSnapshot {
            position: [self.position.x, self.position.y, self.position.z],
            orientation: [q.w, q.i, q.j, q.k],
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.position;
        let q = self.orientation();
        write!(
            f,
            "Position: ({}, {}, {}). Orientation: ({}, {}, {}, {})",
            p.x, p.y, p.z, q.w, q.i, q.j, q.k
        )
    }
}
