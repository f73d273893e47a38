//! Elementary rotations and their fixed yaw·pitch·roll composition.
//!
//! Axis convention: yaw turns about the vertical (z) axis, pitch about the
//! lateral (y) axis and roll about the longitudinal (x) axis. Every
//! orientation in this crate is built as `R = Rz(yaw) * Ry(pitch) * Rx(roll)`,
//! and [`EulerAngles::from_matrix`] is the exact inverse of that product for
//! pitch in [-π/2, π/2].

use nalgebra::{Matrix3, Rotation3, UnitQuaternion};

use crate::error::ValidationError;
use crate::types::Orientation;

/// Largest angle delta accepted for a single orientation update [rad]
pub const DEFAULT_MAX_DELTA_ANGLE: f64 = 2.0;

/// Rotation about the vertical axis (left/right).
pub fn yaw_matrix(yaw: f64) -> Orientation {
    let (s, c) = yaw.sin_cos();
    Matrix3::new(
        c, -s, 0.0, //
        s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Rotation about the lateral axis (up/down).
pub fn pitch_matrix(pitch: f64) -> Orientation {
    let (s, c) = pitch.sin_cos();
    Matrix3::new(
        c, 0.0, s, //
        0.0, 1.0, 0.0, //
        -s, 0.0, c,
    )
}

/// Rotation about the longitudinal axis (tilt).
pub fn roll_matrix(roll: f64) -> Orientation {
    let (s, c) = roll.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, -s, //
        0.0, s, c,
    )
}

/// Compose the three elementary rotations in yaw·pitch·roll order.
pub fn compose(yaw: f64, pitch: f64, roll: f64) -> Orientation {
    yaw_matrix(yaw) * pitch_matrix(pitch) * roll_matrix(roll)
}

/// Project a nearly-orthonormal matrix back onto a proper rotation.
///
/// Repeated products accumulate rounding error; going through a normalized
/// quaternion removes it.
pub fn renormalize(m: &Orientation) -> Orientation {
    to_unit_quaternion(m).to_rotation_matrix().into_inner()
}

/// Unit quaternion for a (nearly) orthonormal rotation matrix.
pub fn to_unit_quaternion(m: &Orientation) -> UnitQuaternion<f64> {
    let q = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*m));
    UnitQuaternion::new_normalize(q.into_inner())
}

/// Reject angle deltas outside `[-limit, limit]` (or non-finite).
///
/// All three angles are checked before anything is applied.
#[track_caller]
pub fn validate_deltas(
    origin: &'static str,
    delta_yaw: f64,
    delta_pitch: f64,
    delta_roll: f64,
    limit: f64,
) -> Result<(), ValidationError> {
    let valid = |angle: f64| angle.is_finite() && angle.abs() <= limit;
    if valid(delta_yaw) && valid(delta_pitch) && valid(delta_roll) {
        return Ok(());
    }
    Err(ValidationError::new(
        origin,
        format!(
            "Ill ranging values (radian deltas have a max of {limit} and a min of -{limit}). \
             Values provided: {delta_yaw}, {delta_pitch}, {delta_roll}"
        ),
    ))
}

/// Yaw/pitch/roll triple [rad]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EulerAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl EulerAngles {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn to_matrix(&self) -> Orientation {
        compose(self.yaw, self.pitch, self.roll)
    }

    /// Recover yaw/pitch/roll from a yaw·pitch·roll rotation matrix.
    ///
    /// Pitch uses `atan2` against the hypotenuse of the last row rather than
    /// `asin`, which stays well conditioned as pitch approaches ±π/2.
    pub fn from_matrix(m: &Orientation) -> Self {
        let yaw = m[(1, 0)].atan2(m[(0, 0)]);
        let pitch = (-m[(2, 0)]).atan2(m[(2, 1)].hypot(m[(2, 2)]));
        let roll = m[(2, 1)].atan2(m[(2, 2)]);
        Self { yaw, pitch, roll }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_zero_angles_give_identity() {
        assert_eq!(compose(0.0, 0.0, 0.0), Matrix3::identity());
    }

    #[test]
    fn test_yaw_turns_x_towards_y() {
        let v = yaw_matrix(FRAC_PI_2) * Vector3::x();
        assert_relative_eq!(v, Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_pitch_turns_z_towards_x() {
        let v = pitch_matrix(FRAC_PI_2) * Vector3::z();
        assert_relative_eq!(v, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_roll_turns_y_towards_z() {
        let v = roll_matrix(FRAC_PI_2) * Vector3::y();
        assert_relative_eq!(v, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_matches_nalgebra_euler_convention() {
        let (yaw, pitch, roll) = (0.7, -0.3, 1.1);
        let expected = Rotation3::from_euler_angles(roll, pitch, yaw).into_inner();
        assert_relative_eq!(compose(yaw, pitch, roll), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_composed_matrix_is_rotation() {
        let m = compose(1.2, 0.4, -0.9);
        assert_relative_eq!(m.transpose() * m, Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_euler_extraction_inverts_compose() {
        let angles = EulerAngles::new(-2.5, 0.6, 0.25);
        let back = EulerAngles::from_matrix(&angles.to_matrix());
        assert_relative_eq!(back.yaw, angles.yaw, epsilon = 1e-12);
        assert_relative_eq!(back.pitch, angles.pitch, epsilon = 1e-12);
        assert_relative_eq!(back.roll, angles.roll, epsilon = 1e-12);
    }

    #[test]
    fn test_euler_extraction_near_gimbal_lock() {
        let pitch = FRAC_PI_2 - 1e-9;
        let back = EulerAngles::from_matrix(&compose(0.0, pitch, 0.0));
        assert!(back.pitch.is_finite());
        assert_relative_eq!(back.pitch, pitch, epsilon = 1e-6);
    }

    #[test]
    fn test_renormalize_removes_drift() {
        let mut m = compose(0.3, 0.2, 0.1);
        m[(0, 0)] += 1e-6;
        let fixed = renormalize(&m);
        assert_relative_eq!(fixed.transpose() * fixed, Matrix3::identity(), epsilon = 1e-12);
        assert_relative_eq!(fixed, compose(0.3, 0.2, 0.1), epsilon = 1e-5);
    }

    #[test]
    fn test_unit_quaternion_from_matrix() {
        let q = to_unit_quaternion(&yaw_matrix(FRAC_PI_2));
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.angle(), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(
            q.to_rotation_matrix().into_inner(),
            yaw_matrix(FRAC_PI_2),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_validate_bounds_inclusive() {
        assert!(validate_deltas("t", 2.0, -2.0, 0.0, DEFAULT_MAX_DELTA_ANGLE).is_ok());
        assert!(validate_deltas("t", 2.1, 0.0, 0.0, DEFAULT_MAX_DELTA_ANGLE).is_err());
        assert!(validate_deltas("t", 0.0, 0.0, -2.1, DEFAULT_MAX_DELTA_ANGLE).is_err());
        assert!(validate_deltas("t", 0.0, f64::NAN, 0.0, DEFAULT_MAX_DELTA_ANGLE).is_err());
    }

    #[test]
    fn test_validate_names_offending_values() {
        let err = validate_deltas("update_orientation", 0.5, 3.0, 0.25, 2.0).unwrap_err();
        assert_eq!(err.origin(), "update_orientation");
        assert!(err.message().contains("0.5, 3, 0.25"));
    }
}
