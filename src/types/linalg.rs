//! Linear algebra type system for dead reckoning
//!
//! Provides compile-time dimension checking and clean type aliases
//! for the pose algebra and the filter model vectors.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

// ===== Pose Dimensions =====
pub const POSITION_ROWS: usize = 1;
pub const POSITION_COLS: usize = 3;
pub const ORIENTATION_ROWS: usize = 3;
pub const ORIENTATION_COLS: usize = 3;
pub const QUATERNION_ROWS: usize = 1;
pub const QUATERNION_COLS: usize = 4;

// ===== Filter Dimensions =====
pub const STATE_DIM: usize = 6; // x, y, z, yaw, pitch, roll
pub const CONTROL_DIM: usize = 6; // dx, dy, dz, droll, dpitch, dyaw
pub const MEASURE_DIM: usize = 6; // mirrors the state layout

// ===== Values per log sample =====
pub const VALUES_PER_SOURCE: usize = 6; // linear xyz + angular xyz

/// Position in the global frame [meters]
pub type Position = Vector3<f64>;

/// Rotation matrix (local -> global)
pub type Orientation = Matrix3<f64>;

pub type StateVec = SVector<f64, STATE_DIM>;
pub type ControlVec = SVector<f64, CONTROL_DIM>;
pub type MeasurementVec = SVector<f64, MEASURE_DIM>;

// Jacobian types
pub type JacobianH = SMatrix<f64, MEASURE_DIM, STATE_DIM>; // 6×6
pub type JacobianV = SMatrix<f64, MEASURE_DIM, MEASURE_DIM>; // 6×6
