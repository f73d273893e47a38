//! Initial pose configuration loaded from YAML.
//!
//! ```yaml
//! position:
//!   rows: 1
//!   cols: 3
//!   data: [0.0, 0.0, 0.0]
//! orientation:          # 3×3 row-major rotation matrix ...
//!   rows: 3
//!   cols: 3
//!   data: [1, 0, 0, 0, 1, 0, 0, 0, 1]
//! # ... or a 1×4 quaternion (w, x, y, z):
//! #   rows: 1
//! #   cols: 4
//! #   data: [1, 0, 0, 0]
//! max_delta_angle: 2.0  # optional, radians
//! ```

use std::path::Path;

use nalgebra::{DMatrix, Quaternion};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::pose::Pose;
use crate::rotation::DEFAULT_MAX_DELTA_ANGLE;
use crate::types::{
    Position, ORIENTATION_COLS, ORIENTATION_ROWS, POSITION_COLS, POSITION_ROWS, QUATERNION_COLS,
    QUATERNION_ROWS,
};

/// A matrix written out as its shape plus row-major data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatrixBlock {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl MatrixBlock {
    fn has_shape(&self, rows: usize, cols: usize) -> bool {
        self.rows == rows && self.cols == cols
    }

    fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.rows, self.cols, &self.data)
    }

    fn check_data_len(&self, name: &str) -> std::result::Result<(), ValidationError> {
        if self.data.len() != self.rows * self.cols {
            return Err(ValidationError::new(
                "extract_initial_pose",
                format!(
                    "{name} block declares {}*{} but holds {} values",
                    self.rows,
                    self.cols,
                    self.data.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Initial pose document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitialPoseConfig {
    pub position: MatrixBlock,
    pub orientation: MatrixBlock,

    /// Bound on each per-step angle delta [rad]
    #[serde(default = "default_max_delta_angle")]
    pub max_delta_angle: f64,
}

fn default_max_delta_angle() -> f64 {
    DEFAULT_MAX_DELTA_ANGLE
}

impl InitialPoseConfig {
    /// Load and validate the configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !is_yaml_file(path) {
            return Err(ValidationError::new(
                "extract_initial_pose",
                format!(
                    "Initial information file '{}' is not a valid YAML file",
                    path.display()
                ),
            )
            .into());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate the configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: InitialPoseConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check block shapes and data lengths before anything is built.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !self.position.has_shape(POSITION_ROWS, POSITION_COLS) {
            return Err(ValidationError::new(
                "extract_initial_pose",
                format!(
                    "Translation matrix dimensions provided are invalid. Required: {}*{}. Provided: {}*{}",
                    POSITION_ROWS, POSITION_COLS, self.position.rows, self.position.cols
                ),
            ));
        }
        self.position.check_data_len("Position")?;

        if !(self.orientation.has_shape(ORIENTATION_ROWS, ORIENTATION_COLS)
            || self.orientation.has_shape(QUATERNION_ROWS, QUATERNION_COLS))
        {
            return Err(ValidationError::new(
                "extract_initial_pose",
                format!(
                    "Orientation dimensions provided are invalid. Required: {}*{} (matrix) or {}*{} (quaternion). Provided: {}*{}",
                    ORIENTATION_ROWS,
                    ORIENTATION_COLS,
                    QUATERNION_ROWS,
                    QUATERNION_COLS,
                    self.orientation.rows,
                    self.orientation.cols
                ),
            ));
        }
        self.orientation.check_data_len("Orientation")?;

        if !(self.max_delta_angle.is_finite() && self.max_delta_angle > 0.0) {
            return Err(ValidationError::new(
                "extract_initial_pose",
                format!(
                    "max_delta_angle must be a positive number of radians. Provided: {}",
                    self.max_delta_angle
                ),
            ));
        }
        Ok(())
    }

    /// Build the pose this configuration describes.
    pub fn to_pose(&self) -> std::result::Result<Pose, ValidationError> {
        self.validate()?;
        let pose = if self.orientation.has_shape(QUATERNION_ROWS, QUATERNION_COLS) {
            let p = &self.position.data;
            let q = &self.orientation.data;
            Pose::from_quaternion(
                Position::new(p[0], p[1], p[2]),
                Quaternion::new(q[0], q[1], q[2], q[3]),
            )?
        } else {
            Pose::from_matrices(&self.position.to_matrix(), &self.orientation.to_matrix())?
        };
        pose.with_max_delta_angle(self.max_delta_angle)
    }
}

/// Whether the path names a regular file with a `.yml`/`.yaml` extension.
///
/// Symlinks are followed.
pub fn is_yaml_file(path: &Path) -> bool {
    let is_file = std::fs::metadata(path)
        .map(|m| m.is_file())
        .unwrap_or(false);
    let has_yaml_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"))
        .unwrap_or(false);
    is_file && has_yaml_ext
}

/// Load the initial pose from a YAML file.
pub fn extract_initial_pose<P: AsRef<Path>>(path: P) -> Result<Pose> {
    let config = InitialPoseConfig::from_yaml_file(path)?;
    log::debug!(
        "Loaded initial pose config (max_delta_angle = {} rad)",
        config.max_delta_angle
    );
    Ok(config.to_pose()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    const MATRIX_YAML: &str = r#"
position:
  rows: 1
  cols: 3
  data: [1.0, 2.0, 3.0]
orientation:
  rows: 3
  cols: 3
  data: [0.0, -1.0, 0.0,
         1.0,  0.0, 0.0,
         0.0,  0.0, 1.0]
"#;

    const QUATERNION_YAML: &str = r#"
position:
  rows: 1
  cols: 3
  data: [0.0, 0.0, 0.0]
orientation:
  rows: 1
  cols: 4
  data: [2.0, 0.0, 0.0, 0.0]
max_delta_angle: 0.5
"#;

    #[test]
    fn test_matrix_orientation() {
        let config = InitialPoseConfig::from_yaml_str(MATRIX_YAML).unwrap();
        assert_eq!(config.max_delta_angle, DEFAULT_MAX_DELTA_ANGLE);

        let mut pose = config.to_pose().unwrap();
        assert_eq!(pose.position(), Vector3::new(1.0, 2.0, 3.0));

        // Row-major data: a quarter turn to the left.
        pose.update_position(1.0, 0.0, 0.0);
        assert_relative_eq!(pose.position(), Vector3::new(1.0, 3.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_quaternion_orientation_is_normalized() {
        let config = InitialPoseConfig::from_yaml_str(QUATERNION_YAML).unwrap();
        let pose = config.to_pose().unwrap();
        assert_relative_eq!(
            pose.orientation().coords,
            UnitQuaternion::<f64>::identity().coords,
            epsilon = 1e-12
        );
        assert_eq!(pose.max_delta_angle(), 0.5);
    }

    #[test]
    fn test_position_dimension_mismatch() {
        let yaml = MATRIX_YAML.replace("rows: 1\n  cols: 3", "rows: 3\n  cols: 1");
        let err = InitialPoseConfig::from_yaml_str(&yaml).unwrap_err();
        let validation = err.as_validation().expect("validation error");
        assert!(validation.message().contains("Required: 1*3. Provided: 3*1"));
    }

    #[test]
    fn test_orientation_dimension_mismatch() {
        let yaml = MATRIX_YAML.replace("rows: 3\n  cols: 3", "rows: 2\n  cols: 3");
        let err = InitialPoseConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(err.as_validation().is_some());
    }

    #[test]
    fn test_data_length_mismatch() {
        let yaml = MATRIX_YAML.replace("[1.0, 2.0, 3.0]", "[1.0, 2.0]");
        let err = InitialPoseConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(err.as_validation().unwrap().message().contains("holds 2 values"));
    }

    #[test]
    fn test_missing_block_is_parse_error() {
        let err = InitialPoseConfig::from_yaml_str("position:\n  rows: 1\n").unwrap_err();
        assert!(matches!(err, crate::error::Error::Yaml(_)));
    }

    #[test]
    fn test_non_positive_bound_rejected() {
        let yaml = QUATERNION_YAML.replace("max_delta_angle: 0.5", "max_delta_angle: -1.0");
        assert!(InitialPoseConfig::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn test_non_yaml_path_rejected() {
        let err = extract_initial_pose("Cargo.toml").unwrap_err();
        assert!(err
            .as_validation()
            .unwrap()
            .message()
            .contains("is not a valid YAML file"));
    }
}
