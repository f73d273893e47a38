//! Dead Reckoning Trajectory Tests
//!
//! Synthetic trajectories replayed through the log reader, the pose
//! integrator and the filter models:
//! - Square path return-to-origin
//! - Climb with pitch
//! - Multi-source log averaging
//! - Estimator-style use of the injected models
//!
//! Run with: `cargo test --test dead_reckoning`

use std::f64::consts::FRAC_PI_2;
use std::io::Cursor;

use approx::assert_relative_eq;
use dead_reckoning_rs::{
    DeadReckoner, InitialPoseConfig, KalmanControl, KalmanState, MotionLogReader, Pose,
    PoseModel, StateSpaceModel,
};
use nalgebra::Vector3;

// ============================================================================
// Helpers
// ============================================================================

/// Build a single-source log: drive `side` meters, turn left 90°, four times.
fn square_log(side: f64) -> String {
    let mut log = String::from("# vx vy vz wx wy wz dt\n");
    for _ in 0..4 {
        log.push_str(&format!("{side} 0 0 0 0 0 1.0\n"));
        log.push_str(&format!("0 0 0 0 0 {} 1.0\n", FRAC_PI_2));
    }
    log
}

fn replay(log: &str, sources: usize, initial: Pose) -> DeadReckoner {
    let reader = MotionLogReader::new(Cursor::new(log.as_bytes().to_vec()), sources).unwrap();
    let mut reckoner = DeadReckoner::new(initial);
    reckoner.run(reader, |_, _| {}).unwrap();
    reckoner
}

// ============================================================================
// Trajectories
// ============================================================================

#[test]
fn test_square_returns_to_origin() {
    let reckoner = replay(&square_log(2.0), 1, Pose::default());
    assert_eq!(reckoner.steps(), 8);
    assert_relative_eq!(reckoner.pose().position(), Vector3::zeros(), epsilon = 1e-9);

    // Four quarter turns bring the heading back around.
    let heading = reckoner.pose().orientation_matrix() * Vector3::x();
    assert_relative_eq!(heading, Vector3::x(), epsilon = 1e-9);
}

#[test]
fn test_square_visits_corners() {
    let log = square_log(1.0);
    let reader = MotionLogReader::new(Cursor::new(log.into_bytes()), 1).unwrap();
    let mut reckoner = DeadReckoner::new(Pose::default());
    let mut corners = Vec::new();
    reckoner
        .run(reader, |r, report| {
            if report.step % 2 == 1 {
                corners.push(r.pose().position());
            }
        })
        .unwrap();

    let expected = [
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 0.0, 0.0),
    ];
    assert_eq!(corners.len(), expected.len());
    for (got, want) in corners.iter().zip(expected.iter()) {
        assert_relative_eq!(*got, *want, epsilon = 1e-9);
    }
}

#[test]
fn test_climb_with_pitch() {
    // A negative pitch about y raises the nose, so forward motion climbs.
    let log = "0 0 0 0 -0.5235987755982988 0 1\n10 0 0 0 0 0 1\n";
    let reckoner = replay(log, 1, Pose::default());
    let p = reckoner.pose().position();
    assert_relative_eq!(p.x, 10.0 * (0.5235987755982988f64).cos(), epsilon = 1e-9);
    assert_relative_eq!(p.z, 5.0, epsilon = 1e-9);
}

#[test]
fn test_two_sources_are_averaged() {
    let log = "1 0 0 0 0 0   3 0 0 0 0 0   1\n";
    let reckoner = replay(log, 2, Pose::default());
    assert_relative_eq!(reckoner.pose().position(), Vector3::new(2.0, 0.0, 0.0));
}

#[test]
fn test_initial_pose_from_config() {
    let yaml = r#"
position:
  rows: 1
  cols: 3
  data: [5.0, 5.0, 0.0]
orientation:
  rows: 1
  cols: 4
  data: [0.7071067811865476, 0.0, 0.0, 0.7071067811865476]
"#;
    let pose = InitialPoseConfig::from_yaml_str(yaml).unwrap().to_pose().unwrap();
    let reckoner = replay("1 0 0 0 0 0 3\n", 1, pose);
    // Facing +y after a 90° yaw.
    assert_relative_eq!(reckoner.pose().position(), Vector3::new(5.0, 8.0, 0.0), epsilon = 1e-9);
}

#[test]
fn test_truncated_log_aborts_replay() {
    let log = "1 0 0 0 0 0 1\n1 0 0 0 0";
    let reader = MotionLogReader::new(Cursor::new(log.as_bytes().to_vec()), 1).unwrap();
    let mut reckoner = DeadReckoner::new(Pose::default());
    let err = reckoner.run(reader, |_, _| {}).unwrap_err();
    assert!(err.to_string().contains("Incomplete log entry"));
    assert_eq!(reckoner.steps(), 1);
}

#[test]
fn test_excessive_turn_aborts_replay() {
    let log = "0 0 0 0 0 3.0 1\n";
    let reader = MotionLogReader::new(Cursor::new(log.as_bytes().to_vec()), 1).unwrap();
    let mut reckoner = DeadReckoner::new(Pose::default());
    assert!(reckoner.run(reader, |_, _| {}).is_err());
    assert_eq!(*reckoner.pose(), Pose::default());
}

// ============================================================================
// Estimator-style model use
// ============================================================================

/// Minimal predict/correct loop generic over the injected model, the way an
/// external filter drives it.
fn predict_and_innovate<M: StateSpaceModel>(
    model: &M,
    state: &KalmanState,
    control: &KalmanControl,
    observed: &KalmanState,
) -> (KalmanState, nalgebra::SVector<f64, 6>) {
    let predicted = model.transition(state, control);
    let expected = model.observe(&predicted);
    let innovation = observed.as_vector() - expected.as_vector();
    (predicted, innovation)
}

#[test]
fn test_perfect_observation_has_zero_innovation() {
    let model = PoseModel::new();
    let state = KalmanState::new(1.0, 0.0, 0.0, 0.2, 0.0, 0.0);
    let control = KalmanControl::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.1);

    let truth = model.transition(&state, &control);
    let (predicted, innovation) = predict_and_innovate(&model, &state, &control, &truth);

    assert_eq!(predicted, truth);
    assert_relative_eq!(innovation.norm(), 0.0);
}

#[test]
fn test_model_and_pose_agree_on_straight_step() {
    let model = PoseModel::new();
    let next = model.transition(
        &KalmanState::zeros(),
        &KalmanControl::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0),
    );

    let mut pose = Pose::default();
    pose.update_position(1.0, 0.0, 0.0);

    assert_eq!(next.position(), pose.position());
}
