//! Dead-reckoning driver.
//!
//! Owns the accumulated [`Pose`] and, alongside it, runs the same motion
//! through an injected [`StateSpaceModel`] so the filter-facing models can be
//! checked against the pose that plain integration produces.

use crate::error::Result;
use crate::filters::{KalmanState, Measurement, PoseModel, StateSpaceModel};
use crate::integrator::MotionDelta;
use crate::pose::Pose;
use crate::rotation::EulerAngles;
use crate::types::MotionEntry;

/// Outcome of a single processed entry.
#[derive(Clone, Debug)]
pub struct StepReport {
    /// 1-based index of the processed entry
    pub step: u64,
    pub delta: MotionDelta,
    /// Model-path state after the transition
    pub predicted: KalmanState,
    /// Measurement the model expects in `predicted`
    pub expected: Measurement,
}

pub struct DeadReckoner<M = PoseModel> {
    pose: Pose,
    model: M,
    predicted: KalmanState,
    steps: u64,
}

impl DeadReckoner<PoseModel> {
    pub fn new(initial: Pose) -> Self {
        Self::with_model(initial, PoseModel::new())
    }
}

impl<M: StateSpaceModel> DeadReckoner<M> {
    pub fn with_model(initial: Pose, model: M) -> Self {
        let predicted = state_from_pose(&initial);
        Self {
            pose: initial,
            model,
            predicted,
            steps: 0,
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn into_pose(self) -> Pose {
        self.pose
    }

    pub fn predicted(&self) -> &KalmanState {
        &self.predicted
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Integrate one log entry.
    ///
    /// The pose is left untouched if the entry's rotation is out of range.
    pub fn step(&mut self, entry: &MotionEntry) -> Result<StepReport> {
        if entry.dt == 0.0 {
            log::warn!("Entry {} has zero elapsed time", self.steps + 1);
        }
        let delta = MotionDelta::from_entry(entry);
        self.pose.apply_delta(&delta)?;

        let control = delta.to_control();
        self.predicted = self.model.transition(&self.predicted, &control);
        let expected = self.model.observe(&self.predicted);
        self.steps += 1;

        log::debug!(
            "step {}: dt={} delta_t=[{:.4}, {:.4}, {:.4}] {} | model {}",
            self.steps,
            entry.dt,
            delta.translation.x,
            delta.translation.y,
            delta.translation.z,
            self.pose,
            self.predicted
        );

        Ok(StepReport {
            step: self.steps,
            delta,
            predicted: self.predicted,
            expected,
        })
    }

    /// Process entries until the source is exhausted, calling `on_step`
    /// after each one. Stops at the first error.
    pub fn run<I, F>(&mut self, entries: I, mut on_step: F) -> Result<u64>
    where
        I: IntoIterator<Item = Result<MotionEntry>>,
        F: FnMut(&Self, &StepReport),
    {
        for entry in entries {
            let entry = entry?;
            let report = self.step(&entry)?;
            on_step(self, &report);
        }
        log::info!("Dead reckoning finished after {} steps", self.steps);
        Ok(self.steps)
    }
}

/// Express a pose in the filter's state layout.
pub fn state_from_pose(pose: &Pose) -> KalmanState {
    let p = pose.position();
    let angles = EulerAngles::from_matrix(pose.orientation_matrix());
    KalmanState::new(p.x, p.y, p.z, angles.yaw, angles.pitch, angles.roll)
}
