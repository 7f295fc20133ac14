//! Forward kinematics: generalized coordinates to local joint transforms

use std::marker::PhantomData;

use crate::coordinates::{GeneralizedCoordinates, MissingCoordinatePolicy};
use crate::error::Result;
use crate::model::ArticulatedModel;
use crate::skeleton::JointTransforms;

/// Local transforms of every joint of `M` for `q`; unset coordinates are zero.
pub fn evaluate_pose<M: ArticulatedModel>(
    q: &GeneralizedCoordinates<M::Coordinate>,
) -> JointTransforms<M::Joint> {
    M::evaluate_pose(q)
}

/// Pose evaluation with a policy for unset coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PoseEvaluator<M: ArticulatedModel> {
    policy: MissingCoordinatePolicy,
    _model: PhantomData<M>,
}

impl<M: ArticulatedModel> Default for PoseEvaluator<M> {
    fn default() -> Self {
        Self::new(MissingCoordinatePolicy::default())
    }
}

impl<M: ArticulatedModel> PoseEvaluator<M> {
    pub fn new(policy: MissingCoordinatePolicy) -> Self {
        Self {
            policy,
            _model: PhantomData,
        }
    }

    pub fn policy(&self) -> MissingCoordinatePolicy {
        self.policy
    }

    /// Check `q` against the policy, then evaluate it.
    pub fn evaluate(
        &self,
        q: &GeneralizedCoordinates<M::Coordinate>,
    ) -> Result<JointTransforms<M::Joint>> {
        q.check(self.policy)?;
        Ok(M::evaluate_pose(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KinematicsError;
    use crate::ids::EnumKey;
    use crate::model::lower_limb::{CoordinateName, JointName, LowerLimb};
    use crate::model::segment::{SegmentCoordinate, TwoSegment};

    #[test]
    fn lenient_evaluator_accepts_partial_sets() {
        let evaluator = PoseEvaluator::<LowerLimb>::default();
        let q = GeneralizedCoordinates::new().with(CoordinateName::KNEE_R_FLEX, 20.0);
        let pose = evaluator.evaluate(&q).unwrap();
        assert_eq!(pose, evaluate_pose::<LowerLimb>(&q));
        assert!(pose.contains_key(&JointName::MTP_R));
    }

    #[test]
    fn strict_evaluator_rejects_partial_sets() {
        let evaluator = PoseEvaluator::<LowerLimb>::new(MissingCoordinatePolicy::Reject);
        let partial: GeneralizedCoordinates<CoordinateName> = LowerLimb::bind_pose()
            .iter()
            .filter(|(c, _)| *c != CoordinateName::PELVIS_ROT_Y)
            .collect();
        let err = evaluator.evaluate(&partial).unwrap_err();
        assert_eq!(err, KinematicsError::MissingCoordinate("PELVIS_ROT_Y"));
    }

    #[test]
    fn strict_evaluator_accepts_model_bind_pose() {
        let evaluator = PoseEvaluator::<LowerLimb>::new(MissingCoordinatePolicy::Reject);
        let pose = evaluator.evaluate(&LowerLimb::bind_pose()).unwrap();
        assert_eq!(pose.len(), JointName::count());
    }

    #[test]
    fn strict_evaluator_accepts_complete_sets() {
        let evaluator = PoseEvaluator::<TwoSegment>::new(MissingCoordinatePolicy::Reject);
        let q = GeneralizedCoordinates::new()
            .with(SegmentCoordinate::THETA_0, 10.0)
            .with(SegmentCoordinate::THETA_1, -10.0);
        assert_eq!(evaluator.evaluate(&q).unwrap().len(), 2);
    }
}
