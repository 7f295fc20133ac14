//! Linear blend skinning transforms
//!
//! For every joint `j` the skinning transform maps a skin vertex from the
//! bind pose into the current pose:
//!
//! ```text
//! S[j] = W_current[j] * inverse(W_bind[j])
//! ```
//!
//! Each vertex is bound to exactly one joint (see [`crate::assignment`]), so
//! deforming the skin is one matrix-point product per vertex. That product
//! normally runs in a vertex shader; [`skin_positions`] is the CPU version.
//!
//! The bind pose rarely changes, so [`SkinningCalculator`] resolves and
//! inverts it once and reuses the inverses for every frame.

use std::marker::PhantomData;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::coordinates::{GeneralizedCoordinates, MissingCoordinatePolicy};
use crate::error::{KinematicsError, Result};
use crate::gpu::{BoneMatrix3x4, matrices_as_bytes};
use crate::ids::EnumKey;
use crate::model::ArticulatedModel;
use crate::pose::PoseEvaluator;
use crate::skeleton::{JointTransforms, Skeleton};

/// Default threshold below which a bind transform counts as singular
pub const DEFAULT_SINGULAR_EPSILON: f32 = 1e-6;

/// Tunables for skinning transform computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinningConfig {
    /// Smallest accepted `|det|` of a bind-pose world transform
    pub singular_epsilon: f32,
    /// What to do with coordinates that have no value
    pub missing_coordinates: MissingCoordinatePolicy,
}

impl Default for SkinningConfig {
    fn default() -> Self {
        Self {
            singular_epsilon: DEFAULT_SINGULAR_EPSILON,
            missing_coordinates: MissingCoordinatePolicy::Zero,
        }
    }
}

/// One skinning matrix per joint, indexed by joint index.
///
/// Joints the skeleton does not contain hold the identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinningTransforms<J: EnumKey> {
    matrices: Vec<Mat4>,
    _joint: PhantomData<J>,
}

impl<J: EnumKey> SkinningTransforms<J> {
    fn identity() -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; J::count()],
            _joint: PhantomData,
        }
    }

    pub fn get(&self, joint: J) -> Mat4 {
        self.matrices[joint.index()]
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// `(joint, matrix)` pairs in joint index order
    pub fn iter(&self) -> impl Iterator<Item = (J, Mat4)> + '_ {
        J::ALL.iter().map(|j| (*j, self.matrices[j.index()]))
    }

    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Column-major bytes ready for a `mat4[]` uniform or storage buffer
    pub fn as_bytes(&self) -> &[u8] {
        matrices_as_bytes(&self.matrices)
    }

    /// Column-major float arrays, one per joint
    pub fn to_cols_arrays(&self) -> Vec<[f32; 16]> {
        self.matrices.iter().map(Mat4::to_cols_array).collect()
    }

    /// Compact 3x4 form for bone-matrix buffers
    pub fn to_bone_matrices(&self) -> Vec<BoneMatrix3x4> {
        self.matrices.iter().copied().map(BoneMatrix3x4::from_mat4).collect()
    }

    /// Whether every matrix is within `epsilon` of the identity
    pub fn is_identity(&self, epsilon: f32) -> bool {
        self.matrices
            .iter()
            .all(|m| m.abs_diff_eq(Mat4::IDENTITY, epsilon))
    }
}

/// Skinning transforms of model `M` against a fixed bind pose.
///
/// Owns its own skeleton instance; computing transforms never alters any
/// other skeleton, and the bind world transforms and their inverses are
/// cached until [`rebind`](Self::rebind).
#[derive(Debug, Clone)]
pub struct SkinningCalculator<M: ArticulatedModel> {
    skeleton: Skeleton<M::Joint, M::Body>,
    evaluator: PoseEvaluator<M>,
    config: SkinningConfig,
    bind_pose: GeneralizedCoordinates<M::Coordinate>,
    bind_world: JointTransforms<M::Joint>,
    /// Inverse bind world transforms in traversal order
    inverse_bind: Vec<(M::Joint, Mat4)>,
}

impl<M: ArticulatedModel> SkinningCalculator<M> {
    /// Resolve and invert `bind_pose`.
    ///
    /// Fails with [`KinematicsError::SingularBindTransform`] if any bind
    /// world transform is singular or non-finite.
    pub fn new(
        bind_pose: GeneralizedCoordinates<M::Coordinate>,
        config: SkinningConfig,
    ) -> Result<Self> {
        let skeleton = M::skeleton()?;
        let evaluator = PoseEvaluator::new(config.missing_coordinates);
        let (bind_world, inverse_bind) = invert_bind(&skeleton, &evaluator, &bind_pose, &config)?;

        tracing::debug!(
            model = M::NAME,
            joints = inverse_bind.len(),
            "bind pose resolved"
        );

        Ok(Self {
            skeleton,
            evaluator,
            config,
            bind_pose,
            bind_world,
            inverse_bind,
        })
    }

    /// Calculator bound to the model's own bind pose
    pub fn with_model_bind_pose(config: SkinningConfig) -> Result<Self> {
        Self::new(M::bind_pose(), config)
    }

    /// Replace the bind pose. On error the previous bind pose stays in effect.
    pub fn rebind(&mut self, bind_pose: GeneralizedCoordinates<M::Coordinate>) -> Result<()> {
        let (bind_world, inverse_bind) =
            invert_bind(&self.skeleton, &self.evaluator, &bind_pose, &self.config)?;
        self.bind_pose = bind_pose;
        self.bind_world = bind_world;
        self.inverse_bind = inverse_bind;
        tracing::debug!(model = M::NAME, "bind pose replaced");
        Ok(())
    }

    pub fn config(&self) -> &SkinningConfig {
        &self.config
    }

    pub fn bind_pose(&self) -> &GeneralizedCoordinates<M::Coordinate> {
        &self.bind_pose
    }

    /// World transforms of the bind pose
    pub fn bind_world_transforms(&self) -> &JointTransforms<M::Joint> {
        &self.bind_world
    }

    pub fn skeleton(&self) -> &Skeleton<M::Joint, M::Body> {
        &self.skeleton
    }

    /// World transforms of `current`
    pub fn world_transforms(
        &self,
        current: &GeneralizedCoordinates<M::Coordinate>,
    ) -> Result<JointTransforms<M::Joint>> {
        let local = self.evaluator.evaluate(current)?;
        self.skeleton.resolve(&local)
    }

    /// Skinning transform of every joint for the pose `current`
    pub fn compute(
        &self,
        current: &GeneralizedCoordinates<M::Coordinate>,
    ) -> Result<SkinningTransforms<M::Joint>> {
        let world = self.world_transforms(current)?;

        let mut transforms = SkinningTransforms::identity();
        for (joint, inverse) in &self.inverse_bind {
            transforms.matrices[joint.index()] = world[joint] * *inverse;
        }
        tracing::trace!(model = M::NAME, "skinning transforms computed");
        Ok(transforms)
    }
}

/// One-shot skinning transforms for `current` against `bind`.
///
/// Prefer [`SkinningCalculator`] when the bind pose is reused across frames.
pub fn compute_skinning_transforms<M: ArticulatedModel>(
    bind: &GeneralizedCoordinates<M::Coordinate>,
    current: &GeneralizedCoordinates<M::Coordinate>,
    config: SkinningConfig,
) -> Result<SkinningTransforms<M::Joint>> {
    SkinningCalculator::<M>::new(bind.clone(), config)?.compute(current)
}

#[allow(clippy::type_complexity)]
fn invert_bind<M: ArticulatedModel>(
    skeleton: &Skeleton<M::Joint, M::Body>,
    evaluator: &PoseEvaluator<M>,
    bind_pose: &GeneralizedCoordinates<M::Coordinate>,
    config: &SkinningConfig,
) -> Result<(JointTransforms<M::Joint>, Vec<(M::Joint, Mat4)>)> {
    let local = evaluator.evaluate(bind_pose)?;
    let bind_world = skeleton.resolve(&local)?;

    let mut inverse_bind = Vec::with_capacity(skeleton.joint_count());
    for joint in skeleton.traversal_order() {
        let world = bind_world[joint];
        let determinant = world.determinant();
        if !world.is_finite() || !determinant.is_finite() || determinant.abs() < config.singular_epsilon
        {
            tracing::warn!(
                joint = joint.name(),
                determinant,
                "singular bind transform"
            );
            return Err(KinematicsError::SingularBindTransform {
                joint: joint.name(),
                determinant,
            });
        }
        inverse_bind.push((*joint, world.inverse()));
    }
    Ok((bind_world, inverse_bind))
}

/// Deform `vertices` with one joint per vertex.
pub fn skin_positions<J: EnumKey>(
    vertices: &[Vec3],
    assignment: &[J],
    transforms: &SkinningTransforms<J>,
) -> Result<Vec<Vec3>> {
    let indices: Vec<usize> = assignment.iter().map(|j| j.index()).collect();
    skin_indexed(vertices, &indices, transforms.as_slice())
}

/// Deform `vertices` by raw joint index into `matrices`.
///
/// This is what a vertex shader does with a float joint-index attribute and
/// a matrix array.
pub fn skin_indexed(vertices: &[Vec3], indices: &[usize], matrices: &[Mat4]) -> Result<Vec<Vec3>> {
    if vertices.len() != indices.len() {
        return Err(KinematicsError::AssignmentLengthMismatch {
            vertices: vertices.len(),
            assignments: indices.len(),
        });
    }

    vertices
        .iter()
        .zip(indices)
        .enumerate()
        .map(|(vertex, (position, &index))| {
            let matrix = matrices
                .get(index)
                .ok_or(KinematicsError::JointIndexOutOfRange {
                    vertex,
                    index,
                    count: matrices.len(),
                })?;
            Ok(matrix.transform_point3(*position))
        })
        .collect()
}
