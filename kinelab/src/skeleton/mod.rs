//! Joint/body hierarchy and local-to-world transform resolution
//!
//! A [`Skeleton`] exclusively owns its joints and bodies. Joints refer to
//! their parent by id and bodies refer to their joint by id, so the tree is
//! a pair of id-keyed maps rather than a web of pointers. The parent graph
//! is validated once in [`SkeletonBuilder::build`]; afterwards the
//! topological order computed there drives every traversal.

mod builder;
mod resolve;

#[cfg(test)]
mod tests;

pub use builder::SkeletonBuilder;

use glam::Mat4;
use hashbrown::HashMap;

use crate::error::{KinematicsError, Result};
use crate::ids::EnumKey;

/// Per-joint matrices keyed by joint id (local or world, depending on use)
pub type JointTransforms<J> = HashMap<J, Mat4>;

/// Node of the kinematic tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint<J: EnumKey> {
    id: J,
    parent: Option<J>,
    local: Mat4,
}

impl<J: EnumKey> Joint<J> {
    pub fn id(&self) -> J {
        self.id
    }

    /// Parent joint, `None` for the root
    pub fn parent(&self) -> Option<J> {
        self.parent
    }

    /// Transform from this joint's frame to its parent's frame
    pub fn local_transform(&self) -> Mat4 {
        self.local
    }
}

/// Opaque handle to a renderable geometry owned by a body.
///
/// The core never loads or draws geometry; it only keeps the handle with
/// the body so a renderer can place it with the body's world transform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Geometry {
    source: String,
}

impl Geometry {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Asset path or name the renderer resolves
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Rigid segment attached to exactly one joint.
#[derive(Debug, Clone, PartialEq)]
pub struct Body<J: EnumKey, B: EnumKey> {
    id: B,
    joint: J,
    geometries: Vec<Geometry>,
}

impl<J: EnumKey, B: EnumKey> Body<J, B> {
    pub fn id(&self) -> B {
        self.id
    }

    /// Joint the body moves with
    pub fn joint(&self) -> J {
        self.joint
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }
}

/// World placement of one body, as consumed by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyTransform<'a, J: EnumKey, B: EnumKey> {
    pub body: B,
    pub joint: J,
    pub world: Mat4,
    pub geometries: &'a [Geometry],
}

/// Validated joint tree plus the bodies attached to it.
#[derive(Debug, Clone)]
pub struct Skeleton<J: EnumKey, B: EnumKey> {
    joints: HashMap<J, Joint<J>>,
    bodies: HashMap<B, Body<J, B>>,
    /// Topological order, root first
    order: Vec<J>,
    /// World transforms of the current local transforms, `None` when stale
    world: Option<JointTransforms<J>>,
}

impl<J: EnumKey, B: EnumKey> Skeleton<J, B> {
    pub fn builder() -> SkeletonBuilder<J, B> {
        SkeletonBuilder::new()
    }

    pub fn root(&self) -> J {
        self.order[0]
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn contains(&self, joint: J) -> bool {
        self.joints.contains_key(&joint)
    }

    pub fn joint(&self, joint: J) -> Option<&Joint<J>> {
        self.joints.get(&joint)
    }

    /// Joints in traversal order (every parent precedes its children)
    pub fn joints(&self) -> impl Iterator<Item = &Joint<J>> {
        self.order.iter().map(|id| &self.joints[id])
    }

    /// Joint ids in traversal order
    pub fn traversal_order(&self) -> &[J] {
        &self.order
    }

    pub fn body(&self, body: B) -> Option<&Body<J, B>> {
        self.bodies.get(&body)
    }

    /// Bodies ordered by id
    pub fn bodies(&self) -> Vec<&Body<J, B>> {
        let mut bodies: Vec<_> = self.bodies.values().collect();
        bodies.sort_by_key(|b| b.id);
        bodies
    }

    /// Overwrite the local transform of every joint in `pose`.
    ///
    /// Joints absent from `pose` keep their previous local transform. The
    /// cached world transforms are invalidated. If any id is unknown the
    /// skeleton is left untouched.
    pub fn set_pose(&mut self, pose: &JointTransforms<J>) -> Result<()> {
        if let Some(unknown) = pose.keys().find(|id| !self.joints.contains_key(*id)) {
            return Err(KinematicsError::UnknownJoint(unknown.name()));
        }
        for (id, local) in pose {
            if let Some(joint) = self.joints.get_mut(id) {
                joint.local = *local;
            }
        }
        self.world = None;
        tracing::trace!(joints = pose.len(), "pose applied");
        Ok(())
    }

    /// World transform of every joint for the current local transforms.
    ///
    /// Resolved on first call after [`set_pose`](Self::set_pose) and cached
    /// until the next pose change.
    pub fn joint_world_transforms(&mut self) -> &JointTransforms<J> {
        self.world
            .get_or_insert_with(|| resolve::resolve_world(&self.order, &self.joints, None))
    }

    /// World transform of one joint
    pub fn world_transform(&mut self, joint: J) -> Result<Mat4> {
        if !self.contains(joint) {
            return Err(KinematicsError::UnknownJoint(joint.name()));
        }
        Ok(self.joint_world_transforms()[&joint])
    }

    /// Resolve world transforms for `pose` without touching the skeleton.
    ///
    /// Joints absent from `pose` use their stored local transform, exactly
    /// as if `pose` had been passed to [`set_pose`](Self::set_pose) first.
    pub fn resolve(&self, pose: &JointTransforms<J>) -> Result<JointTransforms<J>> {
        if let Some(unknown) = pose.keys().find(|id| !self.joints.contains_key(*id)) {
            return Err(KinematicsError::UnknownJoint(unknown.name()));
        }
        Ok(resolve::resolve_world(&self.order, &self.joints, Some(pose)))
    }

    /// World placement of every body, ordered by body id
    pub fn body_transforms(&mut self) -> Vec<BodyTransform<'_, J, B>> {
        let world = self
            .world
            .get_or_insert_with(|| resolve::resolve_world(&self.order, &self.joints, None));

        let mut placed: Vec<_> = self
            .bodies
            .values()
            .map(|body| BodyTransform {
                body: body.id,
                joint: body.joint,
                world: world[&body.joint],
                geometries: &body.geometries,
            })
            .collect();
        placed.sort_by_key(|p| p.body);
        placed
    }
}
