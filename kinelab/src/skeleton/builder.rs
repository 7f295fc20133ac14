use glam::Mat4;
use hashbrown::{HashMap, HashSet};

use super::{Body, Geometry, Joint, Skeleton};
use crate::error::{KinematicsError, Result};
use crate::ids::EnumKey;

/// Collects joint and body declarations and validates them into a [`Skeleton`].
#[derive(Debug, Clone)]
pub struct SkeletonBuilder<J: EnumKey, B: EnumKey> {
    joints: Vec<Joint<J>>,
    bodies: Vec<Body<J, B>>,
}

impl<J: EnumKey, B: EnumKey> Default for SkeletonBuilder<J, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J: EnumKey, B: EnumKey> SkeletonBuilder<J, B> {
    pub fn new() -> Self {
        Self {
            joints: Vec::new(),
            bodies: Vec::new(),
        }
    }

    /// Declare a joint with an identity local transform
    pub fn joint(self, id: J, parent: Option<J>) -> Self {
        self.joint_with_local(id, parent, Mat4::IDENTITY)
    }

    /// Declare a joint with an initial local transform
    pub fn joint_with_local(mut self, id: J, parent: Option<J>, local: Mat4) -> Self {
        self.joints.push(Joint { id, parent, local });
        self
    }

    /// Attach a body and its geometries to `joint`
    pub fn body<I>(mut self, id: B, joint: J, geometries: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.bodies.push(Body {
            id,
            joint,
            geometries: geometries.into_iter().map(Geometry::new).collect(),
        });
        self
    }

    /// Validate the declarations and produce the skeleton.
    ///
    /// Rejects duplicate ids, dangling parent or body references, forests
    /// (zero or several roots) and cycles.
    pub fn build(self) -> Result<Skeleton<J, B>> {
        if self.joints.is_empty() {
            return Err(KinematicsError::EmptySkeleton);
        }

        let mut joints: HashMap<J, Joint<J>> = HashMap::with_capacity(self.joints.len());
        // Declaration order, so traversal order is reproducible.
        let mut declared = Vec::with_capacity(self.joints.len());
        for joint in self.joints {
            if joints.contains_key(&joint.id) {
                return Err(KinematicsError::DuplicateJoint(joint.id.name()));
            }
            declared.push(joint.id);
            joints.insert(joint.id, joint);
        }

        let mut roots = Vec::new();
        for id in &declared {
            match joints[id].parent {
                None => roots.push(*id),
                Some(parent) if !joints.contains_key(&parent) => {
                    return Err(KinematicsError::UnknownParent {
                        joint: id.name(),
                        parent: parent.name(),
                    });
                }
                Some(_) => {}
            }
        }
        let root = match roots.as_slice() {
            [] => return Err(KinematicsError::NoRoot),
            [root] => *root,
            _ => {
                return Err(KinematicsError::MultipleRoots(
                    roots.iter().map(|r| r.name()).collect(),
                ));
            }
        };

        let order = topological_order(root, &declared, &joints)?;

        let mut bodies = HashMap::with_capacity(self.bodies.len());
        for body in self.bodies {
            if !joints.contains_key(&body.joint) {
                return Err(KinematicsError::UnknownBodyJoint {
                    body: body.id.name(),
                    joint: body.joint.name(),
                });
            }
            if bodies.contains_key(&body.id) {
                return Err(KinematicsError::DuplicateBody(body.id.name()));
            }
            bodies.insert(body.id, body);
        }

        tracing::debug!(
            joints = order.len(),
            bodies = bodies.len(),
            root = root.name(),
            "skeleton built"
        );

        Ok(Skeleton {
            joints,
            bodies,
            order,
            world: None,
        })
    }
}

/// Breadth-first order from `root`; children follow declaration order.
///
/// Any joint not reached from the root sits on (or hangs below) a cycle,
/// since every non-root joint has a declared parent.
fn topological_order<J: EnumKey>(
    root: J,
    declared: &[J],
    joints: &HashMap<J, Joint<J>>,
) -> Result<Vec<J>> {
    let mut children: HashMap<J, Vec<J>> = HashMap::new();
    for id in declared {
        if let Some(parent) = joints[id].parent {
            children.entry(parent).or_default().push(*id);
        }
    }

    let mut order = Vec::with_capacity(declared.len());
    let mut visited = HashSet::with_capacity(declared.len());
    order.push(root);
    visited.insert(root);

    let mut next = 0;
    while next < order.len() {
        let current = order[next];
        next += 1;
        for child in children.get(&current).into_iter().flatten() {
            if visited.insert(*child) {
                order.push(*child);
            }
        }
    }

    if order.len() < declared.len() {
        let stuck = declared
            .iter()
            .find(|id| !visited.contains(*id))
            .copied()
            .unwrap_or(root);
        return Err(KinematicsError::Cycle(stuck.name()));
    }

    Ok(order)
}
