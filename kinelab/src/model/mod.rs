//! Articulated models
//!
//! A model fixes the joint/body/coordinate enumerations, the tree shape and
//! the forward-kinematics formula mapping coordinates to local transforms.
//!
//! - [`lower_limb`] - pelvis, right leg and torso (seven joints)
//! - [`segment`] - planar two-segment chain

pub mod lower_limb;
pub mod segment;

use crate::coordinates::GeneralizedCoordinates;
use crate::error::Result;
use crate::ids::EnumKey;
use crate::skeleton::{JointTransforms, Skeleton};

/// Kinematic structure of one articulated figure.
pub trait ArticulatedModel {
    type Joint: EnumKey;
    type Body: EnumKey;
    type Coordinate: EnumKey;

    /// Short identifier used in manifests and logs
    const NAME: &'static str;

    /// Build the joint tree with its bodies (identity local transforms)
    fn skeleton() -> Result<Skeleton<Self::Joint, Self::Body>>;

    /// Local transform of every joint for the coordinate set `q`.
    ///
    /// Pure: identical input gives bit-identical output. Unset coordinates
    /// read as zero. The result has an entry for every joint.
    fn evaluate_pose(q: &GeneralizedCoordinates<Self::Coordinate>) -> JointTransforms<Self::Joint>;

    /// Pose the skin mesh was modelled in
    fn bind_pose() -> GeneralizedCoordinates<Self::Coordinate>;
}
