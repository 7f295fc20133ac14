//! Kinelab - skeletal forward kinematics and linear blend skinning
//!
//! Turns a set of generalized coordinates (joint angles and pelvis
//! translation) into per-joint skinning matrices that deform a skin mesh
//! from its bind pose into the current pose. Rendering is left to the
//! caller; the matrices come out in GPU upload layouts.
//!
//! # Architecture
//!
//! - [`ArticulatedModel`] - joint tree, forward-kinematics formula and bind pose of a figure
//! - [`Skeleton`] - validated joint/body tree resolving local to world transforms
//! - [`PoseEvaluator`] - coordinates to local joint transforms
//! - [`SkinningCalculator`] - `current_world * inverse(bind_world)` per joint
//! - [`RegionClassifier`] - binds each skin vertex to one joint
//! - [`AnimationSampler`] - drives coordinates over time and skins each frame
//!
//! # Usage
//!
//! ```
//! use kinelab::model::lower_limb::{CoordinateName, JointName, LowerLimb};
//! use kinelab::{ArticulatedModel, SkinningCalculator, SkinningConfig};
//!
//! let calculator =
//!     SkinningCalculator::<LowerLimb>::with_model_bind_pose(SkinningConfig::default())?;
//! let pose = LowerLimb::bind_pose().with(CoordinateName::KNEE_R_FLEX, -40.0);
//! let transforms = calculator.compute(&pose)?;
//!
//! assert!(transforms.get(JointName::BASE).abs_diff_eq(glam::Mat4::IDENTITY, 1e-5));
//! # Ok::<(), kinelab::KinematicsError>(())
//! ```

pub mod assignment;
pub mod coordinates;
pub mod driver;
pub mod error;
pub mod gpu;
pub mod ids;
pub mod model;
pub mod pose;
pub mod skeleton;
pub mod skinning;

pub use assignment::{
    AxisRange, Bound, RegionBox, RegionClassifier, RegionRule, assignment_attribute,
    joint_histogram,
};
pub use coordinates::{GeneralizedCoordinates, MissingCoordinatePolicy};
pub use driver::{AnimationSampler, CoordinateDriver, Frame, SinusoidChannel, SinusoidDriver};
pub use error::{KinematicsError, Result};
pub use gpu::BoneMatrix3x4;
pub use ids::{EnumKey, parse_coordinate};
pub use model::ArticulatedModel;
pub use model::lower_limb::LowerLimb;
pub use model::segment::TwoSegment;
pub use pose::{PoseEvaluator, evaluate_pose};
pub use skeleton::{Body, BodyTransform, Geometry, Joint, JointTransforms, Skeleton, SkeletonBuilder};
pub use skinning::{
    SkinningCalculator, SkinningConfig, SkinningTransforms, compute_skinning_transforms,
    skin_indexed, skin_positions,
};
