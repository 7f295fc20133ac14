//! Error types for skeleton construction, pose evaluation and skinning.

/// Errors raised by the kinematics and skinning pipeline.
///
/// Every variant is a programming or data error. Nothing here is retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KinematicsError {
    /// A joint id was used that the skeleton does not contain
    #[error("unknown joint '{0}'")]
    UnknownJoint(&'static str),

    /// A coordinate name did not match any coordinate of the model
    #[error("unknown coordinate '{0}'")]
    UnknownCoordinate(String),

    /// Strict evaluation found a coordinate without a value
    #[error("missing generalized coordinate '{0}'")]
    MissingCoordinate(&'static str),

    /// The same joint was declared twice while building a skeleton
    #[error("joint '{0}' declared more than once")]
    DuplicateJoint(&'static str),

    /// The same body was declared twice while building a skeleton
    #[error("body '{0}' declared more than once")]
    DuplicateBody(&'static str),

    /// A joint names a parent that was never declared
    #[error("joint '{joint}' references unknown parent '{parent}'")]
    UnknownParent {
        joint: &'static str,
        parent: &'static str,
    },

    /// A body is attached to a joint that was never declared
    #[error("body '{body}' is attached to unknown joint '{joint}'")]
    UnknownBodyJoint {
        body: &'static str,
        joint: &'static str,
    },

    /// The skeleton has no joints at all
    #[error("skeleton has no joints")]
    EmptySkeleton,

    /// Every joint has a parent, so no traversal can start
    #[error("skeleton has no root joint")]
    NoRoot,

    /// More than one joint has no parent
    #[error("skeleton has {count} root joints, expected exactly one: {roots:?}", count = .0.len(), roots = .0)]
    MultipleRoots(Vec<&'static str>),

    /// The parent graph loops back on itself
    #[error("joint graph contains a cycle through '{0}'")]
    Cycle(&'static str),

    /// A bind-pose world transform cannot be inverted
    #[error("bind transform of joint '{joint}' is singular (determinant {determinant})")]
    SingularBindTransform {
        joint: &'static str,
        determinant: f32,
    },

    /// A vertex is assigned to a joint index with no skinning transform
    #[error("vertex {vertex} is assigned to joint index {index}, but only {count} transforms exist")]
    JointIndexOutOfRange {
        vertex: usize,
        index: usize,
        count: usize,
    },

    /// Vertex positions and joint assignments differ in length
    #[error("{vertices} vertices but {assignments} joint assignments")]
    AssignmentLengthMismatch { vertices: usize, assignments: usize },

    /// An animation sampler was configured with a non-positive rate or duration
    #[error("invalid animation timing: {0}")]
    InvalidTiming(String),
}

pub type Result<T> = std::result::Result<T, KinematicsError>;
