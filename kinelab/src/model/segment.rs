//! Planar two-segment chain
//!
//! Two bodies of length 0.5 connected by revolute joints about Z:
//! `ROOT` at the origin and `ELBOW` at the end of the first segment. The
//! surface fixture is the rectangle outline skinned around the chain.

use glam::{Mat4, Vec3};

use super::ArticulatedModel;
use crate::assignment::{AxisRange, Bound, RegionBox, RegionClassifier};
use crate::coordinates::GeneralizedCoordinates;
use crate::error::Result;
use crate::ids::EnumKey;
use crate::skeleton::{JointTransforms, Skeleton};

crate::enum_keys! {
    /// Joint angles in degrees
    pub enum SegmentCoordinate {
        THETA_0 => "THETA_0",
        THETA_1 => "THETA_1",
    }
}

crate::enum_keys! {
    pub enum SegmentJoint {
        ROOT => "ROOT",
        ELBOW => "ELBOW",
    }
}

crate::enum_keys! {
    pub enum SegmentBody {
        SEGMENT_0 => "SEGMENT_0",
        SEGMENT_1 => "SEGMENT_1",
    }
}

/// Length of each segment
pub const SEGMENT_LENGTH: f32 = 0.5;

/// Marker type implementing [`ArticulatedModel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoSegment;

impl ArticulatedModel for TwoSegment {
    type Joint = SegmentJoint;
    type Body = SegmentBody;
    type Coordinate = SegmentCoordinate;

    const NAME: &'static str = "segment";

    fn skeleton() -> Result<Skeleton<SegmentJoint, SegmentBody>> {
        Skeleton::builder()
            .joint(SegmentJoint::ROOT, None)
            .joint(SegmentJoint::ELBOW, Some(SegmentJoint::ROOT))
            .body(SegmentBody::SEGMENT_0, SegmentJoint::ROOT, ["segment"])
            .body(SegmentBody::SEGMENT_1, SegmentJoint::ELBOW, ["segment"])
            .build()
    }

    fn evaluate_pose(
        q: &GeneralizedCoordinates<SegmentCoordinate>,
    ) -> JointTransforms<SegmentJoint> {
        let mut local = JointTransforms::with_capacity(SegmentJoint::count());
        local.insert(
            SegmentJoint::ROOT,
            Mat4::from_rotation_z(q.radians(SegmentCoordinate::THETA_0)),
        );
        local.insert(
            SegmentJoint::ELBOW,
            Mat4::from_translation(Vec3::new(SEGMENT_LENGTH, 0.0, 0.0))
                * Mat4::from_rotation_z(q.radians(SegmentCoordinate::THETA_1)),
        );
        local
    }

    fn bind_pose() -> GeneralizedCoordinates<SegmentCoordinate> {
        GeneralizedCoordinates::new()
            .with(SegmentCoordinate::THETA_0, 0.0)
            .with(SegmentCoordinate::THETA_1, 0.0)
    }
}

/// Outline of the skinned strip as six line segments (two vertices each).
///
/// ```text
/// v0--s1--v1--s2--v2
/// |                |
/// s6              s3
/// |                |
/// v5--s5--v4--s4--v3
/// ```
pub fn surface_vertices() -> Vec<Vec3> {
    let top_left = Vec3::new(-0.1, 0.1, 0.0);
    let top_mid = Vec3::new(0.5, 0.1, 0.0);
    let top_right = Vec3::new(1.1, 0.1, 0.0);
    let bottom_right = Vec3::new(1.1, -0.1, 0.0);
    let bottom_mid = Vec3::new(0.5, -0.1, 0.0);
    let bottom_left = Vec3::new(-0.1, -0.1, 0.0);

    vec![
        top_left,
        top_mid,
        top_mid,
        top_right,
        top_right,
        bottom_right,
        bottom_right,
        bottom_mid,
        bottom_mid,
        bottom_left,
        bottom_left,
        top_left,
    ]
}

/// Vertices from the elbow outward follow the second segment
pub fn region_classifier() -> RegionClassifier<SegmentJoint> {
    RegionClassifier::new(SegmentJoint::ROOT).rule(
        SegmentJoint::ELBOW,
        [RegionBox::ANY.with_x(AxisRange::new(
            Bound::Inclusive(SEGMENT_LENGTH),
            Bound::Unbounded,
        ))],
    )
}
