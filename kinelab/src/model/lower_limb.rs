//! Simplified human model: pelvis, right leg and torso
//!
//! # Tree
//! ```text
//! BASE (pelvis)
//! ├── HIP_R ── KNEE_R ── ANKLE_R ── SUBTALAR_R ── MTP_R
//! └── BACK
//! ```
//!
//! Joint offsets are in meters in the bind-pose frame of the skin mesh:
//! y up, z towards the right side of the body.

use glam::{Mat4, Vec3};

use super::ArticulatedModel;
use crate::assignment::{AxisRange, RegionBox, RegionClassifier};
use crate::coordinates::GeneralizedCoordinates;
use crate::error::Result;
use crate::ids::EnumKey;
use crate::skeleton::{JointTransforms, Skeleton};

crate::enum_keys! {
    /// Generalized coordinates (degrees for rotations, meters for translations)
    pub enum CoordinateName {
        PELVIS_TRA_X => "PELVIS_TRA_X",
        PELVIS_TRA_Y => "PELVIS_TRA_Y",
        PELVIS_TRA_Z => "PELVIS_TRA_Z",
        PELVIS_ROT_X => "PELVIS_ROT_X",
        PELVIS_ROT_Y => "PELVIS_ROT_Y",
        PELVIS_ROT_Z => "PELVIS_ROT_Z",
        HIP_R_FLEX => "HIP_R_FLEX",
        HIP_R_ADD => "HIP_R_ADD",
        HIP_R_ROT => "HIP_R_ROT",
        KNEE_R_FLEX => "KNEE_R_FLEX",
        ANKLE_R_FLEX => "ANKLE_R_FLEX",
        LUMBAR_FLEX => "LUMBAR_FLEX",
        LUMBAR_BEND => "LUMBAR_BEND",
        LUMBAR_ROT => "LUMBAR_ROT",
    }
}

crate::enum_keys! {
    /// Joints; the index is the skinning matrix slot
    pub enum JointName {
        BASE => "BASE",
        HIP_R => "HIP_R",
        KNEE_R => "KNEE_R",
        ANKLE_R => "ANKLE_R",
        SUBTALAR_R => "SUBTALAR_R",
        MTP_R => "MTP_R",
        BACK => "BACK",
    }
}

crate::enum_keys! {
    /// Rigid bodies, one per joint
    pub enum BodyName {
        PELVIS => "PELVIS",
        FEMUR_R => "FEMUR_R",
        TIBIA_R => "TIBIA_R",
        TALUS_R => "TALUS_R",
        CALCN_R => "CALCN_R",
        TOES_R => "TOES_R",
        TORSO => "TORSO",
    }
}

/// Pelvis to right hip
pub const HIP_R_OFFSET: Vec3 = Vec3::new(-0.072, -0.068, 0.086);
/// Hip to knee
pub const KNEE_R_OFFSET: Vec3 = Vec3::new(0.0, -0.40, 0.0);
/// Knee to ankle, applied after the ankle rotation
pub const ANKLE_R_OFFSET: Vec3 = Vec3::new(0.0, -0.430, 0.0);
/// Talus to calcaneus
pub const SUBTALAR_R_OFFSET: Vec3 = Vec3::new(-0.062, -0.053, 0.010);
/// Calcaneus to toes
pub const MTP_R_OFFSET: Vec3 = Vec3::new(0.184, -0.002, 0.001);
/// Pelvis to lumbar joint
pub const BACK_OFFSET: Vec3 = Vec3::new(-0.103, 0.09, 0.0);

/// Rotation axis of the knee
pub const KNEE_R_AXIS: Vec3 = Vec3::X;

/// Marker type implementing [`ArticulatedModel`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerLimb;

impl ArticulatedModel for LowerLimb {
    type Joint = JointName;
    type Body = BodyName;
    type Coordinate = CoordinateName;

    const NAME: &'static str = "lower-limb";

    fn skeleton() -> Result<Skeleton<JointName, BodyName>> {
        use JointName::*;

        Skeleton::builder()
            .joint(BASE, None)
            .joint(HIP_R, Some(BASE))
            .joint(KNEE_R, Some(HIP_R))
            .joint(ANKLE_R, Some(KNEE_R))
            .joint(SUBTALAR_R, Some(ANKLE_R))
            .joint(MTP_R, Some(SUBTALAR_R))
            .joint(BACK, Some(BASE))
            .body(
                BodyName::PELVIS,
                BASE,
                ["models/sacrum.vtp", "models/pelvis.vtp", "models/l_pelvis.vtp"],
            )
            .body(BodyName::FEMUR_R, HIP_R, ["models/femur.vtp"])
            .body(
                BodyName::TIBIA_R,
                KNEE_R,
                ["models/tibia.vtp", "models/fibula.vtp"],
            )
            .body(BodyName::TALUS_R, ANKLE_R, ["models/talus.vtp"])
            .body(BodyName::CALCN_R, SUBTALAR_R, ["models/foot.vtp"])
            .body(BodyName::TOES_R, MTP_R, ["models/bofoot.vtp"])
            .body(
                BodyName::TORSO,
                BACK,
                [
                    "models/hat_spine.vtp",
                    "models/hat_jaw.vtp",
                    "models/hat_skull.vtp",
                    "models/hat_ribs.vtp",
                ],
            )
            .build()
    }

    fn evaluate_pose(q: &GeneralizedCoordinates<CoordinateName>) -> JointTransforms<JointName> {
        use CoordinateName::*;

        let mut local = JointTransforms::with_capacity(JointName::count());

        let pelvis_translation = Mat4::from_translation(Vec3::new(
            q.value(PELVIS_TRA_X),
            q.value(PELVIS_TRA_Y),
            q.value(PELVIS_TRA_Z),
        ));
        let pelvis_rotation = Mat4::from_rotation_x(q.radians(PELVIS_ROT_X))
            * Mat4::from_rotation_y(q.radians(PELVIS_ROT_Y))
            * Mat4::from_rotation_z(q.radians(PELVIS_ROT_Z));
        local.insert(JointName::BASE, pelvis_translation * pelvis_rotation);

        // Adduction (X), then internal rotation (Y), then flexion (Z).
        let hip = Mat4::from_translation(HIP_R_OFFSET)
            * Mat4::from_rotation_x(q.radians(HIP_R_ADD))
            * Mat4::from_rotation_y(q.radians(HIP_R_ROT))
            * Mat4::from_rotation_z(q.radians(HIP_R_FLEX));
        local.insert(JointName::HIP_R, hip);

        let knee = Mat4::from_translation(KNEE_R_OFFSET)
            * Mat4::from_axis_angle(KNEE_R_AXIS, q.radians(KNEE_R_FLEX));
        local.insert(JointName::KNEE_R, knee);

        // The ankle rotates before it is offset, swinging the offset with it.
        let ankle = Mat4::from_rotation_z(q.radians(ANKLE_R_FLEX))
            * Mat4::from_translation(ANKLE_R_OFFSET);
        local.insert(JointName::ANKLE_R, ankle);

        local.insert(
            JointName::SUBTALAR_R,
            Mat4::from_translation(SUBTALAR_R_OFFSET),
        );
        local.insert(JointName::MTP_R, Mat4::from_translation(MTP_R_OFFSET));

        // Bend (X), then rotation (Y), then flexion (Z).
        let back = Mat4::from_translation(BACK_OFFSET)
            * Mat4::from_rotation_x(q.radians(LUMBAR_BEND))
            * Mat4::from_rotation_y(q.radians(LUMBAR_ROT))
            * Mat4::from_rotation_z(q.radians(LUMBAR_FLEX));
        local.insert(JointName::BACK, back);

        local
    }

    fn bind_pose() -> GeneralizedCoordinates<CoordinateName> {
        use CoordinateName::*;

        GeneralizedCoordinates::new()
            .with(PELVIS_TRA_X, 0.0)
            .with(PELVIS_TRA_Y, 0.0)
            .with(PELVIS_TRA_Z, 0.0)
            .with(PELVIS_ROT_X, 0.0)
            .with(PELVIS_ROT_Y, 0.0)
            .with(PELVIS_ROT_Z, 0.0)
            .with(HIP_R_FLEX, 3.0)
            .with(HIP_R_ADD, -5.0)
            .with(HIP_R_ROT, 0.0)
            .with(KNEE_R_FLEX, -15.0)
            .with(ANKLE_R_FLEX, 15.0)
            .with(LUMBAR_FLEX, 0.0)
            .with(LUMBAR_BEND, 0.0)
            .with(LUMBAR_ROT, 0.0)
    }
}

/// Region rules for the bundled male skin mesh, in its bind-pose frame.
///
/// Rules, first match wins (y is height, z the lateral axis):
/// 1. `HIP_R`: `-0.5 <= y <= -0.07`, `0 < z < 0.25` (thigh)
/// 2. `KNEE_R`: `-0.85 < y < -0.5`, `0 < z < 0.25` (shank)
/// 3. `ANKLE_R`: `-1.0 <= y <= -0.85`, `0 < z < 0.25` (foot)
/// 4. `BACK`: `y > 0`, or `y > -0.4` with `z > 0.25`, or `y > -0.4` with
///    `z < -0.25` (torso and both arms)
/// 5. `BASE` otherwise
pub fn region_classifier() -> RegionClassifier<JointName> {
    let right_leg = AxisRange::open(0.0, 0.25);

    RegionClassifier::new(JointName::BASE)
        .rule(
            JointName::HIP_R,
            [RegionBox::ANY
                .with_y(AxisRange::closed(-0.5, -0.07))
                .with_z(right_leg)],
        )
        .rule(
            JointName::KNEE_R,
            [RegionBox::ANY
                .with_y(AxisRange::open(-0.85, -0.5))
                .with_z(right_leg)],
        )
        .rule(
            JointName::ANKLE_R,
            [RegionBox::ANY
                .with_y(AxisRange::closed(-1.0, -0.85))
                .with_z(right_leg)],
        )
        .rule(
            JointName::BACK,
            [
                RegionBox::ANY.with_y(AxisRange::above(0.0)),
                RegionBox::ANY
                    .with_y(AxisRange::above(-0.4))
                    .with_z(AxisRange::above(0.25)),
                RegionBox::ANY
                    .with_y(AxisRange::above(-0.4))
                    .with_z(AxisRange::below(-0.25)),
            ],
        )
}

/// Assign every skin vertex to its dominant joint
pub fn assign_joints(vertices: &[Vec3]) -> Vec<JointName> {
    region_classifier().assign(vertices)
}
