//! Command implementations
//!
//! Each command returns a serializable report; `main` prints it as JSON.
//! Work is generic over [`ArticulatedModel`] and dispatched on the
//! manifest's model name.

use anyhow::{Context, Result};
use glam::Vec3;
use kinelab::model::{lower_limb, segment};
use kinelab::{
    AnimationSampler, ArticulatedModel, EnumKey, GeneralizedCoordinates, LowerLimb, PoseEvaluator,
    RegionClassifier, SinusoidDriver, SkinningCalculator, TwoSegment, joint_histogram,
};
use serde::Serialize;

use crate::manifest::{Manifest, ModelName};

/// Local and world transform of one joint, column-major
#[derive(Debug, Serialize)]
pub struct JointPose {
    pub joint: &'static str,
    pub parent: Option<&'static str>,
    pub local: [f32; 16],
    pub world: [f32; 16],
}

#[derive(Debug, Serialize)]
pub struct PoseReport {
    pub model: &'static str,
    /// Traversal order, root first
    pub joints: Vec<JointPose>,
}

/// Skinning matrix of one joint, column-major
#[derive(Debug, Serialize)]
pub struct JointMatrix {
    pub joint: &'static str,
    pub index: usize,
    pub matrix: [f32; 16],
}

#[derive(Debug, Serialize)]
pub struct SkinReport {
    pub model: &'static str,
    /// Joint index order
    pub joints: Vec<JointMatrix>,
}

#[derive(Debug, Serialize)]
pub struct JointCount {
    pub joint: &'static str,
    pub vertices: usize,
}

#[derive(Debug, Serialize)]
pub struct AssignReport {
    pub model: &'static str,
    /// Joint name per vertex, in file order
    pub vertices: Vec<&'static str>,
    pub histogram: Vec<JointCount>,
}

/// One line of `animate` output
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub frame: usize,
    pub time: f32,
    /// Column-major skinning matrices in joint index order
    pub matrices: Vec<[f32; 16]>,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub model: &'static str,
    pub joints: usize,
    pub bodies: usize,
    pub bind_coordinates: usize,
    pub pose_coordinates: usize,
    pub animation_frames: Option<usize>,
}

/// `pose`: local and world transforms of `[pose]`
pub fn pose(manifest: &Manifest) -> Result<PoseReport> {
    match manifest.model.name {
        ModelName::LowerLimb => pose_for::<LowerLimb>(manifest),
        ModelName::Segment => pose_for::<TwoSegment>(manifest),
    }
}

/// `skin`: skinning matrices of `[pose]` against the bind pose
pub fn skin(manifest: &Manifest) -> Result<SkinReport> {
    match manifest.model.name {
        ModelName::LowerLimb => skin_for::<LowerLimb>(manifest),
        ModelName::Segment => skin_for::<TwoSegment>(manifest),
    }
}

/// `assign`: dominant joint of every vertex
pub fn assign(model: ModelName, vertices: &[Vec3]) -> AssignReport {
    match model {
        ModelName::LowerLimb => {
            assign_with(LowerLimb::NAME, &lower_limb::region_classifier(), vertices)
        }
        ModelName::Segment => assign_with(TwoSegment::NAME, &segment::region_classifier(), vertices),
    }
}

/// `animate`: skinning matrices per sampled frame, at most `limit` frames
pub fn animate(manifest: &Manifest, limit: Option<usize>) -> Result<Vec<FrameReport>> {
    match manifest.model.name {
        ModelName::LowerLimb => {
            animate_for::<LowerLimb>(manifest, limit, kinelab::driver::lower_limb_walk)
        }
        ModelName::Segment => {
            animate_for::<TwoSegment>(manifest, limit, kinelab::driver::segment_sway)
        }
    }
}

/// `check`: build everything the other commands would, without output
pub fn check(manifest: &Manifest) -> Result<CheckReport> {
    match manifest.model.name {
        ModelName::LowerLimb => check_for::<LowerLimb>(manifest),
        ModelName::Segment => check_for::<TwoSegment>(manifest),
    }
}

fn calculator<M: ArticulatedModel>(manifest: &Manifest) -> Result<SkinningCalculator<M>> {
    let bind = manifest.bind_pose(M::bind_pose())?;
    SkinningCalculator::new(bind, manifest.skinning)
        .with_context(|| format!("Invalid bind pose for model '{}'", M::NAME))
}

fn current_pose<M: ArticulatedModel>(
    manifest: &Manifest,
    calculator: &SkinningCalculator<M>,
) -> Result<GeneralizedCoordinates<M::Coordinate>> {
    manifest.current_pose(calculator.bind_pose())
}

fn pose_for<M: ArticulatedModel>(manifest: &Manifest) -> Result<PoseReport> {
    let bind = manifest.bind_pose(M::bind_pose())?;
    let current = manifest.current_pose(&bind)?;

    let evaluator = PoseEvaluator::<M>::new(manifest.skinning.missing_coordinates);
    let local = evaluator.evaluate(&current)?;

    let mut skeleton = M::skeleton()?;
    skeleton.set_pose(&local)?;
    let world = skeleton.joint_world_transforms().clone();

    let joints = skeleton
        .joints()
        .map(|joint| JointPose {
            joint: joint.id().name(),
            parent: joint.parent().map(EnumKey::name),
            local: joint.local_transform().to_cols_array(),
            world: world[&joint.id()].to_cols_array(),
        })
        .collect();

    Ok(PoseReport {
        model: M::NAME,
        joints,
    })
}

fn skin_for<M: ArticulatedModel>(manifest: &Manifest) -> Result<SkinReport> {
    let calculator = calculator::<M>(manifest)?;
    let current = current_pose(manifest, &calculator)?;
    let transforms = calculator.compute(&current)?;

    let joints = transforms
        .iter()
        .map(|(joint, matrix)| JointMatrix {
            joint: joint.name(),
            index: joint.index(),
            matrix: matrix.to_cols_array(),
        })
        .collect();

    Ok(SkinReport {
        model: M::NAME,
        joints,
    })
}

fn assign_with<J: EnumKey>(
    model: &'static str,
    classifier: &RegionClassifier<J>,
    vertices: &[Vec3],
) -> AssignReport {
    let assignment = classifier.assign(vertices);
    let histogram = joint_histogram(&assignment)
        .into_iter()
        .zip(J::ALL)
        .map(|(count, joint)| JointCount {
            joint: joint.name(),
            vertices: count,
        })
        .collect();

    AssignReport {
        model,
        vertices: assignment.iter().map(|j| j.name()).collect(),
        histogram,
    }
}

fn driver_for<M: ArticulatedModel>(
    manifest: &Manifest,
    base: GeneralizedCoordinates<M::Coordinate>,
    preset: fn() -> SinusoidDriver<M::Coordinate>,
) -> Result<SinusoidDriver<M::Coordinate>> {
    match manifest.channel_driver(base)? {
        Some(driver) => Ok(driver),
        None => {
            tracing::info!("No animation channels, using the built-in {} motion", M::NAME);
            Ok(preset())
        }
    }
}

fn sampler(manifest: &Manifest) -> Result<AnimationSampler> {
    let animation = manifest
        .animation
        .as_ref()
        .context("Manifest has no [animation] section")?;
    AnimationSampler::new(animation.frame_rate, animation.duration).context("Invalid [animation]")
}

fn animate_for<M: ArticulatedModel>(
    manifest: &Manifest,
    limit: Option<usize>,
    preset: fn() -> SinusoidDriver<M::Coordinate>,
) -> Result<Vec<FrameReport>> {
    let calculator = calculator::<M>(manifest)?;
    let base = current_pose(manifest, &calculator)?;
    let driver = driver_for::<M>(manifest, base, preset)?;
    let sampler = sampler(manifest)?;

    let count = limit.unwrap_or(usize::MAX).min(sampler.frame_count());
    tracing::info!(
        "Sampling {} frames at {} fps ({} channels)",
        count,
        sampler.frame_rate(),
        driver.channels().len()
    );

    sampler
        .frames(&driver, &calculator)
        .take(count)
        .map(|frame| -> Result<FrameReport> {
            let frame = frame?;
            Ok(FrameReport {
                frame: frame.index,
                time: frame.time,
                matrices: frame.transforms.to_cols_arrays(),
            })
        })
        .collect()
}

fn check_for<M: ArticulatedModel>(manifest: &Manifest) -> Result<CheckReport> {
    let calculator = calculator::<M>(manifest)?;
    let current = current_pose(manifest, &calculator)?;
    // Surfaces strict-policy errors on the current pose too.
    calculator.compute(&current)?;

    let animation_frames = match &manifest.animation {
        Some(_) => {
            manifest.channel_driver(current.clone())?;
            Some(sampler(manifest)?.frame_count())
        }
        None => None,
    };

    let skeleton = calculator.skeleton();
    Ok(CheckReport {
        model: M::NAME,
        joints: skeleton.joint_count(),
        bodies: skeleton.bodies().len(),
        bind_coordinates: calculator.bind_pose().len(),
        pose_coordinates: current.len(),
        animation_frames,
    })
}
