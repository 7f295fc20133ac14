//! Time-driven coordinate sources and frame sampling
//!
//! A [`CoordinateDriver`] turns a time in seconds into a coordinate set.
//! [`AnimationSampler`] steps a driver at a fixed frame rate and feeds each
//! sample through a [`SkinningCalculator`].

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::coordinates::GeneralizedCoordinates;
use crate::error::{KinematicsError, Result};
use crate::ids::EnumKey;
use crate::model::ArticulatedModel;
use crate::model::lower_limb::{CoordinateName, LowerLimb};
use crate::model::segment::{SegmentCoordinate, TwoSegment};
use crate::skinning::{SkinningCalculator, SkinningTransforms};

/// Source of coordinate values over time.
pub trait CoordinateDriver<C: EnumKey> {
    fn sample(&self, time: f32) -> GeneralizedCoordinates<C>;
}

impl<C: EnumKey, F> CoordinateDriver<C> for F
where
    F: Fn(f32) -> GeneralizedCoordinates<C>,
{
    fn sample(&self, time: f32) -> GeneralizedCoordinates<C> {
        self(time)
    }
}

/// `offset + amplitude * sin(2*pi*frequency*t + phase)` on one coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinusoidChannel<C: EnumKey> {
    pub coordinate: C,
    pub offset: f32,
    pub amplitude: f32,
    /// Hz
    pub frequency: f32,
    /// Radians
    pub phase: f32,
}

impl<C: EnumKey> SinusoidChannel<C> {
    pub fn new(coordinate: C, offset: f32, amplitude: f32, frequency: f32, phase: f32) -> Self {
        Self {
            coordinate,
            offset,
            amplitude,
            frequency,
            phase,
        }
    }

    pub fn value(&self, time: f32) -> f32 {
        self.offset + self.amplitude * (TAU * self.frequency * time + self.phase).sin()
    }
}

/// Sum of sinusoid channels over a constant base pose.
///
/// Coordinates with at least one channel take the sum of their channels;
/// all others keep their base value.
#[derive(Debug, Clone, PartialEq)]
pub struct SinusoidDriver<C: EnumKey> {
    base: GeneralizedCoordinates<C>,
    channels: Vec<SinusoidChannel<C>>,
}

impl<C: EnumKey> SinusoidDriver<C> {
    pub fn new(base: GeneralizedCoordinates<C>) -> Self {
        Self {
            base,
            channels: Vec::new(),
        }
    }

    pub fn channel(mut self, channel: SinusoidChannel<C>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn base(&self) -> &GeneralizedCoordinates<C> {
        &self.base
    }

    pub fn channels(&self) -> &[SinusoidChannel<C>] {
        &self.channels
    }
}

impl<C: EnumKey> CoordinateDriver<C> for SinusoidDriver<C> {
    fn sample(&self, time: f32) -> GeneralizedCoordinates<C> {
        let mut q = self.base.clone();
        let mut driven = vec![false; C::count()];
        for channel in &self.channels {
            let coordinate = channel.coordinate;
            let value = channel.value(time);
            if driven[coordinate.index()] {
                q.set(coordinate, q.value(coordinate) + value);
            } else {
                q.set(coordinate, value);
                driven[coordinate.index()] = true;
            }
        }
        q
    }
}

/// Sway of the two-segment chain: one radian of phase every 50 frames at 60 fps.
pub const SEGMENT_SWAY_FREQUENCY: f32 = 1.2 / TAU;

/// Both joints swing in phase, the elbow twice as far as the root.
pub fn segment_sway() -> SinusoidDriver<SegmentCoordinate> {
    SinusoidDriver::new(TwoSegment::bind_pose())
        .channel(SinusoidChannel::new(
            SegmentCoordinate::THETA_0,
            0.0,
            (PI / 8.0).to_degrees(),
            SEGMENT_SWAY_FREQUENCY,
            0.0,
        ))
        .channel(SinusoidChannel::new(
            SegmentCoordinate::THETA_1,
            0.0,
            (PI / 4.0).to_degrees(),
            SEGMENT_SWAY_FREQUENCY,
            0.0,
        ))
}

/// Walking stride of the right leg at one stride per second, over the bind pose.
pub fn lower_limb_walk() -> SinusoidDriver<CoordinateName> {
    use CoordinateName::*;

    SinusoidDriver::new(LowerLimb::bind_pose())
        .channel(SinusoidChannel::new(HIP_R_FLEX, 5.0, 25.0, 1.0, 0.0))
        .channel(SinusoidChannel::new(KNEE_R_FLEX, -30.0, 30.0, 1.0, -FRAC_PI_2))
        .channel(SinusoidChannel::new(ANKLE_R_FLEX, 5.0, 10.0, 1.0, FRAC_PI_2))
        .channel(SinusoidChannel::new(PELVIS_TRA_Y, 0.0, 0.02, 2.0, 0.0))
        .channel(SinusoidChannel::new(LUMBAR_ROT, 0.0, 5.0, 1.0, PI))
}

/// Skinning transforms of one sampled frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<J: EnumKey> {
    pub index: usize,
    /// Seconds from the start of the clip
    pub time: f32,
    pub transforms: SkinningTransforms<J>,
}

/// Longest clip a sampler accepts: one hour at 240 fps.
pub const MAX_FRAME_COUNT: usize = 864_000;

/// Fixed-rate sampling of `[0, duration)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSampler {
    frame_rate: f32,
    duration: f32,
}

impl AnimationSampler {
    /// Fails with [`KinematicsError::InvalidTiming`] unless both values are
    /// finite and positive and the clip has at most [`MAX_FRAME_COUNT`] frames.
    pub fn new(frame_rate: f32, duration: f32) -> Result<Self> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(KinematicsError::InvalidTiming(format!(
                "frame rate must be positive, got {frame_rate}"
            )));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(KinematicsError::InvalidTiming(format!(
                "duration must be positive, got {duration}"
            )));
        }
        let frames = (duration * frame_rate).round();
        if frames > MAX_FRAME_COUNT as f32 {
            return Err(KinematicsError::InvalidTiming(format!(
                "{duration} s at {frame_rate} fps exceeds {MAX_FRAME_COUNT} frames"
            )));
        }
        Ok(Self {
            frame_rate,
            duration,
        })
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Frames in the clip; the end time is excluded so clips loop cleanly
    pub fn frame_count(&self) -> usize {
        ((self.duration * self.frame_rate).round() as usize).max(1)
    }

    pub fn time(&self, frame: usize) -> f32 {
        frame as f32 / self.frame_rate
    }

    /// Coordinates of every frame
    pub fn sample_coordinates<C, D>(&self, driver: &D) -> Vec<GeneralizedCoordinates<C>>
    where
        C: EnumKey,
        D: CoordinateDriver<C> + ?Sized,
    {
        (0..self.frame_count())
            .map(|frame| driver.sample(self.time(frame)))
            .collect()
    }

    /// Lazily skin every frame
    pub fn frames<'a, M, D>(
        &self,
        driver: &'a D,
        calculator: &'a SkinningCalculator<M>,
    ) -> impl Iterator<Item = Result<Frame<M::Joint>>> + 'a
    where
        M: ArticulatedModel,
        D: CoordinateDriver<M::Coordinate> + ?Sized,
    {
        let sampler = *self;
        (0..self.frame_count()).map(move |index| {
            let time = sampler.time(index);
            let transforms = calculator.compute(&driver.sample(time))?;
            Ok(Frame {
                index,
                time,
                transforms,
            })
        })
    }

    /// Skin every frame, stopping at the first error
    pub fn sample<M, D>(
        &self,
        driver: &D,
        calculator: &SkinningCalculator<M>,
    ) -> Result<Vec<Frame<M::Joint>>>
    where
        M: ArticulatedModel,
        D: CoordinateDriver<M::Coordinate> + ?Sized,
    {
        let frames = self.frames(driver, calculator).collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            model = M::NAME,
            frames = frames.len(),
            frame_rate = self.frame_rate,
            "animation sampled"
        );
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::MissingCoordinatePolicy;
    use crate::model::lower_limb::JointName;
    use crate::skinning::SkinningConfig;

    #[test]
    fn channel_follows_sine() {
        let channel = SinusoidChannel::new(SegmentCoordinate::THETA_0, 10.0, 5.0, 0.5, 0.0);
        assert!((channel.value(0.0) - 10.0).abs() < 0.001);
        assert!((channel.value(0.5) - 15.0).abs() < 0.001);
        assert!((channel.value(1.5) - 5.0).abs() < 0.001);
    }

    #[test]
    fn channels_on_one_coordinate_add_up() {
        let driver = SinusoidDriver::new(GeneralizedCoordinates::new())
            .channel(SinusoidChannel::new(SegmentCoordinate::THETA_1, 1.0, 0.0, 1.0, 0.0))
            .channel(SinusoidChannel::new(SegmentCoordinate::THETA_1, 2.0, 0.0, 1.0, 0.0));
        let q = driver.sample(0.3);
        assert!((q.value(SegmentCoordinate::THETA_1) - 3.0).abs() < 0.001);
        assert!(!q.contains(SegmentCoordinate::THETA_0));
    }

    #[test]
    fn undriven_coordinates_keep_base_values() {
        let q = lower_limb_walk().sample(0.37);
        assert_eq!(q.value(CoordinateName::HIP_R_ADD), -5.0);
        assert_eq!(q.value(CoordinateName::LUMBAR_FLEX), 0.0);
    }

    #[test]
    fn sway_peaks_at_quarter_period() {
        let driver = segment_sway();
        let quarter = 0.25 / SEGMENT_SWAY_FREQUENCY;
        let q = driver.sample(quarter);
        assert!((q.value(SegmentCoordinate::THETA_0) - 22.5).abs() < 0.01);
        assert!((q.value(SegmentCoordinate::THETA_1) - 45.0).abs() < 0.01);
    }

    #[test]
    fn closures_are_drivers() {
        let driver = |t: f32| GeneralizedCoordinates::new().with(SegmentCoordinate::THETA_0, t);
        let sampler = AnimationSampler::new(4.0, 1.0).unwrap();
        let samples: Vec<GeneralizedCoordinates<SegmentCoordinate>> =
            sampler.sample_coordinates(&driver);
        let values: Vec<f32> = samples
            .iter()
            .map(|q| q.value(SegmentCoordinate::THETA_0))
            .collect();
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn timing_must_be_positive() {
        assert!(matches!(
            AnimationSampler::new(0.0, 1.0),
            Err(KinematicsError::InvalidTiming(_))
        ));
        assert!(matches!(
            AnimationSampler::new(30.0, -2.0),
            Err(KinematicsError::InvalidTiming(_))
        ));
        assert!(AnimationSampler::new(f32::NAN, 1.0).is_err());
        assert_eq!(AnimationSampler::new(30.0, 0.01).unwrap().frame_count(), 1);
    }

    #[test]
    fn frame_count_is_bounded() {
        let longest = AnimationSampler::new(240.0, 3600.0).unwrap();
        assert_eq!(longest.frame_count(), MAX_FRAME_COUNT);

        assert!(matches!(
            AnimationSampler::new(240.0, 3601.0),
            Err(KinematicsError::InvalidTiming(_))
        ));
        assert!(matches!(
            AnimationSampler::new(30.0, f32::MAX),
            Err(KinematicsError::InvalidTiming(_))
        ));
    }

    #[test]
    fn sampled_walk_keeps_trunk_still_at_start() {
        let calculator =
            SkinningCalculator::<LowerLimb>::with_model_bind_pose(SkinningConfig::default())
                .unwrap();
        let sampler = AnimationSampler::new(30.0, 1.0).unwrap();
        let frames = sampler.sample(&lower_limb_walk(), &calculator).unwrap();

        assert_eq!(frames.len(), 30);
        assert_eq!(frames[0].index, 0);
        assert!((frames[29].time - 29.0 / 30.0).abs() < 1e-6);
        // At t = 0 the pelvis bob and lumbar twist are both at zero crossings.
        for joint in [JointName::BASE, JointName::BACK] {
            let m = frames[0].transforms.get(joint);
            assert!(m.abs_diff_eq(glam::Mat4::IDENTITY, 1e-4), "{joint}");
        }
        assert!(!frames[0].transforms.is_identity(1e-3));
    }

    #[test]
    fn sampling_surfaces_strict_policy_errors() {
        let config = SkinningConfig {
            missing_coordinates: MissingCoordinatePolicy::Reject,
            ..SkinningConfig::default()
        };
        let calculator = SkinningCalculator::<TwoSegment>::with_model_bind_pose(config).unwrap();
        let only_root = SinusoidDriver::new(GeneralizedCoordinates::new()).channel(
            SinusoidChannel::new(SegmentCoordinate::THETA_0, 0.0, 10.0, 1.0, 0.0),
        );

        let sampler = AnimationSampler::new(10.0, 1.0).unwrap();
        let err = sampler.sample(&only_root, &calculator).unwrap_err();
        assert_eq!(err, KinematicsError::MissingCoordinate("THETA_1"));
    }
}
