//! kinelab.toml manifest parsing
//!
//! ```toml
//! [model]
//! name = "lower-limb"
//!
//! [skinning]
//! missing_coordinates = "zero"
//!
//! # Optional: overrides on top of the model's bind pose
//! [bind_pose]
//! KNEE_R_FLEX = -10.0
//!
//! # Current pose, also layered over the bind pose
//! [pose]
//! HIP_R_FLEX = 30.0
//!
//! [animation]
//! duration = 2.0
//! frame_rate = 30.0
//!
//! [[animation.channels]]
//! coordinate = "KNEE_R_FLEX"
//! offset = -30.0
//! amplitude = 30.0
//! frequency = 1.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use kinelab::{EnumKey, GeneralizedCoordinates, SinusoidChannel, SinusoidDriver, SkinningConfig};
use serde::Deserialize;

/// kinelab.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub model: ModelSection,
    #[serde(default)]
    pub skinning: SkinningConfig,
    /// Coordinate name to value, layered over the model bind pose
    #[serde(default)]
    pub bind_pose: BTreeMap<String, f32>,
    /// Coordinate name to value, layered over the bind pose
    #[serde(default)]
    pub pose: BTreeMap<String, f32>,
    #[serde(default)]
    pub animation: Option<AnimationSection>,
}

/// Built-in articulated models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelName {
    /// Pelvis, right leg and torso
    LowerLimb,
    /// Planar two-segment chain
    Segment,
}

#[derive(Debug, Deserialize)]
pub struct ModelSection {
    pub name: ModelName,
}

/// Sampled clip description
#[derive(Debug, Deserialize)]
pub struct AnimationSection {
    /// Clip length in seconds.
    /// Default: 2.0
    #[serde(default = "default_duration")]
    pub duration: f32,

    /// Samples per second.
    /// Default: 30
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,

    /// Sinusoid channels. When empty the model's built-in motion is used.
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

fn default_duration() -> f32 {
    2.0
}

fn default_frame_rate() -> f32 {
    30.0
}

/// One `[[animation.channels]]` entry
#[derive(Debug, Deserialize)]
pub struct ChannelEntry {
    pub coordinate: String,
    #[serde(default)]
    pub offset: f32,
    #[serde(default)]
    pub amplitude: f32,
    /// Hz
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Radians
    #[serde(default)]
    pub phase: f32,
}

fn default_frequency() -> f32 {
    1.0
}

impl Manifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse kinelab.toml")
    }

    /// `model_bind` with the `[bind_pose]` overrides applied
    pub fn bind_pose<C: EnumKey>(
        &self,
        model_bind: GeneralizedCoordinates<C>,
    ) -> Result<GeneralizedCoordinates<C>> {
        let overrides = named_coordinates(&self.bind_pose).context("Invalid [bind_pose]")?;
        Ok(model_bind.merged(&overrides))
    }

    /// `bind` with the `[pose]` values applied
    pub fn current_pose<C: EnumKey>(
        &self,
        bind: &GeneralizedCoordinates<C>,
    ) -> Result<GeneralizedCoordinates<C>> {
        let pose = named_coordinates(&self.pose).context("Invalid [pose]")?;
        Ok(bind.merged(&pose))
    }

    /// Sinusoid driver from `[[animation.channels]]` over `base`, or `None`
    /// when no channels are declared
    pub fn channel_driver<C: EnumKey>(
        &self,
        base: GeneralizedCoordinates<C>,
    ) -> Result<Option<SinusoidDriver<C>>> {
        let Some(animation) = &self.animation else {
            return Ok(None);
        };
        if animation.channels.is_empty() {
            return Ok(None);
        }

        let mut driver = SinusoidDriver::new(base);
        for entry in &animation.channels {
            let coordinate = kinelab::parse_coordinate::<C>(&entry.coordinate)
                .context("Invalid [[animation.channels]] entry")?;
            driver = driver.channel(SinusoidChannel::new(
                coordinate,
                entry.offset,
                entry.amplitude,
                entry.frequency,
                entry.phase,
            ));
        }
        Ok(Some(driver))
    }
}

fn named_coordinates<C: EnumKey>(
    values: &BTreeMap<String, f32>,
) -> Result<GeneralizedCoordinates<C>> {
    let coordinates =
        GeneralizedCoordinates::from_named(values.iter().map(|(name, v)| (name.as_str(), *v)))?;
    Ok(coordinates)
}
