//! Generalized coordinate sets
//!
//! A coordinate set maps coordinate ids to scalars: degrees for rotational
//! coordinates, model length units for translational ones. Coordinates that
//! were never set read as zero; [`MissingCoordinatePolicy::Reject`] turns
//! that default into an error at evaluation time.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{KinematicsError, Result};
use crate::ids::{EnumKey, parse_coordinate};

/// What pose evaluation does with coordinates absent from the input set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingCoordinatePolicy {
    /// Absent coordinates are zero
    #[default]
    Zero,
    /// Absent coordinates fail evaluation with `MissingCoordinate`
    Reject,
}

/// Values for some or all coordinates of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralizedCoordinates<C: EnumKey> {
    values: HashMap<C, f32>,
}

impl<C: EnumKey> Default for GeneralizedCoordinates<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: EnumKey> GeneralizedCoordinates<C> {
    /// Empty set; every coordinate reads as zero
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Builder-style setter
    pub fn with(mut self, coordinate: C, value: f32) -> Self {
        self.set(coordinate, value);
        self
    }

    pub fn set(&mut self, coordinate: C, value: f32) {
        self.values.insert(coordinate, value);
    }

    /// Value of `coordinate`, or zero when unset
    pub fn value(&self, coordinate: C) -> f32 {
        self.values.get(&coordinate).copied().unwrap_or(0.0)
    }

    /// Value of `coordinate` converted from degrees to radians
    pub fn radians(&self, coordinate: C) -> f32 {
        self.value(coordinate).to_radians()
    }

    /// Whether `coordinate` has an explicit value
    pub fn contains(&self, coordinate: C) -> bool {
        self.values.contains_key(&coordinate)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Explicitly set coordinates, in index order
    pub fn iter(&self) -> impl Iterator<Item = (C, f32)> + '_ {
        C::ALL
            .iter()
            .filter_map(|c| self.values.get(c).map(|value| (*c, *value)))
    }

    /// Coordinates of the model that have no value, in index order
    pub fn missing(&self) -> Vec<C> {
        C::ALL
            .iter()
            .copied()
            .filter(|c| !self.values.contains_key(c))
            .collect()
    }

    /// Overlay `other` on top of `self`; values in `other` win
    pub fn merged(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (coordinate, value) in other.iter() {
            merged.set(coordinate, value);
        }
        merged
    }

    /// Build a set from `(name, value)` pairs, rejecting unknown names
    pub fn from_named<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut coordinates = Self::new();
        for (name, value) in pairs {
            coordinates.set(parse_coordinate::<C>(name)?, value);
        }
        Ok(coordinates)
    }

    /// Apply `policy` before the set is handed to a pose evaluator.
    pub fn check(&self, policy: MissingCoordinatePolicy) -> Result<()> {
        let missing = self.missing();
        if missing.is_empty() {
            return Ok(());
        }
        match policy {
            MissingCoordinatePolicy::Reject => {
                Err(KinematicsError::MissingCoordinate(missing[0].name()))
            }
            MissingCoordinatePolicy::Zero => {
                tracing::debug!(
                    missing = ?missing.iter().map(|c| c.name()).collect::<Vec<_>>(),
                    "defaulting unset coordinates to zero"
                );
                Ok(())
            }
        }
    }
}

impl<C: EnumKey> FromIterator<(C, f32)> for GeneralizedCoordinates<C> {
    fn from_iter<T: IntoIterator<Item = (C, f32)>>(iter: T) -> Self {
        let mut coordinates = Self::new();
        for (coordinate, value) in iter {
            coordinates.set(coordinate, value);
        }
        coordinates
    }
}
