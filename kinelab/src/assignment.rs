//! Vertex-to-joint assignment by spatial regions
//!
//! Each vertex is bound to exactly one joint: rules are tested in priority
//! order and the first region containing the vertex wins, otherwise the
//! fallback joint is used. There is no blending between joints and no
//! smoothing at region boundaries.

use glam::Vec3;

use crate::ids::EnumKey;

/// One end of an interval on a coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// No limit on this side
    Unbounded,
    /// The limit itself belongs to the interval
    Inclusive(f32),
    /// The limit itself is outside the interval
    Exclusive(f32),
}

/// Interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: Bound,
    pub max: Bound,
}

impl AxisRange {
    pub const ANY: Self = Self {
        min: Bound::Unbounded,
        max: Bound::Unbounded,
    };

    pub const fn new(min: Bound, max: Bound) -> Self {
        Self { min, max }
    }

    /// `min <= v <= max`
    pub const fn closed(min: f32, max: f32) -> Self {
        Self::new(Bound::Inclusive(min), Bound::Inclusive(max))
    }

    /// `min < v < max`
    pub const fn open(min: f32, max: f32) -> Self {
        Self::new(Bound::Exclusive(min), Bound::Exclusive(max))
    }

    /// `v > min`
    pub const fn above(min: f32) -> Self {
        Self::new(Bound::Exclusive(min), Bound::Unbounded)
    }

    /// `v < max`
    pub const fn below(max: f32) -> Self {
        Self::new(Bound::Unbounded, Bound::Exclusive(max))
    }

    pub fn contains(&self, v: f32) -> bool {
        let above_min = match self.min {
            Bound::Unbounded => true,
            Bound::Inclusive(min) => v >= min,
            Bound::Exclusive(min) => v > min,
        };
        let below_max = match self.max {
            Bound::Unbounded => true,
            Bound::Inclusive(max) => v <= max,
            Bound::Exclusive(max) => v < max,
        };
        above_min && below_max
    }
}

/// Axis-aligned box; a vertex is inside when every axis range contains it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBox {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl RegionBox {
    pub const ANY: Self = Self {
        x: AxisRange::ANY,
        y: AxisRange::ANY,
        z: AxisRange::ANY,
    };

    pub const fn with_x(mut self, x: AxisRange) -> Self {
        self.x = x;
        self
    }

    pub const fn with_y(mut self, y: AxisRange) -> Self {
        self.y = y;
        self
    }

    pub const fn with_z(mut self, z: AxisRange) -> Self {
        self.z = z;
        self
    }

    pub fn contains(&self, v: Vec3) -> bool {
        self.x.contains(v.x) && self.y.contains(v.y) && self.z.contains(v.z)
    }
}

/// A joint and the union of boxes bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRule<J: EnumKey> {
    pub joint: J,
    pub boxes: Vec<RegionBox>,
}

impl<J: EnumKey> RegionRule<J> {
    pub fn new(joint: J, boxes: impl IntoIterator<Item = RegionBox>) -> Self {
        Self {
            joint,
            boxes: boxes.into_iter().collect(),
        }
    }

    pub fn matches(&self, v: Vec3) -> bool {
        self.boxes.iter().any(|b| b.contains(v))
    }
}

/// Ordered rule list with a fallback joint.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionClassifier<J: EnumKey> {
    rules: Vec<RegionRule<J>>,
    fallback: J,
}

impl<J: EnumKey> RegionClassifier<J> {
    pub fn new(fallback: J) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule; earlier rules take priority
    pub fn rule(mut self, joint: J, boxes: impl IntoIterator<Item = RegionBox>) -> Self {
        self.rules.push(RegionRule::new(joint, boxes));
        self
    }

    pub fn rules(&self) -> &[RegionRule<J>] {
        &self.rules
    }

    pub fn fallback(&self) -> J {
        self.fallback
    }

    /// Joint of the first rule containing `v`, else the fallback
    pub fn classify(&self, v: Vec3) -> J {
        self.rules
            .iter()
            .find(|rule| rule.matches(v))
            .map_or(self.fallback, |rule| rule.joint)
    }

    /// One joint per vertex, in vertex order
    pub fn assign(&self, vertices: &[Vec3]) -> Vec<J> {
        let assignment: Vec<J> = vertices.iter().map(|v| self.classify(*v)).collect();
        tracing::debug!(
            vertices = vertices.len(),
            rules = self.rules.len(),
            "assigned vertices to joints"
        );
        assignment
    }
}

/// Count of vertices per joint, indexed by joint index
pub fn joint_histogram<J: EnumKey>(assignment: &[J]) -> Vec<usize> {
    let mut counts = vec![0; J::count()];
    for joint in assignment {
        counts[joint.index()] += 1;
    }
    counts
}

/// Joint indices as `f32`, the layout of a float vertex attribute
pub fn assignment_attribute<J: EnumKey>(assignment: &[J]) -> Vec<f32> {
    assignment.iter().map(|j| j.index() as f32).collect()
}
