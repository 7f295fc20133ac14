//! Enum-keyed identifiers for joints, bodies and generalized coordinates.
//!
//! Each articulated model declares its keys with [`enum_keys!`], which gives
//! every variant a dense index (used to order skinning matrices), a
//! canonical upper-case name (used in manifests and logs) and a parser.

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{KinematicsError, Result};

/// A fixed enumeration usable as a map key and a dense array index.
pub trait EnumKey: Copy + Eq + Ord + Hash + Debug + 'static {
    /// All variants, in index order
    const ALL: &'static [Self];

    /// Dense index in `0..ALL.len()`
    fn index(self) -> usize;

    /// Canonical name, e.g. `KNEE_R_FLEX`
    fn name(self) -> &'static str;

    /// Number of variants
    fn count() -> usize {
        Self::ALL.len()
    }

    /// Variant with the given dense index
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Look up a variant by its canonical name (case-insensitive)
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }
}

/// Parse a coordinate name, failing with [`KinematicsError::UnknownCoordinate`].
pub fn parse_coordinate<C: EnumKey>(name: &str) -> Result<C> {
    C::from_name(name).ok_or_else(|| KinematicsError::UnknownCoordinate(name.to_string()))
}

/// Declare a `#[repr(usize)]` enum implementing [`EnumKey`].
///
/// ```
/// kinelab::enum_keys! {
///     /// Joints of a two-link arm
///     pub enum ArmJoint {
///         SHOULDER => "SHOULDER",
///         ELBOW => "ELBOW",
///     }
/// }
/// use kinelab::EnumKey;
/// assert_eq!(ArmJoint::ELBOW.index(), 1);
/// assert_eq!(ArmJoint::from_name("shoulder"), Some(ArmJoint::SHOULDER));
/// ```
#[macro_export]
macro_rules! enum_keys {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(usize)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::EnumKey for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn index(self) -> usize {
                self as usize
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::EnumKey::name(*self))
            }
        }
    };
}
