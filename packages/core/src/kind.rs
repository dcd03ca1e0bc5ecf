//! Coarse categories of runtime types.

use std::fmt;

/// The coarse category of a [`Type`](crate::Type).
///
/// Navigation and nilness checks behave differently per kind, so callers
/// branch on this before choosing the next step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Reported for a location that resolves to nothing.
    Invalid,
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// UTF-8 string.
    String,
    /// Struct with named fields.
    Struct,
    /// Map from comparable keys to values.
    Map,
    /// Growable sequence.
    Slice,
    /// Pointer to a shared value.
    Pointer,
    /// The "any" interface.
    Interface,
}

impl Kind {
    /// Whether values of this kind can be nil.
    pub fn is_nilable(self) -> bool {
        matches!(
            self,
            Kind::Map | Kind::Slice | Kind::Pointer | Kind::Interface
        )
    }

    /// Whether values of this kind have a length.
    pub fn has_len(self) -> bool {
        matches!(self, Kind::Map | Kind::Slice | Kind::String)
    }

    /// Whether this kind can be used as a map key.
    pub fn is_comparable_key(self) -> bool {
        matches!(self, Kind::Bool | Kind::Int | Kind::String)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Invalid => "invalid",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Struct => "struct",
            Kind::Map => "map",
            Kind::Slice => "slice",
            Kind::Pointer => "pointer",
            Kind::Interface => "interface",
        };
        f.write_str(name)
    }
}
