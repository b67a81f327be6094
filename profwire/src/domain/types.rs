//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers prevent common bugs like passing a function ID
//! where a location ID is expected, and make signatures more expressive.
//! All of them mirror identifiers in the pprof wire format.

use std::fmt;

/// Index into the profile string table
///
/// Index 0 is reserved for the empty string. On the wire, string-valued
/// fields (function names, filenames, build IDs, label keys) carry one of
/// these indices rather than the string itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringIndex(pub i64);

impl StringIndex {
    /// The reserved index of the empty string.
    pub const EMPTY: StringIndex = StringIndex(0);
}

impl fmt::Display for StringIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "str#{}", self.0)
    }
}

/// Location ID (1-based, assigned sequentially)
///
/// Identifies one resolved instruction address. The same address always
/// yields the same ID for the lifetime of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationId(pub u64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loc#{}", self.0)
    }
}

/// Function ID (1-based, assigned sequentially)
///
/// Functions are keyed by their qualified name; two addresses resolving to
/// the same name share one ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u64);

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

/// Mapping ID (1-based position in the mapping table)
///
/// ID 1 is always the synthetic sentinel entry, so every address has a
/// mapping to reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingId(pub u64);

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        assert_eq!(LocationId(3).to_string(), "loc#3");
        assert_eq!(FunctionId(1).to_string(), "fn#1");
        assert_eq!(MappingId(1).to_string(), "map#1");
        assert_eq!(StringIndex::EMPTY.to_string(), "str#0");
    }
}
