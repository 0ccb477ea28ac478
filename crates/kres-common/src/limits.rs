//! Centralized limits and thresholds.
//!
//! Traversals in this workspace are iterative (explicit worklists), so these
//! bound work rather than stack depth.

/// Maximum number of type-alias expansions followed before giving up.
///
/// An alias chain longer than this is treated as cyclic and left unexpanded.
pub const MAX_ALIAS_EXPANSION_DEPTH: u32 = 64;

/// Maximum number of classes visited while materialising one member scope.
///
/// Guards against malformed (cyclic) supertype graphs coming from binary
/// metadata; well-formed hierarchies stay far below this.
pub const MAX_SUPERTYPE_WORKLIST: usize = 10_000;

/// Maximum number of supertype steps followed by the structural subtype check.
pub const MAX_SUBTYPE_SUPERTYPE_STEPS: usize = 4_096;

/// Highest arity for which synthetic function interfaces are materialised.
pub const MAX_FUNCTION_ARITY: usize = 255;
