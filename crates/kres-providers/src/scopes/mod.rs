//! Resolution scopes: materialised member scopes, their per-session cache and
//! override traversal.

mod cache;
mod member_scope;
mod overrides;

pub use cache::{MarkingPhaseResolver, PhaseResolver, ScopeCache};
pub use member_scope::{MemberScope, OverriddenFunction, ScopeFunction};
pub use overrides::{OverrideEdge, debug_collect_overrides, overridden_functions};

#[cfg(test)]
#[path = "../../tests/scopes_tests.rs"]
mod tests;
