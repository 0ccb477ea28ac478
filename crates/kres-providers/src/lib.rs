//! Declaration providers for the kres resolution core.
//!
//! - **Sources**: the ingestion boundary (`DeclarationSource`), an in-memory
//!   `DeclarationTable`, the builtin declarations and the on-demand synthetic
//!   function interfaces
//! - **Providers**: `SymbolProvider`, a closed union of leaf and composite
//!   providers. Composites answer lookups from their children in order and
//!   cache every answer in a publish-once slot
//! - **Flattening**: enumerating the leaf providers of a composite tree that
//!   are visible to a consumer session
//! - **Scopes**: the per-session `ScopeCache` of materialised member scopes,
//!   and override traversal on top of it

pub mod builtins;
pub mod owner;
pub mod provider;
pub mod scopes;
pub mod source;
pub mod structured;
pub mod synthetic;

pub use builtins::builtins_table;
pub use owner::{ProviderOwner, SessionId, SessionKind};
pub use provider::{LeafKind, LeafProvider, SymbolProvider};
pub use scopes::{
    MarkingPhaseResolver, MemberScope, OverriddenFunction, OverrideEdge, PhaseResolver,
    ScopeCache, ScopeFunction, debug_collect_overrides, overridden_functions,
};
pub use source::{DeclarationSource, DeclarationTable};
pub use structured::StructuredProviders;
pub use synthetic::SyntheticFunctionInterfaces;
