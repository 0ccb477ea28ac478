//! Type model and declarations for the kres resolution core.
//!
//! - **`Type`**: value-typed, hashable type representation (classes, type
//!   parameters, in-flight type variables, stub types, integer literals)
//! - **Declarations**: `ClassDecl` / `CallableDecl` shared as `Arc` symbols,
//!   compared by identity where it matters
//! - **Subtyping**: a structural checker over class supertypes, parameterised
//!   by how stub and error types are treated
//!
//! Function types are ordinary class types over the synthetic
//! `FunctionN` / `SuspendFunctionN` / `KFunctionN` interfaces.
pub mod declarations;
pub mod standard;
pub mod substitution;
pub mod subtyping;
pub mod types;

pub use declarations::{
    CallableDecl, CallableSymbol, ClassDecl, ClassKind, ClassSymbol, DeclarationOrigin,
    ExpectActual, Modality, ResolvePhase, TypeParameterDecl, ValueParameter, Variance,
    same_symbol,
};
pub use standard::{FunctionKind, IntegerKind};
pub use substitution::Substitutor;
pub use subtyping::{ClassLookup, SubtypeChecker, fully_expanded_type};
pub use types::{Type, TypeConstructor, TypeVariableId};
