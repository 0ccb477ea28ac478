//! Call resolution for the kres resolution core.
//!
//! Resolving a call site goes through:
//!
//! 1. **Candidate collection** - members of the receiver's scope and
//!    top-level callables, with `expect` callables shadowed by their
//!    `actual`s
//! 2. **`MapArguments`** - receiver shape and argument-to-parameter mapping
//! 3. **`CheckArguments`** - expected types per argument (SAM adaptation,
//!    implicit integer coercion) fed to the argument checker
//! 4. **Selection** - the best applicability tier wins; ties are ambiguous
//!
//! Every candidate owns its constraint system. Problems are reported to a
//! per-candidate [`CheckerSink`] and never abort sibling candidates.

pub mod argument_checker;
pub mod call_info;
pub mod candidate;
pub mod constraints;
pub mod mapping;
pub mod resolver;
pub mod sam;
pub mod sink;
pub mod stages;

pub use argument_checker::{ArgumentChecker, CheckedArgument, DefaultArgumentChecker};
pub use call_info::{CallArgument, CallInfo, Expression, PostponedAtom, callable_reference_type};
pub use candidate::Candidate;
pub use constraints::{
    ConstraintSystem, ConstraintSystemFactory, SimpleConstraintSystem, SimpleConstraintSystemFactory,
};
pub use mapping::{ArgumentMapping, map_arguments};
pub use resolver::{OverloadResolver, RejectedCandidate, ResolutionResult, ResolvedCall};
pub use sam::{InvokeSignature, SamConversionInfo, SamResolver, SessionSamResolver};
pub use sink::{CandidateApplicability, CheckOutcome, CheckerSink, ResolutionDiagnostic};
pub use stages::{CheckArguments, MapArguments, ResolutionContext, ResolutionStage};

#[cfg(test)]
#[path = "../tests/support.rs"]
mod test_support;
