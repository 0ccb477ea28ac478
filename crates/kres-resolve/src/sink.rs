//! Candidate outcomes.
//!
//! Resolution stages never fail: every problem with a candidate is reported
//! to its [`CheckerSink`] and the overload driver compares the outcomes.

use kres_common::Name;
use kres_types::Type;
use std::fmt;

/// Applicability tiers, best first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CandidateApplicability {
    Resolved,
    /// Applicable, but only chosen when no `Resolved` candidate exists.
    ResolvedLowPriority,
    Inapplicable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionDiagnostic {
    TooManyArguments { count: usize },
    NamedParameterNotFound { name: Name },
    ArgumentPassedTwice { name: Name },
    NoValueForParameter { name: Name },
    MixingNamedAndPositionalArguments,
    NonVarargSpread { argument: usize },
    /// A call without a receiver to an extension, or the reverse.
    MissingReceiver,
    ReceiverTypeMismatch { expected: Type, actual: Type },
    /// A lambda whose parameter count differs from the expected function type.
    LambdaArityMismatch {
        argument: usize,
        expected: usize,
        actual: usize,
    },
    /// The constraint system has a contradiction after all arguments.
    InapplicableCandidate,
    LowerPriorityToPreserveCompatibility,
}

impl ResolutionDiagnostic {
    pub const fn applicability(&self) -> CandidateApplicability {
        match self {
            Self::LowerPriorityToPreserveCompatibility => {
                CandidateApplicability::ResolvedLowPriority
            }
            _ => CandidateApplicability::Inapplicable,
        }
    }
}

impl fmt::Display for ResolutionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyArguments { count } => write!(f, "too many arguments ({count})"),
            Self::NamedParameterNotFound { name } => write!(f, "no parameter named `{name}`"),
            Self::ArgumentPassedTwice { name } => write!(f, "argument `{name}` passed twice"),
            Self::NoValueForParameter { name } => write!(f, "no value passed for `{name}`"),
            Self::MixingNamedAndPositionalArguments => {
                f.write_str("positional argument after a named one")
            }
            Self::NonVarargSpread { argument } => {
                write!(f, "argument {argument} is spread into a non-vararg parameter")
            }
            Self::MissingReceiver => f.write_str("receiver does not match the callable"),
            Self::ReceiverTypeMismatch { expected, actual } => {
                write!(f, "receiver: expected `{expected}`, found `{actual}`")
            }
            Self::LambdaArityMismatch {
                argument,
                expected,
                actual,
            } => write!(
                f,
                "argument {argument}: expected a lambda with {expected} parameters, found {actual}"
            ),
            Self::InapplicableCandidate => f.write_str("inapplicable candidate"),
            Self::LowerPriorityToPreserveCompatibility => {
                f.write_str("lower priority to preserve compatibility")
            }
        }
    }
}

/// Result of running the stages over one candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    Applicable,
    LowerPriority(ResolutionDiagnostic),
    Inapplicable(ResolutionDiagnostic),
}

impl CheckOutcome {
    pub fn applicability(&self) -> CandidateApplicability {
        match self {
            Self::Applicable => CandidateApplicability::Resolved,
            Self::LowerPriority(_) => CandidateApplicability::ResolvedLowPriority,
            Self::Inapplicable(_) => CandidateApplicability::Inapplicable,
        }
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::Inapplicable(_))
    }
}

/// Collects the diagnostics of one candidate. The worst tier wins.
#[derive(Debug, Default)]
pub struct CheckerSink {
    diagnostics: Vec<ResolutionDiagnostic>,
}

impl CheckerSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: ResolutionDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[ResolutionDiagnostic] {
        &self.diagnostics
    }

    pub fn current_applicability(&self) -> CandidateApplicability {
        self.diagnostics
            .iter()
            .map(ResolutionDiagnostic::applicability)
            .max()
            .unwrap_or(CandidateApplicability::Resolved)
    }

    /// Later stages are skipped once a candidate is inapplicable.
    pub fn should_stop(&self) -> bool {
        self.current_applicability() == CandidateApplicability::Inapplicable
    }

    /// The outcome, keyed by the first diagnostic of the worst tier.
    pub fn outcome(&self) -> CheckOutcome {
        let worst = self.current_applicability();
        let reason = self
            .diagnostics
            .iter()
            .find(|diagnostic| diagnostic.applicability() == worst)
            .cloned();
        match (worst, reason) {
            (CandidateApplicability::Inapplicable, Some(reason)) => CheckOutcome::Inapplicable(reason),
            (CandidateApplicability::ResolvedLowPriority, Some(reason)) => {
                CheckOutcome::LowerPriority(reason)
            }
            _ => CheckOutcome::Applicable,
        }
    }

    pub fn into_diagnostics(self) -> Vec<ResolutionDiagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
#[path = "../tests/sink_tests.rs"]
mod tests;
