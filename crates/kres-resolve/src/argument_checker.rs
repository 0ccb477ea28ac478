//! Argument type checking.
//!
//! The argument stage computes an expected type per argument and hands the
//! pair to an [`ArgumentChecker`]. The default checker registers the subtype
//! constraint with the candidate's system and types lambdas against the
//! function type they are matched with.

use crate::call_info::{CallArgument, Expression, PostponedAtom};
use crate::candidate::Candidate;
use crate::constraints::import_foreign_variables;
use crate::sink::{CheckerSink, ResolutionDiagnostic};
use kres_types::standard::{
    FunctionKind, function_parameter_types, function_type, is_some_function_type, nothing_type,
    nullable_any_type,
};
use kres_types::Type;
use rustc_hash::FxHashMap;
use tracing::trace;

/// An argument being checked, with its position in the call.
#[derive(Copy, Clone, Debug)]
pub enum CheckedArgument<'a> {
    /// The explicit receiver of an extension call.
    Receiver(&'a Type),
    Value {
        index: usize,
        argument: &'a CallArgument,
    },
}

pub trait ArgumentChecker: Send + Sync {
    /// Check one argument against its final expected type. Failures are
    /// recorded as contradictions in the candidate's system or reported to
    /// `sink`.
    fn check_argument(
        &self,
        candidate: &mut Candidate,
        argument: CheckedArgument<'_>,
        expected_type: &Type,
        sink: &mut CheckerSink,
    );
}

#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultArgumentChecker;

impl ArgumentChecker for DefaultArgumentChecker {
    fn check_argument(
        &self,
        candidate: &mut Candidate,
        argument: CheckedArgument<'_>,
        expected_type: &Type,
        sink: &mut CheckerSink,
    ) {
        match argument {
            CheckedArgument::Receiver(receiver) => {
                if !candidate.system.add_subtype_constraint(receiver, expected_type) {
                    sink.report(ResolutionDiagnostic::ReceiverTypeMismatch {
                        expected: expected_type.clone(),
                        actual: receiver.clone(),
                    });
                }
            }
            CheckedArgument::Value { index, argument } => match &argument.expression {
                Expression::Lambda { parameters } => {
                    check_lambda(candidate, index, *parameters, expected_type, sink);
                }
                expression => {
                    let converted = candidate
                        .integer_coercions
                        .get(&index)
                        .or_else(|| candidate.invoke_conversions.get(&index));
                    let actual = match converted {
                        Some(converted) => converted.clone(),
                        None => match expression.resolved_type() {
                            Some(ty) => ty,
                            None => return,
                        },
                    };
                    let actual = if matches!(expression, Expression::Call { .. }) {
                        import_foreign_variables(&actual, &mut *candidate.system, &mut FxHashMap::default())
                    } else {
                        actual
                    };
                    candidate.system.add_subtype_constraint(&actual, expected_type);
                }
            },
        }
    }
}

fn check_lambda(
    candidate: &mut Candidate,
    index: usize,
    parameters: usize,
    expected_type: &Type,
    sink: &mut CheckerSink,
) {
    if is_some_function_type(expected_type) {
        let expected = function_parameter_types(expected_type).len();
        if expected != parameters {
            sink.report(ResolutionDiagnostic::LambdaArityMismatch {
                argument: index,
                expected,
                actual: parameters,
            });
        }
        return;
    }
    if let Type::Variable { .. } = expected_type {
        // typed once the variable is fixed, after this call is chosen
        trace!(argument = index, expected = %expected_type, "lambda postponed");
        candidate
            .postponed_atoms
            .push(PostponedAtom::LambdaWithTypeVariableAsExpectedType {
                expected_type: expected_type.clone(),
            });
        return;
    }
    let lambda_type = function_type(
        FunctionKind::Function,
        vec![nullable_any_type(); parameters],
        nothing_type(),
    );
    candidate.system.add_subtype_constraint(&lambda_type, expected_type);
}
