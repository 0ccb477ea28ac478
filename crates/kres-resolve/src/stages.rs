//! Candidate resolution stages.
//!
//! Each candidate goes through the stages in order; a stage reports problems
//! to the candidate's sink and the driver stops once the candidate is
//! inapplicable. [`CheckArguments`] is where expected types are prepared:
//! SAM adaptation first, then implicit signed-to-unsigned integer coercion.

use crate::argument_checker::{ArgumentChecker, CheckedArgument, DefaultArgumentChecker};
use crate::call_info::{CallArgument, CallInfo, Expression};
use crate::candidate::Candidate;
use crate::constraints::{ConstraintSystemFactory, SimpleConstraintSystemFactory, stub_variables};
use crate::mapping::map_arguments;
use crate::sam::{InvokeSignature, SamConversionInfo, SamResolver, SessionSamResolver};
use crate::sink::{CheckerSink, ResolutionDiagnostic};
use kres_common::LanguageFeature;
use kres_session::Session;
use kres_types::standard::{
    FunctionKind, function_parameter_types, function_return_type, function_type,
    is_some_function_type, is_unsigned_type_or_nullable_unsigned,
};
use kres_types::{SubtypeChecker, Type, ValueParameter, fully_expanded_type};
use std::fmt;
use std::sync::Arc;
use tracing::{Level, debug, span};

/// Collaborators shared by every candidate of every call resolved against
/// one session.
#[derive(Clone)]
pub struct ResolutionContext {
    pub session: Arc<Session>,
    pub sam_resolver: Arc<dyn SamResolver>,
    pub argument_checker: Arc<dyn ArgumentChecker>,
    pub constraint_systems: Arc<dyn ConstraintSystemFactory>,
}

impl ResolutionContext {
    /// Context with the session-backed SAM resolver, the default argument
    /// checker and [`SimpleConstraintSystem`](crate::SimpleConstraintSystem)s.
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            sam_resolver: Arc::new(SessionSamResolver::new(session.clone())),
            argument_checker: Arc::new(DefaultArgumentChecker),
            constraint_systems: Arc::new(SimpleConstraintSystemFactory::new(session.clone())),
            session,
        }
    }

    #[must_use]
    pub fn with_sam_resolver(mut self, sam_resolver: Arc<dyn SamResolver>) -> Self {
        self.sam_resolver = sam_resolver;
        self
    }

    #[must_use]
    pub fn with_argument_checker(mut self, argument_checker: Arc<dyn ArgumentChecker>) -> Self {
        self.argument_checker = argument_checker;
        self
    }

    #[must_use]
    pub fn with_constraint_systems(mut self, factory: Arc<dyn ConstraintSystemFactory>) -> Self {
        self.constraint_systems = factory;
        self
    }

    pub fn supports_feature(&self, feature: LanguageFeature) -> bool {
        self.session.language_settings().supports_feature(feature)
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("session", &self.session.id())
            .finish_non_exhaustive()
    }
}

pub trait ResolutionStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(
        &self,
        candidate: &mut Candidate,
        call: &CallInfo,
        sink: &mut CheckerSink,
        context: &ResolutionContext,
    );
}

// =============================================================================
// MapArguments
// =============================================================================

/// Receiver shape check and argument-to-parameter mapping.
#[derive(Copy, Clone, Debug, Default)]
pub struct MapArguments;

impl ResolutionStage for MapArguments {
    fn name(&self) -> &'static str {
        "MapArguments"
    }

    fn check(
        &self,
        candidate: &mut Candidate,
        call: &CallInfo,
        sink: &mut CheckerSink,
        _context: &ResolutionContext,
    ) {
        let symbol = &candidate.symbol;
        let receiver_matches = match (&symbol.receiver_type, &call.explicit_receiver) {
            (Some(_), Some(_)) | (None, None) => true,
            (None, Some(_)) => symbol.dispatch_receiver.is_some(),
            (Some(_), None) => false,
        };
        if !receiver_matches {
            sink.report(ResolutionDiagnostic::MissingReceiver);
            return;
        }
        candidate.argument_mapping = map_arguments(call, symbol, sink);
    }
}

// =============================================================================
// CheckArguments
// =============================================================================

#[derive(Copy, Clone, Debug, Default)]
pub struct CheckArguments;

impl ResolutionStage for CheckArguments {
    fn name(&self) -> &'static str {
        "CheckArguments"
    }

    fn check(
        &self,
        candidate: &mut Candidate,
        call: &CallInfo,
        sink: &mut CheckerSink,
        context: &ResolutionContext,
    ) {
        let symbol = candidate.symbol.clone();
        let _span = span!(Level::DEBUG, "check_arguments", callee = %symbol.name()).entered();

        // the receiver always goes first
        if let (Some(receiver_type), Some(receiver)) = (&symbol.receiver_type, &call.explicit_receiver) {
            let expected = candidate.substitutor.substitute_or_self(receiver_type);
            context.argument_checker.check_argument(
                candidate,
                CheckedArgument::Receiver(receiver),
                &expected,
                sink,
            );
        }

        for (index, argument) in call.arguments.iter().enumerate() {
            if sink.should_stop() {
                break;
            }
            let Some(parameter) = candidate
                .argument_mapping
                .parameter_of(index)
                .and_then(|position| symbol.value_parameters.get(position))
            else {
                continue;
            };
            let expected = prepare_expected_type(candidate, index, argument, parameter, context);
            context.argument_checker.check_argument(
                candidate,
                CheckedArgument::Value { index, argument },
                &expected,
                sink,
            );
        }

        if candidate.system.has_contradiction() && !call.arguments.is_empty() {
            sink.report(ResolutionDiagnostic::InapplicableCandidate);
        }

        if candidate.should_have_low_priority_due_to_sam()
            && !context.supports_feature(LanguageFeature::DisableCompatibilityModeForNewInference)
        {
            debug!(callee = %symbol.name(), "candidate demoted for compatibility");
            sink.report(ResolutionDiagnostic::LowerPriorityToPreserveCompatibility);
        }
    }
}

/// The parameter type after substitution, then SAM adaptation, then integer
/// coercion. At most one of the two adjustments applies.
fn prepare_expected_type(
    candidate: &mut Candidate,
    index: usize,
    argument: &CallArgument,
    parameter: &ValueParameter,
    context: &ResolutionContext,
) -> Type {
    let basic = candidate.substitutor.substitute_or_self(&parameter.ty);

    if let Some(adapted) = sam_adapted_type(candidate, index, argument, &basic, context) {
        return adapted;
    }

    if let Some(coerced) = integer_coerced_type(argument, parameter, &basic, context) {
        debug!(argument = index, expected = %coerced, "integer coercion");
        candidate.integer_coercions.insert(index, coerced.clone());
        return coerced;
    }

    basic
}

fn sam_adapted_type(
    candidate: &mut Candidate,
    index: usize,
    argument: &CallArgument,
    basic: &Type,
    context: &ResolutionContext,
) -> Option<Type> {
    if is_some_function_type(basic) {
        return None;
    }
    let info = context.sam_resolver.sam_info_for_possible_sam_type(basic)?;
    if !should_run_sam_conversion(candidate, index, &argument.expression, basic, &info, context) {
        debug!(argument = index, sam = %info.sam_type, "no SAM conversion");
        return None;
    }
    debug!(argument = index, sam = %info.sam_type, functional = %info.functional_type, "SAM conversion");
    let functional = info.functional_type.clone();
    candidate.sam_conversions.insert(index, info);
    Some(functional)
}

/// The first matching rule decides.
fn should_run_sam_conversion(
    candidate: &mut Candidate,
    index: usize,
    expression: &Expression,
    expected: &Type,
    info: &SamConversionInfo,
    context: &ResolutionContext,
) -> bool {
    if expression.is_lambda_or_callable_reference() {
        return true;
    }
    if expression.is_call_with_generic_return_type_and_matching_lambda() {
        return true;
    }
    let Some(argument_type) = expression.resolved_type() else {
        return false;
    };
    if argument_type.is_integer_literal() {
        return false;
    }
    let compatible = match expression {
        Expression::Call { .. } => candidate.system.is_nested_call_compatible(&argument_type, expected),
        _ => candidate
            .system
            .is_subtype_constraint_compatible(&argument_type, expected),
    };
    if compatible {
        return false;
    }
    if is_some_function_type(&argument_type) {
        return true;
    }
    let Some(invoke) = context
        .sam_resolver
        .find_contributed_invoke(&argument_type, &info.functional_type)
    else {
        return false;
    };
    if !is_invoke_compatible(&invoke, &info.functional_type, &context.session) {
        return false;
    }
    // the value is passed as its invoke
    candidate.invoke_conversions.insert(
        index,
        function_type(FunctionKind::Function, invoke.parameter_types, invoke.return_type)
            .with_nullability_of(&argument_type),
    );
    true
}

/// Arity and variance-agnostic compatibility of a contributed `invoke` with
/// the adapted function type. Stub types, variables and type parameters
/// are compatible with anything.
fn is_invoke_compatible(invoke: &InvokeSignature, expected: &Type, session: &Session) -> bool {
    let expected_parameters = function_parameter_types(expected);
    let Some(expected_return) = function_return_type(expected) else {
        return false;
    };
    if invoke.parameter_types.len() != expected_parameters.len() {
        return false;
    }
    let checker = SubtypeChecker::new(session).with_stub_types_equal_to_anything(true);
    let compatible = |sub: &Type, sup: &Type| {
        sub.is_type_parameter()
            || sup.is_type_parameter()
            || checker.is_subtype_of(&stub_variables(sub), &stub_variables(sup))
    };
    compatible(&invoke.return_type, expected_return)
        && invoke
            .parameter_types
            .iter()
            .zip(expected_parameters)
            .all(|(actual, expected)| compatible(actual, expected))
}

fn integer_coerced_type(
    argument: &CallArgument,
    parameter: &ValueParameter,
    basic: &Type,
    context: &ResolutionContext,
) -> Option<Type> {
    if !context.supports_feature(LanguageFeature::ImplicitSignedToUnsignedIntegerConversion)
        || !parameter.implicit_integer_coercion
    {
        return None;
    }
    if !is_unsigned_type_or_nullable_unsigned(&fully_expanded_type(basic, &*context.session)) {
        return None;
    }
    let eligible = match &argument.expression {
        expression if expression.is_integer_literal_or_operator_call() => true,
        Expression::PropertyReference { symbol } => symbol.is_const && symbol.implicit_integer_coercion,
        _ => false,
    };
    if !eligible {
        return None;
    }
    let natural = argument.expression.resolved_type()?;
    Some(basic.with_nullability_of(&natural))
}

#[cfg(test)]
#[path = "../tests/stages_tests.rs"]
mod tests;
