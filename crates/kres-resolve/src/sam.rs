//! Single-abstract-method adaptation.
//!
//! A functional interface type such as `Comparator<Int>` can be satisfied by a
//! lambda, a callable reference or any value with a compatible `invoke`. The
//! resolver answers the two questions the argument stage asks: which function
//! type an interface is adaptable from, and which `invoke` a value type
//! contributes.

use kres_common::Name;
use kres_providers::synthetic::INVOKE;
use kres_session::Session;
use kres_types::standard::{FunctionKind, function_parameter_types, function_type, is_some_function_type};
use kres_types::{
    CallableSymbol, DeclarationOrigin, ResolvePhase, Substitutor, Type, fully_expanded_type,
};
use std::sync::Arc;
use tracing::trace;

/// How an interface type is adapted from a function type.
#[derive(Clone, Debug)]
pub struct SamConversionInfo {
    /// The interface type being adapted to, aliases expanded.
    pub sam_type: Type,
    /// `FunctionN` type of the single abstract member, in terms of
    /// `sam_type`'s arguments.
    pub functional_type: Type,
    pub sam_member: CallableSymbol,
    /// Origin of the interface declaration.
    pub origin: DeclarationOrigin,
}

/// Signature of an `invoke` member contributed by a value type.
#[derive(Clone, Debug)]
pub struct InvokeSignature {
    pub symbol: CallableSymbol,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
}

pub trait SamResolver: Send + Sync {
    /// `Some` when `ty` is a functional interface type.
    fn sam_info_for_possible_sam_type(&self, ty: &Type) -> Option<SamConversionInfo>;

    /// The `invoke` member of `ty` whose arity matches
    /// `expected_function_type`.
    fn find_contributed_invoke(&self, ty: &Type, expected_function_type: &Type) -> Option<InvokeSignature>;
}

/// Resolves interfaces and `invoke` members through a session's providers
/// and scope cache.
pub struct SessionSamResolver {
    session: Arc<Session>,
}

impl SessionSamResolver {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl SamResolver for SessionSamResolver {
    fn sam_info_for_possible_sam_type(&self, ty: &Type) -> Option<SamConversionInfo> {
        if is_some_function_type(ty) {
            return None;
        }
        let expanded = fully_expanded_type(ty, &*self.session);
        let class = self.session.class_symbol(expanded.class_id()?)?;
        let sam_member = class.single_abstract_member()?.clone();

        let substitutor = Substitutor::from_parameters(
            class.type_parameters.iter().map(|parameter| &parameter.name),
            expanded.arguments(),
        );
        let parameters = sam_member
            .receiver_type
            .iter()
            .chain(sam_member.value_parameters.iter().map(|parameter| &parameter.ty))
            .map(|ty| substitutor.substitute_or_self(ty))
            .collect();
        let return_type = substitutor.substitute_or_self(&sam_member.return_type);
        let functional_type = function_type(FunctionKind::Function, parameters, return_type)
            .with_nullability_of(&expanded);

        trace!(sam = %expanded, functional = %functional_type, "functional interface");
        Some(SamConversionInfo {
            sam_type: expanded,
            functional_type,
            sam_member,
            origin: class.origin.clone(),
        })
    }

    fn find_contributed_invoke(&self, ty: &Type, expected_function_type: &Type) -> Option<InvokeSignature> {
        let arity = function_parameter_types(expected_function_type).len();
        let expanded = fully_expanded_type(&ty.make_not_null(), &*self.session);
        let (scope, substitutor) = self
            .session
            .scope_cache()
            .scope_for_type(&expanded, ResolvePhase::Status)?;
        let invoke = Name::identifier(INVOKE);
        let function = scope
            .functions_named(&invoke)
            .iter()
            .find(|function| function.symbol.value_parameters.len() == arity)?;
        Some(InvokeSignature {
            symbol: function.symbol.clone(),
            parameter_types: function
                .parameter_types()
                .iter()
                .map(|ty| substitutor.substitute_or_self(ty))
                .collect(),
            return_type: substitutor.substitute_or_self(&function.return_type()),
        })
    }
}

#[cfg(test)]
#[path = "../tests/sam_tests.rs"]
mod tests;
