//! Type substitution.

use crate::types::{Type, TypeVariableId};
use kres_common::Name;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Maps type parameters and type variables to replacement types.
///
/// Substituting a nullable occurrence `T?` yields a nullable result even when
/// the replacement itself is not nullable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitutor {
    parameters: FxHashMap<Name, Type>,
    variables: FxHashMap<TypeVariableId, Type>,
}

impl Substitutor {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.variables.is_empty()
    }

    /// Substitutor mapping `parameters[i]` to `arguments[i]`. Extra entries on
    /// either side are ignored.
    pub fn from_parameters<'a>(
        parameters: impl IntoIterator<Item = &'a Name>,
        arguments: &[Type],
    ) -> Self {
        let mut substitutor = Self::default();
        for (name, argument) in parameters.into_iter().zip(arguments) {
            substitutor.bind_parameter(name.clone(), argument.clone());
        }
        substitutor
    }

    pub fn bind_parameter(&mut self, name: Name, ty: Type) {
        self.parameters.insert(name, ty);
    }

    pub fn bind_variable(&mut self, id: TypeVariableId, ty: Type) {
        self.variables.insert(id, ty);
    }

    pub fn parameter(&self, name: &Name) -> Option<&Type> {
        self.parameters.get(name)
    }

    pub fn variable(&self, id: TypeVariableId) -> Option<&Type> {
        self.variables.get(&id)
    }

    /// Substitute, or return `None` when nothing in `ty` is affected.
    pub fn substitute(&self, ty: &Type) -> Option<Type> {
        if self.is_empty() {
            return None;
        }
        match ty {
            Type::TypeParameter { name, nullable } => self
                .parameters
                .get(name)
                .map(|replacement| nullable_if(replacement, *nullable)),
            Type::Variable { id, nullable } => self
                .variables
                .get(id)
                .map(|replacement| nullable_if(replacement, *nullable)),
            Type::Class {
                id,
                arguments,
                nullable,
            } => {
                let substituted: Vec<Option<Type>> =
                    arguments.iter().map(|argument| self.substitute(argument)).collect();
                if substituted.iter().all(Option::is_none) {
                    return None;
                }
                let arguments: Vec<Type> = substituted
                    .into_iter()
                    .zip(arguments.iter())
                    .map(|(new, old)| new.unwrap_or_else(|| old.clone()))
                    .collect();
                Some(Type::Class {
                    id: id.clone(),
                    arguments: Arc::from(arguments),
                    nullable: *nullable,
                })
            }
            Type::Stub { .. } | Type::IntegerLiteral { .. } | Type::Error => None,
        }
    }

    pub fn substitute_or_self(&self, ty: &Type) -> Type {
        self.substitute(ty).unwrap_or_else(|| ty.clone())
    }

    /// Substitutor equivalent to applying `inner` first and then `self`.
    ///
    /// Only the keys of `inner` are kept when it is non-empty: a member
    /// inherited through several supertypes mentions the type parameters of
    /// its declaring class only.
    pub fn compose_with(&self, inner: &Substitutor) -> Substitutor {
        if inner.is_empty() {
            return self.clone();
        }
        Substitutor {
            parameters: inner
                .parameters
                .iter()
                .map(|(name, ty)| (name.clone(), self.substitute_or_self(ty)))
                .collect(),
            variables: inner
                .variables
                .iter()
                .map(|(id, ty)| (*id, self.substitute_or_self(ty)))
                .collect(),
        }
    }
}

fn nullable_if(ty: &Type, nullable: bool) -> Type {
    if nullable && !ty.is_nullable() {
        ty.make_nullable()
    } else {
        ty.clone()
    }
}

#[cfg(test)]
#[path = "../tests/substitution_tests.rs"]
mod tests;
