//! Structural subtype checking over class hierarchies.
//!
//! The checker walks declared supertypes with an explicit worklist, applying
//! each class's type-parameter substitution on the way up, and compares type
//! arguments according to the declared variance of the target class.
//!
//! Type variables are opaque here: two variables are related only when they
//! are the same variable. Registering constraints on variables is the job of a
//! constraint system built on top of this checker.

use crate::declarations::{ClassKind, ClassSymbol, Variance};
use crate::standard::{ANY, IntegerKind, NOTHING};
use crate::substitution::Substitutor;
use crate::types::Type;
use kres_common::ClassId;
use kres_common::limits::{MAX_ALIAS_EXPANSION_DEPTH, MAX_SUBTYPE_SUPERTYPE_STEPS};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::trace;

/// Class lookup used by type-level operations.
///
/// Implemented by declaration providers; a miss is `None`.
pub trait ClassLookup {
    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol>;
}

impl<T: ClassLookup + ?Sized> ClassLookup for &T {
    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        (**self).class_symbol(id)
    }
}

impl<T: ClassLookup + ?Sized> ClassLookup for std::sync::Arc<T> {
    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        (**self).class_symbol(id)
    }
}

/// Expand type aliases at the head of `ty` until a non-alias is reached.
///
/// Nullability accumulates: expanding `A?` where `typealias A = B` gives `B?`.
/// Chains longer than `MAX_ALIAS_EXPANSION_DEPTH` are left as they are.
pub fn fully_expanded_type(ty: &Type, lookup: &dyn ClassLookup) -> Type {
    let mut current = ty.clone();
    for _ in 0..MAX_ALIAS_EXPANSION_DEPTH {
        let Type::Class {
            id,
            arguments,
            nullable,
        } = &current
        else {
            return current;
        };
        let Some(class) = lookup.class_symbol(id) else {
            return current;
        };
        let (ClassKind::TypeAlias, Some(target)) = (class.kind, class.alias_target.as_ref())
        else {
            return current;
        };
        let substitutor = Substitutor::from_parameters(
            class.type_parameters.iter().map(|parameter| &parameter.name),
            arguments,
        );
        let expanded = substitutor.substitute_or_self(target);
        current = if *nullable {
            expanded.make_nullable()
        } else {
            expanded
        };
    }
    trace!(%ty, "alias expansion limit reached");
    current
}

pub struct SubtypeChecker<'a> {
    lookup: &'a dyn ClassLookup,
    stub_types_equal_to_anything: bool,
    error_types_equal_to_anything: bool,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(lookup: &'a dyn ClassLookup) -> Self {
        Self {
            lookup,
            stub_types_equal_to_anything: false,
            error_types_equal_to_anything: false,
        }
    }

    #[must_use]
    pub fn with_stub_types_equal_to_anything(mut self, value: bool) -> Self {
        self.stub_types_equal_to_anything = value;
        self
    }

    #[must_use]
    pub fn with_error_types_equal_to_anything(mut self, value: bool) -> Self {
        self.error_types_equal_to_anything = value;
        self
    }

    pub fn is_equal_type(&self, a: &Type, b: &Type) -> bool {
        a == b || (self.is_subtype_of(a, b) && self.is_subtype_of(b, a))
    }

    pub fn is_subtype_of(&self, sub: &Type, sup: &Type) -> bool {
        let sub = fully_expanded_type(sub, self.lookup);
        let sup = fully_expanded_type(sup, self.lookup);
        if sub == sup {
            return true;
        }

        match (&sub, &sup) {
            (Type::Error, _) | (_, Type::Error) => return self.error_types_equal_to_anything,
            (Type::Stub { .. }, _) | (_, Type::Stub { .. }) if self.stub_types_equal_to_anything => {
                return true;
            }
            _ => {}
        }

        if sub.is_nullable() && !sup.is_nullable() {
            return false;
        }
        let sub = sub.make_not_null();
        let sup = sup.make_not_null();
        if sub == sup {
            return true;
        }
        if sup.class_id() == Some(&*ANY) || sub.class_id() == Some(&*NOTHING) {
            return true;
        }

        match (&sub, &sup) {
            (Type::IntegerLiteral { value, .. }, Type::Class { id, .. }) => {
                match IntegerKind::from_class_id(id) {
                    // unsigned classes only accept literals through implicit coercion
                    Some(kind) => !kind.is_unsigned() && kind.contains(*value),
                    None => self.is_subtype_of(&IntegerKind::default_for_literal(*value).to_type(), &sup),
                }
            }
            (Type::Class { .. }, Type::Class { .. }) => self.is_class_subtype(&sub, &sup),
            _ => false,
        }
    }

    fn is_class_subtype(&self, sub: &Type, sup: &Type) -> bool {
        let Some(target) = sup.class_id() else {
            return false;
        };
        let Some(found) = self.supertype_with_constructor(sub, target) else {
            return false;
        };
        let found_arguments = found.arguments();
        let expected_arguments = sup.arguments();
        if found_arguments.len() != expected_arguments.len() {
            return false;
        }
        let variances: SmallVec<[Variance; 4]> = match self.lookup.class_symbol(target) {
            Some(class) => class
                .type_parameters
                .iter()
                .map(|parameter| parameter.variance)
                .collect(),
            None => SmallVec::new(),
        };
        found_arguments
            .iter()
            .zip(expected_arguments)
            .enumerate()
            .all(|(index, (actual, expected))| {
                match variances.get(index).copied().unwrap_or_default() {
                    Variance::Out => self.is_subtype_of(actual, expected),
                    Variance::In => self.is_subtype_of(expected, actual),
                    Variance::Invariant => self.is_equal_type(actual, expected),
                }
            })
    }

    /// The supertype of `ty` (reflexive) whose class is `target`, with type
    /// arguments substituted along the path.
    pub fn supertype_with_constructor(&self, ty: &Type, target: &ClassId) -> Option<Type> {
        let mut worklist: VecDeque<Type> = VecDeque::new();
        let mut visited: FxHashSet<ClassId> = FxHashSet::default();
        worklist.push_back(ty.make_not_null());

        let mut steps = 0usize;
        while let Some(current) = worklist.pop_front() {
            steps += 1;
            if steps > MAX_SUBTYPE_SUPERTYPE_STEPS {
                trace!(%ty, %target, "supertype walk limit reached");
                return None;
            }
            let Some(id) = current.class_id() else {
                continue;
            };
            if id == target {
                return Some(current);
            }
            if !visited.insert(id.clone()) {
                continue;
            }
            let Some(class) = self.lookup.class_symbol(id) else {
                continue;
            };
            let substitutor = Substitutor::from_parameters(
                class.type_parameters.iter().map(|parameter| &parameter.name),
                current.arguments(),
            );
            for supertype in &class.supertypes {
                worklist.push_back(substitutor.substitute_or_self(supertype));
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../tests/subtyping_tests.rs"]
mod tests;
