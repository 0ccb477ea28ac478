//! On-demand synthetic function interfaces.
//!
//! `FunctionN`, `SuspendFunctionN`, `KFunctionN` and `KSuspendFunctionN` are
//! not declared anywhere: the class for a given arity is built the first time
//! it is asked for and published once.

use crate::source::DeclarationSource;
use dashmap::DashMap;
use kres_common::limits::MAX_FUNCTION_ARITY;
use kres_common::{CallableId, ClassId};
use kres_types::standard::FUNCTION;
use kres_types::{
    CallableDecl, CallableSymbol, ClassDecl, ClassKind, ClassSymbol, DeclarationOrigin,
    FunctionKind, Modality, Type, TypeParameterDecl, ValueParameter, Variance,
};
use std::fmt;
use tracing::trace;

pub const INVOKE: &str = "invoke";

#[derive(Default)]
pub struct SyntheticFunctionInterfaces {
    classes: DashMap<ClassId, ClassSymbol>,
}

impl SyntheticFunctionInterfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interfaces materialised so far.
    pub fn materialized_count(&self) -> usize {
        self.classes.len()
    }

    fn materialize(kind: FunctionKind, arity: usize) -> ClassDecl {
        let mut type_parameters: Vec<TypeParameterDecl> = (1..=arity)
            .map(|index| TypeParameterDecl::new(&format!("P{index}"), Variance::In))
            .collect();
        type_parameters.push(TypeParameterDecl::new("R", Variance::Out));

        let parameter_types: Vec<Type> = (1..=arity)
            .map(|index| Type::type_parameter(&format!("P{index}")))
            .collect();
        let return_type = Type::type_parameter("R");

        let supertype = match kind {
            FunctionKind::Function | FunctionKind::SuspendFunction => {
                Type::class(FUNCTION.clone(), vec![return_type.clone()])
            }
            // reflective kinds extend their plain counterpart of the same arity
            FunctionKind::KFunction | FunctionKind::KSuspendFunction => {
                let base = if kind == FunctionKind::KFunction {
                    FunctionKind::Function
                } else {
                    FunctionKind::SuspendFunction
                };
                let mut arguments = parameter_types.clone();
                arguments.push(return_type.clone());
                Type::class(base.class_id(arity), arguments)
            }
        };

        let invoke = CallableDecl::function(
            CallableId::top_level("", INVOKE),
            parameter_types
                .into_iter()
                .enumerate()
                .map(|(index, ty)| ValueParameter::new(&format!("p{}", index + 1), ty))
                .collect(),
            return_type,
        )
        .with_modality(Modality::Abstract);

        ClassDecl::new(kind.class_id(arity), ClassKind::Interface)
            .with_type_parameters(type_parameters)
            .with_supertype(supertype)
            .with_member(invoke)
            .with_origin(DeclarationOrigin::Synthetic)
    }
}

impl fmt::Debug for SyntheticFunctionInterfaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticFunctionInterfaces")
            .field("materialized", &self.classes.len())
            .finish()
    }
}

impl DeclarationSource for SyntheticFunctionInterfaces {
    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        if let Some(existing) = self.classes.get(id) {
            return Some(existing.clone());
        }
        let (kind, arity) = FunctionKind::parse(id)?;
        if arity > MAX_FUNCTION_ARITY {
            return None;
        }
        let computed = Self::materialize(kind, arity).into_symbol();
        trace!(class = %id, arity, "materialized function interface");
        // concurrent misses may both build; the first insert wins
        Some(self.classes.entry(id.clone()).or_insert(computed).clone())
    }

    fn callables(&self, id: &CallableId) -> Vec<CallableSymbol> {
        let Some(owner) = id.class_id() else {
            return Vec::new();
        };
        if id.callable_name.as_str() != INVOKE {
            return Vec::new();
        }
        self.class_symbol(&owner)
            .map(|class| class.members_named(&id.callable_name).cloned().collect())
            .unwrap_or_default()
    }

    fn class_ids(&self) -> Vec<ClassId> {
        self.classes.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
#[path = "../tests/synthetic_tests.rs"]
mod tests;
