//! Materialised member scope of one class.

use indexmap::IndexMap;
use kres_common::{ClassId, Name};
use kres_types::{CallableSymbol, ClassDecl, ResolvePhase, Substitutor, Type};
use smallvec::SmallVec;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

/// A function directly overridden by a scope entry, with the scope of the
/// supertype it was inherited through.
#[derive(Clone)]
pub struct OverriddenFunction {
    pub symbol: CallableSymbol,
    pub base_scope: Arc<MemberScope>,
}

impl fmt::Debug for OverriddenFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverriddenFunction")
            .field("symbol", &self.symbol.id)
            .field("base_scope", &self.base_scope.class_id)
            .finish()
    }
}

/// One function visible in a class scope.
#[derive(Clone, Debug)]
pub struct ScopeFunction {
    pub symbol: CallableSymbol,
    /// Maps the type parameters of the declaring class to types in terms of
    /// the scope's class. Empty for the class's own members.
    pub substitutor: Substitutor,
    overridden: SmallVec<[OverriddenFunction; 1]>,
}

impl ScopeFunction {
    /// Inherited entries list their own symbol among the overridden ones.
    pub fn is_inherited(&self) -> bool {
        self.overridden
            .iter()
            .any(|overridden| Arc::ptr_eq(&overridden.symbol, &self.symbol))
    }

    pub fn parameter_types(&self) -> Vec<Type> {
        self.symbol
            .value_parameters
            .iter()
            .map(|parameter| self.substitutor.substitute_or_self(&parameter.ty))
            .collect()
    }

    pub fn return_type(&self) -> Type {
        self.substitutor.substitute_or_self(&self.symbol.return_type)
    }

    fn receiver_type(&self) -> Option<Type> {
        self.symbol
            .receiver_type
            .as_ref()
            .map(|receiver| self.substitutor.substitute_or_self(receiver))
    }

    /// Same name, receiver and parameter types after substitution.
    fn matches_signature_of(&self, other: &ScopeFunction) -> bool {
        self.symbol.name() == other.symbol.name()
            && self.symbol.value_parameters.len() == other.symbol.value_parameters.len()
            && self.receiver_type() == other.receiver_type()
            && self.parameter_types() == other.parameter_types()
    }
}

/// Functions of a class: its own members plus inherited ones not overridden,
/// grouped by name in declaration order.
#[derive(Debug)]
pub struct MemberScope {
    class_id: ClassId,
    type_parameters: Vec<Name>,
    phase: ResolvePhase,
    functions: IndexMap<Name, Vec<ScopeFunction>>,
}

impl MemberScope {
    /// Merge `class`'s own members with the scopes of its supertypes.
    ///
    /// `supertypes` pairs each (substituted-in-place) supertype with its
    /// already materialised scope; supertypes without a scope are skipped.
    pub(crate) fn build(
        class: &ClassDecl,
        phase: ResolvePhase,
        supertypes: &[(Type, Arc<MemberScope>)],
    ) -> Self {
        let mut inherited: Vec<(ScopeFunction, Arc<MemberScope>)> = Vec::new();
        for (supertype, scope) in supertypes {
            let substitutor = scope.substitutor_from(supertype);
            for function in scope.functions.values().flatten() {
                let lifted = ScopeFunction {
                    symbol: function.symbol.clone(),
                    substitutor: substitutor.compose_with(&function.substitutor),
                    overridden: SmallVec::new(),
                };
                inherited.push((lifted, scope.clone()));
            }
        }

        let mut functions: IndexMap<Name, Vec<ScopeFunction>> = IndexMap::new();
        let mut consumed = vec![false; inherited.len()];

        for member in &class.members {
            let mut own = ScopeFunction {
                symbol: member.clone(),
                substitutor: Substitutor::empty(),
                overridden: SmallVec::new(),
            };
            for (index, (candidate, base_scope)) in inherited.iter().enumerate() {
                if own.matches_signature_of(candidate) {
                    consumed[index] = true;
                    if own
                        .overridden
                        .iter()
                        .any(|seen| Arc::ptr_eq(&seen.symbol, &candidate.symbol))
                    {
                        continue;
                    }
                    own.overridden.push(OverriddenFunction {
                        symbol: candidate.symbol.clone(),
                        base_scope: base_scope.clone(),
                    });
                }
            }
            functions.entry(member.name().clone()).or_default().push(own);
        }

        // Inherited functions nobody overrides. Equal signatures coming from
        // several supertypes collapse into one entry.
        for index in 0..inherited.len() {
            if consumed[index] {
                continue;
            }
            consumed[index] = true;
            let (head, head_scope) = &inherited[index];
            let mut entry = ScopeFunction {
                symbol: head.symbol.clone(),
                substitutor: head.substitutor.clone(),
                overridden: SmallVec::new(),
            };
            entry.overridden.push(OverriddenFunction {
                symbol: head.symbol.clone(),
                base_scope: head_scope.clone(),
            });
            for other in index + 1..inherited.len() {
                if consumed[other] {
                    continue;
                }
                let (candidate, candidate_scope) = &inherited[other];
                if candidate.matches_signature_of(&entry) {
                    consumed[other] = true;
                    // a diamond reaches the same symbol twice
                    if entry
                        .overridden
                        .iter()
                        .any(|seen| Arc::ptr_eq(&seen.symbol, &candidate.symbol))
                    {
                        continue;
                    }
                    entry.overridden.push(OverriddenFunction {
                        symbol: candidate.symbol.clone(),
                        base_scope: candidate_scope.clone(),
                    });
                }
            }
            functions
                .entry(entry.symbol.name().clone())
                .or_default()
                .push(entry);
        }

        Self {
            class_id: class.id.clone(),
            type_parameters: class
                .type_parameters
                .iter()
                .map(|parameter| parameter.name.clone())
                .collect(),
            phase,
            functions,
        }
    }

    /// Substitutor from this scope's class parameters to the arguments of
    /// `supertype`, an application of this scope's class.
    fn substitutor_from(&self, supertype: &Type) -> Substitutor {
        Substitutor::from_parameters(&self.type_parameters, supertype.arguments())
    }

    pub fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    pub fn phase(&self) -> ResolvePhase {
        self.phase
    }

    pub fn function_names(&self) -> impl Iterator<Item = &Name> {
        self.functions.keys()
    }

    /// Visit the functions named `name` until `f` breaks.
    pub fn process_functions_by_name(
        &self,
        name: &Name,
        mut f: impl FnMut(&ScopeFunction) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        for function in self.functions.get(name).into_iter().flatten() {
            f(function)?;
        }
        ControlFlow::Continue(())
    }

    pub fn functions_named(&self, name: &Name) -> &[ScopeFunction] {
        self.functions.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn entry_for(&self, symbol: &CallableSymbol) -> Option<&ScopeFunction> {
        self.functions_named(symbol.name())
            .iter()
            .find(|function| Arc::ptr_eq(&function.symbol, symbol))
    }

    /// Visit the functions `symbol` directly overrides in this scope.
    ///
    /// For an inherited entry this includes `symbol` itself, reached through
    /// the supertype it came from.
    pub fn process_overridden_functions(
        &self,
        symbol: &CallableSymbol,
        mut f: impl FnMut(&OverriddenFunction) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        if let Some(entry) = self.entry_for(symbol) {
            for overridden in &entry.overridden {
                f(overridden)?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Own and inherited functions, in scope order.
    pub fn all_functions(&self) -> impl Iterator<Item = &ScopeFunction> {
        self.functions.values().flatten()
    }
}
