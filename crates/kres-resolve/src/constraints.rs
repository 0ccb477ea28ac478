//! Per-candidate constraint systems.
//!
//! Every candidate owns its own system, so candidates of one call site can be
//! checked in parallel. [`SimpleConstraintSystem`] is the default: type
//! variables live in an `ena` union-find table, each root carries its lower
//! and upper bounds, and ground subtype questions go to the structural
//! [`SubtypeChecker`]. A constraint that cannot hold records a contradiction;
//! it never aborts the candidate.

use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use kres_types::{ClassLookup, IntegerKind, Substitutor, SubtypeChecker, Type, TypeVariableId, Variance};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

pub trait ConstraintSystem: Send + fmt::Debug {
    fn fresh_variable(&mut self) -> TypeVariableId;

    /// Register `sub <: sup`. Returns `false`, and records a contradiction,
    /// when the constraint cannot hold.
    fn add_subtype_constraint(&mut self, sub: &Type, sup: &Type) -> bool;

    /// Whether `sub <: sup` could be added without a contradiction. Does not
    /// change the system.
    fn is_subtype_constraint_compatible(&mut self, sub: &Type, sup: &Type) -> bool;

    /// [`Self::is_subtype_constraint_compatible`] for the type of a nested
    /// call: its variables are imported as fresh variables that are dropped
    /// again with the rest of the check.
    fn is_nested_call_compatible(&mut self, sub: &Type, sup: &Type) -> bool;

    fn has_contradiction(&self) -> bool;

    /// Current best approximation of every variable that has bounds.
    fn current_substitutor(&mut self) -> Substitutor;
}

pub trait ConstraintSystemFactory: Send + Sync {
    fn new_system(&self) -> Box<dyn ConstraintSystem>;
}

// =============================================================================
// Union-find keys
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct VariableKey(u32);

#[derive(Clone, Debug, PartialEq, Eq)]
struct VariableValue;

impl UnifyKey for VariableKey {
    type Value = VariableValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        VariableKey(u)
    }

    fn tag() -> &'static str {
        "TypeVariable"
    }
}

impl UnifyValue for VariableValue {
    type Error = NoError;

    fn unify_values(_a: &Self, _b: &Self) -> Result<Self, Self::Error> {
        Ok(VariableValue)
    }
}

#[derive(Clone, Debug, Default)]
struct VariableBounds {
    lower: Vec<Type>,
    upper: Vec<Type>,
}

impl VariableBounds {
    fn merge_from(&mut self, other: VariableBounds) {
        for ty in other.lower {
            if !self.lower.contains(&ty) {
                self.lower.push(ty);
            }
        }
        for ty in other.upper {
            if !self.upper.contains(&ty) {
                self.upper.push(ty);
            }
        }
    }
}

// =============================================================================
// SimpleConstraintSystem
// =============================================================================

pub struct SimpleConstraintSystem {
    lookup: Arc<dyn ClassLookup + Send + Sync>,
    table: InPlaceUnificationTable<VariableKey>,
    /// Indexed by variable; only roots carry bounds.
    bounds: Vec<VariableBounds>,
    contradiction: bool,
}

impl SimpleConstraintSystem {
    pub fn new(lookup: Arc<dyn ClassLookup + Send + Sync>) -> Self {
        Self {
            lookup,
            table: InPlaceUnificationTable::new(),
            bounds: Vec::new(),
            contradiction: false,
        }
    }

    /// Number of variables created so far.
    pub fn variable_count(&self) -> usize {
        self.bounds.len()
    }

    fn key(&self, id: TypeVariableId) -> Option<VariableKey> {
        ((id.0 as usize) < self.bounds.len()).then_some(VariableKey(id.0))
    }

    fn checker(&self) -> SubtypeChecker<'_> {
        SubtypeChecker::new(&*self.lookup).with_stub_types_equal_to_anything(true)
    }

    /// Compatibility of two types with every variable treated as unknown.
    fn compatible_ignoring_variables(&self, sub: &Type, sup: &Type) -> bool {
        self.checker()
            .is_subtype_of(&stub_variables(sub), &stub_variables(sup))
    }

    /// Run `check`, then restore variables, bounds and the contradiction
    /// flag to what they were before.
    fn rolled_back(&mut self, check: impl FnOnce(&mut Self) -> bool) -> bool {
        let bounds = self.bounds.clone();
        let snapshot = self.table.snapshot();
        let contradiction = self.contradiction;
        let holds = check(self);
        self.table.rollback_to(snapshot);
        self.bounds = bounds;
        self.contradiction = contradiction;
        holds
    }

    fn record_contradiction(&mut self, sub: &Type, sup: &Type) -> bool {
        trace!(%sub, %sup, "constraint contradiction");
        self.contradiction = true;
        false
    }

    fn add_lower_bound(&mut self, key: VariableKey, ty: &Type) -> bool {
        let root = self.table.find(key);
        let bounds = &self.bounds[root.0 as usize];
        if bounds.lower.contains(ty) {
            return true;
        }
        let consistent = bounds
            .upper
            .iter()
            .all(|upper| self.compatible_ignoring_variables(ty, upper));
        self.bounds[root.0 as usize].lower.push(ty.clone());
        consistent
    }

    fn add_upper_bound(&mut self, key: VariableKey, ty: &Type) -> bool {
        let root = self.table.find(key);
        let bounds = &self.bounds[root.0 as usize];
        if bounds.upper.contains(ty) {
            return true;
        }
        let consistent = bounds
            .lower
            .iter()
            .all(|lower| self.compatible_ignoring_variables(lower, ty));
        self.bounds[root.0 as usize].upper.push(ty.clone());
        consistent
    }

    fn unify_variables(&mut self, a: VariableKey, b: VariableKey) -> bool {
        let root_a = self.table.find(a);
        let root_b = self.table.find(b);
        if root_a == root_b {
            return true;
        }
        let mut merged = VariableBounds::default();
        merged.merge_from(std::mem::take(&mut self.bounds[root_a.0 as usize]));
        merged.merge_from(std::mem::take(&mut self.bounds[root_b.0 as usize]));
        let consistent = merged.lower.iter().all(|lower| {
            merged
                .upper
                .iter()
                .all(|upper| self.compatible_ignoring_variables(lower, upper))
        });
        self.table.union(root_a, root_b);
        let new_root = self.table.find(root_a);
        self.bounds[new_root.0 as usize] = merged;
        consistent
    }

    fn add_constraint(&mut self, sub: &Type, sup: &Type) -> bool {
        let sub_key = match sub {
            Type::Variable { id, .. } => self.key(*id),
            _ => None,
        };
        let sup_key = match sup {
            Type::Variable { id, .. } => self.key(*id),
            _ => None,
        };

        match (sub_key, sup_key) {
            // variable-to-variable constraints are treated as equalities
            (Some(a), Some(b)) => self.unify_variables(a, b),
            (None, Some(b)) => {
                // `T?` accepts anything its non-null bound accepts, plus null
                let lower = if sup.is_nullable() {
                    sub.make_not_null()
                } else {
                    sub.clone()
                };
                self.add_lower_bound(b, &lower)
            }
            (Some(a), None) => {
                if sub.is_nullable() && !sup.is_nullable() && !sup.contains_variables() {
                    return false;
                }
                self.add_upper_bound(a, sup)
            }
            (None, None) if sub.contains_variables() || sup.contains_variables() => {
                self.add_structural_constraint(sub, sup)
            }
            (None, None) => SubtypeChecker::new(&*self.lookup).is_subtype_of(sub, sup),
        }
    }

    /// Both sides are class types with variables among their arguments:
    /// lift `sub` to `sup`'s class and relate arguments by variance.
    fn add_structural_constraint(&mut self, sub: &Type, sup: &Type) -> bool {
        if sub.is_nullable() && !sup.is_nullable() {
            return false;
        }
        let Some(target) = sup.class_id() else {
            return self.compatible_ignoring_variables(sub, sup);
        };
        let Some(lifted) = self.checker().supertype_with_constructor(sub, target) else {
            return self.compatible_ignoring_variables(sub, sup);
        };
        let variances: Vec<Variance> = self
            .lookup
            .class_symbol(target)
            .map(|class| {
                class
                    .type_parameters
                    .iter()
                    .map(|parameter| parameter.variance)
                    .collect()
            })
            .unwrap_or_default();
        if lifted.arguments().len() != sup.arguments().len() {
            return false;
        }
        let pairs: Vec<(Type, Type)> = lifted
            .arguments()
            .iter()
            .cloned()
            .zip(sup.arguments().iter().cloned())
            .collect();
        let mut holds = true;
        for (index, (actual, expected)) in pairs.into_iter().enumerate() {
            holds &= match variances.get(index).copied().unwrap_or_default() {
                Variance::Out => self.add_constraint(&actual, &expected),
                Variance::In => self.add_constraint(&expected, &actual),
                Variance::Invariant => {
                    self.add_constraint(&actual, &expected) & self.add_constraint(&expected, &actual)
                }
            };
        }
        holds
    }

    /// Best type for a variable root: the lower bound every other lower bound
    /// fits into, else the first upper bound.
    fn approximation(&self, bounds: &VariableBounds) -> Option<Type> {
        let checker = self.checker();
        let ground_lower: Vec<Type> = bounds
            .lower
            .iter()
            .filter(|ty| !ty.contains_variables())
            .map(widen_integer_literal)
            .collect();
        let common = ground_lower.iter().find(|candidate| {
            ground_lower
                .iter()
                .all(|other| checker.is_subtype_of(other, candidate))
        });
        if let Some(common) = common.or(ground_lower.first()) {
            return Some(common.clone());
        }
        bounds
            .upper
            .iter()
            .find(|ty| !ty.contains_variables())
            .cloned()
    }
}

impl ConstraintSystem for SimpleConstraintSystem {
    fn fresh_variable(&mut self) -> TypeVariableId {
        let key = self.table.new_key(VariableValue);
        debug_assert_eq!(key.0 as usize, self.bounds.len());
        self.bounds.push(VariableBounds::default());
        TypeVariableId(key.0)
    }

    fn add_subtype_constraint(&mut self, sub: &Type, sup: &Type) -> bool {
        if self.add_constraint(sub, sup) {
            true
        } else {
            self.record_contradiction(sub, sup)
        }
    }

    fn is_subtype_constraint_compatible(&mut self, sub: &Type, sup: &Type) -> bool {
        self.rolled_back(|system| system.add_constraint(sub, sup))
    }

    fn is_nested_call_compatible(&mut self, sub: &Type, sup: &Type) -> bool {
        self.rolled_back(|system| {
            let sub = import_foreign_variables(sub, system, &mut FxHashMap::default());
            system.add_constraint(&sub, sup)
        })
    }

    fn has_contradiction(&self) -> bool {
        self.contradiction
    }

    fn current_substitutor(&mut self) -> Substitutor {
        let mut substitutor = Substitutor::empty();
        for index in 0..self.bounds.len() {
            let key = VariableKey(index as u32);
            let root = self.table.find(key);
            if let Some(ty) = self.approximation(&self.bounds[root.0 as usize]) {
                substitutor.bind_variable(TypeVariableId(key.0), ty);
            }
        }
        substitutor
    }
}

impl fmt::Debug for SimpleConstraintSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleConstraintSystem")
            .field("variables", &self.bounds.len())
            .field("contradiction", &self.contradiction)
            .finish_non_exhaustive()
    }
}

/// Builds [`SimpleConstraintSystem`]s over one class lookup.
pub struct SimpleConstraintSystemFactory {
    lookup: Arc<dyn ClassLookup + Send + Sync>,
}

impl SimpleConstraintSystemFactory {
    pub fn new(lookup: Arc<dyn ClassLookup + Send + Sync>) -> Self {
        Self { lookup }
    }
}

impl ConstraintSystemFactory for SimpleConstraintSystemFactory {
    fn new_system(&self) -> Box<dyn ConstraintSystem> {
        Box::new(SimpleConstraintSystem::new(self.lookup.clone()))
    }
}

/// The type of a nested call refers to variables of the nested call's own
/// system. Each of them becomes a fresh variable of `system`.
pub(crate) fn import_foreign_variables(
    ty: &Type,
    system: &mut dyn ConstraintSystem,
    imported: &mut FxHashMap<TypeVariableId, TypeVariableId>,
) -> Type {
    match ty {
        Type::Variable { id, nullable } => {
            let local = *imported.entry(*id).or_insert_with(|| system.fresh_variable());
            Type::variable(local).with_nullability(*nullable)
        }
        Type::Class {
            id,
            arguments,
            nullable,
        } if ty.contains_variables() => Type::Class {
            id: id.clone(),
            arguments: arguments
                .iter()
                .map(|argument| import_foreign_variables(argument, system, imported))
                .collect(),
            nullable: *nullable,
        },
        _ => ty.clone(),
    }
}

/// Replace every type variable by a stub of the same id.
pub(crate) fn stub_variables(ty: &Type) -> Type {
    match ty {
        Type::Variable { id, nullable } => Type::Stub {
            id: *id,
            nullable: *nullable,
        },
        Type::Class {
            id,
            arguments,
            nullable,
        } if ty.contains_variables() => Type::Class {
            id: id.clone(),
            arguments: arguments.iter().map(stub_variables).collect(),
            nullable: *nullable,
        },
        _ => ty.clone(),
    }
}

fn widen_integer_literal(ty: &Type) -> Type {
    match ty {
        Type::IntegerLiteral { value, nullable } => IntegerKind::default_for_literal(*value)
            .to_type()
            .with_nullability(*nullable),
        _ => ty.clone(),
    }
}

#[cfg(test)]
#[path = "../tests/constraints_tests.rs"]
mod tests;
