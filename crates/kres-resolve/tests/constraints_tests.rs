use super::*;
use crate::test_support::{TestProject, int, string};
use kres_types::standard::{COMPARABLE, NUMBER};

fn system() -> SimpleConstraintSystem {
    SimpleConstraintSystem::new(TestProject::new().build())
}

fn var(id: TypeVariableId) -> Type {
    Type::variable(id)
}

#[test]
fn test_bounds_accumulate_until_contradiction() {
    let mut system = system();
    let t = system.fresh_variable();
    assert!(system.add_subtype_constraint(&int(), &var(t)));
    assert!(system.add_subtype_constraint(&var(t), &Type::simple(NUMBER.clone())));
    assert!(!system.has_contradiction());

    assert!(!system.add_subtype_constraint(&var(t), &string()));
    assert!(system.has_contradiction());
}

#[test]
fn test_compatibility_query_leaves_system_unchanged() {
    let mut system = system();
    let t = system.fresh_variable();
    system.add_subtype_constraint(&var(t), &int());

    assert!(!system.is_subtype_constraint_compatible(&string(), &var(t)));
    assert!(system.is_subtype_constraint_compatible(&Type::integer_literal(7), &var(t)));
    assert!(!system.has_contradiction());
    assert_eq!(system.current_substitutor().variable(t), Some(&int()));
}

#[test]
fn test_variables_related_to_each_other_share_bounds() {
    let mut system = system();
    let a = system.fresh_variable();
    let b = system.fresh_variable();
    assert!(system.add_subtype_constraint(&var(a), &var(b)));
    assert!(system.add_subtype_constraint(&int(), &var(a)));
    assert!(!system.add_subtype_constraint(&var(b), &string()));
    assert_eq!(system.variable_count(), 2);
}

#[test]
fn test_structural_constraint_binds_arguments_by_variance() {
    let mut system = system();
    let t = system.fresh_variable();
    let comparable = Type::class(COMPARABLE.clone(), vec![var(t)]);
    assert!(system.add_subtype_constraint(&int(), &comparable));
    // Comparable is contravariant: Comparable<Int> <: Comparable<T> needs T <: Int
    assert_eq!(system.current_substitutor().variable(t), Some(&int()));
    assert!(!system.add_subtype_constraint(&string(), &var(t)));
}

#[test]
fn test_integer_literal_lower_bound_is_widened() {
    let mut system = system();
    let t = system.fresh_variable();
    system.add_subtype_constraint(&Type::integer_literal(1), &var(t));
    assert_eq!(system.current_substitutor().variable(t), Some(&int()));
}

#[test]
fn test_nullable_variable_is_not_a_subtype_of_non_null_type() {
    let mut system = system();
    let t = system.fresh_variable();
    assert!(!system.add_subtype_constraint(&var(t).make_nullable(), &int()));
    // `T?` takes the non-null part of a nullable lower bound
    let u = system.fresh_variable();
    assert!(system.add_subtype_constraint(&int().make_nullable(), &var(u).make_nullable()));
    assert_eq!(system.current_substitutor().variable(u), Some(&int()));
}

#[test]
fn test_factory_builds_independent_systems() {
    let factory = SimpleConstraintSystemFactory::new(TestProject::new().build());
    let mut first = factory.new_system();
    let second = factory.new_system();
    let t = first.fresh_variable();
    first.add_subtype_constraint(&string(), &var(t));
    first.add_subtype_constraint(&var(t), &int());
    assert!(first.has_contradiction());
    assert!(!second.has_contradiction());
}

#[test]
fn test_unrelated_upper_bounds_alone_are_consistent() {
    // `Nothing` satisfies both
    let mut system = system();
    let t = system.fresh_variable();
    assert!(system.add_subtype_constraint(&var(t), &int()));
    assert!(system.add_subtype_constraint(&var(t), &string()));
    assert!(!system.has_contradiction());
}

#[test]
fn test_nested_call_check_imports_and_drops_its_variables() {
    let mut system = system();
    let t = system.fresh_variable();
    system.add_subtype_constraint(&int(), &var(t));

    // same id as `t`, but owned by the nested call's system
    let nested = var(TypeVariableId(0));
    assert!(!system.is_subtype_constraint_compatible(&nested, &string()));
    assert!(system.is_nested_call_compatible(&nested, &string()));

    assert_eq!(system.variable_count(), 1);
    assert!(!system.has_contradiction());
    assert_eq!(system.current_substitutor().variable(t), Some(&int()));
}
