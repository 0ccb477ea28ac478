use super::*;
use crate::declarations::{ClassDecl, TypeParameterDecl};
use crate::standard::{COMPARABLE, FunctionKind, NUMBER, any_type, function_type, nothing_type};
use crate::types::TypeVariableId;
use rustc_hash::FxHashMap;

#[derive(Default)]
struct MapLookup {
    classes: FxHashMap<ClassId, ClassSymbol>,
}

impl MapLookup {
    fn add(&mut self, class: ClassDecl) {
        self.classes.insert(class.id.clone(), class.into_symbol());
    }
}

impl ClassLookup for MapLookup {
    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        self.classes.get(id).cloned()
    }
}

fn int() -> Type {
    IntegerKind::Int.to_type()
}

fn lookup() -> MapLookup {
    let mut lookup = MapLookup::default();
    lookup.add(
        ClassDecl::new(COMPARABLE.clone(), ClassKind::Interface)
            .with_type_parameters(vec![TypeParameterDecl::new("T", Variance::In)]),
    );
    lookup.add(ClassDecl::new(NUMBER.clone(), ClassKind::Class));
    lookup.add(
        ClassDecl::new(IntegerKind::Int.class_id(), ClassKind::Class)
            .with_supertype(Type::simple(NUMBER.clone()))
            .with_supertype(Type::class(COMPARABLE.clone(), vec![int()])),
    );
    lookup.add(
        ClassDecl::new(ClassId::new("p", "Box"), ClassKind::Class)
            .with_type_parameters(vec![TypeParameterDecl::new("T", Variance::Invariant)]),
    );
    lookup.add(
        ClassDecl::new(ClassId::new("p", "IntBox"), ClassKind::Class)
            .with_supertype(Type::class(ClassId::new("p", "Box"), vec![int()])),
    );
    lookup.add(
        ClassDecl::new(FunctionKind::Function.class_id(1), ClassKind::Interface).with_type_parameters(
            vec![
                TypeParameterDecl::new("P1", Variance::In),
                TypeParameterDecl::new("R", Variance::Out),
            ],
        ),
    );
    lookup.add(ClassDecl::type_alias(
        ClassId::new("p", "Count"),
        IntegerKind::UInt.to_type(),
    ));
    lookup
}

#[test]
fn test_reflexive_and_top_bottom() {
    let lookup = lookup();
    let checker = SubtypeChecker::new(&lookup);
    assert!(checker.is_subtype_of(&int(), &int()));
    assert!(checker.is_subtype_of(&int(), &any_type()));
    assert!(checker.is_subtype_of(&nothing_type(), &int()));
    assert!(!checker.is_subtype_of(&any_type(), &int()));
}

#[test]
fn test_nullability() {
    let lookup = lookup();
    let checker = SubtypeChecker::new(&lookup);
    assert!(checker.is_subtype_of(&int(), &int().make_nullable()));
    assert!(!checker.is_subtype_of(&int().make_nullable(), &int()));
    assert!(checker.is_subtype_of(&int().make_nullable(), &any_type().make_nullable()));
}

#[test]
fn test_supertype_substitution() {
    let lookup = lookup();
    let checker = SubtypeChecker::new(&lookup);
    let comparable_int = Type::class(COMPARABLE.clone(), vec![int()]);
    assert!(checker.is_subtype_of(&int(), &comparable_int));
    assert!(checker.is_subtype_of(&int(), &Type::simple(NUMBER.clone())));

    let int_box = Type::simple(ClassId::new("p", "IntBox"));
    let box_of_int = Type::class(ClassId::new("p", "Box"), vec![int()]);
    let box_of_any = Type::class(ClassId::new("p", "Box"), vec![any_type()]);
    assert!(checker.is_subtype_of(&int_box, &box_of_int));
    // invariant parameter
    assert!(!checker.is_subtype_of(&int_box, &box_of_any));
}

#[test]
fn test_function_type_variance() {
    let lookup = lookup();
    let checker = SubtypeChecker::new(&lookup);
    let any_to_int = function_type(FunctionKind::Function, vec![any_type()], int());
    let int_to_any = function_type(FunctionKind::Function, vec![int()], any_type());
    assert!(checker.is_subtype_of(&any_to_int, &int_to_any));
    assert!(!checker.is_subtype_of(&int_to_any, &any_to_int));
}

#[test]
fn test_integer_literal_ranges() {
    let lookup = lookup();
    let checker = SubtypeChecker::new(&lookup);
    assert!(checker.is_subtype_of(&Type::integer_literal(1), &IntegerKind::Byte.to_type()));
    assert!(!checker.is_subtype_of(&Type::integer_literal(300), &IntegerKind::Byte.to_type()));
    assert!(!checker.is_subtype_of(&Type::integer_literal(1), &IntegerKind::UInt.to_type()));
    assert!(!checker.is_subtype_of(&Type::integer_literal(-1), &IntegerKind::UInt.to_type()));
    // through the default Int type
    assert!(checker.is_subtype_of(
        &Type::integer_literal(1),
        &Type::class(COMPARABLE.clone(), vec![int()])
    ));
}

#[test]
fn test_stub_types() {
    let lookup = lookup();
    let stub = Type::Stub {
        id: TypeVariableId(0),
        nullable: false,
    };
    assert!(!SubtypeChecker::new(&lookup).is_subtype_of(&stub, &int()));
    assert!(
        SubtypeChecker::new(&lookup)
            .with_stub_types_equal_to_anything(true)
            .is_subtype_of(&stub, &int())
    );
}

#[test]
fn test_error_types() {
    let lookup = lookup();
    assert!(!SubtypeChecker::new(&lookup).is_subtype_of(&Type::Error, &int()));
    assert!(
        SubtypeChecker::new(&lookup)
            .with_error_types_equal_to_anything(true)
            .is_subtype_of(&Type::Error, &int())
    );
}

#[test]
fn test_alias_expansion_keeps_nullability() {
    let lookup = lookup();
    let alias = Type::simple(ClassId::new("p", "Count")).make_nullable();
    let expanded = fully_expanded_type(&alias, &lookup);
    assert_eq!(expanded, IntegerKind::UInt.to_type().make_nullable());
}

#[test]
fn test_function_kind_parse() {
    assert_eq!(
        FunctionKind::parse(&FunctionKind::SuspendFunction.class_id(3)),
        Some((FunctionKind::SuspendFunction, 3))
    );
    assert_eq!(FunctionKind::parse(&ClassId::new("kotlin", "Function")), None);
    assert_eq!(FunctionKind::parse(&ClassId::new("kotlin", "FunctionX")), None);
    assert_eq!(FunctionKind::parse(&ClassId::new("other", "Function1")), None);
}
