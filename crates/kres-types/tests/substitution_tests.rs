use super::*;
use kres_common::ClassId;

fn int() -> Type {
    Type::simple(ClassId::new("kotlin", "Int"))
}

#[test]
fn test_substitute_parameter_keeps_occurrence_nullability() {
    let mut substitutor = Substitutor::empty();
    substitutor.bind_parameter(Name::identifier("T"), int());

    let nullable_t = Type::type_parameter("T").make_nullable();
    assert_eq!(substitutor.substitute_or_self(&nullable_t), int().make_nullable());
    assert_eq!(substitutor.substitute_or_self(&Type::type_parameter("T")), int());
}

#[test]
fn test_substitute_inside_arguments() {
    let substitutor = Substitutor::from_parameters([&Name::identifier("T")], &[int()]);
    let list_of_t = Type::class(ClassId::new("p", "List"), vec![Type::type_parameter("T")]);
    assert_eq!(
        substitutor.substitute_or_self(&list_of_t),
        Type::class(ClassId::new("p", "List"), vec![int()])
    );
    // untouched types are reported as unchanged
    assert_eq!(substitutor.substitute(&Type::simple(ClassId::new("p", "X"))), None);
}

#[test]
fn test_substitute_variable() {
    let mut substitutor = Substitutor::empty();
    substitutor.bind_variable(TypeVariableId(3), int());
    assert_eq!(
        substitutor.substitute_or_self(&Type::variable(TypeVariableId(3))),
        int()
    );
    assert_eq!(
        substitutor.substitute_or_self(&Type::variable(TypeVariableId(4))),
        Type::variable(TypeVariableId(4))
    );
}

#[test]
fn test_compose_applies_inner_then_outer() {
    // inner: T -> List<U>, outer: U -> Int
    let inner = Substitutor::from_parameters(
        [&Name::identifier("T")],
        &[Type::class(ClassId::new("p", "List"), vec![Type::type_parameter("U")])],
    );
    let outer = Substitutor::from_parameters([&Name::identifier("U")], &[int()]);
    let composed = outer.compose_with(&inner);
    assert_eq!(
        composed.substitute_or_self(&Type::type_parameter("T")),
        Type::class(ClassId::new("p", "List"), vec![int()])
    );

    let from_empty = outer.compose_with(&Substitutor::empty());
    assert_eq!(from_empty, outer);
}
