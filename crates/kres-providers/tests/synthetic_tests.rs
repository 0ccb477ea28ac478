use super::*;
use kres_types::Variance;
use std::sync::Arc;
use kres_types::standard::function_type;

#[test]
fn test_function_interface_shape() {
    let synthetic = SyntheticFunctionInterfaces::new();
    let class = synthetic
        .class_symbol(&FunctionKind::Function.class_id(2))
        .expect("Function2 is synthesized");

    assert_eq!(class.type_parameters.len(), 3);
    assert_eq!(class.type_parameters[0].variance, Variance::In);
    assert_eq!(class.type_parameters[2].variance, Variance::Out);
    assert_eq!(class.origin, DeclarationOrigin::Synthetic);

    let invoke = &class.members[0];
    assert_eq!(invoke.name().as_str(), INVOKE);
    assert_eq!(invoke.value_parameters.len(), 2);
    assert!(invoke.is_abstract());
}

#[test]
fn test_materialized_once() {
    let synthetic = SyntheticFunctionInterfaces::new();
    let id = FunctionKind::SuspendFunction.class_id(1);
    let a = synthetic.class_symbol(&id).expect("synthesized");
    let b = synthetic.class_symbol(&id).expect("synthesized");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(synthetic.materialized_count(), 1);
}

#[test]
fn test_reflective_kind_extends_plain_kind() {
    let synthetic = SyntheticFunctionInterfaces::new();
    let class = synthetic
        .class_symbol(&FunctionKind::KFunction.class_id(1))
        .expect("KFunction1");
    let expected = function_type(
        FunctionKind::Function,
        vec![Type::type_parameter("P1")],
        Type::type_parameter("R"),
    );
    assert_eq!(class.supertypes, vec![expected]);
}

#[test]
fn test_unrelated_ids_are_misses() {
    let synthetic = SyntheticFunctionInterfaces::new();
    assert!(synthetic.class_symbol(&ClassId::new("kotlin", "Int")).is_none());
    assert!(
        synthetic
            .class_symbol(&FunctionKind::Function.class_id(MAX_FUNCTION_ARITY + 1))
            .is_none()
    );
    assert_eq!(synthetic.materialized_count(), 0);
}

#[test]
fn test_invoke_callables() {
    let synthetic = SyntheticFunctionInterfaces::new();
    let owner = FunctionKind::Function.class_id(0);
    let invoke = synthetic.callables(&CallableId::member(
        &owner,
        &kres_common::Name::identifier(INVOKE),
    ));
    assert_eq!(invoke.len(), 1);
    assert!(invoke[0].value_parameters.is_empty());
    let other = synthetic.callables(&CallableId::member(
        &owner,
        &kres_common::Name::identifier("apply"),
    ));
    assert!(other.is_empty());
}
