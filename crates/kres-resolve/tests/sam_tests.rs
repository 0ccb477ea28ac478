use super::*;
use crate::test_support::{
    TestProject, comparator_id, comparator_of, foreign_comparator_id, function2, int, invokable_class,
    string,
};
use kres_common::ClassId;
use kres_types::ClassDecl;
use kres_types::standard::FunctionKind;

fn resolver(project: TestProject) -> SessionSamResolver {
    SessionSamResolver::new(project.build())
}

#[test]
fn test_fun_interface_is_adaptable_from_its_member_signature() {
    let resolver = resolver(TestProject::new());
    let info = resolver
        .sam_info_for_possible_sam_type(&comparator_of(comparator_id(), int()))
        .expect("Comparator is a functional interface");
    assert_eq!(info.functional_type, function2(int(), int(), int()));
    assert_eq!(info.sam_member.name().as_str(), "compare");
    assert_eq!(info.origin, DeclarationOrigin::Library);

    let nullable = resolver
        .sam_info_for_possible_sam_type(&comparator_of(comparator_id(), string()).make_nullable())
        .expect("nullable interface type");
    assert_eq!(
        nullable.functional_type,
        function2(string(), string(), int()).make_nullable()
    );
}

#[test]
fn test_foreign_interface_keeps_its_origin() {
    let resolver = resolver(TestProject::new());
    let info = resolver
        .sam_info_for_possible_sam_type(&comparator_of(foreign_comparator_id(), int()))
        .expect("foreign Comparator");
    assert!(info.origin.is_foreign());
}

#[test]
fn test_non_interfaces_are_not_adaptable() {
    let resolver = resolver(TestProject::new().library_class(invokable_class("Cmp", int())));
    assert!(resolver.sam_info_for_possible_sam_type(&int()).is_none());
    assert!(
        resolver
            .sam_info_for_possible_sam_type(&Type::simple(ClassId::new("lib", "Cmp")))
            .is_none()
    );
    assert!(
        resolver
            .sam_info_for_possible_sam_type(&function2(int(), int(), int()))
            .is_none()
    );
    assert!(resolver.sam_info_for_possible_sam_type(&Type::Error).is_none());
}

#[test]
fn test_alias_is_expanded() {
    let alias = ClassId::new("lib", "IntComparator");
    let resolver = resolver(
        TestProject::new().library_class(ClassDecl::type_alias(
            alias.clone(),
            comparator_of(comparator_id(), int()),
        )),
    );
    let info = resolver
        .sam_info_for_possible_sam_type(&Type::simple(alias))
        .expect("alias of a functional interface");
    assert_eq!(info.sam_type, comparator_of(comparator_id(), int()));
}

#[test]
fn test_contributed_invoke_matches_arity() {
    let resolver = resolver(TestProject::new().library_class(invokable_class("Cmp", string())));
    let cmp = Type::simple(ClassId::new("lib", "Cmp"));

    let invoke = resolver
        .find_contributed_invoke(&cmp, &function2(int(), int(), int()))
        .expect("binary invoke");
    assert_eq!(invoke.parameter_types, [string(), string()]);
    assert_eq!(invoke.return_type, int());

    let unary = function_type(FunctionKind::Function, vec![int()], int());
    assert!(resolver.find_contributed_invoke(&cmp, &unary).is_none());
}

#[test]
fn test_function_types_contribute_their_invoke() {
    let resolver = resolver(TestProject::new());
    let invoke = resolver
        .find_contributed_invoke(
            &function2(string(), string(), int()),
            &function2(int(), int(), int()),
        )
        .expect("FunctionN declares invoke");
    assert_eq!(invoke.parameter_types, [string(), string()]);
}

#[test]
fn test_instantiations_share_the_interface_member() {
    let resolver = resolver(TestProject::new());
    let of_int = resolver
        .sam_info_for_possible_sam_type(&comparator_of(comparator_id(), int()))
        .expect("Comparator<Int>");
    let of_string = resolver
        .sam_info_for_possible_sam_type(&comparator_of(comparator_id(), string()))
        .expect("Comparator<String>");
    assert!(Arc::ptr_eq(&of_int.sam_member, &of_string.sam_member));
    assert_ne!(of_int.functional_type, of_string.functional_type);
}
