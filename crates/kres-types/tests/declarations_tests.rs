use super::*;
use crate::standard::{IntegerKind, unit_type};
use kres_common::Name;

fn comparator_class() -> ClassDecl {
    ClassDecl::new(ClassId::new("java.util", "Comparator"), ClassKind::FunInterface)
        .with_type_parameters(vec![TypeParameterDecl::new("T", Variance::In)])
        .with_member(
            CallableDecl::function(
                CallableId::top_level("", "compare"),
                vec![
                    ValueParameter::new("a", Type::type_parameter("T")),
                    ValueParameter::new("b", Type::type_parameter("T")),
                ],
                IntegerKind::Int.to_type(),
            )
            .with_modality(Modality::Abstract),
        )
}

#[test]
fn test_with_member_stamps_dispatch_receiver() {
    let class = comparator_class();
    let member = &class.members[0];
    assert_eq!(member.dispatch_receiver.as_ref(), Some(&class.id));
    assert_eq!(member.id.class_id(), Some(class.id.clone()));
    assert_eq!(member.name(), &Name::identifier("compare"));
}

#[test]
fn test_with_origin_rewrites_members() {
    let class = comparator_class().with_origin(DeclarationOrigin::Foreign);
    assert!(class.origin.is_foreign());
    assert!(class.members.iter().all(|member| member.origin.is_foreign()));
}

#[test]
fn test_single_abstract_member() {
    let class = comparator_class();
    let sam = class.single_abstract_member().expect("fun interface has one abstract member");
    assert_eq!(sam.name().as_str(), "compare");

    let plain = ClassDecl::new(ClassId::new("p", "Plain"), ClassKind::Interface).with_member(
        CallableDecl::function(CallableId::top_level("", "run"), vec![], unit_type())
            .with_modality(Modality::Abstract),
    );
    assert!(plain.single_abstract_member().is_none());

    let two = ClassDecl::new(ClassId::new("p", "Two"), ClassKind::FunInterface)
        .with_member(
            CallableDecl::function(CallableId::top_level("", "a"), vec![], unit_type())
                .with_modality(Modality::Abstract),
        )
        .with_member(
            CallableDecl::function(CallableId::top_level("", "b"), vec![], unit_type())
                .with_modality(Modality::Abstract),
        );
    assert!(two.single_abstract_member().is_none());
}

#[test]
fn test_resolve_phase_only_moves_forward() {
    let class = comparator_class();
    assert_eq!(class.resolve_phase(), ResolvePhase::Raw);
    class.mark_resolved_to(ResolvePhase::Status);
    assert_eq!(class.resolve_phase(), ResolvePhase::Status);
    class.mark_resolved_to(ResolvePhase::Types);
    assert_eq!(class.resolve_phase(), ResolvePhase::Status);
}

#[test]
fn test_same_signature_ignores_return_type() {
    let id = CallableId::top_level("p", "f");
    let a = CallableDecl::function(
        id.clone(),
        vec![ValueParameter::new("x", IntegerKind::Int.to_type())],
        unit_type(),
    );
    let b = CallableDecl::function(
        id.clone(),
        vec![ValueParameter::new("y", IntegerKind::Int.to_type())],
        IntegerKind::Long.to_type(),
    );
    let c = CallableDecl::function(
        id,
        vec![ValueParameter::new("x", IntegerKind::Long.to_type())],
        unit_type(),
    );
    assert!(a.has_same_signature(&b));
    assert!(!a.has_same_signature(&c));
}

#[test]
fn test_same_symbol_is_identity() {
    let a = CallableDecl::function(CallableId::top_level("p", "f"), vec![], unit_type()).into_symbol();
    let b = CallableDecl::function(CallableId::top_level("p", "f"), vec![], unit_type()).into_symbol();
    assert!(same_symbol(&a, &a.clone()));
    assert!(!same_symbol(&a, &b));
}
