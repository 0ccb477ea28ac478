use super::*;
use crate::source::DeclarationSource;
use kres_common::ClassId;

#[test]
fn test_builtins_cover_integer_classes() {
    let table = builtins_table();
    for kind in IntegerKind::ALL {
        let class = table.class_symbol(&kind.class_id()).expect("integer class present");
        assert_eq!(class.origin, DeclarationOrigin::BuiltIns);
        let comparable = Type::class(COMPARABLE.clone(), vec![kind.to_type()]);
        assert!(class.supertypes.contains(&comparable));
    }
}

#[test]
fn test_unsigned_classes_are_not_numbers() {
    let table = builtins_table();
    let uint = table.class_symbol(&IntegerKind::UInt.class_id()).expect("UInt");
    assert!(!uint.supertypes.contains(&Type::simple(NUMBER.clone())));
    let int = table.class_symbol(&IntegerKind::Int.class_id()).expect("Int");
    assert!(int.supertypes.contains(&Type::simple(NUMBER.clone())));
}

#[test]
fn test_comparable_members_are_indexed() {
    let table = builtins_table();
    let compare_to = table.callables(&CallableId::member(
        &COMPARABLE,
        &kres_common::Name::identifier("compareTo"),
    ));
    assert_eq!(compare_to.len(), 1);
    assert!(compare_to[0].is_abstract());
    assert_eq!(compare_to[0].origin, DeclarationOrigin::BuiltIns);
    assert!(table.class_symbol(&ClassId::new("kotlin", "Missing")).is_none());
}
