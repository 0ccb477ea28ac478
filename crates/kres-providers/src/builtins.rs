//! Builtin declarations installed in the shared-library session.

use crate::source::DeclarationTable;
use kres_common::CallableId;
use kres_types::standard::{ANY, COMPARABLE, FUNCTION, NOTHING, NUMBER, STRING, UNIT};
use kres_types::{
    CallableDecl, ClassDecl, ClassKind, DeclarationOrigin, IntegerKind, Modality, Type,
    TypeParameterDecl, ValueParameter, Variance,
};

/// `Any`, `Nothing`, `Unit`, `Number`, `String`, `Comparable<in T>`,
/// `Function<out R>` and the signed and unsigned integer classes.
pub fn builtins_table() -> DeclarationTable {
    let mut table = DeclarationTable::new("builtins");
    let any = Type::simple(ANY.clone());

    table.add_class(builtin(ClassDecl::new(ANY.clone(), ClassKind::Class)));
    table.add_class(builtin(ClassDecl::new(NOTHING.clone(), ClassKind::Class)));
    table.add_class(builtin(
        ClassDecl::new(UNIT.clone(), ClassKind::Object).with_supertype(any.clone()),
    ));
    table.add_class(builtin(
        ClassDecl::new(NUMBER.clone(), ClassKind::Class).with_supertype(any.clone()),
    ));
    table.add_class(builtin(
        ClassDecl::new(STRING.clone(), ClassKind::Class)
            .with_supertype(any.clone())
            .with_supertype(Type::class(COMPARABLE.clone(), vec![Type::simple(STRING.clone())])),
    ));
    table.add_class(builtin(
        ClassDecl::new(COMPARABLE.clone(), ClassKind::Interface)
            .with_type_parameters(vec![TypeParameterDecl::new("T", Variance::In)])
            .with_supertype(any.clone())
            .with_member(
                CallableDecl::function(
                    CallableId::top_level("", "compareTo"),
                    vec![ValueParameter::new("other", Type::type_parameter("T"))],
                    IntegerKind::Int.to_type(),
                )
                .with_modality(Modality::Abstract),
            ),
    ));
    table.add_class(builtin(
        ClassDecl::new(FUNCTION.clone(), ClassKind::Interface)
            .with_type_parameters(vec![TypeParameterDecl::new("R", Variance::Out)])
            .with_supertype(any.clone()),
    ));

    for kind in IntegerKind::ALL {
        // unsigned classes are not numbers
        let base = if kind.is_unsigned() {
            any.clone()
        } else {
            Type::simple(NUMBER.clone())
        };
        table.add_class(builtin(
            ClassDecl::new(kind.class_id(), ClassKind::Class)
                .with_supertype(base)
                .with_supertype(Type::class(COMPARABLE.clone(), vec![kind.to_type()])),
        ));
    }

    table
}

fn builtin(class: ClassDecl) -> ClassDecl {
    class.with_origin(DeclarationOrigin::BuiltIns)
}

#[cfg(test)]
#[path = "../tests/builtins_tests.rs"]
mod tests;
