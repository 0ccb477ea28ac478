//! Shared fixtures: a library module with functional interfaces and a
//! source module `app` depending on it.

use crate::call_info::{CallArgument, CallInfo};
use crate::resolver::{OverloadResolver, ResolutionResult};
use crate::stages::ResolutionContext;
use kres_common::{CallableId, ClassId, LanguageFeature, LanguageVersionSettings};
use kres_providers::{DeclarationSource, DeclarationTable};
use kres_session::{ModuleData, Session, SessionFactory, SessionProvider};
use kres_types::standard::FunctionKind;
use kres_types::{
    CallableDecl, ClassDecl, ClassKind, DeclarationOrigin, IntegerKind, Modality, Type,
    TypeParameterDecl, ValueParameter, Variance,
};
use std::sync::Arc;

pub(crate) const APP: &str = "app";

pub(crate) fn int() -> Type {
    IntegerKind::Int.to_type()
}

pub(crate) fn uint() -> Type {
    IntegerKind::UInt.to_type()
}

pub(crate) fn string() -> Type {
    Type::simple(kres_types::standard::STRING.clone())
}

pub(crate) fn function2(a: Type, b: Type, r: Type) -> Type {
    kres_types::standard::function_type(FunctionKind::Function, vec![a, b], r)
}

pub(crate) fn comparator_id() -> ClassId {
    ClassId::new("lib", "Comparator")
}

pub(crate) fn foreign_comparator_id() -> ClassId {
    ClassId::new("java.util", "Comparator")
}

pub(crate) fn comparator_of(id: ClassId, argument: Type) -> Type {
    Type::class(id, vec![argument])
}

/// `fun interface <id><T> { fun compare(a: T, b: T): Int }`
pub(crate) fn comparator_class(id: ClassId, origin: DeclarationOrigin) -> ClassDecl {
    ClassDecl::new(id, ClassKind::FunInterface)
        .with_type_parameters(vec![TypeParameterDecl::new("T", Variance::In)])
        .with_member(
            CallableDecl::function(
                CallableId::top_level("", "compare"),
                vec![
                    ValueParameter::new("a", Type::type_parameter("T")),
                    ValueParameter::new("b", Type::type_parameter("T")),
                ],
                int(),
            )
            .with_modality(Modality::Abstract),
        )
        .with_origin(origin)
}

/// A class with an `invoke(a, b): Int` member.
pub(crate) fn invokable_class(name: &str, parameter: Type) -> ClassDecl {
    ClassDecl::new(ClassId::new("lib", name), ClassKind::Class).with_member(
        CallableDecl::function(
            CallableId::top_level("", "invoke"),
            vec![
                ValueParameter::new("a", parameter.clone()),
                ValueParameter::new("b", parameter),
            ],
            int(),
        ),
    )
}

/// `fun <name>(<parameters>): <return_type>` in package `app`.
pub(crate) fn app_function(name: &str, parameters: Vec<ValueParameter>, return_type: Type) -> CallableDecl {
    CallableDecl::function(CallableId::top_level(APP, name), parameters, return_type)
}

pub(crate) fn call(name: &str, arguments: Vec<CallArgument>) -> CallInfo {
    CallInfo::new(name, arguments).in_package(APP)
}

pub(crate) fn settings_with(feature: LanguageFeature) -> LanguageVersionSettings {
    LanguageVersionSettings::default().with_feature(feature, true)
}

/// Declarations of a two-module project: library `lib` and source `app`.
#[derive(Default)]
pub(crate) struct TestProject {
    settings: LanguageVersionSettings,
    library_classes: Vec<ClassDecl>,
    library_callables: Vec<CallableDecl>,
    source_classes: Vec<ClassDecl>,
    source_callables: Vec<CallableDecl>,
}

impl TestProject {
    pub(crate) fn new() -> Self {
        Self::default()
            .library_class(comparator_class(comparator_id(), DeclarationOrigin::Library))
            .library_class(comparator_class(
                foreign_comparator_id(),
                DeclarationOrigin::Foreign,
            ))
    }

    pub(crate) fn settings(mut self, settings: LanguageVersionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub(crate) fn library_class(mut self, class: ClassDecl) -> Self {
        self.library_classes.push(class);
        self
    }

    pub(crate) fn library_callable(mut self, callable: CallableDecl) -> Self {
        self.library_callables.push(callable);
        self
    }

    pub(crate) fn source_class(mut self, class: ClassDecl) -> Self {
        self.source_classes.push(class);
        self
    }

    pub(crate) fn function(mut self, callable: CallableDecl) -> Self {
        self.source_callables.push(callable);
        self
    }

    pub(crate) fn build(self) -> Arc<Session> {
        let factory = SessionFactory::new(Arc::new(SessionProvider::new()), self.settings);
        let shared = factory
            .create_shared_library_session()
            .expect("shared session");

        let mut library = DeclarationTable::new("lib.klib");
        for class in self.library_classes {
            library.add_class(class);
        }
        for callable in self.library_callables {
            library.add_callable(callable.with_origin(DeclarationOrigin::Library));
        }
        let lib = ModuleData::builder("lib").build();
        let library: Arc<dyn DeclarationSource> = Arc::new(library);
        factory
            .create_library_session(vec![lib.clone()], &shared, vec![library])
            .expect("library session");

        let mut sources = DeclarationTable::new("app.kt");
        for class in self.source_classes {
            sources.add_class(class);
        }
        for callable in self.source_callables {
            sources.add_callable(callable);
        }
        let sources: Arc<dyn DeclarationSource> = Arc::new(sources);
        let app = ModuleData::builder(APP).dependency(&lib).build();
        factory
            .create_source_session(app, vec![sources])
            .expect("app session")
    }
}

pub(crate) fn resolve(session: &Arc<Session>, call: &CallInfo) -> ResolutionResult {
    OverloadResolver::new(ResolutionContext::new(session.clone())).resolve(call)
}
