use super::*;
use crate::checkers::{DeclarationChecker, Diagnostic, DiagnosticKind};
use crate::extensions::{ExtensionConfiguration, GeneratedDeclarations};
use crate::factory::SessionFactory;
use crate::session_provider::SessionProvider;
use kres_common::{AnalysisFlags, CallableId, ClassId, Name};
use kres_providers::{DeclarationTable, MarkingPhaseResolver};
use kres_types::standard::{ANY, any_type, unit_type};
use kres_types::{CallableDecl, ClassDecl, ClassKind, ExpectActual, FunctionKind, ValueParameter};

fn factory() -> SessionFactory {
    SessionFactory::new(
        Arc::new(SessionProvider::new()),
        LanguageVersionSettings::default(),
    )
}

fn table(label: &str, classes: Vec<ClassDecl>) -> Arc<dyn DeclarationSource> {
    let mut table = DeclarationTable::new(label);
    for class in classes {
        table.add_class(class);
    }
    Arc::new(table)
}

fn class(package: &str, name: &str) -> ClassDecl {
    ClassDecl::new(ClassId::new(package, name), ClassKind::Class)
}

/// Shared session plus one library session over `lib`.
fn library_layer(factory: &SessionFactory, lib: &Arc<ModuleData>) -> (Arc<Session>, Arc<Session>) {
    let shared = factory
        .create_shared_library_session()
        .expect("shared session");
    let library = factory
        .create_library_session(
            vec![lib.clone()],
            &shared,
            vec![table("lib.klib", vec![class("lib", "LibClass")])],
        )
        .expect("library session");
    (shared, library)
}

#[test]
fn test_steps_out_of_order_are_rejected() {
    let mut builder = SessionBuilder::new(SessionKind::Library, Arc::new(MarkingPhaseResolver));
    let error = builder
        .register_components(LanguageVersionSettings::default())
        .expect_err("components before bind");
    assert!(matches!(
        error,
        SessionError::OutOfOrder {
            attempted: BuildStep::ComponentsRegistered,
            current: BuildStep::Created,
        }
    ));

    builder.bind(Vec::new()).expect("bind");
    let error = builder.bind(Vec::new()).expect_err("bind twice");
    assert!(matches!(error, SessionError::OutOfOrder { .. }));
    assert_eq!(builder.step(), BuildStep::Bound);
}

#[test]
fn test_bind_requires_published_dependencies() {
    let lib = ModuleData::builder("lib").build();
    let app = ModuleData::builder("app").dependency(&lib).build();

    let mut builder = SessionBuilder::new(SessionKind::Source, Arc::new(MarkingPhaseResolver));
    let error = builder.bind(vec![app]).expect_err("lib has no session");
    match error {
        SessionError::DependencyNotPublished { module, dependency } => {
            assert_eq!(module.as_str(), "<app>");
            assert_eq!(dependency.as_str(), "<lib>");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_source_session_binds_exactly_one_module() {
    let a = ModuleData::builder("a").build();
    let b = ModuleData::builder("b").build();
    let mut builder = SessionBuilder::new(SessionKind::Source, Arc::new(MarkingPhaseResolver));
    let error = builder.bind(vec![a, b]).expect_err("two modules");
    assert!(matches!(error, SessionError::SourceModuleCount { count: 2 }));
}

#[test]
fn test_module_cannot_be_bound_twice() {
    let factory = factory();
    let lib = ModuleData::builder("lib").build();
    let (shared, _library) = library_layer(&factory, &lib);

    let error = factory
        .create_library_session(vec![lib], &shared, Vec::new())
        .expect_err("lib is already bound");
    assert!(matches!(error, SessionError::AlreadyBound { .. }));
}

#[test]
fn test_library_session_rejects_source_providers() {
    let factory = factory();
    let shared = factory.create_shared_library_session().expect("shared");
    let lib = ModuleData::builder("lib").build();

    let mut builder = SessionBuilder::new(SessionKind::Library, Arc::new(MarkingPhaseResolver));
    builder.bind(vec![lib.clone()]).expect("bind");
    builder
        .register_components(LanguageVersionSettings::default())
        .expect("components");
    builder
        .register_dependency_providers(Some(&shared))
        .expect("dependencies");
    builder.configure_extensions(&[]).expect("extensions");
    let error = builder
        .finalize_providers(vec![(LeafKind::Source, table("src", Vec::new()))])
        .expect_err("sources in a library session");
    assert!(matches!(error, SessionError::LibraryWithSourceProviders { .. }));
    // nothing was published
    assert!(!lib.is_bound());
}

#[test]
fn test_library_session_requires_shared_session() {
    let mut builder = SessionBuilder::new(SessionKind::Library, Arc::new(MarkingPhaseResolver));
    builder.bind(Vec::new()).expect("bind");
    builder
        .register_components(LanguageVersionSettings::default())
        .expect("components");
    let error = builder
        .register_dependency_providers(None)
        .expect_err("no shared session");
    assert!(matches!(error, SessionError::MissingSharedSession { .. }));
}

#[test]
fn test_library_session_has_no_source_providers_and_sees_builtins() {
    let factory = factory();
    let lib = ModuleData::builder("lib").build();
    let (_shared, library) = library_layer(&factory, &lib);

    let structured = library.structured_providers().expect("structured");
    assert!(structured.source_providers.is_empty());
    assert_eq!(structured.library_providers.len(), 1);
    assert!(library.class_symbol(&ClassId::new("lib", "LibClass")).is_some());
    assert!(library.class_symbol(&ANY).is_some());
    assert!(library.dependencies_symbol_provider().is_none());
    assert!(Arc::ptr_eq(&lib.session().expect("bound"), &library));
}

#[test]
fn test_source_session_without_library_dependency_fails() {
    let factory = factory();
    let _shared = factory.create_shared_library_session().expect("shared");
    let app = ModuleData::builder("app").build();

    let error = factory
        .create_source_session(app.clone(), Vec::new())
        .expect_err("no library dependency");
    assert!(matches!(error, SessionError::MissingLibraryDependency { .. }));
    assert!(!app.is_bound());
}

#[test]
fn test_dependencies_provider_excludes_own_sources() {
    let factory = factory();
    let lib = ModuleData::builder("lib").build();
    let (_shared, _library) = library_layer(&factory, &lib);
    let app = ModuleData::builder("app").dependency(&lib).build();

    let session = factory
        .create_source_session(app, vec![table("app.kt", vec![class("app", "Main")])])
        .expect("source session");
    let own = ClassId::new("app", "Main");
    let from_lib = ClassId::new("lib", "LibClass");

    assert!(session.class_symbol(&own).is_some());
    assert!(session.class_symbol(&from_lib).is_some());
    assert!(session.class_symbol(&ANY).is_some());

    let dependencies = session
        .dependencies_symbol_provider()
        .expect("source sessions have a dependencies provider");
    assert!(dependencies.class_symbol(&own).is_none());
    assert!(dependencies.class_symbol(&from_lib).is_some());

    let structured = session.structured_providers().expect("structured");
    assert_eq!(structured.source_providers.len(), 1);
}

#[test]
fn test_actual_is_found_before_expect() {
    let factory = factory();
    let lib = ModuleData::builder("lib").build();
    let (_shared, _library) = library_layer(&factory, &lib);
    let expect_class = || class("mpp", "Clock").with_expect_actual(ExpectActual::Expect);
    let actual_class = || class("mpp", "Clock").with_expect_actual(ExpectActual::Actual);

    let common = ModuleData::builder("common").dependency(&lib).build();
    factory
        .create_source_session(common.clone(), vec![table("common.kt", vec![expect_class()])])
        .expect("common");
    let platform = ModuleData::builder("platform")
        .dependency(&lib)
        .depends_on(&common)
        .build();
    factory
        .create_source_session(platform.clone(), vec![table("platform.kt", vec![actual_class()])])
        .expect("platform");

    let app = ModuleData::builder("app")
        .dependency(&lib)
        .dependency(&common)
        .dependency(&platform)
        .build();
    let session = factory
        .create_source_session(app, Vec::new())
        .expect("app");
    let clock = session
        .class_symbol(&ClassId::new("mpp", "Clock"))
        .expect("Clock is visible");
    assert_eq!(clock.expect_actual, ExpectActual::Actual);
}

#[test]
fn test_synthetic_component_is_shared_by_every_layer() {
    let factory = factory();
    let lib = ModuleData::builder("lib").build();
    let (shared, library) = library_layer(&factory, &lib);
    let app = ModuleData::builder("app").dependency(&lib).build();
    let source = factory
        .create_source_session(app, Vec::new())
        .expect("source session");

    let expected = &shared.component::<SyntheticFunctionInterfacesProvider>().0;
    for session in [&library, &source] {
        let component = session.component::<SyntheticFunctionInterfacesProvider>();
        assert!(Arc::ptr_eq(&component.0, expected));
    }
    assert!(
        source
            .class_symbol(&FunctionKind::Function.class_id(2))
            .is_some()
    );
}

#[test]
fn test_stdlib_compilation_drops_builtins() {
    let settings =
        LanguageVersionSettings::default().with_flag(AnalysisFlags::STDLIB_COMPILATION, true);
    let factory = SessionFactory::new(Arc::new(SessionProvider::new()), settings);
    let shared = factory.create_shared_library_session().expect("shared");

    assert!(shared.class_symbol(&ANY).is_none());
    assert!(
        shared
            .class_symbol(&FunctionKind::SuspendFunction.class_id(1))
            .is_some()
    );
    assert_eq!(shared.symbol_provider().children().len(), 1);
}

#[test]
fn test_sessions_are_registered_by_module_name() {
    let factory = factory();
    let lib = ModuleData::builder("lib").build();
    let (_shared, library) = library_layer(&factory, &lib);
    let app = ModuleData::builder("app").dependency(&lib).build();
    let source = factory
        .create_source_session(app, Vec::new())
        .expect("source session");

    let provider = factory.session_provider();
    assert_eq!(provider.len(), 2);
    let names: Vec<String> = provider
        .module_names()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(names, ["<app>", "<lib>"]);
    let found = provider
        .session_for(&Name::special("app"))
        .expect("app registered");
    assert!(Arc::ptr_eq(&found, &source));
    let found = provider
        .session_for(&Name::special("lib"))
        .expect("lib registered");
    assert!(Arc::ptr_eq(&found, &library));
}

#[test]
fn test_conflicting_overloads_are_reported() {
    let factory = factory();
    let lib = ModuleData::builder("lib").build();
    let (_shared, _library) = library_layer(&factory, &lib);
    let app = ModuleData::builder("app").dependency(&lib).build();

    let owner = ClassId::new("app", "Service");
    let run = || {
        CallableDecl::function(
            CallableId::member(&owner, &Name::identifier("run")),
            vec![ValueParameter::new("times", any_type())],
            unit_type(),
        )
    };
    let service = ClassDecl::new(owner.clone(), ClassKind::Class)
        .with_member(run())
        .with_member(run());
    let session = factory
        .create_source_session(app, vec![table("service.kt", vec![service])])
        .expect("source session");

    let diagnostics = session.check_own_declarations();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::ConflictingOverloads);
    assert_eq!(diagnostics[0].class, owner);
}

// =============================================================================
// Extensions
// =============================================================================

struct NoMainChecker;

impl DeclarationChecker for NoMainChecker {
    fn name(&self) -> &str {
        "no-main"
    }

    fn check_class(&self, class: &ClassDecl, _session: &Session, diagnostics: &mut Vec<Diagnostic>) {
        if class.id.short_class_name().as_str() == "Main" {
            diagnostics.push(Diagnostic {
                kind: DiagnosticKind::Extension("NO_MAIN"),
                class: class.id.clone(),
                member: None,
                message: "classes named Main are not allowed".to_string(),
            });
        }
    }
}

struct Serialization;

impl ExtensionRegistrar for Serialization {
    fn name(&self) -> &str {
        "serialization"
    }

    fn configure(&self, context: &ExtensionContext) -> ExtensionConfiguration {
        if context.kind != SessionKind::Source {
            return ExtensionConfiguration::default();
        }
        let module = context
            .modules
            .first()
            .map(|name| name.as_str().trim_matches(['<', '>']).to_string())
            .unwrap_or_default();
        ExtensionConfiguration {
            checkers: vec![Arc::new(NoMainChecker)],
            declarations: vec![GeneratedDeclarations {
                extension: Name::identifier("serialization"),
                source: table("generated", vec![class(&module, "Serializer")]),
            }],
        }
    }
}

#[test]
fn test_extension_contributes_checkers_and_declarations() {
    let factory = factory().with_extension(Arc::new(Serialization));
    let lib = ModuleData::builder("lib").build();
    let (_shared, library) = library_layer(&factory, &lib);
    let app = ModuleData::builder("app").dependency(&lib).build();
    let session = factory
        .create_source_session(app, vec![table("app.kt", vec![class("app", "Main")])])
        .expect("source session");

    assert!(library.checkers().is_empty());
    assert_eq!(session.checkers().len(), 2);
    assert!(session.class_symbol(&ClassId::new("app", "Serializer")).is_some());
    let generated = session
        .symbol_provider()
        .children()
        .iter()
        .filter(|child| {
            child
                .as_leaf()
                .is_some_and(|leaf| matches!(leaf.kind(), LeafKind::Generated(_)))
        })
        .count();
    assert_eq!(generated, 1);

    let diagnostics = session.check_class(&ClassId::new("app", "Main"));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::Extension("NO_MAIN"));
}
