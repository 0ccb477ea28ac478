//! Staged session construction.
//!
//! Each construction step is one method. The builder records the last
//! completed step and rejects any call that is not the immediate successor
//! with [`SessionError::OutOfOrder`]. Nothing becomes visible to other
//! sessions before [`SessionBuilder::publish`]: dropping a builder at any
//! point discards everything it built.

use crate::checkers::CheckerRegistry;
use crate::components::ComponentRegistry;
use crate::error::{Result, SessionError};
use crate::extensions::{ExtensionContext, ExtensionRegistrar};
use crate::module_data::ModuleData;
use crate::session::{Session, SyntheticFunctionInterfacesProvider};
use kres_common::LanguageVersionSettings;
use kres_providers::{
    DeclarationSource, LeafKind, PhaseResolver, ProviderOwner, ScopeCache, SessionId, SessionKind,
    StructuredProviders, SymbolProvider,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, debug_span, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuildStep {
    Created,
    Bound,
    ComponentsRegistered,
    DependencyProvidersRegistered,
    ExtensionsConfigured,
    ProvidersFinalized,
    Published,
}

impl BuildStep {
    const fn predecessor(self) -> Option<Self> {
        match self {
            Self::Created => None,
            Self::Bound => Some(Self::Created),
            Self::ComponentsRegistered => Some(Self::Bound),
            Self::DependencyProvidersRegistered => Some(Self::ComponentsRegistered),
            Self::ExtensionsConfigured => Some(Self::DependencyProvidersRegistered),
            Self::ProvidersFinalized => Some(Self::ExtensionsConfigured),
            Self::Published => Some(Self::ProvidersFinalized),
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Bound => "bind",
            Self::ComponentsRegistered => "register components",
            Self::DependencyProvidersRegistered => "register dependency providers",
            Self::ExtensionsConfigured => "configure extensions",
            Self::ProvidersFinalized => "finalize providers",
            Self::Published => "publish",
        })
    }
}

struct FinalProviders {
    structured: Option<StructuredProviders>,
    main: Arc<SymbolProvider>,
    dependencies: Option<Arc<SymbolProvider>>,
}

pub struct SessionBuilder {
    id: SessionId,
    kind: SessionKind,
    step: BuildStep,
    modules: Vec<Arc<ModuleData>>,
    language_settings: LanguageVersionSettings,
    components: ComponentRegistry,
    checkers: CheckerRegistry,
    /// Library and shared providers gathered from the dependencies.
    dependency_providers: Option<StructuredProviders>,
    generated_providers: Vec<Arc<SymbolProvider>>,
    finalized: Option<FinalProviders>,
    phase_resolver: Arc<dyn PhaseResolver>,
}

impl SessionBuilder {
    pub fn new(kind: SessionKind, phase_resolver: Arc<dyn PhaseResolver>) -> Self {
        let id = SessionId::fresh();
        debug!(session = %id, %kind, "session builder created");
        Self {
            id,
            kind,
            step: BuildStep::Created,
            modules: Vec::new(),
            language_settings: LanguageVersionSettings::default(),
            components: ComponentRegistry::new(),
            checkers: CheckerRegistry::new(),
            dependency_providers: None,
            generated_providers: Vec::new(),
            finalized: None,
            phase_resolver,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn step(&self) -> BuildStep {
        self.step
    }

    fn owner(&self) -> ProviderOwner {
        ProviderOwner::new(self.id, self.kind)
    }

    fn check_step(&self, attempted: BuildStep) -> Result<()> {
        if attempted.predecessor() == Some(self.step) {
            Ok(())
        } else {
            Err(SessionError::OutOfOrder {
                attempted,
                current: self.step,
            })
        }
    }

    // =========================================================================
    // Step 1: bind
    // =========================================================================

    /// Attach the modules this session is for. Every dependency outside the
    /// bound set must already have a published session.
    pub fn bind(&mut self, modules: Vec<Arc<ModuleData>>) -> Result<()> {
        self.check_step(BuildStep::Bound)?;
        let _span = debug_span!("bind", session = %self.id, modules = modules.len()).entered();

        if self.kind == SessionKind::Source && modules.len() != 1 {
            return Err(SessionError::SourceModuleCount {
                count: modules.len(),
            });
        }
        for module in &modules {
            if module.is_bound() {
                return Err(SessionError::AlreadyBound {
                    module: module.name().clone(),
                });
            }
            let edges = module
                .dependencies()
                .iter()
                .chain(module.friend_dependencies())
                .chain(module.depends_on_dependencies());
            for dependency in edges {
                if modules.iter().any(|bound| Arc::ptr_eq(bound, dependency)) {
                    continue;
                }
                if dependency.session().is_none() {
                    return Err(SessionError::DependencyNotPublished {
                        module: module.name().clone(),
                        dependency: dependency.name().clone(),
                    });
                }
            }
        }

        self.modules = modules;
        self.step = BuildStep::Bound;
        Ok(())
    }

    // =========================================================================
    // Step 2: core components
    // =========================================================================

    pub fn register_components(&mut self, language_settings: LanguageVersionSettings) -> Result<()> {
        self.check_step(BuildStep::ComponentsRegistered)?;
        let _span = debug_span!("register_components", session = %self.id).entered();

        self.language_settings = language_settings;
        self.components.register(language_settings);
        self.components.register(self.kind);
        if self.kind == SessionKind::Source {
            self.checkers = CheckerRegistry::common();
        }

        self.step = BuildStep::ComponentsRegistered;
        Ok(())
    }

    // =========================================================================
    // Step 3: dependency providers
    // =========================================================================

    /// Gather the providers of the dependencies.
    ///
    /// `shared` is the published shared-library session; library sessions
    /// require it, source sessions take the shared provider from their first
    /// library dependency instead.
    pub fn register_dependency_providers(&mut self, shared: Option<&Arc<Session>>) -> Result<()> {
        self.check_step(BuildStep::DependencyProvidersRegistered)?;
        let _span = debug_span!("register_dependency_providers", session = %self.id).entered();

        match self.kind {
            SessionKind::SharedLibrary => {}
            SessionKind::Library => {
                let Some(shared) = shared else {
                    return Err(SessionError::MissingSharedSession { kind: self.kind });
                };
                if let Some(synthetic) = shared.try_component::<SyntheticFunctionInterfacesProvider>() {
                    self.components.register(synthetic.clone());
                }
                self.dependency_providers = Some(StructuredProviders::for_library(
                    Vec::new(),
                    shared.symbol_provider().clone(),
                ));
            }
            SessionKind::Source => {
                let structured = self.collect_source_dependencies()?;
                self.dependency_providers = Some(structured);
            }
        }

        self.step = BuildStep::DependencyProvidersRegistered;
        Ok(())
    }

    fn collect_source_dependencies(&mut self) -> Result<StructuredProviders> {
        let Some(module) = self.modules.first().cloned() else {
            return Err(SessionError::SourceModuleCount { count: 0 });
        };

        // most specific first, then source modules before libraries
        let mut dependencies: Vec<(Arc<ModuleData>, Arc<Session>)> = Vec::new();
        for dependency in module.dependency_view() {
            let Some(session) = dependency.session() else {
                return Err(SessionError::DependencyNotPublished {
                    module: module.name().clone(),
                    dependency: dependency.name().clone(),
                });
            };
            dependencies.push((dependency, session));
        }
        dependencies.sort_by_key(|(_, session)| match session.kind() {
            SessionKind::Source => 0,
            SessionKind::Library => 1,
            SessionKind::SharedLibrary => 2,
        });

        let mut providers: Vec<Arc<SymbolProvider>> = Vec::new();
        let mut shared_provider = None;
        for (dependency, session) in &dependencies {
            let Some(structured) = session.structured_providers() else {
                continue;
            };
            let contributed = match session.kind() {
                SessionKind::Library => {
                    assert!(
                        structured.source_providers.is_empty(),
                        "library session {} carries source providers",
                        session.id()
                    );
                    if shared_provider.is_none() {
                        shared_provider = Some(structured.shared_provider.clone());
                        if let Some(synthetic) =
                            session.try_component::<SyntheticFunctionInterfacesProvider>()
                        {
                            self.components.register(synthetic.clone());
                        }
                    }
                    &structured.library_providers
                }
                // only the dependency's own sources, its libraries are declared separately
                SessionKind::Source => &structured.source_providers,
                SessionKind::SharedLibrary => continue,
            };
            for provider in contributed {
                // one library session covers several modules
                if !providers.iter().any(|seen| Arc::ptr_eq(seen, provider)) {
                    providers.push(provider.clone());
                }
            }
            trace!(
                dependency = %dependency.name(),
                kind = %session.kind(),
                providers = contributed.len(),
                "dependency providers collected"
            );
        }

        let Some(shared_provider) = shared_provider else {
            return Err(SessionError::MissingLibraryDependency {
                module: module.name().clone(),
            });
        };
        Ok(StructuredProviders::new(Vec::new(), providers, shared_provider))
    }

    // =========================================================================
    // Step 4: extensions
    // =========================================================================

    pub fn configure_extensions(&mut self, registrars: &[Arc<dyn ExtensionRegistrar>]) -> Result<()> {
        self.check_step(BuildStep::ExtensionsConfigured)?;
        let _span = debug_span!("configure_extensions", session = %self.id).entered();

        let context = ExtensionContext {
            session: self.id,
            kind: self.kind,
            modules: self.modules.iter().map(|module| module.name().clone()).collect(),
            language_settings: self.language_settings,
        };
        for registrar in registrars {
            let configuration = registrar.configure(&context);
            debug!(
                extension = registrar.name(),
                checkers = configuration.checkers.len(),
                providers = configuration.declarations.len(),
                "extension configured"
            );
            self.checkers.extend(configuration.checkers);
            for generated in configuration.declarations {
                self.generated_providers.push(SymbolProvider::leaf(
                    self.owner(),
                    LeafKind::Generated(generated.extension),
                    generated.source,
                ));
            }
        }

        self.step = BuildStep::ExtensionsConfigured;
        Ok(())
    }

    // =========================================================================
    // Step 5: providers
    // =========================================================================

    /// Build the session's composite providers from its own declaration
    /// sources, the extension-generated ones and the dependency providers.
    pub fn finalize_providers(
        &mut self,
        own_sources: Vec<(LeafKind, Arc<dyn DeclarationSource>)>,
    ) -> Result<()> {
        self.check_step(BuildStep::ProvidersFinalized)?;
        let _span = debug_span!("finalize_providers", session = %self.id).entered();

        if self.kind != SessionKind::Source
            && own_sources.iter().any(|(kind, _)| *kind == LeafKind::Source)
        {
            return Err(SessionError::LibraryWithSourceProviders {
                modules: self.modules.iter().map(|module| module.name().clone()).collect(),
            });
        }

        let owner = self.owner();
        let mut own: Vec<Arc<SymbolProvider>> = own_sources
            .into_iter()
            .map(|(kind, source)| SymbolProvider::leaf(owner, kind, source))
            .collect();
        own.append(&mut self.generated_providers);
        if let Some(synthetic) = own.iter().find(|provider| {
            provider
                .as_leaf()
                .is_some_and(|leaf| *leaf.kind() == LeafKind::SyntheticFunctionInterfaces)
        }) {
            self.components
                .register(SyntheticFunctionInterfacesProvider(synthetic.clone()));
        }

        let finalized = match self.kind {
            SessionKind::SharedLibrary => FinalProviders {
                structured: None,
                main: SymbolProvider::composite(owner, own),
                dependencies: None,
            },
            SessionKind::Library => {
                let shared = self.shared_dependency_provider()?;
                let structured = StructuredProviders::for_library(own.clone(), shared.clone());
                let mut with_shared = own;
                with_shared.extend(shared.flatten_for_owner());
                FinalProviders {
                    structured: Some(structured),
                    main: SymbolProvider::composite(owner, with_shared),
                    dependencies: None,
                }
            }
            SessionKind::Source => {
                let gathered = self.dependency_providers.take().ok_or(
                    SessionError::OutOfOrder {
                        attempted: BuildStep::ProvidersFinalized,
                        current: self.step,
                    },
                )?;
                let structured = StructuredProviders::new(
                    own.clone(),
                    gathered.library_providers,
                    gathered.shared_provider,
                );
                let without_sources = structured.flattened_without_sources();
                let mut all = own;
                all.extend(without_sources.iter().cloned());
                FinalProviders {
                    structured: Some(structured),
                    main: SymbolProvider::composite(owner, all),
                    dependencies: Some(SymbolProvider::composite(owner, without_sources)),
                }
            }
        };

        debug!(
            session = %self.id,
            children = finalized.main.children().len(),
            "providers finalized"
        );
        self.finalized = Some(finalized);
        self.step = BuildStep::ProvidersFinalized;
        Ok(())
    }

    fn shared_dependency_provider(&self) -> Result<Arc<SymbolProvider>> {
        self.dependency_providers
            .as_ref()
            .map(|structured| structured.shared_provider.clone())
            .ok_or(SessionError::MissingSharedSession { kind: self.kind })
    }

    // =========================================================================
    // Step 6: publish
    // =========================================================================

    /// Freeze the session and bind its modules to it.
    pub fn publish(mut self) -> Result<Arc<Session>> {
        self.check_step(BuildStep::Published)?;
        let _span = debug_span!("publish", session = %self.id).entered();

        let Some(finalized) = self.finalized.take() else {
            return Err(SessionError::OutOfOrder {
                attempted: BuildStep::Published,
                current: self.step,
            });
        };
        if let Some(module) = self.modules.iter().find(|module| module.is_bound()) {
            return Err(SessionError::AlreadyBound {
                module: module.name().clone(),
            });
        }

        let scope_cache = ScopeCache::new(finalized.main.clone(), self.phase_resolver.clone());
        let session = Arc::new(Session {
            id: self.id,
            kind: self.kind,
            modules: std::mem::take(&mut self.modules),
            language_settings: self.language_settings,
            components: std::mem::take(&mut self.components),
            checkers: std::mem::take(&mut self.checkers),
            structured_providers: finalized.structured,
            symbol_provider: finalized.main,
            dependencies_symbol_provider: finalized.dependencies,
            scope_cache,
        });
        for module in session.modules() {
            module.bind_session(&session)?;
        }
        debug!(session = %session.id(), kind = %session.kind(), "session published");
        Ok(session)
    }

    /// Register an additional component before publishing.
    pub fn register_component<T: std::any::Any + Send + Sync>(&mut self, component: T) {
        self.components.register(component);
    }
}

#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod tests;
