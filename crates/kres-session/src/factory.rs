//! Session factory: the three session layers, leaves first.
//!
//! The shared-library session holds builtins and synthetic function
//! interfaces. Library sessions wrap binary dependencies and see the shared
//! session. Source sessions see their dependencies' published providers. Each
//! layer must be published before the next one is built.

use crate::builder::SessionBuilder;
use crate::error::Result;
use crate::extensions::ExtensionRegistrar;
use crate::module_data::ModuleData;
use crate::session::Session;
use crate::session_provider::SessionProvider;
use kres_common::{AnalysisFlags, LanguageVersionSettings};
use kres_providers::{
    DeclarationSource, LeafKind, MarkingPhaseResolver, PhaseResolver, SessionKind,
    SyntheticFunctionInterfaces, builtins_table,
};
use std::sync::Arc;
use tracing::info;

pub struct SessionFactory {
    session_provider: Arc<SessionProvider>,
    language_settings: LanguageVersionSettings,
    extension_registrars: Vec<Arc<dyn ExtensionRegistrar>>,
    phase_resolver: Arc<dyn PhaseResolver>,
}

impl SessionFactory {
    pub fn new(session_provider: Arc<SessionProvider>, language_settings: LanguageVersionSettings) -> Self {
        Self {
            session_provider,
            language_settings,
            extension_registrars: Vec::new(),
            phase_resolver: Arc::new(MarkingPhaseResolver),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, registrar: Arc<dyn ExtensionRegistrar>) -> Self {
        self.extension_registrars.push(registrar);
        self
    }

    #[must_use]
    pub fn with_phase_resolver(mut self, resolver: Arc<dyn PhaseResolver>) -> Self {
        self.phase_resolver = resolver;
        self
    }

    pub fn session_provider(&self) -> &Arc<SessionProvider> {
        &self.session_provider
    }

    pub fn language_settings(&self) -> LanguageVersionSettings {
        self.language_settings
    }

    /// Builtins (unless compiling the standard library itself) and synthetic
    /// function interfaces.
    pub fn create_shared_library_session(&self) -> Result<Arc<Session>> {
        let mut builder = SessionBuilder::new(SessionKind::SharedLibrary, self.phase_resolver.clone());
        builder.bind(Vec::new())?;
        builder.register_components(self.language_settings)?;
        builder.register_dependency_providers(None)?;
        builder.configure_extensions(&[])?;

        let synthetic: Arc<dyn DeclarationSource> = Arc::new(SyntheticFunctionInterfaces::new());
        let mut own: Vec<(LeafKind, Arc<dyn DeclarationSource>)> =
            vec![(LeafKind::SyntheticFunctionInterfaces, synthetic)];
        if !self.language_settings.get_flag(AnalysisFlags::STDLIB_COMPILATION) {
            own.push((LeafKind::Builtins, Arc::new(builtins_table())));
        }
        builder.finalize_providers(own)?;
        let session = builder.publish()?;
        info!(session = %session.id(), "shared library session created");
        Ok(session)
    }

    /// One library session over binary dependency modules.
    pub fn create_library_session(
        &self,
        modules: Vec<Arc<ModuleData>>,
        shared: &Arc<Session>,
        binaries: Vec<Arc<dyn DeclarationSource>>,
    ) -> Result<Arc<Session>> {
        let mut builder = SessionBuilder::new(SessionKind::Library, self.phase_resolver.clone());
        builder.bind(modules)?;
        builder.register_components(self.language_settings)?;
        builder.register_dependency_providers(Some(shared))?;
        builder.configure_extensions(&self.extension_registrars)?;
        builder.finalize_providers(
            binaries
                .into_iter()
                .map(|source| (LeafKind::Binary, source))
                .collect(),
        )?;
        let session = builder.publish()?;
        self.session_provider.register(&session);
        info!(session = %session.id(), modules = session.modules().len(), "library session created");
        Ok(session)
    }

    /// The session of one source module. Every dependency must be published.
    pub fn create_source_session(
        &self,
        module: Arc<ModuleData>,
        sources: Vec<Arc<dyn DeclarationSource>>,
    ) -> Result<Arc<Session>> {
        self.create_source_session_with(module, sources, self.language_settings)
    }

    /// Like [`Self::create_source_session`] with module-specific settings.
    pub fn create_source_session_with(
        &self,
        module: Arc<ModuleData>,
        sources: Vec<Arc<dyn DeclarationSource>>,
        language_settings: LanguageVersionSettings,
    ) -> Result<Arc<Session>> {
        let mut builder = SessionBuilder::new(SessionKind::Source, self.phase_resolver.clone());
        builder.bind(vec![module])?;
        builder.register_components(language_settings)?;
        builder.register_dependency_providers(None)?;
        builder.configure_extensions(&self.extension_registrars)?;
        builder.finalize_providers(
            sources
                .into_iter()
                .map(|source| (LeafKind::Source, source))
                .collect(),
        )?;
        let session = builder.publish()?;
        self.session_provider.register(&session);
        info!(session = %session.id(), "source session created");
        Ok(session)
    }
}
