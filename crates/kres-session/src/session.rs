//! Published sessions.

use crate::checkers::{CheckerRegistry, Diagnostic};
use crate::components::ComponentRegistry;
use crate::module_data::ModuleData;
use kres_common::{CallableId, ClassId, LanguageVersionSettings};
use kres_providers::{ScopeCache, SessionId, SessionKind, StructuredProviders, SymbolProvider};
use kres_types::{CallableSymbol, ClassLookup, ClassSymbol};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Component: the shared session's synthetic function-interface provider.
#[derive(Clone, Debug)]
pub struct SyntheticFunctionInterfacesProvider(pub Arc<SymbolProvider>);

/// Immutable, published session.
///
/// Safe for concurrent reads: every cache it exposes is publish-once.
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) kind: SessionKind,
    pub(crate) modules: Vec<Arc<ModuleData>>,
    pub(crate) language_settings: LanguageVersionSettings,
    pub(crate) components: ComponentRegistry,
    pub(crate) checkers: CheckerRegistry,
    pub(crate) structured_providers: Option<StructuredProviders>,
    pub(crate) symbol_provider: Arc<SymbolProvider>,
    pub(crate) dependencies_symbol_provider: Option<Arc<SymbolProvider>>,
    pub(crate) scope_cache: ScopeCache,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Modules bound to this session: exactly one for a source session, the
    /// covered modules for a library session, none for the shared one.
    pub fn modules(&self) -> &[Arc<ModuleData>] {
        &self.modules
    }

    pub fn language_settings(&self) -> &LanguageVersionSettings {
        &self.language_settings
    }

    /// # Panics
    ///
    /// When no `T` was registered for this session.
    pub fn component<T: Any + Send + Sync>(&self) -> &T {
        self.components.get::<T>()
    }

    pub fn try_component<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.components.try_get::<T>()
    }

    pub fn checkers(&self) -> &CheckerRegistry {
        &self.checkers
    }

    /// `None` for the shared-library session.
    pub fn structured_providers(&self) -> Option<&StructuredProviders> {
        self.structured_providers.as_ref()
    }

    /// The session's canonical lookup entry point.
    pub fn symbol_provider(&self) -> &Arc<SymbolProvider> {
        &self.symbol_provider
    }

    /// Everything visible except the session's own sources. Source sessions
    /// only.
    pub fn dependencies_symbol_provider(&self) -> Option<&Arc<SymbolProvider>> {
        self.dependencies_symbol_provider.as_ref()
    }

    pub fn scope_cache(&self) -> &ScopeCache {
        &self.scope_cache
    }

    pub fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        self.symbol_provider.class_symbol(id)
    }

    pub fn callables(&self, id: &CallableId) -> Arc<[CallableSymbol]> {
        self.symbol_provider.callables(id)
    }

    /// Run every declaration checker over one class.
    pub fn check_class(&self, id: &ClassId) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let Some(class) = self.class_symbol(id) else {
            return diagnostics;
        };
        for checker in self.checkers.declaration_checkers() {
            checker.check_class(&class, self, &mut diagnostics);
        }
        diagnostics
    }

    /// Run the checkers over every class of the session's own sources.
    pub fn check_own_declarations(&self) -> Vec<Diagnostic> {
        let Some(structured) = &self.structured_providers else {
            return Vec::new();
        };
        let mut diagnostics = Vec::new();
        for provider in &structured.source_providers {
            for id in provider.class_ids() {
                diagnostics.extend(self.check_class(&id));
            }
        }
        debug!(
            session = %self.id,
            diagnostics = diagnostics.len(),
            "checked own declarations"
        );
        diagnostics
    }
}

impl ClassLookup for Session {
    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        Session::class_symbol(self, id)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field(
                "modules",
                &self
                    .modules
                    .iter()
                    .map(|module| module.name().to_string())
                    .collect::<Vec<_>>(),
            )
            .field("components", &self.components)
            .field("checkers", &self.checkers)
            .finish_non_exhaustive()
    }
}
