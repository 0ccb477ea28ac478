//! The {source, library, shared} partition a session carries next to its
//! main composite provider.

use crate::provider::SymbolProvider;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct StructuredProviders {
    /// Providers over the session's own sources. Empty for library sessions.
    pub source_providers: Vec<Arc<SymbolProvider>>,
    pub library_providers: Vec<Arc<SymbolProvider>>,
    pub shared_provider: Arc<SymbolProvider>,
}

impl StructuredProviders {
    pub fn new(
        source_providers: Vec<Arc<SymbolProvider>>,
        library_providers: Vec<Arc<SymbolProvider>>,
        shared_provider: Arc<SymbolProvider>,
    ) -> Self {
        Self {
            source_providers,
            library_providers,
            shared_provider,
        }
    }

    pub fn for_library(
        library_providers: Vec<Arc<SymbolProvider>>,
        shared_provider: Arc<SymbolProvider>,
    ) -> Self {
        Self::new(Vec::new(), library_providers, shared_provider)
    }

    /// Everything visible except the session's own sources: each library
    /// provider and the shared provider flattened from their owners' point of
    /// view, first occurrence kept.
    pub fn flattened_without_sources(&self) -> Vec<Arc<SymbolProvider>> {
        let mut result: Vec<Arc<SymbolProvider>> = Vec::new();
        let candidates = self
            .library_providers
            .iter()
            .flat_map(|provider| provider.flatten_for_owner())
            .chain(self.shared_provider.flatten_for_owner());
        for provider in candidates {
            if !result.iter().any(|seen| Arc::ptr_eq(seen, &provider)) {
                result.push(provider);
            }
        }
        result
    }
}
