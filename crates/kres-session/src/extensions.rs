//! Extension registrars.
//!
//! Each registrar is configured once per session, during the extension step
//! of session construction. That step is the last point where the session's
//! declaration surface can grow.

use crate::checkers::DeclarationChecker;
use kres_common::{LanguageVersionSettings, Name};
use kres_providers::{DeclarationSource, SessionId, SessionKind};
use std::sync::Arc;

/// What an extension sees of the session being configured.
#[derive(Clone, Debug)]
pub struct ExtensionContext {
    pub session: SessionId,
    pub kind: SessionKind,
    pub modules: Vec<Name>,
    pub language_settings: LanguageVersionSettings,
}

/// Declarations generated by an extension, exposed through their own leaf
/// provider.
pub struct GeneratedDeclarations {
    pub extension: Name,
    pub source: Arc<dyn DeclarationSource>,
}

#[derive(Default)]
pub struct ExtensionConfiguration {
    pub checkers: Vec<Arc<dyn DeclarationChecker>>,
    pub declarations: Vec<GeneratedDeclarations>,
}

impl ExtensionConfiguration {
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty() && self.declarations.is_empty()
    }
}

pub trait ExtensionRegistrar: Send + Sync {
    fn name(&self) -> &str;

    fn configure(&self, context: &ExtensionContext) -> ExtensionConfiguration;
}
