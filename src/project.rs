//! Building the sessions of a configured project.
//!
//! Sessions are published leaves first: the shared library session, then one
//! library session over every library module, then one source session per
//! source module in dependency order.

use crate::config::{LIBRARY_BUCKET, ModuleConfig, ModuleKind, ProjectConfig};
use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use kres_providers::DeclarationSource;
use kres_resolve::{OverloadResolver, ResolutionContext};
use kres_session::{ModuleData, Session, SessionFactory, SessionProvider};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{info, info_span};

/// Declaration sources per module name. Library modules contribute binary
/// declarations, source modules their own.
pub type ProjectSources = FxHashMap<String, Vec<Arc<dyn DeclarationSource>>>;

pub struct Project {
    session_provider: Arc<SessionProvider>,
    shared: Arc<Session>,
    libraries: Arc<Session>,
    modules: IndexMap<String, Arc<ModuleData>>,
    sessions: IndexMap<String, Arc<Session>>,
}

impl Project {
    pub fn session_provider(&self) -> &Arc<SessionProvider> {
        &self.session_provider
    }

    pub fn shared_session(&self) -> &Arc<Session> {
        &self.shared
    }

    /// The session every library module is bound to.
    pub fn library_session(&self) -> &Arc<Session> {
        &self.libraries
    }

    pub fn module(&self, name: &str) -> Option<&Arc<ModuleData>> {
        self.modules.get(name)
    }

    /// The session of a source module, or the library session for a library
    /// module.
    pub fn session(&self, name: &str) -> Option<&Arc<Session>> {
        self.sessions.get(name)
    }

    /// Source module names in the order their sessions were built.
    pub fn source_modules(&self) -> impl Iterator<Item = &str> {
        self.sessions
            .iter()
            .filter(|(_, session)| !Arc::ptr_eq(session, &self.libraries))
            .map(|(name, _)| name.as_str())
    }

    pub fn resolver(&self, name: &str) -> Option<OverloadResolver> {
        let session = self.session(name)?;
        Some(OverloadResolver::new(ResolutionContext::new(session.clone())))
    }
}

/// Publish every session of `config`. Sources keyed by a name that is not a
/// configured module are rejected.
pub fn build_project(config: &ProjectConfig, mut sources: ProjectSources) -> Result<Project> {
    config.validate()?;
    if let Some(unknown) = sources.keys().find(|name| config.module(name).is_none()) {
        bail!("declaration sources given for unknown module `{unknown}`");
    }
    let _span = info_span!("build_project", modules = config.modules.len()).entered();

    let session_provider = Arc::new(SessionProvider::new());
    let factory = SessionFactory::new(session_provider.clone(), config.language);
    let shared = factory
        .create_shared_library_session()
        .context("failed to create the shared library session")?;

    let order = config.topological_order()?;
    let mut modules: IndexMap<String, Arc<ModuleData>> = IndexMap::new();

    // library modules first; they never depend on source modules
    let mut library_modules = Vec::new();
    let mut library_binaries: Vec<(usize, Vec<Arc<dyn DeclarationSource>>)> = Vec::new();
    for &position in &order {
        let module_config = &config.modules[position];
        if module_config.kind != ModuleKind::Library {
            continue;
        }
        let module = module_data(module_config, &modules, None)?;
        library_binaries.push((
            module.depends_on_depth(),
            sources.remove(&module_config.name).unwrap_or_default(),
        ));
        modules.insert(module_config.name.clone(), module.clone());
        library_modules.push(module);
    }
    // deepest dependsOn first, so an actual precedes its expect in the bucket
    library_binaries.sort_by(|(a, _), (b, _)| b.cmp(a));
    let binaries: Vec<Arc<dyn DeclarationSource>> = library_binaries
        .into_iter()
        .flat_map(|(_, binaries)| binaries)
        .collect();
    let bucket = ModuleData::builder(LIBRARY_BUCKET).build();
    library_modules.push(bucket.clone());
    let libraries = factory
        .create_library_session(library_modules, &shared, binaries)
        .context("failed to create the library session")?;

    let mut sessions: IndexMap<String, Arc<Session>> = modules
        .keys()
        .map(|name| (name.clone(), libraries.clone()))
        .collect();

    for &position in &order {
        let module_config = &config.modules[position];
        if module_config.kind != ModuleKind::Source {
            continue;
        }
        let module = module_data(module_config, &modules, Some(&bucket))?;
        let settings = module_config.language.unwrap_or(config.language);
        let session = factory
            .create_source_session_with(
                module.clone(),
                sources.remove(&module_config.name).unwrap_or_default(),
                settings,
            )
            .with_context(|| format!("failed to create the session of module `{}`", module_config.name))?;
        modules.insert(module_config.name.clone(), module);
        sessions.insert(module_config.name.clone(), session);
    }

    info!(sessions = session_provider.len(), "project built");
    Ok(Project {
        session_provider,
        shared,
        libraries,
        modules,
        sessions,
    })
}

/// Module data for one configured module. Every edge target must already be
/// in `built`; topological order guarantees it.
fn module_data(
    module_config: &ModuleConfig,
    built: &IndexMap<String, Arc<ModuleData>>,
    library_bucket: Option<&Arc<ModuleData>>,
) -> Result<Arc<ModuleData>> {
    let lookup = |name: &String| {
        built
            .get(name)
            .with_context(|| format!("module `{}` refers to `{name}` before it is built", module_config.name))
    };
    let mut builder = ModuleData::builder(&module_config.name);
    if let Some(bucket) = library_bucket {
        builder = builder.dependency(bucket);
    }
    for dependency in &module_config.dependencies {
        builder = builder.dependency(lookup(dependency)?);
    }
    for friend in &module_config.friends {
        builder = builder.friend(lookup(friend)?);
    }
    for refined in &module_config.depends_on {
        builder = builder.depends_on(lookup(refined)?);
    }
    Ok(builder.build())
}

#[cfg(test)]
#[path = "../tests/project_tests.rs"]
mod tests;
