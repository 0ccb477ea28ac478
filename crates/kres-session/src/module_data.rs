//! Module identity and dependency edges.
//!
//! Modules are created leaves first: a module only refers to modules that
//! already exist, so the regular and friend graphs cannot contain cycles.
//! Depends-on edges pair a platform module with the common module whose
//! `expect` declarations it actualizes.

use crate::error::{Result, SessionError};
use crate::session::Session;
use kres_common::Name;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

pub struct ModuleData {
    name: Name,
    dependencies: Vec<Arc<ModuleData>>,
    friend_dependencies: Vec<Arc<ModuleData>>,
    depends_on_dependencies: Vec<Arc<ModuleData>>,
    /// Set once, when the owning session is published.
    session: OnceLock<Weak<Session>>,
}

pub struct ModuleDataBuilder {
    name: Name,
    dependencies: Vec<Arc<ModuleData>>,
    friend_dependencies: Vec<Arc<ModuleData>>,
    depends_on_dependencies: Vec<Arc<ModuleData>>,
}

impl ModuleDataBuilder {
    #[must_use]
    pub fn dependency(mut self, module: &Arc<ModuleData>) -> Self {
        self.dependencies.push(module.clone());
        self
    }

    #[must_use]
    pub fn friend(mut self, module: &Arc<ModuleData>) -> Self {
        self.friend_dependencies.push(module.clone());
        self
    }

    #[must_use]
    pub fn depends_on(mut self, module: &Arc<ModuleData>) -> Self {
        self.depends_on_dependencies.push(module.clone());
        self
    }

    pub fn build(self) -> Arc<ModuleData> {
        Arc::new(ModuleData {
            name: self.name,
            dependencies: self.dependencies,
            friend_dependencies: self.friend_dependencies,
            depends_on_dependencies: self.depends_on_dependencies,
            session: OnceLock::new(),
        })
    }
}

impl ModuleData {
    pub fn builder(name: &str) -> ModuleDataBuilder {
        ModuleDataBuilder {
            name: Name::special(name),
            dependencies: Vec::new(),
            friend_dependencies: Vec::new(),
            depends_on_dependencies: Vec::new(),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn dependencies(&self) -> &[Arc<ModuleData>] {
        &self.dependencies
    }

    pub fn friend_dependencies(&self) -> &[Arc<ModuleData>] {
        &self.friend_dependencies
    }

    pub fn depends_on_dependencies(&self) -> &[Arc<ModuleData>] {
        &self.depends_on_dependencies
    }

    /// Every module reachable through depends-on edges, nearest first.
    pub fn all_depends_on_dependencies(&self) -> Vec<Arc<ModuleData>> {
        let mut result: Vec<Arc<ModuleData>> = Vec::new();
        let mut seen: FxHashSet<*const ModuleData> = FxHashSet::default();
        let mut frontier: Vec<Arc<ModuleData>> = self.depends_on_dependencies.clone();
        let mut next = Vec::new();
        while !frontier.is_empty() {
            for module in frontier.drain(..) {
                if !seen.insert(Arc::as_ptr(&module)) {
                    continue;
                }
                next.extend(module.depends_on_dependencies.iter().cloned());
                result.push(module);
            }
            std::mem::swap(&mut frontier, &mut next);
        }
        result
    }

    /// Length of the longest depends-on chain starting at this module.
    ///
    /// Platform modules are deeper than the common modules they actualize.
    pub fn depends_on_depth(self: &Arc<Self>) -> usize {
        enum Frame {
            Enter(Arc<ModuleData>),
            Exit(Arc<ModuleData>),
        }
        let mut depth: FxHashMap<*const ModuleData, usize> = FxHashMap::default();
        let mut entered: FxHashSet<*const ModuleData> = FxHashSet::default();
        let mut stack = vec![Frame::Enter(self.clone())];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(module) => {
                    if !entered.insert(Arc::as_ptr(&module)) {
                        continue;
                    }
                    stack.push(Frame::Exit(module.clone()));
                    for parent in &module.depends_on_dependencies {
                        stack.push(Frame::Enter(parent.clone()));
                    }
                }
                Frame::Exit(module) => {
                    let value = module
                        .depends_on_dependencies
                        .iter()
                        .map(|parent| depth.get(&Arc::as_ptr(parent)).copied().unwrap_or(0) + 1)
                        .max()
                        .unwrap_or(0);
                    depth.insert(Arc::as_ptr(&module), value);
                }
            }
        }
        depth.get(&Arc::as_ptr(self)).copied().unwrap_or(0)
    }

    /// Modules whose declarations this module sees, most specific first.
    ///
    /// Regular and friend dependencies, this module's depends-on closure and
    /// the depends-on closures of its dependencies, deduplicated and ordered
    /// by decreasing depends-on depth so that an `actual` is reached before
    /// its `expect`. Ties keep declaration order.
    pub fn dependency_view(&self) -> Vec<Arc<ModuleData>> {
        let mut modules: Vec<Arc<ModuleData>> = Vec::new();
        let mut seen: FxHashSet<*const ModuleData> = FxHashSet::default();
        let mut push = |module: &Arc<ModuleData>, modules: &mut Vec<Arc<ModuleData>>| {
            if seen.insert(Arc::as_ptr(module)) {
                modules.push(module.clone());
            }
        };

        for module in self.dependencies.iter().chain(&self.friend_dependencies) {
            push(module, &mut modules);
        }
        for module in self.all_depends_on_dependencies() {
            push(&module, &mut modules);
        }
        for dependency in self.dependencies.iter().chain(&self.friend_dependencies) {
            for module in dependency.all_depends_on_dependencies() {
                push(&module, &mut modules);
            }
        }

        let mut keyed: Vec<(usize, Arc<ModuleData>)> = modules
            .into_iter()
            .map(|module| (module.depends_on_depth(), module))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
        keyed.into_iter().map(|(_, module)| module).collect()
    }

    /// The published session this module is bound to.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.get().and_then(Weak::upgrade)
    }

    pub fn is_bound(&self) -> bool {
        self.session.get().is_some()
    }

    pub(crate) fn bind_session(&self, session: &Arc<Session>) -> Result<()> {
        self.session
            .set(Arc::downgrade(session))
            .map_err(|_| SessionError::AlreadyBound {
                module: self.name.clone(),
            })
    }
}

impl fmt::Debug for ModuleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |modules: &[Arc<ModuleData>]| -> Vec<String> {
            modules.iter().map(|module| module.name.to_string()).collect()
        };
        f.debug_struct("ModuleData")
            .field("name", &self.name)
            .field("dependencies", &names(&self.dependencies))
            .field("friend_dependencies", &names(&self.friend_dependencies))
            .field("depends_on", &names(&self.depends_on_dependencies))
            .field("bound", &self.is_bound())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/module_data_tests.rs"]
mod tests;
