//! Project-wide registry of published sessions, keyed by module name.

use crate::session::Session;
use dashmap::DashMap;
use kres_common::Name;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct SessionProvider {
    sessions: DashMap<Name, Arc<Session>>,
}

impl SessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every module of a published session under its name.
    pub fn register(&self, session: &Arc<Session>) {
        for module in session.modules() {
            self.sessions.insert(module.name().clone(), session.clone());
        }
    }

    pub fn session_for(&self, module: &Name) -> Option<Arc<Session>> {
        self.sessions.get(module).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Registered module names, sorted.
    pub fn module_names(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.sessions.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }
}
