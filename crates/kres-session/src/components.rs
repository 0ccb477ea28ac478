//! Typed component registry.
//!
//! One instance per component type. Fetching a component that was never
//! registered is a programming error and panics with the component's type
//! name.

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId, type_name};
use std::fmt;

#[derive(Default)]
pub struct ComponentRegistry {
    components: FxHashMap<TypeId, (&'static str, Box<dyn Any + Send + Sync>)>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `component`, replacing a previous instance of the same type.
    pub fn register<T: Any + Send + Sync>(&mut self, component: T) {
        self.components
            .insert(TypeId::of::<T>(), (type_name::<T>(), Box::new(component)));
    }

    /// # Panics
    ///
    /// When no `T` was registered.
    pub fn get<T: Any + Send + Sync>(&self) -> &T {
        match self.try_get::<T>() {
            Some(component) => component,
            None => panic!("session component `{}` is not registered", type_name::<T>()),
        }
    }

    pub fn try_get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.components
            .get(&TypeId::of::<T>())
            .and_then(|(_, component)| component.downcast_ref::<T>())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.components.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_set().entries(names).finish()
    }
}

#[cfg(test)]
#[path = "../tests/components_tests.rs"]
mod tests;
