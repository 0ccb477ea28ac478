//! Symbol providers: leaves over one declaration source, composites over an
//! ordered list of providers.
//!
//! Composites answer class lookups with the first child hit and callable
//! lookups with the union of all children, in child order. Every answer is
//! cached in a publish-once slot: concurrent misses on the same key may all
//! compute, but only the first inserted value is ever returned.
//!
//! ## Ownership
//!
//! A composite *adopts* the children created by its own session and merely
//! references the others. Adopting a provider twice is a composition bug and
//! panics.
//!
//! ## Flattening
//!
//! [`SymbolProvider::flatten`] walks the composite tree with an explicit stack
//! and returns the leaves visible to a consumer:
//!
//! - source consumer: the source leaves of that very session
//! - library or shared-library consumer: every library-like leaf
//!
//! Leaves reachable through several paths appear once, at their first
//! position in depth-first order.

use crate::owner::ProviderOwner;
use crate::source::DeclarationSource;
use dashmap::DashMap;
use kres_common::{CallableId, ClassId, Name};
use kres_types::{CallableSymbol, ClassLookup, ClassSymbol};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// What a leaf provider wraps.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// Declarations parsed from the sources of one module.
    Source,
    /// Deserialized binary metadata.
    Binary,
    Builtins,
    SyntheticFunctionInterfaces,
    /// Declarations generated by the named extension.
    Generated(Name),
}

pub struct LeafProvider {
    owner: ProviderOwner,
    kind: LeafKind,
    source: Arc<dyn DeclarationSource>,
    adopted: AtomicBool,
}

impl LeafProvider {
    pub fn kind(&self) -> &LeafKind {
        &self.kind
    }

    pub fn source(&self) -> &Arc<dyn DeclarationSource> {
        &self.source
    }
}

pub struct CompositeProvider {
    owner: ProviderOwner,
    providers: Vec<Arc<SymbolProvider>>,
    classes: DashMap<ClassId, Option<ClassSymbol>>,
    callables: DashMap<CallableId, Arc<[CallableSymbol]>>,
    adopted: AtomicBool,
}

impl CompositeProvider {
    pub fn providers(&self) -> &[Arc<SymbolProvider>] {
        &self.providers
    }

    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        if let Some(cached) = self.classes.get(id) {
            return cached.clone();
        }
        let computed = self
            .providers
            .iter()
            .find_map(|provider| provider.class_symbol(id));
        trace!(
            owner = %self.owner.session,
            class = %id,
            found = computed.is_some(),
            "composite class lookup miss"
        );
        self.classes.entry(id.clone()).or_insert(computed).clone()
    }

    fn callables(&self, id: &CallableId) -> Arc<[CallableSymbol]> {
        if let Some(cached) = self.callables.get(id) {
            return cached.clone();
        }
        let mut computed: Vec<CallableSymbol> = Vec::new();
        for provider in &self.providers {
            for symbol in provider.callables(id).iter() {
                // the same leaf can be reachable through two children
                if !computed.iter().any(|seen| Arc::ptr_eq(seen, symbol)) {
                    computed.push(symbol.clone());
                }
            }
        }
        trace!(
            owner = %self.owner.session,
            callable = %id,
            count = computed.len(),
            "composite callable lookup miss"
        );
        self.callables
            .entry(id.clone())
            .or_insert_with(|| Arc::from(computed))
            .clone()
    }
}

/// A declaration provider: a closed union of leaf and composite providers.
pub enum SymbolProvider {
    Leaf(LeafProvider),
    Composite(CompositeProvider),
}

impl SymbolProvider {
    pub fn leaf(
        owner: ProviderOwner,
        kind: LeafKind,
        source: Arc<dyn DeclarationSource>,
    ) -> Arc<Self> {
        Arc::new(Self::Leaf(LeafProvider {
            owner,
            kind,
            source,
            adopted: AtomicBool::new(false),
        }))
    }

    /// Build a caching composite over `providers`, adopting the ones owned by
    /// the same session.
    ///
    /// # Panics
    ///
    /// When a provider of `owner`'s session is already adopted by another
    /// composite.
    pub fn composite(owner: ProviderOwner, providers: Vec<Arc<SymbolProvider>>) -> Arc<Self> {
        for provider in &providers {
            if provider.owner().session == owner.session {
                provider.adopt(owner);
            }
        }
        debug!(
            owner = %owner.session,
            kind = %owner.kind,
            children = providers.len(),
            "composite provider created"
        );
        Arc::new(Self::Composite(CompositeProvider {
            owner,
            providers,
            classes: DashMap::new(),
            callables: DashMap::new(),
            adopted: AtomicBool::new(false),
        }))
    }

    fn adopt(&self, by: ProviderOwner) {
        let flag = match self {
            Self::Leaf(leaf) => &leaf.adopted,
            Self::Composite(composite) => &composite.adopted,
        };
        assert!(
            !flag.swap(true, Ordering::AcqRel),
            "provider {self:?} of {} adopted by a second composite of {}",
            self.owner().session,
            by.session
        );
    }

    pub fn owner(&self) -> ProviderOwner {
        match self {
            Self::Leaf(leaf) => leaf.owner,
            Self::Composite(composite) => composite.owner,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    pub fn as_leaf(&self) -> Option<&LeafProvider> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Composite(_) => None,
        }
    }

    /// Direct children of a composite; empty for a leaf.
    pub fn children(&self) -> &[Arc<SymbolProvider>] {
        match self {
            Self::Leaf(_) => &[],
            Self::Composite(composite) => &composite.providers,
        }
    }

    pub fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        match self {
            Self::Leaf(leaf) => leaf.source.class_symbol(id),
            Self::Composite(composite) => composite.class_symbol(id),
        }
    }

    pub fn callables(&self, id: &CallableId) -> Arc<[CallableSymbol]> {
        match self {
            Self::Leaf(leaf) => Arc::from(leaf.source.callables(id)),
            Self::Composite(composite) => composite.callables(id),
        }
    }

    /// Leaves of this tree visible to `consumer`, in first-seen order.
    pub fn flatten(self: &Arc<Self>, consumer: ProviderOwner) -> Vec<Arc<SymbolProvider>> {
        let mut result: Vec<Arc<SymbolProvider>> = Vec::new();
        let mut seen: FxHashSet<*const SymbolProvider> = FxHashSet::default();
        let mut stack: Vec<Arc<SymbolProvider>> = vec![Arc::clone(self)];

        while let Some(provider) = stack.pop() {
            if !seen.insert(Arc::as_ptr(&provider)) {
                continue;
            }
            match &*provider {
                Self::Composite(composite) => {
                    // reversed so that children pop in registration order
                    stack.extend(composite.providers.iter().rev().cloned());
                }
                Self::Leaf(leaf) => {
                    if consumer.exposes_leaves_of(leaf.owner) {
                        result.push(provider);
                    }
                }
            }
        }

        trace!(
            consumer = %consumer.session,
            kind = %consumer.kind,
            leaves = result.len(),
            "flattened provider"
        );
        result
    }

    /// Flatten from the point of view of the session that built this provider.
    pub fn flatten_for_owner(self: &Arc<Self>) -> Vec<Arc<SymbolProvider>> {
        self.flatten(self.owner())
    }

    /// Class ids every leaf of this tree can enumerate, deduplicated.
    pub fn class_ids(self: &Arc<Self>) -> Vec<ClassId> {
        let mut seen_leaves: FxHashSet<*const SymbolProvider> = FxHashSet::default();
        let mut seen_ids: FxHashSet<ClassId> = FxHashSet::default();
        let mut ids = Vec::new();
        let mut stack = vec![Arc::clone(self)];
        while let Some(provider) = stack.pop() {
            if !seen_leaves.insert(Arc::as_ptr(&provider)) {
                continue;
            }
            match &*provider {
                Self::Composite(composite) => {
                    stack.extend(composite.providers.iter().rev().cloned());
                }
                Self::Leaf(leaf) => {
                    for id in leaf.source.class_ids() {
                        if seen_ids.insert(id.clone()) {
                            ids.push(id);
                        }
                    }
                }
            }
        }
        ids
    }
}

impl ClassLookup for SymbolProvider {
    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        SymbolProvider::class_symbol(self, id)
    }
}

impl fmt::Debug for SymbolProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => f
                .debug_struct("Leaf")
                .field("owner", &leaf.owner)
                .field("kind", &leaf.kind)
                .field("source", &leaf.source)
                .finish(),
            Self::Composite(composite) => f
                .debug_struct("Composite")
                .field("owner", &composite.owner)
                .field("children", &composite.providers.len())
                .finish(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/provider_tests.rs"]
mod tests;
