//! Per-session cache of materialised member scopes.
//!
//! One slot per class holding its scopes by phase. A request for phase `p`
//! is answered by the scope cached for the least-resolved phase `>= p`, so
//! once a scope is published every later request at that phase or below
//! returns the same `Arc`.
//!
//! A miss first asks the [`PhaseResolver`] to bring each class involved up to
//! the requested phase, then builds the scopes of the supertype DAG in
//! post-order with an explicit stack. Publishing happens under the class
//! slot's lock: a build whose phase is already covered by a published scope
//! is discarded and the published one is returned instead.

use super::member_scope::MemberScope;
use dashmap::DashMap;
use kres_common::ClassId;
use kres_common::limits::MAX_SUPERTYPE_WORKLIST;
use kres_types::{ClassDecl, ClassLookup, ClassSymbol, ResolvePhase, Substitutor, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Lazy resolution collaborator: brings a class up to a phase on demand.
pub trait PhaseResolver: Send + Sync {
    fn ensure_resolved(&self, class: &ClassDecl, phase: ResolvePhase);
}

/// Resolver for already-complete declarations: only records the phase.
#[derive(Debug, Default)]
pub struct MarkingPhaseResolver;

impl PhaseResolver for MarkingPhaseResolver {
    fn ensure_resolved(&self, class: &ClassDecl, phase: ResolvePhase) {
        class.mark_resolved_to(phase);
    }
}

enum Frame {
    Enter(ClassSymbol),
    Exit(ClassSymbol),
}

pub struct ScopeCache {
    lookup: Arc<dyn ClassLookup + Send + Sync>,
    resolver: Arc<dyn PhaseResolver>,
    /// Per class, published scopes sorted by phase.
    scopes: DashMap<ClassId, SmallVec<[(ResolvePhase, Arc<MemberScope>); 2]>>,
}

impl ScopeCache {
    pub fn new(lookup: Arc<dyn ClassLookup + Send + Sync>, resolver: Arc<dyn PhaseResolver>) -> Self {
        Self {
            lookup,
            resolver,
            scopes: DashMap::new(),
        }
    }

    /// Number of (class, phase) entries published so far.
    pub fn len(&self) -> usize {
        self.scopes.iter().map(|slot| slot.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// The scope cached for `class_id` at `phase` or any more resolved phase.
    pub fn cached(&self, class_id: &ClassId, phase: ResolvePhase) -> Option<Arc<MemberScope>> {
        let slot = self.scopes.get(class_id)?;
        covering(&slot, phase)
    }

    /// Member scope of `class_id` resolved to at least `phase`.
    ///
    /// `None` when the class itself cannot be found.
    pub fn scope_for(&self, class_id: &ClassId, phase: ResolvePhase) -> Option<Arc<MemberScope>> {
        if let Some(hit) = self.cached(class_id, phase) {
            return Some(hit);
        }
        let root = self.lookup.class_symbol(class_id)?;
        Some(self.materialize(root, phase))
    }

    fn materialize(&self, root: ClassSymbol, phase: ResolvePhase) -> Arc<MemberScope> {
        let root_id = root.id.clone();
        let mut built: FxHashMap<ClassId, Arc<MemberScope>> = FxHashMap::default();
        let mut entered: FxHashSet<ClassId> = FxHashSet::default();
        let mut stack = vec![Frame::Enter(root.clone())];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(class) => {
                    if built.contains_key(&class.id) {
                        continue;
                    }
                    if let Some(hit) = self.cached(&class.id, phase) {
                        built.insert(class.id.clone(), hit);
                        continue;
                    }
                    // entered but not built: a supertype cycle, skip the back edge
                    if !entered.insert(class.id.clone()) {
                        continue;
                    }
                    if entered.len() > MAX_SUPERTYPE_WORKLIST {
                        debug!(class = %root_id, "supertype worklist limit reached");
                        break;
                    }
                    self.resolver.ensure_resolved(&class, phase);
                    stack.push(Frame::Exit(class.clone()));
                    for supertype in class.supertypes.iter().rev() {
                        if let Some(id) = supertype.class_id()
                            && let Some(super_class) = self.lookup.class_symbol(id)
                        {
                            stack.push(Frame::Enter(super_class));
                        }
                    }
                }
                Frame::Exit(class) => {
                    let supertypes: Vec<(Type, Arc<MemberScope>)> = class
                        .supertypes
                        .iter()
                        .filter_map(|supertype| {
                            let id = supertype.class_id()?;
                            let scope = built.get(id)?;
                            Some((supertype.clone(), scope.clone()))
                        })
                        .collect();
                    let scope = Arc::new(MemberScope::build(&class, phase, &supertypes));
                    let published = self.publish(&class.id, phase, scope);
                    built.insert(class.id.clone(), published);
                }
            }
        }

        match built.remove(&root_id) {
            Some(scope) => scope,
            // Only reachable when the worklist limit cut the walk short: fall
            // back to the class's own members.
            None => self.publish(
                &root_id,
                phase,
                Arc::new(MemberScope::build(&root, phase, &[])),
            ),
        }
    }

    fn publish(
        &self,
        class_id: &ClassId,
        phase: ResolvePhase,
        scope: Arc<MemberScope>,
    ) -> Arc<MemberScope> {
        let mut slot = self.scopes.entry(class_id.clone()).or_default();
        if let Some(published) = covering(&slot, phase) {
            trace!(class = %class_id, ?phase, "member scope already published");
            return published;
        }
        let position = slot.partition_point(|(published, _)| *published < phase);
        slot.insert(position, (phase, scope.clone()));
        trace!(class = %class_id, ?phase, "member scope materialized");
        scope
    }

    /// Substituted signature helper: the scope of `ty`'s class together with
    /// the substitutor for `ty`'s arguments.
    pub fn scope_for_type(
        &self,
        ty: &Type,
        phase: ResolvePhase,
    ) -> Option<(Arc<MemberScope>, Substitutor)> {
        let class_id = ty.class_id()?;
        let class = self.lookup.class_symbol(class_id)?;
        let scope = self.scope_for(class_id, phase)?;
        let substitutor = Substitutor::from_parameters(
            class.type_parameters.iter().map(|parameter| &parameter.name),
            ty.arguments(),
        );
        Some((scope, substitutor))
    }
}

impl fmt::Debug for ScopeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeCache")
            .field("scopes", &self.len())
            .finish()
    }
}

/// The least-resolved scope at `phase` or above.
fn covering(
    slot: &[(ResolvePhase, Arc<MemberScope>)],
    phase: ResolvePhase,
) -> Option<Arc<MemberScope>> {
    slot.iter()
        .find(|(published, _)| *published >= phase)
        .map(|(_, scope)| scope.clone())
}
