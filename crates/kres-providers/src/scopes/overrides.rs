//! Override traversal on top of member scopes.

use super::member_scope::MemberScope;
use kres_types::CallableSymbol;
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;

/// Functions `symbol` directly overrides, as seen from the scope of its
/// containing class. Never contains `symbol` itself.
pub fn overridden_functions(symbol: &CallableSymbol, scope: &MemberScope) -> Vec<CallableSymbol> {
    let mut result: Vec<CallableSymbol> = Vec::new();
    let _ = scope.process_overridden_functions(symbol, |overridden| {
        if !Arc::ptr_eq(&overridden.symbol, symbol) {
            result.push(overridden.symbol.clone());
        }
        ControlFlow::Continue(())
    });
    result
}

/// One "overrides" edge found by [`debug_collect_overrides`].
#[derive(Clone, Debug)]
pub struct OverrideEdge {
    /// Number of edges between the queried symbol and `overriding`.
    pub depth: usize,
    pub overriding: CallableSymbol,
    pub overridden: CallableSymbol,
}

/// Every override edge below `symbol`, breadth first, for diagnostics.
///
/// Inherited entries are followed through the scope they came from, so the
/// tree reaches the original declarations.
pub fn debug_collect_overrides(
    symbol: &CallableSymbol,
    containing_scope: Arc<MemberScope>,
) -> Vec<OverrideEdge> {
    let mut edges = Vec::new();
    let mut worklist: VecDeque<(CallableSymbol, Arc<MemberScope>, usize)> = VecDeque::new();
    worklist.push_back((symbol.clone(), containing_scope, 0));

    while let Some((current, scope, depth)) = worklist.pop_front() {
        let _ = scope.process_overridden_functions(&current, |overridden| {
            let base = overridden.base_scope.clone();
            if Arc::ptr_eq(&overridden.symbol, &current) {
                // inherited entry: continue from where it was declared
                worklist.push_back((current.clone(), base, depth));
            } else {
                edges.push(OverrideEdge {
                    depth: depth + 1,
                    overriding: current.clone(),
                    overridden: overridden.symbol.clone(),
                });
                worklist.push_back((overridden.symbol.clone(), base, depth + 1));
            }
            ControlFlow::Continue(())
        });
    }
    edges
}
