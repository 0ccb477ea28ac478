//! Overload resolution driver.
//!
//! Collects the candidates visible for a call, runs every candidate through
//! the resolution stages and keeps the best applicability tier. Candidates
//! own their constraint systems, so a call with several candidates is
//! evaluated in parallel.

use crate::call_info::{CallInfo, Expression, PostponedAtom};
use crate::candidate::Candidate;
use crate::sam::SamConversionInfo;
use crate::sink::{CandidateApplicability, CheckerSink, ResolutionDiagnostic};
use crate::stages::{CheckArguments, MapArguments, ResolutionContext, ResolutionStage};
use kres_common::CallableId;
use kres_types::{
    CallableSymbol, ExpectActual, ResolvePhase, Substitutor, Type, fully_expanded_type, same_symbol,
};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{Level, debug, span, trace};

/// The chosen candidate of a call.
#[derive(Debug)]
pub struct ResolvedCall {
    pub symbol: CallableSymbol,
    /// `Resolved` or `ResolvedLowPriority`.
    pub applicability: CandidateApplicability,
    /// Inferred type argument per type parameter of `symbol`. Variables
    /// without bounds stay variables.
    pub type_arguments: Vec<Type>,
    pub return_type: Type,
    pub sam_conversions: FxHashMap<usize, SamConversionInfo>,
    pub integer_coercions: FxHashMap<usize, Type>,
    pub postponed_atoms: Vec<PostponedAtom>,
    pub diagnostics: Vec<ResolutionDiagnostic>,
}

impl ResolvedCall {
    /// This call as an argument of an enclosing call.
    pub fn as_argument(&self) -> Expression {
        Expression::Call {
            return_type: self.return_type.clone(),
            postponed_atoms: self.postponed_atoms.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RejectedCandidate {
    pub symbol: CallableSymbol,
    pub diagnostics: Vec<ResolutionDiagnostic>,
}

#[derive(Debug)]
pub enum ResolutionResult {
    Resolved(Box<ResolvedCall>),
    /// Several candidates share the best tier.
    Ambiguous(Vec<CallableSymbol>),
    /// Every candidate is inapplicable, or there are none.
    NoApplicableCandidate(Vec<RejectedCandidate>),
}

impl ResolutionResult {
    pub fn resolved(&self) -> Option<&ResolvedCall> {
        match self {
            Self::Resolved(call) => Some(call),
            _ => None,
        }
    }
}

pub struct OverloadResolver {
    context: ResolutionContext,
    stages: Vec<Box<dyn ResolutionStage>>,
}

impl OverloadResolver {
    pub fn new(context: ResolutionContext) -> Self {
        Self::with_stages(context, vec![Box::new(MapArguments), Box::new(CheckArguments)])
    }

    pub fn with_stages(context: ResolutionContext, stages: Vec<Box<dyn ResolutionStage>>) -> Self {
        Self { context, stages }
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    /// Candidates in lookup order: members of the receiver's scope first,
    /// then top-level callables of the call's package. An `expect` callable
    /// is dropped when an `actual` with the same signature came before it.
    pub fn collect_candidates(&self, call: &CallInfo) -> Vec<(CallableSymbol, Substitutor)> {
        let session = &self.context.session;
        let mut found: Vec<(CallableSymbol, Substitutor)> = Vec::new();

        if let Some(receiver) = &call.explicit_receiver {
            let receiver = fully_expanded_type(&receiver.make_not_null(), &**session);
            if let Some((scope, substitutor)) =
                session.scope_cache().scope_for_type(&receiver, ResolvePhase::Status)
            {
                for function in scope.functions_named(&call.callee) {
                    found.push((
                        function.symbol.clone(),
                        substitutor.compose_with(&function.substitutor),
                    ));
                }
            }
        }

        let top_level = CallableId {
            package: call.package.clone(),
            class_name: None,
            callable_name: call.callee.clone(),
        };
        for symbol in session.callables(&top_level).iter() {
            found.push((symbol.clone(), Substitutor::empty()));
        }

        let mut kept: Vec<(CallableSymbol, Substitutor)> = Vec::with_capacity(found.len());
        for (symbol, substitutor) in found {
            if kept.iter().any(|(seen, _)| same_symbol(seen, &symbol)) {
                continue;
            }
            if symbol.expect_actual == ExpectActual::Expect
                && kept.iter().any(|(seen, _)| {
                    seen.expect_actual == ExpectActual::Actual && seen.has_same_signature(&symbol)
                })
            {
                trace!(expect = %symbol.id, "shadowed by actual");
                continue;
            }
            kept.push((symbol, substitutor));
        }
        kept
    }

    /// Run one candidate through the stages.
    pub fn evaluate(
        &self,
        symbol: CallableSymbol,
        receiver_substitutor: Substitutor,
        call: &CallInfo,
    ) -> (Candidate, CheckerSink) {
        let mut candidate = Candidate::new(
            symbol,
            self.context.constraint_systems.new_system(),
            receiver_substitutor,
        );
        let mut sink = CheckerSink::new();
        for stage in &self.stages {
            stage.check(&mut candidate, call, &mut sink, &self.context);
            if sink.should_stop() {
                trace!(stage = stage.name(), candidate = %candidate.symbol.id, "stopped");
                break;
            }
        }
        debug!(
            candidate = %candidate.symbol.id,
            applicability = ?sink.current_applicability(),
            "candidate evaluated"
        );
        (candidate, sink)
    }

    pub fn resolve(&self, call: &CallInfo) -> ResolutionResult {
        let _span = span!(Level::DEBUG, "resolve_call", callee = %call.callee).entered();

        let sources = self.collect_candidates(call);
        let evaluated: Vec<(Candidate, CheckerSink)> = if sources.len() > 1 {
            sources
                .into_par_iter()
                .map(|(symbol, substitutor)| self.evaluate(symbol, substitutor, call))
                .collect()
        } else {
            sources
                .into_iter()
                .map(|(symbol, substitutor)| self.evaluate(symbol, substitutor, call))
                .collect()
        };

        let best = evaluated
            .iter()
            .map(|(_, sink)| sink.current_applicability())
            .min()
            .unwrap_or(CandidateApplicability::Inapplicable);
        if best == CandidateApplicability::Inapplicable {
            debug!(candidates = evaluated.len(), "no applicable candidate");
            return ResolutionResult::NoApplicableCandidate(
                evaluated
                    .into_iter()
                    .map(|(candidate, sink)| RejectedCandidate {
                        symbol: candidate.symbol,
                        diagnostics: sink.into_diagnostics(),
                    })
                    .collect(),
            );
        }

        let winners: Vec<(Candidate, CheckerSink)> = evaluated
            .into_iter()
            .filter(|(_, sink)| sink.current_applicability() == best)
            .collect();
        match <[_; 1]>::try_from(winners) {
            Ok([(candidate, sink)]) => {
                ResolutionResult::Resolved(Box::new(complete(candidate, sink, best)))
            }
            Err(winners) => {
                debug!(candidates = winners.len(), "ambiguous call");
                ResolutionResult::Ambiguous(
                    winners.into_iter().map(|(candidate, _)| candidate.symbol).collect(),
                )
            }
        }
    }
}

fn complete(
    mut candidate: Candidate,
    sink: CheckerSink,
    applicability: CandidateApplicability,
) -> ResolvedCall {
    let solution = candidate.system.current_substitutor();
    let type_arguments = candidate
        .symbol
        .type_parameters
        .iter()
        .filter_map(|name| candidate.substitutor.parameter(name))
        .map(|variable| solution.substitute_or_self(variable))
        .collect();
    let return_type = solution.substitute_or_self(&candidate.return_type());
    ResolvedCall {
        symbol: candidate.symbol,
        applicability,
        type_arguments,
        return_type,
        sam_conversions: candidate.sam_conversions,
        integer_coercions: candidate.integer_coercions,
        postponed_atoms: candidate.postponed_atoms,
        diagnostics: sink.into_diagnostics(),
    }
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
