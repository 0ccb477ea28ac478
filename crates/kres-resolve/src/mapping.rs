//! Argument-to-parameter mapping.
//!
//! Positional arguments fill parameters left to right; a vararg parameter
//! absorbs every remaining positional argument. Named arguments go to the
//! parameter with that name. Problems are reported to the sink and leave the
//! offending argument unmapped.

use crate::call_info::CallInfo;
use crate::sink::{CheckerSink, ResolutionDiagnostic};
use kres_types::CallableDecl;
use smallvec::SmallVec;

/// Parameter index of each call argument, in argument order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgumentMapping {
    parameters: SmallVec<[Option<usize>; 4]>,
}

impl ArgumentMapping {
    pub fn parameter_of(&self, argument: usize) -> Option<usize> {
        self.parameters.get(argument).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Mapped parameter indices, one per argument that has one.
    pub fn mapped_parameters(&self) -> impl Iterator<Item = usize> + '_ {
        self.parameters.iter().filter_map(|parameter| *parameter)
    }
}

pub fn map_arguments(call: &CallInfo, callable: &CallableDecl, sink: &mut CheckerSink) -> ArgumentMapping {
    let parameters = &callable.value_parameters;
    let mut mapping = ArgumentMapping::default();
    let mut assigned = vec![false; parameters.len()];
    let mut next_positional = 0usize;
    let mut seen_named = false;
    let mut too_many_reported = false;

    for (index, argument) in call.arguments.iter().enumerate() {
        let target = match &argument.name {
            Some(name) => {
                seen_named = true;
                match parameters.iter().position(|parameter| &parameter.name == name) {
                    Some(position) if assigned[position] && !parameters[position].is_vararg => {
                        sink.report(ResolutionDiagnostic::ArgumentPassedTwice { name: name.clone() });
                        None
                    }
                    Some(position) => Some(position),
                    None => {
                        sink.report(ResolutionDiagnostic::NamedParameterNotFound {
                            name: name.clone(),
                        });
                        None
                    }
                }
            }
            None if seen_named => {
                sink.report(ResolutionDiagnostic::MixingNamedAndPositionalArguments);
                None
            }
            None => match parameters.get(next_positional) {
                Some(parameter) => {
                    let position = next_positional;
                    if !parameter.is_vararg {
                        next_positional += 1;
                    }
                    Some(position)
                }
                None => {
                    if !too_many_reported {
                        too_many_reported = true;
                        sink.report(ResolutionDiagnostic::TooManyArguments {
                            count: call.arguments.len(),
                        });
                    }
                    None
                }
            },
        };

        let target = target.filter(|position| {
            if argument.spread && !parameters[*position].is_vararg {
                sink.report(ResolutionDiagnostic::NonVarargSpread { argument: index });
                false
            } else {
                true
            }
        });
        if let Some(position) = target {
            assigned[position] = true;
        }
        mapping.parameters.push(target);
    }

    for (parameter, assigned) in parameters.iter().zip(&assigned) {
        if !assigned && !parameter.has_default_value && !parameter.is_vararg {
            sink.report(ResolutionDiagnostic::NoValueForParameter {
                name: parameter.name.clone(),
            });
        }
    }
    mapping
}

#[cfg(test)]
#[path = "../tests/mapping_tests.rs"]
mod tests;
