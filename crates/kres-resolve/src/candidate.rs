//! Call candidates.
//!
//! A candidate pairs one callable with everything argument checking learns
//! about it: its own constraint system, the substitutor from the callable's
//! type parameters to fresh type variables, the argument mapping, and the
//! SAM adaptations and integer coercions applied to individual arguments.

use crate::call_info::PostponedAtom;
use crate::constraints::ConstraintSystem;
use crate::mapping::ArgumentMapping;
use crate::sam::SamConversionInfo;
use kres_types::{CallableSymbol, Substitutor, Type};
use rustc_hash::FxHashMap;

#[derive(Debug)]
pub struct Candidate {
    pub symbol: CallableSymbol,
    pub system: Box<dyn ConstraintSystem>,
    /// Type parameters of `symbol` to this candidate's type variables, and
    /// for members, the owner's type parameters to the receiver's arguments.
    pub substitutor: Substitutor,
    pub argument_mapping: ArgumentMapping,
    /// Keyed by argument index.
    pub sam_conversions: FxHashMap<usize, SamConversionInfo>,
    /// Expected type used for an integer-coerced argument, keyed by argument
    /// index.
    pub integer_coercions: FxHashMap<usize, Type>,
    /// Function type of the `invoke` through which a value argument was
    /// adapted, keyed by argument index.
    pub invoke_conversions: FxHashMap<usize, Type>,
    pub postponed_atoms: Vec<PostponedAtom>,
}

impl Candidate {
    /// Candidate with one fresh variable per type parameter of `symbol`.
    /// `receiver_substitutor` carries the receiver's type arguments for
    /// members and is empty otherwise.
    pub fn new(
        symbol: CallableSymbol,
        mut system: Box<dyn ConstraintSystem>,
        receiver_substitutor: Substitutor,
    ) -> Self {
        let mut substitutor = receiver_substitutor;
        for name in &symbol.type_parameters {
            let variable = system.fresh_variable();
            substitutor.bind_parameter(name.clone(), Type::variable(variable));
        }
        Self {
            symbol,
            system,
            substitutor,
            argument_mapping: ArgumentMapping::default(),
            sam_conversions: FxHashMap::default(),
            integer_coercions: FxHashMap::default(),
            invoke_conversions: FxHashMap::default(),
            postponed_atoms: Vec::new(),
        }
    }

    pub fn uses_sam_conversion(&self) -> bool {
        !self.sam_conversions.is_empty()
    }

    /// Foreign callables are adapted under their own rules and are never
    /// demoted.
    pub fn should_have_low_priority_due_to_sam(&self) -> bool {
        self.uses_sam_conversion()
            && !self.symbol.origin.is_foreign()
            && self
                .sam_conversions
                .values()
                .any(|conversion| conversion.origin.is_foreign())
    }

    /// Declared return type in terms of this candidate's variables.
    pub fn return_type(&self) -> Type {
        self.substitutor.substitute_or_self(&self.symbol.return_type)
    }
}
