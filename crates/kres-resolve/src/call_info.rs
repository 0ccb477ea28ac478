//! Call sites and their syntactic arguments.
//!
//! Arguments arrive partially analysed: typed expressions carry their static
//! type, while lambdas and callable references are still unresolved and get
//! their type from the parameter they are matched with.

use kres_common::{FqName, Name, Span};
use kres_types::standard::{FunctionKind, function_type};
use kres_types::{CallableSymbol, Type, TypeConstructor};

/// Atom of a nested call that is analysed after the outer call is chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PostponedAtom {
    /// A lambda whose expected type is a type variable of the call it is
    /// passed to, e.g. the `{ {} }` block in `run { {} }`.
    LambdaWithTypeVariableAsExpectedType { expected_type: Type },
}

impl PostponedAtom {
    pub fn expected_type(&self) -> &Type {
        match self {
            Self::LambdaWithTypeVariableAsExpectedType { expected_type } => expected_type,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Expression {
    /// Anonymous function literal with an explicit parameter count.
    Lambda { parameters: usize },
    /// `::target`. The reference is typed through its target's signature.
    CallableReference { target: CallableSymbol },
    /// A call already resolved to a candidate. `return_type` may be a type
    /// variable of the nested call's own system.
    Call {
        return_type: Type,
        postponed_atoms: Vec<PostponedAtom>,
    },
    IntegerLiteral(i64),
    /// Arithmetic over integer literals, still typed as a literal.
    IntegerOperatorCall { value: i64 },
    /// Reference to a property, possibly a `const val`.
    PropertyReference { symbol: CallableSymbol },
    /// Any other expression with a known static type.
    Typed(Type),
}

impl Expression {
    /// Statically known type, `None` for lambdas.
    pub fn resolved_type(&self) -> Option<Type> {
        match self {
            Self::Lambda { .. } => None,
            Self::CallableReference { target } => Some(callable_reference_type(target)),
            Self::Call { return_type, .. } => Some(return_type.clone()),
            Self::IntegerLiteral(value) | Self::IntegerOperatorCall { value } => {
                Some(Type::integer_literal(*value))
            }
            Self::PropertyReference { symbol } => Some(symbol.return_type.clone()),
            Self::Typed(ty) => Some(ty.clone()),
        }
    }

    pub const fn is_lambda_or_callable_reference(&self) -> bool {
        matches!(self, Self::Lambda { .. } | Self::CallableReference { .. })
    }

    pub const fn is_integer_literal_or_operator_call(&self) -> bool {
        matches!(
            self,
            Self::IntegerLiteral(_) | Self::IntegerOperatorCall { .. }
        )
    }

    /// A generic call whose return type is the expected type of one of its
    /// own not yet analysed lambdas.
    pub fn is_call_with_generic_return_type_and_matching_lambda(&self) -> bool {
        let Self::Call {
            return_type,
            postponed_atoms,
        } = self
        else {
            return false;
        };
        let constructor = return_type.type_constructor();
        matches!(constructor, TypeConstructor::Variable(_))
            && postponed_atoms
                .iter()
                .any(|atom| atom.expected_type().type_constructor() == constructor)
    }
}

/// `KFunctionN<receiver?, P1.., R>` for a reference to `target`.
pub fn callable_reference_type(target: &CallableSymbol) -> Type {
    let parameters = target
        .receiver_type
        .iter()
        .cloned()
        .chain(target.value_parameters.iter().map(|parameter| parameter.ty.clone()))
        .collect();
    function_type(FunctionKind::KFunction, parameters, target.return_type.clone())
}

#[derive(Clone, Debug)]
pub struct CallArgument {
    /// `name = value`
    pub name: Option<Name>,
    /// `*value`. A spread argument carries the element type of the spread
    /// collection as its static type.
    pub spread: bool,
    pub expression: Expression,
}

impl CallArgument {
    pub fn positional(expression: Expression) -> Self {
        Self {
            name: None,
            spread: false,
            expression,
        }
    }

    pub fn named(name: &str, expression: Expression) -> Self {
        Self {
            name: Some(Name::identifier(name)),
            spread: false,
            expression,
        }
    }

    pub fn spread(expression: Expression) -> Self {
        Self {
            name: None,
            spread: true,
            expression,
        }
    }
}

/// One call site.
#[derive(Clone, Debug)]
pub struct CallInfo {
    pub callee: Name,
    /// Package searched for top-level callables.
    pub package: FqName,
    /// `receiver.callee(..)`: members are looked up in the receiver's scope.
    pub explicit_receiver: Option<Type>,
    pub arguments: Vec<CallArgument>,
    pub span: Span,
}

impl CallInfo {
    pub fn new(callee: &str, arguments: Vec<CallArgument>) -> Self {
        Self {
            callee: Name::identifier(callee),
            package: FqName::root(),
            explicit_receiver: None,
            arguments,
            span: Span::default(),
        }
    }

    #[must_use]
    pub fn in_package(mut self, package: &str) -> Self {
        self.package = FqName::new(package);
        self
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: Type) -> Self {
        self.explicit_receiver = Some(receiver);
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}
