use crate::{
    eval::object::ObjectType,
    parser::ast::{Infix, Prefix},
};
use thiserror::Error;

/// Faults raised while evaluating. They travel as [`Object::Error`] values,
/// never as panics.
///
/// [`Object::Error`]: crate::eval::object::Object::Error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: Infix,
        right: ObjectType,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: Infix,
        right: ObjectType,
    },
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: Prefix,
        operand: ObjectType,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("wrong number of arguments: want={want}, got={got}")]
    WrongArgumentCount { want: usize, got: usize },
    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),
    #[error("wrong number of arguments to `{builtin}`. got={got}, want={want}")]
    WrongBuiltinArgumentCount {
        builtin: &'static str,
        got: usize,
        want: usize,
    },
    #[error("argument to `{builtin}` not supported, got {got}")]
    UnsupportedArgument {
        builtin: &'static str,
        got: ObjectType,
    },
    #[error("argument to `{builtin}` must be ARRAY, got {got}")]
    ExpectedArray {
        builtin: &'static str,
        got: ObjectType,
    },
}
