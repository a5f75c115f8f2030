use crate::{
    eval::{environment::Env, error::RuntimeError},
    parser::ast::{Block, Ident},
};
use std::{
    fmt::{self, Debug, Display, Formatter},
    rc::Rc,
};

pub type BuiltinFn = fn(Vec<Object>) -> Object;

#[derive(Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Rc<Vec<Object>>),
    Function(Rc<Function>),
    Builtin(&'static str, BuiltinFn),
    Return(Box<Object>),
    Error(RuntimeError),
    Null,
}

/// A closure: parameters and body shared with the defining literal, plus the
/// environment that was active where the literal was evaluated.
pub struct Function {
    pub params: Rc<[Ident]>,
    pub body: Rc<Block>,
    pub env: Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Array,
    Function,
    Builtin,
    ReturnValue,
    Error,
    Null,
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Integer => write!(f, "INTEGER"),
            ObjectType::Boolean => write!(f, "BOOLEAN"),
            ObjectType::String => write!(f, "STRING"),
            ObjectType::Array => write!(f, "ARRAY"),
            ObjectType::Function => write!(f, "FUNCTION"),
            ObjectType::Builtin => write!(f, "BUILTIN"),
            ObjectType::ReturnValue => write!(f, "RETURN_VALUE"),
            ObjectType::Error => write!(f, "ERROR"),
            ObjectType::Null => write!(f, "NULL"),
        }
    }
}

impl Object {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(..) => ObjectType::Builtin,
            Object::Return(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
            Object::Null => ObjectType::Null,
        }
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// `Return` and `Error` unwind through every enclosing expression until
    /// a call boundary (or the program) takes them.
    pub fn is_escaping(&self) -> bool {
        matches!(self, Object::Return(_) | Object::Error(_))
    }
}

impl From<RuntimeError> for Object {
    fn from(error: RuntimeError) -> Self {
        Object::Error(error)
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(int) => write!(f, "{}", int),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::String(s) => write!(f, "{}", s),
            Object::Array(elements) => write!(
                f,
                "[{}]",
                elements
                    .iter()
                    .map(|object| object.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Object::Function(function) => {
                write!(f, "fn({}) {}", function.params.join(", "), function.body)
            }
            Object::Builtin(name, _) => write!(f, "builtin function: {}", name),
            Object::Return(ret) => write!(f, "{}", ret),
            Object::Error(e) => write!(f, "ERROR: {}", e),
            Object::Null => write!(f, "null"),
        }
    }
}

// Hand-written so a closure stored in its own environment doesn't recurse forever.
impl Debug for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(int) => write!(f, "Object::Integer({})", int),
            Object::Boolean(b) => write!(f, "Object::Boolean({})", b),
            Object::String(s) => write!(f, r#"Object::String("{}")"#, s),
            Object::Array(elements) => write!(f, "Object::Array({:?})", elements),
            Object::Function(function) => write!(
                f,
                "Object::Function(fn({}) {})",
                function.params.join(", "),
                function.body
            ),
            Object::Builtin(name, _) => write!(f, "Object::Builtin({})", name),
            Object::Return(ret) => write!(f, "Object::Return({:?})", ret),
            Object::Error(e) => write!(f, "Object::Error({:?})", e.to_string()),
            Object::Null => write!(f, "Object::Null"),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(name_a, _), Object::Builtin(name_b, _)) => name_a == name_b,
            (Object::Return(a), Object::Return(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            (Object::Null, Object::Null) => true,
            _ => false,
        }
    }
}
