use crate::eval::{
    error::RuntimeError,
    object::{BuiltinFn, Object},
};
use std::rc::Rc;

const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("len", len),
    ("first", first),
    ("last", last),
    ("rest", rest),
    ("push", push),
];

/// Consulted after the environment chain, so `let` bindings shadow these names.
pub fn lookup(name: &str) -> Option<Object> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(builtin, func)| Object::Builtin(*builtin, *func))
}

fn check_arity(builtin: &'static str, args: &[Object], want: usize) -> Result<(), Object> {
    if args.len() == want {
        Ok(())
    } else {
        Err(RuntimeError::WrongBuiltinArgumentCount {
            builtin,
            got: args.len(),
            want,
        }
        .into())
    }
}

fn array_argument<'a>(
    builtin: &'static str,
    arg: &'a Object,
) -> Result<&'a Rc<Vec<Object>>, Object> {
    match arg {
        Object::Array(elements) => Ok(elements),
        other => Err(RuntimeError::ExpectedArray {
            builtin,
            got: other.object_type(),
        }
        .into()),
    }
}

fn len(args: Vec<Object>) -> Object {
    if let Err(error) = check_arity("len", &args, 1) {
        return error;
    }

    match &args[0] {
        Object::String(s) => Object::Integer(s.chars().count() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => RuntimeError::UnsupportedArgument {
            builtin: "len",
            got: other.object_type(),
        }
        .into(),
    }
}

fn first(args: Vec<Object>) -> Object {
    if let Err(error) = check_arity("first", &args, 1) {
        return error;
    }

    match array_argument("first", &args[0]) {
        Ok(elements) => elements.first().cloned().unwrap_or(Object::Null),
        Err(error) => error,
    }
}

fn last(args: Vec<Object>) -> Object {
    if let Err(error) = check_arity("last", &args, 1) {
        return error;
    }

    match array_argument("last", &args[0]) {
        Ok(elements) => elements.last().cloned().unwrap_or(Object::Null),
        Err(error) => error,
    }
}

fn rest(args: Vec<Object>) -> Object {
    if let Err(error) = check_arity("rest", &args, 1) {
        return error;
    }

    match array_argument("rest", &args[0]) {
        Ok(elements) if elements.is_empty() => Object::Null,
        Ok(elements) => Object::Array(Rc::new(elements[1..].to_vec())),
        Err(error) => error,
    }
}

// Copy-on-write: the argument array is left untouched.
fn push(args: Vec<Object>) -> Object {
    if let Err(error) = check_arity("push", &args, 2) {
        return error;
    }

    match array_argument("push", &args[0]) {
        Ok(elements) => {
            let mut pushed = Vec::with_capacity(elements.len() + 1);
            pushed.extend(elements.iter().cloned());
            pushed.push(args[1].clone());
            Object::Array(Rc::new(pushed))
        }
        Err(error) => error,
    }
}
