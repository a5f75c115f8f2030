use crate::{
    eval::{
        environment::{Env, Environment},
        error::RuntimeError,
        object::{Function, Object},
    },
    parser::ast::{Block, Expr, Infix, Literal, Prefix, Program, Statement},
    stack::ensure_sufficient_stack,
};
use std::{cell::Cell, rc::Rc};
use tracing::trace;

pub mod builtins;
pub mod environment;
pub mod error;
pub mod object;

/// Calls nested deeper than this evaluate to an error instead of recursing.
pub const MAX_CALL_DEPTH: usize = 4096;

/// Evaluates `program` in `env`, unwrapping a top-level `return`.
pub fn eval(program: &Program, env: &Env) -> Object {
    Evaluator::with_environment(env.clone()).eval(program)
}

/// Owns the root environment that persists across evaluated programs.
pub struct Evaluator {
    environment: Env,
    call_depth: Cell<usize>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_environment(Environment::new().into_shared())
    }

    pub fn with_environment(environment: Env) -> Self {
        Self {
            environment,
            call_depth: Cell::new(0),
        }
    }

    pub fn environment(&self) -> &Env {
        &self.environment
    }

    pub fn eval(&self, program: &Program) -> Object {
        self.eval_program(&program.statements, &self.environment)
    }

    fn eval_program(&self, statements: &[Statement], env: &Env) -> Object {
        let mut result = Object::Null;

        for statement in statements {
            result = self.eval_statement(statement, env);

            match result {
                Object::Return(value) => return *value,
                Object::Error(_) => return result,
                _ => {}
            }
        }

        result
    }

    // Blocks share the enclosing scope. A `Return` stays wrapped so the
    // enclosing call (or the program) can see it.
    fn eval_block(&self, block: &Block, env: &Env) -> Object {
        let mut result = Object::Null;

        for statement in &block.statements {
            result = self.eval_statement(statement, env);

            if result.is_escaping() {
                return result;
            }
        }

        result
    }

    fn returned(maybe_returned: Object) -> Object {
        match maybe_returned {
            Object::Return(object) => *object,
            _ => maybe_returned,
        }
    }

    fn eval_statement(&self, statement: &Statement, env: &Env) -> Object {
        match statement {
            Statement::Let(ident, expr) => {
                let val = self.eval_expr(expr, env);
                if val.is_escaping() {
                    return val;
                }

                env.borrow_mut().set(ident, val);

                Object::Null
            }
            Statement::Return(expr) => {
                let val = match expr {
                    Some(expr) => self.eval_expr(expr, env),
                    None => Object::Null,
                };
                if val.is_escaping() {
                    return val;
                }
                Object::Return(Box::new(val))
            }
            Statement::Expression(expr) => self.eval_expr(expr, env),
            Statement::Block(block) => self.eval_block(block, env),
        }
    }

    fn eval_expr(&self, expr: &Expr, env: &Env) -> Object {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, env))
    }

    fn eval_expr_inner(&self, expr: &Expr, env: &Env) -> Object {
        match expr {
            Expr::Ident(ident) => Self::eval_ident(ident, env),
            Expr::Literal(lit) => Self::eval_literal(lit),
            Expr::Array(elements) => match self.eval_exprs(elements, env) {
                Ok(elements) => Object::Array(Rc::new(elements)),
                Err(escaping) => escaping,
            },
            Expr::Prefix(prefix_op, right) => {
                let right = self.eval_expr(right, env);
                if right.is_escaping() {
                    return right;
                }
                Self::eval_prefix_expr(*prefix_op, right)
            }
            Expr::Infix(infix_op, left, right) => {
                let left = self.eval_expr(left, env);
                if left.is_escaping() {
                    return left;
                }
                let right = self.eval_expr(right, env);
                if right.is_escaping() {
                    return right;
                }
                Self::eval_infix_expr(*infix_op, left, right)
            }
            Expr::If {
                condition,
                consequence,
                alternative,
            } => self.eval_if_expr(condition, consequence, alternative.as_ref(), env),
            Expr::Function { params, body } => Object::Function(Rc::new(Function {
                params: params.clone(),
                body: body.clone(),
                env: env.clone(),
            })),
            Expr::Call {
                function,
                arguments,
            } => {
                let func_object = self.eval_expr(function, env);
                if func_object.is_escaping() {
                    return func_object;
                }
                match self.eval_exprs(arguments, env) {
                    Ok(args) => self.eval_func_application(func_object, args),
                    Err(escaping) => escaping,
                }
            }
            Expr::Index(left, index) => {
                let left = self.eval_expr(left, env);
                if left.is_escaping() {
                    return left;
                }
                let index = self.eval_expr(index, env);
                if index.is_escaping() {
                    return index;
                }
                Self::eval_index_expr(left, index)
            }
        }
    }

    fn eval_ident(ident: &str, env: &Env) -> Object {
        let bound = env.borrow().get(ident);

        bound
            .or_else(|| builtins::lookup(ident))
            .unwrap_or_else(|| RuntimeError::IdentifierNotFound(ident.to_string()).into())
    }

    fn eval_literal(lit: &Literal) -> Object {
        match lit {
            Literal::Int(i) => Object::Integer(*i),
            Literal::Bool(b) => Object::Boolean(*b),
            Literal::String(s) => Object::String(s.clone()),
        }
    }

    /// Evaluates left to right, stopping at the first error or `return`.
    fn eval_exprs(&self, exprs: &[Expr], env: &Env) -> Result<Vec<Object>, Object> {
        let mut objects = Vec::with_capacity(exprs.len());

        for expr in exprs {
            let object = self.eval_expr(expr, env);
            if object.is_escaping() {
                return Err(object);
            }
            objects.push(object);
        }

        Ok(objects)
    }

    fn eval_prefix_expr(prefix: Prefix, right: Object) -> Object {
        match prefix {
            Prefix::Bang => Object::Boolean(!right.is_truthy()),
            Prefix::Minus => match right {
                Object::Integer(i) => Object::Integer(i.wrapping_neg()),
                other => RuntimeError::UnknownPrefixOperator {
                    operator: prefix,
                    operand: other.object_type(),
                }
                .into(),
            },
        }
    }

    fn eval_infix_expr(operator: Infix, left: Object, right: Object) -> Object {
        match (&left, &right) {
            (Object::Integer(left), Object::Integer(right)) => {
                Self::eval_integer_infix_expr(operator, *left, *right)
            }
            (Object::String(left), Object::String(right)) if operator == Infix::Plus => {
                Object::String(format!("{}{}", left, right))
            }
            (Object::Boolean(_) | Object::Null, Object::Boolean(_) | Object::Null)
                if operator == Infix::Equal =>
            {
                Object::Boolean(left == right)
            }
            (Object::Boolean(_) | Object::Null, Object::Boolean(_) | Object::Null)
                if operator == Infix::NotEqual =>
            {
                Object::Boolean(left != right)
            }
            _ if left.object_type() != right.object_type() => RuntimeError::TypeMismatch {
                left: left.object_type(),
                operator,
                right: right.object_type(),
            }
            .into(),
            _ => RuntimeError::UnknownInfixOperator {
                left: left.object_type(),
                operator,
                right: right.object_type(),
            }
            .into(),
        }
    }

    // Arithmetic wraps on overflow like two's-complement hardware.
    fn eval_integer_infix_expr(operator: Infix, left: i64, right: i64) -> Object {
        match operator {
            Infix::Plus => Object::Integer(left.wrapping_add(right)),
            Infix::Minus => Object::Integer(left.wrapping_sub(right)),
            Infix::Multiply => Object::Integer(left.wrapping_mul(right)),
            Infix::Divide if right == 0 => RuntimeError::DivisionByZero.into(),
            Infix::Divide => Object::Integer(left.wrapping_div(right)),
            Infix::LessThan => Object::Boolean(left < right),
            Infix::GreaterThan => Object::Boolean(left > right),
            Infix::Equal => Object::Boolean(left == right),
            Infix::NotEqual => Object::Boolean(left != right),
        }
    }

    fn eval_if_expr(
        &self,
        condition: &Expr,
        consequence: &Block,
        alternative: Option<&Block>,
        env: &Env,
    ) -> Object {
        let condition = self.eval_expr(condition, env);

        if condition.is_escaping() {
            return condition;
        }

        if condition.is_truthy() {
            self.eval_block(consequence, env)
        } else if let Some(alternative) = alternative {
            self.eval_block(alternative, env)
        } else {
            Object::Null
        }
    }

    fn eval_index_expr(left: Object, index: Object) -> Object {
        match (&left, &index) {
            (Object::Array(elements), Object::Integer(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| elements.get(i))
                .cloned()
                .unwrap_or(Object::Null),
            _ => RuntimeError::IndexNotSupported(left.object_type()).into(),
        }
    }

    fn eval_func_application(&self, function: Object, args: Vec<Object>) -> Object {
        match function {
            Object::Function(function) => {
                if function.params.len() != args.len() {
                    return RuntimeError::WrongArgumentCount {
                        want: function.params.len(),
                        got: args.len(),
                    }
                    .into();
                }

                let depth = self.call_depth.get();
                if depth >= MAX_CALL_DEPTH {
                    return RuntimeError::CallDepthExceeded(MAX_CALL_DEPTH).into();
                }
                trace!(arity = args.len(), depth, "applying function");

                let execution_env = Environment::new_with_outer(function.env.clone()).into_shared();
                function.params.iter().zip(args).for_each(|(param, arg)| {
                    execution_env.borrow_mut().set(param, arg);
                });

                self.call_depth.set(depth + 1);
                let result = self.eval_block(&function.body, &execution_env);
                self.call_depth.set(depth);

                Self::returned(result)
            }
            Object::Builtin(name, builtin) => {
                trace!(builtin = name, arity = args.len(), "applying builtin");
                builtin(args)
            }
            other => RuntimeError::NotAFunction(other.object_type()).into(),
        }
    }
}
