//! Syntax tree produced by the parser and walked by the evaluator.
//!
//! Every node renders back to source text through `Display`. The rendering
//! fully parenthesizes prefix and infix expressions, so re-parsing it yields
//! the same tree.

use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};

pub type Ident = String;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn token_literal(&self) -> String {
        self.statements
            .first()
            .map(Statement::token_literal)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Let(Ident, Expr),
    Return(Option<Expr>),
    Expression(Expr),
    Block(Block),
}

impl Statement {
    pub fn token_literal(&self) -> String {
        match self {
            Statement::Let(..) => "let".to_string(),
            Statement::Return(_) => "return".to_string(),
            Statement::Expression(expr) => expr.token_literal(),
            Statement::Block(_) => "{".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(Ident),
    Literal(Literal),
    Array(Vec<Expr>),
    Prefix(Prefix, Box<Expr>),
    Infix(Infix, Box<Expr>, Box<Expr>),
    If {
        condition: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },
    /// Parameters and body sit behind `Rc` so closures can share them.
    Function {
        params: Rc<[Ident]>,
        body: Rc<Block>,
    },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Index(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn token_literal(&self) -> String {
        match self {
            Expr::Ident(ident) => ident.clone(),
            Expr::Literal(Literal::Int(int)) => int.to_string(),
            Expr::Literal(Literal::String(s)) => s.clone(),
            Expr::Literal(Literal::Bool(b)) => b.to_string(),
            Expr::Array(_) | Expr::Index(..) => "[".to_string(),
            Expr::Prefix(prefix, _) => prefix.to_string(),
            Expr::Infix(infix, ..) => infix.to_string(),
            Expr::If { .. } => "if".to_string(),
            Expr::Function { .. } => "fn".to_string(),
            Expr::Call { .. } => "(".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    String(String),
    Bool(bool),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Prefix {
    Minus,
    Bang,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Infix {
    Plus,
    Minus,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
}

impl Infix {
    pub fn precedence(self) -> Precedence {
        match self {
            Infix::Equal | Infix::NotEqual => Precedence::Equals,
            Infix::GreaterThan | Infix::LessThan => Precedence::LessGreater,
            Infix::Plus | Infix::Minus => Precedence::Sum,
            Infix::Multiply | Infix::Divide => Precedence::Product,
        }
    }
}

/// Binding power, weakest first. Call and index share the strongest level.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements)
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return write!(f, "{{ }}");
        }
        write!(f, "{{ ")?;
        write_statements(f, &self.statements)?;
        write!(f, " }}")
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(ident, expr) => write!(f, "let {} = {}", ident, expr),
            Statement::Return(Some(expr)) => write!(f, "return {}", expr),
            Statement::Return(None) => write!(f, "return"),
            Statement::Expression(expr) => write!(f, "{}", expr),
            Statement::Block(block) => write!(f, "{}", block),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(ident) => write!(f, "{}", ident),
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Array(elements) => {
                write!(f, "[")?;
                write_separated(f, elements)?;
                write!(f, "]")
            }
            Expr::Prefix(prefix, right) => write!(f, "({}{})", prefix, right),
            Expr::Infix(infix, left, right) => write!(f, "({} {} {})", left, infix, right),
            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if ({}) {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Expr::Function { params, body } => write!(f, "fn({}) {}", params.join(", "), body),
            Expr::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                write_separated(f, arguments)?;
                write!(f, ")")
            }
            Expr::Index(left, index) => write!(f, "({}[{}])", left, index),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(int) => write!(f, "{}", int),
            Literal::String(s) => write!(f, r#""{}""#, s),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Minus => write!(f, "-"),
            Prefix::Bang => write!(f, "!"),
        }
    }
}

impl Display for Infix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Infix::Plus => write!(f, "+"),
            Infix::Minus => write!(f, "-"),
            Infix::Multiply => write!(f, "*"),
            Infix::Divide => write!(f, "/"),
            Infix::Equal => write!(f, "=="),
            Infix::NotEqual => write!(f, "!="),
            Infix::GreaterThan => write!(f, ">"),
            Infix::LessThan => write!(f, "<"),
        }
    }
}

// Statements are joined with `; ` so expression statements never run together.
fn write_statements(f: &mut Formatter<'_>, statements: &[Statement]) -> fmt::Result {
    for (i, statement) in statements.iter().enumerate() {
        if i > 0 {
            write!(f, "; ")?;
        }
        write!(f, "{}", statement)?;
    }
    Ok(())
}

fn write_separated(f: &mut Formatter<'_>, exprs: &[Expr]) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", expr)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Ident(name.to_string()))
    }

    #[test]
    fn let_statement_rendering() {
        let program = Program {
            statements: vec![Statement::Let(
                "myVar".to_string(),
                Expr::Ident("anotherVar".to_string()),
            )],
        };

        assert_eq!(program.to_string(), "let myVar = anotherVar");
        assert_eq!(program.token_literal(), "let");
    }

    #[test]
    fn nested_rendering() {
        let program = Program {
            statements: vec![
                Statement::Expression(Expr::Infix(
                    Infix::Multiply,
                    Box::new(Expr::Prefix(Prefix::Minus, ident("a"))),
                    ident("b"),
                )),
                Statement::Return(None),
                Statement::Expression(Expr::Function {
                    params: Rc::from(vec!["x".to_string(), "y".to_string()]),
                    body: Rc::new(Block {
                        statements: vec![Statement::Expression(Expr::Index(
                            ident("x"),
                            ident("y"),
                        ))],
                    }),
                }),
            ],
        };

        assert_eq!(
            program.to_string(),
            "((-a) * b); return; fn(x, y) { (x[y]) }"
        );
    }

    #[test]
    fn token_literals() {
        let test_data = vec![
            (Expr::Literal(Literal::Int(5)), "5"),
            (Expr::Literal(Literal::String("hi".to_string())), "hi"),
            (Expr::Literal(Literal::Bool(false)), "false"),
            (Expr::Prefix(Prefix::Bang, ident("x")), "!"),
            (Expr::Infix(Infix::NotEqual, ident("a"), ident("b")), "!="),
            (Expr::Array(vec![]), "["),
            (
                Expr::Call {
                    function: ident("f"),
                    arguments: vec![],
                },
                "(",
            ),
        ];

        test_data
            .into_iter()
            .for_each(|(expr, expected)| assert_eq!(expr.token_literal(), expected));

        assert_eq!(Program::default().token_literal(), "");
        assert_eq!(Statement::Block(Block::default()).to_string(), "{ }");
    }
}
