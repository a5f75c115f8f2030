pub mod eval;
pub mod lexer;
pub mod parser;
pub mod repl;

mod stack;
