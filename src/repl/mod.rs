use std::io::{self, BufRead, Write};

use crate::{eval::Evaluator, parser::parse};

pub const PROMPT: &str = ">> ";

/// Reads one line at a time from `input` until EOF, printing each result to
/// `output`. Bindings persist from line to line.
pub fn start<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<()> {
    let mut buffer = String::new();
    let evaluator = Evaluator::new();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        buffer.clear();
        if input.read_line(&mut buffer)? == 0 {
            writeln!(output)?;
            return Ok(());
        }

        match parse(&buffer) {
            Ok(program) => writeln!(output, "{}", evaluator.eval(&program))?,
            Err(errors) => write!(output, "{}", errors)?,
        }
    }
}
