use clap::{Args, Parser, Subcommand};
use libmonkey::{
    eval::{object::Object, Evaluator},
    parser::{parse, ParseErrors},
    repl,
};
use std::{io, process::ExitCode};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "monkey", about = "Tree-walking interpreter for the Monkey language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Repl)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start an interactive session (the default).
    Repl,
    /// Evaluate a source file and print its final value.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    file: String,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Parse(#[from] ParseErrors),
    #[error("{0}")]
    Runtime(Object),
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(EnvFilter::from_default_env())
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command() {
        Command::Repl => repl_command(),
        Command::Run(args) => run_command(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", e);
            if !matches!(e, RunError::Parse(_)) {
                eprintln!();
            }
            ExitCode::FAILURE
        }
    }
}

fn repl_command() -> Result<(), RunError> {
    println!("Hello! This is the Monkey programming language!");
    println!("Feel free to type in commands");

    let stdin = io::stdin();
    repl::start(stdin.lock(), io::stdout())?;

    Ok(())
}

fn run_command(args: &RunArgs) -> Result<(), RunError> {
    debug!(file = %args.file, "running file");
    let source = std::fs::read_to_string(&args.file)?;
    let program = parse(&source)?;

    match Evaluator::new().eval(&program) {
        error @ Object::Error(_) => Err(RunError::Runtime(error)),
        Object::Null => Ok(()),
        value => {
            println!("{}", value);
            Ok(())
        }
    }
}
