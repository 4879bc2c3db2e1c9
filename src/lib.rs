pub mod ast;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;

use std::io::Write;

use thiserror::Error;

use crate::interpreter::{Interpreter, RuntimeError};
use crate::lexer::LexError;
use crate::parser::SyntaxError;

/// Any fatal error surfaced by the pipeline. Each stage keeps its own
/// structured type; this enum is what `run_program` and the CLI see.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Runs `source` through the whole pipeline — tokenize, parse, execute —
/// writing program output to `out`.
pub fn run_program<W: Write>(source: &str, out: &mut W) -> Result<(), Error> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse_tokens(tokens)?;
    Interpreter::new(&program).run(out)?;
    Ok(())
}
