use thiserror::Error;

/// Typed errors produced while executing a program. Every one of them is
/// fatal: the run aborts at the first error and no further statements
/// execute.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Variable '{name}' is used as both a scalar and an array")]
    NameKindConflict { name: String },
    #[error("Writing program output failed")]
    Output(#[from] std::io::Error),
}
