use std::io::Write;

use crate::ast::{Program, Routine};

mod error;
mod runtime;
mod value;

pub use error::RuntimeError;

use runtime::Runtime;

/// Tree-walking executor.
///
/// A run is a straight-line sequence of phases: build the empty
/// environment, execute every `begin` routine's action in source order,
/// visit each conditional routine exactly once in source order, execute
/// every `end` routine's action in source order, then stop. The first
/// runtime error aborts the remainder of the run.
pub struct Interpreter<'p> {
    program: &'p Program,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    /// Executes the program, writing one decimal line per `print` to `out`.
    /// Output already written stays in the sink when a later statement
    /// aborts the run.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<(), RuntimeError> {
        let mut runtime = Runtime::new(out);

        for routine in &self.program.routines {
            if let Routine::Begin(action) = routine {
                runtime.exec_action(action)?;
            }
        }

        for routine in &self.program.routines {
            if let Routine::Conditional { condition, action } = routine {
                let holds = match condition {
                    Some(condition) => runtime.condition_holds(condition)?,
                    None => true,
                };
                if holds && let Some(action) = action {
                    runtime.exec_action(action)?;
                }
            }
        }

        for routine in &self.program.routines {
            if let Routine::End(action) = routine {
                runtime.exec_action(action)?;
            }
        }

        runtime.finish()
    }
}
