use std::collections::HashMap;
use std::io::Write;

use crate::ast::{Action, BinaryOperator, Expression, Identifier, Statement};

use super::error::RuntimeError;
use super::value::Value;

/// Storage for one name. The first assignment fixes the kind; every later
/// access re-checks it, since a program could alternate erroneously.
enum Slot {
    Scalar(i64),
    Array(HashMap<i64, i64>),
}

/// Mutable store of all scalar and array bindings for one run.
///
/// Reads of an unbound scalar or unset array index yield 0 and do not
/// create a binding.
pub(super) struct Environment {
    slots: HashMap<String, Slot>,
}

impl Environment {
    pub(super) fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    fn read_scalar(&self, name: &str) -> Result<i64, RuntimeError> {
        match self.slots.get(name) {
            Some(Slot::Scalar(value)) => Ok(*value),
            Some(Slot::Array(_)) => Err(kind_conflict(name)),
            None => Ok(0),
        }
    }

    fn read_element(&self, name: &str, index: i64) -> Result<i64, RuntimeError> {
        match self.slots.get(name) {
            Some(Slot::Array(entries)) => Ok(entries.get(&index).copied().unwrap_or(0)),
            Some(Slot::Scalar(_)) => Err(kind_conflict(name)),
            None => Ok(0),
        }
    }

    fn write_scalar(&mut self, name: &str, value: i64) -> Result<(), RuntimeError> {
        match self.slots.get_mut(name) {
            Some(Slot::Scalar(slot)) => {
                *slot = value;
                Ok(())
            }
            Some(Slot::Array(_)) => Err(kind_conflict(name)),
            None => {
                self.slots.insert(name.to_string(), Slot::Scalar(value));
                Ok(())
            }
        }
    }

    fn write_element(&mut self, name: &str, index: i64, value: i64) -> Result<(), RuntimeError> {
        match self.slots.get_mut(name) {
            Some(Slot::Array(entries)) => {
                entries.insert(index, value);
                Ok(())
            }
            Some(Slot::Scalar(_)) => Err(kind_conflict(name)),
            None => {
                let mut entries = HashMap::new();
                entries.insert(index, value);
                self.slots.insert(name.to_string(), Slot::Array(entries));
                Ok(())
            }
        }
    }
}

fn kind_conflict(name: &str) -> RuntimeError {
    RuntimeError::NameKindConflict {
        name: name.to_string(),
    }
}

/// Computes the integer value of an expression against the current
/// environment. Operands evaluate left before right; arithmetic wraps on
/// the native signed width.
pub(super) fn evaluate(
    expression: &Expression,
    environment: &Environment,
) -> Result<Value, RuntimeError> {
    match expression {
        Expression::Literal(value) => Ok(Value::Integer(*value)),
        Expression::Var(identifier) => read_identifier(identifier, environment),
        Expression::BinOp { op, left, right } => {
            let left = evaluate(left, environment)?;
            let right = evaluate(right, environment)?;
            apply_operator(*op, left, right)
        }
    }
}

fn read_identifier(
    identifier: &Identifier,
    environment: &Environment,
) -> Result<Value, RuntimeError> {
    let value = match identifier {
        Identifier::Scalar(name) => environment.read_scalar(name)?,
        Identifier::Array(name, index) => {
            let index = evaluate(index, environment)?.as_int();
            environment.read_element(name, index)?
        }
    };
    Ok(Value::Integer(value))
}

fn apply_operator(op: BinaryOperator, left: Value, right: Value) -> Result<Value, RuntimeError> {
    let (l, r) = (left.as_int(), right.as_int());
    Ok(match op {
        BinaryOperator::Add => Value::Integer(l.wrapping_add(r)),
        BinaryOperator::Sub => Value::Integer(l.wrapping_sub(r)),
        BinaryOperator::Mul => Value::Integer(l.wrapping_mul(r)),
        BinaryOperator::Div => {
            if r == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Value::Integer(l.wrapping_div(r))
        }
        BinaryOperator::Greater => Value::from_bool(l > r),
        BinaryOperator::GreaterEqual => Value::from_bool(l >= r),
        BinaryOperator::Less => Value::from_bool(l < r),
        BinaryOperator::LessEqual => Value::from_bool(l <= r),
        BinaryOperator::EqualEqual => Value::from_bool(l == r),
    })
}

/// Statement executor. Owns the environment and the output sink for the
/// duration of one run; output is written synchronously in statement order.
pub(super) struct Runtime<'a, W: Write> {
    environment: Environment,
    out: &'a mut W,
}

impl<'a, W: Write> Runtime<'a, W> {
    pub(super) fn new(out: &'a mut W) -> Self {
        Self {
            environment: Environment::new(),
            out,
        }
    }

    pub(super) fn exec_action(&mut self, action: &Action) -> Result<(), RuntimeError> {
        for statement in &action.statements {
            self.exec_statement(statement)?;
        }
        Ok(())
    }

    fn exec_statement(&mut self, statement: &Statement) -> Result<(), RuntimeError> {
        match statement {
            Statement::Print(expression) => {
                let value = evaluate(expression, &self.environment)?;
                writeln!(self.out, "{value}")?;
                Ok(())
            }
            Statement::Assign { target, value } => {
                let value = evaluate(value, &self.environment)?.as_int();
                match target {
                    Identifier::Scalar(name) => self.environment.write_scalar(name, value),
                    Identifier::Array(name, index) => {
                        let index = evaluate(index, &self.environment)?.as_int();
                        self.environment.write_element(name, index, value)
                    }
                }
            }
        }
    }

    pub(super) fn condition_holds(&self, condition: &Expression) -> Result<bool, RuntimeError> {
        Ok(evaluate(condition, &self.environment)?.is_truthy())
    }

    pub(super) fn finish(&mut self) -> Result<(), RuntimeError> {
        Ok(self.out.flush()?)
    }
}
