use std::cmp::Ordering;

use log::debug;

use crate::{
    ast::{BinOp, Expr, Literal, OpKind},
    config::Config,
    error::DrlError,
    functions::lookup_function,
    resolver::Resolver,
    value::Value,
};

/// Walks an expression tree against a read-only context.
///
/// The evaluator holds no state of its own; everything it needs is the
/// context, the config and the function registries.
pub struct Evaluator<'a> {
    context: &'a Value,
    config: &'a Config,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a Value, config: &'a Config) -> Self {
        Evaluator { context, config }
    }

    pub fn eval_expr(&self, expr: &Expr) -> Result<Value, DrlError> {
        match expr {
            Expr::Literal(literal) => eval_literal(literal),
            Expr::Reference {
                path,
                behavior,
                position,
            } => Resolver::new(self.context, self.config)
                .resolve(path, *behavior, 0)
                .map_err(|e| e.with_position(*position)),
            Expr::Identifier(name) => Ok(Value::String(name.clone())),
            Expr::Not(operand) => {
                let value = self.eval_expr(operand)?;
                Ok(Value::Boolean(!value.is_truthy()))
            }
            Expr::BinaryOp { op, left, right } => {
                // Both sides are always evaluated, left first
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                apply_binop(*op, &left, &right)
            }
            Expr::Call {
                name,
                args,
                position,
            } => self.eval_call(name, args, *position),
        }
    }

    fn eval_call(&self, name: &str, args: &[Expr], position: usize) -> Result<Value, DrlError> {
        let mut values = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let value = self.eval_expr(arg).map_err(|e| {
                e.within(format!("While evaluating argument {} of '{}'", i + 1, name))
            })?;
            values.push(value);
        }

        let Some(function) = lookup_function(name, Some(self.config)) else {
            return Err(DrlError::name(format!("Function '{}' not found", name))
                .with_position(position)
                .with_context("Register it globally or on the Config before use"));
        };

        let values = function.signature().coerce(values);
        debug!("calling '{}' with {} argument(s)", name, values.len());
        function
            .call(values)
            .map_err(|e| e.with_position(position).within(format!("Error in function '{}'", name)))
    }
}

fn eval_literal(literal: &Literal) -> Result<Value, DrlError> {
    match literal {
        Literal::String(s) => Ok(Value::String(s.clone())),
        Literal::Boolean(b) => Ok(Value::Boolean(*b)),
        Literal::Number(text) if text.contains('.') => text
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| DrlError::type_error(format!("Invalid number '{}'", text))),
        Literal::Number(text) => text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| DrlError::type_error(format!("Integer literal '{}' out of range", text))),
    }
}

/// Both operands as floats, when both are numbers.
fn as_floats(left: &Value, right: &Value) -> Option<(f64, f64)> {
    Some((left.as_float()?, right.as_float()?))
}

fn is_zero(value: &Value) -> bool {
    matches!(value, Value::Integer(0)) || matches!(value, Value::Float(n) if *n == 0.0)
}

fn overflow(op: BinOp) -> DrlError {
    DrlError::type_error(format!("Integer overflow in '{}'", op.symbol()))
}

fn operand_error(verb: &str, op: BinOp, left: &Value, right: &Value) -> DrlError {
    DrlError::type_error(format!(
        "Cannot {} {} and {} with '{}'",
        verb,
        left.type_name(),
        right.type_name(),
        op.symbol()
    ))
}

/// Applies a binary operator to two evaluated operands.
pub(crate) fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, DrlError> {
    match op.kind() {
        OpKind::Arithmetic => apply_arithmetic(op, left, right),
        OpKind::Comparison => apply_comparison(op, left, right),
        OpKind::Logical => {
            let result = match op {
                BinOp::And => left.is_truthy() && right.is_truthy(),
                _ => left.is_truthy() || right.is_truthy(),
            };
            Ok(Value::Boolean(result))
        }
    }
}

fn apply_arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, DrlError> {
    match op {
        BinOp::Add => match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_add(*b).map(Value::Integer).ok_or_else(|| overflow(op))
            }
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            (Value::Array(a), Value::Array(b)) => {
                Ok(Value::Array(a.iter().chain(b).cloned().collect()))
            }
            (a, b) => match as_floats(a, b) {
                Some((x, y)) => Ok(Value::Float(x + y)),
                None => Err(operand_error("add", op, a, b)),
            },
        },
        BinOp::Subtract => match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_sub(*b).map(Value::Integer).ok_or_else(|| overflow(op))
            }
            (a, b) => match as_floats(a, b) {
                Some((x, y)) => Ok(Value::Float(x - y)),
                None => Err(operand_error("subtract", op, a, b)),
            },
        },
        BinOp::Multiply => match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_mul(*b).map(Value::Integer).ok_or_else(|| overflow(op))
            }
            (a, b) => match as_floats(a, b) {
                Some((x, y)) => Ok(Value::Float(x * y)),
                None => Err(operand_error("multiply", op, a, b)),
            },
        },
        BinOp::Divide => {
            if left.is_number() && is_zero(right) {
                return Err(DrlError::type_error("Division by zero"));
            }
            match (left, right) {
                // Exact integer division stays integral
                (Value::Integer(a), Value::Integer(b)) if a.checked_rem(*b) == Some(0) => {
                    a.checked_div(*b).map(Value::Integer).ok_or_else(|| overflow(op))
                }
                (a, b) => match as_floats(a, b) {
                    Some((x, y)) => Ok(Value::Float(x / y)),
                    None => Err(operand_error("divide", op, a, b)),
                },
            }
        }
        BinOp::Modulo => {
            if left.is_number() && is_zero(right) {
                return Err(DrlError::type_error("Modulo by zero"));
            }
            // Floored: the result takes the sign of the divisor
            match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => {
                    let r = a.checked_rem(*b).unwrap_or(0);
                    let r = if r != 0 && (r < 0) != (*b < 0) { r + b } else { r };
                    Ok(Value::Integer(r))
                }
                (a, b) => match as_floats(a, b) {
                    Some((x, y)) => {
                        let r = x % y;
                        let r = if r != 0.0 && (r < 0.0) != (y < 0.0) { r + y } else { r };
                        Ok(Value::Float(r))
                    }
                    None => Err(operand_error("take modulo of", op, a, b)),
                },
            }
        }
        BinOp::Power => {
            if let (Value::Integer(a), Value::Integer(b)) = (left, right)
                && let Ok(exp) = u32::try_from(*b)
                && let Some(result) = a.checked_pow(exp)
            {
                return Ok(Value::Integer(result));
            }
            let Some((x, y)) = as_floats(left, right) else {
                return Err(operand_error("exponentiate", op, left, right));
            };
            if x == 0.0 && y < 0.0 {
                return Err(DrlError::type_error("Zero cannot be raised to a negative power"));
            }
            let result = x.powf(y);
            if result.is_nan() && !x.is_nan() && !y.is_nan() {
                return Err(DrlError::type_error(format!(
                    "Power {} ^ {} has no real result",
                    left, right
                )));
            }
            Ok(Value::Float(result))
        }
        _ => unreachable!("non-arithmetic operator {:?}", op),
    }
}

fn apply_comparison(op: BinOp, left: &Value, right: &Value) -> Result<Value, DrlError> {
    match op {
        BinOp::Equal | BinOp::NotEqual => {
            let equal = match (left, right) {
                (Value::Null, other) | (other, Value::Null) => other.is_null(),
                (a, b) if a.is_number() && b.is_number() => a.loose_eq(b),
                (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => a.loose_eq(b),
                (a, b) => return Err(operand_error("compare", op, a, b)),
            };
            Ok(Value::Boolean(if op == BinOp::Equal { equal } else { !equal }))
        }
        _ => {
            let Some(ordering) = left.compare(right) else {
                return Err(operand_error("compare", op, left, right));
            };
            let result = match op {
                BinOp::LessThan => ordering == Ordering::Less,
                BinOp::GreaterThan => ordering == Ordering::Greater,
                BinOp::LessEqual => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Boolean(result))
        }
    }
}

/// Evaluates a parsed expression against `context`.
pub fn evaluate(expr: &Expr, context: &Value, config: &Config) -> Result<Value, DrlError> {
    Evaluator::new(context, config).eval_expr(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Integer(n)
    }

    #[test]
    fn test_integer_division() {
        assert_eq!(apply_binop(BinOp::Divide, &int(10), &int(2)).unwrap(), int(5));
        assert_eq!(
            apply_binop(BinOp::Divide, &int(7), &int(2)).unwrap(),
            Value::Float(3.5)
        );
        assert!(matches!(
            apply_binop(BinOp::Divide, &int(1), &Value::Float(0.0)),
            Err(DrlError::Type(_))
        ));
    }

    #[test]
    fn test_floored_modulo() {
        assert_eq!(apply_binop(BinOp::Modulo, &int(-7), &int(3)).unwrap(), int(2));
        assert_eq!(apply_binop(BinOp::Modulo, &int(7), &int(-3)).unwrap(), int(-2));
        assert_eq!(
            apply_binop(BinOp::Modulo, &Value::Float(5.5), &int(2)).unwrap(),
            Value::Float(1.5)
        );
    }

    #[test]
    fn test_power_overflow_falls_back_to_float() {
        assert_eq!(apply_binop(BinOp::Power, &int(2), &int(10)).unwrap(), int(1024));
        assert_eq!(
            apply_binop(BinOp::Power, &int(2), &int(-1)).unwrap(),
            Value::Float(0.5)
        );
        assert!(matches!(
            apply_binop(BinOp::Power, &int(10), &int(30)).unwrap(),
            Value::Float(_)
        ));
        assert!(apply_binop(BinOp::Power, &int(-8), &Value::Float(0.5)).is_err());
    }

    #[test]
    fn test_checked_integer_arithmetic() {
        assert!(apply_binop(BinOp::Add, &int(i64::MAX), &int(1)).is_err());
        assert!(apply_binop(BinOp::Multiply, &int(i64::MIN), &int(-1)).is_err());
    }

    #[test]
    fn test_equality_across_kinds() {
        let eq = |a: &Value, b: &Value| apply_binop(BinOp::Equal, a, b);
        assert_eq!(eq(&int(1), &Value::Float(1.0)).unwrap(), Value::Boolean(true));
        assert_eq!(eq(&Value::Null, &int(0)).unwrap(), Value::Boolean(false));
        assert_eq!(eq(&Value::Null, &Value::Null).unwrap(), Value::Boolean(true));
        assert!(eq(&int(1), &Value::from("1")).is_err());
        assert!(apply_binop(BinOp::LessThan, &int(1), &Value::from("2")).is_err());
    }
}
