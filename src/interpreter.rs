use log::debug;

use crate::{
    config::Config, error::DrlError, evaluator::evaluate, lexer::tokenize, parser::parse,
    value::Value,
};

/// Tokenizes, parses and evaluates `expression` against `context`.
///
/// Uses the default `$` / `>` syntax when no config is given. An empty (or
/// all-whitespace) expression evaluates to null. Errors carry the
/// expression text for rendering.
///
/// # Examples
///
/// ```
/// use drlang::{Value, interpret};
/// use serde_json::json;
///
/// let ctx = Value::from(json!({"data": {"names": "a,b,c"}, "value": 5}));
///
/// assert_eq!(interpret("2 + 3 * 4", &ctx, None).unwrap(), Value::Integer(14));
/// assert_eq!(interpret("$value * 2 + 10", &ctx, None).unwrap(), Value::Integer(20));
/// assert_eq!(
///     interpret(r#"split($data>names, ",")"#, &ctx, None).unwrap(),
///     Value::from(json!(["a", "b", "c"]))
/// );
/// ```
pub fn interpret(expression: &str, context: &Value, config: Option<&Config>) -> Result<Value, DrlError> {
    let config = config.unwrap_or_else(|| Config::default_ref());
    debug!("interpreting {:?}", expression);

    let result = tokenize(expression, config)
        .and_then(parse)
        .and_then(|tree| match tree {
            Some(tree) => evaluate(&tree, context, config),
            None => Ok(Value::Null),
        });
    result.map_err(|e| e.with_expression(expression))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_expression_is_null() {
        assert_eq!(interpret("", &Value::Null, None).unwrap(), Value::Null);
        assert_eq!(interpret("   ", &Value::Null, None).unwrap(), Value::Null);
    }

    #[test]
    fn test_errors_carry_expression() {
        let err = interpret("1 / 0", &Value::Null, None).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.starts_with("Type error: Division by zero"));
        assert!(rendered.contains("Expression: 1 / 0"));
    }
}
