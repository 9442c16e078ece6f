//! String templates and mapping templates.
//!
//! Template text is literal except for two kinds of sequences:
//!
//! - references: `$user>name`, `$(user>full name)`, `$[opt]`, `${keep}`
//! - expression blocks: `{% $count * 2 %}`, evaluated with [`interpret`]
//!
//! ```
//! use drlang::{Value, interpolate};
//! use serde_json::json;
//!
//! let ctx = Value::from(json!({"name": "Alice", "count": 5}));
//! let text = interpolate("Hello $name, you have {% $count * 2 %} items", &ctx, None).unwrap();
//! assert_eq!(text, Value::from("Hello Alice, you have 10 items"));
//!
//! // A template that is a single reference keeps the value's type
//! assert_eq!(interpolate("$count", &ctx, None).unwrap(), Value::Integer(5));
//! ```

use std::collections::HashMap;

use log::trace;

use crate::{
    ast::RefBehavior,
    config::Config,
    error::DrlError,
    interpreter::interpret,
    lexer::{matching_close, starts_with_at},
    resolver::Resolver,
    value::Value,
};

/// Characters that end a bare reference inside a template.
const TEMPLATE_STOP_CHARS: &str = "(),'\"+-*/%^<>=![]{};";

const BLOCK_OPEN: &str = "{%";
const BLOCK_CLOSE: &str = "%}";

enum Piece {
    Text(String),
    Value(Value),
}

struct Interpolator<'a> {
    template: &'a str,
    chars: Vec<char>,
    position: usize,
    context: &'a Value,
    config: &'a Config,
    pieces: Vec<Piece>,
}

impl<'a> Interpolator<'a> {
    fn new(template: &'a str, context: &'a Value, config: &'a Config) -> Self {
        Interpolator {
            template,
            chars: template.chars().collect(),
            position: 0,
            context,
            config,
            pieces: Vec::new(),
        }
    }

    fn push_text(&mut self, text: &str) {
        match self.pieces.last_mut() {
            Some(Piece::Text(last)) => last.push_str(text),
            _ => self.pieces.push(Piece::Text(text.to_string())),
        }
    }

    fn push_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.push_text(c.encode_utf8(&mut buf));
    }

    fn error(&self, err: DrlError, start: usize) -> DrlError {
        err.with_expression(self.template).with_position(start)
    }

    fn run(mut self) -> Result<Value, DrlError> {
        while self.position < self.chars.len() {
            if starts_with_at(&self.chars, self.position, BLOCK_OPEN) {
                self.read_block()?;
            } else if self.chars[self.position] == self.config.ref_indicator() {
                self.read_reference()?;
            } else {
                let c = self.chars[self.position];
                self.push_char(c);
                self.position += 1;
            }
        }

        if let [Piece::Value(value)] = self.pieces.as_mut_slice() {
            return Ok(std::mem::take(value));
        }
        let text: String = self
            .pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(text) => text.clone(),
                Piece::Value(value) => value.to_text(),
            })
            .collect();
        Ok(Value::String(text))
    }

    /// `{% expr %}`; blocks may contain nested `{%` `%}` pairs.
    fn read_block(&mut self) -> Result<(), DrlError> {
        let start = self.position;
        let inner_start = start + BLOCK_OPEN.len();
        let mut depth = 1usize;
        let mut i = inner_start;

        while i < self.chars.len() {
            if starts_with_at(&self.chars, i, BLOCK_OPEN) {
                depth += 1;
                i += BLOCK_OPEN.len();
            } else if starts_with_at(&self.chars, i, BLOCK_CLOSE) {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                i += BLOCK_CLOSE.len();
            } else {
                i += 1;
            }
        }

        if depth != 0 {
            return Err(self.error(
                DrlError::syntax("Unterminated expression block: expected closing '%}'")
                    .with_context("Expression block started with '{%' but never closed"),
                start,
            ));
        }

        let expression: String = self.chars[inner_start..i].iter().collect();
        let expression = expression.trim();
        trace!("template block {:?}", expression);
        let value = interpret(expression, self.context, Some(self.config))
            .map_err(|e| e.within(format!("In expression block at position {}", start)))?;

        self.pieces.push(Piece::Value(value));
        self.position = i + BLOCK_CLOSE.len();
        Ok(())
    }

    fn read_reference(&mut self) -> Result<(), DrlError> {
        let start = self.position;
        let after = start + 1;

        let (path, behavior, end) = match self.chars.get(after).copied().and_then(RefBehavior::from_opening) {
            Some(behavior) => {
                let (open, close) = behavior.delimiters();
                let Some(close_at) = matching_close(&self.chars, after, open, close) else {
                    return Err(self.error(
                        DrlError::syntax(format!("Unterminated reference: expected closing '{}'", close))
                            .with_context(format!("Reference started at position {} but never closed", start)),
                        start,
                    ));
                };
                let path: String = self.chars[after + 1..close_at].iter().collect();
                (path, behavior, close_at + 1)
            }
            None => {
                let (path, end) = self.scan_bare_path(after);
                (path, RefBehavior::Required, end)
            }
        };

        let path = path.trim();
        if path.is_empty() {
            let raw: String = self.chars[start..end].iter().collect();
            self.push_text(&raw);
        } else {
            let value = Resolver::new(self.context, self.config)
                .resolve(path, behavior, 0)
                .map_err(|e| self.error(e, start))?;
            self.pieces.push(Piece::Value(value));
        }
        self.position = end;
        Ok(())
    }

    /// Bare path from `from`: stops at whitespace and operator characters,
    /// but key-delimiter sequences are always taken.
    fn scan_bare_path(&self, from: usize) -> (String, usize) {
        let delimiter = self.config.key_delimiter();
        let delimiter_len = delimiter.chars().count();
        let indicator = self.config.ref_indicator();

        let mut path = String::new();
        let mut i = from;
        while let Some(&c) = self.chars.get(i) {
            if starts_with_at(&self.chars, i, delimiter) {
                path.push_str(delimiter);
                i += delimiter_len;
                continue;
            }
            if c.is_whitespace() || c == indicator || TEMPLATE_STOP_CHARS.contains(c) {
                break;
            }
            path.push(c);
            i += 1;
        }
        (path, i)
    }
}

/// Expands references and expression blocks in `template`.
///
/// A template made of exactly one reference or one block yields that value
/// unchanged; anything else is rendered to a string, with null as empty text.
pub fn interpolate(template: &str, context: &Value, config: Option<&Config>) -> Result<Value, DrlError> {
    let config = config.unwrap_or_else(|| Config::default_ref());
    Interpolator::new(template, context, config).run()
}

/// Applies `leaf` to every string inside `value`, recursing through arrays
/// and objects.
fn map_strings<F>(value: &Value, leaf: &F, drop_empty: bool) -> Result<Value, DrlError>
where
    F: Fn(&str) -> Result<Value, DrlError>,
{
    match value {
        Value::String(s) => leaf(s),
        Value::Object(obj) => map_object(obj, leaf, drop_empty).map(Value::Object),
        Value::Array(arr) => arr
            .iter()
            .map(|item| map_strings(item, leaf, drop_empty))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn map_object<F>(
    templates: &HashMap<String, Value>,
    leaf: &F,
    drop_empty: bool,
) -> Result<HashMap<String, Value>, DrlError>
where
    F: Fn(&str) -> Result<Value, DrlError>,
{
    let mut results = HashMap::with_capacity(templates.len());
    for (key, template) in templates {
        let value = map_strings(template, leaf, drop_empty)
            .map_err(|e| e.within(format!("While interpolating key '{}'", key)))?;
        if drop_empty && value.is_null() {
            trace!("dropping key '{}' with null result", key);
            continue;
        }
        results.insert(key.clone(), value);
    }
    Ok(results)
}

/// Interpolates every string leaf of a mapping, recursing through nested
/// objects and arrays.
///
/// With `drop_empty` set on the config, keys whose result is null are left
/// out at every level. Present falsy values and null array elements stay.
///
/// ```
/// use drlang::{Config, Value, interpolate_mapping};
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let ctx = Value::from(json!({"user": {"name": "Ada", "score": 0}}));
/// let mut templates = HashMap::new();
/// templates.insert("name".to_string(), Value::from("$user>name"));
/// templates.insert("score".to_string(), Value::from("$user>score"));
/// templates.insert("email".to_string(), Value::from("$[user>email]"));
///
/// let config = Config::default().with_drop_empty(true);
/// let out = interpolate_mapping(&templates, &ctx, Some(&config)).unwrap();
/// assert_eq!(out.len(), 2);
/// assert_eq!(out["score"], Value::Integer(0));
/// ```
pub fn interpolate_mapping(
    templates: &HashMap<String, Value>,
    context: &Value,
    config: Option<&Config>,
) -> Result<HashMap<String, Value>, DrlError> {
    let config = config.unwrap_or_else(|| Config::default_ref());
    let leaf = |template: &str| interpolate(template, context, Some(config));
    map_object(templates, &leaf, config.drop_empty())
}

/// Like [`interpolate_mapping`], but every string leaf is an expression.
pub fn interpret_mapping(
    expressions: &HashMap<String, Value>,
    context: &Value,
    config: Option<&Config>,
) -> Result<HashMap<String, Value>, DrlError> {
    let config = config.unwrap_or_else(|| Config::default_ref());
    let leaf = |expression: &str| interpret(expression, context, Some(config));
    map_object(expressions, &leaf, config.drop_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Value {
        Value::from(json!({"a": {"b": 1}, "name": "Bo", "missing": null}))
    }

    #[test]
    fn test_bare_reference_stops_at_punctuation() {
        let out = interpolate("Hi $name; total=$a>b!", &ctx(), None).unwrap();
        assert_eq!(out, Value::from("Hi Bo; total=1!"));
    }

    #[test]
    fn test_lone_indicator_is_literal() {
        assert_eq!(interpolate("costs $ 5", &ctx(), None).unwrap(), Value::from("costs $ 5"));
    }

    #[test]
    fn test_unterminated_block() {
        let err = interpolate("x {% 1 + 2", &ctx(), None).unwrap_err();
        assert!(matches!(err, DrlError::Syntax(_)));
        assert_eq!(err.position(), Some(2));
    }

    #[test]
    fn test_null_renders_empty_in_text() {
        let out = interpolate("[$[nope]]", &ctx(), None).unwrap();
        assert_eq!(out, Value::from("[]"));
    }
}
