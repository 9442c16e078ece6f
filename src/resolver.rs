//! Reference path resolution.
//!
//! A path such as `user>addresses>0>city` is split on the configured key
//! delimiter and walked through the context: objects by key, arrays by
//! integer index (negative indexes count from the end).
//!
//! Paths may embed bracketed references, `$(a>$(ptr>sel)>c)`. Inner
//! references are resolved first, innermost outward, and their text is
//! spliced into the outer path before it is walked.

use log::{debug, trace};

use crate::{
    ast::RefBehavior,
    config::Config,
    error::DrlError,
    lexer::matching_close,
    value::Value,
};

/// Keys listed in the context of a missing-key error.
const KEY_HINT_LIMIT: usize = 5;

/// A walk that stopped early; mapped to an error or a fallback by behavior.
enum Miss {
    MissingKey { key: String, available: Vec<String> },
    IndexOutOfRange { index: i64, len: usize },
    NonIntegerIndex { key: String },
    NotContainer { key: String, found: &'static str },
}

pub struct Resolver<'a> {
    context: &'a Value,
    config: &'a Config,
}

impl<'a> Resolver<'a> {
    pub fn new(context: &'a Value, config: &'a Config) -> Self {
        Resolver { context, config }
    }

    /// Resolves `path` with the given failure policy. `depth` is the number
    /// of enclosing references.
    pub fn resolve(&self, path: &str, behavior: RefBehavior, depth: usize) -> Result<Value, DrlError> {
        if depth > self.config.max_depth() {
            return Err(DrlError::reference(format!(
                "Nested references exceed maximum depth of {}",
                self.config.max_depth()
            ))
            .with_context(format!("While resolving '{}'", path)));
        }

        let expanded = self.expand_nested(path, depth)?;
        trace!("resolving '{}' as {:?}", expanded, behavior);

        match self.walk(&expanded) {
            Ok(value) => Ok(value.clone()),
            Err((walked, miss)) => match behavior {
                RefBehavior::Optional => {
                    debug!("optional reference '{}' missing, yielding null", expanded);
                    Ok(Value::Null)
                }
                RefBehavior::LiteralFallback => {
                    debug!("reference '{}' missing, keeping literal text", expanded);
                    Ok(Value::String(format!(
                        "{}{{{}}}",
                        self.config.ref_indicator(),
                        path
                    )))
                }
                RefBehavior::Required => Err(self.miss_error(&walked, miss)),
            },
        }
    }

    /// Replaces every bracketed reference inside `path` with its value's text.
    fn expand_nested(&self, path: &str, depth: usize) -> Result<String, DrlError> {
        let indicator = self.config.ref_indicator();
        if !path.contains(indicator) {
            return Ok(path.to_string());
        }

        let chars: Vec<char> = path.chars().collect();
        let mut out = String::with_capacity(path.len());
        let mut i = 0;
        while i < chars.len() {
            let behavior = chars.get(i + 1).copied().and_then(RefBehavior::from_opening);
            match behavior {
                Some(behavior) if chars[i] == indicator => {
                    let (open, close) = behavior.delimiters();
                    let Some(close_at) = matching_close(&chars, i + 1, open, close) else {
                        return Err(DrlError::syntax(format!(
                            "Unterminated reference: expected closing '{}'",
                            close
                        ))
                        .with_context(format!("Nested reference inside '{}'", path)));
                    };
                    let inner: String = chars[i + 2..close_at].iter().collect();
                    let value = self.resolve(inner.trim(), behavior, depth + 1)?;
                    out.push_str(&value.to_text());
                    i = close_at + 1;
                }
                _ => {
                    out.push(chars[i]);
                    i += 1;
                }
            }
        }
        Ok(out)
    }

    /// Walks the context. On failure returns the segments walked so far
    /// (including the failing one) and what went wrong.
    fn walk(&self, path: &str) -> Result<&'a Value, (Vec<String>, Miss)> {
        let mut current = self.context;
        let mut walked: Vec<String> = Vec::new();

        for segment in path.split(self.config.key_delimiter()) {
            let key = segment.trim();
            walked.push(key.to_string());

            current = match current {
                Value::Object(obj) => match obj.get(key) {
                    Some(value) => value,
                    None => {
                        let mut available: Vec<String> = obj.keys().cloned().collect();
                        available.sort();
                        available.truncate(KEY_HINT_LIMIT);
                        let miss = Miss::MissingKey {
                            key: key.to_string(),
                            available,
                        };
                        return Err((walked, miss));
                    }
                },
                Value::Array(arr) => {
                    let Ok(index) = key.parse::<i64>() else {
                        let miss = Miss::NonIntegerIndex {
                            key: key.to_string(),
                        };
                        return Err((walked, miss));
                    };
                    match normalize_index(index, arr.len()) {
                        Some(i) => &arr[i],
                        None => {
                            let miss = Miss::IndexOutOfRange {
                                index,
                                len: arr.len(),
                            };
                            return Err((walked, miss));
                        }
                    }
                }
                scalar => {
                    let miss = Miss::NotContainer {
                        key: key.to_string(),
                        found: scalar.type_name(),
                    };
                    return Err((walked, miss));
                }
            };
        }

        Ok(current)
    }

    fn miss_error(&self, walked: &[String], miss: Miss) -> DrlError {
        let delimiter = self.config.key_delimiter();
        let parent = walked[..walked.len().saturating_sub(1)].join(delimiter);

        match miss {
            Miss::MissingKey { key, available } => {
                let hint = if available.is_empty() {
                    "Object is empty".to_string()
                } else {
                    format!("Available keys: {}", available.join(", "))
                };
                DrlError::reference(format!("Reference key '{}' not found in context", key))
                    .with_context(format!("Failed at: {}\n  {}", walked.join(delimiter), hint))
            }
            Miss::IndexOutOfRange { index, len } => {
                DrlError::reference(format!("List index {} out of range", index))
                    .with_context(format!("List at '{}' has length {}", parent, len))
            }
            Miss::NonIntegerIndex { key } => DrlError::type_error(format!(
                "Cannot use non-integer key '{}' to index array",
                key
            ))
            .with_context(format!(
                "Value at '{}' is an array, requires integer index",
                parent
            )),
            Miss::NotContainer { key, found } => DrlError::type_error(format!(
                "Cannot navigate into non-container value at key '{}'",
                key
            ))
            .with_context(format!(
                "Value at '{}' is {}, not an object or array",
                parent, found
            )),
        }
    }
}

/// Python-style index normalization; `None` when out of range.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { index + len } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

/// Resolves a reference path against `context`.
///
/// ```
/// use drlang::{Config, RefBehavior, Value, resolve_reference};
/// use serde_json::json;
///
/// let ctx = Value::from(json!({"a": {"b": {"c": "silver"}}, "ptr": {"sel": "b"}}));
/// let config = Config::default();
///
/// let value = resolve_reference("a>$(ptr>sel)>c", &ctx, &config, RefBehavior::Required).unwrap();
/// assert_eq!(value, Value::from("silver"));
///
/// let missing = resolve_reference("a>zzz", &ctx, &config, RefBehavior::Optional).unwrap();
/// assert_eq!(missing, Value::Null);
/// ```
pub fn resolve_reference(
    path: &str,
    context: &Value,
    config: &Config,
    behavior: RefBehavior,
) -> Result<Value, DrlError> {
    Resolver::new(context, config).resolve(path, behavior, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Value {
        Value::from(json!({
            "user": {"name": "Ada", "tags": ["x", "y", "z"], "age": 36},
            "keys": {"field": "name", "inner": "field"},
        }))
    }

    #[test]
    fn test_array_indexing() {
        let config = Config::default();
        let ctx = ctx();
        let get = |path: &str| resolve_reference(path, &ctx, &config, RefBehavior::Required);
        assert_eq!(get("user>tags>0").unwrap(), Value::from("x"));
        assert_eq!(get("user>tags>-1").unwrap(), Value::from("z"));
        assert!(matches!(get("user>tags>3"), Err(DrlError::Reference(_))));
        assert!(matches!(get("user>tags>first"), Err(DrlError::Type(_))));
        assert!(matches!(get("user>age>years"), Err(DrlError::Type(_))));
    }

    #[test]
    fn test_missing_key_context() {
        let err = resolve_reference("user>email", &ctx(), &Config::default(), RefBehavior::Required)
            .unwrap_err();
        assert_eq!(err.message(), "Reference key 'email' not found in context");
        assert_eq!(
            err.context(),
            Some("Failed at: user>email\n  Available keys: age, name, tags")
        );
    }

    #[test]
    fn test_doubly_nested() {
        let value = resolve_reference(
            "user>$(keys>$(keys>inner))",
            &ctx(),
            &Config::default(),
            RefBehavior::Required,
        )
        .unwrap();
        assert_eq!(value, Value::from("Ada"));
    }

    #[test]
    fn test_depth_limit() {
        let config = Config::default().with_max_depth(1);
        let err = resolve_reference("user>$(keys>$(keys>inner))", &ctx(), &config, RefBehavior::Optional)
            .unwrap_err();
        assert!(matches!(err, DrlError::Reference(_)));
        assert!(err.message().contains("maximum depth"));
    }

    #[test]
    fn test_literal_fallback_keeps_original_path() {
        let value = resolve_reference("user>$[keys>nope]", &ctx(), &Config::default(), RefBehavior::LiteralFallback)
            .unwrap();
        assert_eq!(value, Value::from("${user>$[keys>nope]}"));
    }
}
