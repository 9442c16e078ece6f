use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{
    error::DrlError,
    functions::{Function, FunctionRegistry},
};

/// Characters the reference indicator and key delimiter may not use.
const RESERVED: &[char] = &['(', ')', ',', '\'', '"'];

/// Default maximum nesting depth of references inside reference paths.
pub const DEFAULT_MAX_DEPTH: usize = 32;

static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(Config::default);

/// Syntax symbols and scoped functions for one family of expressions.
///
/// ```
/// use drlang::{Config, Value, interpret};
/// use std::collections::HashMap;
///
/// let config = Config::new('@', ".").unwrap();
/// let mut user = HashMap::new();
/// user.insert("age".to_string(), Value::Integer(30));
/// let mut ctx = HashMap::new();
/// ctx.insert("user".to_string(), Value::Object(user));
///
/// let age = interpret("@user.age + 1", &Value::Object(ctx), Some(&config)).unwrap();
/// assert_eq!(age, Value::Integer(31));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    ref_indicator: char,
    key_delimiter: String,
    drop_empty: bool,
    max_depth: usize,
    functions: FunctionRegistry,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ref_indicator: '$',
            key_delimiter: ">".to_string(),
            drop_empty: false,
            max_depth: DEFAULT_MAX_DEPTH,
            functions: FunctionRegistry::new(),
        }
    }
}

impl Config {
    /// Creates a config with custom reference syntax.
    ///
    /// Fails when either symbol collides with `(` `)` `,` quotes or
    /// whitespace, or when the delimiter is empty.
    pub fn new(ref_indicator: char, key_delimiter: &str) -> Result<Self, DrlError> {
        if is_reserved(ref_indicator) {
            return Err(DrlError::Config(format!(
                "Reference indicator '{}' conflicts with reserved syntax",
                ref_indicator
            )));
        }
        if key_delimiter.is_empty() {
            return Err(DrlError::Config("Key delimiter cannot be empty".to_string()));
        }
        if key_delimiter.chars().any(is_reserved) {
            return Err(DrlError::Config(format!(
                "Key delimiter '{}' conflicts with reserved syntax",
                key_delimiter
            )));
        }

        Ok(Config {
            ref_indicator,
            key_delimiter: key_delimiter.to_string(),
            ..Config::default()
        })
    }

    /// Shared default configuration (`$` and `>`).
    pub fn default_ref() -> &'static Config {
        &DEFAULT_CONFIG
    }

    /// Drop keys whose result is null when interpolating mappings.
    pub fn with_drop_empty(mut self, drop_empty: bool) -> Self {
        self.drop_empty = drop_empty;
        self
    }

    /// Limit how deeply references may nest inside reference paths.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Adds a function visible only to expressions run with this config.
    pub fn with_function(mut self, name: &str, function: impl Function + 'static) -> Self {
        self.register(name, function);
        self
    }

    /// Adds a function in place; shadows a global function of the same name.
    pub fn register(&mut self, name: &str, function: impl Function + 'static) {
        self.functions.register(name, function);
    }

    pub fn register_arc(&mut self, name: &str, function: Arc<dyn Function>) {
        self.functions.register_arc(name, function);
    }

    pub fn ref_indicator(&self) -> char {
        self.ref_indicator
    }

    pub fn key_delimiter(&self) -> &str {
        &self.key_delimiter
    }

    pub fn drop_empty(&self) -> bool {
        self.drop_empty
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}

fn is_reserved(c: char) -> bool {
    c.is_whitespace() || RESERVED.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ref_indicator(), '$');
        assert_eq!(config.key_delimiter(), ">");
        assert!(!config.drop_empty());
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_rejects_reserved_symbols() {
        for indicator in ['(', ')', ',', '\'', '"', ' ', '\t'] {
            assert!(
                matches!(Config::new(indicator, ">"), Err(DrlError::Config(_))),
                "indicator {:?} should be rejected",
                indicator
            );
        }
        assert!(Config::new('$', "").is_err());
        assert!(Config::new('$', "a b").is_err());
        assert!(Config::new('$', ",").is_err());
        assert!(Config::new('@', "::").is_ok());
    }
}
