//! Function registry and argument coercion.
//!
//! Functions are looked up by name at call time: first in the calling
//! [`Config`]'s own set, then in the process-wide registry, which starts out
//! holding the built-in catalog.
//!
//! The global registry sits behind a lock, so registering from any thread
//! is memory-safe, but expressions already running see whichever table was
//! current when they looked a name up. Register at startup when the set of
//! functions must be stable.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use log::debug;
use once_cell::sync::Lazy;

use crate::{builtins, config::Config, error::DrlError, value::Value};

static GLOBAL_REGISTRY: Lazy<RwLock<FunctionRegistry>> =
    Lazy::new(|| RwLock::new(FunctionRegistry::with_builtins()));

/// Declared type of a positional parameter.
///
/// Scalar types drive best-effort coercion of arguments before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Any,
    Integer,
    Float,
    String,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// Converts `value` to this type when it is a different scalar type.
    ///
    /// Never fails: a value that cannot be converted is returned unchanged
    /// and the function itself decides what to do with it.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (ParamType::Integer, Value::Float(n)) if n.is_finite() => Value::Integer(n.trunc() as i64),
            (ParamType::Integer, Value::Boolean(b)) => Value::Integer(b as i64),
            (ParamType::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::Integer(n),
                Err(_) => Value::String(s),
            },
            (ParamType::Float, Value::Integer(n)) => Value::Float(n as f64),
            (ParamType::Float, Value::Boolean(b)) => Value::Float(if b { 1.0 } else { 0.0 }),
            (ParamType::Float, Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(n) => Value::Float(n),
                Err(_) => Value::String(s),
            },
            (ParamType::String, v @ (Value::Integer(_) | Value::Float(_) | Value::Boolean(_))) => {
                Value::String(v.to_string())
            }
            (ParamType::Boolean, v) if !matches!(v, Value::Boolean(_)) => {
                Value::Boolean(v.is_truthy())
            }
            (_, v) => v,
        }
    }
}

/// Positional parameter types of a function.
///
/// Arguments past the declared parameters are passed through untouched, so
/// the empty (default) signature accepts anything as given.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<ParamType>,
}

impl Signature {
    pub fn new(params: &[ParamType]) -> Self {
        Signature {
            params: params.to_vec(),
        }
    }

    pub fn coerce(&self, args: Vec<Value>) -> Vec<Value> {
        args.into_iter()
            .enumerate()
            .map(|(i, arg)| match self.params.get(i) {
                Some(param) => param.coerce(arg),
                None => arg,
            })
            .collect()
    }
}

/// A callable that can be registered under a name.
pub trait Function: Send + Sync {
    fn call(&self, args: Vec<Value>) -> Result<Value, DrlError>;

    fn signature(&self) -> Signature {
        Signature::default()
    }
}

/// Plain closures are variadic functions with no coercion.
impl<F> Function for F
where
    F: Fn(Vec<Value>) -> Result<Value, DrlError> + Send + Sync,
{
    fn call(&self, args: Vec<Value>) -> Result<Value, DrlError> {
        self(args)
    }
}

type NativeFn = Box<dyn Fn(Vec<Value>) -> Result<Value, DrlError> + Send + Sync>;

/// A closure paired with a declared signature.
///
/// ```
/// use drlang::{Config, ParamType, Value, interpret, typed};
///
/// let double = typed(&[ParamType::Integer], |args| match args.first() {
///     Some(Value::Integer(n)) => Ok(Value::Integer(n * 2)),
///     _ => Ok(Value::Null),
/// });
/// let config = Config::default().with_function("double", double);
///
/// // "21" is coerced to an integer before the call
/// let result = interpret(r#"double("21")"#, &Value::Null, Some(&config)).unwrap();
/// assert_eq!(result, Value::Integer(42));
/// ```
pub struct NativeFunction {
    signature: Signature,
    func: NativeFn,
}

impl NativeFunction {
    pub fn new<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, DrlError> + Send + Sync + 'static,
    {
        NativeFunction {
            signature,
            func: Box::new(func),
        }
    }
}

impl Function for NativeFunction {
    fn call(&self, args: Vec<Value>) -> Result<Value, DrlError> {
        (self.func)(args)
    }

    fn signature(&self) -> Signature {
        self.signature.clone()
    }
}

/// Shorthand for a [`NativeFunction`] with fixed positional parameter types.
pub fn typed<F>(params: &[ParamType], func: F) -> NativeFunction
where
    F: Fn(Vec<Value>) -> Result<Value, DrlError> + Send + Sync + 'static,
{
    NativeFunction::new(Signature::new(params), func)
}

/// Name → function table.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// Registers a function, replacing any previous one of the same name.
    pub fn register(&mut self, name: &str, function: impl Function + 'static) {
        self.register_arc(name, Arc::new(function));
    }

    pub fn register_arc(&mut self, name: &str, function: Arc<dyn Function>) {
        self.functions.insert(name.to_string(), function);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.functions.remove(name).is_some()
    }

    /// Finds a function by name (case-sensitive).
    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Where [`register_function`] puts a function.
pub enum Scope<'a> {
    /// Process-wide; visible to every expression
    Global,
    /// Only expressions evaluated with this config
    Config(&'a mut Config),
}

/// Registers `function` under `name` in the given scope.
///
/// ```
/// use drlang::{DrlError, Scope, Value, interpret, register_function};
///
/// register_function(
///     "shout",
///     |args: Vec<Value>| -> Result<Value, DrlError> {
///         let text = args.first().map(Value::to_text).unwrap_or_default();
///         Ok(Value::String(format!("{}!", text.to_uppercase())))
///     },
///     Scope::Global,
/// );
/// let result = interpret("shout('hey')", &Value::Null, None).unwrap();
/// assert_eq!(result, Value::from("HEY!"));
/// ```
pub fn register_function(name: &str, function: impl Function + 'static, scope: Scope<'_>) {
    match scope {
        Scope::Global => {
            debug!("registering global function '{}'", name);
            GLOBAL_REGISTRY
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .register(name, function);
        }
        Scope::Config(config) => {
            debug!("registering config-scoped function '{}'", name);
            config.register(name, function);
        }
    }
}

/// Removes a function from the global registry. Returns whether it existed.
pub fn unregister_function(name: &str) -> bool {
    debug!("removing global function '{}'", name);
    GLOBAL_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(name)
}

/// Resolves a function name: config-scoped functions shadow global ones.
///
/// The returned handle is cloned out of the registry, so no lock is held
/// while the function runs.
pub fn lookup_function(name: &str, config: Option<&Config>) -> Option<Arc<dyn Function>> {
    if let Some(function) = config.and_then(|c| c.functions().get(name)) {
        return Some(function);
    }
    GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
}
