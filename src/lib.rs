//! DRLang: a small expression language for pulling values out of
//! structured data.
//!
//! ```
//! use drlang::{Value, interpret};
//! use serde_json::json;
//!
//! let ctx = Value::from(json!({"user": {"age": 15}}));
//! let label = interpret(r#"if($user>age >= 18, "adult", "minor")"#, &ctx, None).unwrap();
//! assert_eq!(label, Value::from("minor"));
//! ```
pub mod ast;
mod builtins;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod interpolate;
pub mod interpreter;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod value;

pub use ast::{BinOp, Expr, Literal, OpKind, RefBehavior, Token, TokenKind};
pub use config::Config;
pub use error::{Diagnostic, DrlError};
pub use evaluator::{Evaluator, evaluate};
pub use functions::{
    Function, FunctionRegistry, NativeFunction, ParamType, Scope, Signature, lookup_function,
    register_function, typed, unregister_function,
};
pub use interpolate::{interpolate, interpolate_mapping, interpret_mapping};
pub use interpreter::interpret;
pub use lexer::{Lexer, tokenize};
pub use output::{to_json, to_json_pretty};
pub use parser::{Parser, parse};
pub use resolver::{Resolver, resolve_reference};
pub use value::Value;
