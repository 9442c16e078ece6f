//! # Abstract syntax tree
//!
//! - **[tokens]** - lexical tokens and reference behaviors
//! - **[expressions]** - parse tree nodes
//! - **[operators]** - binary operators, their categories and precedence
//!
//! ## Reference forms
//!
//! ```text
//! $user>name          required, bare form
//! $(user>first name)  required, bracketed (paths may contain spaces)
//! $[user>nickname]    optional: missing yields null
//! ${user>title}       literal fallback: missing yields "${user>title}"
//! $(rocks>$(best)>c)  nested: the inner reference is resolved first
//! ```
//!
//! ## Precedence (tightest first)
//!
//! | level | operators           |
//! |-------|---------------------|
//! | 1     | `^`                 |
//! | 2     | `*` `/` `%`         |
//! | 3     | `+` `-`             |
//! | 4     | `<` `>` `<=` `>=`   |
//! | 5     | `==` `!=`           |
//! | 6     | `not` (prefix)      |
//! | 7     | `and`               |
//! | 8     | `or`                |
//!
//! Every binary operator is left-associative, `^` included:
//! `2 ^ 3 ^ 2` is `(2 ^ 3) ^ 2`.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expr, Literal};
pub use operators::{BinOp, NOT_PRECEDENCE, OpKind};
pub use tokens::{RefBehavior, Token, TokenKind};
