use crate::ast::{BinOp, RefBehavior};

/// Constant written directly in an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted string, escapes already applied
    String(String),

    /// Number text as written; typed during evaluation
    /// (a `.` makes it a float, otherwise an integer)
    Number(String),

    /// `True` / `False`
    Boolean(bool),
}

/// Parse tree node.
///
/// Built bottom-up by the parser and walked top-down by the evaluator.
/// Children are boxed and exclusively owned.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// String, number or boolean constant
    Literal(Literal),

    /// Data reference
    ///
    /// # Examples
    /// ```text
    /// $user>name          // Reference { path: "user>name", behavior: Required }
    /// $[user>nickname]    // Reference { path: "user>nickname", behavior: Optional }
    /// ```
    ///
    /// The path is opaque here; nested `$(...)` markers inside it are
    /// expanded by the resolver.
    Reference {
        path: String,
        behavior: RefBehavior,
        position: usize,
    },

    /// Bare word; evaluates to its own name as a string
    Identifier(String),

    /// Prefix `not`
    Not(Box<Expr>),

    /// Binary operation (arithmetic, comparison, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Function call
    ///
    /// # Examples
    /// ```text
    /// upper($name)
    /// if($age >= 18, "adult", "minor")
    /// ```
    Call {
        name: String,
        args: Vec<Expr>,
        position: usize,
    },
}

impl Expr {
    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn number(text: impl Into<String>) -> Self {
        Expr::Literal(Literal::Number(text.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Expr::Literal(Literal::Boolean(b))
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
