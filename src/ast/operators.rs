/// Category of a binary operator; decides how the evaluator applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Arithmetic,
    Comparison,
    Logical,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    /// Power (`^`), left-associative like every other operator
    Power,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
    /// Addition or concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,

    // Comparison
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,

    // Logical
    /// Logical AND (`and`)
    And,
    /// Logical OR (`or`)
    Or,
}

/// Binding strength of prefix `not`; sits between equality and `and`.
pub const NOT_PRECEDENCE: u8 = 6;

impl BinOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "^" => BinOp::Power,
            "*" => BinOp::Multiply,
            "/" => BinOp::Divide,
            "%" => BinOp::Modulo,
            "+" => BinOp::Add,
            "-" => BinOp::Subtract,
            "<" => BinOp::LessThan,
            ">" => BinOp::GreaterThan,
            "<=" => BinOp::LessEqual,
            ">=" => BinOp::GreaterEqual,
            "==" => BinOp::Equal,
            "!=" => BinOp::NotEqual,
            "and" => BinOp::And,
            "or" => BinOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Power => "^",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    /// Lower binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Power => 1,
            BinOp::Multiply | BinOp::Divide | BinOp::Modulo => 2,
            BinOp::Add | BinOp::Subtract => 3,
            BinOp::LessThan | BinOp::GreaterThan | BinOp::LessEqual | BinOp::GreaterEqual => 4,
            BinOp::Equal | BinOp::NotEqual => 5,
            BinOp::And => 7,
            BinOp::Or => 8,
        }
    }

    pub fn kind(self) -> OpKind {
        match self {
            BinOp::Power
            | BinOp::Multiply
            | BinOp::Divide
            | BinOp::Modulo
            | BinOp::Add
            | BinOp::Subtract => OpKind::Arithmetic,
            BinOp::And | BinOp::Or => OpKind::Logical,
            _ => OpKind::Comparison,
        }
    }
}
