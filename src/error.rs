use std::fmt;

use thiserror::Error;

/// How many characters of source to show on either side of the caret.
const SNIPPET_RADIUS: usize = 40;

/// Location and explanation attached to every pipeline error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagnostic {
    pub message: String,
    /// Source text the error refers to (expression or template)
    pub expression: String,
    /// Character offset into `expression`
    pub position: Option<usize>,
    pub context: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Two-line excerpt of the expression with a caret under `position`.
    pub fn snippet(&self) -> Option<String> {
        let position = self.position?;
        let chars: Vec<char> = self.expression.chars().collect();
        if position > chars.len() {
            return None;
        }
        let start = position.saturating_sub(SNIPPET_RADIUS);
        let end = (position + SNIPPET_RADIUS).min(chars.len());
        let excerpt: String = chars[start..end].iter().collect();
        Some(format!(
            "    {}\n    {}^",
            excerpt,
            " ".repeat(position - start)
        ))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.expression.is_empty() {
            write!(f, "\n  Expression: {}", self.expression)?;
            if let (Some(position), Some(snippet)) = (self.position, self.snippet()) {
                write!(f, "\n  Position {}:\n{}", position, snippet)?;
            }
        }
        if let Some(context) = &self.context {
            write!(f, "\n  Context: {}", context)?;
        }
        Ok(())
    }
}

/// Errors raised while tokenizing, parsing, resolving or evaluating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrlError {
    /// Malformed token stream or grammar violation
    #[error("Syntax error: {0}")]
    Syntax(Diagnostic),

    /// A required reference path segment is absent
    #[error("Reference error: {0}")]
    Reference(Diagnostic),

    /// Bad navigation, bad operand types, division by zero
    #[error("Type error: {0}")]
    Type(Diagnostic),

    /// Function not found in any registry
    #[error("Name error: {0}")]
    Name(Diagnostic),

    /// Unexpected failure inside a callable, relabelled with context
    #[error("Evaluation error: {0}")]
    Internal(Diagnostic),

    /// Rejected `Config` construction
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DrlError {
    pub fn syntax(message: impl Into<String>) -> Self {
        DrlError::Syntax(Diagnostic::new(message))
    }

    pub fn reference(message: impl Into<String>) -> Self {
        DrlError::Reference(Diagnostic::new(message))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        DrlError::Type(Diagnostic::new(message))
    }

    pub fn name(message: impl Into<String>) -> Self {
        DrlError::Name(Diagnostic::new(message))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DrlError::Internal(Diagnostic::new(message))
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            DrlError::Syntax(d)
            | DrlError::Reference(d)
            | DrlError::Type(d)
            | DrlError::Name(d)
            | DrlError::Internal(d) => Some(d),
            DrlError::Config(_) => None,
        }
    }

    fn diagnostic_mut(&mut self) -> Option<&mut Diagnostic> {
        match self {
            DrlError::Syntax(d)
            | DrlError::Reference(d)
            | DrlError::Type(d)
            | DrlError::Name(d)
            | DrlError::Internal(d) => Some(d),
            DrlError::Config(_) => None,
        }
    }

    /// Bare message, without expression or context lines.
    pub fn message(&self) -> &str {
        match self {
            DrlError::Config(message) => message,
            other => other.diagnostic().map(|d| d.message.as_str()).unwrap_or(""),
        }
    }

    pub fn position(&self) -> Option<usize> {
        self.diagnostic().and_then(|d| d.position)
    }

    pub fn context(&self) -> Option<&str> {
        self.diagnostic().and_then(|d| d.context.as_deref())
    }

    // The `with_*` builders never overwrite: the innermost detail wins.

    pub fn with_expression(mut self, expression: &str) -> Self {
        if let Some(d) = self.diagnostic_mut()
            && d.expression.is_empty()
        {
            d.expression = expression.to_string();
        }
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        if let Some(d) = self.diagnostic_mut()
            && d.position.is_none()
        {
            d.position = Some(position);
        }
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if let Some(d) = self.diagnostic_mut()
            && d.context.is_none()
        {
            d.context = Some(context.into());
        }
        self
    }

    /// Appends an outer context line below whatever context is already set.
    pub fn within(mut self, context: impl Into<String>) -> Self {
        if let Some(d) = self.diagnostic_mut() {
            let context = context.into();
            d.context = Some(match d.context.take() {
                Some(inner) => format!("{}\n  {}", inner, context),
                None => context,
            });
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_caret() {
        let err = DrlError::syntax("Unexpected character '#'")
            .with_expression("1 + # 2")
            .with_position(4)
            .with_context("This character is not valid syntax");
        let rendered = err.to_string();
        assert!(rendered.starts_with("Syntax error: Unexpected character '#'"));
        assert!(rendered.contains("Expression: 1 + # 2"));
        assert!(rendered.contains("    1 + # 2\n        ^"));
        assert!(rendered.ends_with("Context: This character is not valid syntax"));
    }

    #[test]
    fn test_builders_keep_innermost() {
        let err = DrlError::type_error("Division by zero")
            .with_position(3)
            .with_position(9)
            .with_context("inner")
            .with_context("outer");
        assert_eq!(err.position(), Some(3));
        assert_eq!(err.context(), Some("inner"));
        assert_eq!(err.message(), "Division by zero");
    }

    #[test]
    fn test_within_stacks_context() {
        let err = DrlError::reference("Reference key 'x' not found in context")
            .with_context("Failed at: x")
            .within("While evaluating argument 1 of 'upper'")
            .within("Error in function 'outer'");
        assert_eq!(
            err.context(),
            Some("Failed at: x\n  While evaluating argument 1 of 'upper'\n  Error in function 'outer'")
        );

        let err = DrlError::internal("boom").within("Error in function 'f'");
        assert_eq!(err.context(), Some("Error in function 'f'"));
        assert!(DrlError::Config("bad".into()).within("ignored").context().is_none());
    }

    #[test]
    fn test_caret_after_last_character() {
        let err = DrlError::syntax("Unexpected end of input")
            .with_expression("1 +")
            .with_position(3);
        let rendered = err.to_string();
        assert!(rendered.contains("Position 3:"));
        assert!(rendered.contains("    1 +\n       ^"));
    }
}
