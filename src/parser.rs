use log::trace;

use crate::{
    ast::{BinOp, Expr, NOT_PRECEDENCE, Token, TokenKind},
    error::DrlError,
};

/// Looser than every operator; the starting bound for a full expression.
const LOOSEST: u8 = u8::MAX;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
        }
    }

    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_token().is_some_and(|t| t.is(kind))
    }

    /// Position for errors raised at the cursor: the current token, or just
    /// past the last one at the end of input.
    fn error_position(&self) -> Option<usize> {
        match self.current_token() {
            Some(token) => Some(token.position),
            None => self
                .tokens
                .last()
                .map(|t| t.position + t.text.chars().count()),
        }
    }

    fn error(&self, message: impl Into<String>, context: impl Into<String>) -> DrlError {
        let err = DrlError::syntax(message).with_context(context);
        match self.error_position() {
            Some(position) => err.with_position(position),
            None => err,
        }
    }

    /// Binary operator at the cursor, if any.
    fn current_binop(&self) -> Option<BinOp> {
        let token = self.current_token()?;
        match token.kind {
            TokenKind::Operator | TokenKind::Comparison | TokenKind::Logical => {
                BinOp::from_symbol(&token.text)
            }
            _ => None,
        }
    }

    /// Precedence climbing. Operators binding at `min_precedence` or looser
    /// are left for the caller, which makes every operator left-associative.
    fn parse_expression(&mut self, min_precedence: u8) -> Result<Expr, DrlError> {
        let mut left = if self.check(TokenKind::Not) {
            self.advance();
            let operand = self.parse_expression(NOT_PRECEDENCE + 1)?;
            Expr::Not(Box::new(operand))
        } else {
            self.parse_primary()?
        };

        while let Some(op) = self.current_binop() {
            let precedence = op.precedence();
            if precedence >= min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_expression(precedence)?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, DrlError> {
        let Some(token) = self.current_token() else {
            return Err(self.error(
                "Unexpected end of expression",
                "Expected a value, reference, or function call",
            ));
        };

        match token.kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression(LOOSEST)?;
                if !self.check(TokenKind::RParen) {
                    return Err(self.error(
                        "Missing closing parenthesis ')'",
                        "Every opening '(' must have a matching closing ')'",
                    ));
                }
                self.advance();
                Ok(expr)
            }
            TokenKind::Function => self.parse_call(),

            // Unary minus
            TokenKind::Operator if token.text == "-" => {
                self.advance();
                let operand = self.parse_primary()?;
                Ok(Expr::binary(BinOp::Subtract, Expr::number("0"), operand))
            }

            TokenKind::Reference => {
                let path = token.text.clone();
                let position = token.position;
                let behavior = token.behavior.unwrap_or_default();
                self.advance();
                Ok(Expr::Reference {
                    path,
                    behavior,
                    position,
                })
            }
            TokenKind::String => {
                let text = token.text.clone();
                self.advance();
                Ok(Expr::string(text))
            }
            TokenKind::Number => {
                let text = token.text.clone();
                self.advance();
                Ok(Expr::number(text))
            }
            TokenKind::Boolean => {
                let value = token.text == "True";
                self.advance();
                Ok(Expr::boolean(value))
            }
            TokenKind::Identifier => {
                let name = token.text.clone();
                self.advance();
                Ok(Expr::Identifier(name))
            }

            TokenKind::Operator
            | TokenKind::Comparison
            | TokenKind::Logical
            | TokenKind::Not
            | TokenKind::RParen
            | TokenKind::Comma => Err(self.error(
                format!("Unexpected '{}'", token.text),
                "Expected a value, reference, or function call",
            )),
        }
    }

    /// `name(arg, ...)`; empty comma slots are skipped.
    fn parse_call(&mut self) -> Result<Expr, DrlError> {
        let Some(name_token) = self.advance() else {
            return Err(self.error("Unexpected end of expression", "Expected a function name"));
        };
        let name = name_token.text;

        if !self.check(TokenKind::LParen) {
            return Err(self.error(
                format!("Expected '(' after function name '{}'", name),
                format!("Function calls must be followed by parentheses: {}(...)", name),
            ));
        }
        self.advance();

        let mut args = Vec::new();
        while self.current_token().is_some() && !self.check(TokenKind::RParen) {
            if self.check(TokenKind::Comma) {
                self.advance();
                continue;
            }
            args.push(self.parse_expression(LOOSEST)?);
        }

        if !self.check(TokenKind::RParen) {
            return Err(self.error(
                format!("Missing closing parenthesis for function '{}'", name),
                format!("Function call started but never closed: {}(...)", name),
            ));
        }
        self.advance();

        Ok(Expr::Call {
            name,
            args,
            position: name_token.position,
        })
    }

    /// Parses the whole token stream. `None` for an empty stream.
    pub fn parse(&mut self) -> Result<Option<Expr>, DrlError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expr = self.parse_expression(LOOSEST)?;
        if let Some(extra) = self.current_token() {
            return Err(self.error(
                format!("Unexpected '{}' after complete expression", extra.text),
                "Remove the extra tokens or join them with an operator",
            ));
        }
        Ok(Some(expr))
    }
}

/// Builds the expression tree for a token stream.
///
/// ```
/// use drlang::{BinOp, Config, Expr, parse, tokenize};
///
/// let tree = parse(tokenize("2 + 3 * 4", &Config::default()).unwrap()).unwrap();
/// let Some(Expr::BinaryOp { op, .. }) = tree else { panic!("expected a binary operation") };
/// assert_eq!(op, BinOp::Add);
/// ```
pub fn parse(tokens: Vec<Token>) -> Result<Option<Expr>, DrlError> {
    let count = tokens.len();
    let expr = Parser::new(tokens).parse()?;
    trace!("parsed {} tokens", count);
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, lexer::tokenize};

    fn parse_str(input: &str) -> Result<Option<Expr>, DrlError> {
        parse(tokenize(input, &Config::default())?)
    }

    #[test]
    fn test_power_is_left_associative() {
        let expected = Expr::binary(
            BinOp::Power,
            Expr::binary(BinOp::Power, Expr::number("2"), Expr::number("3")),
            Expr::number("2"),
        );
        assert_eq!(parse_str("2 ^ 3 ^ 2").unwrap(), Some(expected));
    }

    #[test]
    fn test_not_binds_looser_than_equality() {
        let tree = parse_str("not $a == 1 and True").unwrap();
        let Some(Expr::BinaryOp { op: BinOp::And, left, .. }) = tree else {
            panic!("expected 'and' at the root");
        };
        assert!(matches!(*left, Expr::Not(ref inner) if matches!(**inner, Expr::BinaryOp { op: BinOp::Equal, .. })));
    }

    #[test]
    fn test_empty_comma_slots_skipped() {
        let Some(Expr::Call { args, .. }) = parse_str("f(1,,2,)").unwrap() else {
            panic!("expected a call");
        };
        assert_eq!(args, vec![Expr::number("1"), Expr::number("2")]);
    }

    #[test]
    fn test_leftover_tokens_rejected() {
        let err = parse_str("(1 + 2))").unwrap_err();
        assert!(matches!(err, DrlError::Syntax(_)));
        assert_eq!(err.position(), Some(7));
    }
}
