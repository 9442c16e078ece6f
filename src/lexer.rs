use log::trace;

use crate::{
    ast::{RefBehavior, Token, TokenKind},
    config::Config,
    error::DrlError,
};

/// Characters that end a bare `$path` reference.
const BARE_STOP_CHARS: &str = "(),'\"+-*/%^<>=![]{}";

/// Characters after a comparison-like key delimiter that make it a comparison.
const OPERATOR_FOLLOWERS: &str = "=!<>(),'\"+-*/%^";

/// Index of the bracket closing the one at `open_at`, counting nested
/// occurrences of the same opening bracket.
pub(crate) fn matching_close(chars: &[char], open_at: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(open_at) {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Whether `chars[at..]` starts with `pattern`.
pub(crate) fn starts_with_at(chars: &[char], at: usize, pattern: &str) -> bool {
    let mut i = at;
    for p in pattern.chars() {
        if chars.get(i) != Some(&p) {
            return false;
        }
        i += 1;
    }
    true
}

pub struct Lexer<'a> {
    source: &'a str,
    input: Vec<char>,
    position: usize,
    config: &'a Config,
    stop_chars: Vec<char>,
    delimiter_len: usize,
    /// Key delimiter made only of `<`, `>`, `=`: may double as a comparison
    delimiter_is_comparison: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, config: &'a Config) -> Self {
        let delimiter = config.key_delimiter();
        let mut stop_chars: Vec<char> = BARE_STOP_CHARS
            .chars()
            .filter(|c| !delimiter.contains(*c))
            .collect();
        stop_chars.push(config.ref_indicator());

        Lexer {
            source,
            input: source.chars().collect(),
            position: 0,
            config,
            stop_chars,
            delimiter_len: delimiter.chars().count(),
            delimiter_is_comparison: delimiter.chars().all(|c| "<>=".contains(c)),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, message: impl Into<String>, position: usize, context: impl Into<String>) -> DrlError {
        DrlError::syntax(message)
            .with_expression(self.source)
            .with_position(position)
            .with_context(context)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_stop(&self, c: char) -> bool {
        self.stop_chars.contains(&c)
    }

    /// A comparison-like key delimiter at `at` that is really an operator:
    /// followed by whitespace, the end of input or another operator character.
    fn delimiter_is_operator_at(&self, at: usize) -> bool {
        if !self.delimiter_is_comparison
            || !starts_with_at(&self.input, at, self.config.key_delimiter())
        {
            return false;
        }
        match self.input.get(at + self.delimiter_len) {
            None => true,
            Some(c) => c.is_whitespace() || OPERATOR_FOLLOWERS.contains(*c),
        }
    }

    /// Whole-word `word` starting at `at`.
    fn keyword_at(&self, at: usize, word: &str) -> bool {
        starts_with_at(&self.input, at, word)
            && !self
                .input
                .get(at + word.len())
                .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_')
    }

    /// Whether whitespace at the cursor ends a bare reference, judged by the
    /// next non-space text.
    fn whitespace_ends_reference(&self) -> bool {
        let mut j = self.position;
        while self.input.get(j).is_some_and(|c| c.is_whitespace()) {
            j += 1;
        }
        let Some(&next) = self.input.get(j) else {
            return false;
        };
        self.is_stop(next)
            || self.delimiter_is_operator_at(j)
            || self.keyword_at(j, "and")
            || self.keyword_at(j, "or")
            || self.keyword_at(j, "not")
    }

    fn read_bare_reference(&mut self, start: usize) -> Result<Token, DrlError> {
        let mut path = String::new();
        while let Some(ch) = self.current_char() {
            if self.delimiter_is_operator_at(self.position) || self.is_stop(ch) {
                break;
            }
            if ch.is_whitespace() && self.whitespace_ends_reference() {
                break;
            }
            path.push(ch);
            self.advance();
        }

        let path = path.trim();
        if path.is_empty() {
            return Err(self.error(
                "Empty reference",
                start,
                format!(
                    "'{}' must be followed by a path or a bracketed reference",
                    self.config.ref_indicator()
                ),
            ));
        }
        Ok(Token::reference(path, RefBehavior::Required, start))
    }

    fn read_bracketed_reference(&mut self, start: usize, behavior: RefBehavior) -> Result<Token, DrlError> {
        let (open, close) = behavior.delimiters();
        let open_at = self.position;
        let Some(close_at) = matching_close(&self.input, open_at, open, close) else {
            return Err(self.error(
                format!("Unterminated reference: expected closing '{}'", close),
                start,
                format!("Reference started at position {} but never closed", start),
            ));
        };

        let path: String = self.input[open_at + 1..close_at].iter().collect();
        self.position = close_at + 1;
        Ok(Token::reference(path.trim(), behavior, start))
    }

    fn read_reference(&mut self) -> Result<Token, DrlError> {
        let start = self.position;
        self.advance();
        match self.current_char().and_then(RefBehavior::from_opening) {
            Some(behavior) => self.read_bracketed_reference(start, behavior),
            None => self.read_bare_reference(start),
        }
    }

    /// Backslash takes the next character verbatim.
    fn read_string(&mut self, quote: char) -> Result<Token, DrlError> {
        let start = self.position;
        let mut result = String::new();
        self.advance();

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(Token::new(TokenKind::String, result, start));
                }
                '\\' if self.peek_char(1).is_some() => {
                    self.advance();
                    if let Some(escaped) = self.current_char() {
                        result.push(escaped);
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error(
            format!("Unterminated string literal starting with {}", quote),
            start,
            format!("String started at position {} but never closed", start),
        ))
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        let mut number = String::new();
        let mut seen_dot = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                number.push(ch);
            } else {
                break;
            }
            self.advance();
        }

        Token::new(TokenKind::Number, number, start)
    }

    fn read_word(&mut self) -> Token {
        let start = self.position;
        let mut word = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match word.as_str() {
            "True" | "False" => TokenKind::Boolean,
            "and" | "or" => TokenKind::Logical,
            "not" => TokenKind::Not,
            _ => {
                let mut j = self.position;
                while self.input.get(j).is_some_and(|c| c.is_whitespace()) {
                    j += 1;
                }
                if self.input.get(j) == Some(&'(') {
                    TokenKind::Function
                } else {
                    TokenKind::Identifier
                }
            }
        };
        Token::new(kind, word, start)
    }

    fn single(&mut self, kind: TokenKind, ch: char) -> Token {
        let token = Token::new(kind, ch.to_string(), self.position);
        self.advance();
        token
    }

    fn double(&mut self, kind: TokenKind) -> Token {
        let text: String = self.input[self.position..self.position + 2].iter().collect();
        let token = Token::new(kind, text, self.position);
        self.advance();
        self.advance();
        token
    }

    /// Next token, or `None` at the end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, DrlError> {
        self.skip_whitespace();

        let Some(ch) = self.current_char() else {
            return Ok(None);
        };
        let pos = self.position;

        let token = match ch {
            c if c == self.config.ref_indicator() => self.read_reference()?,
            '"' | '\'' => self.read_string(ch)?,
            '(' => self.single(TokenKind::LParen, ch),
            ')' => self.single(TokenKind::RParen, ch),
            ',' => self.single(TokenKind::Comma, ch),
            '+' | '-' | '*' | '/' | '%' | '^' => self.single(TokenKind::Operator, ch),
            '=' | '!' | '<' | '>' if self.peek_char(1) == Some('=') => self.double(TokenKind::Comparison),
            '<' | '>' => self.single(TokenKind::Comparison, ch),
            '!' => {
                return Err(self.error(
                    "Unexpected '!' character - did you mean '!=' for not-equal comparison?",
                    pos,
                    "The '!' character is only valid as part of the '!=' operator",
                ));
            }
            '=' => {
                return Err(self.error(
                    "Unexpected '=' character - did you mean '==' for equality?",
                    pos,
                    "Assignment is not supported; compare with '=='",
                ));
            }
            c if c.is_ascii_digit() => self.read_number(),
            '.' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_word(),
            c => {
                return Err(self.error(
                    format!("Unexpected character '{}'", c),
                    pos,
                    "This character is not valid syntax",
                ));
            }
        };
        Ok(Some(token))
    }
}

/// Splits an expression into tokens.
///
/// ```
/// use drlang::{Config, TokenKind, tokenize};
///
/// let tokens = tokenize("upper($user>name)", &Config::default()).unwrap();
/// let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![TokenKind::Function, TokenKind::LParen, TokenKind::Reference, TokenKind::RParen]
/// );
/// assert_eq!(tokens[2].text, "user>name");
/// ```
pub fn tokenize(text: &str, config: &Config) -> Result<Vec<Token>, DrlError> {
    let mut lexer = Lexer::new(text, config);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    trace!("tokenized {:?} into {} tokens", text, tokens.len());
    Ok(tokens)
}
