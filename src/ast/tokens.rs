/// Failure policy of a reference, chosen by the bracket that follows the
/// reference indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefBehavior {
    /// `$(path)` or bare `$path`: a missing segment is an error
    #[default]
    Required,

    /// `$[path]`: a missing segment yields null
    Optional,

    /// `${path}`: a missing segment yields the reference text itself
    LiteralFallback,
}

impl RefBehavior {
    /// The bracket pair selecting this behavior.
    pub fn delimiters(self) -> (char, char) {
        match self {
            RefBehavior::Required => ('(', ')'),
            RefBehavior::Optional => ('[', ']'),
            RefBehavior::LiteralFallback => ('{', '}'),
        }
    }

    /// Behavior selected by an opening bracket, if `c` is one.
    pub fn from_opening(c: char) -> Option<Self> {
        match c {
            '(' => Some(RefBehavior::Required),
            '[' => Some(RefBehavior::Optional),
            '{' => Some(RefBehavior::LiteralFallback),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Data reference; the token text is the path
    ///
    /// # Examples
    /// ```text
    /// $user>name
    /// $(items>0)
    /// $[settings>theme]
    /// ${greeting}
    /// ```
    Reference,

    /// Quoted string literal; the token text is the unescaped content
    String,

    /// Integer or decimal literal, kept as written
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// .5
    /// ```
    Number,

    /// `True` or `False`
    Boolean,

    /// Bare word not followed by `(`
    Identifier,

    /// Word immediately (modulo whitespace) followed by `(`
    Function,

    /// Arithmetic: `+ - * / % ^`
    Operator,

    /// `== != < > <= >=`
    Comparison,

    /// `and`, `or`
    Logical,

    /// `not`
    Not,

    LParen,
    RParen,
    Comma,
}

/// A lexical token. `behavior` is set only for references.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub behavior: Option<RefBehavior>,
    /// Character offset of the token's first character in the source
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            behavior: None,
            position,
        }
    }

    pub fn reference(path: impl Into<String>, behavior: RefBehavior, position: usize) -> Self {
        Token {
            kind: TokenKind::Reference,
            text: path.into(),
            behavior: Some(behavior),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Source text that lexes back to this token.
    ///
    /// References are written in bracketed form and strings are re-quoted;
    /// string contents are not re-escaped.
    pub fn to_source(&self, ref_indicator: char) -> String {
        match (self.kind, self.behavior) {
            (TokenKind::Reference, Some(behavior)) => {
                let (open, close) = behavior.delimiters();
                format!("{}{}{}{}", ref_indicator, open, self.text, close)
            }
            (TokenKind::String, _) if self.text.contains('\'') => format!("\"{}\"", self.text),
            (TokenKind::String, _) => format!("'{}'", self.text),
            _ => self.text.clone(),
        }
    }
}
