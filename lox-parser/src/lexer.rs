use logos::{Lexer, Logos};
use std::fmt;

/// The raw lexical grammar. [`crate::scanner::scan`] drives this and turns it into [`Token`]s.
#[derive(Debug, Logos, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // punctuation
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,

    // operators
    // - arithmetics
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("+")]
    Plus,
    #[token("/")]
    Slash,
    #[token("*")]
    Star,
    // - one or two characters
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,

    // literals
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
    #[token("\"", string)]
    String,
    #[regex("[0-9]+", fraction)]
    Number,

    // keywords
    #[token("and")]
    And,
    #[token("class")]
    Class,
    #[token("else")]
    Else,
    #[token("false")]
    False,
    #[token("fun")]
    Fun,
    #[token("for")]
    For,
    #[token("if")]
    If,
    #[token("nil")]
    Nil,
    #[token("or")]
    Or,
    #[token("print")]
    Print,
    #[token("return")]
    Return,
    #[token("super")]
    Super,
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("var")]
    Var,
    #[token("while")]
    While,

    // misc
    /// Only generated by the scanner once the source is exhausted.
    Eof,
    #[regex(r"[ \t\r\n]+")]
    #[regex(r"//[^\n]*")] // single line comments
    Ignorable,
    #[error]
    Invalid,
}

/// Consumes a string literal up to and including the closing quote.
/// Returns `false` (invalid token spanning the rest of the input) if the string is unterminated.
fn string(lex: &mut Lexer<TokenKind>) -> bool {
    match lex.remainder().find('"') {
        Some(end) => {
            lex.bump(end + 1);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

/// Consumes the fractional part of a number, only if a digit follows the `.`.
fn fraction(lex: &mut Lexer<TokenKind>) -> bool {
    let rest = lex.remainder().as_bytes();
    if rest.len() >= 2 && rest[0] == b'.' && rest[1].is_ascii_digit() {
        let digits = rest[1..].iter().take_while(|b| b.is_ascii_digit()).count();
        lex.bump(1 + digits);
    }
    true
}

impl TokenKind {
    /// Returns `true` if the token kind usually starts a new statement.
    /// The parser synchronizes on these after an error.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return
        )
    }
}

/// The value carried by number and string tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(val) => write!(f, "{}", val),
            Literal::Str(val) => write!(f, "{}", val),
        }
    }
}

/// A scanned token. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text the token was scanned from.
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl ToString, literal: Option<Literal>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.to_string(),
            literal,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "{:?} {} {}", self.kind, self.lexeme, literal),
            None => write!(f, "{:?} {}", self.kind, self.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        TokenKind::lexer(source)
            .filter(|kind| *kind != TokenKind::Ignorable)
            .collect()
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("! != = == < <= > >="),
            vec![
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
            ]
        );
    }

    #[test]
    fn test_keywords_are_exact() {
        assert_eq!(
            kinds("or orchid While while _var"),
            vec![
                TokenKind::Or,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::While,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_trailing_dot_is_not_part_of_number() {
        let mut lex = TokenKind::lexer("123.");
        assert_eq!(lex.next(), Some(TokenKind::Number));
        assert_eq!(lex.slice(), "123");
        assert_eq!(lex.next(), Some(TokenKind::Dot));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_comment_swallows_slashes() {
        assert_eq!(kinds("/ ///"), vec![TokenKind::Slash]);
    }
}
