//! Turns source text into a sequence of [`Token`]s.

use crate::lexer::{Literal, Token, TokenKind};
use log::debug;
use logos::Logos;
use lox_source::{ErrorReporter, LexError, Response};

/// Scans `source` in a single left-to-right pass.
///
/// The scanner never aborts: every lexical error is collected and a best-effort token sequence is
/// still returned. Whitespace and comments never appear in the output and the sequence always
/// ends with a single [`TokenKind::Eof`] token carrying the final line number.
pub fn scan(source: &str) -> Response<Vec<Token>, LexError> {
    let errors = ErrorReporter::new();
    let mut tokens = Vec::new();
    let mut line = 0;

    let mut lexer = TokenKind::lexer(source);
    while let Some(kind) = lexer.next() {
        let lexeme = lexer.slice();
        line += lexeme.matches('\n').count();

        match kind {
            TokenKind::Ignorable => {}
            TokenKind::Invalid => errors.add_error(LexError::new(invalid_message(lexeme), line)),
            TokenKind::Number => match lexeme.parse() {
                Ok(val) => tokens.push(Token::new(kind, lexeme, Some(Literal::Number(val)), line)),
                Err(_) => errors.add_error(LexError::new(
                    format!("Invalid number literal {}.", lexeme),
                    line,
                )),
            },
            TokenKind::String => {
                // shave off the surrounding quotes
                let val = lexeme[1..lexeme.len() - 1].to_string();
                tokens.push(Token::new(kind, lexeme, Some(Literal::Str(val)), line));
            }
            _ => tokens.push(Token::new(kind, lexeme, None, line)),
        }
    }
    tokens.push(Token::new(TokenKind::Eof, "", None, line));

    debug!(
        "scanned {} tokens with {} lexical errors",
        tokens.len(),
        errors.len()
    );
    Response::new(tokens, errors.into_errors())
}

fn invalid_message(lexeme: &str) -> String {
    if lexeme.starts_with('"') {
        "Unterminated string.".to_string()
    } else {
        let c = lexeme.chars().next().unwrap_or_default();
        format!("Unexpected character {}.", c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns every token kind except the trailing `Eof`.
    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source)
            .result
            .into_iter()
            .map(|token| token.kind)
            .filter(|kind| *kind != TokenKind::Eof)
            .collect()
    }

    #[test]
    fn test_comments() {
        for source in &["//.\n", "//.", "///"] {
            let response = scan(source);
            assert!(response.errors.is_empty());
            assert_eq!(response.result.len(), 1);
            assert_eq!(response.result[0].kind, TokenKind::Eof);
        }
    }

    #[test]
    fn test_string_literal() {
        let response = scan("\"test\"");
        assert!(response.errors.is_empty());
        assert_eq!(kinds("\"test\""), vec![TokenKind::String]);
        assert_eq!(
            response.result[0].literal,
            Some(Literal::Str("test".to_string()))
        );
        assert_eq!(response.result[0].lexeme, "\"test\"");
    }

    #[test]
    fn test_multi_line_string() {
        let response = scan("\"a\nb\" x");
        assert!(response.errors.is_empty());
        assert_eq!(
            response.result[0].literal,
            Some(Literal::Str("a\nb".to_string()))
        );
        assert_eq!(response.result[0].line, 1);
        assert_eq!(response.result[1].line, 1);
    }

    #[test]
    fn test_unexpected_character() {
        let response = scan("#");
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("Unexpected character"));
        assert_eq!(response.errors[0].message, "Unexpected character #.");
    }

    #[test]
    fn test_unterminated_string() {
        let response = scan("\"this is an unterminated string");
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("Unterminated string"));
        assert_eq!(kinds("\"this is an unterminated string"), vec![]);
    }

    #[test]
    fn test_errors_do_not_stop_scanning() {
        let response = scan("var # a @ = 1;");
        assert_eq!(response.errors.len(), 2);
        assert_eq!(
            kinds("var # a @ = 1;"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Number,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_number() {
        let response = scan("123.12");
        assert_eq!(kinds("123.12"), vec![TokenKind::Number]);
        assert_eq!(response.result[0].literal, Some(Literal::Number(123.12)));

        assert_eq!(kinds("123."), vec![TokenKind::Number, TokenKind::Dot]);
        assert_eq!(
            scan("123.").result[0].literal,
            Some(Literal::Number(123.0))
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("for love and war"),
            vec![
                TokenKind::For,
                TokenKind::Identifier,
                TokenKind::And,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = scan("a\nb // comment\n\nc").result;
        let lines: Vec<usize> = tokens.iter().map(|token| token.line).collect();
        assert_eq!(lines, vec![0, 1, 3, 3]);
    }

    #[test]
    fn test_lexemes_round_trip() {
        let source = "fun add(a, b) { return a + b; } // sum\nprint add(1, 2.5) >= \"x\";";
        let rendered: String = scan(source)
            .result
            .iter()
            .map(|token| token.lexeme.as_str())
            .collect();
        let expected: String = source
            .replace("// sum", "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        assert_eq!(rendered, expected);
    }
}
