//! logos-based CSS tokenizer.
//!
//! The language only needs block structure, so the lexer recognises the four
//! punctuation characters and lumps everything else into [`Token::Chunk`]s.
//! Whitespace stays inside chunks (it is significant in values such as
//! `text-align: center bottom`); callers trim. Comments are removed before
//! lexing by [`crate::css::parser`].

use std::ops::Range;

use logos::Logos;

/// CSS token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// Any run of other characters: selectors, names, values, whitespace.
    #[regex(r"[^{}:;]+")]
    Chunk,
}

/// Tokenize a CSS string into `(Token, byte span)` pairs.
pub fn tokenize(input: &str) -> Vec<(Token, Range<usize>)> {
    Token::lexer(input)
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tokens("{}:;"),
            vec![Token::BraceOpen, Token::BraceClose, Token::Colon, Token::Semicolon]
        );
    }

    #[test]
    fn test_rule_shape() {
        assert_eq!(
            tokens(".a { color: red; }"),
            vec![
                Token::Chunk,
                Token::BraceOpen,
                Token::Chunk,
                Token::Colon,
                Token::Chunk,
                Token::Semicolon,
                Token::Chunk,
                Token::BraceClose,
            ]
        );
    }

    #[test]
    fn test_chunk_keeps_inner_whitespace() {
        let src = "text-align: center bottom;";
        let spans = tokenize(src);
        let (tok, span) = spans[2].clone();
        assert_eq!(tok, Token::Chunk);
        assert_eq!(&src[span], " center bottom");
    }
}
