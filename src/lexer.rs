//! Anchor-letter tokenizer shared by both netlist grammars.
//!
//! Geometry in both formats is a run of letter-prefixed numbers packed with
//! little or no delimiting, surrounded by text the grammars do not care
//! about. The lexer covers every byte of its input so the parsers can tell
//! whether two anchors are adjacent.

use logos::{Logos, SpannedIter};

pub(crate) type Span = logos::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

impl Token {
    pub(crate) fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.span.clone()]
    }

    /// The numeric run after the anchor letter(s), without leading blanks
    pub(crate) fn digits<'a>(&self, input: &'a str) -> &'a str {
        let text = self.text(input);
        let prefix = match self.kind {
            TokenKind::Pad => 2,
            TokenKind::X | TokenKind::Y | TokenKind::R | TokenKind::S => 1,
            TokenKind::Gap | TokenKind::Other => 0,
        };
        text[prefix..].trim_start_matches([' ', '\t'])
    }

    /// Blanks between the anchor letter and its number (`X 029311`)
    pub(crate) fn is_spaced(&self, input: &str) -> bool {
        self.text(input).contains([' ', '\t'])
    }

    /// An explicit `+` or `-` in front of the number
    pub(crate) fn is_signed(&self, input: &str) -> bool {
        self.digits(input).starts_with(['+', '-'])
    }
}

pub(crate) struct TokenIter<'a> {
    iter: SpannedIter<'a, LogosTokenKind>,
}

impl<'a> TokenIter<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            iter: LogosTokenKind::lexer(input).spanned(),
        }
    }
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let (kind, span) = self.iter.next()?;
        let kind = match kind {
            Ok(LogosTokenKind::Pad) => TokenKind::Pad,
            Ok(LogosTokenKind::X) => TokenKind::X,
            Ok(LogosTokenKind::Y) => TokenKind::Y,
            Ok(LogosTokenKind::R) => TokenKind::R,
            Ok(LogosTokenKind::S) => TokenKind::S,
            Ok(LogosTokenKind::Gap) => TokenKind::Gap,
            Err(_) => TokenKind::Other,
        };
        Some(Token { kind, span })
    }
}

pub(crate) fn tokenize(input: &str) -> Vec<Token> {
    TokenIter::new(input).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// `PA<digits>`, the pad access marker opening a flat-format block
    Pad,
    X,
    Y,
    /// Rotation
    R,
    /// Symbol or side
    S,
    Gap,
    Other,
}

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
enum LogosTokenKind {
    #[regex(r"PA[0-9]+")]
    Pad,
    #[regex(r"X[ \t]*[+-]?[0-9]+")]
    X,
    #[regex(r"Y[ \t]*[+-]?[0-9]+")]
    Y,
    #[regex(r"R[0-9]+")]
    R,
    #[regex(r"S[0-9]+")]
    S,
    #[regex(r"[ \t\r\n\f]+")]
    Gap,
}
