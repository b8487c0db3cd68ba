use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("let", TokenKind::Let);
        map.insert("mut", TokenKind::Mut);
        map.insert("fn", TokenKind::Fn);
        map.insert("return", TokenKind::Return);
        map.insert("import", TokenKind::Import);
        map.insert("match", TokenKind::Match);
        map.insert("type", TokenKind::Type);
        map.insert("trait", TokenKind::Trait);
        map.insert("impl", TokenKind::Impl);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    String,
    Identifier,

    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Dot,
    Colon,
    ColonColon,
    Question,
    Comma,
    Arrow,    // ->
    FatArrow, // =>

    Plus,
    Dash,
    Slash,
    Star,
    Caret,

    // Reserved
    Let,
    Mut,
    Fn,
    Return,
    Import,
    Match,
    Type,
    Trait,
    Impl,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
    /// Whether a line break separates this token from the previous one.
    pub newline_before: bool,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// Splits a number token into its digits and optional `'suffix`.
    pub fn number_parts(&self) -> (&str, Option<&str>) {
        match self.value.split_once('\'') {
            Some((digits, suffix)) => (digits, Some(suffix)),
            None => (self.value.as_str(), None),
        }
    }
}
