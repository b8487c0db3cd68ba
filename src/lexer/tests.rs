//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Numeric literals with and without width suffixes
//! - String literals with escape sequences
//! - Operators and punctuation
//! - Line-break tracking
//! - Error cases

use super::{lexer::tokenize, tokens::TokenKind};

#[test]
fn test_tokenize_keywords() {
    let source = "let mut fn return import match type trait impl".to_string();
    let tokens = tokenize(source, Some("test.elz".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Let);
    assert_eq!(tokens[1].kind, TokenKind::Mut);
    assert_eq!(tokens[2].kind, TokenKind::Fn);
    assert_eq!(tokens[3].kind, TokenKind::Return);
    assert_eq!(tokens[4].kind, TokenKind::Import);
    assert_eq!(tokens[5].kind, TokenKind::Match);
    assert_eq!(tokens[6].kind, TokenKind::Type);
    assert_eq!(tokens[7].kind, TokenKind::Trait);
    assert_eq!(tokens[8].kind, TokenKind::Impl);
    assert_eq!(tokens[9].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo baz_123 _ CamelCase".to_string();
    let tokens = tokenize(source, Some("test.elz".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].value, "baz_123");
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
    assert_eq!(tokens[2].value, "_");
    assert_eq!(tokens[3].value, "CamelCase");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers_with_suffixes() {
    let source = "42 3.14 3'i8 3'f32 3.14'f64 7'u8".to_string();
    let tokens = tokenize(source, Some("test.elz".to_string())).unwrap();

    let values: Vec<&str> = tokens[..6].iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, vec!["42", "3.14", "3'i8", "3'f32", "3.14'f64", "7'u8"]);
    assert!(tokens[..6].iter().all(|t| t.kind == TokenKind::Number));

    assert_eq!(tokens[0].number_parts(), ("42", None));
    assert_eq!(tokens[2].number_parts(), ("3", Some("i8")));
    assert_eq!(tokens[4].number_parts(), ("3.14", Some("f64")));
}

#[test]
fn test_tokenize_strings() {
    let source = r#""hello" "multiple words" "a\nb" "tab\there""#.to_string();
    let tokens = tokenize(source, Some("test.elz".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "multiple words");
    assert_eq!(tokens[2].value, "a\nb");
    assert_eq!(tokens[3].value, "tab\there");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_escaped_quote() {
    let source = r#"s = "say \"hi\"" t"#.to_string();
    let tokens = tokenize(source, Some("test.elz".to_string())).unwrap();

    assert_eq!(tokens[2].kind, TokenKind::String);
    assert_eq!(tokens[2].value, "say \"hi\"");
    assert_eq!(tokens[3].kind, TokenKind::Identifier);
    assert_eq!(tokens[3].value, "t");
}

#[test]
fn test_tokenize_operators() {
    let source = "+ - * / ^ == != < > <= >= = => -> : :: ? . ,".to_string();
    let tokens = tokenize(source, Some("test.elz".to_string())).unwrap();

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Caret,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::Assignment,
            TokenKind::FatArrow,
            TokenKind::Arrow,
            TokenKind::Colon,
            TokenKind::ColonColon,
            TokenKind::Question,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_comments_and_newlines() {
    let source = "x = 1 // one\n+y = 2".to_string();
    let tokens = tokenize(source, Some("test.elz".to_string())).unwrap();

    assert_eq!(tokens[3].kind, TokenKind::Plus);
    assert!(tokens[3].newline_before);
    assert!(!tokens[4].newline_before);
    assert_eq!(tokens[4].value, "y");
}

#[test]
fn test_token_spans() {
    let source = "let abc = 10".to_string();
    let tokens = tokenize(source, Some("test.elz".to_string())).unwrap();

    assert_eq!(tokens[1].span.start.0, 4);
    assert_eq!(tokens[1].span.end.0, 7);
    assert_eq!(tokens[3].span.start.0, 10);
    assert_eq!(tokens[3].span.start.1.as_str(), "test.elz");
}

#[test]
fn test_unrecognised_token() {
    let result = tokenize("x = @".to_string(), None);

    let error = result.unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 4);
    assert_eq!(error.get_position().1.as_str(), "shell");
}
