//! Lexical analysis module for the compiler.
//!
//! This module contains the lexer (tokenizer) that converts Elz source code
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using regex patterns
//! - Recognition of keywords, identifiers, literals, and operators
//! - Numeric literal suffixes such as `3'i8` or `2'f64`
//! - Token position and line-break tracking for the parser

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
