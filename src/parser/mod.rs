//! Parser module for building the Elz parse tree.
//!
//! This module turns a stream of tokens into a tree of rule-tagged nodes
//! and replays that tree as enter/exit events. It handles:
//!
//! - Declaration parsing (imports, variables, functions, types, traits, impls)
//! - Statement parsing inside function bodies
//! - Expression parsing (binary ops, ternaries, calls, field access)
//! - Recovery from malformed sub-expressions
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod tree;

#[cfg(test)]
mod tests;
