//! Scoping and type inference.
//!
//! This module holds the pieces of semantic analysis that the code
//! generator leans on:
//!
//! - `environment`: the scope chain of global and function frames
//! - `inference`: literal width rules, annotation checks and static
//!   inference of initializer types

pub mod environment;
pub mod inference;

#[cfg(test)]
mod tests;
