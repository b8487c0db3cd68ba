//! Code generation module for the compiler.
//!
//! This module turns completed declarations into LLVM IR. It handles:
//!
//! - Global definitions with constant-folded initializers
//! - Functions, methods and their statements
//! - Type-directed operator lowering and struct field access
//! - Match lowering into compare-and-branch chains
//! - Symbol deduplication once the module is complete

pub mod compiler;
pub mod constant;
pub mod decl;
pub mod expr;
pub mod finalize;
pub mod operators;
pub mod stmt;
