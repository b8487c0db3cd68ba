//! Error types and diagnostics for the compiler.
//!
//! Two families of problems are reported:
//!
//! - `errors::Error` values that stop the pipeline (bad tokens, malformed
//!   declarations, operator/type pairs with no lowering)
//! - `reporter::Diagnostic` entries collected by the `Reporter`, which never
//!   interrupt the pass that produced them

pub mod errors;
pub mod reporter;

#[cfg(test)]
mod tests;
