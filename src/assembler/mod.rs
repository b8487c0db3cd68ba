//! Bottom-up AST assembly.
//!
//! The assembler listens to the parse-tree walk and builds expressions,
//! statements and declarations on an operand stack:
//!
//! - `stack`: the operand stack and its fragment kinds
//! - `assembler`: the listener and the `DeclarationSink` it feeds

pub mod assembler;
pub mod stack;

#[cfg(test)]
mod tests;
