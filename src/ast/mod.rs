/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Top-level declarations
/// - expressions: Expressions, operators and match arms
/// - statements: Statements and declaration bodies
/// - types: The resolved type system
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;
