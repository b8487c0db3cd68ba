use super::statements::{FnDef, ImplBlock, TraitDef, TypeDef, VarDef};

/// A completed top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Import(Vec<String>),
    Var(VarDef),
    Fn(FnDef),
    Type(TypeDef),
    Trait(TraitDef),
    Impl(ImplBlock),
}

impl Decl {
    /// Name used in logs.
    pub fn name(&self) -> String {
        match self {
            Decl::Import(path) => path.join("::"),
            Decl::Var(var) => var.name.clone(),
            Decl::Fn(function) => function.name.clone(),
            Decl::Type(type_def) => type_def.name.clone(),
            Decl::Trait(trait_def) => trait_def.name.clone(),
            Decl::Impl(block) => format!("impl {}", block.target),
        }
    }
}
