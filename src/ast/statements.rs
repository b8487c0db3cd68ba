use super::expressions::{Expr, MatchExpr};

/// `let [mut] [+]name[: Type] = init`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub declared_type: Option<String>,
    pub exported: bool,
    pub mutable: bool,
    pub init: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Vec<Stmt>,
    pub exported: bool,
}

/// A struct attribute as written in source.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrDef {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub attrs: Vec<AttrDef>,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitDef {
    pub name: String,
    pub methods: Vec<MethodSig>,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplBlock {
    pub target: String,
    pub interfaces: Vec<String>,
    pub methods: Vec<FnDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDef(VarDef),
    Assign { name: String, value: Expr },
    Return(Option<Expr>),
    Expr(Expr),
    Match(MatchExpr),
}
