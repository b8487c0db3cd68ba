//! Type system definitions for the AST.
//!
//! This module defines the closed set of Elz types:
//!
//! - Signed integers of width 8, 16, 32 and 64
//! - Floats of width 32 and 64
//! - Booleans and strings
//! - Named structs with ordered fields
//! - Named traits with ordered method signatures
//!
//! Source annotations are kept as plain names in the AST and resolved to
//! these types during code generation.

use std::{fmt::Display, rc::Rc};

use crate::errors::errors::{Error, ErrorImpl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::I8 => 8,
            IntWidth::I16 => 16,
            IntWidth::I32 => 32,
            IntWidth::I64 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    F32,
    F64,
}

impl FloatWidth {
    pub fn bits(self) -> u32 {
        match self {
            FloatWidth::F32 => 32,
            FloatWidth::F64 => 64,
        }
    }
}

/// A struct field; its position in `StructType::fields` is its ordinal.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<Field>,
}

impl StructType {
    /// Zero-based declaration position of a field.
    pub fn ordinal(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }
}

/// A function or method signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
}

#[derive(Debug, Clone)]
pub struct TraitType {
    pub name: String,
    pub methods: Vec<Signature>,
}

#[derive(Debug, Clone)]
pub enum Type {
    Int(IntWidth),
    Float(FloatWidth),
    Bool,
    String,
    Struct(Rc<StructType>),
    Trait(Rc<TraitType>),
    /// Only used as the return type of functions without `-> Type`.
    Void,
}

/// Coarse classification used by operator dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandClass {
    Int,
    Float,
    Bool,
    String,
    Struct,
    Trait,
    Void,
}

// Named types are nominal.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Int(a), Type::Int(b)) => a == b,
            (Type::Float(a), Type::Float(b)) => a == b,
            (Type::Bool, Type::Bool) | (Type::String, Type::String) | (Type::Void, Type::Void) => {
                true
            }
            (Type::Struct(a), Type::Struct(b)) => a.name == b.name,
            (Type::Trait(a), Type::Trait(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int(width) => write!(f, "i{}", width.bits()),
            Type::Float(width) => write!(f, "f{}", width.bits()),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Struct(s) => write!(f, "{}", s.name),
            Type::Trait(t) => write!(f, "{}", t.name),
            Type::Void => write!(f, "void"),
        }
    }
}

impl Type {
    /// Resolves the names of built-in types.
    pub fn builtin(name: &str) -> Option<Type> {
        match name {
            "i8" => Some(Type::Int(IntWidth::I8)),
            "i16" => Some(Type::Int(IntWidth::I16)),
            "i32" => Some(Type::Int(IntWidth::I32)),
            "i64" => Some(Type::Int(IntWidth::I64)),
            "f32" => Some(Type::Float(FloatWidth::F32)),
            "f64" => Some(Type::Float(FloatWidth::F64)),
            "bool" => Some(Type::Bool),
            "string" => Some(Type::String),
            _ => None,
        }
    }

    pub fn class(&self) -> OperandClass {
        match self {
            Type::Int(_) => OperandClass::Int,
            Type::Float(_) => OperandClass::Float,
            Type::Bool => OperandClass::Bool,
            Type::String => OperandClass::String,
            Type::Struct(_) => OperandClass::Struct,
            Type::Trait(_) => OperandClass::Trait,
            Type::Void => OperandClass::Void,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn as_struct(&self) -> Option<&Rc<StructType>> {
        match self {
            Type::Struct(s) => Some(s),
            _ => None,
        }
    }
}

/// Fails when a field has no fixed size. Trait-typed fields have no
/// concrete layout to allocate.
pub fn check_sized(struct_type: &StructType) -> Result<(), Error> {
    match struct_type
        .fields
        .iter()
        .find(|field| matches!(field.ty, Type::Trait(_) | Type::Void))
    {
        Some(field) => Err(Error::codegen(ErrorImpl::UnsizedType {
            type_: field.ty.to_string(),
        })),
        None => Ok(()),
    }
}
