//! Unit tests for the scope chain and type inference.

use std::{collections::HashMap, rc::Rc};

use pretty_assertions::assert_eq;

use crate::ast::{
    expressions::{BinaryOp, Expr},
    types::{Field, FloatWidth, IntWidth, StructType, Type},
};

use super::{
    environment::{Environment, ScopeError, ScopeKind},
    inference::{infer, mismatch_message, number_literal, TypeScope},
};

#[test]
fn test_declare_and_resolve() {
    let mut env: Environment<i32> = Environment::new();
    env.declare("x", 1, ScopeKind::Global).unwrap();

    assert_eq!(env.resolve("x"), Ok(&1));
    assert_eq!(
        env.resolve("y"),
        Err(ScopeError::Undefined { name: String::from("y") })
    );
}

#[test]
fn test_duplicate_in_same_frame() {
    let mut env: Environment<i32> = Environment::new();
    env.declare("x", 1, ScopeKind::Global).unwrap();

    let error = env.declare("x", 2, ScopeKind::Global).unwrap_err();
    assert_eq!(error.to_string(), "duplicate definition: x");
    assert_eq!(env.resolve("x"), Ok(&1));
}

#[test]
fn test_shadowing_resolves_innermost_first() {
    let mut env: Environment<i32> = Environment::new();
    env.declare("x", 1, ScopeKind::Global).unwrap();

    env.push_frame(ScopeKind::Function);
    env.declare("x", 2, ScopeKind::Function).unwrap();
    assert_eq!(env.resolve("x"), Ok(&2));

    env.pop_frame();
    assert_eq!(env.resolve("x"), Ok(&1));
}

#[test]
fn test_global_declare_from_function_frame() {
    let mut env: Environment<i32> = Environment::new();
    env.push_frame(ScopeKind::Function);
    env.declare("f", 7, ScopeKind::Global).unwrap();
    env.pop_frame();

    assert_eq!(env.resolve("f"), Ok(&7));
}

#[test]
fn test_function_declare_without_frame() {
    let mut env: Environment<i32> = Environment::new();

    assert_eq!(
        env.declare("a", 1, ScopeKind::Function),
        Err(ScopeError::NoFrame { kind: ScopeKind::Function })
    );
}

#[test]
fn test_root_frame_is_never_popped() {
    let mut env: Environment<i32> = Environment::new();
    assert!(env.pop_frame().is_none());
    assert_eq!(env.depth(), 1);
    assert_eq!(env.current_kind(), ScopeKind::Global);
}

#[test]
fn test_type_lookup() {
    let mut env: Environment<i32> = Environment::new();
    let bar = Type::Struct(Rc::new(StructType {
        name: String::from("Bar"),
        fields: vec![],
    }));
    env.declare_type("Bar", bar.clone()).unwrap();

    assert_eq!(env.get_type("Bar"), Some(bar.clone()));
    assert_eq!(env.get_type("i64"), Some(Type::Int(IntWidth::I64)));
    assert!(env.declare_type("Bar", bar).is_err());
}

#[test]
fn test_literal_suffix_sets_width() {
    for (suffix, expected) in [
        ("i8", IntWidth::I8),
        ("i16", IntWidth::I16),
        ("i32", IntWidth::I32),
        ("i64", IntWidth::I64),
    ] {
        let (expr, problems) = number_literal("100", Some(suffix));
        assert!(problems.is_empty());
        assert_eq!(expr, Expr::int(100, expected));
    }
}

#[test]
fn test_literal_too_wide_for_suffix() {
    let (expr, problems) = number_literal("300", Some("i8"));
    assert_eq!(expr, Expr::int(300, IntWidth::I8));
    assert_eq!(
        problems,
        vec![String::from("integer literal: 300 out of range for i8")]
    );

    let (_, problems) = number_literal("127", Some("i8"));
    assert!(problems.is_empty());

    let (_, problems) = number_literal("2147483648", None);
    assert_eq!(
        problems,
        vec![String::from("integer literal: 2147483648 out of range for i32")]
    );
}

#[test]
fn test_literal_defaults() {
    assert_eq!(number_literal("10", None).0, Expr::int(10, IntWidth::I32));
    assert_eq!(number_literal("3.2", None).0, Expr::float(3.2, FloatWidth::F32));
}

#[test]
fn test_integer_with_float_suffix() {
    let (expr, problems) = number_literal("3", Some("f64"));
    assert!(problems.is_empty());
    assert_eq!(expr, Expr::float(3.0, FloatWidth::F64));
}

#[test]
fn test_literal_problems() {
    let (expr, problems) = number_literal("7", Some("u8"));
    assert_eq!(expr, Expr::int(7, IntWidth::I32));
    assert_eq!(problems, vec![String::from("unknown literal suffix: 'u8")]);

    let (expr, problems) = number_literal("3.25", Some("i32"));
    assert_eq!(expr, Expr::float(3.25, FloatWidth::F32));
    assert_eq!(problems.len(), 1);

    let (_, problems) = number_literal("99999999999999999999", None);
    assert_eq!(
        problems,
        vec![String::from("integer literal out of range: 99999999999999999999")]
    );
}

#[test]
fn test_mismatch_message() {
    assert_eq!(
        mismatch_message(
            "x",
            &Type::Int(IntWidth::I32),
            &Type::Float(FloatWidth::F32)
        ),
        "global var: x, it's type is: i32, but receive: f32"
    );
}

struct MapScope {
    variables: HashMap<String, Type>,
    functions: HashMap<String, Type>,
    types: HashMap<String, Type>,
}

impl TypeScope for MapScope {
    fn variable_type(&self, name: &str) -> Option<Type> {
        self.variables.get(name).cloned()
    }
    fn function_return(&self, name: &str) -> Option<Type> {
        self.functions.get(name).cloned()
    }
    fn named_type(&self, name: &str) -> Option<Type> {
        self.types.get(name).cloned()
    }
}

#[test]
fn test_infer_expressions() {
    let bar = Type::Struct(Rc::new(StructType {
        name: String::from("Bar"),
        fields: vec![
            Field { name: String::from("i"), ty: Type::Int(IntWidth::I32) },
            Field { name: String::from("f"), ty: Type::Float(FloatWidth::F64) },
        ],
    }));
    let scope = MapScope {
        variables: HashMap::from([(String::from("b"), bar.clone())]),
        functions: HashMap::from([(String::from("get"), Type::Int(IntWidth::I64))]),
        types: HashMap::from([(String::from("Bar"), bar.clone())]),
    };

    let call = Expr::Call { name: String::from("get"), args: vec![] };
    assert_eq!(infer(&call, &scope), Some(Type::Int(IntWidth::I64)));

    let construct = Expr::Call { name: String::from("Bar"), args: vec![] };
    assert_eq!(infer(&construct, &scope), Some(bar));

    let access = Expr::FieldAccess { base: Box::new(Expr::ident("b")), attr: String::from("f") };
    assert_eq!(infer(&access, &scope), Some(Type::Float(FloatWidth::F64)));

    let compare = Expr::binary(BinaryOp::Lt, Expr::int(1, IntWidth::I8), Expr::int(2, IntWidth::I8));
    assert_eq!(infer(&compare, &scope), Some(Type::Bool));

    assert_eq!(infer(&Expr::ident("nope"), &scope), None);
}
