//! Unit tests for the AST model and type system.

use std::rc::Rc;

use super::{
    expressions::{BinaryOp, Expr},
    types::{check_sized, Field, FloatWidth, IntWidth, OperandClass, Signature, StructType, TraitType, Type},
};

fn bar() -> StructType {
    StructType {
        name: String::from("Bar"),
        fields: vec![
            Field { name: String::from("i"), ty: Type::Int(IntWidth::I32) },
            Field { name: String::from("f"), ty: Type::Float(FloatWidth::F64) },
            Field { name: String::from("b"), ty: Type::Bool },
        ],
    }
}

#[test]
fn test_builtin_type_names() {
    assert_eq!(Type::builtin("i8"), Some(Type::Int(IntWidth::I8)));
    assert_eq!(Type::builtin("f64"), Some(Type::Float(FloatWidth::F64)));
    assert_eq!(Type::builtin("string"), Some(Type::String));
    assert_eq!(Type::builtin("Bar"), None);
}

#[test]
fn test_type_display() {
    assert_eq!(Type::Int(IntWidth::I16).to_string(), "i16");
    assert_eq!(Type::Float(FloatWidth::F32).to_string(), "f32");
    assert_eq!(Type::Struct(Rc::new(bar())).to_string(), "Bar");
    assert_eq!(Type::Void.to_string(), "void");
}

#[test]
fn test_field_ordinals_follow_declaration_order() {
    let bar = bar();

    assert_eq!(bar.ordinal("i"), Some(0));
    assert_eq!(bar.ordinal("f"), Some(1));
    assert_eq!(bar.ordinal("b"), Some(2));
    assert_eq!(bar.ordinal("missing"), None);
}

#[test]
fn test_struct_types_are_nominal() {
    let a = Type::Struct(Rc::new(bar()));
    let mut renamed = bar();
    renamed.name = String::from("Baz");

    assert_eq!(a, Type::Struct(Rc::new(bar())));
    assert_ne!(a, Type::Struct(Rc::new(renamed)));
}

#[test]
fn test_plain_fields_are_sized() {
    assert!(check_sized(&bar()).is_ok());
}

#[test]
fn test_trait_field_is_unsized() {
    let show = Rc::new(TraitType {
        name: String::from("Show"),
        methods: vec![Signature {
            name: String::from("show"),
            params: vec![],
            ret: Type::Void,
        }],
    });
    let holder = StructType {
        name: String::from("Holder"),
        fields: vec![Field { name: String::from("s"), ty: Type::Trait(show) }],
    };

    let error = check_sized(&holder).unwrap_err();
    assert_eq!(error.to_string(), "cannot compute the size of type: Show");
    assert_eq!(error.get_error_name(), "UnsizedType");
}

#[test]
fn test_operand_classes() {
    assert_eq!(Type::Int(IntWidth::I64).class(), OperandClass::Int);
    assert_eq!(Type::Float(FloatWidth::F32).class(), OperandClass::Float);
    assert_eq!(Type::Struct(Rc::new(bar())).class(), OperandClass::Struct);
}

#[test]
fn test_binary_op_symbols() {
    for symbol in ["+", "-", "*", "/", "^", "==", "!=", ">", ">=", "<", "<="] {
        let op = BinaryOp::from_symbol(symbol).unwrap();
        assert_eq!(op.symbol(), symbol);
    }
    assert_eq!(BinaryOp::from_symbol("%"), None);
}

#[test]
fn test_wildcard_pattern() {
    assert!(Expr::ident("_").is_wildcard());
    assert!(!Expr::ident("x").is_wildcard());
}

#[test]
fn test_speculatable_expressions() {
    let sum = Expr::binary(BinaryOp::Add, Expr::ident("a"), Expr::int(1, IntWidth::I32));
    assert!(sum.is_speculatable());

    let quotient = Expr::binary(BinaryOp::Div, Expr::ident("a"), Expr::ident("b"));
    assert!(!quotient.is_speculatable());

    let call = Expr::Call {
        name: String::from("count"),
        args: vec![Expr::ident("n")],
    };
    let nested = Expr::Ternary {
        cond: Box::new(Expr::ident("c")),
        then: Box::new(Expr::binary(BinaryOp::Sub, call, Expr::int(1, IntWidth::I32))),
        otherwise: Box::new(Expr::int(0, IntWidth::I32)),
    };
    assert!(!nested.is_speculatable());
}
