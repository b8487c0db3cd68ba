//! Unit tests for the tree-walk assembler.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::{
    ast::{
        ast::Decl,
        expressions::{BinaryOp, Expr, Pattern},
        statements::{Stmt, VarDef},
        types::{FloatWidth, IntWidth},
    },
    errors::reporter::Reporter,
    lexer::lexer::tokenize,
    parser::{parser::parse, tree::walk},
};

use super::{
    assembler::{Assembler, DeclarationSink},
    stack::{Fragment, OperandStack},
};

#[derive(Default)]
struct Collector {
    decls: Vec<Decl>,
    reporter: Reporter,
}

impl DeclarationSink for Collector {
    fn accept(&mut self, decl: Decl) {
        self.decls.push(decl);
    }

    fn reporter(&mut self) -> &mut Reporter {
        &mut self.reporter
    }
}

fn assemble(source: &str) -> Collector {
    let tokens = tokenize(source.to_string(), Some("test.elz".to_string())).unwrap();
    let (_, tree) = parse(tokens, Rc::new("test.elz".to_string()));
    let tree = tree.unwrap();

    let mut collector = Collector::default();
    let mut assembler = Assembler::new(&mut collector);
    walk(&mut assembler, &tree);
    assert!(assembler.stack().is_empty());
    collector
}

fn single_var(collector: &Collector) -> &VarDef {
    match collector.decls.as_slice() {
        [Decl::Var(var)] => var,
        other => panic!("expected one variable, got {:?}", other),
    }
}

#[test]
fn test_pop_expr_only_pops_expressions() {
    let mut stack = OperandStack::new();
    stack.push_stmt(Stmt::Return(None));
    assert_eq!(stack.pop_expr(), None);
    assert_eq!(stack.len(), 1);

    stack.push_expr(Expr::ident("a"));
    assert_eq!(stack.pop_expr(), Some(Expr::ident("a")));
}

#[test]
fn test_pop_expr_stops_at_mark() {
    let mut stack = OperandStack::new();
    stack.push_expr(Expr::ident("outer"));
    stack.mark();
    assert_eq!(stack.pop_expr(), None);

    stack.push_expr(Expr::ident("inner"));
    assert_eq!(stack.drain_to_mark(), vec![Fragment::Expr(Expr::ident("inner"))]);
    assert_eq!(stack.mark_depth(), 0);
    assert_eq!(stack.pop_expr(), Some(Expr::ident("outer")));
}

#[test]
fn test_var_define_with_suffix() {
    let collector = assemble("a = 3'i8");
    let var = single_var(&collector);

    assert_eq!(var.name, "a");
    assert_eq!(var.init, Expr::int(3, IntWidth::I8));
    assert!(!var.exported);
    assert!(!var.mutable);
}

#[test]
fn test_binary_precedence() {
    let collector = assemble("x = 1 + 2 * 3");
    let var = single_var(&collector);

    let expected = Expr::binary(
        BinaryOp::Add,
        Expr::int(1, IntWidth::I32),
        Expr::binary(
            BinaryOp::Mul,
            Expr::int(2, IntWidth::I32),
            Expr::int(3, IntWidth::I32),
        ),
    );
    assert_eq!(var.init, expected);
}

#[test]
fn test_let_mut_and_export() {
    let collector = assemble("let mut +y: f64 = 2.5");
    let var = single_var(&collector);

    assert!(var.mutable);
    assert!(var.exported);
    assert_eq!(var.declared_type, Some(String::from("f64")));
    assert_eq!(var.init, Expr::float(2.5, FloatWidth::F32));
}

#[test]
fn test_missing_operand_keeps_partial_result() {
    let collector = assemble("x = 1 +");
    let var = single_var(&collector);

    assert_eq!(var.init, Expr::int(1, IntWidth::I32));
    assert_eq!(collector.reporter.messages(), vec!["expression miss error"]);
}

#[test]
fn test_unknown_suffix_is_reported() {
    let collector = assemble("x = 7'u8");
    let var = single_var(&collector);

    assert_eq!(var.init, Expr::int(7, IntWidth::I32));
    assert_eq!(collector.reporter.messages(), vec!["unknown literal suffix: 'u8"]);
}

#[test]
fn test_function_body_statements() {
    let source = "fn add(a: i32, b: i32) -> i32 {\n  let c = a + b\n  return c\n}";
    let collector = assemble(source);

    let [Decl::Fn(function)] = collector.decls.as_slice() else {
        panic!("expected one function, got {:?}", collector.decls);
    };
    assert_eq!(function.name, "add");
    assert_eq!(function.return_type, Some(String::from("i32")));
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.params[1].name, "b");
    assert_eq!(function.body.len(), 2);
    assert_eq!(function.body[1], Stmt::Return(Some(Expr::ident("c"))));
    assert!(collector.reporter.is_empty());
}

#[test]
fn test_call_and_field_access() {
    let collector = assemble("x = get(b.i, 2)");
    let var = single_var(&collector);

    let expected = Expr::Call {
        name: String::from("get"),
        args: vec![
            Expr::FieldAccess {
                base: Box::new(Expr::ident("b")),
                attr: String::from("i"),
            },
            Expr::int(2, IntWidth::I32),
        ],
    };
    assert_eq!(var.init, expected);
}

#[test]
fn test_match_arms_and_wildcard() {
    let source = "fn f(x: i32) {\n  match x {\n    1 => g(),\n    _ => h()\n  }\n}";
    let collector = assemble(source);

    let [Decl::Fn(function)] = collector.decls.as_slice() else {
        panic!("expected one function");
    };
    let [Stmt::Match(rule)] = function.body.as_slice() else {
        panic!("expected a match, got {:?}", function.body);
    };
    assert_eq!(rule.scrutinee, Expr::ident("x"));
    assert_eq!(rule.arms.len(), 2);
    assert_eq!(rule.arms[0].pattern, Pattern::Value(Expr::int(1, IntWidth::I32)));
    assert_eq!(rule.arms[1].pattern, Pattern::Wildcard);
}

#[test]
fn test_type_trait_impl_and_import() {
    let source = "import std::io\n\
                  type Bar (i: i32, f: f64)\n\
                  trait Show { show() }\n\
                  impl Bar: Show {\n  fn show() {}\n}";
    let collector = assemble(source);

    let names: Vec<String> = collector.decls.iter().map(Decl::name).collect();
    assert_eq!(names, vec!["std::io", "Bar", "Show", "impl Bar"]);

    let Decl::Impl(block) = &collector.decls[3] else {
        panic!("expected impl block");
    };
    assert_eq!(block.interfaces, vec![String::from("Show")]);
    assert_eq!(block.methods.len(), 1);
    assert_eq!(block.methods[0].name, "show");
}

#[test]
fn test_ternary_and_assignment() {
    let source = "fn f(c: bool) {\n  let mut v = c ? 1 : 2\n  v = 3\n}";
    let collector = assemble(source);

    let [Decl::Fn(function)] = collector.decls.as_slice() else {
        panic!("expected one function");
    };
    let Stmt::VarDef(var) = &function.body[0] else {
        panic!("expected a definition");
    };
    assert!(var.mutable);
    assert!(matches!(var.init, Expr::Ternary { .. }));
    assert_eq!(
        function.body[1],
        Stmt::Assign {
            name: String::from("v"),
            value: Expr::int(3, IntWidth::I32)
        }
    );
}
