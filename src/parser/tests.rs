//! Unit tests for the parser and the tree walker.

use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::lexer::{lexer::tokenize, tokens::Token};

use super::{
    parser::parse,
    tree::{walk, Listener, ParseTree, Rule, RuleNode},
};

fn parse_source(source: &str) -> ParseTree {
    let tokens = tokenize(source.to_string(), Some("test.elz".to_string())).unwrap();
    let (parser, tree) = parse(tokens, Rc::new("test.elz".to_string()));
    assert!(parser.recovered().is_empty(), "{:?}", parser.recovered());
    tree.unwrap()
}

/// Records the event stream as readable strings.
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl Listener for Recorder {
    fn enter_rule(&mut self, node: &RuleNode) {
        self.events.push(format!("enter {:?}", node.rule));
    }
    fn exit_rule(&mut self, node: &RuleNode) {
        self.events.push(format!("exit {:?}", node.rule));
    }
    fn visit_missing(&mut self, _token: &Token) {
        self.events.push(String::from("missing"));
    }
}

fn exits(source: &str) -> Vec<String> {
    let mut recorder = Recorder::default();
    walk(&mut recorder, &parse_source(source));
    recorder
        .events
        .into_iter()
        .filter(|event| event.starts_with("exit"))
        .collect()
}

fn top_level(tree: &ParseTree) -> Vec<&RuleNode> {
    match tree {
        ParseTree::Rule(root) => root
            .children
            .iter()
            .filter_map(|child| match child {
                ParseTree::Rule(node) => Some(node),
                _ => None,
            })
            .collect(),
        _ => vec![],
    }
}

#[test]
fn test_parse_var_define() {
    let tree = parse_source("x: i32 = 3.2");
    let stats = top_level(&tree);

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].rule, Rule::VarDefine);
    assert_eq!(stats[0].qualified_name(), "x");
    assert_eq!(stats[0].rule(Rule::TypeForm).unwrap().text(), "i32");
    assert!(stats[0].rule(Rule::Float).is_some());
}

#[test]
fn test_precedence_in_exit_order() {
    assert_eq!(
        exits("x = 1 + 2 * 3"),
        vec![
            "exit Int",
            "exit Int",
            "exit Int",
            "exit MulOrDiv",
            "exit AddOrSub",
            "exit VarDefine",
            "exit Prog",
        ]
    );
}

#[test]
fn test_power_is_right_associative() {
    let tree = parse_source("x = 2 ^ 3 ^ 2");
    let define = top_level(&tree)[0];
    let pow = define.rule(Rule::Pow).unwrap();

    // The right operand is itself the nested power.
    assert!(pow.rule(Rule::Int).is_some());
    assert!(pow.rule(Rule::Pow).is_some());
}

#[test]
fn test_ternary_binds_loosest() {
    let tree = parse_source("x = a < b ? 1 : 2");
    let define = top_level(&tree)[0];
    let ternary = define.rule(Rule::Ternary).unwrap();

    assert!(ternary.rule(Rule::Compare).is_some());
    assert_eq!(ternary.rules(Rule::Int).count(), 2);
}

#[test]
fn test_export_on_new_line_starts_declaration() {
    let tree = parse_source("x = 1\n+y = 2\n+fn f() {}");
    let stats = top_level(&tree);

    assert_eq!(stats.len(), 3);
    assert_eq!(stats[1].rule, Rule::VarDefine);
    assert!(stats[1].has_token(crate::lexer::tokens::TokenKind::Plus));
    assert_eq!(stats[2].rule, Rule::FnDefine);
}

#[test]
fn test_parse_function_with_body() {
    let source = "fn test(a: i32) -> i32 {\n  let b = Bar(10)\n  let i = b.i\n  return i\n}";
    assert_eq!(
        exits(source),
        vec![
            "exit TypeForm",
            "exit Param",
            "exit TypeForm",
            "exit Int",
            "exit FnCall",
            "exit VarDefine",
            "exit Define",
            "exit Id",
            "exit Access",
            "exit VarDefine",
            "exit Define",
            "exit Id",
            "exit ReturnStat",
            "exit FnDefine",
            "exit Prog",
        ]
    );
}

#[test]
fn test_parse_type_trait_impl_import() {
    let source = "import std::io\ntype +Bar (i: i32, f: f64)\ntrait Show { show(s: string) -> i32, size() }\nimpl Bar: Show { fn show(s: string) -> i32 { return 1 } }";
    let tree = parse_source(source);
    let stats = top_level(&tree);

    assert_eq!(stats[0].rule, Rule::ImportStat);
    assert_eq!(stats[0].qualified_name(), "std::io");
    assert_eq!(stats[1].rule, Rule::TypeDefine);
    assert_eq!(stats[1].rules(Rule::Attr).count(), 2);
    assert_eq!(stats[2].rule, Rule::TraitDefine);
    assert_eq!(stats[2].rules(Rule::TMethod).count(), 2);
    assert_eq!(stats[3].rule, Rule::ImplBlock);
    assert_eq!(stats[3].rules(Rule::TypeForm).count(), 1);
    assert_eq!(stats[3].rules(Rule::FnDefine).count(), 1);
}

#[test]
fn test_parse_match() {
    let source = "fn f(a: i32) -> i32 {\n  match a {\n    1 => return 10,\n    _ => return 0\n  }\n}";
    let tree = parse_source(source);
    let function = top_level(&tree)[0];
    let matcher = function.rule(Rule::MatchRule).unwrap();

    assert_eq!(matcher.rules(Rule::MatchArm).count(), 2);
}

#[test]
fn test_missing_operand_is_recovered() {
    let tokens = tokenize("x = 1 +".to_string(), None).unwrap();
    let (parser, tree) = parse(tokens, Rc::new("shell".to_string()));

    assert_eq!(parser.recovered().len(), 1);

    let mut recorder = Recorder::default();
    walk(&mut recorder, &tree.unwrap());
    assert!(recorder.events.contains(&String::from("missing")));
}

#[test]
fn test_bad_top_level_is_an_error() {
    let tokens = tokenize("x = 1\n)".to_string(), None).unwrap();
    let (_, tree) = parse(tokens, Rc::new("shell".to_string()));

    let error = tree.unwrap_err();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}
