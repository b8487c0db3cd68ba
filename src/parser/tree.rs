//! Parse tree produced by the parser and the walker that replays it as
//! enter/exit events.

use crate::lexer::tokens::{Token, TokenKind};

/// Grammar rule tags carried by interior parse-tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Prog,
    ImportStat,
    Define,
    VarDefine,
    FnDefine,
    Param,
    TypeForm,
    TypeDefine,
    Attr,
    TraitDefine,
    TMethod,
    ImplBlock,
    ReturnStat,
    Assign,
    ExprStat,
    MatchRule,
    MatchArm,
    Ternary,
    Compare,
    AddOrSub,
    MulOrDiv,
    Pow,
    Access,
    FnCall,
    Paren,
    Id,
    Int,
    Float,
    Str,
}

#[derive(Debug, Clone)]
pub enum ParseTree {
    Rule(RuleNode),
    Terminal(Token),
    /// A sub-expression the parser could not read; the token is where it
    /// gave up.
    Missing(Token),
}

#[derive(Debug, Clone)]
pub struct RuleNode {
    pub rule: Rule,
    pub children: Vec<ParseTree>,
}

impl RuleNode {
    pub fn new(rule: Rule) -> Self {
        RuleNode {
            rule,
            children: vec![],
        }
    }

    pub fn push_token(&mut self, token: Token) {
        self.children.push(ParseTree::Terminal(token));
    }

    pub fn push(&mut self, child: ParseTree) {
        self.children.push(child);
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(|child| match child {
            ParseTree::Terminal(token) => Some(token),
            _ => None,
        })
    }

    /// First direct terminal child of the given kind.
    pub fn token(&self, kind: TokenKind) -> Option<&Token> {
        self.terminals().find(|token| token.kind == kind)
    }

    pub fn has_token(&self, kind: TokenKind) -> bool {
        self.token(kind).is_some()
    }

    /// Direct rule children with the given tag.
    pub fn rules(&self, rule: Rule) -> impl Iterator<Item = &RuleNode> {
        self.children.iter().filter_map(move |child| match child {
            ParseTree::Rule(node) if node.rule == rule => Some(node),
            _ => None,
        })
    }

    pub fn rule(&self, rule: Rule) -> Option<&RuleNode> {
        self.rules(rule).next()
    }

    /// Identifier terminals joined with `::`, e.g. `Bar::area`.
    pub fn qualified_name(&self) -> String {
        self.terminals()
            .filter(|token| token.kind == TokenKind::Identifier)
            .map(|token| token.value.as_str())
            .collect::<Vec<_>>()
            .join("::")
    }

    /// Text of the first terminal, used by literal and identifier leaves.
    pub fn text(&self) -> &str {
        self.terminals()
            .next()
            .map(|token| token.value.as_str())
            .unwrap_or("")
    }

    /// The operator terminal of a binary node.
    pub fn operator(&self) -> Option<&Token> {
        self.terminals().next()
    }
}

/// Callbacks fired by [`walk`] in depth-first order.
pub trait Listener {
    fn enter_rule(&mut self, _node: &RuleNode) {}
    fn exit_rule(&mut self, _node: &RuleNode) {}
    fn visit_terminal(&mut self, _token: &Token) {}
    fn visit_missing(&mut self, _token: &Token) {}
}

/// Replays a parse tree into a listener: `enter_rule` before a node's
/// children and `exit_rule` after them.
pub fn walk<L: Listener + ?Sized>(listener: &mut L, tree: &ParseTree) {
    match tree {
        ParseTree::Rule(node) => {
            listener.enter_rule(node);
            for child in &node.children {
                walk(listener, child);
            }
            listener.exit_rule(node);
        }
        ParseTree::Terminal(token) => listener.visit_terminal(token),
        ParseTree::Missing(token) => listener.visit_missing(token),
    }
}
