use tracing::trace;

use crate::{
    ast::{
        ast::Decl,
        expressions::{BinaryOp, Expr, MatchArm, MatchExpr, Pattern},
        statements::{
            AttrDef, FnDef, ImplBlock, MethodSig, Param, Stmt, TraitDef, TypeDef, VarDef,
        },
    },
    errors::reporter::Reporter,
    lexer::tokens::{Token, TokenKind},
    parser::tree::{Listener, ParseTree, Rule, RuleNode},
    type_checker::inference::number_literal,
};

use super::stack::{Fragment, OperandStack};

pub const EXPRESSION_MISS: &str = "expression miss error";

/// Receives every top-level declaration as soon as it is complete.
pub trait DeclarationSink {
    fn accept(&mut self, decl: Decl);
    fn reporter(&mut self) -> &mut Reporter;
}

/// Builds AST nodes bottom-up from the walker's enter/exit events.
///
/// Each rule marks the operand stack on entry. On exit it takes what its
/// children left above the mark and pushes the combined node, or hands it
/// to the sink when it is a finished top-level declaration.
pub struct Assembler<'s, S: DeclarationSink> {
    sink: &'s mut S,
    stack: OperandStack,
    fn_depth: usize,
    impl_depth: usize,
    /// `mut` flag of each enclosing `let`.
    define_context: Vec<bool>,
}

impl<'s, S: DeclarationSink> Assembler<'s, S> {
    pub fn new(sink: &'s mut S) -> Self {
        Assembler {
            sink,
            stack: OperandStack::new(),
            fn_depth: 0,
            impl_depth: 0,
            define_context: vec![],
        }
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    fn emit(&mut self, message: impl Into<String>) {
        self.sink.reporter().emit(message);
    }

    fn at_top_level(&self) -> bool {
        self.fn_depth == 0 && self.impl_depth == 0
    }

    /// Reports whatever a rule left behind that it had no use for.
    fn discard(&mut self, rule: Rule, leftovers: Vec<Fragment>) {
        for fragment in leftovers {
            self.emit(format!("dropped {} inside {:?}", fragment, rule));
        }
    }

    /// Pops exactly `arity` expressions, rightmost first, and returns them
    /// in source order. On a shortfall the operands that were found are
    /// pushed back.
    fn pop_operands(&mut self, rule: Rule, arity: usize) -> Option<Vec<Expr>> {
        let mut operands = vec![];
        while operands.len() < arity {
            match self.stack.pop_expr() {
                Some(expr) => operands.push(expr),
                None => break,
            }
        }
        operands.reverse();

        let leftovers = self.stack.drain_to_mark();
        self.discard(rule, leftovers);

        if operands.len() == arity {
            return Some(operands);
        }

        self.emit(EXPRESSION_MISS);
        for expr in operands {
            self.stack.push_expr(expr);
        }
        None
    }

    /// Pops a single expression for rules of arity one.
    fn pop_single(&mut self, rule: Rule) -> Option<Expr> {
        let expr = self.stack.pop_expr();
        let leftovers = self.stack.drain_to_mark();
        self.discard(rule, leftovers);
        if expr.is_none() {
            self.emit(EXPRESSION_MISS);
        }
        expr
    }

    fn identifier(&mut self, node: &RuleNode) -> Option<String> {
        let name = node.token(TokenKind::Identifier).map(|t| t.value.clone());
        if name.is_none() {
            self.emit(format!("missing identifier in {:?}", node.rule));
        }
        name
    }

    fn type_name(node: &RuleNode) -> Option<String> {
        node.rule(Rule::TypeForm).map(|form| form.text().to_string())
    }

    fn number(&mut self, node: &RuleNode) {
        let leftovers = self.stack.drain_to_mark();
        self.discard(node.rule, leftovers);

        let Some(token) = node.token(TokenKind::Number) else {
            self.emit(EXPRESSION_MISS);
            return;
        };
        let (digits, suffix) = token.number_parts();
        let (expr, problems) = number_literal(digits, suffix);
        for problem in problems {
            self.emit(problem);
        }
        self.stack.push_expr(expr);
    }

    fn binary(&mut self, node: &RuleNode) {
        let op = node
            .operator()
            .and_then(|token| BinaryOp::from_symbol(&token.value));
        let Some(op) = op else {
            let leftovers = self.stack.drain_to_mark();
            self.discard(node.rule, leftovers);
            self.emit(EXPRESSION_MISS);
            return;
        };

        if let Some(mut operands) = self.pop_operands(node.rule, 2) {
            let right = operands.pop();
            let left = operands.pop();
            if let (Some(left), Some(right)) = (left, right) {
                self.stack.push_expr(Expr::binary(op, left, right));
            }
        }
    }

    fn ternary(&mut self, node: &RuleNode) {
        if let Some(operands) = self.pop_operands(node.rule, 3) {
            let mut operands = operands.into_iter();
            if let (Some(cond), Some(then), Some(otherwise)) =
                (operands.next(), operands.next(), operands.next())
            {
                self.stack.push_expr(Expr::Ternary {
                    cond: Box::new(cond),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                });
            }
        }
    }

    fn access(&mut self, node: &RuleNode) {
        let base = self.pop_single(node.rule);
        let attr = self.identifier(node);
        if let (Some(base), Some(attr)) = (base, attr) {
            self.stack.push_expr(Expr::FieldAccess {
                base: Box::new(base),
                attr,
            });
        }
    }

    fn call(&mut self, node: &RuleNode) {
        let mut args = vec![];
        let mut leftovers = vec![];
        for fragment in self.stack.drain_to_mark() {
            match fragment {
                Fragment::Expr(expr) => args.push(expr),
                other => leftovers.push(other),
            }
        }
        self.discard(node.rule, leftovers);

        self.stack.push_expr(Expr::Call {
            name: node.qualified_name(),
            args,
        });
    }

    fn var_define(&mut self, node: &RuleNode) {
        let init = self.pop_single(node.rule);
        let Some(name) = self.identifier(node) else {
            return;
        };
        let Some(init) = init else {
            self.emit(format!("variable: {} has no initializer", name));
            return;
        };

        let var = VarDef {
            name,
            declared_type: Self::type_name(node),
            exported: node.has_token(TokenKind::Plus),
            mutable: self.define_context.last().copied().unwrap_or(false),
            init,
        };

        if self.at_top_level() {
            self.sink.accept(Decl::Var(var));
        } else {
            self.stack.push_stmt(Stmt::VarDef(var));
        }
    }

    fn param(&mut self, node: &RuleNode) {
        let leftovers = self.stack.drain_to_mark();
        self.discard(node.rule, leftovers);

        if let (Some(name), Some(type_name)) = (self.identifier(node), Self::type_name(node)) {
            self.stack.push(Fragment::Param(Param { name, type_name }));
        }
    }

    fn attr(&mut self, node: &RuleNode) {
        let leftovers = self.stack.drain_to_mark();
        self.discard(node.rule, leftovers);

        if let (Some(name), Some(type_name)) = (self.identifier(node), Self::type_name(node)) {
            self.stack.push(Fragment::Attr(AttrDef { name, type_name }));
        }
    }

    fn method_sig(&mut self, node: &RuleNode) {
        let mut params = vec![];
        let mut leftovers = vec![];
        for fragment in self.stack.drain_to_mark() {
            match fragment {
                Fragment::Param(param) => params.push(param),
                other => leftovers.push(other),
            }
        }
        self.discard(node.rule, leftovers);

        if let Some(name) = self.identifier(node) {
            self.stack.push(Fragment::MethodSig(MethodSig {
                name,
                params,
                return_type: Self::type_name(node),
            }));
        }
    }

    fn fn_define(&mut self, node: &RuleNode) {
        self.fn_depth = self.fn_depth.saturating_sub(1);

        let mut params = vec![];
        let mut body = vec![];
        let mut leftovers = vec![];
        for fragment in self.stack.drain_to_mark() {
            match fragment {
                Fragment::Param(param) => params.push(param),
                Fragment::Stmt(stmt) => body.push(stmt),
                other => leftovers.push(other),
            }
        }
        self.discard(node.rule, leftovers);

        let Some(name) = self.identifier(node) else {
            return;
        };
        let function = FnDef {
            name,
            params,
            return_type: Self::type_name(node),
            body,
            exported: node.has_token(TokenKind::Plus),
        };

        if self.impl_depth > 0 {
            self.stack.push(Fragment::Method(function));
        } else {
            self.sink.accept(Decl::Fn(function));
        }
    }

    fn type_define(&mut self, node: &RuleNode) {
        let mut attrs = vec![];
        let mut leftovers = vec![];
        for fragment in self.stack.drain_to_mark() {
            match fragment {
                Fragment::Attr(attr) => attrs.push(attr),
                other => leftovers.push(other),
            }
        }
        self.discard(node.rule, leftovers);

        if let Some(name) = self.identifier(node) {
            self.sink.accept(Decl::Type(TypeDef {
                name,
                attrs,
                exported: node.has_token(TokenKind::Plus),
            }));
        }
    }

    fn trait_define(&mut self, node: &RuleNode) {
        let mut methods = vec![];
        let mut leftovers = vec![];
        for fragment in self.stack.drain_to_mark() {
            match fragment {
                Fragment::MethodSig(sig) => methods.push(sig),
                other => leftovers.push(other),
            }
        }
        self.discard(node.rule, leftovers);

        if let Some(name) = self.identifier(node) {
            self.sink.accept(Decl::Trait(TraitDef {
                name,
                methods,
                exported: node.has_token(TokenKind::Plus),
            }));
        }
    }

    fn impl_block(&mut self, node: &RuleNode) {
        self.impl_depth = self.impl_depth.saturating_sub(1);

        let mut methods = vec![];
        let mut leftovers = vec![];
        for fragment in self.stack.drain_to_mark() {
            match fragment {
                Fragment::Method(method) => methods.push(method),
                other => leftovers.push(other),
            }
        }
        self.discard(node.rule, leftovers);

        if let Some(target) = self.identifier(node) {
            let interfaces = node
                .rules(Rule::TypeForm)
                .map(|form| form.text().to_string())
                .collect();
            self.sink.accept(Decl::Impl(ImplBlock {
                target,
                interfaces,
                methods,
            }));
        }
    }

    fn return_stat(&mut self, node: &RuleNode) {
        let has_operand = node
            .children
            .iter()
            .any(|child| !matches!(child, ParseTree::Terminal(_)));

        let value = if has_operand {
            self.pop_single(node.rule)
        } else {
            let leftovers = self.stack.drain_to_mark();
            self.discard(node.rule, leftovers);
            None
        };
        self.stack.push_stmt(Stmt::Return(value));
    }

    fn expr_stat(&mut self, node: &RuleNode) {
        if let Some(expr) = self.pop_single(node.rule) {
            self.stack.push_stmt(Stmt::Expr(expr));
        }
    }

    fn assign(&mut self, node: &RuleNode) {
        let value = self.pop_single(node.rule);
        if let (Some(name), Some(value)) = (self.identifier(node), value) {
            self.stack.push_stmt(Stmt::Assign { name, value });
        }
    }

    fn match_arm(&mut self, node: &RuleNode) {
        let body = self.stack.pop_stmt();
        let pattern = self.stack.pop_expr();
        let leftovers = self.stack.drain_to_mark();
        self.discard(node.rule, leftovers);

        match (pattern, body) {
            (Some(pattern), Some(body)) => {
                let pattern = if pattern.is_wildcard() {
                    Pattern::Wildcard
                } else {
                    Pattern::Value(pattern)
                };
                self.stack.push(Fragment::Arm(MatchArm { pattern, body }));
            }
            _ => self.emit(EXPRESSION_MISS),
        }
    }

    fn match_rule(&mut self, node: &RuleNode) {
        let mut fragments = self.stack.drain_to_mark().into_iter();

        let scrutinee = match fragments.next() {
            Some(Fragment::Expr(expr)) => expr,
            other => {
                self.emit(EXPRESSION_MISS);
                let leftovers = other.into_iter().chain(fragments).collect();
                self.discard(node.rule, leftovers);
                return;
            }
        };

        let mut arms = vec![];
        let mut leftovers = vec![];
        for fragment in fragments {
            match fragment {
                Fragment::Arm(arm) => arms.push(arm),
                other => leftovers.push(other),
            }
        }
        self.discard(node.rule, leftovers);

        self.stack
            .push_stmt(Stmt::Match(MatchExpr { scrutinee, arms }));
    }

    fn import_stat(&mut self, node: &RuleNode) {
        let leftovers = self.stack.drain_to_mark();
        self.discard(node.rule, leftovers);

        let path = node
            .terminals()
            .filter(|token| token.kind == TokenKind::Identifier)
            .map(|token| token.value.clone())
            .collect();
        self.sink.accept(Decl::Import(path));
    }

    /// Re-pushes whatever the children produced.
    fn pass_through(&mut self) {
        for fragment in self.stack.drain_to_mark() {
            self.stack.push(fragment);
        }
    }
}

impl<S: DeclarationSink> Listener for Assembler<'_, S> {
    fn enter_rule(&mut self, node: &RuleNode) {
        trace!(rule = ?node.rule, depth = self.stack.len(), "enter");
        self.stack.mark();

        match node.rule {
            Rule::Define => self.define_context.push(node.has_token(TokenKind::Mut)),
            Rule::FnDefine => self.fn_depth += 1,
            Rule::ImplBlock => self.impl_depth += 1,
            _ => {}
        }
    }

    fn exit_rule(&mut self, node: &RuleNode) {
        match node.rule {
            Rule::Int | Rule::Float => self.number(node),
            Rule::Str => {
                self.pass_through();
                let text = node.text().to_string();
                self.stack.push_expr(Expr::StringLiteral(text));
            }
            Rule::Id => {
                self.pass_through();
                self.stack.push_expr(Expr::Identifier(node.qualified_name()));
            }
            Rule::Compare | Rule::AddOrSub | Rule::MulOrDiv | Rule::Pow => self.binary(node),
            Rule::Ternary => self.ternary(node),
            Rule::Access => self.access(node),
            Rule::FnCall => self.call(node),
            Rule::Paren | Rule::Prog | Rule::TypeForm => self.pass_through(),
            Rule::Define => {
                self.define_context.pop();
                self.pass_through();
            }
            Rule::VarDefine => self.var_define(node),
            Rule::Param => self.param(node),
            Rule::Attr => self.attr(node),
            Rule::TMethod => self.method_sig(node),
            Rule::FnDefine => self.fn_define(node),
            Rule::TypeDefine => self.type_define(node),
            Rule::TraitDefine => self.trait_define(node),
            Rule::ImplBlock => self.impl_block(node),
            Rule::ReturnStat => self.return_stat(node),
            Rule::ExprStat => self.expr_stat(node),
            Rule::Assign => self.assign(node),
            Rule::MatchArm => self.match_arm(node),
            Rule::MatchRule => self.match_rule(node),
            Rule::ImportStat => self.import_stat(node),
        }

        trace!(rule = ?node.rule, depth = self.stack.len(), "exit");
    }

    fn visit_missing(&mut self, token: &Token) {
        trace!(at = %token.value, "missing operand");
    }
}
