use std::fmt::Display;

use crate::ast::{
    expressions::{Expr, MatchArm},
    statements::{AttrDef, FnDef, MethodSig, Param, Stmt},
};

/// One entry on the assembler's operand stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Expr(Expr),
    Stmt(Stmt),
    Param(Param),
    Attr(AttrDef),
    Arm(MatchArm),
    MethodSig(MethodSig),
    Method(FnDef),
}

impl Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Fragment::Expr(_) => "expression",
            Fragment::Stmt(_) => "statement",
            Fragment::Param(_) => "parameter",
            Fragment::Attr(_) => "attribute",
            Fragment::Arm(_) => "match arm",
            Fragment::MethodSig(_) => "method signature",
            Fragment::Method(_) => "method",
        };
        write!(f, "{}", kind)
    }
}

/// Operand stack with marks.
///
/// Every rule records a mark when it is entered; pops never reach below
/// the innermost mark, so a rule only ever sees what its own children
/// pushed.
#[derive(Debug, Default)]
pub struct OperandStack {
    fragments: Vec<Fragment>,
    marks: Vec<usize>,
}

impl OperandStack {
    pub fn new() -> Self {
        OperandStack::default()
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn push_expr(&mut self, expr: Expr) {
        self.fragments.push(Fragment::Expr(expr));
    }

    pub fn push_stmt(&mut self, stmt: Stmt) {
        self.fragments.push(Fragment::Stmt(stmt));
    }

    pub fn mark(&mut self) {
        self.marks.push(self.fragments.len());
    }

    fn floor(&self) -> usize {
        self.marks.last().copied().unwrap_or(0)
    }

    /// Pops the top fragment if it is an expression above the current mark.
    pub fn pop_expr(&mut self) -> Option<Expr> {
        if self.fragments.len() <= self.floor() {
            return None;
        }
        match self.fragments.last() {
            Some(Fragment::Expr(_)) => match self.fragments.pop() {
                Some(Fragment::Expr(expr)) => Some(expr),
                _ => None,
            },
            _ => None,
        }
    }

    /// Pops the top fragment if it is a statement above the current mark.
    pub fn pop_stmt(&mut self) -> Option<Stmt> {
        if self.fragments.len() <= self.floor() {
            return None;
        }
        match self.fragments.last() {
            Some(Fragment::Stmt(_)) => match self.fragments.pop() {
                Some(Fragment::Stmt(stmt)) => Some(stmt),
                _ => None,
            },
            _ => None,
        }
    }

    /// Removes the innermost mark and returns everything pushed after it,
    /// oldest first.
    pub fn drain_to_mark(&mut self) -> Vec<Fragment> {
        let floor = self.marks.pop().unwrap_or(0).min(self.fragments.len());
        self.fragments.split_off(floor)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn mark_depth(&self) -> usize {
        self.marks.len()
    }
}
