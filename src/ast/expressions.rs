use std::fmt::Display;

use super::{
    statements::Stmt,
    types::{FloatWidth, IntWidth},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        match symbol {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "^" => Some(BinaryOp::Pow),
            "==" => Some(BinaryOp::Eq),
            "!=" => Some(BinaryOp::Ne),
            ">" => Some(BinaryOp::Gt),
            ">=" => Some(BinaryOp::Ge),
            "<" => Some(BinaryOp::Lt),
            "<=" => Some(BinaryOp::Le),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLiteral {
        value: i64,
        width: IntWidth,
    },
    FloatLiteral {
        value: f64,
        width: FloatWidth,
    },
    StringLiteral(String),
    Identifier(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    FieldAccess {
        base: Box<Expr>,
        attr: String,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// `cond ? then : otherwise`
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn int(value: i64, width: IntWidth) -> Expr {
        Expr::IntLiteral { value, width }
    }

    pub fn float(value: f64, width: FloatWidth) -> Expr {
        Expr::FloatLiteral { value, width }
    }

    pub fn ident(name: &str) -> Expr {
        Expr::Identifier(String::from(name))
    }

    /// Whether evaluating the expression can be hoisted out of a branch:
    /// no calls, and no division that could trap.
    pub fn is_speculatable(&self) -> bool {
        match self {
            Expr::IntLiteral { .. }
            | Expr::FloatLiteral { .. }
            | Expr::StringLiteral(_)
            | Expr::Identifier(_) => true,
            Expr::Binary {
                op: BinaryOp::Div, ..
            } => false,
            Expr::Binary { left, right, .. } => {
                left.is_speculatable() && right.is_speculatable()
            }
            Expr::FieldAccess { base, .. } => base.is_speculatable(),
            Expr::Call { .. } => false,
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => cond.is_speculatable() && then.is_speculatable() && otherwise.is_speculatable(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Expr::Identifier(name) if name == "_")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Value(Expr),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr {
    pub scrutinee: Expr,
    pub arms: Vec<MatchArm>,
}
