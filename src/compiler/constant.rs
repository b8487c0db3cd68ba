//! Compile-time folding of global initializers.

use std::collections::HashMap;

use inkwell::{FloatPredicate, IntPredicate};

use crate::{
    ast::{
        expressions::{BinaryOp, Expr},
        types::{FloatWidth, IntWidth, Type},
    },
    errors::{
        errors::{Error, ErrorImpl},
        reporter::Reporter,
    },
};

use super::operators::{select_lowering, ArithOp, Lowering};

/// A folded value, already truncated or rounded to its width.
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    Int(i64, IntWidth),
    Float(f64, FloatWidth),
    Bool(bool),
    Str(String),
}

impl Const {
    pub fn int(value: i64, width: IntWidth) -> Const {
        let value = match width {
            IntWidth::I8 => value as i8 as i64,
            IntWidth::I16 => value as i16 as i64,
            IntWidth::I32 => value as i32 as i64,
            IntWidth::I64 => value,
        };
        Const::Int(value, width)
    }

    pub fn float(value: f64, width: FloatWidth) -> Const {
        let value = match width {
            FloatWidth::F32 => value as f32 as f64,
            FloatWidth::F64 => value,
        };
        Const::Float(value, width)
    }

    pub fn ty(&self) -> Type {
        match self {
            Const::Int(_, width) => Type::Int(*width),
            Const::Float(_, width) => Type::Float(*width),
            Const::Bool(_) => Type::Bool,
            Const::Str(_) => Type::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fold {
    Const(Const),
    /// The expression needs runtime code.
    NotConstant,
    /// A diagnostic has already been emitted.
    Reported,
}

/// Folds `expr` using the values of earlier global constants.
///
/// Operators go through the same table as runtime code, so a pair without
/// a lowering is fatal here as well.
pub fn fold(
    expr: &Expr,
    constants: &HashMap<String, Const>,
    reporter: &mut Reporter,
) -> Result<Fold, Error> {
    let folded = match expr {
        Expr::IntLiteral { value, width } => Fold::Const(Const::int(*value, *width)),
        Expr::FloatLiteral { value, width } => Fold::Const(Const::float(*value, *width)),
        Expr::StringLiteral(text) => Fold::Const(Const::Str(text.clone())),
        Expr::Identifier(name) if name == "true" => Fold::Const(Const::Bool(true)),
        Expr::Identifier(name) if name == "false" => Fold::Const(Const::Bool(false)),
        Expr::Identifier(name) => match constants.get(name) {
            Some(value) => Fold::Const(value.clone()),
            None => Fold::NotConstant,
        },
        Expr::Binary { op, left, right } => {
            let left = fold(left, constants, reporter)?;
            let right = fold(right, constants, reporter)?;
            match (left, right) {
                (Fold::Const(l), Fold::Const(r)) => fold_binary(*op, l, r, reporter)?,
                (Fold::Reported, _) | (_, Fold::Reported) => Fold::Reported,
                _ => Fold::NotConstant,
            }
        }
        Expr::Ternary {
            cond,
            then,
            otherwise,
        } => {
            let cond = fold(cond, constants, reporter)?;
            let then = fold(then, constants, reporter)?;
            let otherwise = fold(otherwise, constants, reporter)?;
            match (cond, then, otherwise) {
                (Fold::Const(Const::Bool(c)), Fold::Const(t), Fold::Const(o)) => {
                    if t.ty() != o.ty() {
                        reporter.emit(format!(
                            "ternary branches have mismatched types: {} and {}",
                            t.ty(),
                            o.ty()
                        ));
                        Fold::Reported
                    } else if c {
                        Fold::Const(t)
                    } else {
                        Fold::Const(o)
                    }
                }
                (Fold::Const(c), Fold::Const(_), Fold::Const(_)) => {
                    reporter.emit(format!(
                        "ternary condition type is: {}, but expect: bool",
                        c.ty()
                    ));
                    Fold::Reported
                }
                (Fold::Reported, _, _) | (_, Fold::Reported, _) | (_, _, Fold::Reported) => {
                    Fold::Reported
                }
                _ => Fold::NotConstant,
            }
        }
        Expr::FieldAccess { .. } | Expr::Call { .. } => Fold::NotConstant,
    };

    Ok(folded)
}

fn fold_binary(op: BinaryOp, l: Const, r: Const, reporter: &mut Reporter) -> Result<Fold, Error> {
    let ty = l.ty();
    if ty != r.ty() {
        reporter.emit(format!(
            "binary operator `{}` receive mismatched types: {} and {}",
            op,
            ty,
            r.ty()
        ));
        return Ok(Fold::Reported);
    }

    let lowering = select_lowering(op, ty.class()).ok_or_else(|| {
        Error::codegen(ErrorImpl::UnsupportedOperator {
            operator: op.to_string(),
            type_: ty.to_string(),
        })
    })?;

    let folded = match (lowering, l, r) {
        (Lowering::IntArith(arith), Const::Int(a, width), Const::Int(b, _)) => {
            let value = match arith {
                ArithOp::Add => a.wrapping_add(b),
                ArithOp::Sub => a.wrapping_sub(b),
                ArithOp::Mul => a.wrapping_mul(b),
                ArithOp::Div if b == 0 => {
                    reporter.emit("division by zero in constant expression");
                    return Ok(Fold::Reported);
                }
                ArithOp::Div => a.wrapping_div(b),
            };
            Const::int(value, width)
        }
        (Lowering::FloatArith(arith), Const::Float(a, width), Const::Float(b, _)) => {
            let value = match arith {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div => a / b,
            };
            Const::float(value, width)
        }
        (Lowering::IntCompare(predicate), Const::Int(a, _), Const::Int(b, _)) => {
            Const::Bool(int_compare(predicate, a, b))
        }
        (Lowering::IntCompare(predicate), Const::Bool(a), Const::Bool(b)) => {
            Const::Bool(int_compare(predicate, i64::from(a), i64::from(b)))
        }
        (Lowering::FloatCompare(predicate), Const::Float(a, _), Const::Float(b, _)) => {
            Const::Bool(float_compare(predicate, a, b))
        }
        _ => return Ok(Fold::NotConstant),
    };

    Ok(Fold::Const(folded))
}

fn int_compare(predicate: IntPredicate, a: i64, b: i64) -> bool {
    match predicate {
        IntPredicate::EQ => a == b,
        IntPredicate::NE => a != b,
        IntPredicate::SGT => a > b,
        IntPredicate::SGE => a >= b,
        IntPredicate::SLT => a < b,
        IntPredicate::SLE => a <= b,
        IntPredicate::UGT => (a as u64) > (b as u64),
        IntPredicate::UGE => (a as u64) >= (b as u64),
        IntPredicate::ULT => (a as u64) < (b as u64),
        IntPredicate::ULE => (a as u64) <= (b as u64),
    }
}

fn float_compare(predicate: FloatPredicate, a: f64, b: f64) -> bool {
    match predicate {
        FloatPredicate::OEQ => a == b,
        FloatPredicate::ONE => a != b && !a.is_nan() && !b.is_nan(),
        FloatPredicate::OGT => a > b,
        FloatPredicate::OGE => a >= b,
        FloatPredicate::OLT => a < b,
        FloatPredicate::OLE => a <= b,
        _ => false,
    }
}
