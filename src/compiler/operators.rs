//! Binary operator dispatch.
//!
//! Lowering is selected from the operand class and the operator alone; both
//! operands are required to have the same type before we get here.

use inkwell::{
    builder::Builder,
    values::BasicValueEnum,
    FloatPredicate, IntPredicate,
};

use crate::{
    ast::{expressions::BinaryOp, types::OperandClass},
    errors::errors::Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lowering {
    IntArith(ArithOp),
    FloatArith(ArithOp),
    IntCompare(IntPredicate),
    FloatCompare(FloatPredicate),
}

impl Lowering {
    pub fn is_comparison(self) -> bool {
        matches!(self, Lowering::IntCompare(_) | Lowering::FloatCompare(_))
    }
}

fn arith(op: BinaryOp) -> Option<ArithOp> {
    match op {
        BinaryOp::Add => Some(ArithOp::Add),
        BinaryOp::Sub => Some(ArithOp::Sub),
        BinaryOp::Mul => Some(ArithOp::Mul),
        BinaryOp::Div => Some(ArithOp::Div),
        _ => None,
    }
}

/// Picks the instruction for `op` on operands of class `class`.
///
/// `None` means the pair has no lowering.
pub fn select_lowering(op: BinaryOp, class: OperandClass) -> Option<Lowering> {
    match (class, op) {
        (_, BinaryOp::Pow) => None,

        (OperandClass::Int, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div) => {
            arith(op).map(Lowering::IntArith)
        }
        (OperandClass::Int, BinaryOp::Eq) => Some(Lowering::IntCompare(IntPredicate::EQ)),
        (OperandClass::Int, BinaryOp::Ne) => Some(Lowering::IntCompare(IntPredicate::NE)),
        (OperandClass::Int, BinaryOp::Gt) => Some(Lowering::IntCompare(IntPredicate::SGT)),
        (OperandClass::Int, BinaryOp::Ge) => Some(Lowering::IntCompare(IntPredicate::SGE)),
        (OperandClass::Int, BinaryOp::Lt) => Some(Lowering::IntCompare(IntPredicate::SLT)),
        (OperandClass::Int, BinaryOp::Le) => Some(Lowering::IntCompare(IntPredicate::SLE)),

        (OperandClass::Float, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div) => {
            arith(op).map(Lowering::FloatArith)
        }
        (OperandClass::Float, BinaryOp::Eq) => Some(Lowering::FloatCompare(FloatPredicate::OEQ)),
        (OperandClass::Float, BinaryOp::Ne) => Some(Lowering::FloatCompare(FloatPredicate::ONE)),
        (OperandClass::Float, BinaryOp::Gt) => Some(Lowering::FloatCompare(FloatPredicate::OGT)),
        (OperandClass::Float, BinaryOp::Ge) => Some(Lowering::FloatCompare(FloatPredicate::OGE)),
        (OperandClass::Float, BinaryOp::Lt) => Some(Lowering::FloatCompare(FloatPredicate::OLT)),
        (OperandClass::Float, BinaryOp::Le) => Some(Lowering::FloatCompare(FloatPredicate::OLE)),

        (OperandClass::Bool, BinaryOp::Eq) => Some(Lowering::IntCompare(IntPredicate::EQ)),
        (OperandClass::Bool, BinaryOp::Ne) => Some(Lowering::IntCompare(IntPredicate::NE)),
        (
            OperandClass::Bool,
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Lt
            | BinaryOp::Le,
        ) => None,

        (OperandClass::String | OperandClass::Struct | OperandClass::Trait | OperandClass::Void, _) => {
            None
        }
    }
}

/// Emits the instruction chosen by [`select_lowering`].
pub fn build_binary<'ctx>(
    builder: &Builder<'ctx>,
    lowering: Lowering,
    lhs: BasicValueEnum<'ctx>,
    rhs: BasicValueEnum<'ctx>,
) -> Result<BasicValueEnum<'ctx>, Error> {
    let value = match lowering {
        Lowering::IntArith(op) => {
            let (l, r) = (lhs.into_int_value(), rhs.into_int_value());
            match op {
                ArithOp::Add => builder.build_int_add(l, r, "")?,
                ArithOp::Sub => builder.build_int_sub(l, r, "")?,
                ArithOp::Mul => builder.build_int_mul(l, r, "")?,
                ArithOp::Div => builder.build_int_signed_div(l, r, "")?,
            }
            .into()
        }
        Lowering::FloatArith(op) => {
            let (l, r) = (lhs.into_float_value(), rhs.into_float_value());
            match op {
                ArithOp::Add => builder.build_float_add(l, r, "")?,
                ArithOp::Sub => builder.build_float_sub(l, r, "")?,
                ArithOp::Mul => builder.build_float_mul(l, r, "")?,
                ArithOp::Div => builder.build_float_div(l, r, "")?,
            }
            .into()
        }
        Lowering::IntCompare(predicate) => builder
            .build_int_compare(predicate, lhs.into_int_value(), rhs.into_int_value(), "")?
            .into(),
        Lowering::FloatCompare(predicate) => builder
            .build_float_compare(predicate, lhs.into_float_value(), rhs.into_float_value(), "")?
            .into(),
    };

    Ok(value)
}
