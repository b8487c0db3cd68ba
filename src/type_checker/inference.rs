use crate::ast::{
    expressions::{BinaryOp, Expr},
    types::{FloatWidth, IntWidth, Type},
};

enum Suffix {
    Int(IntWidth),
    Float(FloatWidth),
}

fn parse_suffix(suffix: &str) -> Option<Suffix> {
    match suffix {
        "i8" => Some(Suffix::Int(IntWidth::I8)),
        "i16" => Some(Suffix::Int(IntWidth::I16)),
        "i32" => Some(Suffix::Int(IntWidth::I32)),
        "i64" => Some(Suffix::Int(IntWidth::I64)),
        "f32" => Some(Suffix::Float(FloatWidth::F32)),
        "f64" => Some(Suffix::Float(FloatWidth::F64)),
        _ => None,
    }
}

/// Builds a numeric literal from its digits and optional width suffix.
///
/// Without a suffix integers are `i32` and floats `f32`. An integer with a
/// float suffix becomes a float. The second element holds the problems
/// found on the way; the literal is still usable.
pub fn number_literal(digits: &str, suffix: Option<&str>) -> (Expr, Vec<String>) {
    let mut problems = vec![];
    let is_float = digits.contains('.');

    let suffix = match suffix {
        Some(text) => {
            let parsed = parse_suffix(text);
            if parsed.is_none() {
                problems.push(format!("unknown literal suffix: '{}", text));
            }
            parsed
        }
        None => None,
    };

    let expr = match (is_float, suffix) {
        (false, Some(Suffix::Int(width))) => int_literal(digits, width, &mut problems),
        (false, None) => int_literal(digits, IntWidth::I32, &mut problems),
        (_, Some(Suffix::Float(width))) => float_literal(digits, width, &mut problems),
        (true, Some(Suffix::Int(width))) => {
            problems.push(format!(
                "float literal: {} cannot take integer suffix: 'i{}",
                digits,
                width.bits()
            ));
            float_literal(digits, FloatWidth::F32, &mut problems)
        }
        (true, None) => float_literal(digits, FloatWidth::F32, &mut problems),
    };

    (expr, problems)
}

fn int_literal(digits: &str, width: IntWidth, problems: &mut Vec<String>) -> Expr {
    let value = digits.parse::<i64>().unwrap_or_else(|_| {
        problems.push(format!("integer literal out of range: {}", digits));
        0
    });
    let max = i64::MAX >> (64 - width.bits());
    if value > max {
        problems.push(format!(
            "integer literal: {} out of range for i{}",
            digits,
            width.bits()
        ));
    }
    Expr::int(value, width)
}

fn float_literal(digits: &str, width: FloatWidth, problems: &mut Vec<String>) -> Expr {
    let value = digits.parse::<f64>().unwrap_or_else(|_| {
        problems.push(format!("invalid float literal: {}", digits));
        0.0
    });
    Expr::float(value, width)
}

/// Message for a variable whose annotation disagrees with its initializer.
pub fn mismatch_message(name: &str, declared: &Type, inferred: &Type) -> String {
    format!(
        "global var: {}, it's type is: {}, but receive: {}",
        name, declared, inferred
    )
}

/// Read-only view of the names visible to inference.
pub trait TypeScope {
    fn variable_type(&self, name: &str) -> Option<Type>;
    fn function_return(&self, name: &str) -> Option<Type>;
    fn named_type(&self, name: &str) -> Option<Type>;
}

pub fn is_comparison(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Lt | BinaryOp::Le
    )
}

/// Static type of an expression, without emitting anything.
pub fn infer(expr: &Expr, scope: &dyn TypeScope) -> Option<Type> {
    match expr {
        Expr::IntLiteral { width, .. } => Some(Type::Int(*width)),
        Expr::FloatLiteral { width, .. } => Some(Type::Float(*width)),
        Expr::StringLiteral(_) => Some(Type::String),
        Expr::Identifier(name) if name == "true" || name == "false" => Some(Type::Bool),
        Expr::Identifier(name) => scope.variable_type(name),
        Expr::Binary { op, left, .. } => {
            if is_comparison(*op) {
                Some(Type::Bool)
            } else {
                infer(left, scope)
            }
        }
        Expr::FieldAccess { base, attr } => {
            let base = infer(base, scope)?;
            let struct_type = base.as_struct()?;
            let ordinal = struct_type.ordinal(attr)?;
            Some(struct_type.fields[ordinal].ty.clone())
        }
        Expr::Call { name, .. } => match scope.named_type(name) {
            Some(ty @ Type::Struct(_)) => Some(ty),
            _ => scope.function_return(name),
        },
        Expr::Ternary { then, .. } => infer(then, scope),
    }
}

/// Explains why [`infer`] gave up on `expr`.
pub fn explain_untyped(expr: &Expr, scope: &dyn TypeScope) -> String {
    match expr {
        Expr::Identifier(name) => format!("undefined identifier: {}", name),
        Expr::Binary { left, right, .. } => match infer(left, scope) {
            None => explain_untyped(left, scope),
            Some(_) => explain_untyped(right, scope),
        },
        Expr::FieldAccess { base, attr } => match infer(base, scope) {
            Some(ty) => format!("type: {} has no attribute: {}", ty, attr),
            None => explain_untyped(base, scope),
        },
        Expr::Call { name, .. } => format!("undefined identifier: {}", name),
        Expr::Ternary { then, .. } => explain_untyped(then, scope),
        Expr::IntLiteral { .. } | Expr::FloatLiteral { .. } | Expr::StringLiteral(_) => {
            String::from("expression miss error")
        }
    }
}
