use inkwell::basic_block::BasicBlock;

use crate::{
    ast::{
        expressions::{BinaryOp, Expr, MatchExpr, Pattern},
        statements::{Stmt, VarDef},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    type_checker::{environment::ScopeKind, inference::infer},
};

use super::{
    compiler::{Binding, CodeGenerator, Slot},
    decl::check_annotation,
    expr::gen_expression,
    operators::{build_binary, select_lowering},
};

/// Generates one statement of a function body.
pub fn gen_statement<'ctx>(generator: &mut CodeGenerator<'ctx>, statement: &Stmt) -> Result<(), Error> {
    match statement {
        Stmt::VarDef(var) => gen_local(generator, var),
        Stmt::Assign { name, value } => {
            let binding = match generator.environment.resolve(name) {
                Ok(binding) => binding.clone(),
                Err(error) => {
                    generator.reporter.emit(error.to_string());
                    return Ok(());
                }
            };

            let target = match binding.slot {
                Slot::Local(slot) => slot,
                Slot::Global(global) => global.as_pointer_value(),
                Slot::Function(..) => {
                    generator
                        .reporter
                        .emit(format!("cannot assign to fn: {}", name));
                    return Ok(());
                }
            };
            if !binding.mutable {
                generator.reporter.emit(format!(
                    "cannot assign twice to immutable variable: {}",
                    name
                ));
                return Ok(());
            }

            let Some(value) = gen_expression(generator, value)? else {
                return Ok(());
            };
            if value.ty != binding.ty {
                generator.reporter.emit(format!(
                    "variable: {}, it's type is: {}, but receive: {}",
                    name, binding.ty, value.ty
                ));
                return Ok(());
            }

            generator.builder.build_store(target, value.value)?;
            Ok(())
        }
        Stmt::Return(value) => gen_return(generator, value.as_ref()),
        Stmt::Expr(expr) => {
            gen_expression(generator, expr)?;
            Ok(())
        }
        Stmt::Match(rule) => gen_match(generator, rule),
    }
}

fn gen_local<'ctx>(generator: &mut CodeGenerator<'ctx>, var: &VarDef) -> Result<(), Error> {
    if generator
        .environment
        .declared_in(&var.name, ScopeKind::Function)
    {
        generator
            .reporter
            .emit(format!("duplicate definition: {}", var.name));
        return Ok(());
    }

    let Some(value) = gen_expression(generator, &var.init)? else {
        if matches!(infer(&var.init, &*generator), Some(Type::Void)) {
            generator
                .reporter
                .emit(format!("variable: {}, initializer has no value", var.name));
        }
        return Ok(());
    };

    check_annotation(generator, var, &value.ty);

    let slot = generator
        .builder
        .build_alloca(generator.llvm_type(&value.ty)?, &var.name)?;
    generator.builder.build_store(slot, value.value)?;

    let binding = Binding {
        ty: value.ty,
        slot: Slot::Local(slot),
        mutable: var.mutable,
    };
    if let Err(error) = generator
        .environment
        .declare(&var.name, binding, ScopeKind::Function)
    {
        generator.reporter.emit(error.to_string());
    }

    Ok(())
}

fn gen_return<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    value: Option<&Expr>,
) -> Result<(), Error> {
    let Some(current) = generator.current_fn.clone() else {
        generator.reporter.emit("return outside of fn");
        return Ok(());
    };

    let Some(value) = value else {
        if current.ret.is_void() {
            generator.builder.build_return(None)?;
        } else {
            generator.reporter.emit(format!(
                "fn: {}, return type is: {}, but receive: void",
                current.name, current.ret
            ));
            generator.builder.build_unreachable()?;
        }
        return Ok(());
    };

    let Some(value) = gen_expression(generator, value)? else {
        // The diagnostic is out; keep the block terminated.
        generator.builder.build_unreachable()?;
        return Ok(());
    };

    if current.ret.is_void() {
        generator
            .reporter
            .emit(format!("fn: {} returns no value", current.name));
        generator.builder.build_return(None)?;
    } else if value.ty != current.ret {
        generator.reporter.emit(format!(
            "fn: {}, return type is: {}, but receive: {}",
            current.name, current.ret, value.ty
        ));
        generator.builder.build_unreachable()?;
    } else {
        generator.builder.build_return(Some(&value.value))?;
    }

    Ok(())
}

/// Lowers `match` into a chain of equality tests.
///
/// Each value arm gets a `match.arm.N` block, entered when the scrutinee
/// equals its pattern, and a `match.next.N` block that tries the next arm.
/// The wildcard body, or nothing, runs in the last `match.next` block.
/// Every arm that falls off its end branches to `match.end`. Each arm body
/// gets its own frame.
fn gen_match<'ctx>(generator: &mut CodeGenerator<'ctx>, rule: &MatchExpr) -> Result<(), Error> {
    let Some(function) = generator.current_fn.as_ref().map(|current| current.function) else {
        generator.reporter.emit("match outside of fn");
        return Ok(());
    };

    let Some(scrutinee) = gen_expression(generator, &rule.scrutinee)? else {
        return Ok(());
    };

    let lowering = select_lowering(BinaryOp::Eq, scrutinee.ty.class()).ok_or_else(|| {
        Error::codegen(ErrorImpl::UnsupportedOperator {
            operator: BinaryOp::Eq.to_string(),
            type_: scrutinee.ty.to_string(),
        })
    })?;

    let mut values = vec![];
    let mut wildcard = None;
    for arm in &rule.arms {
        if wildcard.is_some() {
            generator
                .reporter
                .emit("unreachable match arm after wildcard");
            break;
        }
        match &arm.pattern {
            Pattern::Wildcard => wildcard = Some(&arm.body),
            Pattern::Value(pattern) => values.push((pattern, &arm.body)),
        }
    }
    if wildcard.is_none() {
        generator.reporter.emit("non-exhaustive match");
    }

    // Blocks that still need a branch to `match.end`.
    let mut open: Vec<BasicBlock<'ctx>> = vec![];

    for (index, (pattern, body)) in values.into_iter().enumerate() {
        let Some(pattern) = gen_expression(generator, pattern)? else {
            continue;
        };
        if pattern.ty != scrutinee.ty {
            generator.reporter.emit(format!(
                "match arm pattern type is: {}, but scrutinee type is: {}",
                pattern.ty, scrutinee.ty
            ));
            continue;
        }

        let matched = build_binary(&generator.builder, lowering, scrutinee.value, pattern.value)?;
        let arm_block = generator
            .context
            .append_basic_block(function, &format!("match.arm.{}", index));
        let next_block = generator
            .context
            .append_basic_block(function, &format!("match.next.{}", index));
        generator
            .builder
            .build_conditional_branch(matched.into_int_value(), arm_block, next_block)?;

        generator.builder.position_at_end(arm_block);
        generator.in_function_scope(|g| gen_statement(g, body))?;
        if let Some(block) = generator.current_block() {
            if block.get_terminator().is_none() {
                open.push(block);
            }
        }

        generator.builder.position_at_end(next_block);
    }

    if let Some(body) = wildcard {
        generator.in_function_scope(|g| gen_statement(g, body))?;
    }
    if let Some(block) = generator.current_block() {
        if block.get_terminator().is_none() {
            open.push(block);
        }
    }

    let end_block = generator.context.append_basic_block(function, "match.end");
    for block in &open {
        generator.builder.position_at_end(*block);
        generator.builder.build_unconditional_branch(end_block)?;
    }

    generator.builder.position_at_end(end_block);
    if open.is_empty() {
        generator.builder.build_unreachable()?;
    }

    Ok(())
}
