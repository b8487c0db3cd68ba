use std::rc::Rc;

use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum};

use crate::{
    ast::{
        expressions::{BinaryOp, Expr},
        types::{check_sized, FloatWidth, StructType, Type},
    },
    errors::errors::{Error, ErrorImpl},
    type_checker::inference::is_comparison,
};

use super::{
    compiler::{Binding, CodeGenerator, Slot, Typed},
    operators::{build_binary, select_lowering},
};

/// Generates LLVM IR for the given expression.
///
/// `Ok(None)` means no value: either a diagnostic was emitted or the
/// expression is a call to a void function. `Err` is fatal.
pub fn gen_expression<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    expression: &Expr,
) -> Result<Option<Typed<'ctx>>, Error> {
    match expression {
        Expr::IntLiteral { value, width } => {
            let value = generator
                .context
                .custom_width_int_type(width.bits())
                .const_int(*value as u64, true);
            Ok(Some(Typed {
                value: value.into(),
                ty: Type::Int(*width),
            }))
        }
        Expr::FloatLiteral { value, width } => {
            let float_type = match width {
                FloatWidth::F32 => generator.context.f32_type(),
                FloatWidth::F64 => generator.context.f64_type(),
            };
            Ok(Some(Typed {
                value: float_type.const_float(*value).into(),
                ty: Type::Float(*width),
            }))
        }
        Expr::StringLiteral(text) => Ok(Some(Typed {
            value: generator.string_constant(text).into(),
            ty: Type::String,
        })),
        Expr::Identifier(name) => gen_identifier(generator, name),
        Expr::Binary { op, left, right } => gen_binary(generator, *op, left, right),
        Expr::FieldAccess { base, attr } => gen_field_access(generator, base, attr),
        Expr::Call { name, args } => {
            if let Some(Type::Struct(struct_type)) = generator.environment.get_type(name) {
                return gen_construct(generator, struct_type, args);
            }
            gen_call(generator, name, args)
        }
        Expr::Ternary {
            cond,
            then,
            otherwise,
        } => gen_ternary(generator, cond, then, otherwise),
    }
}

fn gen_identifier<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    name: &str,
) -> Result<Option<Typed<'ctx>>, Error> {
    if name == "true" || name == "false" {
        let value = generator
            .context
            .bool_type()
            .const_int(u64::from(name == "true"), false);
        return Ok(Some(Typed {
            value: value.into(),
            ty: Type::Bool,
        }));
    }

    let binding = match generator.environment.resolve(name) {
        Ok(binding) => binding.clone(),
        Err(error) => {
            generator.reporter.emit(error.to_string());
            return Ok(None);
        }
    };

    let pointer = match binding.slot {
        Slot::Local(slot) => slot,
        Slot::Global(global) => global.as_pointer_value(),
        Slot::Function(..) => {
            generator
                .reporter
                .emit(format!("fn: {} cannot be used as a value", name));
            return Ok(None);
        }
    };

    let value = generator.builder.build_load(pointer, name)?;
    Ok(Some(Typed {
        value,
        ty: binding.ty,
    }))
}

fn gen_binary<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
) -> Result<Option<Typed<'ctx>>, Error> {
    let left = gen_expression(generator, left)?;
    let right = gen_expression(generator, right)?;
    let (Some(left), Some(right)) = (left, right) else {
        return Ok(None);
    };

    if left.ty != right.ty {
        generator.reporter.emit(format!(
            "binary operator `{}` receive mismatched types: {} and {}",
            op, left.ty, right.ty
        ));
        return Ok(None);
    }

    let lowering = select_lowering(op, left.ty.class()).ok_or_else(|| {
        Error::codegen(ErrorImpl::UnsupportedOperator {
            operator: op.to_string(),
            type_: left.ty.to_string(),
        })
    })?;

    let value = build_binary(&generator.builder, lowering, left.value, right.value)?;
    let ty = if is_comparison(op) { Type::Bool } else { left.ty };

    Ok(Some(Typed { value, ty }))
}

/// `base.attr`: a GEP at the attribute's ordinal followed by a load.
fn gen_field_access<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    base: &Expr,
    attr: &str,
) -> Result<Option<Typed<'ctx>>, Error> {
    let Some(base) = gen_expression(generator, base)? else {
        return Ok(None);
    };

    let field = base.ty.as_struct().and_then(|struct_type| {
        struct_type
            .ordinal(attr)
            .map(|ordinal| (ordinal, struct_type.fields[ordinal].ty.clone()))
    });
    let Some((ordinal, field_type)) = field else {
        generator
            .reporter
            .emit(format!("type: {} has no attribute: {}", base.ty, attr));
        return Ok(None);
    };

    let pointer = generator
        .builder
        .build_struct_gep(base.value.into_pointer_value(), ordinal as u32, "")?;
    let value = generator.builder.build_load(pointer, attr)?;

    Ok(Some(Typed {
        value,
        ty: field_type,
    }))
}

/// Generates every argument, stopping at the first that has no value.
fn gen_arguments<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    args: &[Expr],
) -> Result<Option<Vec<Typed<'ctx>>>, Error> {
    let mut values = vec![];
    for arg in args {
        match gen_expression(generator, arg)? {
            Some(value) => values.push(value),
            None => return Ok(None),
        }
    }
    Ok(Some(values))
}

fn gen_call<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    name: &str,
    args: &[Expr],
) -> Result<Option<Typed<'ctx>>, Error> {
    let (function, signature) = match generator.environment.resolve(name) {
        Ok(Binding {
            slot: Slot::Function(function, signature),
            ..
        }) => (*function, Rc::clone(signature)),
        Ok(_) => {
            generator
                .reporter
                .emit(format!("identifier: {} is not a fn", name));
            return Ok(None);
        }
        Err(error) => {
            let message = error.to_string();
            generator.reporter.emit(message);
            return Ok(None);
        }
    };

    if args.len() != signature.params.len() {
        generator.reporter.emit(format!(
            "fn: {} expects {} arguments, but receive {}",
            name,
            signature.params.len(),
            args.len()
        ));
        return Ok(None);
    }

    let Some(values) = gen_arguments(generator, args)? else {
        return Ok(None);
    };

    for (index, (value, expected)) in values.iter().zip(&signature.params).enumerate() {
        if &value.ty != expected {
            generator.reporter.emit(format!(
                "fn: {}, argument {} type is: {}, but receive: {}",
                name, index, expected, value.ty
            ));
            return Ok(None);
        }
    }

    let args: Vec<BasicMetadataValueEnum<'ctx>> =
        values.iter().map(|value| value.value.into()).collect();
    let call = generator.builder.build_call(function, &args, "")?;

    if signature.ret.is_void() {
        return Ok(None);
    }

    Ok(call
        .try_as_basic_value()
        .left()
        .map(|value| Typed {
            value,
            ty: signature.ret.clone(),
        }))
}

/// `Bar(10, 2.5)`: heap allocates the struct body, sized by LLVM's data
/// layout, and stores each attribute in declaration order.
fn gen_construct<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    struct_type: Rc<StructType>,
    args: &[Expr],
) -> Result<Option<Typed<'ctx>>, Error> {
    if args.len() != struct_type.fields.len() {
        generator.reporter.emit(format!(
            "type: {} expects {} attributes, but receive {}",
            struct_type.name,
            struct_type.fields.len(),
            args.len()
        ));
        return Ok(None);
    }

    let Some(values) = gen_arguments(generator, args)? else {
        return Ok(None);
    };

    for (value, field) in values.iter().zip(&struct_type.fields) {
        if value.ty != field.ty {
            generator.reporter.emit(format!(
                "type: {}, attribute: {} type is: {}, but receive: {}",
                struct_type.name, field.name, field.ty, value.ty
            ));
            return Ok(None);
        }
    }

    check_sized(&struct_type)?;
    let size = generator
        .named_structs
        .get(&struct_type.name)
        .and_then(|llvm_struct| llvm_struct.size_of())
        .ok_or_else(|| {
            Error::codegen(ErrorImpl::UnsizedType {
                type_: struct_type.name.clone(),
            })
        })?;
    let ty = Type::Struct(struct_type);
    let pointer_type = generator.llvm_type(&ty)?.into_pointer_type();

    let malloc = generator.malloc();
    let raw = generator
        .builder
        .build_call(malloc, &[size.into()], "")?
        .try_as_basic_value()
        .left()
        .ok_or_else(|| {
            Error::codegen(ErrorImpl::Builder {
                message: String::from("malloc returned no value"),
            })
        })?;
    let object = generator
        .builder
        .build_pointer_cast(raw.into_pointer_value(), pointer_type, "")?;

    for (ordinal, value) in values.iter().enumerate() {
        let slot = generator
            .builder
            .build_struct_gep(object, ordinal as u32, "")?;
        generator.builder.build_store(slot, value.value)?;
    }

    Ok(Some(Typed {
        value: BasicValueEnum::from(object),
        ty,
    }))
}

/// `c ? a : b`: a `select` when both arms are safe to evaluate eagerly,
/// otherwise a `tern.then`/`tern.else`/`tern.end` chain joined by a phi.
fn gen_ternary<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    cond: &Expr,
    then: &Expr,
    otherwise: &Expr,
) -> Result<Option<Typed<'ctx>>, Error> {
    let Some(cond) = gen_expression(generator, cond)? else {
        return Ok(None);
    };
    if cond.ty != Type::Bool {
        generator.reporter.emit(format!(
            "ternary condition type is: {}, but expect: bool",
            cond.ty
        ));
        return Ok(None);
    }

    let function = generator.current_fn.as_ref().map(|current| current.function);
    let function = match function {
        Some(function) if !(then.is_speculatable() && otherwise.is_speculatable()) => function,
        _ => return gen_select(generator, cond, then, otherwise),
    };

    let then_block = generator.context.append_basic_block(function, "tern.then");
    let else_block = generator.context.append_basic_block(function, "tern.else");
    generator.builder.build_conditional_branch(
        cond.value.into_int_value(),
        then_block,
        else_block,
    )?;

    generator.builder.position_at_end(then_block);
    let then = gen_expression(generator, then)?;
    let then_exit = generator.current_block();

    generator.builder.position_at_end(else_block);
    let otherwise = gen_expression(generator, otherwise)?;
    let else_exit = generator.current_block();

    let end_block = generator.context.append_basic_block(function, "tern.end");
    for block in [then_exit, else_exit].into_iter().flatten() {
        generator.builder.position_at_end(block);
        generator.builder.build_unconditional_branch(end_block)?;
    }
    generator.builder.position_at_end(end_block);

    let (Some(then), Some(otherwise), Some(then_exit), Some(else_exit)) =
        (then, otherwise, then_exit, else_exit)
    else {
        return Ok(None);
    };
    if then.ty != otherwise.ty {
        generator.reporter.emit(format!(
            "ternary branches have mismatched types: {} and {}",
            then.ty, otherwise.ty
        ));
        return Ok(None);
    }

    let phi = generator
        .builder
        .build_phi(generator.llvm_type(&then.ty)?, "tern")?;
    phi.add_incoming(&[(&then.value, then_exit), (&otherwise.value, else_exit)]);

    Ok(Some(Typed {
        value: phi.as_basic_value(),
        ty: then.ty,
    }))
}

fn gen_select<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    cond: Typed<'ctx>,
    then: &Expr,
    otherwise: &Expr,
) -> Result<Option<Typed<'ctx>>, Error> {
    let then = gen_expression(generator, then)?;
    let otherwise = gen_expression(generator, otherwise)?;
    let (Some(then), Some(otherwise)) = (then, otherwise) else {
        return Ok(None);
    };

    if then.ty != otherwise.ty {
        generator.reporter.emit(format!(
            "ternary branches have mismatched types: {} and {}",
            then.ty, otherwise.ty
        ));
        return Ok(None);
    }

    let value = generator.builder.build_select(
        cond.value.into_int_value(),
        then.value,
        otherwise.value,
        "",
    )?;

    Ok(Some(Typed {
        value,
        ty: then.ty,
    }))
}
