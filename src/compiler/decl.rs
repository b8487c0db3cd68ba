use std::rc::Rc;

use inkwell::{
    module::Linkage,
    values::{BasicValueEnum, FunctionValue},
    AddressSpace,
};
use tracing::debug;

use crate::{
    ast::{
        ast::Decl,
        statements::{FnDef, ImplBlock, Param, TraitDef, TypeDef, VarDef},
        types::{Field, FloatWidth, Signature, StructType, TraitType, Type},
    },
    errors::errors::{Error, ErrorImpl},
    type_checker::{
        environment::ScopeKind,
        inference::{explain_untyped, infer, mismatch_message},
    },
};

use super::{
    compiler::{Binding, CodeGenerator, FnContext, Slot},
    constant::{fold, Const, Fold},
    stmt::gen_statement,
};

pub fn gen_declaration<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    decl: &Decl,
) -> Result<(), Error> {
    match decl {
        Decl::Import(path) => {
            let path = path.join("::");
            debug!(path = %path, "import");
            generator.imports.push(path);
            Ok(())
        }
        Decl::Var(var) => gen_global(generator, var),
        Decl::Fn(function) => gen_function(generator, function, None),
        Decl::Type(type_def) => gen_type(generator, type_def),
        Decl::Trait(trait_def) => gen_trait(generator, trait_def),
        Decl::Impl(block) => gen_impl(generator, block),
    }
}

/// Checks an optional annotation against the inferred type.
///
/// Emission always uses the inferred type, so this only reports.
pub fn check_annotation(
    generator: &mut CodeGenerator<'_>,
    var: &VarDef,
    inferred: &Type,
) {
    let Some(type_name) = &var.declared_type else {
        return;
    };
    if let Some(declared) = generator.resolve_type_name(type_name) {
        if &declared != inferred {
            generator
                .reporter
                .emit(mismatch_message(&var.name, &declared, inferred));
        }
    }
}

pub fn const_value<'ctx>(generator: &CodeGenerator<'ctx>, value: &Const) -> BasicValueEnum<'ctx> {
    match value {
        Const::Int(v, width) => generator
            .context
            .custom_width_int_type(width.bits())
            .const_int(*v as u64, true)
            .into(),
        Const::Float(v, FloatWidth::F32) => generator.context.f32_type().const_float(*v).into(),
        Const::Float(v, FloatWidth::F64) => generator.context.f64_type().const_float(*v).into(),
        Const::Bool(b) => generator
            .context
            .bool_type()
            .const_int(u64::from(*b), false)
            .into(),
        Const::Str(text) => generator.string_constant(text).into(),
    }
}

fn gen_global<'ctx>(generator: &mut CodeGenerator<'ctx>, var: &VarDef) -> Result<(), Error> {
    if generator
        .environment
        .declared_in(&var.name, ScopeKind::Global)
    {
        generator
            .reporter
            .emit(format!("duplicate definition: {}", var.name));
        return Ok(());
    }

    let Some(inferred) = infer(&var.init, &*generator) else {
        let reason = explain_untyped(&var.init, &*generator);
        generator.reporter.emit(reason);
        return Ok(());
    };
    if inferred.is_void() {
        generator
            .reporter
            .emit(format!("global var: {}, initializer has no value", var.name));
        return Ok(());
    }

    check_annotation(generator, var, &inferred);

    let llvm_type = generator.llvm_type(&inferred)?;
    let folded = fold(&var.init, &generator.constants, &mut generator.reporter)?;
    let initializer = match folded {
        Fold::Const(value) => {
            let initializer = const_value(generator, &value);
            generator.constants.insert(var.name.clone(), value);
            initializer
        }
        Fold::NotConstant => {
            generator.reporter.emit(format!(
                "global var: {}, initializer is not a constant",
                var.name
            ));
            llvm_type.const_zero()
        }
        Fold::Reported => llvm_type.const_zero(),
    };

    let global = generator
        .module
        .add_global(llvm_type, Some(AddressSpace::default()), &var.name);
    global.set_initializer(&initializer);

    let binding = Binding {
        ty: inferred,
        slot: Slot::Global(global),
        mutable: var.mutable,
    };
    if let Err(error) = generator
        .environment
        .declare(&var.name, binding, ScopeKind::Global)
    {
        generator.reporter.emit(error.to_string());
    }

    if var.exported {
        generator.exports.push(var.name.clone());
    }
    debug!(name = %var.name, "defined global");

    Ok(())
}

/// Resolves parameter and return type names. Unknown names are reported
/// and give `None`.
fn resolve_signature(
    generator: &mut CodeGenerator<'_>,
    name: &str,
    params: &[Param],
    return_type: Option<&str>,
) -> Option<Signature> {
    let mut param_types = vec![];
    for param in params {
        param_types.push(generator.resolve_type_name(&param.type_name)?);
    }

    let ret = match return_type {
        Some(type_name) => generator.resolve_type_name(type_name)?,
        None => Type::Void,
    };

    Some(Signature {
        name: name.to_string(),
        params: param_types,
        ret,
    })
}

/// Generates a function, or a method when `receiver` is set.
///
/// Methods are named `Type::method` and take the receiver as an implicit
/// first parameter `self`.
pub fn gen_function<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    function: &FnDef,
    receiver: Option<&Type>,
) -> Result<(), Error> {
    let name = match receiver {
        Some(target) => format!("{}::{}", target, function.name),
        None => function.name.clone(),
    };

    if generator.environment.declared_in(&name, ScopeKind::Global) {
        generator
            .reporter
            .emit(format!("duplicate definition: {}", name));
        return Ok(());
    }

    let Some(mut signature) = resolve_signature(
        generator,
        &name,
        &function.params,
        function.return_type.as_deref(),
    ) else {
        return Ok(());
    };

    let mut param_names: Vec<String> = function.params.iter().map(|p| p.name.clone()).collect();
    if let Some(target) = receiver {
        signature.params.insert(0, target.clone());
        param_names.insert(0, String::from("self"));
    }

    let fn_type = generator.fn_type(&signature)?;
    let linkage = if function.exported {
        Some(Linkage::External)
    } else {
        None
    };
    let llvm_fn = generator.module.add_function(&name, fn_type, linkage);

    let signature = Rc::new(signature);
    let ret = signature.ret.clone();

    // Bound before the body so the function can call itself.
    let binding = Binding {
        ty: ret.clone(),
        slot: Slot::Function(llvm_fn, signature.clone()),
        mutable: false,
    };
    if let Err(error) = generator
        .environment
        .declare(&name, binding, ScopeKind::Global)
    {
        generator.reporter.emit(error.to_string());
    }
    if function.exported {
        generator.exports.push(name.clone());
    }

    let entry = generator.context.append_basic_block(llvm_fn, "entry");
    generator.builder.position_at_end(entry);
    generator.current_fn = Some(FnContext {
        name: name.clone(),
        ret,
        function: llvm_fn,
    });

    let params: Vec<(String, Type)> = param_names
        .into_iter()
        .zip(signature.params.iter().cloned())
        .collect();
    let result = generator.in_function_scope(|g| gen_body(g, function, &params, llvm_fn));

    generator.current_fn = None;
    generator.builder.clear_insertion_position();
    debug!(name = %name, "defined fn");

    result
}

fn gen_body<'ctx>(
    generator: &mut CodeGenerator<'ctx>,
    function: &FnDef,
    params: &[(String, Type)],
    llvm_fn: FunctionValue<'ctx>,
) -> Result<(), Error> {
    let fn_name = llvm_fn.get_name().to_string_lossy().into_owned();

    for (index, (name, ty)) in params.iter().enumerate() {
        let value = llvm_fn.get_nth_param(index as u32).ok_or_else(|| {
            Error::codegen(ErrorImpl::Builder {
                message: format!("fn: {} has no parameter {}", fn_name, index),
            })
        })?;

        let slot = generator
            .builder
            .build_alloca(generator.llvm_type(ty)?, name)?;
        generator.builder.build_store(slot, value)?;

        let binding = Binding {
            ty: ty.clone(),
            slot: Slot::Local(slot),
            mutable: false,
        };
        if let Err(error) = generator
            .environment
            .declare(name, binding, ScopeKind::Function)
        {
            generator.reporter.emit(error.to_string());
        }
    }

    for stmt in &function.body {
        if generator.is_terminated() {
            generator
                .reporter
                .emit(format!("dead code after return in fn: {}", fn_name));
            break;
        }
        gen_statement(generator, stmt)?;
    }

    if !generator.is_terminated() {
        let returns_void = generator
            .current_fn
            .as_ref()
            .map_or(true, |current| current.ret.is_void());

        if returns_void {
            generator.builder.build_return(None)?;
        } else {
            generator
                .reporter
                .emit(format!("missing return in fn: {}", fn_name));
            generator.builder.build_unreachable()?;
        }
    }

    Ok(())
}

fn gen_type<'ctx>(generator: &mut CodeGenerator<'ctx>, type_def: &TypeDef) -> Result<(), Error> {
    if generator.environment.get_type(&type_def.name).is_some() {
        generator
            .reporter
            .emit(format!("duplicate definition: {}", type_def.name));
        return Ok(());
    }

    let mut fields: Vec<Field> = vec![];
    for attr in &type_def.attrs {
        if fields.iter().any(|field| field.name == attr.name) {
            generator
                .reporter
                .emit(format!("duplicate definition: {}", attr.name));
            continue;
        }
        let Some(ty) = generator.resolve_type_name(&attr.type_name) else {
            return Ok(());
        };
        fields.push(Field {
            name: attr.name.clone(),
            ty,
        });
    }

    let llvm_fields = fields
        .iter()
        .map(|field| generator.llvm_type(&field.ty))
        .collect::<Result<Vec<_>, Error>>()?;

    let struct_type = generator.context.opaque_struct_type(&type_def.name);
    struct_type.set_body(&llvm_fields, false);
    generator
        .named_structs
        .insert(type_def.name.clone(), struct_type);

    let ty = Type::Struct(Rc::new(StructType {
        name: type_def.name.clone(),
        fields,
    }));
    if let Err(error) = generator.environment.declare_type(&type_def.name, ty) {
        generator.reporter.emit(error.to_string());
    }

    if type_def.exported {
        generator.exports.push(type_def.name.clone());
    }
    debug!(name = %type_def.name, "defined type");

    Ok(())
}

fn gen_trait(generator: &mut CodeGenerator<'_>, trait_def: &TraitDef) -> Result<(), Error> {
    if generator.environment.get_type(&trait_def.name).is_some() {
        generator
            .reporter
            .emit(format!("duplicate definition: {}", trait_def.name));
        return Ok(());
    }

    let mut methods = vec![];
    for method in &trait_def.methods {
        let Some(signature) = resolve_signature(
            generator,
            &method.name,
            &method.params,
            method.return_type.as_deref(),
        ) else {
            return Ok(());
        };
        methods.push(signature);
    }

    let ty = Type::Trait(Rc::new(TraitType {
        name: trait_def.name.clone(),
        methods,
    }));
    if let Err(error) = generator.environment.declare_type(&trait_def.name, ty) {
        generator.reporter.emit(error.to_string());
    }

    if trait_def.exported {
        generator.exports.push(trait_def.name.clone());
    }
    debug!(name = %trait_def.name, "defined trait");

    Ok(())
}

fn gen_impl<'ctx>(generator: &mut CodeGenerator<'ctx>, block: &ImplBlock) -> Result<(), Error> {
    let target = match generator.environment.get_type(&block.target) {
        Some(ty @ Type::Struct(_)) => ty,
        Some(other) => {
            generator
                .reporter
                .emit(format!("impl target: {} is not a struct type", other));
            return Ok(());
        }
        None => {
            generator
                .reporter
                .emit(format!("undefined type: {}", block.target));
            return Ok(());
        }
    };

    let mut traits = vec![];
    for interface in &block.interfaces {
        match generator.environment.get_type(interface) {
            Some(Type::Trait(trait_type)) => traits.push(trait_type),
            Some(other) => generator
                .reporter
                .emit(format!("type: {} is not a trait", other)),
            None => generator
                .reporter
                .emit(format!("undefined type: {}", interface)),
        }
    }

    for method in &block.methods {
        gen_function(generator, method, Some(&target))?;
    }

    for trait_type in &traits {
        for required in &trait_type.methods {
            if !block.methods.iter().any(|m| m.name == required.name) {
                generator.reporter.emit(format!(
                    "impl {}: missing method `{}` of trait `{}`",
                    block.target, required.name, trait_type.name
                ));
                continue;
            }

            let qualified = format!("{}::{}", block.target, required.name);
            let mismatched = match generator.environment.resolve(&qualified) {
                Ok(Binding {
                    slot: Slot::Function(_, signature),
                    ..
                }) => {
                    signature.params.get(1..) != Some(required.params.as_slice())
                        || signature.ret != required.ret
                }
                _ => false,
            };
            if mismatched {
                generator.reporter.emit(format!(
                    "impl {}: method `{}` does not match trait `{}`",
                    block.target, required.name, trait_type.name
                ));
            }
        }
    }

    Ok(())
}
