//! Main compiler module.
//!
//! This module holds the `CodeGenerator`, which receives declarations from
//! the assembler and emits them into an LLVM module, and the `compile`
//! driver that runs the whole pipeline from source text to a finished
//! module.

use std::{collections::HashMap, rc::Rc};

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    types::{
        BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, PointerType, StructType,
    },
    values::{BasicValueEnum, FunctionValue, GlobalValue, PointerValue},
    AddressSpace,
};
use tracing::{debug, info_span};

use crate::{
    assembler::assembler::{Assembler, DeclarationSink},
    ast::{
        ast::Decl,
        types::{FloatWidth, Signature, Type},
    },
    errors::{
        errors::{Error, ErrorImpl},
        reporter::Reporter,
    },
    lexer::lexer::tokenize,
    parser::{
        parser::parse,
        tree::{walk, ParseTree},
    },
    type_checker::{
        environment::{Environment, ScopeKind},
        inference::TypeScope,
    },
};

use super::{constant::Const, decl::gen_declaration, finalize::fix_dups};

/// Where a binding lives in the module.
#[derive(Debug, Clone)]
pub enum Slot<'ctx> {
    Global(GlobalValue<'ctx>),
    Local(PointerValue<'ctx>),
    Function(FunctionValue<'ctx>, Rc<Signature>),
}

#[derive(Debug, Clone)]
pub struct Binding<'ctx> {
    pub ty: Type,
    pub slot: Slot<'ctx>,
    pub mutable: bool,
}

/// An SSA value together with its Elz type.
#[derive(Debug, Clone)]
pub struct Typed<'ctx> {
    pub value: BasicValueEnum<'ctx>,
    pub ty: Type,
}

/// The function whose body is being generated.
#[derive(Debug, Clone)]
pub struct FnContext<'ctx> {
    pub name: String,
    pub ret: Type,
    pub function: FunctionValue<'ctx>,
}

pub struct CodeGenerator<'ctx> {
    /// Reference to the LLVM context
    pub context: &'ctx Context,
    /// The LLVM module being built
    pub module: Module<'ctx>,
    /// The LLVM IR builder
    pub builder: Builder<'ctx>,

    pub environment: Environment<Binding<'ctx>>,
    /// LLVM struct types by Elz type name
    pub named_structs: HashMap<String, StructType<'ctx>>,
    /// Folded values of global constants, used when folding later globals
    pub constants: HashMap<String, Const>,
    pub current_fn: Option<FnContext<'ctx>>,

    pub reporter: Reporter,
    pub exports: Vec<String>,
    pub imports: Vec<String>,
    /// The error that stopped generation, if any.
    pub halted: Option<Error>,
}

impl<'ctx> CodeGenerator<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        CodeGenerator {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            environment: Environment::new(),
            named_structs: HashMap::new(),
            constants: HashMap::new(),
            current_fn: None,
            reporter: Reporter::new(),
            exports: vec![],
            imports: vec![],
            halted: None,
        }
    }

    /// Walks a parse tree, generating each declaration as it completes.
    pub fn run(&mut self, tree: &ParseTree) {
        let mut assembler = Assembler::new(self);
        walk(&mut assembler, tree);
    }

    /// Converts an Elz type to the LLVM type of its values.
    ///
    /// Strings, structs and trait objects are all held by pointer.
    pub fn llvm_type(&self, ty: &Type) -> Result<BasicTypeEnum<'ctx>, Error> {
        let llvm_type = match ty {
            Type::Int(width) => self.context.custom_width_int_type(width.bits()).into(),
            Type::Float(FloatWidth::F32) => self.context.f32_type().into(),
            Type::Float(FloatWidth::F64) => self.context.f64_type().into(),
            Type::Bool => self.context.bool_type().into(),
            Type::String | Type::Trait(_) => self.i8_ptr_type().into(),
            Type::Struct(struct_type) => match self.named_structs.get(&struct_type.name) {
                Some(llvm_struct) => llvm_struct.ptr_type(AddressSpace::default()).into(),
                None => {
                    return Err(Error::codegen(ErrorImpl::UnsizedType {
                        type_: ty.to_string(),
                    }))
                }
            },
            Type::Void => {
                return Err(Error::codegen(ErrorImpl::UnsizedType {
                    type_: ty.to_string(),
                }))
            }
        };

        Ok(llvm_type)
    }

    pub fn fn_type(&self, signature: &Signature) -> Result<FunctionType<'ctx>, Error> {
        let params = signature
            .params
            .iter()
            .map(|param| self.llvm_type(param).map(BasicMetadataTypeEnum::from))
            .collect::<Result<Vec<_>, Error>>()?;

        let function_type = if signature.ret.is_void() {
            self.context.void_type().fn_type(&params, false)
        } else {
            self.llvm_type(&signature.ret)?.fn_type(&params, false)
        };

        Ok(function_type)
    }

    pub fn i8_ptr_type(&self) -> PointerType<'ctx> {
        self.context.i8_type().ptr_type(AddressSpace::default())
    }

    /// Emits a private, null terminated string constant and returns it as
    /// an `i8*`.
    pub fn string_constant(&self, text: &str) -> PointerValue<'ctx> {
        let bytes = self.context.const_string(text.as_bytes(), true);
        let global = self
            .module
            .add_global(bytes.get_type(), Some(AddressSpace::default()), ".str");
        global.set_initializer(&bytes);
        global.set_linkage(Linkage::Private);
        global.set_constant(true);
        global.set_unnamed_addr(true);

        global.as_pointer_value().const_cast(self.i8_ptr_type())
    }

    /// `i8* malloc(i64)`, declared on first use.
    pub fn malloc(&self) -> FunctionValue<'ctx> {
        self.module.get_function("malloc").unwrap_or_else(|| {
            let malloc_type = self
                .i8_ptr_type()
                .fn_type(&[self.context.i64_type().into()], false);
            self.module
                .add_function("malloc", malloc_type, Some(Linkage::External))
        })
    }

    /// Runs `body` inside a fresh function frame. The frame is popped on
    /// every exit path.
    pub fn in_function_scope<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.environment.push_frame(ScopeKind::Function);
        let result = body(self);
        self.environment.pop_frame();
        result
    }

    pub fn current_block(&self) -> Option<BasicBlock<'ctx>> {
        self.builder.get_insert_block()
    }

    /// Whether the block being filled already ends in a terminator.
    pub fn is_terminated(&self) -> bool {
        self.current_block()
            .and_then(|block| block.get_terminator())
            .is_some()
    }

    /// Resolves a type annotation, reporting unknown names.
    pub fn resolve_type_name(&mut self, name: &str) -> Option<Type> {
        let ty = self.environment.get_type(name);
        if ty.is_none() {
            self.reporter.emit(format!("undefined type: {}", name));
        }
        ty
    }

    /// Records the error that stops generation of this module.
    fn halt(&mut self, error: Error) {
        self.reporter.fatal(error.to_string());
        self.builder.clear_insertion_position();
        self.current_fn = None;
        self.halted = Some(error);
    }

    /// Finalizes and verifies the module.
    pub fn finish(self, options: &CompileOptions) -> (Reporter, Result<Output<'ctx>, Error>) {
        let mut reporter = self.reporter;

        if let Some(error) = self.halted {
            return (reporter, Err(error));
        }

        if options.finalize {
            fix_dups(&self.module);
        }

        if options.verify && reporter.is_empty() {
            if let Err(message) = self.module.verify() {
                let error = Error::codegen(ErrorImpl::Builder {
                    message: message.to_string(),
                });
                reporter.fatal(error.to_string());
                return (reporter, Err(error));
            }
        }

        let output = Output {
            module: self.module,
            exports: self.exports,
        };
        (reporter, Ok(output))
    }
}

impl DeclarationSink for CodeGenerator<'_> {
    fn accept(&mut self, decl: Decl) {
        if self.halted.is_some() {
            debug!(decl = %decl.name(), "skipped after fatal error");
            return;
        }

        debug!(decl = %decl.name(), "generating declaration");
        if let Err(error) = gen_declaration(self, &decl) {
            self.halt(error);
        }
    }

    fn reporter(&mut self) -> &mut Reporter {
        &mut self.reporter
    }
}

impl TypeScope for CodeGenerator<'_> {
    fn variable_type(&self, name: &str) -> Option<Type> {
        match self.environment.resolve(name) {
            Ok(Binding {
                slot: Slot::Function(..),
                ..
            }) => None,
            Ok(binding) => Some(binding.ty.clone()),
            Err(_) => None,
        }
    }

    fn function_return(&self, name: &str) -> Option<Type> {
        match self.environment.resolve(name) {
            Ok(Binding {
                slot: Slot::Function(_, signature),
                ..
            }) => Some(signature.ret.clone()),
            _ => None,
        }
    }

    fn named_type(&self, name: &str) -> Option<Type> {
        self.environment.get_type(name)
    }
}

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Name given to the LLVM module
    pub module_name: String,
    /// Rename duplicate top-level symbols after generation
    pub finalize: bool,
    /// Run the LLVM verifier when generation produced no diagnostics
    pub verify: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            module_name: String::from("main"),
            finalize: true,
            verify: true,
        }
    }
}

pub struct Output<'ctx> {
    pub module: Module<'ctx>,
    /// Exported symbol names in source order
    pub exports: Vec<String>,
}

impl Output<'_> {
    pub fn ir(&self) -> String {
        self.module.print_to_string().to_string()
    }
}

/// Compiles one source file to an LLVM module.
///
/// Hard lexing and parsing errors stop before generation. Otherwise the
/// reporter holds every diagnostic in emission order, and the result is
/// an error only if generation hit a fatal one.
pub fn compile<'ctx>(
    source: &str,
    file_name: &str,
    options: &CompileOptions,
    context: &'ctx Context,
) -> (Reporter, Result<Output<'ctx>, Error>) {
    let span = info_span!("compile", file = %file_name);
    let _guard = span.enter();

    let mut reporter = Reporter::new();

    let tokens = match tokenize(source.to_string(), Some(file_name.to_string())) {
        Ok(tokens) => tokens,
        Err(error) => {
            reporter.fatal(error.to_string());
            return (reporter, Err(error));
        }
    };

    let (parser, tree) = parse(tokens, Rc::new(file_name.to_string()));
    let tree = match tree {
        Ok(tree) => tree,
        Err(error) => {
            reporter.fatal(error.to_string());
            return (reporter, Err(error));
        }
    };

    let mut generator = CodeGenerator::new(context, &options.module_name);
    for error in parser.recovered() {
        generator.reporter.emit(format!("syntax error: {}", error));
    }

    generator.run(&tree);
    generator.finish(options)
}
