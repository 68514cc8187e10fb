//! LLVM backend.
//!
//! Lowers the same emitter requests into an inkwell module. Slots become
//! allocas at the top of the entry block, merges become phi nodes, and
//! conditions use ordered compares as the block interpreter does.

use std::path::Path;

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::Module,
    types::BasicMetadataTypeEnum,
    values::{
        BasicMetadataValueEnum, BasicValue, BasicValueEnum, FunctionValue, InstructionValue,
        PointerValue,
    },
    FloatPredicate,
};
use tracing::warn;

use crate::errors::errors::ErrorImpl;

use super::emitter::{BinaryOpcode, TargetEmitter};

pub struct LlvmEmitter<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    function: Option<FunctionValue<'ctx>>,
}

impl<'ctx> LlvmEmitter<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        LlvmEmitter {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            function: None,
        }
    }

    /// Writes the module as textual IR.
    pub fn save_module_to_file(&self, path: &Path) -> Result<(), String> {
        self.module.print_to_file(path).map_err(|err| err.to_string())
    }

    fn current_function(&self) -> FunctionValue<'ctx> {
        self.function
            .unwrap_or_else(|| panic!("No function body is open"))
    }
}

impl<'ctx> TargetEmitter for LlvmEmitter<'ctx> {
    type Function = FunctionValue<'ctx>;
    type Block = BasicBlock<'ctx>;
    type Slot = PointerValue<'ctx>;
    type Value = BasicValueEnum<'ctx>;

    fn declare_function(&mut self, name: &str, params: &[String]) -> Result<FunctionValue<'ctx>, ErrorImpl> {
        let function = match self.module.get_function(name) {
            Some(existing) => {
                if existing.count_basic_blocks() > 0 {
                    return Err(ErrorImpl::FunctionAlreadyDeclared {
                        function: name.to_string(),
                    });
                }
                if existing.count_params() as usize != params.len() {
                    return Err(ErrorImpl::ArityMismatch {
                        function: name.to_string(),
                        expected: existing.count_params() as usize,
                        received: params.len(),
                    });
                }
                existing
            }
            None => {
                let f64_type = self.context.f64_type();
                let param_types: Vec<BasicMetadataTypeEnum> = vec![f64_type.into(); params.len()];
                let function_type = f64_type.fn_type(&param_types, false);
                self.module.add_function(name, function_type, None)
            }
        };

        for (param, name) in function.get_param_iter().zip(params) {
            param.into_float_value().set_name(name);
        }

        Ok(function)
    }

    fn lookup_function(&self, name: &str) -> Option<(FunctionValue<'ctx>, usize)> {
        self.module
            .get_function(name)
            .map(|function| (function, function.count_params() as usize))
    }

    fn begin_function_body(&mut self, function: FunctionValue<'ctx>) -> BasicBlock<'ctx> {
        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);
        self.function = Some(function);
        entry
    }

    fn argument(&mut self, function: FunctionValue<'ctx>, index: usize) -> BasicValueEnum<'ctx> {
        function
            .get_nth_param(index as u32)
            .unwrap_or_else(|| panic!("Function has no parameter {}", index))
    }

    // Allocas go at the top of the entry block so mem2reg can promote them.
    fn allocate_slot(&mut self, name: &str) -> PointerValue<'ctx> {
        let builder = self.context.create_builder();
        let entry = self
            .current_function()
            .get_first_basic_block()
            .unwrap_or_else(|| panic!("Function has no entry block"));

        match entry.get_first_instruction() {
            Some(first) => builder.position_before(&first),
            None => builder.position_at_end(entry),
        }

        builder.build_alloca(self.context.f64_type(), name).unwrap()
    }

    fn store(&mut self, slot: PointerValue<'ctx>, value: BasicValueEnum<'ctx>) {
        self.builder.build_store(slot, value).unwrap();
    }

    fn load(&mut self, slot: PointerValue<'ctx>) -> BasicValueEnum<'ctx> {
        self.builder.build_load(slot, "tmp").unwrap()
    }

    fn constant(&mut self, value: f64) -> BasicValueEnum<'ctx> {
        self.context.f64_type().const_float(value).into()
    }

    fn emit_binary_op(
        &mut self,
        opcode: BinaryOpcode,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
    ) -> BasicValueEnum<'ctx> {
        let lhs = lhs.into_float_value();
        let rhs = rhs.into_float_value();

        match opcode {
            BinaryOpcode::Add => self.builder.build_float_add(lhs, rhs, "addtmp").unwrap().into(),
            BinaryOpcode::Sub => self.builder.build_float_sub(lhs, rhs, "subtmp").unwrap().into(),
            BinaryOpcode::Mul => self.builder.build_float_mul(lhs, rhs, "multmp").unwrap().into(),
            BinaryOpcode::LessThan => self
                .builder
                .build_float_compare(FloatPredicate::ULT, lhs, rhs, "cmptmp")
                .unwrap()
                .into(),
            BinaryOpcode::NotEqual => self
                .builder
                .build_float_compare(FloatPredicate::ONE, lhs, rhs, "cond")
                .unwrap()
                .into(),
        }
    }

    fn emit_bool_to_scalar(&mut self, value: BasicValueEnum<'ctx>) -> BasicValueEnum<'ctx> {
        self.builder
            .build_unsigned_int_to_float(value.into_int_value(), self.context.f64_type(), "booltmp")
            .unwrap()
            .into()
    }

    fn emit_call(&mut self, function: FunctionValue<'ctx>, args: &[BasicValueEnum<'ctx>]) -> BasicValueEnum<'ctx> {
        let args: Vec<BasicMetadataValueEnum<'ctx>> = args.iter().map(|arg| (*arg).into()).collect();

        self.builder
            .build_call(function, &args, "calltmp")
            .unwrap()
            .try_as_basic_value()
            .left()
            .unwrap_or(self.context.f64_type().const_zero().into())
    }

    fn new_block(&mut self, name: &str) -> BasicBlock<'ctx> {
        self.context.append_basic_block(self.current_function(), name)
    }

    fn current_block(&self) -> BasicBlock<'ctx> {
        self.builder
            .get_insert_block()
            .unwrap_or_else(|| panic!("Builder is not positioned"))
    }

    fn set_insertion_point(&mut self, block: BasicBlock<'ctx>) {
        self.builder.position_at_end(block);
    }

    fn branch(&mut self, target: BasicBlock<'ctx>) {
        self.builder.build_unconditional_branch(target).unwrap();
    }

    fn cond_branch(&mut self, condition: BasicValueEnum<'ctx>, then_block: BasicBlock<'ctx>, else_block: BasicBlock<'ctx>) {
        self.builder
            .build_conditional_branch(condition.into_int_value(), then_block, else_block)
            .unwrap();
    }

    fn merge_values(&mut self, incoming: &[(BasicValueEnum<'ctx>, BasicBlock<'ctx>)]) -> BasicValueEnum<'ctx> {
        let phi = self.builder.build_phi(self.context.f64_type(), "iftmp").unwrap();

        let incoming: Vec<(&dyn BasicValue<'ctx>, BasicBlock<'ctx>)> = incoming
            .iter()
            .map(|(value, block)| (value as &dyn BasicValue<'ctx>, *block))
            .collect();
        phi.add_incoming(&incoming);

        phi.as_basic_value()
    }

    fn finalize_function(&mut self, function: FunctionValue<'ctx>, return_value: BasicValueEnum<'ctx>) {
        self.builder.build_return(Some(&return_value)).unwrap();

        if !function.verify(false) {
            warn!(function = %function.get_name().to_string_lossy(), "function failed verification");
        }
        self.function = None;
    }

    fn discard_function(&mut self, function: FunctionValue<'ctx>) {
        // Safety: the compiler only discards functions it declared for this
        // definition, which no emitted call refers to.
        unsafe { function.delete() };
        self.function = None;
    }

    fn discard_body(&mut self, function: FunctionValue<'ctx>) {
        let blocks = function.get_basic_blocks();

        // Terminators are the only users of blocks.
        for block in &blocks {
            if let Some(terminator) = block.get_terminator() {
                terminator.erase_from_basic_block();
            }
        }

        let mut remaining: Vec<InstructionValue<'ctx>> = vec![];
        for block in &blocks {
            let mut next = block.get_first_instruction();
            while let Some(instruction) = next {
                next = instruction.get_next_instruction();
                remaining.push(instruction);
            }
        }

        // Erase unused instructions until none are left. The body has no phi
        // cycles, so every pass erases at least one.
        while !remaining.is_empty() {
            let (unused, used): (Vec<_>, Vec<_>) = remaining
                .into_iter()
                .partition(|instruction| instruction.get_first_use().is_none());

            if unused.is_empty() {
                warn!(
                    function = %function.get_name().to_string_lossy(),
                    left = used.len(),
                    "could not strip function body"
                );
                return;
            }

            for instruction in unused {
                instruction.erase_from_basic_block();
            }
            remaining = used;
        }

        for block in blocks {
            // Safety: the block is empty and no terminator refers to it.
            if unsafe { block.delete() }.is_err() {
                warn!(function = %function.get_name().to_string_lossy(), "could not delete block");
            }
        }

        self.builder.clear_insertion_position();
        self.function = None;
    }
}
