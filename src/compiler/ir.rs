//! Reference backend: an in-memory block graph.
//!
//! [`IrModule`] implements [`TargetEmitter`] by recording every request as
//! an instruction in a basic block. The result can be printed in an
//! LLVM-like text form or run by the block interpreter.

use std::{collections::HashMap, fmt::Display};

use tracing::trace;

use crate::errors::errors::ErrorImpl;

use super::emitter::{BinaryOpcode, TargetEmitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

/// A virtual register, numbered per function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Const { dest: ValueId, value: f64 },
    Arg { dest: ValueId, index: usize },
    Store { slot: SlotId, value: ValueId },
    Load { dest: ValueId, slot: SlotId },
    Binary { dest: ValueId, opcode: BinaryOpcode, lhs: ValueId, rhs: ValueId },
    BoolToScalar { dest: ValueId, value: ValueId },
    Call { dest: ValueId, callee: String, args: Vec<ValueId> },
    Phi { dest: ValueId, incoming: Vec<(ValueId, BlockId)> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Branch(BlockId),
    CondBranch {
        condition: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    Return(ValueId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
    pub terminator: Option<Terminator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    pub name: String,
    pub params: Vec<String>,
    /// Names of the storage slots, indexed by `SlotId`.
    pub slots: Vec<String>,
    pub blocks: Vec<IrBlock>,
    pub value_count: usize,
}

impl IrFunction {
    fn new(name: &str, params: &[String]) -> Self {
        IrFunction {
            name: name.to_string(),
            params: params.to_vec(),
            slots: vec![],
            blocks: vec![],
            value_count: 0,
        }
    }

    pub fn has_body(&self) -> bool {
        !self.blocks.is_empty()
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    fn next_value(&mut self) -> ValueId {
        self.value_count += 1;
        ValueId(self.value_count - 1)
    }

    fn unique_label(&self, name: &str) -> String {
        let taken = |label: &str| self.blocks.iter().any(|block| block.label == label);
        if !taken(name) {
            return name.to_string();
        }

        let mut n = 1;
        while taken(&format!("{}{}", name, n)) {
            n += 1;
        }
        format!("{}{}", name, n)
    }
}

/// A module of functions, and the emitter that builds it.
#[derive(Debug, Default)]
pub struct IrModule {
    functions: Vec<Option<IrFunction>>,
    names: HashMap<String, FunctionId>,
    insertion: Option<(FunctionId, BlockId)>,
}

impl IrModule {
    pub fn new() -> Self {
        IrModule {
            functions: vec![],
            names: HashMap::new(),
            insertion: None,
        }
    }

    pub fn function(&self, name: &str) -> Option<&IrFunction> {
        let id = self.names.get(name)?;
        self.functions.get(id.0)?.as_ref()
    }

    /// Live functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &IrFunction> {
        self.functions.iter().flatten()
    }

    fn get_mut(&mut self, function: FunctionId) -> &mut IrFunction {
        self.functions
            .get_mut(function.0)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("Function {:?} was discarded", function))
    }

    fn insertion(&self) -> (FunctionId, BlockId) {
        self.insertion
            .unwrap_or_else(|| panic!("No insertion point: no function body is open"))
    }

    fn current_function(&mut self) -> &mut IrFunction {
        let (function, _) = self.insertion();
        self.get_mut(function)
    }

    fn push(&mut self, make: impl FnOnce(ValueId) -> Instruction) -> ValueId {
        let (function, block) = self.insertion();
        let function = self.get_mut(function);
        let dest = function.next_value();
        let instruction = make(dest);
        trace!(function = %function.name, ?instruction, "emit");
        function.blocks[block.0].instructions.push(instruction);
        dest
    }

    fn push_void(&mut self, instruction: Instruction) {
        let (function, block) = self.insertion();
        self.get_mut(function).blocks[block.0]
            .instructions
            .push(instruction);
    }

    fn terminate(&mut self, terminator: Terminator) {
        let (function, block) = self.insertion();
        let block = &mut self.get_mut(function).blocks[block.0];
        // A block keeps its first terminator, as code after a branch is dead.
        if block.terminator.is_none() {
            block.terminator = Some(terminator);
        }
    }
}

impl TargetEmitter for IrModule {
    type Function = FunctionId;
    type Block = BlockId;
    type Slot = SlotId;
    type Value = ValueId;

    fn declare_function(&mut self, name: &str, params: &[String]) -> Result<FunctionId, ErrorImpl> {
        if let Some(&id) = self.names.get(name) {
            let existing = self.get_mut(id);

            if existing.has_body() {
                return Err(ErrorImpl::FunctionAlreadyDeclared {
                    function: name.to_string(),
                });
            }
            if existing.arity() != params.len() {
                return Err(ErrorImpl::ArityMismatch {
                    function: name.to_string(),
                    expected: existing.arity(),
                    received: params.len(),
                });
            }

            existing.params = params.to_vec();
            return Ok(id);
        }

        let id = FunctionId(self.functions.len());
        self.functions.push(Some(IrFunction::new(name, params)));
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    fn lookup_function(&self, name: &str) -> Option<(FunctionId, usize)> {
        let id = *self.names.get(name)?;
        let function = self.functions.get(id.0)?.as_ref()?;
        Some((id, function.arity()))
    }

    fn begin_function_body(&mut self, function: FunctionId) -> BlockId {
        let ir = self.get_mut(function);
        ir.blocks.push(IrBlock {
            label: String::from("entry"),
            instructions: vec![],
            terminator: None,
        });

        let entry = BlockId(ir.blocks.len() - 1);
        self.insertion = Some((function, entry));
        entry
    }

    fn argument(&mut self, _function: FunctionId, index: usize) -> ValueId {
        self.push(|dest| Instruction::Arg { dest, index })
    }

    fn allocate_slot(&mut self, name: &str) -> SlotId {
        let function = self.current_function();
        function.slots.push(name.to_string());
        SlotId(function.slots.len() - 1)
    }

    fn store(&mut self, slot: SlotId, value: ValueId) {
        self.push_void(Instruction::Store { slot, value });
    }

    fn load(&mut self, slot: SlotId) -> ValueId {
        self.push(|dest| Instruction::Load { dest, slot })
    }

    fn constant(&mut self, value: f64) -> ValueId {
        self.push(|dest| Instruction::Const { dest, value })
    }

    fn emit_binary_op(&mut self, opcode: BinaryOpcode, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.push(|dest| Instruction::Binary {
            dest,
            opcode,
            lhs,
            rhs,
        })
    }

    fn emit_bool_to_scalar(&mut self, value: ValueId) -> ValueId {
        self.push(|dest| Instruction::BoolToScalar { dest, value })
    }

    fn emit_call(&mut self, function: FunctionId, args: &[ValueId]) -> ValueId {
        let callee = self.get_mut(function).name.clone();
        self.push(|dest| Instruction::Call {
            dest,
            callee,
            args: args.to_vec(),
        })
    }

    fn new_block(&mut self, name: &str) -> BlockId {
        let function = self.current_function();
        let label = function.unique_label(name);
        function.blocks.push(IrBlock {
            label,
            instructions: vec![],
            terminator: None,
        });
        BlockId(function.blocks.len() - 1)
    }

    fn current_block(&self) -> BlockId {
        self.insertion().1
    }

    fn set_insertion_point(&mut self, block: BlockId) {
        let (function, _) = self.insertion();
        self.insertion = Some((function, block));
    }

    fn branch(&mut self, target: BlockId) {
        self.terminate(Terminator::Branch(target));
    }

    fn cond_branch(&mut self, condition: ValueId, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::CondBranch {
            condition,
            then_block,
            else_block,
        });
    }

    fn merge_values(&mut self, incoming: &[(ValueId, BlockId)]) -> ValueId {
        self.push(|dest| Instruction::Phi {
            dest,
            incoming: incoming.to_vec(),
        })
    }

    fn finalize_function(&mut self, function: FunctionId, return_value: ValueId) {
        self.terminate(Terminator::Return(return_value));
        if self.insertion.map(|(f, _)| f) == Some(function) {
            self.insertion = None;
        }
    }

    fn discard_body(&mut self, function: FunctionId) {
        let ir = self.get_mut(function);
        ir.blocks.clear();
        ir.slots.clear();
        ir.value_count = 0;

        if self.insertion.map(|(f, _)| f) == Some(function) {
            self.insertion = None;
        }
    }

    fn discard_function(&mut self, function: FunctionId) {
        if let Some(slot) = self.functions.get_mut(function.0) {
            if let Some(discarded) = slot.take() {
                self.names.remove(&discarded.name);
            }
        }
        if self.insertion.map(|(f, _)| f) == Some(function) {
            self.insertion = None;
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Const { dest, value } => write!(f, "%{} = const {:?}", dest.0, value),
            Instruction::Arg { dest, index } => write!(f, "%{} = arg {}", dest.0, index),
            Instruction::Store { slot, value } => write!(f, "store %{}, $slot{}", value.0, slot.0),
            Instruction::Load { dest, slot } => write!(f, "%{} = load $slot{}", dest.0, slot.0),
            Instruction::Binary {
                dest,
                opcode,
                lhs,
                rhs,
            } => write!(f, "%{} = {} %{}, %{}", dest.0, opcode.mnemonic(), lhs.0, rhs.0),
            Instruction::BoolToScalar { dest, value } => write!(f, "%{} = uitofp %{}", dest.0, value.0),
            Instruction::Call { dest, callee, args } => {
                let args: Vec<String> = args.iter().map(|a| format!("%{}", a.0)).collect();
                write!(f, "%{} = call @{}({})", dest.0, callee, args.join(", "))
            }
            Instruction::Phi { dest, incoming } => {
                let incoming: Vec<String> = incoming
                    .iter()
                    .map(|(value, block)| format!("[%{}, #{}]", value.0, block.0))
                    .collect();
                write!(f, "%{} = phi {}", dest.0, incoming.join(", "))
            }
        }
    }
}

impl Display for IrFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| format!("double %{}", p)).collect();

        if !self.has_body() {
            return writeln!(f, "declare double @{}({})", self.name, params.join(", "));
        }

        writeln!(f, "define double @{}({}) {{", self.name, params.join(", "))?;
        for (index, slot) in self.slots.iter().enumerate() {
            writeln!(f, "  $slot{} = alloca double ; {}", index, slot)?;
        }

        let label = |block: &BlockId| self.blocks[block.0].label.as_str();

        for (index, block) in self.blocks.iter().enumerate() {
            writeln!(f, "{}: ; #{}", block.label, index)?;
            for instruction in &block.instructions {
                match instruction {
                    // Name incoming blocks by label, as the branches do.
                    Instruction::Phi { dest, incoming } => {
                        let incoming: Vec<String> = incoming
                            .iter()
                            .map(|(value, block)| format!("[%{}, %{}]", value.0, label(block)))
                            .collect();
                        writeln!(f, "  %{} = phi {}", dest.0, incoming.join(", "))?;
                    }
                    _ => writeln!(f, "  {}", instruction)?,
                }
            }

            match &block.terminator {
                Some(Terminator::Branch(target)) => writeln!(f, "  br label %{}", label(target))?,
                Some(Terminator::CondBranch {
                    condition,
                    then_block,
                    else_block,
                }) => writeln!(
                    f,
                    "  br %{}, label %{}, label %{}",
                    condition.0,
                    label(then_block),
                    label(else_block)
                )?,
                Some(Terminator::Return(value)) => writeln!(f, "  ret %{}", value.0)?,
                None => writeln!(f, "  ; no terminator")?,
            }
        }
        writeln!(f, "}}")
    }
}

impl Display for IrModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, function) in self.functions().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}
