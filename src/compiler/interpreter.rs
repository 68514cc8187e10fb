//! Runs an [`IrModule`] by walking its block graph.

use crate::{ast::eval::DEFAULT_MAX_DEPTH, errors::errors::RuntimeError};

use super::{
    emitter::is_truthy,
    ir::{BlockId, Instruction, IrFunction, IrModule, Terminator},
    stdlib::lookup_host_function,
};

pub struct Interpreter<'m> {
    module: &'m IrModule,
    depth: usize,
    max_depth: usize,
    /// Text written by host functions.
    pub output: String,
}

impl<'m> Interpreter<'m> {
    pub fn new(module: &'m IrModule) -> Self {
        Interpreter {
            module,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            output: String::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Calls `name` with `args`. Functions without a body fall back to the
    /// host functions.
    pub fn call(&mut self, name: &str, args: &[f64]) -> Result<f64, RuntimeError> {
        let module = self.module;
        let Some(function) = module.function(name).filter(|f| f.has_body()) else {
            return self.call_host(name, args);
        };

        if function.arity() != args.len() {
            return Err(RuntimeError::UnexpectedArguments {
                function: name.to_string(),
                expected: function.arity(),
                received: args.len(),
            });
        }

        if self.depth >= self.max_depth {
            return Err(RuntimeError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        self.depth += 1;
        let result = self.run(function, args);
        self.depth -= 1;
        result
    }

    fn call_host(&mut self, name: &str, args: &[f64]) -> Result<f64, RuntimeError> {
        let Some(host) = lookup_host_function(name) else {
            if self.module.function(name).is_some() {
                return Err(RuntimeError::MissingBody {
                    function: name.to_string(),
                });
            }
            return Err(RuntimeError::UnknownFunction {
                function: name.to_string(),
            });
        };

        if host.arity != args.len() {
            return Err(RuntimeError::UnexpectedArguments {
                function: name.to_string(),
                expected: host.arity,
                received: args.len(),
            });
        }

        Ok((host.call)(args, &mut self.output))
    }

    fn run(&mut self, function: &IrFunction, args: &[f64]) -> Result<f64, RuntimeError> {
        let mut values = vec![0.0; function.value_count];
        let mut slots: Vec<Option<f64>> = vec![None; function.slots.len()];

        let mut previous: Option<BlockId> = None;
        let mut current = BlockId(0);

        loop {
            let block = &function.blocks[current.0];

            for instruction in &block.instructions {
                match instruction {
                    Instruction::Const { dest, value } => values[dest.0] = *value,
                    Instruction::Arg { dest, index } => values[dest.0] = args[*index],
                    Instruction::Store { slot, value } => slots[slot.0] = Some(values[value.0]),
                    Instruction::Load { dest, slot } => {
                        values[dest.0] = slots[slot.0].ok_or(RuntimeError::UnsetSlot { slot: slot.0 })?;
                    }
                    Instruction::Binary {
                        dest,
                        opcode,
                        lhs,
                        rhs,
                    } => values[dest.0] = opcode.apply(values[lhs.0], values[rhs.0]),
                    // Booleans are already 1.0 or 0.0.
                    Instruction::BoolToScalar { dest, value } => values[dest.0] = values[value.0],
                    Instruction::Call { dest, callee, args } => {
                        let args: Vec<f64> = args.iter().map(|arg| values[arg.0]).collect();
                        values[dest.0] = self.call(callee, &args)?;
                    }
                    Instruction::Phi { dest, incoming } => {
                        let arrived = incoming
                            .iter()
                            .find(|(_, block)| Some(*block) == previous)
                            .map(|(value, _)| values[value.0]);

                        values[dest.0] = arrived.unwrap_or_else(|| {
                            panic!("Phi in {} has no entry for the predecessor block", function.name)
                        });
                    }
                }
            }

            let next = match &block.terminator {
                Some(Terminator::Return(value)) => return Ok(values[value.0]),
                Some(Terminator::Branch(target)) => *target,
                Some(Terminator::CondBranch {
                    condition,
                    then_block,
                    else_block,
                }) => {
                    if is_truthy(values[condition.0]) {
                        *then_block
                    } else {
                        *else_block
                    }
                }
                None => {
                    return Err(RuntimeError::MissingTerminator {
                        function: function.name.clone(),
                        block: block.label.clone(),
                    })
                }
            };

            previous = Some(current);
            current = next;
        }
    }
}
