//! Reference tree-walking evaluator.
//!
//! Runs programs straight from the AST, with the same meaning the code
//! generator gives them. It exists to cross-check lowered programs, so it
//! keeps no state between calls other than the functions it was given.

use std::collections::HashMap;

use crate::{
    compiler::{
        emitter::{is_truthy, BinaryOpcode},
        stdlib::lookup_host_function,
    },
    errors::errors::RuntimeError,
};

use super::{
    ast::{Expr, TopLevel},
    expressions::ForExpr,
    statements::{FunctionDef, Prototype},
};

/// Call depth limit for both interpreters. They recurse on the native
/// stack, so this must stay well inside a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 1_000;

pub struct Evaluator {
    functions: HashMap<String, FunctionDef>,
    externs: HashMap<String, Prototype>,
    depth: usize,
    max_depth: usize,
    /// Text written by host functions.
    pub output: String,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator {
            functions: HashMap::new(),
            externs: HashMap::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            output: String::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn define(&mut self, function: FunctionDef) {
        self.functions.insert(function.prototype.name.clone(), function);
    }

    pub fn declare(&mut self, prototype: Prototype) {
        self.externs.insert(prototype.name.clone(), prototype);
    }

    pub fn add(&mut self, item: TopLevel) {
        match item {
            TopLevel::Definition(function) | TopLevel::Expression(function) => self.define(function),
            TopLevel::Extern(prototype) => self.declare(prototype),
        }
    }

    pub fn call(&mut self, name: &str, args: &[f64]) -> Result<f64, RuntimeError> {
        let Some(function) = self.functions.get(name).cloned() else {
            return self.call_host(name, args);
        };

        if function.prototype.arity() != args.len() {
            return Err(RuntimeError::UnexpectedArguments {
                function: name.to_string(),
                expected: function.prototype.arity(),
                received: args.len(),
            });
        }

        if self.depth >= self.max_depth {
            return Err(RuntimeError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let mut env: Vec<(String, f64)> = function
            .prototype
            .params
            .iter()
            .cloned()
            .zip(args.iter().copied())
            .collect();

        self.depth += 1;
        let result = self.eval(&function.body, &mut env);
        self.depth -= 1;
        result
    }

    fn call_host(&mut self, name: &str, args: &[f64]) -> Result<f64, RuntimeError> {
        let Some(host) = lookup_host_function(name) else {
            if self.externs.contains_key(name) {
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

    fn eval(&mut self, expr: &Expr, env: &mut Vec<(String, f64)>) -> Result<f64, RuntimeError> {
        match expr {
            Expr::Number(e) => Ok(e.value),
            Expr::Variable(e) => lookup(env, &e.name).map(|index| env[index].1),
            Expr::Unary(e) => {
                let operand = self.eval(&e.operand, env)?;
                self.call(&format!("unary{}", e.opcode), &[operand])
            }
            Expr::Binary(e) => {
                if e.opcode == '=' {
                    let Expr::Variable(target) = e.lhs.as_ref() else {
                        return Err(RuntimeError::InvalidAssignmentTarget);
                    };
                    let value = self.eval(&e.rhs, env)?;
                    let index = lookup(env, &target.name)?;
                    env[index].1 = value;
                    return Ok(value);
                }

                let lhs = self.eval(&e.lhs, env)?;
                let rhs = self.eval(&e.rhs, env)?;
                match BinaryOpcode::from_symbol(e.opcode) {
                    Some(opcode) => Ok(opcode.apply(lhs, rhs)),
                    None => self.call(&format!("binary{}", e.opcode), &[lhs, rhs]),
                }
            }
            Expr::Call(e) => {
                let mut args = Vec::with_capacity(e.args.len());
                for arg in &e.args {
                    args.push(self.eval(arg, env)?);
                }
                self.call(&e.callee, &args)
            }
            Expr::If(e) => {
                if is_truthy(self.eval(&e.cond, env)?) {
                    self.eval(&e.then_branch, env)
                } else {
                    self.eval(&e.else_branch, env)
                }
            }
            Expr::For(e) => {
                let start = self.eval(&e.start, env)?;
                env.push((e.var_name.clone(), start));
                let slot = env.len() - 1;

                let result = self.run_loop(e, env, slot);
                env.truncate(slot);
                result
            }
            Expr::Var(e) => {
                let mark = env.len();
                let mut result = Ok(0.0);

                for (name, init) in &e.bindings {
                    let value = match init {
                        Some(init) => self.eval(init, env),
                        None => Ok(0.0),
                    };
                    match value {
                        Ok(value) => env.push((name.clone(), value)),
                        Err(err) => {
                            result = Err(err);
                            break;
                        }
                    }
                }

                if result.is_ok() {
                    result = self.eval(&e.body, env);
                }

                env.truncate(mark);
                result
            }
        }
    }
}

impl Evaluator {
    // The end condition is evaluated before the increment, and the loop
    // variable is re-read so the body may assign to it.
    fn run_loop(
        &mut self,
        e: &ForExpr,
        env: &mut Vec<(String, f64)>,
        slot: usize,
    ) -> Result<f64, RuntimeError> {
        loop {
            self.eval(&e.body, env)?;
            let step = match &e.step {
                Some(step) => self.eval(step, env)?,
                None => 1.0,
            };
            let end = self.eval(&e.end, env)?;
            env[slot].1 += step;
            if !is_truthy(end) {
                return Ok(0.0);
            }
        }
    }
}

fn lookup(env: &[(String, f64)], name: &str) -> Result<usize, RuntimeError> {
    env.iter()
        .rposition(|(bound, _)| bound == name)
        .ok_or_else(|| RuntimeError::UnknownVariable {
            variable: name.to_string(),
        })
}
