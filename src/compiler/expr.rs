use crate::{
    ast::{
        ast::Expr,
        expressions::{BinaryExpr, CallExpr, ForExpr, IfExpr, UnaryExpr, VarExpr},
    },
    errors::errors::{Error, ErrorImpl},
};

use super::{
    compiler::Compiler,
    emitter::{BinaryOpcode, TargetEmitter},
};

/// Generates code for the given expression at the emitter's insertion
/// point and returns its value.
pub fn gen_expression<E: TargetEmitter>(
    compiler: &mut Compiler<E>,
    expression: &Expr,
) -> Result<E::Value, Error> {
    match expression {
        Expr::Number(number) => Ok(compiler.emitter.constant(number.value)),
        Expr::Variable(variable) => match compiler.scope.lookup(&variable.name) {
            Some(slot) => Ok(compiler.emitter.load(slot)),
            None => Err(Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: variable.name.clone(),
                },
                variable.span.start.clone(),
            )),
        },
        Expr::Unary(unary) => gen_unary(compiler, unary),
        Expr::Binary(binary) => gen_binary(compiler, binary),
        Expr::Call(call) => gen_call(compiler, call),
        Expr::If(if_expr) => gen_if(compiler, if_expr),
        Expr::For(for_expr) => gen_for(compiler, for_expr),
        Expr::Var(var_expr) => gen_var(compiler, var_expr),
    }
}

fn gen_unary<E: TargetEmitter>(compiler: &mut Compiler<E>, unary: &UnaryExpr) -> Result<E::Value, Error> {
    let operand = gen_expression(compiler, &unary.operand)?;

    let Some((function, _)) = compiler
        .emitter
        .lookup_function(&format!("unary{}", unary.opcode))
    else {
        return Err(Error::new(
            ErrorImpl::UnknownUnaryOperator {
                operator: unary.opcode,
            },
            unary.span.start.clone(),
        ));
    };

    Ok(compiler.emitter.emit_unary_call(function, operand))
}

fn gen_binary<E: TargetEmitter>(compiler: &mut Compiler<E>, binary: &BinaryExpr) -> Result<E::Value, Error> {
    if binary.opcode == '=' {
        return gen_assignment(compiler, binary);
    }

    let lhs = gen_expression(compiler, &binary.lhs)?;
    let rhs = gen_expression(compiler, &binary.rhs)?;

    if let Some(opcode) = BinaryOpcode::from_symbol(binary.opcode) {
        let value = compiler.emitter.emit_binary_op(opcode, lhs, rhs);
        return Ok(match opcode {
            BinaryOpcode::LessThan | BinaryOpcode::NotEqual => {
                compiler.emitter.emit_bool_to_scalar(value)
            }
            _ => value,
        });
    }

    // The parser only treats a symbol as binary once its definition has been
    // declared, so the function must exist.
    let name = format!("binary{}", binary.opcode);
    let (function, _) = compiler
        .emitter
        .lookup_function(&name)
        .unwrap_or_else(|| panic!("Binary operator {} has no function {}", binary.opcode, name));

    Ok(compiler.emitter.emit_call(function, &[lhs, rhs]))
}

fn gen_assignment<E: TargetEmitter>(
    compiler: &mut Compiler<E>,
    binary: &BinaryExpr,
) -> Result<E::Value, Error> {
    let Expr::Variable(target) = binary.lhs.as_ref() else {
        return Err(Error::new(
            ErrorImpl::InvalidAssignmentTarget,
            binary.span.start.clone(),
        ));
    };

    let value = gen_expression(compiler, &binary.rhs)?;

    let Some(slot) = compiler.scope.lookup(&target.name) else {
        return Err(Error::new(
            ErrorImpl::VariableNotDeclared {
                variable: target.name.clone(),
            },
            target.span.start.clone(),
        ));
    };

    compiler.emitter.store(slot, value);
    Ok(value)
}

fn gen_call<E: TargetEmitter>(compiler: &mut Compiler<E>, call: &CallExpr) -> Result<E::Value, Error> {
    let Some((function, arity)) = compiler.emitter.lookup_function(&call.callee) else {
        return Err(Error::new(
            ErrorImpl::FunctionNotDeclared {
                function: call.callee.clone(),
            },
            call.span.start.clone(),
        ));
    };

    if arity != call.args.len() {
        return Err(Error::new(
            ErrorImpl::UnexpectedArguments {
                function: call.callee.clone(),
                expected: arity,
                received: call.args.len(),
            },
            call.span.start.clone(),
        ));
    }

    let mut args = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        args.push(gen_expression(compiler, arg)?);
    }

    Ok(compiler.emitter.emit_call(function, &args))
}

fn gen_condition<E: TargetEmitter>(compiler: &mut Compiler<E>, value: E::Value) -> E::Value {
    let zero = compiler.emitter.constant(0.0);
    compiler
        .emitter
        .emit_binary_op(BinaryOpcode::NotEqual, value, zero)
}

fn gen_if<E: TargetEmitter>(compiler: &mut Compiler<E>, if_expr: &IfExpr) -> Result<E::Value, Error> {
    let cond = gen_expression(compiler, &if_expr.cond)?;
    let cond = gen_condition(compiler, cond);

    let then_block = compiler.emitter.new_block("then");
    let else_block = compiler.emitter.new_block("else");
    let merge_block = compiler.emitter.new_block("ifcont");

    compiler.emitter.cond_branch(cond, then_block, else_block);

    compiler.emitter.set_insertion_point(then_block);
    let then_value = gen_expression(compiler, &if_expr.then_branch)?;
    // Nested control flow leaves the insertion point in a later block.
    let then_end = compiler.emitter.current_block();
    compiler.emitter.branch(merge_block);

    compiler.emitter.set_insertion_point(else_block);
    let else_value = gen_expression(compiler, &if_expr.else_branch)?;
    let else_end = compiler.emitter.current_block();
    compiler.emitter.branch(merge_block);

    compiler.emitter.set_insertion_point(merge_block);
    Ok(compiler
        .emitter
        .merge_values(&[(then_value, then_end), (else_value, else_end)]))
}

fn gen_for<E: TargetEmitter>(compiler: &mut Compiler<E>, for_expr: &ForExpr) -> Result<E::Value, Error> {
    let start = gen_expression(compiler, &for_expr.start)?;
    let slot = compiler.emitter.allocate_slot(&for_expr.var_name);
    compiler.emitter.store(slot, start);

    let loop_block = compiler.emitter.new_block("loop");
    compiler.emitter.branch(loop_block);
    compiler.emitter.set_insertion_point(loop_block);

    compiler.with_scope(|compiler| -> Result<E::Value, Error> {
        compiler.scope.bind(&for_expr.var_name, slot);

        gen_expression(compiler, &for_expr.body)?;

        let step = match &for_expr.step {
            Some(step) => gen_expression(compiler, step)?,
            None => compiler.emitter.constant(1.0),
        };
        let end = gen_expression(compiler, &for_expr.end)?;

        // The body may have assigned to the loop variable.
        let current = compiler.emitter.load(slot);
        let next = compiler
            .emitter
            .emit_binary_op(BinaryOpcode::Add, current, step);
        compiler.emitter.store(slot, next);

        let end = gen_condition(compiler, end);
        let after_block = compiler.emitter.new_block("afterloop");
        compiler.emitter.cond_branch(end, loop_block, after_block);
        compiler.emitter.set_insertion_point(after_block);

        Ok(compiler.emitter.constant(0.0))
    })
}

fn gen_var<E: TargetEmitter>(compiler: &mut Compiler<E>, var_expr: &VarExpr) -> Result<E::Value, Error> {
    compiler.with_scope(|compiler| -> Result<E::Value, Error> {
        for (name, init) in &var_expr.bindings {
            // Evaluated before `name` is bound, so `var a = a` reads the outer `a`.
            let value = match init {
                Some(init) => gen_expression(compiler, init)?,
                None => compiler.emitter.constant(0.0),
            };

            let slot = compiler.emitter.allocate_slot(name);
            compiler.emitter.store(slot, value);
            compiler.scope.bind(name, slot);
        }

        gen_expression(compiler, &var_expr.body)
    })
}
