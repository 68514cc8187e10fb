//! Unit tests for the compiler module.
//!
//! This module contains tests for:
//! - Scope frames and shadowing
//! - Lowering through the block-graph backend and running the result
//! - Function redefinition rules and the per-function states
//! - Operator installation and rollback
//! - Code generation errors

use crate::ast::ast::Expr;
use crate::compiler::compiler::{Compiler, FunctionState};
use crate::compiler::emitter::{BinaryOpcode, TargetEmitter};
use crate::compiler::expr::gen_expression;
use crate::compiler::interpreter::Interpreter;
use crate::compiler::ir::{Instruction, IrModule, SlotId};
use crate::compiler::scope::Scope;
use crate::driver::drive;
use crate::errors::diagnostics::CollectingSink;
use crate::errors::errors::RuntimeError;
use crate::parser::expr::parse_expr;
use crate::parser::lookups::{OperatorEntry, OperatorRegistry};
use crate::parser::parser::Parser;

fn compile(source: &str) -> (Compiler<IrModule>, CollectingSink) {
    let mut compiler = Compiler::new(IrModule::new(), OperatorRegistry::shared());
    let mut sink = CollectingSink::new();
    drive(&mut compiler, source, Some("test.ks".to_string()), &mut sink);
    (compiler, sink)
}

fn run(source: &str, function: &str, args: &[f64]) -> Result<f64, RuntimeError> {
    let (compiler, sink) = compile(source);
    assert!(sink.is_empty(), "unexpected errors: {:?}", sink.errors);

    Interpreter::new(&compiler.emitter).call(function, args)
}

fn expression(source: &str) -> Expr {
    let mut parser = Parser::from_source(source, None, OperatorRegistry::shared());
    parse_expr(&mut parser).unwrap()
}

/// A compiler with an open body for `f(a)`, and the slot bound to `a`.
fn open_function() -> (Compiler<IrModule>, SlotId) {
    let mut compiler = Compiler::new(IrModule::new(), OperatorRegistry::shared());
    let function = compiler
        .emitter
        .declare_function("f", &["a".to_string()])
        .unwrap();
    compiler.emitter.begin_function_body(function);

    let slot = compiler.emitter.allocate_slot("a");
    compiler.scope.bind("a", slot);
    (compiler, slot)
}

#[test]
fn test_scope_shadowing() {
    let mut scope: Scope<u32> = Scope::new();
    scope.bind("x", 1);

    scope.push_frame();
    assert_eq!(scope.lookup("x"), Some(1));
    scope.bind("x", 2);
    scope.bind("y", 3);
    assert_eq!(scope.lookup("x"), Some(2));
    scope.pop_frame();

    assert_eq!(scope.lookup("x"), Some(1));
    assert_eq!(scope.lookup("y"), None);
    assert_eq!(scope.depth(), 1);
}

#[test]
fn test_scope_outer_frame_is_never_popped() {
    let mut scope: Scope<u32> = Scope::new();
    scope.bind("x", 1);
    scope.pop_frame();

    assert_eq!(scope.lookup("x"), Some(1));
}

#[test]
fn test_fib() {
    let source = "def fib(x) if x < 3 then 1 else fib(x-1)+fib(x-2)";
    assert_eq!(run(source, "fib", &[10.0]), Ok(55.0));
}

#[test]
fn test_var_reads_literal() {
    assert_eq!(run("def f() var a = 1 in a", "f", &[]), Ok(1.0));
    assert_eq!(run("def f() var a, b = 2 in a + b", "f", &[]), Ok(2.0));
}

#[test]
fn test_var_initializer_reads_outer_binding() {
    let (compiler, sink) = compile("def f(a) var a = a in a");
    assert!(sink.is_empty());

    let function = compiler.emitter.function("f").unwrap();
    let loads: Vec<SlotId> = function.blocks[0]
        .instructions
        .iter()
        .filter_map(|instruction| match instruction {
            Instruction::Load { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect();

    // Slot 0 holds the parameter and slot 1 the new binding.
    assert_eq!(loads, vec![SlotId(0), SlotId(1)]);

    assert_eq!(run("def f(a) var a = a + 10 in a * 2", "f", &[1.0]), Ok(22.0));
}

#[test]
fn test_scope_restored_after_var() {
    let (mut compiler, slot) = open_function();

    gen_expression(&mut compiler, &expression("var a = 5, b in a + b")).unwrap();

    assert_eq!(compiler.scope.lookup("a"), Some(slot));
    assert_eq!(compiler.scope.lookup("b"), None);
    assert_eq!(compiler.scope.depth(), 1);
}

#[test]
fn test_scope_restored_after_failed_var() {
    let (mut compiler, slot) = open_function();

    let err = gen_expression(&mut compiler, &expression("var a = 1, b = 2 in c")).unwrap_err();

    assert_eq!(err.get_error_name(), "VariableNotDeclared");
    assert_eq!(compiler.scope.lookup("a"), Some(slot));
    assert_eq!(compiler.scope.lookup("b"), None);
    assert_eq!(compiler.scope.depth(), 1);
}

#[test]
fn test_scope_restored_after_loop() {
    let (mut compiler, slot) = open_function();

    gen_expression(&mut compiler, &expression("for a = 1, a < 3 in a")).unwrap();
    assert_eq!(compiler.scope.lookup("a"), Some(slot));

    let err = gen_expression(&mut compiler, &expression("for a = 1, a < 3 in c")).unwrap_err();
    assert_eq!(err.get_error_name(), "VariableNotDeclared");
    assert_eq!(compiler.scope.lookup("a"), Some(slot));
    assert_eq!(compiler.scope.depth(), 1);
}

#[test]
fn test_loop_value_is_zero() {
    let source = "extern printd(x) def f() for i = 1, i < 3 in printd(i)";
    let (compiler, sink) = compile(source);
    assert!(sink.is_empty());

    let mut interpreter = Interpreter::new(&compiler.emitter);
    assert_eq!(interpreter.call("f", &[]), Ok(0.0));
    assert_eq!(interpreter.output, "1.000000\n2.000000\n3.000000\n");
}

#[test]
fn test_loop_rereads_variable_after_body() {
    let source = "def f() var n = 0 in (for i = 0, i < 10 in (i = i + 1) + (n = n + 1)) + n";
    assert_eq!(run(source, "f", &[]), Ok(6.0));
}

#[test]
fn test_loop_with_step() {
    let source = "def binary> 10 (a b) b < a
                  def f() var n = 0 in (for i = 10, i > 0, 0 - 2 in n = n + i) + n";
    // Runs for i = 10, 8, .., 0; the last pass adds nothing.
    assert_eq!(run(source, "f", &[]), Ok(30.0));
}

#[test]
fn test_nested_if_merges_from_inner_blocks() {
    let source = "def f(x) if x < 10 then (if x < 5 then 1 else 2) else 3";

    assert_eq!(run(source, "f", &[1.0]), Ok(1.0));
    assert_eq!(run(source, "f", &[7.0]), Ok(2.0));
    assert_eq!(run(source, "f", &[12.0]), Ok(3.0));
}

#[test]
fn test_less_than_widens_to_scalar() {
    assert_eq!(run("def f(a b) (a < b) + (a < b)", "f", &[1.0, 2.0]), Ok(2.0));
    assert_eq!(run("def f(a b) a < b", "f", &[3.0, 2.0]), Ok(0.0));
}

#[test]
fn test_assignment_value() {
    assert_eq!(run("def f(x) (x = 4) + x", "f", &[1.0]), Ok(8.0));
}

#[test]
fn test_user_operators() {
    let source = "def unary!(v) if v then 0 else 1
                  def binary| 5 (a b) if a then 1 else if b then 1 else 0
                  def f(x) !x | 0";

    assert_eq!(run(source, "f", &[0.0]), Ok(1.0));
    assert_eq!(run(source, "f", &[3.0]), Ok(0.0));
}

#[test]
fn test_state_after_success_and_failure() {
    let (compiler, _) = compile("def f(x) x");
    assert_eq!(compiler.state, Some(FunctionState::Finalized));

    let (compiler, sink) = compile("def f(x) y");
    assert_eq!(compiler.state, Some(FunctionState::Discarded));
    assert_eq!(sink.names(), vec!["VariableNotDeclared"]);
    assert!(compiler.emitter.function("f").is_none());
}

#[test]
fn test_redefinition_keeps_first_body() {
    let (compiler, sink) = compile("def f(x) x def f(x) x + 1");
    assert_eq!(sink.names(), vec!["FunctionAlreadyDeclared"]);

    assert_eq!(Interpreter::new(&compiler.emitter).call("f", &[2.0]), Ok(2.0));
}

#[test]
fn test_extern_then_definition() {
    let (compiler, sink) = compile("extern f(x) def f(x) x * 3");
    assert!(sink.is_empty());

    assert_eq!(Interpreter::new(&compiler.emitter).call("f", &[2.0]), Ok(6.0));
}

#[test]
fn test_redeclaration_arity_mismatch() {
    let (_, sink) = compile("extern g(a) def g(a b) a");
    assert_eq!(sink.names(), vec!["ArityMismatch"]);

    let (_, sink) = compile("def g(a) a extern g(a)");
    assert_eq!(sink.names(), vec!["FunctionAlreadyDeclared"]);
}

#[test]
fn test_failed_definition_keeps_extern() {
    let (compiler, sink) = compile("extern f(x) def f(x) y");
    assert_eq!(sink.names(), vec!["VariableNotDeclared"]);

    let function = compiler.emitter.function("f").unwrap();
    assert!(!function.has_body());
    assert_eq!(function.params, vec!["x"]);
}

#[test]
fn test_failed_definition_keeps_callers_of_extern() {
    let mut compiler = Compiler::new(IrModule::new(), OperatorRegistry::shared());
    let mut sink = CollectingSink::new();

    drive(&mut compiler, "extern foo(x) def bar(y) foo(y)", None, &mut sink);
    let (declared, _) = compiler.emitter.lookup_function("foo").unwrap();

    drive(&mut compiler, "def foo(x) zz", None, &mut sink);
    assert_eq!(sink.names(), vec!["VariableNotDeclared"]);
    assert_eq!(compiler.state, Some(FunctionState::Discarded));

    let foo = compiler.emitter.function("foo").unwrap();
    assert!(!foo.has_body());
    assert!(foo.slots.is_empty());
    assert_eq!(compiler.emitter.lookup_function("foo"), Some((declared, 1)));

    drive(&mut compiler, "def foo(x) x * 2", None, &mut sink);
    assert_eq!(sink.errors.len(), 1);
    assert_eq!(compiler.emitter.lookup_function("foo"), Some((declared, 1)));

    let result = Interpreter::new(&compiler.emitter).call("bar", &[3.0]);
    assert_eq!(result, Ok(6.0));
}

#[test]
fn test_codegen_errors() {
    let (_, sink) = compile("def f(x) g(x)");
    assert_eq!(sink.names(), vec!["FunctionNotDeclared"]);

    let (_, sink) = compile("def g(a b) a def f(x) g(x)");
    assert_eq!(sink.names(), vec!["UnexpectedArguments"]);

    let (_, sink) = compile("def f(x) (x + 1) = 2");
    assert_eq!(sink.names(), vec!["InvalidAssignmentTarget"]);

    let (_, sink) = compile("def f(x) y = 2");
    assert_eq!(sink.names(), vec!["VariableNotDeclared"]);

    let (_, sink) = compile("def f(x) !x");
    assert_eq!(sink.names(), vec!["UnknownUnaryOperator"]);
}

#[test]
fn test_operator_installed_on_success() {
    let (compiler, sink) = compile("def binary| 5 (a b) a");
    assert!(sink.is_empty());

    assert_eq!(compiler.operators.borrow().precedence('|'), Some(5));
}

#[test]
fn test_operator_rolled_back_on_failure() {
    let (compiler, sink) = compile("def binary& 6 (a b) zz");
    assert_eq!(sink.names(), vec!["VariableNotDeclared"]);
    assert_eq!(compiler.operators.borrow().precedence('&'), None);

    let (compiler, _) = compile("def binary+ 50 (a b) zz");
    assert_eq!(compiler.operators.borrow().precedence('+'), Some(20));
}

#[test]
fn test_operator_visible_to_later_definitions() {
    let source = "def binary: 1 (x y) y
                  def f(n) if n < 1 then 0 else (n : f(n - 1)) + 1";
    assert_eq!(run(source, "f", &[4.0]), Ok(4.0));
}

#[test]
#[should_panic(expected = "has no function binary|")]
fn test_binary_operator_without_function_panics() {
    let (mut compiler, _) = open_function();
    let operators = compiler.operators.clone();
    operators.borrow_mut().install(OperatorEntry::binary('|', 5));

    let mut parser = Parser::from_source("a | a", None, operators);
    let expr = parse_expr(&mut parser).unwrap();
    let _ = gen_expression(&mut compiler, &expr);
}

#[test]
fn test_interpreter_errors() {
    let (compiler, _) = compile("extern sin(x) def f(x) sin(x) def g(x) g(x)");

    assert_eq!(
        Interpreter::new(&compiler.emitter).call("f", &[1.0]),
        Err(RuntimeError::MissingBody {
            function: "sin".to_string()
        })
    );
    assert_eq!(
        Interpreter::new(&compiler.emitter).with_max_depth(20).call("g", &[1.0]),
        Err(RuntimeError::DepthExceeded { limit: 20 })
    );
    assert_eq!(
        Interpreter::new(&compiler.emitter).call("h", &[]),
        Err(RuntimeError::UnknownFunction {
            function: "h".to_string()
        })
    );
}

#[test]
fn test_ir_text() {
    let (compiler, _) = compile("extern sin(x) def f(x) if x < 1 then sin(x) else 2");
    let text = compiler.emitter.to_string();

    assert!(text.contains("declare double @sin(double %x)"));
    assert!(text.contains("define double @f(double %x) {"));
    assert!(text.contains("fcmp ult"));
    assert!(text.contains("fcmp one"));
    assert!(text.contains("call @sin("));
    assert!(text.contains("ifcont:"));
    assert!(text.contains(", %then], [%"));
    assert!(text.contains(", %else]"));
    assert!(!text.contains("#1]"));
}

#[test]
fn test_comparison_semantics() {
    assert_eq!(BinaryOpcode::LessThan.apply(f64::NAN, 1.0), 1.0);
    assert_eq!(BinaryOpcode::NotEqual.apply(f64::NAN, 0.0), 0.0);
    assert_eq!(BinaryOpcode::NotEqual.apply(2.0, 0.0), 1.0);
    assert_eq!(BinaryOpcode::from_symbol('^'), None);
}
