//! Main compiler module.
//!
//! This module contains the Compiler structure, which lowers prototypes,
//! function definitions and top-level expressions through a
//! [`TargetEmitter`]. It owns the scope of the function being compiled and
//! shares the operator registry with the parser.

use std::fmt::Display;

use tracing::debug;

use crate::{
    ast::{
        ast::TopLevel,
        statements::{FunctionDef, Prototype, PrototypeKind},
    },
    errors::errors::Error,
    parser::lookups::{OperatorEntry, OperatorInstall, SharedOperators},
};

use super::{emitter::TargetEmitter, expr::gen_expression, scope::Scope};

/// Where the compilation of one function stands.
///
/// `Finalized` and `Discarded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionState {
    Declared,
    EntryBlockOpen,
    Finalized,
    Discarded,
}

impl Display for FunctionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main compiler structure that holds the state of the compilation process.
///
/// # Type Parameters
///
/// * `E` - The backend that receives the emitted functions
pub struct Compiler<E: TargetEmitter> {
    /// The backend being emitted into
    pub emitter: E,
    /// Operator precedences, shared with the parser
    pub operators: SharedOperators,
    /// Bindings of the function being compiled
    pub scope: Scope<E::Slot>,
    /// State of the most recent function compilation
    pub state: Option<FunctionState>,
}

impl<E: TargetEmitter> Compiler<E> {
    /// Creates a new Compiler instance.
    ///
    /// # Arguments
    ///
    /// * `emitter` - The backend to emit into
    /// * `operators` - The operator registry shared with the parser
    ///
    /// # Returns
    ///
    /// A new Compiler instance ready to generate code.
    pub fn new(emitter: E, operators: SharedOperators) -> Self {
        Compiler {
            emitter,
            operators,
            scope: Scope::new(),
            state: None,
        }
    }

    /// Compiles one item from the parser.
    pub fn compile_top_level(&mut self, item: &TopLevel) -> Result<E::Function, Error> {
        match item {
            TopLevel::Definition(function) | TopLevel::Expression(function) => {
                self.compile_function(function)
            }
            TopLevel::Extern(prototype) => self.compile_prototype(prototype),
        }
    }

    /// Declares the function described by `prototype`.
    pub fn compile_prototype(&mut self, prototype: &Prototype) -> Result<E::Function, Error> {
        self.emitter
            .declare_function(&prototype.name, &prototype.params)
            .map_err(|err| Error::new(err, prototype.span.start.clone()))
    }

    /// Compiles a function definition.
    ///
    /// An operator the function defines is installed before its body is
    /// compiled, so the body may use it. If the body fails, the installation
    /// is undone and the function is discarded, or only its body when it was
    /// declared before this definition.
    ///
    /// # Arguments
    ///
    /// * `function` - The definition to compile
    ///
    /// # Returns
    ///
    /// The finalized function handle, or the first error in its body.
    pub fn compile_function(&mut self, function: &FunctionDef) -> Result<E::Function, Error> {
        let prototype = &function.prototype;
        let was_declared = self.emitter.lookup_function(&prototype.name).is_some();

        let handle = self.compile_prototype(prototype)?;
        self.transition(&prototype.name, FunctionState::Declared);

        let install = match prototype.kind {
            PrototypeKind::Function => None,
            PrototypeKind::Unary(symbol) => Some(OperatorInstall::new(
                &self.operators,
                OperatorEntry::unary(symbol),
            )),
            PrototypeKind::Binary(symbol, precedence) => Some(OperatorInstall::new(
                &self.operators,
                OperatorEntry::binary(symbol, precedence),
            )),
        };

        self.emitter.begin_function_body(handle);
        self.transition(&prototype.name, FunctionState::EntryBlockOpen);

        self.scope = Scope::new();
        for (index, param) in prototype.params.iter().enumerate() {
            let slot = self.emitter.allocate_slot(param);
            let value = self.emitter.argument(handle, index);
            self.emitter.store(slot, value);
            self.scope.bind(param, slot);
        }

        let body = gen_expression(self, &function.body);
        self.scope = Scope::new();

        match body {
            Ok(value) => {
                self.emitter.finalize_function(handle, value);
                if let Some(install) = install {
                    install.commit();
                }
                self.transition(&prototype.name, FunctionState::Finalized);
                Ok(handle)
            }
            Err(err) => {
                // Earlier functions may already call a declared extern.
                if was_declared {
                    self.emitter.discard_body(handle);
                } else {
                    self.emitter.discard_function(handle);
                }
                drop(install);

                self.transition(&prototype.name, FunctionState::Discarded);
                Err(err)
            }
        }
    }

    /// Runs `f` with a fresh innermost scope frame, popping the frame
    /// whether or not `f` succeeds.
    pub fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scope.push_frame();
        let result = f(self);
        self.scope.pop_frame();
        result
    }

    fn transition(&mut self, function: &str, state: FunctionState) {
        debug!(function, state = %state, "function state");
        self.state = Some(state);
    }
}
