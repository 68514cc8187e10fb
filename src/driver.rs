//! The top-level loop.
//!
//! Parses one item at a time and compiles it straight away, so operators
//! defined by one item are known when the next is parsed. A parse error
//! skips one token and resumes; a codegen error drops only that item.

use tracing::{debug, info_span};

use crate::{
    ast::ast::TopLevel,
    compiler::{compiler::Compiler, emitter::TargetEmitter},
    errors::diagnostics::DiagnosticSink,
    lexer::tokens::TokenKind,
    parser::{parser::Parser, stmt::parse_top_level},
};

/// One parsed item and whether it compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub item: TopLevel,
    pub compiled: bool,
}

impl Outcome {
    /// The name of the anonymous function to call, for a compiled top-level
    /// expression.
    pub fn evaluable(&self) -> Option<&str> {
        match &self.item {
            TopLevel::Expression(function) if self.compiled => Some(&function.prototype.name),
            _ => None,
        }
    }
}

/// Compiles every item of `source` into `compiler`, reporting errors to
/// `sink`. Items that fail to parse produce no outcome.
pub fn drive<E: TargetEmitter, S: DiagnosticSink>(
    compiler: &mut Compiler<E>,
    source: &str,
    file: Option<String>,
    sink: &mut S,
) -> Vec<Outcome> {
    let mut parser = Parser::from_source(source, file, compiler.operators.clone());
    let _span = info_span!("drive", file = %parser.file()).entered();

    let mut outcomes = vec![];

    loop {
        match parser.current_token_kind() {
            TokenKind::EOF => return outcomes,
            TokenKind::Punct(';') => {
                parser.advance();
                continue;
            }
            _ => {}
        }

        let item = match parse_top_level(&mut parser) {
            Ok(item) => item,
            Err(err) => {
                sink.report(&err);
                let skipped = parser.advance();
                debug!(token = %skipped.debug(), "skipped token after parse error");
                continue;
            }
        };

        let compiled = match compiler.compile_top_level(&item) {
            Ok(_) => true,
            Err(err) => {
                sink.report(&err);
                false
            }
        };

        debug!(name = item.name(), compiled, "top-level item");
        outcomes.push(Outcome { item, compiled });
    }
}
