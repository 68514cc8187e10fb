//! Diagnostic sinks.
//!
//! The parser and code generator never print; the driver hands each error
//! to a [`DiagnosticSink`] and carries on with the next top-level item.

use tracing::error;

use crate::render_error;

use super::errors::Error;

pub trait DiagnosticSink {
    /// Records one error. Must not fail and must not unwind.
    fn report(&mut self, error: &Error);
}

/// Keeps every reported error, in order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub errors: Vec<Error>,
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink { errors: vec![] }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.get_error_name()).collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, error: &Error) {
        self.errors.push(error.clone());
    }
}

/// Forwards errors to `tracing` at error level, and counts them. The CLI
/// uses this when stderr is not a terminal.
#[derive(Debug, Default)]
pub struct TracingSink {
    pub count: usize,
}

impl TracingSink {
    pub fn new() -> Self {
        TracingSink { count: 0 }
    }
}

impl DiagnosticSink for TracingSink {
    fn report(&mut self, err: &Error) {
        self.count += 1;
        let position = err.get_position();
        error!(
            file = %position.file,
            line = position.line,
            col = position.col,
            kind = err.get_error_name(),
            "{}",
            err.get_impl()
        );
    }
}

/// Prints the caret-style excerpt for each error to stderr, and counts them.
pub struct RenderingSink<'a> {
    source: &'a str,
    pub count: usize,
}

impl<'a> RenderingSink<'a> {
    pub fn new(source: &'a str) -> Self {
        RenderingSink { source, count: 0 }
    }
}

impl DiagnosticSink for RenderingSink<'_> {
    fn report(&mut self, error: &Error) {
        self.count += 1;
        eprint!("{}", render_error(error, self.source));
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn report(&mut self, error: &Error) {
        (**self).report(error)
    }
}
