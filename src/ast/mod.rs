/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The expression sum type and top-level items
/// - expressions: One struct per expression node kind
/// - statements: Prototypes and function definitions
/// - dump: Textual forms used by tests and `--dump-ast`
/// - eval: Reference tree-walking evaluator
pub mod ast;
pub mod dump;
pub mod eval;
pub mod expressions;
pub mod statements;
