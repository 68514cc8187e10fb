use std::{
    fs::read_to_string,
    io::IsTerminal,
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use clap::{ArgAction, Parser};
use kscope::{
    ast::eval::DEFAULT_MAX_DEPTH,
    compiler::{compiler::Compiler, interpreter::Interpreter, ir::IrModule},
    driver::drive,
    errors::diagnostics::{DiagnosticSink, RenderingSink, TracingSink},
    parser::lookups::OperatorRegistry,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Compiles a program to basic blocks, and optionally runs it.
#[derive(Debug, Parser)]
#[command(name = "kscope", about = "Compile and run kscope programs")]
struct Cli {
    /// Source file to compile
    #[arg(required_unless_present = "expr", conflicts_with = "expr")]
    file: Option<PathBuf>,

    /// Program text to compile instead of a file
    #[arg(short, long)]
    expr: Option<String>,

    /// Print each parsed item
    #[arg(long)]
    dump_ast: bool,

    /// Print the block-graph module
    #[arg(long)]
    emit_ir: bool,

    /// Evaluate each top-level expression and print its value
    #[arg(long)]
    run: bool,

    /// Call depth limit when running
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Write LLVM IR for the program to this path
    #[cfg(feature = "llvm")]
    #[arg(long, value_name = "PATH")]
    emit_llvm: Option<PathBuf>,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let (source, file_name) = match load_source(&cli) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("kscope: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();

    let mut compiler = Compiler::new(IrModule::new(), OperatorRegistry::shared());

    // Caret excerpts for people, structured events when piped.
    let mut rendering = RenderingSink::new(&source);
    let mut logging = TracingSink::new();
    let mut sink: &mut dyn DiagnosticSink = if std::io::stderr().is_terminal() {
        &mut rendering
    } else {
        &mut logging
    };
    let outcomes = drive(&mut compiler, &source, Some(file_name.clone()), &mut sink);

    let errors = rendering.count + logging.count;
    info!(elapsed = ?start.elapsed(), items = outcomes.len(), errors, "compiled");
    let mut failed = errors > 0;

    if cli.dump_ast {
        for outcome in &outcomes {
            print!("{}", outcome.item.dump());
        }
    }

    if cli.emit_ir {
        print!("{}", compiler.emitter);
    }

    if cli.run {
        let mut interpreter = Interpreter::new(&compiler.emitter).with_max_depth(cli.max_depth);

        for name in outcomes.iter().filter_map(|outcome| outcome.evaluable()) {
            let result = interpreter.call(name, &[]);
            print!("{}", std::mem::take(&mut interpreter.output));

            match result {
                Ok(value) => println!("Evaluated to {:.6}", value),
                Err(err) => {
                    eprintln!("Error: {} ({})", name, err);
                    failed = true;
                }
            }
        }
    }

    #[cfg(feature = "llvm")]
    if let Some(path) = &cli.emit_llvm {
        if let Err(err) = emit_llvm(&source, &file_name, path) {
            eprintln!("kscope: could not write {}: {}", path.display(), err);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn load_source(cli: &Cli) -> Result<(String, String), String> {
    if let Some(expr) = &cli.expr {
        return Ok((expr.clone(), String::from("shell")));
    }

    let Some(path) = &cli.file else {
        return Err(String::from("no input given"));
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    debug!(path = %path.display(), "reading source");
    read_to_string(path)
        .map(|source| (source, file_name))
        .map_err(|err| format!("could not read {}: {}", path.display(), err))
}

/// Lowers the program a second time, through LLVM. Errors were already
/// reported by the first pass.
#[cfg(feature = "llvm")]
fn emit_llvm(source: &str, file_name: &str, path: &std::path::Path) -> Result<(), String> {
    use inkwell::context::Context;
    use kscope::{compiler::llvm::LlvmEmitter, errors::diagnostics::CollectingSink};

    let context = Context::create();
    let mut compiler = Compiler::new(LlvmEmitter::new(&context, file_name), OperatorRegistry::shared());
    drive(&mut compiler, source, Some(file_name.to_string()), &mut CollectingSink::new());

    compiler.emitter.save_module_to_file(path)
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "kscope=warn",
        1 => "kscope=debug",
        _ => "kscope=trace",
    }
}
