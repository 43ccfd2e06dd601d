//! Lua 5.x-family lexer, parser, and formatter.
//!
//! Turns source text into a typed, fully spanned syntax tree, or into one
//! positioned syntax error worded the way the stock Lua compiler
//! words it. The tree can be walked with a [`Visitor`] and printed back
//! to source with [`format`].
//!
//! # Quick start
//!
//! ## Parse a chunk
//!
//! ```
//! use luaparse_rs::{parse, ast::Statement};
//!
//! let block = parse("local x = 1\nreturn x + 2").unwrap();
//! assert_eq!(block.statements.len(), 2);
//! assert!(matches!(block.statements[1], Statement::Return { .. }));
//! ```
//!
//! ## Report an error
//!
//! ```
//! use luaparse_rs::parse_named;
//!
//! let err = parse_named("if x then", "init.lua").unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "init.lua: 'end' expected near '<eof>' (line 1, column 10)"
//! );
//! ```
//!
//! ## Re-format source
//!
//! ```
//! use luaparse_rs::{format, parse};
//!
//! let block = parse("for i=1,3 do print(i*2) end").unwrap();
//! assert_eq!(format(&block), "for i = 1, 3 do\n  print(i * 2)\nend\n");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod cursor;
pub mod diagnostic;
pub mod formatter;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod token;
pub mod visit;

pub use ast::Block;
pub use diagnostic::{Diagnostic, DiagnosticSink, Severity, SyntaxError, SyntaxErrorKind};
pub use formatter::format;
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use options::ParseOptions;
pub use parser::Parser;
pub use token::{Position, Span, Symbol, Token};
pub use visit::Visitor;

use std::thread;

/// Stack reserved per nesting level. Unoptimized builds spend several
/// large frames on each level.
const STACK_PER_LEVEL: usize = 256 * 1024;

/// Stack reserved on top of the per-level budget.
const BASE_STACK: usize = 1024 * 1024;

/// Parse a source unit under the default chunk name `<unknown>`.
pub fn parse(source: &str) -> Result<Block, SyntaxError> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse a source unit, naming it `chunk_name` in error messages.
pub fn parse_named(source: &str, chunk_name: &str) -> Result<Block, SyntaxError> {
    parse_with_options(source, &ParseOptions::new().chunk_name(chunk_name))
}

/// Parse a source unit with explicit settings.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<Block, SyntaxError> {
    log::debug!(
        "parsing chunk {} ({} bytes)",
        options.chunk_name,
        source.len()
    );
    let result = parse_on_sized_stack(source, options);
    match &result {
        Ok(block) => log::debug!(
            "parsed chunk {}: {} statements",
            options.chunk_name,
            block.statements.len()
        ),
        Err(err) => log::debug!("parse failed [{}]: {err}", err.code()),
    }
    result
}

/// Like [`parse_with_options`], also delivering the error to `sink`.
pub fn parse_reporting(
    source: &str,
    options: &ParseOptions,
    sink: &mut impl DiagnosticSink,
) -> Result<Block, SyntaxError> {
    parse_with_options(source, options).inspect_err(|err| sink.report(err.to_diagnostic()))
}

fn parse_chunk(source: &str, options: &ParseOptions) -> Result<Block, SyntaxError> {
    Parser::new(source, options).and_then(Parser::parse_chunk)
}

/// Run the parser on a scoped thread whose stack holds `max_depth` levels,
/// so deep input ends in `TooManySyntaxLevels` whatever the caller's stack.
fn parse_on_sized_stack(source: &str, options: &ParseOptions) -> Result<Block, SyntaxError> {
    let stack_size = options
        .max_depth
        .saturating_mul(STACK_PER_LEVEL)
        .saturating_add(BASE_STACK);

    thread::scope(|scope| {
        let spawned = thread::Builder::new()
            .name("luaparse".to_string())
            .stack_size(stack_size)
            .spawn_scoped(scope, || parse_chunk(source, options));
        match spawned {
            Ok(handle) => match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            },
            Err(err) => {
                log::warn!("no parser thread ({err}), parsing on the calling thread");
                parse_chunk(source, options)
            }
        }
    })
}
