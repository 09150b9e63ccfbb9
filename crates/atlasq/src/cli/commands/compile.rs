//! Implementation of `atlasq compile`.

use std::{fs, path::Path, process::ExitCode};

use atlasq_compile::{CompileError, Compiler, SearchStage, SortOrder};
use atlasq_query::Token;
use serde_json::Value;

use crate::cli::{args::CompileCommand, context::CommandContext, output::print_json};

/// Compiles a token file against a schema file and prints the document.
pub fn run(ctx: &CommandContext, cmd: &CompileCommand) -> ExitCode {
    let schema = match ctx.read_schema(&cmd.schema) {
        Ok(schema) => schema,
        Err(code) => return code,
    };
    let tokens = match read_tokens(&ctx.cwd.join(&cmd.tokens)) {
        Ok(tokens) => tokens,
        Err(code) => return code,
    };

    let compiler = Compiler::from_config(&schema, &ctx.config);
    let document = compiler.compile(&tokens).and_then(|criteria| {
        if cmd.envelope {
            build_stage(ctx, cmd, criteria)
        } else {
            Ok(criteria)
        }
    });

    match document {
        Ok(document) => print_json(&document, cmd.compact),
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Reads and decodes a JSON token stream.
fn read_tokens(path: &Path) -> Result<Vec<Token>, ExitCode> {
    let content = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: failed to read tokens {}: {e}", path.display());
        ExitCode::FAILURE
    })?;
    serde_json::from_str(&content).map_err(|e| {
        eprintln!("error: failed to parse tokens {}: {e}", path.display());
        ExitCode::FAILURE
    })
}

/// Wraps compiled criteria in a `$search` stage.
fn build_stage(
    ctx: &CommandContext,
    cmd: &CompileCommand,
    criteria: Value,
) -> Result<Value, CompileError> {
    let index = cmd.index.as_deref().unwrap_or(&ctx.config.search.index);
    let mut stage = SearchStage::new(index).with_criteria(criteria);
    if cmd.count {
        stage = stage.add_total_count()?;
    }
    if !cmd.sort.is_empty() {
        let order = if cmd.desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        stage = stage.add_sort(order, &cmd.sort)?;
    }
    stage.build()
}

/// Prints a compile error with its hint, if any.
fn report(error: &CompileError) {
    eprintln!("error: {error}");
    if let Some(hint) = error.suggestion() {
        eprintln!("hint: {hint}");
    }
}
