//! Implementation of `atlasq resolve`.

use std::process::ExitCode;

use atlasq_schema::{ResolvedField, Resolver, SchemaNode, Thresholds};

use crate::cli::{
    args::ResolveCommand,
    context::CommandContext,
    output::{CandidateRow, JsonResolution, candidates_table, print_json, resolution_table},
};

/// Resolves field paths against a schema and shows how each one bound.
pub fn run(ctx: &CommandContext, cmd: &ResolveCommand) -> ExitCode {
    let schema = match ctx.read_schema(&cmd.schema) {
        Ok(schema) => schema,
        Err(code) => return code,
    };

    let settings = &ctx.config.resolver;
    let resolver = Resolver::new(Thresholds {
        candidate: settings.candidate_threshold,
        strong: settings.strong_threshold,
        moderate: settings.moderate_threshold,
    });

    let fields: Vec<ResolvedField> = cmd
        .paths
        .iter()
        .map(|path| resolver.resolve(&schema, path))
        .collect();
    let candidates: Vec<Vec<CandidateRow>> = if cmd.candidates {
        cmd.paths
            .iter()
            .map(|path| candidate_rows(&resolver, &schema, path))
            .collect()
    } else {
        Vec::new()
    };

    if cmd.json {
        let output: Vec<JsonResolution<'_>> = fields
            .iter()
            .enumerate()
            .map(|(i, field)| JsonResolution {
                field,
                terminal_type: &field.terminal().type_tag,
                candidates: candidates.get(i).map(Vec::as_slice),
            })
            .collect();
        return print_json(&output, false);
    }

    println!("{}", resolution_table(&fields));
    for (field, rows) in fields.iter().zip(&candidates) {
        println!();
        println!("Candidates for {}:", field.requested);
        if rows.is_empty() {
            println!("  (none)");
        } else {
            println!("{}", candidates_table(rows));
        }
    }

    if fields.iter().any(|f| !f.exists()) {
        eprintln!("warning: some paths did not resolve and would compile as undeclared fields");
    }
    ExitCode::SUCCESS
}

/// Scores every segment of `path` against the subtree reached by the segments before it.
///
/// Stops at the first segment whose prefix does not resolve.
fn candidate_rows(resolver: &Resolver, schema: &SchemaNode, path: &str) -> Vec<CandidateRow> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut rows = Vec::new();

    for (i, segment) in segments.iter().enumerate() {
        let prefix;
        let start = if i == 0 {
            schema
        } else {
            prefix = resolver.resolve(schema, &segments[..i].join("."));
            if !prefix.exists() {
                break;
            }
            &prefix.node
        };

        rows.extend(
            resolver
                .candidates(start, segment)
                .iter()
                .map(|c| CandidateRow {
                    segment: (*segment).to_string(),
                    node: c.node.name.clone(),
                    path: c.path.join("."),
                    similarity: c.similarity,
                    depth: c.depth(),
                    weight: c.weight(),
                }),
        );
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaNode {
        SchemaNode::new("Product", "Product").with_children([
            SchemaNode::new("name", "String"),
            SchemaNode::new("reviews", "Review")
                .into_list()
                .with_child(SchemaNode::new("stars", "Integer")),
        ])
    }

    #[test]
    fn rows_cover_every_segment() {
        let schema = schema();
        let rows = candidate_rows(&Resolver::default(), &schema, "reviews.stars");
        let segments: Vec<&str> = rows.iter().map(|r| r.segment.as_str()).collect();
        assert_eq!(segments, ["reviews", "stars"]);
        assert_eq!(rows[1].path, "stars");
        assert_eq!(rows[1].depth, 1);
    }

    #[test]
    fn rows_stop_at_unresolved_prefix() {
        let schema = schema();
        let rows = candidate_rows(&Resolver::default(), &schema, "missing.stars");
        assert!(rows.is_empty());
    }
}
