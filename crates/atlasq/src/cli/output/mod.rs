//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use atlasq_schema::ResolvedField;
use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;

/// One scored candidate for one path segment.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRow {
    /// The path segment being matched.
    pub segment: String,
    /// Schema name of the candidate node.
    pub node: String,
    /// Dotted path from the search start to the candidate.
    pub path: String,
    /// Name similarity.
    pub similarity: f64,
    /// Distance from the search start.
    pub depth: usize,
    /// Ranking weight.
    pub weight: f64,
}

/// JSON output for one resolved path.
#[derive(Serialize)]
pub struct JsonResolution<'a> {
    /// The resolver result.
    #[serde(flatten)]
    pub field: &'a ResolvedField,
    /// Type of the deepest leaf under the resolved node.
    pub terminal_type: &'a str,
    /// Scored candidates, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<&'a [CandidateRow]>,
}

/// Prints a JSON value, pretty unless `compact` is set.
pub fn print_json<T: Serialize>(value: &T, compact: bool) -> ExitCode {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(json_str) => {
            println!("{json_str}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the summary table for resolved paths.
pub fn resolution_table(fields: &[ResolvedField]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        "Requested",
        "Canonical",
        "Type",
        "Exists",
        "List parent",
        "Similarity",
        "Tier",
        "Terminal",
    ]);
    for field in fields {
        let type_tag = if field.node.list {
            format!("{}[]", field.node.type_tag)
        } else {
            field.node.type_tag.clone()
        };
        table.add_row(vec![
            Cell::new(&field.requested),
            Cell::new(&field.canonical_path),
            Cell::new(type_tag),
            Cell::new(yes_no(field.exists())),
            Cell::new(yes_no(field.parent_is_list)),
            Cell::new(format!("{:.2}", field.similarity)),
            Cell::new(field.tier.to_string()),
            Cell::new(&field.terminal().type_tag),
        ]);
    }
    table
}

/// Builds the candidate listing table.
pub fn candidates_table(rows: &[CandidateRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Segment", "Node", "Path", "Similarity", "Depth", "Weight"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.segment),
            Cell::new(&row.node),
            Cell::new(&row.path),
            Cell::new(format!("{:.2}", row.similarity)),
            Cell::new(row.depth.to_string()),
            Cell::new(format!("{:.3}", row.weight)),
        ]);
    }
    table
}

/// Renders a flag as `yes` / `no`.
fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
