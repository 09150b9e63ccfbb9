//! Clap argument definitions for the `atlasq` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "atlasq")]
#[command(about = "Compile search expressions into Atlas Search documents")]
pub struct Cli {
    /// Log more (-v for debug, -vv for trace); RUST_LOG overrides
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for `atlasq compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileCommand {
    /// Schema tree JSON file
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Token stream JSON file
    #[arg(short, long)]
    pub tokens: PathBuf,

    /// Emit a complete $search stage instead of bare criteria
    #[arg(long)]
    pub envelope: bool,

    /// Search index name [default: search.index from configuration]
    #[arg(long, requires = "envelope")]
    pub index: Option<String>,

    /// Request a total hit count in the $search stage
    #[arg(long, requires = "envelope")]
    pub count: bool,

    /// Sort by this field (can be specified multiple times)
    #[arg(long = "sort", requires = "envelope")]
    pub sort: Vec<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for `atlasq resolve`.
#[derive(Args, Debug, Clone)]
pub struct ResolveCommand {
    /// Schema tree JSON file
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Dotted field paths to resolve
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Also list every scored candidate for each segment
    #[arg(long)]
    pub candidates: bool,
}

/// Arguments for `atlasq init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.atlasq.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `atlasq` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Compile a token stream against a schema
    #[command(after_help = "\
TOKEN FILE FORMAT:
  A JSON array of tokens, in infix order:
    {\"operand\": {\"field\": \"price\", \"op\": \"<\", \"value\": 1200}}
    {\"operator\": {\"connective\": \"and\"}}
    {\"operator\": {\"connective\": \"or\", \"separate\": true}}
    \"open\"
    \"close\"

EXAMPLES:
  atlasq compile -s product.json -t query.json
  atlasq compile -s product.json -t query.json --envelope --count
  atlasq compile -s product.json -t query.json --envelope --sort price --desc")]
    Compile(CompileCommand),

    /// Show how field paths resolve against a schema
    Resolve(ResolveCommand),

    /// Show effective configuration settings
    Config,

    /// Initialize atlasq configuration in current directory
    Init(InitCommand),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbose_counts_and_is_global() {
        let cli = Cli::try_parse_from(["atlasq", "config", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Config));
    }

    #[test]
    fn compile_collects_sort_fields() {
        let cli = Cli::try_parse_from([
            "atlasq", "compile", "-s", "s.json", "-t", "t.json", "--envelope", "--sort", "price",
            "--sort", "rating", "--desc",
        ])
        .unwrap();
        let Commands::Compile(cmd) = cli.command else {
            panic!("expected compile");
        };
        assert_eq!(cmd.sort, ["price", "rating"]);
        assert!(cmd.desc);
        assert!(cmd.index.is_none());
    }

    #[test]
    fn envelope_options_need_envelope() {
        let result =
            Cli::try_parse_from(["atlasq", "compile", "-s", "s.json", "-t", "t.json", "--count"]);
        assert!(result.is_err());
    }
}
