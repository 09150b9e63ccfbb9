//! Expression compiler.
//!
//! Lowers a logical tree into nested `compound` documents. Leaves are resolved
//! against the schema to find out whether they sit inside a repeated sub-document;
//! AND groups then gather sibling leaves that share an embedding parent into a
//! single `embeddedDocument` wrapper.

use atlasq_config::{Config, EmbeddingSettings};
use atlasq_query::{Connective, LogicalNode, Operand, Token, build_tree, stringify};
use atlasq_schema::{Resolver, SchemaNode, Thresholds};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
    embed::EmbeddingRules,
    error::CompileError,
    lower::{ClauseLowering, DefaultLowering, LeafContext},
};

/// Rewrites an operand before it is lowered.
pub type Preprocessor<'s> = Box<dyn Fn(&Operand) -> Operand + 's>;

/// A compiled leaf and the embedding parent it belongs under, if any.
struct CompiledLeaf {
    /// The leaf clause, not yet wrapped.
    clause: Value,
    /// Embedding parent path.
    embedded_in: Option<String>,
}

/// Compiles token streams against one schema tree.
///
/// The schema is only read. A compiler can be reused for any number of streams,
/// and each call keeps its scratch state on its own stack.
pub struct Compiler<'s> {
    /// Schema the fields are resolved against.
    schema: &'s SchemaNode,
    /// Field path resolver.
    resolver: Resolver,
    /// Embedded-document classification.
    rules: EmbeddingRules,
    /// Leaf clause lowering.
    lowering: Box<dyn ClauseLowering + 's>,
    /// Optional operand rewrite applied before lowering.
    preprocessor: Option<Preprocessor<'s>>,
}

impl<'s> Compiler<'s> {
    /// Creates a compiler with default thresholds, prefixes and lowering.
    pub fn new(schema: &'s SchemaNode) -> Self {
        Self {
            schema,
            resolver: Resolver::default(),
            rules: EmbeddingRules::from(&EmbeddingSettings::default()),
            lowering: Box::new(DefaultLowering),
            preprocessor: None,
        }
    }

    /// Creates a compiler using the thresholds and prefixes from `config`.
    pub fn from_config(schema: &'s SchemaNode, config: &Config) -> Self {
        let thresholds = Thresholds {
            candidate: config.resolver.candidate_threshold,
            strong: config.resolver.strong_threshold,
            moderate: config.resolver.moderate_threshold,
        };
        Self {
            resolver: Resolver::new(thresholds),
            rules: EmbeddingRules::from(&config.embedding),
            ..Self::new(schema)
        }
    }

    /// Replaces the embedding rules.
    pub fn with_rules(mut self, rules: EmbeddingRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replaces the leaf clause lowering.
    pub fn with_lowering(mut self, lowering: impl ClauseLowering + 's) -> Self {
        self.lowering = Box::new(lowering);
        self
    }

    /// Installs an operand rewrite that runs before every leaf is lowered.
    pub fn with_preprocessor(mut self, preprocessor: impl Fn(&Operand) -> Operand + 's) -> Self {
        self.preprocessor = Some(Box::new(preprocessor));
        self
    }

    /// Compiles an infix token stream into a compound document.
    pub fn compile(&self, tokens: &[Token]) -> Result<Value, CompileError> {
        debug!(tokens = %stringify(tokens), "compiling");
        let tree = build_tree(tokens)?;
        Ok(self.compile_node(&tree)?.unwrap_or(Value::Null))
    }

    /// Compiles one node. Returns `None` when it compiles to nothing.
    fn compile_node(&self, node: &LogicalNode<'_>) -> Result<Option<Value>, CompileError> {
        let document = match node {
            LogicalNode::Leaf(operand) => {
                let leaf = self.compile_leaf(operand)?;
                match leaf.embedded_in {
                    Some(_) if is_blank(&leaf.clause) => return Ok(None),
                    Some(path) => embedded_document(&path, leaf.clause),
                    None => leaf.clause,
                }
            }
            LogicalNode::Group { operator, children } => {
                self.compile_group(operator.connective, children)?
            }
        };
        Ok((!is_blank(&document)).then_some(document))
    }

    /// Compiles a group into a compound keyed by its connective.
    fn compile_group(
        &self,
        connective: Connective,
        children: &[LogicalNode<'_>],
    ) -> Result<Value, CompileError> {
        let clauses = match connective {
            Connective::And => self.compile_and(children)?,
            Connective::Or => self.compile_or(children)?,
        };
        Ok(compound(connective, clauses))
    }

    /// Compiles AND children, grouping embedded leaves by their parent path.
    ///
    /// Flat leaves and sub-groups come first in source order, followed by one
    /// wrapper per embedding parent in order of first appearance.
    fn compile_and(&self, children: &[LogicalNode<'_>]) -> Result<Vec<Value>, CompileError> {
        let mut clauses = Vec::new();
        let mut embedded: Vec<(String, Vec<Value>)> = Vec::new();

        for child in children {
            let LogicalNode::Leaf(operand) = child else {
                clauses.extend(self.compile_node(child)?);
                continue;
            };

            let leaf = self.compile_leaf(operand)?;
            if is_blank(&leaf.clause) {
                continue;
            }
            match leaf.embedded_in {
                Some(path) => match embedded.iter_mut().find(|(p, _)| *p == path) {
                    Some((_, siblings)) => siblings.push(leaf.clause),
                    None => embedded.push((path, vec![leaf.clause])),
                },
                None => clauses.push(leaf.clause),
            }
        }

        for (path, siblings) in embedded {
            clauses.push(embedded_document(
                &path,
                compound(Connective::And, siblings),
            ));
        }
        Ok(clauses)
    }

    /// Compiles OR children independently.
    fn compile_or(&self, children: &[LogicalNode<'_>]) -> Result<Vec<Value>, CompileError> {
        let mut clauses = Vec::new();
        for child in children {
            clauses.extend(self.compile_node(child)?);
        }
        Ok(clauses)
    }

    /// Resolves, classifies and lowers one leaf.
    fn compile_leaf(&self, operand: &Operand) -> Result<CompiledLeaf, CompileError> {
        let prepared;
        let operand = match &self.preprocessor {
            Some(preprocess) => {
                prepared = preprocess(operand);
                &prepared
            }
            None => operand,
        };

        let resolved = self.resolver.resolve(self.schema, &operand.field);
        let ctx = LeafContext::from_resolved(&resolved);
        let clause = self.lower_leaf(operand, &ctx)?;
        let embedded_in = self.rules.classify(&operand.field, &resolved);
        if let Some(path) = &embedded_in {
            debug!(field = %operand.field, parent = %path, "embedded leaf");
        }

        Ok(CompiledLeaf {
            clause,
            embedded_in,
        })
    }

    /// Lowers a leaf, applying negation and the include-blanks wrapper.
    fn lower_leaf(&self, operand: &Operand, ctx: &LeafContext<'_>) -> Result<Value, CompileError> {
        let field = operand.field.as_str();
        if operand.include_blanks {
            let clause = self.lowering.lower(operand, ctx)?.into_document();
            return Ok(json!({
                "compound": { "should": [clause, self.lowering.is_null(field, ctx)] }
            }));
        }
        if operand.comparison.is_none() {
            return Ok(self.lowering.not_null(field, ctx));
        }
        Ok(self.lowering.lower(operand, ctx)?.into_document())
    }
}

/// Compiles `tokens` against `schema` with default settings.
pub fn compile(tokens: &[Token], schema: &SchemaNode) -> Result<Value, CompileError> {
    Compiler::new(schema).compile(tokens)
}

/// `{compound: {<keyword>: clauses}}`.
fn compound(connective: Connective, clauses: Vec<Value>) -> Value {
    let mut body = Map::new();
    body.insert(connective.keyword().into(), Value::Array(clauses));
    json!({ "compound": body })
}

/// `{embeddedDocument: {path, operator}}`.
fn embedded_document(path: &str, operator: Value) -> Value {
    json!({ "embeddedDocument": { "path": path, "operator": operator } })
}

/// Null and `{}` are dropped from clause lists.
fn is_blank(document: &Value) -> bool {
    match document {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
