//! Leaf clause lowering.
//!
//! Turns one operand into one primitive search clause (`range`, `equals`, `text`,
//! `wildcard`, ...). The compiler only knows the [`ClauseLowering`] trait; the
//! table of clause shapes lives in [`DefaultLowering`].
//!
//! Null handling depends on the schema: a numeric field's default `0` and a string
//! field's default `""` count as blank, and list fields need an extra exclusion so
//! that an empty list is not mistaken for a value.

use atlasq_query::{Comparison, Operand};
use atlasq_schema::{ResolvedField, SchemaNode};
use serde_json::{Map, Value, json};

use crate::error::CompileError;

/// Schema facts about the field a leaf refers to.
///
/// Built fresh for every leaf and passed down by reference.
#[derive(Debug, Clone, Copy)]
pub struct LeafContext<'a> {
    /// The resolved schema node, or a synthetic undeclared node.
    pub node: &'a SchemaNode,
    /// The node's parent is a list.
    pub parent_is_list: bool,
}

impl<'a> LeafContext<'a> {
    /// Creates a context for `node`.
    pub fn new(node: &'a SchemaNode, parent_is_list: bool) -> Self {
        Self {
            node,
            parent_is_list,
        }
    }

    /// Creates a context from a resolver result.
    pub fn from_resolved(field: &'a ResolvedField) -> Self {
        Self::new(&field.node, field.parent_is_list)
    }

    /// Returns true if the node is declared in the schema.
    pub fn exists(&self) -> bool {
        self.node.exists
    }

    /// Broad type class of the node's type tag.
    fn type_class(&self) -> Option<TypeClass> {
        TypeClass::of(&self.node.type_tag)
    }
}

/// Broad classes of type tags that have a blank default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeClass {
    /// Integers and floating point numbers; blank is `0`.
    Numeric,
    /// Strings; blank is `""`.
    Text,
}

impl TypeClass {
    /// Classifies a type tag, ignoring case.
    fn of(type_tag: &str) -> Option<Self> {
        match type_tag.to_ascii_lowercase().as_str() {
            "int" | "integer" | "long" | "double" | "float" | "number" => Some(Self::Numeric),
            "string" => Some(Self::Text),
            _ => None,
        }
    }

    /// The value an unset field of this class holds.
    fn default_value(self) -> Value {
        match self {
            Self::Numeric => json!(0),
            Self::Text => json!(""),
        }
    }
}

/// A lowered leaf: a clause document and whether it must be negated.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// The primitive clause document.
    pub document: Value,
    /// The clause matches what should be excluded.
    pub negated: bool,
}

impl Clause {
    /// A clause used as is.
    pub fn positive(document: Value) -> Self {
        Self {
            document,
            negated: false,
        }
    }

    /// A clause that must not match.
    pub fn negated(document: Value) -> Self {
        Self {
            document,
            negated: true,
        }
    }

    /// Returns the final document, wrapped in `mustNot` when negated.
    pub fn into_document(self) -> Value {
        if self.negated {
            negate(self.document)
        } else {
            self.document
        }
    }
}

/// Wraps a clause as `{compound: {mustNot: [clause]}}`.
pub fn negate(clause: Value) -> Value {
    json!({ "compound": { "mustNot": [clause] } })
}

/// Maps one operand to one primitive clause.
pub trait ClauseLowering {
    /// Lowers an operand with a comparison.
    fn lower(&self, operand: &Operand, ctx: &LeafContext<'_>) -> Result<Clause, CompileError>;

    /// Clause matching documents where `field` is blank.
    fn is_null(&self, field: &str, ctx: &LeafContext<'_>) -> Value {
        is_null_document(field, ctx)
    }

    /// Clause matching documents where `field` holds a real value.
    fn not_null(&self, field: &str, ctx: &LeafContext<'_>) -> Value {
        not_null_document(field, ctx)
    }
}

/// The standard Atlas Search clause shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLowering;

impl ClauseLowering for DefaultLowering {
    fn lower(&self, operand: &Operand, ctx: &LeafContext<'_>) -> Result<Clause, CompileError> {
        let field = operand.field.as_str();
        let value = &operand.value;
        let Some(comparison) = operand.comparison else {
            return Ok(Clause::positive(self.not_null(field, ctx)));
        };

        let clause = match comparison {
            Comparison::LessThan => Clause::positive(range(field, "lt", value)?),
            Comparison::LessThanOrEqual => Clause::positive(range(field, "lte", value)?),
            Comparison::GreaterThan => Clause::positive(range(field, "gt", value)?),
            Comparison::GreaterThanOrEqual => Clause::positive(range(field, "gte", value)?),
            Comparison::Equal => Clause::positive(equality(field, value)),
            Comparison::NotEqual => Clause::negated(equality(field, value)),
            Comparison::Between => Clause::positive(between(field, value)?),
            Comparison::NotBetween => Clause::negated(between(field, value)?),
            Comparison::In => Clause::positive(membership(field, value)?),
            Comparison::NotIn => Clause::negated(membership(field, value)?),
            Comparison::StartsWith => Clause::positive(wildcard(field, value, Affix::Prefix)?),
            Comparison::EndsWith => Clause::positive(wildcard(field, value, Affix::Suffix)?),
            Comparison::Contains | Comparison::Regex => {
                Clause::positive(wildcard(field, value, Affix::Infix)?)
            }
            Comparison::StartsWithNot => Clause::negated(wildcard(field, value, Affix::Prefix)?),
            Comparison::EndsWithNot => Clause::negated(wildcard(field, value, Affix::Suffix)?),
            Comparison::ContainsNot => Clause::negated(wildcard(field, value, Affix::Infix)?),
            Comparison::Exists => Clause::positive(json!({ "exists": { "path": field } })),
            Comparison::IsNull => Clause::positive(self.is_null(field, ctx)),
            Comparison::NotNull => Clause::positive(self.not_null(field, ctx)),
            Comparison::Autocomplete => Clause::positive(autocomplete(operand)?),
            Comparison::Phrase => Clause::positive(phrase(operand)?),
            Comparison::Search | Comparison::RegexNot | Comparison::NotDefined => {
                return Err(CompileError::UnsupportedOperation { comparison });
            }
        };

        Ok(clause)
    }
}

/// `{range: {path, <op>: value}}`.
fn range(field: &str, op: &str, value: &Value) -> Result<Value, CompileError> {
    if value.is_null() {
        return Err(CompileError::invalid_value(
            field,
            format!("range comparison '{op}' needs a value"),
        ));
    }
    let mut body = Map::new();
    body.insert("path".into(), json!(field));
    body.insert(op.into(), value.clone());
    Ok(json!({ "range": body }))
}

/// `{range: {path, gte: low, lte: high}}` from a two-element list.
fn between(field: &str, value: &Value) -> Result<Value, CompileError> {
    match value.as_array().map(Vec::as_slice) {
        Some([low, high]) => Ok(json!({
            "range": { "path": field, "gte": low, "lte": high }
        })),
        _ => Err(CompileError::invalid_value(
            field,
            "between needs exactly two bounds",
        )),
    }
}

/// `equals` for booleans, numbers and null; `text` for everything else.
fn equality(field: &str, value: &Value) -> Value {
    match value {
        Value::Bool(_) | Value::Number(_) | Value::Null => {
            json!({ "equals": { "path": field, "value": value } })
        }
        _ => json!({ "text": { "path": field, "query": value } }),
    }
}

/// `text` over a list of strings, or `in` over numbers, booleans and object ids.
fn membership(field: &str, value: &Value) -> Result<Value, CompileError> {
    let values = match value {
        Value::Array(values) => values.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    };

    match values.first() {
        None => Err(CompileError::invalid_value(
            field,
            "membership needs at least one value",
        )),
        Some(Value::String(_)) => Ok(json!({ "text": { "path": field, "query": values } })),
        Some(Value::Number(_) | Value::Bool(_) | Value::Object(_)) => {
            Ok(json!({ "in": { "path": field, "value": values } }))
        }
        Some(other) => Err(CompileError::invalid_value(
            field,
            format!("unsupported membership value {other}"),
        )),
    }
}

/// Where a wildcard pattern places its `*`.
#[derive(Debug, Clone, Copy)]
enum Affix {
    /// `value*`
    Prefix,
    /// `*value`
    Suffix,
    /// `*value*`
    Infix,
}

impl Affix {
    /// Builds the pattern for one value.
    fn pattern(self, text: &str) -> String {
        match self {
            Self::Prefix => format!("{text}*"),
            Self::Suffix => format!("*{text}"),
            Self::Infix => format!("*{text}*"),
        }
    }
}

/// `{wildcard: {path, query, allowAnalyzedField: true}}` for a string or list of strings.
fn wildcard(field: &str, value: &Value, affix: Affix) -> Result<Value, CompileError> {
    let query = match value {
        Value::String(text) => json!(affix.pattern(text)),
        Value::Array(items) if !items.is_empty() => {
            let patterns = items
                .iter()
                .map(|item| {
                    item.as_str().map(|text| affix.pattern(text)).ok_or_else(|| {
                        CompileError::invalid_value(field, "wildcard patterns must be strings")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            json!(patterns)
        }
        _ => {
            return Err(CompileError::invalid_value(
                field,
                "wildcard needs a string or a non-empty list of strings",
            ));
        }
    };

    Ok(json!({
        "wildcard": { "path": field, "query": query, "allowAnalyzedField": true }
    }))
}

/// `{autocomplete: {query, path, ...modifiers}}`.
fn autocomplete(operand: &Operand) -> Result<Value, CompileError> {
    let query = match &operand.value {
        Value::String(text) => text.clone(),
        Value::Null => {
            return Err(CompileError::invalid_value(
                &operand.field,
                "autocomplete needs a query",
            ));
        }
        other => other.to_string(),
    };

    let modifiers = &operand.modifiers;
    let mut body = Map::new();
    body.insert("query".into(), json!(query));
    body.insert("path".into(), json!(operand.field));
    if let Some(order) = &modifiers.token_order {
        body.insert("tokenOrder".into(), json!(order));
    }
    if let Some(fuzzy) = &modifiers.fuzzy {
        body.insert("fuzzy".into(), fuzzy.clone());
    }
    if let Some(score) = &modifiers.score {
        body.insert("score".into(), score.clone());
    }
    if let Some(min) = modifiers.min_grams {
        body.insert("minGrams".into(), json!(min));
    }
    if let Some(max) = modifiers.max_grams {
        body.insert("maxGrams".into(), json!(max));
    }

    Ok(json!({ "autocomplete": body }))
}

/// `{phrase: {query, path, slop}}`.
fn phrase(operand: &Operand) -> Result<Value, CompileError> {
    let valid = match &operand.value {
        Value::String(_) => true,
        Value::Array(items) => !items.is_empty() && items.iter().all(Value::is_string),
        _ => false,
    };
    if !valid {
        return Err(CompileError::invalid_value(
            &operand.field,
            "phrase needs a string or a list of strings",
        ));
    }

    Ok(json!({
        "phrase": {
            "query": operand.value,
            "path": operand.field,
            "slop": operand.modifiers.slop.unwrap_or(0),
        }
    }))
}

/// Matches `field` when it is null, missing, or holds its type's default.
pub fn is_null_document(field: &str, ctx: &LeafContext<'_>) -> Value {
    let mut should = vec![
        json!({ "equals": { "path": field, "value": null } }),
        negate(json!({ "exists": { "path": field } })),
    ];
    if let Some(class) = ctx.type_class() {
        should.push(json!({ "equals": { "path": field, "value": class.default_value() } }));
    }
    json!({ "compound": { "should": should } })
}

/// Matches `field` when it exists and holds something other than a blank.
pub fn not_null_document(field: &str, ctx: &LeafContext<'_>) -> Value {
    let node = ctx.node;
    let class = ctx.type_class();
    let mut must_not = vec![json!({ "equals": { "path": field, "value": null } })];

    if node.list {
        let exclusion = match class {
            Some(TypeClass::Numeric) => Some(json!({ "range": { "path": field, "gt": i32::MIN } })),
            Some(TypeClass::Text) => Some(json!({
                "text": { "query": "*", "path": field, "wildcard": true }
            })),
            None => node.children.first().map(|first| {
                json!({ "exists": { "path": format!("{field}.{}", first.name) } })
            }),
        };
        must_not.extend(exclusion);
    } else if let Some(class) = class {
        must_not.push(json!({ "equals": { "path": field, "value": class.default_value() } }));
    }

    json!({
        "compound": {
            "must": [{ "exists": { "path": field } }],
            "mustNot": must_not,
        }
    })
}
