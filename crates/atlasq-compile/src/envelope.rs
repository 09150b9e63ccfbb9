//! `$search` and `$searchMeta` aggregation stages.
//!
//! Small builders that place compiled criteria inside the stage documents an
//! aggregation pipeline expects.

use serde_json::{Map, Value, json};

use crate::error::CompileError;

/// Number of buckets requested for each string facet.
const FACET_BUCKETS: u32 = 1000;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortOrder {
    /// The `1` / `-1` used in sort documents.
    pub fn direction(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Builds a `$search` stage.
#[derive(Debug, Clone)]
pub struct SearchStage {
    /// Search index name.
    index: String,
    /// Stage body; `None` until criteria are attached.
    body: Option<Map<String, Value>>,
}

impl SearchStage {
    /// Starts a stage against `index`.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            body: None,
        }
    }

    /// Attaches compiled criteria. Keys of an object document are lifted into the stage.
    pub fn with_criteria(mut self, criteria: Value) -> Self {
        let mut body = lift(criteria);
        body.insert("index".into(), json!(self.index));
        self.body = Some(body);
        self
    }

    /// Requests a total hit count.
    pub fn add_total_count(mut self) -> Result<Self, CompileError> {
        self.body_mut("count")?
            .insert("count".into(), json!({ "type": "total" }));
        Ok(self)
    }

    /// Sorts by `fields`, all in the same direction.
    pub fn add_sort<S: AsRef<str>>(
        mut self,
        order: SortOrder,
        fields: &[S],
    ) -> Result<Self, CompileError> {
        let body = self.body_mut("sort")?;
        if fields.is_empty() {
            return Err(CompileError::invalid_argument("sort needs at least one field"));
        }
        let mut sort = Map::new();
        for field in fields {
            sort.insert(
                field.as_ref().to_string(),
                json!({ "order": order.direction() }),
            );
        }
        body.insert("sort".into(), Value::Object(sort));
        Ok(self)
    }

    /// Returns `{$search: body}`.
    pub fn build(self) -> Result<Value, CompileError> {
        let body = self.body.ok_or_else(|| missing_criteria("build"))?;
        Ok(json!({ "$search": body }))
    }

    /// The stage body, or an error naming the step that needed it.
    fn body_mut(&mut self, step: &str) -> Result<&mut Map<String, Value>, CompileError> {
        self.body.as_mut().ok_or_else(|| missing_criteria(step))
    }
}

/// Builds a `$searchMeta` stage.
#[derive(Debug, Clone)]
pub struct SearchMetaStage {
    /// Search index name.
    index: String,
    /// Stage body; `None` until criteria are attached.
    body: Option<Map<String, Value>>,
    /// Criteria were attached as a facet operator.
    faceted: bool,
}

impl SearchMetaStage {
    /// Starts a stage against `index`.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            body: None,
            faceted: false,
        }
    }

    /// Attaches compiled criteria at the top of the stage.
    pub fn with_criteria(mut self, criteria: Value) -> Self {
        let mut body = lift(criteria);
        body.insert("index".into(), json!(self.index));
        self.body = Some(body);
        self.faceted = false;
        self
    }

    /// Attaches compiled criteria as the operator of a facet collector.
    pub fn with_facet_criteria(mut self, criteria: Value) -> Self {
        let mut body = Map::new();
        body.insert("index".into(), json!(self.index));
        body.insert("facet".into(), json!({ "operator": criteria }));
        self.body = Some(body);
        self.faceted = true;
        self
    }

    /// Requests a total count.
    pub fn count(mut self) -> Result<Self, CompileError> {
        self.body_mut("count")?
            .insert("count".into(), json!({ "type": "total" }));
        Ok(self)
    }

    /// Adds one string facet per field.
    pub fn add_facets<S: AsRef<str>>(mut self, fields: &[S]) -> Result<Self, CompileError> {
        if !self.faceted {
            return Err(CompileError::configuration(
                "facets need facet criteria; call with_facet_criteria first",
            ));
        }
        if fields.is_empty() || fields.iter().any(|f| f.as_ref().trim().is_empty()) {
            return Err(CompileError::invalid_argument(
                "facets need at least one non-blank field name",
            ));
        }

        let body = self.body_mut("facets")?;
        let facet = body.entry("facet").or_insert_with(|| json!({}));
        let Some(facet) = facet.as_object_mut() else {
            return Err(CompileError::configuration("facet collector is not an object"));
        };
        let facets = facet.entry("facets").or_insert_with(|| json!({}));
        let Some(facets) = facets.as_object_mut() else {
            return Err(CompileError::configuration("facet list is not an object"));
        };
        for field in fields {
            let field = field.as_ref();
            facets.insert(
                field.to_string(),
                json!({ "type": "string", "path": field, "numBuckets": FACET_BUCKETS }),
            );
        }
        Ok(self)
    }

    /// Returns `{$searchMeta: body}`.
    pub fn build(self) -> Result<Value, CompileError> {
        let body = self.body.ok_or_else(|| missing_criteria("build"))?;
        Ok(json!({ "$searchMeta": body }))
    }

    /// The stage body, or an error naming the step that needed it.
    fn body_mut(&mut self, step: &str) -> Result<&mut Map<String, Value>, CompileError> {
        self.body.as_mut().ok_or_else(|| missing_criteria(step))
    }
}

/// Object documents contribute their keys; anything else contributes nothing.
fn lift(criteria: Value) -> Map<String, Value> {
    match criteria {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Error for a builder step attempted before criteria were attached.
fn missing_criteria(step: &str) -> CompileError {
    CompileError::configuration(format!("{step} requires criteria; call with_criteria first"))
}
