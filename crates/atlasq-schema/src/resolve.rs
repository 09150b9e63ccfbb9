//! Fuzzy field path resolution.
//!
//! Callers name fields loosely: `categorie` for `categories`, `id` for `_id`,
//! or a partial path that skips intermediate records. The resolver maps such a
//! name onto one node of a schema tree.
//!
//! Each dot-separated segment is matched against every node below the current
//! position (the position itself included, at depth 0). Candidates must score
//! at least the candidate threshold, and are ranked by
//!
//! ```text
//! weight = similarity * (1.0 if the node has children else 0.5) / (1 + depth)
//! ```
//!
//! so shallow structural matches beat deep leaf coincidences. Non-final
//! segments only consider nodes with children. When any segment has no match
//! the whole path resolves to a synthetic undeclared node.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::{node::SchemaNode, similarity::similarity};

/// Similarity thresholds used when ranking candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    /// Minimum similarity for a node to be considered at all.
    pub candidate: f64,
    /// Minimum similarity of the preferred tier.
    pub strong: f64,
    /// Minimum similarity of the fallback tier.
    pub moderate: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            candidate: 0.8,
            strong: 0.7,
            moderate: 0.5,
        }
    }
}

/// How confidently a path was bound to a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    /// Every segment matched at or above the strong threshold.
    Strong,
    /// At least one segment only matched in the fallback tier.
    Moderate,
    /// Some segment had no acceptable match.
    Missing,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => f.write_str("strong"),
            Self::Moderate => f.write_str("moderate"),
            Self::Missing => f.write_str("missing"),
        }
    }
}

/// A node that scored above the candidate threshold for one segment.
#[derive(Debug, Clone)]
pub struct Candidate<'s> {
    /// The matched node.
    pub node: &'s SchemaNode,
    /// The node's parent, if it lies below the search start.
    pub parent: Option<&'s SchemaNode>,
    /// Names from the search start (excluded) down to the node (included).
    pub path: Vec<&'s str>,
    /// Similarity between the segment and the node name.
    pub similarity: f64,
}

impl Candidate<'_> {
    /// Distance from the search start; the start itself has depth 0.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Ranking weight. Prefers shallow nodes and nodes with children.
    pub fn weight(&self) -> f64 {
        let structure = if self.node.has_children() { 1.0 } else { 0.5 };
        self.similarity * structure / (1 + self.depth()) as f64
    }
}

/// The outcome of resolving one dotted path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    /// The path as requested.
    pub requested: String,
    /// Copy of the resolved node and its subtree, or a synthetic undeclared node.
    pub node: SchemaNode,
    /// Dotted schema names from the root (excluded) to the node.
    pub canonical_path: String,
    /// The node's parent in the schema tree is a list.
    pub parent_is_list: bool,
    /// Lowest similarity over all segments; 0.0 when missing.
    pub similarity: f64,
    /// Match tier.
    pub tier: MatchTier,
}

impl ResolvedField {
    /// Creates the result for a path with no acceptable match.
    fn missing(path: &str) -> Self {
        Self {
            requested: path.to_string(),
            node: SchemaNode::non_existent(path),
            canonical_path: path.to_string(),
            parent_is_list: false,
            similarity: 0.0,
            tier: MatchTier::Missing,
        }
    }

    /// Returns true if the path resolved to a declared node.
    pub fn exists(&self) -> bool {
        self.node.exists
    }

    /// Returns true if the node sits directly under a list.
    pub fn is_embedded(&self) -> bool {
        self.node.exists && self.parent_is_list
    }

    /// The deepest leaf under the resolved node, following first children.
    pub fn terminal(&self) -> &SchemaNode {
        self.node.deepest_leaf()
    }
}

/// Resolves loose field paths against schema trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    /// Ranking thresholds.
    thresholds: Thresholds,
}

impl Resolver {
    /// Creates a resolver with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// The thresholds in use.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Lists every node under `start` (inclusive) whose name scores at least the
    /// candidate threshold against `segment`, in pre-order.
    pub fn candidates<'s>(&self, start: &'s SchemaNode, segment: &str) -> Vec<Candidate<'s>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.collect(start, None, segment, &mut path, &mut out);
        out
    }

    /// Pre-order walk for [`Self::candidates`].
    fn collect<'s>(
        &self,
        node: &'s SchemaNode,
        parent: Option<&'s SchemaNode>,
        segment: &str,
        path: &mut Vec<&'s str>,
        out: &mut Vec<Candidate<'s>>,
    ) {
        let score = similarity(segment, &node.name);
        if score >= self.thresholds.candidate {
            out.push(Candidate {
                node,
                parent,
                path: path.clone(),
                similarity: score,
            });
        }
        for child in &node.children {
            path.push(&child.name);
            self.collect(child, Some(node), segment, path, out);
            path.pop();
        }
    }

    /// Picks the best candidate: the strong tier first, then the moderate tier.
    ///
    /// Within a tier the highest weight wins; on equal weight the earliest
    /// candidate in pre-order is kept.
    fn select<'c, 's>(
        &self,
        candidates: &'c [Candidate<'s>],
        structural: bool,
    ) -> Option<&'c Candidate<'s>> {
        let eligible = |c: &&Candidate<'s>| !structural || c.node.has_children();
        let strong = self.thresholds.strong;
        let moderate = self.thresholds.moderate;

        best_by_weight(
            candidates
                .iter()
                .filter(eligible)
                .filter(|c| c.similarity >= strong),
        )
        .or_else(|| {
            best_by_weight(
                candidates
                    .iter()
                    .filter(eligible)
                    .filter(|c| c.similarity >= moderate && c.similarity < strong),
            )
        })
    }

    /// Resolves a dotted path against the tree rooted at `root`.
    ///
    /// Never fails: a path that cannot be matched yields a synthetic node named
    /// after the full path, with `exists` false.
    pub fn resolve(&self, root: &SchemaNode, path: &str) -> ResolvedField {
        let segments: Vec<&str> = path.split('.').collect();
        let mut current = root;
        let mut parent: Option<&SchemaNode> = None;
        let mut canonical: Vec<&str> = Vec::new();
        let mut lowest = 1.0_f64;

        for (i, segment) in segments.iter().enumerate() {
            let structural = i + 1 < segments.len();
            let candidates = self.candidates(current, segment);
            for c in &candidates {
                trace!(
                    segment,
                    node = %c.node.name,
                    similarity = c.similarity,
                    depth = c.depth(),
                    weight = c.weight(),
                    "candidate"
                );
            }

            let Some(chosen) = self.select(&candidates, structural) else {
                debug!(path, segment, "no match, treating as undeclared field");
                return ResolvedField::missing(path);
            };

            if chosen.similarity < self.thresholds.strong {
                warn!(
                    path,
                    segment,
                    node = %chosen.node.name,
                    similarity = chosen.similarity,
                    "moderate match bound field"
                );
            }

            if chosen.parent.is_some() {
                parent = chosen.parent;
            }
            canonical.extend(chosen.path.iter().copied());
            lowest = lowest.min(chosen.similarity);
            current = chosen.node;
        }

        let tier = if lowest >= self.thresholds.strong {
            MatchTier::Strong
        } else {
            MatchTier::Moderate
        };

        ResolvedField {
            requested: path.to_string(),
            node: current.clone(),
            canonical_path: canonical.join("."),
            parent_is_list: parent.is_some_and(|p| p.list),
            similarity: lowest,
            tier,
        }
    }
}

/// Returns the candidate with the highest weight, keeping the first on ties.
fn best_by_weight<'c, 's>(
    candidates: impl Iterator<Item = &'c Candidate<'s>>,
) -> Option<&'c Candidate<'s>>
where
    's: 'c,
{
    let mut best: Option<&Candidate<'s>> = None;
    for candidate in candidates {
        if best.is_none_or(|b| candidate.weight() > b.weight()) {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> SchemaNode {
        SchemaNode::new("Product", "Product").with_children([
            SchemaNode::new("_id", "String"),
            SchemaNode::new("name", "String"),
            SchemaNode::new("categories", "String").into_list(),
            SchemaNode::new("price", "Double"),
            SchemaNode::new("rating", "Double"),
            SchemaNode::new("reviews", "Review").into_list().with_children([
                SchemaNode::new("author", "String"),
                SchemaNode::new("rating", "Integer"),
            ]),
            SchemaNode::new("supplier", "Supplier").with_children([
                SchemaNode::new("name", "String"),
                SchemaNode::new("address", "Address")
                    .with_child(SchemaNode::new("city", "String")),
            ]),
        ])
    }

    #[test]
    fn exact_name_resolves_with_full_similarity() {
        let tree = product();
        let field = Resolver::default().resolve(&tree, "price");
        assert!(field.exists());
        assert_eq!(field.node.name, "price");
        assert_eq!(field.canonical_path, "price");
        assert!((field.similarity - 1.0).abs() < f64::EPSILON);
        assert_eq!(field.tier, MatchTier::Strong);
        assert!(!field.is_embedded());
    }

    #[test]
    fn id_resolves_to_underscore_id() {
        let field = Resolver::default().resolve(&product(), "id");
        assert_eq!(field.node.name, "_id");
        assert!(field.exists());
    }

    #[test]
    fn close_spelling_resolves() {
        let field = Resolver::default().resolve(&product(), "categorie");
        assert_eq!(field.node.name, "categories");
        assert!((field.similarity - 0.9).abs() < 1e-9);
    }

    #[test]
    fn shallow_match_beats_deep_match() {
        // `rating` exists at depth 1 and under reviews at depth 2.
        let field = Resolver::default().resolve(&product(), "rating");
        assert_eq!(field.canonical_path, "rating");
        assert_eq!(field.node.type_tag, "Double");
        assert!(!field.parent_is_list);
    }

    #[test]
    fn unknown_name_is_synthetic() {
        let field = Resolver::default().resolve(&product(), "warehouse");
        assert!(!field.exists());
        assert_eq!(field.node.name, "warehouse");
        assert_eq!(field.node.type_tag, "Custom");
        assert_eq!(field.tier, MatchTier::Missing);
        assert!(!field.is_embedded());
    }

    #[test]
    fn dotted_path_descends_into_structure() {
        let field = Resolver::default().resolve(&product(), "reviews.author");
        assert_eq!(field.node.name, "author");
        assert_eq!(field.canonical_path, "reviews.author");
        assert!(field.parent_is_list);
        assert!(field.is_embedded());
    }

    #[test]
    fn dotted_path_searches_whole_subtree() {
        let field = Resolver::default().resolve(&product(), "supplier.city");
        assert_eq!(field.canonical_path, "supplier.address.city");
        assert!(!field.parent_is_list);
    }

    #[test]
    fn non_final_segment_must_have_children() {
        // `name` is a leaf, so it cannot anchor `name.city`.
        let field = Resolver::default().resolve(&product(), "name.city");
        assert!(!field.exists());
        assert_eq!(field.node.name, "name.city");
    }

    #[test]
    fn failed_intermediate_segment_returns_full_path() {
        let field = Resolver::default().resolve(&product(), "vendor.name");
        assert!(!field.exists());
        assert_eq!(field.node.name, "vendor.name");
        assert!(!field.node.list);
    }

    #[test]
    fn resolved_node_carries_subtree() {
        let field = Resolver::default().resolve(&product(), "supplier");
        assert_eq!(field.node.children.len(), 2);
        assert_eq!(field.terminal().name, "name");
    }

    #[test]
    fn terminal_follows_first_child() {
        let field = Resolver::default().resolve(&product(), "supplier.address");
        assert_eq!(field.terminal().name, "city");
    }

    #[test]
    fn equal_weights_keep_first_in_preorder() {
        let tree = SchemaNode::new("Root", "Root").with_children([
            SchemaNode::new("first", "A").with_child(SchemaNode::new("code", "String")),
            SchemaNode::new("second", "B").with_child(SchemaNode::new("code", "Integer")),
        ]);
        let field = Resolver::default().resolve(&tree, "code");
        assert_eq!(field.node.type_tag, "String");
        assert_eq!(field.canonical_path, "first.code");
    }

    #[test]
    fn structural_match_preferred_over_leaf_at_same_depth() {
        let tree = SchemaNode::new("Root", "Root").with_children([
            SchemaNode::new("items", "String"),
            SchemaNode::new("item", "Item").with_child(SchemaNode::new("sku", "String")),
        ]);
        // `items` scores 1.0 as a leaf (weight 0.25); `item` scores 0.8 with
        // children (weight 0.4).
        let field = Resolver::default().resolve(&tree, "items");
        assert_eq!(field.node.name, "item");
    }

    #[test]
    fn candidates_lists_scores_in_preorder() {
        let tree = product();
        let resolver = Resolver::default();
        let candidates = resolver.candidates(&tree, "rating");
        let paths: Vec<String> = candidates.iter().map(|c| c.path.join(".")).collect();
        assert_eq!(paths, ["rating", "reviews.rating"]);
        assert_eq!(candidates[0].depth(), 1);
        assert!((candidates[0].weight() - 0.25).abs() < 1e-9);
        assert!((candidates[1].weight() - 0.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn start_node_is_a_candidate() {
        let tree = product();
        let candidates = Resolver::default().candidates(&tree, "Product");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].depth(), 0);
        assert!(candidates[0].parent.is_none());
    }

    #[test]
    fn lowered_thresholds_admit_moderate_matches() {
        let resolver = Resolver::new(Thresholds {
            candidate: 0.5,
            strong: 0.7,
            moderate: 0.5,
        });
        // Two deletions over five chars: 0.6.
        let field = resolver.resolve(&product(), "prc");
        assert_eq!(field.node.name, "price");
        assert_eq!(field.tier, MatchTier::Moderate);
        assert!((field.similarity - 0.6).abs() < 1e-9);
    }

    #[test]
    fn similarity_is_lowest_over_segments() {
        let field = Resolver::default().resolve(&product(), "review.author");
        assert_eq!(field.canonical_path, "reviews.author");
        assert!((field.similarity - 6.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn schema_tree_is_not_modified() {
        let tree = product();
        let before = tree.clone();
        let _field = Resolver::default().resolve(&tree, "reviews.rating");
        assert_eq!(tree, before);
    }
}
