//! Resolution against schemas loaded from JSON.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use atlasq_schema::{MatchTier, Resolver, SchemaNode, Thresholds};

const COMPANY: &str = r#"{
    "name": "Company",
    "type": "Company",
    "children": [
        { "name": "_id", "type": "ObjectId" },
        { "name": "legal_name", "type": "String" },
        { "name": "employees", "type": "Integer" },
        {
            "name": "linkedCompanies",
            "type": "LinkedCompany",
            "list": true,
            "children": [
                { "name": "company_id", "type": "ObjectId" },
                { "name": "share", "type": "Double" }
            ]
        },
        {
            "name": "address",
            "type": "Address",
            "children": [
                { "name": "city", "type": "String" },
                {
                    "name": "geo",
                    "type": "Geo",
                    "children": [{ "name": "lat", "type": "Double" }]
                }
            ]
        }
    ]
}"#;

fn company() -> SchemaNode {
    SchemaNode::from_json_str(COMPANY).unwrap()
}

#[test]
fn loads_nested_schema() {
    let schema = company();
    assert_eq!(schema.node_count(), 11);
    assert!(schema.child("linkedCompanies").unwrap().list);
}

#[test]
fn list_children_report_list_parent() {
    let schema = company();
    let field = Resolver::default().resolve(&schema, "linkedCompanies.share");
    assert!(field.exists());
    assert!(field.parent_is_list);
    assert!(field.is_embedded());
    assert_eq!(field.canonical_path, "linkedCompanies.share");
    assert_eq!(field.node.type_tag, "Double");
}

#[test]
fn loose_spelling_is_tolerated() {
    let schema = company();
    let field = Resolver::default().resolve(&schema, "legal_nam");
    assert!(field.exists());
    assert_eq!(field.canonical_path, "legal_name");
    assert_eq!(field.tier, MatchTier::Strong);
    assert!(field.similarity < 1.0);
}

#[test]
fn object_terminal_follows_first_children() {
    let schema = company();
    let field = Resolver::default().resolve(&schema, "address");
    assert_eq!(field.terminal().name, "city");
    assert!(!field.parent_is_list);
}

#[test]
fn skipping_intermediate_levels() {
    let schema = company();
    let field = Resolver::default().resolve(&schema, "address.lat");
    assert!(field.exists());
    assert_eq!(field.canonical_path, "address.geo.lat");
}

#[test]
fn stricter_candidate_threshold_rejects_typos() {
    let schema = company();
    let strict = Resolver::new(Thresholds {
        candidate: 0.95,
        ..Thresholds::default()
    });
    let field = strict.resolve(&schema, "legal_nam");
    assert!(!field.exists());
    assert_eq!(field.tier, MatchTier::Missing);
    assert_eq!(field.node.name, "legal_nam");
}
