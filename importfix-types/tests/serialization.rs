//! Serialization tests for report DTOs and candidate values.

use importfix_types::apply::{ApplyReport, ApplyStatus};
use importfix_types::offer::{OfferQuery, OfferReport, OfferedFix, ToolInfo};
use importfix_types::ops::{FixKindLabel, PriorityTier};
use importfix_types::reference::{ReferenceHandle, ReferenceKind};
use importfix_types::symbol::{ExternalBindingCandidate, SearchResult};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "importfix".to_string(),
        version: Some("0.0.0".to_string()),
    }
}

fn hash_of<T: Hash>(v: &T) -> u64 {
    let mut h = DefaultHasher::new();
    v.hash(&mut h);
    h.finish()
}

#[test]
fn offer_report_new_sets_schema_and_defaults() {
    let report = OfferReport::new(
        tool_info(),
        OfferQuery {
            document: "src/Program.cs".to_string(),
            name: "Bar".to_string(),
            start: 10,
            end: 13,
        },
    );
    assert_eq!(report.schema, importfix_types::schema::IMPORTFIX_OFFER_V1);
    assert!(report.fixes.is_empty());
    assert_eq!(report.summary.fixes_offered, 0);
}

#[test]
fn offered_fix_omits_empty_optionals() {
    let fix = OfferedFix {
        id: "id".to_string(),
        title: "using Foo;".to_string(),
        priority: PriorityTier::Medium,
        kind: FixKindLabel::Namespace,
        provider: "solution".to_string(),
        tags: vec![],
        container: None,
        requires_check: false,
    };
    let json = serde_json::to_value(&fix).unwrap();
    assert_eq!(json["priority"], "medium");
    assert_eq!(json["kind"], "namespace");
    assert!(json.get("tags").is_none());
    assert!(json.get("container").is_none());
}

#[test]
fn apply_report_roundtrips() {
    let mut report = ApplyReport::new(tool_info(), "abc", "using Foo; (from ContosoLib)");
    report.status = ApplyStatus::Applied;
    report.dry_run = false;
    report
        .references_added
        .push(ReferenceHandle::assembly("ContosoLib", "refs/ContosoLib.dll".into()));

    let json = serde_json::to_string(&report).unwrap();
    let back: ApplyReport = serde_json::from_str(&json).unwrap();

    assert_eq!(back.schema, importfix_types::schema::IMPORTFIX_APPLY_V1);
    assert_eq!(back.status, ApplyStatus::Applied);
    assert_eq!(back.references_added.len(), 1);
    assert_eq!(back.references_added[0].kind, ReferenceKind::Assembly);
}

#[test]
fn apply_status_uses_snake_case() {
    let s = serde_json::to_string(&ApplyStatus::NotApplicable).unwrap();
    assert_eq!(s, "\"not_applicable\"");
}

#[test]
fn candidate_deserializes_from_index_shape() {
    let c: ExternalBindingCandidate = serde_json::from_value(serde_json::json!({
        "container_name": "ContosoLib",
        "namespace_parts": ["Foo"],
        "symbol_name": "Bar"
    }))
    .unwrap();
    assert_eq!(c.fully_qualified_name(), "Foo.Bar");
}

fn arb_parts() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Z][a-z]{0,6}", 0..4)
}

proptest! {
    #[test]
    fn search_result_equal_implies_same_hash(
        parts in arb_parts(),
        a_name in "[A-Za-z]{1,8}",
        b_name in "[A-Za-z]{1,8}",
        weight in 0u32..5,
    ) {
        let a = SearchResult::new(parts.clone(), a_name);
        let b = SearchResult::new(parts, b_name).with_weight(weight);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn search_result_equality_tracks_name_parts(a in arb_parts(), b in arb_parts()) {
        let ra = SearchResult::new(a.clone(), "X");
        let rb = SearchResult::new(b.clone(), "X");
        prop_assert_eq!(ra == rb, a == b);
    }
}
