mod common;

use common::*;
use importfix_domain::{
    AddImportProvider, FixContext, FixKind, HitOrigin, ProviderConfig, SearchHit, SymbolSearch,
};
use importfix_edit::find_name;
use importfix_solution::Solution;
use importfix_types::ids::{ProjectId, ProviderId};
use importfix_types::ops::{FixKindLabel, PriorityTier};
use importfix_types::reference::ReferenceHandle;
use importfix_types::symbol::{ExternalBindingCandidate, SearchResult};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn hit(ns: &str, origin: HitOrigin) -> SearchHit {
    SearchHit {
        result: SearchResult::new(parts(ns), "Bar"),
        origin,
    }
}

fn assembly(container: &str) -> HitOrigin {
    HitOrigin::Assembly(ExternalBindingCandidate::new(container, parts("Foo"), "Bar"))
}

fn context(s: &Solution) -> FixContext {
    let doc = s
        .document_by_path(camino::Utf8Path::new(PROGRAM))
        .unwrap();
    FixContext {
        solution: s.clone(),
        document: doc.id(),
        name: "Bar".to_string(),
        name_range: find_name(doc.text(), "Bar", None).unwrap(),
    }
}

fn provider(searches: Vec<Arc<dyn SymbolSearch>>, config: ProviderConfig) -> AddImportProvider {
    AddImportProvider::new(
        searches,
        services(Arc::new(CountingResolver::found("refs/x.dll"))),
        config,
    )
}

fn search(name: &str, hits: Vec<SearchHit>) -> Arc<dyn SymbolSearch> {
    Arc::new(StaticSearch {
        provider: ProviderId::new(name),
        hits,
    })
}

#[test]
fn duplicates_collapse_but_containers_stay_distinct() {
    let s = solution("class Program { Bar b; }\n");
    let p = provider(
        vec![search(
            "metadata",
            vec![
                hit("Foo", assembly("ContosoLib")),
                hit("Foo", assembly("ContosoLib")),
                hit("Foo", assembly("FabrikamLib")),
            ],
        )],
        ProviderConfig::default(),
    );

    let offer = p.offer(&context(&s), &CancellationToken::new()).unwrap();
    let titles: Vec<String> = offer.fixes.iter().map(|f| f.describe().title).collect();
    assert_eq!(
        titles,
        vec![
            "using Foo; (from ContosoLib)".to_string(),
            "using Foo; (from FabrikamLib)".to_string()
        ]
    );
    assert_eq!(offer.stats.duplicates_dropped, 1);
    assert_eq!(offer.stats.hits_total, 3);
}

#[test]
fn same_hit_from_two_providers_is_two_fixes() {
    let s = solution("class Program { Bar b; }\n");
    let p = provider(
        vec![
            search("a", vec![hit("Foo", HitOrigin::Referenced)]),
            search("b", vec![hit("Foo", HitOrigin::Referenced)]),
        ],
        ProviderConfig::default(),
    );
    let offer = p.offer(&context(&s), &CancellationToken::new()).unwrap();
    assert_eq!(offer.fixes.len(), 2);
}

#[test]
fn noops_are_dropped() {
    let s = Solution::builder()
        .document("App", PROGRAM, "using Foo;\nclass Program { Bar b; }\n")
        .document("Other", "src/Widget.cs", "class Widget {}\n")
        .reference(
            "App",
            ReferenceHandle::assembly("ContosoLib", "refs/ContosoLib.dll".into()),
        )
        .build()
        .unwrap();
    let p = provider(
        vec![search(
            "all",
            vec![
                hit("Foo", HitOrigin::Referenced),
                hit("Foo", assembly("ContosoLib")),
                hit("Foo", HitOrigin::Project(ProjectId::from_name("App"))),
                hit("Foo", HitOrigin::Project(ProjectId::from_name("Missing"))),
                hit("Foo", HitOrigin::Project(ProjectId::from_name("Other"))),
            ],
        )],
        ProviderConfig::default(),
    );

    let offer = p.offer(&context(&s), &CancellationToken::new()).unwrap();
    assert_eq!(offer.stats.noops_dropped, 4);
    assert_eq!(offer.fixes.len(), 1);
    assert_eq!(offer.fixes[0].label(), FixKindLabel::Project);
}

#[test]
fn ordering_is_by_tier_and_stable() {
    let s = solution("class Program { Bar b; }\n");
    let p = provider(
        vec![search(
            "mixed",
            vec![
                hit("Foo", assembly("ContosoLib")),
                hit("Foo.Inner", HitOrigin::Referenced),
                hit("Foo", HitOrigin::Referenced),
                hit("Foo", HitOrigin::Project(ProjectId::from_name("Other"))),
            ],
        )],
        ProviderConfig::default(),
    );
    let offer = p.offer(&context(&s), &CancellationToken::new()).unwrap();
    let priorities: Vec<PriorityTier> = offer.fixes.iter().map(|f| f.priority()).collect();
    assert_eq!(
        priorities,
        vec![
            PriorityTier::Medium,
            PriorityTier::Medium,
            PriorityTier::Medium,
            PriorityTier::Low
        ]
    );
    assert!(matches!(offer.fixes[0].kind(), FixKind::Namespace));
    assert_eq!(offer.fixes[0].search_result().namespace(), "Foo.Inner");
    assert!(matches!(offer.fixes[3].kind(), FixKind::Assembly(_)));

    // No resolution happened while offering.
    assert!(offer.fixes.iter().all(|f| f.resolution().is_none()));
}

#[test]
fn fuzzy_hits_sink_to_low() {
    let s = solution("class Program { Bar b; }\n");
    let fuzzy = SearchHit {
        result: SearchResult::new(parts("Foo"), "Bar").with_weight(2),
        origin: HitOrigin::Referenced,
    };
    let p = provider(
        vec![search(
            "mixed",
            vec![fuzzy, hit("Foo", assembly("ContosoLib"))],
        )],
        ProviderConfig::default(),
    );
    let offer = p.offer(&context(&s), &CancellationToken::new()).unwrap();
    assert!(offer.fixes.iter().all(|f| f.priority() == PriorityTier::Low));
    assert!(matches!(offer.fixes[0].kind(), FixKind::Namespace));
}

#[test]
fn exact_hit_replaces_earlier_fuzzy_duplicate() {
    let s = solution("class Program { Bar b; }\n");
    let fuzzy = SearchHit {
        result: SearchResult::new(parts("Foo"), "bar").with_weight(1),
        origin: assembly("ContosoLib"),
    };
    let p = provider(
        vec![search(
            "metadata",
            vec![fuzzy.clone(), hit("Foo", assembly("ContosoLib")), fuzzy],
        )],
        ProviderConfig::default(),
    );

    let offer = p.offer(&context(&s), &CancellationToken::new()).unwrap();
    assert_eq!(offer.fixes.len(), 1);
    assert_eq!(offer.stats.duplicates_dropped, 2);
    let kept = offer.fixes[0].search_result();
    assert_eq!(kept.weight, 0);
    assert_eq!(kept.desired_name, "Bar");

    let ops = offer.fixes[0].execute(&s, &CancellationToken::new()).unwrap();
    let doc = ops[0]
        .changed_solution()
        .document_by_path(camino::Utf8Path::new(PROGRAM))
        .unwrap();
    assert_eq!(doc.text(), "using Foo;\n\nclass Program { Bar b; }\n");
}

#[test]
fn disabled_origins_and_max_fixes() {
    let s = solution("class Program { Bar b; }\n");
    let hits = vec![
        hit("Foo", assembly("ContosoLib")),
        hit("Foo", HitOrigin::Referenced),
        hit("Foo", HitOrigin::Project(ProjectId::from_name("Other"))),
    ];

    let no_assemblies = provider(
        vec![search("s", hits.clone())],
        ProviderConfig {
            assemblies: false,
            ..ProviderConfig::default()
        },
    );
    let offer = no_assemblies
        .offer(&context(&s), &CancellationToken::new())
        .unwrap();
    assert_eq!(offer.fixes.len(), 2);
    assert_eq!(offer.stats.noops_dropped, 0);

    let capped = provider(
        vec![search("s", hits)],
        ProviderConfig {
            max_fixes: Some(1),
            ..ProviderConfig::default()
        },
    );
    let offer = capped.offer(&context(&s), &CancellationToken::new()).unwrap();
    assert_eq!(offer.fixes.len(), 1);
    assert_eq!(offer.stats.truncated_to, Some(1));
}

#[test]
fn fix_ids_are_stable_across_offers() {
    let s = solution("class Program { Bar b; }\n");
    let make = || {
        provider(
            vec![search("metadata", vec![hit("Foo", assembly("ContosoLib"))])],
            ProviderConfig::default(),
        )
    };
    let a = make().offer(&context(&s), &CancellationToken::new()).unwrap();
    let b = make().offer(&context(&s), &CancellationToken::new()).unwrap();
    assert_eq!(a.fixes[0].id(), b.fixes[0].id());
}

#[test]
fn cancelled_offer_stops() {
    let s = solution("class Program { Bar b; }\n");
    let p = provider(
        vec![search("s", vec![hit("Foo", HitOrigin::Referenced)])],
        ProviderConfig::default(),
    );
    let token = CancellationToken::new();
    token.cancel();
    assert!(p.offer(&context(&s), &token).unwrap_err().is_cancelled());
}
