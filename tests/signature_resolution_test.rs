mod common;

use pgcall::{Caller, Config, PgCallError, StubBackend};
use pretty_assertions::assert_eq;

fn proc_queries(caller: &mut Caller<StubBackend>) -> usize {
    caller
        .backend_mut()
        .executed
        .iter()
        .filter(|sql| sql.contains("FROM pg_proc"))
        .count()
}

#[test]
fn test_live_search_path_is_parsed() {
    let mut caller = common::caller_with(StubBackend::with_search_path("\"$user\", public"));
    assert_eq!(
        caller.search_path().unwrap(),
        vec!["$user".to_string(), "public".to_string()]
    );
}

#[test]
fn test_configured_search_path_overrides_the_session() {
    let mut backend = StubBackend::new();
    backend.register_function("other", "area", 701, &[701]);
    let mut caller = Caller::with_config(
        backend,
        Config {
            search_path: Some(vec!["other".to_string()]),
            signature_cache_size: 64,
        },
    );

    let signature = caller.function_signature("area").unwrap().unwrap();
    assert_eq!(signature.return_type_oid, 701);
    // the override means SHOW search_path is never issued
    assert!(
        !caller
            .backend_mut()
            .executed
            .iter()
            .any(|sql| sql.contains("search_path"))
    );
}

#[test]
fn test_unqualified_matches_qualified_resolution() {
    let mut backend = StubBackend::with_search_path("public, other");
    backend.register_function("public", "area", 701, &[701, 701]);
    let mut caller = common::caller_with(backend);

    let unqualified = caller.function_signature("area").unwrap().unwrap();
    let qualified = caller.function_signature("public.area").unwrap().unwrap();
    assert_eq!(unqualified.return_type_oid, qualified.return_type_oid);
    assert_eq!(unqualified.arg_type_oid_sets, qualified.arg_type_oid_sets);

    // the two spellings are independent cache entries, so both resolutions
    // hit the backend once
    assert_eq!(proc_queries(&mut caller), 2);
    caller.function_signature("area").unwrap().unwrap();
    caller.function_signature("public.area").unwrap().unwrap();
    assert_eq!(proc_queries(&mut caller), 2);
}

#[test]
fn test_search_path_walks_past_schemas_without_a_match() {
    let mut backend = StubBackend::with_search_path("public, other");
    backend.register_function("other", "hidden", 25, &[]);
    let mut caller = common::caller_with(backend);

    let signature = caller.function_signature("hidden").unwrap().unwrap();
    assert_eq!(signature.return_type_oid, 25);
    // public was consulted first, then other
    assert_eq!(proc_queries(&mut caller), 2);
}

#[test]
fn test_overloads_collect_into_one_signature() {
    let mut backend = StubBackend::with_search_path("public");
    backend.register_function("public", "fmt", 25, &[25]);
    backend.register_function("public", "fmt", 25, &[25, 23]);
    let mut caller = common::caller_with(backend);

    let signature = caller.function_signature("fmt").unwrap().unwrap();
    assert_eq!(signature.arg_type_oid_sets, vec![vec![25], vec![25, 23]]);
}

#[test]
fn test_empty_search_path_is_a_configuration_error() {
    let mut caller = Caller::with_config(
        StubBackend::new(),
        Config {
            search_path: Some(Vec::new()),
            signature_cache_size: 64,
        },
    );
    let err = caller.function_signature("area").unwrap_err();
    assert!(matches!(err, PgCallError::Configuration(_)));
}

#[test]
fn test_missing_function_is_none_and_not_cached() {
    let mut caller = common::caller_with(StubBackend::with_search_path("public"));
    assert!(caller.function_signature("ghost").unwrap().is_none());
    assert!(caller.function_signature("ghost").unwrap().is_none());
    // not-found results are not cached
    assert_eq!(proc_queries(&mut caller), 2);
}

#[test]
fn test_clear_caches_drops_signatures() {
    let mut backend = StubBackend::with_search_path("public");
    backend.register_function("public", "area", 701, &[701]);
    let mut caller = common::caller_with(backend);

    caller.function_signature("area").unwrap().unwrap();
    caller.function_signature("area").unwrap().unwrap();
    assert_eq!(proc_queries(&mut caller), 1);

    caller.clear_caches();
    caller.function_signature("area").unwrap().unwrap();
    assert_eq!(proc_queries(&mut caller), 2);
}
