//! Integration tests for catalog search, list mode and filter options

mod common;

use std::sync::Arc;

use common::MockBackend;
use studywat::api::programs::ProgramFilter;
use studywat::catalog::{CatalogQuery, CatalogState, Fetch, FilterKind};
use studywat::models::{ProgramList, SortOrder};
use studywat::session::MemoryStorage;

async fn run(backend: &studywat::api::Backend, state: &mut CatalogState, fetch: Fetch) {
    match fetch {
        Fetch::Search { seq, filter } => {
            let result = backend.programs.list(&filter).await;
            assert!(state.apply_search(seq, result));
        }
        Fetch::ByIds { seq, ids } => {
            let result = backend.programs.by_ids(&ids).await;
            assert!(state.apply_by_ids(seq, result));
        }
    }
}

#[tokio::test]
async fn test_search_sends_backend_keys() {
    let mock = MockBackend::start().await;
    let (_session, backend) = mock.connect(Arc::new(MemoryStorage::new()));

    let filter = ProgramFilter {
        field_of_study: Some("computer_science".to_string()),
        institution_country: Some("Malaysia".to_string()),
        institution_name: vec!["Zeta University".to_string(), "Mid Institute".to_string()],
        page: Some(1),
        limit: Some(10),
        sort: Some(SortOrder::Az),
        ..Default::default()
    };
    let page = backend.programs.list(&filter).await.unwrap();

    assert_eq!(page.total, 2);
    let raw = mock.state().program_queries[0].clone();
    for pair in [
        "field_of_study=computer_science",
        "institution_country=Malaysia",
        "institution_name=Zeta+University",
        "institution_name=Mid+Institute",
        "page=1",
        "limit=10",
        "sort=az",
    ] {
        assert!(raw.contains(pair), "{} missing from {}", pair, raw);
    }
}

#[tokio::test]
async fn test_catalog_state_search_flow() {
    let mock = MockBackend::start().await;
    let (_session, backend) = mock.connect(Arc::new(MemoryStorage::new()));

    let query = CatalogQuery::parse("country=Malaysia,Japan&ranking=top100&limit=1");
    let mut state = CatalogState::from_query(query);
    let fetch = state.refresh().unwrap();
    run(&backend, &mut state, fetch).await;

    // Only the first country is sent; ranking stays client-side
    let raw = mock.state().program_queries[0].clone();
    assert!(raw.contains("institution_country=Malaysia"));
    assert!(!raw.contains("Japan"));
    assert!(!raw.contains("ranking"));

    assert_eq!(state.total(), 2);
    assert_eq!(state.total_pages(), 2);
    assert_eq!(state.visible().len(), 1);
    assert_eq!(state.visible()[0].id, "p1");

    let next = state.set_page(2).unwrap();
    run(&backend, &mut state, next).await;
    assert_eq!(state.page(), 2);
    assert_eq!(state.visible()[0].id, "p3");

    // A filter change goes back to page 1
    let reset = state.toggle_filter_value(FilterKind::Type, "Public");
    run(&backend, &mut state, reset).await;
    assert_eq!(state.page(), 1);
}

#[tokio::test]
async fn test_list_mode_fetches_by_ids_and_sorts_locally() {
    let mock = MockBackend::start().await;
    let (_session, backend) = mock.connect(Arc::new(MemoryStorage::new()));

    let mut state = CatalogState::from_query(CatalogQuery::default());
    let list = ProgramList {
        id: "l1".to_string(),
        title: "Shortlist".to_string(),
        emoji: "⭐".to_string(),
        program_ids: vec!["p1".to_string(), "p2".to_string(), "p3".to_string()],
        ..Default::default()
    };
    let fetch = state.enter_list(list).unwrap();
    run(&backend, &mut state, fetch).await;

    assert_eq!(mock.state().by_ids_requests, vec![vec!["p1", "p2", "p3"]]);
    assert_eq!(state.total(), 3);

    // Sorting in list mode needs no new request
    assert!(state.set_sort(Some(SortOrder::Az)).is_none());
    let names: Vec<&str> = state
        .visible()
        .iter()
        .map(|p| p.institution_name())
        .collect();
    assert_eq!(names, vec!["Alpha College", "Mid Institute", "Zeta University"]);
}

#[tokio::test]
async fn test_empty_list_skips_by_ids_call() {
    let mock = MockBackend::start().await;
    let (_session, backend) = mock.connect(Arc::new(MemoryStorage::new()));

    let programs = backend.programs.by_ids(&[]).await.unwrap();

    assert!(programs.is_empty());
    assert!(mock.state().by_ids_requests.is_empty());
}

#[tokio::test]
async fn test_filter_options_drop_blank_entries() {
    let mock = MockBackend::start().await;
    let (_session, backend) = mock.connect(Arc::new(MemoryStorage::new()));

    let countries = backend.institutions.countries().await.unwrap();
    let names = backend.institutions.names().await.unwrap();

    assert_eq!(countries, vec!["Malaysia", "Japan"]);
    assert_eq!(
        names,
        vec!["Zeta University", "Alpha College", "Mid Institute"]
    );
}
