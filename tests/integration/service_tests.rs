//! Integration tests for the query service and refresh orchestration
//!
//! Query tests build corpora directly; refresh tests crawl and walk a
//! wiremock server into a temporary data directory.

use chrono::Utc;
use docs_indexer::config::{Config, DocsConfig, GitHubConfig, RepositoryEntry, StorageConfig};
use docs_indexer::crawler::build_index_meta;
use docs_indexer::github::build_example;
use docs_indexer::service::{
    docs_store, examples_store, refresh_docs, DocsRefreshRequest, QueryError, QueryService,
    ToolServer, TRUNCATION_MARKER,
};
use docs_indexer::state::{CorpusState, DocsCorpus, ExamplesCorpus};
use docs_indexer::storage::{page_id, IndexedPage, Storage};
use docs_indexer::ScopeFilter;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(slug: &str, title: &str, text: &str, code_blocks: Vec<String>) -> IndexedPage {
    let url = format!("https://docs.example.com/Product/{}", slug);
    IndexedPage {
        id: page_id(&url),
        url,
        title: title.to_string(),
        headings: vec![format!("{} Overview", title)],
        text: text.to_string(),
        code_blocks,
        fetched_at: Utc::now(),
    }
}

fn sample_pages() -> Vec<IndexedPage> {
    vec![
        page(
            "charts",
            "Charts",
            "Charts render series over a background with optional grid lines.",
            vec![],
        ),
        page(
            "grid",
            "Data Grid",
            "The grid displays tabular data with sorting, filtering, and paging.",
            vec!["grid.setColumns(columns);".to_string()],
        ),
        page("editor", "Rich Text Editor", "The editor formats documents.", vec![]),
    ]
}

/// Builds a query service over `pages`, recorded as crawled within `host`
fn docs_service(pages: Vec<IndexedPage>, host: &str) -> QueryService {
    let docs = DocsConfig {
        allowed_host: host.to_string(),
        ..DocsConfig::default()
    };
    let meta = build_index_meta(&docs, pages.len(), pages.len(), 0, false);
    let corpus = DocsCorpus::build(pages, Some(meta)).expect("Failed to build docs corpus");
    let state = CorpusState::new(corpus, ExamplesCorpus::empty().expect("empty corpus"));

    QueryService::new(Arc::new(state), ScopeFilter::from_config(&docs))
}

fn examples_service() -> QueryService {
    let repo = RepositoryEntry {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        base_paths: vec![String::new()],
    };
    let source = "export class GridConfigurator {\n    configureColumns() {}\n}\n";
    let examples = vec![
        build_example(&repo, "src/grid.ts", None, source.to_string()),
        build_example(&repo, "samples/GridSample.cs", None, source.to_string()),
        build_example(&repo, "samples/grid_demo.js", None, source.to_string()),
        build_example(&repo, "src/editor.ts", None, "export class RichEditor {}\n".to_string()),
    ];

    let corpus = ExamplesCorpus::build(examples, None).expect("Failed to build examples corpus");
    let state = CorpusState::new(DocsCorpus::empty().expect("empty corpus"), corpus);
    QueryService::new(
        Arc::new(state),
        ScopeFilter::from_config(&DocsConfig::default()),
    )
}

fn empty_service() -> QueryService {
    QueryService::new(
        Arc::new(CorpusState::empty().expect("empty state")),
        ScopeFilter::from_config(&DocsConfig::default()),
    )
}

#[test]
fn test_empty_corpora_report_no_index() {
    let service = empty_service();

    assert!(matches!(
        service.open_top_result("grid", true, 5000),
        Err(QueryError::NoIndex)
    ));
    assert!(matches!(
        service.search_examples("grid", None, 5),
        Err(QueryError::NoIndex)
    ));
}

#[test]
fn test_top_result_is_best_match() {
    let service = docs_service(sample_pages(), "docs.example.com");

    let result = service
        .open_top_result("grid", true, 5000)
        .expect("Search failed");

    assert_eq!(result.title, "Data Grid");
    assert_eq!(result.url, "https://docs.example.com/Product/grid");
    assert!(!result.truncated);
    assert_eq!(result.code_blocks, vec!["grid.setColumns(columns);".to_string()]);

    assert!(!result.top_results.is_empty());
    assert!(result.top_results.len() <= 3);
    assert_eq!(result.top_results[0].url, result.url);
    assert!(result
        .top_results
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn test_unmatched_query_reports_no_results() {
    let service = docs_service(sample_pages(), "docs.example.com");

    match service.open_top_result("kubernetes", true, 5000) {
        Err(QueryError::NoResults { query }) => assert_eq!(query, "kubernetes"),
        other => panic!("expected no results, got {:?}", other),
    }
}

#[test]
fn test_long_text_is_truncated_and_code_capped() {
    let code_blocks: Vec<String> = (0..7).map(|i| format!("grid.step{}();", i)).collect();
    let long_text = "grid ".repeat(2000);
    let service = docs_service(
        vec![page("grid", "Data Grid", &long_text, code_blocks)],
        "docs.example.com",
    );

    let result = service
        .open_top_result("grid", true, 100)
        .expect("Search failed");
    assert!(result.truncated);
    assert!(result.text.ends_with(TRUNCATION_MARKER));
    assert_eq!(
        result.text.chars().count(),
        100 + TRUNCATION_MARKER.chars().count()
    );
    assert_eq!(result.code_blocks.len(), 5);
    assert_eq!(result.code_blocks[0], "grid.step0();");

    let without_code = service
        .open_top_result("grid", false, 100)
        .expect("Search failed");
    assert!(without_code.code_blocks.is_empty());
}

#[test]
fn test_stored_url_outside_recorded_scope_is_rejected() {
    let service = docs_service(sample_pages(), "other.example.com");

    match service.open_top_result("grid", true, 5000) {
        Err(QueryError::ScopeViolation { url }) => {
            assert_eq!(url, "https://docs.example.com/Product/grid");
        }
        other => panic!("expected scope violation, got {:?}", other),
    }
}

#[test]
fn test_search_examples_filters_by_language() {
    let service = examples_service();

    let all = service
        .search_examples("GridConfigurator", None, 5)
        .expect("Search failed");
    assert_eq!(all.len(), 3);

    let csharp = service
        .search_examples("GridConfigurator", Some("csharp"), 5)
        .expect("Search failed");
    assert_eq!(csharp.len(), 1);
    assert_eq!(csharp[0].example.id, "acme/widgets/samples/GridSample.cs");

    let limited = service
        .search_examples("GridConfigurator", None, 2)
        .expect("Search failed");
    assert_eq!(limited.len(), 2);

    assert!(matches!(
        service.search_examples("GridConfigurator", Some("python"), 5),
        Err(QueryError::NoResults { .. })
    ));
}

#[test]
fn test_search_examples_honours_result_limit() {
    let service = examples_service();

    let one = service
        .search_examples("GridConfigurator", None, 1)
        .expect("Search failed");
    assert_eq!(one.len(), 1);

    assert!(matches!(
        service.search_examples("GridConfigurator", None, 0),
        Err(QueryError::NoResults { .. })
    ));
}

fn html_page(title: &str, body: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">more</a>"#, href))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body><main><h1>{}</h1><p>{}</p>{}</main></body></html>",
            title, title, body, anchors
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_docs_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/Product/grid"))
        .respond_with(html_page(
            "Data Grid",
            "The grid displays tabular data.",
            &["/Product/charts"],
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Product/charts"))
        .respond_with(html_page("Charts", "Charts render series.", &[]))
        .mount(server)
        .await;
}

/// Configuration pointed at the mock server and a temporary data directory
fn create_test_config(base_url: &str, data_dir: &Path) -> Config {
    Config {
        docs: DocsConfig {
            start_url: format!("{}/Product/grid", base_url),
            allowed_host: "127.0.0.1".to_string(),
            allowed_path_prefixes: vec!["/Product/".to_string()],
            delay_ms: 0,
            request_timeout_secs: 5,
            ..DocsConfig::default()
        },
        github: GitHubConfig {
            api_base_url: base_url.to_string(),
            file_delay_ms: 0,
            repo_delay_ms: 0,
            repositories: vec![RepositoryEntry {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
                base_paths: vec![String::new()],
            }],
            ..GitHubConfig::default()
        },
        storage: StorageConfig {
            data_dir: data_dir.to_string_lossy().into_owned(),
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn test_refresh_docs_persists_and_swaps_snapshot() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;
    let data_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server.uri(), data_dir.path());
    let state = CorpusState::empty().expect("empty state");

    let report = refresh_docs(&config, &state, &DocsRefreshRequest::default())
        .await
        .expect("Refresh failed");

    assert_eq!(report.new_pages, 2);
    assert_eq!(report.total_pages, 2);
    assert_eq!(report.stop_reason, "frontier-exhausted");
    assert_eq!(state.docs().len(), 2);

    let (pages, meta) = docs_store(data_dir.path()).load();
    let meta = meta.expect("Meta not saved");
    assert_eq!(pages.len(), 2);
    assert_eq!(meta.indexed_count, 2);
    assert!(!meta.in_progress);
}

#[tokio::test]
async fn test_resumed_refresh_keeps_stored_pages() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;
    let data_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server.uri(), data_dir.path());

    let mut stored = page("legacy", "Legacy Grid", "Older grid notes.", vec![]);
    stored.url = format!("{}/Product/legacy", server.uri());
    stored.id = page_id(&stored.url);
    let seed_meta = build_index_meta(&config.docs, 1, 1, 0, false);
    docs_store(data_dir.path())
        .save(&[stored], &seed_meta)
        .expect("Failed to seed store");

    let state = CorpusState::empty().expect("empty state");
    let resumed = DocsRefreshRequest {
        resume: true,
        ..DocsRefreshRequest::default()
    };
    let report = refresh_docs(&config, &state, &resumed)
        .await
        .expect("Refresh failed");
    assert_eq!(report.new_pages, 2);
    assert_eq!(report.total_pages, 3);

    let fresh = refresh_docs(&config, &state, &DocsRefreshRequest::default())
        .await
        .expect("Refresh failed");
    assert_eq!(fresh.total_pages, 2);
    assert_eq!(state.docs().len(), 2);
}

#[tokio::test]
async fn test_out_of_scope_refresh_leaves_snapshot() {
    let server = MockServer::start().await;
    mount_docs_site(&server).await;
    let data_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server.uri(), data_dir.path());
    let state = CorpusState::empty().expect("empty state");

    refresh_docs(&config, &state, &DocsRefreshRequest::default())
        .await
        .expect("Refresh failed");

    let out_of_scope = DocsRefreshRequest {
        start_url: Some(format!("{}/Other/start", server.uri())),
        ..DocsRefreshRequest::default()
    };
    assert!(refresh_docs(&config, &state, &out_of_scope).await.is_err());
    assert_eq!(state.docs().len(), 2);
}

#[tokio::test]
async fn test_tools_refresh_then_search() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    mount_docs_site(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "GridSample.cs",
                "path": "samples/GridSample.cs",
                "type": "file",
                "size": 120,
                "download_url": format!("{}/raw/GridSample.cs", base_url),
                "html_url": null
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/GridSample.cs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "// Binds the grid to a remote source.\npublic class GridSample {\n    public void Bind() {}\n}\n",
        ))
        .mount(&server)
        .await;

    let data_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&base_url, data_dir.path());
    let tools = ToolServer::new(config, Arc::new(CorpusState::empty().expect("empty state")));

    let refreshed = tools.call("refresh_docs", json!({})).await;
    assert!(!refreshed.is_error, "{:?}", refreshed);

    let found = tools
        .call("search_docs", json!({"query": "grid", "includeCode": false}))
        .await;
    assert!(!found.is_error);
    let top: Value = serde_json::from_str(found.first_text().expect("text")).expect("json");
    assert_eq!(top["title"], "Data Grid");
    assert_eq!(top["codeBlocks"], json!([]));

    let walked = tools.call("refresh_examples", json!({"maxFiles": 10})).await;
    assert!(!walked.is_error, "{:?}", walked);
    assert!(examples_store(data_dir.path()).files().records.exists());

    let examples = tools
        .call(
            "search_examples",
            json!({"query": "GridSample", "language": "csharp"}),
        )
        .await;
    assert!(!examples.is_error);
    let matches: Value =
        serde_json::from_str(examples.first_text().expect("text")).expect("json");
    assert_eq!(matches[0]["example"]["language"], "csharp");
    assert_eq!(matches[0]["example"]["type"], "example");

    let status = tools.call("status", Value::Null).await;
    let status: Value = serde_json::from_str(status.first_text().expect("text")).expect("json");
    assert_eq!(status["docs"]["pageCount"], 2);
    assert_eq!(status["examples"]["exampleCount"], 1);
}
