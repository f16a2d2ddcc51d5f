//! Integration tests for the repository walker
//!
//! A wiremock server stands in for both the contents API and the raw file
//! host.

use docs_indexer::config::{GitHubConfig, RepositoryEntry, UserAgentConfig};
use docs_indexer::github::RepositoryWalker;
use docs_indexer::storage::ExampleKind;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRID_SOURCE: &str = "/** Configures the data grid columns. */\n\
export class GridConfigurator {\n\
    configureColumns(columns) {\n\
        return columns.map(c => c.key);\n\
    }\n\
}\n";

/// Creates a walk configuration pointed at the mock server with no delays
fn create_test_config(base_url: &str, repositories: Vec<RepositoryEntry>) -> GitHubConfig {
    GitHubConfig {
        api_base_url: base_url.to_string(),
        file_delay_ms: 0,
        repo_delay_ms: 0,
        repositories,
        ..GitHubConfig::default()
    }
}

fn repository(owner: &str, repo: &str) -> RepositoryEntry {
    RepositoryEntry {
        owner: owner.to_string(),
        repo: repo.to_string(),
        base_paths: vec![String::new()],
    }
}

fn walker(config: GitHubConfig) -> RepositoryWalker {
    RepositoryWalker::from_config(&UserAgentConfig::default(), config)
        .expect("Failed to create walker")
}

fn file_entry(base_url: &str, file_path: &str, size: u64) -> Value {
    let name = file_path.rsplit('/').next().unwrap_or(file_path);
    json!({
        "name": name,
        "path": file_path,
        "type": "file",
        "size": size,
        "download_url": format!("{}/raw/{}", base_url, file_path),
        "html_url": null
    })
}

fn dir_entry(dir_path: &str) -> Value {
    let name = dir_path.rsplit('/').next().unwrap_or(dir_path);
    json!({
        "name": name,
        "path": dir_path,
        "type": "dir",
        "size": 0,
        "download_url": null,
        "html_url": null
    })
}

async fn mount_listing(server: &MockServer, listing_path: &str, entries: Vec<Value>, hits: u64) {
    Mock::given(method("GET"))
        .and(path(listing_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(entries)))
        .expect(hits)
        .mount(server)
        .await;
}

async fn mount_raw(server: &MockServer, file_path: &str, body: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/raw/{}", file_path)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_walk_applies_file_and_directory_filters() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_listing(
        &server,
        "/repos/acme/widgets/contents",
        vec![
            file_entry(&base_url, "README.md", 30),
            file_entry(&base_url, "logo.png", 2048),
            file_entry(&base_url, "bundle.js", 999_999),
            dir_entry("src"),
            dir_entry("node_modules"),
            dir_entry("samples"),
        ],
        1,
    )
    .await;
    mount_listing(
        &server,
        "/repos/acme/widgets/contents/src",
        vec![
            file_entry(&base_url, "src/grid.ts", GRID_SOURCE.len() as u64),
            file_entry(&base_url, "src/long.ts", 60_000),
            dir_entry("src/a"),
        ],
        1,
    )
    .await;
    mount_listing(
        &server,
        "/repos/acme/widgets/contents/src/a",
        vec![dir_entry("src/a/b")],
        1,
    )
    .await;
    mount_listing(
        &server,
        "/repos/acme/widgets/contents/src/a/b",
        vec![
            file_entry(&base_url, "src/a/b/deep.ts", GRID_SOURCE.len() as u64),
            dir_entry("src/a/b/c"),
        ],
        1,
    )
    .await;
    mount_listing(&server, "/repos/acme/widgets/contents/src/a/b/c", vec![], 0).await;
    mount_listing(&server, "/repos/acme/widgets/contents/node_modules", vec![], 0).await;
    mount_listing(
        &server,
        "/repos/acme/widgets/contents/samples",
        vec![file_entry(&base_url, "samples/demo.js", GRID_SOURCE.len() as u64)],
        1,
    )
    .await;

    mount_raw(&server, "README.md", "# Widgets\n\nShort readme.\n\n".to_string(), 1).await;
    mount_raw(&server, "logo.png", String::new(), 0).await;
    mount_raw(&server, "bundle.js", String::new(), 0).await;
    mount_raw(&server, "src/grid.ts", GRID_SOURCE.to_string(), 1).await;
    mount_raw(&server, "src/long.ts", "x".repeat(60_000), 1).await;
    mount_raw(&server, "src/a/b/deep.ts", GRID_SOURCE.to_string(), 1).await;
    mount_raw(&server, "samples/demo.js", GRID_SOURCE.to_string(), 1).await;

    let outcome = walker(create_test_config(&base_url, vec![repository("acme", "widgets")]))
        .run()
        .await;

    let ids: Vec<_> = outcome.examples.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "acme/widgets/src/grid.ts",
            "acme/widgets/src/long.ts",
            "acme/widgets/src/a/b/deep.ts",
            "acme/widgets/samples/demo.js",
        ]
    );
    assert_eq!(outcome.failures, 0);
    assert_eq!(outcome.per_repository.get("acme/widgets"), Some(&4));

    let grid = &outcome.examples[0];
    assert_eq!(grid.title, "grid.ts");
    assert_eq!(grid.language, "typescript");
    assert_eq!(grid.kind, ExampleKind::CodeFile);
    assert_eq!(grid.repo_url, "https://github.com/acme/widgets");
    assert!(grid.related_classes.contains(&"GridConfigurator".to_string()));

    let long = &outcome.examples[1];
    assert_eq!(long.content.len(), 50_000);

    let demo = &outcome.examples[3];
    assert_eq!(demo.kind, ExampleKind::Example);
    assert_eq!(demo.language, "javascript");

    let meta = outcome.meta();
    assert_eq!(meta.total_examples, 4);
    assert!(meta.last_refresh.is_some());
}

#[tokio::test]
async fn test_max_files_stops_across_repositories() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_listing(
        &server,
        "/repos/acme/widgets/contents",
        vec![
            file_entry(&base_url, "one.ts", 100),
            file_entry(&base_url, "two.ts", 100),
            file_entry(&base_url, "three.ts", 100),
        ],
        1,
    )
    .await;
    mount_listing(&server, "/repos/acme/charts/contents", vec![], 0).await;

    mount_raw(&server, "one.ts", GRID_SOURCE.to_string(), 1).await;
    mount_raw(&server, "two.ts", GRID_SOURCE.to_string(), 1).await;
    mount_raw(&server, "three.ts", GRID_SOURCE.to_string(), 0).await;

    let mut config = create_test_config(
        &base_url,
        vec![repository("acme", "widgets"), repository("acme", "charts")],
    );
    config.max_files = 2;

    let outcome = walker(config).run().await;

    assert_eq!(outcome.examples.len(), 2);
    assert_eq!(outcome.per_repository.get("acme/widgets"), Some(&2));
    assert_eq!(outcome.per_repository.get("acme/charts"), Some(&0));
}

#[tokio::test]
async fn test_failed_listing_is_counted_and_walk_continues() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/acme/missing/contents"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(
        &server,
        "/repos/acme/widgets/contents",
        vec![file_entry(&base_url, "grid.ts", 100)],
        1,
    )
    .await;
    mount_raw(&server, "grid.ts", GRID_SOURCE.to_string(), 1).await;

    let outcome = walker(create_test_config(
        &base_url,
        vec![repository("acme", "missing"), repository("acme", "widgets")],
    ))
    .run()
    .await;

    assert_eq!(outcome.failures, 1);
    assert_eq!(outcome.examples.len(), 1);
    assert_eq!(outcome.per_repository.get("acme/missing"), Some(&0));
    assert_eq!(outcome.per_repository.get("acme/widgets"), Some(&1));
}

#[tokio::test]
async fn test_failed_download_is_counted() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_listing(
        &server,
        "/repos/acme/widgets/contents",
        vec![
            file_entry(&base_url, "broken.ts", 100),
            file_entry(&base_url, "grid.ts", 100),
        ],
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/raw/broken.ts"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_raw(&server, "grid.ts", GRID_SOURCE.to_string(), 1).await;

    let outcome = walker(create_test_config(&base_url, vec![repository("acme", "widgets")]))
        .run()
        .await;

    assert_eq!(outcome.failures, 1);
    assert_eq!(outcome.examples.len(), 1);
    assert_eq!(outcome.examples[0].id, "acme/widgets/grid.ts");
}

#[tokio::test]
async fn test_delay_is_applied_between_directory_listings() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_listing(&server, "/repos/acme/widgets/contents", vec![dir_entry("src")], 1).await;
    mount_listing(&server, "/repos/acme/widgets/contents/src", vec![], 1).await;

    let mut config = create_test_config(&base_url, vec![repository("acme", "widgets")]);
    config.repo_delay_ms = 200;

    let started = std::time::Instant::now();
    let outcome = walker(config).run().await;

    assert_eq!(outcome.failures, 0);
    // One pause before the subdirectory listing, none before the root
    assert!(started.elapsed() >= std::time::Duration::from_millis(200));
}

#[tokio::test]
async fn test_delay_is_applied_after_each_file_fetch() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_listing(
        &server,
        "/repos/acme/widgets/contents",
        vec![
            file_entry(&base_url, "one.ts", 100),
            file_entry(&base_url, "two.ts", 100),
        ],
        1,
    )
    .await;
    mount_raw(&server, "one.ts", GRID_SOURCE.to_string(), 1).await;
    mount_raw(&server, "two.ts", GRID_SOURCE.to_string(), 1).await;

    let mut config = create_test_config(&base_url, vec![repository("acme", "widgets")]);
    config.file_delay_ms = 150;

    let started = std::time::Instant::now();
    let outcome = walker(config).run().await;

    assert_eq!(outcome.examples.len(), 2);
    assert!(started.elapsed() >= std::time::Duration::from_millis(300));
}
