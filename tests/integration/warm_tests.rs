//! End-to-end warm runs: sitemap resolution, worker pool, retry and notify

use sitemap_warmer::config::Config;
use sitemap_warmer::crawler::Warmer;
use sitemap_warmer::WarmError;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a sitemap index listing the given child sitemap URLs
fn sitemap_index(children: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for child in children {
        xml.push_str(&format!("<sitemap><loc>{}</loc></sitemap>", child));
    }
    xml.push_str("</sitemapindex>");
    xml
}

/// Builds a urlset listing the given document URLs
fn urlset(documents: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for document in documents {
        xml.push_str(&format!("<url><loc>{}</loc></url>", document));
    }
    xml.push_str("</urlset>");
    xml
}

fn xml_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "application/xml")
}

/// Creates a test configuration pointing at the mock server's root sitemap
fn create_test_config(base_url: &str, concurrency: u32) -> Config {
    let mut config = Config::from_sitemap_url(format!("{}/sitemap.xml", base_url));
    config.warmer.concurrency = concurrency;
    config.warmer.request_timeout = 5;
    config.warmer.connect_timeout = 2;
    config.user_agent.crawler_name = "TestWarmer".to_string();
    config
}

/// Mounts `/sitemap.xml` as an index of `/sitemaps/<name>.xml` children
async fn mount_index(server: &MockServer, children: &[&str]) {
    let locations: Vec<String> = children
        .iter()
        .map(|name| format!("{}/sitemaps/{}.xml", server.uri(), name))
        .collect();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml_response(sitemap_index(&locations)))
        .mount(server)
        .await;
}

/// Mounts a child sitemap listing `/docs/<name>` documents
async fn mount_urlset(server: &MockServer, name: &str, documents: &[&str]) {
    let urls: Vec<String> = documents
        .iter()
        .map(|doc| format!("{}/docs/{}", server.uri(), doc))
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/sitemaps/{}.xml", name)))
        .respond_with(xml_response(urlset(&urls)))
        .mount(server)
        .await;
}

/// Paths of every document request the server received, in arrival order
async fn document_requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|request| request.url.path().to_string())
        .filter(|p| p.starts_with("/docs/"))
        .collect()
}

#[tokio::test]
async fn test_full_warm_run() {
    let server = MockServer::start().await;

    mount_index(&server, &["pages", "blog"]).await;
    mount_urlset(&server, "pages", &["home", "about", "contact"]).await;
    mount_urlset(&server, "blog", &["post-1", "post-2"]).await;

    Mock::given(method("GET"))
        .and(path_regex("^/docs/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(5)
        .mount(&server)
        .await;

    let warmer = Warmer::new(create_test_config(&server.uri(), 3)).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert_eq!(summary.child_sitemaps, 2);
    assert_eq!(summary.skipped_sitemaps, 0);
    assert_eq!(summary.documents, 5);
    assert_eq!(summary.fetched, 5);
    assert!(summary.failures.is_empty());
    assert!(summary.retry.is_none());

    let requests = document_requests(&server).await;
    let unique: HashSet<_> = requests.iter().collect();
    assert_eq!(requests.len(), 5);
    assert_eq!(unique.len(), 5);
}

#[tokio::test]
async fn test_malformed_child_sitemap_is_skipped() {
    let server = MockServer::start().await;

    mount_index(&server, &["good", "broken"]).await;
    mount_urlset(&server, "good", &["one", "two"]).await;

    Mock::given(method("GET"))
        .and(path("/sitemaps/broken.xml"))
        .respond_with(xml_response(
            "<urlset><url><loc>https://example.com/x</loc></urlset>".to_string(),
        ))
        .mount(&server)
        .await;

    let warmer = Warmer::new(create_test_config(&server.uri(), 4)).expect("Failed to create warmer");
    let resolution = warmer.resolve().await.expect("Resolution failed");

    assert_eq!(resolution.child_sitemaps, 2);
    assert_eq!(resolution.skipped_sitemaps, 1);

    let documents: HashSet<String> = resolution
        .documents
        .iter()
        .map(|url| url.path().to_string())
        .collect();
    let expected: HashSet<String> = ["/docs/one", "/docs/two"].iter().map(|p| p.to_string()).collect();
    assert_eq!(documents, expected);
}

#[tokio::test]
async fn test_unreachable_child_sitemap_is_skipped() {
    let server = MockServer::start().await;

    mount_index(&server, &["good", "missing"]).await;
    mount_urlset(&server, "good", &["one"]).await;
    // "missing" is not mounted: wiremock answers 404

    Mock::given(method("GET"))
        .and(path_regex("^/docs/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let warmer = Warmer::new(create_test_config(&server.uri(), 4)).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert_eq!(summary.skipped_sitemaps, 1);
    assert_eq!(summary.documents, 1);
    assert!(summary.failures.is_empty());
}

#[tokio::test]
async fn test_root_sitemap_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let warmer = Warmer::new(create_test_config(&server.uri(), 4)).expect("Failed to create warmer");
    let result = warmer.run().await;

    assert!(matches!(result, Err(WarmError::RootSitemap { .. })));
    assert!(document_requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_limit_caps_main_pass() {
    let server = MockServer::start().await;

    let docs: Vec<String> = (0..10).map(|i| format!("doc-{i}")).collect();
    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    mount_index(&server, &["all"]).await;
    mount_urlset(&server, "all", &doc_refs).await;

    Mock::given(method("GET"))
        .and(path_regex("^/docs/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(5)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), 3);
    config.warmer.limit = 5;

    let warmer = Warmer::new(config).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert_eq!(summary.documents, 5);
    assert_eq!(summary.fetched, 5);
    assert_eq!(document_requests(&server).await.len(), 5);
}

#[tokio::test]
async fn test_duplicates_fetched_once() {
    let server = MockServer::start().await;

    mount_index(&server, &["a", "b"]).await;
    mount_urlset(&server, "a", &["shared", "only-a"]).await;
    mount_urlset(&server, "b", &["shared", "only-b", "only-b"]).await;

    Mock::given(method("GET"))
        .and(path("/docs/shared"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/docs/only-"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let warmer = Warmer::new(create_test_config(&server.uri(), 10)).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert_eq!(summary.documents, 3);
    assert_eq!(summary.fetched, 3);
}

#[tokio::test]
async fn test_failures_recorded_and_retried_once() {
    let server = MockServer::start().await;

    mount_index(&server, &["pages"]).await;
    mount_urlset(&server, "pages", &["ok-1", "ok-2", "gone", "error", "forbidden"]).await;

    Mock::given(method("GET"))
        .and(path("/docs/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/error"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/forbidden"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/docs/ok-"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let warmer = Warmer::new(create_test_config(&server.uri(), 5)).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert_eq!(summary.fetched, 5);
    assert_eq!(summary.failures.len(), 3);

    let mut statuses: Vec<u16> = summary.failures.iter().filter_map(|f| f.status).collect();
    statuses.sort_unstable();
    assert_eq!(statuses, vec![403, 404, 500]);

    let retry = summary.retry.as_ref().expect("Retry pass should have run");
    assert_eq!(retry.attempted, 3);
    assert_eq!(retry.recovered, 0);
    assert_eq!(retry.still_failing.len(), 3);

    // 5 main-pass fetches + 3 retries
    assert_eq!(document_requests(&server).await.len(), 8);
}

#[tokio::test]
async fn test_retry_recovers_flaky_document() {
    let server = MockServer::start().await;

    mount_index(&server, &["pages"]).await;
    mount_urlset(&server, "pages", &["flaky"]).await;

    // First request fails, every later one succeeds
    Mock::given(method("GET"))
        .and(path("/docs/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/flaky"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let warmer = Warmer::new(create_test_config(&server.uri(), 2)).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert_eq!(summary.failures.len(), 1);
    let retry = summary.retry.as_ref().expect("Retry pass should have run");
    assert_eq!(retry.recovered, 1);
    assert!(summary.remaining_failures().is_empty());
}

#[tokio::test]
async fn test_transport_error_recorded_without_status() {
    let server = MockServer::start().await;

    let reachable = format!("{}/docs/ok", server.uri());
    // Nothing listens on port 1
    let unreachable = "http://127.0.0.1:1/docs/down".to_string();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml_response(urlset(&[reachable, unreachable.clone()])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/ok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), 2);
    config.warmer.retry = false;

    let warmer = Warmer::new(config).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].url, unreachable);
    assert_eq!(summary.failures[0].status, None);
    assert!(summary.failures[0].error.is_some());
}

#[tokio::test]
async fn test_stalled_document_times_out() {
    let server = MockServer::start().await;

    mount_index(&server, &["pages"]).await;
    mount_urlset(&server, "pages", &["slow", "fast"]).await;

    Mock::given(method("GET"))
        .and(path("/docs/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/fast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), 1);
    config.warmer.request_timeout = 1;
    config.warmer.retry = false;

    let started = Instant::now();
    let warmer = Warmer::new(config).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].url.ends_with("/docs/slow"));
    assert_eq!(summary.failures[0].status, None);
    assert_eq!(summary.failures[0].error.as_deref(), Some("Request timeout"));
}

#[tokio::test]
async fn test_alternates_warmed_once() {
    let server = MockServer::start().await;
    let uri = server.uri();

    // Both entries share the same x-default alternate
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">
<url><loc>{uri}/docs/en/home</loc>
<xhtml:link rel="alternate" hreflang="fr" href="{uri}/docs/fr/home"/>
<xhtml:link rel="alternate" hreflang="x-default" href="{uri}/docs/home"/>
</url>
<url><loc>{uri}/docs/en/about</loc>
<xhtml:link rel="alternate" hreflang="fr" href="{uri}/docs/fr/about"/>
<xhtml:link rel="alternate" hreflang="x-default" href="{uri}/docs/home"/>
</url>
</urlset>"#
    );

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml_response(xml))
        .mount(&server)
        .await;

    for doc in ["en/home", "fr/home", "home", "en/about", "fr/about"] {
        Mock::given(method("GET"))
            .and(path(format!("/docs/{}", doc)))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(&uri, 3);
    config.warmer.alternates = true;

    let warmer = Warmer::new(config).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert_eq!(summary.documents, 5);
    assert_eq!(summary.fetched, 5);
    assert!(summary.failures.is_empty());

    let requests = document_requests(&server).await;
    let unique: HashSet<_> = requests.iter().collect();
    assert_eq!(requests.len(), 5);
    assert_eq!(unique.len(), 5);
}

#[tokio::test]
async fn test_concurrency_width_does_not_change_results() {
    let server = MockServer::start().await;

    let docs: Vec<String> = (0..30).map(|i| format!("doc-{i}")).collect();
    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    mount_index(&server, &["all"]).await;
    mount_urlset(&server, "all", &doc_refs).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/docs/doc-\d*5$"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/docs/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut results = Vec::new();
    for width in [1, 20] {
        let mut config = create_test_config(&server.uri(), width);
        config.warmer.retry = false;
        let warmer = Warmer::new(config).expect("Failed to create warmer");
        let summary = warmer.run().await.expect("Warm run failed");

        let failed: HashSet<String> = summary.failures.into_iter().map(|f| f.url).collect();
        results.push((summary.fetched, failed));
    }

    assert_eq!(results[0].0, 30);
    assert_eq!(results[0], results[1]);
    // doc-5, doc-15, doc-25
    assert_eq!(results[0].1.len(), 3);
}

#[tokio::test]
async fn test_fixed_headers_sent() {
    let server = MockServer::start().await;

    mount_index(&server, &["pages"]).await;
    mount_urlset(&server, "pages", &["page"]).await;

    Mock::given(method("GET"))
        .and(path("/docs/page"))
        .and(header("accept-encoding", "gzip"))
        .and(header("cdn-country-code", "US"))
        .and(header(
            "user-agent",
            format!("TestWarmer/{}", env!("CARGO_PKG_VERSION")).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let warmer = Warmer::new(create_test_config(&server.uri(), 1)).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert!(summary.failures.is_empty());
}

#[tokio::test]
async fn test_notify_pings_once_after_run() {
    let server = MockServer::start().await;

    mount_index(&server, &["pages"]).await;
    mount_urlset(&server, "pages", &["page"]).await;

    Mock::given(method("GET"))
        .and(path_regex("^/docs/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sitemap_url = format!("{}/sitemap.xml", server.uri());
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(query_param("sitemap", sitemap_url.as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), 2);
    config.warmer.notify = true;
    config.notify.ping_endpoint = format!("{}/ping", server.uri());

    let warmer = Warmer::new(config).expect("Failed to create warmer");
    let summary = warmer.run().await.expect("Warm run failed");

    assert_eq!(summary.notified, Some(true));

    let last = server
        .received_requests()
        .await
        .unwrap_or_default()
        .pop()
        .expect("No requests received");
    assert_eq!(last.url.path(), "/ping");
}

#[tokio::test]
async fn test_repeated_runs_same_failure_set() {
    let server = MockServer::start().await;

    mount_index(&server, &["pages"]).await;
    mount_urlset(&server, "pages", &["a", "b", "c", "missing"]).await;

    Mock::given(method("GET"))
        .and(path("/docs/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/docs/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let warmer = Warmer::new(create_test_config(&server.uri(), 4)).expect("Failed to create warmer");
    let first = warmer.run().await.expect("First run failed");
    let second = warmer.run().await.expect("Second run failed");

    assert_eq!(first.failures, second.failures);
    assert_eq!(first.failures.len(), 1);
}
