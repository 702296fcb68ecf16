//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end. A second server stands in for any
//! outbound host: the host key includes the port, so it is a different site.

use site_validator::output::ReportEntry;
use site_validator::{crawl, run_crawl, Capability, Config, CrawlReport};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration: robots.txt ignored, short timeout
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.ignore_robots = true;
    config.crawler.timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn seed(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("Failed to parse seed URL")
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

fn entries<'a>(report: &'a CrawlReport, url: &str) -> Vec<&'a ReportEntry> {
    report
        .entries
        .iter()
        .filter(|e| e.outcome.url.as_str() == url)
        .collect()
}

fn entry<'a>(report: &'a CrawlReport, url: &str) -> &'a ReportEntry {
    entries(report, url)
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("No outcome recorded for {}", url))
}

#[tokio::test]
async fn test_default_options_scenario() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<html><body><a href="/about">About</a><img src="img.png"></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/img.png"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/png"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(create_test_config(), seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.processed, 3);
    assert_eq!(report.errors, 0);
    assert!(!report.interrupted);
    assert_eq!(report.entries.len(), 3);

    assert_eq!(entry(&report, &format!("{}/", base)).outcome.capability, Capability::Full);
    let about = entry(&report, &format!("{}/about", base));
    assert_eq!(about.outcome.capability, Capability::Check);
    assert_eq!(about.referrers.len(), 1);
    assert_eq!(
        entry(&report, &format!("{}/img.png", base)).outcome.capability,
        Capability::Check
    );
    assert_eq!(report.problems().count(), 0);
}

#[tokio::test]
async fn test_duplicate_references_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/a">A</a><a href="/b">B</a><a href="/">Home</a><img src="/shared.png">"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    for page in ["/a", "/b"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html_page(
                r#"<img src="/shared.png"><img src="/shared.png#again"><a href="/">Home</a>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("HEAD"))
        .and(path("/shared.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.recursive = true;

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    assert_eq!(report.processed, 4);
    assert_eq!(report.entries.len(), 4);

    let shared = entry(&report, &format!("{}/shared.png", base));
    assert_eq!(shared.referrers.len(), 3);

    // The seed is referenced by /a and /b but never by itself
    let home = entry(&report, &format!("{}/", base));
    assert_eq!(home.referrers.len(), 2);
}

#[tokio::test]
async fn test_capability_upgrade_fetches_twice() {
    let server = MockServer::start().await;
    let base = server.uri();

    // The image reference is extracted before the hyperlink
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<img src="/page"><a href="/page">Page</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html_page("<p>page</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_depth = 1;

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    assert_eq!(report.processed, 3);
    let page_url = format!("{}/page", base);
    let mut capabilities: Vec<Capability> = entries(&report, &page_url)
        .iter()
        .map(|e| e.outcome.capability)
        .collect();
    capabilities.sort();
    assert_eq!(capabilities, vec![Capability::Check, Capability::Full]);
}

#[tokio::test]
async fn test_depth_bound() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/level1">1</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/level1"))
        .respond_with(html_page(r#"<a href="/level2">2</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/level2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html_page(r#"<a href="/level3">3</a>"#))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_depth = 1;

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    assert_eq!(report.processed, 3);
    assert_eq!(
        entry(&report, &format!("{}/level2", base)).outcome.capability,
        Capability::Check
    );
}

#[tokio::test]
async fn test_outbound_dropped_by_default() {
    let server = MockServer::start().await;
    let outbound = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="{}/x">elsewhere</a>"#,
            outbound.uri()
        )))
        .mount(&server)
        .await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&outbound)
        .await;

    let report = crawl(create_test_config(), seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.processed, 1);
    assert_eq!(report.entries.len(), 1);
}

#[tokio::test]
async fn test_outbound_head_fallback() {
    let server = MockServer::start().await;
    let outbound = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="{}/x">elsewhere</a>"#,
            outbound.uri()
        )))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&outbound)
        .await;
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html_page("<a href=\"/y\">never parsed</a>"))
        .expect(1)
        .mount(&outbound)
        .await;

    let mut config = create_test_config();
    config.crawler.check_outbound = true;
    config.crawler.recursive = true;

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    assert_eq!(report.processed, 2);
    let x = format!("{}/x", outbound.uri());
    assert_eq!(entries(&report, &x).len(), 1);
    let outcome = &entry(&report, &x).outcome;
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.capability, Capability::Check);
    assert_eq!(report.errors, 0);
}

#[tokio::test]
async fn test_internal_head_404_reported() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<img src="/missing.png">"#))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(create_test_config(), seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.errors, 1);
    let missing = entry(&report, &format!("{}/missing.png", base));
    assert_eq!(missing.outcome.status, 404);
    assert!(missing.outcome.errors.is_empty());
    assert_eq!(report.problems().count(), 1);
}

#[tokio::test]
async fn test_redirects_as_errors() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/old">old</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html_page("<p>new</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_depth = 1;
    config.crawler.redirects_as_errors = true;

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    assert_eq!(report.errors, 1);
    let old = entry(&report, &format!("{}/old", base));
    assert_eq!(old.outcome.status, 301);
    assert_eq!(old.outcome.errors, vec!["301 redirect".to_string()]);
    assert_eq!(
        old.outcome.redirect.as_ref().map(Url::as_str),
        Some(format!("{}/new", base).as_str())
    );

    let new = entry(&report, &format!("{}/new", base));
    assert_eq!(new.outcome.status, 200);
    assert_eq!(new.outcome.capability, Capability::Full);
    assert_eq!(new.referrers[0].as_str(), format!("{}/old", base));
}

#[tokio::test]
async fn test_stylesheet_references_checked() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<html><head><link rel="stylesheet" href="/css/style.css"></head></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/css/style.css"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"body { background: url("../img/bg.png"); }"#.as_bytes().to_vec(),
                "text/css",
            ),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/img/bg.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(create_test_config(), seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.processed, 3);
    let bg = entry(&report, &format!("{}/img/bg.png", base));
    assert_eq!(bg.referrers[0].as_str(), format!("{}/css/style.css", base));
}

const NU_RESPONSE: &str = r#"{"messages":[
    {"type":"error","lastLine":3,"lastColumn":9,"firstColumn":1,"message":"Stray end tag “div”."},
    {"type":"info","subType":"warning","lastLine":1,"lastColumn":16,"message":"Consider adding a “lang” attribute."}
]}"#;

async fn validated_crawl(warnings: bool) -> (CrawlReport, String) {
    let server = MockServer::start().await;
    let validator = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("<html><body></div></body></html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/nu/"))
        .and(wiremock::matchers::query_param("out", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NU_RESPONSE))
        .expect(1)
        .mount(&validator)
        .await;

    let mut config = create_test_config();
    config.validation.html = true;
    config.validation.warnings = warnings;
    config.validation.validator_url = format!("{}/nu/", validator.uri());

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");
    (report, format!("{}/", server.uri()))
}

#[tokio::test]
async fn test_html_validation_errors_only() {
    let (report, seed_url) = validated_crawl(false).await;

    let outcome = &entry(&report, &seed_url).outcome;
    assert_eq!(outcome.validation_issues.len(), 1);
    assert_eq!(outcome.validation_issues[0].line, 3);
    assert_eq!(report.errors, 1);
}

#[tokio::test]
async fn test_html_validation_with_warnings() {
    let (report, seed_url) = validated_crawl(true).await;

    let outcome = &entry(&report, &seed_url).outcome;
    assert_eq!(outcome.validation_issues.len(), 2);
    assert_eq!(report.errors, 2);
}

#[tokio::test]
async fn test_validator_failure_recorded() {
    let server = MockServer::start().await;
    let validator = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("<p>hi</p>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&validator)
        .await;

    let mut config = create_test_config();
    config.validation.html = true;
    config.validation.validator_url = format!("{}/nu/", validator.uri());

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    let outcome = &entry(&report, &format!("{}/", server.uri())).outcome;
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("Validator: "));
    assert!(outcome.errors[0].contains("500"));
    assert_eq!(report.errors, 1);
}

#[tokio::test]
async fn test_ignore_patterns() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<img src="/a.png"><img src="/b.gif">"#))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/a.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/b.gif"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.ignore = vec!["*.png".to_string()];

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    assert_eq!(report.processed, 2);
}

#[tokio::test]
async fn test_robots_disallow() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/private/x">private</a><a href="/public">public</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/public"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/private/x"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.ignore_robots = false;

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    assert_eq!(report.processed, 2);
}

#[tokio::test]
async fn test_timeout_recorded_as_transport_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<img src="/slow.png">"#))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/slow.png"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.timeout_secs = 1;

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    let slow = entry(&report, &format!("{}/slow.png", base));
    assert_eq!(slow.outcome.status, 0);
    assert_eq!(slow.outcome.errors, vec!["Request timeout".to_string()]);
    assert_eq!(report.errors, 1);
}

#[tokio::test]
async fn test_interrupt_keeps_recorded_outcomes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/slow">slow</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("<p>late</p>").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = create_test_config();
    config.crawler.timeout_secs = 10;
    config.crawler.max_depth = 1;

    let shutdown = tokio::time::sleep(Duration::from_millis(750));
    let report = run_crawl(config, seed(&server), shutdown)
        .await
        .expect("Crawl failed");

    assert!(report.interrupted);
    assert_eq!(report.processed, 2);
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].outcome.status, 200);
}

#[tokio::test]
async fn test_redirect_to_other_host_is_outbound() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/", other.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(wiremock::matchers::any())
        .respond_with(html_page(r#"<a href="/inner">inner</a>"#))
        .expect(0)
        .mount(&other)
        .await;

    let mut config = create_test_config();
    config.crawler.redirects_as_errors = true;

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    assert_eq!(report.processed, 1);
    assert_eq!(report.errors, 1);
    assert_eq!(report.entries.len(), 1);

    let seed_entry = entry(&report, &format!("{}/", server.uri()));
    assert_eq!(seed_entry.outcome.status, 301);
    assert_eq!(
        seed_entry.outcome.redirect.as_ref().map(Url::as_str),
        Some(format!("{}/", other.uri()).as_str())
    );
}

#[tokio::test]
async fn test_redirect_to_other_host_only_checked() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/", other.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&other)
        .await;
    Mock::given(method("GET"))
        .respond_with(html_page(r#"<a href="/inner">inner</a>"#))
        .expect(0)
        .mount(&other)
        .await;

    let mut config = create_test_config();
    config.crawler.redirects_as_errors = true;
    config.crawler.check_outbound = true;

    let report = crawl(config, seed(&server)).await.expect("Crawl failed");

    assert_eq!(report.processed, 2);
    let target = entry(&report, &format!("{}/", other.uri()));
    assert_eq!(target.outcome.capability, Capability::Check);
    assert_eq!(target.outcome.status, 200);
}
