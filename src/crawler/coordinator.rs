//! Crawler coordinator - main crawl orchestration logic
//!
//! A [`CrawlSession`] owns everything one crawl shares between tasks: the
//! HTTP client, the frontier, the base domain, the robots policy, and the
//! recorded outcomes. Each dispatched target runs as its own task:
//! fetch, classify the response, validate, extract children, submit them,
//! and record exactly one outcome.

use crate::config::{validator_endpoint, Config};
use crate::crawler::css::extract_css_links;
use crate::crawler::frontier::{Admission, Frontier};
use crate::crawler::parser::{extract_html_links, Extraction};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::output::{CrawlReport, ReportEntry};
use crate::robots::{fetch_robots, RobotsPolicy};
use crate::state::{Capability, CrawlTarget, DocumentKind, FetchFailure, FetchOutcome};
use crate::url::{strip_url, BaseDomain, IgnoreList};
use crate::validator::NuValidator;
use crate::SiteError;
use reqwest::Client;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use url::Url;

/// Extensions never parsed, even when linked as documents
const ASSET_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "ico", "pdf", "swf", "mp4", "avi", "mp3", "ogg", "mkv",
    "doc", "docx", "xls", "xlsx", "zip", "gz", "bz2", "tar", "xz",
];

/// Lower bound on the validator request timeout
const MIN_VALIDATOR_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns true if the URL path ends in a binary or document asset extension
fn is_asset_path(url: &Url) -> bool {
    url.path()
        .rsplit_once('.')
        .map(|(_, ext)| ASSET_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Shared state of one crawl
pub struct CrawlSession {
    config: Config,
    client: Client,
    validator: Option<NuValidator>,
    robots: RobotsPolicy,
    ignore: IgnoreList,
    base_domain: BaseDomain,
    frontier: Frontier,
    scheduler: Scheduler,
    results: Mutex<Vec<FetchOutcome>>,
    errors: AtomicUsize,
}

impl CrawlSession {
    /// Creates a session
    ///
    /// # Errors
    ///
    /// Fails on an invalid ignore pattern or validator endpoint, or if the
    /// validator client cannot be built.
    pub fn new(config: Config, client: Client, robots: RobotsPolicy) -> Result<Self, SiteError> {
        let ignore = IgnoreList::new(&config.crawler.ignore)?;

        let validator = if config.validation_enabled() {
            let endpoint = validator_endpoint(&config.validation.validator_url)?;
            let timeout = Duration::from_secs(config.crawler.timeout_secs).max(MIN_VALIDATOR_TIMEOUT);
            Some(NuValidator::new(
                endpoint,
                &config.user_agent.header_value(),
                timeout,
                config.validation.warnings,
            )?)
        } else {
            None
        };

        let scheduler = Scheduler::new(config.crawler.workers);

        Ok(Self {
            config,
            client,
            validator,
            robots,
            ignore,
            base_domain: BaseDomain::new(),
            frontier: Frontier::new(),
            scheduler,
            results: Mutex::new(Vec::new()),
            errors: AtomicUsize::new(0),
        })
    }

    /// Submits a target for crawling
    ///
    /// Applies robots, depth, ignore, outbound and asset rules, then lets
    /// the frontier decide. A dispatched target is spawned immediately.
    pub fn submit(self: &Arc<Self>, mut target: CrawlTarget) -> Admission {
        if !self.robots.is_allowed(&target.url, &self.base_domain) {
            tracing::debug!("Disallowed by robots.txt: {}", target.url);
            return Admission::Skip;
        }

        if let Some(max_depth) = self.config.max_depth() {
            if target.depth > max_depth {
                target.capability = Capability::Check;
            }
        }

        if self.ignore.is_ignored(target.url.as_str()) {
            tracing::debug!("Ignored: {}", target.url);
            return Admission::Skip;
        }

        let outbound = self.base_domain.is_outbound(&target.url);
        if outbound && !self.config.crawler.check_outbound {
            return Admission::Skip;
        }

        if self.scheduler.is_cancelled() {
            return Admission::Skip;
        }

        if outbound || (target.capability == Capability::Full && is_asset_path(&target.url)) {
            target.capability = Capability::Check;
        }

        let admission = self.frontier.register(&target);

        if admission == Admission::Dispatch {
            tracing::debug!(
                "#{} ({} errors) {} {}",
                self.frontier.processed(),
                self.error_count(),
                target.capability,
                target.url
            );
            let session = Arc::clone(self);
            self.scheduler
                .spawn(async move { session.process_target(target, outbound).await });
        }

        admission
    }

    /// Fetches one target and records its outcome
    async fn process_target(self: Arc<Self>, target: CrawlTarget, outbound: bool) {
        let Some(permit) = self.scheduler.acquire().await else {
            return;
        };
        let result = fetch_url(&self.client, &target, outbound).await;
        drop(permit);

        let mut outcome = FetchOutcome::new(&target);

        match result {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
            } => {
                outcome.status = status_code;
                if let Some(body) = body {
                    self.process_document(&target, &final_url, &content_type, &body, &mut outcome)
                        .await;
                }
            }

            FetchResult::HttpError { status_code } => {
                tracing::debug!("{} returned {}", target.url, status_code);
                outcome.status = status_code;
                self.count_error();
            }

            FetchResult::Redirected {
                status_code,
                location,
            } => {
                outcome.status = status_code;
                outcome.redirect = Some(location.clone());
                outcome.push_failure(FetchFailure::Redirect {
                    status: status_code,
                });
                self.count_error();
                self.record(outcome);

                // Location was resolved against the redirecting URL
                self.base_domain.observe(&target.url);
                let next =
                    CrawlTarget::discovered(location, target.capability, target.depth, &target.url);
                self.submit(next);
                return;
            }

            FetchResult::NetworkError { status_code, error } => {
                tracing::debug!("{}: {}", target.url, error);
                outcome.status = status_code;
                outcome.push_failure(FetchFailure::Transport(error));
                self.count_error();
            }
        }

        self.record(outcome);
    }

    /// Validates and extracts a fetched HTML or CSS document
    async fn process_document(
        self: &Arc<Self>,
        target: &CrawlTarget,
        final_url: &Url,
        content_type: &str,
        body: &[u8],
        outcome: &mut FetchOutcome,
    ) {
        let extraction = match DocumentKind::from_content_type(content_type) {
            DocumentKind::Html => {
                if self.config.validation.html {
                    self.validate(body, content_type, outcome).await;
                }
                let html = String::from_utf8_lossy(body);
                extract_html_links(&html, final_url, target.depth, &self.base_domain)
            }
            DocumentKind::Css => {
                if self.config.validation.css {
                    self.validate(body, content_type, outcome).await;
                }
                let css = String::from_utf8_lossy(body);
                extract_css_links(&css, final_url, target.depth, &self.base_domain)
            }
            DocumentKind::Other => return,
        };

        self.apply_extraction(extraction, target, outcome);
    }

    fn apply_extraction(
        self: &Arc<Self>,
        extraction: Extraction,
        target: &CrawlTarget,
        outcome: &mut FetchOutcome,
    ) {
        for failure in extraction.failures {
            outcome.push_failure(failure);
            self.count_error();
        }

        for link in extraction.links {
            self.submit(CrawlTarget::discovered(
                link.url,
                link.capability,
                link.depth,
                &target.url,
            ));
        }
    }

    async fn validate(&self, body: &[u8], content_type: &str, outcome: &mut FetchOutcome) {
        let Some(validator) = &self.validator else {
            return;
        };

        match validator.validate(body, content_type).await {
            Ok(issues) => {
                self.errors.fetch_add(issues.len(), Ordering::SeqCst);
                outcome.validation_issues.extend(issues);
            }
            Err(e) => {
                tracing::warn!("Validation of {} failed: {}", outcome.url, e);
                outcome.push_failure(FetchFailure::Validator(e.to_string()));
                self.count_error();
            }
        }
    }

    fn record(&self, outcome: FetchOutcome) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome);
    }

    fn count_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> usize {
        self.frontier.processed()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Builds the report from the outcomes recorded so far
    pub fn report(&self, elapsed: Duration, interrupted: bool) -> CrawlReport {
        let outcomes = self
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let entries = outcomes
            .into_iter()
            .map(|outcome| {
                let referrers = self.frontier.referrers(&outcome.url);
                ReportEntry { outcome, referrers }
            })
            .collect();

        CrawlReport {
            processed: self.processed(),
            errors: self.error_count(),
            elapsed,
            interrupted,
            entries,
        }
    }
}

/// Crawls from `seed` until all work is done or `shutdown` resolves
///
/// On shutdown the crawl is cancelled and the report holds whatever had
/// been recorded, with `interrupted` set.
///
/// # Errors
///
/// Only setup can fail: building the HTTP clients, an invalid ignore
/// pattern, or a malformed validator endpoint. Nothing that happens while
/// crawling is returned as an error.
pub async fn run_crawl<F>(config: Config, seed: Url, shutdown: F) -> Result<CrawlReport, SiteError>
where
    F: Future<Output = ()>,
{
    let started = Instant::now();
    let client = build_http_client(&config)?;

    let robots = if config.crawler.ignore_robots {
        RobotsPolicy::disabled()
    } else {
        fetch_robots(&client, &seed, &config.user_agent.crawler_name).await
    };

    let session = Arc::new(CrawlSession::new(config, client, robots)?);

    tracing::info!("Crawling {}", seed);
    session.submit(CrawlTarget::seed(strip_url(seed)));

    let interrupted = tokio::select! {
        _ = session.scheduler().wait_idle() => false,
        _ = shutdown => {
            tracing::warn!("Interrupted, reporting partial results");
            session.scheduler().cancel();
            true
        }
    };

    let report = session.report(started.elapsed(), interrupted);

    tracing::info!(
        "Crawl finished: {} processed, {} errors in {:?}",
        report.processed,
        report.errors,
        report.elapsed
    );

    Ok(report)
}
