// src/pipeline/cycle.rs

//! One poll cycle: fetch, parse, filter, dedup, notify, persist.
//!
//! A cycle never fails. Whatever goes wrong is classified into the
//! returned [`CycleOutcome`]; the scheduling loop only decides how long
//! to sleep before the next attempt.

use std::fmt;

use reqwest::StatusCode;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::{ExclusionFilter, ListingParser, Notify};
use crate::storage::{SeenSet, SeenStore};
use crate::utils::{log, preview};

/// Classification of a failed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// The page responded with a non-200 status
    HttpStatus(u16),
    /// The fetch failed below the HTTP layer (DNS, connect, timeout)
    Transport(String),
    /// Anything else that interrupted the cycle
    Unexpected(String),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP status {code}"),
            Self::Transport(message) => write!(f, "transport failure: {message}"),
            Self::Unexpected(message) => write!(f, "unexpected failure: {message}"),
        }
    }
}

/// Counters describing one completed (or aborted) cycle.
#[derive(Debug, Default)]
pub struct CycleOutcome {
    /// Whether the page body was fetched successfully
    pub fetched: bool,
    /// HTTP status of the fetch, when a response arrived
    pub http_status: Option<u16>,
    /// Candidates extracted from the document
    pub candidate_count: usize,
    /// Candidates dropped by the parser for missing fields
    pub skipped_count: usize,
    /// Newly seen, non-excluded listings
    pub new_count: usize,
    /// Newly seen listings suppressed by keyword
    pub excluded_count: usize,
    /// Set when the cycle did not run to completion
    pub error: Option<CycleError>,
}

/// Borrowed collaborators for one cycle.
pub struct CycleContext<'a> {
    pub config: &'a Config,
    pub client: &'a reqwest::Client,
    pub parser: &'a ListingParser,
    pub filter: &'a ExclusionFilter,
    pub notifier: &'a dyn Notify,
    pub store: &'a SeenStore,
}

/// Run one poll cycle against the configured page.
pub async fn run_cycle(ctx: &CycleContext<'_>, seen: &mut SeenSet) -> CycleOutcome {
    match execute(ctx, seen).await {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error(&format!("Cycle failed: {err}"));

            // Best-effort operator notification; its own failure is only logged
            let delivery = ctx.notifier.send(&format!("⚠️ Watcher error: {err}")).await;
            if !delivery.success {
                log::warn(&format!("Error notification not delivered: {delivery}"));
            }

            CycleOutcome {
                error: Some(classify(&err)),
                ..CycleOutcome::default()
            }
        }
    }
}

async fn execute(ctx: &CycleContext<'_>, seen: &mut SeenSet) -> Result<CycleOutcome> {
    log::info(&format!("Scanning {}", ctx.config.watch.url));

    let response = ctx.client.get(&ctx.config.watch.url).send().await?;
    let status = response.status();
    log::info(&format!("HTTP status: {}", status.as_u16()));

    if status != StatusCode::OK {
        log::error(&format!("Fetch rejected with HTTP {}", status.as_u16()));
        return Ok(CycleOutcome {
            http_status: Some(status.as_u16()),
            error: Some(CycleError::HttpStatus(status.as_u16())),
            ..CycleOutcome::default()
        });
    }

    let body = response.text().await?;
    let parsed = ctx.parser.parse(&body);
    log::info(&format!(
        "Candidates found: {} ({} skipped)",
        parsed.listings.len(),
        parsed.skipped
    ));

    let mut outcome = CycleOutcome {
        fetched: true,
        http_status: Some(status.as_u16()),
        candidate_count: parsed.listings.len(),
        skipped_count: parsed.skipped,
        ..CycleOutcome::default()
    };

    for listing in &parsed.listings {
        if seen.contains(&listing.id) {
            continue;
        }

        // Mark seen before filtering: an excluded listing is never
        // re-evaluated, even if the keyword set changes later.
        seen.insert(listing.id.clone());

        if let Some(keyword) = ctx
            .filter
            .matched_keyword(&listing.title, &listing.description)
        {
            outcome.excluded_count += 1;
            log::info(&format!(
                "Excluded (keyword '{}'): {}",
                keyword,
                preview(&listing.title, 50)
            ));
            continue;
        }

        outcome.new_count += 1;
        let delivery = ctx.notifier.send(&listing.notification_text()).await;
        if delivery.success {
            log::info(&format!("New listing sent: {}", preview(&listing.title, 50)));
        } else {
            log::warn(&format!(
                "Send failed for '{}': {}",
                preview(&listing.title, 50),
                delivery
            ));
        }
    }

    // Best-effort persistence: a failed write is logged and the same ids
    // are written again at the end of the next cycle.
    if let Err(err) = ctx.store.save(seen).await {
        log::error(&format!("Could not persist seen ids: {err}"));
    }

    log::summary(
        "Scan complete",
        &[
            ("candidates", outcome.candidate_count.to_string()),
            ("new", outcome.new_count.to_string()),
            ("excluded", outcome.excluded_count.to_string()),
            ("skipped", outcome.skipped_count.to_string()),
            ("total seen", seen.len().to_string()),
        ],
    );

    Ok(outcome)
}

fn classify(err: &AppError) -> CycleError {
    match err {
        AppError::Http(e) => CycleError::Transport(e.to_string()),
        other => CycleError::Unexpected(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use tempfile::TempDir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::services::DeliveryStatus;
    use crate::utils::http;

    /// Two listing containers: "111" carries the excluded keyword
    /// "tausch", "222" is clean.
    const PAGE: &str = r#"
        <html><body>
        <article data-id="111">
            <h2>WG Zimmer Tausch gesucht</h2>
            <a href="/s-anzeige/111">details</a>
        </article>
        <article data-id="222">
            <h2>Schönes Zimmer</h2>
            <a href="/s-anzeige/222">details</a>
            <p>Nette WG in ruhiger Lage</p>
        </article>
        </body></html>
    "#;

    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
        fail_all: bool,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
                fail_all: false,
            }
        }

        fn failing() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
                fail_all: true,
            }
        }

        fn sent(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Notify for RecordingNotifier {
        async fn send(&self, text: &str) -> DeliveryStatus {
            self.messages.lock().unwrap().push(text.to_string());
            if self.fail_all {
                DeliveryStatus::failed("rejected by test")
            } else {
                DeliveryStatus::delivered()
            }
        }
    }

    struct Fixture {
        config: Config,
        client: reqwest::Client,
        parser: ListingParser,
        filter: ExclusionFilter,
        notifier: RecordingNotifier,
        store: SeenStore,
        _tmp: TempDir,
    }

    impl Fixture {
        fn new(url: &str) -> Self {
            Self::with_notifier(url, RecordingNotifier::new())
        }

        fn with_notifier(url: &str, notifier: RecordingNotifier) -> Self {
            let tmp = TempDir::new().unwrap();
            let mut config = Config::default();
            config.watch.url = url.to_string();
            config.paths.seen_ids_file =
                tmp.path().join("seen_ids.json").display().to_string();

            Self {
                client: http::create_client(&config.http).unwrap(),
                parser: ListingParser::new("https://example.test").unwrap(),
                filter: ExclusionFilter::new(&config.filter.excluded_keywords),
                notifier,
                store: SeenStore::new(&config.paths.seen_ids_file),
                config,
                _tmp: tmp,
            }
        }

        async fn run(&self, seen: &mut SeenSet) -> CycleOutcome {
            let ctx = CycleContext {
                config: &self.config,
                client: &self.client,
                parser: &self.parser,
                filter: &self.filter,
                notifier: &self.notifier,
                store: &self.store,
            };
            run_cycle(&ctx, seen).await
        }
    }

    async fn serve(body: &str, status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_new_and_excluded_listings() {
        let server = serve(PAGE, 200).await;
        let fixture = Fixture::new(&server.uri());
        let mut seen = SeenSet::default();

        let outcome = fixture.run(&mut seen).await;

        assert!(outcome.fetched);
        assert_eq!(outcome.http_status, Some(200));
        assert_eq!(outcome.candidate_count, 2);
        assert_eq!(outcome.new_count, 1);
        assert_eq!(outcome.excluded_count, 1);
        assert!(outcome.error.is_none());

        // Both ids marked seen, the excluded one included
        assert!(seen.contains("111"));
        assert!(seen.contains("222"));

        // Exactly one notification, for the clean listing
        let sent = fixture.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Schönes Zimmer"));
        assert!(sent[0].contains("https://example.test/s-anzeige/222"));
    }

    #[tokio::test]
    async fn test_seen_set_is_persisted_after_cycle() {
        let server = serve(PAGE, 200).await;
        let fixture = Fixture::new(&server.uri());
        let mut seen = SeenSet::default();

        fixture.run(&mut seen).await;

        let reloaded = fixture.store.load().await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("111"));
        assert!(reloaded.contains("222"));
    }

    #[tokio::test]
    async fn test_rerun_of_same_document_sends_nothing() {
        let server = serve(PAGE, 200).await;
        let fixture = Fixture::new(&server.uri());
        let mut seen = SeenSet::default();

        fixture.run(&mut seen).await;
        let second = fixture.run(&mut seen).await;

        assert_eq!(second.new_count, 0);
        assert_eq!(second.excluded_count, 0);
        assert_eq!(seen.len(), 2);
        assert_eq!(fixture.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_non_200_leaves_state_untouched() {
        let server = serve("service unavailable", 503).await;
        let fixture = Fixture::new(&server.uri());
        let mut seen = SeenSet::default();

        let outcome = fixture.run(&mut seen).await;

        assert!(!outcome.fetched);
        assert_eq!(outcome.http_status, Some(503));
        assert_eq!(outcome.error, Some(CycleError::HttpStatus(503)));
        assert_eq!(outcome.new_count, 0);
        assert!(seen.is_empty());
        assert!(fixture.notifier.sent().is_empty());

        // No save happened either
        let reloaded = fixture.store.load().await.unwrap();
        assert!(reloaded.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_sends_error_notification() {
        // Nothing listens on this port
        let fixture = Fixture::new("http://127.0.0.1:9/listings");
        let mut seen = SeenSet::default();

        let outcome = fixture.run(&mut seen).await;

        assert!(matches!(outcome.error, Some(CycleError::Transport(_))));
        assert!(seen.is_empty());

        let sent = fixture.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("⚠️"));
    }

    #[tokio::test]
    async fn test_failed_send_does_not_block_siblings() {
        let page = r#"
            <article data-id="1"><h2>Zimmer eins</h2><a href="/a/1">x</a></article>
            <article data-id="2"><h2>Zimmer zwei</h2><a href="/a/2">x</a></article>
        "#;
        let server = serve(page, 200).await;
        let fixture = Fixture::with_notifier(&server.uri(), RecordingNotifier::failing());
        let mut seen = SeenSet::default();

        let outcome = fixture.run(&mut seen).await;

        assert_eq!(outcome.new_count, 2);
        assert!(outcome.error.is_none());
        assert_eq!(fixture.notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_save_failure_does_not_abort_cycle() {
        let server = serve(PAGE, 200).await;
        let mut fixture = Fixture::new(&server.uri());

        // Point the store below a regular file so the write must fail
        let blocker = fixture._tmp.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        fixture.store = SeenStore::new(blocker.join("seen_ids.json"));

        let mut seen = SeenSet::default();
        let outcome = fixture.run(&mut seen).await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.new_count, 1);
        assert_eq!(seen.len(), 2);
    }
}
