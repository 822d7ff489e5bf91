// src/pipeline/watch.rs

//! The indefinite polling loop.

use std::time::Duration;

use chrono::Local;

use crate::error::Result;
use crate::models::Config;
use crate::services::{ExclusionFilter, ListingParser, Notify, TelegramNotifier};
use crate::storage::{SeenSet, SeenStore};
use crate::utils::{http, log, url};

use super::cycle::{CycleContext, CycleOutcome, run_cycle};

/// Owns the collaborators and dedup state for the polling loop.
///
/// Cycles run strictly one after another; the seen set is only ever
/// touched by the cycle in flight.
pub struct Watcher {
    config: Config,
    client: reqwest::Client,
    parser: ListingParser,
    filter: ExclusionFilter,
    notifier: Box<dyn Notify>,
    store: SeenStore,
    seen: SeenSet,
}

impl Watcher {
    /// Build a watcher delivering to Telegram.
    pub async fn new(config: Config) -> Result<Self> {
        let notifier = TelegramNotifier::new(&config.telegram)?;
        Self::with_notifier(config, Box::new(notifier)).await
    }

    /// Build a watcher with a custom notification destination.
    ///
    /// Loads the persisted seen set; a corrupt store is a fatal startup
    /// error so a damaged file cannot silently trigger mass
    /// re-notification.
    pub async fn with_notifier(config: Config, notifier: Box<dyn Notify>) -> Result<Self> {
        let origin = url::origin_of(&config.watch.url)?;
        let client = http::create_client(&config.http)?;
        let parser = ListingParser::new(origin)?;
        let filter = ExclusionFilter::new(&config.filter.excluded_keywords);
        let store = SeenStore::new(&config.paths.seen_ids_file);
        let seen = store.load().await?;

        Ok(Self {
            config,
            client,
            parser,
            filter,
            notifier,
            store,
            seen,
        })
    }

    /// Ids seen so far.
    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Run one poll cycle.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let ctx = CycleContext {
            config: &self.config,
            client: &self.client,
            parser: &self.parser,
            filter: &self.filter,
            notifier: self.notifier.as_ref(),
            store: &self.store,
        };
        run_cycle(&ctx, &mut self.seen).await
    }

    /// Pause before the next cycle: the nominal interval, or the backoff
    /// interval after any cycle failure.
    fn wait_after(&self, outcome: &CycleOutcome) -> Duration {
        if outcome.error.is_some() {
            self.config.watch.backoff()
        } else {
            self.config.watch.interval()
        }
    }

    /// Poll indefinitely, backing off after failed cycles, until Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        log::header("WG listing watcher");
        log::info(&format!("Watching {}", self.config.watch.url));
        log::info(&format!(
            "Excluded keywords: {}",
            self.filter.keywords().join(", ")
        ));
        log::info(&format!("Previously seen ids: {}", self.seen.len()));

        let startup = format!(
            "✅ WG watcher started at {}",
            Local::now().format("%H:%M:%S")
        );
        let delivery = self.notifier.send(&startup).await;
        if !delivery.success {
            log::warn(&format!("Startup notification not delivered: {delivery}"));
        }

        loop {
            let outcome = self.run_cycle().await;

            let wait = self.wait_after(&outcome);
            log::info(&format!("Next scan in {}s", wait.as_secs()));

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = tokio::signal::ctrl_c() => {
                    log::info("Shutdown signal received, stopping watcher");
                    break;
                }
            }
        }

        Ok(())
    }
}
