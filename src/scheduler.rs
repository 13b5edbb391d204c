use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::{SchedulerConfig, ScraperConfig};
use crate::extractor::AvailabilityExtractor;
use crate::models::{AvailabilityVerdict, CheckTarget, NotificationEvent, PageSnapshot};
use crate::notifiers::Notifier;
use crate::renderer::{PageRenderer, RenderRequest};
use crate::utils::error::{AppError, Result};

/// Where a tick currently is. A failure in any phase sends the tick back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Idle,
    Rendering,
    Extracting,
    Deciding,
    Notifying,
}

/// Drives render -> extract -> decide -> notify on a fixed delay.
///
/// Nothing survives from one tick to the next except the [`CheckTarget`].
/// Errors never escape the loop; they are logged and the next tick runs on
/// schedule.
pub struct PollOrchestrator {
    target: Arc<CheckTarget>,
    extractor: AvailabilityExtractor,
    renderer: Arc<dyn PageRenderer>,
    notifier: Arc<dyn Notifier>,
    recipient: String,
    request: RenderRequest,
    config: SchedulerConfig,
}

impl PollOrchestrator {
    pub fn new(
        target: Arc<CheckTarget>,
        renderer: Arc<dyn PageRenderer>,
        notifier: Arc<dyn Notifier>,
        recipient: impl Into<String>,
        config: SchedulerConfig,
        scraper: &ScraperConfig,
    ) -> Result<Self> {
        let extractor = AvailabilityExtractor::new(&target)?;
        let request = RenderRequest::for_target(&target, scraper);

        Ok(Self {
            target,
            extractor,
            renderer,
            notifier,
            recipient: recipient.into(),
            request,
            config,
        })
    }

    /// Announces startup, checks immediately, then keeps checking every
    /// `check_interval` until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// Ticks never overlap. A tick that outlives the interval pushes the next
    /// one back instead of triggering a burst of catch-up ticks.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            url = %self.target.page_url,
            item = %self.target.target_item_text,
            interval = %humantime::format_duration(self.config.check_interval),
            "Starting availability monitor"
        );

        self.notify_best_effort(NotificationEvent::startup(
            &self.recipient,
            &self.target,
            self.config.check_interval,
        ))
        .await;

        // The first tick completes immediately.
        let mut ticker = time::interval(self.config.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                verdict = self.run_once() => {
                    debug!(phase = ?TickPhase::Idle, verdict = %verdict, "Tick finished");
                }
                _ = shutdown.changed() => {
                    warn!("Shutdown requested, abandoning in-flight check");
                    break;
                }
            }
        }

        info!("Availability monitor stopped");
    }

    /// Runs one full tick and returns its verdict.
    pub async fn run_once(&self) -> AvailabilityVerdict {
        let verdict = match self.render().await {
            Ok(snapshot) => {
                debug!(phase = ?TickPhase::Extracting, bytes = snapshot.len(), "Extracting availability");
                self.extractor.extract(&snapshot)
            }
            Err(e) => AvailabilityVerdict::ExtractionError {
                message: e.to_string(),
            },
        };

        self.decide(&verdict).await;
        verdict
    }

    async fn render(&self) -> Result<PageSnapshot> {
        debug!(phase = ?TickPhase::Rendering, url = %self.request.url, "Rendering page");

        match time::timeout(self.request.timeout, self.renderer.render(&self.request)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::RenderTimeout {
                timeout: self.request.timeout,
                selector: self.request.ready_selector.clone(),
            }),
        }
    }

    async fn decide(&self, verdict: &AvailabilityVerdict) {
        debug!(phase = ?TickPhase::Deciding, verdict = verdict.label());

        match verdict {
            AvailabilityVerdict::Available { status_text } => {
                info!(
                    item = %self.target.target_item_text,
                    url = %self.target.page_url,
                    status_text = %status_text,
                    ">>> Target item is AVAILABLE"
                );
                self.notify_best_effort(NotificationEvent::available(&self.recipient, &self.target))
                    .await;
            }
            AvailabilityVerdict::Unavailable { reason } => {
                info!(item = %self.target.target_item_text, reason = %reason, "Target item not available yet");
            }
            AvailabilityVerdict::ItemNotFound => {
                warn!(
                    item = %self.target.target_item_text,
                    selector = %self.target.item_selector,
                    "Target item missing from page"
                );
            }
            AvailabilityVerdict::ExtractionError { message } => {
                error!(error = %message, "Availability check failed");
                if self.config.notify_on_error {
                    self.notify_best_effort(NotificationEvent::check_failed(
                        &self.recipient,
                        &self.target,
                        message,
                    ))
                    .await;
                }
            }
        }
    }

    /// Makes exactly one delivery attempt. Failure is logged and dropped.
    pub async fn notify_best_effort(&self, event: NotificationEvent) -> bool {
        debug!(phase = ?TickPhase::Notifying, kind = ?event.kind, "Sending notification");

        match self.notifier.send(&event.recipient, &event.message).await {
            Ok(()) => {
                info!(kind = ?event.kind, "Notification delivered");
                true
            }
            Err(e) => {
                warn!(kind = ?event.kind, error = %e, "Notification delivery failed, not retrying");
                false
            }
        }
    }
}
