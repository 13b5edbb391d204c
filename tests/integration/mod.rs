// Shared fakes for the integration tests.
// The page renderer and the notifier are the two seams; everything between
// them runs for real.

pub mod orchestrator_tests;

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use stock_watcher::{
    AppError, Notifier, PageRenderer, PageSnapshot, RenderRequest, Result,
    config::{SchedulerConfig, ScraperConfig},
    run_cancellable,
};

pub const CHAT_ID: &str = "555000111";
pub const ITEM: &str = "Steam Deck 512 GB OLED - Valve Certified Refurbished";
pub const PAGE_URL: &str = "https://store.steampowered.com/sale/steamdeckrefurbished";

/// A trimmed-down copy of the sale section markup.
pub fn sale_section(cards: &[(&str, &str)]) -> PageSnapshot {
    let cards: String = cards
        .iter()
        .map(|(title, cart)| {
            format!(
                r#"<div class="salepreviewwidgets_SaleItemBrowserRow_y9MSd ItemCount_1ZmKw">
                     <div class="salepreviewwidgets_StoreSaleWidgetTitle_3jI46">{}</div>
                     <div class="salepreviewwidgets_StoreSalePriceBox_Wh0L8">$439.00</div>
                     <div class="CartBtn_3hQ5t"><span>{}</span></div>
                   </div>"#,
                title, cart
            )
        })
        .collect();
    PageSnapshot::new(format!(r#"<div id="SaleSection_33131">{}</div>"#, cards))
}

pub fn scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        check_interval: Duration::from_secs(30 * 60),
        notify_on_error: false,
    }
}

pub fn scraper_config() -> ScraperConfig {
    ScraperConfig::default()
}

pub enum Page {
    Ready(PageSnapshot),
    NeverLoads,
}

pub struct StubRenderer {
    page: Page,
    calls: AtomicUsize,
}

impl StubRenderer {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&self, _request: &RenderRequest) -> Result<PageSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.page {
            Page::Ready(snapshot) => Ok(snapshot.clone()),
            Page::NeverLoads => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(AppError::RenderFailure("unreachable".into()))
            }
        }
    }
}

/// Holds a blocking-pool thread for the whole render, the way Chrome does.
pub struct BlockingRenderer {
    pub hold: Duration,
    abandoned: Arc<AtomicUsize>,
}

impl BlockingRenderer {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            abandoned: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Renders whose blocking thread noticed it was cancelled.
    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageRenderer for BlockingRenderer {
    async fn render(&self, _request: &RenderRequest) -> Result<PageSnapshot> {
        let hold = self.hold;
        let abandoned = self.abandoned.clone();
        run_cancellable(move |cancel| {
            let outcome = cancel.sleep(hold, "settle delay");
            if outcome.is_err() {
                abandoned.fetch_add(1, Ordering::SeqCst);
            }
            outcome.map(|_| sale_section(&[(ITEM, "Out of stock")]))
        })
        .await
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(to, _)| to.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, text: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_string()));
        Ok(())
    }
}
