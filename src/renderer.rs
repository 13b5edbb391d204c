use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::models::{CheckTarget, PageSnapshot};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub url: String,
    /// Element that must exist before the snapshot is taken. Its outer HTML is the snapshot.
    pub ready_selector: String,
    /// Fixed wait after navigation so client-side rendering can fill the page.
    pub settle_delay: Duration,
    pub timeout: Duration,
}

impl RenderRequest {
    pub fn for_target(target: &CheckTarget, config: &ScraperConfig) -> Self {
        Self {
            url: target.page_url.clone(),
            ready_selector: target.container_selector.clone(),
            settle_delay: config.settle_delay,
            timeout: config.page_load_timeout,
        }
    }
}

/// Longest a blocking render goes without looking at its cancel flag.
const WAIT_SLICE: Duration = Duration::from_millis(250);

/// Tells a render running on the blocking pool that nobody is waiting for it anymore.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self, step: &str) -> Result<()> {
        if self.is_cancelled() {
            return Err(AppError::RenderFailure(format!("Render cancelled during {}", step)));
        }
        Ok(())
    }

    /// Blocks for `duration`, waking every slice to bail out once cancelled.
    pub fn sleep(&self, duration: Duration, step: &str) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.check(step)?;
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            std::thread::sleep(remaining.min(WAIT_SLICE));
        }
    }

    /// Repeats a short blocking `attempt` until it succeeds, `timeout` runs out
    /// or the render is cancelled. The last attempt's error is reported.
    pub fn retry_until<T>(
        &self,
        step: &str,
        timeout: Duration,
        mut attempt: impl FnMut() -> anyhow::Result<T>,
    ) -> Result<T> {
        let deadline = Instant::now() + timeout;
        loop {
            self.check(step)?;
            match attempt() {
                Ok(value) => return Ok(value),
                Err(e) if Instant::now() >= deadline => {
                    return Err(AppError::RenderFailure(format!("{}: {}", step, e)));
                }
                Err(e) => {
                    debug!(step, error = %e, "Still waiting");
                    self.sleep(WAIT_SLICE.min(deadline.saturating_duration_since(Instant::now())), step)?;
                }
            }
        }
    }
}

struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Runs `job` on the blocking pool. Dropping the returned future, as a timeout
/// or shutdown does, cancels the flag handed to `job`.
pub async fn run_cancellable<T, F>(job: F) -> Result<T>
where
    F: FnOnce(&CancelFlag) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let cancel = CancelFlag::default();
    let _guard = CancelOnDrop(cancel.clone());

    tokio::task::spawn_blocking(move || job(&cancel))
        .await
        .map_err(|e| AppError::RenderFailure(format!("Render task aborted: {}", e)))?
}

/// Loads a page, runs its scripts and hands back a snapshot of one region.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> Result<PageSnapshot>;
}

/// Launches a fresh headless Chrome per render and kills it when done.
pub struct ChromeRenderer {
    config: ScraperConfig,
}

impl ChromeRenderer {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    fn launch_options(config: &ScraperConfig, request: &RenderRequest) -> Result<LaunchOptions<'static>> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .idle_browser_timeout(request.timeout + request.settle_delay)
            .args(vec![
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| AppError::RenderFailure(format!("Failed to create launch options: {}", e)))?;

        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        Ok(launch_options)
    }

    fn render_blocking(
        config: &ScraperConfig,
        request: &RenderRequest,
        cancel: &CancelFlag,
    ) -> Result<PageSnapshot> {
        let failure = |step: &str, e: anyhow::Error| AppError::RenderFailure(format!("{}: {}", step, e));

        let launch_options = Self::launch_options(config, request)?;
        let browser = Browser::new(launch_options).map_err(|e| failure("Failed to launch browser", e))?;
        cancel.check("browser launch")?;
        let tab = browser.new_tab().map_err(|e| failure("Failed to create tab", e))?;
        // Page waits run one slice at a time so a cancel is noticed quickly.
        tab.set_default_timeout(WAIT_SLICE);

        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| failure("Failed to set user agent", e))?;
        tab.navigate_to(&request.url)
            .map_err(|e| failure("Navigation failed", e))?;
        cancel.retry_until("Page load failed", request.timeout, || {
            tab.wait_until_navigated().map(|_| ())
        })?;

        cancel.sleep(request.settle_delay, "settle delay")?;

        let container = cancel.retry_until(
            &format!("Wait for selector '{}' failed", request.ready_selector),
            request.timeout,
            || tab.wait_for_element_with_custom_timeout(&request.ready_selector, WAIT_SLICE),
        )?;
        let html = container
            .get_content()
            .map_err(|e| failure("Failed to read container HTML", e))?;

        if let Err(e) = tab.close(true) {
            debug!(error = %e, "Tab close failed; browser is killed on drop");
        }
        Ok(PageSnapshot::new(html))
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<PageSnapshot> {
        let start_time = Instant::now();
        let config = self.config.clone();
        let request_owned = request.clone();

        // The browser process dies with the blocking thread's `Browser`.
        let snapshot = run_cancellable(move |cancel| {
            let result = Self::render_blocking(&config, &request_owned, cancel);
            if cancel.is_cancelled() {
                warn!(url = %request_owned.url, "Render abandoned, browser closed");
            }
            result
        })
        .await?;

        debug!(
            url = %request.url,
            bytes = snapshot.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Retrieved container HTML"
        );
        Ok(snapshot)
    }
}
