use serde::{Deserialize, Serialize};
use url::Url;

use crate::extractor::compile_selector;
use crate::utils::error::{AppError, Result};

pub const DEFAULT_TARGET_URL: &str = "https://store.steampowered.com/sale/steamdeckrefurbished";
pub const DEFAULT_CONTAINER_SELECTOR: &str = "#SaleSection_33131";
pub const DEFAULT_ITEM_SELECTOR: &str = r#"div[class*="ItemCount_1"]"#;
pub const DEFAULT_AVAILABILITY_SELECTOR: &str = r#"div[class*="CartBtn"] span"#;
pub const DEFAULT_TARGET_ITEM_TEXT: &str = "Steam Deck 512 GB OLED - Valve Certified Refurbished";

/// The one page and the one item on it that the watcher cares about.
///
/// Built once at startup and shared read-only with the renderer, the
/// extractor and the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckTarget {
    pub page_url: String,
    /// Region of the page that gets rendered and snapshotted.
    pub container_selector: String,
    /// Matches one product card inside the container.
    pub item_selector: String,
    /// Matches the cart button text inside a product card.
    pub availability_selector: String,
    /// Case-sensitive text identifying the wanted card.
    pub target_item_text: String,
}

impl Default for CheckTarget {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_TARGET_URL.to_string(),
            container_selector: DEFAULT_CONTAINER_SELECTOR.to_string(),
            item_selector: DEFAULT_ITEM_SELECTOR.to_string(),
            availability_selector: DEFAULT_AVAILABILITY_SELECTOR.to_string(),
            target_item_text: DEFAULT_TARGET_ITEM_TEXT.to_string(),
        }
    }
}

impl CheckTarget {
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.page_url)
            .map_err(|e| AppError::Config(format!("Invalid target URL '{}': {}", self.page_url, e)))?;

        for selector in [
            &self.container_selector,
            &self.item_selector,
            &self.availability_selector,
        ] {
            compile_selector(selector)?;
        }

        if self.target_item_text.trim().is_empty() {
            return Err(AppError::Config("Target item text must not be empty".into()));
        }

        Ok(())
    }
}
