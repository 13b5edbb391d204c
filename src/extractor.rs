use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::models::{AvailabilityVerdict, CheckTarget, PageSnapshot};
use crate::utils::error::{AppError, Result};

/// Cart button text shown when the item is sold out. Compared case-insensitively.
pub const OUT_OF_STOCK_SENTINEL: &str = "Out of stock";

pub fn compile_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Case-sensitive substring match of the wanted item name in a card's text.
pub fn contains_target_text(fragment_text: &str, target_text: &str) -> bool {
    fragment_text.contains(target_text)
}

/// True when the (already trimmed) cart text says the item is sold out.
/// Case folding is ASCII-only.
pub fn is_out_of_stock_sentinel(text: &str) -> bool {
    text.eq_ignore_ascii_case(OUT_OF_STOCK_SENTINEL)
}

fn text_content(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Finds the wanted product card in a container snapshot and reads its cart
/// button to decide whether the item can be bought.
pub struct AvailabilityExtractor {
    item_selector: Selector,
    availability_selector: Selector,
    target_text: String,
}

impl AvailabilityExtractor {
    pub fn new(target: &CheckTarget) -> Result<Self> {
        Ok(Self {
            item_selector: compile_selector(&target.item_selector)?,
            availability_selector: compile_selector(&target.availability_selector)?,
            target_text: target.target_item_text.clone(),
        })
    }

    fn parse(&self, snapshot: &PageSnapshot) -> Result<Html> {
        if snapshot.is_empty() {
            return Err(AppError::ParseFailure {
                message: "snapshot is empty".to_string(),
            });
        }
        Ok(Html::parse_fragment(snapshot.html()))
    }

    pub fn extract(&self, snapshot: &PageSnapshot) -> AvailabilityVerdict {
        let document = match self.parse(snapshot) {
            Ok(document) => document,
            Err(e) => {
                return AvailabilityVerdict::ExtractionError {
                    message: e.to_string(),
                };
            }
        };

        // First card in document order wins; later cards are never looked at.
        let Some((index, card)) = document
            .select(&self.item_selector)
            .enumerate()
            .find(|(_, card)| contains_target_text(&text_content(card), &self.target_text))
        else {
            warn!(
                target_text = %self.target_text,
                "No product card contains the target item text; check selectors"
            );
            return AvailabilityVerdict::ItemNotFound;
        };
        debug!(card_index = index, "Found target item card");

        // Text of every matching node in the card, joined in document order.
        let nodes: Vec<ElementRef<'_>> = card.select(&self.availability_selector).collect();
        let status_text = (!nodes.is_empty()).then(|| {
            nodes
                .iter()
                .map(text_content)
                .collect::<String>()
                .trim()
                .to_string()
        });

        match status_text {
            None => {
                warn!("Availability element missing from target card, assuming unavailable");
                AvailabilityVerdict::Unavailable {
                    reason: "availability element not found".to_string(),
                }
            }
            Some(text) if text.is_empty() => AvailabilityVerdict::Unavailable {
                reason: "availability text is empty".to_string(),
            },
            Some(text) if is_out_of_stock_sentinel(&text) => {
                AvailabilityVerdict::Unavailable { reason: text }
            }
            Some(text) => {
                debug!(status_text = %text, "Target item looks purchasable");
                AvailabilityVerdict::Available { status_text: text }
            }
        }
    }
}

/// One-shot extraction that also folds selector errors into the verdict.
pub fn extract(snapshot: &PageSnapshot, target: &CheckTarget) -> AvailabilityVerdict {
    match AvailabilityExtractor::new(target) {
        Ok(extractor) => extractor.extract(snapshot),
        Err(e) => AvailabilityVerdict::ExtractionError {
            message: e.to_string(),
        },
    }
}
