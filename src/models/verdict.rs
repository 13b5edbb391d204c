use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one availability check. Never carried over to the next tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AvailabilityVerdict {
    Available { status_text: String },
    Unavailable { reason: String },
    ItemNotFound,
    ExtractionError { message: String },
}

impl AvailabilityVerdict {
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityVerdict::Available { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            AvailabilityVerdict::Available { .. } => "available",
            AvailabilityVerdict::Unavailable { .. } => "unavailable",
            AvailabilityVerdict::ItemNotFound => "item_not_found",
            AvailabilityVerdict::ExtractionError { .. } => "extraction_error",
        }
    }
}

impl fmt::Display for AvailabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityVerdict::Available { status_text } => write!(f, "available ({})", status_text),
            AvailabilityVerdict::Unavailable { reason } => write!(f, "unavailable ({})", reason),
            AvailabilityVerdict::ItemNotFound => write!(f, "item not found"),
            AvailabilityVerdict::ExtractionError { message } => write!(f, "extraction error: {}", message),
        }
    }
}
