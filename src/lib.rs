pub mod config;
pub mod extractor;
pub mod models;
pub mod notifiers;
pub mod renderer;
pub mod scheduler;
pub mod signals;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use extractor::{AvailabilityExtractor, extract};
pub use models::{AvailabilityVerdict, CheckTarget, NotificationEvent, PageSnapshot};
pub use notifiers::{Notifier, TelegramNotifier};
pub use renderer::{CancelFlag, ChromeRenderer, PageRenderer, RenderRequest, run_cancellable};
pub use scheduler::PollOrchestrator;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
