pub mod telegram;

use async_trait::async_trait;

use crate::utils::error::Result;

pub use telegram::TelegramNotifier;

/// Outbound message channel. One call is one delivery attempt; callers decide
/// what a failure means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> Result<()>;
}
