use async_trait::async_trait;
use crate::application::errors::BotError;

/// Outbox trait - fire-and-forget delivery of a reply to a group.
///
/// Implementations must return immediately; delivery failures are only
/// reported through logging.
pub trait Outbox: Send + Sync {
    fn send(&self, group_id: &str, text: &str);
}

/// SendApi trait - abstraction for the messaging platform's post endpoint
#[async_trait]
pub trait SendApi: Send + Sync {
    /// Post `text` as the bot identified by `bot_id`
    async fn post(&self, bot_id: &str, text: &str) -> Result<(), BotError>;
}
