//! Console adapter for development/testing

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::errors::BotError;
use crate::application::messaging::Router;
use crate::domain::entities::InboundEvent;
use crate::domain::traits::Outbox;

/// Prints replies to stdout instead of posting them
#[derive(Debug, Default)]
pub struct ConsoleOutbox;

impl ConsoleOutbox {
    pub fn new() -> Self {
        Self
    }
}

impl Outbox for ConsoleOutbox {
    fn send(&self, group_id: &str, text: &str) {
        println!("[BOT {}] {}", group_id, text);
    }
}

/// Feed stdin lines through `router` as user messages from `group_id`
pub async fn run(router: Arc<Router>, group_id: String) -> Result<(), BotError> {
    tracing::info!("Starting console bot (dev mode) in group {}", group_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| BotError::Internal(format!("stdin: {}", e)))?
    {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let route = router.process(&InboundEvent::from_user(group_id.as_str(), text));
        tracing::debug!("Routed as {:?}", route);
    }

    tracing::info!("Console closed");
    Ok(())
}
