//! GroupMe adapter - Bot post API and callback webhook

mod webhook;

pub use webhook::{build_app, serve};

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::domain::entities::GroupRegistry;
use crate::domain::traits::{Outbox, SendApi};

/// GroupMe API base URL
const API_BASE: &str = "https://api.groupme.com/v3";

/// Client for the bot post endpoint
pub struct GroupMeApi {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GroupMeApi {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Point the client at another host (local mocks)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn post_url(&self) -> String {
        format!("{}/bots/post", self.base_url)
    }
}

#[async_trait]
impl SendApi for GroupMeApi {
    async fn post(&self, bot_id: &str, text: &str) -> Result<(), BotError> {
        let response = self
            .client
            .post(self.post_url())
            .query(&[("bot_id", bot_id), ("text", text), ("token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("GroupMe API error: {}", response.status())));
        }
        Ok(())
    }
}

/// Outbox that resolves the group's bot id and posts in the background
pub struct GroupMeOutbox {
    api: Arc<dyn SendApi>,
    groups: Arc<GroupRegistry>,
}

impl GroupMeOutbox {
    pub fn new(api: Arc<dyn SendApi>, groups: Arc<GroupRegistry>) -> Self {
        Self { api, groups }
    }

    fn bot_id(&self, group_id: &str) -> String {
        match self.groups.bot_id(group_id) {
            Some(bot_id) => bot_id.to_string(),
            None => {
                tracing::warn!("Corresponding bot id for group id {} not found", group_id);
                String::new()
            }
        }
    }
}

impl Outbox for GroupMeOutbox {
    fn send(&self, group_id: &str, text: &str) {
        let bot_id = self.bot_id(group_id);
        tracing::info!("Sending message. Bot id: {} Text: {}", bot_id, text);

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("Cannot send message outside the runtime: {}", e);
                return;
            }
        };

        let api = self.api.clone();
        let text = text.to_string();
        runtime.spawn(async move {
            match api.post(&bot_id, &text).await {
                Ok(()) => tracing::info!("Message sent successfully"),
                Err(e) => tracing::error!("Failed to send message: {}", e),
            }
        });
    }
}
