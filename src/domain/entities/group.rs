use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A chat group the bot is installed in, with the bot id that posts there
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupEntry {
    pub group_id: String,
    pub bot_id: String,
}

impl GroupEntry {
    pub fn new(group_id: impl Into<String>, bot_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            bot_id: bot_id.into(),
        }
    }
}

/// Conversation and management group tables. Read-only after startup.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    conversation: HashMap<String, GroupEntry>,
    management: HashMap<String, GroupEntry>,
}

impl GroupRegistry {
    pub fn new(conversation: Vec<GroupEntry>, management: Vec<GroupEntry>) -> Self {
        let index = |groups: Vec<GroupEntry>| {
            groups
                .into_iter()
                .map(|g| (g.group_id.clone(), g))
                .collect::<HashMap<_, _>>()
        };

        Self {
            conversation: index(conversation),
            management: index(management),
        }
    }

    pub fn is_conversation(&self, group_id: &str) -> bool {
        self.conversation.contains_key(group_id)
    }

    pub fn is_management(&self, group_id: &str) -> bool {
        self.management.contains_key(group_id)
    }

    /// Bot id for a group. Management entries win over conversation entries.
    pub fn bot_id(&self, group_id: &str) -> Option<&str> {
        self.management
            .get(group_id)
            .or_else(|| self.conversation.get(group_id))
            .map(|g| g.bot_id.as_str())
    }

    pub fn conversation_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.conversation.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn management_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.management.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
