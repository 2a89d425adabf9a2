use serde::{Deserialize, Deserializer};

/// Sender type the platform uses for human members
pub const USER_SENDER: &str = "user";

/// One inbound webhook callback.
///
/// Only the fields the router needs are kept; the platform sends many more
/// (name, avatar_url, attachments, ...) and serde drops them.
/// Absent and `null` fields both read as empty; attachment-only posts
/// arrive with `"text": null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InboundEvent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub group_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sender_type: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl InboundEvent {
    pub fn new(group_id: impl Into<String>, text: impl Into<String>, sender_type: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            text: text.into(),
            sender_type: sender_type.into(),
        }
    }

    /// Event sent by a human member of `group_id`
    pub fn from_user(group_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(group_id, text, USER_SENDER)
    }

    pub fn is_from_user(&self) -> bool {
        self.sender_type == USER_SENDER
    }

    pub fn is_command(&self) -> bool {
        self.text.starts_with('/')
    }
}
