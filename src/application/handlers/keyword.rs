//! Keyword auto-replies and the admin commands that maintain them

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::errors::{CommandError, StorageError};
use crate::application::messaging::parser;
use crate::domain::entities::{InboundEvent, Upsert};
use crate::domain::traits::{Handler, Outbox, Subscriptions};
use crate::infrastructure::storage::RuleStore;

pub const ADD_COMMAND: &str = "/addmessage";
pub const LIST_COMMAND: &str = "/listmessages";
pub const REMOVE_COMMAND: &str = "/removemessage";

const ADD_USAGE: &str = r#"/addmessage "<keyword phrase>" "<response>""#;
const REMOVE_USAGE: &str = r#"/removemessage "<keyword phrase>""#;

pub const MESSAGE_ADDED: &str = "Message added.";
pub const MESSAGE_UPDATED: &str = "Message updated.";
pub const MESSAGE_DELETED: &str = "Message deleted.";
pub const NO_MESSAGES: &str = "No messages added.";
pub const KEYWORD_NOT_FOUND: &str = "Keyword phrase not found.";

/// Replies to conversation messages that match a stored keyword rule, and
/// handles `/addmessage`, `/listmessages` and `/removemessage`.
pub struct KeywordHandler {
    store: Mutex<RuleStore>,
    outbox: Arc<dyn Outbox>,
}

impl KeywordHandler {
    pub fn new(store: RuleStore, outbox: Arc<dyn Outbox>) -> Self {
        Self {
            store: Mutex::new(store),
            outbox,
        }
    }

    /// Every edit runs while holding this guard, so an upsert or remove and
    /// the snapshot it persists cannot interleave with another edit.
    fn store(&self) -> MutexGuard<'_, RuleStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add_message(&self, text: &str) -> Result<&'static str, CommandError> {
        let (pattern, response) = parser::parse_two(text).ok_or(CommandError::Syntax { usage: ADD_USAGE })?;
        let outcome = self.store().upsert(pattern, response);
        upsert_reply(outcome)
    }

    fn list_messages(&self) -> String {
        let store = self.store();
        if store.is_empty() {
            return NO_MESSAGES.to_string();
        }

        let mut listing = String::from("Messages:");
        for (i, rule) in store.list().iter().enumerate() {
            listing.push_str(&format!("\n{}. \"{}\" \"{}\"", i + 1, rule.pattern, rule.response));
        }
        listing
    }

    fn remove_message(&self, text: &str) -> Result<&'static str, CommandError> {
        let pattern = parser::parse_one(text).ok_or(CommandError::Syntax { usage: REMOVE_USAGE })?;

        if self.store().remove(pattern) {
            Ok(MESSAGE_DELETED)
        } else {
            Ok(KEYWORD_NOT_FOUND)
        }
    }

    fn reply(&self, event: &InboundEvent, result: Result<&str, CommandError>) {
        match result {
            Ok(text) => self.outbox.send(&event.group_id, text),
            Err(e) => {
                tracing::info!("Rejected command {:?}: {}", event.text, e);
                self.outbox.send(&event.group_id, &e.to_string());
            }
        }
    }
}

/// Chat reply for an upsert outcome
fn upsert_reply(outcome: Result<Upsert, StorageError>) -> Result<&'static str, CommandError> {
    match outcome {
        Ok(Upsert::Updated) => Ok(MESSAGE_UPDATED),
        Ok(Upsert::Inserted) => Ok(MESSAGE_ADDED),
        Err(StorageError::InvalidPattern { reason, .. }) => Err(CommandError::InvalidPattern(reason)),
        Err(e) => {
            tracing::error!("Failed to store keyword rule: {}", e);
            Err(CommandError::Storage)
        }
    }
}

impl Handler for KeywordHandler {
    fn name(&self) -> &str {
        "keyword"
    }

    fn subscriptions(&self) -> Subscriptions {
        Subscriptions::all()
    }

    fn process_message(&self, event: &InboundEvent) -> bool {
        let response = {
            let store = self.store();
            store.find(&event.text).map(|rule| rule.response.clone())
        };

        match response {
            Some(response) => {
                tracing::info!("Found match for keyword");
                self.outbox.send(&event.group_id, &response);
                true
            }
            None => {
                tracing::info!("No keyword matches");
                false
            }
        }
    }

    fn process_command(&self, event: &InboundEvent) -> bool {
        let text = event.text.as_str();

        if text.starts_with(ADD_COMMAND) {
            self.reply(event, self.add_message(text));
        } else if text.starts_with(LIST_COMMAND) {
            self.outbox.send(&event.group_id, &self.list_messages());
        } else if text.starts_with(REMOVE_COMMAND) {
            self.reply(event, self.remove_message(text));
        } else {
            return false;
        }
        true
    }

    fn help_text(&self) -> String {
        format!("{ADD_USAGE}\n{LIST_COMMAND}\n{REMOVE_USAGE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Rule;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Recorder {
        fn last(&self) -> Option<String> {
            self.sent.lock().unwrap().last().map(|(_, text)| text.clone())
        }

        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl Outbox for Recorder {
        fn send(&self, group_id: &str, text: &str) {
            self.sent.lock().unwrap().push((group_id.to_string(), text.to_string()));
        }
    }

    fn handler() -> (KeywordHandler, Arc<Recorder>) {
        let outbox = Arc::new(Recorder::default());
        (KeywordHandler::new(RuleStore::new(), outbox.clone()), outbox)
    }

    fn command(handler: &KeywordHandler, text: &str) -> bool {
        handler.process_command(&InboundEvent::from_user("admin", text))
    }

    #[test]
    fn test_list_on_empty_store() {
        let (handler, outbox) = handler();

        assert!(command(&handler, "/listmessages"));
        assert_eq!(outbox.last().as_deref(), Some(NO_MESSAGES));
    }

    #[test]
    fn test_add_then_update() {
        let (handler, outbox) = handler();

        assert!(command(&handler, r#"/addmessage "hello" "world""#));
        assert_eq!(outbox.last().as_deref(), Some(MESSAGE_ADDED));

        assert!(command(&handler, r#"/addmessage "hello" "there""#));
        assert_eq!(outbox.last().as_deref(), Some(MESSAGE_UPDATED));

        assert_eq!(handler.store().list(), &[Rule::new("hello", "there")]);
    }

    #[test]
    fn test_message_matches_rule() {
        let (handler, outbox) = handler();
        command(&handler, r#"/addmessage "hello" "there""#);

        let handled = handler.process_message(&InboundEvent::from_user("chat", "say HELLO please"));

        assert!(handled);
        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent.last().unwrap(), &("chat".to_string(), "there".to_string()));
    }

    #[test]
    fn test_unmatched_message_is_not_handled() {
        let (handler, outbox) = handler();
        command(&handler, r#"/addmessage "hello" "there""#);
        let before = outbox.count();

        assert!(!handler.process_message(&InboundEvent::from_user("chat", "goodbye")));
        assert_eq!(outbox.count(), before);
    }

    #[test]
    fn test_remove_missing() {
        let (handler, outbox) = handler();

        assert!(command(&handler, r#"/removemessage "missing""#));
        assert_eq!(outbox.last().as_deref(), Some(KEYWORD_NOT_FOUND));
    }

    #[test]
    fn test_remove_existing() {
        let (handler, outbox) = handler();
        command(&handler, r#"/addmessage "hello" "world""#);

        assert!(command(&handler, r#"/removemessage "hello""#));
        assert_eq!(outbox.last().as_deref(), Some(MESSAGE_DELETED));
        assert!(handler.store().is_empty());
    }

    #[test]
    fn test_listing_format() {
        let (handler, outbox) = handler();
        command(&handler, r#"/addmessage "hi" "hello""#);
        command(&handler, r#"/addmessage "bye" "see ya""#);

        command(&handler, "/listmessages");
        assert_eq!(
            outbox.last().unwrap(),
            "Messages:\n1. \"hi\" \"hello\"\n2. \"bye\" \"see ya\""
        );
    }

    #[test]
    fn test_syntax_errors_are_reported() {
        let (handler, outbox) = handler();

        assert!(command(&handler, "/addmessage hello world"));
        assert_eq!(
            outbox.last().unwrap(),
            r#"Invalid Syntax. Usage: /addmessage "<keyword phrase>" "<response>""#
        );

        assert!(command(&handler, r#"/addmessage "hello""#));
        assert!(outbox.last().unwrap().starts_with("Invalid Syntax."));

        assert!(command(&handler, "/removemessage hello"));
        assert_eq!(
            outbox.last().unwrap(),
            r#"Invalid Syntax. Usage: /removemessage "<keyword phrase>""#
        );

        assert!(handler.store().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let (handler, outbox) = handler();

        assert!(command(&handler, r#"/addmessage "(oops" "x""#));
        assert!(outbox.last().unwrap().starts_with("Invalid keyword pattern:"));
        assert!(handler.store().is_empty());
    }

    #[test]
    fn test_storage_failure_is_not_reported_as_bad_pattern() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");

        assert_eq!(upsert_reply(Err(StorageError::Io(io))), Err(CommandError::Storage));
        assert_eq!(
            upsert_reply(Err(StorageError::InvalidPattern {
                pattern: "(".to_string(),
                reason: "unclosed group".to_string(),
            })),
            Err(CommandError::InvalidPattern("unclosed group".to_string()))
        );
        assert_eq!(upsert_reply(Ok(Upsert::Updated)), Ok(MESSAGE_UPDATED));
    }

    #[test]
    fn test_unknown_command_is_not_handled() {
        let (handler, outbox) = handler();

        assert!(!command(&handler, "/help"));
        assert!(!command(&handler, "/weather"));
        assert_eq!(outbox.count(), 0);
    }

    #[test]
    fn test_help_text() {
        let (handler, _) = handler();
        assert_eq!(
            handler.help_text(),
            "/addmessage \"<keyword phrase>\" \"<response>\"\n/listmessages\n/removemessage \"<keyword phrase>\""
        );
    }
}
