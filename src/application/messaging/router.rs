//! Event router - Classifies inbound events and hands them to handlers

use std::sync::Arc;

use crate::domain::entities::{GroupRegistry, InboundEvent};
use crate::domain::traits::{Handler, Outbox};

/// Text that triggers the aggregated help reply
pub const HELP_COMMAND: &str = "/help";

const HELP_HEADER: &str = "Management Commands:";

/// Where an event ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not sent by a user
    Ignored,
    /// Slash command from a management group
    Command { handled: bool },
    /// Message from a conversation group
    Message { handled: bool },
    /// Group is in neither table
    Unregistered,
}

/// Routes inbound events to registered handlers.
///
/// Handlers are tried in registration order and the first one that reports
/// the event as handled ends the chain.
pub struct Router {
    groups: Arc<GroupRegistry>,
    outbox: Arc<dyn Outbox>,
    modules: Vec<Arc<dyn Handler>>,
    message_handlers: Vec<Arc<dyn Handler>>,
    command_handlers: Vec<Arc<dyn Handler>>,
}

impl Router {
    pub fn new(groups: Arc<GroupRegistry>, outbox: Arc<dyn Outbox>) -> Self {
        tracing::info!("Listening to messages from groups {:?}", groups.conversation_ids());
        tracing::info!("Listening to management commands from groups {:?}", groups.management_ids());

        Self {
            groups,
            outbox,
            modules: Vec::new(),
            message_handlers: Vec::new(),
            command_handlers: Vec::new(),
        }
    }

    /// Register a handler for the streams it subscribes to
    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        let subs = handler.subscriptions();
        tracing::info!(
            "Registering handler {} (messages: {}, commands: {})",
            handler.name(),
            subs.messages,
            subs.commands
        );

        if subs.messages {
            self.message_handlers.push(handler.clone());
        }
        if subs.commands {
            self.command_handlers.push(handler.clone());
        }
        self.modules.push(handler);
    }

    /// Builder-style [`Router::register`]
    pub fn with_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.register(handler);
        self
    }

    /// Help reply: a header followed by every module's usage lines
    pub fn help_text(&self) -> String {
        let mut help = HELP_HEADER.to_string();
        for module in &self.modules {
            help.push('\n');
            help.push_str(&module.help_text());
        }
        help
    }

    /// Process one inbound event to completion
    pub fn process(&self, event: &InboundEvent) -> Route {
        if !event.is_from_user() {
            tracing::info!("Message not from user ({}), skipping", event.sender_type);
            return Route::Ignored;
        }

        // Answered in every group, registered or not.
        if event.text == HELP_COMMAND {
            self.outbox.send(&event.group_id, &self.help_text());
        }

        if event.is_command() && self.groups.is_management(&event.group_id) {
            let handled = self.command_handlers.iter().any(|h| {
                let handled = h.process_command(event);
                if handled {
                    tracing::debug!("Command handled by {}", h.name());
                }
                handled
            });
            Route::Command { handled }
        } else if self.groups.is_conversation(&event.group_id) {
            let handled = self.message_handlers.iter().any(|h| {
                let handled = h.process_message(event);
                if handled {
                    tracing::debug!("Message handled by {}", h.name());
                }
                handled
            });
            Route::Message { handled }
        } else {
            tracing::warn!("Got callback for unregistered group {:?}", event);
            Route::Unregistered
        }
    }
}
