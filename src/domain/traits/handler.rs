use crate::domain::entities::InboundEvent;

/// Which event streams a handler wants to receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Subscriptions {
    pub messages: bool,
    pub commands: bool,
}

impl Subscriptions {
    pub fn all() -> Self {
        Self {
            messages: true,
            commands: true,
        }
    }

    pub fn messages() -> Self {
        Self {
            messages: true,
            commands: false,
        }
    }

    pub fn commands() -> Self {
        Self {
            messages: false,
            commands: true,
        }
    }
}

/// Handler trait - a module the router hands events to.
///
/// Both `process_*` methods return `true` when the event was claimed, which
/// stops the router from offering it to later handlers.
pub trait Handler: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Streams this handler registers for
    fn subscriptions(&self) -> Subscriptions;

    /// Handle a plain message from a conversation group
    fn process_message(&self, _event: &InboundEvent) -> bool {
        false
    }

    /// Handle a slash command from a management group
    fn process_command(&self, _event: &InboundEvent) -> bool {
        false
    }

    /// Usage lines shown by `/help`
    fn help_text(&self) -> String;
}
