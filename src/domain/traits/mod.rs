//! Domain traits - Abstractions for infrastructure implementations

pub mod handler;
pub mod outbox;

pub use handler::{Handler, Subscriptions};
pub use outbox::{Outbox, SendApi};
