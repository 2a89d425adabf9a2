//! Domain entities - Core business objects with no external dependencies

pub mod event;
pub mod group;
pub mod rule;

pub use event::{InboundEvent, USER_SENDER};
pub use group::{GroupEntry, GroupRegistry};
pub use rule::{Rule, RuleFile, Upsert};
