//! keyword-bot - GroupMe webhook bot that answers keyword rules
//!
//! Inbound callbacks are classified by [`application::messaging::Router`] and
//! handed to registered [`domain::traits::Handler`]s. The keyword handler
//! keeps its rules in a [`infrastructure::storage::RuleStore`] that is
//! rewritten to a JSON file after every edit.

pub mod application;
pub mod domain;
pub mod infrastructure;
