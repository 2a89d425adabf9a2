//! Platform adapters - Inbound webhook, outbound delivery, console dev mode

pub mod console;
pub mod groupme;
