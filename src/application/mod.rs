//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Handlers: Modules that react to messages and commands
//! - Errors: Domain-specific errors
//! - Messaging: Event routing and command argument parsing

pub mod errors;
pub mod handlers;
pub mod messaging;
