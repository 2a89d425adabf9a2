//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Keyword rule persistence
//! - Adapters: Platform integrations (GroupMe, console)

pub mod adapters;
pub mod config;
pub mod storage;
