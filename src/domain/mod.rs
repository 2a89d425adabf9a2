//! Domain layer - Core business objects and the seams to infrastructure
//! 
//! This layer contains:
//! - Entities: Rules, inbound events, group tables
//! - Traits: Abstractions for handlers and outbound delivery

pub mod entities;
pub mod traits;
