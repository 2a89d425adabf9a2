//! Handlers - Modules registered with the router

pub mod keyword;

pub use keyword::KeywordHandler;
