//! Message handling - Event classification and command parsing

pub mod parser;
pub mod router;

pub use parser::QuotedArgs;
pub use router::{Route, Router, HELP_COMMAND};
