use serde::{Deserialize, Serialize};

/// A keyword rule: a pattern and the reply sent when it matches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rule {
    #[serde(rename = "regExp")]
    pub pattern: String,
    pub response: String,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            response: response.into(),
        }
    }
}

/// On-disk shape of the rule file: `{ "keywords": [ { "regExp", "response" } ] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleFile {
    #[serde(default)]
    pub keywords: Vec<Rule>,
}

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}
