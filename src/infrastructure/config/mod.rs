//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;
use crate::domain::entities::{GroupEntry, GroupRegistry};

/// Port used when neither the config nor `PORT` sets one
pub const DEFAULT_PORT: u16 = 8080;

/// Bot configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub server: ServerConfig,
    /// GroupMe access token used for posting
    pub access_token: Option<String>,
    /// JSON rule file; without it rules live in memory only
    pub keyword_file: Option<PathBuf>,
    /// Groups whose messages are matched against keyword rules
    pub conversation_groups: Vec<GroupEntry>,
    /// Groups whose slash messages are admin commands
    pub management_groups: Vec<GroupEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults plus environment overrides
    pub fn load_env() -> Self {
        Config::default().with_env()
    }

    /// Apply `PORT`, `GROUPME_ACCESS_TOKEN` and `KEYWORD_FILE` from the environment
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value {:?}", port),
            }
        }

        if let Some(token) = lookup("GROUPME_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }

        if let Some(file) = lookup("KEYWORD_FILE") {
            self.keyword_file = Some(PathBuf::from(file));
        }

        self
    }

    /// Access token, or empty with a warning if none is configured
    pub fn access_token(&self) -> &str {
        match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => token,
            _ => {
                tracing::warn!("Access token not specified");
                ""
            }
        }
    }

    pub fn group_registry(&self) -> GroupRegistry {
        GroupRegistry::new(self.conversation_groups.clone(), self.management_groups.clone())
    }

    /// Sample configuration printed by `init-config`
    pub fn example() -> Self {
        Self {
            server: ServerConfig::default(),
            access_token: Some("YOUR_ACCESS_TOKEN".to_string()),
            keyword_file: Some(PathBuf::from("keywords.json")),
            conversation_groups: vec![GroupEntry::new("CONVERSATION_GROUP_ID", "CONVERSATION_BOT_ID")],
            management_groups: vec![GroupEntry::new("MANAGEMENT_GROUP_ID", "MANAGEMENT_BOT_ID")],
        }
    }
}
