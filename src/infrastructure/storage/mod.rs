//! Keyword rule storage backed by a flat JSON file

mod writer;

pub use writer::RuleFileWriter;

use regex_lite::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::path::Path;

use crate::application::errors::StorageError;
use crate::domain::entities::{Rule, RuleFile, Upsert};

/// Compile a rule pattern. Rules always match case-insensitively and in
/// multi-line mode.
pub fn compile_pattern(pattern: &str) -> Result<Regex, StorageError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .map_err(|e| StorageError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Ordered keyword rules plus a compiled matcher per pattern.
///
/// Invariant: `matchers` holds exactly one entry for every pattern in `rules`.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
    matchers: HashMap<String, Regex>,
    writer: Option<RuleFileWriter>,
}

impl RuleStore {
    /// Empty, in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from rules in priority order. Later duplicates of a
    /// pattern overwrite the earlier response.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, StorageError> {
        let mut store = Self::new();
        for rule in rules {
            let matcher = compile_pattern(&rule.pattern)?;
            store.put(rule.pattern, rule.response, matcher);
        }
        Ok(store)
    }

    /// Load rules from `path`. A missing file yields an empty store; a file
    /// that is not valid JSON, or holds an invalid pattern, is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Keyword file {} not found, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };

        let file: RuleFile = serde_json::from_str(&content).map_err(|source| StorageError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::from_rules(file.keywords)?;
        tracing::info!("Loaded {} keyword rules from {}", store.len(), path.display());
        Ok(store)
    }

    /// Persist every change through `writer`
    pub fn with_writer(mut self, writer: RuleFileWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// First rule, in stored order, whose pattern matches `text`
    pub fn find(&self, text: &str) -> Option<&Rule> {
        for rule in &self.rules {
            let Some(matcher) = self.matchers.get(&rule.pattern) else {
                tracing::error!("Pattern {:?} has no compiled matcher", rule.pattern);
                return None;
            };

            if matcher.is_match(text) {
                return Some(rule);
            }
        }
        None
    }

    /// Insert a rule, or replace the response of the rule with the same
    /// pattern text. New rules go last. Persists on success.
    pub fn upsert(&mut self, pattern: impl Into<String>, response: impl Into<String>) -> Result<Upsert, StorageError> {
        let pattern = pattern.into();
        let matcher = compile_pattern(&pattern)?;
        let outcome = self.put(pattern, response.into(), matcher);
        self.persist();
        Ok(outcome)
    }

    /// Remove the rule with exactly this pattern text. Returns `false`, and
    /// writes nothing, if there is none.
    pub fn remove(&mut self, pattern: &str) -> bool {
        let Some(idx) = self.position(pattern) else {
            return false;
        };

        self.rules.remove(idx);
        self.matchers.remove(pattern);
        self.persist();
        true
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.position(pattern).is_some()
    }

    /// Rules in priority order
    pub fn list(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule file document, pretty-printed
    pub fn to_json(&self) -> Result<String, StorageError> {
        let file = RuleFile {
            keywords: self.rules.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Queue a full rewrite of the rule file. Failures are logged by the
    /// writer; the in-memory rules stay as they are.
    pub fn persist(&self) {
        let Some(writer) = &self.writer else {
            return;
        };

        match self.to_json() {
            Ok(json) => writer.submit(json),
            Err(e) => tracing::error!("Failed to serialize keyword rules: {}", e),
        }
    }

    fn position(&self, pattern: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.pattern == pattern)
    }

    fn put(&mut self, pattern: String, response: String, matcher: Regex) -> Upsert {
        self.matchers.insert(pattern.clone(), matcher);
        match self.position(&pattern) {
            Some(idx) => {
                self.rules[idx].response = response;
                Upsert::Updated
            }
            None => {
                self.rules.push(Rule::new(pattern, response));
                Upsert::Inserted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(rules: &[(&str, &str)]) -> RuleStore {
        RuleStore::from_rules(rules.iter().map(|(p, r)| Rule::new(*p, *r)).collect()).unwrap()
    }

    #[test]
    fn test_upsert_then_find() {
        let mut store = RuleStore::new();
        assert_eq!(store.upsert("hello", "world").unwrap(), Upsert::Inserted);

        let rule = store.find("oh hello there").unwrap();
        assert_eq!(rule.response, "world");
    }

    #[test]
    fn test_find_is_case_insensitive_and_multiline() {
        let store = store_with(&[("^ping$", "pong")]);

        assert!(store.find("PING").is_some());
        assert!(store.find("first line\nPing\nlast line").is_some());
        assert!(store.find("pinged").is_none());
    }

    #[test]
    fn test_find_on_empty_store() {
        assert!(RuleStore::new().find("anything").is_none());
    }

    #[test]
    fn test_upsert_existing_keeps_position_and_count() {
        let mut store = store_with(&[("a", "1"), ("b", "2"), ("c", "3")]);

        assert_eq!(store.upsert("b", "two").unwrap(), Upsert::Updated);
        assert_eq!(store.len(), 3);
        assert_eq!(store.list()[1], Rule::new("b", "two"));
    }

    #[test]
    fn test_new_rules_are_matched_last() {
        let mut store = store_with(&[("hello", "first")]);
        store.upsert("hello world", "second").unwrap();

        assert_eq!(store.find("hello world").unwrap().response, "first");
    }

    #[test]
    fn test_first_match_wins() {
        let store = store_with(&[("cat", "meow"), ("c.t", "generic")]);

        assert_eq!(store.find("my cat").unwrap().response, "meow");
        assert_eq!(store.find("my cot").unwrap().response, "generic");
    }

    #[test]
    fn test_remove() {
        let mut store = store_with(&[("hello", "world"), ("bye", "later")]);

        assert!(store.remove("hello"));
        assert_eq!(store.len(), 1);
        assert!(store.find("hello").is_none());
        assert!(!store.matchers.contains_key("hello"));

        assert!(!store.remove("hello"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalid_pattern_leaves_store_untouched() {
        let mut store = store_with(&[("ok", "fine")]);
        let err = store.upsert("(unclosed", "x").unwrap_err();

        assert!(matches!(err, StorageError::InvalidPattern { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.matchers.len(), 1);
    }

    #[test]
    fn test_to_json_is_pretty_printed() {
        let store = store_with(&[("hi", "there")]);
        let json = store.to_json().unwrap();

        assert!(json.contains("\n  \"keywords\": ["));
        assert!(json.contains("\"regExp\": \"hi\""));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::load(dir.path().join("keywords.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(&path, "{ \"keywords\": [").unwrap();

        let err = RuleStore::load(&path).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));
    }

    #[test]
    fn test_load_invalid_pattern_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(&path, r#"{"keywords": [{"regExp": "[", "response": "x"}]}"#).unwrap();

        assert!(matches!(
            RuleStore::load(&path).unwrap_err(),
            StorageError::InvalidPattern { .. }
        ));
    }

    #[tokio::test]
    async fn test_persist_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        let (writer, handle) = RuleFileWriter::spawn(&path);

        let mut store = RuleStore::new().with_writer(writer);
        store.upsert("hello", "world").unwrap();
        store.upsert("bye", "later").unwrap();
        store.upsert("hello", "there").unwrap();
        store.upsert("temp", "gone soon").unwrap();
        assert!(store.remove("temp"));

        let expected = store.list().to_vec();
        drop(store);
        handle.await.unwrap();

        let reloaded = RuleStore::load(&path).unwrap();
        assert_eq!(reloaded.list(), expected.as_slice());
        assert_eq!(reloaded.find("HELLO").unwrap().response, "there");
    }

    #[tokio::test]
    async fn test_remove_missing_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        let (writer, handle) = RuleFileWriter::spawn(&path);

        let mut store = RuleStore::new().with_writer(writer);
        assert!(!store.remove("missing"));

        drop(store);
        handle.await.unwrap();
        assert!(!path.exists());
    }
}
