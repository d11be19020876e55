//! Offline keyword classifier.
//!
//! Answers with the same JSON intent object the remote service is prompted
//! to produce, so the intent parser treats both adapters alike. Used when no
//! API key is configured and in end-to-end tests.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::domain::ports::{TextUnderstanding, TextUnderstandingError};

struct KeywordPatterns {
    mentions_user: Regex,
    create: Regex,
    update: Regex,
    delete: Regex,
    list: Regex,
    get: Regex,
    uuid: Regex,
    explicit_id: Regex,
    named: Regex,
    first_name: Regex,
    last_name: Regex,
    email: Regex,
    password: Regex,
    count: Regex,
}

static PATTERNS: OnceLock<KeywordPatterns> = OnceLock::new();

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern)
        .unwrap_or_else(|error| panic!("keyword pattern {pattern:?} failed to compile: {error}"))
}

fn patterns() -> &'static KeywordPatterns {
    PATTERNS.get_or_init(|| KeywordPatterns {
        mentions_user: compile(r"(?i)\busers?\b"),
        create: compile(r"(?i)\b(create|add|register)\b"),
        update: compile(r"(?i)\b(update|change|modify|rename|set)\b"),
        delete: compile(r"(?i)\b(delete|remove|drop)\b"),
        list: compile(r"(?i)\b(list|enumerate)\b|\b(all|every)\s+(the\s+)?users?\b"),
        get: compile(r"(?i)\b(get|find|fetch|show|lookup|look\s+up)\b"),
        uuid: compile(
            r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b",
        ),
        explicit_id: compile(r"(?i)\bid\b\s*[:=]?\s*([A-Za-z0-9_-]+)"),
        named: compile(r"(?i)\bnamed\s+([A-Za-z][A-Za-z'-]*)\s+([A-Za-z][A-Za-z'-]*)"),
        first_name: compile(r"(?i)\bfirst\s*name\s+(?:to\s+|is\s+|of\s+)?([A-Za-z][A-Za-z'-]*)"),
        last_name: compile(r"(?i)\b(?:last\s*name|surname)\s+(?:to\s+|is\s+|of\s+)?([A-Za-z][A-Za-z'-]*)"),
        email: compile(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*"),
        password: compile(r"(?i)\bpassword\s+(?:to\s+|is\s+|of\s+)?(\S+)"),
        count: compile(r"(?i)\b(\d+)\b"),
    })
}

/// Deterministic regex classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordTextUnderstanding;

impl KeywordTextUnderstanding {
    /// Classify `message` into an intent object.
    ///
    /// # Examples
    /// ```
    /// use user_intents::outbound::text::KeywordTextUnderstanding;
    ///
    /// let intent = KeywordTextUnderstanding.classify("list 2 users");
    /// assert_eq!(intent["operation"], "ListN");
    /// assert_eq!(intent["parameters"]["n"], 2);
    /// ```
    pub fn classify(&self, message: &str) -> Value {
        let patterns = patterns();
        let mut parameters = Map::new();
        if !patterns.mentions_user.is_match(message) {
            return intent_object("Unknown", parameters);
        }

        let operation = if patterns.create.is_match(message) {
            insert_names(patterns, message, &mut parameters);
            insert_credentials(patterns, message, &mut parameters);
            "Create"
        } else if patterns.update.is_match(message) {
            insert_id(patterns, message, &mut parameters);
            insert_names(patterns, message, &mut parameters);
            insert_credentials(patterns, message, &mut parameters);
            "Update"
        } else if patterns.delete.is_match(message) {
            insert_id(patterns, message, &mut parameters);
            "Delete"
        } else if let Some(id) = find_id(patterns, message) {
            if patterns.get.is_match(message) || !patterns.list.is_match(message) {
                parameters.insert("id".to_owned(), Value::from(id));
                "GetOne"
            } else {
                insert_count(patterns, message, &mut parameters);
                "ListN"
            }
        } else if patterns.list.is_match(message) || patterns.get.is_match(message) {
            insert_count(patterns, message, &mut parameters);
            "ListN"
        } else {
            "Unknown"
        };

        if operation == "Unknown" {
            parameters.clear();
        }
        intent_object(operation, parameters)
    }
}

fn intent_object(operation: &str, parameters: Map<String, Value>) -> Value {
    json!({
        "operation": operation,
        "entity": "user",
        "parameters": parameters,
    })
}

fn clean(token: &str) -> String {
    token
        .trim_end_matches(['.', ',', ';', '!', '?', ')'])
        .to_owned()
}

fn find_id(patterns: &KeywordPatterns, message: &str) -> Option<String> {
    patterns
        .uuid
        .find(message)
        .map(|found| found.as_str().to_owned())
        .or_else(|| {
            patterns
                .explicit_id
                .captures(message)
                .and_then(|captures| captures.get(1))
                .map(|found| clean(found.as_str()))
        })
}

fn insert_id(patterns: &KeywordPatterns, message: &str, parameters: &mut Map<String, Value>) {
    if let Some(id) = find_id(patterns, message) {
        parameters.insert("id".to_owned(), Value::from(id));
    }
}

fn insert_names(patterns: &KeywordPatterns, message: &str, parameters: &mut Map<String, Value>) {
    if let Some(captures) = patterns.named.captures(message) {
        if let (Some(first), Some(last)) = (captures.get(1), captures.get(2)) {
            parameters.insert("fName".to_owned(), Value::from(first.as_str()));
            parameters.insert("lName".to_owned(), Value::from(last.as_str()));
        }
    }
    if let Some(first) = capture(&patterns.first_name, message) {
        parameters.insert("fName".to_owned(), Value::from(first));
    }
    if let Some(last) = capture(&patterns.last_name, message) {
        parameters.insert("lName".to_owned(), Value::from(last));
    }
}

fn insert_credentials(
    patterns: &KeywordPatterns,
    message: &str,
    parameters: &mut Map<String, Value>,
) {
    if let Some(email) = patterns.email.find(message) {
        parameters.insert("email".to_owned(), Value::from(clean(email.as_str())));
    }
    if let Some(password) = capture(&patterns.password, message) {
        parameters.insert("password".to_owned(), Value::from(password));
    }
}

fn insert_count(patterns: &KeywordPatterns, message: &str, parameters: &mut Map<String, Value>) {
    if let Some(n) = capture(&patterns.count, message).and_then(|raw| raw.parse::<i64>().ok()) {
        parameters.insert("n".to_owned(), Value::from(n));
    }
}

fn capture(pattern: &Regex, message: &str) -> Option<String> {
    pattern
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|found| clean(found.as_str()))
}

#[async_trait]
impl TextUnderstanding for KeywordTextUnderstanding {
    async fn complete(
        &self,
        _system_prompt: &str,
        message: &str,
    ) -> Result<String, TextUnderstandingError> {
        serde_json::to_string(&self.classify(message))
            .map_err(|err| TextUnderstandingError::decode(err.to_string()))
    }
}
