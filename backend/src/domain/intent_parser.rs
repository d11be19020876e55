//! Intent Parser: classify a free-text message into an [`Intent`].
//!
//! One call to the text-understanding service per message. Service failures
//! surface as [`IntentParseError`]; replies that cannot be read as an intent
//! for the user entity resolve to [`OperationKind::Unknown`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::intent::{Intent, OperationKind, USER_ENTITY};
use super::ports::{TextUnderstanding, TextUnderstandingError};

/// Instructions sent with every message.
pub const INTENT_SYSTEM_PROMPT: &str = r#"You translate requests about user records into JSON.
Reply with exactly one JSON object and nothing else:
{"operation": "<GetOne|ListN|Create|Update|Delete|Unknown>", "entity": "user", "parameters": {...}}

Parameter names:
- GetOne: "id"
- ListN: "n" (integer; omit to list everyone)
- Create: "fName", "lName", "email", "password"
- Update: "id" plus any of "fName", "lName", "email", "password" that should change
- Delete: "id"

Only include parameters the user actually stated. If the request is not about
users or names no supported operation, reply {"operation": "Unknown", "entity": "user", "parameters": {}}."#;

/// Failure to obtain a classification from the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentParseError {
    /// The text-understanding call failed.
    #[error(transparent)]
    Service(#[from] TextUnderstandingError),
}

#[derive(Debug, Deserialize)]
struct IntentDto {
    operation: String,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    parameters: Map<String, Value>,
}

/// Classifies messages through an injected [`TextUnderstanding`] client.
#[derive(Clone)]
pub struct IntentParser {
    service: Arc<dyn TextUnderstanding>,
}

impl IntentParser {
    /// Wrap a text-understanding client.
    pub fn new(service: Arc<dyn TextUnderstanding>) -> Self {
        Self { service }
    }

    /// Classify `message`.
    ///
    /// Blank messages resolve to [`OperationKind::Unknown`] without calling
    /// the service.
    ///
    /// # Errors
    ///
    /// Returns [`IntentParseError::Service`] when the service call fails.
    pub async fn parse(&self, message: &str) -> Result<Intent, IntentParseError> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Ok(Intent::unknown());
        }

        let reply = self
            .service
            .complete(INTENT_SYSTEM_PROMPT, trimmed)
            .await
            .inspect_err(|err| warn!(code = err.code(), error = %err, "text understanding call failed"))?;

        Ok(interpret_reply(&reply))
    }
}

/// Read a classifier reply as an intent, falling back to `Unknown`.
///
/// Tolerates code fences and prose around the JSON object.
///
/// # Examples
/// ```
/// use user_intents::domain::{OperationKind, intent_parser::interpret_reply};
///
/// let intent = interpret_reply("```json\n{\"operation\":\"Delete\",\"parameters\":{\"id\":\"42\"}}\n```");
/// assert_eq!(intent.operation(), OperationKind::Delete);
/// assert_eq!(interpret_reply("no idea").operation(), OperationKind::Unknown);
/// ```
pub fn interpret_reply(reply: &str) -> Intent {
    let Some(candidate) = extract_json_object(reply) else {
        debug!("classifier reply held no JSON object");
        return Intent::unknown();
    };

    let dto: IntentDto = match serde_json::from_str(candidate) {
        Ok(dto) => dto,
        Err(err) => {
            debug!(error = %err, "classifier reply was not an intent object");
            return Intent::unknown();
        }
    };

    if let Some(entity) = dto.entity.as_deref().filter(|entity| !is_user_entity(entity)) {
        debug!(entity, "classifier reply targets an unsupported entity");
        return Intent::unknown();
    }

    let Some(operation) = OperationKind::from_label(&dto.operation) else {
        debug!(operation = %dto.operation, "classifier reply names an unsupported operation");
        return Intent::unknown();
    };

    Intent::new(operation, normalise_parameters(dto.parameters))
}

fn is_user_entity(entity: &str) -> bool {
    let trimmed = entity.trim();
    trimmed.eq_ignore_ascii_case(USER_ENTITY) || trimmed.eq_ignore_ascii_case("users")
}

fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| reply.get(start..=end)).flatten()
}

/// Map loose parameter spellings onto schema names and flatten `usrInfo`.
fn normalise_parameters(raw: Map<String, Value>) -> BTreeMap<String, Value> {
    let mut parameters = BTreeMap::new();
    for (key, value) in raw {
        match (canonical_parameter(&key), value) {
            (None, Value::Object(nested)) if is_user_info_key(&key) => {
                for (nested_key, nested_value) in nested {
                    let name = canonical_parameter(&nested_key).unwrap_or(nested_key);
                    parameters.entry(name).or_insert(nested_value);
                }
            }
            (Some(name), value) => {
                parameters.insert(name, value);
            }
            (None, value) => {
                parameters.insert(key, value);
            }
        }
    }
    parameters
}

fn canonical_parameter(key: &str) -> Option<String> {
    let folded: String = key
        .chars()
        .filter(|c| !matches!(c, '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect();
    let name = match folded.as_str() {
        "id" | "userid" => "id",
        "n" | "limit" | "count" => "n",
        "fname" | "firstname" => "fName",
        "lname" | "lastname" | "surname" => "lName",
        "email" | "emailaddress" => "email",
        "password" => "password",
        _ => return None,
    };
    Some(name.to_owned())
}

fn is_user_info_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "usrinfo" | "userinfo" | "user" | "fields"
    )
}

#[cfg(test)]
mod tests {
    //! Classification coverage using mock and fixture services.

    use mockall::predicate::{always, eq};
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::{FixtureTextUnderstanding, MockTextUnderstanding};

    fn parser_replying(reply: &str) -> IntentParser {
        IntentParser::new(Arc::new(FixtureTextUnderstanding::replying(reply)))
    }

    #[tokio::test]
    async fn reads_a_create_reply() {
        let parser = parser_replying(
            r#"{"operation":"Create","entity":"user","parameters":{"fName":"Alice","lName":"Smith","email":"a@x.com","password":"p1"}}"#,
        );

        let intent = parser.parse("create Alice").await.expect("parse");

        assert_eq!(intent.operation(), OperationKind::Create);
        assert_eq!(intent.parameter("fName"), Some(&json!("Alice")));
        assert_eq!(intent.parameter("password"), Some(&json!("p1")));
    }

    #[tokio::test]
    async fn blank_messages_skip_the_service() {
        let mut service = MockTextUnderstanding::new();
        service.expect_complete().never();
        let parser = IntentParser::new(Arc::new(service));

        let intent = parser.parse("   ").await.expect("parse");

        assert_eq!(intent, Intent::unknown());
    }

    #[tokio::test]
    async fn forwards_the_trimmed_message_with_the_prompt() {
        let mut service = MockTextUnderstanding::new();
        service
            .expect_complete()
            .with(eq(INTENT_SYSTEM_PROMPT), eq("list users"))
            .times(1)
            .returning(|_, _| Ok(r#"{"operation":"ListN","parameters":{}}"#.to_owned()));
        let parser = IntentParser::new(Arc::new(service));

        let intent = parser.parse("  list users \n").await.expect("parse");

        assert_eq!(intent.operation(), OperationKind::ListN);
    }

    #[tokio::test]
    async fn service_failures_are_distinguishable() {
        let mut service = MockTextUnderstanding::new();
        service
            .expect_complete()
            .with(always(), always())
            .returning(|_, _| Err(TextUnderstandingError::timeout("30s elapsed")));
        let parser = IntentParser::new(Arc::new(service));

        let result = parser.parse("delete user 1").await;

        assert_eq!(
            result,
            Err(IntentParseError::Service(TextUnderstandingError::timeout(
                "30s elapsed"
            )))
        );
    }

    #[rstest]
    #[case::prose("I think you want to delete someone")]
    #[case::truncated(r#"{"operation":"Delete","parameters":"#)]
    #[case::wrong_entity(r#"{"operation":"GetOne","entity":"order","parameters":{"id":"1"}}"#)]
    #[case::unsupported_operation(r#"{"operation":"Archive","entity":"user","parameters":{}}"#)]
    #[case::missing_operation(r#"{"entity":"user","parameters":{}}"#)]
    fn unreadable_replies_resolve_to_unknown(#[case] reply: &str) {
        assert_eq!(interpret_reply(reply), Intent::unknown());
    }

    #[rstest]
    fn strips_code_fences_and_normalises_names() {
        let reply = "Here you go:\n```json\n{\"operation\":\"update_user\",\"entity\":\"Users\",\"parameters\":{\"userId\":\"u-1\",\"usrInfo\":{\"first_name\":\"Ada\",\"EMAIL\":\"ada@x.com\"}}}\n```";

        let intent = interpret_reply(reply);

        assert_eq!(intent.operation(), OperationKind::Update);
        assert_eq!(
            serde_json::to_value(intent.parameters()).expect("serialise"),
            json!({"id": "u-1", "fName": "Ada", "email": "ada@x.com"})
        );
    }
}
