//! `/ai` end to end with the offline keyword classifier.

mod support;

use std::sync::Arc;

use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::json;

use support::{CapturedLogs, harness, post_json, post_raw, post_without_body};
use user_intents::domain::query::build_query;
use user_intents::domain::{IntentParser, OperationKind};
use user_intents::outbound::text::KeywordTextUnderstanding;

const CREATE_ALICE: &str = "create a user named Alice Smith with email a@x.com and password p1";

#[actix_web::test]
async fn create_messages_store_a_user() {
    let (state, store) = harness(Arc::new(KeywordTextUnderstanding));

    let (status, body) = post_json(&state, "/ai", &json!({ "message": CREATE_ALICE })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": "Success!",
            "intent": {
                "operation": "Create",
                "entity": "user",
                "parameters": {
                    "fName": "Alice",
                    "lName": "Smith",
                    "email": "a@x.com",
                    "password": "p1",
                },
            },
            "data": { "createUser": true },
        })
    );
    assert_eq!(store.writes(), 1);

    let (status, listed) = post_json(&state, "/ai", &json!({ "message": "list 5 users" })).await;
    assert_eq!(status, StatusCode::OK);
    let users = listed["data"]["listNUsers"].as_array().expect("user list");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["fName"], "Alice");
    assert!(users[0].get("password").is_none());
}

#[actix_web::test]
async fn messages_reach_users_by_id() {
    let (state, _store) = harness(Arc::new(KeywordTextUnderstanding));
    post_json(&state, "/ai", &json!({ "message": CREATE_ALICE })).await;
    let (_, listed) = post_json(&state, "/ai", &json!({ "message": "list users" })).await;
    let id = listed["data"]["listNUsers"][0]["id"]
        .as_str()
        .expect("user id")
        .to_owned();

    let (status, fetched) =
        post_json(&state, "/ai", &json!({ "message": format!("get user with id {id}") })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["intent"]["operation"], "GetOne");
    assert_eq!(fetched["data"]["getUser"]["lName"], "Smith");

    let (status, deleted) =
        post_json(&state, "/ai", &json!({ "message": format!("delete user id {id}") })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"], json!({ "deleteUser": true }));
}

#[rstest]
#[case::zero_length("")]
#[case::json_empty_string(r#""""#)]
#[case::empty_object("{}")]
#[case::blank_message(r#"{"message": ""}"#)]
#[actix_web::test]
async fn bodies_without_a_message_are_rejected(#[case] payload: &str) {
    let (state, store) = harness(Arc::new(KeywordTextUnderstanding));

    let (status, body) = post_raw(&state, "/ai", payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing Message Field In Request Body" }));
    assert_eq!(store.writes(), 0);
}

#[actix_web::test]
async fn requests_without_any_body_are_rejected() {
    let (state, store) = harness(Arc::new(KeywordTextUnderstanding));

    let (status, body) = post_without_body(&state, "/ai").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing Message Field In Request Body" }));
    assert_eq!(store.writes(), 0);
}

#[actix_web::test]
async fn passwords_stay_out_of_the_logs() {
    let logs = CapturedLogs::default();
    let _guard = logs.install();
    let (state, store) = harness(Arc::new(KeywordTextUnderstanding));

    let (status, _) = post_json(
        &state,
        "/ai",
        &json!({
            "message": "create a user named Alice Smith with email a@x.com and password SuperSecret99",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        &state,
        "/graphql",
        &json!({
            "operation": "mutation",
            "fields": [{
                "name": "createUser",
                "arguments": {
                    "usrInfo": {
                        "fName": "Bob",
                        "lName": "Jones",
                        "email": "b@x.com",
                        "password": "SuperSecret99",
                    },
                },
            }],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.writes(), 2);

    let captured = logs.contents();
    assert!(captured.contains("query document built"), "{captured}");
    assert!(captured.contains("[REDACTED]"), "{captured}");
    assert!(!captured.contains("SuperSecret99"), "{captured}");
}

#[actix_web::test]
async fn unrelated_messages_fail_translation_without_writes() {
    let (state, store) = harness(Arc::new(KeywordTextUnderstanding));

    let (status, body) =
        post_json(&state, "/ai", &json!({ "message": "what's the weather like?" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Intent Translation Error!");
    assert_eq!(body["intent"]["operation"], "Unknown");
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn classified_create_messages_build_a_create_mutation() {
    let parser = IntentParser::new(Arc::new(KeywordTextUnderstanding));

    let intent = parser.parse(CREATE_ALICE).await.expect("keyword replies parse");
    let document = build_query(&intent).expect("create intents translate");

    assert_eq!(intent.operation(), OperationKind::Create);
    assert!(document.to_string().contains("createUser"));
}
