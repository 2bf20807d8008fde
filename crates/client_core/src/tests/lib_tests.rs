use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use shared::error::ErrorCode;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq)]
struct RecordedResolution {
    target_type: String,
    target_id: String,
    suggestion_id: String,
    body: Value,
}

#[derive(Clone, Default)]
struct ServerState {
    resolutions: Arc<Mutex<Vec<RecordedResolution>>>,
}

fn suggestion_json(id: &str, kind: &str) -> Value {
    match kind {
        "add_question" => json!({
            "suggestion_id": id,
            "suggestion_type": "add_question",
            "target_type": "skill",
            "target_id": "skill_1",
            "status": "review",
            "author_name": "ada",
            "last_updated_msecs": 1_600_000_000_000.0,
            "change": {
                "cmd": "create_new_fully_specified_question",
                "question_dict": {
                    "id": "question_1",
                    "question_state_data": {
                        "content": {"content_id": "content", "html": "<p>What is 2 + 2?</p>"}
                    },
                    "language_code": "en",
                    "version": 1,
                    "linked_skill_ids": ["skill_1"]
                },
                "skill_id": "skill_1",
                "skill_difficulty": 0.3
            }
        }),
        _ => json!({
            "suggestion_id": id,
            "suggestion_type": "translate_content",
            "target_type": "exploration",
            "target_id": "exp_1",
            "status": "accepted",
            "author_name": "grace",
            "change": {
                "cmd": "add_translation",
                "state_name": "Introduction",
                "content_id": "content",
                "language_code": "hi",
                "content_html": "<p>Hello</p>",
                "translation_html": "<p>Namaste</p>"
            }
        }),
    }
}

fn listing_json(listing: &str, kind: &str) -> Value {
    json!({
        "suggestions": [suggestion_json(&format!("{listing}.{kind}"), kind)],
        "target_id_to_opportunity_dict": {
            "skill_1": {
                "skill_description": "Addition",
                "skill_rubrics": [{"difficulty": "Easy", "explanation": "Single digits"}]
            },
            "exp_1": {
                "topic_name": "Greetings",
                "story_title": "Journey",
                "chapter_title": "Arrival"
            }
        }
    })
}

async fn handle_submitted(Path((_target_type, kind)): Path<(String, String)>) -> Json<Value> {
    Json(listing_json("submitted", &kind))
}

async fn handle_reviewable(Path((_target_type, kind)): Path<(String, String)>) -> Json<Value> {
    Json(listing_json("reviewable", &kind))
}

async fn handle_resolution(
    State(state): State<ServerState>,
    Path((target_type, target_id, suggestion_id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if suggestion_id == "locked" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "You do not have credentials to review this suggestion.",
                "status_code": 401
            })),
        );
    }
    state.resolutions.lock().await.push(RecordedResolution {
        target_type,
        target_id,
        suggestion_id,
        body,
    });
    (StatusCode::OK, Json(json!({})))
}

async fn handle_user_info() -> Json<Value> {
    Json(json!({"user_is_logged_in": true, "username": "reviewer", "is_moderator": false}))
}

async fn handle_rights() -> Json<Value> {
    Json(json!({
        "can_review_questions": true,
        "can_review_translation_for_language_codes": ["hi", "fr"],
        "can_review_voiceover_for_language_codes": []
    }))
}

async fn handle_broken() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "")
}

async fn spawn_dashboard_server() -> (ContributionClient, ServerState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route(
            "/getsubmittedsuggestions/:target_type/:suggestion_type",
            get(handle_submitted),
        )
        .route(
            "/getreviewablesuggestions/:target_type/:suggestion_type",
            get(handle_reviewable),
        )
        .route(
            "/suggestionactionhandler/:target_type/:target_id/:suggestion_id",
            put(handle_resolution),
        )
        .route("/userinfohandler", get(handle_user_info))
        .route("/usercommunityrightsdatahandler", get(handle_rights))
        .route("/broken/userinfohandler", get(handle_broken))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let http = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("http client");
    let client =
        ContributionClient::with_http_client(http, &format!("http://{addr}")).expect("client");
    (client, state)
}

fn ids(set: &ContributionSet) -> Vec<String> {
    set.iter().map(|entry| entry.id().to_string()).collect()
}

#[tokio::test]
async fn each_listing_hits_its_own_endpoint() {
    let (client, _state) = spawn_dashboard_server().await;

    let created_questions = client
        .user_created_question_suggestions()
        .await
        .expect("created questions");
    let created_translations = client
        .user_created_translation_suggestions()
        .await
        .expect("created translations");
    let reviewable_questions = client
        .reviewable_question_suggestions()
        .await
        .expect("reviewable questions");
    let reviewable_translations = client
        .reviewable_translation_suggestions()
        .await
        .expect("reviewable translations");

    assert_eq!(ids(&created_questions), vec!["submitted.add_question"]);
    assert_eq!(ids(&created_translations), vec!["submitted.translate_content"]);
    assert_eq!(ids(&reviewable_questions), vec!["reviewable.add_question"]);
    assert_eq!(
        ids(&reviewable_translations),
        vec!["reviewable.translate_content"]
    );

    match reviewable_questions.iter().next().expect("entry") {
        ContributionEntry::Question(question) => {
            assert_eq!(question.details.skill_description, "Addition");
            assert_eq!(question.details.skill_rubrics[0].explanation, "Single digits");
            assert!(question.suggestion.last_updated.is_some());
        }
        other => panic!("unexpected entry: {other:?}"),
    };
}

#[tokio::test]
async fn question_resolution_targets_skill_handler() {
    let (client, state) = spawn_dashboard_server().await;

    let resolved = client
        .resolve_suggestion_to_skill(
            &TargetId::new("skill_1"),
            &SuggestionId::new("skill.skill_1.abc"),
            ReviewAction::Accept,
            "Clear wording",
            Some(0.6),
        )
        .await
        .expect("resolve");
    assert_eq!(resolved, SuggestionId::new("skill.skill_1.abc"));

    let recorded = state.resolutions.lock().await.clone();
    assert_eq!(
        recorded,
        vec![RecordedResolution {
            target_type: "skill".into(),
            target_id: "skill_1".into(),
            suggestion_id: "skill.skill_1.abc".into(),
            body: json!({
                "action": "accept",
                "review_message": "Clear wording",
                "skill_difficulty": 0.6
            }),
        }]
    );
}

#[tokio::test]
async fn translation_rejection_targets_exploration_handler() {
    let (client, state) = spawn_dashboard_server().await;

    client
        .resolve_suggestion_to_exploration(
            &TargetId::new("exp 1"),
            &SuggestionId::new("exploration.exp_1.xyz"),
            ReviewAction::Reject,
            "Mistranslated idiom",
            None,
        )
        .await
        .expect("resolve");

    let recorded = state.resolutions.lock().await.clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].target_type, "exploration");
    assert_eq!(recorded[0].target_id, "exp 1");
    assert_eq!(
        recorded[0].body,
        json!({"action": "reject", "review_message": "Mistranslated idiom"})
    );
}

#[tokio::test]
async fn backend_error_body_becomes_api_error() {
    let (client, state) = spawn_dashboard_server().await;

    let err = client
        .resolve_suggestion_to_skill(
            &TargetId::new("skill_1"),
            &SuggestionId::new("locked"),
            ReviewAction::Accept,
            "",
            Some(0.3),
        )
        .await
        .expect_err("must fail");

    assert!(err.is_auth_failure(), "unexpected error: {err}");
    match err {
        ClientError::Api { source, .. } => {
            assert_eq!(source.code, ErrorCode::Unauthorized);
            assert!(source.message.contains("credentials"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(state.resolutions.lock().await.is_empty());
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status_reason() {
    let (client, _state) = spawn_dashboard_server().await;
    let broken = ContributionClient::with_http_client(
        reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("http client"),
        &format!("{}broken", client.base_url()),
    )
    .expect("client");

    let err = broken.user_info().await.expect_err("must fail");
    match err {
        ClientError::Api { endpoint, source } => {
            assert_eq!(endpoint, "/broken/userinfohandler");
            assert_eq!(source.code, ErrorCode::Internal);
            assert_eq!(source.message, "Bad Gateway");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn reads_user_info_and_reviewer_rights() {
    let (client, _state) = spawn_dashboard_server().await;

    let info = client.user_info().await.expect("user info");
    assert!(info.user_is_logged_in);
    assert_eq!(info.username.as_deref(), Some("reviewer"));

    let rights = client.community_rights().await.expect("rights");
    assert!(rights.can_review_questions);
    assert_eq!(
        rights.can_review_translation_for_language_codes,
        vec!["hi", "fr"]
    );
}

#[test]
fn rejects_unusable_server_urls() {
    assert!(matches!(
        ContributionClient::with_http_client(reqwest::Client::new(), "not a url"),
        Err(ClientError::InvalidServerUrl { .. })
    ));
    assert!(matches!(
        ContributionClient::with_http_client(reqwest::Client::new(), "mailto:reviewer@example.org"),
        Err(ClientError::InvalidServerUrl { .. })
    ));
}

#[test]
fn endpoints_keep_base_path_and_escape_segments() {
    let client =
        ContributionClient::with_http_client(reqwest::Client::new(), "https://example.org/api")
            .expect("client");
    assert_eq!(
        client.endpoint(&["userinfohandler"]).as_str(),
        "https://example.org/api/userinfohandler"
    );
    assert_eq!(
        client
            .endpoint(&["suggestionactionhandler", "exploration", "exp 1", "s/1"])
            .path(),
        "/api/suggestionactionhandler/exploration/exp%201/s%2F1"
    );
}
