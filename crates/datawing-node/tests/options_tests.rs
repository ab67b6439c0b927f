//! Option loading against a mock Datawing service
//!
//! Covers the envelope handling of both option endpoints: ordering, the
//! tagged remote-error result, and malformed bodies.

use datawing_node::prelude::*;
use datawing_node::{GAME_OPTIONS_PATH, USER_OPTIONS_PATH};
use datawing_test_utils::{error_envelope, games_envelope, users_envelope, MockDatawing, Reply};
use pretty_assertions::assert_eq;
use serde_json::json;

fn client_for(mock: &MockDatawing) -> DatawingClient {
    DatawingClient::new(DatawingConfig::new().with_base_url(mock.base_url())).unwrap()
}

#[tokio::test]
async fn games_formatted_in_order() {
    let mock = MockDatawing::builder()
        .games(Reply::json(&games_envelope(&[(1234, "Foo"), (7, "Alpha")])))
        .spawn()
        .await;
    let client = client_for(&mock);

    let outcome = client.load_games().await.unwrap();
    assert!(outcome.is_loaded());
    assert_eq!(outcome.labels(), vec!["Foo[1234]", "Alpha[7]"]);
    assert_eq!(
        outcome.into_choices(),
        vec![
            OptionChoice::new("Foo[1234]", "1234"),
            OptionChoice::new("Alpha[7]", "7"),
        ]
    );
}

#[tokio::test]
async fn users_formatted_in_order() {
    let mock = MockDatawing::builder()
        .users(Reply::json(&users_envelope(&["bob", "alice"])))
        .spawn()
        .await;
    let client = client_for(&mock);

    let outcome = client.load_users().await.unwrap();
    assert_eq!(outcome.labels(), vec!["bob", "alice"]);
}

#[tokio::test]
async fn options_post_empty_object() {
    let mock = MockDatawing::builder().spawn().await;
    let client = client_for(&mock);

    client.load_games().await.unwrap();
    client.load_users().await.unwrap();

    assert_eq!(
        mock.option_requests().await,
        vec![
            (GAME_OPTIONS_PATH.to_string(), json!({})),
            (USER_OPTIONS_PATH.to_string(), json!({})),
        ]
    );
}

#[tokio::test]
async fn non_200_status_is_remote_error() {
    let mock = MockDatawing::builder()
        .games(Reply::json(&error_envelope(404)))
        .users(Reply::json(&error_envelope(500)))
        .spawn()
        .await;
    let client = client_for(&mock);

    let games = client.load_games().await.unwrap();
    assert_eq!(games, OptionsOutcome::RemoteError { status: 404 });
    assert!(games.labels().is_empty());

    let users = client.load_users().await.unwrap();
    assert_eq!(users.remote_status(), Some(500));
    assert!(users.into_choices().is_empty());
}

#[tokio::test]
async fn http_status_is_not_inspected() {
    // The envelope decides success even when the transport status disagrees.
    let body = games_envelope(&[(1, "A")]).to_string();
    let mock = MockDatawing::builder()
        .games(Reply::raw(503, body))
        .spawn()
        .await;
    let client = client_for(&mock);

    let outcome = client.load_games().await.unwrap();
    assert_eq!(outcome.labels(), vec!["A[1]"]);
}

#[tokio::test]
async fn success_without_list_is_malformed() {
    let mock = MockDatawing::builder()
        .games(Reply::json(&json!({"status": 200})))
        .spawn()
        .await;
    let client = client_for(&mock);

    let err = client.load_games().await.unwrap_err();
    assert!(matches!(err, DatawingError::MalformedResponse { .. }));
}

#[tokio::test]
async fn non_json_body_is_decode_error() {
    let mock = MockDatawing::builder()
        .users(Reply::raw(502, "<html>Bad Gateway</html>"))
        .spawn()
        .await;
    let client = client_for(&mock);

    let err = client.load_users().await.unwrap_err();
    assert!(matches!(err, DatawingError::Decode { .. }));
    assert!(!err.is_network());
}

#[tokio::test]
async fn wrong_record_shape_is_decode_error() {
    let mock = MockDatawing::builder()
        .games(Reply::json(&json!({"status": 200, "data": {"list": [{"title": "x"}]}})))
        .spawn()
        .await;
    let client = client_for(&mock);

    let err = client.load_games().await.unwrap_err();
    assert!(matches!(err, DatawingError::Decode { .. }));
}

#[test]
fn mock_serves_client_endpoints() {
    assert_eq!(datawing_test_utils::GAME_OPTIONS_PATH, GAME_OPTIONS_PATH);
    assert_eq!(datawing_test_utils::USER_OPTIONS_PATH, USER_OPTIONS_PATH);
    assert_eq!(
        datawing_test_utils::MATERIAL_UPLOAD_PATH,
        datawing_node::MATERIAL_UPLOAD_PATH
    );
}
