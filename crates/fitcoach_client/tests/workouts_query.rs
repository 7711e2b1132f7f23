use chrono::{TimeZone, Utc};
use fitcoach_client::http_client::PostgrestStore;
use fitcoach_client::retry::RetryPolicy;
use fitcoach_client::{FitcoachError, FitnessStore};
use secrecy::SecretString;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store(server: &MockServer) -> PostgrestStore {
    PostgrestStore::new(&server.uri(), SecretString::new("anon".into()))
}

#[tokio::test]
async fn weekly_range_query_sends_filters_and_auth_headers() {
    let server = MockServer::start().await;
    let body = serde_json::json!([
        {
            "id": 1,
            "user_id": "u1",
            "type": "strength",
            "start_time": "2025-03-03T09:00:00+00:00",
            "end_time": "2025-03-03T10:00:00+00:00",
            "notes": null,
            "workout_exercises": [{"sets": 3, "reps": 10, "weight": 20}]
        },
        {
            "id": 2,
            "user_id": "u1",
            "type": "cardio",
            "start_time": "2025-03-04T18:30:00+00:00",
            "end_time": null,
            "notes": "easy",
            "workout_exercises": []
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/workouts"))
        .and(query_param("select", "*,workout_exercises(sets,reps,weight)"))
        .and(query_param("user_id", "eq.u1"))
        .and(query_param("start_time", "gte.2025-03-03T00:00:00.000Z"))
        .and(query_param("start_time", "lte.2025-03-09T23:59:59.999Z"))
        .and(header("apikey", "anon"))
        .and(header("authorization", "Bearer anon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 59).unwrap() + chrono::Duration::milliseconds(999);
    let workouts = store(&server)
        .get_workouts_in_range("u1", start, end)
        .await
        .expect("workouts");

    assert_eq!(workouts.len(), 2);
    assert_eq!(workouts[0].id, "1");
    assert_eq!(workouts[0].duration_millis(), Some(60 * 60 * 1000));
    assert_eq!(workouts[0].total_volume(), 600.0);
    assert_eq!(workouts[1].notes.as_deref(), Some("easy"));
    assert!(workouts[1].end_time.is_none());
}

#[tokio::test]
async fn recent_workouts_default_to_five_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/workouts"))
        .and(query_param("order", "start_time.desc"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "b", "user_id": "u1", "type": "hiit", "start_time": "2025-03-05T07:00:00Z"},
            {"id": "a", "user_id": "u1", "type": "strength", "start_time": "2025-03-01T07:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let recent = store(&server)
        .get_recent_workouts("u1", None)
        .await
        .expect("recent");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, "b");
    assert_eq!(recent[0].workout_type, "hiit");
}

#[tokio::test]
async fn workout_detail_includes_exercise_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/workouts"))
        .and(query_param("id", "eq.42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": 42,
                "user_id": "u1",
                "type": "strength",
                "start_time": "2025-03-05T07:00:00Z",
                "workout_exercises": [
                    {"sets": 5, "reps": 5, "weight": 100, "exercise": {"name": "Squat", "category": "strength"}}
                ]
            }
        ])))
        .mount(&server)
        .await;

    let w = store(&server).get_workout("42").await.expect("workout");
    let entry = &w.exercise_entries[0];
    assert_eq!(entry.exercise.as_ref().map(|e| e.name.as_str()), Some("Squat"));
    assert_eq!(entry.volume(), 2500.0);
}

#[tokio::test]
async fn workout_detail_missing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let err = store(&server).get_workout("nope").await.unwrap_err();
    assert!(matches!(err, FitcoachError::NotFound(_)));
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/workouts"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{\"message\":\"JWT expired\"}"))
        .mount(&server)
        .await;

    let err = store(&server)
        .get_recent_workouts("u1", Some(3))
        .await
        .unwrap_err();
    assert!(matches!(err, FitcoachError::Auth(ref body) if body.contains("JWT expired")));
}

#[tokio::test]
async fn transient_read_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/workouts"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let store = store(&server).with_retry_policy(RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
    });
    let recent = store.get_recent_workouts("u1", None).await.expect("retried");
    assert!(recent.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_rows_surface_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/workouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "user_id": "u1", "type": "x", "start_time": "not a time"}
        ])))
        .mount(&server)
        .await;

    let err = store(&server)
        .get_recent_workouts("u1", None)
        .await
        .unwrap_err();
    assert!(matches!(err, FitcoachError::Decode(_)));
}
