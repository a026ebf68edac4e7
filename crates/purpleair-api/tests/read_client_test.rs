#![allow(clippy::unwrap_used)]
// Integration tests for `ReadClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use purpleair_api::{
    ApiErrorKind, Average, ClientConfig, Error, HistoryQuery, KeyType, MemberHistoryQuery,
    ReadClient, SensorQuery, SensorsQuery, TimeRange,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ReadClient) {
    let server = MockServer::start().await;
    let config = ClientConfig {
        base_url: format!("{}/v1/", server.uri()),
        ..ClientConfig::default()
    };
    let client = ReadClient::with_config("k1", &config).unwrap();
    (server, client)
}

fn api_error(err: &Error) -> &purpleair_api::ApiError {
    err.as_api()
        .unwrap_or_else(|| panic!("expected an API error, got: {err:?}"))
}

// ── Construction ────────────────────────────────────────────────────

#[tokio::test]
async fn test_construction_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = ClientConfig {
        base_url: format!("{}/v1/", server.uri()),
        ..ClientConfig::default()
    };
    let _client = ReadClient::with_config("k1", &config).unwrap();
}

#[test]
fn test_empty_key_is_configuration_error() {
    let err = ReadClient::new("").unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_whitespace_key_is_accepted() {
    assert!(ReadClient::new(" ").is_ok());
}

#[test]
fn test_zero_cloud_timeout_is_configuration_error() {
    let config = ClientConfig {
        cloud_timeout_secs: 0,
        ..ClientConfig::default()
    };
    let err = ReadClient::with_config("k1", &config).unwrap_err();
    assert!(err.is_configuration());
}

// ── Sensors ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_single_sensor_reading() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sensors/12345"))
        .and(header("X-API-Key", "k1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_version": "V1.0.11-0.0.42",
            "time_stamp": 1_700_000_000,
            "data_time_stamp": 1_699_999_990,
            "sensor": { "sensor_index": 12345, "name": "Backyard", "pm2.5": 9.1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reading = client.sensor(12345, &SensorQuery::default()).await.unwrap();

    assert_eq!(reading.f64_at(&["sensor", "pm2.5"]), Some(9.1));
    assert_eq!(reading.str_at(&["sensor", "name"]), Some("Backyard"));
    assert_eq!(reading.i64("time_stamp"), Some(1_700_000_000));
}

#[tokio::test]
async fn test_multiple_sensors_with_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sensors"))
        .and(query_param("fields", "name,pm2.5"))
        .and(query_param("show_only", "1,2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": ["sensor_index", "name", "pm2.5"],
            "data": [[1, "A", 3.0], [2, "B", 4.5]]
        })))
        .mount(&server)
        .await;

    let query = SensorsQuery {
        show_only: Some(vec![1, 2]),
        ..SensorsQuery::fields(["name", "pm2.5"])
    };
    let rows = client.sensors(&query).await.unwrap();

    assert_eq!(rows.array("data").map(<[_]>::len), Some(2));
}

#[tokio::test]
async fn test_sensors_without_fields_never_leaves_the_process() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.sensors(&SensorsQuery::default()).await.unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_sensor_history_json_and_csv() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sensors/42/history"))
        .and(query_param("average", "60"))
        .and(query_param("start_timestamp", "1700000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sensor_index": 42,
            "fields": ["time_stamp", "pm2.5_atm"],
            "data": [[1_700_000_000, 4.2]]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/sensors/42/history/csv"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("time_stamp,pm2.5_atm\n1700000000,4.2\n"),
        )
        .mount(&server)
        .await;

    let query = HistoryQuery {
        fields: vec!["pm2.5_atm".into()],
        range: TimeRange::between(1_700_000_000_i64, 1_700_086_400_i64),
        average: Some(Average::OneHour),
        ..HistoryQuery::default()
    };

    let history = client.sensor_history(42, &query).await.unwrap();
    assert_eq!(history.u64("sensor_index"), Some(42));

    let csv = client.sensor_history_csv(42, &query).await.unwrap();
    assert!(csv.starts_with("time_stamp,pm2.5_atm"));
}

// ── Groups and members ──────────────────────────────────────────────

#[tokio::test]
async fn test_groups_and_members() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "groups": [{ "id": 7, "name": "Home", "created": 1_700_000_000 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/groups/7/members/99"))
        .and(query_param("fields", "pm2.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "group_id": 7,
            "member_id": 99,
            "sensor": { "pm2.5": 12.0 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/groups/7/members"))
        .and(query_param("fields", "name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "group_id": 7,
            "fields": ["sensor_index", "name"],
            "data": [[99, "Garage"]]
        })))
        .mount(&server)
        .await;

    let groups = client.groups().await.unwrap();
    assert_eq!(groups.array("groups").map(<[_]>::len), Some(1));

    let member = client.member(7, 99, &["pm2.5".to_owned()]).await.unwrap();
    assert_eq!(member.f64_at(&["sensor", "pm2.5"]), Some(12.0));

    let members = client
        .members(7, &SensorsQuery::fields(["name"]))
        .await
        .unwrap();
    assert_eq!(members.u64("group_id"), Some(7));
}

#[tokio::test]
async fn test_group_detail() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/groups/7"))
        .and(header("X-API-Key", "k1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "group_id": 7,
            "members": [{ "id": 99, "sensor_index": 12345, "created": 1_700_000_000 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let group = client.group(7).await.unwrap();
    assert_eq!(group.u64("group_id"), Some(7));
    assert_eq!(group.array("members").map(<[_]>::len), Some(1));
}

#[tokio::test]
async fn test_member_history_json_and_csv() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/groups/7/members/99/history"))
        .and(query_param("fields", "temperature"))
        .and(query_param("average", "1440"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "group_id": 7,
            "member_id": 99,
            "fields": ["time_stamp", "temperature"],
            "data": [[1_700_000_000, 68.0]]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/groups/7/members/99/history/csv"))
        .and(query_param("fields", "temperature"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("time_stamp,temperature\n1700000000,68\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let query = MemberHistoryQuery {
        fields: vec!["temperature".into()],
        average: Some(Average::OneDay),
        ..MemberHistoryQuery::default()
    };

    let history = client.member_history(7, 99, &query).await.unwrap();
    assert_eq!(history.u64("member_id"), Some(99));
    assert_eq!(history.array("data").map(<[_]>::len), Some(1));

    let csv = client.member_history_csv(7, 99, &query).await.unwrap();
    assert_eq!(csv, "time_stamp,temperature\n1700000000,68\n");
}

// ── Key check ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_check_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_version": "V1.0.11-0.0.42",
            "time_stamp": 1_700_000_000,
            "api_key_type": "READ"
        })))
        .mount(&server)
        .await;

    let info = client.check_key().await.unwrap();
    assert_eq!(info.api_key_type, KeyType::Read);
}

#[tokio::test]
async fn test_check_key_reports_wrong_family() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_version": "V1.0.11-0.0.42",
            "time_stamp": 1_700_000_000,
            "api_key_type": "WRITE"
        })))
        .mount(&server)
        .await;

    let err = client.check_key().await.unwrap_err();
    assert!(err.is_configuration(), "got: {err:?}");
    assert!(err.message().contains("WRITE"));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_envelope_becomes_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sensors/1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "api_version": "V1.0.11-0.0.42",
            "time_stamp": 1_700_000_000,
            "error": "ApiKeyInvalidError",
            "description": "The provided api_key was not valid."
        })))
        .mount(&server)
        .await;

    let err = client.sensor(1, &SensorQuery::default()).await.unwrap_err();
    let api = api_error(&err);

    assert_eq!(api.status(), Some(403));
    assert_eq!(
        api.message(),
        "403: ApiKeyInvalidError - The provided api_key was not valid."
    );
}

#[tokio::test]
async fn test_server_error_without_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/groups"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.groups().await.unwrap_err();
    let api = api_error(&err);

    assert_eq!(api.status(), Some(503));
    assert!(!api.message().is_empty());
}

#[tokio::test]
async fn test_malformed_success_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/sensors/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client.sensor(1, &SensorQuery::default()).await.unwrap_err();
    assert_eq!(api_error(&err).kind(), ApiErrorKind::MalformedResponse);
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/v1/", listener.local_addr().unwrap());
    drop(listener);

    let config = ClientConfig {
        base_url,
        cloud_timeout_secs: 2,
        ..ClientConfig::default()
    };
    let client = ReadClient::with_config("k1", &config).unwrap();

    let err = client.groups().await.unwrap_err();
    let api = api_error(&err);
    assert!(api.is_network(), "got: {api:?}");
    assert!(!api.message().is_empty());
}
