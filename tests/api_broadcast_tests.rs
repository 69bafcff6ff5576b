mod common;

use axum::http::{Method, StatusCode};
use common::{app, app_with_broadcast, send};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const ONAIR_PAGE: &str = r#"
<html><body>
  <div class="onair">
    <p class="greeting-text">
      <b id="forumName">달리는 라디오</b>
      <span>MC : 강세민 | 방송시간 : 18:05 ~ 19:55</span>
    </p>
  </div>
</body></html>
"#;

#[tokio::test]
async fn regions_lists_all_thirteen_stations() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/tbn/regions", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let regions = body.as_object().expect("object");
    assert_eq!(regions.len(), 13);
    assert_eq!(regions["2"], "부산");
    assert_eq!(regions["14"], "충남");
}

#[tokio::test]
async fn broadcast_info_is_scraped_from_onair_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/onair"))
        .and(query_param("area_code", "2"))
        .and(header("user-agent", "tbn-api-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONAIR_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    let app = app_with_broadcast(&format!("{}/onair", server.uri())).await;

    let (status, body) = send(&app, Method::GET, "/api/tbn/broadcast/2", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "달리는 라디오");
    assert_eq!(body["mc"], "강세민");
    assert_eq!(body["time"], "18:05 ~ 19:55");
    assert_eq!(body["regionCode"], "2");
    assert_eq!(body["regionName"], "부산");
}

#[tokio::test]
async fn page_without_programme_yields_not_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/onair"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;
    let app = app_with_broadcast(&format!("{}/onair", server.uri())).await;

    let (status, body) = send(&app, Method::GET, "/api/tbn/broadcast/5", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "정보 없음");
    assert_eq!(body["mc"], "정보 없음");
    assert_eq!(body["time"], "정보 없음");
    assert_eq!(body["regionName"], "대전");
}

#[tokio::test]
async fn upstream_error_yields_load_failed_placeholders() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/onair"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = app_with_broadcast(&format!("{}/onair", server.uri())).await;

    let (status, body) = send(&app, Method::GET, "/api/tbn/broadcast/2", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "정보 로드 실패");
    assert_eq!(body["mc"], "정보 로드 실패");
    assert_eq!(body["time"], "정보 로드 실패");
    assert_eq!(body["regionCode"], "2");
    assert_eq!(body["regionName"], "부산");
}

#[tokio::test]
async fn unreachable_upstream_for_unknown_region() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/tbn/broadcast/99", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "정보 로드 실패");
    assert_eq!(body["regionCode"], "99");
    assert_eq!(body["regionName"], "알수없음");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/tbn/broadcast/{regionCode}"].is_object());
    assert!(body["paths"]["/api/auth/account"].is_object());
}
