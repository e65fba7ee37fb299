//! HTTP contract tests for `CmsClient` against a mock CMS.

use cms_migrate_core::api::TranslationPayload;
use cms_migrate_core::{
    AssetWrite, CmsApi, CmsClient, Credentials, MigrateError, NewVersion, PageStatus,
};
use serde_json::json;
use wiremock::matchers::{
    basic_auth, bearer_token, body_bytes, body_json, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH_PATH: &str = "/mir/api/v2/auth/login";

fn credentials() -> Credentials {
    Credentials::new("admin", "secret")
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(AUTH_PATH))
        .and(basic_auth("admin", "secret"))
        .respond_with(ResponseTemplate::new(200).insert_header("Authorization", "Bearer tok-123"))
        .expect(1)
        .mount(server)
        .await;
}

async fn login(server: &MockServer, dry_run: bool) -> CmsClient {
    mount_login(server).await;
    CmsClient::login(&format!("{}/mir/", server.uri()), &credentials(), dry_run)
        .await
        .expect("login should succeed")
}

#[tokio::test]
async fn test_login_reads_token_from_header() {
    let server = MockServer::start().await;
    let client = login(&server, false).await;
    assert_eq!(client.cms_url(), format!("{}/mir/api/cms/v1", server.uri()));
}

#[tokio::test]
async fn test_user_agent_carries_crate_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AUTH_PATH))
        .and(header(
            "user-agent",
            format!("cms-migrate/{}", env!("CARGO_PKG_VERSION")).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).insert_header("Authorization", "Bearer t"))
        .expect(1)
        .mount(&server)
        .await;

    CmsClient::login(&format!("{}/mir", server.uri()), &credentials(), false)
        .await
        .expect("login with versioned user agent");
}

#[tokio::test]
async fn test_login_falls_back_to_body_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AUTH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "body-token" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mir/api/cms/v1/pages"))
        .and(bearer_token("body-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CmsClient::login(&format!("{}/mir", server.uri()), &credentials(), false)
        .await
        .unwrap();
    assert_eq!(client.create_page("/qed/x").await.unwrap(), Some(5));
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = CmsClient::login(&format!("{}/mir", server.uri()), &credentials(), false)
        .await
        .err()
        .expect("login should fail");
    assert!(matches!(err, MigrateError::Authentication { .. }));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_login_without_token_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .mount(&server)
        .await;

    let result = CmsClient::login(&format!("{}/mir", server.uri()), &credentials(), false).await;
    assert!(matches!(result, Err(MigrateError::Authentication { .. })));
}

#[tokio::test]
async fn test_create_page_and_lookup() {
    let server = MockServer::start().await;
    let client = login(&server, false).await;

    Mock::given(method("POST"))
        .and(path("/mir/api/cms/v1/pages"))
        .and(bearer_token("tok-123"))
        .and(body_json(json!({ "slug": "/qed/home" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "slug": "/qed/home" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mir/api/cms/v1/pages"))
        .and(query_param("slug", "/qed/home"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 17 }])))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.create_page("/qed/home").await.unwrap(), None);
    assert_eq!(client.find_page_by_slug("/qed/home").await.unwrap(), Some(17));
}

#[tokio::test]
async fn test_create_page_remote_failure() {
    let server = MockServer::start().await;
    let client = login(&server, false).await;

    Mock::given(method("POST"))
        .and(path("/mir/api/cms/v1/pages"))
        .respond_with(ResponseTemplate::new(400).set_body_string("{\"error\": \"slug is required\"}"))
        .mount(&server)
        .await;

    let err = client.create_page("").await.unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert!(matches!(err, MigrateError::Remote { .. }));
}

#[tokio::test]
async fn test_create_version_payload() {
    let server = MockServer::start().await;
    let client = login(&server, false).await;

    let version = NewVersion {
        status: PageStatus::Published,
        comment: "Imported from legacy CMS".to_string(),
        translations: vec![TranslationPayload {
            language: "de".to_string(),
            title: "Start".to_string(),
            content: "<h1>Start</h1>".to_string(),
        }],
    };

    Mock::given(method("POST"))
        .and(path("/mir/api/cms/v1/pages/17/versions"))
        .and(body_json(json!({
            "status": "published",
            "comment": "Imported from legacy CMS",
            "translations": [
                { "language": "de", "title": "Start", "content": "<h1>Start</h1>" }
            ]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "version_number": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.create_version(17, &version).await.unwrap(), Some(3));
}

#[tokio::test]
async fn test_asset_writes_treat_conflict_as_existing() {
    let server = MockServer::start().await;
    let client = login(&server, false).await;

    Mock::given(method("POST"))
        .and(path("/mir/api/cms/v1/assets/qed"))
        .and(query_param("directory", "true"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mir/api/cms/v1/assets/qed/a.png"))
        .and(body_bytes(b"png-bytes".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mir/api/cms/v1/assets/qed/b.png"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mir/api/cms/v1/assets/qed/c.png"))
        .respond_with(ResponseTemplate::new(413))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        client.create_asset_directory("qed").await.unwrap(),
        AssetWrite::AlreadyExists
    );
    assert_eq!(
        client.upload_asset("qed/a.png", b"png-bytes".to_vec()).await.unwrap(),
        AssetWrite::Created
    );
    assert_eq!(
        client.upload_asset("qed/b.png", Vec::new()).await.unwrap(),
        AssetWrite::AlreadyExists
    );
    let err = client.upload_asset("qed/c.png", Vec::new()).await.unwrap_err();
    assert_eq!(err.status_code(), Some(413));
}

#[tokio::test]
async fn test_dry_run_sends_no_mutations() {
    let server = MockServer::start().await;
    let client = login(&server, true).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    assert!(client.is_dry_run());
    assert_eq!(client.create_page("/qed/home").await.unwrap(), Some(0));
    let version = NewVersion {
        status: PageStatus::Draft,
        comment: String::new(),
        translations: Vec::new(),
    };
    assert_eq!(client.create_version(0, &version).await.unwrap(), Some(1));
    assert_eq!(
        client.create_asset_directory("qed").await.unwrap(),
        AssetWrite::Created
    );
    assert_eq!(
        client.upload_asset("qed/a.png", vec![1, 2, 3]).await.unwrap(),
        AssetWrite::Created
    );
}
