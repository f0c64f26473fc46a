//! Integration tests for the `fetch` command against a mocked Graph API

use camino::{Utf8Path, Utf8PathBuf};
use graph_harvest_lib::Host;
use serde_json::{Value, json};
use std::fs;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

/// Test host that captures output to in-memory buffers.
#[derive(Debug, Default)]
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
}

impl TestHost {
    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl std::io::Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl std::io::Write {
        &mut self.error_buf
    }

    fn exit(&mut self, _code: i32) {}
}

fn fixture(name: &str) -> Value {
    let text = fs::read_to_string(format!("tests/fixtures/{name}")).expect("Failed to read fixture");
    serde_json::from_str(&text).expect("Fixture is not valid JSON")
}

async fn mount(server: &MockServer, resource: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v18.0/{resource}")))
        .and(query_param("access_token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

struct Workspace {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir is not UTF-8");
        fs::write(root.join("harvest.toml"), "").expect("Failed to write config");
        Self { _dir: dir, root }
    }

    fn args(&self, server: &MockServer, extra: &[&str]) -> Vec<String> {
        let mut args: Vec<String> = [
            "graph-harvest",
            "fetch",
            "--access-token",
            TOKEN,
            "--config",
            self.root.join("harvest.toml").as_str(),
            "--output-dir",
            self.root.join("data").as_str(),
            "--base-url",
            &format!("{}/v18.0", server.uri()),
            "--log-level",
            "none",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        args.extend(extra.iter().map(ToString::to_string));
        args
    }

    /// The single run directory written for `platform`.
    fn run_dir(&self, platform: &str) -> Utf8PathBuf {
        let platform_dir = self.root.join("data").join(platform);
        let entries: Vec<_> = platform_dir
            .read_dir_utf8()
            .expect("platform directory is missing")
            .map(|e| e.expect("unreadable entry").path().to_path_buf())
            .collect();
        assert_eq!(entries.len(), 1, "expected exactly one run directory in {platform_dir}");
        entries.into_iter().next().expect("checked above")
    }
}

fn read(dir: &Utf8Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap_or_else(|e| panic!("Failed to read {name}: {e}"))
}

#[tokio::test]
async fn test_fetch_facebook_end_to_end() {
    let server = MockServer::start().await;
    mount(&server, "1001", fixture("facebook_page.json")).await;
    mount(&server, "1001/insights", fixture("facebook_insights.json")).await;

    let next = format!("{}/v18.0/1001/posts?access_token={TOKEN}&after=cursor1", server.uri());
    Mock::given(method("GET"))
        .and(path("/v18.0/1001/posts"))
        .and(query_param("after", "cursor1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1001_2", "message": "Closed Monday", "created_time": "2024-11-08T09:00:00+0000"}],
            "paging": {"cursors": {"before": "cursor1"}}
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    mount(
        &server,
        "1001/posts",
        json!({
            "data": [{
                "id": "1001_1",
                "message": "Croissants are back",
                "created_time": "2024-11-10T09:00:00+0000",
                "likes": {"data": [], "summary": {"total_count": 12, "can_like": true}},
                "shares": {"count": 2}
            }],
            "paging": {"next": next}
        }),
    )
    .await;

    let workspace = Workspace::new();
    let mut host = TestHost::default();
    graph_harvest_lib::run(
        &mut host,
        workspace.args(&server, &["facebook", "--page-id", "1001", "--max-pages", "2"]),
    )
    .await
    .expect("fetch should succeed");

    assert_eq!(host.output_str(), "Facebook data extraction completed successfully\n");

    let dir = workspace.run_dir("facebook");
    let name = dir.file_name().expect("run directory has a name");
    assert_eq!(name.len(), "YYYYMMDD_HHMMSS".len());
    assert_eq!(name.as_bytes()[8], b'_');

    let raw: Value = serde_json::from_str(&read(&dir, "facebook_raw_data.json")).expect("raw data is valid JSON");
    assert_eq!(raw["page_data"], fixture("facebook_page.json"));
    assert_eq!(raw["posts_data"]["data"].as_array().map(Vec::len), Some(2));

    insta::assert_snapshot!(read(&dir, "facebook_page_data.csv"), @r#"
    name,fan_count,followers_count,link,about,category,engagement.count,engagement.social_sentence,id
    Boulangerie Côte,1520,1610,https://www.facebook.com/boulangerie,"Fresh bread, every morning",Bakery,1520,1.5K people like this.,1001
    "#);

    insta::assert_snapshot!(read(&dir, "facebook_posts_data.csv"), @r"
    id,message,created_time,likes_data,likes_summary_total_count,likes_summary_can_like,shares_count
    1001_1,Croissants are back,2024-11-10T09:00:00+0000,[],12,True,2
    1001_2,Closed Monday,2024-11-08T09:00:00+0000,,,,
    ");

    insta::assert_snapshot!(read(&dir, "facebook_daily_insights.csv"), @r"
    metric,date,value
    page_impressions,2024-11-09T08:00:00+0000,340
    page_impressions,2024-11-10T08:00:00+0000,410
    page_fan_adds,2024-11-09T08:00:00+0000,3
    page_fan_adds,2024-11-10T08:00:00+0000,5
    ");

    insta::assert_snapshot!(read(&dir, "facebook_daily_insights_pivot.csv"), @r"
    date,page_impressions,page_fan_adds
    2024-11-09 08:00:00+00:00,340,3
    2024-11-10 08:00:00+00:00,410,5
    ");
}

#[tokio::test]
async fn test_fetch_all_platforms_in_order() {
    let server = MockServer::start().await;
    mount(&server, "1001", fixture("facebook_page.json")).await;
    mount(&server, "1001/insights", fixture("facebook_insights.json")).await;
    mount(&server, "1001/posts", json!({"data": []})).await;
    mount(&server, "17841400000000001", fixture("instagram_account.json")).await;
    mount(&server, "17841400000000001/insights", fixture("instagram_insights.json")).await;
    mount(&server, "17841400000000001/media", fixture("instagram_media.json")).await;

    let workspace = Workspace::new();
    let mut host = TestHost::default();
    graph_harvest_lib::run(
        &mut host,
        workspace.args(
            &server,
            &["--page-id", "1001", "--instagram-account-id", "17841400000000001"],
        ),
    )
    .await
    .expect("fetch should succeed");

    assert_eq!(
        host.output_str(),
        "Facebook data extraction completed successfully\nInstagram data extraction completed successfully\n"
    );

    let facebook = workspace.run_dir("facebook");
    assert!(facebook.join("facebook_page_data.csv").exists());
    assert_eq!(read(&facebook, "facebook_posts_data.csv"), "");

    let instagram = workspace.run_dir("instagram");
    insta::assert_snapshot!(read(&instagram, "instagram_account_data.csv"), @r"
    username,followers_count,follows_count,media_count,profile_picture_url,id
    boulangerie.cote,2890,310,2,https://scontent.example.com/p.jpg,17841400000000001
    ");

    let media = read(&instagram, "instagram_media_data.csv");
    assert_eq!(
        media.lines().next(),
        Some("id,caption,media_type,media_url,permalink,timestamp,comments_count,like_count,thumbnail_url")
    );
    assert_eq!(media.lines().count(), 3);

    insta::assert_snapshot!(read(&instagram, "instagram_daily_insights_pivot.csv"), @r"
    date,reach,profile_views
    2024-11-09 08:00:00+00:00,95,
    2024-11-10 08:00:00+00:00,120,14
    ");
}

#[tokio::test]
async fn test_http_error_aborts_remaining_platforms() {
    let server = MockServer::start().await;
    mount(&server, "1001", fixture("facebook_page.json")).await;

    Mock::given(method("GET"))
        .and(path("/v18.0/1001/insights"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "(#100) The value must be a valid insights metric", "type": "OAuthException", "code": 100}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v18.0/2002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("instagram_account.json")))
        .expect(0)
        .mount(&server)
        .await;

    let workspace = Workspace::new();
    let mut host = TestHost::default();
    let result = graph_harvest_lib::run(
        &mut host,
        workspace.args(&server, &["facebook", "instagram", "--page-id", "1001", "--instagram-account-id", "2002"]),
    )
    .await;

    let message = format!("{}", result.expect_err("fetch should fail"));
    assert!(message.contains("400"), "unexpected error: {message}");
    assert!(message.contains("1001/insights"), "unexpected error: {message}");
    assert!(!message.contains(TOKEN), "token leaked into error: {message}");
    assert!(host.output_str().is_empty());
    assert!(!workspace.root.join("data").join("instagram").exists());
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;

    let workspace = Workspace::new();
    let mut host = TestHost::default();
    let result = graph_harvest_lib::run(&mut host, workspace.args(&server, &["instagram", "--page-id", "1001"])).await;

    let message = format!("{}", result.expect_err("fetch should fail"));
    assert!(message.contains("INSTAGRAM_BUSINESS_ACCOUNT_ID"), "unexpected error: {message}");

    let requests = server.received_requests().await.expect("request recording is enabled");
    assert!(requests.is_empty());
}
