use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use discussion_cards::{DocumentSource, ProgressMode, RedirectState, RenderArgs};
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use tempfile::tempdir;
use tower::ServiceExt as _;
use url::Url;

fn png_bytes() -> Vec<u8> {
    // PNG signature + IHDR tag, enough for sniffing.
    vec![
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R',
    ]
}

fn read_to_string(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

fn render_args(server: &MockServer, out: &Path) -> RenderArgs {
    RenderArgs {
        token: Some("secret".to_string()),
        owner: "o".to_string(),
        repo: "r".to_string(),
        category_id: None,
        api_url: Url::parse(&server.url("/graphql")).unwrap(),
        out: out.to_path_buf(),
        cards: 2,
        emoji: "💡".to_string(),
        category_emoji: Vec::new(),
        bucket: None,
        gcs_token: None,
        storage_url: Url::parse(&server.url("/")).unwrap(),
        user_agent: "test-agent".to_string(),
        progress: ProgressMode::Never,
    }
}

fn discussions_payload(server: &MockServer) -> serde_json::Value {
    let avatar = |login: &str| server.url(format!("/avatars/{login}"));
    serde_json::json!({
        "data": {"repository": {"discussions": {"nodes": [
            {
                "title": "Hosted <online> demo",
                "url": "https://github.com/o/r/discussions/1",
                "createdAt": "2023-12-25T08:00:00Z",
                "upvoteCount": 12,
                "author": {"login": "owner", "avatarUrl": avatar("owner")},
                "labels": {"nodes": [
                    {"name": "type:chore", "color": "0366d6"},
                    {"name": "status:todo", "color": "3498db"}
                ]},
                "category": {"name": "Ideas"},
                "comments": {"nodes": [{
                    "author": {"login": "alice", "avatarUrl": avatar("alice")},
                    "createdAt": "2024-01-01T00:00:00Z",
                    "replies": {"nodes": [{
                        "author": {"login": "bob", "avatarUrl": avatar("bob")},
                        "createdAt": "2024-01-02T00:00:00Z"
                    }]}
                }]}
            },
            {
                "title": "Axis labels",
                "url": "https://github.com/o/r/discussions/2",
                "createdAt": "2023-11-01T00:00:00Z",
                "upvoteCount": 0,
                "author": null,
                "labels": {"nodes": [
                    {"name": "status:todo", "color": "3498db"},
                    {"name": "status:doing", "color": "f1c40f"}
                ]},
                "category": {"name": "Ideas"},
                "comments": {"nodes": []}
            },
            {
                "title": "Old one",
                "url": "https://github.com/o/r/discussions/3",
                "createdAt": "2023-01-01T00:00:00Z",
                "upvoteCount": 1,
                "author": {"login": "owner", "avatarUrl": avatar("owner")},
                "labels": {"nodes": [{"name": "status:done", "color": "27ae60"}]},
                "category": {"name": "Ideas"},
                "comments": {"nodes": []}
            }
        ]}}}
    })
}

fn mock_avatars(server: &MockServer) {
    // bob has no mock and gets a 404.
    for path in ["/avatars/owner", "/avatars/alice"] {
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200)
                .header("Content-Type", "image/png")
                .body(png_bytes());
        });
    }
}

#[tokio::test]
async fn renders_status_and_discussion_cards() {
    let server = MockServer::start();
    let graphql = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .header("authorization", "Bearer secret")
            .body_contains("\"owner\":\"o\"");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(discussions_payload(&server));
    });
    mock_avatars(&server);

    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    discussion_cards::render(render_args(&server, &out))
        .await
        .unwrap();
    graphql.assert_hits(1);

    for (file, count) in [
        ("idea.svg", 0),
        ("todo.svg", 2),
        ("doing.svg", 1),
        ("review.svg", 0),
        ("done.svg", 1),
    ] {
        let svg = read_to_string(&out.join(file));
        assert!(svg.starts_with(r#"<svg width="140" height="120""#), "{file}");
        assert!(svg.contains(&format!(">{count}</text>")), "{file}");
    }

    let first = read_to_string(&out.join("discussion_0.svg"));
    assert!(first.contains("<!-- https://github.com/o/r/discussions/1 -->"));
    assert!(first.contains("Hosted &lt;online&gt; demo"));
    assert!(first.contains("started on 25 Dec 2023."));
    assert!(first.contains(">bob</tspan> on 02 Jan 2024."));
    assert!(first.contains(">12</text>"));
    assert!(first.contains(">2</text>"));
    assert_eq!(first.matches("data:image/png;base64,").count(), 2);
    assert!(!first.contains("/avatars/"));

    let second = read_to_string(&out.join("discussion_1.svg"));
    assert!(second.contains(">ghost</tspan> started on 01 Nov 2023."));
    assert!(!second.contains("Last comment by"));
    assert!(!second.contains("<image "));

    assert!(!out.join("discussion_2.svg").exists());
}

#[tokio::test]
async fn uploads_every_card_when_bucket_is_set() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(discussions_payload(&server));
    });
    mock_avatars(&server);
    let upload = server.mock(|when, then| {
        when.method(POST)
            .path("/upload/storage/v1/b/cards/o")
            .query_param("uploadType", "media")
            .header("authorization", "Bearer gcs")
            .header("content-type", "image/svg+xml");
        then.status(200).body("{}");
    });

    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    let mut args = render_args(&server, &out);
    args.bucket = Some("cards".to_string());
    args.gcs_token = Some("gcs".to_string());
    discussion_cards::render(args).await.unwrap();

    upload.assert_hits(7);
    assert!(out.join("todo.svg").exists());
}

#[tokio::test]
async fn failed_upload_does_not_stop_other_cards() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(discussions_payload(&server));
    });
    mock_avatars(&server);

    let broken = server.mock(|when, then| {
        when.method(POST)
            .path("/upload/storage/v1/b/cards/o")
            .query_param("name", "discussion_0.svg");
        then.status(500).body("backend error");
    });
    let mut uploads = Vec::new();
    for name in [
        "idea.svg",
        "todo.svg",
        "doing.svg",
        "review.svg",
        "done.svg",
        "discussion_1.svg",
    ] {
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/upload/storage/v1/b/cards/o")
                .query_param("name", name);
            then.status(200).body("{}");
        });
        uploads.push(mock);
    }

    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    let mut args = render_args(&server, &out);
    args.bucket = Some("cards".to_string());
    args.gcs_token = Some("gcs".to_string());
    let err = discussion_cards::render(args).await.unwrap_err();

    assert!(format!("{err:#}").contains("1 of 7 cards could not be stored"));
    broken.assert_hits(1);
    for mock in &uploads {
        mock.assert_hits(1);
    }
    assert!(out.join("discussion_1.svg").exists());
    assert!(out.join("done.svg").exists());
}

#[tokio::test]
async fn category_emoji_replaces_the_default_icon() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(discussions_payload(&server));
    });
    mock_avatars(&server);

    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    let mut args = render_args(&server, &out);
    args.category_emoji = vec![("Ideas".to_string(), "🚀".to_string())];
    discussion_cards::render(args).await.unwrap();

    let first = read_to_string(&out.join("discussion_0.svg"));
    assert!(first.contains("<title>Ideas</title>"));
    assert!(first.contains(">🚀</text>"));
    assert!(!first.contains(">💡</text>"));
}

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let server = MockServer::start();
    let graphql = server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200).body("{}");
    });

    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    let mut args = render_args(&server, &out);
    args.token = Some("  ".to_string());
    let err = discussion_cards::render(args).await.unwrap_err();

    assert!(format!("{err:#}").contains("GITHUB_TOKEN"));
    graphql.assert_hits(0);
    assert!(!out.exists());
}

#[tokio::test]
async fn graphql_errors_abort_the_run() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"errors": [{"message": "Bad credentials"}]}));
    });

    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    let err = discussion_cards::render(render_args(&server, &out))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Bad credentials"));
    assert!(!out.join("todo.svg").exists());
}

#[tokio::test]
async fn redirect_service_reads_rendered_cards() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(discussions_payload(&server));
    });
    mock_avatars(&server);

    let tmp = tempdir().unwrap();
    let out = tmp.path().join("out");
    discussion_cards::render(render_args(&server, &out))
        .await
        .unwrap();

    let app = discussion_cards::router(RedirectState {
        source: DocumentSource::Dir(out.clone()),
        allowed_prefix: Some("https://github.com/o/r/discussions/".to_string()),
    });

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/discussion_1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://github.com/o/r/discussions/2"
    );

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/discussion_7").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"SVG not found.");

    let resp = app
        .oneshot(Request::builder().uri("/todo").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn redirect_service_reads_from_http_source() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/bucket/discussion_0.svg");
        then.status(200)
            .header("Content-Type", "image/svg+xml")
            .body("<svg><!-- https://github.com/o/r/discussions/5 --></svg>");
    });
    server.mock(|when, then| {
        when.method(GET).path("/bucket/discussion_1.svg");
        then.status(200).body("<svg></svg>");
    });

    let state = RedirectState {
        source: DocumentSource::Http {
            fetcher: discussion_cards::Fetcher::new("test-agent").unwrap(),
            base_url: Url::parse(&server.url("/bucket")).unwrap(),
        },
        allowed_prefix: None,
    };
    assert_eq!(
        state.resolve(0).await,
        discussion_cards::Resolution::Found("https://github.com/o/r/discussions/5".to_string())
    );
    assert_eq!(
        state.resolve(1).await,
        discussion_cards::Resolution::MissingLink
    );
    assert_eq!(
        state.resolve(2).await,
        discussion_cards::Resolution::MissingDocument
    );
}
